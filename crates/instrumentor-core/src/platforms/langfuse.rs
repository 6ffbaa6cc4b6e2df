//! Langfuse platform.

use crate::config::{InstrumentationConfig, InstrumentationTarget};
use crate::models::{InjectionKind, InjectionPoint};

use super::{EnvVar, InstrumentationPlan, ObservabilityPlatform};

pub struct Langfuse;

impl ObservabilityPlatform for Langfuse {
    fn name(&self) -> &'static str {
        "langfuse"
    }

    fn display_name(&self) -> &'static str {
        "Langfuse"
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["langfuse>=2.0.0"]
    }

    fn env_vars(&self) -> Vec<EnvVar> {
        vec![
            EnvVar {
                name: "LANGFUSE_PUBLIC_KEY",
                description: "Langfuse public API key",
                required: true,
            },
            EnvVar {
                name: "LANGFUSE_SECRET_KEY",
                description: "Langfuse secret API key",
                required: true,
            },
            EnvVar {
                name: "LANGFUSE_HOST",
                description: "Langfuse host URL (defaults to https://cloud.langfuse.com)",
                required: false,
            },
        ]
    }

    fn instrumentation_plan(
        &self,
        framework: &str,
        config: &InstrumentationConfig,
    ) -> InstrumentationPlan {
        let mut plan = InstrumentationPlan {
            imports: vec!["import os".to_string()],
            ..Default::default()
        };

        match framework {
            "langchain" | "langgraph" => {
                plan.imports
                    .push("from langfuse.callback import CallbackHandler".to_string());
                plan.init_code = "\
langfuse_handler = CallbackHandler(
    public_key=os.getenv(\"LANGFUSE_PUBLIC_KEY\"),
    secret_key=os.getenv(\"LANGFUSE_SECRET_KEY\"),
    host=os.getenv(\"LANGFUSE_HOST\", \"https://cloud.langfuse.com\"),
)
"
                .to_string();
                if config.should_instrument_target(InstrumentationTarget::Chains) {
                    plan.injection_points.push(InjectionPoint {
                        kind: InjectionKind::Callback,
                        line: 1,
                        target: "AgentExecutor".to_string(),
                        code: "callbacks=[langfuse_handler]".to_string(),
                        indentation: 0,
                    });
                }
            }
            "openai-agents" => {
                // Automatic instrumentation via module patching.
                plan.imports
                    .push("from langfuse.openai import openai".to_string());
            }
            "pydantic-ai" => {
                plan.imports
                    .push("from langfuse.decorators import observe".to_string());
                if config.should_instrument_target(InstrumentationTarget::Tools) {
                    plan.injection_points.push(InjectionPoint {
                        kind: InjectionKind::Decorator,
                        line: 1,
                        target: "agent_function".to_string(),
                        code: "@observe()".to_string(),
                        indentation: 0,
                    });
                }
            }
            _ => {
                plan.imports.push("from langfuse import Langfuse".to_string());
                plan.init_code = "\
langfuse = Langfuse(
    public_key=os.getenv(\"LANGFUSE_PUBLIC_KEY\"),
    secret_key=os.getenv(\"LANGFUSE_SECRET_KEY\"),
    host=os.getenv(\"LANGFUSE_HOST\", \"https://cloud.langfuse.com\"),
)
"
                .to_string();
            }
        }

        plan
    }
}
