//! LangSmith platform.

use crate::config::InstrumentationConfig;

use super::{EnvVar, InstrumentationPlan, ObservabilityPlatform};

pub struct LangSmith;

impl ObservabilityPlatform for LangSmith {
    fn name(&self) -> &'static str {
        "langsmith"
    }

    fn display_name(&self) -> &'static str {
        "LangSmith"
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["langsmith>=0.1.0"]
    }

    fn env_vars(&self) -> Vec<EnvVar> {
        vec![
            EnvVar {
                name: "LANGCHAIN_API_KEY",
                description: "LangSmith API key",
                required: true,
            },
            EnvVar {
                name: "LANGCHAIN_TRACING_V2",
                description: "Enable LangSmith tracing (set to 'true')",
                required: true,
            },
            EnvVar {
                name: "LANGCHAIN_PROJECT",
                description: "LangSmith project name",
                required: false,
            },
            EnvVar {
                name: "LANGCHAIN_ENDPOINT",
                description: "LangSmith API endpoint (defaults to https://api.smith.langchain.com)",
                required: false,
            },
        ]
    }

    fn instrumentation_plan(
        &self,
        framework: &str,
        _config: &InstrumentationConfig,
    ) -> InstrumentationPlan {
        let mut plan = InstrumentationPlan {
            imports: vec!["import os".to_string()],
            ..Default::default()
        };

        match framework {
            // LangChain and LangGraph trace automatically once the
            // environment variables are set; no call-site changes.
            "langchain" | "langgraph" => {
                plan.imports.push("from langsmith import Client".to_string());
                plan.init_code = "\
os.environ[\"LANGCHAIN_TRACING_V2\"] = \"true\"
os.environ[\"LANGCHAIN_PROJECT\"] = os.getenv(\"LANGCHAIN_PROJECT\", \"default\")
"
                .to_string();
            }
            _ => {
                plan.imports.push("from langsmith import Client".to_string());
                plan.imports
                    .push("from langsmith import traceable".to_string());
                plan.init_code = "\
os.environ[\"LANGCHAIN_TRACING_V2\"] = \"true\"

langsmith_client = Client()
"
                .to_string();
            }
        }

        plan
    }
}
