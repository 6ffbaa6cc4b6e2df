//! Arize Phoenix platform.

use crate::config::InstrumentationConfig;

use super::{EnvVar, InstrumentationPlan, ObservabilityPlatform};

pub struct Phoenix;

impl ObservabilityPlatform for Phoenix {
    fn name(&self) -> &'static str {
        "phoenix"
    }

    fn display_name(&self) -> &'static str {
        "Arize Phoenix"
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![
            "arize-phoenix>=4.0.0",
            "openinference-instrumentation-langchain>=0.1.0",
        ]
    }

    fn env_vars(&self) -> Vec<EnvVar> {
        vec![EnvVar {
            name: "PHOENIX_COLLECTOR_ENDPOINT",
            description: "Phoenix collector endpoint URL (defaults to http://localhost:6006)",
            required: false,
        }]
    }

    fn instrumentation_plan(
        &self,
        framework: &str,
        _config: &InstrumentationConfig,
    ) -> InstrumentationPlan {
        let mut plan = InstrumentationPlan {
            imports: vec!["import phoenix as px".to_string()],
            ..Default::default()
        };

        match framework {
            "langchain" | "langgraph" => {
                plan.imports.push(
                    "from openinference.instrumentation.langchain import LangChainInstrumentor"
                        .to_string(),
                );
                plan.init_code = "\
phoenix_session = px.launch_app()
LangChainInstrumentor().instrument()
"
                .to_string();
            }
            "openai-agents" => {
                plan.imports.push(
                    "from openinference.instrumentation.openai import OpenAIInstrumentor"
                        .to_string(),
                );
                plan.init_code = "\
phoenix_session = px.launch_app()
OpenAIInstrumentor().instrument()
"
                .to_string();
            }
            _ => {
                plan.init_code = "phoenix_session = px.launch_app()\n".to_string();
            }
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_langchain_plan_uses_openinference() {
        let plan = Phoenix.instrumentation_plan("langchain", &InstrumentationConfig::standard());
        assert!(plan.init_code.contains("LangChainInstrumentor().instrument()"));
    }

    #[test]
    fn test_generic_plan_launches_app() {
        let plan = Phoenix.instrumentation_plan("autogen", &InstrumentationConfig::standard());
        assert_eq!(plan.init_code, "phoenix_session = px.launch_app()\n");
    }
}
