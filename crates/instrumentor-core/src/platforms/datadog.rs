//! Datadog APM platform.

use crate::config::InstrumentationConfig;

use super::{EnvVar, InstrumentationPlan, ObservabilityPlatform};

pub struct Datadog;

impl ObservabilityPlatform for Datadog {
    fn name(&self) -> &'static str {
        "datadog"
    }

    fn display_name(&self) -> &'static str {
        "Datadog"
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["ddtrace>=2.14.0"]
    }

    fn env_vars(&self) -> Vec<EnvVar> {
        vec![
            EnvVar {
                name: "DD_API_KEY",
                description: "Datadog API key",
                required: true,
            },
            EnvVar {
                name: "DD_SITE",
                description: "Datadog site (e.g. datadoghq.com, datadoghq.eu)",
                required: false,
            },
            EnvVar {
                name: "DD_SERVICE",
                description: "Service name for APM",
                required: false,
            },
            EnvVar {
                name: "DD_ENV",
                description: "Environment name (e.g. production, staging)",
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
            imports: vec![
                "import os".to_string(),
                "from ddtrace import tracer, patch".to_string(),
            ],
            ..Default::default()
        };

        let patch_line = match framework {
            "langchain" | "langgraph" => Some("patch(langchain=True)"),
            "openai-agents" => Some("patch(openai=True)"),
            _ => None,
        };

        plan.init_code = match patch_line {
            Some(patch) => format!(
                "\
{patch}
tracer.configure(
    hostname=os.getenv(\"DD_AGENT_HOST\", \"localhost\"),
    port=int(os.getenv(\"DD_AGENT_PORT\", \"8126\")),
)
"
            ),
            // No integration patch for this framework; trace manually
            // with @tracer.wrap() on the agent functions.
            None => "\
tracer.configure(
    hostname=os.getenv(\"DD_AGENT_HOST\", \"localhost\"),
    port=int(os.getenv(\"DD_AGENT_PORT\", \"8126\")),
)
"
            .to_string(),
        };

        plan
    }
}
