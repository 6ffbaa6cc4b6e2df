//! Instrumentation configuration: level, targets, and presets.

use serde::{Deserialize, Serialize};

use crate::detector::filesystem::glob_match;

/// Level of instrumentation detail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentationLevel {
    Minimal,
    Standard,
    Comprehensive,
}

/// Components to instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentationTarget {
    Tools,
    LlmCalls,
    Rag,
    Memory,
    Chains,
    Errors,
    SubAgents,
    Prompts,
}

/// Cost/overhead limit for the generated instrumentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostLimit {
    Low,
    Medium,
    High,
}

/// Acceptable performance impact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceImpact {
    Minimal,
    Acceptable,
    Detailed,
}

fn default_exclude_patterns() -> Vec<String> {
    vec![
        "**/test_*.py".to_string(),
        "**/*_test.py".to_string(),
        "**/tests/**".to_string(),
    ]
}

/// Configuration for one instrumentation run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstrumentationConfig {
    pub level: InstrumentationLevel,
    pub targets: Vec<InstrumentationTarget>,
    /// Observability platform to instrument for.
    pub platform: String,
    pub cost_limit: CostLimit,
    pub performance_impact: PerformanceImpact,
    /// Frameworks to instrument; empty means all detected.
    #[serde(default)]
    pub frameworks: Vec<String>,
    /// Glob patterns for files excluded from instrumentation.
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl InstrumentationConfig {
    /// Minimal preset: only LLM calls, lowest overhead.
    pub fn minimal() -> Self {
        Self {
            level: InstrumentationLevel::Minimal,
            targets: vec![InstrumentationTarget::LlmCalls],
            platform: "langfuse".to_string(),
            cost_limit: CostLimit::Low,
            performance_impact: PerformanceImpact::Minimal,
            frameworks: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
        }
    }

    /// Standard preset: tools, LLM calls, chains, and errors.
    pub fn standard() -> Self {
        Self {
            level: InstrumentationLevel::Standard,
            targets: vec![
                InstrumentationTarget::Tools,
                InstrumentationTarget::LlmCalls,
                InstrumentationTarget::Chains,
                InstrumentationTarget::Errors,
            ],
            platform: "langfuse".to_string(),
            cost_limit: CostLimit::Medium,
            performance_impact: PerformanceImpact::Acceptable,
            frameworks: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
        }
    }

    /// Comprehensive preset: every component, deepest detail.
    pub fn comprehensive() -> Self {
        Self {
            level: InstrumentationLevel::Comprehensive,
            targets: vec![
                InstrumentationTarget::Tools,
                InstrumentationTarget::LlmCalls,
                InstrumentationTarget::Rag,
                InstrumentationTarget::Memory,
                InstrumentationTarget::Chains,
                InstrumentationTarget::Errors,
                InstrumentationTarget::SubAgents,
                InstrumentationTarget::Prompts,
            ],
            platform: "langfuse".to_string(),
            cost_limit: CostLimit::High,
            performance_impact: PerformanceImpact::Detailed,
            frameworks: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
        }
    }

    pub fn should_instrument_target(&self, target: InstrumentationTarget) -> bool {
        self.targets.contains(&target)
    }

    /// Whether a `/`-normalized relative path is excluded from
    /// instrumentation.
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| glob_match(relative_path, pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_scale_targets() {
        assert_eq!(InstrumentationConfig::minimal().targets.len(), 1);
        assert_eq!(InstrumentationConfig::standard().targets.len(), 4);
        assert_eq!(InstrumentationConfig::comprehensive().targets.len(), 8);
    }

    #[test]
    fn test_should_instrument_target() {
        let config = InstrumentationConfig::minimal();
        assert!(config.should_instrument_target(InstrumentationTarget::LlmCalls));
        assert!(!config.should_instrument_target(InstrumentationTarget::Tools));
    }

    #[test]
    fn test_default_exclusions() {
        let config = InstrumentationConfig::default();
        assert!(config.is_excluded("test_app.py"));
        assert!(config.is_excluded("src/runner_test.py"));
        assert!(config.is_excluded("pkg/tests/helpers.py"));
        assert!(!config.is_excluded("src/app.py"));
    }

    #[test]
    fn test_serde_round_trip() {
        let config = InstrumentationConfig::standard();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"llm_calls\""));
        assert!(json.contains("\"standard\""));
        let back: InstrumentationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.targets, config.targets);
    }
}
