//! Observability platform registry.
//!
//! Each platform implements [`ObservabilityPlatform`] and is registered
//! explicitly in [`PlatformRegistry::builtin`]. The registry is an
//! ordinary value constructed once at process start and passed by
//! reference; there is no global instance and no runtime discovery.

mod datadog;
mod langfuse;
mod langsmith;
mod phoenix;

pub use datadog::Datadog;
pub use langfuse::Langfuse;
pub use langsmith::LangSmith;
pub use phoenix::Phoenix;

use serde::Serialize;

use crate::config::InstrumentationConfig;
use crate::models::InjectionPoint;

/// An environment variable a platform needs at runtime.
#[derive(Clone, Debug, Serialize)]
pub struct EnvVar {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// Summary information about a platform.
#[derive(Clone, Debug, Serialize)]
pub struct PlatformInfo {
    pub name: &'static str,
    pub display_name: &'static str,
    pub dependencies: Vec<&'static str>,
    pub env_vars: Vec<EnvVar>,
    pub description: String,
}

/// A static instrumentation plan for one framework: the imports and
/// initialization code to add, plus any framework-generic injection
/// points. Entry-point line numbers are resolved later by the caller
/// against the detector's output.
#[derive(Clone, Debug, Default, Serialize)]
pub struct InstrumentationPlan {
    pub imports: Vec<String>,
    pub init_code: String,
    pub injection_points: Vec<InjectionPoint>,
}

/// One observability platform implementation.
pub trait ObservabilityPlatform: Send + Sync {
    /// Unique identifier, e.g. `"langfuse"`.
    fn name(&self) -> &'static str;

    /// Human-readable name, e.g. `"Langfuse"`.
    fn display_name(&self) -> &'static str;

    /// Python package dependencies the platform needs.
    fn dependencies(&self) -> Vec<&'static str>;

    /// Environment variables the platform reads.
    fn env_vars(&self) -> Vec<EnvVar>;

    /// Static instrumentation plan for a framework.
    fn instrumentation_plan(
        &self,
        framework: &str,
        config: &InstrumentationConfig,
    ) -> InstrumentationPlan;

    fn info(&self) -> PlatformInfo {
        PlatformInfo {
            name: self.name(),
            display_name: self.display_name(),
            dependencies: self.dependencies(),
            env_vars: self.env_vars(),
            description: format!("{} observability platform", self.display_name()),
        }
    }
}

/// Registry of observability platforms.
pub struct PlatformRegistry {
    platforms: Vec<Box<dyn ObservabilityPlatform>>,
}

impl PlatformRegistry {
    /// Registry with the built-in platforms.
    pub fn builtin() -> Self {
        let mut registry = Self {
            platforms: Vec::new(),
        };
        registry.register(Box::new(Langfuse));
        registry.register(Box::new(LangSmith));
        registry.register(Box::new(Phoenix));
        registry.register(Box::new(Datadog));
        registry
    }

    /// Register a platform. A platform with the same name replaces the
    /// earlier entry.
    pub fn register(&mut self, platform: Box<dyn ObservabilityPlatform>) {
        if let Some(existing) = self
            .platforms
            .iter_mut()
            .find(|p| p.name() == platform.name())
        {
            *existing = platform;
        } else {
            self.platforms.push(platform);
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn ObservabilityPlatform> {
        self.platforms
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    pub fn has_platform(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn list(&self) -> Vec<PlatformInfo> {
        self.platforms.iter().map(|p| p.info()).collect()
    }
}
