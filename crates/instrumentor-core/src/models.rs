//! Shared typed models used across parsing, detection, and injection.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// 1. ImportInfo
// ---------------------------------------------------------------------------

/// One import statement (`import x` or `from x import y [as z]`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportInfo {
    /// Dotted module path; relative imports keep their leading dots.
    pub module: String,
    /// Names imported via `from x import a, b`; empty for plain imports.
    pub names: Vec<String>,
    /// Alias from an `as` clause, if any.
    pub alias: Option<String>,
    /// 1-based source line of the statement.
    pub line: usize,
    /// Raw source line the statement starts on.
    pub source: String,
}

// ---------------------------------------------------------------------------
// 2. FunctionInfo
// ---------------------------------------------------------------------------

/// One function definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    /// 1-based line of the `def` keyword.
    pub line: usize,
    /// Decorator source strings (including the `@`), outermost first.
    pub decorators: Vec<String>,
    /// Parameter names, in declaration order.
    pub parameters: Vec<String>,
    /// Raw `def` line.
    pub source: String,
}

// ---------------------------------------------------------------------------
// 3. ClassInfo
// ---------------------------------------------------------------------------

/// One class definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub line: usize,
    pub decorators: Vec<String>,
    /// Base-class names (plain or dotted identifiers).
    pub bases: Vec<String>,
    pub source: String,
}

// ---------------------------------------------------------------------------
// 4. CallInfo
// ---------------------------------------------------------------------------

/// One call expression matching a search pattern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInfo {
    /// Callee text, e.g. `ChatOpenAI` or `client.chat.create`.
    pub function_name: String,
    /// 1-based line the call starts on.
    pub line: usize,
    /// Source fragments of the individual arguments.
    pub arguments: Vec<String>,
    /// Full call source, start line through end line.
    pub source: String,
}

// ---------------------------------------------------------------------------
// 5. PackageVersion
// ---------------------------------------------------------------------------

/// One resolved dependency from a manifest file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVersion {
    /// Package name as written in the manifest.
    pub name: String,
    /// Version string; `"*"` when unconstrained.
    pub version: String,
    /// Manifest the entry came from (`requirements.txt`, ...).
    pub source: String,
    /// Version constraint operator (`==`, `>=`, ...); empty if none.
    pub constraint: String,
}

// ---------------------------------------------------------------------------
// 6. FrameworkInfo
// ---------------------------------------------------------------------------

/// One detected agent framework in a codebase.
///
/// The file/entry-point/class sets are ordered so scan output is
/// deterministic regardless of filesystem iteration order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameworkInfo {
    pub name: String,
    /// Resolved version from the manifest analyzer; `"*"` if unknown.
    pub version: String,
    /// Files where any framework evidence was found.
    pub files: BTreeSet<String>,
    /// Files where a framework class is actually instantiated.
    pub entry_points: BTreeSet<String>,
    /// Matched agent class names.
    pub agent_classes: BTreeSet<String>,
    /// Heuristic confidence in [0.0, 1.0].
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// 7. InjectionPoint
// ---------------------------------------------------------------------------

/// The kind of edit an injection point requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionKind {
    Import,
    Decorator,
    Callback,
    Wrapper,
    ContextManager,
}

impl InjectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InjectionKind::Import => "import",
            InjectionKind::Decorator => "decorator",
            InjectionKind::Callback => "callback",
            InjectionKind::Wrapper => "wrapper",
            InjectionKind::ContextManager => "context_manager",
        }
    }
}

/// One requested source edit, positioned against the *original*
/// unmodified file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionPoint {
    #[serde(rename = "type")]
    pub kind: InjectionKind,
    /// 1-based target line in the original file.
    pub line: usize,
    /// Function, class, or variable name the edit refers to.
    pub target: String,
    /// Code fragment to insert; syntactically self-contained for its kind.
    pub code: String,
    /// Indentation hint in spaces; strategies that derive indentation
    /// from the target line ignore it.
    #[serde(default)]
    pub indentation: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injection_point_wire_format() {
        let json = r#"{
            "type": "context_manager",
            "line": 12,
            "target": "run",
            "code": "with tracer.span('run'):"
        }"#;
        let point: InjectionPoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.kind, InjectionKind::ContextManager);
        assert_eq!(point.line, 12);
        assert_eq!(point.indentation, 0);

        let round = serde_json::to_value(&point).unwrap();
        assert_eq!(round["type"], "context_manager");
    }

    #[test]
    fn test_injection_kind_names() {
        assert_eq!(InjectionKind::Import.as_str(), "import");
        assert_eq!(InjectionKind::ContextManager.as_str(), "context_manager");
    }
}
