//! Flat tool-call façade over the engine.
//!
//! Every operation is a total function: it returns a serializable
//! response with `success` and, on failure, `error`. It never panics
//! and never propagates an error to the caller. This uniform shape is
//! the contract consumed by the external reasoning process that drives
//! the engine.

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::detector::{self, signatures::SignatureRegistry};
use crate::injector::Injector;
use crate::manifest;
use crate::models::{
    CallInfo, ClassInfo, FrameworkInfo, FunctionInfo, ImportInfo, InjectionPoint, PackageVersion,
};
use crate::parser::{self, queries};

/// Entry point for all tool operations.
///
/// Owns the signature registry and the injector's per-path locks;
/// construct one at process start and share it by reference.
pub struct ToolEngine {
    signatures: SignatureRegistry,
    injector: Injector,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ParseFileResponse {
    pub success: bool,
    pub file_path: String,
    pub source: Option<String>,
    /// S-expression rendering of the syntax tree.
    pub tree: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FindImportsResponse {
    pub success: bool,
    pub imports: Vec<ImportInfo>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FindFunctionsResponse {
    pub success: bool,
    pub functions: Vec<FunctionInfo>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FindClassesResponse {
    pub success: bool,
    pub classes: Vec<ClassInfo>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FindCallsResponse {
    pub success: bool,
    pub calls: Vec<CallInfo>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DetectFrameworksResponse {
    pub success: bool,
    pub frameworks: Vec<FrameworkInfo>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FrameworkDetailsResponse {
    pub success: bool,
    pub framework: Option<FrameworkInfo>,
    pub found: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PackageVersionsResponse {
    pub success: bool,
    pub packages: IndexMap<String, PackageVersion>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FrameworkVersionResponse {
    pub success: bool,
    pub framework: String,
    pub version: Option<String>,
    pub found: bool,
    pub constraint: Option<String>,
    pub source: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InjectResponse {
    pub success: bool,
    pub modified_source: Option<String>,
    pub changes: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WriteFileResponse {
    pub success: bool,
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl ToolEngine {
    pub fn new() -> Self {
        Self {
            signatures: SignatureRegistry::builtin(),
            injector: Injector::new(),
        }
    }

    pub fn with_signatures(signatures: SignatureRegistry) -> Self {
        Self {
            signatures,
            injector: Injector::new(),
        }
    }

    /// Parse a Python file and return its source and syntax tree.
    pub fn parse_python_file(&self, file_path: &str) -> ParseFileResponse {
        match parser::parse_file(Path::new(file_path)) {
            Ok(module) => ParseFileResponse {
                success: true,
                file_path: file_path.to_string(),
                tree: Some(module.to_sexp()),
                source: Some(module.source),
                error: None,
            },
            Err(e) => ParseFileResponse {
                success: false,
                file_path: file_path.to_string(),
                source: None,
                tree: None,
                error: Some(e.to_string()),
            },
        }
    }

    /// Find all import statements in a Python file.
    pub fn find_imports(&self, file_path: &str) -> FindImportsResponse {
        match parser::parse_file(Path::new(file_path)) {
            Ok(module) => FindImportsResponse {
                success: true,
                imports: queries::find_imports(&module),
                error: None,
            },
            Err(e) => FindImportsResponse {
                success: false,
                imports: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }

    /// Find all function definitions in a Python file.
    pub fn find_function_definitions(&self, file_path: &str) -> FindFunctionsResponse {
        match parser::parse_file(Path::new(file_path)) {
            Ok(module) => FindFunctionsResponse {
                success: true,
                functions: queries::find_function_definitions(&module),
                error: None,
            },
            Err(e) => FindFunctionsResponse {
                success: false,
                functions: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }

    /// Find all class definitions in a Python file.
    pub fn find_class_definitions(&self, file_path: &str) -> FindClassesResponse {
        match parser::parse_file(Path::new(file_path)) {
            Ok(module) => FindClassesResponse {
                success: true,
                classes: queries::find_class_definitions(&module),
                error: None,
            },
            Err(e) => FindClassesResponse {
                success: false,
                classes: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }

    /// Find calls whose callee contains `pattern` in a Python file.
    pub fn find_function_calls(&self, file_path: &str, pattern: &str) -> FindCallsResponse {
        match parser::parse_file(Path::new(file_path)) {
            Ok(module) => FindCallsResponse {
                success: true,
                calls: queries::find_function_calls(&module, pattern),
                error: None,
            },
            Err(e) => FindCallsResponse {
                success: false,
                calls: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }

    /// Detect agent frameworks used in a codebase.
    pub fn detect_frameworks(&self, codebase_path: &str) -> DetectFrameworksResponse {
        DetectFrameworksResponse {
            success: true,
            frameworks: detector::detect_frameworks(Path::new(codebase_path), &self.signatures),
            error: None,
        }
    }

    /// Look up one detected framework by name.
    pub fn get_framework_details(
        &self,
        codebase_path: &str,
        framework_name: &str,
    ) -> FrameworkDetailsResponse {
        let framework = detector::get_framework_details(
            Path::new(codebase_path),
            framework_name,
            &self.signatures,
        );
        FrameworkDetailsResponse {
            success: true,
            found: framework.is_some(),
            framework,
            error: None,
        }
    }

    /// Extract declared package versions from the codebase's manifests.
    pub fn extract_package_versions(&self, codebase_path: &str) -> PackageVersionsResponse {
        PackageVersionsResponse {
            success: true,
            packages: manifest::extract_package_versions(Path::new(codebase_path)),
            error: None,
        }
    }

    /// Resolve the declared version of one framework package.
    pub fn get_framework_version(
        &self,
        codebase_path: &str,
        framework_name: &str,
    ) -> FrameworkVersionResponse {
        match manifest::get_package_version(Path::new(codebase_path), framework_name) {
            Some(pkg) => FrameworkVersionResponse {
                success: true,
                framework: framework_name.to_lowercase(),
                version: Some(pkg.version),
                found: true,
                constraint: Some(pkg.constraint),
                source: Some(pkg.source),
                error: None,
            },
            None => FrameworkVersionResponse {
                success: true,
                framework: framework_name.to_lowercase(),
                version: None,
                found: false,
                constraint: None,
                source: None,
                error: None,
            },
        }
    }

    /// Apply a batch of injection points to a file. The file itself is
    /// never modified by this operation.
    pub fn inject_instrumentation_code(
        &self,
        file_path: &str,
        injection_points: &[InjectionPoint],
        validate: bool,
    ) -> InjectResponse {
        match self
            .injector
            .inject_file(Path::new(file_path), injection_points, validate)
        {
            Ok(result) => InjectResponse {
                success: true,
                modified_source: Some(result.modified_source),
                changes: result.changes,
                error: None,
            },
            Err(e) => InjectResponse {
                success: false,
                modified_source: None,
                changes: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }

    /// Write instrumented source back to a file.
    pub fn write_instrumented_file(&self, file_path: &str, modified_source: &str) -> WriteFileResponse {
        match self.injector.write_file(Path::new(file_path), modified_source) {
            Ok(()) => WriteFileResponse {
                success: true,
                error: None,
            },
            Err(e) => WriteFileResponse {
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

impl Default for ToolEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InjectionKind;

    fn write(dir: &Path, rel: &str, content: &str) -> String {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_parse_python_file_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "app.py", "import os\n");
        let engine = ToolEngine::new();
        let response = engine.parse_python_file(&path);
        assert!(response.success);
        assert_eq!(response.source.as_deref(), Some("import os\n"));
        assert!(response.tree.unwrap().contains("import_statement"));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_parse_python_file_missing_is_flat_error() {
        let engine = ToolEngine::new();
        let response = engine.parse_python_file("/nonexistent/app.py");
        assert!(!response.success);
        assert!(response.source.is_none());
        assert!(response.error.is_some());
    }

    #[test]
    fn test_query_operations_share_flat_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "app.py",
            "from crewai import Agent\n\n\ndef build():\n    return Agent(role=\"dev\")\n",
        );
        let engine = ToolEngine::new();

        let imports = engine.find_imports(&path);
        assert!(imports.success);
        assert_eq!(imports.imports[0].module, "crewai");

        let functions = engine.find_function_definitions(&path);
        assert_eq!(functions.functions[0].name, "build");

        let calls = engine.find_function_calls(&path, "Agent");
        assert_eq!(calls.calls.len(), 1);

        let classes = engine.find_class_definitions(&path);
        assert!(classes.success);
        assert!(classes.classes.is_empty());
    }

    #[test]
    fn test_detect_and_details_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "requirements.txt", "crewai==0.80.0\n");
        write(
            dir.path(),
            "app.py",
            "from crewai import Agent\n\nagent = Agent(role=\"dev\")\n",
        );
        let engine = ToolEngine::new();
        let codebase = dir.path().to_string_lossy();

        let detected = engine.detect_frameworks(&codebase);
        assert!(detected.success);
        assert!(detected.frameworks.iter().any(|f| f.name == "crewai"));

        let details = engine.get_framework_details(&codebase, "crewai");
        assert!(details.found);
        assert_eq!(details.framework.unwrap().version, "0.80.0");

        let missing = engine.get_framework_details(&codebase, "langgraph");
        assert!(missing.success);
        assert!(!missing.found);

        let version = engine.get_framework_version(&codebase, "crewai");
        assert_eq!(version.version.as_deref(), Some("0.80.0"));
        assert_eq!(version.constraint.as_deref(), Some("=="));

        let packages = engine.extract_package_versions(&codebase);
        assert!(packages.packages.contains_key("crewai"));
    }

    #[test]
    fn test_inject_and_write_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "app.py", "x = run()\n");
        let engine = ToolEngine::new();

        let points = vec![InjectionPoint {
            kind: InjectionKind::Import,
            line: 1,
            target: String::new(),
            code: "import os".to_string(),
            indentation: 0,
        }];
        let injected = engine.inject_instrumentation_code(&path, &points, true);
        assert!(injected.success);
        assert_eq!(injected.changes.len(), 1);
        // Nothing written yet.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x = run()\n");

        let written =
            engine.write_instrumented_file(&path, injected.modified_source.as_ref().unwrap());
        assert!(written.success);
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("import os"));
    }

    #[test]
    fn test_inject_failure_is_flat_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "app.py", "x = 1\n");
        let engine = ToolEngine::new();
        let points = vec![InjectionPoint {
            kind: InjectionKind::Decorator,
            line: 99,
            target: "missing".to_string(),
            code: "@observe()".to_string(),
            indentation: 0,
        }];
        let response = engine.inject_instrumentation_code(&path, &points, true);
        assert!(!response.success);
        assert!(response.modified_source.is_none());
        assert!(response.error.unwrap().contains("line 99"));
    }

    #[test]
    fn test_responses_serialize_to_flat_json() {
        let engine = ToolEngine::new();
        let response = engine.parse_python_file("/nonexistent/app.py");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["error"].is_string());
    }
}
