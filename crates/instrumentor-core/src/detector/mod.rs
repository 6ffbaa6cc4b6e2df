//! Agent-framework detection over a codebase.
//!
//! Each Python file is scanned independently (a rayon parallel map);
//! per-file evidence is then merged by a single-threaded, ordered reduce
//! into one [`FrameworkInfo`] per detected framework. A file that fails
//! to parse is logged and skipped; the scan continues.

pub mod filesystem;
pub mod signatures;

use std::collections::BTreeSet;
use std::path::Path;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::debug;

use crate::manifest;
use crate::models::FrameworkInfo;
use crate::parser::{self, queries};
use signatures::{FrameworkSignature, SignatureRegistry};

/// Evidence one file contributes to one framework.
struct FrameworkHit {
    framework: String,
    confidence: f64,
    /// True when a framework class is actually instantiated here.
    entry_point: bool,
    agent_classes: Vec<String>,
}

/// All framework evidence found in one file.
struct FileEvidence {
    path: String,
    hits: Vec<FrameworkHit>,
}

/// Score one file against one signature.
///
/// `+0.5` if any import module contains an import pattern, `+0.3` if any
/// class pattern appears as a callee, `+0.2` if any function pattern
/// appears as a callee; capped at 1.0.
fn score_file(
    signature: &FrameworkSignature,
    import_modules: &[&str],
    callees: &[&str],
) -> Option<FrameworkHit> {
    let mut confidence: f64 = 0.0;

    if signature
        .import_patterns
        .iter()
        .any(|pattern| import_modules.iter().any(|module| module.contains(pattern)))
    {
        confidence += 0.5;
    }

    let agent_classes: Vec<String> = signature
        .class_patterns
        .iter()
        .filter(|pattern| callees.iter().any(|callee| callee.contains(*pattern)))
        .map(|pattern| pattern.to_string())
        .collect();
    if !agent_classes.is_empty() {
        confidence += 0.3;
    }

    if signature
        .function_patterns
        .iter()
        .any(|pattern| callees.iter().any(|callee| callee.contains(pattern)))
    {
        confidence += 0.2;
    }

    if confidence <= 0.0 {
        return None;
    }
    Some(FrameworkHit {
        framework: signature.name.to_string(),
        confidence: confidence.min(1.0),
        entry_point: !agent_classes.is_empty(),
        agent_classes,
    })
}

/// Parse one file and collect its evidence for every registered
/// signature. `None` if the file cannot be parsed.
fn scan_file(path: &Path, registry: &SignatureRegistry) -> Option<FileEvidence> {
    let module = match parser::parse_file(path) {
        Ok(module) => module,
        Err(e) => {
            debug!(file = %path.display(), error = %e, "skipping unparseable file");
            return None;
        }
    };

    let imports = queries::find_imports(&module);
    let import_modules: Vec<&str> = imports.iter().map(|i| i.module.as_str()).collect();
    let calls = queries::find_function_calls(&module, "");
    let callees: Vec<&str> = calls.iter().map(|c| c.function_name.as_str()).collect();

    let hits: Vec<FrameworkHit> = registry
        .iter()
        .filter_map(|signature| score_file(signature, &import_modules, &callees))
        .collect();

    if hits.is_empty() {
        return None;
    }
    Some(FileEvidence {
        path: path.display().to_string(),
        hits,
    })
}

/// Match a framework name against manifest package names, tolerating
/// hyphen/underscore differences (`pydantic-ai` vs `pydantic_ai`).
fn resolve_version(framework: &str, packages: &IndexMap<String, crate::models::PackageVersion>) -> String {
    let underscored = framework.replace('-', "_");
    let collapsed = framework.replace('-', "");
    for (name, pkg) in packages {
        if name.contains(&underscored) || name.contains(&collapsed) {
            return pkg.version.clone();
        }
    }
    "*".to_string()
}

/// Detect agent frameworks used in a codebase.
///
/// The per-file scans run in parallel; the merge below is the only
/// serialized step. Per-codebase confidence is the maximum per-file
/// confidence, so it never decreases as evidence accumulates.
pub fn detect_frameworks(codebase: &Path, registry: &SignatureRegistry) -> Vec<FrameworkInfo> {
    let files = filesystem::python_files(codebase);
    let packages = manifest::extract_package_versions(codebase);

    // Parallel map: one independent scan per file, order preserved.
    let evidence: Vec<FileEvidence> = files
        .par_iter()
        .filter_map(|path| scan_file(path, registry))
        .collect();

    // Ordered serial reduce into the shared framework map.
    let mut detected: IndexMap<String, FrameworkInfo> = IndexMap::new();
    for file in evidence {
        for hit in file.hits {
            let info = detected
                .entry(hit.framework.clone())
                .or_insert_with(|| FrameworkInfo {
                    name: hit.framework.clone(),
                    version: resolve_version(&hit.framework, &packages),
                    files: BTreeSet::new(),
                    entry_points: BTreeSet::new(),
                    agent_classes: BTreeSet::new(),
                    confidence: 0.0,
                });
            info.files.insert(file.path.clone());
            if hit.entry_point {
                info.entry_points.insert(file.path.clone());
            }
            info.agent_classes.extend(hit.agent_classes);
            info.confidence = info.confidence.max(hit.confidence).min(1.0);
        }
    }

    detected.into_values().collect()
}

/// Detail lookup for a single framework by name.
pub fn get_framework_details(
    codebase: &Path,
    framework_name: &str,
    registry: &SignatureRegistry,
) -> Option<FrameworkInfo> {
    detect_frameworks(codebase, registry)
        .into_iter()
        .find(|fw| fw.name == framework_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_detect_langchain_with_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "app.py",
            "from langchain_openai import ChatOpenAI\n\nllm = ChatOpenAI(model=\"gpt-4\")\n",
        );
        let registry = SignatureRegistry::builtin();
        let frameworks = detect_frameworks(dir.path(), &registry);

        let langchain = frameworks.iter().find(|f| f.name == "langchain").unwrap();
        assert!(langchain.confidence >= 0.8);
        assert_eq!(langchain.version, "*");
        assert!(langchain
            .entry_points
            .iter()
            .any(|p| p.ends_with("app.py")));
        assert!(langchain.agent_classes.contains("ChatOpenAI"));
    }

    #[test]
    fn test_confidence_bounds() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "graph.py",
            "import langgraph\nfrom langgraph.graph import StateGraph\n\ngraph = StateGraph(dict)\ngraph.add_node(\"a\", run)\ngraph.add_edge(\"a\", \"b\")\napp = graph.compile()\n",
        );
        let registry = SignatureRegistry::builtin();
        for framework in detect_frameworks(dir.path(), &registry) {
            assert!(framework.confidence >= 0.0 && framework.confidence <= 1.0);
        }
    }

    #[test]
    fn test_import_only_is_half_confidence_no_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lazy.py", "import crewai\n");
        let registry = SignatureRegistry::builtin();
        let frameworks = detect_frameworks(dir.path(), &registry);
        let crewai = frameworks.iter().find(|f| f.name == "crewai").unwrap();
        assert!((crewai.confidence - 0.5).abs() < 1e-9);
        assert!(crewai.entry_points.is_empty());
    }

    #[test]
    fn test_version_resolution_from_requirements() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "requirements.txt", "pydantic_ai==0.0.14\n");
        write(
            dir.path(),
            "agent.py",
            "from pydantic_ai import Agent\n\nagent = Agent(\"openai:gpt-4o\")\n",
        );
        let registry = SignatureRegistry::builtin();
        let pydantic = get_framework_details(dir.path(), "pydantic-ai", &registry).unwrap();
        assert_eq!(pydantic.version, "0.0.14");
    }

    #[test]
    fn test_test_and_venv_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "venv/pkg.py", "import crewai\ncrew = Crew()\n");
        write(dir.path(), "tests/test_app.py", "import crewai\n");
        let registry = SignatureRegistry::builtin();
        assert!(detect_frameworks(dir.path(), &registry).is_empty());
    }

    #[test]
    fn test_unparseable_file_does_not_abort_scan() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.py", "def broken(:\n");
        write(dir.path(), "ok.py", "import autogen\n");
        let registry = SignatureRegistry::builtin();
        let frameworks = detect_frameworks(dir.path(), &registry);
        assert!(frameworks.iter().any(|f| f.name == "autogen"));
    }

    #[test]
    fn test_confidence_is_max_across_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.py", "import crewai\n");
        write(
            dir.path(),
            "b.py",
            "import crewai\n\ncrew = Crew(agents=[])\n",
        );
        let registry = SignatureRegistry::builtin();
        let frameworks = detect_frameworks(dir.path(), &registry);
        let crewai = frameworks.iter().find(|f| f.name == "crewai").unwrap();
        assert!((crewai.confidence - 0.8).abs() < 1e-9);
        assert_eq!(crewai.files.len(), 2);
        assert_eq!(crewai.entry_points.len(), 1);
    }

    #[test]
    fn test_details_for_missing_framework() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "app.py", "print(\"hello\")\n");
        let registry = SignatureRegistry::builtin();
        assert!(get_framework_details(dir.path(), "langchain", &registry).is_none());
    }
}
