//! Package version extraction from Python dependency manifests.
//!
//! Scans a codebase root for `requirements.txt`, `pyproject.toml`, and
//! `setup.py`, in that priority order. A package resolved from a
//! higher-priority manifest is never overwritten by a lower-priority
//! one. A malformed manifest is skipped with a warning; the remaining
//! manifests are still consulted.

use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::warn;

use crate::errors::{InstrumentorError, InstrumentorResult};
use crate::models::PackageVersion;

/// `name(op)version` with `op ∈ {==, >=, ~=, <=, !=, >, <}`.
static SPEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._\-]*)\s*(==|>=|~=|<=|!=|>|<)\s*([0-9][^\s,;#]*)")
        .unwrap()
});

/// Bare package name with no version constraint.
static BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._\-]*)\s*$").unwrap());

/// `install_requires=[...]` / `requires=[...]` list literal in setup.py.
static SETUP_REQUIRES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:install_requires|requires)\s*=\s*\[(.*?)\]").unwrap()
});

/// Quoted dependency spec inside a setup.py list literal.
static SETUP_SPEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']([A-Za-z0-9][A-Za-z0-9._\-]*)\s*(==|>=|~=|<=|!=|>|<)?\s*([0-9][^"']*)?["']"#)
        .unwrap()
});

/// Parse one PEP 508-like dependency spec into a [`PackageVersion`].
fn parse_spec(spec: &str, manifest: &str) -> Option<PackageVersion> {
    let trimmed = spec.trim();
    if let Some(caps) = SPEC_RE.captures(trimmed) {
        return Some(PackageVersion {
            name: caps[1].to_string(),
            version: caps[3].trim().to_string(),
            source: manifest.to_string(),
            constraint: caps[2].to_string(),
        });
    }
    if let Some(caps) = BARE_RE.captures(trimmed) {
        return Some(PackageVersion {
            name: caps[1].to_string(),
            version: "*".to_string(),
            source: manifest.to_string(),
            constraint: String::new(),
        });
    }
    None
}

/// Parse a `requirements.txt` file.
fn parse_requirements_txt(path: &Path) -> InstrumentorResult<Vec<PackageVersion>> {
    let content = std::fs::read_to_string(path)?;
    let mut packages = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(pkg) = parse_spec(line, "requirements.txt") {
            packages.push(pkg);
        }
    }
    Ok(packages)
}

/// Parse `project.dependencies` from a `pyproject.toml` file.
fn parse_pyproject_toml(path: &Path) -> InstrumentorResult<Vec<PackageVersion>> {
    let content = std::fs::read_to_string(path)?;
    let value: toml::Value =
        content
            .parse()
            .map_err(|e: toml::de::Error| InstrumentorError::Manifest {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

    let mut packages = Vec::new();
    let dependencies = value
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array());
    if let Some(dependencies) = dependencies {
        for dep in dependencies {
            if let Some(spec) = dep.as_str() {
                if let Some(pkg) = parse_spec(spec, "pyproject.toml") {
                    packages.push(pkg);
                }
            }
        }
    }
    Ok(packages)
}

/// Best-effort regex extraction from a `setup.py` file.
///
/// Only `install_requires=[...]` / `requires=[...]` list literals are
/// recognized; anything computed at setup time is invisible to this
/// parser.
fn parse_setup_py(path: &Path) -> InstrumentorResult<Vec<PackageVersion>> {
    let content = std::fs::read_to_string(path)?;
    let mut packages = Vec::new();
    if let Some(caps) = SETUP_REQUIRES_RE.captures(&content) {
        for spec in SETUP_SPEC_RE.captures_iter(&caps[1]) {
            let version = spec
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "*".to_string());
            packages.push(PackageVersion {
                name: spec[1].to_string(),
                version,
                source: "setup.py".to_string(),
                constraint: spec.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
            });
        }
    }
    Ok(packages)
}

/// Extract declared package versions from the codebase's manifests.
///
/// Returns a map keyed by lower-cased package name. The first manifest
/// to mention a package wins: `requirements.txt` over `pyproject.toml`
/// over `setup.py`.
pub fn extract_package_versions(codebase: &Path) -> IndexMap<String, PackageVersion> {
    type ManifestParser = fn(&Path) -> InstrumentorResult<Vec<PackageVersion>>;
    const MANIFESTS: &[(&str, ManifestParser)] = &[
        ("requirements.txt", parse_requirements_txt),
        ("pyproject.toml", parse_pyproject_toml),
        ("setup.py", parse_setup_py),
    ];

    let mut packages: IndexMap<String, PackageVersion> = IndexMap::new();
    for (file_name, parse) in MANIFESTS {
        let path = codebase.join(file_name);
        if !path.exists() {
            continue;
        }
        match parse(&path) {
            Ok(found) => {
                for pkg in found {
                    packages.entry(pkg.name.to_lowercase()).or_insert(pkg);
                }
            }
            Err(e) => {
                warn!(manifest = %path.display(), error = %e, "skipping unparseable manifest");
            }
        }
    }
    packages
}

/// Resolve the declared version of one package (lower-cased lookup).
pub fn get_package_version(codebase: &Path, package: &str) -> Option<PackageVersion> {
    extract_package_versions(codebase)
        .get(&package.to_lowercase())
        .cloned()
}
