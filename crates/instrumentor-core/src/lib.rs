//! Instrumentor core library: framework detection and source
//! instrumentation for Python agent codebases.
//!
//! This crate parses Python source into tree-sitter syntax trees, runs
//! structural queries over them, classifies agent frameworks with
//! confidence scores, resolves declared package versions from
//! dependency manifests, and rewrites source text at precise
//! line-accurate locations with a re-parse validation gate. The
//! reasoning process that decides *what* to instrument is an external
//! collaborator; it drives the engine through the flat tool-call
//! surface in [`tools`].

pub mod config;
pub mod detector;
pub mod errors;
pub mod injector;
pub mod manifest;
pub mod models;
pub mod parser;
pub mod platforms;
pub mod tools;

pub use errors::{InstrumentorError, InstrumentorResult};
pub use models::{
    CallInfo, ClassInfo, FrameworkInfo, FunctionInfo, ImportInfo, InjectionKind, InjectionPoint,
    PackageVersion,
};
pub use tools::ToolEngine;
