//! Error types for the instrumentor core library.

/// Top-level error enum for the instrumentor core library.
#[derive(Debug, thiserror::Error)]
pub enum InstrumentorError {
    /// Malformed or unreadable source. Aborts analysis of the affected
    /// file only; codebase scans skip the file and continue.
    #[error("Parse error in {path} at line {line}, column {column}: {message}")]
    Parse {
        path: String,
        line: usize,
        column: usize,
        message: String,
    },

    /// A requested injection point cannot be applied (e.g. its target
    /// line no longer exists). Aborts the whole batch.
    #[error("Injection error: {0}")]
    Injection(String),

    /// Post-injection re-parse failed. The whole batch is rejected and
    /// the original file is left untouched.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A dependency manifest could not be parsed. The manifest is
    /// skipped; other manifests are still consulted.
    #[error("Manifest error in {path}: {message}")]
    Manifest { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type InstrumentorResult<T> = Result<T, InstrumentorError>;
