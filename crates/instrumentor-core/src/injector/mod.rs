//! Batch application of injection points to Python source.
//!
//! Points are stably sorted by target line in descending order before
//! being applied, so inserting lines for a later point never shifts the
//! line numbers an earlier (higher-line) point still refers to. Points
//! targeting the same line keep their input order.
//!
//! When validation is requested, the rewritten source is re-parsed and
//! any syntax error rejects the whole batch; nothing is ever written by
//! `inject` itself.

pub mod strategies;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::{InstrumentorError, InstrumentorResult};
use crate::models::{InjectionKind, InjectionPoint};
use crate::parser;

/// Result of a successful injection batch.
#[derive(Clone, Debug)]
pub struct InjectionResult {
    /// The rewritten source text.
    pub modified_source: String,
    /// Human-readable descriptions of the changes made; idempotent
    /// no-ops are not listed.
    pub changes: Vec<String>,
}

/// Apply a batch of injection points to source text.
///
/// Pure with respect to the filesystem. Returns an error if any point
/// conflicts (no point is ever silently dropped) or, when `validate` is
/// set, if the rewritten source no longer parses.
pub fn inject_source(
    source: &str,
    points: &[InjectionPoint],
    validate: bool,
) -> InstrumentorResult<InjectionResult> {
    let mut lines: Vec<String> = source.split('\n').map(str::to_string).collect();

    // Descending by line; stable, so same-line points keep input order.
    let mut ordered: Vec<&InjectionPoint> = points.iter().collect();
    ordered.sort_by(|a, b| b.line.cmp(&a.line));

    let mut changes = Vec::new();
    for point in ordered {
        let change = match point.kind {
            InjectionKind::Import => strategies::inject_import(&mut lines, point)?,
            InjectionKind::Decorator => strategies::inject_decorator(&mut lines, point)?,
            InjectionKind::Callback => strategies::inject_callback(&mut lines, point)?,
            InjectionKind::Wrapper => strategies::inject_wrapper(&mut lines, point)?,
            InjectionKind::ContextManager => {
                strategies::inject_context_manager(&mut lines, point)?
            }
        };
        if let Some(change) = change {
            changes.push(change);
        }
    }

    let modified_source = lines.join("\n");

    if validate {
        parser::parse_source(&modified_source, "<rewritten>").map_err(|e| {
            InstrumentorError::Validation(format!("post-injection source does not parse: {e}"))
        })?;
    }

    Ok(InjectionResult {
        modified_source,
        changes,
    })
}

/// Applies injection batches to files, one writer per path.
///
/// Concurrent requests for the same path serialize on a per-path lock;
/// requests for different paths proceed in parallel. The injector never
/// writes during `inject_file`; `write_file` is the only write path.
pub struct Injector {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl Injector {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Read a file and apply an injection batch to it. The file itself
    /// is left untouched, whatever the outcome.
    pub fn inject_file(
        &self,
        path: &Path,
        points: &[InjectionPoint],
        validate: bool,
    ) -> InstrumentorResult<InjectionResult> {
        let lock = self.lock_for(path);
        let _guard = lock.lock();
        let source = std::fs::read_to_string(path)?;
        inject_source(&source, points, validate)
    }

    /// Write instrumented source back to a file.
    pub fn write_file(&self, path: &Path, source: &str) -> InstrumentorResult<()> {
        let lock = self.lock_for(path);
        let _guard = lock.lock();
        std::fs::write(path, source)?;
        Ok(())
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}
