//! Python source parsing on top of tree-sitter.
//!
//! A [`ParsedModule`] owns the source text together with its concrete
//! syntax tree, anchored to byte and line offsets in the original input.
//! Nothing here normalizes whitespace or drops comments: all downstream
//! offset arithmetic depends on exact source fidelity, so rewriting is
//! always performed on the original text, never re-serialized from the
//! tree.

pub mod queries;

use std::path::Path;

use crate::errors::{InstrumentorError, InstrumentorResult};

/// A parsed Python source file.
#[derive(Debug)]
pub struct ParsedModule {
    /// Path label used in error messages; `<memory>` for in-memory input.
    pub path: String,
    /// The unmodified source text.
    pub source: String,
    tree: tree_sitter::Tree,
}

impl ParsedModule {
    /// Root node of the syntax tree.
    pub fn root(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// S-expression rendering of the full tree.
    pub fn to_sexp(&self) -> String {
        self.tree.root_node().to_sexp()
    }

    /// Source text of a node. Falls back to the empty string for nodes
    /// whose byte range is not valid UTF-8 (cannot happen for trees
    /// produced from a `String`, but the API stays total).
    pub fn node_text(&self, node: tree_sitter::Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// The raw source line (0-based index), or `""` past the end.
    pub fn line(&self, row: usize) -> &str {
        self.source.split('\n').nth(row).unwrap_or("")
    }
}

fn python_language() -> tree_sitter::Language {
    tree_sitter_python::LANGUAGE.into()
}

/// Parse Python source text into a [`ParsedModule`].
///
/// Strict: any `ERROR` or missing node in the resulting tree is reported
/// as [`InstrumentorError::Parse`] with the location of the first such
/// node. Never panics, whatever the input bytes.
pub fn parse_source(source: &str, path: &str) -> InstrumentorResult<ParsedModule> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&python_language())
        .map_err(|e| InstrumentorError::Parse {
            path: path.to_string(),
            line: 1,
            column: 0,
            message: format!("failed to load Python grammar: {e}"),
        })?;

    let tree = parser
        .parse(source.as_bytes(), None)
        .ok_or_else(|| InstrumentorError::Parse {
            path: path.to_string(),
            line: 1,
            column: 0,
            message: "tree-sitter produced no tree".to_string(),
        })?;

    if tree.root_node().has_error() {
        let (line, column, message) = first_syntax_error(tree.root_node());
        return Err(InstrumentorError::Parse {
            path: path.to_string(),
            line,
            column,
            message,
        });
    }

    Ok(ParsedModule {
        path: path.to_string(),
        source: source.to_string(),
        tree,
    })
}

/// Read and parse a Python file from disk.
///
/// Unreadable files and invalid UTF-8 are parse errors for that file
/// only; callers scanning a codebase skip the file and continue.
pub fn parse_file(path: &Path) -> InstrumentorResult<ParsedModule> {
    let bytes = std::fs::read(path)?;
    let source = String::from_utf8(bytes).map_err(|e| InstrumentorError::Parse {
        path: path.display().to_string(),
        line: 1,
        column: 0,
        message: format!("file is not valid UTF-8: {e}"),
    })?;
    parse_source(&source, &path.display().to_string())
}

/// Locate the first `ERROR` or missing node, depth-first.
fn first_syntax_error(root: tree_sitter::Node<'_>) -> (usize, usize, String) {
    fn visit(node: tree_sitter::Node<'_>) -> Option<(usize, usize, String)> {
        if node.is_error() {
            let pos = node.start_position();
            return Some((pos.row + 1, pos.column, "invalid syntax".to_string()));
        }
        if node.is_missing() {
            let pos = node.start_position();
            return Some((
                pos.row + 1,
                pos.column,
                format!("missing {}", node.kind()),
            ));
        }
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                if child.has_error() || child.is_missing() {
                    if let Some(found) = visit(child) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    visit(root).unwrap_or((1, 0, "invalid syntax".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_source() {
        let module = parse_source("import os\n\nprint(os.name)\n", "<memory>").unwrap();
        assert_eq!(module.root().kind(), "module");
        assert!(module.to_sexp().contains("import_statement"));
    }

    #[test]
    fn test_parse_preserves_source_verbatim() {
        let src = "# comment\n\"\"\"doc\"\"\"\nx = 1  # trailing\n";
        let module = parse_source(src, "<memory>").unwrap();
        assert_eq!(module.source, src);
    }

    #[test]
    fn test_parse_malformed_reports_location() {
        let err = parse_source("def broken(:\n    pass\n", "bad.py").unwrap_err();
        match err {
            InstrumentorError::Parse { path, line, .. } => {
                assert_eq!(path, "bad.py");
                assert!(line >= 1);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_missing_block_is_error() {
        assert!(parse_source("def f():\n", "<memory>").is_err());
    }

    #[test]
    fn test_parse_arbitrary_text_does_not_panic() {
        // Not Python at all; must come back as an error, not a panic.
        let result = parse_source("%%% { ] ??? \u{0} end", "<memory>");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_empty_source() {
        let module = parse_source("", "<memory>").unwrap();
        assert_eq!(module.root().child_count(), 0);
    }

    #[test]
    fn test_line_accessor() {
        let module = parse_source("a = 1\nb = 2\n", "<memory>").unwrap();
        assert_eq!(module.line(0), "a = 1");
        assert_eq!(module.line(1), "b = 2");
        assert_eq!(module.line(99), "");
    }
}
