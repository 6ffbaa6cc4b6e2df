//! Per-kind injection strategies.
//!
//! Each strategy mutates the working line list for one injection point
//! and reports a human-readable change description, or `None` for an
//! idempotent no-op. Idempotent no-ops are successes, not errors.
//! Conflicts (a target line that does not exist, a callback target with
//! no call on it) are errors and abort the batch.

use crate::errors::{InstrumentorError, InstrumentorResult};
use crate::models::InjectionPoint;

/// One indentation level, matching the generated code's convention.
const INDENT: &str = "    ";

/// How many lines above a function are searched for an existing
/// decorator before inserting a duplicate.
const DECORATOR_LOOKBACK: usize = 5;

/// How many lines below a call's opening line are searched for the
/// closing parenthesis of a multi-line call.
const CALL_LOOKAHEAD: usize = 20;

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Net change in bracket nesting across a line. String contents are not
/// tracked; good enough for deciding statement continuation.
fn bracket_delta(line: &str) -> i32 {
    let mut delta = 0;
    for c in line.chars() {
        match c {
            '(' | '[' | '{' => delta += 1,
            ')' | ']' | '}' => delta -= 1,
            _ => {}
        }
    }
    delta
}

/// 0-based index of the target line, checked against the file length.
fn target_index(lines: &[String], point: &InjectionPoint) -> InstrumentorResult<usize> {
    if point.line == 0 {
        return Err(InstrumentorError::Injection(format!(
            "{} point for `{}` has line 0; lines are 1-based",
            point.kind.as_str(),
            point.target,
        )));
    }
    let index = point.line - 1;
    if index >= lines.len() {
        return Err(InstrumentorError::Injection(format!(
            "{} point for `{}` targets line {}, but the file has only {} lines",
            point.kind.as_str(),
            point.target,
            point.line,
            lines.len(),
        )));
    }
    Ok(index)
}

// ---------------------------------------------------------------------------
// import
// ---------------------------------------------------------------------------

/// Find the end of a module docstring starting at `start`, if one is
/// there. Returns the index of the line *after* the closing delimiter.
fn docstring_end(lines: &[String], start: usize) -> Option<usize> {
    let first = lines.get(start)?.trim();
    let delim = if first.starts_with("\"\"\"") {
        "\"\"\""
    } else if first.starts_with("'''") {
        "'''"
    } else {
        return None;
    };
    // One-line docstring: `"""text"""`.
    if first.len() >= delim.len() * 2 && first[delim.len()..].ends_with(delim) {
        return Some(start + 1);
    }
    for (offset, line) in lines.iter().enumerate().skip(start + 1) {
        if line.trim_end().ends_with(delim) {
            return Some(offset + 1);
        }
    }
    // Unterminated docstring cannot appear in source that parsed.
    Some(lines.len())
}

/// Insert an import after the module docstring and after the last
/// existing top-level import, keeping imports contiguous. Exact-line
/// duplicates are a no-op.
pub fn inject_import(
    lines: &mut Vec<String>,
    point: &InjectionPoint,
) -> InstrumentorResult<Option<String>> {
    let import_line = point.code.trim();
    if lines.iter().any(|line| line.trim() == import_line) {
        return Ok(None);
    }

    // Skip leading blanks and comments (shebang, coding cookie); the
    // import goes after the last leading comment, never before it.
    let mut scan = 0;
    let mut after_comments = 0;
    while scan < lines.len() {
        let stripped = lines[scan].trim();
        if stripped.starts_with('#') {
            scan += 1;
            after_comments = scan;
        } else if stripped.is_empty() {
            scan += 1;
        } else {
            break;
        }
    }

    let mut insert_index = after_comments;
    if let Some(after_docstring) = docstring_end(lines, scan) {
        insert_index = after_docstring;
        scan = after_docstring;
    }

    // Last contiguous run of top-level imports after the docstring.
    let mut found_imports = false;
    while scan < lines.len() {
        let line = &lines[scan];
        let stripped = line.trim();
        let top_level = leading_spaces(line) == 0;
        if top_level && (stripped.starts_with("import ") || stripped.starts_with("from ")) {
            found_imports = true;
            insert_index = scan + 1;
        } else if found_imports && !stripped.is_empty() && !stripped.starts_with('#') {
            break;
        }
        scan += 1;
    }

    lines.insert(insert_index, import_line.to_string());
    Ok(Some(format!("Added import: {import_line}")))
}

// ---------------------------------------------------------------------------
// decorator
// ---------------------------------------------------------------------------

/// Insert a decorator directly above the target function, at the
/// function's own indentation. A matching decorator within the
/// preceding five lines is a no-op.
pub fn inject_decorator(
    lines: &mut Vec<String>,
    point: &InjectionPoint,
) -> InstrumentorResult<Option<String>> {
    let index = target_index(lines, point)?;
    let decorator = point.code.trim();

    let lookback_start = index.saturating_sub(DECORATOR_LOOKBACK);
    if lines[lookback_start..index]
        .iter()
        .any(|line| line.trim() == decorator)
    {
        return Ok(None);
    }

    let indentation = leading_spaces(&lines[index]);
    lines.insert(index, format!("{}{}", " ".repeat(indentation), decorator));
    Ok(Some(format!(
        "Added decorator to {}: {decorator}",
        point.target
    )))
}

// ---------------------------------------------------------------------------
// callback
// ---------------------------------------------------------------------------

/// Add an argument to the call on the target line.
///
/// Multi-line calls get the argument as its own line, with a trailing
/// comma, before the closing-paren line (adding a trailing comma to the
/// preceding argument line if it lacks one). Single-line calls get the
/// argument inserted before the call's closing parenthesis, with a
/// leading comma only when the argument list is non-empty.
pub fn inject_callback(
    lines: &mut Vec<String>,
    point: &InjectionPoint,
) -> InstrumentorResult<Option<String>> {
    let index = target_index(lines, point)?;
    let line = lines[index].clone();

    if !line.contains('(') {
        return Err(InstrumentorError::Injection(format!(
            "callback point for `{}` targets line {}, which has no call",
            point.target, point.line,
        )));
    }

    if bracket_delta(&line) > 0 {
        // Multi-line call: locate the line its closing parenthesis is on.
        let mut depth = bracket_delta(&line);
        let search_end = (index + 1 + CALL_LOOKAHEAD).min(lines.len());
        let mut closing = None;
        for i in index + 1..search_end {
            depth += bracket_delta(&lines[i]);
            if depth <= 0 {
                closing = Some(i);
                break;
            }
        }
        let closing = closing.ok_or_else(|| {
            InstrumentorError::Injection(format!(
                "callback point for `{}`: no closing parenthesis within {} lines of line {}",
                point.target, CALL_LOOKAHEAD, point.line,
            ))
        })?;

        let previous = lines[closing - 1].trim_end().to_string();
        if !previous.ends_with(',') && !previous.ends_with('(') {
            lines[closing - 1] = format!("{previous},");
        }

        let indentation = leading_spaces(&lines[closing]);
        let argument = format!("{}{},", " ".repeat(indentation + INDENT.len()), point.code);
        lines.insert(closing, argument);
    } else {
        let open = line.find('(').unwrap();
        let close = line.rfind(')').filter(|&close| close > open).ok_or_else(|| {
            InstrumentorError::Injection(format!(
                "callback point for `{}` targets line {}, which has no call",
                point.target, point.line,
            ))
        })?;
        let empty_args = line[open + 1..close].trim().is_empty();
        let insertion = if empty_args {
            point.code.clone()
        } else {
            format!(", {}", point.code)
        };
        let mut updated = line;
        updated.insert_str(close, &insertion);
        lines[index] = updated;
    }

    Ok(Some(format!(
        "Added callback parameter to {}",
        point.target
    )))
}

// ---------------------------------------------------------------------------
// wrapper
// ---------------------------------------------------------------------------

/// Insert a wrapper header (e.g. a block opener) above the target line
/// at the target's indentation, and indent the target one level.
pub fn inject_wrapper(
    lines: &mut Vec<String>,
    point: &InjectionPoint,
) -> InstrumentorResult<Option<String>> {
    let index = target_index(lines, point)?;
    let indentation = leading_spaces(&lines[index]);
    let prefix = " ".repeat(indentation);

    lines[index] = format!("{prefix}{INDENT}{}", lines[index].trim_start());

    let wrapper_lines: Vec<String> = point
        .code
        .split('\n')
        .map(|line| format!("{prefix}{line}"))
        .collect();
    for (offset, wrapper_line) in wrapper_lines.into_iter().enumerate() {
        lines.insert(index + offset, wrapper_line);
    }

    Ok(Some(format!(
        "Wrapped {} with instrumentation",
        point.target
    )))
}

// ---------------------------------------------------------------------------
// context_manager
// ---------------------------------------------------------------------------

/// Insert a context-manager opener above the target line and re-indent
/// the target plus its contiguous deeper-indented block one level.
pub fn inject_context_manager(
    lines: &mut Vec<String>,
    point: &InjectionPoint,
) -> InstrumentorResult<Option<String>> {
    let index = target_index(lines, point)?;
    let indentation = leading_spaces(&lines[index]);

    lines.insert(
        index,
        format!("{}{}", " ".repeat(indentation), point.code.trim()),
    );

    // The target sits at index + 1 now; its block runs until indentation
    // returns to the original level. Open brackets keep a multi-line
    // statement inside the block even when a closing line dedents.
    let mut depth = bracket_delta(&lines[index + 1]).max(0);
    let mut end = index + 2;
    while end < lines.len() {
        let line = &lines[end];
        if depth > 0 {
            depth = (depth + bracket_delta(line)).max(0);
            end += 1;
            continue;
        }
        if line.trim().is_empty() {
            end += 1;
            continue;
        }
        if leading_spaces(line) > indentation {
            depth = bracket_delta(line).max(0);
            end += 1;
        } else {
            break;
        }
    }

    for line in &mut lines[index + 1..end] {
        if !line.trim().is_empty() {
            *line = format!("{INDENT}{line}");
        }
    }

    Ok(Some(format!(
        "Wrapped {} with context manager",
        point.target
    )))
}
