//! Filesystem scanning helpers for codebase analysis.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Directories never descended into during a scan.
const SKIP_DIRS: &[&str] = &[
    "venv",
    ".venv",
    "env",
    ".git",
    "__pycache__",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    "site-packages",
    "node_modules",
    ".eggs",
    "test",
    "tests",
];

fn is_skipped_dir(name: &str) -> bool {
    SKIP_DIRS.contains(&name)
}

/// Test files are never counted as framework evidence.
fn is_test_file(name: &str) -> bool {
    name.starts_with("test_") || name.ends_with("_test.py")
}

/// Collect every analyzable `*.py` file under `root`, sorted by path.
///
/// Virtual-env, cache, and test directories are excluded, as are
/// `test_*.py` / `*_test.py` files. Sorting keeps scan output
/// deterministic regardless of filesystem iteration order.
pub fn python_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !(entry.file_type().is_dir() && is_skipped_dir(&name))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "py")
                && !path
                    .file_name()
                    .is_some_and(|name| is_test_file(&name.to_string_lossy()))
        })
        .collect();
    files.sort();
    files
}

/// Simple glob match supporting `*`, `?`, and the `**/` directory
/// wildcard, against `/`-normalized relative paths.
pub fn glob_match(text: &str, pattern: &str) -> bool {
    // `**/` may match zero directories: try with the prefix dropped too.
    if let Some(rest) = pattern.strip_prefix("**/") {
        if glob_match(text, rest) {
            return true;
        }
    }

    let t_chars: Vec<char> = text.chars().collect();
    let p_chars: Vec<char> = pattern.chars().collect();
    let (tl, pl) = (t_chars.len(), p_chars.len());
    let mut dp = vec![vec![false; pl + 1]; tl + 1];
    dp[0][0] = true;
    for j in 1..=pl {
        if p_chars[j - 1] == '*' {
            dp[0][j] = dp[0][j - 1];
        }
    }
    for i in 1..=tl {
        for j in 1..=pl {
            if p_chars[j - 1] == '*' {
                // `**` crosses path separators; single `*` does not.
                let crosses = j >= 2 && p_chars[j - 2] == '*';
                dp[i][j] = dp[i][j - 1]
                    || (dp[i - 1][j] && (crosses || t_chars[i - 1] != '/'));
            } else if p_chars[j - 1] == '?' || t_chars[i - 1] == p_chars[j - 1] {
                dp[i][j] = dp[i - 1][j - 1];
            }
        }
    }
    dp[tl][pl]
}
