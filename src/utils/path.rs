//! Path helpers shared by the encode and compile flows.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Collect every file under `dir` whose name ends with `suffix`.
///
/// Results are sorted so runs are deterministic. A missing `dir` yields an
/// empty list.
pub fn collect_files_with_suffix(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name) && name.ends_with(suffix) && name != suffix
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Collect every entry under `dir` (files, directories, links) whose name
/// ends with one of `suffixes`.
///
/// Unlike [`collect_files_with_suffix`] the entry type is not checked here;
/// callers stat the path themselves.
pub fn collect_entries_with_suffixes(dir: &Path, suffixes: &[&str]) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            suffixes.iter().any(|s| name.ends_with(s))
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Normalize a file extension so it carries exactly one leading `.`.
///
/// Returns `None` for blank input.
///
/// ```ignore
/// normalize_ext("hbs")   // Some(".hbs")
/// normalize_ext(".tpl")  // Some(".tpl")
/// normalize_ext("  ")    // None
/// ```
pub fn normalize_ext(ext: &str) -> Option<String> {
    let ext = ext.trim();
    if ext.is_empty() || ext == "." {
        return None;
    }
    if ext.starts_with('.') {
        Some(ext.to_owned())
    } else {
        Some(format!(".{ext}"))
    }
}

/// Replace the trailing `suffix` of `path`'s file name with `replacement`.
pub fn replace_suffix(path: &Path, suffix: &str, replacement: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let stem = name.strip_suffix(suffix).unwrap_or(&name);
    path.with_file_name(format!("{stem}{replacement}"))
}

/// Display `path` relative to `root` with forward slashes, for log lines.
///
/// Paths outside `root` are shown as-is.
pub fn rel_display(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let shown = rel.to_string_lossy().replace('\\', "/");
    shown.trim_start_matches('/').to_owned()
}
