use glob::Pattern;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::errors::{ScanError, ScanResult};

/// Checks if a file should be included based on its extension
pub fn has_valid_extension(path: &Path, extensions: &Option<Vec<String>>) -> bool {
    match extensions {
        None => true,
        Some(exts) => path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| exts.iter().any(|e| e.eq_ignore_ascii_case(ext))),
    }
}

/// Checks if a file should be ignored based on glob patterns
pub fn should_ignore(path: &Path, ignore_patterns: &[String]) -> bool {
    let normalized = path.to_string_lossy().replace('\\', "/");
    ignore_patterns.iter().any(|pattern| {
        Pattern::new(pattern)
            .map(|p| p.matches(&normalized))
            .unwrap_or(false)
    })
}

/// Checks if a file is likely to be binary
pub fn is_likely_binary(path: &Path) -> bool {
    const BINARY_EXTENSIONS: &[&str] = &[
        "exe", "dll", "so", "dylib", "bin", "obj", "o", "class", "jar", "png", "jpg", "jpeg",
        "gif", "bmp", "ico", "pdf", "zip", "tar", "gz", "7z", "rar",
    ];

    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            BINARY_EXTENSIONS
                .iter()
                .any(|bin| bin.eq_ignore_ascii_case(ext))
        })
}

/// Determines if a discovered file joins the file list
pub fn should_include_file(
    path: &Path,
    extensions: &Option<Vec<String>>,
    ignore_patterns: &[String],
) -> bool {
    !is_likely_binary(path)
        && has_valid_extension(path, extensions)
        && !should_ignore(path, ignore_patterns)
}

/// Walks `root` and returns the regular files to scan, sorted so partitioning is stable.
///
/// Hidden files and `.gitignore` rules are honoured the way `ignore` applies them by default.
pub fn collect_files(
    root: &Path,
    extensions: &Option<Vec<String>>,
    ignore_patterns: &[String],
) -> ScanResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(ScanError::invalid_argument(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let mut files: Vec<PathBuf> = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| should_include_file(entry.path(), extensions, ignore_patterns))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    Ok(files)
}
