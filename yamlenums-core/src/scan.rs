//! Deterministic discovery of the Go source files of one package directory.
//!
//! Only the directory itself is listed (Go packages do not span
//! subdirectories). Files are returned sorted by name so every run reads,
//! and therefore numbers, declarations in the same order.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{YamlenumsError, YamlenumsResult};

/// Whether a file name takes part in a normal package build.
///
/// Test files and names the go tool ignores (leading `_` or `.`) are left out.
#[inline]
pub fn is_package_source(name: &str) -> bool {
    name.ends_with(".go")
        && !name.ends_with("_test.go")
        && !name.starts_with('_')
        && !name.starts_with('.')
}

/// Gathers the package's `.go` files directly inside `dir`, sorted by file name.
pub fn gather_go_files(dir: &Path) -> YamlenumsResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
            YamlenumsError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(is_package_source) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
