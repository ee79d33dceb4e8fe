//! Finding the files of a multiple-files entry.
//!

use std::path::{self, Component, Path, PathBuf};

use regex::Regex;
use tracing::warn;
use walkdir::WalkDir;

/// Recursively list every file below `root_path` whose full path matches `filter`.
///
/// The paths are absolute and sorted. Entries that can't be read are skipped, a root that
/// doesn't exist yields no files.
pub fn list_files(root_path: &Path, filter: &Regex) -> Vec<PathBuf> {
    let root_path = path::absolute(root_path).unwrap_or_else(|_| root_path.to_path_buf());

    let mut files = Vec::new();
    for entry in WalkDir::new(&root_path).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!("Skipping entry below {root_path:?}: {error}");
                continue;
            }
        };

        // Symlinked folders are not walked, symlinked files are listed.
        if !entry.path().is_file() {
            continue;
        }

        if filter.is_match(&posix_path(entry.path())) {
            files.push(entry.into_path());
        }
    }

    files
}

/// The lowest common ancestor directory of `files`, `None` if there are no files.
///
/// The minimum and maximum paths bound every other path, so only their common ancestor has
/// to be found. Ancestry is checked per component so `/a/b` is not treated as a parent of
/// `/a/bc`.
pub fn archive_root(files: &[PathBuf]) -> Option<PathBuf> {
    let min = files.iter().min()?;
    let max = files.iter().max()?;

    let mut root = min.parent().unwrap_or(min);
    while !max.starts_with(root) {
        match root.parent() {
            Some(parent) => root = parent,
            None => break,
        }
    }

    Some(root.to_path_buf())
}

/// A path with `/` separators, as matched by entry filters and written into archives.
pub fn posix_path(path: &Path) -> String {
    let mut posix = String::new();

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => posix.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::RootDir => posix.push('/'),
            other => {
                if !posix.is_empty() && !posix.ends_with('/') {
                    posix.push('/');
                }
                posix.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }

    posix
}
