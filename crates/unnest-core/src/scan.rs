//! Candidate archive discovery.

use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::config::ExtractionConfig;
use crate::detect::detect_kind;
use crate::detect::is_rar_continuation;

/// Walks `dir` recursively and returns candidate archives.
///
/// A candidate is a regular file whose name matches an enabled archive
/// suffix. Incomplete-download markers never match, and RAR continuation
/// volumes are dropped because extracting the first volume consumes the
/// whole set. Results are sorted by full path so runs are reproducible.
///
/// Unreadable entries are logged and skipped rather than failing the
/// whole scan.
#[must_use]
pub fn find_archives(dir: &Path, config: &ExtractionConfig) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(kind) = detect_kind(path) else {
            continue;
        };
        if !config.allows_kind(kind) {
            continue;
        }
        if is_rar_continuation(path) {
            continue;
        }
        candidates.push(entry.into_path());
    }

    candidates.sort();
    candidates
}
