//! Error conversion utilities for CLI.
//!
//! Converts unnest-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use std::path::Path;
use unnest_core::ExtractionError;
use unnest_core::RunAborted;

/// Converts `ExtractionError` to a user-friendly anyhow error with context
pub fn convert_extraction_error(err: ExtractionError, archive: &Path) -> anyhow::Error {
    match err {
        ExtractionError::UnsafePath { member } => {
            anyhow!(
                "Security violation: archive '{}' contains a member escaping the extraction root: '{}'\n\
                 HINT: This archive may be malicious. Do not extract it from an untrusted source.",
                archive.display(),
                member.display()
            )
        }
        ExtractionError::Zipbomb {
            archive_size,
            uncompressed,
            ratio,
            limit,
        } => {
            anyhow!(
                "Security violation: archive '{}' looks like a zipbomb\n\
                 Declared contents: {uncompressed} bytes from a {archive_size} byte archive (ratio {ratio:.1}, limit {limit:.1})\n\
                 HINT: Use --max-ratio to allow higher ratios if the expansion is legitimate.",
                archive.display()
            )
        }
        ExtractionError::PasswordProtected => {
            anyhow!(
                "Archive '{}' is password-protected\n\
                 HINT: Extract it manually; password-protected archives are never attempted.",
                archive.display()
            )
        }
        ExtractionError::Corrupted(reason) => {
            anyhow!(
                "Archive '{}' is corrupted: {reason}\n\
                 HINT: Re-check or re-download the torrent, then run again.",
                archive.display()
            )
        }
        ExtractionError::MaxDepthReached { depth, limit } => {
            anyhow!(
                "Archive '{}' sits at nesting depth {depth}, past the limit of {limit}\n\
                 HINT: Use --max-depth to allow deeper nesting.",
                archive.display()
            )
        }
        ExtractionError::IncompleteDownload { path } => {
            anyhow!(
                "'{}' is still being downloaded\n\
                 HINT: Wait for the torrent to finish, then run again.",
                path.display()
            )
        }
        ExtractionError::UnsupportedType => {
            anyhow!(
                "Archive format not supported: {}\n\
                 HINT: Supported formats: zip, rar, 7z, tar.gz.",
                archive.display()
            )
        }
        ExtractionError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {io_err}",
                archive.display()
            )
        }
    }
}

/// Converts an aborted run into an anyhow error naming the failing archive
pub fn convert_run_aborted(aborted: RunAborted) -> anyhow::Error {
    let RunAborted {
        archive,
        stats,
        source,
    } = aborted;
    convert_extraction_error(source, &archive).context(format!(
        "run aborted after {} archives ({} extracted, {} failed)",
        stats.total_seen(),
        stats.successful,
        stats.failed
    ))
}
