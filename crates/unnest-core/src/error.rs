//! Error types for archive validation and extraction.

use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::report::RunStats;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Categorized reason attached to every skipped or failed archive.
///
/// Each kind carries a fixed disposition: skip kinds are expected
/// conditions the run steps over, failure kinds count against the run
/// and appear in the error list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Extension/signature not recognized as a supported archive.
    UnsupportedType,
    /// File still carries an in-progress download marker.
    IncompleteDownload,
    /// Archive requires a password.
    PasswordProtected,
    /// Structural integrity check failed.
    Corrupted,
    /// Declared contents are disproportionately larger than the archive.
    Zipbomb,
    /// A member name would escape the extraction root.
    UnsafePath,
    /// Nested archive found beyond the recursion limit.
    MaxDepthReached,
    /// OS-level failure while reading or writing.
    IoError,
}

impl ErrorKind {
    /// Stable kebab-case name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnsupportedType => "unsupported-type",
            Self::IncompleteDownload => "incomplete-download",
            Self::PasswordProtected => "password-protected",
            Self::Corrupted => "corrupted",
            Self::Zipbomb => "zipbomb",
            Self::UnsafePath => "unsafe-path",
            Self::MaxDepthReached => "max-depth-reached",
            Self::IoError => "io-error",
        }
    }

    /// Returns `true` for kinds counted as failures.
    ///
    /// The remaining kinds classify the archive as skipped.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(
            self,
            Self::Corrupted | Self::Zipbomb | Self::UnsafePath | Self::IoError
        )
    }

    /// Returns `true` for kinds that skip the archive without failing it.
    #[must_use]
    pub const fn is_skip(self) -> bool {
        !self.is_failure()
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while validating or extracting a single archive.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive format is unsupported or unrecognized.
    #[error("unsupported archive type")]
    UnsupportedType,

    /// File is still being downloaded by the torrent client.
    #[error("incomplete download, not yet an archive: {path}")]
    IncompleteDownload {
        /// The marker-suffixed file.
        path: PathBuf,
    },

    /// Archive headers or members require a password.
    #[error("password-protected archive")]
    PasswordProtected,

    /// Archive is structurally corrupted.
    #[error("corrupted archive: {0}")]
    Corrupted(String),

    /// Declared contents expand disproportionately to the archive size.
    #[error(
        "zipbomb detected: extraction ratio {ratio:.1} exceeds limit {limit:.1} ({uncompressed} bytes declared from a {archive_size} byte archive)"
    )]
    Zipbomb {
        /// On-disk archive size in bytes.
        archive_size: u64,
        /// Sum of declared uncompressed member sizes in bytes.
        uncompressed: u64,
        /// Computed extraction ratio.
        ratio: f64,
        /// Configured ratio ceiling.
        limit: f64,
    },

    /// A member path would resolve outside the extraction root.
    #[error("unsafe path in archive member: {member}")]
    UnsafePath {
        /// The offending member name as stored in the archive.
        member: PathBuf,
    },

    /// Nested archive sits beyond the configured recursion limit.
    #[error("max depth reached: archive at depth {depth}, limit {limit}")]
    MaxDepthReached {
        /// Depth at which the archive was found.
        depth: usize,
        /// Configured depth limit.
        limit: usize,
    },
}

impl ExtractionError {
    /// The taxonomy kind this error classifies as.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::IoError,
            Self::UnsupportedType => ErrorKind::UnsupportedType,
            Self::IncompleteDownload { .. } => ErrorKind::IncompleteDownload,
            Self::PasswordProtected => ErrorKind::PasswordProtected,
            Self::Corrupted(_) => ErrorKind::Corrupted,
            Self::Zipbomb { .. } => ErrorKind::Zipbomb,
            Self::UnsafePath { .. } => ErrorKind::UnsafePath,
            Self::MaxDepthReached { .. } => ErrorKind::MaxDepthReached,
        }
    }

    /// Returns `true` when this error fails the archive rather than
    /// skipping it.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.kind().is_failure()
    }

    /// Returns `true` if this error represents adversarial input rather
    /// than an ordinary bad file.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use unnest_core::ExtractionError;
    ///
    /// let err = ExtractionError::UnsafePath {
    ///     member: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = ExtractionError::UnsupportedType;
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::Zipbomb { .. } | Self::UnsafePath { .. })
    }
}

/// Terminates a run early when `skip_on_error` is disabled.
///
/// Carries the statistics accumulated up to and including the failing
/// archive, so callers still see the partial run.
#[derive(Error, Debug)]
#[error("run aborted at {}: {source}", archive.display())]
pub struct RunAborted {
    /// Archive whose failure stopped the run.
    pub archive: PathBuf,
    /// Statistics accumulated before the abort.
    pub stats: RunStats,
    /// The failure that triggered the abort.
    pub source: ExtractionError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractionError::UnsupportedType;
        assert_eq!(err.to_string(), "unsupported archive type");
    }

    #[test]
    fn test_unsafe_path_error() {
        let err = ExtractionError::UnsafePath {
            member: PathBuf::from("../etc/passwd"),
        };
        assert!(err.to_string().contains("unsafe path"));
        assert!(err.to_string().contains("../etc/passwd"));
        assert!(err.is_security_violation());
    }

    #[test]
    fn test_zipbomb_error_text() {
        let err = ExtractionError::Zipbomb {
            archive_size: 100_000,
            uncompressed: 500_000_000,
            ratio: 5000.0,
            limit: 100.0,
        };
        let display = err.to_string();
        assert!(display.contains("zipbomb"));
        assert!(display.contains("5000.0"));
        assert!(display.contains("100.0"));
        assert!(err.is_security_violation());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ExtractionError = io_err.into();
        assert!(matches!(err, ExtractionError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::IoError);
    }

    #[test]
    fn test_kind_mapping() {
        let err = ExtractionError::PasswordProtected;
        assert_eq!(err.kind(), ErrorKind::PasswordProtected);

        let err = ExtractionError::Corrupted("bad header".to_string());
        assert_eq!(err.kind(), ErrorKind::Corrupted);

        let err = ExtractionError::IncompleteDownload {
            path: PathBuf::from("movie.zip.!qb"),
        };
        assert_eq!(err.kind(), ErrorKind::IncompleteDownload);

        let err = ExtractionError::MaxDepthReached { depth: 3, limit: 3 };
        assert_eq!(err.kind(), ErrorKind::MaxDepthReached);
    }

    #[test]
    fn test_dispositions() {
        // Failures
        assert!(ErrorKind::Corrupted.is_failure());
        assert!(ErrorKind::Zipbomb.is_failure());
        assert!(ErrorKind::UnsafePath.is_failure());
        assert!(ErrorKind::IoError.is_failure());

        // Skips
        assert!(ErrorKind::UnsupportedType.is_skip());
        assert!(ErrorKind::IncompleteDownload.is_skip());
        assert!(ErrorKind::PasswordProtected.is_skip());
        assert!(ErrorKind::MaxDepthReached.is_skip());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::Zipbomb.as_str(), "zipbomb");
        assert_eq!(ErrorKind::MaxDepthReached.as_str(), "max-depth-reached");
        assert_eq!(ErrorKind::PasswordProtected.to_string(), "password-protected");
    }

    #[test]
    fn test_run_aborted_display() {
        let aborted = RunAborted {
            archive: PathBuf::from("/downloads/bad.zip"),
            stats: RunStats::default(),
            source: ExtractionError::Corrupted("truncated central directory".to_string()),
        };
        let display = aborted.to_string();
        assert!(display.contains("/downloads/bad.zip"));
        assert!(display.contains("truncated central directory"));
    }

    #[test]
    fn test_run_aborted_source_chain() {
        use std::error::Error;

        let aborted = RunAborted {
            archive: PathBuf::from("a.zip"),
            stats: RunStats::default(),
            source: ExtractionError::PasswordProtected,
        };
        assert!(aborted.source().is_some());
    }
}
