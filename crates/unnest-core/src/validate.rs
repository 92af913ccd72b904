//! Archive validation ahead of extraction.
//!
//! Checks run in a fixed order so the reported reason is always the
//! first gate an archive fails: readable and non-empty, recognized and
//! enabled format, not password-protected, structurally sound, sane
//! extraction ratio, and safe member paths. Validation never writes to
//! the filesystem.

use std::fs;
use std::path::Path;

use crate::config::ExtractionConfig;
use crate::detect::ArchiveKind;
use crate::detect::detect_archive_type;
use crate::detect::is_incomplete_download;
use crate::error::ErrorKind;
use crate::error::ExtractionError;
use crate::error::Result;
use crate::formats::handler_for;
use crate::security::check_extraction_ratio;

/// Outcome of validating one archive.
///
/// Rejections are captured in [`error`](Self::error) rather than
/// returned as `Err`, so callers can inspect the reason and the partial
/// metadata together.
#[derive(Debug)]
pub struct ValidationResult {
    /// Detected format, when detection got that far.
    pub kind: Option<ArchiveKind>,

    /// First check the archive failed, if any.
    pub error: Option<ExtractionError>,

    /// On-disk archive size in bytes.
    pub archive_size: u64,

    /// Number of file members (populated for archives that survey cleanly).
    pub file_count: usize,

    /// Declared uncompressed size of all members in bytes.
    pub total_uncompressed: u64,

    /// Declared uncompressed size divided by the on-disk size.
    pub extraction_ratio: f64,
}

impl ValidationResult {
    /// Returns `true` when every check passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Taxonomy kind of the failed check, if any.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(ExtractionError::kind)
    }

    fn rejected(kind: Option<ArchiveKind>, archive_size: u64, error: ExtractionError) -> Self {
        Self {
            kind,
            error: Some(error),
            archive_size,
            file_count: 0,
            total_uncompressed: 0,
            extraction_ratio: 0.0,
        }
    }
}

/// Validates an archive without extracting anything.
///
/// The archive must exist and be non-empty, carry a recognized and
/// enabled format, open without a password, survey without structural
/// errors, stay under the configured extraction ratio, and contain only
/// member paths that resolve inside the extraction root.
#[must_use]
pub fn validate_archive(archive: &Path, config: &ExtractionConfig) -> ValidationResult {
    let metadata = match fs::metadata(archive) {
        Ok(metadata) => metadata,
        Err(err) => return ValidationResult::rejected(None, 0, ExtractionError::Io(err)),
    };
    let archive_size = metadata.len();
    if archive_size == 0 {
        return ValidationResult::rejected(
            None,
            0,
            ExtractionError::Corrupted("file is empty".to_string()),
        );
    }

    if is_incomplete_download(archive) {
        return ValidationResult::rejected(
            None,
            archive_size,
            ExtractionError::IncompleteDownload {
                path: archive.to_path_buf(),
            },
        );
    }

    let kind = match detect_archive_type(archive) {
        Ok(Some(kind)) => kind,
        Ok(None) => {
            return ValidationResult::rejected(
                None,
                archive_size,
                ExtractionError::UnsupportedType,
            );
        }
        Err(err) => {
            return ValidationResult::rejected(None, archive_size, ExtractionError::Io(err));
        }
    };
    if !config.allows_kind(kind) {
        return ValidationResult::rejected(
            Some(kind),
            archive_size,
            ExtractionError::UnsupportedType,
        );
    }

    // Password protection and corruption both surface from the survey.
    let survey = match handler_for(kind).survey(archive) {
        Ok(survey) => survey,
        Err(err) => return ValidationResult::rejected(Some(kind), archive_size, err),
    };

    let ratio = match check_extraction_ratio(archive_size, survey.total_uncompressed, config) {
        Ok(ratio) => ratio,
        Err(err) => return ValidationResult::rejected(Some(kind), archive_size, err),
    };

    if let Some(member) = survey.unsafe_member {
        return ValidationResult::rejected(
            Some(kind),
            archive_size,
            ExtractionError::UnsafePath { member },
        );
    }

    ValidationResult {
        kind: Some(kind),
        error: None,
        archive_size,
        file_count: survey.file_count,
        total_uncompressed: survey.total_uncompressed,
        extraction_ratio: ratio,
    }
}

/// Gates recursion into an archive found at `depth`.
///
/// Depth 0 is the scan root; an archive at `max_nested_depth` is one
/// level past the last permitted extraction.
///
/// # Errors
///
/// Returns [`ExtractionError::MaxDepthReached`] when `depth` is at or
/// past the configured limit.
pub fn check_nested_depth(depth: usize, config: &ExtractionConfig) -> Result<()> {
    if depth < config.max_nested_depth {
        Ok(())
    } else {
        Err(ExtractionError::MaxDepthReached {
            depth,
            limit: config.max_nested_depth,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, members: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        for (name, data) in members {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let result = validate_archive(&temp.path().join("absent.zip"), &Default::default());
        assert!(!result.is_valid());
        assert_eq!(result.error_kind(), Some(ErrorKind::IoError));
    }

    #[test]
    fn test_empty_file_is_corrupted() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hollow.zip");
        File::create(&path).unwrap();

        let result = validate_archive(&path, &Default::default());
        assert_eq!(result.error_kind(), Some(ErrorKind::Corrupted));
    }

    #[test]
    fn test_incomplete_marker_rejected_before_detection() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("download.zip.!qb");
        write_zip(&path, &[("a.txt", b"fully downloaded, still marked")]);

        let result = validate_archive(&path, &Default::default());
        assert_eq!(result.error_kind(), Some(ErrorKind::IncompleteDownload));
        assert_eq!(result.kind, None);
    }

    #[test]
    fn test_unrecognized_extension_is_unsupported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, "plain text").unwrap();

        let result = validate_archive(&path, &Default::default());
        assert_eq!(result.error_kind(), Some(ErrorKind::UnsupportedType));
    }

    #[test]
    fn test_disabled_extension_is_unsupported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sample.zip");
        write_zip(&path, &[("a.txt", b"hello")]);

        let config = ExtractionConfig {
            supported_extensions: vec![".rar".to_string()],
            ..Default::default()
        };
        let result = validate_archive(&path, &config);
        assert_eq!(result.error_kind(), Some(ErrorKind::UnsupportedType));
        assert_eq!(result.kind, Some(ArchiveKind::Zip));
    }

    #[test]
    fn test_valid_zip_passes_with_metadata() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sample.zip");
        write_zip(&path, &[("a.txt", b"hello"), ("b.txt", b"world")]);

        let result = validate_archive(&path, &Default::default());
        assert!(result.is_valid(), "unexpected error: {:?}", result.error);
        assert_eq!(result.kind, Some(ArchiveKind::Zip));
        assert_eq!(result.file_count, 2);
        assert_eq!(result.total_uncompressed, 10);
        assert!(result.archive_size > 0);
        assert!(result.extraction_ratio > 0.0);
    }

    #[test]
    fn test_garbage_zip_is_corrupted() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mangled.zip");
        fs::write(&path, b"PK\x03\x04 then lies").unwrap();

        let result = validate_archive(&path, &Default::default());
        assert_eq!(result.error_kind(), Some(ErrorKind::Corrupted));
        assert_eq!(result.kind, Some(ArchiveKind::Zip));
    }

    #[test]
    fn test_high_ratio_rejected_as_zipbomb() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bomb.zip");
        let padding = "a".repeat(200_000);
        write_zip(&path, &[("payload.txt", padding.as_bytes())]);

        let config = ExtractionConfig {
            max_extraction_ratio: 2.0,
            ..Default::default()
        };
        let result = validate_archive(&path, &config);
        assert_eq!(result.error_kind(), Some(ErrorKind::Zipbomb));
        let message = result.error.unwrap().to_string();
        assert!(message.contains("zipbomb"));
    }

    #[test]
    fn test_traversal_member_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("evil.zip");
        write_zip(&path, &[("../escape.txt", b"payload")]);

        let result = validate_archive(&path, &Default::default());
        assert_eq!(result.error_kind(), Some(ErrorKind::UnsafePath));
    }

    #[test]
    fn test_depth_gate_boundaries() {
        let config = ExtractionConfig {
            max_nested_depth: 3,
            ..Default::default()
        };
        assert!(check_nested_depth(0, &config).is_ok());
        assert!(check_nested_depth(2, &config).is_ok());

        let err = check_nested_depth(3, &config).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::MaxDepthReached { depth: 3, limit: 3 }
        ));
        assert!(check_nested_depth(4, &config).is_err());
    }
}
