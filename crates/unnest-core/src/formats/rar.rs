//! RAR archive format handler.
//!
//! Listing and extraction are separate passes over the archive because
//! the unrar cursor is consumed as it advances. Multi-volume sets are
//! handled by the library itself when the first volume is opened; the
//! extractor never opens continuation volumes directly.

use std::fs;
use std::io;
use std::path::Path;

use unrar::Archive;
use unrar::error::Code;
use unrar::error::UnrarError;

use crate::detect::ArchiveKind;
use crate::error::ExtractionError;
use crate::error::Result;
use crate::formats::traits::FormatHandler;
use crate::formats::traits::Survey;
use crate::formats::traits::UnpackReport;
use crate::security::safe_member_path;

/// Handler for RAR containers.
#[derive(Debug, Default)]
pub struct RarHandler;

/// Maps unrar library errors onto the extraction taxonomy.
fn map_unrar_error(err: UnrarError) -> ExtractionError {
    match err.code {
        Code::MissingPassword | Code::BadPassword => ExtractionError::PasswordProtected,
        Code::EOpen | Code::ECreate | Code::EClose | Code::ERead | Code::EWrite
        | Code::NoMemory => ExtractionError::Io(io::Error::other(err.to_string())),
        _ => ExtractionError::Corrupted(err.to_string()),
    }
}

impl FormatHandler for RarHandler {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::Rar
    }

    fn survey(&self, archive: &Path) -> Result<Survey> {
        let listing = Archive::new(archive)
            .open_for_listing()
            .map_err(map_unrar_error)?;

        let mut survey = Survey::default();
        for header in listing {
            let entry = header.map_err(map_unrar_error)?;
            // Header-encrypted sets already failed the open above; this
            // catches sets that only encrypt member data.
            if entry.is_encrypted() {
                return Err(ExtractionError::PasswordProtected);
            }
            if survey.unsafe_member.is_none() && safe_member_path(&entry.filename).is_err() {
                survey.unsafe_member = Some(entry.filename.clone());
                continue;
            }
            if entry.is_file() {
                survey.file_count += 1;
                survey.total_uncompressed = survey
                    .total_uncompressed
                    .saturating_add(u64::try_from(entry.unpacked_size).unwrap_or(u64::MAX));
            }
        }

        Ok(survey)
    }

    fn extract(&self, archive: &Path, dest: &Path) -> Result<UnpackReport> {
        let mut report = UnpackReport::new();
        let mut cursor = Archive::new(archive)
            .open_for_processing()
            .map_err(map_unrar_error)?;

        while let Some(header) = cursor.read_header().map_err(map_unrar_error)? {
            let (filename, is_dir, is_encrypted, unpacked_size) = {
                let entry = header.entry();
                (
                    entry.filename.clone(),
                    entry.is_directory(),
                    entry.is_encrypted(),
                    u64::try_from(entry.unpacked_size).unwrap_or(u64::MAX),
                )
            };
            if is_encrypted {
                return Err(ExtractionError::PasswordProtected);
            }
            let member = safe_member_path(&filename)?;
            if member.as_os_str().is_empty() {
                cursor = header.skip().map_err(map_unrar_error)?;
                continue;
            }
            let out_path = dest.join(&member);

            cursor = if is_dir {
                fs::create_dir_all(&out_path)?;
                report.record_dir();
                header.skip().map_err(map_unrar_error)?
            } else {
                if let Some(parent) = out_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let next = header.extract_to(&out_path).map_err(map_unrar_error)?;
                report.record_file(&out_path, unpacked_size);
                next
            };
        }

        Ok(report)
    }
}
