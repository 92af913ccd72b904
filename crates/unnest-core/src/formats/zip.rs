//! ZIP archive format handler.

use std::fs;
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use zip::ZipArchive;
use zip::result::ZipError;

use crate::detect::ArchiveKind;
use crate::error::ExtractionError;
use crate::error::Result;
use crate::formats::traits::FormatHandler;
use crate::formats::traits::Survey;
use crate::formats::traits::UnpackReport;

/// Copy buffer size for member extraction.
const COPY_BUFFER: usize = 64 * 1024; // 64 KB

/// Handler for ZIP containers.
#[derive(Debug, Default)]
pub struct ZipHandler;

/// Maps zip crate errors onto the extraction taxonomy.
///
/// Encrypted members are caught by checking the entry flag up front;
/// this mapping additionally recognizes the crate's password errors by
/// message text because they surface through its unsupported-archive
/// variant rather than a dedicated one.
fn map_zip_error(err: ZipError) -> ExtractionError {
    match err {
        ZipError::Io(err) => ExtractionError::Io(err),
        other => {
            let text = other.to_string();
            if text.to_ascii_lowercase().contains("password") {
                ExtractionError::PasswordProtected
            } else {
                ExtractionError::Corrupted(text)
            }
        }
    }
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path)?;
    ZipArchive::new(BufReader::new(file)).map_err(map_zip_error)
}

impl FormatHandler for ZipHandler {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::Zip
    }

    fn survey(&self, archive: &Path) -> Result<Survey> {
        let mut zip = open_archive(archive)?;
        let mut survey = Survey::default();

        for index in 0..zip.len() {
            let entry = zip.by_index(index).map_err(map_zip_error)?;
            if entry.encrypted() {
                return Err(ExtractionError::PasswordProtected);
            }
            if survey.unsafe_member.is_none() && entry.enclosed_name().is_none() {
                survey.unsafe_member = Some(PathBuf::from(entry.name()));
            }
            if entry.is_dir() {
                continue;
            }
            survey.file_count += 1;
            survey.total_uncompressed = survey.total_uncompressed.saturating_add(entry.size());
        }

        Ok(survey)
    }

    fn extract(&self, archive: &Path, dest: &Path) -> Result<UnpackReport> {
        let mut zip = open_archive(archive)?;
        let mut report = UnpackReport::new();

        for index in 0..zip.len() {
            let mut entry = zip.by_index(index).map_err(map_zip_error)?;
            if entry.encrypted() {
                return Err(ExtractionError::PasswordProtected);
            }
            let Some(member) = entry.enclosed_name() else {
                return Err(ExtractionError::UnsafePath {
                    member: PathBuf::from(entry.name()),
                });
            };
            if member.as_os_str().is_empty() {
                continue;
            }
            let out_path = dest.join(&member);

            if entry.is_dir() {
                fs::create_dir_all(&out_path)?;
                report.record_dir();
                continue;
            }

            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut writer = BufWriter::with_capacity(COPY_BUFFER, File::create(&out_path)?);
            let written = io::copy(&mut entry, &mut writer)?;
            writer.flush()?;
            report.record_file(&out_path, written);
        }

        Ok(report)
    }
}
