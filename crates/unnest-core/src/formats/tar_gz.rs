//! Gzip-compressed tarball handler.

use std::fs;
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;

use crate::detect::ArchiveKind;
use crate::error::ExtractionError;
use crate::error::Result;
use crate::formats::traits::FormatHandler;
use crate::formats::traits::Survey;
use crate::formats::traits::UnpackReport;
use crate::security::safe_member_path;

/// Copy buffer size for member extraction.
const COPY_BUFFER: usize = 64 * 1024; // 64 KB

/// Handler for gzip-compressed tarballs.
#[derive(Debug, Default)]
pub struct TarGzHandler;

/// Maps stream read errors onto the extraction taxonomy.
///
/// Both the gzip layer and the tar layer report structural damage as
/// `InvalidData`, `InvalidInput` or `UnexpectedEof`; anything else is an
/// environmental I/O problem.
fn map_read_error(err: io::Error) -> ExtractionError {
    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof => {
            ExtractionError::Corrupted(err.to_string())
        }
        _ => ExtractionError::Io(err),
    }
}

fn open_archive(path: &Path) -> Result<Archive<GzDecoder<BufReader<File>>>> {
    let file = File::open(path)?;
    Ok(Archive::new(GzDecoder::new(BufReader::new(file))))
}

impl FormatHandler for TarGzHandler {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::TarGz
    }

    fn survey(&self, archive: &Path) -> Result<Survey> {
        let mut tar = open_archive(archive)?;
        let mut survey = Survey::default();

        for entry in tar.entries().map_err(map_read_error)? {
            let entry = entry.map_err(map_read_error)?;
            let entry_type = entry.header().entry_type();
            // Only entries that extraction materializes get their paths
            // vetted; link and special entries are skipped either way.
            if !entry_type.is_file() && !entry_type.is_dir() {
                continue;
            }
            let member = entry.path().map_err(map_read_error)?;
            if survey.unsafe_member.is_none() && safe_member_path(&member).is_err() {
                survey.unsafe_member = Some(member.into_owned());
                continue;
            }
            if entry_type.is_file() {
                survey.file_count += 1;
                survey.total_uncompressed = survey.total_uncompressed.saturating_add(entry.size());
            }
        }

        Ok(survey)
    }

    fn extract(&self, archive: &Path, dest: &Path) -> Result<UnpackReport> {
        let mut tar = open_archive(archive)?;
        let mut report = UnpackReport::new();

        for entry in tar.entries().map_err(map_read_error)? {
            let mut entry = entry.map_err(map_read_error)?;
            let entry_type = entry.header().entry_type();
            let raw = entry.path().map_err(map_read_error)?.into_owned();
            if !entry_type.is_file() && !entry_type.is_dir() {
                tracing::debug!(
                    member = %raw.display(),
                    entry_type = ?entry_type,
                    "skipping non-regular tar entry"
                );
                continue;
            }
            let member = safe_member_path(&raw)?;
            if member.as_os_str().is_empty() {
                continue;
            }
            let out_path = dest.join(&member);

            if entry_type.is_dir() {
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
