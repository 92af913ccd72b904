//! 7-Zip archive format handler.
//!
//! Metadata comes from an up-front header read; extraction goes through
//! the callback API so every member path can be re-checked before any
//! write. Encryption is recognized by error text because the library
//! reports missing passwords through its generic error type.
//!
//! Archives that only encrypt member data (not headers) survey cleanly
//! and are caught at extraction time instead.

use std::cell::RefCell;
use std::fs;
use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use sevenz_rust2::Archive;
use sevenz_rust2::Password;

use crate::detect::ArchiveKind;
use crate::error::ExtractionError;
use crate::error::Result;
use crate::formats::traits::FormatHandler;
use crate::formats::traits::Survey;
use crate::formats::traits::UnpackReport;
use crate::security::safe_member_path;

/// Copy buffer size for member extraction.
const COPY_BUFFER: usize = 64 * 1024; // 64 KB

/// Handler for 7-Zip containers.
#[derive(Debug, Default)]
pub struct SevenZipHandler;

/// Maps sevenz-rust2 errors onto the extraction taxonomy.
fn map_sevenz_error(err: &sevenz_rust2::Error) -> ExtractionError {
    let text = err.to_string();
    let lower = text.to_ascii_lowercase();
    if lower.contains("password") || lower.contains("encrypt") {
        ExtractionError::PasswordProtected
    } else {
        ExtractionError::Corrupted(text)
    }
}

/// What [`unpack_entry`] did with one member.
#[derive(Debug)]
enum Unpacked {
    /// Created a directory.
    Dir,
    /// Wrote a file of `bytes` length at `path`.
    File { path: PathBuf, bytes: u64 },
    /// Member resolved to the extraction root; nothing to do.
    Root,
}

fn unpack_entry(
    entry: &sevenz_rust2::ArchiveEntry,
    reader: &mut dyn Read,
    dest: &Path,
) -> Result<Unpacked> {
    let member = safe_member_path(Path::new(&entry.name))?;
    if member.as_os_str().is_empty() {
        return Ok(Unpacked::Root);
    }
    let out_path = dest.join(&member);

    if entry.is_directory() {
        fs::create_dir_all(&out_path)?;
        return Ok(Unpacked::Dir);
    }

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::with_capacity(COPY_BUFFER, File::create(&out_path)?);
    let bytes = io::copy(reader, &mut writer)?;
    writer.flush()?;
    Ok(Unpacked::File {
        path: out_path,
        bytes,
    })
}

impl FormatHandler for SevenZipHandler {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::SevenZip
    }

    fn survey(&self, archive: &Path) -> Result<Survey> {
        let mut file = File::open(archive)?;
        let meta =
            Archive::read(&mut file, &Password::empty()).map_err(|err| map_sevenz_error(&err))?;

        let mut survey = Survey::default();
        for entry in &meta.files {
            let member = Path::new(&entry.name);
            if survey.unsafe_member.is_none() && safe_member_path(member).is_err() {
                survey.unsafe_member = Some(member.to_path_buf());
                continue;
            }
            if entry.is_directory() {
                continue;
            }
            survey.file_count += 1;
            survey.total_uncompressed = survey.total_uncompressed.saturating_add(entry.size);
        }

        Ok(survey)
    }

    fn extract(&self, archive: &Path, dest: &Path) -> Result<UnpackReport> {
        let file = File::open(archive)?;
        // RefCell for interior mutability in the callback. A failure
        // stored here keeps its classification instead of being
        // flattened into the library's error type.
        let report = RefCell::new(UnpackReport::new());
        let failure: RefCell<Option<ExtractionError>> = RefCell::new(None);

        let extract_fn = |entry: &sevenz_rust2::ArchiveEntry,
                          reader: &mut dyn Read,
                          _out: &PathBuf|
         -> std::result::Result<bool, sevenz_rust2::Error> {
            match unpack_entry(entry, reader, dest) {
                Ok(Unpacked::Dir) => {
                    report.borrow_mut().record_dir();
                    Ok(true)
                }
                Ok(Unpacked::File { path, bytes }) => {
                    report.borrow_mut().record_file(&path, bytes);
                    Ok(true)
                }
                Ok(Unpacked::Root) => Ok(true),
                Err(err) => {
                    *failure.borrow_mut() = Some(err);
                    Ok(false)
                }
            }
        };

        let result = sevenz_rust2::decompress_with_extract_fn(file, dest, extract_fn);
        if let Some(err) = failure.into_inner() {
            return Err(err);
        }
        result.map_err(|err| map_sevenz_error(&err))?;

        Ok(report.into_inner())
    }
}
