//! Common types and traits for archive format handlers.

use std::path::Path;
use std::path::PathBuf;

use crate::detect::ArchiveKind;
use crate::detect::detect_kind;
use crate::detect::is_rar_continuation;
use crate::error::Result;

/// Member-level summary gathered by a listing pass.
///
/// Surveys never touch the destination filesystem; they exist so callers
/// can vet an archive (size ratio, member paths, encryption) before any
/// byte is written.
#[derive(Debug, Clone, Default)]
pub struct Survey {
    /// Number of file members, directories excluded.
    pub file_count: usize,

    /// Declared uncompressed size of all file members in bytes.
    pub total_uncompressed: u64,

    /// First member whose path would escape the extraction root, if any.
    pub unsafe_member: Option<PathBuf>,
}

/// Accounting for one extraction pass.
#[derive(Debug, Clone, Default)]
pub struct UnpackReport {
    /// Number of files written.
    pub files_extracted: usize,

    /// Number of directories created.
    pub directories_created: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Extracted files that are themselves archives, in extraction order.
    pub nested_archives: Vec<PathBuf>,
}

impl UnpackReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one extracted file, flagging it when it is itself an archive.
    ///
    /// Continuation volumes of a split RAR set are not flagged; the first
    /// volume stands in for the whole set.
    pub(crate) fn record_file(&mut self, path: &Path, bytes: u64) {
        self.files_extracted += 1;
        self.bytes_written += bytes;
        if detect_kind(path).is_some() && !is_rar_continuation(path) {
            self.nested_archives.push(path.to_path_buf());
        }
    }

    /// Records one created directory.
    pub(crate) fn record_dir(&mut self) {
        self.directories_created += 1;
    }
}

/// Behavior each supported container format implements.
///
/// Handlers are stateless, so a single instance serves every archive of
/// its format. `survey` makes a metadata-only pass used during validation;
/// `extract` unpacks members beneath `dest`, re-checking each member path
/// before writing regardless of what any earlier survey concluded.
pub trait FormatHandler: Send + Sync {
    /// Format this handler serves.
    fn kind(&self) -> ArchiveKind;

    /// Lists the archive without extracting anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be opened, is structurally
    /// invalid, or requires a password to enumerate.
    fn survey(&self, archive: &Path) -> Result<Survey>;

    /// Extracts every member beneath `dest`.
    ///
    /// Existing files are overwritten. Members that resolve to the
    /// extraction root itself are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if any member fails to decode, carries an unsafe
    /// path, or cannot be written. A failed extraction may leave earlier
    /// members on disk.
    fn extract(&self, archive: &Path, dest: &Path) -> Result<UnpackReport>;
}
