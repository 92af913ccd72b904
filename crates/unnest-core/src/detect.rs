//! Archive format detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

/// ZIP local file header signature (`PK\x03\x04`).
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Signature of a ZIP holding only an end-of-central-directory record.
const ZIP_EMPTY_MAGIC: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

/// RAR signature prefix shared by the v4 and v5 formats (`Rar!\x1a\x07`).
const RAR_MAGIC: [u8; 6] = [0x52, 0x61, 0x72, 0x21, 0x1A, 0x07];

/// 7z signature (`7z\xbc\xaf\x27\x1c`).
const SEVENZ_MAGIC: [u8; 6] = [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C];

/// Gzip member header signature.
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Suffixes torrent clients append to files still being downloaded.
const INCOMPLETE_SUFFIXES: [&str; 2] = [".!qb", ".part"];

/// Supported archive container formats.
///
/// The set is closed: the extractor dispatches over exactly these four
/// and treats everything else as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchiveKind {
    /// ZIP container.
    #[serde(rename = "zip")]
    Zip,
    /// RAR container, including multi-volume sets.
    #[serde(rename = "rar")]
    Rar,
    /// 7-Zip container.
    #[serde(rename = "7z")]
    SevenZip,
    /// Gzip-compressed tarball.
    #[serde(rename = "tar.gz")]
    TarGz,
}

impl ArchiveKind {
    /// Canonical lowercase name (`"zip"`, `"rar"`, `"7z"`, `"tar.gz"`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Rar => "rar",
            Self::SevenZip => "7z",
            Self::TarGz => "tar.gz",
        }
    }

    /// File suffixes classified as this format.
    #[must_use]
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Zip => &[".zip"],
            Self::Rar => &[".rar"],
            Self::SevenZip => &[".7z"],
            Self::TarGz => &[".tar.gz", ".tgz"],
        }
    }
}

impl std::fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercased file name, or `None` for names that are not valid Unicode.
fn lowercase_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_ascii_lowercase)
}

/// True for `.rNN`-style continuation names (`movie.r00`, `movie.r01`).
fn is_rar_volume_name(name: &str) -> bool {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return false;
    };
    ext.len() >= 3
        && ext.starts_with('r')
        && ext.as_bytes()[1..].iter().all(u8::is_ascii_digit)
}

/// Volume number of a `<stem>.partN.rar` name, if it matches.
fn rar_part_number(name: &str) -> Option<u32> {
    let stem = name.strip_suffix(".rar")?;
    let (_, last) = stem.rsplit_once('.')?;
    let digits = last.strip_prefix("part")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Classifies a file by its name alone.
///
/// Recognizes the four supported formats including RAR split-volume
/// naming (`.r00`, `.part2.rar`). Incomplete-download markers are never
/// classified as archives. Returns `None` for everything else; callers
/// that also want signature sniffing use [`detect_archive_type`].
#[must_use]
pub fn detect_kind(path: &Path) -> Option<ArchiveKind> {
    let name = lowercase_name(path)?;
    if is_incomplete_name(&name) {
        return None;
    }
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        return Some(ArchiveKind::TarGz);
    }
    if name.ends_with(".zip") {
        return Some(ArchiveKind::Zip);
    }
    if name.ends_with(".7z") {
        return Some(ArchiveKind::SevenZip);
    }
    if name.ends_with(".rar") || is_rar_volume_name(&name) {
        return Some(ArchiveKind::Rar);
    }
    None
}

fn is_incomplete_name(name: &str) -> bool {
    INCOMPLETE_SUFFIXES
        .iter()
        .any(|suffix| name.ends_with(suffix))
}

/// Returns `true` when the file name carries an in-progress download
/// marker (for example `movie.zip.!qb`).
#[must_use]
pub fn is_incomplete_download(path: &Path) -> bool {
    lowercase_name(path).is_some_and(|name| is_incomplete_name(&name))
}

/// Returns `true` for non-first volumes of a multi-volume RAR set.
///
/// Extracting the first volume consumes the whole set, so continuation
/// volumes are excluded from candidate discovery.
#[must_use]
pub fn is_rar_continuation(path: &Path) -> bool {
    let Some(name) = lowercase_name(path) else {
        return false;
    };
    if is_rar_volume_name(&name) {
        return true;
    }
    matches!(rar_part_number(&name), Some(part) if part > 1)
}

/// Sniffs the leading bytes of a file for a known container signature.
///
/// A gzip signature is reported as [`ArchiveKind::TarGz`]; bare gzip
/// files fail later structural validation instead.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn sniff_kind(path: &Path) -> std::io::Result<Option<ArchiveKind>> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 6];
    let read = file.read(&mut magic)?;

    if read >= SEVENZ_MAGIC.len() && magic == SEVENZ_MAGIC {
        return Ok(Some(ArchiveKind::SevenZip));
    }
    if read >= RAR_MAGIC.len() && magic[..RAR_MAGIC.len()] == RAR_MAGIC {
        return Ok(Some(ArchiveKind::Rar));
    }
    if read >= ZIP_MAGIC.len()
        && (magic[..ZIP_MAGIC.len()] == ZIP_MAGIC || magic[..ZIP_EMPTY_MAGIC.len()] == ZIP_EMPTY_MAGIC)
    {
        return Ok(Some(ArchiveKind::Zip));
    }
    if read >= GZIP_MAGIC.len() && magic[..GZIP_MAGIC.len()] == GZIP_MAGIC {
        return Ok(Some(ArchiveKind::TarGz));
    }
    Ok(None)
}

/// Full detection: extension first, signature sniff for names without a
/// recognized suffix. Incomplete-download markers are never archives.
///
/// # Errors
///
/// Returns an error if the extension is inconclusive and the file cannot
/// be read for sniffing.
pub fn detect_archive_type(path: &Path) -> std::io::Result<Option<ArchiveKind>> {
    if is_incomplete_download(path) {
        return Ok(None);
    }
    if let Some(kind) = detect_kind(path) {
        return Ok(Some(kind));
    }
    sniff_kind(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(detect_kind(Path::new("a.zip")), Some(ArchiveKind::Zip));
        assert_eq!(detect_kind(Path::new("a.rar")), Some(ArchiveKind::Rar));
        assert_eq!(detect_kind(Path::new("a.7z")), Some(ArchiveKind::SevenZip));
        assert_eq!(detect_kind(Path::new("a.tar.gz")), Some(ArchiveKind::TarGz));
        assert_eq!(detect_kind(Path::new("a.tgz")), Some(ArchiveKind::TarGz));
        assert_eq!(detect_kind(Path::new("a.txt")), None);
        assert_eq!(detect_kind(Path::new("archive")), None);
    }

    #[test]
    fn test_detect_case_insensitive() {
        assert_eq!(detect_kind(Path::new("A.ZIP")), Some(ArchiveKind::Zip));
        assert_eq!(detect_kind(Path::new("a.Tar.GZ")), Some(ArchiveKind::TarGz));
        assert_eq!(detect_kind(Path::new("a.RAR")), Some(ArchiveKind::Rar));
    }

    #[test]
    fn test_detect_rar_volumes() {
        assert_eq!(detect_kind(Path::new("m.r00")), Some(ArchiveKind::Rar));
        assert_eq!(detect_kind(Path::new("m.r42")), Some(ArchiveKind::Rar));
        assert_eq!(
            detect_kind(Path::new("m.part1.rar")),
            Some(ArchiveKind::Rar)
        );
        assert_eq!(
            detect_kind(Path::new("m.part12.rar")),
            Some(ArchiveKind::Rar)
        );
        // Not volume patterns
        assert_eq!(detect_kind(Path::new("m.raw")), None);
        assert_eq!(detect_kind(Path::new("m.r0x")), None);
    }

    #[test]
    fn test_rar_continuation() {
        assert!(is_rar_continuation(Path::new("m.r00")));
        assert!(is_rar_continuation(Path::new("m.r01")));
        assert!(is_rar_continuation(Path::new("m.part2.rar")));
        assert!(is_rar_continuation(Path::new("m.PART3.RAR")));
        // First volumes and plain archives are not continuations
        assert!(!is_rar_continuation(Path::new("m.rar")));
        assert!(!is_rar_continuation(Path::new("m.part1.rar")));
        assert!(!is_rar_continuation(Path::new("m.zip")));
    }

    #[test]
    fn test_incomplete_markers() {
        assert!(is_incomplete_download(Path::new("download.zip.!qb")));
        assert!(is_incomplete_download(Path::new("download.zip.!QB")));
        assert!(is_incomplete_download(Path::new("download.rar.part")));
        assert!(!is_incomplete_download(Path::new("download.zip")));
        // partN.rar volumes are archives, not markers
        assert!(!is_incomplete_download(Path::new("m.part1.rar")));
    }

    #[test]
    fn test_incomplete_marker_never_detected_as_archive() {
        assert_eq!(detect_kind(Path::new("download.zip.!qb")), None);
        assert_eq!(
            detect_archive_type(Path::new("download.zip.!qb")).unwrap(),
            None
        );
    }

    #[test]
    fn test_sniff_magic_bytes() {
        let dir = tempfile::tempdir().unwrap();

        let zip_path = dir.path().join("noext");
        std::fs::File::create(&zip_path)
            .unwrap()
            .write_all(&[0x50, 0x4B, 0x03, 0x04, 0x14, 0x00])
            .unwrap();
        assert_eq!(sniff_kind(&zip_path).unwrap(), Some(ArchiveKind::Zip));

        let sevenz_path = dir.path().join("blob");
        std::fs::File::create(&sevenz_path)
            .unwrap()
            .write_all(&SEVENZ_MAGIC)
            .unwrap();
        assert_eq!(
            sniff_kind(&sevenz_path).unwrap(),
            Some(ArchiveKind::SevenZip)
        );

        let rar_path = dir.path().join("rarblob");
        std::fs::File::create(&rar_path)
            .unwrap()
            .write_all(b"Rar!\x1a\x07\x00")
            .unwrap();
        assert_eq!(sniff_kind(&rar_path).unwrap(), Some(ArchiveKind::Rar));

        let text_path = dir.path().join("text");
        std::fs::write(&text_path, "hello world").unwrap();
        assert_eq!(sniff_kind(&text_path).unwrap(), None);

        let short_path = dir.path().join("short");
        std::fs::write(&short_path, "P").unwrap();
        assert_eq!(sniff_kind(&short_path).unwrap(), None);
    }

    #[test]
    fn test_detect_archive_type_sniffs_extensionless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&[0x1F, 0x8B, 0x08, 0x00])
            .unwrap();
        assert_eq!(
            detect_archive_type(&path).unwrap(),
            Some(ArchiveKind::TarGz)
        );
    }

    #[test]
    fn test_kind_names_and_extensions() {
        assert_eq!(ArchiveKind::SevenZip.name(), "7z");
        assert_eq!(ArchiveKind::TarGz.to_string(), "tar.gz");
        assert_eq!(ArchiveKind::TarGz.extensions(), &[".tar.gz", ".tgz"]);
        assert_eq!(ArchiveKind::Zip.extensions(), &[".zip"]);
    }
}
