//! Validated extraction target directory.

use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionError;
use crate::Result;

/// A directory members may be written into.
///
/// Constructing a `TargetDir` proves the path exists, is a directory, is
/// writable, and is held in canonical absolute form. With sibling
/// extraction this is the directory the archive itself lives in.
///
/// Canonicalizing up front narrows the window between checking a path
/// and using it; member paths are additionally validated against the
/// canonical root at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDir(PathBuf);

impl TargetDir {
    /// Validates `path` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist, is not a directory,
    /// cannot be canonicalized, or is not writable (Unix).
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(ExtractionError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("target directory does not exist: {}", path.display()),
            )));
        }
        if !path.is_dir() {
            return Err(ExtractionError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("target path is not a directory: {}", path.display()),
            )));
        }

        let canonical = path.canonicalize().map_err(|err| {
            ExtractionError::Io(std::io::Error::new(
                err.kind(),
                format!("failed to canonicalize {}: {err}", path.display()),
            ))
        })?;

        #[cfg(unix)]
        {
            use std::ffi::CString;
            use std::os::unix::ffi::OsStrExt;

            let c_path = CString::new(canonical.as_os_str().as_bytes()).map_err(|_| {
                ExtractionError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path contains null byte",
                ))
            })?;

            // SAFETY: access() only reads the C string for the duration
            // of the call and returns immediately.
            #[allow(unsafe_code)]
            let rc = unsafe { libc::access(c_path.as_ptr(), libc::W_OK) };

            if rc != 0 {
                return Err(ExtractionError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("target directory is not writable: {}", canonical.display()),
                )));
            }
        }

        Ok(Self(canonical))
    }

    /// Returns the canonical directory path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins an already-validated relative path under the root.
    #[inline]
    #[must_use]
    pub fn join_path(&self, relative: &Path) -> PathBuf {
        self.0.join(relative)
    }

    /// Validates a raw member name and joins it under the root.
    ///
    /// Combines [`super::safe_member_path`] with the join; the second
    /// enforcement point format handlers use during extraction.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::UnsafePath`] when the member name
    /// escapes the root.
    pub fn join_member(&self, member: &Path) -> Result<PathBuf> {
        let relative = super::safe_member_path(member)?;
        Ok(self.0.join(relative))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_target_dir_valid() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let target = TargetDir::new(temp.path()).expect("target should validate");
        assert!(target.as_path().is_absolute());
    }

    #[test]
    fn test_target_dir_nonexistent() {
        let result = TargetDir::new("/nonexistent/path/for/extraction");
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn test_target_dir_not_a_directory() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let file_path = temp.path().join("file.txt");
        fs::write(&file_path, "x").expect("failed to write file");

        let result = TargetDir::new(file_path);
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn test_target_dir_canonicalizes() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let subdir = temp.path().join("sub");
        fs::create_dir(&subdir).expect("failed to create subdir");

        let dotted = subdir.join(".").join("..");
        let target = TargetDir::new(dotted).expect("target should validate");
        assert_eq!(target.as_path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    #[cfg(unix)]
    fn test_target_dir_unwritable_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("failed to create temp dir");
        let readonly = temp.path().join("readonly");
        fs::create_dir(&readonly).expect("failed to create dir");

        let mut perms = fs::metadata(&readonly).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly, perms).unwrap();

        let result = TargetDir::new(&readonly);

        let mut perms = fs::metadata(&readonly).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly, perms).unwrap();

        assert!(result.is_err());
    }

    #[test]
    fn test_join_member_safe() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let target = TargetDir::new(temp.path()).unwrap();

        let joined = target.join_member(Path::new("a/b.txt")).unwrap();
        assert!(joined.starts_with(target.as_path()));
        assert!(joined.ends_with("a/b.txt"));
    }

    #[test]
    fn test_join_member_rejects_escape() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let target = TargetDir::new(temp.path()).unwrap();

        assert!(target.join_member(Path::new("../outside.txt")).is_err());
        assert!(target.join_member(Path::new("/etc/passwd")).is_err());
    }
}
