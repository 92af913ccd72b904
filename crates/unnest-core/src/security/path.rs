//! Member path validation.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionError;
use crate::Result;

/// Normalizes an archive member name and proves it stays inside the
/// extraction root.
///
/// Absolute and drive-rooted names are rejected outright. `.` components
/// drop out, and `..` pops a previously accepted component; a member is
/// rejected the moment it would climb past the root. The returned path
/// is the relative location to create under the target directory.
///
/// Names that normalize to nothing (`"."`, `"a/.."`) come back as an
/// empty path; they denote the root itself and callers create nothing
/// for them.
///
/// # Errors
///
/// Returns [`ExtractionError::UnsafePath`] naming the member when the
/// name is absolute or escapes the root.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use std::path::PathBuf;
/// use unnest_core::security::safe_member_path;
///
/// let safe = safe_member_path(Path::new("season1/./episode.mkv")).unwrap();
/// assert_eq!(safe, PathBuf::from("season1/episode.mkv"));
///
/// assert!(safe_member_path(Path::new("../../etc/passwd")).is_err());
/// assert!(safe_member_path(Path::new("/etc/passwd")).is_err());
/// ```
pub fn safe_member_path(member: &Path) -> Result<PathBuf> {
    let mut resolved = PathBuf::new();
    let mut depth: usize = 0;

    for component in member.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(ExtractionError::UnsafePath {
                    member: member.to_path_buf(),
                });
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(ExtractionError::UnsafePath {
                        member: member.to_path_buf(),
                    });
                }
                resolved.pop();
                depth -= 1;
            }
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
        }
    }

    Ok(resolved)
}
