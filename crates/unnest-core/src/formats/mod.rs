//! Archive format implementations.

pub mod rar;
pub mod sevenz;
pub mod tar_gz;
pub mod traits;
pub mod zip;

pub use rar::RarHandler;
pub use sevenz::SevenZipHandler;
pub use tar_gz::TarGzHandler;
pub use traits::FormatHandler;
pub use traits::Survey;
pub use traits::UnpackReport;
pub use zip::ZipHandler;

use crate::detect::ArchiveKind;

/// Returns the handler for a detected format.
///
/// The format set is closed, so dispatch is a total match with no
/// fallback arm.
#[must_use]
pub fn handler_for(kind: ArchiveKind) -> &'static dyn FormatHandler {
    match kind {
        ArchiveKind::Zip => &ZipHandler,
        ArchiveKind::Rar => &RarHandler,
        ArchiveKind::SevenZip => &SevenZipHandler,
        ArchiveKind::TarGz => &TarGzHandler,
    }
}
