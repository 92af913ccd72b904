//! Configuration for one extraction run.

use crate::detect::ArchiveKind;

/// Run configuration with safe defaults.
///
/// Built once before a run (typically by an external settings layer that
/// merges defaults, a config file, environment variables, and CLI flags)
/// and read-only thereafter. Range validation happens in that settings
/// layer; this type trusts its values.
///
/// # Examples
///
/// ```
/// use unnest_core::ExtractionConfig;
///
/// // Safe defaults
/// let config = ExtractionConfig::default();
///
/// // Customize for a specific run
/// let custom = ExtractionConfig {
///     max_nested_depth: 2,
///     preserve_originals: false,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Ceiling on total declared uncompressed bytes divided by the
    /// on-disk archive size. Archives above it are rejected as zipbombs.
    pub max_extraction_ratio: f64,

    /// Maximum nesting depth for archives found inside archives.
    /// Top-level archives sit at depth 0.
    pub max_nested_depth: usize,

    /// Recognized archive suffixes, matched case-insensitively against
    /// file names.
    pub supported_extensions: Vec<String>,

    /// Keep source archives on disk after successful extraction.
    /// Leaving this on supports continued seeding.
    pub preserve_originals: bool,

    /// Continue with remaining archives after one fails. When off, the
    /// first failure aborts the run.
    pub skip_on_error: bool,
}

impl Default for ExtractionConfig {
    /// Creates an `ExtractionConfig` with safe defaults.
    ///
    /// Default values:
    /// - `max_extraction_ratio`: 100.0
    /// - `max_nested_depth`: 3
    /// - `supported_extensions`: `.zip .rar .7z .tar.gz .tgz`
    /// - `preserve_originals`: true
    /// - `skip_on_error`: true
    fn default() -> Self {
        Self {
            max_extraction_ratio: 100.0,
            max_nested_depth: 3,
            supported_extensions: vec![
                ".zip".to_string(),
                ".rar".to_string(),
                ".7z".to_string(),
                ".tar.gz".to_string(),
                ".tgz".to_string(),
            ],
            preserve_originals: true,
            skip_on_error: true,
        }
    }
}

impl ExtractionConfig {
    /// Returns `true` if `extension` is in the supported set.
    ///
    /// Comparison is case-insensitive; `extension` includes the leading
    /// dot (`".zip"`).
    #[must_use]
    pub fn is_extension_enabled(&self, extension: &str) -> bool {
        self.supported_extensions
            .iter()
            .any(|enabled| enabled.eq_ignore_ascii_case(extension))
    }

    /// Returns `true` if any of the format's extensions is enabled.
    ///
    /// RAR volume names (`.r00`, `.part2.rar`) count under `.rar`.
    #[must_use]
    pub fn allows_kind(&self, kind: ArchiveKind) -> bool {
        kind.extensions()
            .iter()
            .any(|ext| self.is_extension_enabled(ext))
    }
}
