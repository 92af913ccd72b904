//! Safe recursive extraction of archives left behind by completed
//! downloads.
//!
//! `unnest-core` walks a download directory, validates every archive it
//! finds (recognized format, password protection, structural integrity,
//! extraction ratio, member path safety), extracts each one into the
//! directory it lives in, and recurses into archives discovered among
//! the extracted files up to a configurable depth. Bad archives are
//! classified and stepped over so one broken download never stalls the
//! rest of the run.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use unnest_core::ExtractionConfig;
//! use unnest_core::Extractor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut extractor = Extractor::new(ExtractionConfig::default());
//! let stats = extractor.extract_all(Path::new("/downloads/complete"))?;
//! println!(
//!     "{} extracted, {} failed, {} skipped",
//!     stats.successful, stats.failed, stats.skipped
//! );
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod detect;
pub mod error;
pub mod extractor;
pub mod formats;
pub mod report;
pub mod scan;
pub mod security;
pub mod validate;

// Re-export main API types
pub use config::ExtractionConfig;
pub use detect::ArchiveKind;
pub use detect::detect_archive_type;
pub use error::ErrorKind;
pub use error::ExtractionError;
pub use error::Result;
pub use error::RunAborted;
pub use extractor::Extractor;
pub use formats::FormatHandler;
pub use report::ArchiveOutcome;
pub use report::Disposition;
pub use report::NoopStatsSink;
pub use report::RunStats;
pub use report::StatsSink;
pub use scan::find_archives;
pub use validate::ValidationResult;
pub use validate::check_nested_depth;
pub use validate::validate_archive;

// Re-export security primitives for callers building their own flows
pub use security::TargetDir;
pub use security::check_extraction_ratio;
pub use security::safe_member_path;
