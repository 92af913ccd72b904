//! Safety checks shared by validation and extraction.

mod path;
mod ratio;
mod target;

pub use path::safe_member_path;
pub use ratio::check_extraction_ratio;
pub use target::TargetDir;
