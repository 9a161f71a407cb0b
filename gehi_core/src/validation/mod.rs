//! Validation of raw area-of-interest and file-output input.
//!
//! Validation never fails early on geometry problems: every rule reports a
//! message, and callers treat a non-empty message list as a client error.

mod aoi;
mod error;
mod file_output;

pub use aoi::{AoiInput, AoiResolution, AoiResolver, ResolvedAoi};
pub use error::ValidationError;
pub use file_output::FileOutputValidator;
