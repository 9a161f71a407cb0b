//! Runs operations in the right execution mode and owns their temporary files.
//!
//! Captured-text operations (`Info`, `Availability`) run one at a time,
//! serialized through the [`KeyedMutex`](crate::KeyedMutex) key
//! [`CAPTURED_TEXT_LOCK`]. Direct-file operations (`Download`, `Dump`) run in
//! parallel and write below a [`TempStorage`] root.

mod archive;
mod execution;
mod normalize;
mod result;
mod temp;

pub use archive::{archive_directory, contains_files};
pub use execution::{CANCELLED_MESSAGE, CAPTURED_TEXT_LOCK, ExecutionCoordinator, NO_TILES_MESSAGE};
pub use normalize::normalize_console_text;
pub use result::{FileRunResult, RunResult};
pub use temp::{TempPath, TempStorage};
