//! Normalization of the user supplied download parallelism.
//!
//! The limit handed to an operation is always in `1..=available_parallelism()`:
//! a missing or non-positive request falls back to the CPU count, anything larger
//! is clamped down to it.
//!
//! ```
//! use gehi_core::ConcurrencyLimit;
//!
//! assert_eq!(ConcurrencyLimit::normalize_with(Some(0), 8).get(), 8);
//! assert_eq!(ConcurrencyLimit::normalize_with(Some(3), 8).get(), 3);
//! assert_eq!(ConcurrencyLimit::normalize_with(Some(64), 8).get(), 8);
//! ```

use std::fmt::Display;

/// Get the number of logical CPUs available
pub fn available_parallelism() -> usize {
	num_cpus::get().max(1)
}

/// Number of concurrent tile downloads an operation may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConcurrencyLimit(usize);

impl ConcurrencyLimit {
	/// Normalize `requested` against the CPU count of this machine.
	pub fn normalize(requested: Option<i32>) -> Self {
		Self::normalize_with(requested, available_parallelism())
	}

	/// Normalize `requested` against an explicit `available` parallelism.
	pub fn normalize_with(requested: Option<i32>, available: usize) -> Self {
		let available = available.max(1);
		match requested {
			Some(value) if value > 0 => Self((value as usize).min(available)),
			_ => Self(available),
		}
	}

	pub fn get(&self) -> usize {
		self.0
	}
}

impl Default for ConcurrencyLimit {
	fn default() -> Self {
		Self::normalize(None)
	}
}

impl Display for ConcurrencyLimit {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}
