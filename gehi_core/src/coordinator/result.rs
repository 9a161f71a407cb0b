use super::TempPath;
use crate::utils::format_error_chain;
use std::path::Path;

/// Outcome of one operation run.
///
/// Failures of the operation end up in `failure`; they never escape the coordinator.
#[derive(Debug, Default)]
pub struct RunResult {
	pub stdout: String,
	pub stderr: String,
	pub failure: Option<anyhow::Error>,
}

impl RunResult {
	pub fn failed(failure: anyhow::Error) -> Self {
		Self {
			failure: Some(failure),
			..Default::default()
		}
	}

	pub fn is_failure(&self) -> bool {
		self.failure.is_some()
	}

	/// Add a line to the error output.
	pub fn append_error(&mut self, message: &str) {
		if self.stderr.trim().is_empty() {
			self.stderr = message.to_owned();
		} else {
			self.stderr.push('\n');
			self.stderr.push_str(message);
		}
	}

	/// Everything the run said, separated by blank lines: stdout, stderr, failure.
	pub fn diagnostic(&self) -> String {
		let failure = self.failure.as_ref().map(format_error_chain).unwrap_or_default();
		let parts: Vec<&str> = [self.stdout.as_str(), self.stderr.as_str(), failure.as_str()]
			.into_iter()
			.filter(|part| !part.is_empty())
			.collect();

		if parts.is_empty() {
			String::from("Operation failed.")
		} else {
			parts.join("\n\n")
		}
	}
}

/// Outcome of a run that produces a file.
///
/// The output is owned by the result: dropping the result, or the
/// [`TempPath`] taken out of it, deletes the file.
#[derive(Debug, Default)]
pub struct FileRunResult {
	pub run: RunResult,
	pub output: Option<TempPath>,
}

impl FileRunResult {
	pub fn output_path(&self) -> Option<&Path> {
		self.output.as_ref().map(TempPath::path)
	}

	pub fn take_output(&mut self) -> Option<TempPath> {
		self.output.take()
	}

	/// The run succeeded and left a non-empty output file behind.
	pub async fn has_usable_output(&self) -> bool {
		if self.run.is_failure() {
			return false;
		}
		let Some(path) = self.output_path() else {
			return false;
		};
		match tokio::fs::metadata(path).await {
			Ok(meta) => meta.is_file() && meta.len() > 0,
			Err(_) => false,
		}
	}
}
