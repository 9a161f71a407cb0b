use super::{ImageryEngine, Operation, OutputSink};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{path::PathBuf, time::Duration};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct MockState {
	runs: usize,
	active: usize,
	max_active: usize,
	last_operation: Option<Operation>,
}

/// A scriptable [`ImageryEngine`] for tests.
///
/// Every run writes the configured text, creates the configured files at the
/// operation's output path and then fails if a failure was configured.
#[derive(Debug, Default)]
pub struct MockEngine {
	stdout: String,
	stderr: String,
	failure: Option<String>,
	file: Option<Vec<u8>>,
	dump_files: Vec<(PathBuf, Vec<u8>)>,
	delay: Option<Duration>,
	state: Mutex<MockState>,
}

impl MockEngine {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_stdout(mut self, text: &str) -> Self {
		self.stdout = text.to_owned();
		self
	}

	pub fn with_stderr(mut self, text: &str) -> Self {
		self.stderr = text.to_owned();
		self
	}

	pub fn with_failure(mut self, message: &str) -> Self {
		self.failure = Some(message.to_owned());
		self
	}

	/// Content written to the save path of a download.
	pub fn with_file(mut self, content: &[u8]) -> Self {
		self.file = Some(content.to_vec());
		self
	}

	/// A file written below the save directory of a dump.
	pub fn with_dump_file(mut self, relative_path: &str, content: &[u8]) -> Self {
		self.dump_files.push((PathBuf::from(relative_path), content.to_vec()));
		self
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);
		self
	}

	pub fn runs(&self) -> usize {
		self.state.lock().runs
	}

	/// Highest number of runs that were in flight at the same time.
	pub fn max_concurrent_runs(&self) -> usize {
		self.state.lock().max_active
	}

	pub fn last_operation(&self) -> Option<Operation> {
		self.state.lock().last_operation.clone()
	}

	async fn run_scripted(&self, operation: &Operation, sink: &mut OutputSink) -> Result<()> {
		sink.write_out(&self.stdout);
		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}
		sink.write_err(&self.stderr);

		match operation {
			Operation::Download(op) => {
				if let Some(content) = &self.file {
					tokio::fs::write(&op.save_path, content)
						.await
						.with_context(|| format!("writing {:?}", op.save_path))?;
				}
			}
			Operation::Dump(op) => {
				for (relative_path, content) in &self.dump_files {
					let path = op.save_dir.join(relative_path);
					if let Some(parent) = path.parent() {
						tokio::fs::create_dir_all(parent).await?;
					}
					tokio::fs::write(&path, content)
						.await
						.with_context(|| format!("writing {path:?}"))?;
				}
			}
			Operation::Info(_) | Operation::Availability(_) => {}
		}

		if let Some(message) = &self.failure {
			bail!("{message}");
		}
		Ok(())
	}
}

#[async_trait]
impl ImageryEngine for MockEngine {
	async fn run(&self, operation: &Operation, sink: &mut OutputSink, _cancel: CancellationToken) -> Result<()> {
		{
			let mut state = self.state.lock();
			state.runs += 1;
			state.active += 1;
			state.max_active = state.max_active.max(state.active);
			state.last_operation = Some(operation.clone());
		}

		let result = self.run_scripted(operation, sink).await;

		self.state.lock().active -= 1;
		result
	}
}
