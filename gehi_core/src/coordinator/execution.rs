use super::{FileRunResult, RunResult, TempPath, TempStorage, archive_directory, contains_files, normalize_console_text};
use crate::{
	AoiResolver, AvailabilityOperation, AvailabilityRequest, DownloadOperation, DownloadRequest, DumpOperation,
	DumpRequest, ExecutionMode, FileOutputValidator, ImageryEngine, InfoOperation, InfoRequest, KeyedMutex, Operation,
	OutputSink, ValidationError,
};
use anyhow::anyhow;
use std::{path::Path, sync::Arc};
use tokio_util::sync::CancellationToken;

/// [`KeyedMutex`] key that serializes all captured-text runs.
pub const CAPTURED_TEXT_LOCK: &str = "captured-text";
/// Error output of a dump that finished without writing a single tile.
pub const NO_TILES_MESSAGE: &str = "No tiles were generated for this request.";
pub const CANCELLED_MESSAGE: &str = "operation was cancelled before it started";

/// Turns requests into operations, runs them and manages what they leave on disk.
#[derive(Clone, Debug)]
pub struct ExecutionCoordinator {
	engine: Arc<dyn ImageryEngine>,
	locks: Arc<KeyedMutex>,
	temp: TempStorage,
	validator: FileOutputValidator,
}

impl ExecutionCoordinator {
	/// Uses the process-wide [`KeyedMutex`] and the default temp directory.
	pub fn new(engine: Arc<dyn ImageryEngine>) -> Self {
		Self {
			engine,
			locks: KeyedMutex::global(),
			temp: TempStorage::default(),
			validator: FileOutputValidator::default(),
		}
	}

	#[must_use]
	pub fn with_locks(mut self, locks: Arc<KeyedMutex>) -> Self {
		self.locks = locks;
		self
	}

	#[must_use]
	pub fn with_temp_storage(mut self, temp: TempStorage) -> Self {
		self.temp = temp;
		self
	}

	#[must_use]
	pub fn with_resolver(mut self, resolver: AoiResolver) -> Self {
		self.validator = FileOutputValidator::new(resolver);
		self
	}

	pub fn temp_storage(&self) -> &TempStorage {
		&self.temp
	}

	pub async fn run_info(
		&self,
		request: &InfoRequest,
		cancel: &CancellationToken,
	) -> Result<RunResult, ValidationError> {
		let zoom = self.validator.resolver().resolve_zoom(request.zoom)?;
		let operation = Operation::Info(InfoOperation {
			provider: request.provider,
			no_cache: request.no_cache,
			zoom,
			location: request.location,
		});
		Ok(self.execute(&operation, cancel).await)
	}

	pub async fn run_availability(
		&self,
		request: &AvailabilityRequest,
		cancel: &CancellationToken,
	) -> Result<RunResult, ValidationError> {
		let aoi = self
			.validator
			.resolver()
			.resolve(&request.aoi.to_aoi_input())
			.into_result()?;
		let operation = Operation::Availability(AvailabilityOperation {
			provider: request.aoi.provider,
			no_cache: request.aoi.no_cache,
			aoi,
			complete_only: request.complete_only,
			min_date: request.min_date,
			max_date: request.max_date,
		});
		Ok(self.execute(&operation, cancel).await)
	}

	/// Run a download into a fresh temp file.
	///
	/// The file is part of the result whatever the outcome, so that dropping
	/// the result removes whatever the engine left behind.
	pub async fn run_download(
		&self,
		request: &DownloadRequest,
		cancel: &CancellationToken,
	) -> Result<FileRunResult, ValidationError> {
		let output = self.temp.unique_path("gehi_download", ".tif");
		let aoi = self
			.validator
			.validate(&request.aoi.to_aoi_input(), &request.dates, &path_text(output.path()))
			.into_result()?;

		if let Err(e) = self.temp.prepare().await {
			return Ok(FileRunResult {
				run: RunResult::failed(e),
				output: None,
			});
		}

		let operation = Operation::Download(DownloadOperation {
			provider: request.aoi.provider,
			no_cache: request.aoi.no_cache,
			aoi,
			files: request.file_options(),
			scale_factor: request.scale_factor,
			offset_x: request.offset_x,
			offset_y: request.offset_y,
			scale_first: request.scale_first,
			save_path: output.path().to_path_buf(),
		});

		let run = self.execute(&operation, cancel).await;
		Ok(FileRunResult {
			run,
			output: Some(output),
		})
	}

	/// Run a dump into a fresh temp directory and pack the tiles into an archive.
	///
	/// The directory is removed before this returns, whatever the outcome.
	pub async fn run_dump(
		&self,
		request: &DumpRequest,
		cancel: &CancellationToken,
	) -> Result<FileRunResult, ValidationError> {
		let dump_dir = self.temp.unique_path("gehi_dump", "");
		let aoi = self
			.validator
			.validate(&request.aoi.to_aoi_input(), &request.dates, &path_text(dump_dir.path()))
			.into_result()?;

		let prepared = match self.temp.prepare().await {
			Ok(()) => dump_dir.create_dir().await,
			Err(e) => Err(e),
		};
		if let Err(e) = prepared {
			return Ok(FileRunResult {
				run: RunResult::failed(e),
				output: None,
			});
		}

		let operation = Operation::Dump(DumpOperation {
			provider: request.aoi.provider,
			no_cache: request.aoi.no_cache,
			aoi,
			files: request.file_options(),
			formatter: request.formatter.clone(),
			write_world_file: request.write_world_file,
			save_dir: dump_dir.path().to_path_buf(),
		});

		let run = self.execute(&operation, cancel).await;
		let result = self.package_dump(run, &dump_dir).await;
		dump_dir.remove().await;
		Ok(result)
	}

	async fn package_dump(&self, mut run: RunResult, dump_dir: &TempPath) -> FileRunResult {
		if run.is_failure() {
			return FileRunResult { run, output: None };
		}

		match contains_files(dump_dir.path()).await {
			Ok(true) => {}
			Ok(false) => {
				log::debug!("dump in {:?} produced no files", dump_dir.path());
				run.append_error(NO_TILES_MESSAGE);
				return FileRunResult { run, output: None };
			}
			Err(e) => {
				run.failure = Some(e);
				return FileRunResult { run, output: None };
			}
		}

		let archive = self.temp.unique_path("gehi_dump", ".tar.gz");
		match archive_directory(dump_dir.path(), archive.path()).await {
			Ok(()) => {
				log::debug!("archived {:?} into {:?}", dump_dir.path(), archive.path());
				FileRunResult {
					run,
					output: Some(archive),
				}
			}
			Err(e) => {
				run.failure = Some(e);
				FileRunResult { run, output: None }
			}
		}
	}

	/// Run an operation in the execution mode of its kind.
	pub async fn execute(&self, operation: &Operation, cancel: &CancellationToken) -> RunResult {
		match operation.mode() {
			ExecutionMode::CapturedText => self.execute_captured(operation, cancel).await,
			ExecutionMode::DirectFile => self.execute_direct(operation, cancel).await,
		}
	}

	async fn execute_captured(&self, operation: &Operation, cancel: &CancellationToken) -> RunResult {
		let _guard = match self.locks.acquire_cancellable(CAPTURED_TEXT_LOCK, cancel).await {
			Ok(guard) => guard,
			Err(_) => {
				log::debug!("{} was cancelled while waiting for the captured-text lock", operation.kind());
				return RunResult::failed(anyhow!(CANCELLED_MESSAGE));
			}
		};

		let (result, sink) = self.run_engine(operation, cancel).await;
		let (stdout, stderr) = sink.into_parts();
		RunResult {
			stdout: normalize_console_text(&stdout),
			stderr: normalize_console_text(&stderr),
			failure: result.err(),
		}
	}

	async fn execute_direct(&self, operation: &Operation, cancel: &CancellationToken) -> RunResult {
		let (result, sink) = self.run_engine(operation, cancel).await;
		let (stdout, stderr) = sink.into_parts();
		RunResult {
			stdout,
			stderr,
			failure: result.err(),
		}
	}

	async fn run_engine(&self, operation: &Operation, cancel: &CancellationToken) -> (anyhow::Result<()>, OutputSink) {
		let kind = operation.kind();
		log::debug!("running {kind} at zoom {}", operation.zoom());
		if let Some(bounds) = operation.aoi().and_then(|aoi| aoi.region.bounds()) {
			log::trace!("{kind} bounds: {bounds:?}");
		}

		let mut sink = OutputSink::new();
		let result = self.engine.run(operation, &mut sink, cancel.child_token()).await;
		match &result {
			Ok(()) => log::debug!("{kind} finished"),
			Err(e) => log::warn!("{kind} failed: {e}"),
		}
		(result, sink)
	}
}

fn path_text(path: &Path) -> String {
	path.to_string_lossy().into_owned()
}
