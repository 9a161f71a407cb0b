//! Runs imagery operations through the external `GEHistoricalImagery` tool.
//!
//! Every [`Operation`] maps onto one verb of the tool. The child's stdout and
//! stderr are collected into the [`OutputSink`], the tile cache is handed over
//! through the environment and the child is killed when the call is cancelled.

use crate::config::{CACHE_ENV_VAR, EngineConfig};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use gehi_core::{
	AvailabilityOperation, DatedFileOptions, DownloadOperation, DumpOperation, GeoPoint, ImageryEngine, InfoOperation,
	Operation, OutputSink, ResolvedAoi,
};
use std::{
	path::{Path, PathBuf},
	process::{ExitStatus, Stdio},
};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use tokio::{
	io::AsyncReadExt,
	process::{Child, ChildStderr, ChildStdout, Command},
};
use tokio_util::sync::CancellationToken;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]/[month]/[day]");

#[derive(Clone, Debug)]
pub struct CommandEngine {
	program: String,
	args: Vec<String>,
	cache_dir: PathBuf,
}

impl CommandEngine {
	pub fn new(program: &str) -> Self {
		Self::from_config(&EngineConfig {
			program: program.to_string(),
			..Default::default()
		})
	}

	pub fn from_config(config: &EngineConfig) -> Self {
		Self {
			program: config.program.clone(),
			args: config.args.clone(),
			cache_dir: config.resolved_cache_dir(),
		}
	}

	/// Arguments placed before the operation verb.
	pub fn with_args(mut self, args: &[&str]) -> Self {
		self.args = args.iter().map(|a| (*a).to_string()).collect();
		self
	}

	pub fn with_cache_dir(mut self, cache_dir: &Path) -> Self {
		self.cache_dir = cache_dir.to_path_buf();
		self
	}

	pub fn program(&self) -> &str {
		&self.program
	}

	pub fn cache_dir(&self) -> &Path {
		&self.cache_dir
	}

	/// Full argument list of the child process, verb included.
	pub fn command_args(&self, operation: &Operation) -> Result<Vec<String>> {
		let mut args = self.args.clone();
		args.push(operation.kind().as_str().to_string());
		match operation {
			Operation::Info(op) => info_args(op, &mut args),
			Operation::Availability(op) => availability_args(op, &mut args)?,
			Operation::Download(op) => download_args(op, &mut args)?,
			Operation::Dump(op) => dump_args(op, &mut args)?,
		}
		args.push(String::from("--provider"));
		args.push(operation.provider().as_str().to_string());
		if operation.no_cache() {
			args.push(String::from("--no-cache"));
		}
		Ok(args)
	}

	fn command(&self, operation: &Operation) -> Result<Command> {
		let mut command = Command::new(&self.program);
		command
			.args(self.command_args(operation)?)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true);

		if operation.no_cache() {
			command.env_remove(CACHE_ENV_VAR);
		} else {
			command.env(CACHE_ENV_VAR, &self.cache_dir);
		}
		Ok(command)
	}
}

#[async_trait]
impl ImageryEngine for CommandEngine {
	async fn run(&self, operation: &Operation, sink: &mut OutputSink, cancel: CancellationToken) -> Result<()> {
		let verb = operation.kind();
		let mut child = self
			.command(operation)?
			.spawn()
			.with_context(|| format!("starting imagery tool '{}'", self.program))?;
		log::debug!("started '{} {verb}' with pid {:?}", self.program, child.id());

		let stdout = child.stdout.take().context("stdout of the imagery tool is not piped")?;
		let stderr = child.stderr.take().context("stderr of the imagery tool is not piped")?;

		let mut out = Vec::new();
		let mut err = Vec::new();
		let collected = tokio::select! {
			result = collect_output(&mut child, stdout, stderr, &mut out, &mut err) => Some(result),
			() = cancel.cancelled() => None,
		};

		// whatever was read before a failure or cancellation stays in the sink
		sink.write_out(&String::from_utf8_lossy(&out));
		sink.write_err(&String::from_utf8_lossy(&err));

		let Some(result) = collected else {
			if let Err(e) = child.kill().await {
				log::warn!("failed to kill '{} {verb}': {e}", self.program);
			}
			bail!("'{verb}' was cancelled");
		};

		let status = result?;
		if !status.success() {
			bail!("imagery tool '{} {verb}' exited with {status}", self.program);
		}
		Ok(())
	}
}

async fn collect_output(
	child: &mut Child,
	mut stdout: ChildStdout,
	mut stderr: ChildStderr,
	out: &mut Vec<u8>,
	err: &mut Vec<u8>,
) -> Result<ExitStatus> {
	let (read_out, read_err, status) = tokio::join!(stdout.read_to_end(out), stderr.read_to_end(err), child.wait());
	read_out.context("reading stdout of the imagery tool")?;
	read_err.context("reading stderr of the imagery tool")?;
	Ok(status?)
}

fn info_args(op: &InfoOperation, args: &mut Vec<String>) {
	args.push(String::from("--location"));
	args.push(op.location.to_coordinate_string());
	args.push(String::from("-z"));
	args.push(op.zoom.to_string());
}

fn aoi_args(aoi: &ResolvedAoi, args: &mut Vec<String>) {
	let region: Vec<String> = aoi.region.points().iter().map(GeoPoint::to_coordinate_string).collect();
	args.push(String::from("--region"));
	args.push(region.join("+"));
	args.push(String::from("-z"));
	args.push(aoi.zoom.to_string());
	args.push(String::from("--parallel"));
	args.push(aoi.concurrency.to_string());
}

fn format_date(date: Date) -> Result<String> {
	date.format(DATE_FORMAT).with_context(|| format!("formatting date {date}"))
}

fn availability_args(op: &AvailabilityOperation, args: &mut Vec<String>) -> Result<()> {
	aoi_args(&op.aoi, args);
	if op.complete_only {
		args.push(String::from("--complete"));
	}
	if let Some(date) = op.min_date {
		args.push(String::from("--min-date"));
		args.push(format_date(date)?);
	}
	if let Some(date) = op.max_date {
		args.push(String::from("--max-date"));
		args.push(format_date(date)?);
	}
	Ok(())
}

fn file_args(files: &DatedFileOptions, args: &mut Vec<String>) -> Result<()> {
	let dates = files.dates.iter().map(|d| format_date(*d)).collect::<Result<Vec<_>>>()?;
	args.push(String::from("--date"));
	args.push(dates.join(","));
	if files.exact_date {
		args.push(String::from("--exact-date"));
	}
	if files.layer_date {
		args.push(String::from("--layer-date"));
	}
	if let Some(target) = &files.target_spatial_reference {
		args.push(String::from("--target-sr"));
		args.push(target.clone());
	}
	Ok(())
}

fn download_args(op: &DownloadOperation, args: &mut Vec<String>) -> Result<()> {
	aoi_args(&op.aoi, args);
	file_args(&op.files, args)?;
	args.extend([
		String::from("--scale"),
		op.scale_factor.to_string(),
		String::from("--offset-x"),
		op.offset_x.to_string(),
		String::from("--offset-y"),
		op.offset_y.to_string(),
	]);
	if op.scale_first {
		args.push(String::from("--scale-first"));
	}
	args.push(String::from("-o"));
	args.push(op.save_path.to_string_lossy().into_owned());
	Ok(())
}

fn dump_args(op: &DumpOperation, args: &mut Vec<String>) -> Result<()> {
	aoi_args(&op.aoi, args);
	file_args(&op.files, args)?;
	if let Some(formatter) = &op.formatter {
		args.push(String::from("-f"));
		args.push(formatter.clone());
	}
	if op.write_world_file {
		args.push(String::from("--world"));
	}
	args.push(String::from("-o"));
	args.push(op.save_dir.to_string_lossy().into_owned());
	Ok(())
}
