use crate::{GeoPoint, Provider, ResolvedAoi, ZoomLevel};
use std::{fmt::Display, path::PathBuf};
use time::Date;

/// Dates available at one location.
#[derive(Clone, Debug, PartialEq)]
pub struct InfoOperation {
	pub provider: Provider,
	pub no_cache: bool,
	pub zoom: ZoomLevel,
	pub location: GeoPoint,
}

/// Dates with imagery coverage inside an area of interest.
#[derive(Clone, Debug, PartialEq)]
pub struct AvailabilityOperation {
	pub provider: Provider,
	pub no_cache: bool,
	pub aoi: ResolvedAoi,
	pub complete_only: bool,
	pub min_date: Option<Date>,
	pub max_date: Option<Date>,
}

/// Date selection shared by the operations that write imagery to disk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DatedFileOptions {
	pub dates: Vec<Date>,
	pub exact_date: bool,
	pub layer_date: bool,
	pub target_spatial_reference: Option<String>,
}

/// Stitch the area of interest into one GeoTIFF at `save_path`.
#[derive(Clone, Debug, PartialEq)]
pub struct DownloadOperation {
	pub provider: Provider,
	pub no_cache: bool,
	pub aoi: ResolvedAoi,
	pub files: DatedFileOptions,
	pub scale_factor: f64,
	pub offset_x: f64,
	pub offset_y: f64,
	pub scale_first: bool,
	pub save_path: PathBuf,
}

/// Write the individual tiles of the area of interest into `save_dir`.
#[derive(Clone, Debug, PartialEq)]
pub struct DumpOperation {
	pub provider: Provider,
	pub no_cache: bool,
	pub aoi: ResolvedAoi,
	pub files: DatedFileOptions,
	pub formatter: Option<String>,
	pub write_world_file: bool,
	pub save_dir: PathBuf,
}

/// One unit of imagery work. Constructed from validated input, run once, then discarded.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
	Info(InfoOperation),
	Availability(AvailabilityOperation),
	Download(DownloadOperation),
	Dump(DumpOperation),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	Info,
	Availability,
	Download,
	Dump,
}

impl OperationKind {
	/// Verb of the imagery tool that implements the operation.
	pub fn as_str(&self) -> &'static str {
		match self {
			OperationKind::Info => "info",
			OperationKind::Availability => "availability",
			OperationKind::Download => "download",
			OperationKind::Dump => "dump",
		}
	}
}

impl Display for OperationKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// How the coordinator runs an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
	/// Serialized process-wide; results are the text written to the sink.
	CapturedText,
	/// Runs in parallel; results are written to a path owned by the coordinator.
	DirectFile,
}

impl Operation {
	pub fn kind(&self) -> OperationKind {
		match self {
			Operation::Info(_) => OperationKind::Info,
			Operation::Availability(_) => OperationKind::Availability,
			Operation::Download(_) => OperationKind::Download,
			Operation::Dump(_) => OperationKind::Dump,
		}
	}

	pub fn mode(&self) -> ExecutionMode {
		match self {
			Operation::Info(_) | Operation::Availability(_) => ExecutionMode::CapturedText,
			Operation::Download(_) | Operation::Dump(_) => ExecutionMode::DirectFile,
		}
	}

	pub fn provider(&self) -> Provider {
		match self {
			Operation::Info(op) => op.provider,
			Operation::Availability(op) => op.provider,
			Operation::Download(op) => op.provider,
			Operation::Dump(op) => op.provider,
		}
	}

	pub fn no_cache(&self) -> bool {
		match self {
			Operation::Info(op) => op.no_cache,
			Operation::Availability(op) => op.no_cache,
			Operation::Download(op) => op.no_cache,
			Operation::Dump(op) => op.no_cache,
		}
	}

	pub fn zoom(&self) -> ZoomLevel {
		match self {
			Operation::Info(op) => op.zoom,
			Operation::Availability(op) => op.aoi.zoom,
			Operation::Download(op) => op.aoi.zoom,
			Operation::Dump(op) => op.aoi.zoom,
		}
	}

	/// The area of interest, for every operation except `Info`.
	pub fn aoi(&self) -> Option<&ResolvedAoi> {
		match self {
			Operation::Info(_) => None,
			Operation::Availability(op) => Some(&op.aoi),
			Operation::Download(op) => Some(&op.aoi),
			Operation::Dump(op) => Some(&op.aoi),
		}
	}
}
