//! Request bodies of the imagery endpoints, in their JSON (camelCase) shape.
//!
//! Every field is optional on the wire; missing values fall back to their
//! defaults and are rejected later by validation if they are required.

use crate::{AoiInput, DatedFileOptions, GeoPoint, Provider, utils::sanitize_file_name};
use serde::{Deserialize, Serialize};
use time::Date;

pub const DEFAULT_IMAGE_NAME: &str = "historical_imagery.tif";
pub const DEFAULT_ARCHIVE_NAME: &str = "historical_tiles.tar.gz";

/// Area-of-interest fields shared by availability, download and dump.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AoiRequest {
	pub provider: Provider,
	pub no_cache: bool,
	pub zoom: i32,
	pub parallel: Option<i32>,
	pub region: Option<Vec<GeoPoint>>,
	pub lower_left: Option<GeoPoint>,
	pub upper_right: Option<GeoPoint>,
}

impl AoiRequest {
	pub fn to_aoi_input(&self) -> AoiInput {
		let to_text = |point: &GeoPoint| point.to_coordinate_string();
		AoiInput {
			zoom: self.zoom,
			parallel: self.parallel,
			region: self.region.as_ref().map(|points| points.iter().map(to_text).collect()),
			lower_left: self.lower_left.as_ref().map(to_text),
			upper_right: self.upper_right.as_ref().map(to_text),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InfoRequest {
	pub provider: Provider,
	pub no_cache: bool,
	pub zoom: i32,
	pub location: GeoPoint,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AvailabilityRequest {
	#[serde(flatten)]
	pub aoi: AoiRequest,
	pub complete_only: bool,
	pub min_date: Option<Date>,
	pub max_date: Option<Date>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DownloadRequest {
	#[serde(flatten)]
	pub aoi: AoiRequest,
	pub dates: Vec<Date>,
	pub exact_date: bool,
	pub layer_date: bool,
	pub target_spatial_reference: Option<String>,
	pub scale_factor: f64,
	pub offset_x: f64,
	pub offset_y: f64,
	pub scale_first: bool,
	pub file_name: Option<String>,
}

impl Default for DownloadRequest {
	fn default() -> Self {
		Self {
			aoi: AoiRequest::default(),
			dates: Vec::new(),
			exact_date: false,
			layer_date: false,
			target_spatial_reference: None,
			scale_factor: 1.0,
			offset_x: 0.0,
			offset_y: 0.0,
			scale_first: false,
			file_name: None,
		}
	}
}

impl DownloadRequest {
	pub fn file_options(&self) -> DatedFileOptions {
		DatedFileOptions {
			dates: self.dates.clone(),
			exact_date: self.exact_date,
			layer_date: self.layer_date,
			target_spatial_reference: self.target_spatial_reference.clone(),
		}
	}

	/// File name for the attachment, always ending in `.tif`.
	pub fn attachment_name(&self) -> String {
		sanitize_file_name(self.file_name.as_deref(), DEFAULT_IMAGE_NAME, ".tif")
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DumpRequest {
	#[serde(flatten)]
	pub aoi: AoiRequest,
	pub dates: Vec<Date>,
	pub exact_date: bool,
	pub layer_date: bool,
	pub target_spatial_reference: Option<String>,
	pub formatter: Option<String>,
	pub write_world_file: bool,
	pub archive_name: Option<String>,
}

impl DumpRequest {
	pub fn file_options(&self) -> DatedFileOptions {
		DatedFileOptions {
			dates: self.dates.clone(),
			exact_date: self.exact_date,
			layer_date: self.layer_date,
			target_spatial_reference: self.target_spatial_reference.clone(),
		}
	}

	/// File name for the attachment, always ending in `.tar.gz`.
	pub fn attachment_name(&self) -> String {
		sanitize_file_name(self.archive_name.as_deref(), DEFAULT_ARCHIVE_NAME, ".tar.gz")
	}
}
