use super::ValidationError;
use crate::{ConcurrencyLimit, GeoPoint, GeoRegion, ZoomLevel, available_parallelism};

const LOCATION_HINT: &str = "Location must be in decimal Lat,Long. e.g. 37.58289,-106.52305";

/// Raw area-of-interest input as it arrives from a request.
///
/// Coordinates are kept as text so that unparsable entries can be reported verbatim.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AoiInput {
	pub zoom: i32,
	pub parallel: Option<i32>,
	pub region: Option<Vec<String>>,
	pub lower_left: Option<String>,
	pub upper_right: Option<String>,
}

impl AoiInput {
	pub fn with_corners(zoom: i32, lower_left: GeoPoint, upper_right: GeoPoint) -> Self {
		Self {
			zoom,
			lower_left: Some(lower_left.to_coordinate_string()),
			upper_right: Some(upper_right.to_coordinate_string()),
			..Default::default()
		}
	}

	pub fn with_region(zoom: i32, points: &[GeoPoint]) -> Self {
		Self {
			zoom,
			region: Some(points.iter().map(GeoPoint::to_coordinate_string).collect()),
			..Default::default()
		}
	}
}

/// Everything the resolver found out, valid or not.
#[derive(Debug)]
pub struct AoiResolution {
	pub concurrency: ConcurrencyLimit,
	pub zoom: Option<ZoomLevel>,
	pub region: Option<GeoRegion>,
	pub messages: Vec<String>,
}

impl AoiResolution {
	pub fn is_valid(&self) -> bool {
		self.messages.is_empty()
	}

	pub fn into_result(self) -> Result<ResolvedAoi, ValidationError> {
		match (self.zoom, self.region) {
			(Some(zoom), Some(region)) if self.messages.is_empty() => Ok(ResolvedAoi {
				zoom,
				concurrency: self.concurrency,
				region,
			}),
			_ => Err(ValidationError::new(self.messages)),
		}
	}
}

/// A validated area of interest, ready to be handed to an operation.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedAoi {
	pub zoom: ZoomLevel,
	pub concurrency: ConcurrencyLimit,
	pub region: GeoRegion,
}

/// Turns [`AoiInput`] into a [`GeoRegion`], a [`ZoomLevel`] and a [`ConcurrencyLimit`].
#[derive(Clone, Copy, Debug)]
pub struct AoiResolver {
	available_parallelism: usize,
}

impl Default for AoiResolver {
	fn default() -> Self {
		Self::new()
	}
}

impl AoiResolver {
	pub fn new() -> Self {
		Self::with_available_parallelism(available_parallelism())
	}

	pub fn with_available_parallelism(available_parallelism: usize) -> Self {
		Self { available_parallelism }
	}

	/// Validate the zoom level on its own.
	pub fn resolve_zoom(&self, zoom: i32) -> Result<ZoomLevel, ValidationError> {
		ZoomLevel::new(zoom).map_err(|e| ValidationError::single(e.to_string()))
	}

	pub fn resolve(&self, input: &AoiInput) -> AoiResolution {
		let concurrency = ConcurrencyLimit::normalize_with(input.parallel, self.available_parallelism);
		let mut messages = Vec::new();

		let zoom = match ZoomLevel::new(input.zoom) {
			Ok(zoom) => Some(zoom),
			Err(e) => {
				messages.push(e.to_string());
				None
			}
		};

		let region = match resolve_region(input) {
			Ok(region) => Some(region),
			Err(message) => {
				messages.push(message);
				None
			}
		};

		log::trace!(
			"resolved area of interest: zoom={zoom:?}, concurrency={concurrency}, region={region:?}, messages={messages:?}"
		);

		AoiResolution {
			concurrency,
			zoom,
			region,
			messages,
		}
	}
}

fn resolve_region(input: &AoiInput) -> Result<GeoRegion, String> {
	let region = input.region.as_deref().unwrap_or_default();

	if region.len() >= 3 {
		let mut points = Vec::with_capacity(region.len());
		for text in region {
			let point: GeoPoint = text.parse().map_err(|_| format!("Invalid coordinate '{text}'"))?;
			points.push(point);
		}
		return GeoRegion::new(points).map_err(|e| format!("Invalid region.\n {e}"));
	}

	let lower_left = parse_corner(input.lower_left.as_deref());
	let upper_right = parse_corner(input.upper_right.as_deref());

	match (lower_left, upper_right) {
		(Some(lower_left), Some(upper_right)) => {
			GeoRegion::from_corners(lower_left, upper_right).map_err(|e| format!("Invalid rectangle.\n {e}"))
		}
		_ if !region.is_empty() => Err(String::from("A region must contain at least 3 points")),
		(None, None) => Err(String::from(
			"An area of interest must be specified either with the 'region' option or the 'lower-left' and 'upper-right' options",
		)),
		(None, Some(_)) => Err(format!("Invalid lower-left coordinate.\n {LOCATION_HINT}")),
		(Some(_), None) => Err(format!("Invalid upper-right coordinate.\n {LOCATION_HINT}")),
	}
}

/// A corner that does not parse counts as missing.
fn parse_corner(text: Option<&str>) -> Option<GeoPoint> {
	text.and_then(|text| text.parse().ok())
}
