use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// A WGS84 position in decimal degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct GeoPoint {
	pub latitude: f64,
	pub longitude: f64,
}

impl GeoPoint {
	#[must_use]
	pub fn new(latitude: f64, longitude: f64) -> Self {
		Self { latitude, longitude }
	}

	/// Formats the point as `LAT,LONG` with eight decimals, the form accepted by [`GeoPoint::from_str`].
	#[must_use]
	pub fn to_coordinate_string(&self) -> String {
		format!("{:.8},{:.8}", self.latitude, self.longitude)
	}

	pub(crate) fn to_coord(self) -> geo::Coord<f64> {
		geo::Coord {
			x: self.longitude,
			y: self.latitude,
		}
	}
}

/// Parses `LAT,LONG` in decimal degrees, e.g. `37.58289,-106.52305`.
impl FromStr for GeoPoint {
	type Err = anyhow::Error;

	fn from_str(text: &str) -> Result<Self> {
		let parts: Vec<&str> = text.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
		ensure!(parts.len() == 2, "expected 'LAT,LONG', got '{text}'");

		let latitude: f64 = parts[0]
			.parse()
			.with_context(|| format!("invalid latitude '{}'", parts[0]))?;
		let longitude: f64 = parts[1]
			.parse()
			.with_context(|| format!("invalid longitude '{}'", parts[1]))?;
		ensure!(
			latitude.is_finite() && longitude.is_finite(),
			"coordinates must be finite numbers, got '{text}'"
		);

		Ok(Self { latitude, longitude })
	}
}

impl Display for GeoPoint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{},{}", self.latitude, self.longitude)
	}
}
