use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 23;

/// A validated imagery zoom level in `MIN_ZOOM..=MAX_ZOOM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct ZoomLevel(u8);

impl ZoomLevel {
	pub fn new(level: i32) -> Result<Self> {
		ensure!(
			level <= i32::from(MAX_ZOOM),
			"Zoom level: {level} is too large. Max zoom is {MAX_ZOOM}"
		);
		ensure!(
			level >= i32::from(MIN_ZOOM),
			"Zoom level: {level} is too small. Min zoom is {MIN_ZOOM}"
		);
		Ok(Self(level as u8))
	}

	#[must_use]
	pub fn get(self) -> u8 {
		self.0
	}
}

impl TryFrom<i32> for ZoomLevel {
	type Error = anyhow::Error;

	fn try_from(level: i32) -> Result<Self> {
		Self::new(level)
	}
}

impl From<ZoomLevel> for i32 {
	fn from(zoom: ZoomLevel) -> Self {
		i32::from(zoom.0)
	}
}

impl Display for ZoomLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}
