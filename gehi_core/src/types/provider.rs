use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Historical imagery source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Provider {
	/// Google Earth historical imagery ("time machine").
	#[default]
	#[serde(alias = "TM", alias = "tm", alias = "timemachine")]
	TimeMachine,
	/// Esri World Imagery Wayback.
	#[serde(alias = "wayback")]
	Wayback,
}

impl Provider {
	/// Name understood by the imagery tool.
	pub fn as_str(&self) -> &'static str {
		match self {
			Provider::TimeMachine => "TM",
			Provider::Wayback => "Wayback",
		}
	}
}

impl FromStr for Provider {
	type Err = anyhow::Error;

	fn from_str(text: &str) -> Result<Self> {
		Ok(match text.trim().to_ascii_lowercase().as_str() {
			"tm" | "timemachine" => Provider::TimeMachine,
			"wayback" => Provider::Wayback,
			_ => bail!("unknown provider '{text}', expected 'TimeMachine' or 'Wayback'"),
		})
	}
}

impl Display for Provider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
