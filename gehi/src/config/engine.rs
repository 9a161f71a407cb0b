use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable the imagery tool reads its tile cache directory from.
pub const CACHE_ENV_VAR: &str = "GEHistoricalImagery_Cache";
pub const DEFAULT_PROGRAM: &str = "GEHistoricalImagery";
pub const DEFAULT_CACHE_DIR: &str = "./cache";

/// How the external imagery tool is invoked.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
	/// Executable of the imagery tool. Default: `GEHistoricalImagery`
	#[serde(default = "default_program")]
	pub program: String,

	/// Arguments placed before the operation verb.
	#[serde(default)]
	pub args: Vec<String>,

	/// Tile cache of the imagery tool.
	/// Default: `$GEHistoricalImagery_Cache`, otherwise `./cache`
	#[serde(default)]
	pub cache_dir: Option<PathBuf>,
}

fn default_program() -> String {
	DEFAULT_PROGRAM.to_string()
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			program: default_program(),
			args: Vec::new(),
			cache_dir: None,
		}
	}
}

impl EngineConfig {
	pub fn override_optional_program(&mut self, program: &Option<String>) {
		if let Some(program) = program {
			self.program = program.clone();
		}
	}

	/// The configured cache directory, falling back to the environment and then to `./cache`.
	pub fn resolved_cache_dir(&self) -> PathBuf {
		self.cache_dir.clone().unwrap_or_else(|| {
			std::env::var(CACHE_ENV_VAR).map_or_else(|_| PathBuf::from(DEFAULT_CACHE_DIR), PathBuf::from)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn override_program() {
		let mut config = EngineConfig::default();
		config.override_optional_program(&None);
		assert_eq!(config.program, "GEHistoricalImagery");
		config.override_optional_program(&Some("/opt/gehi/GEHistoricalImagery".into()));
		assert_eq!(config.program, "/opt/gehi/GEHistoricalImagery");
	}

	#[test]
	fn configured_cache_dir_wins() {
		let config = EngineConfig {
			cache_dir: Some(PathBuf::from("/var/cache/gehi")),
			..Default::default()
		};
		assert_eq!(config.resolved_cache_dir(), PathBuf::from("/var/cache/gehi"));
	}
}
