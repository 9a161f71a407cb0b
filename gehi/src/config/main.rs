use super::{CorsConfig, EngineConfig, ServerConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::{Path, PathBuf},
};

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// HTTP server configuration
	#[serde(default)]
	pub server: ServerConfig,

	/// Cross-Origin Resource Sharing (CORS) settings
	#[serde(default)]
	pub cors: CorsConfig,

	/// External imagery tool
	#[serde(default)]
	pub engine: EngineConfig,

	/// Directory for intermediate download files and dump directories.
	/// Default: `$GEHI_TEMP_DIR`, otherwise the system temp directory
	#[serde(default)]
	pub temp_dir: Option<PathBuf>,
}

impl Config {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	/// Parse from a file path. Relative directories are resolved against the directory of that file.
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("opening config file {path:?}"))?;
		let mut cfg =
			Config::from_reader(BufReader::new(file)).with_context(|| format!("parsing config file {path:?}"))?;

		if let Some(base) = path.parent() {
			cfg.resolve_paths(base);
		}
		Ok(cfg)
	}

	pub fn resolve_paths(&mut self, base: &Path) {
		fn resolve(path: &mut Option<PathBuf>, base: &Path) {
			if let Some(p) = path.as_mut().filter(|p| p.is_relative()) {
				*p = base.join(&*p);
			}
		}
		resolve(&mut self.temp_dir, base);
		resolve(&mut self.engine.cache_dir, base);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::{TempDir, prelude::*};
	use pretty_assertions::assert_eq;

	const EXAMPLE: &str = r#"
server:
  ip: 127.0.0.1
  port: 51234
  disable_api: true
cors:
  allowed_origins:
    - https://example.org
    - "*.other-example.org"
  max_age_seconds: 600
engine:
  program: /opt/gehi/GEHistoricalImagery
  args: ["--verbose"]
  cache_dir: cache
temp_dir: /tmp/gehi
"#;

	#[test]
	fn parse_example_config() {
		let dir = TempDir::new().unwrap();
		let file = dir.child("gehi.yml");
		file.write_str(EXAMPLE).unwrap();

		let cfg = Config::from_path(file.path()).unwrap();
		assert_eq!(
			cfg,
			Config {
				server: ServerConfig {
					ip: Some("127.0.0.1".into()),
					port: Some(51234),
					disable_api: Some(true),
				},
				cors: CorsConfig {
					allowed_origins: vec!["https://example.org".to_string(), "*.other-example.org".to_string()],
					max_age_seconds: Some(600),
				},
				engine: EngineConfig {
					program: "/opt/gehi/GEHistoricalImagery".to_string(),
					args: vec!["--verbose".to_string()],
					cache_dir: Some(dir.path().join("cache")),
				},
				temp_dir: Some(PathBuf::from("/tmp/gehi")),
			}
		);
	}

	#[test]
	fn parse_empty_config() {
		let cfg = Config::from_string("").unwrap();
		assert_eq!(cfg, Config::default());
		assert_eq!(cfg.cors.allowed_origins, vec!["*"]);
		assert_eq!(cfg.engine.program, "GEHistoricalImagery");
	}

	#[test]
	fn parse_invalid_config() {
		assert!(Config::from_string("server:\n  pi: 3.14.15.9").is_err());
		assert!(Config::from_string("zip_dir: /tmp").is_err());
	}

	#[test]
	fn missing_file() {
		let err = Config::from_path(Path::new("/does/not/exist.yml")).unwrap_err();
		assert!(err.to_string().starts_with("opening config file"));
	}
}
