//! Cross-Origin Resource Sharing (CORS) configuration.
//!
//! By default all origins are allowed (`*`).
//!
//! # Example YAML
//! ```yaml
//! cors:
//!   allowed_origins:
//!     - "https://example.org"
//!     - "*.example.net"
//!   max_age_seconds: 86400
//! ```
use serde::Deserialize;

pub const DEFAULT_MAX_AGE_SECONDS: u64 = 86400;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
	/// Allowed origins for CORS requests.
	/// Supports:
	/// - `*` to allow all origins
	/// - Exact origins like `https://example.com`
	/// - Globs at the start of the domain like `*.example.com`
	/// - Globs at the end of the domain like `example.*`
	/// - Regular expressions enclosed in slashes like `/domain\..*$/`
	#[serde(default = "default_allowed_origins")]
	pub allowed_origins: Vec<String>,

	/// Preflight cache duration in seconds. Default: 86400 (1 day)
	#[serde(default)]
	pub max_age_seconds: Option<u64>,
}

fn default_allowed_origins() -> Vec<String> {
	vec!["*".to_string()]
}

impl Default for CorsConfig {
	fn default() -> Self {
		Self {
			allowed_origins: default_allowed_origins(),
			max_age_seconds: None,
		}
	}
}

impl CorsConfig {
	pub fn max_age_seconds(&self) -> u64 {
		self.max_age_seconds.unwrap_or(DEFAULT_MAX_AGE_SECONDS)
	}
}
