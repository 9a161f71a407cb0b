//! Server configuration.
//!
//! - [`Config`]: top-level loader and YAML parser
//! - [`ServerConfig`]: network and API settings
//! - [`CorsConfig`]: CORS policy
//! - [`EngineConfig`]: how the external imagery tool is invoked
//!
//! Command line arguments override values read from the file.

mod cors;
mod engine;
mod main;
mod server;

pub use cors::CorsConfig;
pub use engine::{CACHE_ENV_VAR, EngineConfig};
pub use main::Config;
pub use server::ServerConfig;
