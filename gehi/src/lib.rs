//! # gehi
//!
//! HTTP surface and command line for historical imagery operations.
//!
//! - [`config`] reads the YAML configuration,
//! - [`engine`] runs operations through the external imagery tool,
//! - [`server`] exposes `info`, `availability`, `download` and `dump` under `/api/imagery/`.
//!
//! The orchestration itself lives in [`gehi_core`], re-exported as [`core`].

pub mod config;
pub mod engine;
pub mod server;

pub use config::Config;
pub use gehi_core as core;
