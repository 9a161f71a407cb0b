//! Lifecycle of the imagery HTTP server.
//!
//! Builds the router, applies CORS and panic catching, listens on a socket and
//! shuts down gracefully. `/status` is a liveness probe that is always mounted.

use super::{cors, routes};
use crate::Config;
use anyhow::{Context, Result};
use axum::{Router, routing::get};
use gehi_core::ExecutionCoordinator;
use std::time::Duration;
use tokio::{net::TcpListener, sync::oneshot};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Owns the configuration and the serving task.
///
/// Starting a running server restarts it; stopping a stopped server is a no-op.
pub struct ImageryServer {
	ip: String,
	port: u16,
	use_api: bool,
	cors_allowed_origins: Vec<String>,
	cors_max_age_seconds: u64,
	coordinator: ExecutionCoordinator,
	exit_signal: Option<oneshot::Sender<()>>,
	join: Option<tokio::task::JoinHandle<()>>,
}

impl ImageryServer {
	pub fn from_config(config: &Config, coordinator: ExecutionCoordinator) -> ImageryServer {
		ImageryServer {
			ip: config.server.ip.clone().unwrap_or_else(|| String::from("0.0.0.0")),
			port: config.server.port.unwrap_or(8080),
			use_api: !config.server.disable_api.unwrap_or(false),
			cors_allowed_origins: config.cors.allowed_origins.clone(),
			cors_max_age_seconds: config.cors.max_age_seconds(),
			coordinator,
			exit_signal: None,
			join: None,
		}
	}

	pub fn ip(&self) -> &str {
		&self.ip
	}

	pub fn port(&self) -> u16 {
		self.port
	}

	pub fn is_running(&self) -> bool {
		self.join.is_some()
	}

	/// The complete application: routes, CORS and protection layers.
	pub fn router(&self) -> Result<Router> {
		let mut router = Router::new().route("/status", get(|| async { "ready!" }));
		router = routes::add_imagery_to_app(router, self.coordinator.clone());
		if self.use_api {
			router = routes::add_api_to_app(router);
		}

		let cors_layer = cors::build_cors_layer(&self.cors_allowed_origins, self.cors_max_age_seconds)?;
		Ok(router.layer(ServiceBuilder::new().layer(CatchPanicLayer::new()).layer(cors_layer)))
	}

	pub async fn start(&mut self) -> Result<()> {
		if self.is_running() {
			self.stop().await;
		}

		log::info!("starting server");
		let router = self.router()?;

		let addr = format!("{}:{}", self.ip, self.port);
		let listener = TcpListener::bind(&addr)
			.await
			.with_context(|| format!("binding server to {addr}"))?;
		log::info!("server listening on {addr}");

		let (tx, rx) = oneshot::channel::<()>();
		let handle = tokio::spawn(async move {
			if let Err(err) = axum::serve(listener, router.into_make_service())
				.with_graceful_shutdown(async {
					rx.await.ok();
				})
				.await
			{
				log::error!("server task exited with error: {err}");
			}
		});

		self.exit_signal = Some(tx);
		self.join = Some(handle);
		Ok(())
	}

	/// Trigger graceful shutdown and wait for the serving task, at most [`SHUTDOWN_TIMEOUT`].
	pub async fn stop(&mut self) {
		if self.exit_signal.is_none() && self.join.is_none() {
			return;
		}

		log::info!("stopping server");

		if let Some(tx) = self.exit_signal.take() {
			let _ = tx.send(());
		}

		if let Some(handle) = self.join.take() {
			match tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await {
				Ok(Err(join_err)) => log::warn!("server task join error: {join_err}"),
				Ok(Ok(())) => {}
				Err(_) => log::warn!("server task did not shut down within {SHUTDOWN_TIMEOUT:?}"),
			}
		}
	}
}
