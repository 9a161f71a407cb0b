use anyhow::Result;
use gehi::{Config, engine::CommandEngine, server::ImageryServer};
use gehi_core::{ExecutionCoordinator, TempStorage};
use std::{path::PathBuf, sync::Arc};
use tokio::time::{Duration, sleep};

#[derive(clap::Args, Debug)]
#[command(disable_version_flag = true, verbatim_doc_comment)]
pub struct Subcommand {
	/// Path to a configuration file (YAML format) to configure the server, CORS and the imagery tool.
	/// Command line arguments will override configuration file settings.
	#[arg(short = 'c', long, value_name = "FILE", display_order = 0)]
	pub config: Option<PathBuf>,

	/// Serve via socket ip. Default: 0.0.0.0
	#[arg(short = 'i', long, display_order = 0)]
	pub ip: Option<String>,

	/// Serve via port. Default: 8080
	#[arg(short, long, display_order = 0)]
	pub port: Option<u16>,

	/// Imagery tool to run. Default: GEHistoricalImagery
	#[arg(long, value_name = "PROGRAM", display_order = 1)]
	pub program: Option<String>,

	/// Shutdown server automatically after x milliseconds.
	#[arg(long, display_order = 4)]
	pub auto_shutdown: Option<u64>,

	/// disable API
	#[arg(long, display_order = 4)]
	pub disable_api: Option<bool>,
}

/// Configuration file merged with the command line.
pub fn build_config(arguments: &Subcommand) -> Result<Config> {
	let mut config = match &arguments.config {
		Some(path) => Config::from_path(path)?,
		None => Config::default(),
	};

	config.server.override_optional_ip(&arguments.ip);
	config.server.override_optional_port(&arguments.port);
	config.server.override_optional_disable_api(&arguments.disable_api);
	config.engine.override_optional_program(&arguments.program);
	Ok(config)
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let config = build_config(arguments)?;
	log::debug!("using configuration: {config:?}");

	let engine = CommandEngine::from_config(&config.engine);
	eprintln!("imagery tool: {} (cache: {:?})", engine.program(), engine.cache_dir());

	let mut coordinator = ExecutionCoordinator::new(Arc::new(engine));
	if let Some(temp_dir) = &config.temp_dir {
		coordinator = coordinator.with_temp_storage(TempStorage::new(temp_dir));
	}

	let mut server = ImageryServer::from_config(&config, coordinator);
	server.start().await?;

	if let Some(milliseconds) = arguments.auto_shutdown {
		sleep(Duration::from_millis(milliseconds)).await;
	} else {
		loop {
			sleep(Duration::from_secs(60)).await;
		}
	}

	server.stop().await;
	Ok(())
}
