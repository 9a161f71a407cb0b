#![allow(unused)]

use assert_cmd::{Command, cargo};
use std::{
	net::TcpListener,
	path::Path,
	process::{Child, Stdio},
	thread,
	time::Duration,
};
use tempfile::TempDir;

#[cfg(windows)]
pub const BINARY_NAME: &str = "gehi.exe";
#[cfg(not(windows))]
pub const BINARY_NAME: &str = "gehi";

/// Helper to create a Command for the gehi binary.
pub fn gehi_cmd() -> Command {
	Command::new(cargo::cargo_bin!())
}

/// A `gehi serve` process on a free local port, killed on drop.
pub struct Server {
	pub host: String,
	child: Child,
	_temp_dir: TempDir,
}

impl Server {
	/// Start the server with `config` written to a temporary YAML file.
	pub async fn new(config: &str) -> Self {
		let temp_dir = tempfile::tempdir().unwrap();
		let config_path = temp_dir.path().join("gehi.yml");
		std::fs::write(&config_path, config).unwrap();

		let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
		let mut child = std::process::Command::new(cargo::cargo_bin!())
			.args([
				"serve",
				"-c",
				config_path.to_str().unwrap(),
				"-i",
				"127.0.0.1",
				"-p",
				&port.to_string(),
			])
			.stdout(Stdio::null())
			.stderr(Stdio::null())
			.spawn()
			.unwrap();

		let host = format!("http://127.0.0.1:{port}");
		for _ in 0..100 {
			if let Some(status) = child.try_wait().unwrap() {
				panic!("server exited prematurely with {status:?}");
			}
			if reqwest::get(format!("{host}/status")).await.is_ok() {
				return Self {
					host,
					child,
					_temp_dir: temp_dir,
				};
			}
			thread::sleep(Duration::from_millis(100));
		}
		panic!("server did not become ready on {host}");
	}

	pub async fn get(&self, path: &str) -> (u16, String) {
		let response = reqwest::get(format!("{}{path}", self.host)).await.unwrap();
		(response.status().as_u16(), response.text().await.unwrap())
	}

	pub async fn post(&self, path: &str, json: &str) -> (u16, Vec<u8>) {
		let response = reqwest::Client::new()
			.post(format!("{}{path}", self.host))
			.header("content-type", "application/json")
			.body(json.to_owned())
			.send()
			.await
			.unwrap();
		(response.status().as_u16(), response.bytes().await.unwrap().to_vec())
	}
}

impl Drop for Server {
	fn drop(&mut self) {
		let _ = self.child.kill();
		let _ = self.child.wait();
	}
}
