//! Temporary files and directories that delete themselves.
//!
//! The root defaults to the directory named by `GEHI_TEMP_DIR` and falls back
//! to the system temporary folder.

use anyhow::{Context, Result};
use std::{
	fmt::Debug,
	path::{Path, PathBuf},
	sync::LazyLock,
};
use uuid::Uuid;

static DEFAULT_TEMP_DIR: LazyLock<PathBuf> =
	LazyLock::new(|| std::env::var("GEHI_TEMP_DIR").map_or_else(|_| std::env::temp_dir(), PathBuf::from));

/// Hands out unique paths below one root directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TempStorage {
	root: PathBuf,
}

impl Default for TempStorage {
	fn default() -> Self {
		Self::new(DEFAULT_TEMP_DIR.as_path())
	}
}

impl TempStorage {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// A fresh path `{prefix}_{uuid}{extension}` below the root. Nothing is created on disk.
	pub fn unique_path(&self, prefix: &str, extension: &str) -> TempPath {
		let name = format!("{prefix}_{}{extension}", Uuid::new_v4().simple());
		TempPath::new(self.root.join(name))
	}

	/// Make sure the root directory exists.
	pub async fn prepare(&self) -> Result<()> {
		tokio::fs::create_dir_all(&self.root)
			.await
			.with_context(|| format!("creating temp directory {:?}", self.root))
	}
}

/// Owns a temporary file or directory and removes it when dropped.
pub struct TempPath {
	path: Option<PathBuf>,
}

impl TempPath {
	pub fn new(path: PathBuf) -> Self {
		Self { path: Some(path) }
	}

	pub fn path(&self) -> &Path {
		self.path.as_deref().unwrap_or(Path::new(""))
	}

	/// Give up ownership: the path is no longer deleted on drop.
	pub fn keep(mut self) -> PathBuf {
		self.path.take().unwrap_or_default()
	}

	/// Delete the path now on a blocking thread instead of in `drop`.
	///
	/// Directory trees can hold thousands of tiles; use this for them on async paths.
	pub async fn remove(mut self) {
		let Some(path) = self.path.take() else {
			return;
		};
		if let Err(e) = tokio::task::spawn_blocking(move || remove_best_effort(&path)).await {
			log::debug!("temporary path removal did not finish: {e}");
		}
	}

	pub async fn create_dir(&self) -> Result<()> {
		tokio::fs::create_dir_all(self.path())
			.await
			.with_context(|| format!("creating directory {:?}", self.path()))
	}
}

impl Drop for TempPath {
	fn drop(&mut self) {
		if let Some(path) = self.path.take() {
			remove_best_effort(&path);
		}
	}
}

impl Debug for TempPath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("TempPath").field(&self.path()).finish()
	}
}

/// Delete a file or directory tree. Failures are logged and otherwise ignored.
pub(crate) fn remove_best_effort(path: &Path) {
	let result = match std::fs::symlink_metadata(path) {
		Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
		Ok(_) => std::fs::remove_file(path),
		Err(_) => return,
	};
	match result {
		Ok(()) => log::trace!("removed temporary path {path:?}"),
		Err(e) => log::debug!("could not remove temporary path {path:?}: {e}"),
	}
}
