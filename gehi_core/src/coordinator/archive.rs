use anyhow::{Context, Result};
use flate2::{Compression, write::GzEncoder};
use std::{
	fs::File,
	path::{Path, PathBuf},
};
use tar::Builder;

/// Whether `dir` contains at least one regular file, at any depth.
pub async fn contains_files(dir: &Path) -> Result<bool> {
	let mut pending = vec![dir.to_path_buf()];
	while let Some(dir) = pending.pop() {
		let mut entries = tokio::fs::read_dir(&dir)
			.await
			.with_context(|| format!("reading directory {dir:?}"))?;
		while let Some(entry) = entries.next_entry().await? {
			let file_type = entry.file_type().await?;
			if file_type.is_file() {
				return Ok(true);
			}
			if file_type.is_dir() {
				pending.push(entry.path());
			}
		}
	}
	Ok(false)
}

/// Pack the contents of `dir` into a gzip compressed tar archive at `archive`.
///
/// Entries are stored relative to `dir`, without the directory itself.
pub async fn archive_directory(dir: &Path, archive: &Path) -> Result<()> {
	let dir: PathBuf = dir.to_path_buf();
	let archive: PathBuf = archive.to_path_buf();
	tokio::task::spawn_blocking(move || write_archive(&dir, &archive))
		.await
		.context("archive task panicked")?
}

fn write_archive(dir: &Path, archive: &Path) -> Result<()> {
	let file = File::create(archive).with_context(|| format!("creating archive {archive:?}"))?;
	let mut builder = Builder::new(GzEncoder::new(file, Compression::fast()));
	builder
		.append_dir_all(".", dir)
		.with_context(|| format!("adding {dir:?} to archive"))?;
	builder.into_inner()?.finish()?;
	Ok(())
}
