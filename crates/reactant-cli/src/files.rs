//! Source file discovery and configuration lookup

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{CliError, CliResult};

/// Extensions the transform accepts
const SOURCE_EXTENSIONS: [&str; 6] = ["js", "jsx", "mjs", "cjs", "ts", "tsx"];

/// Directories never descended into
const SKIPPED_DIRS: [&str; 4] = ["node_modules", ".git", "target", "dist"];

pub(crate) const CONFIG_FILE: &str = "reactant.toml";

fn is_source_file(path: &Path) -> bool {
	let is_declaration = path
		.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| name.ends_with(".d.ts"));
	!is_declaration
		&& path
			.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Collect source files under `path`, sorted
///
/// A file path is returned as is when it has a source extension.
pub(crate) fn collect_source_files(path: &Path) -> CliResult<Vec<PathBuf>> {
	if path.is_file() {
		return Ok(if is_source_file(path) {
			vec![path.to_path_buf()]
		} else {
			Vec::new()
		});
	}
	if !path.is_dir() {
		return Err(CliError::MissingPath(path.to_path_buf()));
	}

	let mut files: Vec<PathBuf> = WalkDir::new(path)
		.follow_links(true)
		.into_iter()
		.filter_entry(|entry| {
			entry.depth() == 0
				|| !entry.file_type().is_dir()
				|| !entry
					.file_name()
					.to_str()
					.is_some_and(|name| SKIPPED_DIRS.contains(&name))
		})
		.filter_map(|entry| entry.ok())
		.filter(|entry| entry.file_type().is_file() && is_source_file(entry.path()))
		.map(|entry| entry.into_path())
		.collect();
	files.sort();
	Ok(files)
}

/// Find `reactant.toml` by searching upward from `start`
pub(crate) fn find_config(start: &Path) -> Option<PathBuf> {
	let mut current = if start.is_file() { start.parent() } else { Some(start) }?;
	loop {
		let config = current.join(CONFIG_FILE);
		if config.is_file() {
			return Some(config);
		}
		current = current.parent()?;
	}
}
