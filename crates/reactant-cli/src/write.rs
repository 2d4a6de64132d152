//! File writing with rollback
//!
//! In-place rewrites go through [`atomic_write`]; the originals of every file
//! written so far are kept so a failed write can put the tree back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use colored::Colorize;

/// Write `content` to `path` through a temporary file and a rename
///
/// Original file permissions are preserved after the write.
pub(crate) fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
	let original_perms = std::fs::metadata(path).ok().map(|m| m.permissions());

	// Same directory, so the rename stays on one filesystem
	let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
	tmp_name.push(".reactant-tmp");
	let tmp_path = path.with_file_name(tmp_name);
	std::fs::write(&tmp_path, content)?;

	if let Err(e) = std::fs::rename(&tmp_path, path) {
		let _ = std::fs::remove_file(&tmp_path);
		return Err(e);
	}

	if let Some(perms) = original_perms {
		std::fs::set_permissions(path, perms)?;
	}
	Ok(())
}

/// Originals of files rewritten in place, in write order
#[derive(Debug, Default)]
pub(crate) struct WriteLog {
	written: Vec<PathBuf>,
	originals: HashMap<PathBuf, String>,
}

impl WriteLog {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Atomically replace `path`'s `original` content with `content`
	pub(crate) fn write(&mut self, path: &Path, original: &str, content: &str) -> std::io::Result<()> {
		atomic_write(path, content)?;
		self.written.push(path.to_path_buf());
		self.originals.insert(path.to_path_buf(), original.to_string());
		Ok(())
	}

	pub(crate) fn len(&self) -> usize {
		self.written.len()
	}

	/// Restore every written file
	///
	/// Failures are collected so one bad write does not stop the rest.
	pub(crate) fn rollback(self) -> Vec<(PathBuf, std::io::Error)> {
		let mut errors = Vec::new();
		for path in self.written.iter().rev() {
			if let Some(original) = self.originals.get(path)
				&& let Err(e) = atomic_write(path, original)
			{
				tracing::warn!(path = %path.display(), error = %e, "rollback failed");
				errors.push((path.clone(), e));
			}
		}
		errors
	}
}

pub(crate) fn report_rollback_errors(errors: &[(PathBuf, std::io::Error)]) {
	if errors.is_empty() {
		return;
	}
	eprintln!(
		"{} {} file(s) could not be rolled back:",
		"Warning:".yellow(),
		errors.len()
	);
	for (path, err) in errors {
		eprintln!("  - {}: {}", path.display(), err);
	}
}
