//! Error types for the command-line tool

use std::path::PathBuf;

use reactant_transform::TransformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum CliError {
	#[error(transparent)]
	Transform(#[from] TransformError),

	#[error("failed to {action} {}: {source}", .path.display())]
	Io {
		action: &'static str,
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("path does not exist: {}", .0.display())]
	MissingPath(PathBuf),

	#[error("{0} file(s) would be rewritten")]
	WouldRewrite(usize),

	#[error("{0} file(s) failed to transform; nothing was written")]
	Failed(usize),
}

impl CliError {
	pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io {
			action,
			path: path.into(),
			source,
		}
	}
}

pub(crate) type CliResult<T> = Result<T, CliError>;
