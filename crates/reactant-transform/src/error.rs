//! Error types for the transform engine

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors produced while transforming a unit of source text
#[derive(Debug, Error)]
pub enum TransformError {
	/// The source text does not parse. No partial output is produced.
	#[error("failed to parse {}: {}", describe_unit(.path.as_deref()), .messages.join("; "))]
	Parse {
		/// Path of the unit, when it came from a file
		path: Option<PathBuf>,
		/// Parser diagnostics, in reporting order
		messages: Vec<String>,
	},

	/// A configuration file could not be parsed
	#[error("invalid transform configuration: {message}")]
	Config {
		/// Parser message
		message: String,
	},

	/// A configuration file could not be read
	#[error("failed to read {}: {source}", .path.display())]
	Io {
		/// File that failed
		path: PathBuf,
		/// Underlying error
		#[source]
		source: std::io::Error,
	},
}

fn describe_unit(path: Option<&Path>) -> String {
	match path {
		Some(path) => path.display().to_string(),
		None => "<input>".to_string(),
	}
}

/// Result type for transform operations
pub type TransformResult<T> = Result<T, TransformError>;
