//! Transform configuration
//!
//! Supports TOML configuration files and builder-style overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TransformError, TransformResult};

/// Options controlling what the transform matches and what it emits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
	/// Module specifiers whose imports provide the element factory and hooks
	pub source_modules: Vec<String>,

	/// Module the injected helper import points at
	pub runtime_module: String,

	/// Helper that turns a runtime tag value into a component
	pub adapter_name: String,

	/// Helper that reads a dependency wrapper without subscribing
	pub peek_name: String,

	/// Base name of the temporary binding used for dynamic tags
	pub temp_tag_name: String,

	/// Base name given to anonymous function literals
	pub anon_fn_name: String,

	/// Prepend an import of the helpers the output uses
	pub inject_runtime_import: bool,
}

impl Default for TransformOptions {
	fn default() -> Self {
		Self {
			source_modules: vec!["react".to_string()],
			runtime_module: "reactant/runtime".to_string(),
			adapter_name: "__adapt".to_string(),
			peek_name: "__peek".to_string(),
			temp_tag_name: "TempCls".to_string(),
			anon_fn_name: "AnonFn".to_string(),
			inject_runtime_import: true,
		}
	}
}

impl TransformOptions {
	/// Also treat imports from `module` as the source framework
	pub fn with_source_module(mut self, module: impl Into<String>) -> Self {
		let module = module.into();
		if !self.source_modules.contains(&module) {
			self.source_modules.push(module);
		}
		self
	}

	/// Point the injected helper import at `module`
	pub fn with_runtime_module(mut self, module: impl Into<String>) -> Self {
		self.runtime_module = module.into();
		self
	}

	/// Rename the adapter and peek helpers
	pub fn with_helper_names(mut self, adapter: impl Into<String>, peek: impl Into<String>) -> Self {
		self.adapter_name = adapter.into();
		self.peek_name = peek.into();
		self
	}

	/// Leave helper imports to the caller
	pub fn without_runtime_import(mut self) -> Self {
		self.inject_runtime_import = false;
		self
	}

	/// Whether `specifier` names a source-framework module
	pub fn is_source_module(&self, specifier: &str) -> bool {
		self.source_modules.iter().any(|module| module == specifier)
	}

	/// Load configuration from a TOML file.
	///
	/// # Errors
	///
	/// Returns error if file cannot be read or parsed.
	pub fn from_file(path: impl AsRef<Path>) -> TransformResult<Self> {
		let content = std::fs::read_to_string(path.as_ref()).map_err(|e| TransformError::Io {
			path: path.as_ref().to_path_buf(),
			source: e,
		})?;

		Self::from_toml_str(&content)
	}

	/// Parse configuration from TOML string.
	pub fn from_toml_str(content: &str) -> TransformResult<Self> {
		toml::from_str(content).map_err(|e| TransformError::Config {
			message: e.to_string(),
		})
	}
}
