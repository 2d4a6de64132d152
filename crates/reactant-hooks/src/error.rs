//! Errors reported by the hook layer

use thiserror::Error;

/// Hook layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
	/// `Children::only` received zero or several elements
	#[error("Children::only expected exactly one child element, found {found}")]
	ChildrenOnly {
		/// Number of non-empty children present
		found: usize,
	},
}

/// Result type for hook operations
pub type HookResult<T> = Result<T, HookError>;
