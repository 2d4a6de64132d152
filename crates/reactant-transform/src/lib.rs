//! # Reactant Transform
//!
//! Source-to-source transform of code written against an element-factory
//! framework into fine-grained reactive JSX.
//!
//! The transform parses each unit with `oxc`, but never prints the tree back:
//! every rewrite is an edit over the original text, so everything it does not
//! touch (comments, formatting, unrelated syntax) survives byte for byte.
//!
//! ## Rewrites
//!
//! - `createElement(tag, props, ...children)` through any alias becomes a JSX
//!   literal; tags only known at runtime go through the adapter helper
//! - Expressions in JSX attribute and child positions are deferred so they
//!   are re-read by the reactive runtime
//! - Effect callbacks read snapshots of their free variables through the
//!   peek helper instead of subscribing to them
//! - Anonymous function literals are given stable names
//!
//! ## Example
//!
//! ```
//! use reactant_transform::transform;
//!
//! let output = transform(
//! 	"import React from \"react\";\nconst el = React.createElement(\"div\", { className: \"a\" }, \"hi\");",
//! )
//! .unwrap();
//! assert_eq!(output, "import React from \"react\";\nconst el = <div class=\"a\">hi</div>;");
//! ```

pub mod edits;
pub mod error;
pub mod names;
pub mod options;
pub mod prepass;
mod rewrite;
pub mod scope;
pub mod transformer;

pub use error::{TransformError, TransformResult};
pub use options::TransformOptions;
pub use rewrite::HelperUse;
pub use transformer::Transformer;

/// Transform one unit with default options
pub fn transform(source: &str) -> TransformResult<String> {
	Transformer::default().transform(source)
}
