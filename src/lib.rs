//! # Reactant
//!
//! Run components written for an element-factory hook framework on a
//! fine-grained reactive runtime, without rewriting them by hand.
//!
//! Reactant has two halves that meet at the transformed source:
//!
//! - **Transform** (build time): rewrites `createElement` calls into JSX,
//!   defers dynamic attribute and child expressions, and snapshots the free
//!   variables of effect callbacks.
//! - **Hooks** (run time): `use_state`, `use_memo`, `use_effect` and friends
//!   emulated on signals, so a component body runs once and updates flow
//!   through subscriptions instead of re-renders.
//!
//! ## Feature Flags
//!
//! - `transform` - the source-to-source transform engine
//! - `reactive` - signals, effects, context and the microtask queue
//! - `hooks` - hook emulation (implies `reactive`)
//! - `full` (default) - everything
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use reactant::prelude::*;
//!
//! let jsx = transform("import React from \"react\";\nReact.createElement(\"br\", null);")?;
//!
//! let (count, set_count) = use_state(0);
//! set_count.update(|n| n + 1);
//! run_microtasks();
//! assert_eq!(count.peek(), 1);
//! ```

#[cfg(feature = "hooks")]
pub use reactant_hooks as hooks;
#[cfg(feature = "reactive")]
pub use reactant_reactive as reactive;
#[cfg(feature = "transform")]
pub use reactant_transform as transform;

#[cfg(feature = "transform")]
pub use reactant_transform::{TransformError, TransformOptions, TransformResult, Transformer};

#[cfg(feature = "hooks")]
pub use reactant_hooks::{
	Children, Dep, EffectHandle, EffectPhase, HookError, HookResult, IntoDep, Memo, Ref, SetState, State, deps,
};

#[cfg(feature = "reactive")]
pub use reactant_reactive::{Context, Signal, create_signal, run_microtasks};

/// Everything a transformed component needs in scope
pub mod prelude {
	#[cfg(feature = "hooks")]
	pub use reactant_hooks::{
		ContextConsumer, create_context, deps, track_deps, use_callback, use_context, use_effect,
		use_insertion_effect, use_layout_effect, use_memo, use_reducer, use_reducer_with, use_ref, use_state,
		use_state_with,
	};
	#[cfg(feature = "reactive")]
	pub use reactant_reactive::{create_effect, create_render_effect, run_microtasks, untrack};
	#[cfg(feature = "transform")]
	pub use reactant_transform::transform;
}
