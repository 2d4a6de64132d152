//! # Reactant Hooks
//!
//! Dependency-array hooks emulated on the fine-grained reactive runtime.
//!
//! Components written against these hooks run once; everything that would
//! have been a re-render is a signal write propagating to subscribed
//! computations instead.
//!
//! ## Available Hooks
//!
//! - [`use_state`]: reactive getter and coalescing setter
//! - [`use_memo`] / [`use_callback`]: cached values visible through their declared dependencies
//! - [`use_effect`] / [`use_layout_effect`] / [`use_insertion_effect`]: phase-ordered side effects
//! - [`use_ref`]: mutable, non-reactive holder
//! - [`use_context`] / [`create_context`]: subtree-scoped values
//! - [`use_reducer`]: state folded through a reducer
//!
//! ## Dependency Lists
//!
//! ```ignore
//! use reactant_hooks::{deps, use_effect, use_memo, use_state};
//!
//! let (count, set_count) = use_state(1);
//! let doubled = use_memo({
//!     let count = count.clone();
//!     move || count.get() * 2
//! }, deps![count]);
//!
//! // Re-runs when `count` changes, reached through `doubled`'s declared deps
//! let _handle = use_effect({
//!     let doubled = doubled.clone();
//!     move || {
//!         tracing::info!(value = doubled.peek(), "doubled");
//!         None::<fn()>
//!     }
//! }, Some(deps![doubled, "label"]));
//!
//! set_count.update(|n| n + 1);
//! ```

pub mod children;
pub mod coalesce;
pub mod context;
pub mod deps;
pub mod effect;
pub mod error;
pub mod memo;
pub mod reducer;
pub mod refs;
pub mod state;

pub use children::Children;
pub use context::{Context, ContextConsumer, create_context, use_context};
pub use deps::{Dep, DepKey, IntoDep, Trackable, track_deps};
pub use effect::{EffectHandle, EffectPhase, use_effect, use_effect_in_phase, use_insertion_effect, use_layout_effect};
pub use error::{HookError, HookResult};
pub use memo::{CallbackRef, Memo, use_callback, use_memo};
pub use reducer::{Dispatch, use_reducer, use_reducer_with};
pub use refs::{Ref, use_ref};
pub use state::{SetState, State, use_state, use_state_with};

/// Build a dependency list
///
/// Each entry is converted with [`IntoDep`]; hook wrappers become trackable
/// entries, anything else is stored as a plain value.
#[macro_export]
macro_rules! deps {
	() => {
		::std::vec::Vec::<$crate::Dep>::new()
	};
	($($dep:expr),+ $(,)?) => {
		::std::vec![$($crate::IntoDep::into_dep(&$dep)),+]
	};
}
