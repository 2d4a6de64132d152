//! # Reactant Reactive
//!
//! The fine-grained reactive runtime that transformed components run on.
//!
//! It exposes exactly the primitives the hook layer is built from:
//!
//! - [`create_signal`] / [`Signal`]: a value whose reads subscribe the running effect
//! - [`create_render_effect`]: a computation that runs now and re-runs synchronously
//! - [`create_effect`]: a computation that runs and re-runs on the microtask queue
//! - [`create_context`] / [`use_context`]: values scoped to a subtree of computations
//!
//! plus the microtask queue itself ([`queue_microtask`], [`run_microtasks`]).
//! Everything is thread-local; the model is single-threaded and cooperative.

pub mod context;
pub mod effect;
pub mod microtask;
pub mod runtime;
pub mod signal;

pub use context::{Context, ContextSnapshot, create_context, use_context};
pub use effect::{Effect, create_effect, create_render_effect};
pub use microtask::{pending_microtasks, queue_microtask, run_microtasks};
pub use runtime::{EffectTiming, NodeId, Runtime, untrack, with_runtime};
pub use signal::{ReadSignal, Signal, WriteSignal, create_signal};
