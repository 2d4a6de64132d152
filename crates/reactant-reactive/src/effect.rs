//! Effect - Reactive Computations
//!
//! `Effect` represents a computation that automatically re-runs when its
//! dependencies change. Any Signal read inside the effect closure becomes a
//! dependency; dependencies are re-collected on every run.
//!
//! Two timings exist (see [`EffectTiming`]):
//!
//! - [`create_render_effect`] runs immediately and re-runs synchronously inside
//!   the write that invalidated it.
//! - [`create_effect`] runs on the next microtask boundary and re-runs once per
//!   flush no matter how many of its sources changed.
//!
//! ## Example
//!
//! ```ignore
//! use reactant_reactive::{Signal, create_render_effect};
//!
//! let count = Signal::new(0);
//! let doubled = Signal::new(0);
//!
//! let _effect = create_render_effect({
//!     let (count, doubled) = (count.clone(), doubled.clone());
//!     move || doubled.set(count.get() * 2)
//! });
//!
//! count.set(5);
//! assert_eq!(doubled.get(), 10);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::context::{ContextSnapshot, snapshot, with_snapshot};
use crate::microtask::queue_microtask;
use crate::runtime::{EffectTiming, NodeId, NodeType, Observer, try_with_runtime, with_runtime};

type EffectFn = Rc<RefCell<dyn FnMut() + 'static>>;

struct EffectRecord {
	run: EffectFn,
	timing: EffectTiming,
	contexts: ContextSnapshot,
}

thread_local! {
	static EFFECTS: RefCell<BTreeMap<NodeId, EffectRecord>> = const { RefCell::new(BTreeMap::new()) };
}

/// Get the timing for an effect by its ID.
///
/// Returns `None` if the effect doesn't exist (never created or disposed).
pub(crate) fn effect_timing(effect_id: NodeId) -> Option<EffectTiming> {
	EFFECTS.with(|storage| storage.borrow().get(&effect_id).map(|record| record.timing))
}

/// A reactive effect that automatically re-runs when its dependencies change
///
/// Dropping the handle disposes the effect.
pub struct Effect {
	/// Unique identifier for this effect
	id: NodeId,
	/// Whether this effect has been disposed
	disposed: Rc<Cell<bool>>,
}

impl Effect {
	/// Create a deferred effect (first run on the next microtask boundary)
	pub fn new<F>(f: F) -> Self
	where
		F: FnMut() + 'static,
	{
		Self::new_with_timing(f, EffectTiming::Deferred)
	}

	/// Create an effect with the given timing
	pub fn new_with_timing<F>(mut f: F, timing: EffectTiming) -> Self
	where
		F: FnMut() + 'static,
	{
		let id = NodeId::new();
		let disposed = Rc::new(Cell::new(false));

		let disposed_flag = Rc::clone(&disposed);
		let run: EffectFn = Rc::new(RefCell::new(move || {
			if !disposed_flag.get() {
				f();
			}
		}));

		EFFECTS.with(|storage| {
			storage.borrow_mut().insert(
				id,
				EffectRecord {
					run,
					timing,
					contexts: snapshot(),
				},
			);
		});

		match timing {
			EffectTiming::Render => Self::execute_effect(id),
			EffectTiming::Deferred => queue_microtask(move || Self::execute_effect(id)),
		}

		Self { id, disposed }
	}

	/// Execute an effect by its ID
	///
	/// Re-entrant runs (an effect invalidating itself while running) are skipped.
	pub(crate) fn execute_effect(effect_id: NodeId) {
		let record = EFFECTS.with(|storage| {
			storage
				.borrow()
				.get(&effect_id)
				.map(|record| (Rc::clone(&record.run), record.timing, record.contexts.clone()))
		});
		let Some((run, timing, contexts)) = record else {
			return;
		};
		let Ok(mut effect_fn) = run.try_borrow_mut() else {
			tracing::trace!(?effect_id, "skipping re-entrant effect run");
			return;
		};

		with_runtime(|rt| {
			rt.clear_dependencies(effect_id);
			rt.push_observer(Observer {
				id: effect_id,
				node_type: NodeType::Effect,
				timing,
			});
		});

		with_snapshot(&contexts, || (&mut *effect_fn)());

		with_runtime(|rt| {
			rt.pop_observer();
		});
	}

	/// Get the NodeId of this effect
	pub fn id(&self) -> NodeId {
		self.id
	}

	/// Whether [`Effect::dispose`] has been called
	pub fn is_disposed(&self) -> bool {
		self.disposed.get()
	}

	/// Dispose this effect
	///
	/// After calling this, the effect will no longer run and is detached from
	/// the dependency graph.
	pub fn dispose(&self) {
		if self.disposed.replace(true) {
			return;
		}

		let _ = try_with_runtime(|rt| rt.remove_node(self.id));
		// The record is dropped after the borrow ends: its closure may own other effects
		let removed = EFFECTS.try_with(|storage| storage.borrow_mut().remove(&self.id));
		drop(removed);
	}
}

impl Drop for Effect {
	fn drop(&mut self) {
		self.dispose();
	}
}

/// Create a deferred effect (`createEffect`)
pub fn create_effect<F>(f: F) -> Effect
where
	F: FnMut() + 'static,
{
	Effect::new_with_timing(f, EffectTiming::Deferred)
}

/// Create a render effect (`createRenderEffect`)
pub fn create_render_effect<F>(f: F) -> Effect
where
	F: FnMut() + 'static,
{
	Effect::new_with_timing(f, EffectTiming::Render)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::{create_context, use_context};
	use crate::microtask::run_microtasks;
	use crate::signal::Signal;
	use serial_test::serial;

	#[test]
	#[serial]
	fn test_render_effect_runs_immediately() {
		let run_count = Rc::new(Cell::new(0));
		let counter = Rc::clone(&run_count);

		let _effect = create_render_effect(move || counter.set(counter.get() + 1));

		assert_eq!(run_count.get(), 1);
	}

	#[test]
	#[serial]
	fn test_deferred_effect_waits_for_microtask() {
		run_microtasks();
		let run_count = Rc::new(Cell::new(0));
		let counter = Rc::clone(&run_count);

		let _effect = create_effect(move || counter.set(counter.get() + 1));

		assert_eq!(run_count.get(), 0);
		run_microtasks();
		assert_eq!(run_count.get(), 1);
	}

	#[test]
	#[serial]
	fn test_render_effect_reruns_synchronously() {
		let signal = Signal::new(0);
		let values = Rc::new(RefCell::new(Vec::new()));

		let _effect = create_render_effect({
			let signal = signal.clone();
			let values = Rc::clone(&values);
			move || values.borrow_mut().push(signal.get())
		});

		signal.set(10);
		signal.set(20);
		assert_eq!(*values.borrow(), vec![0, 10, 20]);
	}

	#[test]
	#[serial]
	fn test_deferred_effect_runs_once_per_flush() {
		run_microtasks();
		let first = Signal::new(1);
		let second = Signal::new(2);
		let sums = Rc::new(RefCell::new(Vec::new()));

		let _effect = create_effect({
			let (first, second) = (first.clone(), second.clone());
			let sums = Rc::clone(&sums);
			move || sums.borrow_mut().push(first.get() + second.get())
		});
		run_microtasks();

		first.set(10);
		second.set(20);
		first.set(100);
		run_microtasks();

		assert_eq!(*sums.borrow(), vec![3, 120]);
	}

	#[test]
	#[serial]
	fn test_effect_dispose_stops_reruns() {
		let signal = Signal::new(0);
		let run_count = Rc::new(Cell::new(0));

		let effect = create_render_effect({
			let signal = signal.clone();
			let counter = Rc::clone(&run_count);
			move || {
				let _ = signal.get();
				counter.set(counter.get() + 1);
			}
		});
		effect.dispose();

		signal.set(10);
		run_microtasks();
		assert_eq!(run_count.get(), 1);
		assert!(effect.is_disposed());
	}

	#[test]
	#[serial]
	fn test_effect_drop_cleans_up() {
		let signal = Signal::new(0);
		let run_count = Rc::new(Cell::new(0));

		{
			let signal = signal.clone();
			let counter = Rc::clone(&run_count);
			let _effect = create_render_effect(move || {
				let _ = signal.get();
				counter.set(counter.get() + 1);
			});
		}

		signal.set(10);
		assert_eq!(run_count.get(), 1);
		assert_eq!(with_runtime(|rt| rt.subscriber_count(signal.id())), 0);
	}

	#[test]
	#[serial]
	fn test_effect_rerun_sees_captured_context() {
		let ctx = create_context("default");
		let signal = Signal::new(0);
		let seen = Rc::new(RefCell::new(Vec::new()));

		let _effect = ctx.provide("provided", || {
			create_render_effect({
				let ctx = ctx.clone();
				let signal = signal.clone();
				let seen = Rc::clone(&seen);
				move || {
					let _ = signal.get();
					seen.borrow_mut().push(use_context(&ctx));
				}
			})
		});

		signal.set(1);
		assert_eq!(*seen.borrow(), vec!["provided", "provided"]);
	}

	#[test]
	#[serial]
	fn test_self_invalidating_effect_does_not_recurse() {
		let signal = Signal::new(0);

		let _effect = create_render_effect({
			let signal = signal.clone();
			move || {
				let value = signal.get();
				if value < 5 {
					signal.set(value + 1);
				}
			}
		});

		assert_eq!(signal.get_untracked(), 1);
	}
}
