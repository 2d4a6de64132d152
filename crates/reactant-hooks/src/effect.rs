//! Effect hooks: use_effect, use_layout_effect and use_insertion_effect
//!
//! Each hook owns a deferred runtime effect that tracks the dependency list.
//! When the list changes, the hook's body is not run directly; a job is queued
//! on a phase scheduler that drains insertion jobs before layout jobs before
//! passive jobs. The ordering holds within one flush and across hooks.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use reactant_reactive::{ContextSnapshot, Effect, create_effect, queue_microtask};

use crate::deps::{Dep, track_deps};

/// Scheduling phase of an effect hook, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EffectPhase {
	/// `useInsertionEffect`
	Insertion,
	/// `useLayoutEffect`
	Layout,
	/// `useEffect`
	Passive,
}

impl EffectPhase {
	const ALL: [Self; 3] = [Self::Insertion, Self::Layout, Self::Passive];

	fn index(self) -> usize {
		match self {
			Self::Insertion => 0,
			Self::Layout => 1,
			Self::Passive => 2,
		}
	}
}

type Job = Box<dyn FnOnce()>;

#[derive(Default)]
struct PhaseQueue {
	queues: [VecDeque<Job>; 3],
	flush_scheduled: bool,
}

thread_local! {
	static SCHEDULER: RefCell<PhaseQueue> = RefCell::new(PhaseQueue::default());
}

fn schedule(phase: EffectPhase, job: Job) {
	let needs_flush = SCHEDULER.with(|scheduler| {
		let mut scheduler = scheduler.borrow_mut();
		scheduler.queues[phase.index()].push_back(job);
		!std::mem::replace(&mut scheduler.flush_scheduled, true)
	});
	if needs_flush {
		queue_microtask(flush_phases);
	}
}

/// Pop the next job from the highest-priority non-empty phase
fn next_job() -> Option<(EffectPhase, Job)> {
	SCHEDULER.with(|scheduler| {
		let mut scheduler = scheduler.borrow_mut();
		for phase in EffectPhase::ALL {
			if let Some(job) = scheduler.queues[phase.index()].pop_front() {
				return Some((phase, job));
			}
		}
		scheduler.flush_scheduled = false;
		None
	})
}

fn flush_phases() {
	let mut ran = 0usize;
	while let Some((phase, job)) = next_job() {
		tracing::trace!(?phase, "running effect job");
		job();
		ran += 1;
	}
	tracing::debug!(jobs = ran, "effect phases flushed");
}

type Body = Box<dyn FnMut() -> Option<Cleanup>>;
type Cleanup = Box<dyn FnOnce()>;

struct HookSlot {
	body: RefCell<Body>,
	cleanup: RefCell<Option<Cleanup>>,
	contexts: ContextSnapshot,
	queued: Cell<bool>,
	disposed: Cell<bool>,
}

impl HookSlot {
	fn run(&self) {
		self.queued.set(false);
		if self.disposed.get() {
			return;
		}
		self.run_cleanup();
		let Ok(mut body) = self.body.try_borrow_mut() else {
			tracing::trace!("skipping re-entrant effect hook body");
			return;
		};
		let cleanup = self.contexts.run(|| (&mut *body)());
		drop(body);
		*self.cleanup.borrow_mut() = cleanup;
	}

	fn run_cleanup(&self) {
		let cleanup = self.cleanup.borrow_mut().take();
		if let Some(cleanup) = cleanup {
			cleanup();
		}
	}
}

/// Handle to a declared effect hook
///
/// Dropping the handle disposes the hook.
#[must_use = "dropping the handle disposes the effect"]
pub struct EffectHandle {
	phase: EffectPhase,
	slot: Rc<HookSlot>,
	effect: Effect,
}

impl EffectHandle {
	/// Phase this hook's body is scheduled in
	pub fn phase(&self) -> EffectPhase {
		self.phase
	}

	/// Whether [`EffectHandle::dispose`] has been called
	pub fn is_disposed(&self) -> bool {
		self.slot.disposed.get()
	}

	/// Stop tracking, drop any queued run and call the pending cleanup
	pub fn dispose(&self) {
		if self.slot.disposed.replace(true) {
			return;
		}
		self.effect.dispose();
		self.slot.run_cleanup();
	}
}

impl Drop for EffectHandle {
	fn drop(&mut self) {
		self.dispose();
	}
}

impl std::fmt::Debug for EffectHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EffectHandle")
			.field("phase", &self.phase)
			.field("disposed", &self.is_disposed())
			.finish()
	}
}

/// Declare an effect hook in the given phase
///
/// The body sees the context providers visible at the declaration site.
/// With `deps == None` the body runs once. Otherwise the hook re-runs after
/// any trackable entry of `deps` (or anything those were declared with)
/// changes. Cleanups returned by the body run before the next run and on
/// dispose.
pub fn use_effect_in_phase<F, C>(phase: EffectPhase, mut body: F, deps: Option<Vec<Dep>>) -> EffectHandle
where
	F: FnMut() -> Option<C> + 'static,
	C: FnOnce() + 'static,
{
	let body: Body = Box::new(move || body().map(|cleanup| Box::new(cleanup) as Cleanup));
	let slot = Rc::new(HookSlot {
		body: RefCell::new(body),
		cleanup: RefCell::new(None),
		contexts: ContextSnapshot::capture(),
		queued: Cell::new(false),
		disposed: Cell::new(false),
	});

	let effect = create_effect({
		let slot = Rc::clone(&slot);
		move || {
			if let Some(deps) = &deps {
				track_deps(deps);
			}
			if slot.queued.replace(true) {
				return;
			}
			let slot = Rc::clone(&slot);
			schedule(phase, Box::new(move || slot.run()));
		}
	});

	EffectHandle {
		phase,
		slot,
		effect,
	}
}

/// Runs a side effect after the current synchronous work.
///
/// This is the equivalent of `useEffect`. The dependency list decides when it
/// re-runs; `None` means run once.
///
/// # Example
///
/// ```ignore
/// use reactant_hooks::{deps, use_effect, use_state};
///
/// let (count, set_count) = use_state(0);
/// let _log = use_effect({
///     let count = count.clone();
///     move || {
///         tracing::info!(count = count.peek(), "count changed");
///         None::<fn()>
///     }
/// }, Some(deps![count]));
/// ```
pub fn use_effect<F, C>(body: F, deps: Option<Vec<Dep>>) -> EffectHandle
where
	F: FnMut() -> Option<C> + 'static,
	C: FnOnce() + 'static,
{
	use_effect_in_phase(EffectPhase::Passive, body, deps)
}

/// Like [`use_effect`], but runs before any passive effect of the same flush
pub fn use_layout_effect<F, C>(body: F, deps: Option<Vec<Dep>>) -> EffectHandle
where
	F: FnMut() -> Option<C> + 'static,
	C: FnOnce() + 'static,
{
	use_effect_in_phase(EffectPhase::Layout, body, deps)
}

/// Like [`use_effect`], but runs before any layout or passive effect
pub fn use_insertion_effect<F, C>(body: F, deps: Option<Vec<Dep>>) -> EffectHandle
where
	F: FnMut() -> Option<C> + 'static,
	C: FnOnce() + 'static,
{
	use_effect_in_phase(EffectPhase::Insertion, body, deps)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::deps;
	use crate::state::use_state;
	use reactant_reactive::run_microtasks;
	use rstest::rstest;
	use serial_test::serial;

	fn recorder() -> Rc<RefCell<Vec<String>>> {
		Rc::new(RefCell::new(Vec::new()))
	}

	#[test]
	#[serial]
	fn test_phases_run_in_priority_order() {
		run_microtasks();
		let log = recorder();

		let _passive = use_effect(
			{
				let log = Rc::clone(&log);
				move || {
					log.borrow_mut().push("passive".to_string());
					None::<fn()>
				}
			},
			None,
		);
		let _insertion = use_insertion_effect(
			{
				let log = Rc::clone(&log);
				move || {
					log.borrow_mut().push("insertion".to_string());
					None::<fn()>
				}
			},
			None,
		);
		let _layout = use_layout_effect(
			{
				let log = Rc::clone(&log);
				move || {
					log.borrow_mut().push("layout".to_string());
					None::<fn()>
				}
			},
			None,
		);

		assert!(log.borrow().is_empty());
		run_microtasks();
		assert_eq!(*log.borrow(), vec!["insertion", "layout", "passive"]);
	}

	#[test]
	#[serial]
	fn test_effect_reruns_on_dependency_change_with_cleanup() {
		run_microtasks();
		let (count, set_count) = use_state(0);
		let log = recorder();

		let _handle = use_effect(
			{
				let count = count.clone();
				let log = Rc::clone(&log);
				move || {
					let seen = count.peek();
					log.borrow_mut().push(format!("run:{seen}"));
					let log = Rc::clone(&log);
					Some(move || log.borrow_mut().push(format!("cleanup:{seen}")))
				}
			},
			Some(deps![count]),
		);
		run_microtasks();

		set_count.update(|n| n + 1);
		set_count.update(|n| n + 1);
		run_microtasks();

		assert_eq!(*log.borrow(), vec!["run:0", "cleanup:0", "run:2"]);
	}

	#[test]
	#[serial]
	fn test_no_deps_runs_once() {
		run_microtasks();
		let (count, set_count) = use_state(0);
		let runs = Rc::new(Cell::new(0));

		let _handle = use_effect(
			{
				let count = count.clone();
				let runs = Rc::clone(&runs);
				move || {
					let _ = count.get();
					runs.set(runs.get() + 1);
					None::<fn()>
				}
			},
			None,
		);
		run_microtasks();
		set_count.set(3);
		run_microtasks();

		assert_eq!(runs.get(), 1);
	}

	#[test]
	#[serial]
	fn test_dispose_runs_pending_cleanup() {
		run_microtasks();
		let (count, set_count) = use_state(0);
		let log = recorder();

		let handle = use_layout_effect(
			{
				let log = Rc::clone(&log);
				move || {
					log.borrow_mut().push("run".to_string());
					let log = Rc::clone(&log);
					Some(move || log.borrow_mut().push("cleanup".to_string()))
				}
			},
			Some(deps![count]),
		);
		run_microtasks();
		handle.dispose();
		set_count.set(1);
		run_microtasks();

		assert!(handle.is_disposed());
		assert_eq!(*log.borrow(), vec!["run", "cleanup"]);
	}

	#[rstest]
	#[case(EffectPhase::Insertion, EffectPhase::Layout)]
	#[case(EffectPhase::Insertion, EffectPhase::Passive)]
	#[case(EffectPhase::Layout, EffectPhase::Passive)]
	fn test_phase_priority(#[case] high: EffectPhase, #[case] low: EffectPhase) {
		assert!(high < low);
		assert!(high.index() < low.index());
	}

	#[test]
	#[serial]
	fn test_rerun_order_follows_phase_after_shared_change() {
		run_microtasks();
		let (count, set_count) = use_state(0);
		let log = recorder();

		let make = |label: &'static str| {
			let log = Rc::clone(&log);
			move || {
				log.borrow_mut().push(label.to_string());
				None::<fn()>
			}
		};
		let _passive = use_effect(make("passive"), Some(deps![count]));
		let _layout = use_layout_effect(make("layout"), Some(deps![count]));
		let _insertion = use_insertion_effect(make("insertion"), Some(deps![count]));
		run_microtasks();
		log.borrow_mut().clear();

		set_count.set(1);
		run_microtasks();
		assert_eq!(*log.borrow(), vec!["insertion", "layout", "passive"]);
	}
}
