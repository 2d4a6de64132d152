//! Reactive Runtime
//!
//! This module provides the core reactive runtime for managing Signal dependencies,
//! Effect execution, and update scheduling.
//!
//! ## Architecture
//!
//! The runtime follows the eager, fine-grained propagation model:
//!
//! 1. **Observer Stack**: Tracks the currently executing Effect
//! 2. **Dependency Tracking**: `Signal::get()` records an edge from the signal to the
//!    observer on top of the stack
//! 3. **Propagation**: A signal write synchronously re-runs render effects and queues
//!    deferred effects onto the microtask queue
//! 4. **Deferred Flush**: Deferred effects invalidated within one task are re-run once,
//!    in a single flush on the next microtask boundary
//!
//! ## Example
//!
//! ```ignore
//! use reactant_reactive::{Signal, Effect, run_microtasks};
//!
//! let count = Signal::new(0);
//!
//! let _effect = Effect::new({
//!     let count = count.clone();
//!     move || println!("Count is: {}", count.get())
//! });
//!
//! count.set(42);
//! run_microtasks(); // Prints "Count is: 0" then "Count is: 42"
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::effect::{Effect, effect_timing};
use crate::microtask::queue_microtask;

/// Unique identifier for reactive nodes (Signals, Effects, Contexts)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
	/// Create a new unique NodeId
	pub fn new() -> Self {
		static COUNTER: AtomicUsize = AtomicUsize::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

impl Default for NodeId {
	fn default() -> Self {
		Self::new()
	}
}

/// Type of reactive node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
	/// A Signal node (source of reactivity)
	Signal,
	/// An Effect node (computation that re-runs when its sources change)
	Effect,
}

/// Effect execution timing.
///
/// - Render effects run immediately on creation and synchronously inside the
///   write that invalidated them (`create_render_effect`)
/// - Deferred effects run on the microtask queue, once per flush (`create_effect`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectTiming {
	/// Runs synchronously
	Render,
	/// Runs on the next microtask boundary
	#[default]
	Deferred,
}

/// Observer represents a currently executing Effect
#[derive(Debug, Clone, Copy)]
pub struct Observer {
	/// Unique identifier for this observer
	pub id: NodeId,
	/// Type of this observer
	pub node_type: NodeType,
	/// Effect execution timing
	pub timing: EffectTiming,
}

/// Dependency graph node
#[derive(Debug, Default)]
pub(crate) struct DependencyNode {
	/// IDs of nodes that depend on this node
	pub(crate) subscribers: Vec<NodeId>,
	/// IDs of nodes this node depends on
	pub(crate) dependencies: Vec<NodeId>,
}

/// Reactive runtime
///
/// Manages the dependency graph and the deferred update queue. One instance
/// lives per thread; the model is strictly single-threaded.
pub struct Runtime {
	/// Observer stack for tracking currently executing effects
	observer_stack: RefCell<Vec<Observer>>,
	/// Dependency graph: NodeId -> DependencyNode
	pub(crate) dependency_graph: RefCell<BTreeMap<NodeId, DependencyNode>>,
	/// Deferred effects waiting for the next flush
	pub(crate) pending_updates: RefCell<Vec<NodeId>>,
	/// Whether a flush microtask is already queued
	pub(crate) update_scheduled: Cell<bool>,
}

impl Runtime {
	/// Create a new Runtime instance
	pub fn new() -> Self {
		Self {
			observer_stack: RefCell::new(Vec::new()),
			dependency_graph: RefCell::new(BTreeMap::new()),
			pending_updates: RefCell::new(Vec::new()),
			update_scheduled: Cell::new(false),
		}
	}

	/// Get the current observer (the currently executing Effect)
	pub fn current_observer(&self) -> Option<NodeId> {
		self.observer_stack
			.borrow()
			.last()
			.map(|observer| observer.id)
	}

	/// Push an observer onto the stack
	pub fn push_observer(&self, observer: Observer) {
		self.observer_stack.borrow_mut().push(observer);
	}

	/// Pop an observer from the stack
	pub fn pop_observer(&self) -> Option<Observer> {
		self.observer_stack.borrow_mut().pop()
	}

	/// Track a dependency between the current observer and a signal
	///
	/// Called by `Signal::get()`. Does nothing outside of a tracking scope.
	pub fn track_dependency(&self, signal_id: NodeId) {
		let Some(observer_id) = self.current_observer() else {
			return;
		};
		let mut graph = self.dependency_graph.borrow_mut();

		let signal_node = graph.entry(signal_id).or_default();
		if !signal_node.subscribers.contains(&observer_id) {
			signal_node.subscribers.push(observer_id);
		}

		let observer_node = graph.entry(observer_id).or_default();
		if !observer_node.dependencies.contains(&signal_id) {
			observer_node.dependencies.push(signal_id);
		}
	}

	/// Notify that a Signal has changed
	///
	/// Render effects re-run before this returns; deferred effects are queued
	/// for the next flush.
	pub fn notify_signal_change(&self, signal_id: NodeId) {
		let subscribers = {
			let graph = self.dependency_graph.borrow();
			match graph.get(&signal_id) {
				Some(node) => node.subscribers.clone(),
				None => return,
			}
		};

		let mut render_effects = Vec::new();
		for subscriber_id in subscribers {
			match effect_timing(subscriber_id) {
				Some(EffectTiming::Render) => render_effects.push(subscriber_id),
				Some(EffectTiming::Deferred) => self.schedule_update(subscriber_id),
				None => {}
			}
		}

		// Creation order: a computation can only read computations created before it
		render_effects.sort();
		for effect_id in render_effects {
			Effect::execute_effect(effect_id);
		}
	}

	/// Schedule a deferred effect for the next flush
	pub fn schedule_update(&self, node_id: NodeId) {
		{
			let mut pending = self.pending_updates.borrow_mut();
			if !pending.contains(&node_id) {
				pending.push(node_id);
			}
		}

		if !self.update_scheduled.replace(true) {
			queue_microtask(|| with_runtime(|rt| rt.flush_updates()));
		}
	}

	/// Re-run every deferred effect queued since the last flush
	pub fn flush_updates(&self) {
		self.update_scheduled.set(false);
		let pending = std::mem::take(&mut *self.pending_updates.borrow_mut());
		if !pending.is_empty() {
			tracing::trace!(count = pending.len(), "flushing deferred effects");
		}
		for node_id in pending {
			Effect::execute_effect(node_id);
		}
	}

	/// Run `f` with the observer stack hidden, so reads inside it do not subscribe
	pub fn untracked<R>(&self, f: impl FnOnce() -> R) -> R {
		let saved = std::mem::take(&mut *self.observer_stack.borrow_mut());
		let result = f();
		*self.observer_stack.borrow_mut() = saved;
		result
	}

	/// Clear dependencies for a node
	///
	/// Called before re-executing an Effect so it can re-track from scratch.
	pub fn clear_dependencies(&self, node_id: NodeId) {
		let mut graph = self.dependency_graph.borrow_mut();

		let dependencies = match graph.get_mut(&node_id) {
			Some(node) => std::mem::take(&mut node.dependencies),
			None => return,
		};

		for dep_id in dependencies {
			if let Some(dep_node) = graph.get_mut(&dep_id) {
				dep_node.subscribers.retain(|&id| id != node_id);
			}
		}
	}

	/// Remove a node from the dependency graph
	pub fn remove_node(&self, node_id: NodeId) {
		self.clear_dependencies(node_id);
		let removed = self.dependency_graph.borrow_mut().remove(&node_id);
		if let Some(node) = removed {
			let mut graph = self.dependency_graph.borrow_mut();
			for subscriber in node.subscribers {
				if let Some(sub_node) = graph.get_mut(&subscriber) {
					sub_node.dependencies.retain(|&id| id != node_id);
				}
			}
		}
	}

	/// Check if a node exists in the dependency graph (for testing)
	pub fn has_node(&self, node_id: NodeId) -> bool {
		self.dependency_graph.borrow().contains_key(&node_id)
	}

	/// Get the number of subscribers for a node (for testing)
	pub fn subscriber_count(&self, node_id: NodeId) -> usize {
		self.dependency_graph
			.borrow()
			.get(&node_id)
			.map(|node| node.subscribers.len())
			.unwrap_or(0)
	}
}

impl Default for Runtime {
	fn default() -> Self {
		Self::new()
	}
}

thread_local! {
	static RUNTIME: Runtime = Runtime::new();
}

/// Get a reference to the thread's runtime
pub fn with_runtime<F, R>(f: F) -> R
where
	F: FnOnce(&Runtime) -> R,
{
	RUNTIME.with(f)
}

/// Try to access the thread's runtime (safe version for Drop implementations)
///
/// Returns None if the thread-local storage has been destroyed.
pub(crate) fn try_with_runtime<F, R>(f: F) -> Option<R>
where
	F: FnOnce(&Runtime) -> R,
{
	RUNTIME.try_with(f).ok()
}

/// Run `f` without subscribing the current observer to anything it reads
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
	with_runtime(|rt| rt.untracked(f))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serial_test::serial;

	fn effect_observer(id: NodeId) -> Observer {
		Observer {
			id,
			node_type: NodeType::Effect,
			timing: EffectTiming::default(),
		}
	}

	#[test]
	#[serial]
	fn test_node_id_uniqueness() {
		let id1 = NodeId::new();
		let id2 = NodeId::new();
		let id3 = NodeId::new();

		assert_ne!(id1, id2);
		assert_ne!(id2, id3);
		assert_ne!(id1, id3);
	}

	#[test]
	#[serial]
	fn test_runtime_observer_stack() {
		let runtime = Runtime::new();
		assert!(runtime.current_observer().is_none());

		let id1 = NodeId::new();
		runtime.push_observer(effect_observer(id1));
		assert_eq!(runtime.current_observer(), Some(id1));

		let id2 = NodeId::new();
		runtime.push_observer(effect_observer(id2));
		assert_eq!(runtime.current_observer(), Some(id2));

		runtime.pop_observer();
		assert_eq!(runtime.current_observer(), Some(id1));

		runtime.pop_observer();
		assert!(runtime.current_observer().is_none());
	}

	#[test]
	#[serial]
	fn test_dependency_tracking() {
		let runtime = Runtime::new();
		let signal_id = NodeId::new();
		let effect_id = NodeId::new();

		runtime.push_observer(effect_observer(effect_id));
		runtime.track_dependency(signal_id);
		runtime.track_dependency(signal_id);

		let graph = runtime.dependency_graph.borrow();
		assert_eq!(graph.get(&signal_id).unwrap().subscribers, vec![effect_id]);
		assert_eq!(graph.get(&effect_id).unwrap().dependencies, vec![signal_id]);
	}

	#[test]
	#[serial]
	fn test_tracking_without_observer_is_noop() {
		let runtime = Runtime::new();
		let signal_id = NodeId::new();

		runtime.track_dependency(signal_id);

		assert!(!runtime.has_node(signal_id));
	}

	#[test]
	#[serial]
	fn test_untracked_hides_observer() {
		let runtime = Runtime::new();
		let signal_id = NodeId::new();
		let effect_id = NodeId::new();

		runtime.push_observer(effect_observer(effect_id));
		runtime.untracked(|| runtime.track_dependency(signal_id));

		assert_eq!(runtime.subscriber_count(signal_id), 0);
		assert_eq!(runtime.current_observer(), Some(effect_id));
	}

	#[test]
	#[serial]
	fn test_clear_dependencies() {
		let runtime = Runtime::new();
		let signal_id = NodeId::new();
		let effect_id = NodeId::new();

		runtime.push_observer(effect_observer(effect_id));
		runtime.track_dependency(signal_id);
		runtime.pop_observer();

		runtime.clear_dependencies(effect_id);

		let graph = runtime.dependency_graph.borrow();
		assert!(graph.get(&signal_id).unwrap().subscribers.is_empty());
		assert!(graph.get(&effect_id).unwrap().dependencies.is_empty());
	}

	#[test]
	#[serial]
	fn test_remove_node_detaches_both_directions() {
		let runtime = Runtime::new();
		let signal_id = NodeId::new();
		let effect_id = NodeId::new();

		runtime.push_observer(effect_observer(effect_id));
		runtime.track_dependency(signal_id);
		runtime.pop_observer();

		runtime.remove_node(signal_id);

		assert!(!runtime.has_node(signal_id));
		let graph = runtime.dependency_graph.borrow();
		assert!(graph.get(&effect_id).unwrap().dependencies.is_empty());
	}
}
