//! Signal - Fine-grained Reactive Primitive
//!
//! `Signal<T>` holds a value and tracks dependencies when accessed.
//!
//! ## Key Features
//!
//! - **Automatic Dependency Tracking**: When `get()` is called inside an Effect,
//!   the dependency is automatically recorded.
//! - **Eager Propagation**: `set()` and `update()` re-run render effects before
//!   returning and queue deferred effects for the next microtask flush.
//! - **Lightweight**: cloning a `Signal<T>` shares the same value and node.
//!
//! ## Example
//!
//! ```ignore
//! use reactant_reactive::{Signal, create_signal};
//!
//! let count = Signal::new(0);
//! count.set(42);
//! count.update(|n| *n += 1);
//! assert_eq!(count.get(), 43);
//!
//! let (read, write) = create_signal("a");
//! write.set("b");
//! assert_eq!(read.get(), "b");
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::runtime::{NodeId, try_with_runtime, with_runtime};

/// A reactive signal that holds a value and tracks dependencies
///
/// All clones of the same Signal share the same underlying value and node.
pub struct Signal<T: 'static> {
	/// Unique identifier for this signal
	id: NodeId,
	/// The actual value, shared via reference counting
	value: Rc<RefCell<T>>,
}

impl<T: 'static> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			value: Rc::clone(&self.value),
		}
	}
}

impl<T: 'static> Signal<T> {
	/// Create a new Signal with the given initial value
	pub fn new(value: T) -> Self {
		Self {
			id: NodeId::new(),
			value: Rc::new(RefCell::new(value)),
		}
	}

	/// Get the current value, subscribing the running observer
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		with_runtime(|rt| rt.track_dependency(self.id));
		self.get_untracked()
	}

	/// Get the current value without tracking dependencies
	pub fn get_untracked(&self) -> T
	where
		T: Clone,
	{
		self.value.borrow().clone()
	}

	/// Borrow the current value, subscribing the running observer
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		with_runtime(|rt| rt.track_dependency(self.id));
		self.with_untracked(f)
	}

	/// Borrow the current value without tracking dependencies
	pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.value.borrow())
	}

	/// Set the signal to a new value and propagate to subscribers
	pub fn set(&self, value: T) {
		*self.value.borrow_mut() = value;
		with_runtime(|rt| rt.notify_signal_change(self.id));
	}

	/// Update the signal's value in place and propagate once
	pub fn update<F>(&self, f: F)
	where
		F: FnOnce(&mut T),
	{
		f(&mut *self.value.borrow_mut());
		with_runtime(|rt| rt.notify_signal_change(self.id));
	}

	/// Get the NodeId of this signal
	pub fn id(&self) -> NodeId {
		self.id
	}
}

impl<T: 'static> Drop for Signal<T> {
	fn drop(&mut self) {
		// Only the last clone detaches the node from the graph
		if Rc::strong_count(&self.value) == 1 {
			let _ = try_with_runtime(|rt| rt.remove_node(self.id));
		}
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("id", &self.id)
			.field("value", &*self.value.borrow())
			.finish()
	}
}

/// Read half of a signal created by [`create_signal`]
pub struct ReadSignal<T: 'static>(Signal<T>);

/// Write half of a signal created by [`create_signal`]
pub struct WriteSignal<T: 'static>(Signal<T>);

impl<T: 'static> Clone for ReadSignal<T> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<T: 'static> Clone for WriteSignal<T> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<T: 'static> ReadSignal<T> {
	/// Tracked read
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.0.get()
	}

	/// Untracked read
	pub fn get_untracked(&self) -> T
	where
		T: Clone,
	{
		self.0.get_untracked()
	}

	/// Tracked borrow
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		self.0.with(f)
	}

	/// The underlying signal
	pub fn signal(&self) -> &Signal<T> {
		&self.0
	}
}

impl<T: 'static> WriteSignal<T> {
	/// Replace the value and propagate
	pub fn set(&self, value: T) {
		self.0.set(value);
	}

	/// Mutate the value in place and propagate
	pub fn update(&self, f: impl FnOnce(&mut T)) {
		self.0.update(f);
	}
}

/// Create a signal and return its getter/setter pair
pub fn create_signal<T: 'static>(value: T) -> (ReadSignal<T>, WriteSignal<T>) {
	let signal = Signal::new(value);
	(ReadSignal(signal.clone()), WriteSignal(signal))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::runtime::{EffectTiming, NodeType, Observer};
	use serial_test::serial;

	#[test]
	#[serial]
	fn test_signal_creation() {
		let signal = Signal::new(42);
		assert_eq!(signal.get_untracked(), 42);
	}

	#[test]
	#[serial]
	fn test_signal_set_and_update() {
		let signal = Signal::new(0);

		signal.set(100);
		assert_eq!(signal.get_untracked(), 100);

		signal.update(|n| *n *= 2);
		assert_eq!(signal.get_untracked(), 200);
	}

	#[test]
	#[serial]
	fn test_signal_clone_shares_value() {
		let signal1 = Signal::new(42);
		let signal2 = signal1.clone();

		signal1.set(100);
		assert_eq!(signal2.get_untracked(), 100);
		assert_eq!(signal1.id(), signal2.id());
	}

	#[test]
	#[serial]
	fn test_create_signal_pair() {
		let (read, write) = create_signal(String::from("a"));
		write.set("b".to_string());
		assert_eq!(read.get(), "b");
		write.update(|s| s.push('c'));
		assert_eq!(read.with(|s| s.len()), 2);
	}

	#[test]
	#[serial]
	fn test_signal_dependency_tracking() {
		let signal = Signal::new(42);

		with_runtime(|rt| {
			let observer_id = NodeId::new();
			rt.push_observer(Observer {
				id: observer_id,
				node_type: NodeType::Effect,
				timing: EffectTiming::default(),
			});

			let _ = signal.get();
			rt.pop_observer();

			let graph = rt.dependency_graph.borrow();
			let signal_node = graph.get(&signal.id()).unwrap();
			assert!(signal_node.subscribers.contains(&observer_id));
			drop(graph);
			rt.remove_node(observer_id);
		});
	}

	#[test]
	#[serial]
	fn test_untracked_read_does_not_subscribe() {
		let signal = Signal::new(1);

		with_runtime(|rt| {
			let observer_id = NodeId::new();
			rt.push_observer(Observer {
				id: observer_id,
				node_type: NodeType::Effect,
				timing: EffectTiming::default(),
			});

			let _ = signal.get_untracked();
			signal.with_untracked(|_| ());
			rt.pop_observer();

			assert_eq!(rt.subscriber_count(signal.id()), 0);
		});
	}
}
