//! State hook: use_state
//!
//! `use_state` pairs a reactive getter with a coalescing setter. Reads go
//! through the signal and therefore subscribe the running computation; writes
//! are cached and committed once on the next microtask.

use std::any::Any;
use std::fmt;

use reactant_reactive::Signal;
use serde::{Serialize, Serializer};

use crate::coalesce::CoalescingWriter;
use crate::deps::{Dep, DepKey, IntoDep, Trackable};

/// Reactive getter returned by [`use_state`]
pub struct State<T: 'static> {
	signal: Signal<T>,
}

impl<T: 'static> Clone for State<T> {
	fn clone(&self) -> Self {
		Self {
			signal: self.signal.clone(),
		}
	}
}

impl<T: 'static> State<T> {
	pub(crate) fn from_signal(signal: Signal<T>) -> Self {
		Self { signal }
	}

	/// Read the committed value, subscribing the running computation
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.signal.get()
	}

	/// Borrow the committed value, subscribing the running computation
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		self.signal.with(f)
	}

	/// Read the committed value without subscribing
	pub fn peek(&self) -> T
	where
		T: Clone,
	{
		self.signal.get_untracked()
	}

	/// Underlying runtime signal
	pub fn signal(&self) -> &Signal<T> {
		&self.signal
	}

	/// Declared dependencies (always empty for state)
	pub fn deps(&self) -> &[Dep] {
		&[]
	}
}

impl<T: Clone + 'static> Trackable for State<T> {
	fn key(&self) -> DepKey {
		DepKey::Signal(self.signal.id())
	}

	fn track(&self) {
		self.signal.with(|_| ());
	}

	fn deps(&self) -> &[Dep] {
		&[]
	}

	fn peek_any(&self) -> Option<Box<dyn Any>> {
		Some(Box::new(self.signal.get_untracked()))
	}
}

impl<T: Clone + 'static> IntoDep for State<T> {
	fn into_dep(&self) -> Dep {
		Dep::Trackable(std::rc::Rc::new(self.clone()))
	}
}

impl<T: fmt::Display + 'static> fmt::Display for State<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.signal.with(|value| fmt::Display::fmt(value, f))
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for State<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.signal
			.with_untracked(|value| f.debug_tuple("State").field(value).finish())
	}
}

impl<T: Serialize + 'static> Serialize for State<T> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.signal.with(|value| value.serialize(serializer))
	}
}

/// Coalescing setter returned by [`use_state`]
///
/// Writes made in the same synchronous run are composed in order and
/// committed as one change on the next microtask. Updaters see the result of
/// the writes before them, not the committed value.
pub struct SetState<T: 'static> {
	writer: CoalescingWriter<T>,
}

impl<T: 'static> Clone for SetState<T> {
	fn clone(&self) -> Self {
		Self {
			writer: self.writer.clone(),
		}
	}
}

impl<T: Clone + 'static> SetState<T> {
	pub(crate) fn from_signal(signal: Signal<T>) -> Self {
		Self {
			writer: CoalescingWriter::new(signal),
		}
	}

	/// Replace the pending value
	pub fn set(&self, value: T) {
		self.writer.write(move |_| value);
	}

	/// Derive the pending value from the previous pending value
	pub fn update(&self, f: impl FnOnce(&T) -> T) {
		self.writer.write(f);
	}

	/// Value queued for the next commit, if any
	pub fn pending(&self) -> Option<T> {
		self.writer.cell().pending()
	}
}

impl<T: 'static> fmt::Debug for SetState<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SetState(..)")
	}
}

/// Creates a piece of reactive state.
///
/// This is the equivalent of `useState`. The getter reads reactively; the
/// setter batches writes made in the same synchronous run into one commit.
///
/// # Example
///
/// ```ignore
/// use reactant_hooks::use_state;
///
/// let (count, set_count) = use_state(0);
/// set_count.update(|n| n + 1);
/// set_count.update(|n| n + 2);
/// // Still 0 until the microtask queue drains, then 3
/// assert_eq!(count.peek(), 0);
/// ```
pub fn use_state<T: Clone + 'static>(initial: T) -> (State<T>, SetState<T>) {
	let signal = Signal::new(initial);
	(
		State::from_signal(signal.clone()),
		SetState::from_signal(signal),
	)
}

/// Like [`use_state`], computing the initial value lazily
pub fn use_state_with<T: Clone + 'static>(init: impl FnOnce() -> T) -> (State<T>, SetState<T>) {
	use_state(init())
}
