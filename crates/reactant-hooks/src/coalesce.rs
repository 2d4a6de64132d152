//! Write coalescing for state setters
//!
//! Every setter owns a [`PendingWrite`] cell. The first write after a commit
//! snapshots the committed value into the cell and queues a single microtask;
//! later writes in the same synchronous run compose on the cached value. The
//! microtask commits the final value once, so dependents observe one change.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use reactant_reactive::{Signal, queue_microtask};

/// Cached, not yet committed value of a coalescing setter
pub struct PendingWrite<T> {
	dirty: Cell<bool>,
	cache: RefCell<Option<T>>,
}

impl<T> Default for PendingWrite<T> {
	fn default() -> Self {
		Self {
			dirty: Cell::new(false),
			cache: RefCell::new(None),
		}
	}
}

impl<T> PendingWrite<T> {
	/// Whether a commit is queued
	pub fn is_dirty(&self) -> bool {
		self.dirty.get()
	}
}

impl<T: Clone> PendingWrite<T> {
	/// Value that will be committed, if a commit is queued
	pub fn pending(&self) -> Option<T> {
		self.cache.borrow().clone()
	}
}

/// Signal paired with its coalescing cell
pub(crate) struct CoalescingWriter<T: 'static> {
	signal: Signal<T>,
	cell: Rc<PendingWrite<T>>,
}

impl<T: 'static> Clone for CoalescingWriter<T> {
	fn clone(&self) -> Self {
		Self {
			signal: self.signal.clone(),
			cell: Rc::clone(&self.cell),
		}
	}
}

impl<T: Clone + 'static> CoalescingWriter<T> {
	pub(crate) fn new(signal: Signal<T>) -> Self {
		Self {
			signal,
			cell: Rc::new(PendingWrite::default()),
		}
	}

	pub(crate) fn cell(&self) -> &PendingWrite<T> {
		&self.cell
	}

	/// Compose `next` onto the pending value, queueing a commit if none is queued
	pub(crate) fn write(&self, next: impl FnOnce(&T) -> T) {
		if !self.cell.dirty.replace(true) {
			*self.cell.cache.borrow_mut() = Some(self.signal.get_untracked());
			let signal = self.signal.clone();
			let cell = Rc::clone(&self.cell);
			queue_microtask(move || commit(&cell, &signal));
		}

		// The borrow is released while `next` runs
		let current = self.cell.cache.borrow_mut().take();
		let current = match current {
			Some(value) => value,
			None => self.signal.get_untracked(),
		};
		let value = next(&current);
		*self.cell.cache.borrow_mut() = Some(value);
	}
}

fn commit<T: 'static>(cell: &PendingWrite<T>, signal: &Signal<T>) {
	let value = cell.cache.borrow_mut().take();
	cell.dirty.set(false);
	if let Some(value) = value {
		tracing::trace!(signal = ?signal.id(), "committing coalesced write");
		signal.set(value);
	}
}
