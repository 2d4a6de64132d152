//! Microtask queue
//!
//! The only scheduling primitive of the runtime. Work queued here runs after the
//! current synchronous task finishes, when the host calls [`run_microtasks`].
//! Draining continues until the queue is empty, so microtasks queued by other
//! microtasks run within the same drain, in FIFO order.

use std::cell::RefCell;
use std::collections::VecDeque;

type Microtask = Box<dyn FnOnce() + 'static>;

thread_local! {
	static MICROTASKS: RefCell<VecDeque<Microtask>> = const { RefCell::new(VecDeque::new()) };
}

/// Queue `task` to run on the next microtask boundary.
pub fn queue_microtask<F>(task: F)
where
	F: FnOnce() + 'static,
{
	MICROTASKS.with(|queue| queue.borrow_mut().push_back(Box::new(task)));
}

/// Drain the microtask queue, returning how many tasks ran.
///
/// The queue borrow is released before each task runs, so tasks may queue
/// further microtasks.
pub fn run_microtasks() -> usize {
	let mut ran = 0;
	loop {
		let next = MICROTASKS.with(|queue| queue.borrow_mut().pop_front());
		match next {
			Some(task) => {
				task();
				ran += 1;
			}
			None => break,
		}
	}
	ran
}

/// Number of microtasks waiting to run.
pub fn pending_microtasks() -> usize {
	MICROTASKS.with(|queue| queue.borrow().len())
}
