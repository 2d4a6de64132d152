//! Memoization hooks: use_memo and use_callback
//!
//! The factory runs inside a render effect, so it recomputes whenever a
//! signal it reads changes. What a *consumer* of the memo subscribes to is
//! decided by the dependency list alone: reading the memo tracks the declared
//! dependencies and then returns the cached value.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use reactant_reactive::{Effect, create_render_effect, untrack};

use crate::deps::{Dep, DepKey, IntoDep, Trackable, track_deps};

enum Slot<T> {
	Empty,
	First(T),
	Bound(Weak<RefCell<T>>),
}

struct MemoInner<T: 'static> {
	value: Rc<RefCell<T>>,
	deps: Vec<Dep>,
	_effect: Effect,
}

/// Cached value returned by [`use_memo`]
pub struct Memo<T: 'static> {
	inner: Rc<MemoInner<T>>,
}

impl<T: 'static> Clone for Memo<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: Clone + 'static> Memo<T> {
	/// Track the declared dependencies and return the cached value
	pub fn get(&self) -> T {
		track_deps(&self.inner.deps);
		self.peek()
	}

	/// Cached value without tracking
	pub fn peek(&self) -> T {
		self.inner.value.borrow().clone()
	}
}

impl<T: 'static> Memo<T> {
	/// Borrow the cached value after tracking the declared dependencies
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		track_deps(&self.inner.deps);
		f(&self.inner.value.borrow())
	}

	/// Declared dependencies
	pub fn deps(&self) -> &[Dep] {
		&self.inner.deps
	}
}

impl<T: Clone + 'static> Trackable for MemoInner<T> {
	fn key(&self) -> DepKey {
		DepKey::Shared(self as *const Self as *const () as usize)
	}

	fn track(&self) {}

	fn deps(&self) -> &[Dep] {
		&self.deps
	}

	fn peek_any(&self) -> Option<Box<dyn Any>> {
		Some(Box::new(self.value.borrow().clone()))
	}
}

impl<T: Clone + 'static> IntoDep for Memo<T> {
	fn into_dep(&self) -> Dep {
		Dep::Trackable(Rc::clone(&self.inner) as Rc<dyn Trackable>)
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Memo<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Memo")
			.field("value", &*self.inner.value.borrow())
			.field("deps", &self.inner.deps.len())
			.finish()
	}
}

/// Run `factory` in a render effect, returning the shared cache it writes to
fn computed<T, F>(factory: F) -> (Rc<RefCell<T>>, Effect)
where
	T: 'static,
	F: FnMut() -> T + 'static,
{
	let factory = Rc::new(RefCell::new(factory));
	let slot = Rc::new(RefCell::new(Slot::Empty));

	let effect = create_render_effect({
		let factory = Rc::clone(&factory);
		let slot = Rc::clone(&slot);
		move || {
			let next = (&mut *factory.borrow_mut())();
			let bound = match &*slot.borrow() {
				Slot::Bound(weak) => Some(weak.clone()),
				_ => None,
			};
			match bound {
				Some(weak) => {
					if let Some(cache) = weak.upgrade() {
						*cache.borrow_mut() = next;
					}
				}
				None => *slot.borrow_mut() = Slot::First(next),
			}
		}
	});

	let first = std::mem::replace(&mut *slot.borrow_mut(), Slot::Empty);
	let value = match first {
		Slot::First(value) => value,
		_ => untrack(|| (&mut *factory.borrow_mut())()),
	};
	let cache = Rc::new(RefCell::new(value));
	*slot.borrow_mut() = Slot::Bound(Rc::downgrade(&cache));
	(cache, effect)
}

/// Memoizes a calculation against a dependency list.
///
/// This is the equivalent of `useMemo`. The factory re-runs whenever a signal
/// it reads changes. Readers of the memo subscribe to the declared `deps`
/// (and, transitively, to the dependencies of any memo or callback listed
/// there), never to the factory's own reads.
///
/// # Arguments
///
/// * `factory` - Computes the value
/// * `deps` - Dependency list, usually built with [`deps!`](crate::deps)
///
/// # Example
///
/// ```ignore
/// use reactant_hooks::{deps, use_memo, use_state};
///
/// let (items, set_items) = use_state(vec![1, 2, 3]);
/// let total = use_memo({
///     let items = items.clone();
///     move || items.get().iter().sum::<i32>()
/// }, deps![items]);
///
/// assert_eq!(total.get(), 6);
/// ```
pub fn use_memo<T, F>(factory: F, deps: Vec<Dep>) -> Memo<T>
where
	T: Clone + 'static,
	F: FnMut() -> T + 'static,
{
	let (value, effect) = computed(factory);
	Memo {
		inner: Rc::new(MemoInner {
			value,
			deps,
			_effect: effect,
		}),
	}
}

/// Memoized function returned by [`use_callback`]
pub struct CallbackRef<A: 'static, R: 'static> {
	memo: Memo<Rc<dyn Fn(A) -> R>>,
}

impl<A: 'static, R: 'static> Clone for CallbackRef<A, R> {
	fn clone(&self) -> Self {
		Self {
			memo: self.memo.clone(),
		}
	}
}

impl<A: 'static, R: 'static> CallbackRef<A, R> {
	/// Track the declared dependencies and return the function
	pub fn get(&self) -> Rc<dyn Fn(A) -> R> {
		self.memo.get()
	}

	/// Function without tracking
	pub fn peek(&self) -> Rc<dyn Fn(A) -> R> {
		self.memo.peek()
	}

	/// Invoke the function after tracking the declared dependencies
	pub fn call(&self, args: A) -> R {
		(self.get())(args)
	}

	/// Declared dependencies
	pub fn deps(&self) -> &[Dep] {
		self.memo.deps()
	}
}

impl<A: 'static, R: 'static> IntoDep for CallbackRef<A, R> {
	fn into_dep(&self) -> Dep {
		self.memo.into_dep()
	}
}

impl<A: 'static, R: 'static> fmt::Debug for CallbackRef<A, R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CallbackRef")
			.field("deps", &self.memo.deps().len())
			.finish()
	}
}

/// Memoizes a function against a dependency list.
///
/// This is the equivalent of `useCallback`, i.e. [`use_memo`] over a function
/// value. The returned reference is itself trackable, so listing it in
/// another hook's dependencies forwards to `deps`.
pub fn use_callback<A, R, F>(callback: F, deps: Vec<Dep>) -> CallbackRef<A, R>
where
	A: 'static,
	R: 'static,
	F: Fn(A) -> R + 'static,
{
	let callback: Rc<dyn Fn(A) -> R> = Rc::new(callback);
	CallbackRef {
		memo: use_memo(move || Rc::clone(&callback), deps),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::deps;
	use crate::state::use_state;
	use reactant_reactive::{Signal, create_render_effect, run_microtasks};
	use serial_test::serial;
	use std::cell::Cell;

	#[test]
	#[serial]
	fn test_memo_recomputes_on_factory_reads() {
		run_microtasks();
		let (count, set_count) = use_state(2);
		let runs = Rc::new(Cell::new(0));

		let doubled = use_memo(
			{
				let count = count.clone();
				let runs = Rc::clone(&runs);
				move || {
					runs.set(runs.get() + 1);
					count.get() * 2
				}
			},
			deps![count],
		);
		assert_eq!(doubled.get(), 4);

		set_count.set(5);
		run_microtasks();
		assert_eq!(doubled.peek(), 10);
		assert_eq!(runs.get(), 2);
	}

	#[test]
	#[serial]
	fn test_reader_follows_declared_deps_only() {
		run_microtasks();
		let undeclared = Signal::new(0);
		let (declared_state, set_declared) = use_state(0);
		let reads = Rc::new(Cell::new(0));

		let memo = use_memo(
			{
				let undeclared = undeclared.clone();
				move || undeclared.get()
			},
			deps![declared_state],
		);

		let _reader = create_render_effect({
			let memo = memo.clone();
			let reads = Rc::clone(&reads);
			move || {
				let _ = memo.get();
				reads.set(reads.get() + 1);
			}
		});

		undeclared.set(1);
		assert_eq!(reads.get(), 1);
		assert_eq!(memo.peek(), 1);

		set_declared.set(1);
		run_microtasks();
		assert_eq!(reads.get(), 2);
	}

	#[test]
	#[serial]
	fn test_callback_is_trackable_through_its_deps() {
		run_microtasks();
		let (step, set_step) = use_state(1);
		let add = use_callback(
			{
				let step = step.clone();
				move |n: i32| n + step.peek()
			},
			deps![step],
		);
		let reads = Rc::new(Cell::new(0));

		let _reader = create_render_effect({
			let add = add.clone();
			let reads = Rc::clone(&reads);
			move || {
				track_deps(&deps![add]);
				reads.set(reads.get() + 1);
			}
		});

		assert_eq!(add.call(1), 2);
		set_step.set(10);
		run_microtasks();
		assert_eq!(add.call(1), 11);
		assert_eq!(reads.get(), 2);
	}

	#[test]
	fn test_memo_dep_key_is_stable() {
		let memo = use_memo(|| 1, Vec::new());
		assert_eq!(memo.into_dep().key(), memo.clone().into_dep().key());
	}
}
