//! Ref hook: use_ref
//!
//! A ref is a mutable box that lives as long as its handles. It is not
//! reactive: writing `current` never re-runs anything.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Mutable, non-reactive holder returned by [`use_ref`]
pub struct Ref<T: 'static> {
	current: Rc<RefCell<Option<T>>>,
}

impl<T: 'static> Clone for Ref<T> {
	fn clone(&self) -> Self {
		Self {
			current: Rc::clone(&self.current),
		}
	}
}

impl<T: 'static> Ref<T> {
	/// Current value, if any
	pub fn current(&self) -> Option<T>
	where
		T: Clone,
	{
		self.current.borrow().clone()
	}

	/// Borrow the current value
	pub fn with_current<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
		f(self.current.borrow().as_ref())
	}

	/// Replace the current value, returning the previous one
	pub fn set_current(&self, value: Option<T>) -> Option<T> {
		std::mem::replace(&mut *self.current.borrow_mut(), value)
	}

	/// Store an element, the way a ref attribute would on mount
	pub fn attach(&self, value: T) {
		self.set_current(Some(value));
	}

	/// Clear the current value
	pub fn take(&self) -> Option<T> {
		self.current.borrow_mut().take()
	}

	/// Callback form suitable for a `ref` attribute
	pub fn callback(&self) -> impl Fn(T) + 'static {
		let current = Rc::clone(&self.current);
		move |value| *current.borrow_mut() = Some(value)
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Ref<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Ref")
			.field("current", &*self.current.borrow())
			.finish()
	}
}

/// Creates a mutable ref.
///
/// This is the equivalent of `useRef`. A missing initial value (`None`)
/// is the single "empty" state; there is no separate null.
///
/// # Example
///
/// ```ignore
/// use reactant_hooks::use_ref;
///
/// let renders = use_ref(0);
/// renders.set_current(renders.current().map(|n| n + 1));
///
/// let node = use_ref::<Element>(None);
/// let bind = node.callback();
/// ```
pub fn use_ref<T: 'static>(initial: impl Into<Option<T>>) -> Ref<T> {
	Ref {
		current: Rc::new(RefCell::new(initial.into())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use reactant_reactive::create_render_effect;
	use std::cell::Cell;

	#[test]
	fn test_initial_value_and_empty_ref() {
		let counter = use_ref(3);
		let empty = use_ref::<String>(None);

		assert_eq!(counter.current(), Some(3));
		assert_eq!(empty.current(), None);
	}

	#[test]
	fn test_callback_attaches_value() {
		let node = use_ref::<&'static str>(None);
		let bind = node.callback();

		bind("div#root");
		assert_eq!(node.current(), Some("div#root"));
		assert_eq!(node.take(), Some("div#root"));
		assert_eq!(node.current(), None);
	}

	#[test]
	fn test_writes_are_not_reactive() {
		let value = use_ref(0);
		let runs = Rc::new(Cell::new(0));

		let _effect = create_render_effect({
			let value = value.clone();
			let runs = Rc::clone(&runs);
			move || {
				let _ = value.current();
				runs.set(runs.get() + 1);
			}
		});

		value.attach(10);
		assert_eq!(runs.get(), 1);
		assert_eq!(value.set_current(None), Some(10));
	}
}
