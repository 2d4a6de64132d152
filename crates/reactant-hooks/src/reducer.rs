//! Reducer hook: use_reducer
//!
//! State plus a dispatch that folds actions through a reducer. Dispatches go
//! through the same coalescing setter as `use_state`, so several actions in
//! one synchronous run commit once.

use std::fmt;
use std::rc::Rc;

use reactant_reactive::Signal;

use crate::state::{SetState, State};

/// Action dispatcher returned by [`use_reducer`]
pub struct Dispatch<A: 'static> {
	dispatch: Rc<dyn Fn(A)>,
}

impl<A: 'static> Clone for Dispatch<A> {
	fn clone(&self) -> Self {
		Self {
			dispatch: Rc::clone(&self.dispatch),
		}
	}
}

impl<A: 'static> Dispatch<A> {
	/// Queue an action
	pub fn dispatch(&self, action: A) {
		(self.dispatch)(action);
	}
}

impl<A: 'static> fmt::Debug for Dispatch<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Dispatch(..)")
	}
}

/// Manages state through a reducer.
///
/// This is the equivalent of `useReducer`. Each action is applied to the
/// pending state left by the actions before it.
///
/// # Example
///
/// ```ignore
/// use reactant_hooks::use_reducer;
///
/// enum Action { Add(i32), Reset }
///
/// let (total, dispatch) = use_reducer(|state: &i32, action| match action {
///     Action::Add(n) => state + n,
///     Action::Reset => 0,
/// }, 0);
/// dispatch.dispatch(Action::Add(2));
/// ```
pub fn use_reducer<S, A, R>(reducer: R, initial: S) -> (State<S>, Dispatch<A>)
where
	S: Clone + 'static,
	A: 'static,
	R: Fn(&S, A) -> S + 'static,
{
	let signal = Signal::new(initial);
	let state = State::from_signal(signal.clone());
	let setter = SetState::from_signal(signal);

	let dispatch = Dispatch {
		dispatch: Rc::new(move |action: A| setter.update(|current| reducer(current, action))),
	};
	(state, dispatch)
}

/// Like [`use_reducer`], deriving the initial state from `arg` with `init`
pub fn use_reducer_with<S, A, I, R>(reducer: R, arg: I, init: impl FnOnce(I) -> S) -> (State<S>, Dispatch<A>)
where
	S: Clone + 'static,
	A: 'static,
	R: Fn(&S, A) -> S + 'static,
{
	use_reducer(reducer, init(arg))
}

#[cfg(test)]
mod tests {
	use super::*;
	use reactant_reactive::{create_render_effect, run_microtasks};
	use serial_test::serial;
	use std::cell::RefCell;

	#[derive(Debug)]
	enum Action {
		Add(i32),
		Double,
		Reset,
	}

	fn reduce(state: &i32, action: Action) -> i32 {
		match action {
			Action::Add(n) => state + n,
			Action::Double => state * 2,
			Action::Reset => 0,
		}
	}

	#[test]
	#[serial]
	fn test_actions_fold_in_order_and_commit_once() {
		run_microtasks();
		let (total, dispatch) = use_reducer(reduce, 1);
		let seen = Rc::new(RefCell::new(Vec::new()));

		let _observer = create_render_effect({
			let total = total.clone();
			let seen = Rc::clone(&seen);
			move || seen.borrow_mut().push(total.get())
		});

		dispatch.dispatch(Action::Add(2));
		dispatch.dispatch(Action::Double);
		run_microtasks();

		assert_eq!(*seen.borrow(), vec![1, 6]);
	}

	#[test]
	#[serial]
	fn test_lazy_initializer() {
		run_microtasks();
		let (total, dispatch) = use_reducer_with(reduce, "42", |raw: &str| raw.parse().unwrap_or(0));
		assert_eq!(total.peek(), 42);

		dispatch.dispatch(Action::Reset);
		run_microtasks();
		assert_eq!(total.peek(), 0);
	}
}
