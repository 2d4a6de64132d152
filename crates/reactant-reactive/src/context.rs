//! Context - values scoped to a subtree of computations
//!
//! A context carries a default value. [`Context::provide`] makes a value visible
//! to everything that runs synchronously inside its closure, and effects created
//! there capture the visible values so later re-runs resolve the same provider.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::runtime::NodeId;

type Provided = (NodeId, Rc<dyn Any>);

thread_local! {
	static CONTEXT_STACK: RefCell<Vec<Provided>> = const { RefCell::new(Vec::new()) };
}

/// Captured provider values, reinstalled while an effect re-runs
#[derive(Clone, Default)]
pub struct ContextSnapshot(Vec<Provided>);

impl ContextSnapshot {
	/// Capture the providers visible right now
	pub fn capture() -> Self {
		snapshot()
	}

	/// Run `f` with exactly these providers visible
	pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
		with_snapshot(self, f)
	}
}

impl std::fmt::Debug for ContextSnapshot {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ContextSnapshot").field("providers", &self.0.len()).finish()
	}
}

/// Capture the providers visible right now
pub(crate) fn snapshot() -> ContextSnapshot {
	CONTEXT_STACK.with(|stack| ContextSnapshot(stack.borrow().clone()))
}

/// Restores the previous stack contents when dropped
struct StackRestore(Option<Vec<Provided>>);

impl Drop for StackRestore {
	fn drop(&mut self) {
		if let Some(saved) = self.0.take() {
			let _ = CONTEXT_STACK.try_with(|stack| *stack.borrow_mut() = saved);
		}
	}
}

/// Run `f` with exactly the providers captured in `snapshot`
pub(crate) fn with_snapshot<R>(snapshot: &ContextSnapshot, f: impl FnOnce() -> R) -> R {
	let saved = CONTEXT_STACK.with(|stack| stack.replace(snapshot.0.clone()));
	let _restore = StackRestore(Some(saved));
	f()
}

/// A typed context handle
pub struct Context<T: 'static> {
	id: NodeId,
	default: Rc<T>,
}

impl<T: 'static> Clone for Context<T> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			default: Rc::clone(&self.default),
		}
	}
}

impl<T: Clone + 'static> Context<T> {
	/// Create a context with the value used when no provider is visible
	pub fn new(default: T) -> Self {
		Self {
			id: NodeId::new(),
			default: Rc::new(default),
		}
	}

	/// Identity of this context
	pub fn id(&self) -> NodeId {
		self.id
	}

	/// The default value
	pub fn default_value(&self) -> T {
		(*self.default).clone()
	}

	/// Make `value` visible to `children` and everything it runs synchronously
	pub fn provide<R>(&self, value: T, children: impl FnOnce() -> R) -> R {
		let provided: Rc<dyn Any> = Rc::new(value);
		let saved = CONTEXT_STACK.with(|stack| {
			let mut stack = stack.borrow_mut();
			let saved = stack.clone();
			stack.push((self.id, provided));
			saved
		});
		let _restore = StackRestore(Some(saved));
		children()
	}

	/// Nearest provided value, if any provider is visible
	pub fn try_get(&self) -> Option<T> {
		CONTEXT_STACK.with(|stack| {
			stack
				.borrow()
				.iter()
				.rev()
				.find(|(id, _)| *id == self.id)
				.and_then(|(_, value)| value.downcast_ref::<T>().cloned())
		})
	}
}

/// Create a context with a default value
pub fn create_context<T: Clone + 'static>(default: T) -> Context<T> {
	Context::new(default)
}

/// Resolve a context: the nearest provided value, or its default
pub fn use_context<T: Clone + 'static>(ctx: &Context<T>) -> T {
	ctx.try_get().unwrap_or_else(|| ctx.default_value())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_default_without_provider() {
		let ctx = create_context("light".to_string());
		assert_eq!(use_context(&ctx), "light");
		assert!(ctx.try_get().is_none());
	}

	#[rstest]
	fn test_provide_scopes_value() {
		let ctx = create_context(0);

		let inside = ctx.provide(42, || use_context(&ctx));

		assert_eq!(inside, 42);
		assert_eq!(use_context(&ctx), 0);
	}

	#[rstest]
	fn test_nested_providers_shadow() {
		let ctx = create_context("root");

		let seen = ctx.provide("outer", || {
			let inner = ctx.provide("inner", || use_context(&ctx));
			(inner, use_context(&ctx))
		});

		assert_eq!(seen, ("inner", "outer"));
	}

	#[rstest]
	fn test_distinct_contexts_of_same_type() {
		let a = create_context(1);
		let b = create_context(2);

		let seen = a.provide(10, || (use_context(&a), use_context(&b)));

		assert_eq!(seen, (10, 2));
	}

	#[rstest]
	fn test_snapshot_reinstalls_providers() {
		let ctx = create_context(0);
		let snap = ctx.provide(7, snapshot);

		assert_eq!(use_context(&ctx), 0);
		assert_eq!(with_snapshot(&snap, || use_context(&ctx)), 7);
		assert_eq!(use_context(&ctx), 0);
	}
}
