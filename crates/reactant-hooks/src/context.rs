//! Context hooks: create_context, use_context and the consumer form
//!
//! Context values come straight from the runtime's context stack; this module
//! adds the render-prop consumer on top.

pub use reactant_reactive::{Context, create_context, use_context};

/// Render-prop access to a context
pub trait ContextConsumer<T> {
	/// Call `render` with the value visible at this point
	///
	/// This is the `Consumer` component form: the provided value when inside a
	/// matching [`Context::provide`], the default otherwise.
	fn consumer<R>(&self, render: impl FnOnce(T) -> R) -> R;
}

impl<T: Clone + 'static> ContextConsumer<T> for Context<T> {
	fn consumer<R>(&self, render: impl FnOnce(T) -> R) -> R {
		render(use_context(self))
	}
}
