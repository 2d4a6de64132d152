//! Dependency lists and dependency-aware tracking
//!
//! A dependency list is a `Vec<Dep>`. Entries are either plain values, which
//! never participate in tracking, or [`Trackable`] wrappers produced by the
//! hook layer (state, memo and callback wrappers). Tracking a list subscribes
//! the running computation to every wrapper in it, and recursively to every
//! wrapper *those* were declared with, visiting each wrapper at most once.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use reactant_reactive::NodeId;

/// Stable identity of a dependency wrapper
///
/// Two `Dep` values built from clones of the same wrapper share a key, which
/// is what makes repeated and diamond-shaped dependency graphs deduplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepKey {
	/// A wrapper backed by a runtime signal
	Signal(NodeId),
	/// A wrapper backed by a shared allocation
	Shared(usize),
}

impl DepKey {
	/// Key for a wrapper identified by the address of its shared state
	pub fn of<T: ?Sized>(shared: &Rc<T>) -> Self {
		Self::Shared(Rc::as_ptr(shared) as *const () as usize)
	}
}

/// A value the hook layer knows how to subscribe to
pub trait Trackable {
	/// Identity used for deduplication during a tracking pass
	fn key(&self) -> DepKey;

	/// Subscribe the running computation to this wrapper's own source
	///
	/// Wrappers whose visibility flows entirely through their declared
	/// dependencies implement this as a no-op.
	fn track(&self);

	/// Dependencies this wrapper was declared with
	fn deps(&self) -> &[Dep];

	/// Current value without subscribing, boxed for [`Dep::peek`]
	fn peek_any(&self) -> Option<Box<dyn Any>>;
}

/// One entry of a dependency list
#[derive(Clone)]
pub enum Dep {
	/// A value that is compared by nothing and tracked by nobody
	Plain(Rc<dyn Any>),
	/// A hook-produced wrapper
	Trackable(Rc<dyn Trackable>),
}

impl Dep {
	/// Wrap a plain value
	pub fn plain<T: 'static>(value: T) -> Self {
		Self::Plain(Rc::new(value))
	}

	/// Whether this entry participates in tracking
	pub fn is_trackable(&self) -> bool {
		matches!(self, Self::Trackable(_))
	}

	/// Identity of a trackable entry
	pub fn key(&self) -> Option<DepKey> {
		match self {
			Self::Plain(_) => None,
			Self::Trackable(wrapper) => Some(wrapper.key()),
		}
	}

	/// Resolve the entry to a value without subscribing
	///
	/// Plain entries downcast directly; wrappers report their current value.
	/// Returns `None` when the stored type is not `T`.
	pub fn peek<T: Clone + 'static>(&self) -> Option<T> {
		match self {
			Self::Plain(value) => value.downcast_ref::<T>().cloned(),
			Self::Trackable(wrapper) => wrapper
				.peek_any()
				.and_then(|value| value.downcast::<T>().ok())
				.map(|value| *value),
		}
	}
}

impl fmt::Debug for Dep {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Plain(_) => f.write_str("Dep::Plain(..)"),
			Self::Trackable(wrapper) => f.debug_tuple("Dep::Trackable").field(&wrapper.key()).finish(),
		}
	}
}

/// Conversion into a dependency list entry, used by [`deps!`](crate::deps)
pub trait IntoDep {
	/// Build the entry; the source value stays usable
	fn into_dep(&self) -> Dep;
}

impl IntoDep for Dep {
	fn into_dep(&self) -> Dep {
		self.clone()
	}
}

macro_rules! plain_into_dep {
	($($ty:ty),* $(,)?) => {
		$(
			impl IntoDep for $ty {
				fn into_dep(&self) -> Dep {
					Dep::plain(self.clone())
				}
			}
		)*
	};
}

plain_into_dep!(
	bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
	&'static str,
);

impl<T: Clone + 'static> IntoDep for Option<T> {
	fn into_dep(&self) -> Dep {
		Dep::plain(self.clone())
	}
}

impl<T: Clone + 'static> IntoDep for Vec<T> {
	fn into_dep(&self) -> Dep {
		Dep::plain(self.clone())
	}
}

/// Subscribe the running computation to every wrapper in `deps`
///
/// Plain entries are skipped. Each wrapper is tracked once and then its own
/// declared dependencies are walked; a wrapper reachable through several
/// paths (or listed twice) is visited exactly once per call.
pub fn track_deps(deps: &[Dep]) {
	let mut seen = HashSet::new();
	track_into(deps, &mut seen);
}

fn track_into(deps: &[Dep], seen: &mut HashSet<DepKey>) {
	for dep in deps {
		let Dep::Trackable(wrapper) = dep else {
			continue;
		};
		if !seen.insert(wrapper.key()) {
			continue;
		}
		wrapper.track();
		track_into(wrapper.deps(), seen);
	}
}
