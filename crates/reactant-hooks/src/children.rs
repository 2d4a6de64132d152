//! Children helpers
//!
//! A component's children arrive either as a single (possibly empty) node or
//! as a list whose entries may be empty. These helpers give both shapes one
//! interface.

use crate::error::{HookError, HookResult};

/// Children passed to a component
#[derive(Debug, Clone, PartialEq)]
pub enum Children<T> {
	/// A single child, or none
	Single(Option<T>),
	/// A list of children; `None` entries are empty slots
	List(Vec<Option<T>>),
}

impl<T> Default for Children<T> {
	fn default() -> Self {
		Self::Single(None)
	}
}

impl<T> Children<T> {
	/// No children
	pub fn none() -> Self {
		Self::Single(None)
	}

	/// Exactly one child
	pub fn one(child: T) -> Self {
		Self::Single(Some(child))
	}

	/// A list with no empty slots
	pub fn from_vec(children: Vec<T>) -> Self {
		Self::List(children.into_iter().map(Some).collect())
	}

	/// A missing single child is no slot at all, unlike an empty list entry
	fn slots(&self) -> Vec<Option<&T>> {
		match self {
			Self::Single(child) => child.iter().map(Some).collect(),
			Self::List(children) => children.iter().map(Option::as_ref).collect(),
		}
	}

	/// Apply `f` to every child; empty slots pass through as `None`
	pub fn map<R>(&self, mut f: impl FnMut(&T, usize) -> R) -> Vec<Option<R>> {
		self.slots()
			.into_iter()
			.enumerate()
			.map(|(index, child)| child.map(|child| f(child, index)))
			.collect()
	}

	/// Call `f` for every non-empty child
	pub fn for_each(&self, mut f: impl FnMut(&T, usize)) {
		for (index, child) in self.slots().into_iter().enumerate() {
			if let Some(child) = child {
				f(child, index);
			}
		}
	}

	/// Number of slots, empty list entries included
	pub fn count(&self) -> usize {
		match self {
			Self::Single(child) => usize::from(child.is_some()),
			Self::List(children) => children.len(),
		}
	}

	/// The only child, failing unless exactly one non-empty child is present
	pub fn only(self) -> HookResult<T> {
		let mut present = self.into_array();
		if present.len() == 1 {
			if let Some(child) = present.pop() {
				return Ok(child);
			}
		}
		Err(HookError::ChildrenOnly { found: present.len() })
	}

	/// Non-empty children, in order
	pub fn to_array(&self) -> Vec<&T> {
		self.slots().into_iter().flatten().collect()
	}

	/// Owned form of [`Children::to_array`]
	pub fn into_array(self) -> Vec<T> {
		match self {
			Self::Single(child) => child.into_iter().collect(),
			Self::List(children) => children.into_iter().flatten().collect(),
		}
	}
}
