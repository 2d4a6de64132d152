//! Collision-free generated identifiers
//!
//! A generated name is its base with `_` appended until it does not occur in
//! the text it will be visible in, is not a reserved helper name, and was not
//! handed out in an enclosing name scope.

use std::collections::HashSet;

/// Hands out generated identifiers
#[derive(Debug, Default)]
pub struct NameAllocator {
	reserved: Vec<String>,
	scopes: Vec<HashSet<String>>,
}

impl NameAllocator {
	/// Allocator that never returns any of `reserved`
	pub fn new<I, S>(reserved: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			reserved: reserved.into_iter().map(Into::into).collect(),
			scopes: vec![HashSet::new()],
		}
	}

	/// Allocate a name derived from `base` that does not occur in `visible_text`
	pub fn allocate(&mut self, base: &str, visible_text: &str) -> String {
		let mut candidate = base.to_string();
		while visible_text.contains(candidate.as_str()) || self.is_taken(&candidate) {
			candidate.push('_');
		}
		if let Some(scope) = self.scopes.last_mut() {
			scope.insert(candidate.clone());
		}
		candidate
	}

	fn is_taken(&self, candidate: &str) -> bool {
		self.reserved.iter().any(|name| name == candidate) || self.scopes.iter().any(|scope| scope.contains(candidate))
	}

	/// Open a nested scope; names allocated inside are released by [`NameAllocator::pop_scope`]
	pub fn push_scope(&mut self) {
		self.scopes.push(HashSet::new());
	}

	pub fn pop_scope(&mut self) {
		if self.scopes.len() > 1 {
			self.scopes.pop();
		}
	}
}
