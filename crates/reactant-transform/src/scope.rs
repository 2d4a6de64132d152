//! Alias scopes
//!
//! Every transform invocation pushes a fresh [`AliasFrame`] recording the
//! local names under which the source framework was imported. Lookups only
//! consult the top frame, and the frame is popped by [`ScopeGuard`] however
//! the invocation ends.

/// Local names bound to the source framework within one unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasFrame {
	roots: Vec<String>,
	factories: Vec<String>,
	effects: Vec<String>,
	fragments: Vec<String>,
	framework_imported: bool,
}

fn push_unique(list: &mut Vec<String>, name: &str) {
	if !list.iter().any(|existing| existing == name) {
		list.push(name.to_string());
	}
}

impl AliasFrame {
	/// Record a default or namespace import
	pub fn add_root(&mut self, name: &str) {
		push_unique(&mut self.roots, name);
	}

	/// Record a named `createElement` import
	pub fn add_factory(&mut self, name: &str) {
		push_unique(&mut self.factories, name);
	}

	/// Record a named effect-hook import
	pub fn add_effect(&mut self, name: &str) {
		push_unique(&mut self.effects, name);
	}

	/// Record a named `Fragment` import
	pub fn add_fragment(&mut self, name: &str) {
		push_unique(&mut self.fragments, name);
	}

	/// Note that the unit imports the source framework at all
	pub fn mark_imported(&mut self) {
		self.framework_imported = true;
	}

	pub fn is_root(&self, name: &str) -> bool {
		self.roots.iter().any(|alias| alias == name)
	}

	pub fn is_factory(&self, name: &str) -> bool {
		self.factories.iter().any(|alias| alias == name)
	}

	pub fn is_effect(&self, name: &str) -> bool {
		self.effects.iter().any(|alias| alias == name)
	}

	pub fn is_fragment(&self, name: &str) -> bool {
		self.fragments.iter().any(|alias| alias == name)
	}

	/// Whether `name` is any recorded alias
	pub fn is_alias(&self, name: &str) -> bool {
		self.is_root(name) || self.is_factory(name) || self.is_effect(name) || self.is_fragment(name)
	}

	/// Whether any import from a source-framework module was seen
	pub fn framework_imported(&self) -> bool {
		self.framework_imported
	}

	/// Total number of recorded aliases
	pub fn alias_count(&self) -> usize {
		self.roots.len() + self.factories.len() + self.effects.len() + self.fragments.len()
	}
}

/// Stack of alias frames, one per in-flight transform invocation
#[derive(Debug, Default)]
pub struct ScopeStack {
	frames: Vec<AliasFrame>,
}

impl ScopeStack {
	pub fn new() -> Self {
		Self::default()
	}

	/// Push an empty frame; it is popped when the guard drops
	pub fn enter(&mut self) -> ScopeGuard<'_> {
		self.frames.push(AliasFrame::default());
		let index = self.frames.len() - 1;
		ScopeGuard { stack: self, index }
	}

	/// Number of frames currently pushed
	pub fn depth(&self) -> usize {
		self.frames.len()
	}

	/// Frame consulted by lookups
	pub fn top(&self) -> Option<&AliasFrame> {
		self.frames.last()
	}
}

/// Pops its frame on drop
#[derive(Debug)]
pub struct ScopeGuard<'a> {
	stack: &'a mut ScopeStack,
	index: usize,
}

impl ScopeGuard<'_> {
	pub fn frame(&self) -> &AliasFrame {
		&self.stack.frames[self.index]
	}

	pub fn frame_mut(&mut self) -> &mut AliasFrame {
		&mut self.stack.frames[self.index]
	}
}

impl Drop for ScopeGuard<'_> {
	fn drop(&mut self) {
		self.stack.frames.truncate(self.index);
	}
}
