//! Text edits over the original source
//!
//! Output is never produced by printing the syntax tree. Each rewrite is an
//! [`Edit`] replacing one byte range of the original text; an [`EditList`]
//! keeps its edits sorted and non-overlapping and splices them into the
//! original in a single pass.

use oxc_span::Span;

/// Replacement of `span` (possibly empty, i.e. an insertion) with `text`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
	pub span: Span,
	pub text: String,
}

/// Sorted, non-overlapping edits
#[derive(Debug, Clone, Default)]
pub struct EditList {
	edits: Vec<Edit>,
}

fn overlaps(a: Span, b: Span) -> bool {
	// Two insertions at the same offset do not overlap; an insertion at the
	// edge of a replacement does not either.
	a.start < b.end && b.start < a.end
}

impl EditList {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.edits.is_empty()
	}

	pub fn len(&self) -> usize {
		self.edits.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Edit> {
		self.edits.iter()
	}

	/// Replace `span` with `text`
	///
	/// Returns `false`, leaving the list unchanged, if `span` overlaps an
	/// edit already recorded.
	pub fn replace(&mut self, span: Span, text: impl Into<String>) -> bool {
		let index = self
			.edits
			.partition_point(|edit| (edit.span.start, edit.span.end) <= (span.start, span.end));

		let before = index.checked_sub(1).map(|i| self.edits[i].span);
		let after = self.edits.get(index).map(|edit| edit.span);
		if before.is_some_and(|prev| overlaps(prev, span)) || after.is_some_and(|next| overlaps(next, span)) {
			tracing::warn!(start = span.start, end = span.end, "dropping overlapping edit");
			return false;
		}

		self.edits.insert(
			index,
			Edit {
				span,
				text: text.into(),
			},
		);
		true
	}

	/// Insert `text` at `offset`
	pub fn insert(&mut self, offset: u32, text: impl Into<String>) -> bool {
		self.replace(Span::new(offset, offset), text)
	}

	/// Splice the edits into `source[region]`
	///
	/// Edits outside `region` are ignored.
	pub fn apply(&self, source: &str, region: Span) -> String {
		let mut output = String::with_capacity(region.size() as usize);
		let mut cursor = region.start as usize;
		for edit in &self.edits {
			if edit.span.start < region.start || edit.span.end > region.end {
				continue;
			}
			let start = edit.span.start as usize;
			output.push_str(&source[cursor..start]);
			output.push_str(&edit.text);
			cursor = edit.span.end as usize;
		}
		output.push_str(&source[cursor..region.end as usize]);
		output
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_apply_splices_in_order() {
		let source = "let a = b + c;";
		let mut edits = EditList::new();
		assert!(edits.replace(Span::new(12, 13), "z"));
		assert!(edits.replace(Span::new(8, 9), "y"));
		assert!(edits.insert(0, "/* x */ "));

		assert_eq!(edits.apply(source, Span::new(0, 14)), "/* x */ let a = y + z;");
	}

	#[test]
	fn test_apply_within_region() {
		let source = "f(a, b)";
		let mut edits = EditList::new();
		edits.replace(Span::new(2, 3), "x");

		assert_eq!(edits.apply(source, Span::new(2, 6)), "x, b");
	}

	#[rstest]
	#[case(Span::new(2, 6), false)]
	#[case(Span::new(4, 5), false)]
	#[case(Span::new(0, 3), false)]
	#[case(Span::new(0, 2), true)]
	#[case(Span::new(5, 7), true)]
	#[case(Span::new(2, 2), true)]
	fn test_overlap_rejected(#[case] span: Span, #[case] accepted: bool) {
		let mut edits = EditList::new();
		edits.replace(Span::new(2, 5), "x");
		assert_eq!(edits.replace(span, "y"), accepted);
	}

	#[test]
	fn test_insertion_before_replacement_at_same_offset() {
		let source = "{x}";
		let mut edits = EditList::new();
		edits.replace(Span::new(1, 2), "x_");
		edits.insert(1, " const x_ = 1;");

		assert_eq!(edits.apply(source, Span::new(0, 3)), "{ const x_ = 1;x_}");
	}
}
