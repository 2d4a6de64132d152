//! Rewriting of matched syntax into edits
//!
//! [`Rewriter`] holds everything a single invocation shares: the source text,
//! the alias frame, generated names and which runtime helpers were used.
//! [`EditCollector`] walks a subtree in source order and records an edit for
//! every node it rewrites, without descending into that node again.
//! Replacement text for a matched node is built from the rewritten text of
//! its parts, so nested matches are handled by recursion.

mod dynamic;
mod effect;
mod element;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use oxc_ast::ast::{
	CallExpression, Expression, IdentifierReference, JSXElementName, JSXExpressionContainer, ObjectProperty, TSType,
};
use oxc_ast_visit::{Visit, walk};
use oxc_span::{GetSpan, Span};

use crate::edits::EditList;
use crate::names::NameAllocator;
use crate::options::TransformOptions;
use crate::scope::AliasFrame;

pub(crate) use effect::EffectCallback;

/// Effect hooks recognized on the root object
const EFFECT_HOOKS: [&str; 3] = ["useEffect", "useLayoutEffect", "useInsertionEffect"];

/// Runtime helpers referenced by the output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HelperUse {
	pub peek: bool,
	pub adapter: bool,
}

impl HelperUse {
	pub fn any(self) -> bool {
		self.peek || self.adapter
	}
}

pub(crate) struct Rewriter<'s> {
	source: &'s str,
	frame: &'s AliasFrame,
	options: &'s TransformOptions,
	names: RefCell<NameAllocator>,
	renames: RefCell<Vec<HashMap<u32, String>>>,
	helpers: Cell<HelperUse>,
}

/// Skip any number of enclosing parentheses
pub(crate) fn strip_parens<'r, 'a>(mut expr: &'r Expression<'a>) -> &'r Expression<'a> {
	while let Expression::ParenthesizedExpression(inner) = expr {
		expr = &inner.expression;
	}
	expr
}

impl<'s> Rewriter<'s> {
	pub(crate) fn new(
		source: &'s str,
		frame: &'s AliasFrame,
		options: &'s TransformOptions,
		names: NameAllocator,
	) -> Self {
		Self {
			source,
			frame,
			options,
			names: RefCell::new(names),
			renames: RefCell::new(Vec::new()),
			helpers: Cell::new(HelperUse::default()),
		}
	}

	pub(crate) fn helpers(&self) -> HelperUse {
		self.helpers.get()
	}

	fn use_peek(&self) {
		let mut helpers = self.helpers.get();
		helpers.peek = true;
		self.helpers.set(helpers);
	}

	fn use_adapter(&self) {
		let mut helpers = self.helpers.get();
		helpers.adapter = true;
		self.helpers.set(helpers);
	}

	pub(crate) fn slice(&self, span: Span) -> &'s str {
		&self.source[span.start as usize..span.end as usize]
	}

	/// Replacement for the reference starting at `start`, innermost rename first
	fn lookup_rename(&self, start: u32) -> Option<String> {
		self.renames
			.borrow()
			.iter()
			.rev()
			.find_map(|renames| renames.get(&start).cloned())
	}

	fn with_renames<R>(&self, renames: HashMap<u32, String>, f: impl FnOnce() -> R) -> R {
		self.renames.borrow_mut().push(renames);
		let result = f();
		self.renames.borrow_mut().pop();
		result
	}

	fn with_name_scope<R>(&self, f: impl FnOnce() -> R) -> R {
		self.names.borrow_mut().push_scope();
		let result = f();
		self.names.borrow_mut().pop_scope();
		result
	}

	fn allocate_name(&self, base: &str, visible: &str) -> String {
		self.names.borrow_mut().allocate(base, visible)
	}

	/// Property name if `expr` is `<root>.<name>`
	fn root_member<'r>(&self, expr: &'r Expression<'_>) -> Option<&'r str> {
		if let Expression::StaticMemberExpression(member) = expr
			&& let Expression::Identifier(object) = &member.object
			&& self.frame.is_root(object.name.as_str())
		{
			return Some(member.property.name.as_str());
		}
		None
	}

	/// `<root>.createElement(..)` or a call through a factory alias
	fn is_factory_call(&self, call: &CallExpression<'_>) -> bool {
		match &call.callee {
			Expression::Identifier(callee) => self.frame.is_factory(callee.name.as_str()),
			callee => self.root_member(callee) == Some("createElement"),
		}
	}

	/// `<root>.useEffect(..)` (or layout/insertion) or a call through an effect alias
	fn is_effect_call(&self, call: &CallExpression<'_>) -> bool {
		match &call.callee {
			Expression::Identifier(callee) => self.frame.is_effect(callee.name.as_str()),
			callee => self
				.root_member(callee)
				.is_some_and(|name| EFFECT_HOOKS.contains(&name)),
		}
	}

	/// Rewritten text of `span`, with edits gathered by `visit`
	fn rewrite_span(&self, span: Span, visit: impl FnOnce(&mut EditCollector<'_, 's>)) -> String {
		let mut collector = EditCollector::new(self);
		visit(&mut collector);
		collector.edits.apply(self.source, span)
	}

	/// Rewritten text of an expression
	pub(crate) fn rewrite_expression(&self, expr: &Expression<'_>) -> String {
		self.rewrite_span(expr.span(), |collector| collector.visit_expression(expr))
	}

	/// Rewritten text of a single object property
	pub(crate) fn rewrite_property(&self, property: &ObjectProperty<'_>) -> String {
		self.rewrite_span(property.span, |collector| collector.visit_object_property(property))
	}
}

/// Records edits for one subtree
pub(crate) struct EditCollector<'r, 's> {
	rw: &'r Rewriter<'s>,
	edits: EditList,
}

impl<'r, 's> EditCollector<'r, 's> {
	pub(crate) fn new(rw: &'r Rewriter<'s>) -> Self {
		Self {
			rw,
			edits: EditList::new(),
		}
	}

	pub(crate) fn into_edits(self) -> EditList {
		self.edits
	}

	fn visit_effect_call<'a>(&mut self, call: &CallExpression<'a>) {
		self.visit_expression(&call.callee);
		for (index, argument) in call.arguments.iter().enumerate() {
			if index == 0
				&& let Some(callback) = EffectCallback::from_argument(argument)
			{
				let text = self.rw.rewrite_effect_callback(&callback);
				self.edits.replace(argument.span(), text);
				continue;
			}
			self.visit_argument(argument);
		}
	}
}

impl<'a> Visit<'a> for EditCollector<'_, '_> {
	fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
		if let Some(element) = self.rw.rewrite_element(call) {
			self.edits.replace(call.span, element.text);
			return;
		}
		if self.rw.is_effect_call(call) {
			self.visit_effect_call(call);
			return;
		}
		walk::walk_call_expression(self, call);
	}

	fn visit_jsx_expression_container(&mut self, container: &JSXExpressionContainer<'a>) {
		if self.rw.frame.framework_imported()
			&& let Some(expr) = container.expression.as_expression()
			&& let Some(text) = self.rw.rewrite_dynamic_position(expr)
		{
			self.edits.replace(expr.span(), text);
			return;
		}
		walk::walk_jsx_expression_container(self, container);
	}

	fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
		if let Some(copy) = self.rw.lookup_rename(ident.span.start) {
			self.edits.replace(ident.span, copy);
		}
	}

	fn visit_object_property(&mut self, property: &ObjectProperty<'a>) {
		if property.shorthand
			&& let Expression::Identifier(ident) = &property.value
			&& let Some(copy) = self.rw.lookup_rename(ident.span.start)
		{
			self.edits.replace(property.span, format!("{}: {copy}", ident.name));
			return;
		}
		walk::walk_object_property(self, property);
	}

	// Tag names are resolved by the element rewrite, never renamed in place
	fn visit_jsx_element_name(&mut self, _name: &JSXElementName<'a>) {}

	fn visit_ts_type(&mut self, _ty: &TSType<'a>) {}
}
