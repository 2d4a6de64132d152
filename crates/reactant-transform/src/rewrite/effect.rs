//! Snapshotting of free variables in effect callbacks
//!
//! Every free variable an effect callback reads is copied through the peek
//! helper at the top of the callback body, and the body reads the copy. The
//! callback then observes the values as of the moment it runs without
//! subscribing to them.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use oxc_ast::ast::{
	Argument, ArrowFunctionExpression, AssignmentTargetPropertyIdentifier, BindingIdentifier, Class, ClassType,
	Expression, Function, FunctionBody, FunctionType, IdentifierReference, JSXElementName, SimpleAssignmentTarget,
	Statement, TSType, VariableDeclarationKind, VariableDeclarator,
};
use oxc_ast_visit::{Visit, walk};
use oxc_span::{GetSpan, Span};
use oxc_syntax::scope::{ScopeFlags, ScopeId};

use super::{EditCollector, Rewriter};

/// Names never treated as free variables
const NOT_SNAPSHOTTED: [&str; 2] = ["undefined", "arguments"];

/// Function literal passed as an effect callback
pub(crate) enum EffectCallback<'r, 'a> {
	Arrow(&'r ArrowFunctionExpression<'a>),
	Function(&'r Function<'a>),
}

impl<'r, 'a> EffectCallback<'r, 'a> {
	pub(crate) fn from_argument(argument: &'r Argument<'a>) -> Option<Self> {
		match argument {
			Argument::ArrowFunctionExpression(arrow) => Some(Self::Arrow(arrow)),
			Argument::FunctionExpression(function) => Some(Self::Function(function)),
			_ => None,
		}
	}

	fn span(&self) -> Span {
		match self {
			Self::Arrow(arrow) => arrow.span,
			Self::Function(function) => function.span,
		}
	}

	fn body(&self) -> Option<&'r FunctionBody<'a>> {
		match *self {
			Self::Arrow(arrow) => Some(&*arrow.body),
			Self::Function(function) => function.body.as_deref(),
		}
	}

	/// Body expression of a concise arrow
	fn concise_expression(&self) -> Option<&'r Expression<'a>> {
		match *self {
			Self::Arrow(arrow) if arrow.expression => match arrow.body.statements.first() {
				Some(Statement::ExpressionStatement(statement)) => Some(&statement.expression),
				_ => None,
			},
			_ => None,
		}
	}

	/// Free variables read by the callback, in order of first free reference
	fn free_variables(&self) -> Vec<FreeVariable> {
		let mut collector = FreeVariables::default();
		match self {
			Self::Arrow(arrow) => {
				collector.visit_formal_parameters(&arrow.params);
				collector.visit_function_body(&arrow.body);
			}
			Self::Function(function) => {
				if let Some(id) = &function.id {
					collector.visit_binding_identifier(id);
				}
				collector.visit_formal_parameters(&function.params);
				if let Some(body) = &function.body {
					collector.visit_function_body(body);
				}
			}
		}
		collector.into_free()
	}
}

/// A name the callback reads from outside itself
#[derive(Debug, Clone, PartialEq, Eq)]
struct FreeVariable {
	name: String,
	/// Start offsets of every reference that resolves outside the callback
	references: Vec<u32>,
}

#[derive(Debug, Default)]
struct LexicalScope {
	parent: Option<usize>,
	function: bool,
	declared: HashSet<String>,
}

/// Resolves identifier references against the scopes of the callback
///
/// Scope 0 is the callback itself. References and assignments are resolved
/// once the whole callback has been walked, so hoisted declarations are seen
/// regardless of order. A name counts as free when at least one reference
/// resolves outside the callback and no assignment inside the callback
/// targets the outer binding.
#[derive(Debug)]
struct FreeVariables {
	scopes: Vec<LexicalScope>,
	current: usize,
	references: Vec<(String, usize, u32)>,
	assigned: Vec<(String, usize)>,
	hoisting: bool,
}

impl Default for FreeVariables {
	fn default() -> Self {
		Self {
			scopes: vec![LexicalScope {
				parent: None,
				function: true,
				declared: HashSet::new(),
			}],
			current: 0,
			references: Vec::new(),
			assigned: Vec::new(),
			hoisting: false,
		}
	}
}

impl FreeVariables {
	fn declare(&mut self, name: &str) {
		let mut target = self.current;
		// `var` bindings belong to the nearest function scope
		while self.hoisting && !self.scopes[target].function {
			match self.scopes[target].parent {
				Some(parent) => target = parent,
				None => break,
			}
		}
		self.scopes[target].declared.insert(name.to_string());
	}

	fn resolves_locally(&self, name: &str, scope: usize) -> bool {
		let mut next = Some(scope);
		while let Some(index) = next {
			if self.scopes[index].declared.contains(name) {
				return true;
			}
			next = self.scopes[index].parent;
		}
		false
	}

	fn into_free(self) -> Vec<FreeVariable> {
		let assigned: HashSet<&str> = self
			.assigned
			.iter()
			.filter(|(name, scope)| !self.resolves_locally(name, *scope))
			.map(|(name, _)| name.as_str())
			.collect();

		let mut free: Vec<FreeVariable> = Vec::new();
		let mut positions: HashMap<&str, usize> = HashMap::new();
		for (name, scope, start) in &self.references {
			let name = name.as_str();
			if NOT_SNAPSHOTTED.contains(&name) || assigned.contains(name) || self.resolves_locally(name, *scope) {
				continue;
			}
			match positions.get(name) {
				Some(&index) => free[index].references.push(*start),
				None => {
					positions.insert(name, free.len());
					free.push(FreeVariable {
						name: name.to_string(),
						references: vec![*start],
					});
				}
			}
		}
		free
	}
}

impl<'a> Visit<'a> for FreeVariables {
	fn enter_scope(&mut self, flags: ScopeFlags, _scope_id: &Cell<Option<ScopeId>>) {
		self.scopes.push(LexicalScope {
			parent: Some(self.current),
			function: flags.contains(ScopeFlags::Function),
			declared: HashSet::new(),
		});
		self.current = self.scopes.len() - 1;
	}

	fn leave_scope(&mut self) {
		if let Some(parent) = self.scopes[self.current].parent {
			self.current = parent;
		}
	}

	fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
		self.references
			.push((ident.name.to_string(), self.current, ident.span.start));
	}

	fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
		self.declare(ident.name.as_str());
	}

	fn visit_variable_declarator(&mut self, declarator: &VariableDeclarator<'a>) {
		self.hoisting = matches!(declarator.kind, VariableDeclarationKind::Var);
		self.visit_binding_pattern(&declarator.id);
		self.hoisting = false;
		if let Some(init) = &declarator.init {
			self.visit_expression(init);
		}
	}

	fn visit_function(&mut self, function: &Function<'a>, flags: ScopeFlags) {
		// Declarations bind their name in the enclosing scope
		if matches!(function.r#type, FunctionType::FunctionDeclaration)
			&& let Some(id) = &function.id
		{
			self.declare(id.name.as_str());
		}
		walk::walk_function(self, function, flags);
	}

	fn visit_class(&mut self, class: &Class<'a>) {
		if matches!(class.r#type, ClassType::ClassDeclaration)
			&& let Some(id) = &class.id
		{
			self.declare(id.name.as_str());
		}
		walk::walk_class(self, class);
	}

	fn visit_simple_assignment_target(&mut self, target: &SimpleAssignmentTarget<'a>) {
		if let SimpleAssignmentTarget::AssignmentTargetIdentifier(ident) = target {
			self.assigned.push((ident.name.to_string(), self.current));
			return;
		}
		walk::walk_simple_assignment_target(self, target);
	}

	fn visit_assignment_target_property_identifier(&mut self, property: &AssignmentTargetPropertyIdentifier<'a>) {
		self.assigned
			.push((property.binding.name.to_string(), self.current));
		if let Some(init) = &property.init {
			self.visit_expression(init);
		}
	}

	fn visit_jsx_element_name(&mut self, _name: &JSXElementName<'a>) {}

	fn visit_ts_type(&mut self, _ty: &TSType<'a>) {}
}

impl Rewriter<'_> {
	/// Callback text with its free variables snapshotted on entry
	pub(crate) fn rewrite_effect_callback(&self, callback: &EffectCallback<'_, '_>) -> String {
		let span = callback.span();
		let visible = self.slice(span);
		// Framework aliases are rewritten away or read the module itself
		let free: Vec<FreeVariable> = callback
			.free_variables()
			.into_iter()
			.filter(|variable| !self.frame.is_alias(&variable.name))
			.collect();

		self.with_name_scope(|| {
			let mut renames = HashMap::new();
			let mut declarations = Vec::with_capacity(free.len());
			for variable in &free {
				let copy = self.allocate_name(&variable.name, visible);
				// An enclosing callback may already have snapshotted this name
				let source = variable
					.references
					.first()
					.and_then(|start| self.lookup_rename(*start))
					.unwrap_or_else(|| variable.name.clone());
				declarations.push(format!("const {copy} = {}({source});", self.options.peek_name));
				for start in &variable.references {
					renames.insert(*start, copy.clone());
				}
			}
			if !declarations.is_empty() {
				self.use_peek();
			}
			let declarations = declarations.join(" ");

			self.with_renames(renames, || {
				let mut collector = EditCollector::new(self);
				if let Some(expr) = callback.concise_expression() {
					collector.visit_expression(expr);
					if !declarations.is_empty() {
						collector
							.edits
							.insert(expr.span().start, format!("{{ {declarations} return "));
						collector.edits.insert(expr.span().end, "; }");
					}
				} else if let Some(body) = callback.body() {
					collector.visit_function_body(body);
					if !declarations.is_empty() {
						let (at, separator) = self.declaration_point(body);
						collector.edits.insert(at, format!("{separator}{declarations}"));
					}
				}
				collector.edits.apply(self.source, span)
			})
		})
	}

	/// Offset after the directive prologue of `body`, and the text that must
	/// precede a statement inserted there
	fn declaration_point(&self, body: &FunctionBody<'_>) -> (u32, &'static str) {
		let Some(directive) = body.directives.last() else {
			return (body.span.start + 1, " ");
		};
		let mut end = directive.span.end;
		if self.source[end as usize..].starts_with(';') {
			end += 1;
		}
		let separator = if self.source[..end as usize].ends_with(';') { " " } else { "; " };
		(end, separator)
	}
}
