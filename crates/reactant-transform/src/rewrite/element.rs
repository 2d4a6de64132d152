//! Element factory calls to JSX

use oxc_ast::ast::{Argument, CallExpression, Expression, ObjectPropertyKind, PropertyKey, PropertyKind};

use super::{Rewriter, strip_parens};

/// Replacement text for a factory call
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ElementOutput {
	pub text: String,
	/// `true` for a JSX literal, `false` for an expression that evaluates to one
	pub literal: bool,
}

enum Tag<'r, 'a> {
	/// Written directly as the tag name
	Name(String),
	Fragment,
	/// Resolved at runtime through the adapter helper
	Dynamic(&'r Expression<'a>),
}

fn starts_lowercase(name: &str) -> bool {
	name.chars().next().is_some_and(|c| c.is_ascii_lowercase())
}

/// Intrinsic tag that JSX would also treat as intrinsic
fn is_native_tag_name(name: &str) -> bool {
	starts_lowercase(name)
		&& name
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':')
}

fn is_attribute_name(name: &str) -> bool {
	let mut chars = name.chars();
	chars
		.next()
		.is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
		&& chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '-' | ':'))
}

/// Quoted string that reads the same as a JSX attribute value
///
/// JSX decodes character references in attribute strings, so `&` never
/// passes through unchanged.
fn is_attribute_string(raw: &str) -> bool {
	raw.len() >= 2 && !raw.contains(['\\', '\n', '\r', '&'])
}

/// String child that reads the same as JSX text
fn is_jsx_text(value: &str, raw: &str) -> bool {
	!value.trim().is_empty() && !raw.contains('\\') && !value.contains(['{', '}', '<', '>', '&', '\n', '\r'])
}

fn static_key<'r>(key: &'r PropertyKey<'_>) -> Option<&'r str> {
	match key {
		PropertyKey::StaticIdentifier(ident) => Some(ident.name.as_str()),
		PropertyKey::StringLiteral(literal) => Some(literal.value.as_str()),
		_ => None,
	}
}

fn element_text(tag: &str, attributes: &str, children: Option<&str>) -> String {
	match children {
		Some(children) => format!("<{tag}{attributes}>{children}</{tag}>"),
		None => format!("<{tag}{attributes} />"),
	}
}

impl Rewriter<'_> {
	/// JSX for a factory call, or `None` if `call` is not one
	pub(crate) fn rewrite_element(&self, call: &CallExpression<'_>) -> Option<ElementOutput> {
		if !self.is_factory_call(call) {
			return None;
		}
		let tag_expr = call.arguments.first()?.as_expression()?;

		match self.classify_tag(tag_expr) {
			Tag::Name(name) => {
				let attributes = self.render_props(call.arguments.get(1));
				let children = self.render_children(call);
				Some(ElementOutput {
					text: element_text(&name, &attributes, children.as_deref()),
					literal: true,
				})
			}
			Tag::Fragment => Some(ElementOutput {
				text: format!("<>{}</>", self.render_children(call).unwrap_or_default()),
				literal: true,
			}),
			Tag::Dynamic(expr) => Some(self.with_name_scope(|| {
				let temp = self.allocate_name(&self.options.temp_tag_name, self.slice(call.span));
				let adapted = self.rewrite_expression(expr);
				let attributes = self.render_props(call.arguments.get(1));
				let children = self.render_children(call).unwrap_or_default();
				self.use_adapter();
				ElementOutput {
					text: format!(
						"(() => {{ const {temp} = {}({adapted}); return <{temp}{attributes}>{children}</{temp}>; }})()",
						self.options.adapter_name
					),
					literal: false,
				}
			})),
		}
	}

	fn classify_tag<'r, 'a>(&self, expr: &'r Expression<'a>) -> Tag<'r, 'a> {
		match strip_parens(expr) {
			Expression::StringLiteral(literal) if is_native_tag_name(literal.value.as_str()) => {
				Tag::Name(literal.value.to_string())
			}
			Expression::Identifier(ident) if self.frame.is_fragment(ident.name.as_str()) => Tag::Fragment,
			Expression::Identifier(ident) if !starts_lowercase(ident.name.as_str()) => {
				let name = ident.name.as_str();
				Tag::Name(self.lookup_rename(ident.span.start).unwrap_or_else(|| name.to_string()))
			}
			inner if self.root_member(inner) == Some("Fragment") => Tag::Fragment,
			_ => Tag::Dynamic(expr),
		}
	}

	fn render_props(&self, props: Option<&Argument<'_>>) -> String {
		let Some(argument) = props else {
			return String::new();
		};
		if let Argument::SpreadElement(spread) = argument {
			return format!(" {{...{}}}", self.rewrite_expression(&spread.argument));
		}
		let Some(expr) = argument.as_expression() else {
			return String::new();
		};

		match strip_parens(expr) {
			Expression::NullLiteral(_) => String::new(),
			Expression::Identifier(ident) if ident.name.as_str() == "undefined" => String::new(),
			Expression::ObjectExpression(object) => object
				.properties
				.iter()
				.map(|kind| self.render_attribute(kind))
				.collect(),
			_ => format!(" {{...{}}}", self.rewrite_expression(expr)),
		}
	}

	fn render_attribute(&self, kind: &ObjectPropertyKind<'_>) -> String {
		let property = match kind {
			ObjectPropertyKind::SpreadProperty(spread) => {
				return format!(" {{...{}}}", self.rewrite_expression(&spread.argument));
			}
			ObjectPropertyKind::ObjectProperty(property) => property,
		};

		let name = if property.computed || property.method || !matches!(property.kind, PropertyKind::Init) {
			None
		} else {
			static_key(&property.key).filter(|name| is_attribute_name(name))
		};
		let Some(name) = name else {
			return format!(" {{...{{{}}}}}", self.rewrite_property(property));
		};
		let name = if name == "className" { "class" } else { name };

		if let Expression::StringLiteral(literal) = &property.value {
			let raw = self.slice(literal.span);
			return if is_attribute_string(raw) {
				format!(" {name}={raw}")
			} else {
				format!(" {name}={{{raw}}}")
			};
		}
		let value = self
			.rewrite_dynamic_position(&property.value)
			.unwrap_or_else(|| self.rewrite_expression(&property.value));
		format!(" {name}={{{value}}}")
	}

	/// Concatenated children, `None` when the call passes none
	fn render_children(&self, call: &CallExpression<'_>) -> Option<String> {
		if call.arguments.len() <= 2 {
			return None;
		}
		let children = call
			.arguments
			.iter()
			.skip(2)
			.map(|argument| self.render_child(argument))
			.collect();
		Some(children)
	}

	fn render_child(&self, argument: &Argument<'_>) -> String {
		let expr = match argument {
			Argument::SpreadElement(spread) => {
				return format!("{{{}}}", self.rewrite_expression(&spread.argument));
			}
			_ => match argument.as_expression() {
				Some(expr) => expr,
				None => return String::new(),
			},
		};

		match expr {
			Expression::StringLiteral(literal) => {
				let raw = self.slice(literal.span);
				if is_jsx_text(literal.value.as_str(), raw) {
					literal.value.to_string()
				} else {
					format!("{{{raw}}}")
				}
			}
			Expression::JSXElement(_) | Expression::JSXFragment(_) => self.rewrite_expression(expr),
			_ => {
				if let Expression::CallExpression(call) = expr
					&& let Some(element) = self.rewrite_element(call)
				{
					return if element.literal {
						element.text
					} else {
						format!("{{{}}}", element.text)
					};
				}
				let text = self
					.rewrite_dynamic_position(expr)
					.unwrap_or_else(|| self.rewrite_expression(expr));
				format!("{{{text}}}")
			}
		}
	}
}
