//! Deferred evaluation of dynamic attribute and child positions

use oxc_ast::ast::{Expression, ObjectExpression, ObjectPropertyKind, PropertyKind};
use oxc_span::{GetSpan, Span};

use super::{Rewriter, strip_parens};

/// Expressions left as written in a dynamic position
fn is_stable(expr: &Expression<'_>) -> bool {
	match expr {
		Expression::Identifier(_)
		| Expression::ArrowFunctionExpression(_)
		| Expression::FunctionExpression(_)
		| Expression::CallExpression(_)
		| Expression::StringLiteral(_)
		| Expression::NumericLiteral(_)
		| Expression::BigIntLiteral(_)
		| Expression::BooleanLiteral(_)
		| Expression::NullLiteral(_)
		| Expression::RegExpLiteral(_)
		| Expression::JSXElement(_)
		| Expression::JSXFragment(_) => true,
		Expression::TemplateLiteral(template) => template.expressions.is_empty(),
		Expression::ParenthesizedExpression(inner) => is_stable(&inner.expression),
		_ => false,
	}
}

impl Rewriter<'_> {
	/// Text for `expr` in a dynamic position, or `None` to keep it as written
	///
	/// Object literals are rebuilt with each value treated as a dynamic
	/// position of its own; anything else that is not stable is wrapped in an
	/// immediately-invoked arrow.
	pub(crate) fn rewrite_dynamic_position(&self, expr: &Expression<'_>) -> Option<String> {
		if is_stable(expr) {
			return None;
		}
		let text = match strip_parens(expr) {
			Expression::ObjectExpression(object) => self.rewrite_object_position(object),
			Expression::SequenceExpression(_) => format!("(() => ({}))()", self.rewrite_expression(expr)),
			_ => format!("(() => {})()", self.rewrite_expression(expr)),
		};
		Some(text)
	}

	fn rewrite_object_position(&self, object: &ObjectExpression<'_>) -> String {
		let parts: Vec<String> = object
			.properties
			.iter()
			.map(|kind| match kind {
				ObjectPropertyKind::SpreadProperty(spread) => {
					format!("...{}", self.rewrite_expression(&spread.argument))
				}
				ObjectPropertyKind::ObjectProperty(property)
					if !property.shorthand && !property.method && matches!(property.kind, PropertyKind::Init) =>
				{
					// Everything from the key up to the value, colon included
					let key = self.slice(Span::new(property.span.start, property.value.span().start));
					let value = self
						.rewrite_dynamic_position(&property.value)
						.unwrap_or_else(|| self.rewrite_expression(&property.value));
					format!("{key}{value}")
				}
				ObjectPropertyKind::ObjectProperty(property) => self.rewrite_property(property),
			})
			.collect();

		if parts.is_empty() {
			"{}".to_string()
		} else {
			format!("{{ {} }}", parts.join(", "))
		}
	}
}
