//! Transform entry point
//!
//! One invocation runs the anonymous-function pre-pass, parses the result,
//! records the source-framework aliases the unit imports, collects rewrite
//! edits over the whole program and splices them into the text. A unit that
//! needs no rewrite is returned exactly as given.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{ImportDeclarationSpecifier, ModuleExportName, Program, Statement};
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};

use crate::edits::EditList;
use crate::error::{TransformError, TransformResult};
use crate::names::NameAllocator;
use crate::options::TransformOptions;
use crate::prepass::name_anonymous_functions;
use crate::rewrite::{EditCollector, HelperUse, Rewriter};
use crate::scope::{AliasFrame, ScopeStack};

/// Source-to-source transformer
///
/// # Examples
///
/// ```
/// use reactant_transform::Transformer;
///
/// let mut transformer = Transformer::default();
/// let output = transformer
/// 	.transform("import React from \"react\";\nReact.createElement(\"br\", null);")
/// 	.unwrap();
/// assert_eq!(output, "import React from \"react\";\n<br />;");
/// ```
#[derive(Debug, Default)]
pub struct Transformer {
	options: TransformOptions,
	scopes: ScopeStack,
}

fn source_type_for(path: Option<&Path>) -> SourceType {
	let jsx_module = SourceType::default().with_module(true).with_jsx(true);
	match path.map(SourceType::from_path) {
		Some(Ok(source_type)) if source_type.is_typescript() => source_type,
		Some(Ok(source_type)) => source_type.with_jsx(true),
		_ => jsx_module,
	}
}

fn export_name<'r>(name: &'r ModuleExportName<'_>) -> &'r str {
	match name {
		ModuleExportName::IdentifierName(ident) => ident.name.as_str(),
		ModuleExportName::IdentifierReference(ident) => ident.name.as_str(),
		ModuleExportName::StringLiteral(literal) => literal.value.as_str(),
	}
}

/// Record every local name bound by a value import from a source-framework module
fn collect_aliases(program: &Program<'_>, options: &TransformOptions, frame: &mut AliasFrame) {
	for statement in &program.body {
		let Statement::ImportDeclaration(import) = statement else {
			continue;
		};
		if import.import_kind.is_type() || !options.is_source_module(import.source.value.as_str()) {
			continue;
		}
		frame.mark_imported();

		let Some(specifiers) = &import.specifiers else {
			continue;
		};
		for specifier in specifiers {
			match specifier {
				ImportDeclarationSpecifier::ImportDefaultSpecifier(default) => frame.add_root(default.local.name.as_str()),
				ImportDeclarationSpecifier::ImportNamespaceSpecifier(namespace) => {
					frame.add_root(namespace.local.name.as_str());
				}
				ImportDeclarationSpecifier::ImportSpecifier(named) => {
					if named.import_kind.is_type() {
						continue;
					}
					let local = named.local.name.as_str();
					match export_name(&named.imported) {
						"createElement" => frame.add_factory(local),
						"useEffect" | "useLayoutEffect" | "useInsertionEffect" => frame.add_effect(local),
						"Fragment" => frame.add_fragment(local),
						_ => {}
					}
				}
			}
		}
	}
}

fn runtime_import(options: &TransformOptions, helpers: HelperUse) -> Option<String> {
	let mut names = Vec::with_capacity(2);
	if helpers.peek {
		names.push(options.peek_name.as_str());
	}
	if helpers.adapter {
		names.push(options.adapter_name.as_str());
	}
	if names.is_empty() {
		return None;
	}
	Some(format!(
		"import {{ {} }} from \"{}\";",
		names.join(", "),
		options.runtime_module
	))
}

/// Place the runtime import after any directive prologue or hashbang
fn insert_runtime_import(program: &Program<'_>, import: String, edits: &mut EditList) {
	if let Some(directive) = program.directives.last() {
		edits.insert(directive.span.end, format!("\n{import}"));
	} else if let Some(hashbang) = &program.hashbang {
		edits.insert(hashbang.span.end, format!("\n{import}"));
	} else {
		edits.insert(program.span.start, format!("{import}\n"));
	}
}

impl Transformer {
	pub fn new(options: TransformOptions) -> Self {
		Self {
			options,
			scopes: ScopeStack::new(),
		}
	}

	pub fn options(&self) -> &TransformOptions {
		&self.options
	}

	/// Number of alias frames in flight; zero between invocations
	pub fn scope_depth(&self) -> usize {
		self.scopes.depth()
	}

	/// Transform one unit of source text
	pub fn transform(&mut self, source: &str) -> TransformResult<String> {
		self.run(source, None)
	}

	/// Transform one unit, choosing the dialect from `path`'s extension
	pub fn transform_path(&mut self, path: impl AsRef<Path>, source: &str) -> TransformResult<String> {
		self.run(source, Some(path.as_ref()))
	}

	fn run(&mut self, source: &str, path: Option<&Path>) -> TransformResult<String> {
		let options = &self.options;
		let mut scope = self.scopes.enter();

		let mut names = NameAllocator::new([options.adapter_name.as_str(), options.peek_name.as_str()]);
		let prepass = name_anonymous_functions(source, &options.anon_fn_name, &mut names);

		let allocator = Allocator::default();
		let parsed = Parser::new(&allocator, &prepass.text, source_type_for(path)).parse();
		if parsed.panicked || !parsed.errors.is_empty() {
			let mut messages: Vec<String> = parsed.errors.iter().map(ToString::to_string).collect();
			if messages.is_empty() {
				messages.push("parser aborted".to_string());
			}
			tracing::warn!(path = ?path, errors = messages.len(), "parse failed");
			return Err(TransformError::Parse {
				path: path.map(Path::to_path_buf),
				messages,
			});
		}

		collect_aliases(&parsed.program, options, scope.frame_mut());
		let frame = scope.frame();

		let rewriter = Rewriter::new(&prepass.text, frame, options, names);
		let mut collector = EditCollector::new(&rewriter);
		collector.visit_program(&parsed.program);
		let mut edits = collector.into_edits();

		if edits.is_empty() {
			tracing::trace!(path = ?path, aliases = frame.alias_count(), "nothing to rewrite");
			return Ok(source.to_string());
		}

		let helpers = rewriter.helpers();
		if options.inject_runtime_import
			&& let Some(import) = runtime_import(options, helpers)
		{
			insert_runtime_import(&parsed.program, import, &mut edits);
		}

		let output = edits.apply(
			&prepass.text,
			Span::new(parsed.program.span.start, prepass.text.len() as u32),
		);
		tracing::debug!(
			path = ?path,
			aliases = frame.alias_count(),
			edits = edits.len(),
			named_functions = prepass.names.len(),
			helpers = helpers.any(),
			"unit transformed"
		);
		Ok(output)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn aliases(source: &str) -> AliasFrame {
		let allocator = Allocator::default();
		let parsed = Parser::new(&allocator, source, source_type_for(None)).parse();
		let mut frame = AliasFrame::default();
		collect_aliases(&parsed.program, &TransformOptions::default(), &mut frame);
		frame
	}

	#[test]
	fn test_collects_every_import_form() {
		let frame = aliases(
			"import R, { createElement as h, useEffect as ue, Fragment as F, useState } from \"react\";\n\
			 import * as NS from \"react\";",
		);
		assert!(frame.is_root("R"));
		assert!(frame.is_root("NS"));
		assert!(frame.is_factory("h"));
		assert!(frame.is_effect("ue"));
		assert!(frame.is_fragment("F"));
		assert!(!frame.is_effect("useState"));
		assert!(frame.framework_imported());
	}

	#[test]
	fn test_other_modules_ignored() {
		let frame = aliases("import React from \"preact\";\nimport { createElement } from \"./react\";");
		assert_eq!(frame.alias_count(), 0);
		assert!(!frame.framework_imported());
	}

	#[test]
	fn test_side_effect_import_marks_framework() {
		let frame = aliases("import \"react\";");
		assert!(frame.framework_imported());
		assert_eq!(frame.alias_count(), 0);
	}

	#[rstest]
	#[case(HelperUse { peek: true, adapter: false }, Some("import { __peek } from \"reactant/runtime\";"))]
	#[case(HelperUse { peek: true, adapter: true }, Some("import { __peek, __adapt } from \"reactant/runtime\";"))]
	#[case(HelperUse::default(), None)]
	fn test_runtime_import_lists_used_helpers(#[case] helpers: HelperUse, #[case] expected: Option<&str>) {
		assert_eq!(
			runtime_import(&TransformOptions::default(), helpers).as_deref(),
			expected
		);
	}

	#[rstest]
	#[case(None, false)]
	#[case(Some("component.tsx"), true)]
	#[case(Some("component.jsx"), false)]
	#[case(Some("component.js"), false)]
	fn test_source_type_for_path(#[case] path: Option<&str>, #[case] typescript: bool) {
		let source_type = source_type_for(path.map(Path::new));
		assert_eq!(source_type.is_typescript(), typescript);
		assert!(source_type.is_jsx());
	}
}
