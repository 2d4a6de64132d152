//! Integration tests for the transform engine
//!
//! Each test feeds a whole unit through the public API and compares the
//! complete output text.

use proptest::prelude::*;
use reactant_transform::{TransformError, TransformOptions, Transformer, transform};
use rstest::*;

const PEEK_IMPORT: &str = "import { __peek } from \"reactant/runtime\";\n";
const ADAPT_IMPORT: &str = "import { __adapt } from \"reactant/runtime\";\n";

fn transformed(source: &str) -> String {
	transform(source).unwrap()
}

// ============================================================================
// Pass-through
// ============================================================================

#[rstest]
#[case("const x = 1;\nfunction f() { return x; }\n")]
#[case("const f = function () {};\n// function () {}\n")]
#[case("const a = <div title={user.name}>{items.length}</div>;")]
#[case("import React from \"react\";\ncreateElement(\"div\", null);")]
#[case("import { createElement } from \"./dom\";\ncreateElement(\"div\", null);")]
fn test_units_without_rewrites_are_unchanged(#[case] source: &str) {
	assert_eq!(transformed(source), source);
}

// ============================================================================
// Element factory calls
// ============================================================================

#[rstest]
#[case(
	"import root from \"react\";\nconst el = root.createElement(\"div\", {className: \"a\"}, \"hi\");",
	"import root from \"react\";\nconst el = <div class=\"a\">hi</div>;"
)]
#[case(
	"import * as R from \"react\";\nR.createElement(\"span\", null);",
	"import * as R from \"react\";\n<span />;"
)]
#[case(
	"import { createElement as h } from \"react\";\nh(\"span\", undefined);",
	"import { createElement as h } from \"react\";\n<span />;"
)]
#[case(
	"import React from \"react\";\nReact.createElement(Button, { onClick: go }, \"Go\");",
	"import React from \"react\";\n<Button onClick={go}>Go</Button>;"
)]
fn test_factory_calls_become_jsx(#[case] source: &str, #[case] expected: &str) {
	assert_eq!(transformed(source), expected);
}

#[test]
fn test_props_forms() {
	let source = r#"import React from "react";
React.createElement("input", { ...rest, [key]: 1, onClick: handle, disabled: true, "aria-label": "Name" });"#;
	let expected = r#"import React from "react";
<input {...rest} {...{[key]: 1}} onClick={handle} disabled={true} aria-label="Name" />;"#;

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_non_object_props_are_spread() {
	let source = "import React from \"react\";\nReact.createElement(\"a\", props, \"x\");";
	let expected = "import React from \"react\";\n<a {...props}>x</a>;";

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_children_forms() {
	let source = r#"import React from "react";
React.createElement("ul", null, React.createElement("li", { key: 1 }, "a"), items.map(render), ...extra);"#;
	let expected = r#"import React from "react";
<ul><li key={1}>a</li>{items.map(render)}{extra}</ul>;"#;

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_strings_that_do_not_read_the_same_stay_expressions() {
	let source = r#"import React from "react";
React.createElement("p", { title: 'it\'s', alt: "a &amp; b" }, "a\nb", "x < y");"#;
	let expected = r#"import React from "react";
<p title={'it\'s'} alt={"a &amp; b"}>{"a\nb"}{"x < y"}</p>;"#;

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_fragments() {
	let source = r#"import React, { Fragment } from "react";
React.createElement(Fragment, null, "a");
React.createElement(React.Fragment, null);"#;
	let expected = r#"import React, { Fragment } from "react";
<>a</>;
<></>;"#;

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_dynamic_values_in_factory_calls_are_deferred() {
	let source = "import React from \"react\";\nReact.createElement(\"p\", { title: user.name }, count + 1);";
	let expected = "import React from \"react\";\n<p title={(() => user.name)()}>{(() => count + 1)()}</p>;";

	assert_eq!(transformed(source), expected);
}

// ============================================================================
// Dynamic tags
// ============================================================================

#[test]
fn test_dynamic_tag_goes_through_adapter() {
	let source = "import React from \"react\";\nReact.createElement(\"div\", null, React.createElement(props.as, null));";
	let expected = format!(
		"{ADAPT_IMPORT}import React from \"react\";\n\
		 <div>{{(() => {{ const TempCls = __adapt(props.as); return <TempCls></TempCls>; }})()}}</div>;"
	);

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_dynamic_tag_temp_avoids_visible_names() {
	let source = "import React from \"react\";\nconst el = React.createElement(TempCls || \"div\", { id: \"x\" }, \"y\");";
	let expected = format!(
		"{ADAPT_IMPORT}import React from \"react\";\n\
		 const el = (() => {{ const TempCls_ = __adapt(TempCls || \"div\"); return <TempCls_ id=\"x\">y</TempCls_>; }})();"
	);

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_ternary_tag_temp_avoids_branch_text() {
	let source = "import React from \"react\";\nReact.createElement(wide ? TempCls : Other, null);";
	let expected = format!(
		"{ADAPT_IMPORT}import React from \"react\";\n\
		 (() => {{ const TempCls_ = __adapt(wide ? TempCls : Other); return <TempCls_></TempCls_>; }})();"
	);

	assert_eq!(transformed(source), expected);
}

// ============================================================================
// JSX positions
// ============================================================================

#[test]
fn test_jsx_positions_are_deferred_when_framework_imported() {
	let source = r#"import React from "react";
const a = <div title={user.name} style={{color: theme.fg}} onClick={handle}>{items.length}</div>;"#;
	let expected = r#"import React from "react";
const a = <div title={(() => user.name)()} style={{ color: (() => theme.fg)() }} onClick={handle}>{(() => items.length)()}</div>;"#;

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_sequence_expressions_are_parenthesized() {
	let source = "import \"react\";\nconst a = <p>{(log(), value.x)}</p>;";
	let expected = "import \"react\";\nconst a = <p>{(() => ((log(), value.x)))()}</p>;";

	assert_eq!(transformed(source), expected);
}

// ============================================================================
// Effect callbacks
// ============================================================================

#[test]
fn test_effect_block_body_snapshots_free_variables() {
	let source = "import { useEffect } from \"react\";\nuseEffect(() => { console.log(count); }, [count]);";
	let expected = format!(
		"{PEEK_IMPORT}import {{ useEffect }} from \"react\";\n\
		 useEffect(() => {{ const console_ = __peek(console); const count_ = __peek(count); console_.log(count_); }}, [count]);"
	);

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_effect_expression_body_becomes_block() {
	let source = "import React from \"react\";\nReact.useLayoutEffect(() => save(value), [value]);";
	let expected = format!(
		"{PEEK_IMPORT}import React from \"react\";\n\
		 React.useLayoutEffect(() => {{ const save_ = __peek(save); const value_ = __peek(value); return save_(value_); }}, [value]);"
	);

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_declared_assigned_and_ambient_names_are_not_snapshotted() {
	let source = "import { useEffect } from \"react\";\n\
		useEffect(function () { let local = 1; total += local; log(undefined); });";
	let expected = format!(
		"{PEEK_IMPORT}import {{ useEffect }} from \"react\";\n\
		 useEffect(function AnonFn() {{ const log_ = __peek(log); let local = 1; total += local; log_(undefined); }});"
	);

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_shorthand_properties_read_the_snapshot() {
	let source = "import { useInsertionEffect as useIns } from \"react\";\nuseIns(() => { send({ id }); }, [id]);";
	let expected = format!(
		"{PEEK_IMPORT}import {{ useInsertionEffect as useIns }} from \"react\";\n\
		 useIns(() => {{ const send_ = __peek(send); const id_ = __peek(id); send_({{ id: id_ }}); }}, [id]);"
	);

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_names_bound_in_nested_scopes_do_not_hide_outer_reads() {
	let source = "import { useEffect } from \"react\";\nuseEffect(() => { list.forEach(x => log(x)); send(x); }, [x]);";
	let expected = format!(
		"{PEEK_IMPORT}import {{ useEffect }} from \"react\";\n\
		 useEffect(() => {{ const list_ = __peek(list); const log_ = __peek(log); const send_ = __peek(send); const x_ = __peek(x); \
		 list_.forEach(x => log_(x)); send_(x_); }}, [x]);"
	);

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_block_and_var_bindings_resolve_to_their_scope() {
	let source = "import { useEffect } from \"react\";\n\
		useEffect(() => { if (ready) { var total = 1; let n = 2; use(n); } show(n, total); });";
	let expected = format!(
		"{PEEK_IMPORT}import {{ useEffect }} from \"react\";\n\
		 useEffect(() => {{ const ready_ = __peek(ready); const use_ = __peek(use); const show_ = __peek(show); const n_ = __peek(n); \
		 if (ready_) {{ var total = 1; let n = 2; use_(n); }} show_(n_, total); }});"
	);

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_nested_effect_reads_the_enclosing_snapshot_only_for_outer_names() {
	let source = "import { useEffect } from \"react\";\n\
		useEffect(() => { items.map(x => useEffect(() => { go(x); })); }, []);";
	let expected = format!(
		"{PEEK_IMPORT}import {{ useEffect }} from \"react\";\n\
		 useEffect(() => {{ const items_ = __peek(items); const go_ = __peek(go); \
		 items_.map(x => useEffect(() => {{ const go__ = __peek(go_); const x_ = __peek(x); go__(x_); }})); }}, []);"
	);

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_snapshots_follow_the_directive_prologue() {
	let source = "import { useEffect } from \"react\";\nuseEffect(() => { \"use strict\"; go(x); });";
	let expected = format!(
		"{PEEK_IMPORT}import {{ useEffect }} from \"react\";\n\
		 useEffect(() => {{ \"use strict\"; const go_ = __peek(go); const x_ = __peek(x); go_(x_); }});"
	);

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_framework_aliases_are_not_snapshotted() {
	let source = "import { createElement as h, useEffect } from \"react\";\n\
		useEffect(() => { mount(h(Comp, { v: val })); }, [val]);";
	let expected = format!(
		"{PEEK_IMPORT}import {{ createElement as h, useEffect }} from \"react\";\n\
		 useEffect(() => {{ const mount_ = __peek(mount); const Comp_ = __peek(Comp); const val_ = __peek(val); mount_(<Comp_ v={{val_}} />); }}, [val]);"
	);

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_effect_without_free_variables_is_unchanged() {
	let source = "import { useEffect } from \"react\";\nuseEffect(() => { let n = 0; n += 1; }, []);";

	assert_eq!(transformed(source), source);
}

// ============================================================================
// Anonymous functions and helper imports
// ============================================================================

#[test]
fn test_anonymous_functions_named_in_transformed_units() {
	let source = "import React from \"react\";\nexport default function () { return React.createElement(\"p\", null); }";
	let expected = "import React from \"react\";\nexport default function AnonFn() { return <p />; }";

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_runtime_import_follows_directives() {
	let source = "\"use client\"\nimport { useEffect } from \"react\";\nuseEffect(() => { tick(); });";
	let expected = "\"use client\"\nimport { __peek } from \"reactant/runtime\";\nimport { useEffect } from \"react\";\n\
		useEffect(() => { const tick_ = __peek(tick); tick_(); });";

	assert_eq!(transformed(source), expected);
}

#[test]
fn test_runtime_import_follows_hashbang() {
	let source = "#!/usr/bin/env node\nimport { useEffect } from \"react\";\nuseEffect(() => { tick(); });";
	let output = transformed(source);

	assert!(output.starts_with("#!/usr/bin/env node\n"));
	let helper = output.find("import { __peek }").unwrap();
	let framework = output.find("import { useEffect }").unwrap();
	assert!(helper < framework);
}

#[test]
fn test_custom_options() {
	let options = TransformOptions::default()
		.with_source_module("preact/compat")
		.with_helper_names("adapt", "peek")
		.without_runtime_import();
	let mut transformer = Transformer::new(options);

	let output = transformer
		.transform("import { useEffect } from \"preact/compat\";\nuseEffect(() => { show(count); });")
		.unwrap();

	assert_eq!(
		output,
		"import { useEffect } from \"preact/compat\";\nuseEffect(() => { const show_ = peek(show); const count_ = peek(count); show_(count_); });"
	);
}

// ============================================================================
// Errors and scoping
// ============================================================================

#[test]
fn test_parse_error_produces_no_output() {
	let result = transform("import React from \"react\";\nconst = ;");

	assert!(matches!(result, Err(TransformError::Parse { path: None, ref messages }) if !messages.is_empty()));
}

#[test]
fn test_parse_error_names_the_path() {
	let mut transformer = Transformer::default();
	let error = transformer.transform_path("broken.jsx", "let = ;").unwrap_err();

	assert!(error.to_string().starts_with("failed to parse broken.jsx: "));
	assert_eq!(transformer.scope_depth(), 0);
}

#[test]
fn test_aliases_do_not_leak_between_units() {
	let mut transformer = Transformer::default();

	let first = transformer
		.transform("import { createElement as h } from \"react\";\nh(\"i\", null);")
		.unwrap();
	let second = transformer.transform("h(\"i\", null);").unwrap();

	assert_eq!(first, "import { createElement as h } from \"react\";\n<i />;");
	assert_eq!(second, "h(\"i\", null);");
	assert_eq!(transformer.scope_depth(), 0);
}

#[test]
fn test_type_only_imports_are_ignored() {
	let mut transformer = Transformer::default();
	let source = "import type React from \"react\";\nReact.createElement(\"div\", null);";

	assert_eq!(transformer.transform_path("view.tsx", source).unwrap(), source);
}

proptest! {
	#[test]
	fn prop_any_alias_name_is_recognized(alias in "r_[a-z]{1,6}") {
		let source = format!("import {alias} from \"react\";\n{alias}.createElement(\"b\", null);");
		let expected = format!("import {alias} from \"react\";\n<b />;");
		prop_assert_eq!(transformed(&source), expected);
	}

	#[test]
	fn prop_units_without_framework_pass_through(values in prop::collection::vec(0u32..1000, 0..8)) {
		let source: String = values
			.iter()
			.enumerate()
			.map(|(i, n)| format!("const v{i} = function () {{ return {n}; }};\n"))
			.collect();
		prop_assert_eq!(transformed(&source), source);
	}
}
