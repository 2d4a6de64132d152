//! Naming of anonymous function literals
//!
//! A purely textual pass run before parsing: every `function (` that has no
//! name gets one. Strings, template literals and comments are skipped;
//! template substitutions are scanned as code.

use crate::names::NameAllocator;

/// Text after naming, plus the names inserted in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepass {
	pub text: String,
	pub names: Vec<String>,
}

fn is_ident_byte(byte: u8) -> bool {
	byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$' || byte >= 0x80
}

fn skip_string(bytes: &[u8], mut i: usize, quote: u8) -> usize {
	i += 1;
	while i < bytes.len() {
		match bytes[i] {
			b'\\' => i += 2,
			b'\n' => return i,
			byte if byte == quote => return i + 1,
			_ => i += 1,
		}
	}
	bytes.len()
}

/// Scan template text from `i` up to the closing backtick or a `${`
fn skip_template(bytes: &[u8], mut i: usize, substitutions: &mut Vec<usize>) -> usize {
	while i < bytes.len() {
		match bytes[i] {
			b'\\' => i += 2,
			b'`' => return i + 1,
			b'$' if bytes.get(i + 1) == Some(&b'{') => {
				substitutions.push(0);
				return i + 2;
			}
			_ => i += 1,
		}
	}
	bytes.len()
}

fn previous_significant(bytes: &[u8], end: usize) -> Option<u8> {
	bytes[..end].iter().rev().copied().find(|byte| !byte.is_ascii_whitespace())
}

/// Byte offsets of the `(` of every anonymous `function` literal
pub fn anonymous_function_sites(source: &str) -> Vec<usize> {
	let bytes = source.as_bytes();
	let mut sites = Vec::new();
	// Brace depth inside each open template substitution
	let mut substitutions: Vec<usize> = Vec::new();
	let mut i = 0;

	while i < bytes.len() {
		match bytes[i] {
			b'/' if bytes.get(i + 1) == Some(&b'/') => {
				i = bytes[i..]
					.iter()
					.position(|&byte| byte == b'\n')
					.map_or(bytes.len(), |offset| i + offset);
			}
			b'/' if bytes.get(i + 1) == Some(&b'*') => {
				i = source[i + 2..].find("*/").map_or(bytes.len(), |offset| i + 2 + offset + 2);
			}
			quote @ (b'\'' | b'"') => i = skip_string(bytes, i, quote),
			b'`' => i = skip_template(bytes, i + 1, &mut substitutions),
			b'{' => {
				if let Some(depth) = substitutions.last_mut() {
					*depth += 1;
				}
				i += 1;
			}
			b'}' => match substitutions.last_mut() {
				Some(0) => {
					substitutions.pop();
					i = skip_template(bytes, i + 1, &mut substitutions);
				}
				Some(depth) => {
					*depth -= 1;
					i += 1;
				}
				None => i += 1,
			},
			byte if is_ident_byte(byte) => {
				let start = i;
				while i < bytes.len() && is_ident_byte(bytes[i]) {
					i += 1;
				}
				if &bytes[start..i] != b"function" || previous_significant(bytes, start) == Some(b'.') {
					continue;
				}
				let mut j = i;
				while j < bytes.len() && bytes[j].is_ascii_whitespace() {
					j += 1;
				}
				if bytes.get(j) == Some(&b'*') {
					j += 1;
					while j < bytes.len() && bytes[j].is_ascii_whitespace() {
						j += 1;
					}
				}
				if bytes.get(j) == Some(&b'(') {
					sites.push(j);
				}
			}
			_ => i += 1,
		}
	}

	sites
}

/// Give every anonymous function literal in `source` a unique name
///
/// The first literal gets the collision-free form of `base`; later ones get
/// that name followed by their index.
pub fn name_anonymous_functions(source: &str, base: &str, names: &mut NameAllocator) -> Prepass {
	let sites = anonymous_function_sites(source);
	if sites.is_empty() {
		return Prepass {
			text: source.to_string(),
			names: Vec::new(),
		};
	}

	let unique_base = names.allocate(base, source);
	let mut inserted = Vec::with_capacity(sites.len());
	let mut text = String::with_capacity(source.len() + sites.len() * (unique_base.len() + 2));
	let mut cursor = 0;

	for (index, &site) in sites.iter().enumerate() {
		let name = if index == 0 {
			unique_base.clone()
		} else {
			names.allocate(&format!("{unique_base}{index}"), source)
		};
		text.push_str(&source[cursor..site]);
		let glued = source.as_bytes()[site - 1];
		if !glued.is_ascii_whitespace() && glued != b'*' {
			text.push(' ');
		}
		text.push_str(&name);
		cursor = site;
		inserted.push(name);
	}
	text.push_str(&source[cursor..]);

	tracing::debug!(count = inserted.len(), "named anonymous functions");
	Prepass { text, names: inserted }
}
