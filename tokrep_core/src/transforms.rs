//! The transform interpreter.
//!
//! A token body like `upper(var1)` invokes a named transform on the resolved
//! value. The first parameter is always the variable name; the remaining
//! parameters belong to the transform itself, e.g. `indent(var, 4, true)`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::pattern::TransformPattern;

/// Fallback indent width when the parameter is absent, zero, or unparseable.
const DEFAULT_INDENT_WIDTH: usize = 2;

/// A parsed transform invocation: case-folded name plus trimmed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformInvocation {
	pub name: String,
	pub params: Vec<String>,
}

impl TransformInvocation {
	/// Parse a token body. Returns `None` when the body has no delimited
	/// parameter section, i.e. the token is a plain variable reference.
	pub fn parse(pattern: &TransformPattern, body: &str) -> Option<Self> {
		let capture = pattern.capture(body)?;
		Some(Self {
			name: capture.name.to_lowercase(),
			params: capture.params.split(',').map(|p| p.trim().to_string()).collect(),
		})
	}

	/// Pop the leading parameter: the effective variable name for the token.
	pub fn take_variable_name(&mut self) -> String {
		if self.params.is_empty() {
			String::new()
		} else {
			self.params.remove(0)
		}
	}
}

/// Outcome of applying a named transform.
pub enum TransformOutcome {
	/// Transformed value; escaping still applies.
	Value(String),
	/// `raw` passthrough; escaping is bypassed.
	Raw(String),
	/// Unknown transform name; value passes through and the transform
	/// counter rolls back.
	Unknown(String),
}

/// Apply a transform by name. Any unrecognized name, the empty string
/// included, is reported as unknown.
pub fn apply(name: &str, params: &[String], value: String) -> TransformOutcome {
	match name {
		"raw" => TransformOutcome::Raw(value),
		"lower" => TransformOutcome::Value(value.to_lowercase()),
		"upper" => TransformOutcome::Value(value.to_uppercase()),
		"base64" => TransformOutcome::Value(BASE64.encode(value.as_bytes())),
		"indent" => TransformOutcome::Value(indent(
			&value,
			indent_width(params.first()),
			params
				.get(1)
				.is_some_and(|first| first.eq_ignore_ascii_case("true")),
		)),
		_ => TransformOutcome::Unknown(value),
	}
}

// Only the leading digit run counts, so `4px` means a width of 4.
fn indent_width(param: Option<&String>) -> usize {
	param
		.map(|p| p.chars().take_while(char::is_ascii_digit).collect::<String>())
		.and_then(|digits| digits.parse::<usize>().ok())
		.filter(|width| *width != 0)
		.unwrap_or(DEFAULT_INDENT_WIDTH)
}

/// Insert `width` spaces after every line break, preserving `\r\n`. When
/// `first_line` is set the first line is prefixed too.
fn indent(value: &str, width: usize, first_line: bool) -> String {
	let pad = " ".repeat(width);
	let mut result = String::with_capacity(value.len());

	if first_line {
		result.push_str(&pad);
	}

	let mut chars = value.chars().peekable();
	while let Some(c) = chars.next() {
		result.push(c);
		match c {
			'\n' => result.push_str(&pad),
			'\r' if chars.peek() == Some(&'\n') => {
				result.push(chars.next().unwrap_or('\n'));
				result.push_str(&pad);
			}
			_ => {}
		}
	}

	result
}
