//! Output-format-aware value escaping.

use std::path::Path;

use regex::Regex;

use crate::EscapeKind;
use crate::EscapeOptions;
use crate::TokrepError;
use crate::TokrepResult;

/// A concrete, per-file escaping policy. `auto` never reaches the engine:
/// the orchestrator resolves it from the file extensions first.
#[derive(Debug, Clone, Default)]
pub enum ResolvedEscape {
	Json,
	Xml,
	Custom { chars: Regex, escape_char: String },
	#[default]
	Off,
}

impl ResolvedEscape {
	/// Resolve the configured escaping for one file. `auto` picks `json` or
	/// `xml` when either side of the rename has that extension, `off`
	/// otherwise.
	pub fn for_file(options: &EscapeOptions, input: &Path, output: &Path) -> TokrepResult<Self> {
		let kind = match options.kind {
			EscapeKind::Auto => {
				if has_extension(input, "json") || has_extension(output, "json") {
					EscapeKind::Json
				} else if has_extension(input, "xml") || has_extension(output, "xml") {
					EscapeKind::Xml
				} else {
					EscapeKind::Off
				}
			}
			other => other,
		};

		Self::from_kind(kind, options)
	}

	pub fn from_kind(kind: EscapeKind, options: &EscapeOptions) -> TokrepResult<Self> {
		match kind {
			EscapeKind::Json => Ok(Self::Json),
			EscapeKind::Xml => Ok(Self::Xml),
			EscapeKind::Off | EscapeKind::Auto => Ok(Self::Off),
			EscapeKind::Custom => {
				let (Some(chars), Some(escape_char)) = (&options.chars, &options.escape_char) else {
					return Err(TokrepError::CustomEscapeConfig);
				};
				if chars.is_empty() || escape_char.is_empty() {
					return Err(TokrepError::CustomEscapeConfig);
				}

				Ok(Self::Custom {
					chars: custom_char_class(chars)?,
					escape_char: escape_char.clone(),
				})
			}
		}
	}

	/// The name the auto resolution is logged under.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Json => "json",
			Self::Xml => "xml",
			Self::Custom { .. } => "custom",
			Self::Off => "off",
		}
	}
}

/// Escape a resolved value for the target output format.
pub fn escape(value: &str, policy: &ResolvedEscape) -> String {
	match policy {
		ResolvedEscape::Off => value.to_string(),
		ResolvedEscape::Json => {
			let mut escaped = String::with_capacity(value.len());
			for c in value.chars() {
				match c {
					'"' => escaped.push_str("\\\""),
					'\\' => escaped.push_str("\\\\"),
					'\u{8}' => escaped.push_str("\\b"),
					'\u{c}' => escaped.push_str("\\f"),
					'\n' => escaped.push_str("\\n"),
					'\r' => escaped.push_str("\\r"),
					'\t' => escaped.push_str("\\t"),
					other => escaped.push(other),
				}
			}
			escaped
		}
		ResolvedEscape::Xml => {
			let mut escaped = String::with_capacity(value.len());
			for c in value.chars() {
				match c {
					'<' => escaped.push_str("&lt;"),
					'>' => escaped.push_str("&gt;"),
					'&' => escaped.push_str("&amp;"),
					'\'' => escaped.push_str("&apos;"),
					'"' => escaped.push_str("&quot;"),
					other => escaped.push(other),
				}
			}
			escaped
		}
		ResolvedEscape::Custom { chars, escape_char } => chars
			.replace_all(value, |caps: &regex::Captures| {
				format!("{escape_char}{}", &caps[0])
			})
			.into_owned(),
	}
}

fn has_extension(path: &Path, extension: &str) -> bool {
	path.extension().and_then(|e| e.to_str()) == Some(extension)
}

/// Build the character class matching every character the caller asked to
/// escape. The characters are regex-escaped before pattern construction.
fn custom_char_class(chars: &str) -> TokrepResult<Regex> {
	let class: String = chars.chars().map(|c| regex::escape(&c.to_string())).collect();
	Regex::new(&format!("[{class}]")).map_err(|_| TokrepError::CustomEscapeConfig)
}
