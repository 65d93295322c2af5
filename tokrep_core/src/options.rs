use std::path::PathBuf;

use serde::Deserialize;

use crate::TokrepError;
use crate::TokrepResult;
use crate::codec::Encoding;

/// Default separator joining flattened variable path segments.
pub const DEFAULT_SEPARATOR: &str = ".";
/// Default transform invocation delimiters.
pub const DEFAULT_TRANSFORM_PREFIX: &str = "(";
pub const DEFAULT_TRANSFORM_SUFFIX: &str = ")";

/// Named token delimiter presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenStyle {
	/// `#{ ... }#`
	#[default]
	Default,
	/// `$( ... )`
	AzurePipelines,
	/// `{{ ... }}`
	DoubleBraces,
	/// `__ ... __`
	DoubleUnderscores,
	/// `${{ ... }}`
	GithubActions,
	/// `#{ ... }`
	Octopus,
	/// Caller-supplied prefix and suffix.
	Custom,
}

impl TokenStyle {
	/// The preset's literal delimiters, or `None` for [`TokenStyle::Custom`].
	pub fn delimiters(self) -> Option<(&'static str, &'static str)> {
		match self {
			Self::Default => Some(("#{", "}#")),
			Self::AzurePipelines => Some(("$(", ")")),
			Self::DoubleBraces => Some(("{{", "}}")),
			Self::DoubleUnderscores => Some(("__", "__")),
			Self::GithubActions => Some(("${{", "}}")),
			Self::Octopus => Some(("#{", "}")),
			Self::Custom => None,
		}
	}
}

/// Policy applied when a token's variable has no value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingAction {
	/// Replace the token with the empty string.
	#[default]
	None,
	/// Keep the token text verbatim.
	Keep,
	/// Replace the token with [`MissingOptions::default_value`].
	Replace,
}

/// Severity used when logging a missing variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingLog {
	Off,
	#[default]
	Warn,
	Error,
}

/// Requested escaping behavior. `Auto` is resolved per file by the
/// orchestrator before the engine runs; the engine only ever sees a concrete
/// type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EscapeKind {
	/// Pick `json`/`xml`/`off` from the file extensions.
	Auto,
	Json,
	Xml,
	Custom,
	#[default]
	Off,
}

/// Token delimiter selection.
#[derive(Debug, Clone, Default)]
pub struct TokenOptions {
	pub style: TokenStyle,
	/// Custom prefix, required when `style` is [`TokenStyle::Custom`].
	pub prefix: Option<String>,
	/// Custom suffix, required when `style` is [`TokenStyle::Custom`].
	pub suffix: Option<String>,
}

impl TokenOptions {
	/// Resolve the effective prefix/suffix pair for this selection.
	pub fn delimiters(&self) -> TokrepResult<(String, String)> {
		if let Some((prefix, suffix)) = self.style.delimiters() {
			return Ok((prefix.to_string(), suffix.to_string()));
		}

		match (&self.prefix, &self.suffix) {
			(Some(prefix), Some(suffix)) if !prefix.is_empty() && !suffix.is_empty() => {
				Ok((prefix.clone(), suffix.clone()))
			}
			_ => Err(TokrepError::CustomPatternDelimiters),
		}
	}
}

/// Missing-variable policy.
#[derive(Debug, Clone, Default)]
pub struct MissingOptions {
	pub action: MissingAction,
	/// Value substituted by [`MissingAction::Replace`]; empty when unset.
	pub default_value: Option<String>,
	pub log: MissingLog,
}

/// Escaping policy selection.
#[derive(Debug, Clone, Default)]
pub struct EscapeOptions {
	pub kind: EscapeKind,
	/// Characters to escape, required with [`EscapeKind::Custom`].
	pub chars: Option<String>,
	/// Escape character, required with [`EscapeKind::Custom`].
	pub escape_char: Option<String>,
}

/// Transform parsing configuration.
#[derive(Debug, Clone)]
pub struct TransformOptions {
	pub enabled: bool,
	pub prefix: String,
	pub suffix: String,
}

impl Default for TransformOptions {
	fn default() -> Self {
		Self {
			enabled: false,
			prefix: DEFAULT_TRANSFORM_PREFIX.to_string(),
			suffix: DEFAULT_TRANSFORM_SUFFIX.to_string(),
		}
	}
}

/// Input file matching configuration.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
	/// Case-insensitive glob matching for input files.
	pub case_insensitive: bool,
}

/// Options controlling a whole replacement run.
#[derive(Debug, Clone)]
pub struct Options {
	/// Codec used for reading and writing files.
	pub encoding: Encoding,
	/// Base directory for relative glob resolution; the current directory
	/// when unset.
	pub root: Option<PathBuf>,
	pub token: TokenOptions,
	pub missing: MissingOptions,
	/// Expand tokens found inside variable values, with cycle detection.
	pub recursive: bool,
	/// Emit a byte order mark when writing.
	pub add_bom: bool,
	pub escape: EscapeOptions,
	/// Path-join character used when flattening variables.
	pub separator: String,
	pub transforms: TransformOptions,
	pub sources: SourceOptions,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			encoding: Encoding::Auto,
			root: None,
			token: TokenOptions::default(),
			missing: MissingOptions::default(),
			recursive: false,
			add_bom: true,
			escape: EscapeOptions::default(),
			separator: DEFAULT_SEPARATOR.to_string(),
			transforms: TransformOptions::default(),
			sources: SourceOptions::default(),
		}
	}
}

impl Options {
	/// Check the fatal configuration errors raised before any file is
	/// touched.
	pub fn validate(&self) -> TokrepResult<()> {
		// Resolving delimiters surfaces the custom-pattern error.
		let (_, token_suffix) = self.token.delimiters()?;

		if self.escape.kind == EscapeKind::Custom {
			let has_chars = self.escape.chars.as_deref().is_some_and(|c| !c.is_empty());
			let has_escape_char = self
				.escape
				.escape_char
				.as_deref()
				.is_some_and(|c| !c.is_empty());
			if !has_chars || !has_escape_char {
				return Err(TokrepError::CustomEscapeConfig);
			}
		}

		if self.transforms.enabled && token_suffix == self.transforms.suffix {
			return Err(TokrepError::TransformSuffixConflict);
		}

		Ok(())
	}
}
