//! Variable sources and the optional `tokrep.toml` configuration file.
//!
//! Variables can come from three kinds of source specification:
//!
//! - `@glob[;glob...]` — files matched by the globs, parsed as YAML when the
//!   extension is `.yml`/`.yaml` (multi-document streams supported) and as
//!   JSON otherwise,
//! - `$NAME` — the environment variable `NAME`, parsed as JSON (an unset
//!   variable counts as `{}`),
//! - anything else — an inline JSON value.
//!
//! JSON sources may contain `//` and `/* */` comments.
//!
//! Each source yields one or more raw trees which the caller composes into a
//! [`crate::VariableMap`].

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::Encoding;
use crate::EscapeKind;
use crate::MissingAction;
use crate::MissingLog;
use crate::Options;
use crate::Reporter;
use crate::TokenStyle;
use crate::TokrepError;
use crate::TokrepResult;
use crate::codec;
use crate::glob;
use crate::glob::GlobOptions;
use crate::sources;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["tokrep.toml", ".tokrep.toml", ".config/tokrep.toml"];

/// Controls how variable source specifications are resolved.
#[derive(Debug, Clone, Default)]
pub struct VariableSpecOptions {
	/// Base directory for relative file globs.
	pub root: Option<PathBuf>,
	/// Match files and directories starting with a dot.
	pub dot: bool,
	/// Match file globs without regard to case.
	pub case_insensitive: bool,
	/// Convert backslashes in file globs to forward slashes.
	#[cfg(windows)]
	pub normalize_win32: bool,
}

/// Resolve every variable source specification into raw variable trees, in
/// order.
pub fn parse_variable_specs(
	specs: &[String],
	options: &VariableSpecOptions,
	reporter: &dyn Reporter,
) -> TokrepResult<Vec<serde_json::Value>> {
	let mut trees = Vec::new();

	for spec in specs {
		if let Some(globs) = spec.strip_prefix('@') {
			trees.extend(load_from_files(globs, options, reporter)?);
		} else if let Some(name) = spec.strip_prefix('$') {
			reporter.debug(&format!("loading variables from env '{name}'"));

			let raw = std::env::var(name).unwrap_or_else(|_| "{}".to_string());
			trees.push(parse_json(&raw, spec)?);
		} else {
			trees.push(parse_json(spec, spec)?);
		}
	}

	Ok(trees)
}

fn load_from_files(
	globs: &str,
	options: &VariableSpecOptions,
	reporter: &dyn Reporter,
) -> TokrepResult<Vec<serde_json::Value>> {
	#[cfg(windows)]
	let globs = if options.normalize_win32 {
		globs.replace('\\', "/")
	} else {
		globs.to_string()
	};
	#[cfg(windows)]
	let globs = globs.as_str();

	let patterns: Vec<String> = globs.split(';').map(|glob| glob.trim().to_string()).collect();
	let files = glob::resolve(
		&patterns,
		&GlobOptions {
			root: options.root.clone(),
			case_insensitive: options.case_insensitive,
			dot: options.dot,
		},
	)?;

	let mut trees = Vec::new();
	for file in files {
		reporter.debug(&format!(
			"loading variables from file '{}'",
			sources::normalize_path(&file.display().to_string())
		));

		let decoded = codec::read_text_file(&file, Encoding::Auto)?;
		let extension = file
			.extension()
			.and_then(|extension| extension.to_str())
			.unwrap_or("")
			.to_ascii_lowercase();

		if extension == "yml" || extension == "yaml" {
			for document in serde_yaml_ng::Deserializer::from_str(&decoded.content) {
				let tree = serde_json::Value::deserialize(document).map_err(|error| {
					TokrepError::VariableSource {
						source_name: file.display().to_string(),
						reason: error.to_string(),
					}
				})?;
				trees.push(tree);
			}
		} else {
			trees.push(parse_json(&decoded.content, &file.display().to_string())?);
		}
	}

	Ok(trees)
}

fn parse_json(raw: &str, source_name: &str) -> TokrepResult<serde_json::Value> {
	let stripped = strip_json_comments(raw);
	serde_json::from_str(&stripped).map_err(|error| TokrepError::VariableSource {
		source_name: source_name.to_string(),
		reason: error.to_string(),
	})
}

/// Remove `//` line comments and `/* */` block comments outside string
/// literals, so sources may carry annotations plain JSON forbids.
fn strip_json_comments(raw: &str) -> String {
	let mut output = String::with_capacity(raw.len());
	let mut chars = raw.chars().peekable();
	let mut in_string = false;

	while let Some(ch) = chars.next() {
		if in_string {
			output.push(ch);
			if ch == '\\' {
				if let Some(escaped) = chars.next() {
					output.push(escaped);
				}
			} else if ch == '"' {
				in_string = false;
			}
		} else if ch == '"' {
			in_string = true;
			output.push(ch);
		} else if ch == '/' && chars.peek() == Some(&'/') {
			chars.next();
			while let Some(&next) = chars.peek() {
				if next == '\n' {
					break;
				}
				chars.next();
			}
		} else if ch == '/' && chars.peek() == Some(&'*') {
			chars.next();
			let mut previous = '\0';
			for next in chars.by_ref() {
				if previous == '*' && next == '/' {
					break;
				}
				previous = next;
			}
			output.push(' ');
		} else {
			output.push(ch);
		}
	}

	output
}

/// Configuration loaded from a `tokrep.toml` file.
///
/// ```toml
/// sources = ["config/*.json => out/*.json"]
/// variables = ["@vars/**/*.yml", "$TOKREP_VARS"]
/// recursive = true
///
/// [token]
/// style = "double-underscores"
///
/// [missing]
/// action = "replace"
/// default = ""
/// ```
///
/// Every field is optional; values from the command line take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TokrepConfig {
	#[serde(default)]
	pub sources: Vec<String>,
	/// Variable source specifications, resolved like `--variables` arguments.
	#[serde(default)]
	pub variables: Vec<String>,
	#[serde(default)]
	pub root: Option<PathBuf>,
	#[serde(default)]
	pub encoding: Option<Encoding>,
	#[serde(default)]
	pub add_bom: Option<bool>,
	#[serde(default)]
	pub recursive: Option<bool>,
	#[serde(default)]
	pub separator: Option<String>,
	#[serde(default)]
	pub case_insensitive_paths: Option<bool>,
	#[serde(default)]
	pub token: TokenSection,
	#[serde(default)]
	pub missing: MissingSection,
	#[serde(default)]
	pub escape: EscapeSection,
	#[serde(default)]
	pub transforms: TransformsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TokenSection {
	#[serde(default)]
	pub style: Option<TokenStyle>,
	#[serde(default)]
	pub prefix: Option<String>,
	#[serde(default)]
	pub suffix: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MissingSection {
	#[serde(default)]
	pub action: Option<MissingAction>,
	#[serde(default, rename = "default")]
	pub default_value: Option<String>,
	#[serde(default)]
	pub log: Option<MissingLog>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EscapeSection {
	#[serde(default, rename = "type")]
	pub kind: Option<EscapeKind>,
	#[serde(default)]
	pub chars: Option<String>,
	#[serde(default)]
	pub escape_char: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransformsSection {
	#[serde(default)]
	pub enabled: Option<bool>,
	#[serde(default)]
	pub prefix: Option<String>,
	#[serde(default)]
	pub suffix: Option<String>,
}

impl TokrepConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> TokrepResult<Option<TokrepConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_file(&config_path).map(Some)
	}

	/// Load the config from an explicit file path.
	pub fn load_file(path: &Path) -> TokrepResult<TokrepConfig> {
		let content = std::fs::read_to_string(path)?;
		toml::from_str(&content).map_err(|error| TokrepError::ConfigParse(error.to_string()))
	}

	/// Copy every configured value onto `options`, leaving absent fields
	/// untouched.
	pub fn apply(&self, options: &mut Options) {
		if let Some(root) = &self.root {
			options.root = Some(root.clone());
		}
		if let Some(encoding) = self.encoding {
			options.encoding = encoding;
		}
		if let Some(add_bom) = self.add_bom {
			options.add_bom = add_bom;
		}
		if let Some(recursive) = self.recursive {
			options.recursive = recursive;
		}
		if let Some(separator) = &self.separator {
			options.separator = separator.clone();
		}
		if let Some(case_insensitive) = self.case_insensitive_paths {
			options.sources.case_insensitive = case_insensitive;
		}
		if let Some(style) = self.token.style {
			options.token.style = style;
		}
		if let Some(prefix) = &self.token.prefix {
			options.token.prefix = Some(prefix.clone());
		}
		if let Some(suffix) = &self.token.suffix {
			options.token.suffix = Some(suffix.clone());
		}
		if let Some(action) = self.missing.action {
			options.missing.action = action;
		}
		if let Some(default_value) = &self.missing.default_value {
			options.missing.default_value = Some(default_value.clone());
		}
		if let Some(log) = self.missing.log {
			options.missing.log = log;
		}
		if let Some(kind) = self.escape.kind {
			options.escape.kind = kind;
		}
		if let Some(chars) = &self.escape.chars {
			options.escape.chars = Some(chars.clone());
		}
		if let Some(escape_char) = &self.escape.escape_char {
			options.escape.escape_char = Some(escape_char.clone());
		}
		if let Some(enabled) = self.transforms.enabled {
			options.transforms.enabled = enabled;
		}
		if let Some(prefix) = &self.transforms.prefix {
			options.transforms.prefix = prefix.clone();
		}
		if let Some(suffix) = &self.transforms.suffix {
			options.transforms.suffix = suffix.clone();
		}
	}
}
