use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use tokrep_core::EscapeKind;
use tokrep_core::MissingAction;
use tokrep_core::MissingLog;
use tokrep_core::TokenStyle;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Replace delimited tokens in text files with variable values.",
	long_about = "tokrep scans text files for delimited tokens such as #{ variable.name }# and \
	              replaces them with values from hierarchical variable sources (inline JSON, \
	              JSON/YAML files, environment variables).\n\nQuick start:\n  tokrep --sources \
	              'config/*.json' --variables '{\"app\":{\"name\":\"demo\"}}'\n\nSources may \
	              redirect their output: 'in/*.json => out/*.json'. A tokrep.toml file in the \
	              root directory provides defaults for any of the flags below."
)]
#[allow(clippy::struct_excessive_bools)]
pub struct TokrepCli {
	/// Semicolon separated glob patterns for input files, with an optional
	/// `=> output` redirection.
	#[arg(long, num_args = 1..)]
	pub sources: Vec<String>,

	/// Variable sources: inline JSON, `@file-glob` or `$ENV_NAME`.
	#[arg(long, num_args = 1..)]
	pub variables: Vec<String>,

	/// Add a byte order mark when writing files.
	#[arg(long, num_args = 0..=1, default_missing_value = "true")]
	pub add_bom: Option<bool>,

	/// Case-insensitive file path matching in glob patterns (sources and
	/// variables).
	#[arg(long, num_args = 0..=1, default_missing_value = "true")]
	pub case_insensitive_paths: Option<bool>,

	/// Characters to escape when escaping is `custom`.
	#[arg(long)]
	pub chars_to_escape: Option<String>,

	/// Explicit config file path, bypassing tokrep.toml discovery.
	#[arg(long)]
	pub config: Option<PathBuf>,

	/// Encoding used to read and write all files (auto, utf-8, utf-16le,
	/// utf-16be).
	#[arg(long)]
	pub encoding: Option<String>,

	/// Value escaping applied to replaced values.
	#[arg(long, value_enum)]
	pub escape: Option<EscapeArg>,

	/// Escape character when escaping is `custom`.
	#[arg(long)]
	pub escape_char: Option<String>,

	/// Lowest severity to print.
	#[arg(long, value_enum, default_value_t = LogLevelArg::Info)]
	pub log_level: LogLevelArg,

	/// Action to take when a variable is not found.
	#[arg(long, value_enum)]
	pub missing_var_action: Option<MissingActionArg>,

	/// Default value when a variable is not found and the action is
	/// `replace`.
	#[arg(long)]
	pub missing_var_default: Option<String>,

	/// Log severity used when a variable is not found.
	#[arg(long, value_enum)]
	pub missing_var_log: Option<MissingLogArg>,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_log_color: bool,

	/// Expand tokens found inside variable values.
	#[arg(long, num_args = 0..=1, default_missing_value = "true")]
	pub recursive: Option<bool>,

	/// Root path for relative glob patterns; the current working directory
	/// when not specified.
	#[arg(long)]
	pub root: Option<PathBuf>,

	/// Separator used when flattening variable names.
	#[arg(long)]
	pub separator: Option<String>,

	/// Token delimiter style.
	#[arg(long, value_enum)]
	pub token_pattern: Option<TokenPatternArg>,

	/// Token prefix when the pattern is `custom`.
	#[arg(long)]
	pub token_prefix: Option<String>,

	/// Token suffix when the pattern is `custom`.
	#[arg(long)]
	pub token_suffix: Option<String>,

	/// Enable transforms on variable values, e.g. `#{upper(name)}#`.
	#[arg(long, num_args = 0..=1, default_missing_value = "true")]
	pub transforms: Option<bool>,

	/// Transform parameter-list prefix.
	#[arg(long)]
	pub transforms_prefix: Option<String>,

	/// Transform parameter-list suffix.
	#[arg(long)]
	pub transforms_suffix: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevelArg {
	Debug,
	Info,
	Warn,
	Error,
	Off,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TokenPatternArg {
	/// `#{ ... }#`
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
	/// Delimiters from --token-prefix and --token-suffix.
	Custom,
}

impl From<TokenPatternArg> for TokenStyle {
	fn from(arg: TokenPatternArg) -> Self {
		match arg {
			TokenPatternArg::Default => Self::Default,
			TokenPatternArg::AzurePipelines => Self::AzurePipelines,
			TokenPatternArg::DoubleBraces => Self::DoubleBraces,
			TokenPatternArg::DoubleUnderscores => Self::DoubleUnderscores,
			TokenPatternArg::GithubActions => Self::GithubActions,
			TokenPatternArg::Octopus => Self::Octopus,
			TokenPatternArg::Custom => Self::Custom,
		}
	}
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EscapeArg {
	/// Pick json or xml from the file extensions, off otherwise.
	Auto,
	Json,
	Xml,
	/// Prefix --chars-to-escape characters with --escape-char.
	Custom,
	Off,
}

impl From<EscapeArg> for EscapeKind {
	fn from(arg: EscapeArg) -> Self {
		match arg {
			EscapeArg::Auto => Self::Auto,
			EscapeArg::Json => Self::Json,
			EscapeArg::Xml => Self::Xml,
			EscapeArg::Custom => Self::Custom,
			EscapeArg::Off => Self::Off,
		}
	}
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MissingActionArg {
	/// Replace the token with the empty string.
	None,
	/// Keep the token text verbatim.
	Keep,
	/// Replace the token with --missing-var-default.
	Replace,
}

impl From<MissingActionArg> for MissingAction {
	fn from(arg: MissingActionArg) -> Self {
		match arg {
			MissingActionArg::None => Self::None,
			MissingActionArg::Keep => Self::Keep,
			MissingActionArg::Replace => Self::Replace,
		}
	}
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MissingLogArg {
	Off,
	Warn,
	Error,
}

impl From<MissingLogArg> for MissingLog {
	fn from(arg: MissingLogArg) -> Self {
		match arg {
			MissingLogArg::Off => Self::Off,
			MissingLogArg::Warn => Self::Warn,
			MissingLogArg::Error => Self::Error,
		}
	}
}
