use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TokrepError {
	#[error(transparent)]
	#[diagnostic(code(tokrep::io_error))]
	Io(#[from] std::io::Error),

	#[error("token prefix and token suffix are mandatory with custom token pattern")]
	#[diagnostic(
		code(tokrep::custom_token_pattern),
		help("pass both a token prefix and a token suffix when the pattern is `custom`")
	)]
	CustomPatternDelimiters,

	#[error("chars to escape and escape char are mandatory with custom escape")]
	#[diagnostic(
		code(tokrep::custom_escape),
		help("pass both the characters to escape and the escape character when escaping is `custom`")
	)]
	CustomEscapeConfig,

	#[error("token and transform suffixes cannot be the same")]
	#[diagnostic(
		code(tokrep::transform_suffix),
		help("choose a transform suffix that differs from the token suffix")
	)]
	TransformSuffixConflict,

	#[error("found cycle with token `{0}`")]
	#[diagnostic(
		code(tokrep::cycle),
		help("a variable value expands back into itself; break the loop or disable recursion")
	)]
	Cycle(String),

	#[error("failed to load variables from `{source_name}`: {reason}")]
	#[diagnostic(code(tokrep::variable_source))]
	VariableSource { source_name: String, reason: String },

	#[error("unsupported encoding: `{0}`")]
	#[diagnostic(
		code(tokrep::unsupported_encoding),
		help("supported encodings: auto, utf-8, ascii, utf-16le, utf-16be")
	)]
	UnsupportedEncoding(String),

	#[error("failed to decode `{path}` as {encoding}")]
	#[diagnostic(
		code(tokrep::decode),
		help("force the right encoding with the encoding option, or exclude the file")
	)]
	Decode { path: String, encoding: String },

	#[error("invalid glob pattern `{pattern}`: {reason}")]
	#[diagnostic(code(tokrep::glob))]
	Glob { pattern: String, reason: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(tokrep::config_parse),
		help("check that tokrep.toml is valid TOML")
	)]
	ConfigParse(String),
}

pub type TokrepResult<T> = Result<T, TokrepError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
