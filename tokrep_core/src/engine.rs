//! The substitution engine: per-match token resolution.

use serde::Serialize;

use crate::MissingAction;
use crate::MissingLog;
use crate::Options;
use crate::TokrepError;
use crate::TokrepResult;
use crate::VariableMap;
use crate::escape::ResolvedEscape;
use crate::escape::escape;
use crate::logger::Reporter;
use crate::pattern::TokenPattern;
use crate::pattern::TransformPattern;
use crate::transforms;
use crate::transforms::TransformInvocation;
use crate::transforms::TransformOutcome;

/// Replacement statistics. Created fresh per file, folded into recursion
/// totals, then folded again into the run total. Monotonic except for the
/// documented transform rollback on an unknown transform name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counter {
	/// Tokens seen.
	pub tokens: u64,
	/// Tokens replaced with a value (including defaults).
	pub replaced: u64,
	/// Default values applied by the `replace` missing-variable action.
	pub defaults: u64,
	/// Transforms applied.
	pub transforms: u64,
	/// Files processed.
	pub files: u64,
}

impl Counter {
	/// Fold another counter's replacement statistics into this one. `files`
	/// is deliberately excluded: it is only aggregated at the run level.
	pub fn fold(&mut self, other: &Counter) {
		self.tokens += other.tokens;
		self.replaced += other.replaced;
		self.defaults += other.defaults;
		self.transforms += other.transforms;
	}
}

/// Compiled matchers for one run.
#[derive(Debug, Clone)]
pub struct Patterns {
	pub token: TokenPattern,
	pub transform: TransformPattern,
}

impl Patterns {
	/// Build the matchers from validated options.
	pub fn from_options(options: &Options) -> TokrepResult<Self> {
		let (prefix, suffix) = options.token.delimiters()?;
		Ok(Self {
			token: TokenPattern::new(prefix, suffix),
			transform: TransformPattern::new(
				options.transforms.prefix.clone(),
				options.transforms.suffix.clone(),
			),
		})
	}
}

/// Replace every token in `content`, in document order, non-overlapping.
///
/// `chain` is the set of variable keys currently being resolved in this
/// recursive call stack; pass an empty slice at the top level. The only
/// fatal condition is a resolution cycle — every other branch is recorded
/// in the returned [`Counter`] and reported through `reporter`.
pub fn substitute(
	content: &str,
	variables: &VariableMap,
	patterns: &Patterns,
	escape_policy: &ResolvedEscape,
	options: &Options,
	reporter: &dyn Reporter,
	chain: &[String],
) -> TokrepResult<(String, Counter)> {
	let mut counters = Counter::default();
	let mut result = String::with_capacity(content.len());
	let mut cursor = 0;

	for found in patterns.token.matches(content) {
		counters.tokens += 1;

		// Extract the transform invocation, if any. Its first parameter
		// becomes the effective variable name.
		let mut name = found.body.to_string();
		let mut invocation: Option<TransformInvocation> = None;
		if options.transforms.enabled {
			if let Some(mut parsed) = TransformInvocation::parse(&patterns.transform, found.body) {
				name = parsed.take_variable_name();
				counters.transforms += 1;
				invocation = Some(parsed);
			}
		}

		let key = name.to_uppercase();
		if options.recursive && chain.contains(&key) {
			return Err(TokrepError::Cycle(name));
		}

		let mut value = match variables.get(&name) {
			Some(value) => {
				counters.replaced += 1;
				let mut value = value.to_string();

				if options.recursive {
					let mut nested_chain = chain.to_vec();
					nested_chain.push(key);

					let (expanded, nested) = substitute(
						&value,
						variables,
						patterns,
						escape_policy,
						options,
						reporter,
						&nested_chain,
					)?;
					counters.fold(&nested);
					value = expanded;
				}

				value
			}
			None => match options.missing.action {
				MissingAction::Keep => {
					log_missing(reporter, options, &name);
					content[found.start..found.end].to_string()
				}
				MissingAction::Replace => {
					counters.defaults += 1;
					counters.replaced += 1;
					options.missing.default_value.clone().unwrap_or_default()
				}
				MissingAction::None => {
					log_missing(reporter, options, &name);
					counters.replaced += 1;
					String::new()
				}
			},
		};

		reporter.debug(&format!("{name}: {value}"));

		// Apply the transform, then escape — unless the transform was `raw`,
		// which always bypasses escaping.
		let mut skip_escape = false;
		if let Some(invocation) = &invocation {
			match transforms::apply(&invocation.name, &invocation.params, value) {
				TransformOutcome::Value(transformed) => value = transformed,
				TransformOutcome::Raw(passthrough) => {
					value = passthrough;
					skip_escape = true;
				}
				TransformOutcome::Unknown(passthrough) => {
					reporter.warn(&format!("unsupported transform '{}'", invocation.name));
					counters.transforms -= 1;
					value = passthrough;
				}
			}
		}

		if !skip_escape {
			value = escape(&value, escape_policy);
		}

		result.push_str(&content[cursor..found.start]);
		result.push_str(&value);
		cursor = found.end;
	}

	result.push_str(&content[cursor..]);

	Ok((result, counters))
}

fn log_missing(reporter: &dyn Reporter, options: &Options, name: &str) {
	let message = format!("variable '{name}' not found");
	match options.missing.log {
		MissingLog::Off => {}
		MissingLog::Warn => reporter.warn(&message),
		MissingLog::Error => reporter.error(&message),
	}
}
