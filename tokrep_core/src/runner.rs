//! File orchestration: resolve sources, run the engine over each match and
//! write the results.

use std::path::Path;

use crate::Counter;
use crate::EscapeKind;
use crate::Options;
use crate::Reporter;
use crate::ResolvedEscape;
use crate::TokrepError;
use crate::TokrepResult;
use crate::VariableMap;
use crate::codec;
use crate::codec::Encoding;
use crate::engine;
use crate::engine::Patterns;
use crate::glob;
use crate::glob::GlobOptions;
use crate::sources::SourceSpec;

/// Replace tokens in every file matched by `sources`.
///
/// Each source entry takes the form `glob[;glob...][ => output]`. The
/// aggregated [`Counter`] records the totals across all files; `files` counts
/// every matched file, whether or not it contained tokens.
pub fn replace_in_files(
	sources: &[String],
	variables: &VariableMap,
	options: &Options,
	reporter: &dyn Reporter,
) -> TokrepResult<Counter> {
	options.validate()?;

	reporter.begin_group("loading variables");
	let count = variables.len();
	reporter.info(&format!(
		"{count} variable{} loaded",
		if count > 1 { "s" } else { "" }
	));
	reporter.end_group();

	let patterns = Patterns::from_options(options)?;
	let specs = SourceSpec::parse_all(sources);

	let glob_options = GlobOptions {
		root: options.root.clone(),
		case_insensitive: options.sources.case_insensitive,
		dot: false,
	};

	let mut counters = Counter::default();
	for spec in &specs {
		for input in glob::resolve(&spec.input_patterns, &glob_options)? {
			let output = spec.output_for(&input).unwrap_or_else(|| input.clone());

			let file_counters =
				replace_in_file(&input, &output, variables, &patterns, options, reporter)?;
			counters.fold(&file_counters);
			counters.files += 1;
		}
	}

	Ok(counters)
}

/// Replace tokens in a single file, writing the result to `output`.
///
/// Tokenless files are copied byte for byte when the output differs from the
/// input, so binary files can sit inside a matched glob without damage.
pub fn replace_in_file(
	input: &Path,
	output: &Path,
	variables: &VariableMap,
	patterns: &Patterns,
	options: &Options,
	reporter: &dyn Reporter,
) -> TokrepResult<Counter> {
	reporter.begin_group(&format!("replacing tokens in '{}'", input.display()));
	let outcome = process_file(input, output, variables, patterns, options, reporter);
	reporter.end_group();
	outcome
}

fn process_file(
	input: &Path,
	output: &Path,
	variables: &VariableMap,
	patterns: &Patterns,
	options: &Options,
	reporter: &dyn Reporter,
) -> TokrepResult<Counter> {
	if input != output {
		reporter.info(&format!("output '{}'", output.display()));
	}

	let decoded = codec::read_text_file(input, options.encoding)?;
	if options.encoding == Encoding::Auto {
		reporter.debug(&format!("encoding '{}'", decoded.encoding.name()));
	}

	let escape_policy = ResolvedEscape::for_file(&options.escape, input, output)?;
	if options.escape.kind == EscapeKind::Auto && !matches!(escape_policy, ResolvedEscape::Off) {
		reporter.debug(&format!("escape '{}'", escape_policy.name()));
	}

	let (content, counters) = engine::substitute(
		&decoded.content,
		variables,
		patterns,
		&escape_policy,
		options,
		reporter,
		&[],
	)?;

	if counters.tokens > 0 && decoded.lossy {
		// Replacement characters would corrupt the rewritten file.
		return Err(TokrepError::Decode {
			path: input.display().to_string(),
			encoding: decoded.encoding.name().to_string(),
		});
	}

	if let Some(parent) = output.parent() {
		std::fs::create_dir_all(parent)?;
	}

	if counters.tokens > 0 {
		let bytes = codec::encode(&content, decoded.encoding, options.add_bom);
		std::fs::write(output, bytes)?;
	} else if input != output {
		std::fs::copy(input, output)?;
	}

	reporter.info(&format!(
		"replaced {replaced} token{} out of {tokens}{defaults}{transforms}",
		if counters.replaced > 1 { "s" } else { "" },
		replaced = counters.replaced,
		tokens = counters.tokens,
		defaults = if counters.defaults > 0 {
			format!(
				" (using {} default value{})",
				counters.defaults,
				if counters.defaults > 1 { "s" } else { "" }
			)
		} else {
			String::new()
		},
		transforms = if counters.transforms > 0 {
			format!(
				" (running {} transform{})",
				counters.transforms,
				if counters.transforms > 1 { "s" } else { "" }
			)
		} else {
			String::new()
		},
	));

	Ok(counters)
}
