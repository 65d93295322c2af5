//! Source specifications: input globs with an optional output pattern.
//!
//! A source takes the form `glob[;glob...][ => output]`. When the output
//! pattern contains `*` and the first input glob has a wildcard in its file
//! name, the wildcard is transplanted: the part of the matched file name
//! covered by the input wildcard replaces the `*` in the output. A relative
//! output is resolved against the matched file's directory.

use std::path::Path;
use std::path::PathBuf;

/// A parsed source entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
	pub input_patterns: Vec<String>,
	pub input_has_wildcard: bool,
	pub output_pattern: Option<String>,
	pub output_is_relative: bool,
}

impl SourceSpec {
	/// Parse a single `input[;input...][ => output]` entry.
	pub fn parse(source: &str) -> Self {
		// anything past a second `=>` is discarded
		let mut parts = source.split("=>");
		let inputs = parts.next().unwrap_or_default();
		let output = parts.next();

		let input_patterns: Vec<String> =
			inputs.trim().split(';').map(str::to_string).collect();

		// the wildcard transplant only looks at the file name of the first
		// input pattern
		let input_has_wildcard = input_patterns
			.first()
			.map(|pattern| file_name(pattern).contains('*'))
			.unwrap_or_default();

		let output_pattern = output.map(|output| normalize_path(output.trim()));
		let output_is_relative = output_pattern
			.as_deref()
			.is_some_and(|output| !Path::new(output).is_absolute());

		Self {
			input_patterns,
			input_has_wildcard,
			output_pattern,
			output_is_relative,
		}
	}

	/// Parse every entry in order.
	pub fn parse_all<S: AsRef<str>>(sources: &[S]) -> Vec<Self> {
		sources
			.iter()
			.map(|source| Self::parse(source.as_ref()))
			.collect()
	}

	/// The output path for a matched input file, or `None` when the file is
	/// replaced in place.
	pub fn output_for(&self, input: &Path) -> Option<PathBuf> {
		let pattern = self.output_pattern.as_deref()?;
		let mut output = pattern.to_string();

		if self.input_has_wildcard {
			let pattern_name = file_name(&self.input_patterns[0]);
			let input_name = input
				.file_name()
				.map(|name| name.to_string_lossy().into_owned())
				.unwrap_or_default();
			output = output.replacen('*', &wildcard_value(&input_name, pattern_name), 1);
		}

		if self.output_is_relative {
			let parent = input.parent().unwrap_or_else(|| Path::new(""));
			Some(parent.join(output))
		} else {
			Some(PathBuf::from(output))
		}
	}
}

/// The part of `input_name` covered by the `*` in `pattern_name`.
///
/// The literal text before the wildcard keeps its length on the left and the
/// literal text after it keeps its length on the right; whatever sits between
/// the two is the wildcard's value.
fn wildcard_value(input_name: &str, pattern_name: &str) -> String {
	let Some(index) = pattern_name.find('*') else {
		return String::new();
	};

	let tail = pattern_name.len() - index - 1;
	let end = input_name.len().saturating_sub(tail).max(index);
	input_name
		.get(index..end)
		.unwrap_or_default()
		.to_string()
}

fn file_name(pattern: &str) -> &str {
	pattern
		.rsplit(['/', '\\'])
		.next()
		.unwrap_or(pattern)
}

/// Collapse redundant path separators.
#[cfg(not(windows))]
pub fn normalize_path(path: &str) -> String {
	collapse(path, '/')
}

/// Convert separators to backslashes and collapse duplicates, preserving the
/// leading double backslash of UNC paths.
#[cfg(windows)]
pub fn normalize_path(path: &str) -> String {
	let path = path.replace('/', "\\");
	let is_unc = path.starts_with("\\\\") && path[2..].chars().next().is_some_and(|ch| ch != '\\');
	let collapsed = collapse(&path, '\\');
	if is_unc {
		format!("\\{collapsed}")
	} else {
		collapsed
	}
}

fn collapse(path: &str, separator: char) -> String {
	let mut collapsed = String::with_capacity(path.len());
	let mut previous = None;

	for ch in path.chars() {
		if ch == separator && previous == Some(separator) {
			continue;
		}

		collapsed.push(ch);
		previous = Some(ch);
	}

	collapsed
}
