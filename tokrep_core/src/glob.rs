//! Glob resolution: pattern lists to absolute, deduplicated file lists.
//!
//! Patterns beginning with `!` exclude rather than include. A pattern with
//! no glob metacharacters is treated as a plain path. The returned list is
//! sorted so runs are deterministic.

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use globset::GlobBuilder;
use globset::GlobMatcher;
use ignore::WalkBuilder;

use crate::TokrepError;
use crate::TokrepResult;

/// Options for one resolution request.
#[derive(Debug, Clone, Default)]
pub struct GlobOptions {
	/// Base directory for relative patterns; the current directory when
	/// unset.
	pub root: Option<PathBuf>,
	/// Case-insensitive matching.
	pub case_insensitive: bool,
	/// Match dotfiles too.
	pub dot: bool,
}

/// Resolve a pattern list to an absolute, deduplicated, files-only list.
pub fn resolve(patterns: &[String], options: &GlobOptions) -> TokrepResult<Vec<PathBuf>> {
	let root = match &options.root {
		Some(root) => root.clone(),
		None => std::env::current_dir()?,
	};

	let mut includes = Vec::new();
	let mut excludes = Vec::new();
	for pattern in patterns {
		if let Some(negated) = pattern.strip_prefix('!') {
			excludes.push(compile(negated, &root, options)?);
		} else {
			includes.push(pattern.as_str());
		}
	}

	let mut files = BTreeSet::new();
	for pattern in includes {
		collect(pattern, &root, options, &excludes, &mut files)?;
	}

	tracing::debug!(count = files.len(), "glob resolution complete");

	Ok(files.into_iter().collect())
}

fn collect(
	pattern: &str,
	root: &Path,
	options: &GlobOptions,
	excludes: &[GlobMatcher],
	files: &mut BTreeSet<PathBuf>,
) -> TokrepResult<()> {
	// Plain paths short-circuit to an existence check.
	if !has_meta(pattern) {
		let path = absolute(pattern, root);
		if path.is_file() && !excludes.iter().any(|m| m.is_match(&path)) {
			files.insert(path);
		}
		return Ok(());
	}

	let matcher = compile(pattern, root, options)?;
	let base = walk_base(pattern, root);

	let walker = WalkBuilder::new(&base)
		.hidden(!options.dot)
		.git_ignore(false)
		.git_global(false)
		.git_exclude(false)
		.parents(false)
		.ignore(false)
		.follow_links(false)
		.build();

	for entry in walker {
		let Ok(entry) = entry else { continue };
		if !entry.file_type().is_some_and(|t| t.is_file()) {
			continue;
		}

		let path = entry.path();
		if matcher.is_match(path) && !excludes.iter().any(|m| m.is_match(path)) {
			files.insert(path.to_path_buf());
		}
	}

	Ok(())
}

/// Compile a pattern into a matcher over absolute paths.
fn compile(pattern: &str, root: &Path, options: &GlobOptions) -> TokrepResult<GlobMatcher> {
	let absolute_pattern = if Path::new(pattern).is_absolute() {
		pattern.to_string()
	} else {
		root.join(pattern).to_string_lossy().into_owned()
	};

	GlobBuilder::new(&absolute_pattern)
		.case_insensitive(options.case_insensitive)
		.literal_separator(true)
		.build()
		.map(|glob| glob.compile_matcher())
		.map_err(|e| TokrepError::Glob {
			pattern: pattern.to_string(),
			reason: e.to_string(),
		})
}

/// The deepest directory that can be walked for a pattern: its literal
/// prefix up to the first component carrying a metacharacter.
fn walk_base(pattern: &str, root: &Path) -> PathBuf {
	let path = absolute(pattern, root);
	let mut base = PathBuf::new();

	for component in path.components() {
		let text = component.as_os_str().to_string_lossy();
		if has_meta(&text) {
			break;
		}
		base.push(component);
	}

	// The last literal component is the filename part of the pattern.
	if base.as_os_str().is_empty() {
		root.to_path_buf()
	} else if base == path {
		base.parent().map_or_else(|| root.to_path_buf(), Path::to_path_buf)
	} else {
		base
	}
}

fn absolute(pattern: &str, root: &Path) -> PathBuf {
	let path = Path::new(pattern);
	if path.is_absolute() {
		path.to_path_buf()
	} else {
		root.join(path)
	}
}

fn has_meta(pattern: &str) -> bool {
	pattern.contains(['*', '?', '[', ']', '{', '}'])
}
