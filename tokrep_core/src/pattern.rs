//! Compiled token and transform matchers.
//!
//! Both matchers are built at run start from a prefix/suffix pair and scan
//! by hand rather than through a regex, which keeps the body rules exact:
//! a token body stops at the first whitespace-run-then-suffix, never spans a
//! line break, and is abandoned when a nested prefix opens before the
//! suffix closes (scanning then resumes at the nested prefix).

/// One token occurrence in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMatch<'a> {
	/// Byte offset of the prefix.
	pub start: usize,
	/// Byte offset just past the suffix.
	pub end: usize,
	/// The captured body, without the delimiters or surrounding whitespace.
	pub body: &'a str,
}

/// Token matcher for one prefix/suffix pair.
#[derive(Debug, Clone)]
pub struct TokenPattern {
	prefix: String,
	suffix: String,
}

impl TokenPattern {
	pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			suffix: suffix.into(),
		}
	}

	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	pub fn suffix(&self) -> &str {
		&self.suffix
	}

	/// Find the next token at or after byte offset `from`.
	pub fn find_at<'a>(&self, content: &'a str, from: usize) -> Option<TokenMatch<'a>> {
		let mut search = from;

		while search <= content.len() {
			let start = find_from(content, &self.prefix, search)?;
			let after_prefix = start + self.prefix.len();
			let body_start = skip_whitespace(content, after_prefix);

			match self.scan_body(content, body_start) {
				BodyScan::Match { body_end, end } => {
					return Some(TokenMatch {
						start,
						end,
						body: &content[body_start..body_end],
					});
				}
				// A nested prefix voids this candidate; it becomes the next
				// start position.
				BodyScan::NestedPrefix { at } => search = at,
				BodyScan::Unterminated => search = start + 1,
			}
		}

		None
	}

	/// Iterate over all non-overlapping tokens, left to right.
	pub fn matches<'p, 'a>(&'p self, content: &'a str) -> TokenMatches<'p, 'a> {
		TokenMatches {
			pattern: self,
			content,
			position: 0,
		}
	}

	fn scan_body(&self, content: &str, body_start: usize) -> BodyScan {
		let mut position = body_start;

		loop {
			if let Some(end) = whitespace_then(content, position, &self.suffix) {
				return BodyScan::Match {
					body_end: position,
					end,
				};
			}

			if content[position..].starts_with(self.prefix.as_str()) {
				return BodyScan::NestedPrefix { at: position };
			}

			match content[position..].chars().next() {
				// Token bodies never span a line break.
				None | Some('\n' | '\r') => return BodyScan::Unterminated,
				Some(c) => position += c.len_utf8(),
			}
		}
	}
}

enum BodyScan {
	Match { body_end: usize, end: usize },
	NestedPrefix { at: usize },
	Unterminated,
}

/// Iterator over [`TokenMatch`]es produced by [`TokenPattern::matches`].
pub struct TokenMatches<'p, 'a> {
	pattern: &'p TokenPattern,
	content: &'a str,
	position: usize,
}

impl<'a> Iterator for TokenMatches<'_, 'a> {
	type Item = TokenMatch<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		let found = self.pattern.find_at(self.content, self.position)?;
		self.position = found.end;
		Some(found)
	}
}

/// Raw transform capture from a token body: the text ahead of the transform
/// prefix and the delimited parameter section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformCapture<'a> {
	/// Text between the body's leading whitespace and the transform prefix.
	pub name: &'a str,
	/// The delimited parameter-list text, surrounding whitespace excluded.
	pub params: &'a str,
}

/// Transform matcher applied to a token's captured body.
#[derive(Debug, Clone)]
pub struct TransformPattern {
	prefix: String,
	suffix: String,
}

impl TransformPattern {
	pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			suffix: suffix.into(),
		}
	}

	/// Match a token body against the transform shape. The transform name is
	/// the text up to the last prefix occurrence that is followed by a
	/// closed parameter section; anything after the suffix is ignored.
	pub fn capture<'a>(&self, body: &'a str) -> Option<TransformCapture<'a>> {
		let name_start = skip_whitespace(body, 0);
		let occurrences: Vec<usize> = body.match_indices(self.prefix.as_str()).map(|(i, _)| i).collect();

		for &at in occurrences.iter().rev() {
			let params_start = skip_whitespace(body, at + self.prefix.len());

			if let Some(params_end) = self.scan_params(body, params_start) {
				return Some(TransformCapture {
					name: &body[name_start.min(at)..at],
					params: &body[params_start..params_end],
				});
			}
		}

		None
	}

	fn scan_params(&self, body: &str, params_start: usize) -> Option<usize> {
		let mut position = params_start;

		loop {
			if whitespace_then(body, position, &self.suffix).is_some() {
				return Some(position);
			}

			// A later prefix occurrence supersedes this one.
			if body[position..].starts_with(self.prefix.as_str()) {
				return None;
			}

			match body[position..].chars().next() {
				None | Some('\n' | '\r') => return None,
				Some(c) => position += c.len_utf8(),
			}
		}
	}
}

fn find_from(content: &str, needle: &str, from: usize) -> Option<usize> {
	if from > content.len() {
		return None;
	}
	content[from..].find(needle).map(|i| from + i)
}

fn skip_whitespace(content: &str, mut position: usize) -> usize {
	while let Some(c) = content[position..].chars().next() {
		if !c.is_whitespace() {
			break;
		}
		position += c.len_utf8();
	}
	position
}

/// Check for an optional whitespace run followed by `needle` starting at
/// `position`; returns the offset just past the needle.
fn whitespace_then(content: &str, mut position: usize, needle: &str) -> Option<usize> {
	loop {
		if content[position..].starts_with(needle) {
			return Some(position + needle.len());
		}

		let c = content[position..].chars().next()?;
		if !c.is_whitespace() {
			return None;
		}
		position += c.len_utf8();
	}
}
