//! Byte-level text decoding and encoding.
//!
//! Auto detection sniffs the byte order mark and falls back to UTF-8. The
//! decode is lenient on purpose: files matched by a glob may be binary, and
//! they must still flow through the engine so the orchestrator can copy them
//! untouched when no token is found. The `lossy` flag records whether
//! replacement characters were needed; the orchestrator turns that into an
//! error only for files that do contain tokens.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::TokrepError;
use crate::TokrepResult;

const BOM_UTF8: [u8; 3] = [0xef, 0xbb, 0xbf];
const BOM_UTF16_LE: [u8; 2] = [0xff, 0xfe];
const BOM_UTF16_BE: [u8; 2] = [0xfe, 0xff];

/// A supported text codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Encoding {
	/// Detect per file from the byte order mark, falling back to UTF-8.
	#[default]
	Auto,
	Utf8,
	Utf16Le,
	Utf16Be,
}

impl Encoding {
	/// The canonical name, used in log messages.
	pub fn name(self) -> &'static str {
		match self {
			Self::Auto => "auto",
			Self::Utf8 => "utf-8",
			Self::Utf16Le => "utf-16le",
			Self::Utf16Be => "utf-16be",
		}
	}
}

impl FromStr for Encoding {
	type Err = TokrepError;

	fn from_str(name: &str) -> TokrepResult<Self> {
		match name.to_ascii_lowercase().as_str() {
			"auto" => Ok(Self::Auto),
			// ASCII is a strict subset of UTF-8.
			"utf-8" | "utf8" | "ascii" => Ok(Self::Utf8),
			"utf-16le" | "utf16le" => Ok(Self::Utf16Le),
			"utf-16be" | "utf16be" => Ok(Self::Utf16Be),
			other => Err(TokrepError::UnsupportedEncoding(other.to_string())),
		}
	}
}

impl TryFrom<String> for Encoding {
	type Error = TokrepError;

	fn try_from(name: String) -> TokrepResult<Self> {
		name.parse()
	}
}

/// A decoded file: the concrete codec used, the text (leading BOM
/// stripped), and whether any replacement characters were substituted.
#[derive(Debug, Clone)]
pub struct DecodedText {
	pub encoding: Encoding,
	pub content: String,
	pub lossy: bool,
}

/// Read and decode a file with the requested (or detected) codec.
pub fn read_text_file(path: &Path, encoding: Encoding) -> TokrepResult<DecodedText> {
	let bytes = std::fs::read(path)?;
	Ok(decode(&bytes, encoding))
}

/// Decode raw bytes, resolving [`Encoding::Auto`] by BOM sniffing.
pub fn decode(bytes: &[u8], encoding: Encoding) -> DecodedText {
	let encoding = match encoding {
		Encoding::Auto => detect(bytes),
		concrete => concrete,
	};

	let (content, lossy) = match encoding {
		Encoding::Auto | Encoding::Utf8 => match std::str::from_utf8(bytes) {
			Ok(text) => (text.to_string(), false),
			Err(_) => (String::from_utf8_lossy(bytes).into_owned(), true),
		},
		Encoding::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
		Encoding::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
	};

	DecodedText {
		encoding,
		content: strip_bom(content),
		lossy,
	}
}

/// Encode text with the codec, prepending the BOM when asked.
pub fn encode(content: &str, encoding: Encoding, add_bom: bool) -> Vec<u8> {
	match encoding {
		Encoding::Auto | Encoding::Utf8 => {
			let mut bytes = Vec::with_capacity(content.len() + 3);
			if add_bom {
				bytes.extend_from_slice(&BOM_UTF8);
			}
			bytes.extend_from_slice(content.as_bytes());
			bytes
		}
		Encoding::Utf16Le => encode_utf16(content, add_bom, u16::to_le_bytes),
		Encoding::Utf16Be => encode_utf16(content, add_bom, u16::to_be_bytes),
	}
}

fn detect(bytes: &[u8]) -> Encoding {
	if bytes.starts_with(&BOM_UTF8) {
		Encoding::Utf8
	} else if bytes.starts_with(&BOM_UTF16_LE) {
		Encoding::Utf16Le
	} else if bytes.starts_with(&BOM_UTF16_BE) {
		Encoding::Utf16Be
	} else {
		tracing::debug!("no byte order mark, assuming utf-8");
		Encoding::Utf8
	}
}

fn decode_utf16(bytes: &[u8], read: fn([u8; 2]) -> u16) -> (String, bool) {
	let mut lossy = bytes.len() % 2 != 0;
	let units: Vec<u16> = bytes
		.chunks_exact(2)
		.map(|pair| read([pair[0], pair[1]]))
		.collect();

	let content = match String::from_utf16(&units) {
		Ok(text) => text,
		Err(_) => {
			lossy = true;
			String::from_utf16_lossy(&units)
		}
	};

	(content, lossy)
}

fn encode_utf16(content: &str, add_bom: bool, write: fn(u16) -> [u8; 2]) -> Vec<u8> {
	let mut bytes = Vec::with_capacity(content.len() * 2 + 2);
	if add_bom {
		bytes.extend_from_slice(&write(0xfeff));
	}
	for unit in content.encode_utf16() {
		bytes.extend_from_slice(&write(unit));
	}
	bytes
}

fn strip_bom(mut content: String) -> String {
	if content.starts_with('\u{feff}') {
		// U+FEFF is three bytes in UTF-8.
		content.drain(..3);
	}
	content
}
