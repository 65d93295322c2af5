//! `tokrep_core` is the core library for the tokrep token replacement tool.
//! It finds delimited tokens such as `#{ variable.name }#` in text files and
//! replaces them with values from flattened variable trees.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Variable trees (JSON / YAML / env)
//!   → Flattening (dotted, uppercased keys into a VariableMap)
//! Source specs (glob[;glob] => output)
//!   → Glob resolution (absolute, deduplicated file list)
//!   → Codec (BOM detection, UTF-8 / UTF-16 decoding)
//!   → Engine (token scanning, transforms, escaping, counters)
//!   → Write or copy (BOM emission per options)
//! ```
//!
//! ## Modules
//!
//! - [`config`] — Variable source specifications (`@file`, `$ENV`, inline
//!   JSON) and the optional `tokrep.toml` config file.
//! - [`engine`] — The substitution engine and its [`Counter`].
//! - [`runner`] — File orchestration from source specs to written outputs.
//!
//! ## Key Types
//!
//! - [`VariableMap`] — Flattened, case-insensitive variable lookups.
//! - [`Options`] — Everything controlling a run: token style, missing-value
//!   policy, escaping, transforms, encoding.
//! - [`Reporter`] — Sink for user-facing progress and diagnostics.
//! - [`Counter`] — Totals for tokens, replacements, defaults, transforms and
//!   files.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tokrep_core::NullReporter;
//! use tokrep_core::Options;
//! use tokrep_core::VariableMap;
//! use tokrep_core::runner::replace_in_files;
//!
//! let variables = VariableMap::from_trees(
//! 	[serde_json::json!({ "app": { "name": "demo" } })],
//! 	".",
//! );
//! let options = Options::default();
//! let counters = replace_in_files(
//! 	&["config/*.json".to_string()],
//! 	&variables,
//! 	&options,
//! 	&NullReporter,
//! )?;
//! println!("{} files processed", counters.files);
//! # Ok::<(), tokrep_core::TokrepError>(())
//! ```

pub use codec::*;
pub use engine::*;
pub use error::*;
pub use escape::*;
pub use logger::*;
pub use options::*;
pub use variables::*;

pub mod codec;
pub mod config;
pub mod engine;
mod error;
mod escape;
pub mod glob;
mod logger;
mod options;
pub mod pattern;
pub mod runner;
pub mod sources;
pub mod transforms;
mod variables;
