use std::cell::Cell;
use std::path::Path;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use tokrep_cli::LogLevelArg;
use tokrep_cli::TokrepCli;
use tokrep_core::EscapeKind;
use tokrep_core::EscapeOptions;
use tokrep_core::LogLevel;
use tokrep_core::Options;
use tokrep_core::Reporter;
use tokrep_core::VariableMap;
use tokrep_core::config::TokrepConfig;
use tokrep_core::config::VariableSpecOptions;
use tokrep_core::config::parse_variable_specs;
use tokrep_core::runner::replace_in_files;

fn main() {
	let args = TokrepCli::parse();

	// Respect NO_COLOR, --no-log-color and terminal capabilities.
	let use_color = !args.no_log_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stdout).is_some();

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	if matches!(args.log_level, LogLevelArg::Debug) {
		tracing_subscriber::fmt()
			.with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
			.with_writer(std::io::stderr)
			.with_ansi(use_color)
			.init();
	}

	if let Err(e) = run(&args, use_color) {
		// Render through miette for rich diagnostics with help text and
		// error codes where possible.
		match e.downcast::<tokrep_core::TokrepError>() {
			Ok(tokrep_err) => {
				let report: miette::Report = (*tokrep_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				if use_color {
					eprintln!("{} {e}", "error:".red());
				} else {
					eprintln!("error: {e}");
				}
			}
		}
		process::exit(2);
	}
}

fn run(args: &TokrepCli, use_color: bool) -> Result<(), Box<dyn std::error::Error>> {
	let discovery_root = args
		.root
		.clone()
		.map_or_else(std::env::current_dir, Ok)?;

	let config = match &args.config {
		Some(path) => Some(TokrepConfig::load_file(path)?),
		None => TokrepConfig::load(&discovery_root)?,
	};

	let options = build_options(args, config.as_ref(), &discovery_root)?;
	options.validate()?;

	let sources = if args.sources.is_empty() {
		config.as_ref().map(|c| c.sources.clone()).unwrap_or_default()
	} else {
		args.sources.clone()
	};
	if sources.is_empty() {
		return Err("no sources specified; pass --sources or set sources in tokrep.toml".into());
	}

	let variable_specs = if args.variables.is_empty() {
		config
			.as_ref()
			.map(|c| c.variables.clone())
			.unwrap_or_default()
	} else {
		args.variables.clone()
	};
	if variable_specs.is_empty() {
		return Err(
			"no variables specified; pass --variables or set variables in tokrep.toml".into(),
		);
	}

	let reporter = ConsoleReporter {
		min_level: args.log_level,
		color: use_color,
		depth: Cell::new(0),
	};

	let trees = parse_variable_specs(
		&variable_specs,
		&VariableSpecOptions {
			root: options.root.clone(),
			case_insensitive: options.sources.case_insensitive,
			..VariableSpecOptions::default()
		},
		&reporter,
	)?;
	let variables = VariableMap::from_each(trees, &options.separator);

	let counters = replace_in_files(&sources, &variables, &options, &reporter)?;

	println!("{}", serde_json::to_string(&counters)?);

	Ok(())
}

/// Layer the effective options: library defaults, then the config file,
/// then explicit flags.
fn build_options(
	args: &TokrepCli,
	config: Option<&TokrepConfig>,
	discovery_root: &Path,
) -> Result<Options, Box<dyn std::error::Error>> {
	// The command line defaults to auto escaping; the library does not.
	let mut options = Options {
		escape: EscapeOptions {
			kind: EscapeKind::Auto,
			..EscapeOptions::default()
		},
		root: Some(discovery_root.to_path_buf()),
		..Options::default()
	};

	if let Some(config) = config {
		config.apply(&mut options);
	}

	// Explicit flags always win over the config file.
	if let Some(root) = &args.root {
		options.root = Some(root.clone());
	}
	if let Some(encoding) = &args.encoding {
		options.encoding = encoding.parse()?;
	}
	if let Some(add_bom) = args.add_bom {
		options.add_bom = add_bom;
	}
	if let Some(case_insensitive) = args.case_insensitive_paths {
		options.sources.case_insensitive = case_insensitive;
	}
	if let Some(recursive) = args.recursive {
		options.recursive = recursive;
	}
	if let Some(separator) = &args.separator {
		options.separator = separator.clone();
	}
	if let Some(style) = args.token_pattern {
		options.token.style = style.into();
	}
	if let Some(prefix) = &args.token_prefix {
		options.token.prefix = Some(prefix.clone());
	}
	if let Some(suffix) = &args.token_suffix {
		options.token.suffix = Some(suffix.clone());
	}
	if let Some(action) = args.missing_var_action {
		options.missing.action = action.into();
	}
	if let Some(default_value) = &args.missing_var_default {
		options.missing.default_value = Some(default_value.clone());
	}
	if let Some(log) = args.missing_var_log {
		options.missing.log = log.into();
	}
	if let Some(escape) = args.escape {
		options.escape.kind = escape.into();
	}
	if let Some(chars) = &args.chars_to_escape {
		options.escape.chars = Some(chars.clone());
	}
	if let Some(escape_char) = &args.escape_char {
		options.escape.escape_char = Some(escape_char.clone());
	}
	if let Some(transforms) = args.transforms {
		options.transforms.enabled = transforms;
	}
	if let Some(prefix) = &args.transforms_prefix {
		options.transforms.prefix = prefix.clone();
	}
	if let Some(suffix) = &args.transforms_suffix {
		options.transforms.suffix = suffix.clone();
	}

	Ok(options)
}

/// Console renderer for engine messages: groups indent, severities color,
/// warnings and errors go to stderr.
struct ConsoleReporter {
	min_level: LogLevelArg,
	color: bool,
	depth: Cell<usize>,
}

impl ConsoleReporter {
	fn enabled(&self, level: LogLevel) -> bool {
		let threshold = match self.min_level {
			LogLevelArg::Debug => LogLevel::Debug,
			LogLevelArg::Info => LogLevel::Info,
			LogLevelArg::Warn => LogLevel::Warn,
			LogLevelArg::Error => LogLevel::Error,
			LogLevelArg::Off => return false,
		};
		level >= threshold
	}

	fn indent(&self) -> String {
		"  ".repeat(self.depth.get())
	}
}

impl Reporter for ConsoleReporter {
	fn log(&self, level: LogLevel, message: &str) {
		if !self.enabled(level) {
			return;
		}

		let indent = self.indent();
		match level {
			LogLevel::Debug => {
				if self.color {
					println!("{indent}{}", message.bright_black());
				} else {
					println!("{indent}{message}");
				}
			}
			LogLevel::Info => println!("{indent}{message}"),
			LogLevel::Warn => {
				if self.color {
					eprintln!("{indent}{}", message.yellow());
				} else {
					eprintln!("{indent}{message}");
				}
			}
			LogLevel::Error => {
				if self.color {
					eprintln!("{indent}{}", message.red());
				} else {
					eprintln!("{indent}{message}");
				}
			}
		}
	}

	fn begin_group(&self, title: &str) {
		if self.enabled(LogLevel::Info) {
			let indent = self.indent();
			let title = format!("> {title}");
			if self.color {
				println!("{indent}{}", title.cyan());
			} else {
				println!("{indent}{title}");
			}
		}

		self.depth.set(self.depth.get() + 1);
	}

	fn end_group(&self) {
		self.depth.set(self.depth.get().saturating_sub(1));
	}
}
