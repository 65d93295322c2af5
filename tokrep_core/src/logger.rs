//! Reporting interface threaded through the engine.
//!
//! The engine decides *whether* and *at what severity* to log; rendering is
//! left to the injected [`Reporter`]. The library never writes to stdout or
//! stderr on its own.

/// Severity of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
	Debug,
	Info,
	Warn,
	Error,
}

/// Receiver for engine log messages and scoped groups.
///
/// Groups nest: every `begin_group` is balanced by an `end_group`. The
/// runner opens one group per processed file and one for variable loading;
/// implementations may render them as indentation or ignore them entirely.
pub trait Reporter {
	/// Report a message at the given severity.
	fn log(&self, level: LogLevel, message: &str);

	/// Open a named scope. Default implementation logs the title at info.
	fn begin_group(&self, title: &str) {
		self.log(LogLevel::Info, title);
	}

	/// Close the innermost scope.
	fn end_group(&self) {}

	fn debug(&self, message: &str) {
		self.log(LogLevel::Debug, message);
	}

	fn info(&self, message: &str) {
		self.log(LogLevel::Info, message);
	}

	fn warn(&self, message: &str) {
		self.log(LogLevel::Warn, message);
	}

	fn error(&self, message: &str) {
		self.log(LogLevel::Error, message);
	}
}

/// A [`Reporter`] that discards everything. Useful for library callers that
/// only want the counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
	fn log(&self, _level: LogLevel, _message: &str) {}

	fn begin_group(&self, _title: &str) {}
}
