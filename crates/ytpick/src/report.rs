//! Module for the terminal implementation of [`Reporter`]

use std::{
	backtrace::BacktraceStatus,
	io::Write,
};

use colored::{
	Color,
	ColoredString,
	Colorize,
};
use libytpick::traits::report::{
	Reporter,
	Severity,
};

/// Color used for warnings, orange
const WARN_COLOR: Color = Color::TrueColor { r: 255, g: 135, b: 0 };

/// [`Reporter`] that writes reports to a [`Write`] (commonly stderr), colors are controlled by [`colored::control`]
pub struct TerminalReporter<W: Write> {
	writer: W,
}

impl TerminalReporter<std::io::Stderr> {
	/// Create a new [`TerminalReporter`] for stderr
	pub fn stderr() -> Self {
		return Self::new(std::io::stderr());
	}
}

impl<W: Write> TerminalReporter<W> {
	/// Create a new [`TerminalReporter`] with a custom writer
	pub fn new(writer: W) -> Self {
		return Self { writer };
	}

	/// Get the writer back
	#[cfg(test)]
	pub fn into_inner(self) -> W {
		return self.writer;
	}

	/// Write a line, failures to write a report are only logged
	fn write_line(&mut self, line: std::fmt::Arguments) {
		if let Err(err) = self.writer.write_fmt(line).and_then(|_| return self.writer.write_all(b"\n")) {
			warn!("Could not write report: {err}");
		}
	}
}

/// Get the colored prefix for a [`Severity`]
fn severity_prefix(severity: Severity) -> ColoredString {
	return match severity {
		Severity::Info => "INFO".color(Color::Green),
		Severity::Warning => "WARN".color(WARN_COLOR),
		Severity::Fatal => "ERROR".color(Color::Red),
	};
}

impl<W: Write> Reporter for TerminalReporter<W> {
	fn message(&mut self, severity: Severity, title: &str, message: &str) {
		self.write_line(format_args!("{} {}: {}", severity_prefix(severity), title.bold(), message));
	}

	fn error(&mut self, context: &str, error: &crate::Error) {
		let severity = Severity::of_error(error);

		match severity {
			Severity::Fatal => error!("{context}: {error}"),
			_ => warn!("{context}: {error}"),
		}

		self.write_line(format_args!(
			"{} {}",
			severity_prefix(severity),
			"An error occurred".bold()
		));
		self.write_line(format_args!("  Kind:    {}", error.kind_name()));
		self.write_line(format_args!("  Message: {}", error));
		self.write_line(format_args!("  Context: {}", context));

		let backtrace = error.get_backtrace();
		if backtrace.status() == BacktraceStatus::Captured {
			self.write_line(format_args!("  Location:\n{}", backtrace));
		} else {
			self.write_line(format_args!(
				"  Location: {}",
				"(set RUST_BACKTRACE=1 to capture)".dimmed()
			));
		}
	}
}
