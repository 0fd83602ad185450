//! Module for [`Reporter`]

/// How a report should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
	/// Informational, nothing went wrong
	Info,
	/// Something went wrong, but the process can continue
	Warning,
	/// Something went wrong and the process will stop
	Fatal,
}

impl Severity {
	/// Get the [`Severity`] a error should be reported with
	pub fn of_error(error: &crate::Error) -> Self {
		if error.is_fatal() {
			return Self::Fatal;
		}

		return Self::Warning;
	}
}

/// Trait for showing the user reports about errors and results
/// Logging still happens independently through [`log`]
pub trait Reporter {
	/// Report a plain message
	fn message(&mut self, severity: Severity, title: &str, message: &str);
	/// Report a error, with the context in which it happened (like "Downloading")
	fn error(&mut self, context: &str, error: &crate::Error);
}
