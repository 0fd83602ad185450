//! Module for all Logger related things

use colored::{
	Color,
	Colorize,
};
use flexi_logger::{
	AdaptiveFormat,
	DeferredNow,
	Duplicate,
	FileSpec,
	LogSpecification,
	Logger,
	LoggerHandle,
	Record,
	style,
};
use std::path::Path;

/// Log specification used when "RUST_LOG" is not set
const DEFAULT_LOG_SPEC: &str = "warn";

/// Function for setting up the logger
/// Logs always go to stderr, and additionally to "log_file" if given (overwritten on every run)
pub fn setup_logger(log_file: Option<&Path>) -> Result<LoggerHandle, crate::Error> {
	let logger = Logger::try_with_env_or_str(DEFAULT_LOG_SPEC)
		.map_err(|err| return crate::Error::other(format!("Could not parse log specification: {err}")))?
		.adaptive_format_for_stderr(AdaptiveFormat::Custom(log_format, color_log_format));

	let logger = match log_file {
		Some(path) => {
			let spec = FileSpec::try_from(path)
				.map_err(|err| {
					return crate::Error::other(format!(
						"Could not use \"{}\" as log file: {err}",
						path.display()
					));
				})?
				.suppress_timestamp();

			logger
				.log_to_file(spec)
				.format_for_files(log_format)
				.duplicate_to_stderr(Duplicate::All)
		},
		None => logger.log_to_stderr(),
	};

	let handle = logger
		.start()
		.map_err(|err| return crate::Error::other(format!("Could not start logger: {err}")))?;

	return Ok(handle);
}

/// Get the log specification for a "-v" count, [`None`] keeps the current one
pub fn verbosity_spec(verbosity: u8) -> Option<&'static str> {
	return match verbosity {
		0 => None,
		1 => Some("info"),
		2 => Some("debug"),
		_ => Some("trace"),
	};
}

/// Apply the "-v" count to the running logger
pub fn apply_verbosity(handle: &mut LoggerHandle, verbosity: u8) -> Result<(), crate::Error> {
	let Some(spec) = verbosity_spec(verbosity) else {
		return Ok(());
	};

	let spec = LogSpecification::parse(spec)
		.map_err(|err| return crate::Error::other(format!("Could not parse log specification: {err}")))?;
	handle.set_new_spec(spec);

	return Ok(());
}

/// ISO 8601 Time Format for logging
/// format to be "1977-11-30T13:30:30.000+0200"
pub const ISO8601_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Logging format for log files and non-interactive formats
/// Not Colored and not padded
///
/// Example Lines:
/// `[2022-03-02T13:42:43.374+0100 ERROR module]: test line`
/// `[2022-03-02T13:42:43.374+0100 WARN module::deeper]: test line`
pub fn log_format(w: &mut dyn std::io::Write, now: &mut DeferredNow, record: &Record) -> Result<(), std::io::Error> {
	return write!(
		w,
		"[{} {} {}]: {}", // dont pad anything for non-interactive logs
		now.format(ISO8601_TIME_FORMAT),
		record.level(),
		record.module_path().unwrap_or("<unnamed module>"),
		&record.args()
	);
}

/// Logging format for a tty for interactive formats
/// Colored and padded
///
/// Example Lines:
/// `[2022-03-02T13:42:43.374+0100 ERROR module]: test line`
/// `[2022-03-02T13:42:43.374+0100 WARN  module::deeper]: test line`
pub fn color_log_format(
	w: &mut dyn std::io::Write,
	now: &mut DeferredNow,
	record: &Record,
) -> Result<(), std::io::Error> {
	let level = record.level();
	return write!(
		w,
		"[{} {} {}]: {}",
		now.format(ISO8601_TIME_FORMAT).to_string().as_str().color(Color::BrightBlack), // Bright Black = Grey
		style(level).paint(format!("{:5}", level)), // pad level, cannot be done in the string itself, because of the color characters
		record.module_path().unwrap_or("<unnamed module>"),
		&record.args() // dont apply any color to the input, so that the input can dynamically set the color
	);
}
