#![allow(clippy::needless_return)]
#![warn(clippy::implicit_return)]

#[macro_use]
extern crate log;

use libytpick::{
	Error,
	error::ErrorInner,
	traits::report::Reporter,
};
use std::process::ExitCode;

mod clap_conf;
mod commands;
mod logger;
mod report;
mod state;
mod utils;

use clap_conf::{
	CliDerive,
	SubCommands,
};
use commands::download::DownloadOutcome;
use report::TerminalReporter;

/// Exit code used when the process was terminated by a signal (like Ctrl-C)
const EXIT_TERMINATED: i32 = 130;

/// Main
fn main() -> ExitCode {
	let mut reporter = TerminalReporter::stderr();

	let cli_matches = match CliDerive::custom_parse() {
		Ok(v) => v,
		Err(err) => {
			reporter.error("Parsing arguments", &err);
			return ExitCode::FAILURE;
		},
	};

	colored::control::set_override(cli_matches.enable_colors());

	let mut logger_handle = match logger::setup_logger(cli_matches.log_file.as_deref()) {
		Ok(v) => v,
		Err(err) => {
			reporter.error("Setting up the logger", &err);
			return ExitCode::FAILURE;
		},
	};

	// apply cli "verbosity" argument to the log level
	if let Err(err) = logger::apply_verbosity(&mut logger_handle, cli_matches.verbosity) {
		reporter.error("Setting up the logger", &err);
		return ExitCode::FAILURE;
	}

	info!("CLI Verbosity is {}", cli_matches.verbosity);
	info!("Starting ytpick (Version: {})", env!("YTPICK_VERSION"));

	// there is no cooperative cancellation while a job is running, so just exit
	if let Err(err) = ctrlc::set_handler(|| {
		eprintln!("\nTerminating");
		std::process::exit(EXIT_TERMINATED);
	}) {
		warn!("Could not set termination handler: {err}");
	}

	let (context, result) = run(&cli_matches, &mut reporter);

	return match result {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			reporter.error(context, &err);
			ExitCode::from(exit_code_for(&err))
		},
	};
}

/// Run the selected subcommand, returns the context for errors alongside the result
fn run<R: Reporter>(cli_matches: &CliDerive, reporter: &mut R) -> (&'static str, Result<(), Error>) {
	match cli_matches.subcommand() {
		SubCommands::Download(v) => {
			let result = commands::download::command_download(cli_matches, &v, reporter).map(|outcome| {
				match outcome {
					DownloadOutcome::Completed(path) => debug!("Finished with \"{}\"", path.display()),
					DownloadOutcome::Cancelled => info!("Download was cancelled"),
				}
			});

			return ("Downloading", result);
		},
		SubCommands::Info(v) => return ("Getting information", commands::info::command_info(cli_matches, &v)),
		SubCommands::Completions(v) => {
			return (
				"Generating completions",
				commands::completions::command_completions(cli_matches, &v),
			);
		},
	}
}

/// Get the process exit code for a error
/// A required cookie file is reported differently so that scripts can detect it
fn exit_code_for(err: &Error) -> u8 {
	return match err.inner() {
		ErrorInner::CookieRequired(_) => 2,
		_ => 1,
	};
}
