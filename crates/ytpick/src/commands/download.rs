//! Module for the "download" command, the interactive page flow (URL, format, quality, directory, progress)

use crate::clap_conf::{
	CliDerive,
	CommandDownload,
};
use crate::state::ExecuteState;
use crate::utils;
use indicatif::{
	ProgressBar,
	ProgressStyle,
};
use libytpick::{
	data::{
		job::{
			JobDescriptor,
			TargetKind,
			compile_kind,
		},
		metadata::MediaMetadata,
		quality::{
			QualityCatalog,
			normalize,
		},
	},
	error::{
		CustomThreadJoin,
		ErrorInner,
	},
	main::{
		directory::validate_directory,
		download::{
			DownloadProgress,
			ExecuteResult,
			FINISHED_STATUS,
			spawn_execute,
		},
		fetch::spawn_fetch,
		session::{
			JobSession,
			JobState,
		},
	},
	traits::{
		directory_prompt::DirectoryPrompt,
		report::{
			Reporter,
			Severity,
		},
	},
	utils::COOKIE_FILE_NAME,
};
use std::{
	path::PathBuf,
	sync::LazyLock,
	time::Duration,
};

/// The end result of a "download" command that did not error
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
	/// The media was downloaded to the contained path
	Completed(PathBuf),
	/// The user cancelled before the download started
	Cancelled,
}

/// Size of the Progress bar, used as the upper bound for percents
const PG_PERCENT_100: u64 = 100;

/// Display positions used by the static parts of [`DOWNLOAD_STYLE`] (prefix, elapsed, minimal bar)
const STYLE_STATIC_SIZE: usize = 40;

/// ProgressBar Style for download, will look like `[mp4] [00:00:00] [#>-] CustomMsg`
static DOWNLOAD_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
	return ProgressStyle::default_bar()
		.template("{prefix:.dim} [{elapsed_precise}] {wide_bar:.cyan/blue} {msg}")
		.expect("Expected ProgressStyle template to be valid")
		.progress_chars("#>-");
});

/// ProgressBar Style for waiting on the metadata
static FETCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
	return ProgressStyle::default_spinner()
		.template("{spinner:.cyan} {msg}")
		.expect("Expected ProgressStyle template to be valid");
});

/// Text shown when no cookie file was found
fn cookie_warning_text() -> String {
	return format!(
		"To download some YouTube videos, a cookies file may be required. \
		If you have not already done so, place your YouTube cookies file named \"{COOKIE_FILE_NAME}\" next to this program, or use \"--cookies\"."
	);
}

/// Text explaining how to get a cookie file
fn cookie_tutorial_text() -> String {
	return format!(
		"How to get your YouTube cookies file:\n\
		1. Use a browser extension like \"Get cookies.txt\" to export your YouTube cookies.\n\
		2. Save the file as \"{COOKIE_FILE_NAME}\".\n\
		3. Place this file next to this program, or pass it with \"--cookies\".\n\
		This will allow downloading videos that require login or age verification."
	);
}

/// Handler function for the "download" subcommand
pub fn command_download<R: Reporter>(
	main_args: &CliDerive,
	sub_args: &CommandDownload,
	reporter: &mut R,
) -> Result<DownloadOutcome, crate::Error> {
	let interactive = main_args.is_interactive();
	// a url on the command line means only one attempt is made
	let one_shot = sub_args.url.is_some();

	if !interactive && !one_shot {
		return Err(crate::Error::other("A URL is required when not interactive"));
	}

	let mut state = ExecuteState::new(main_args, &sub_args.extra_ytdl_args);
	state.require_installed()?;

	if state.cookie_missing() {
		info!("No cookies file detected, proceeding without cookies");

		if interactive && !cookie_warning_page(reporter)? {
			return Ok(DownloadOutcome::Cancelled);
		}
	}

	loop {
		let err = match download_once(main_args, sub_args, &state, reporter, interactive) {
			Ok(outcome) => return Ok(outcome),
			Err(err) => err,
		};

		if !matches!(err.inner(), ErrorInner::CookieRequired(_)) {
			return Err(err);
		}

		if one_shot {
			reporter.message(Severity::Info, "Cookies", &cookie_tutorial_text());
			return Err(err);
		}

		// the job is aborted, but another url can be tried
		reporter.error("Downloading", &err);
		reporter.message(Severity::Info, "Cookies", &cookie_tutorial_text());
	}
}

/// Run all pages once, from URL to the finished download
fn download_once<R: Reporter>(
	main_args: &CliDerive,
	sub_args: &CommandDownload,
	state: &ExecuteState,
	reporter: &mut R,
	interactive: bool,
) -> Result<DownloadOutcome, crate::Error> {
	// url page, repeated until the metadata could be fetched
	let (url, metadata) = loop {
		let url = match &sub_args.url {
			Some(url) => {
				if !utils::is_valid_url(url) {
					return Err(crate::Error::other(format!(
						"Please enter a valid YouTube URL, got \"{url}\""
					)));
				}

				url.clone()
			},
			None => {
				let Some(url) = url_page()? else {
					return Ok(DownloadOutcome::Cancelled);
				};

				url
			},
		};

		match fetch_with_spinner(main_args, &url, state) {
			Ok(metadata) => break (url, metadata),
			Err(err) => {
				// only retry if the url was entered on the page
				if sub_args.url.is_some() {
					return Err(err);
				}

				reporter.error("Fetching video information", &err);
			},
		}
	};

	info!("Video title: {}", metadata.title_or_fallback());

	let catalog = normalize(&metadata.formats);
	info!("Available audio qualities: {:?}", catalog.audio_qualities);
	info!("Available video resolutions: {:?}", catalog.video_resolutions);

	// format page
	let kind = match &sub_args.format {
		Some(tag) => tag.parse::<TargetKind>()?,
		None => {
			if !interactive {
				return Err(crate::Error::other("A format is required when not interactive"));
			}

			let Some(kind) = format_page()? else {
				return Ok(DownloadOutcome::Cancelled);
			};

			kind
		},
	};
	info!("Selected format: {}", kind);

	// quality page
	let options = require_options(&catalog, kind)?;
	let quality = match &sub_args.quality {
		Some(quality) => {
			if quality.trim() != "best" && !options.iter().any(|v| return v == quality.trim()) {
				warn!(
					"Quality \"{}\" is not one of the available {:?}, using it as upper bound anyway",
					quality, options
				);
			}

			quality.clone()
		},
		None if interactive => {
			let Some(quality) = quality_page(options)? else {
				return Ok(DownloadOutcome::Cancelled);
			};

			quality
		},
		None => "best".to_owned(),
	};
	info!("Selected quality: {}", quality);

	let title = sub_args
		.title
		.clone()
		.unwrap_or_else(|| return metadata.title_or_fallback().to_owned());

	let job = compile_kind(kind, &quality, &title, &url)?;
	let mut session = JobSession::new(job);

	// directory page
	match &sub_args.output_path {
		Some(path) => {
			let path = validate_directory(path)?;
			session.set_directory(path)?;
		},
		None => {
			if !interactive {
				return Err(crate::Error::other("A output directory is required when not interactive"));
			}

			let mut prompt = StdinDirectoryPrompt {
				reporter: &mut *reporter,
			};
			if session.select_directory(&mut prompt)? == JobState::Cancelled {
				info!("Directory selection was cancelled");
				return Ok(DownloadOutcome::Cancelled);
			}
		},
	}

	// progress page
	let job = session.start()?;
	let result = run_with_progress(main_args, job, state);
	session.finish(&result)?;

	let result = result?;

	if !result.removed_files.is_empty() {
		debug!("Removed intermediate files: {:?}", result.removed_files);
	}

	reporter.message(
		Severity::Info,
		FINISHED_STATUS,
		&format!("Saved to \"{}\"", result.output_path.display()),
	);

	return Ok(DownloadOutcome::Completed(result.output_path));
}

/// Show the cookie warning and ask how to continue
/// Returns `false` if the user wants to quit
fn cookie_warning_page<R: Reporter>(reporter: &mut R) -> Result<bool, crate::Error> {
	reporter.message(Severity::Warning, "YouTube Cookies Recommended", &cookie_warning_text());

	loop {
		let input = utils::get_input("[C]ontinue, show [i]nfo or [q]uit?", &["C", "i", "q"], "c")?;

		match input.as_str() {
			"c" => {
				info!("User chose to continue without cookies");
				return Ok(true);
			},
			"i" => reporter.message(Severity::Info, "Cookies", &cookie_tutorial_text()),
			"q" => {
				info!("User chose to quit at cookies warning");
				return Ok(false);
			},
			_ => unreachable!("get_input should only return a OK value from the possible array"),
		}
	}
}

/// Ask for a URL until a valid one is given
/// Returns [`None`] if STDIN was closed
fn url_page() -> Result<Option<String>, crate::Error> {
	loop {
		let Some(url) = utils::read_line("Enter YouTube URL (e.g., https://www.youtube.com/watch?v=dQw4w9WgXcQ): ")? else {
			return Ok(None);
		};

		if url.is_empty() {
			println!("... URL cannot be empty");
			warn!("User attempted to proceed with empty URL input");
			continue;
		}

		if !utils::is_valid_url(&url) {
			println!("... Please enter a valid YouTube URL");
			warn!("User entered invalid YouTube URL");
			continue;
		}

		return Ok(Some(url));
	}
}

/// Ask for the format
/// Returns [`None`] if the user wants to quit
fn format_page() -> Result<Option<TargetKind>, crate::Error> {
	let input = utils::get_input("Download as [a]udio (mp3), [v]ideo (mp4) or [q]uit?", &["a", "v", "q"], "")?;

	return Ok(match input.as_str() {
		"a" => Some(TargetKind::Audio),
		"v" => Some(TargetKind::Video),
		_ => None,
	});
}

/// Get the catalog options for "kind", a empty catalog cannot be selected from and is a error
fn require_options(catalog: &QualityCatalog, kind: TargetKind) -> Result<&[String], crate::Error> {
	let options = catalog.options_for(kind);

	if options.is_empty() {
		return Err(crate::Error::other(match kind {
			TargetKind::Audio => "No qualities available for this video",
			TargetKind::Video => "No resolutions available for this video",
		}));
	}

	return Ok(options);
}

/// Ask which of the "options" to use
/// Returns [`None`] if STDIN was closed or the user wants to quit
fn quality_page(options: &[String]) -> Result<Option<String>, crate::Error> {
	println!("Available qualities:");
	for (index, option) in options.iter().enumerate() {
		println!("  {}) {}", index + 1, option);
	}
	println!("  b) best");
	println!("  q) quit");

	loop {
		let Some(input) = utils::read_line("Select quality [1]: ")? else {
			return Ok(None);
		};

		match parse_quality_choice(&input, options) {
			QualityChoice::Selected(quality) => return Ok(Some(quality)),
			QualityChoice::Quit => return Ok(None),
			QualityChoice::Invalid => println!("... Invalid Input: \"{}\"", input),
		}
	}
}

/// Result of parsing a answer on the quality page
#[derive(Debug, PartialEq)]
enum QualityChoice {
	/// The quality to use
	Selected(String),
	/// The user wants to quit
	Quit,
	/// The answer could not be used
	Invalid,
}

/// Parse a answer on the quality page, an empty answer selects the first (highest) option
fn parse_quality_choice(input: &str, options: &[String]) -> QualityChoice {
	let input = input.trim().to_lowercase();

	if input.is_empty() {
		return options
			.first()
			.map_or(QualityChoice::Invalid, |v| return QualityChoice::Selected(v.clone()));
	}

	match input.as_str() {
		"b" | "best" => return QualityChoice::Selected("best".to_owned()),
		"q" => return QualityChoice::Quit,
		_ => (),
	}

	if let Ok(index) = input.parse::<usize>() {
		return index
			.checked_sub(1)
			.and_then(|v| return options.get(v))
			.map_or(QualityChoice::Invalid, |v| return QualityChoice::Selected(v.clone()));
	}

	// allow typing the option itself, like "720p"
	if let Some(option) = options.iter().find(|v| return v.to_lowercase() == input) {
		return QualityChoice::Selected(option.clone());
	}

	return QualityChoice::Invalid;
}

/// Fetch the metadata on a worker thread, while showing a spinner
fn fetch_with_spinner(main_args: &CliDerive, url: &str, state: &ExecuteState) -> Result<MediaMetadata, crate::Error> {
	let spinner = ProgressBar::hidden().with_style(FETCH_STYLE.clone());
	utils::set_progressbar(&spinner, main_args);
	spinner.set_message("Fetching video information... Please wait.");
	spinner.enable_steady_tick(Duration::from_millis(100));

	let result = spawn_fetch(url.to_owned(), state.clone()).and_then(|handle| return handle.join_err()?);

	spinner.finish_and_clear();

	return result;
}

/// Run the job on a worker thread and show its progress until it is done
fn run_with_progress(main_args: &CliDerive, job: JobDescriptor, state: &ExecuteState) -> Result<ExecuteResult, crate::Error> {
	let interactive = main_args.is_interactive();

	let pgbar = ProgressBar::hidden().with_style(DOWNLOAD_STYLE.clone());
	pgbar.set_length(PG_PERCENT_100);
	pgbar.set_prefix(format!("[{}]", job.target_kind().final_extension()));
	utils::set_progressbar(&pgbar, main_args);

	let title = job.title().to_owned();
	let (handle, receiver) = spawn_execute(job, state.clone())?;

	// the receiver is disconnected once the worker is done
	for event in receiver {
		apply_progress(&pgbar, event, &title, interactive);
	}

	let result = handle.join_err()?;

	if result.is_err() {
		pgbar.abandon();
	}

	return result;
}

/// Apply a single progress event to the progress bar
fn apply_progress(pgbar: &ProgressBar, event: DownloadProgress, title: &str, interactive: bool) {
	match event {
		DownloadProgress::Starting => {
			pgbar.set_position(0);
			pgbar.set_message(utils::truncate_message_term_width(title, STYLE_STATIC_SIZE));

			if !interactive {
				println!("Starting download of \"{}\"", title);
			}
		},
		DownloadProgress::Progress(percent, status) => {
			pgbar.set_position(u64::from(percent).min(PG_PERCENT_100));

			if !interactive {
				info!("{}", status);
			}

			pgbar.set_message(utils::truncate_message_term_width(&status, STYLE_STATIC_SIZE));
		},
		DownloadProgress::Processing(status) => {
			if !interactive {
				println!("{}", status);
			}

			pgbar.set_message(utils::truncate_message_term_width(&status, STYLE_STATIC_SIZE));
		},
		DownloadProgress::Finished => {
			pgbar.set_position(PG_PERCENT_100);
			pgbar.finish_with_message(FINISHED_STATUS);

			if !interactive {
				println!("{}", FINISHED_STATUS);
			}
		},
	}
}

/// [`DirectoryPrompt`] that asks on STDIN and reports errors through a [`Reporter`]
struct StdinDirectoryPrompt<'a, R: Reporter> {
	reporter: &'a mut R,
}

impl<R: Reporter> DirectoryPrompt for StdinDirectoryPrompt<'_, R> {
	fn ask_directory(&mut self) -> Result<Option<PathBuf>, crate::Error> {
		let input = utils::read_line("Directory to save the download to (empty to cancel): ")?;

		return Ok(input.filter(|v| return !v.is_empty()).map(PathBuf::from));
	}

	fn ask_retry(&mut self, error: &crate::Error) -> Result<bool, crate::Error> {
		self.reporter.error("Selecting the output directory", error);

		let input = utils::get_input("[R]etry or [c]ancel?", &["R", "c"], "r")?;

		return Ok(input == "r");
	}
}
