//! Module that contains all logic for spawning the "ytdl" command
use std::{
	path::Path,
	process::{
		Command,
		Output,
		Stdio,
	},
	sync::LazyLock,
};

use regex::Regex;

use crate::error::IOErrorToError;

use super::ffmpeg::require_ffmpeg_installed;

/// Binary name to spawn for the youtube-dl process
pub const YTDL_BIN_NAME: &str = "yt-dlp";

/// Create a new [YTDL_BIN_NAME] [Command] instance
#[inline]
#[must_use]
pub fn base_ytdl() -> Command {
	return super::multiplatform::spawn_command(YTDL_BIN_NAME);
}

/// Test if ytdl is installed and reachable, including required dependencies like ffmpeg and return the version found.
///
/// This function is not automatically called in the library, it is recommended to run this in any binary trying to run libytpick.
pub fn require_ytdl_installed(ffmpeg_location: Option<&Path>) -> Result<String, crate::Error> {
	require_ffmpeg_installed(ffmpeg_location)?;

	return match ytdl_version() {
		Ok(v) => Ok(v),
		Err(err) => {
			log::error!("Could not start or find youtube-dl! Error: {}", err);

			return Err(crate::Error::custom_ioerror_location(
				std::io::ErrorKind::NotFound,
				"Youtube-DL(p) Version could not be determined, is it installed and reachable?",
				format!("{} in PATH", YTDL_BIN_NAME),
			));
		},
	};
}

/// Regex to parse the version from a "youtube-dl --version" output
/// cap1: version (date)
static YTDL_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	return Regex::new(r"(?mi)^(\d{4}\.\d{1,2}\.\d{1,2})").unwrap();
});

/// Get Version of `youtube-dl`
#[inline]
pub fn ytdl_version() -> Result<String, crate::Error> {
	let mut cmd = base_ytdl();
	cmd.arg("--version");

	let command_output: Output = cmd
		.stderr(Stdio::null())
		.stdout(Stdio::piped())
		.stdin(Stdio::null())
		.spawn()
		.attach_location_err("ytdl spawn")?
		.wait_with_output()
		.attach_location_err("ytdl wait_with_output")?;

	if !command_output.status.success() {
		return Err(crate::Error::command_unsuccessful("YTDL did not successfully exit!"));
	}

	let as_string = String::from_utf8(command_output.stdout)?;

	return ytdl_parse_version(&as_string);
}

/// Internal Function to parse the input to a ytdl version with regex
#[inline]
fn ytdl_parse_version(input: &str) -> Result<String, crate::Error> {
	return Ok(YTDL_VERSION_REGEX
		.captures_iter(input)
		.next()
		.ok_or_else(|| return crate::Error::no_captures("YTDL Version could not be determined"))?[1]
		.to_owned());
}

/// Try to parse a given `input`, which is a youtube-dl(p) version, as a [NaiveDate](chrono::NaiveDate).
pub fn ytdl_parse_version_naivedate(input: &str) -> Result<chrono::NaiveDate, crate::Error> {
	let version = ytdl_parse_version(input)?;

	let date = chrono::NaiveDate::parse_from_str(&version, "%Y.%m.%d").map_err(|err| {
		return crate::Error::other(format!("Could not parse \"{version}\" as a date: {err}"));
	})?;

	return Ok(date);
}

/// Regex to detect youtube-dl error lines that mean that cookies (a logged-in session) are required
static COOKIE_REQUIRED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	return Regex::new(
		r"(?i)sign in to confirm|--cookies|cookies for the authentication|login required|requires authentication|use cookies",
	)
	.unwrap();
});

/// Map a youtube-dl error line (like "ERROR: ...") to the matching [crate::Error]
///
/// Lines that indicate a missing login become [crate::error::ErrorInner::CookieRequired],
/// everything else becomes [crate::error::ErrorInner::DownloadError]
pub fn classify_error_line<L: AsRef<str>>(line: L) -> crate::Error {
	let line = line.as_ref().trim();

	if COOKIE_REQUIRED_REGEX.is_match(line) {
		return crate::Error::cookie_required(line);
	}

	return crate::Error::download_error(line);
}
