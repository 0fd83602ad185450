//! Module that contains all logic for spawning the "ffmpeg" command
use std::{
	path::{
		Path,
		PathBuf,
	},
	process::{
		Command,
		Output,
		Stdio,
	},
	sync::LazyLock,
};

use regex::Regex;

use crate::error::IOErrorToError;

/// Binary name to spawn for ffmpeg when no location is given
pub const FFMPEG_BIN_NAME: &str = "ffmpeg";

/// Create a new ffmpeg [Command], using the given location if set, otherwise [FFMPEG_BIN_NAME] from PATH
#[inline]
#[must_use]
pub fn base_ffmpeg(location: Option<&Path>) -> Command {
	let mut cmd = match location {
		Some(v) => super::multiplatform::spawn_command(v),
		None => super::multiplatform::spawn_command(FFMPEG_BIN_NAME),
	};

	// explicitly disable interactive mode
	cmd.arg("-nostdin");

	return cmd;
}

/// Regex to parse the version from a "ffmpeg -version" output
/// cap1: version
static FFMPEG_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	return Regex::new(r"(?mi)^ffmpeg version ([a-z0-9.-]+) Copyright").unwrap();
});

/// Test if ffmpeg is installed and reachable and return the version found
pub fn require_ffmpeg_installed(location: Option<&Path>) -> Result<String, crate::Error> {
	return match ffmpeg_version(location) {
		Ok(v) => Ok(v),
		Err(err) => {
			log::error!("Could not start or find ffmpeg! Error: {}", err);

			return Err(crate::Error::custom_ioerror_location(
				std::io::ErrorKind::NotFound,
				"FFmpeg Version could not be determined, is it installed and reachable?",
				location.map_or_else(
					|| return format!("{} in PATH", FFMPEG_BIN_NAME),
					|v| return v.to_string_lossy().to_string(),
				),
			));
		},
	};
}

/// Get Version of `ffmpeg`
#[inline]
pub fn ffmpeg_version(location: Option<&Path>) -> Result<String, crate::Error> {
	let mut cmd = base_ffmpeg(location);
	cmd.arg("-version");

	let command_output: Output = cmd
		.stderr(Stdio::null())
		.stdout(Stdio::piped())
		.stdin(Stdio::null())
		.spawn()
		.attach_location_err("ffmpeg spawn")?
		.wait_with_output()
		.attach_location_err("ffmpeg wait_with_output")?;

	if !command_output.status.success() {
		return Err(crate::Error::command_unsuccessful("FFMPEG did not successfully exit!"));
	}

	let as_string = String::from_utf8(command_output.stdout)?;

	return ffmpeg_parse_version(&as_string);
}

/// Internal Function to parse the input to a ffmpeg version with regex
#[inline]
fn ffmpeg_parse_version(input: &str) -> Result<String, crate::Error> {
	return Ok(FFMPEG_VERSION_REGEX
		.captures_iter(input)
		.next()
		.ok_or_else(|| return crate::Error::no_captures("FFMPEG Version could not be determined"))?[1]
		.to_owned());
}

/// Get the path a bundled ffmpeg is expected at, relative to the application base directory
/// Returns [`None`] on platforms without a bundled layout
#[must_use]
pub fn bundled_ffmpeg_path(base_dir: &Path) -> Option<PathBuf> {
	if cfg!(target_os = "windows") {
		return Some(base_dir.join("ffmpeg").join("Windows").join("bin").join("ffmpeg.exe"));
	}
	if cfg!(target_os = "linux") {
		return Some(base_dir.join("ffmpeg").join("Linux").join("ffmpeg"));
	}

	return None;
}

/// Resolve which ffmpeg binary to pass to youtube-dl
///
/// Order:
/// 1. the explicit override, if set (not checked for existence, so that a error is visible)
/// 2. the bundled ffmpeg in "base_dir", if it exists
/// 3. [`None`], youtube-dl will use ffmpeg from PATH
pub fn resolve_ffmpeg_location(explicit: Option<&Path>, base_dir: Option<&Path>) -> Option<PathBuf> {
	if let Some(explicit) = explicit {
		debug!("Using explicit ffmpeg location \"{}\"", explicit.display());
		return Some(explicit.to_owned());
	}

	let bundled = base_dir.and_then(bundled_ffmpeg_path)?;

	if bundled.is_file() {
		debug!("Using bundled ffmpeg at \"{}\"", bundled.display());
		return Some(bundled);
	}

	trace!("No bundled ffmpeg at \"{}\"", bundled.display());

	return None;
}
