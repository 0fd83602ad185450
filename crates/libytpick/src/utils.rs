//! Module for utility functions, that may be used in various other modules

use std::path::{
	Path,
	PathBuf,
};

use path_absolutize::Absolutize;

/// Name of the cookie file that is looked for in the application base directory
pub const COOKIE_FILE_NAME: &str = "www.youtube.com_cookies.txt";

/// Simple helper to resolve "~" to the Home directory
/// System agnostic as long as [`dirs::home_dir`] support's it
pub fn expand_tilde<I: AsRef<Path>>(input: I) -> Option<PathBuf> {
	let path = input.as_ref();

	if path == Path::new("~") {
		return dirs::home_dir();
	}
	// dont support "~user" syntax, those are returned as-is
	let Ok(rest) = path.strip_prefix("~") else {
		return Some(path.to_owned());
	};

	return dirs::home_dir().map(|home| {
		// handle case where "home_dir" might be set to the root POSIX directory
		if home == Path::new("/") {
			return Path::new("/").join(rest);
		}

		return home.join(rest);
	});
}

/// Convert input path to a absolute path, without hitting the filesystem.
/// This function handles `~`(home)
///
/// If the start is not absolute, CWD will be used.
///
/// This functions behavior:
/// - `/path/to/inner/../somewhere` -> `/path/to/somewhere`
/// - `relative/to/somewhere` -> `CWD/relative/to/somewhere`
/// - `~/somewhere/in/home` -> `HOME/somewhere/in/home`
pub fn to_absolute<P: AsRef<Path>>(input: P) -> std::io::Result<PathBuf> {
	let Some(converted) = expand_tilde(input) else {
		return Err(std::io::Error::new(
			std::io::ErrorKind::InvalidInput,
			"Could not resolve \"~\"",
		));
	};

	return converted.absolutize().map(|v| return v.to_path_buf());
}

/// Get the directory the running executable is in
/// Bundled files (like ffmpeg and the cookie file) are looked for relative to this
pub fn app_base_dir() -> Option<PathBuf> {
	let exe = match std::env::current_exe() {
		Ok(v) => v,
		Err(err) => {
			warn!("Could not determine current executable path: {err}");
			return None;
		},
	};

	return exe.parent().map(Path::to_path_buf);
}

/// Find the cookie file to use
///
/// An explicit path is always used (even if it does not exist, so that youtube-dl reports the problem),
/// otherwise [`COOKIE_FILE_NAME`] in "base_dir" is used if it exists
pub fn find_cookie_file(explicit: Option<&Path>, base_dir: Option<&Path>) -> Option<PathBuf> {
	if let Some(explicit) = explicit {
		if !explicit.is_file() {
			warn!("Cookie file \"{}\" does not exist", explicit.display());
		}

		return Some(explicit.to_owned());
	}

	let path = base_dir?.join(COOKIE_FILE_NAME);

	if path.is_file() {
		debug!("Found cookie file at \"{}\"", path.display());
		return Some(path);
	}

	return None;
}
