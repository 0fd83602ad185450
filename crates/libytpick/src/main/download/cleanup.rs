//! Module for removing intermediate files youtube-dl may leave behind

use std::{
	ffi::OsStr,
	path::{
		Path,
		PathBuf,
	},
	sync::LazyLock,
};

use regex::Regex;

/// Extensions that are removed when directly following the title, like "Title.webm"
const CANDIDATE_EXTENSIONS: &[&str] = &["webm", "m4a", "mp3", "opus", "part"];
/// Extensions that are removed when the file also has a format-id or is a partial download, like "Title.f137.mp4"
const INTERMEDIATE_EXTENSIONS: &[&str] = &["webm", "m4a", "mp4", "mp3", "opus", "mkv"];

/// Regex to split the part after "Title." into its components
/// cap1: format-id or temp marker (optional), like "f137." or "temp."
/// cap2: extension
/// cap3: partial marker (optional), like ".part"
static INTERMEDIATE_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	return Regex::new(r"^(f\d+(?:-\w+)?\.|temp\.)?(\w+)(\.part|\.ytdl)?$").unwrap();
});

/// Check whether a file name is a intermediate of the output "title.final_extension"
pub fn is_intermediate_name(name: &str, title: &str, final_extension: &str) -> bool {
	let Some(rest) = name.strip_prefix(title).and_then(|v| return v.strip_prefix('.')) else {
		return false;
	};

	if rest == final_extension {
		return false;
	}

	let Some(cap) = INTERMEDIATE_NAME_REGEX.captures(rest) else {
		return false;
	};

	let ext = &cap[2];

	if cap.get(1).is_some() || cap.get(3).is_some() {
		return INTERMEDIATE_EXTENSIONS.contains(&ext);
	}

	return CANDIDATE_EXTENSIONS.contains(&ext);
}

/// Remove all intermediate files of the output "title.final_extension" in "directory"
///
/// Files in "tracked" (paths youtube-dl reported as download destinations) are also removed if they are in "directory".
/// Best-effort: failures are logged and do not stop the cleanup.
/// Returns the paths that were removed.
pub fn cleanup_intermediate_files(directory: &Path, title: &str, final_extension: &str, tracked: &[PathBuf]) -> Vec<PathBuf> {
	let mut removed = Vec::new();
	let final_name = format!("{title}.{final_extension}");

	let tracked_names: Vec<&OsStr> = tracked
		.iter()
		.filter(|v| return v.parent() == Some(directory))
		.filter_map(|v| return v.file_name())
		.collect();

	let entries = match std::fs::read_dir(directory) {
		Ok(v) => v,
		Err(err) => {
			warn!("Could not read directory \"{}\" for cleanup: {err}", directory.display());
			return removed;
		},
	};

	for entry in entries {
		let entry = match entry {
			Ok(v) => v,
			Err(err) => {
				warn!("Could not read directory entry for cleanup: {err}");
				continue;
			},
		};

		if !entry.file_type().is_ok_and(|v| return v.is_file()) {
			continue;
		}

		let file_name = entry.file_name();

		if file_name.as_os_str() == OsStr::new(&final_name) {
			continue;
		}

		let matches = tracked_names.contains(&file_name.as_os_str())
			|| file_name
				.to_str()
				.is_some_and(|v| return is_intermediate_name(v, title, final_extension));

		if !matches {
			continue;
		}

		let path = entry.path();

		match std::fs::remove_file(&path) {
			Ok(()) => {
				debug!("Removed intermediate file \"{}\"", path.display());
				removed.push(path);
			},
			Err(err) => {
				warn!("Could not remove intermediate file \"{}\": {err}", path.display());
			},
		}
	}

	return removed;
}
