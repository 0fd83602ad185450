//! Module for selecting and validating the output directory

use std::path::{
	Path,
	PathBuf,
};

use crate::{
	error::IOErrorToError,
	traits::directory_prompt::DirectoryPrompt,
	utils::to_absolute,
};

/// The result of [`select_directory`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectorySelection {
	/// A valid directory was selected, always absolute
	Selected(PathBuf),
	/// The user declined to select a directory
	Cancelled,
}

/// Ask the prompt for a directory until a valid one is given or the user cancels
///
/// Invalid directories are shown to the prompt with [`DirectoryPrompt::ask_retry`]
pub fn select_directory<P: DirectoryPrompt>(prompt: &mut P) -> Result<DirectorySelection, crate::Error> {
	loop {
		let Some(answer) = prompt.ask_directory()? else {
			debug!("Directory selection declined");
			return Ok(DirectorySelection::Cancelled);
		};

		if answer.as_os_str().is_empty() {
			debug!("Directory selection was empty");
			return Ok(DirectorySelection::Cancelled);
		}

		match validate_directory(&answer) {
			Ok(path) => return Ok(DirectorySelection::Selected(path)),
			Err(err) => {
				info!("Selected directory is invalid: {err}");

				if !prompt.ask_retry(&err)? {
					return Ok(DirectorySelection::Cancelled);
				}
			},
		}
	}
}

/// Check that a path is a existing and writable directory, returns the absolute path
///
/// Fails with [`crate::error::ErrorInner::DirectorySelection`] if the path is not usable
pub fn validate_directory(path: &Path) -> Result<PathBuf, crate::Error> {
	let absolute = to_absolute(path).attach_path_err(path)?;

	let metadata = match std::fs::metadata(&absolute) {
		Ok(v) => v,
		Err(err) => {
			if err.kind() == std::io::ErrorKind::PermissionDenied {
				return Err(crate::Error::directory_selection("Invalid path! PermissionError!", &absolute));
			}

			return Err(crate::Error::directory_selection("Invalid path! Does not exist!", &absolute));
		},
	};

	if !metadata.is_dir() {
		return Err(crate::Error::directory_selection("Invalid path! Not a directory!", &absolute));
	}

	if !is_writable(&absolute) {
		return Err(crate::Error::directory_selection("Invalid path! PermissionError!", &absolute));
	}

	return Ok(absolute);
}

/// Check if a directory is writable by trying to create a temporary file in it
fn is_writable(directory: &Path) -> bool {
	let probe = directory.join(format!(".ytpick-write-test-{}", std::process::id()));

	return match std::fs::OpenOptions::new().write(true).create_new(true).open(&probe) {
		Ok(file) => {
			drop(file);
			if let Err(err) = std::fs::remove_file(&probe) {
				warn!("Could not remove write test file \"{}\": {err}", probe.display());
			}
			true
		},
		Err(err) => {
			debug!("Directory \"{}\" is not writable: {err}", directory.display());
			false
		},
	};
}
