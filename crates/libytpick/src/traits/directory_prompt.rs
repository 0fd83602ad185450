//! Module for [`DirectoryPrompt`]

use std::path::PathBuf;

/// Trait for asking the user for a output directory, used by [`crate::main::directory::select_directory`]
pub trait DirectoryPrompt {
	/// Ask for a directory
	/// Returning [`None`] (or a empty path) means the user declined
	fn ask_directory(&mut self) -> Result<Option<PathBuf>, crate::Error>;
	/// Show the error of a invalid directory and ask whether to try again
	/// Returning `false` cancels the selection
	fn ask_retry(&mut self, error: &crate::Error) -> Result<bool, crate::Error>;
}
