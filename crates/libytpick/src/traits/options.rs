//! Module for the options traits consumed by [`crate::main::fetch`] and [`crate::main::download`]

use std::{
	ffi::OsStr,
	path::Path,
};

/// Options that apply to every youtube-dl invocation
pub trait YtdlOptions {
	/// Get the ffmpeg binary youtube-dl should use
	/// [`None`] lets youtube-dl find ffmpeg itself
	fn ffmpeg_location(&self) -> Option<&Path>;
	/// Get the cookie file to pass to youtube-dl
	/// [`None`] means no cookies are passed
	fn cookie_file(&self) -> Option<&Path>;
}

/// Options specific for the [`crate::main::download::execute`] function
pub trait ExecuteOptions: YtdlOptions {
	/// Get Extra Arguments that should be added to the ytdl command
	fn extra_ytdl_arguments(&self) -> Vec<&OsStr>;
	/// Get wheter or not to print out Command STDOUT & STDERR (in this case ytdl)
	/// With this returning `true`, the output is printed with [`log::trace`]
	fn print_command_log(&self) -> bool;
	/// Get whether or not to save the Command STDOUT & STDERR to a file next to the output
	fn save_command_log(&self) -> bool;
	/// Get the youtube-dl version that is used, to enable or disable version-gated arguments
	fn ytdl_version(&self) -> chrono::NaiveDate;
}
