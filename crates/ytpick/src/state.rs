//! Module for State Struct for all commands

use std::{
	ffi::{
		OsStr,
		OsString,
	},
	path::{
		Path,
		PathBuf,
	},
};

use libytpick::{
	chrono,
	main::download::MINIMAL_YTDL_VERSION,
	spawn::{
		ffmpeg::resolve_ffmpeg_location,
		ytdl::{
			require_ytdl_installed,
			ytdl_parse_version_naivedate,
		},
	},
	traits::options::{
		ExecuteOptions,
		YtdlOptions,
	},
	utils::{
		app_base_dir,
		find_cookie_file,
	},
};

use crate::clap_conf::CliDerive;

/// Struct to keep configuration data for the [`YtdlOptions`] and [`ExecuteOptions`] traits
///
/// This data does not change for the whole run
#[derive(Debug, PartialEq, Clone)]
pub struct ExecuteState {
	/// The ffmpeg binary to use, if any was found
	ffmpeg_location:         Option<PathBuf>,
	/// The cookie file to use, if any was found
	cookie_file:             Option<PathBuf>,
	/// Extra arguments to pass to ytdl
	extra_command_arguments: Vec<OsString>,
	/// Print youtube-dl stdout as trace logs
	print_command_log:       bool,
	/// Save youtube-dl logs to a file
	save_command_log:        bool,

	/// Stores the youtube-dl version in use
	ytdl_version: chrono::NaiveDate,
}

impl ExecuteState {
	/// Create a new instance of [`ExecuteState`], resolving ffmpeg and the cookie file
	pub fn new(main_args: &CliDerive, extra_ytdl_args: &[String]) -> Self {
		let base_dir = app_base_dir();

		return Self::with_base_dir(main_args, extra_ytdl_args, base_dir.as_deref());
	}

	/// Create a new instance of [`ExecuteState`] with a explicit base directory to look for bundled files in
	fn with_base_dir(main_args: &CliDerive, extra_ytdl_args: &[String], base_dir: Option<&Path>) -> Self {
		// process extra arguments into separated arguments of key and value (split once)
		let extra_command_arguments = extra_ytdl_args
			.iter()
			.flat_map(|v| {
				if let Some((split1, split2)) = v.split_once(' ') {
					return Vec::from([OsString::from(split1), OsString::from(split2)]);
				}
				return Vec::from([OsString::from(v)]);
			})
			.collect();

		return Self {
			ffmpeg_location: resolve_ffmpeg_location(main_args.ffmpeg_location.as_deref(), base_dir),
			cookie_file: find_cookie_file(main_args.cookie_file.as_deref(), base_dir),
			extra_command_arguments,
			print_command_log: main_args.print_ytdl_stdout,
			save_command_log: main_args.save_ytdl_log,
			ytdl_version: MINIMAL_YTDL_VERSION,
		};
	}

	/// Check that youtube-dl and ffmpeg are available and store the youtube-dl version
	pub fn require_installed(&mut self) -> Result<(), crate::Error> {
		let version = require_ytdl_installed(self.ffmpeg_location.as_deref())?;
		self.set_ytdl_version(&version);

		return Ok(());
	}

	/// Parse and store the youtube-dl version, falls back to [`MINIMAL_YTDL_VERSION`] if not parseable
	/// Versions lower than the minimal are warned about once a job is executed
	fn set_ytdl_version(&mut self, version: &str) {
		self.ytdl_version = ytdl_parse_version_naivedate(version).unwrap_or_else(|err| {
			warn!("Could not determine youtube-dl version properly, using default: {err}");

			return MINIMAL_YTDL_VERSION;
		});
	}

	/// Get whether no cookie file will be used
	pub fn cookie_missing(&self) -> bool {
		return self.cookie_file.is_none();
	}
}

impl YtdlOptions for ExecuteState {
	fn ffmpeg_location(&self) -> Option<&Path> {
		return self.ffmpeg_location.as_deref();
	}

	fn cookie_file(&self) -> Option<&Path> {
		return self.cookie_file.as_deref();
	}
}

impl ExecuteOptions for ExecuteState {
	fn extra_ytdl_arguments(&self) -> Vec<&OsStr> {
		return self
			.extra_command_arguments
			.iter()
			.map(|v| return v.as_os_str())
			.collect();
	}

	fn print_command_log(&self) -> bool {
		return self.print_command_log;
	}

	fn save_command_log(&self) -> bool {
		return self.save_command_log;
	}

	fn ytdl_version(&self) -> chrono::NaiveDate {
		return self.ytdl_version;
	}
}
