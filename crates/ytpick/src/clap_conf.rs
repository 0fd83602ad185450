//! Module for Clap related structs (derived)

#![deny(missing_docs)] // comments are used for "--help" generation, so it should always be defined

use clap::{
	ArgAction,
	Parser,
	Subcommand,
};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Trait to check and transform all Command Structures
trait Check {
	/// Check and transform self to be correct
	fn check(&mut self) -> Result<(), crate::Error>;
}

/// Highest verbosity that has a effect
const MAX_VERBOSITY: u8 = 3;

#[derive(Debug, Parser, Clone, PartialEq)]
#[command(author, version = env!("YTPICK_VERSION"), about, long_about = None)]
#[command(bin_name("ytpick"))]
#[command(args_override_self(true))] // specifying a argument multiple times overwrites the earlier ones
#[command(disable_help_subcommand(true))] // Disable subcommand "help", only "-h --help" should be used
#[command(subcommand_negates_reqs(true))]
pub struct CliDerive {
	/// Set Logging verbosity (0 - Default - WARN, 1 - INFO, 2 - DEBUG, 3 - TRACE)
	#[arg(short, long, action = ArgAction::Count)]
	pub verbosity:         u8,
	/// Explicitly set interactive / not interactive
	#[arg(long = "interactive", env = "YTPICK_INTERACTIVE")]
	pub explicit_tty:      Option<bool>,
	/// Force Color to be active in any mode
	#[arg(long = "color")]
	pub force_color:       bool,
	/// Additionally write all logs to this file, the file is overwritten on every run
	#[arg(long = "log-file", env = "YTPICK_LOG_FILE")]
	pub log_file:          Option<PathBuf>,
	/// Path to the ffmpeg binary to use, by default the bundled one next to the binary is used if available
	#[arg(long = "ffmpeg-location", env = "YTPICK_FFMPEG")]
	pub ffmpeg_location:   Option<PathBuf>,
	/// Path to a cookie file to use, by default "www.youtube.com_cookies.txt" next to the binary is used if it exists
	#[arg(long = "cookies", env = "YTPICK_COOKIES")]
	pub cookie_file:       Option<PathBuf>,
	/// Print yt-dlp stdout
	/// This will still require logging verbosity set to 3 or "RUST_LOG=trace"
	#[arg(long = "ytdl-stdout")]
	pub print_ytdl_stdout: bool,
	/// Save the yt-dlp output to a log file in the output directory
	#[arg(long = "save-ytdl-log")]
	pub save_ytdl_log:     bool,

	#[command(subcommand)]
	pub subcommands: Option<SubCommands>,
}

impl CliDerive {
	/// Execute clap::Parser::parse and apply custom validation and transformation logic
	pub fn custom_parse() -> Result<Self, crate::Error> {
		let mut parsed = Self::parse();

		Check::check(&mut parsed)?;

		return Ok(parsed);
	}

	/// Get if the mode is interactive or not
	#[must_use]
	pub fn is_interactive(&self) -> bool {
		if let Some(explicit) = self.explicit_tty {
			return explicit;
		}

		return std::io::stdout().is_terminal() && std::io::stdin().is_terminal();
	}

	/// Get if the colors are enabled or not
	#[must_use]
	pub fn enable_colors(&self) -> bool {
		return self.force_color | self.is_interactive();
	}

	/// Get the subcommand to run, "download" is the default when none is given
	#[must_use]
	pub fn subcommand(&self) -> SubCommands {
		return self
			.subcommands
			.clone()
			.unwrap_or_else(|| return SubCommands::Download(CommandDownload::default()));
	}
}

impl Check for CliDerive {
	fn check(&mut self) -> Result<(), crate::Error> {
		if self.verbosity > MAX_VERBOSITY {
			return Err(crate::Error::other(format!(
				"Expected verbosity integer range between 0 and {MAX_VERBOSITY} (inclusive)"
			)));
		}

		expand_optional_path(&mut self.log_file);
		expand_optional_path(&mut self.ffmpeg_location);
		expand_optional_path(&mut self.cookie_file);

		if let Some(subcommands) = &mut self.subcommands {
			return Check::check(subcommands);
		}

		return Ok(());
	}
}

/// Expand a leading "~" of a optional path in-place
fn expand_optional_path(path: &mut Option<PathBuf>) {
	if let Some(expanded) = path.as_ref().and_then(libytpick::utils::expand_tilde) {
		*path = Some(expanded);
	}
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum SubCommands {
	/// The main purpose of the binary, pick a format and quality and download a URL (default)
	Download(CommandDownload),
	/// Print the title and the available qualities of a URL
	Info(CommandInfo),
	/// Generate shell completions
	Completions(CommandCompletions),
}

impl Check for SubCommands {
	fn check(&mut self) -> Result<(), crate::Error> {
		match self {
			SubCommands::Download(v) => return Check::check(v),
			SubCommands::Info(v) => return Check::check(v),
			SubCommands::Completions(v) => return Check::check(v),
		}
	}
}

/// Download a single URL, everything not given as a argument is asked for when interactive
#[derive(Debug, Parser, Clone, PartialEq, Default)]
pub struct CommandDownload {
	/// The format to download, one of "audio" ("mp3") or "video" ("mp4")
	#[arg(short = 'f', long = "format")]
	pub format:          Option<String>,
	/// The quality to download, like "720p", "128kbps" or "best"
	#[arg(short = 'q', long = "quality")]
	pub quality:         Option<String>,
	/// The directory to save the final file to
	#[arg(short = 'o', long = "output", env = "YTPICK_OUT")]
	pub output_path:     Option<PathBuf>,
	/// Override the title used for the file name
	#[arg(long = "title")]
	pub title:           Option<String>,
	/// Extra arguments to pass to yt-dlp, a argument and its value can be given as one separated by a space
	#[arg(long = "extra-ytdl-arg")]
	pub extra_ytdl_args: Vec<String>,

	/// The URL to download
	pub url: Option<String>,
}

impl Check for CommandDownload {
	fn check(&mut self) -> Result<(), crate::Error> {
		expand_optional_path(&mut self.output_path);

		if let Some(url) = &self.url {
			self.url = Some(url.trim().to_owned());
		}

		return Ok(());
	}
}

/// Print information about a URL
#[derive(Debug, Parser, Clone, PartialEq)]
pub struct CommandInfo {
	/// The URL to get the information of
	pub url: String,
}

impl Check for CommandInfo {
	fn check(&mut self) -> Result<(), crate::Error> {
		self.url = self.url.trim().to_owned();

		return Ok(());
	}
}

/// Generate shell completions for the given shell
#[derive(Debug, Parser, Clone, PartialEq)]
pub struct CommandCompletions {
	/// The shell to generate the completions for
	#[arg(value_enum)]
	pub shell:            clap_complete::Shell,
	/// Write the completions to this file instead of stdout
	#[arg(short = 'o', long = "output")]
	pub output_file_path: Option<PathBuf>,
}

impl Check for CommandCompletions {
	fn check(&mut self) -> Result<(), crate::Error> {
		expand_optional_path(&mut self.output_file_path);

		return Ok(());
	}
}

#[cfg(test)]
mod test {
	use super::*;

	/// Create a [`CliDerive`] with defaults and the given subcommand
	fn cli_with(explicit_tty: Option<bool>, subcommands: Option<SubCommands>) -> CliDerive {
		return CliDerive {
			verbosity: 0,
			explicit_tty,
			force_color: false,
			log_file: None,
			ffmpeg_location: None,
			cookie_file: None,
			print_ytdl_stdout: false,
			save_ytdl_log: false,
			subcommands,
		};
	}

	mod command_download {
		use super::*;

		#[test]
		fn test_check() {
			let init_default = CommandDownload::default();

			let mut cloned = init_default.clone();
			assert!(cloned.check().is_ok());
			assert_eq!(init_default, cloned);
		}

		#[test]
		fn test_check_trims_url() {
			let mut download = CommandDownload {
				url: Some("  https://www.youtube.com/watch?v=dQw4w9WgXcQ \n".to_owned()),
				..Default::default()
			};

			assert!(download.check().is_ok());
			assert_eq!(
				Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_owned()),
				download.url
			);
		}

		#[test]
		fn test_check_expands_output() {
			let Some(home) = dirs::home_dir() else {
				return;
			};

			let mut download = CommandDownload {
				output_path: Some(PathBuf::from("~/Music")),
				..Default::default()
			};

			assert!(download.check().is_ok());
			assert_eq!(Some(home.join("Music")), download.output_path);
		}
	}

	mod command_info {
		use super::*;

		#[test]
		fn test_check() {
			let mut info = CommandInfo {
				url: " https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_owned(),
			};

			assert!(info.check().is_ok());
			assert_eq!("https://www.youtube.com/watch?v=dQw4w9WgXcQ", info.url);
		}
	}

	mod cli_derive {
		use super::*;

		#[test]
		fn test_check() {
			let init_default = cli_with(None, Some(SubCommands::Download(CommandDownload::default())));

			let mut cloned = init_default.clone();
			assert!(cloned.check().is_ok());
			assert_eq!(init_default, cloned);
		}

		#[test]
		fn test_check_verbosity_too_high() {
			let mut cli = cli_with(None, None);
			cli.verbosity = 4;

			assert!(cli.check().is_err());
		}

		#[test]
		fn test_is_interactive_explicit() {
			assert!(!cli_with(Some(false), None).is_interactive());
			assert!(cli_with(Some(true), None).is_interactive());
		}

		#[test]
		fn test_enable_colors() {
			assert!(!cli_with(Some(false), None).enable_colors());
			assert!(cli_with(Some(true), None).enable_colors());

			let mut forced = cli_with(Some(false), None);
			forced.force_color = true;
			assert!(forced.enable_colors());
		}

		#[test]
		fn test_default_subcommand() {
			assert_eq!(
				SubCommands::Download(CommandDownload::default()),
				cli_with(None, None).subcommand()
			);

			let info = SubCommands::Info(CommandInfo {
				url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_owned(),
			});
			assert_eq!(info, cli_with(None, Some(info.clone())).subcommand());
		}

		#[test]
		fn test_parse_arguments() {
			let parsed = CliDerive::try_parse_from([
				"ytpick",
				"-vv",
				"--interactive",
				"false",
				"download",
				"-f",
				"video",
				"-q",
				"720p",
				"-o",
				"/tmp/out",
				"https://www.youtube.com/watch?v=dQw4w9WgXcQ",
			])
			.expect("Expected arguments to parse");

			assert_eq!(2, parsed.verbosity);
			assert_eq!(Some(false), parsed.explicit_tty);
			assert_eq!(
				Some(SubCommands::Download(CommandDownload {
					format:          Some("video".to_owned()),
					quality:         Some("720p".to_owned()),
					output_path:     Some(PathBuf::from("/tmp/out")),
					title:           None,
					extra_ytdl_args: Vec::new(),
					url:             Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_owned()),
				})),
				parsed.subcommands
			);
		}

		#[test]
		fn test_clap_debug_assert() {
			use clap::CommandFactory;

			CliDerive::command().debug_assert();
		}
	}
}
