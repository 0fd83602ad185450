use std::{
	path::PathBuf,
	sync::LazyLock,
};

use regex::Regex;

/// Prefix of the "--print" line that contains the final file path
pub const MOVE_PREFIX: &str = "MOVE ";

/// Line type for a ytdl output line
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum LineType {
	/// Variant for post-processing lines, like "[Merger]", "[ExtractAudio]" and "[ffmpeg]"
	PostProcess,
	/// Variant for ytdl download progress lines
	Download,
	/// Variant for provider specific lines (like youtube counting website)
	ProviderSpecific,
	/// Variant for generic lines (like "Deleting original file")
	Generic,
	/// Variant for lines that are from "--print"
	Custom,
	/// Variant for lines that start with "ERROR:"
	Error,
	/// Variant for lines that start with "WARNING:"
	Warning,
}

/// Speed and ETA information of a download line
#[derive(Debug, PartialEq, Clone)]
pub struct DownloadStatus {
	/// The percentage as youtube-dl printed it, like "42.1"
	pub percent: String,
	/// The speed, like "1.20MiB/s"
	pub speed:   Option<String>,
	/// The estimated remaining time, like "00:12"
	pub eta:     Option<String>,
}

/// Names of the "[name]" prefixes that are post-processors
const POST_PROCESSOR_NAMES: &[&str] = &[
	"ffmpeg",
	"Merger",
	"ExtractAudio",
	"VideoConvertor",
	"VideoRemuxer",
	"Metadata",
	"EmbedThumbnail",
	"MoveFiles",
];

impl LineType {
	/// Try to get the correct Variant for a input line
	/// Will return [`None`] if no type has been found
	pub fn try_from_line(input: &str) -> Option<Self> {
		/// basic regex to test if the line is "[something] something", and if it is, return what is inside "[]"
		static BASIC_TYPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
			return Regex::new(r"(?mi)^\[([\da-z:_]*)\]").unwrap();
		});
		/// regex to check for generic lines
		static GENERIC_TYPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
			return Regex::new(r"(?mi)^deleting original file").unwrap();
		});

		// check if the line is from a provider-like output
		if let Some(cap) = BASIC_TYPE_REGEX.captures(input) {
			let name = &cap[1];

			// this case is first, because it is the most common case
			if name == "download" {
				return Some(Self::Download);
			}

			if POST_PROCESSOR_NAMES.contains(&name) || name.starts_with("Fixup") {
				return Some(Self::PostProcess);
			}

			// everything that is not specially handled before, will get treated as being a provider
			return Some(Self::ProviderSpecific);
		}

		if input.starts_with(MOVE_PREFIX) {
			return Some(Self::Custom);
		}

		// check for Generic lines that dont have a prefix
		if GENERIC_TYPE_REGEX.is_match(input) {
			return Some(Self::Generic);
		}

		if input.starts_with("ERROR:") {
			return Some(Self::Error);
		}

		if input.starts_with("yt-dlp: error:") || input.starts_with("youtube-dl: error:") {
			return Some(Self::Error);
		}

		if input.starts_with("WARNING:") {
			return Some(Self::Warning);
		}

		// if nothing above matches, return None, because no type has been found
		return None;
	}

	/// Try to get the download precent from input
	/// Returns [`None`] if not being of variant [`LineType::Download`] or if not percentage can be found or could not be parsed
	pub fn try_get_download_percent<I: AsRef<str>>(&self, input: I) -> Option<u8> {
		// this function only works with Download lines
		if self != &Self::Download {
			return None;
		}

		/// Regex to parse the download percentage from a line
		/// cap1: precentage(not decimal)
		static DOWNLOAD_PERCENTAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
			return Regex::new(r"(?mi)^\[download\]\s+(\d{1,3})(?:\.\d)?%").unwrap();
		});

		let input = input.as_ref();

		if let Some(cap) = DOWNLOAD_PERCENTAGE_REGEX.captures(input) {
			let percent_str = &cap[1];

			return percent_str.parse::<u8>().ok().filter(|v| return *v <= 100);
		}

		return None;
	}

	/// Try to get the speed and ETA from a download progress line
	/// Returns [`None`] if not being of variant [`LineType::Download`] or if it is not a progress line
	pub fn try_get_download_status<I: AsRef<str>>(&self, input: I) -> Option<DownloadStatus> {
		if self != &Self::Download {
			return None;
		}

		/// Regex to parse the full progress line
		/// cap1: percentage (with decimals)
		/// cap2: speed (optional)
		/// cap3: eta (optional)
		static DOWNLOAD_STATUS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
			return Regex::new(
				r"(?mi)^\[download\]\s+(\d{1,3}(?:\.\d+)?)%(?:\s+of\s+~?\s*\S+)?(?:\s+at\s+(Unknown B/s|\S+))?(?:\s+ETA\s+(\S+))?",
			)
			.unwrap();
		});

		let cap = DOWNLOAD_STATUS_REGEX.captures(input.as_ref())?;

		// "Unknown" values are not useful to display
		let known = |v: regex::Match<'_>| {
			let v = v.as_str();
			if v.starts_with("Unknown") {
				return None;
			}
			return Some(v.to_owned());
		};

		return Some(DownloadStatus {
			percent: cap[1].to_owned(),
			speed:   cap.get(2).and_then(known),
			eta:     cap.get(3).and_then(known),
		});
	}

	/// Try to get the path of a "[download] Destination: " line, which indicates a new stream starting
	pub fn try_get_destination<I: AsRef<str>>(&self, input: I) -> Option<PathBuf> {
		if self != &Self::Download {
			return None;
		}

		let path = input.as_ref().strip_prefix("[download] Destination: ")?.trim_end();

		if path.is_empty() {
			return None;
		}

		return Some(PathBuf::from(path));
	}

	/// Try to get the final path from the "MOVE" print helper
	/// Returns [`None`] if not being of variant [`LineType::Custom`] or the path is empty
	pub fn try_get_move_path<I: AsRef<str>>(&self, input: I) -> Option<PathBuf> {
		if self != &Self::Custom {
			return None;
		}

		let path = input.as_ref().strip_prefix(MOVE_PREFIX)?.trim_end();

		if path.is_empty() {
			info!("MOVE line from youtube-dl did not have a path!");
			return None;
		}

		return Some(PathBuf::from(path));
	}

	/// Get a human readable description of what a post-processing line is doing
	/// Returns [`None`] if not being of variant [`LineType::PostProcess`]
	pub fn try_get_post_process_description<I: AsRef<str>>(&self, input: I) -> Option<&'static str> {
		if self != &Self::PostProcess {
			return None;
		}

		let input = input.as_ref();

		if input.starts_with("[Merger]") {
			return Some("Merging formats");
		}
		if input.starts_with("[ExtractAudio]") {
			return Some("Extracting audio");
		}
		if input.starts_with("[Fixup") {
			return Some("Fixing up media");
		}

		return Some("Processing");
	}
}
