use std::ffi::OsString;

use crate::{
	data::job::{
		JobDescriptor,
		PostProcessStep,
	},
	traits::options::ExecuteOptions,
};

use super::parse_linetype::MOVE_PREFIX;

/// Internal Struct for easily adding various types that resolve to [`OsString`] and output a [`Vec<OsString>`]
/// exists because [std::process::Command] is too overkill to use for a argument collection for having to use [duct] later
#[derive(Debug)]
struct ArgsHelper(Vec<OsString>);
impl ArgsHelper {
	/// Create a new instance of ArgsHelper
	pub fn new() -> Self {
		return Self(Vec::default());
	}

	/// Add a new Argument to the list, added at the end and converted to a [`OsString`]
	/// Returns the input reference to "self" for chaining
	pub fn arg<U>(&mut self, arg: U) -> &mut Self
	where
		U: Into<OsString>,
	{
		self.0.push(arg.into());

		return self;
	}

	/// Convert Self to the inner value
	/// Consumes self
	pub fn into_inner(self) -> Vec<OsString> {
		return self.0;
	}
}

impl From<ArgsHelper> for Vec<OsString> {
	fn from(v: ArgsHelper) -> Self {
		return v.into_inner();
	}
}

/// Helper Function to assemble all ytdl command arguments for a [`JobDescriptor`]
/// Returns a list of arguments for youtube-dl in order
///
/// The job has to be bound to a output directory
#[inline]
pub fn assemble_ytdl_command<A: ExecuteOptions>(job: &JobDescriptor, options: &A) -> Result<Vec<OsString>, crate::Error> {
	let mut ytdl_args = ArgsHelper::new();

	let output_dir = job.output_directory();
	if output_dir.as_os_str().is_empty() {
		return Err(crate::Error::other("Job is not bound to a output directory"));
	}
	debug!("YTDL Output dir is \"{}\"", output_dir.to_string_lossy());

	// using unwrap, because it is checked via tests that this statement compiles and is meant to be static
	// 2023.3.24 is the date of the commit that added "--no-quiet"
	if options.ytdl_version() >= chrono::NaiveDate::from_ymd_opt(2023, 3, 24).unwrap() {
		// required to still get "[download] Destination:" lines while using "--print"
		ytdl_args.arg("--no-quiet");
	}

	// set the format that should be downloaded
	ytdl_args.arg("-f").arg(job.stream_filter_expression());

	for step in job.post_process_pipeline() {
		match step {
			PostProcessStep::MergeInto { container } => {
				// set the container separate streams are merged into
				ytdl_args.arg("--merge-output-format").arg(container);
			},
			PostProcessStep::ExtractAudio { codec, bitrate_kbps } => {
				// set ytdl to always extract the audio, if it is not already audio-only
				ytdl_args.arg("-x");
				ytdl_args.arg("--audio-format").arg(codec);

				if let Some(kbps) = bitrate_kbps {
					ytdl_args.arg("--audio-quality").arg(format!("{kbps}K"));
				}
			},
		}
	}

	// only ever download the single media, even if the url also contains a playlist
	ytdl_args.arg("--no-playlist");

	// print the final path after all post-processing has happened
	ytdl_args
		.arg("--print")
		.arg(format!("after_move:{MOVE_PREFIX}%(filepath)s"));

	// ensure ytdl is printing progress reports
	ytdl_args.arg("--progress");
	// ensure ytdl prints the progress reports on a new line
	ytdl_args.arg("--newline");

	// ensure it is not in simulate mode (for example set via extra arguments or implied by "--print")
	ytdl_args.arg("--no-simulate");

	if let Some(ffmpeg_location) = options.ffmpeg_location() {
		ytdl_args.arg("--ffmpeg-location").arg(ffmpeg_location);
	}

	if let Some(cookie_file) = options.cookie_file() {
		ytdl_args.arg("--cookies").arg(cookie_file);
	}

	// set the output path for ytdl
	ytdl_args.arg("-o").arg(job.output_template());

	// apply all extra arguments
	for extra_arg in options.extra_ytdl_arguments() {
		ytdl_args.arg(extra_arg);
	}

	// apply the url to download as the last argument
	ytdl_args.arg(job.source_url());

	return Ok(ytdl_args.into());
}
