use std::path::{
	Path,
	PathBuf,
};

use libytpick::{
	chrono::NaiveDate,
	data::{
		job::compile,
		quality::normalize,
	},
	main::{
		download::{
			DownloadProgress,
			FINISHED_STATUS,
			MINIMAL_YTDL_VERSION,
			execute,
		},
		fetch::fetch_info,
	},
	spawn::ytdl::{
		require_ytdl_installed,
		ytdl_parse_version_naivedate,
	},
	traits::options::{
		ExecuteOptions,
		YtdlOptions,
	},
};

struct Options {
	ytdl_version: NaiveDate,
	cookie_file:  Option<PathBuf>,
}

impl YtdlOptions for Options {
	fn ffmpeg_location(&self) -> Option<&Path> {
		return None;
	}

	fn cookie_file(&self) -> Option<&Path> {
		return self.cookie_file.as_deref();
	}
}

impl ExecuteOptions for Options {
	fn extra_ytdl_arguments(&self) -> Vec<&std::ffi::OsStr> {
		return Vec::new();
	}

	fn print_command_log(&self) -> bool {
		return false;
	}

	fn save_command_log(&self) -> bool {
		return false;
	}

	fn ytdl_version(&self) -> NaiveDate {
		return self.ytdl_version;
	}
}

fn progress_callback(event: DownloadProgress) {
	match event {
		DownloadProgress::Starting => println!("Starting"),
		DownloadProgress::Progress(percent, status) => println!("[{percent:>3}%] {status}"),
		DownloadProgress::Processing(description) => println!("{description}"),
		DownloadProgress::Finished => println!("{FINISHED_STATUS}"),
	}
}

fn main() -> Result<(), libytpick::Error> {
	let ytdl_version = require_ytdl_installed(None)?;

	let ytdl_version = ytdl_parse_version_naivedate(&ytdl_version).unwrap_or_else(|_| {
		eprintln!("Could not determine youtube-dl version properly, using default");

		return MINIMAL_YTDL_VERSION;
	});

	let mut args = std::env::args();

	let _ = args.next();

	let url = args.next().expect("Expected a URL as a argument");
	let format = args.next().unwrap_or_else(|| return "audio".to_owned());
	let quality = args.next().unwrap_or_default();

	assert!(!url.is_empty(), "Given URL is empty!");

	let options = Options {
		ytdl_version,
		cookie_file: None,
	};

	let metadata = fetch_info(&url, &options)?;
	let catalog = normalize(&metadata.formats);

	println!("Title: {}", metadata.title_or_fallback());
	println!("Audio qualities: {:?}", catalog.audio_qualities);
	println!("Video resolutions: {:?}", catalog.video_resolutions);

	let output_dir = Path::new("/tmp/download");
	std::fs::create_dir_all(output_dir).expect("Expected output directory to be created");

	let job = compile(format, quality, metadata.title_or_fallback(), &url)?.with_output_directory(output_dir);

	let result = execute(&job, &options, progress_callback)?;

	println!("Finished downloading to \"{}\"", result.output_path.display());

	return Ok(());
}
