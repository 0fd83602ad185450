//! Module for executing a [`JobDescriptor`] with youtube-dl

use assemble_cmd::assemble_ytdl_command;
use chrono::NaiveDate;
use parse_linetype::LineType;
use std::{
	ffi::OsStr,
	fs::OpenOptions,
	io::{
		BufRead,
		BufReader,
		BufWriter,
		Write,
	},
	path::PathBuf,
	sync::mpsc::{
		Receiver,
		channel,
	},
	thread::JoinHandle,
	time::Duration,
};

use crate::{
	data::job::JobDescriptor,
	error::IOErrorToError,
	spawn::ytdl::{
		YTDL_BIN_NAME,
		classify_error_line,
	},
	traits::options::ExecuteOptions,
};

pub use cleanup::{
	cleanup_intermediate_files,
	is_intermediate_name,
};
pub use parse_linetype::DownloadStatus;

mod assemble_cmd;
mod cleanup;
mod parse_linetype;

/// The minimal youtube-dl(p) version that is expected to be used.
///
/// Newer versions can be used to likely unlock extra functionality, but ytpick is build around this as the minimal in mind.
pub const MINIMAL_YTDL_VERSION: chrono::NaiveDate = chrono::NaiveDate::from_ymd_opt(2023, 3, 24).unwrap();

/// Name of the thread spawned by [`spawn_execute`]
pub const EXECUTE_THREAD_NAME: &str = "ytpick execute";

/// Status text of [`DownloadProgress::Finished`]
pub const FINISHED_STATUS: &str = "Download complete!";

/// Enum for hooks to know what is currently happening
/// Always starts with [`DownloadProgress::Starting`], [`DownloadProgress::Finished`] is only sent on success
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadProgress {
	/// Variant representing that youtube-dl has been started
	Starting,
	/// Variant representing that the download has increased in progress
	/// The percentage is for the whole job (never decreases), the status is a human readable line about the current stream
	/// values: (percent, status)
	Progress(u8, String),
	/// Variant representing that youtube-dl is post-processing (merging or extracting)
	/// values: (description)
	Processing(String),
	/// Variant representing that the job has finished successfully
	Finished,
}

impl DownloadProgress {
	/// Get the overall percentage this event represents, if any
	pub fn percent(&self) -> Option<u8> {
		return match self {
			Self::Starting => Some(0),
			Self::Progress(percent, _) => Some(*percent),
			Self::Processing(_) => None,
			Self::Finished => Some(100),
		};
	}

	/// Get the human readable status of this event
	pub fn status(&self) -> &str {
		return match self {
			Self::Starting => "Starting download",
			Self::Progress(_, status) | Self::Processing(status) => status,
			Self::Finished => FINISHED_STATUS,
		};
	}
}

/// The result of a successful [`execute`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteResult {
	/// Path to the final file
	pub output_path:   PathBuf,
	/// Intermediate files that have been removed
	pub removed_files: Vec<PathBuf>,
}

/// Warn if a version lower than the minimal is used
fn warn_minimal_version(ytdl_version: NaiveDate) {
	if ytdl_version < MINIMAL_YTDL_VERSION {
		warn!(
			"Used {} version ({}) is lower than the recommended minimal {}",
			YTDL_BIN_NAME,
			ytdl_version.format("%Y.%m.%d"),
			MINIMAL_YTDL_VERSION.format("%Y.%m.%d"),
		);
	}
}

/// Execute a single job, the job has to be bound to a output directory
/// Assumes ytdl and ffmpeg have already been checked to exist and work (like using [`crate::spawn::ytdl::require_ytdl_installed`])
///
/// If the job requires cleanup, the cleanup is done regardless of whether the download succeeded
pub fn execute<A: ExecuteOptions, C: FnMut(DownloadProgress)>(
	job: &JobDescriptor,
	options: &A,
	pgcb: C,
) -> Result<ExecuteResult, crate::Error> {
	return execute_program(OsStr::new(YTDL_BIN_NAME), job, options, pgcb);
}

/// Same as [`execute`], but with a custom program to run instead of [`YTDL_BIN_NAME`]
fn execute_program<A: ExecuteOptions, C: FnMut(DownloadProgress)>(
	program: &OsStr,
	job: &JobDescriptor,
	options: &A,
	mut pgcb: C,
) -> Result<ExecuteResult, crate::Error> {
	warn_minimal_version(options.ytdl_version());

	let args = assemble_ytdl_command(job, options)?;

	let output_dir = job.output_directory();
	std::fs::create_dir_all(output_dir).attach_path_err(output_dir)?;

	let ytdl_child = {
		trace!("Running youtube-dl with args: {:?}", args);

		// merge stderr into stdout, the exit status is checked manually after the output has been handled
		duct::cmd(program, args)
			.stderr_to_stdout()
			.unchecked()
			.reader()
			.attach_location_err("duct ytdl reader")?
	};

	let stdout_reader = BufReader::new(&ytdl_child);

	let handled = handle_stdout(job, options, &mut pgcb, stdout_reader);

	// nothing reads the output anymore, so youtube-dl would block on a full pipe
	if let Err(err) = &handled {
		warn!("Stopping youtube-dl, because its output could not be handled: {err}");

		if let Err(err) = ytdl_child.kill() {
			warn!("Could not kill youtube-dl: {err}");
		}
	}

	let mut exit_success = None;
	loop {
		// wait loop, because somehow a "ReaderHandle" does not implement "wait", only "try_wait", but have to wait for it to exit here
		match ytdl_child.try_wait() {
			Ok(Some(output)) => {
				exit_success = Some(output.status.success());
				if !output.status.success() {
					warn!("youtube-dl exited with a non-0 code: {}", output.status);
				}
				break;
			},
			Ok(None) => (),
			Err(err) => {
				warn!("Waiting for youtube-dl failed: {err}");
				break;
			},
		}

		std::thread::sleep(Duration::from_millis(100)); // sleep to same some time between the next wait (to not cause constant cpu spike)
	}

	let removed_files = if job.cleanup_required() {
		let tracked = handled.as_ref().map(|v| return v.destinations.as_slice()).unwrap_or_default();

		cleanup_intermediate_files(
			output_dir,
			job.title(),
			job.target_kind().final_extension(),
			tracked,
		)
	} else {
		Vec::new()
	};

	let handled = handled?;

	if let Some(last_error) = handled.last_error {
		if exit_success != Some(true) {
			return Err(last_error);
		}

		// the process still succeeded, so the error was not fatal
		info!("youtube-dl reported a error, but exited successfully: {last_error}");
	}

	if exit_success == Some(false) {
		return Err(crate::Error::download_error(
			"youtube-dl exited unsuccessfully without a error message",
		));
	}

	let output_path = handled.final_path.unwrap_or_else(|| {
		let expected = job.expected_output_path();
		debug!("No MOVE line found, assuming output at \"{}\"", expected.display());
		return expected;
	});

	pgcb(DownloadProgress::Finished);

	return Ok(ExecuteResult {
		output_path,
		removed_files,
	});
}

/// Run [`execute`] on a named thread, all progress events are sent to the returned [`Receiver`]
/// The result is returned by joining the handle, use [`crate::error::CustomThreadJoin::join_err`] to get a [`crate::Error`] for panics
///
/// The [`Receiver`] is disconnected once the job has finished
pub fn spawn_execute<A>(
	job: JobDescriptor,
	options: A,
) -> Result<(JoinHandle<Result<ExecuteResult, crate::Error>>, Receiver<DownloadProgress>), crate::Error>
where
	A: ExecuteOptions + Send + 'static,
{
	let (sender, receiver) = channel();

	let handle = std::thread::Builder::new()
		.name(EXECUTE_THREAD_NAME.to_owned())
		.spawn(move || {
			return execute(&job, &options, |event| {
				// the receiver may have gone away, the job should still finish (and cleanup)
				if sender.send(event).is_err() {
					trace!("Progress receiver has been dropped");
				}
			});
		})
		.attach_location_err("spawn execute thread")?;

	return Ok((handle, receiver));
}

/// Keep track of the overall percentage across multiple streams
#[derive(Debug)]
struct ProgressTracker {
	/// The amount of streams that are expected to be downloaded
	expected_streams: u8,
	/// The amount of streams that have started downloading
	started_streams:  u8,
	/// The last overall percentage, used to never go backwards
	last_percent:     u8,
}

impl ProgressTracker {
	/// Create a new tracker for the given job
	fn new(job: &JobDescriptor) -> Self {
		// jobs that need cleanup are jobs which merge a separate video and audio stream
		let expected_streams = if job.cleanup_required() { 2 } else { 1 };

		return Self {
			expected_streams,
			started_streams: 0,
			last_percent: 0,
		};
	}

	/// Register that a new stream has started
	fn stream_started(&mut self) {
		self.started_streams = self.started_streams.saturating_add(1);
	}

	/// Get the 1-based index of the current stream, capped at the expected streams
	fn current_stream(&self) -> u8 {
		return self.started_streams.clamp(1, self.expected_streams);
	}

	/// Update with the percentage of the current stream and get the overall percentage
	fn update(&mut self, stream_percent: u8) -> u8 {
		let finished_streams = u32::from(self.current_stream() - 1);
		let overall =
			(finished_streams * 100 + u32::from(stream_percent.min(100))) / u32::from(self.expected_streams);

		self.last_percent = self.last_percent.max(u8::try_from(overall).unwrap_or(100));

		return self.last_percent;
	}

	/// Get the status line for the current stream
	fn status(&self, status: &DownloadStatus) -> String {
		let mut line = String::from("Downloading");

		if self.expected_streams > 1 {
			line.push_str(&format!(" ({}/{})", self.current_stream(), self.expected_streams));
		}

		line.push_str(&format!(": {}%", status.percent));

		if let Some(speed) = &status.speed {
			line.push_str(&format!(" at {speed}"));
		}
		if let Some(eta) = &status.eta {
			line.push_str(&format!(", ETA {eta}"));
		}

		return line;
	}
}

/// The information gathered from the youtube-dl output
#[derive(Debug)]
struct HandledOutput {
	/// The final path reported by "MOVE"
	final_path:   Option<PathBuf>,
	/// All files youtube-dl reported as download destinations
	destinations: Vec<PathBuf>,
	/// The last error line encountered
	last_error:   Option<crate::Error>,
}

/// Helper function to handle the output from a spawned ytdl command
#[inline]
fn handle_stdout<A: ExecuteOptions, C: FnMut(DownloadProgress), R: BufRead>(
	job: &JobDescriptor,
	options: &A,
	mut pgcb: C,
	mut reader: R,
) -> Result<HandledOutput, crate::Error> {
	// report that the downloading is now starting
	pgcb(DownloadProgress::Starting);

	// cache the bool for "print_command_log" to not execute the function for every line (should be a static value)
	let print_stdout = options.print_command_log();

	let mut tracker = ProgressTracker::new(job);
	let mut handled = HandledOutput {
		final_path:   None,
		destinations: Vec::new(),
		last_error:   None,
	};

	let mut maybe_command_file_log = if options.save_command_log() {
		let path = job
			.output_directory()
			.join(format!("yt-dl_{}.log", std::process::id()));

		info!("Logging command output to \"{}\"", path.display());

		let mut file = BufWriter::new(
			OpenOptions::new()
				.create(true)
				.append(true)
				.open(&path)
				.attach_path_err(&path)?,
		);

		file.write_all(b"\nNew Instance\n").attach_path_err(&path)?;

		Some((file, path))
	} else {
		None
	};

	let mut buf = Vec::new();
	loop {
		buf.clear();
		match reader.read_until(b'\n', &mut buf) {
			Ok(0) => break,
			Ok(_) => (),
			Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
			Err(err) => return Err(err).attach_location_err("ytdl stdout read"),
		}

		// titles are not always printed as UTF-8 (like on windows consoles)
		let decoded = String::from_utf8_lossy(&buf);
		let line = decoded.trim_end_matches(['\n', '\r']);

		// only print STDOUT to output when requested
		if print_stdout {
			trace!("ytdl [STDOUT]: \"{}\"", line);
		}
		if let Some((file, path)) = &mut maybe_command_file_log {
			file.write_all(line.as_bytes()).attach_path_err(&path)?;
			file.write_all(b"\n").attach_path_err(path)?;
		}

		let Some(linetype) = LineType::try_from_line(line) else {
			if !line.is_empty() {
				info!("No type has been found for line \"{}\"", line);
			}
			continue;
		};

		match linetype {
			// currently there is nothing that needs to be done with "ProviderSpecific" Lines, thanks to "--print"
			LineType::ProviderSpecific
			// currently there is nothing that needs to be done with "Generic" Lines
			| LineType::Generic => (),
			LineType::Download => {
				if let Some(destination) = linetype.try_get_destination(line) {
					debug!("Found new download destination \"{}\"", destination.display());
					tracker.stream_started();
					handled.destinations.push(destination);
				} else if let Some(percent) = linetype.try_get_download_percent(line) {
					let overall = tracker.update(percent);
					let status = linetype
						.try_get_download_status(line)
						.map_or_else(|| return format!("Downloading: {overall}%"), |v| return tracker.status(&v));

					pgcb(DownloadProgress::Progress(overall, status));
				}
			},
			LineType::PostProcess => {
				if let Some(description) = linetype.try_get_post_process_description(line) {
					pgcb(DownloadProgress::Processing(description.to_owned()));
				}
			},
			LineType::Custom => {
				if let Some(path) = linetype.try_get_move_path(line) {
					debug!("Found MOVE: \"{}\"", path.display());
					handled.final_path = Some(path);
				}
			},
			LineType::Error => {
				// the following is using debug printing, because the line may include escape characters, which would mess-up the printing, but is still good to know when reading
				warn!("Encountered youtube-dl error: {:#?}", line);
				handled.last_error = Some(classify_error_line(line));
			},
			LineType::Warning => {
				// ytdl warnings are non-fatal, but should still be logged
				warn!("youtube-dl: {:#?}", line);
			},
		}
	}

	if let Some((mut file, path)) = maybe_command_file_log {
		file.flush().attach_path_err(path)?;
	}

	return Ok(handled);
}


#[cfg(test)]
mod test {
	use std::sync::{
		Arc,
		atomic::AtomicUsize,
	};

	use super::*;
	use crate::data::job::compile;

	const URL: &str = "https://www.youtube.com/watch?v=aqz-KE-bpKQ";

	mod handle_stdout {
		use super::{
			test_utils::{
				TestOptions,
				callback_counter,
			},
			*,
		};

		#[test]
		fn test_video_two_streams() {
			let expected_pg = &[
				DownloadProgress::Starting,
				DownloadProgress::Progress(0, "Downloading (1/2): 0.0% at 207.76KiB/s, ETA 06:27".to_owned()),
				DownloadProgress::Progress(25, "Downloading (1/2): 50.0% at 526.19KiB/s, ETA 01:16".to_owned()),
				DownloadProgress::Progress(50, "Downloading (1/2): 100% at 5.89MiB/s, ETA 00:00".to_owned()),
				DownloadProgress::Progress(50, "Downloading (1/2): 100%".to_owned()),
				DownloadProgress::Progress(50, "Downloading (2/2): 0.0% at 196.76KiB/s, ETA 00:18".to_owned()),
				DownloadProgress::Progress(78, "Downloading (2/2): 57.6% at 9.57MiB/s, ETA 00:00".to_owned()),
				DownloadProgress::Progress(100, "Downloading (2/2): 100% at 10.57MiB/s, ETA 00:00".to_owned()),
				DownloadProgress::Progress(100, "Downloading (2/2): 100%".to_owned()),
				DownloadProgress::Processing("Merging formats".to_owned()),
			];
			let expect_index = Arc::new(AtomicUsize::new(0));

			let job = compile("video", "best", "My Title", URL)
				.expect("Expected compile to succeed")
				.with_output_directory("/tmp/out");
			let options = TestOptions::default();

			let input = r#"
[youtube] Extracting URL: https://www.youtube.com/watch?v=aqz-KE-bpKQ
[youtube] aqz-KE-bpKQ: Downloading webpage
[info] aqz-KE-bpKQ: Downloading 1 format(s): 137+140
[download] Destination: /tmp/out/My Title.f137.mp4
[download]   0.0% of 78.44MiB at 207.76KiB/s ETA 06:27
[download]  50.0% of 78.44MiB at 526.19KiB/s ETA 01:16
[download] 100% of 78.44MiB at  5.89MiB/s ETA 00:00
[download] 100% of 78.44MiB in 00:07
[download] Destination: /tmp/out/My Title.f140.m4a
[download]   0.0% of 3.47MiB at 196.76KiB/s ETA 00:18
[download]  57.6% of 3.47MiB at  9.57MiB/s ETA 00:00
[download] 100% of 3.47MiB at 10.57MiB/s ETA 00:00
[download] 100% of 3.47MiB in 00:00
[Merger] Merging formats into "/tmp/out/My Title.mp4"
Deleting original file /tmp/out/My Title.f137.mp4 (pass -k to keep)
Deleting original file /tmp/out/My Title.f140.m4a (pass -k to keep)
MOVE /tmp/out/My Title.mp4
			"#;

			let res = handle_stdout(
				&job,
				&options,
				callback_counter(&expect_index, expected_pg),
				BufReader::new(input.as_bytes()),
			)
			.expect("Expected handle_stdout to succeed");

			assert_eq!(expected_pg.len(), expect_index.load(std::sync::atomic::Ordering::Relaxed));
			assert_eq!(Some(PathBuf::from("/tmp/out/My Title.mp4")), res.final_path);
			assert_eq!(
				vec![
					PathBuf::from("/tmp/out/My Title.f137.mp4"),
					PathBuf::from("/tmp/out/My Title.f140.m4a")
				],
				res.destinations
			);
			assert!(res.last_error.is_none());
		}

		#[test]
		fn test_audio_single_stream() {
			let expected_pg = &[
				DownloadProgress::Starting,
				DownloadProgress::Progress(10, "Downloading: 10.0% at 1.00MiB/s, ETA 00:09".to_owned()),
				DownloadProgress::Progress(100, "Downloading: 100%".to_owned()),
				DownloadProgress::Processing("Extracting audio".to_owned()),
			];
			let expect_index = Arc::new(AtomicUsize::new(0));

			let job = compile("audio", "best", "My Title", URL)
				.expect("Expected compile to succeed")
				.with_output_directory("/tmp/out");

			let input = r#"
[download] Destination: /tmp/out/My Title.webm
[download]  10.0% of 3.47MiB at  1.00MiB/s ETA 00:09
[download] 100% of 3.47MiB in 00:03
[ExtractAudio] Destination: /tmp/out/My Title.mp3
Deleting original file /tmp/out/My Title.webm (pass -k to keep)
MOVE /tmp/out/My Title.mp3
			"#;

			let res = handle_stdout(
				&job,
				&TestOptions::default(),
				callback_counter(&expect_index, expected_pg),
				BufReader::new(input.as_bytes()),
			)
			.expect("Expected handle_stdout to succeed");

			assert_eq!(expected_pg.len(), expect_index.load(std::sync::atomic::Ordering::Relaxed));
			assert_eq!(Some(PathBuf::from("/tmp/out/My Title.mp3")), res.final_path);
		}

		#[test]
		fn test_percent_never_decreases() {
			let job = compile("video", "best", "My Title", URL)
				.expect("Expected compile to succeed")
				.with_output_directory("/tmp/out");

			// second stream restarts at 0, and a extra unexpected third stream also starts at 0
			let input = r#"
[download] Destination: /tmp/out/My Title.f137.mp4
[download]  80.0% of 78.44MiB at 5.00MiB/s ETA 00:02
[download]  40.0% of 78.44MiB at 5.00MiB/s ETA 00:10
[download] Destination: /tmp/out/My Title.f140.m4a
[download]   5.0% of 3.47MiB at 1.00MiB/s ETA 00:03
[download] Destination: /tmp/out/My Title.f141.m4a
[download]   0.0% of 3.47MiB at 1.00MiB/s ETA 00:03
[download] 100% of 3.47MiB in 00:01
			"#;

			let mut percents: Vec<u8> = Vec::new();
			handle_stdout(
				&job,
				&TestOptions::default(),
				|event| {
					if let Some(percent) = event.percent() {
						percents.push(percent);
					}
				},
				BufReader::new(input.as_bytes()),
			)
			.expect("Expected handle_stdout to succeed");

			assert_eq!(vec![0, 40, 40, 52, 52, 100], percents);
			assert!(percents.windows(2).all(|v| return v[0] <= v[1]));
			assert!(percents.iter().all(|v| return *v <= 100));
		}

		#[test]
		fn test_error_line() {
			let job = compile("video", "best", "My Title", URL)
				.expect("Expected compile to succeed")
				.with_output_directory("/tmp/out");

			let input = r#"
[youtube] aqz-KE-bpKQ: Downloading webpage
WARNING: [youtube] Some warning
ERROR: [youtube] aqz-KE-bpKQ: Sign in to confirm you’re not a bot. Use --cookies-from-browser or --cookies for the authentication.
			"#;

			let res = handle_stdout(&job, &TestOptions::default(), |_| (), BufReader::new(input.as_bytes()))
				.expect("Expected handle_stdout to succeed");

			assert_eq!(
				Some(crate::Error::cookie_required(
					"ERROR: [youtube] aqz-KE-bpKQ: Sign in to confirm you’re not a bot. Use --cookies-from-browser or --cookies for the authentication."
				)),
				res.last_error
			);
			assert_eq!(None, res.final_path);
		}

		#[test]
		fn test_non_utf8_line_keeps_reading() {
			let job = compile("audio", "best", "My Title", URL)
				.expect("Expected compile to succeed")
				.with_output_directory("/tmp/out");

			let mut input: Vec<u8> = Vec::new();
			input.extend_from_slice(b"[download] Destination: /tmp/out/Caf\xe9.webm\r\n");
			input.extend_from_slice(b"[download]  10.0% of 3.47MiB at  1.00MiB/s ETA 00:09\n");
			input.extend_from_slice(b"MOVE /tmp/out/My Title.mp3\n");

			let mut percents: Vec<u8> = Vec::new();
			let res = handle_stdout(
				&job,
				&TestOptions::default(),
				|event| {
					if let DownloadProgress::Progress(percent, _) = event {
						percents.push(percent);
					}
				},
				BufReader::new(input.as_slice()),
			)
			.expect("Expected handle_stdout to succeed");

			assert_eq!(vec![PathBuf::from("/tmp/out/Caf\u{fffd}.webm")], res.destinations);
			assert_eq!(vec![10], percents);
			assert_eq!(Some(PathBuf::from("/tmp/out/My Title.mp3")), res.final_path);
		}

		#[test]
		fn test_save_command_log() {
			let tmpdir = tempfile::Builder::new()
				.prefix("ytpick-test-cmdlog-")
				.tempdir()
				.expect("Expected a temp dir to be created");
			let job = compile("audio", "best", "My Title", URL)
				.expect("Expected compile to succeed")
				.with_output_directory(tmpdir.path());
			let options = TestOptions {
				save_command_log: true,
				..Default::default()
			};

			handle_stdout(&job, &options, |_| (), BufReader::new("[download] 100% of 3.47MiB in 00:03\n".as_bytes()))
				.expect("Expected handle_stdout to succeed");

			let log_path = tmpdir.path().join(format!("yt-dl_{}.log", std::process::id()));
			let content = std::fs::read_to_string(log_path).expect("Expected log file to exist");

			assert!(content.contains("[download] 100% of 3.47MiB in 00:03"));
		}
	}

	mod progress {
		use super::*;

		#[test]
		fn test_event_accessors() {
			assert_eq!(Some(0), DownloadProgress::Starting.percent());
			assert_eq!(Some(100), DownloadProgress::Finished.percent());
			assert_eq!(FINISHED_STATUS, DownloadProgress::Finished.status());
			assert_eq!(None, DownloadProgress::Processing("Merging formats".to_owned()).percent());
			assert_eq!(
				"Downloading: 5%",
				DownloadProgress::Progress(5, "Downloading: 5%".to_owned()).status()
			);
		}
	}

	#[cfg(unix)]
	mod execute {
		use std::{
			os::unix::fs::PermissionsExt,
			path::Path,
			sync::mpsc::RecvTimeoutError,
		};

		use super::{
			test_utils::TestOptions,
			*,
		};
		use crate::error::ErrorInner;

		/// Write a shell script that stands in for youtube-dl, the arguments are ignored
		fn write_fake_ytdl(dir: &Path, script: &str) -> PathBuf {
			let path = dir.join("fake-yt-dlp");
			std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).expect("Expected script to be written");

			let mut permissions = std::fs::metadata(&path)
				.expect("Expected script metadata")
				.permissions();
			permissions.set_mode(0o755);
			std::fs::set_permissions(&path, permissions).expect("Expected script to be made executable");

			return path;
		}

		/// Run [`execute_program`] with the given script and collect all progress events
		fn run_script(
			script: &str,
			job: &JobDescriptor,
		) -> (Result<ExecuteResult, crate::Error>, Vec<DownloadProgress>) {
			let bindir = tempfile::Builder::new()
				.prefix("ytpick-test-fakebin-")
				.tempdir()
				.expect("Expected a temp dir to be created");
			let program = write_fake_ytdl(bindir.path(), script);

			let mut events = Vec::new();
			let res = execute_program(program.as_os_str(), job, &TestOptions::default(), |event| {
				events.push(event);
			});

			return (res, events);
		}

		fn audio_job(dir: &Path) -> JobDescriptor {
			return compile("audio", "best", "My Title", URL)
				.expect("Expected compile to succeed")
				.with_output_directory(dir);
		}

		fn video_job(dir: &Path) -> JobDescriptor {
			return compile("video", "best", "My Title", URL)
				.expect("Expected compile to succeed")
				.with_output_directory(dir);
		}

		#[test]
		fn test_non_utf8_output_does_not_block() {
			let outdir = tempfile::Builder::new()
				.prefix("ytpick-test-execute-")
				.tempdir()
				.expect("Expected a temp dir to be created");
			let job = audio_job(outdir.path());
			let bindir = tempfile::Builder::new()
				.prefix("ytpick-test-fakebin-")
				.tempdir()
				.expect("Expected a temp dir to be created");
			// much more output than a pipe buffer can hold, after a line that is not valid UTF-8
			let program = write_fake_ytdl(
				bindir.path(),
				r#"printf '[download] Destination: Caf\351.webm\n'
i=0
while [ $i -lt 20000 ]; do
	echo "[download]  50.0% of 3.47MiB at  1.00MiB/s ETA 00:01"
	i=$((i+1))
done
exit 0"#,
			);

			let (sender, receiver) = std::sync::mpsc::channel();
			let thread_job = job.clone();
			std::thread::spawn(move || {
				let res = execute_program(program.as_os_str(), &thread_job, &TestOptions::default(), |_| ());
				let _ = sender.send(res);
			});

			let res = match receiver.recv_timeout(Duration::from_secs(60)) {
				Ok(v) => v,
				Err(RecvTimeoutError::Timeout) => panic!("Expected execute to return while output is still being written"),
				Err(RecvTimeoutError::Disconnected) => panic!("Expected execute thread to not panic"),
			};

			let res = res.expect("Expected execute to succeed");
			assert_eq!(job.expected_output_path(), res.output_path);
		}

		#[test]
		fn test_error_line_with_failed_exit() {
			let outdir = tempfile::Builder::new()
				.prefix("ytpick-test-execute-")
				.tempdir()
				.expect("Expected a temp dir to be created");
			let job = audio_job(outdir.path());

			let (res, events) = run_script(
				r#"echo "[youtube] aqz-KE-bpKQ: Downloading webpage"
echo "ERROR: [youtube] aqz-KE-bpKQ: Sign in to confirm your age. This video may be inappropriate for some users." >&2
exit 1"#,
				&job,
			);

			let err = res.expect_err("Expected execute to fail");
			assert!(matches!(err.inner(), ErrorInner::CookieRequired(_)), "got {err:?}");
			assert_eq!(Some(&DownloadProgress::Starting), events.first());
			assert!(!events.contains(&DownloadProgress::Finished));
		}

		#[test]
		fn test_error_line_with_successful_exit() {
			let outdir = tempfile::Builder::new()
				.prefix("ytpick-test-execute-")
				.tempdir()
				.expect("Expected a temp dir to be created");
			let job = audio_job(outdir.path());
			let final_path = outdir.path().join("My Title.mp3");

			let (res, events) = run_script(
				&format!(
					r#"echo "ERROR: Unable to download video subtitles for 'en': HTTP Error 404: Not Found"
echo "MOVE {}"
exit 0"#,
					final_path.display()
				),
				&job,
			);

			let res = res.expect("Expected execute to succeed, the error was not fatal");
			assert_eq!(final_path, res.output_path);
			assert!(res.removed_files.is_empty());
			assert_eq!(Some(&DownloadProgress::Finished), events.last());
		}

		#[test]
		fn test_failed_exit_without_error_line() {
			let outdir = tempfile::Builder::new()
				.prefix("ytpick-test-execute-")
				.tempdir()
				.expect("Expected a temp dir to be created");
			let job = audio_job(outdir.path());

			let (res, events) = run_script("echo \"[youtube] aqz-KE-bpKQ: Downloading webpage\"\nexit 3", &job);

			assert_eq!(
				Err(crate::Error::download_error(
					"youtube-dl exited unsuccessfully without a error message"
				)),
				res
			);
			assert_eq!(vec![DownloadProgress::Starting], events);
		}

		#[test]
		fn test_cleanup_after_failure() {
			let outdir = tempfile::Builder::new()
				.prefix("ytpick-test-execute-")
				.tempdir()
				.expect("Expected a temp dir to be created");
			let job = video_job(outdir.path());
			let stream_video = outdir.path().join("My Title.f137.mp4");
			let stream_audio = outdir.path().join("My Title.f140.m4a.part");
			let unrelated = outdir.path().join("Other.webm");
			std::fs::write(&unrelated, "").expect("Expected file to be written");

			let (res, _events) = run_script(
				&format!(
					r#"echo "[download] Destination: {video}"
: > "{video}"
echo "[download] Destination: {audio}"
: > "{audio}"
echo "ERROR: [download] Got error: HTTP Error 403: Forbidden"
exit 1"#,
					video = stream_video.display(),
					audio = stream_audio.display(),
				),
				&job,
			);

			let err = res.expect_err("Expected execute to fail");
			assert!(matches!(err.inner(), ErrorInner::DownloadError(_)), "got {err:?}");
			assert!(!stream_video.exists());
			assert!(!stream_audio.exists());
			assert!(unrelated.exists());
		}

		#[test]
		fn test_no_move_line_uses_expected_path() {
			let outdir = tempfile::Builder::new()
				.prefix("ytpick-test-execute-")
				.tempdir()
				.expect("Expected a temp dir to be created");
			let job = video_job(outdir.path());
			let leftover = outdir.path().join("My Title.f251.webm");

			let (res, events) = run_script(
				&format!(
					r#": > "{leftover}"
: > "{final_path}"
echo "[download] 100% of 3.47MiB in 00:01"
exit 0"#,
					leftover = leftover.display(),
					final_path = job.expected_output_path().display(),
				),
				&job,
			);

			let res = res.expect("Expected execute to succeed");
			assert_eq!(job.expected_output_path(), res.output_path);
			assert_eq!(vec![leftover.clone()], res.removed_files);
			assert!(!leftover.exists());
			assert!(res.output_path.exists());
			assert_eq!(Some(&DownloadProgress::Finished), events.last());
		}
	}

	#[test]
	#[ignore = "CI Install not present currently"]
	fn test_execute_real() {
		let tmpdir = tempfile::Builder::new()
			.prefix("ytpick-test-execute-")
			.tempdir()
			.expect("Expected a temp dir to be created");
		let job = compile("audio", "best", "Big Buck Bunny", URL)
			.expect("Expected compile to succeed")
			.with_output_directory(tmpdir.path());

		let (handle, receiver) =
			spawn_execute(job, test_utils::TestOptions::default()).expect("Expected thread to spawn");
		let events: Vec<DownloadProgress> = receiver.iter().collect();
		let res = crate::error::CustomThreadJoin::join_err(handle)
			.expect("Expected join to succeed")
			.expect("Expected execute to succeed");

		assert_eq!(Some(&DownloadProgress::Starting), events.first());
		assert_eq!(Some(&DownloadProgress::Finished), events.last());
		assert!(res.output_path.exists());
	}
}
