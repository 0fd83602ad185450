//! Module for fetching the metadata of a url

use std::{
	ffi::OsString,
	process::{
		Output,
		Stdio,
	},
	thread::JoinHandle,
};

use crate::{
	data::metadata::MediaMetadata,
	error::IOErrorToError,
	spawn::ytdl::{
		base_ytdl,
		classify_error_line,
	},
	traits::options::YtdlOptions,
};

/// Name of the thread spawned by [`spawn_fetch`]
pub const FETCH_THREAD_NAME: &str = "ytpick fetch";

/// Assemble the arguments for fetching the metadata of "url"
fn assemble_fetch_args<A: YtdlOptions>(url: &str, options: &A) -> Vec<OsString> {
	let mut args: Vec<OsString> = vec![
		// dump the info as a single json
		"-J".into(),
		"--skip-download".into(),
		"--no-warnings".into(),
		// only the media itself, even if the url also has a playlist
		"--no-playlist".into(),
	];

	if let Some(cookie_file) = options.cookie_file() {
		args.push("--cookies".into());
		args.push(cookie_file.into());
	}

	args.push(url.into());

	return args;
}

/// Fetch the [`MediaMetadata`] of a url with youtube-dl
/// Blocks until youtube-dl has exited
pub fn fetch_info<A: YtdlOptions>(url: &str, options: &A) -> Result<MediaMetadata, crate::Error> {
	let args = assemble_fetch_args(url, options);
	debug!("Fetching info with args: {:?}", args);

	let output: Output = base_ytdl()
		.args(args)
		.stdin(Stdio::null())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.spawn()
		.attach_location_err("ytdl fetch spawn")?
		.wait_with_output()
		.attach_location_err("ytdl fetch wait_with_output")?;

	if !output.status.success() {
		let stderr = String::from_utf8_lossy(&output.stderr);

		return Err(error_from_stderr(&stderr, output.status));
	}

	let stdout = String::from_utf8(output.stdout)?;

	return MediaMetadata::from_json(stdout);
}

/// Get the error to return from a unsuccessful fetch, based on the last "ERROR:" line
fn error_from_stderr(stderr: &str, status: std::process::ExitStatus) -> crate::Error {
	let last_error = stderr
		.lines()
		.rev()
		.find(|v| return v.starts_with("ERROR:") || v.starts_with("yt-dlp: error:"));

	if let Some(line) = last_error {
		warn!("Encountered youtube-dl error while fetching: {:#?}", line);
		return classify_error_line(line);
	}

	return crate::Error::download_error(format!("youtube-dl exited with {status} without a error message"));
}

/// Run [`fetch_info`] on a named thread, the result is returned by joining the handle
/// Use [`crate::error::CustomThreadJoin::join_err`] to get a [`crate::Error`] for panics
pub fn spawn_fetch<A>(url: String, options: A) -> Result<JoinHandle<Result<MediaMetadata, crate::Error>>, crate::Error>
where
	A: YtdlOptions + Send + 'static,
{
	return std::thread::Builder::new()
		.name(FETCH_THREAD_NAME.to_owned())
		.spawn(move || {
			return fetch_info(&url, &options);
		})
		.attach_location_err("spawn fetch thread");
}
