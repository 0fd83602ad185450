//! Utils for the `ytpick` binary

use crate::clap_conf::CliDerive;
use indicatif::{
	ProgressBar,
	ProgressDrawTarget,
};
use libytpick::error::IOErrorToError;
use std::{
	borrow::Cow,
	io::{
		BufRead,
		Write,
	},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Helper function to set the progressbar to a draw target if mode is interactive
pub fn set_progressbar(bar: &ProgressBar, main_args: &CliDerive) {
	if main_args.is_interactive() {
		bar.set_draw_target(ProgressDrawTarget::stderr());
	}
}

/// Get input from STDIN with "possible" or "default"
/// if using "default", remember to set a character in "possible" to upper-case
pub fn get_input(msg: &str, possible: &[&'static str], default: &'static str) -> Result<String, crate::Error> {
	return get_input_from(&mut std::io::stdin().lock(), msg, possible, default);
}

/// Same as [`get_input`], but read from any [`BufRead`]
pub fn get_input_from<R: BufRead>(
	reader: &mut R,
	msg: &str,
	possible: &[&'static str],
	default: &'static str,
) -> Result<String, crate::Error> {
	let possible_converted = possible
		.iter()
		.map(|v| {
			return v.to_lowercase();
		})
		.collect::<Vec<String>>();
	// dont use "possible_converted" for "possible_converted_string", because otherwise the default will not be shown anymore
	let possible_converted_string = possible.join("/");
	loop {
		let Some(input) = read_line_from(reader, &format!("{} [{}]: ", msg, possible_converted_string))? else {
			return Err(crate::Error::other("Input was closed"));
		};

		let input = input.to_lowercase();

		// return default if empty and default is set
		if input.is_empty() {
			if default.is_empty() {
				// special case when empty, to more emphasize that its empty
				println!("... Invalid Input: (Empty)");
				continue;
			}

			return Ok(default.to_owned());
		}

		if possible_converted.contains(&input) {
			return Ok(input);
		}

		println!("... Invalid Input: \"{}\"", input);
	}
}

/// Print "prompt" and read a single trimmed line from STDIN
/// Returns [`None`] if STDIN was closed
pub fn read_line(prompt: &str) -> Result<Option<String>, crate::Error> {
	return read_line_from(&mut std::io::stdin().lock(), prompt);
}

/// Same as [`read_line`], but read from any [`BufRead`]
pub fn read_line_from<R: BufRead>(reader: &mut R, prompt: &str) -> Result<Option<String>, crate::Error> {
	print!("{}", prompt);
	// ensure the message is printed before reading
	std::io::stdout().flush().attach_location_err("stdout flush")?;

	let mut input = String::new();
	let read = reader.read_line(&mut input).attach_location_err("stdin read_line")?;

	if read == 0 {
		return Ok(None);
	}

	return Ok(Some(input.trim().to_owned()));
}

/// Check that "url" looks like a youtube video url
/// Only "http(s)" urls containing "youtube.com/watch?v=" are accepted
pub fn is_valid_url(url: &str) -> bool {
	return (url.starts_with("http://") || url.starts_with("https://")) && url.contains("youtube.com/watch?v=");
}

/// Get the display width of a single grapheme
#[inline]
fn grapheme_width(grapheme: &str) -> usize {
	let width = grapheme.width();

	// some terminals display emoji with "VS16" as 2 wide, while unicode-width counts it as 1
	if cfg!(feature = "workaround_fe0f") && grapheme.contains('\u{fe0f}') {
		return width.max(2);
	}

	return width;
}

/// Truncate "msg" to fit into "display_pos" display positions, counting graphemes instead of bytes or chars
/// If "add_dots" is set, the last 3 positions are replaced with "..." when truncated
pub fn truncate_message_display_pos<M>(msg: &M, display_pos: usize, add_dots: bool) -> Cow<'_, str>
where
	M: AsRef<str> + ?Sized,
{
	let msg = msg.as_ref();

	let total_width: usize = msg.graphemes(true).map(grapheme_width).sum();

	if total_width <= display_pos {
		return Cow::Borrowed(msg);
	}

	let dots = if add_dots && display_pos >= 3 { "..." } else { "" };
	let available = display_pos - dots.len();

	let mut used = 0;
	let mut end = 0;

	for (idx, grapheme) in msg.grapheme_indices(true) {
		let width = grapheme_width(grapheme);

		if used + width > available {
			break;
		}

		used += width;
		end = idx + grapheme.len();
	}

	return Cow::Owned(format!("{}{}", &msg[..end], dots));
}

/// Truncate the given message so that "reserved" display positions and the message fit into the terminal width
/// The message is returned as-is if the terminal width is not known
pub fn truncate_message_term_width<M>(msg: &M, reserved: usize) -> String
where
	M: AsRef<str> + ?Sized,
{
	let display_width_available = terminal_size::terminal_size().map(|(w, _h)| {
		return (w.0 as usize).saturating_sub(reserved);
	});

	let Some(display_width_available) = display_width_available else {
		return msg.as_ref().into();
	};

	return truncate_message_display_pos(msg, display_width_available, true).to_string();
}
