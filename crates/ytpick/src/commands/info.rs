//! Module for the "info" command

use std::io::Write;

use libytpick::{
	data::{
		metadata::MediaMetadata,
		quality::normalize,
	},
	error::IOErrorToError,
	main::fetch::fetch_info,
};

use crate::{
	clap_conf::{
		CliDerive,
		CommandInfo,
	},
	state::ExecuteState,
};

/// Handler function for the "info" subcommand
pub fn command_info(main_args: &CliDerive, sub_args: &CommandInfo) -> Result<(), crate::Error> {
	let mut state = ExecuteState::new(main_args, &[]);
	state.require_installed()?;

	let metadata = fetch_info(&sub_args.url, &state)?;

	let mut stdout = std::io::stdout().lock();
	write_info(&mut stdout, &metadata).attach_location_err("stdout write info")?;

	return Ok(());
}

/// Write the title and the catalogs of "metadata"
fn write_info<W: Write>(writer: &mut W, metadata: &MediaMetadata) -> std::io::Result<()> {
	let catalog = normalize(&metadata.formats);

	writeln!(writer, "Title: {}", metadata.title_or_fallback())?;
	writeln!(writer, "Audio qualities: {}", format_options(&catalog.audio_qualities))?;
	writeln!(writer, "Video resolutions: {}", format_options(&catalog.video_resolutions))?;

	return Ok(());
}

/// Join the options for display
fn format_options(options: &[String]) -> String {
	if options.is_empty() {
		return "(none available)".to_owned();
	}

	return options.join(", ");
}
