use std::{
	ffi::OsStr,
	process::Command,
};

// This file still exists and is seperated for future quick changes

/// Spawn a binary in non-windows / DOS systems
#[cfg(not(target_os = "windows"))]
#[inline]
pub fn spawn_command<S: AsRef<OsStr>>(binary: S) -> Command {
	return Command::new(binary);
}

/// Spawn a binary for windows / DOS systems
/// Apparently, rust automatically adds a extensions (".exe") if none is specified
/// Also, rust automatically searches all the paths, including the ytpick binary path
#[cfg(target_os = "windows")]
#[inline]
pub fn spawn_command<S: AsRef<OsStr>>(binary: S) -> Command {
	use std::os::windows::process::CommandExt;

	/// Flag to not open a extra console window for the child process
	const CREATE_NO_WINDOW: u32 = 0x0800_0000;

	let mut cmd = Command::new(binary);
	cmd.creation_flags(CREATE_NO_WINDOW);

	return cmd;
}
