use std::process::Command;

fn main() {
	// set what version string to use for the build
	// currently it depends on what git outputs, or if failed the crate version
	{
		println!("cargo:rerun-if-changed=build.rs");
		println!("cargo:rerun-if-changed=.git/HEAD");

		let version = Command::new("git")
			.args(["describe", "--tags", "--always", "--dirty"])
			.output()
			.ok()
			.filter(|v| return v.status.success())
			.and_then(|v| return String::from_utf8(v.stdout).ok())
			.map(|v| return v.trim().to_owned())
			.filter(|v| return !v.is_empty())
			.unwrap_or_else(|| return env!("CARGO_PKG_VERSION").to_owned());
		println!("cargo:rustc-env=YTPICK_VERSION={version}");
	}
}
