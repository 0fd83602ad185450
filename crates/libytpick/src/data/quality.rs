//! Module for quality selection parsing and the quality catalog normalizer

use std::collections::BTreeSet;

use super::{
	job::VIDEO_CONTAINER,
	stream::StreamDescriptor,
};

/// Suffix used for video resolutions, like "720p"
const HEIGHT_SUFFIX: &str = "p";
/// Suffix used for audio bitrates, like "128kbps"
const BITRATE_SUFFIX: &str = "kbps";

/// A single concrete quality value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quality {
	/// Video height in pixels, displayed as "720p"
	Height(u32),
	/// Audio bitrate in kbps, displayed as "128kbps"
	Bitrate(u32),
}

impl std::fmt::Display for Quality {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		return match self {
			Self::Height(v) => write!(f, "{v}{HEIGHT_SUFFIX}"),
			Self::Bitrate(v) => write!(f, "{v}{BITRATE_SUFFIX}"),
		};
	}
}

/// The users quality choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualitySelection {
	/// A specific upper bound was chosen
	Explicit(Quality),
	/// No upper bound, let youtube-dl pick the best
	#[default]
	Best,
}

impl QualitySelection {
	/// Classify a raw quality string
	///
	/// Examples:
	/// - `"720p"` -> `Explicit(Height(720))`
	/// - `" 160kbps "` -> `Explicit(Bitrate(160))`
	/// - `"best"`, `""`, `"p"`, `"abcp"` -> `Best`
	pub fn parse<I: AsRef<str>>(input: I) -> Self {
		let input = input.as_ref().trim();

		// "kbps" has to be checked first, because it would never end with "p" anyway, but this keeps the order obvious
		if let Some(num) = parse_numeric_prefix(input, BITRATE_SUFFIX) {
			return Self::Explicit(Quality::Bitrate(num));
		}
		if let Some(num) = parse_numeric_prefix(input, HEIGHT_SUFFIX) {
			return Self::Explicit(Quality::Height(num));
		}

		return Self::Best;
	}

	/// Get the explicit height, if this selection is a height
	pub fn height(&self) -> Option<u32> {
		return match self {
			Self::Explicit(Quality::Height(v)) => Some(*v),
			_ => None,
		};
	}

	/// Get the explicit bitrate, if this selection is a bitrate
	pub fn bitrate(&self) -> Option<u32> {
		return match self {
			Self::Explicit(Quality::Bitrate(v)) => Some(*v),
			_ => None,
		};
	}
}

impl std::fmt::Display for QualitySelection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		return match self {
			Self::Explicit(v) => v.fmt(f),
			Self::Best => write!(f, "best"),
		};
	}
}

/// Strip "suffix" from "input" and parse the rest as a number, only if the rest is non-empty and only ascii digits
fn parse_numeric_prefix(input: &str, suffix: &str) -> Option<u32> {
	let prefix = input.strip_suffix(suffix)?;

	if prefix.is_empty() || !prefix.bytes().all(|v| return v.is_ascii_digit()) {
		return None;
	}

	return prefix.parse().ok();
}

/// The deduplicated and descending-sorted quality choices for a media
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QualityCatalog {
	/// Audio bitrates, formatted like "128kbps"
	pub audio_qualities:   Vec<String>,
	/// Video heights, formatted like "720p"
	pub video_resolutions: Vec<String>,
}

impl QualityCatalog {
	/// Get the choices applicable to the given kind
	pub fn options_for(&self, kind: super::job::TargetKind) -> &[String] {
		return match kind {
			super::job::TargetKind::Audio => &self.audio_qualities,
			super::job::TargetKind::Video => &self.video_resolutions,
		};
	}
}

/// Normalize a list of streams into a [`QualityCatalog`]
///
/// - audio-only streams with a bitrate count as audio quality (rounded to the nearest integer)
/// - video streams with a height in [`VIDEO_CONTAINER`] count as video resolution
/// - everything else is ignored
pub fn normalize<'a, I>(streams: I) -> QualityCatalog
where
	I: IntoIterator<Item = &'a StreamDescriptor>,
{
	let mut bitrates: BTreeSet<u32> = BTreeSet::new();
	let mut heights: BTreeSet<u32> = BTreeSet::new();

	for stream in streams {
		if stream.is_audio_only() {
			if let Some(kbps) = stream.audio_bitrate_kbps.and_then(round_bitrate) {
				bitrates.insert(kbps);
			}
		} else if stream.has_video && stream.container == VIDEO_CONTAINER {
			if let Some(height) = stream.height_px {
				heights.insert(height);
			}
		}
	}

	return QualityCatalog {
		audio_qualities:   bitrates
			.into_iter()
			.rev()
			.map(|v| return Quality::Bitrate(v).to_string())
			.collect(),
		video_resolutions: heights
			.into_iter()
			.rev()
			.map(|v| return Quality::Height(v).to_string())
			.collect(),
	};
}

/// Round a bitrate, returning [`None`] for values that are not usable
fn round_bitrate(kbps: f64) -> Option<u32> {
	if !kbps.is_finite() || kbps < 0.0 {
		return None;
	}

	let rounded = kbps.round();

	if rounded > f64::from(u32::MAX) {
		return None;
	}

	return Some(rounded as u32);
}

#[cfg(test)]
mod test {
	use super::*;

	mod selection {
		use super::*;

		#[test]
		fn test_explicit_height() {
			assert_eq!(
				QualitySelection::Explicit(Quality::Height(720)),
				QualitySelection::parse("720p")
			);
			assert_eq!(
				QualitySelection::Explicit(Quality::Height(1080)),
				QualitySelection::parse("  1080p\n")
			);
		}

		#[test]
		fn test_explicit_bitrate() {
			assert_eq!(
				QualitySelection::Explicit(Quality::Bitrate(160)),
				QualitySelection::parse("160kbps")
			);
			assert_eq!(
				QualitySelection::Explicit(Quality::Bitrate(64)),
				QualitySelection::parse(" 64kbps")
			);
		}

		#[test]
		fn test_best() {
			assert_eq!(QualitySelection::Best, QualitySelection::parse("best"));
			assert_eq!(QualitySelection::Best, QualitySelection::parse(""));
			assert_eq!(QualitySelection::Best, QualitySelection::parse("   "));
			assert_eq!(QualitySelection::Best, QualitySelection::parse("p"));
			assert_eq!(QualitySelection::Best, QualitySelection::parse("kbps"));
			assert_eq!(QualitySelection::Best, QualitySelection::parse("highp"));
			assert_eq!(QualitySelection::Best, QualitySelection::parse("720p60"));
			assert_eq!(QualitySelection::Best, QualitySelection::parse("No resolutions available"));
			assert_eq!(QualitySelection::Best, QualitySelection::parse("-720p"));
		}

		#[test]
		fn test_display_roundtrip() {
			assert_eq!("720p", QualitySelection::parse("720p").to_string());
			assert_eq!("128kbps", QualitySelection::parse("128kbps").to_string());
			assert_eq!("best", QualitySelection::parse("").to_string());
		}

		#[test]
		fn test_accessors() {
			assert_eq!(Some(720), QualitySelection::parse("720p").height());
			assert_eq!(None, QualitySelection::parse("720p").bitrate());
			assert_eq!(Some(128), QualitySelection::parse("128kbps").bitrate());
			assert_eq!(None, QualitySelection::Best.height());
		}
	}

	mod normalize {
		use super::*;

		/// Check that the input is strictly descending by the embedded number
		fn assert_strictly_descending(input: &[String]) {
			let nums: Vec<u32> = input
				.iter()
				.map(|v| {
					return v
						.trim_end_matches(|c: char| return c.is_ascii_alphabetic())
						.parse()
						.expect("Expected numeric prefix");
				})
				.collect();

			for window in nums.windows(2) {
				assert!(window[0] > window[1], "Expected {:?} to be strictly descending", input);
			}
		}

		#[test]
		fn test_empty() {
			assert_eq!(QualityCatalog::default(), normalize(&[] as &[StreamDescriptor]));
		}

		#[test]
		fn test_audio_dedup_and_round() {
			let streams = vec![
				StreamDescriptor::audio(Some(128.0), "m4a"),
				StreamDescriptor::audio(Some(128.0), "webm"),
				StreamDescriptor::audio(Some(192.0), "webm"),
				StreamDescriptor::audio(Some(64.7), "m4a"),
			];

			let catalog = normalize(&streams);

			assert_eq!(vec!["192kbps", "128kbps", "65kbps"], catalog.audio_qualities);
			assert!(catalog.video_resolutions.is_empty());
		}

		#[test]
		fn test_audio_rounding_collision() {
			let streams = vec![
				StreamDescriptor::audio(Some(128.4), "m4a"),
				StreamDescriptor::audio(Some(127.6), "webm"),
			];

			assert_eq!(vec!["128kbps"], normalize(&streams).audio_qualities);
		}

		#[test]
		fn test_video_dedup() {
			let streams = vec![
				StreamDescriptor::video(Some(1080), "mp4"),
				StreamDescriptor::video(Some(720), "mp4"),
				StreamDescriptor::video(Some(1080), "mp4"),
			];

			let catalog = normalize(&streams);

			assert_eq!(vec!["1080p", "720p"], catalog.video_resolutions);
			assert!(catalog.audio_qualities.is_empty());
		}

		#[test]
		fn test_video_other_container_ignored() {
			let streams = vec![
				StreamDescriptor::video(Some(2160), "webm"),
				StreamDescriptor::video(Some(1440), "webm"),
				StreamDescriptor::video(Some(720), "mp4"),
			];

			assert_eq!(vec!["720p"], normalize(&streams).video_resolutions);
		}

		#[test]
		fn test_combined_streams() {
			let mut combined = StreamDescriptor::video(Some(360), "mp4");
			combined.has_audio = true;
			combined.audio_bitrate_kbps = Some(96.0);

			let catalog = normalize(&[combined]);

			// combined streams are video, not audio-only
			assert!(catalog.audio_qualities.is_empty());
			assert_eq!(vec!["360p"], catalog.video_resolutions);
		}

		#[test]
		fn test_malformed_ignored() {
			let streams = vec![
				StreamDescriptor::audio(None, "m4a"),
				StreamDescriptor::audio(Some(f64::NAN), "m4a"),
				StreamDescriptor::audio(Some(f64::INFINITY), "m4a"),
				StreamDescriptor::audio(Some(-10.0), "m4a"),
				StreamDescriptor::video(None, "mp4"),
				StreamDescriptor {
					has_audio:          false,
					has_video:          false,
					audio_bitrate_kbps: Some(50.0),
					height_px:          Some(90),
					container:          "mhtml".into(),
				},
			];

			assert_eq!(QualityCatalog::default(), normalize(&streams));
		}

		#[test]
		fn test_ordering_invariant() {
			let streams = vec![
				StreamDescriptor::audio(Some(50.1), "webm"),
				StreamDescriptor::audio(Some(160.0), "webm"),
				StreamDescriptor::audio(Some(70.0), "webm"),
				StreamDescriptor::audio(Some(129.9), "m4a"),
				StreamDescriptor::audio(Some(160.2), "webm"),
				StreamDescriptor::video(Some(144), "mp4"),
				StreamDescriptor::video(Some(2160), "mp4"),
				StreamDescriptor::video(Some(480), "mp4"),
				StreamDescriptor::video(Some(144), "mp4"),
				StreamDescriptor::video(Some(1080), "mp4"),
			];

			let catalog = normalize(&streams);

			assert_strictly_descending(&catalog.audio_qualities);
			assert_strictly_descending(&catalog.video_resolutions);
			assert_eq!(vec!["160kbps", "130kbps", "70kbps", "50kbps"], catalog.audio_qualities);
			assert_eq!(vec!["2160p", "1080p", "480p", "144p"], catalog.video_resolutions);
		}

		#[test]
		fn test_options_for() {
			let catalog = normalize(&[
				StreamDescriptor::audio(Some(128.0), "m4a"),
				StreamDescriptor::video(Some(720), "mp4"),
			]);

			assert_eq!(
				&["128kbps".to_owned()],
				catalog.options_for(crate::data::job::TargetKind::Audio)
			);
			assert_eq!(
				&["720p".to_owned()],
				catalog.options_for(crate::data::job::TargetKind::Video)
			);
		}
	}
}
