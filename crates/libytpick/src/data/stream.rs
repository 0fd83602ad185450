//! Module containing [`StreamDescriptor`]

use serde::Deserialize;

/// Value youtube-dl uses for a codec field when the track does not exist
const CODEC_NONE: &str = "none";

/// A single downloadable track (or combination) as reported by youtube-dl
/// Decoded from one element of the "formats" array of "youtube-dl -J"
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "YtdlFormat")]
pub struct StreamDescriptor {
	/// Whether the stream contains a audio track
	pub has_audio:          bool,
	/// Whether the stream contains a video track
	pub has_video:          bool,
	/// Average audio bitrate in kbps, if known
	pub audio_bitrate_kbps: Option<f64>,
	/// Height of the video in pixels, if known
	pub height_px:          Option<u32>,
	/// Container extension, like "mp4" or "webm"
	pub container:          String,
}

impl StreamDescriptor {
	/// Create a new audio-only [`StreamDescriptor`]
	pub fn audio<C: Into<String>>(bitrate_kbps: Option<f64>, container: C) -> Self {
		return Self {
			has_audio:          true,
			has_video:          false,
			audio_bitrate_kbps: bitrate_kbps,
			height_px:          None,
			container:          container.into(),
		};
	}

	/// Create a new video-only [`StreamDescriptor`]
	pub fn video<C: Into<String>>(height_px: Option<u32>, container: C) -> Self {
		return Self {
			has_audio:          false,
			has_video:          true,
			audio_bitrate_kbps: None,
			height_px,
			container:          container.into(),
		};
	}

	/// Get whether this stream only contains audio
	pub fn is_audio_only(&self) -> bool {
		return self.has_audio && !self.has_video;
	}
}

/// Raw format entry, only the fields that are of interest
/// All fields are optional because youtube-dl does not guarantee any of them
#[derive(Debug, Deserialize)]
struct YtdlFormat {
	acodec: Option<String>,
	vcodec: Option<String>,
	abr:    Option<f64>,
	// some extractors report floats here
	height: Option<f64>,
	ext:    Option<String>,
}

/// Helper to check if a codec field indicates a existing track
fn has_codec(codec: Option<&str>) -> bool {
	return codec.is_some_and(|v| return !v.is_empty() && v != CODEC_NONE);
}

impl From<YtdlFormat> for StreamDescriptor {
	fn from(value: YtdlFormat) -> Self {
		let height_px = value
			.height
			.filter(|v| return v.is_finite() && *v >= 0.0 && *v <= f64::from(u32::MAX))
			.map(|v| return v.round() as u32);

		return Self {
			has_audio: has_codec(value.acodec.as_deref()),
			has_video: has_codec(value.vcodec.as_deref()),
			audio_bitrate_kbps: value.abr,
			height_px,
			container: value.ext.unwrap_or_default(),
		};
	}
}
