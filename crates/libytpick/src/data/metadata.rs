//! Module containing [`MediaMetadata`]

use serde::Deserialize;

use super::stream::StreamDescriptor;

/// Title to use when youtube-dl did not provide one
pub const FALLBACK_TITLE: &str = "could-not-retrieve-title";

/// The decoded result of a metadata fetch
#[derive(Debug, Clone, PartialEq)]
pub struct MediaMetadata {
	/// Title of the media, may be empty if youtube-dl did not report one
	pub title:   String,
	/// All formats youtube-dl reported
	pub formats: Vec<StreamDescriptor>,
}

/// Raw "youtube-dl -J" output, either a single media or a playlist
#[derive(Debug, Deserialize)]
struct YtdlInfoJson {
	title:   Option<String>,
	formats: Option<Vec<StreamDescriptor>>,
	// youtube-dl reports unavailable playlist entries as "null"
	entries: Option<Vec<Option<YtdlInfoJson>>>,
}

impl MediaMetadata {
	/// Decode the output of "youtube-dl -J"
	/// If the output is a playlist, only the first entry is used
	pub fn from_json<I: AsRef<str>>(input: I) -> Result<Self, crate::Error> {
		let mut parsed: YtdlInfoJson = serde_json::from_str(input.as_ref())?;

		if let Some(entries) = parsed.entries.take() {
			debug!("Info is a playlist with {} entries, using the first one", entries.len());
			let Some(first) = entries.into_iter().flatten().next() else {
				return Err(crate::Error::other("Playlist did not contain any entries"));
			};
			parsed = first;
		}

		return Ok(Self {
			title:   parsed.title.unwrap_or_default(),
			formats: parsed.formats.unwrap_or_default(),
		});
	}

	/// Get the title, or [`FALLBACK_TITLE`] if the title is empty
	pub fn title_or_fallback(&self) -> &str {
		if self.title.trim().is_empty() {
			return FALLBACK_TITLE;
		}

		return &self.title;
	}
}
