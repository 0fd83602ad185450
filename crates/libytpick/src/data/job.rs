//! Module for compiling a users choice into a [`JobDescriptor`]

use std::path::{
	Path,
	PathBuf,
};

use super::quality::QualitySelection;

/// The container all video jobs are merged into
pub const VIDEO_CONTAINER: &str = "mp4";
/// The audio container preferred when merging into [`VIDEO_CONTAINER`]
pub const VIDEO_AUDIO_CONTAINER: &str = "m4a";
/// The codec audio jobs are extracted into
pub const AUDIO_CODEC: &str = "mp3";

/// The kind of media to download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
	/// Audio only, extracted into [`AUDIO_CODEC`]
	Audio,
	/// Video with audio, merged into [`VIDEO_CONTAINER`]
	Video,
}

impl TargetKind {
	/// Get the extension of the final file
	pub fn final_extension(&self) -> &'static str {
		return match self {
			Self::Audio => AUDIO_CODEC,
			Self::Video => VIDEO_CONTAINER,
		};
	}
}

impl std::str::FromStr for TargetKind {
	type Err = crate::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		return match s.trim().to_lowercase().as_str() {
			"audio" | "mp3" => Ok(Self::Audio),
			"video" | "mp4" => Ok(Self::Video),
			_ => Err(crate::Error::invalid_format(s)),
		};
	}
}

impl std::fmt::Display for TargetKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		return match self {
			Self::Audio => write!(f, "audio"),
			Self::Video => write!(f, "video"),
		};
	}
}

/// A single step youtube-dl (via ffmpeg) has to do after downloading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessStep {
	/// Merge all downloaded streams into the given container
	MergeInto { container: String },
	/// Extract the audio into the given codec, optionally with a bitrate
	ExtractAudio { codec: String, bitrate_kbps: Option<u32> },
}

/// The fully resolved description of one download
///
/// Can only be created with [`compile`] or [`compile_kind`], and is immutable afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
	source_url:       String,
	target_kind:      TargetKind,
	quality:          QualitySelection,
	title:            String,
	output_directory: PathBuf,
	stream_filter:    String,
	post_process:     Vec<PostProcessStep>,
	cleanup_required: bool,
}

impl JobDescriptor {
	/// Get the URL to download
	pub fn source_url(&self) -> &str {
		return &self.source_url;
	}

	/// Get the kind of media that will be produced
	pub fn target_kind(&self) -> TargetKind {
		return self.target_kind;
	}

	/// Get the quality that was chosen
	pub fn quality(&self) -> QualitySelection {
		return self.quality;
	}

	/// Get the title, which is used as the file name
	pub fn title(&self) -> &str {
		return &self.title;
	}

	/// Get the directory the output will be placed in
	/// Empty until [`Self::with_output_directory`] is used
	pub fn output_directory(&self) -> &Path {
		return &self.output_directory;
	}

	/// Get the youtube-dl format selection expression
	pub fn stream_filter_expression(&self) -> &str {
		return &self.stream_filter;
	}

	/// Get the ordered post-processing steps
	pub fn post_process_pipeline(&self) -> &[PostProcessStep] {
		return &self.post_process;
	}

	/// Get whether intermediate files need to be cleaned-up after the job
	pub fn cleanup_required(&self) -> bool {
		return self.cleanup_required;
	}

	/// Get the youtube-dl output template, "%" in the title is escaped so that the file name is the title verbatim
	pub fn output_template(&self) -> PathBuf {
		return self
			.output_directory
			.join(format!("{}.%(ext)s", self.title.replace('%', "%%")));
	}

	/// Get the path the final file is expected at
	pub fn expected_output_path(&self) -> PathBuf {
		return self
			.output_directory
			.join(format!("{}.{}", self.title, self.target_kind.final_extension()));
	}

	/// Bind this job to a output directory, returning a new descriptor
	#[must_use]
	pub fn with_output_directory<P: AsRef<Path>>(&self, directory: P) -> Self {
		return Self {
			output_directory: directory.as_ref().to_owned(),
			..self.clone()
		};
	}
}

/// Compile a format tag, raw quality string, title and url into a [`JobDescriptor`]
///
/// Fails with [`crate::error::ErrorInner::InvalidFormat`] if the tag is neither audio nor video,
/// and with [`crate::error::ErrorInner::EmptyTitle`] if the title is empty
pub fn compile<T, Q, N, U>(target_kind_tag: T, quality: Q, title: N, url: U) -> Result<JobDescriptor, crate::Error>
where
	T: AsRef<str>,
	Q: AsRef<str>,
	N: AsRef<str>,
	U: AsRef<str>,
{
	let kind: TargetKind = target_kind_tag.as_ref().parse()?;

	return compile_kind(kind, quality, title, url);
}

/// Same as [`compile`], just with a already parsed [`TargetKind`]
pub fn compile_kind<Q, N, U>(kind: TargetKind, quality: Q, title: N, url: U) -> Result<JobDescriptor, crate::Error>
where
	Q: AsRef<str>,
	N: AsRef<str>,
	U: AsRef<str>,
{
	let title = title.as_ref();

	if title.trim().is_empty() {
		return Err(crate::Error::empty_title());
	}

	let quality = QualitySelection::parse(quality);

	let (stream_filter, post_process, cleanup_required) = match kind {
		TargetKind::Video => {
			let filter = match quality.height() {
				Some(height) => format!(
					"bestvideo[height<={height}][ext={VIDEO_CONTAINER}]+bestaudio[ext={VIDEO_AUDIO_CONTAINER}]/best[ext={VIDEO_CONTAINER}]/best"
				),
				None => format!(
					"bestvideo[ext={VIDEO_CONTAINER}]+bestaudio[ext={VIDEO_AUDIO_CONTAINER}]/best[ext={VIDEO_CONTAINER}]/best"
				),
			};

			(
				filter,
				vec![PostProcessStep::MergeInto {
					container: VIDEO_CONTAINER.to_owned(),
				}],
				true,
			)
		},
		TargetKind::Audio => (
			"bestaudio/best".to_owned(),
			vec![PostProcessStep::ExtractAudio {
				codec:        AUDIO_CODEC.to_owned(),
				bitrate_kbps: quality.bitrate(),
			}],
			false,
		),
	};

	// a quality that does not apply to the kind (like "128kbps" for video) is treated as best
	let quality = match (kind, quality) {
		(TargetKind::Video, QualitySelection::Explicit(super::quality::Quality::Height(_)))
		| (TargetKind::Audio, QualitySelection::Explicit(super::quality::Quality::Bitrate(_))) => quality,
		_ => QualitySelection::Best,
	};

	return Ok(JobDescriptor {
		source_url: url.as_ref().to_owned(),
		target_kind: kind,
		quality,
		title: title.to_owned(),
		output_directory: PathBuf::new(),
		stream_filter,
		post_process,
		cleanup_required,
	});
}
