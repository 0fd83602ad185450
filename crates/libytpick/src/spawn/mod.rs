//! Module for spawning the external binaries this library depends on

pub mod ffmpeg;
pub mod multiplatform;
pub mod ytdl;
