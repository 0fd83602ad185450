//! Module for all (longer) commands

pub mod completions;
pub mod download;
pub mod info;
