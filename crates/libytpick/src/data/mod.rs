//! Module for all the data structures used by the library

pub mod job;
pub mod metadata;
pub mod quality;
pub mod stream;
