//! Module for all the main functionality in the library (to keep everything sorted)
pub mod directory;
pub mod download;
pub mod fetch;
pub mod session;
