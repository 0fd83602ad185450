//! Module for the traits callers have to implement to use the main functions

pub mod directory_prompt;
pub mod options;
pub mod report;
