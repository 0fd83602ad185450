//! Library of "ytpick", contains all the logic needed for the binary
//!
//! The main flow is:
//! 1. fetch the metadata of a url with [`main::fetch::fetch_info`]
//! 2. normalize the available formats into a [`data::quality::QualityCatalog`]
//! 3. compile the users choice into a [`data::job::JobDescriptor`]
//! 4. select a directory with [`main::directory::select_directory`]
//! 5. run the job with [`main::download::execute`] (or [`main::download::spawn_execute`])

#![allow(clippy::needless_return)]
#![allow(special_module_name)] // because of module "main", dont have a better name for that
#![warn(clippy::implicit_return)]

#[macro_use]
extern crate log;

pub mod data;
pub mod error;
pub mod main;
pub mod spawn;
pub mod traits;
pub mod utils;
pub use error::Error;

pub use chrono;
