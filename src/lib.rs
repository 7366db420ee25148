#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
//! # Spartan Reset
//!
//! A scheduled maintenance service for the spartans backend: once a day it
//! wipes the `spartans` table, reloads seed data from an external SQL file,
//! and resyncs the table's identity sequence.
//!
//! The crate is a library plus a thin CLI. The binary owns the process
//! lifecycle: resolve the environment, load configuration, initialize the
//! logger, connect to the database and either run the reset once or hand the
//! job to the [`scheduler::Scheduler`] which fires it on its cron schedule.
pub use self::errors::Error;

pub mod config;
pub mod db;
pub mod environment;
pub mod errors;
mod logger;
pub mod scheduler;
pub mod task;

pub use logger::init as init_logger;

/// Application results options list
pub type Result<T> = std::result::Result<T, Error>;
