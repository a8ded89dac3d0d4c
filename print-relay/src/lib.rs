//! # print-relay
//!
//! Receives print jobs as ordered lists of declarative commands and plays
//! them against a network thermal printer.
//!
//! ## Layers
//!
//! - [`params`] - compound parameter strings (`"content, key=value, ..."`)
//! - [`coerce`] - coerce-or-default for loosely typed values
//! - [`command`] - raw command entries and their typed form
//! - [`dispatch`] - runs one command against a printer session
//! - [`job`] - connection lifecycle of a whole job
//! - [`fetch`] - image downloads and temporary files
//! - [`api`] - REST surface
//!
//! Printer I/O and ESC/POS encoding live in `crab_printer`.

pub mod api;
pub mod coerce;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod job;
pub mod logger;
pub mod params;

pub use command::{Command, CommandMap, ImageSource, PrintCommand};
pub use config::Config;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{CleanupError, DispatchError, FetchError, JobError, ParamError};
pub use fetch::{HttpFetcher, ImageFetcher, TempAsset};
pub use job::{JobReport, JobRunner, JobState, PrintJobRequest, RunnerSettings};
pub use params::{ParamValue, ParameterMap};
