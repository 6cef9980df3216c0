//! # datadash - data dashboard core
//!
//! Loads a table from a flat file or a SQLite database, derives a cleaned and
//! filtered view of it, merges column selections from several tables, and
//! keeps named dashboard layouts for the charts drawn from the result.
//!
//! ## Quick Start
//!
//! ```no_run
//! use datadash::pipeline::{CleaningConfig, PipelineConfig, PipelineState};
//! use datadash::source::{self, Origin, SourceOptions};
//!
//! # async fn example() -> datadash::error::Result<()> {
//! let origin = Origin::FlatFile("sales.csv".into());
//! let (table, origin) = source::load(&origin, &SourceOptions::default()).await?;
//!
//! let mut state = PipelineState::new(table, origin);
//! state.recompute(&PipelineConfig {
//!     cleaning: CleaningConfig { drop_missing: true, ..Default::default() },
//!     ..Default::default()
//! })?;
//! println!("{}", state.retention());
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`source`]: flat-file and SQLite loaders
//! - [`table`]: typed schemas, origins and the merge catalog
//! - [`pipeline`]: cleaning and filtering stages, original/derived state
//! - [`merge`]: positional column-wise merge
//! - [`summary`]: overview, describe and filter choices
//! - [`dashboard`]: chart layouts and the saved-dashboard store
//! - [`session`]: event-driven owner of all of the above
//! - [`error`]: error types and handling utilities

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod merge;
pub mod pipeline;
pub mod session;
pub mod source;
pub mod summary;
pub mod table;
pub mod utils;
