//! Derivation of the working table from the original.
//!
//! Two stages run in a fixed order on a copy of the original table:
//!
//! 1. [`CleaningConfig`]: drop rows with missing values, fill numeric gaps with
//!    the column mean, drop duplicates, min-max normalize.
//! 2. [`FilterConfig`]: category membership and inclusive numeric ranges,
//!    combined conjunctively.
//!
//! [`PipelineState`] owns the original and replaces the derived table
//! wholesale on every [`PipelineState::recompute`].
//!
//! ```no_run
//! use datadash::pipeline::{CleaningConfig, PipelineConfig, PipelineState};
//! use datadash::table::TableOrigin;
//! use polars::prelude::*;
//!
//! let df = df!("v" => &[Some(1.0), None, Some(3.0)])?;
//! let mut state = PipelineState::new(df, TableOrigin::InMemory);
//! let config = PipelineConfig {
//!     cleaning: CleaningConfig { fill_mean: true, ..Default::default() },
//!     ..Default::default()
//! };
//! state.recompute(&config)?;
//! println!("{}", state.retention());
//! # Ok::<(), datadash::error::DashError>(())
//! ```

pub mod cleaning;
pub mod filtering;
pub mod stage;
pub mod state;

pub use cleaning::{CleaningConfig, clean_table};
pub use filtering::{CategoryFilter, FilterConfig, NumericRange, NumericRangeFilter, filter_table};
pub use stage::{Stage, StageNotice, StageOutput};
pub use state::{PipelineConfig, PipelineState, Retention};
