use crate::error::Result;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::fmt;

/// One toggleable transformation of a table.
///
/// Implementations must be pure: the input frame is never mutated and the
/// same input with the same parameters always yields the same output.
pub trait Stage {
    /// Short identifier used in lineage records
    fn name(&self) -> &'static str;

    /// Human-readable summary of the configured parameters
    fn description(&self) -> String;

    /// Inactive stages are skipped by the pipeline
    fn is_active(&self) -> bool;

    /// Produce a new table from `df`.
    ///
    /// # Errors
    ///
    /// Stage-specific; see the implementors.
    fn apply(&self, df: &DataFrame) -> Result<StageOutput>;
}

/// Result of applying a stage: the new table plus anything worth telling the
/// user that did not stop the stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub table: DataFrame,
    pub notices: Vec<StageNotice>,
}

/// Non-fatal conditions a stage ran into.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageNotice {
    /// Mean-fill requested but the column has no values to average
    MeanUndefined { column: String },
    /// Normalization skipped because every value is the same
    ConstantColumn { column: String },
    /// Range filter skipped because the column's observed min equals its max
    DegenerateRange { column: String },
}

impl fmt::Display for StageNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MeanUndefined { column } => write!(
                f,
                "'{column}' has no values to average; missing values were left in place"
            ),
            Self::ConstantColumn { column } => {
                write!(f, "'{column}' is constant; normalization left it unchanged")
            }
            Self::DegenerateRange { column } => write!(
                f,
                "'{column}' has a single observed value; its range filter was not applied"
            ),
        }
    }
}
