use super::cleaning::CleaningConfig;
use super::filtering::FilterConfig;
use super::stage::{Stage, StageNotice};
use crate::error::{Result, ResultExt as _};
use crate::table::{TableOrigin, TableSchema};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything a recompute depends on besides the original table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub cleaning: CleaningConfig,
    pub filters: FilterConfig,
}

impl PipelineConfig {
    /// Stages in application order: cleaning always runs before filtering.
    pub fn stages(&self) -> [&dyn Stage; 2] {
        [&self.cleaning, &self.filters]
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize pipeline config")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize pipeline config")
    }
}

/// Row counts of original and derived tables.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Retention {
    pub original_rows: usize,
    pub derived_rows: usize,
    /// `derived_rows / original_rows * 100`, or 0 for an empty original
    pub percentage: f64,
}

impl Retention {
    pub fn new(original_rows: usize, derived_rows: usize) -> Self {
        let percentage = if original_rows == 0 {
            0.0
        } else {
            derived_rows as f64 / original_rows as f64 * 100.0
        };
        Self {
            original_rows,
            derived_rows,
            percentage,
        }
    }
}

impl fmt::Display for Retention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} rows kept ({:.1}%)",
            self.derived_rows, self.original_rows, self.percentage
        )
    }
}

/// The original table of a session and the table derived from it.
///
/// `derived` is never patched: every recompute starts again from `original`
/// and replaces it wholesale. Until the first recompute the derived view is
/// the original itself.
#[derive(Debug, Clone)]
pub struct PipelineState {
    origin: TableOrigin,
    original: DataFrame,
    derived: Option<DataFrame>,
    config: PipelineConfig,
    notices: Vec<StageNotice>,
    applied: Vec<String>,
}

impl PipelineState {
    pub fn new(original: DataFrame, origin: TableOrigin) -> Self {
        tracing::info!(
            "Pipeline original set from {} ({} rows, {} columns)",
            origin.describe(),
            original.height(),
            original.width()
        );
        Self {
            origin,
            original,
            derived: None,
            config: PipelineConfig::default(),
            notices: Vec::new(),
            applied: Vec::new(),
        }
    }

    /// Replaces the original; the derived table must be recomputed before it
    /// differs from the new original again.
    pub fn set_original(&mut self, original: DataFrame, origin: TableOrigin) {
        *self = Self::new(original, origin);
    }

    /// Re-derives from the original with `config`.
    ///
    /// On error nothing changes: the previous derived table, configuration,
    /// notices and lineage are kept.
    ///
    /// # Errors
    ///
    /// Any stage error (`Type`, `InvalidSelection`, `DataProcessing`).
    pub fn recompute(&mut self, config: &PipelineConfig) -> Result<&DataFrame> {
        let mut table = self.original.clone();
        let mut notices = Vec::new();
        let mut applied = Vec::new();

        for stage in config.stages() {
            if !stage.is_active() {
                continue;
            }
            let output = stage.apply(&table)?;
            tracing::debug!(
                "Stage '{}' produced {} rows",
                stage.name(),
                output.table.height()
            );
            table = output.table;
            notices.extend(output.notices);
            applied.push(stage.description());
        }

        for notice in &notices {
            tracing::warn!("{}", notice);
        }

        let retention = Retention::new(self.original.height(), table.height());
        tracing::info!("Recomputed derived table: {}", retention);

        self.config = config.clone();
        self.notices = notices;
        self.applied = applied;
        Ok(self.derived.insert(table))
    }

    pub fn origin(&self) -> &TableOrigin {
        &self.origin
    }

    pub fn original(&self) -> &DataFrame {
        &self.original
    }

    /// The derived table, or the original when nothing has been derived yet.
    pub fn derived(&self) -> &DataFrame {
        self.derived.as_ref().unwrap_or(&self.original)
    }

    pub fn is_derived(&self) -> bool {
        self.derived.is_some()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn notices(&self) -> &[StageNotice] {
        &self.notices
    }

    /// Descriptions of the stages that produced the derived table, in order.
    pub fn applied(&self) -> &[String] {
        &self.applied
    }

    pub fn schema(&self) -> TableSchema {
        TableSchema::of(&self.original)
    }

    pub fn derived_schema(&self) -> TableSchema {
        TableSchema::of(self.derived())
    }

    pub fn retention(&self) -> Retention {
        Retention::new(self.original.height(), self.derived().height())
    }
}
