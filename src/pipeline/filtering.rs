use super::stage::{Stage, StageNotice, StageOutput};
use crate::error::{DashError, Result};
use crate::table::{ColumnType, TableSchema};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Accepted values per categorical column. An empty set places no
/// restriction on its column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryFilter {
    columns: BTreeMap<String, BTreeSet<String>>,
}

impl CategoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.set(column, values);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        self.columns.insert(column.into(), values);
    }

    pub fn clear(&mut self, column: &str) {
        self.columns.remove(column);
    }

    pub fn accepted(&self, column: &str) -> Option<&BTreeSet<String>> {
        self.columns.get(column)
    }

    /// Columns whose accepted-value set is non-empty.
    pub fn constraints(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.columns
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(column, values)| (column.as_str(), values))
    }

    pub fn is_empty(&self) -> bool {
        self.constraints().next().is_none()
    }
}

/// Inclusive `[min, max]` bound.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    min: f64,
    max: f64,
}

impl NumericRange {
    /// # Errors
    ///
    /// `InvalidSelection` if a bound is not finite or `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(DashError::InvalidSelection(format!(
                "range bounds must be finite, got [{min}, {max}]"
            )));
        }
        if min > max {
            return Err(DashError::InvalidSelection(format!(
                "range minimum {min} exceeds maximum {max}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, v: f64) -> bool {
        self.min <= v && v <= self.max
    }
}

/// Inclusive bounds per numeric column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericRangeFilter {
    ranges: BTreeMap<String, NumericRange>,
}

impl NumericRangeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, range: NumericRange) -> Self {
        self.set(column, range);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, range: NumericRange) {
        self.ranges.insert(column.into(), range);
    }

    pub fn clear(&mut self, column: &str) {
        self.ranges.remove(column);
    }

    pub fn get(&self, column: &str) -> Option<&NumericRange> {
        self.ranges.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NumericRange)> {
        self.ranges.iter().map(|(c, r)| (c.as_str(), r))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Both row filters; they combine conjunctively.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub categories: CategoryFilter,
    pub ranges: NumericRangeFilter,
}

impl FilterConfig {
    pub fn is_enabled(&self) -> bool {
        !self.categories.is_empty() || !self.ranges.is_empty()
    }
}

impl Stage for FilterConfig {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn description(&self) -> String {
        let mut parts = Vec::new();
        for (column, values) in self.categories.constraints() {
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            parts.push(format!("{column} in {{{}}}", values.join(", ")));
        }
        for (column, range) in self.ranges.iter() {
            parts.push(format!("{} <= {column} <= {}", range.min, range.max));
        }
        format!("Filter: {}", parts.join(" AND "))
    }

    fn is_active(&self) -> bool {
        self.is_enabled()
    }

    fn apply(&self, df: &DataFrame) -> Result<StageOutput> {
        filter_table(df, self)
    }
}

/// Keeps the rows that satisfy every configured constraint.
///
/// All masks are evaluated against `df` itself, so the result does not depend
/// on the order constraints are listed in. A range on a column whose observed
/// minimum equals its observed maximum is skipped: with a single observed
/// value, the slider the range came from cannot express a restriction.
///
/// # Errors
///
/// `InvalidSelection` for absent columns, `Type` for a category filter on a
/// non-categorical column or a range on a non-numeric one.
pub fn filter_table(df: &DataFrame, config: &FilterConfig) -> Result<StageOutput> {
    let schema = TableSchema::of(df);
    let mut mask = BooleanChunked::full("mask".into(), true, df.height());
    let mut notices = Vec::new();

    for (column, accepted) in config.categories.constraints() {
        schema.require(column, ColumnType::Categorical)?;
        let matches = category_mask(df, column, accepted)?;
        mask = &mask & &matches;
    }

    for (column, range) in config.ranges.iter() {
        schema.require(column, ColumnType::Numeric)?;
        match range_mask(df, column, range)? {
            Some(matches) => mask = &mask & &matches,
            None => {
                tracing::debug!("Range filter on '{}' skipped: degenerate column", column);
                notices.push(StageNotice::DegenerateRange {
                    column: column.to_owned(),
                });
            }
        }
    }

    let table = df.filter(&mask)?;
    tracing::debug!("Filtered {} rows down to {}", df.height(), table.height());
    Ok(StageOutput { table, notices })
}

fn category_mask(df: &DataFrame, column: &str, accepted: &BTreeSet<String>) -> Result<BooleanChunked> {
    let values = df
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let mask: BooleanChunked = values
        .str()?
        .into_iter()
        .map(|v| v.is_some_and(|v| accepted.contains(v)))
        .collect();
    Ok(mask)
}

/// `None` when the column's observed range is degenerate (or it has no values).
fn range_mask(df: &DataFrame, column: &str, range: &NumericRange) -> Result<Option<BooleanChunked>> {
    let values = df
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let values = values.f64()?;

    match (values.min(), values.max()) {
        (Some(lo), Some(hi)) if lo < hi => {
            let mask: BooleanChunked = values
                .into_iter()
                .map(|v| v.is_some_and(|v| range.contains(v)))
                .collect();
            Ok(Some(mask))
        }
        _ => Ok(None),
    }
}
