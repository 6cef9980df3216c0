//! Column-wise concatenation of tables by row position.
//!
//! There is no key matching: row `i` of every selection lands in row `i` of
//! the result. Sources with different row counts are rejected up front rather
//! than truncated or padded.

use crate::error::{DashError, Result};
use crate::table::TableCatalog;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Columns taken from one catalog table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSelection {
    pub source: String,
    pub columns: Vec<String>,
}

impl MergeSelection {
    pub fn new(source: impl Into<String>, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            source: source.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered selections; the first one supplies the leftmost columns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSpec {
    pub selections: Vec<MergeSelection>,
}

impl MergeSpec {
    pub fn new(selections: Vec<MergeSelection>) -> Self {
        Self { selections }
    }

    pub fn with(mut self, selection: MergeSelection) -> Self {
        self.selections.push(selection);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

/// Builds one wide table from the selections in `spec`.
///
/// A column whose name was already taken by an earlier selection is renamed
/// `<source>.<column>`.
///
/// # Errors
///
/// - `InvalidSelection` for an empty spec, a selection without columns, an
///   unknown source or column, or a name clash that qualification cannot fix
/// - `RowCountMismatch` when the selected sources differ in row count
pub fn merge(spec: &MergeSpec, catalog: &TableCatalog) -> Result<DataFrame> {
    let Some(first) = spec.selections.first() else {
        return Err(DashError::InvalidSelection(
            "merge needs at least one selection".to_owned(),
        ));
    };

    let mut sources = Vec::with_capacity(spec.selections.len());
    for selection in &spec.selections {
        if selection.columns.is_empty() {
            return Err(DashError::InvalidSelection(format!(
                "no columns selected from '{}'",
                selection.source
            )));
        }
        let table = catalog.require(&selection.source)?;
        for column in &selection.columns {
            if table.column(column).is_err() {
                return Err(DashError::InvalidSelection(format!(
                    "'{}' has no column '{column}'",
                    selection.source
                )));
            }
        }
        sources.push((selection, table));
    }

    let expected = catalog.require(&first.source)?.height();
    for (selection, table) in &sources {
        if table.height() != expected {
            return Err(DashError::RowCountMismatch {
                source: selection.source.clone(),
                expected,
                found: table.height(),
            });
        }
    }

    let mut taken: HashSet<String> = HashSet::new();
    let mut columns: Vec<Column> = Vec::new();
    for (selection, table) in &sources {
        for name in &selection.columns {
            let output_name = if taken.contains(name) {
                let qualified = format!("{}.{name}", selection.source);
                if taken.contains(&qualified) {
                    return Err(DashError::InvalidSelection(format!(
                        "column '{name}' of '{}' is selected more than once",
                        selection.source
                    )));
                }
                tracing::debug!("Column '{}' already taken, using '{}'", name, qualified);
                qualified
            } else {
                name.clone()
            };

            let mut series = table.column(name)?.as_materialized_series().clone();
            series.rename(output_name.as_str().into());
            columns.push(Column::from(series));
            taken.insert(output_name);
        }
    }

    let merged = DataFrame::new(columns)?;
    tracing::info!(
        "Merged {} selections into {} rows, {} columns",
        spec.selections.len(),
        merged.height(),
        merged.width()
    );
    Ok(merged)
}
