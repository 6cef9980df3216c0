//! In-memory tables, their typed schemas, and the catalog of loaded sources.
//!
//! A table is a polars [`DataFrame`]; "missing" always means a null cell.

pub mod schema;

pub use schema::{ColumnInfo, ColumnType, TableSchema};

use crate::error::{DashError, Result};
use crate::merge::MergeSpec;
use crate::source::FlatFormat;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where an original table came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TableOrigin {
    File { path: PathBuf, format: FlatFormat },
    Relational { database: PathBuf, table: String },
    Merge { spec: MergeSpec },
    /// Built in memory (tests, programmatic callers)
    InMemory,
}

impl TableOrigin {
    pub fn describe(&self) -> String {
        match self {
            Self::File { path, format } => {
                format!("{} file {}", format.as_str(), path.display())
            }
            Self::Relational { database, table } => {
                format!("table '{table}' of {}", database.display())
            }
            Self::Merge { spec } => format!("merge of {} selections", spec.selections.len()),
            Self::InMemory => "in-memory table".to_owned(),
        }
    }
}

/// Independently loaded tables keyed by identifier, in load order.
#[derive(Clone, Debug, Default)]
pub struct TableCatalog {
    tables: Vec<(String, DataFrame)>,
}

impl TableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the table stored under `name`.
    pub fn insert(&mut self, name: impl Into<String>, table: DataFrame) {
        let name = name.into();
        if let Some(slot) = self.tables.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = table;
        } else {
            self.tables.push((name, table));
        }
    }

    pub fn get(&self, name: &str) -> Option<&DataFrame> {
        self.tables.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// # Errors
    ///
    /// `InvalidSelection` if no table is stored under `name`.
    pub fn require(&self, name: &str) -> Result<&DataFrame> {
        self.get(name)
            .ok_or_else(|| DashError::InvalidSelection(format!("unknown source table '{name}'")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
