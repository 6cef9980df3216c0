//! Materializing tables from external origins.
//!
//! Two kinds of origin are supported:
//!
//! - **Flat files** ([`file`]): CSV, Parquet and JSON, parsed in one pass
//!   with polars readers, and workbooks ([`spreadsheet`]) whose first sheet
//!   is read with calamine.
//! - **Relational tables** ([`relational`]): a full `SELECT *` read from a
//!   SQLite database file through `sqlx`.
//!
//! Neither keeps anything open after returning: the loaded table is the only
//! result.

mod cells;
pub mod file;
pub mod relational;
pub mod spreadsheet;

pub use file::{load_file, read_flat, save_table};
pub use relational::{close, connect, list_tables, load_catalog, load_table};

use crate::config::AppSettings;
use crate::error::{DashError, Result};
use crate::table::TableOrigin;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Flat-file formats understood by [`load_file`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlatFormat {
    Csv,
    Parquet,
    Json,
    /// First worksheet of an `xlsx`, `xlsm`, `xlsb`, `xls` or `ods` workbook
    Spreadsheet,
}

impl FlatFormat {
    /// Detects the format from a file extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// `Format` for any unsupported extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            "json" => Ok(Self::Json),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Spreadsheet),
            _ => Err(DashError::Format(format!(
                "unsupported file extension '{ext}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Parquet => "Parquet",
            Self::Json => "JSON",
            Self::Spreadsheet => "spreadsheet",
        }
    }
}

/// Parser knobs taken from [`AppSettings`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceOptions {
    /// Rows scanned to infer CSV column types; `None` scans everything
    pub infer_schema_length: Option<usize>,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            infer_schema_length: Some(10_000),
        }
    }
}

impl From<&AppSettings> for SourceOptions {
    fn from(settings: &AppSettings) -> Self {
        Self {
            infer_schema_length: settings.infer_schema_length,
        }
    }
}

/// An external origin a table can be loaded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    FlatFile(PathBuf),
    Relational { database: PathBuf, table: String },
}

/// Loads the whole origin into memory.
///
/// Relational origins get a connection scoped to this call: it is opened,
/// used for the full-table read and closed before returning.
///
/// # Errors
///
/// `Format` for unparseable files, `Connection` when the database cannot be
/// opened, `NotFound` when the table does not exist, `Io` when a file cannot
/// be read.
pub async fn load(origin: &Origin, options: &SourceOptions) -> Result<(DataFrame, TableOrigin)> {
    match origin {
        Origin::FlatFile(path) => {
            let format = FlatFormat::from_path(path)?;
            let df = load_file(path, options)?;
            Ok((
                df,
                TableOrigin::File {
                    path: path.clone(),
                    format,
                },
            ))
        }
        Origin::Relational { database, table } => {
            let mut conn = connect(database).await?;
            let loaded = load_table(&mut conn, table).await;
            close(conn).await;
            Ok((
                loaded?,
                TableOrigin::Relational {
                    database: database.clone(),
                    table: table.clone(),
                },
            ))
        }
    }
}
