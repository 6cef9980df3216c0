//! Full-table reads from a SQLite database file.
//!
//! SQLite columns are dynamically typed, so the polars dtype of each column is
//! decided from the values actually stored: all integers become `Int64`, a mix
//! of integers and reals becomes `Float64`, and any text makes the whole
//! column `String`. A column holding only nulls falls back to its declared
//! affinity.

use super::cells::{Cell, build_column};
use crate::error::{DashError, Result};
use crate::table::TableCatalog;
use polars::prelude::*;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions as _, Connection as _, Row as _, TypeInfo as _, ValueRef as _};
use std::path::Path;

/// Opens an existing database file read-only.
///
/// # Errors
///
/// `Connection` if the file is missing or is not a database.
pub async fn connect(path: &Path) -> Result<SqliteConnection> {
    if !path.is_file() {
        return Err(DashError::Connection(format!(
            "database file {} does not exist",
            path.display()
        )));
    }

    let conn = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .create_if_missing(false)
        .connect()
        .await
        .map_err(|e| DashError::Connection(format!("{}: {e}", path.display())))?;

    tracing::debug!("Opened database {}", path.display());
    Ok(conn)
}

/// Closes `conn`, logging instead of failing when the close handshake errors.
pub async fn close(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close database connection cleanly: {}", e);
    }
}

/// User tables in name order.
///
/// # Errors
///
/// `Connection` if the catalog query fails.
pub async fn list_tables(conn: &mut SqliteConnection) -> Result<Vec<String>> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(names)
}

/// Reads every row of `table`.
///
/// # Errors
///
/// `NotFound` if the table does not exist, `Format` for blob cells,
/// `Connection` if the query fails.
pub async fn load_table(conn: &mut SqliteConnection, table: &str) -> Result<DataFrame> {
    let exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?",
    )
    .bind(table)
    .fetch_one(&mut *conn)
    .await?;
    if exists == 0 {
        return Err(DashError::NotFound(format!("table '{table}'")));
    }

    let declared = declared_columns(conn, table).await?;
    let rows = sqlx::query(&format!("SELECT * FROM {}", quote_ident(table)))
        .fetch_all(&mut *conn)
        .await?;

    let mut columns = Vec::with_capacity(declared.len());
    for (idx, (name, decl_type)) in declared.iter().enumerate() {
        let cells = read_cells(&rows, idx, name)?;
        columns.push(build_column(name, cells, numeric_affinity(decl_type)));
    }

    let df = DataFrame::new(columns)?;
    tracing::info!(
        "Loaded table '{}' ({} rows, {} columns)",
        table,
        df.height(),
        df.width()
    );
    Ok(df)
}

/// Loads several tables, keyed by table name.
///
/// # Errors
///
/// Fails on the first table that cannot be loaded.
pub async fn load_catalog(conn: &mut SqliteConnection, tables: &[String]) -> Result<TableCatalog> {
    let mut catalog = TableCatalog::new();
    for table in tables {
        let df = load_table(conn, table).await?;
        catalog.insert(table.clone(), df);
    }
    Ok(catalog)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

async fn declared_columns(conn: &mut SqliteConnection, table: &str) -> Result<Vec<(String, String)>> {
    let rows = sqlx::query(&format!("PRAGMA table_info({})", quote_ident(table)))
        .fetch_all(&mut *conn)
        .await?;

    rows.iter()
        .map(|row| {
            let name: String = row.try_get("name")?;
            let decl: String = row.try_get("type")?;
            Ok((name, decl))
        })
        .collect()
}

fn read_cells(rows: &[SqliteRow], idx: usize, name: &str) -> Result<Vec<Cell>> {
    rows.iter()
        .map(|row| {
            let raw = row.try_get_raw(idx)?;
            if raw.is_null() {
                return Ok(Cell::Null);
            }
            let storage = raw.type_info().name().to_owned();
            match storage.as_str() {
                "INTEGER" | "BOOLEAN" => Ok(Cell::Int(row.try_get::<i64, _>(idx)?)),
                "REAL" => Ok(Cell::Real(row.try_get::<f64, _>(idx)?)),
                "TEXT" => Ok(Cell::Text(row.try_get::<String, _>(idx)?)),
                other => Err(DashError::Format(format!(
                    "column '{name}' holds {other} values which cannot be tabulated"
                ))),
            }
        })
        .collect()
}

fn numeric_affinity(decl_type: &str) -> bool {
    let decl = decl_type.to_uppercase();
    ["INT", "REAL", "FLOA", "DOUB", "NUM", "DEC"]
        .iter()
        .any(|needle| decl.contains(needle))
}
