//! First-sheet reads from workbook files (`xlsx`, `xlsm`, `xlsb`, `xls`, `ods`).
//!
//! The first row of the sheet's used range holds the column names. Every
//! column is then typed from the cells beneath it the same way SQLite columns
//! are; an empty column becomes `Float64`.

use super::cells::{Cell, build_column};
use crate::error::{DashError, Result};
use calamine::{Data, Reader as _, open_workbook_auto_from_rs};
use polars::prelude::*;
use std::io::Cursor;

/// Parses the first worksheet of an in-memory workbook.
///
/// # Errors
///
/// `Format` if the bytes are not a workbook, the workbook has no sheet, or
/// two header cells carry the same name.
pub fn read_workbook(bytes: Vec<u8>) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| DashError::Format(format!("Failed to open workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DashError::Format("workbook has no worksheets".to_owned()))?
        .map_err(|e| DashError::Format(format!("Failed to read first worksheet: {e}")))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };

    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("column_{}", i + 1),
            other => other.to_string(),
        })
        .collect();

    let mut cells: Vec<Vec<Cell>> = vec![Vec::with_capacity(range.height()); names.len()];
    for row in rows {
        for (column, value) in cells.iter_mut().zip(row) {
            column.push(to_cell(value));
        }
    }

    let columns: Vec<Column> = names
        .iter()
        .zip(cells)
        .map(|(name, values)| build_column(name, values, true))
        .collect();

    DataFrame::new(columns)
        .map_err(|e| DashError::Format(format!("Failed to tabulate worksheet: {e}")))
}

fn to_cell(value: &Data) -> Cell {
    match value {
        Data::Empty | Data::Error(_) => Cell::Null,
        Data::Int(v) => Cell::Int(*v),
        Data::Float(v) => Cell::Real(*v),
        Data::String(v) if v.is_empty() => Cell::Null,
        Data::String(v) => Cell::Text(v.clone()),
        other => Cell::Text(other.to_string()),
    }
}
