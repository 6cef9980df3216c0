use super::spreadsheet::read_workbook;
use super::{FlatFormat, SourceOptions};
use crate::error::{DashError, Result};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// Reads and parses a flat file, detecting the format from its extension.
///
/// # Errors
///
/// `Io` if the file cannot be read, `Format` if its content does not parse.
pub fn load_file(path: &Path, options: &SourceOptions) -> Result<DataFrame> {
    let format = FlatFormat::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|e| {
        DashError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })?;

    let df = read_flat(bytes, format, options)?;
    tracing::info!(
        "Loaded {} ({} rows, {} columns)",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

/// Parses an in-memory upload buffer.
///
/// A column with no values at all comes back as `Float64`, whatever the
/// reader guessed for it.
///
/// # Errors
///
/// `Format` if the content does not parse as `format`.
pub fn read_flat(bytes: Vec<u8>, format: FlatFormat, options: &SourceOptions) -> Result<DataFrame> {
    let cursor = Cursor::new(bytes);

    let parsed = match format {
        FlatFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(options.infer_schema_length)
            .into_reader_with_file_handle(cursor)
            .finish(),
        FlatFormat::Parquet => ParquetReader::new(cursor).finish(),
        FlatFormat::Json => JsonReader::new(cursor).finish(),
        FlatFormat::Spreadsheet => return read_workbook(cursor.into_inner()),
    };

    let df = parsed
        .map_err(|e| DashError::Format(format!("Failed to parse {}: {e}", format.as_str())))?;
    empty_columns_as_float(df)
}

fn empty_columns_as_float(mut df: DataFrame) -> Result<DataFrame> {
    let height = df.height();
    if height == 0 {
        return Ok(df);
    }

    let empty: Vec<PlSmallStr> = df
        .get_columns()
        .iter()
        .filter(|c| c.null_count() == height && c.dtype() != &DataType::Float64)
        .map(|c| c.name().clone())
        .collect();

    for name in empty {
        let cast = df
            .column(&name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        tracing::debug!("Column '{}' has no values, reading it as Float64", name);
        df.with_column(cast)?;
    }
    Ok(df)
}

/// Writes a table as Parquet when the extension says so, CSV otherwise.
///
/// # Errors
///
/// `Io` if the file cannot be created, `DataProcessing` if serialization fails.
pub fn save_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    let file = std::fs::File::create(path)?;
    if ext.as_str() == "parquet" {
        ParquetWriter::new(file).finish(df)?;
    } else {
        CsvWriter::new(file).include_header(true).finish(df)?;
    }

    tracing::info!("Saved {} rows to {}", df.height(), path.display());
    Ok(())
}
