//! Column typing for sources that hand over loosely typed cells one at a time
//! (SQLite rows, spreadsheet ranges).

use polars::prelude::*;

/// One loosely typed value as read from the source.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Cell {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
}

/// Builds a column from the values actually present.
///
/// Any text makes the column `String`, integers alone give `Int64`, and any
/// real gives `Float64`. A column of nulls only is `Float64` when
/// `null_as_numeric` is set and `String` otherwise.
pub(crate) fn build_column(name: &str, cells: Vec<Cell>, null_as_numeric: bool) -> Column {
    let has_text = cells.iter().any(|c| matches!(c, Cell::Text(_)));
    let has_real = cells.iter().any(|c| matches!(c, Cell::Real(_)));
    let has_int = cells.iter().any(|c| matches!(c, Cell::Int(_)));

    let series = if has_text {
        let values: Vec<Option<String>> = cells
            .into_iter()
            .map(|c| match c {
                Cell::Null => None,
                Cell::Int(v) => Some(v.to_string()),
                Cell::Real(v) => Some(v.to_string()),
                Cell::Text(v) => Some(v),
            })
            .collect();
        Series::new(name.into(), values)
    } else if has_int && !has_real {
        let values: Vec<Option<i64>> = cells
            .into_iter()
            .map(|c| match c {
                Cell::Int(v) => Some(v),
                _ => None,
            })
            .collect();
        Series::new(name.into(), values)
    } else if has_int || has_real || null_as_numeric {
        let values: Vec<Option<f64>> = cells
            .into_iter()
            .map(|c| match c {
                Cell::Int(v) => Some(v as f64),
                Cell::Real(v) => Some(v),
                _ => None,
            })
            .collect();
        Series::new(name.into(), values)
    } else {
        let values: Vec<Option<String>> = cells.iter().map(|_| None).collect();
        Series::new(name.into(), values)
    };

    Column::from(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_numbers_widen_to_float() {
        let col = build_column("v", vec![Cell::Int(1), Cell::Null, Cell::Real(2.5)], false);
        assert_eq!(col.dtype(), &DataType::Float64);
        assert_eq!(col.null_count(), 1);
    }

    #[test]
    fn test_text_wins() {
        let col = build_column("v", vec![Cell::Int(1), Cell::Text("x".to_owned())], false);
        assert_eq!(col.dtype(), &DataType::String);
    }

    #[test]
    fn test_null_column_fallback() {
        let cells = vec![Cell::Null, Cell::Null];
        assert_eq!(build_column("v", cells.clone(), true).dtype(), &DataType::Float64);
        assert_eq!(build_column("v", cells, false).dtype(), &DataType::String);
    }
}
