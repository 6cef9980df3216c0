//! Read-only summaries of a table for the dashboard's overview panels.
//!
//! None of these fail on an empty table: counts are zero and statistics are
//! NaN.

use crate::error::Result;
use crate::table::{ColumnInfo, ColumnType, TableSchema};
use polars::prelude::*;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    /// Null cells across the whole table
    pub missing_values: usize,
}

pub fn overview(df: &DataFrame) -> DatasetOverview {
    DatasetOverview {
        rows: df.height(),
        columns: df.width(),
        missing_values: df.get_columns().iter().map(|c| c.null_count()).sum(),
    }
}

/// Descriptive statistics of one numeric column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnDescription {
    pub name: String,
    /// Non-null values
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (`ddof = 1`)
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// One description per numeric column, in table order.
///
/// # Errors
///
/// Only if a numeric column cannot be cast to `Float64`.
pub fn describe(df: &DataFrame) -> Result<Vec<ColumnDescription>> {
    let schema = TableSchema::of(df);
    let mut out = Vec::new();

    for name in schema.numeric() {
        let series = df
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let ca = series.f64()?;

        out.push(ColumnDescription {
            name: name.to_owned(),
            count: ca.len() - ca.null_count(),
            mean: ca.mean().unwrap_or(f64::NAN),
            std: ca.std(1).unwrap_or(f64::NAN),
            min: ca.min().unwrap_or(f64::NAN),
            q25: ca
                .quantile(0.25, QuantileMethod::Linear)?
                .unwrap_or(f64::NAN),
            median: ca.median().unwrap_or(f64::NAN),
            q75: ca
                .quantile(0.75, QuantileMethod::Linear)?
                .unwrap_or(f64::NAN),
            max: ca.max().unwrap_or(f64::NAN),
        });
    }

    Ok(out)
}

pub fn column_types(df: &DataFrame) -> Vec<ColumnInfo> {
    TableSchema::of(df).columns().to_vec()
}

/// The first `limit` rows.
pub fn preview(df: &DataFrame, limit: usize) -> DataFrame {
    df.head(Some(limit))
}

/// Distinct non-null values of a categorical column, sorted.
///
/// These are the choices a category filter offers.
///
/// # Errors
///
/// `InvalidSelection` for an unknown column, `Type` for a non-categorical one.
pub fn category_options(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    TableSchema::of(df).require(column, ColumnType::Categorical)?;
    let values = df
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::String)?;

    let mut options: Vec<String> = values
        .str()?
        .into_iter()
        .flatten()
        .map(ToOwned::to_owned)
        .collect();
    options.sort();
    options.dedup();
    Ok(options)
}

/// Observed `[min, max]` of a numeric column that a range filter can act on.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RangeBounds {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

/// Bounds of every numeric column whose observed minimum is below its
/// maximum. Constant and all-missing columns are left out, matching the
/// ranges the filter stage would skip anyway.
///
/// # Errors
///
/// Only if a numeric column cannot be cast to `Float64`.
pub fn range_bounds(df: &DataFrame) -> Result<Vec<RangeBounds>> {
    let schema = TableSchema::of(df);
    let mut out = Vec::new();
    for name in schema.numeric() {
        let series = df
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let ca = series.f64()?;
        if let (Some(min), Some(max)) = (ca.min(), ca.max())
            && min < max
        {
            out.push(RangeBounds {
                column: name.to_owned(),
                min,
                max,
            });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashError;

    fn sample() -> Result<DataFrame> {
        Ok(df!(
            "city" => &[Some("Lyon"), Some("Nice"), None, Some("Lyon")],
            "score" => &[Some(1.0), Some(2.0), Some(3.0), None],
            "flat" => &[4, 4, 4, 4]
        )?)
    }

    #[test]
    fn test_overview_counts_missing_cells() -> Result<()> {
        let o = overview(&sample()?);
        assert_eq!(o.rows, 4);
        assert_eq!(o.columns, 3);
        assert_eq!(o.missing_values, 2);
        Ok(())
    }

    #[test]
    fn test_describe_numeric_columns() -> Result<()> {
        let stats = describe(&sample()?)?;
        assert_eq!(stats.len(), 2);

        let score = &stats[0];
        assert_eq!(score.name, "score");
        assert_eq!(score.count, 3);
        assert_eq!(score.mean, 2.0);
        assert_eq!(score.std, 1.0);
        assert_eq!(score.min, 1.0);
        assert_eq!(score.q25, 1.5);
        assert_eq!(score.median, 2.0);
        assert_eq!(score.q75, 2.5);
        assert_eq!(score.max, 3.0);
        Ok(())
    }

    #[test]
    fn test_describe_after_filtering_to_zero_rows() -> Result<()> {
        let empty = sample()?.head(Some(0));
        let stats = describe(&empty)?;
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].count, 0);
        assert!(stats[0].mean.is_nan());
        assert!(stats[0].median.is_nan());
        assert!(stats[1].max.is_nan());
        assert_eq!(overview(&empty).rows, 0);
        Ok(())
    }

    #[test]
    fn test_preview_limits_rows() -> Result<()> {
        let df = sample()?;
        assert_eq!(preview(&df, 2).height(), 2);
        assert_eq!(preview(&df, 50).height(), 4);
        Ok(())
    }

    #[test]
    fn test_column_types() -> Result<()> {
        let types = column_types(&sample()?);
        let kinds: Vec<ColumnType> = types.iter().map(|c| c.column_type).collect();
        assert_eq!(
            kinds,
            vec![ColumnType::Categorical, ColumnType::Numeric, ColumnType::Numeric]
        );
        Ok(())
    }

    #[test]
    fn test_category_options_skip_missing() -> Result<()> {
        let df = sample()?;
        assert_eq!(category_options(&df, "city")?, vec!["Lyon", "Nice"]);
        assert!(matches!(
            category_options(&df, "score"),
            Err(DashError::Type(_))
        ));
        Ok(())
    }

    #[test]
    fn test_range_bounds_skip_constant_columns() -> Result<()> {
        let bounds = range_bounds(&sample()?)?;
        assert_eq!(
            bounds,
            vec![RangeBounds {
                column: "score".to_owned(),
                min: 1.0,
                max: 3.0
            }]
        );
        Ok(())
    }
}
