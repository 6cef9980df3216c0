use super::stage::{Stage, StageNotice, StageOutput};
use crate::error::Result;
use crate::table::{ColumnType, TableSchema};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Independent cleaning toggles.
///
/// The toggles are applied in a fixed order regardless of how they were set:
/// drop rows with missing values, fill numeric gaps with the column mean,
/// drop duplicate rows, min-max normalize numeric columns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub drop_missing: bool,
    pub fill_mean: bool,
    pub drop_duplicates: bool,
    pub normalize: bool,
    /// Restricts fill/normalize to these columns; `None` means every numeric column
    pub numeric_targets: Option<Vec<String>>,
}

impl CleaningConfig {
    pub fn is_enabled(&self) -> bool {
        self.drop_missing || self.fill_mean || self.drop_duplicates || self.normalize
    }

    fn numeric_columns(&self, df: &DataFrame) -> Result<Vec<String>> {
        let schema = TableSchema::of(df);
        match &self.numeric_targets {
            Some(targets) => {
                for name in targets {
                    schema.require(name, ColumnType::Numeric)?;
                }
                Ok(targets.clone())
            }
            None => Ok(schema.numeric().into_iter().map(ToOwned::to_owned).collect()),
        }
    }
}

impl Stage for CleaningConfig {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn description(&self) -> String {
        let steps: Vec<&str> = [
            (self.drop_missing, "drop rows with missing values"),
            (self.fill_mean, "fill numeric gaps with mean"),
            (self.drop_duplicates, "drop duplicate rows"),
            (self.normalize, "min-max normalize"),
        ]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect();

        match &self.numeric_targets {
            Some(targets) => format!("Clean: {} (numeric: {})", steps.join(", "), targets.join(", ")),
            None => format!("Clean: {}", steps.join(", ")),
        }
    }

    fn is_active(&self) -> bool {
        self.is_enabled()
    }

    fn apply(&self, df: &DataFrame) -> Result<StageOutput> {
        clean_table(df, self)
    }
}

/// Applies the enabled cleaning steps to a copy of `df`.
///
/// # Errors
///
/// `Type` if `numeric_targets` names a column that is not numeric,
/// `InvalidSelection` if it names an absent column.
pub fn clean_table(df: &DataFrame, config: &CleaningConfig) -> Result<StageOutput> {
    // Checked up front so a bad target fails before any work is done.
    if config.fill_mean || config.normalize {
        config.numeric_columns(df)?;
    }

    let mut out = df.clone();
    let mut notices = Vec::new();

    if config.drop_missing {
        out = drop_missing_rows(&out)?;
        tracing::debug!("Dropped rows with missing values: {} rows remain", out.height());
    }

    if config.fill_mean {
        for name in config.numeric_columns(&out)? {
            if let Some(notice) = fill_with_mean(&mut out, &name)? {
                notices.push(notice);
            }
        }
    }

    if config.drop_duplicates {
        out = out.unique_stable(None, UniqueKeepStrategy::First, None)?;
        tracing::debug!("Dropped duplicate rows: {} rows remain", out.height());
    }

    if config.normalize {
        for name in config.numeric_columns(&out)? {
            if let Some(notice) = normalize_min_max(&mut out, &name)? {
                notices.push(notice);
            }
        }
    }

    Ok(StageOutput {
        table: out,
        notices,
    })
}

/// Keeps only the rows where every column is non-null.
pub fn drop_missing_rows(df: &DataFrame) -> Result<DataFrame> {
    let mut mask = BooleanChunked::full("mask".into(), true, df.height());
    for col in df.get_columns() {
        if col.null_count() > 0 {
            let present = col.as_materialized_series().is_not_null();
            mask = &mask & &present;
        }
    }
    Ok(df.filter(&mask)?)
}

fn numeric_values(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.clone())
}

/// Replaces nulls in `name` with the mean of its present values.
///
/// A column with no present values has no mean; it is left as is and the
/// returned notice says so.
pub fn fill_with_mean(df: &mut DataFrame, name: &str) -> Result<Option<StageNotice>> {
    let values = numeric_values(df, name)?;
    if values.null_count() == 0 {
        return Ok(None);
    }

    let Some(mean) = values.mean() else {
        tracing::warn!("Mean of '{}' is undefined, leaving missing values", name);
        return Ok(Some(StageNotice::MeanUndefined {
            column: name.to_owned(),
        }));
    };

    let filled: Float64Chunked = values
        .into_iter()
        .map(|v| Some(v.unwrap_or(mean)))
        .collect();
    df.with_column(filled.with_name(name.into()).into_series())?;
    Ok(None)
}

/// Rescales `name` to `[0, 1]` with `(v - min) / (max - min)`.
///
/// Constant columns are left unchanged rather than divided by zero.
pub fn normalize_min_max(df: &mut DataFrame, name: &str) -> Result<Option<StageNotice>> {
    let values = numeric_values(df, name)?;
    let (Some(min), Some(max)) = (values.min(), values.max()) else {
        return Ok(None);
    };

    if max <= min {
        tracing::debug!("'{}' is constant ({}), skipping normalization", name, min);
        return Ok(Some(StageNotice::ConstantColumn {
            column: name.to_owned(),
        }));
    }

    let span = max - min;
    let scaled: Float64Chunked = values
        .into_iter()
        .map(|v| v.map(|v| (v - min) / span))
        .collect();
    df.with_column(scaled.with_name(name.into()).into_series())?;
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashError;

    fn all_on() -> CleaningConfig {
        CleaningConfig {
            drop_missing: true,
            fill_mean: true,
            drop_duplicates: true,
            normalize: true,
            numeric_targets: None,
        }
    }

    #[test]
    fn test_disabled_config_is_identity() -> Result<()> {
        let df = df!("a" => &[Some(1.0), None], "b" => &["x", "y"])?;
        let out = clean_table(&df, &CleaningConfig::default())?;
        assert!(out.table.equals_missing(&df));
        assert!(out.notices.is_empty());
        Ok(())
    }

    #[test]
    fn test_drop_missing_rows() -> Result<()> {
        let df = df!(
            "a" => &[Some(1), None, Some(3)],
            "b" => &[Some("x"), Some("y"), None]
        )?;
        let out = drop_missing_rows(&df)?;
        assert_eq!(out.height(), 1);
        Ok(())
    }

    #[test]
    fn test_fill_mean_uses_present_values() -> Result<()> {
        let df = df!("v" => &[Some(10.0), None, Some(30.0)])?;
        let config = CleaningConfig {
            fill_mean: true,
            ..Default::default()
        };
        let out = clean_table(&df, &config)?;
        let v = out.table.column("v")?.as_materialized_series().f64()?.clone();
        assert_eq!(v.get(1), Some(20.0));
        assert_eq!(v.null_count(), 0);
        Ok(())
    }

    #[test]
    fn test_fill_mean_leaves_text_columns_alone() -> Result<()> {
        let df = df!(
            "v" => &[Some(1.0), None],
            "label" => &[Some("a"), None]
        )?;
        let config = CleaningConfig {
            fill_mean: true,
            ..Default::default()
        };
        let out = clean_table(&df, &config)?;
        assert_eq!(out.table.column("label")?.null_count(), 1);
        assert_eq!(out.table.column("v")?.null_count(), 0);
        Ok(())
    }

    #[test]
    fn test_fill_mean_on_all_missing_column_is_surfaced() -> Result<()> {
        let df = df!(
            "v" => &[None::<f64>, None],
            "w" => &[Some(1.0), None]
        )?;
        let config = CleaningConfig {
            fill_mean: true,
            ..Default::default()
        };
        let out = clean_table(&df, &config)?;
        assert_eq!(out.table.column("v")?.null_count(), 2);
        assert_eq!(
            out.notices,
            vec![StageNotice::MeanUndefined {
                column: "v".to_owned()
            }]
        );
        Ok(())
    }

    #[test]
    fn test_fill_happens_before_dedup() -> Result<()> {
        // Row 1 only differs from row 0 by a gap whose mean-fill makes them equal.
        let df = df!(
            "k" => &[1, 1, 3],
            "v" => &[Some(2.0), None, Some(2.0)]
        )?;
        let config = CleaningConfig {
            fill_mean: true,
            drop_duplicates: true,
            ..Default::default()
        };
        let out = clean_table(&df, &config)?;
        assert_eq!(out.table.height(), 2);

        // Deduplicating first would have kept all three rows.
        let dedup_first = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        assert_eq!(dedup_first.height(), 3);
        Ok(())
    }

    #[test]
    fn test_drop_missing_runs_before_fill() -> Result<()> {
        let df = df!(
            "k" => &[Some("a"), None, Some("c")],
            "v" => &[Some(1.0), Some(100.0), None]
        )?;
        let config = CleaningConfig {
            drop_missing: true,
            fill_mean: true,
            ..Default::default()
        };
        let out = clean_table(&df, &config)?;
        assert_eq!(out.table.height(), 1);
        let v = out.table.column("v")?.as_materialized_series().f64()?.clone();
        assert_eq!(v.get(0), Some(1.0));
        Ok(())
    }

    #[test]
    fn test_normalize_min_max() -> Result<()> {
        let df = df!("v" => &[2.0, 4.0, 6.0])?;
        let config = CleaningConfig {
            normalize: true,
            ..Default::default()
        };
        let out = clean_table(&df, &config)?;
        let v: Vec<Option<f64>> = out
            .table
            .column("v")?
            .as_materialized_series()
            .f64()?
            .into_iter()
            .collect();
        assert_eq!(v, vec![Some(0.0), Some(0.5), Some(1.0)]);
        Ok(())
    }

    #[test]
    fn test_normalize_constant_column_unchanged() -> Result<()> {
        let df = df!("c" => &[7_i64, 7, 7, 7])?;
        let config = CleaningConfig {
            normalize: true,
            ..Default::default()
        };
        let out = clean_table(&df, &config)?;
        assert!(out.table.equals(&df));
        assert_eq!(
            out.notices,
            vec![StageNotice::ConstantColumn {
                column: "c".to_owned()
            }]
        );
        Ok(())
    }

    #[test]
    fn test_empty_after_drop_missing_does_not_fail() -> Result<()> {
        let df = df!(
            "a" => &[None::<f64>, Some(1.0)],
            "b" => &[Some(1.0), None]
        )?;
        let out = clean_table(&df, &all_on())?;
        assert_eq!(out.table.height(), 0);
        assert_eq!(out.table.width(), 2);
        Ok(())
    }

    #[test]
    fn test_numeric_target_must_be_numeric() -> Result<()> {
        let df = df!("city" => &["a", "b"], "v" => &[1.0, 2.0])?;
        let config = CleaningConfig {
            normalize: true,
            numeric_targets: Some(vec!["city".to_owned()]),
            ..Default::default()
        };
        assert!(matches!(
            clean_table(&df, &config),
            Err(DashError::Type(_))
        ));
        Ok(())
    }

    #[test]
    fn test_fill_mean_target_must_be_numeric() -> Result<()> {
        let df = df!(
            "city" => &[Some("Lyon"), None],
            "v" => &[Some(1.0), None]
        )?;
        let config = CleaningConfig {
            fill_mean: true,
            numeric_targets: Some(vec!["city".to_owned()]),
            ..Default::default()
        };
        assert!(matches!(
            clean_table(&df, &config),
            Err(DashError::Type(_))
        ));

        let absent = CleaningConfig {
            fill_mean: true,
            numeric_targets: Some(vec!["population".to_owned()]),
            ..Default::default()
        };
        assert!(matches!(
            clean_table(&df, &absent),
            Err(DashError::InvalidSelection(_))
        ));
        Ok(())
    }

    #[test]
    fn test_numeric_targets_restrict_normalization() -> Result<()> {
        let df = df!("a" => &[0.0, 10.0], "b" => &[0.0, 10.0])?;
        let config = CleaningConfig {
            normalize: true,
            numeric_targets: Some(vec!["a".to_owned()]),
            ..Default::default()
        };
        let out = clean_table(&df, &config)?;
        let b = out.table.column("b")?.as_materialized_series().f64()?.clone();
        let a = out.table.column("a")?.as_materialized_series().f64()?.clone();
        assert_eq!(a.get(1), Some(1.0));
        assert_eq!(b.get(1), Some(10.0));
        Ok(())
    }

    #[test]
    fn test_input_is_not_mutated() -> Result<()> {
        let df = df!("v" => &[Some(1.0), None, Some(3.0)])?;
        let snapshot = df.clone();
        clean_table(&df, &all_on())?;
        assert!(df.equals_missing(&snapshot));
        Ok(())
    }
}
