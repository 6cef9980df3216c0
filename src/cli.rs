use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use datadash::config::AppSettings;
use datadash::merge::{MergeSelection, MergeSpec, merge};
use datadash::pipeline::{NumericRange, PipelineConfig, PipelineState};
use datadash::source::{self, Origin, SourceOptions};
use datadash::summary;
use datadash::utils::{align_columns, fmt_stat};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "datadash", about = "Load, clean, filter and merge tables for dashboards")]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset (overrides the settings file)
    #[arg(long, global = true, env = "DATADASH_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the overview, column types and statistics of a file
    Inspect {
        /// CSV, Parquet, JSON or spreadsheet file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Clean and filter a file, report what was kept and optionally save it
    Clean {
        /// CSV, Parquet, JSON or spreadsheet file
        #[arg(short, long)]
        file: PathBuf,

        /// Drop rows with any missing value
        #[arg(long)]
        drop_missing: bool,

        /// Fill missing numeric values with the column mean
        #[arg(long)]
        fill_mean: bool,

        /// Drop duplicate rows, keeping the first
        #[arg(long)]
        drop_duplicates: bool,

        /// Min-max normalize numeric columns
        #[arg(long)]
        normalize: bool,

        /// Category filter as column=value1,value2 (repeatable)
        #[arg(long = "category", value_parser = parse_category)]
        categories: Vec<(String, Vec<String>)>,

        /// Inclusive numeric range as column=min:max (repeatable)
        #[arg(long = "range", value_parser = parse_range)]
        ranges: Vec<(String, NumericRange)>,

        /// JSON pipeline configuration; flags are applied on top of it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Where to save the derived table (.csv or .parquet)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the tables of a SQLite database
    Tables {
        #[arg(long)]
        db: PathBuf,
    },
    /// Merge columns of several database tables by row position
    Merge {
        #[arg(long)]
        db: PathBuf,

        /// Selection as table=column1,column2 (repeatable, in output order)
        #[arg(long = "select", value_parser = parse_selection, required = true)]
        selections: Vec<MergeSelection>,

        /// Where to save the merged table (.csv or .parquet)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn split_assignment(raw: &str) -> Result<(&str, &str), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn parse_category(raw: &str) -> Result<(String, Vec<String>), String> {
    let (column, values) = split_assignment(raw)?;
    Ok((column.to_owned(), split_list(values)))
}

fn parse_range(raw: &str) -> Result<(String, NumericRange), String> {
    let (column, bounds) = split_assignment(raw)?;
    let (min, max) = bounds
        .split_once(':')
        .ok_or_else(|| format!("expected MIN:MAX, got '{bounds}'"))?;
    let min: f64 = min.trim().parse().map_err(|e| format!("bad minimum '{min}': {e}"))?;
    let max: f64 = max.trim().parse().map_err(|e| format!("bad maximum '{max}': {e}"))?;
    let range = NumericRange::new(min, max).map_err(|e| e.to_string())?;
    Ok((column.to_owned(), range))
}

fn parse_selection(raw: &str) -> Result<MergeSelection, String> {
    let (table, columns) = split_assignment(raw)?;
    Ok(MergeSelection::new(table, split_list(columns)))
}

pub async fn run_command(command: Commands, settings: &AppSettings) -> Result<()> {
    match command {
        Commands::Inspect { file } => handle_inspect(&file, settings).await,
        Commands::Clean {
            file,
            drop_missing,
            fill_mean,
            drop_duplicates,
            normalize,
            categories,
            ranges,
            config,
            output,
        } => {
            let mut pipeline = match config {
                Some(path) => load_pipeline_config(&path)?,
                None => PipelineConfig::default(),
            };
            let cleaning = &mut pipeline.cleaning;
            cleaning.drop_missing |= drop_missing;
            cleaning.fill_mean |= fill_mean;
            cleaning.drop_duplicates |= drop_duplicates;
            cleaning.normalize |= normalize;
            for (column, values) in categories {
                pipeline.filters.categories.set(column, values);
            }
            for (column, range) in ranges {
                pipeline.filters.ranges.set(column, range);
            }
            handle_clean(&file, &pipeline, output.as_deref(), settings).await
        }
        Commands::Tables { db } => handle_tables(&db).await,
        Commands::Merge {
            db,
            selections,
            output,
        } => handle_merge(&db, MergeSpec::new(selections), output.as_deref(), settings).await,
    }
}

fn load_pipeline_config(path: &Path) -> Result<PipelineConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pipeline config {}", path.display()))?;
    Ok(PipelineConfig::from_json(&json)?)
}

async fn handle_inspect(file: &Path, settings: &AppSettings) -> Result<()> {
    let (df, _) = source::load(&Origin::FlatFile(file.to_path_buf()), &SourceOptions::from(settings)).await?;

    let overview = summary::overview(&df);
    println!(
        "{}: {} rows, {} columns, {} missing values\n",
        file.display(),
        overview.rows,
        overview.columns,
        overview.missing_values
    );

    let mut rows = vec![vec!["column".to_owned(), "dtype".to_owned(), "kind".to_owned()]];
    rows.extend(summary::column_types(&df).into_iter().map(|c| {
        vec![c.name, c.dtype, c.column_type.as_str().to_owned()]
    }));
    println!("{}\n", align_columns(&rows));

    print_describe(&df)?;
    println!("{}", summary::preview(&df, settings.preview_row_limit));
    Ok(())
}

fn print_describe(df: &DataFrame) -> Result<()> {
    let stats = summary::describe(df)?;
    if stats.is_empty() {
        println!("No numeric columns.\n");
        return Ok(());
    }

    let mut rows = vec![
        ["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect::<Vec<_>>(),
    ];
    for s in stats {
        rows.push(vec![
            s.name,
            s.count.to_string(),
            fmt_stat(s.mean),
            fmt_stat(s.std),
            fmt_stat(s.min),
            fmt_stat(s.q25),
            fmt_stat(s.median),
            fmt_stat(s.q75),
            fmt_stat(s.max),
        ]);
    }
    println!("{}\n", align_columns(&rows));
    Ok(())
}

async fn handle_clean(
    file: &Path,
    config: &PipelineConfig,
    output: Option<&Path>,
    settings: &AppSettings,
) -> Result<()> {
    let (df, origin) = source::load(&Origin::FlatFile(file.to_path_buf()), &SourceOptions::from(settings)).await?;

    let mut state = PipelineState::new(df, origin);
    state.recompute(config).context("Failed to derive table")?;

    println!("{}", state.retention());
    if state.applied().is_empty() {
        println!("No stages enabled; derived table equals the original.");
    }
    for stage in state.applied() {
        println!("  applied: {stage}");
    }
    for notice in state.notices() {
        println!("  note: {notice}");
    }
    println!();

    print_describe(state.derived())?;
    println!("{}", summary::preview(state.derived(), settings.preview_row_limit));

    if let Some(path) = output {
        let mut derived = state.derived().clone();
        source::save_table(&mut derived, path).context("Failed to save derived table")?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

async fn handle_tables(db: &Path) -> Result<()> {
    let mut conn = source::connect(db).await?;
    let tables = source::list_tables(&mut conn).await;
    source::close(conn).await;

    let tables = tables?;
    if tables.is_empty() {
        println!("{} has no tables.", db.display());
    }
    for table in tables {
        println!("{table}");
    }
    Ok(())
}

async fn handle_merge(
    db: &Path,
    spec: MergeSpec,
    output: Option<&Path>,
    settings: &AppSettings,
) -> Result<()> {
    let mut sources: Vec<String> = Vec::new();
    for selection in &spec.selections {
        if !sources.contains(&selection.source) {
            sources.push(selection.source.clone());
        }
    }

    let mut conn = source::connect(db).await?;
    let catalog = source::load_catalog(&mut conn, &sources).await;
    source::close(conn).await;

    let mut merged = merge(&spec, &catalog?)?;
    let overview = summary::overview(&merged);
    println!(
        "Merged {} selections: {} rows, {} columns",
        spec.selections.len(),
        overview.rows,
        overview.columns
    );
    println!("{}", summary::preview(&merged, settings.preview_row_limit));

    if let Some(path) = output {
        source::save_table(&mut merged, path).context("Failed to save merged table")?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!(
            parse_category("status=active, idle"),
            Ok(("status".to_owned(), vec!["active".to_owned(), "idle".to_owned()]))
        );
        assert!(parse_category("=x").is_err());
        assert!(parse_category("status").is_err());
    }

    #[test]
    fn test_parse_range() {
        let parsed = parse_range("age=18:65").map(|(c, r)| (c, r.min(), r.max()));
        assert_eq!(parsed, Ok(("age".to_owned(), 18.0, 65.0)));
        assert!(parse_range("age=65:18").is_err());
        assert!(parse_range("age=18").is_err());
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(
            parse_selection("orders=id,total"),
            Ok(MergeSelection::new("orders", ["id", "total"]))
        );
    }

    #[test]
    fn test_cli_parses_clean() -> Result<()> {
        let cli = Cli::try_parse_from([
            "datadash",
            "clean",
            "--file",
            "data.csv",
            "--fill-mean",
            "--category",
            "status=active",
            "--range",
            "age=18:65",
        ])?;
        match cli.command {
            Commands::Clean {
                fill_mean,
                drop_missing,
                categories,
                ranges,
                ..
            } => {
                assert!(fill_mean);
                assert!(!drop_missing);
                assert_eq!(categories.len(), 1);
                assert_eq!(ranges.len(), 1);
            }
            _ => panic!("expected the clean subcommand"),
        }
        Ok(())
    }
}
