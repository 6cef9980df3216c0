//! # datadash command-line entry point
//!
//! ```bash
//! datadash inspect --file sales.csv
//! datadash clean --file sales.csv --drop-missing --range price=0:100 --output clean.parquet
//! datadash tables --db shop.sqlite
//! datadash merge --db shop.sqlite --select orders=id,total --select customers=name
//! ```
//!
//! Settings come from the user config file (see `datadash::config`); a tokio
//! runtime drives the loaders.

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout, clippy::print_stderr)] // command output and pre-logging failures

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let settings = datadash::config::load_settings();

    let level = cli.log_level.as_deref().unwrap_or(&settings.log_level);
    if let Err(e) = datadash::logging::init(level) {
        eprintln!("Logging disabled: {e:#}");
    }

    tokio::runtime::Runtime::new()?.block_on(cli::run_command(cli.command, &settings))?;
    Ok(())
}
