use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use cinemetrics::config::Settings;
use cinemetrics::data::{filter, load_file, Column, DataError, FilterSpec};
use cinemetrics::report::{Breakdown, Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Print data-quality and headline statistics for a movie dataset.
#[derive(Parser, Debug)]
#[command(name = "movie-report")]
struct CliArgs {
    /// Dataset to analyse (.csv, .json or .parquet); defaults to the
    /// configured data path.
    path: Option<PathBuf>,

    /// Settings file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the report.
    #[arg(long, short, default_value = "analysis_output.txt")]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Add a per-label section for a grouping column (e.g. `director`,
    /// `decade`, `primary_genre`).
    #[arg(long, value_parser = parse_column)]
    group_by: Option<Column>,

    /// Only analyse movies released in this year or later.
    #[arg(long)]
    from_year: Option<i32>,

    /// Only analyse movies released in this year or earlier.
    #[arg(long)]
    to_year: Option<i32>,
}

fn parse_column(name: &str) -> Result<Column, DataError> {
    name.parse()
}

fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let settings = Settings::load(args.config.as_deref())?;
    let path = args.path.unwrap_or_else(|| settings.data_path.clone());

    let table = load_file(&path).with_context(|| format!("loading {}", path.display()))?;

    let table = match (args.from_year, args.to_year) {
        (None, None) => table,
        (from, to) => {
            let spec = FilterSpec::new()
                .year_range(from.unwrap_or(i32::MIN), to.unwrap_or(i32::MAX))
                .with_thresholds(settings.thresholds);
            filter(&table, &spec).context("applying year filter")?
        }
    };

    let mut report = Report::build(&table, &settings.insights);
    if let Some(column) = args.group_by {
        report.breakdown = Some(Breakdown::build(&table, column).context("building breakdown")?);
    }
    let rendered = match args.format {
        Format::Text => report.to_string(),
        Format::Json => serde_json::to_string_pretty(&report).context("serialising report")?,
    };

    std::fs::write(&args.output, &rendered)
        .with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("Report written to {}", args.output.display());

    println!("{rendered}");
    Ok(())
}
