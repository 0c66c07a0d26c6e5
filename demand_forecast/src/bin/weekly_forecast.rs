//! Weekly Forecast: command-line front end for the demand forecaster
//!
//! ```bash
//! # Derive the enhanced table from raw weekly sales
//! weekly-forecast enhance --raw weekly_sales.csv --out enhanced.csv
//!
//! # Forecast week 4 from the enhanced table
//! weekly-forecast predict --enhanced enhanced.csv --week 4 --json
//! ```
//!
//! Configuration comes from `--config`, otherwise `DEMAND_FORECAST_CONFIG`,
//! otherwise `./forecast_config.toml`, otherwise the built-in defaults.
//! Set `RUST_LOG` to change log verbosity.

use anyhow::Context;
use clap::{Parser, Subcommand};
use demand_forecast::{
    evaluate_predictions, FeatureEngine, ForecastConfig, ForecastEngine, InMemoryStore,
    RecordReader, RecordWriter, SalesStore,
};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "weekly-forecast", version, about = "Weekly per-product demand forecasting")]
struct CliArgs {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the enhanced table from raw weekly records
    Enhance {
        /// Raw weekly sales CSV (with a Week column)
        #[arg(long)]
        raw: PathBuf,

        /// Output CSV (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Forecast every product of a week from an enhanced table
    Predict {
        /// Enhanced weekly sales CSV
        #[arg(long)]
        enhanced: PathBuf,

        /// Week to forecast
        #[arg(long)]
        week: u32,

        /// Print JSON instead of CSV
        #[arg(long)]
        json: bool,

        /// Also report accuracy against the week's recorded Quantity_Sold
        #[arg(long)]
        evaluate: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => ForecastConfig::load_from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ForecastConfig::load(),
    };

    match args.command {
        Command::Enhance { raw, out } => {
            let file = File::open(&raw).with_context(|| format!("opening {}", raw.display()))?;
            let records = RecordReader::raw_from_reader(file)?;
            let enhanced = FeatureEngine::new(&config).enhance(&records);
            info!(raw = records.len(), enhanced = enhanced.len(), "Enhanced weekly records");

            match out {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    RecordWriter::write_enhanced(file, &enhanced)?;
                }
                None => RecordWriter::write_enhanced(io::stdout().lock(), &enhanced)?,
            }
        }
        Command::Predict {
            enhanced,
            week,
            json,
            evaluate,
        } => {
            let file = File::open(&enhanced)
                .with_context(|| format!("opening {}", enhanced.display()))?;
            let records = RecordReader::enhanced_from_reader(file)?;

            let store = InMemoryStore::new();
            store.replace_enhanced(records)?;

            let engine = ForecastEngine::new(&config)?;
            let predictions = engine
                .forecast(&store, week)
                .with_context(|| format!("forecasting week {}", week))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&predictions)?);
            } else {
                RecordWriter::write_predictions(io::stdout().lock(), &predictions)?;
            }

            if evaluate {
                let actual = store.enhanced_in_weeks(week..=week)?;
                let accuracy = evaluate_predictions(&predictions, &actual)?;
                eprint!("{}", accuracy);
            }
        }
    }

    Ok(())
}
