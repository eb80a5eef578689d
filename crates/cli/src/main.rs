mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cryptorec_aggregation::QueryFacade;
use cryptorec_core::config::StorageBackend;
use cryptorec_core::{Config, TimeSeriesStore};
use cryptorec_ingestion::discover_sources;
use cryptorec_storage::{MemoryStore, SqliteStore};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::cli::{range_window, Cli, Command};

fn main() {
    init_tracing();

    if let Err(error) = run() {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(config: &Config) -> anyhow::Result<Arc<dyn TimeSeriesStore>> {
    let store: Arc<dyn TimeSeriesStore> = match (config.storage.backend, &config.storage.path) {
        (StorageBackend::Sqlite, Some(path)) => Arc::new(
            SqliteStore::open(path)
                .with_context(|| format!("opening sqlite store {}", path.display()))?,
        ),
        (StorageBackend::Sqlite, None) => anyhow::bail!("sqlite backend requires a path"),
        (StorageBackend::Memory, _) => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    tracing::debug!(
        backend = ?config.storage.backend,
        zone = %config.calendar.zone,
        "configuration resolved"
    );

    let store = open_store(&config)?;
    let facade = QueryFacade::new(store, config.whitelist(), config.calendar.zone);

    let mut seeded = None;
    if cli.command.reads_data() && !cli.skip_ingest {
        let sources = discover_sources(&config.data.directory, &config.data.extension)?;
        seeded = Some(facade.seed(sources.as_slice())?);
    }

    let output: Value = match cli.command {
        Command::Health => serde_json::to_value(facade.health())?,
        Command::Seed => serde_json::to_value(seeded)?,
        Command::HighestPrices => serde_json::to_value(facade.highest_prices()?)?,
        Command::HighestPrice { symbol } => serde_json::to_value(facade.highest_price(&symbol)?)?,
        Command::NormalizedRange { date, from, to } => {
            serde_json::to_value(facade.normalized_ranges(range_window(date, from, to))?)?
        }
        Command::HighestNormalizedRange { date } => {
            serde_json::to_value(facade.highest_normalized_range(date)?)?
        }
        Command::MonthlySummary => serde_json::to_value(facade.monthly_summaries()?)?,
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}
