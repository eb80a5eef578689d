use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cryptorec_aggregation::RangeWindow;
use cryptorec_core::config::StorageBackend;
use cryptorec_core::{CalendarZone, Config};

#[derive(Debug, Parser)]
#[command(
    name = "cryptorec",
    version,
    about = "Ingest crypto price files and query highest prices, normalized ranges and summaries"
)]
pub struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory scanned for price files.
    #[arg(short = 'd', long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Accepted symbols, comma separated.
    #[arg(short = 'w', long, global = true, value_delimiter = ',')]
    pub whitelist: Vec<String>,

    /// Calendar zone for date queries: local, utc or an offset like +02:00.
    #[arg(long, global = true)]
    pub zone: Option<CalendarZone>,

    /// Use a SQLite database file instead of the in-memory store.
    #[arg(long, global = true)]
    pub sqlite: Option<PathBuf>,

    /// Query the existing store without ingesting the data directory first.
    #[arg(long, global = true)]
    pub skip_ingest: bool,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Report service status.
    Health,
    /// Ingest the data directory and report counts.
    Seed,
    /// Highest price of every symbol.
    HighestPrices,
    /// Highest price of one symbol.
    HighestPrice { symbol: String },
    /// Symbols ranked by normalized range, highest first.
    NormalizedRange {
        /// Restrict to one calendar day.
        #[arg(long, conflicts_with_all = ["from", "to"])]
        date: Option<NaiveDate>,
        /// First day of a range (inclusive).
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// Last day of a range (inclusive).
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
    /// Symbol with the highest normalized range on a day.
    HighestNormalizedRange {
        #[arg(long)]
        date: NaiveDate,
    },
    /// Oldest/newest/min/max of every symbol.
    MonthlySummary,
}

impl Command {
    /// Does this command need the data directory ingested first?
    pub fn reads_data(&self) -> bool {
        !matches!(self, Command::Health)
    }
}

/// Window selected by `normalized-range` flags.
pub fn range_window(
    date: Option<NaiveDate>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> RangeWindow {
    match (date, from, to) {
        (Some(date), _, _) => RangeWindow::Date(date),
        (None, Some(start), Some(end)) => RangeWindow::Between { start, end },
        _ => RangeWindow::AllTime,
    }
}

impl Cli {
    /// Configuration file (or defaults) with command-line overrides applied.
    pub fn resolve_config(&self) -> cryptorec_core::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(dir) = &self.data_dir {
            config.data.directory = dir.clone();
        }
        if !self.whitelist.is_empty() {
            config.whitelist.symbols = self.whitelist.clone();
        }
        if let Some(zone) = self.zone {
            config.calendar.zone = zone;
        }
        if let Some(path) = &self.sqlite {
            config.storage.backend = StorageBackend::Sqlite;
            config.storage.path = Some(path.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_highest_price() {
        let cli = Cli::try_parse_from([
            "cryptorec",
            "highest-price",
            "BTC",
            "--whitelist",
            "BTC,ETH",
            "--zone",
            "utc",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::HighestPrice { ref symbol } if symbol == "BTC"));
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.whitelist.symbols, vec!["BTC", "ETH"]);
        assert_eq!(config.calendar.zone, CalendarZone::Utc);
    }

    #[test]
    fn test_parse_normalized_range_between() {
        let cli = Cli::try_parse_from([
            "cryptorec",
            "normalized-range",
            "--from",
            "2022-01-01",
            "--to",
            "2022-01-31",
        ])
        .unwrap();

        let Command::NormalizedRange { date, from, to } = cli.command else {
            panic!("expected normalized-range");
        };
        assert_eq!(
            range_window(date, from, to),
            RangeWindow::Between {
                start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2022, 1, 31).unwrap(),
            }
        );
    }

    #[test]
    fn test_date_conflicts_with_range() {
        let result = Cli::try_parse_from([
            "cryptorec",
            "normalized-range",
            "--date",
            "2022-01-01",
            "--from",
            "2022-01-01",
            "--to",
            "2022-01-02",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_requires_to() {
        let result = Cli::try_parse_from(["cryptorec", "normalized-range", "--from", "2022-01-01"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sqlite_flag_selects_backend() {
        let cli =
            Cli::try_parse_from(["cryptorec", "monthly-summary", "--sqlite", "prices.db"]).unwrap();
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.path, Some(PathBuf::from("prices.db")));
    }

    #[test]
    fn test_health_does_not_read_data() {
        let cli = Cli::try_parse_from(["cryptorec", "health"]).unwrap();
        assert!(!cli.command.reads_data());
    }
}
