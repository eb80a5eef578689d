//! Batch ingestion of price files into a time-series store.
//!
//! Every file is parsed against the `symbol,timestamp,price` header, rows for
//! symbols outside the whitelist are dropped, and the remaining rows are
//! validated and upserted one at a time. The first invalid row or unreadable
//! file aborts the whole call; rows upserted before the failure stay in the
//! store. Upserts are idempotent, so re-running a failed call is safe.

use crate::record::{RawRecord, RowLocation, REQUIRED_COLUMNS};
use cryptorec_core::{Error, Result, TimeSeriesStore, Whitelist};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Counters for a successful ingestion call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Files processed.
    pub files: u64,
    /// Data rows read (excluding headers).
    pub rows_read: u64,
    /// Rows upserted into the store.
    pub stored: u64,
    /// Rows dropped by the whitelist.
    pub skipped: u64,
}

impl IngestStats {
    /// Add another call's counters to these.
    pub fn merge(&mut self, other: &IngestStats) {
        self.files += other.files;
        self.rows_read += other.rows_read;
        self.stored += other.stored;
        self.skipped += other.skipped;
    }
}

/// Ingests price files into a store, filtering through a whitelist.
pub struct Ingestor<S: TimeSeriesStore + ?Sized> {
    store: Arc<S>,
    whitelist: Whitelist,
}

impl<S: TimeSeriesStore + ?Sized> Ingestor<S> {
    /// Create a new ingestor.
    pub fn new(store: Arc<S>, whitelist: Whitelist) -> Self {
        Self { store, whitelist }
    }

    /// Symbols accepted by this ingestor.
    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// The store written to.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Ingest every file in order.
    ///
    /// Fails with [`Error::NoInput`] for an empty list, [`Error::SourceRead`]
    /// for a missing, unreadable or malformed file, and
    /// [`Error::InvalidRecord`] for a whitelisted row that fails validation.
    pub fn ingest<P: AsRef<Path>>(&self, sources: &[P]) -> Result<IngestStats> {
        if sources.is_empty() {
            return Err(Error::no_input("no source files to ingest"));
        }

        tracing::info!(files = sources.len(), "ingestion started");
        let mut total = IngestStats::default();

        for path in sources {
            let path = path.as_ref();
            let name = path.display().to_string();
            let stats = File::open(path)
                .map_err(|e| Error::source_read(name.as_str(), e))
                .and_then(|file| self.ingest_reader(&name, file))
                .inspect_err(|e| tracing::error!(source = %name, error = %e, "ingestion aborted"))?;
            total.merge(&stats);
        }

        tracing::info!(
            files = total.files,
            rows = total.rows_read,
            stored = total.stored,
            skipped = total.skipped,
            "ingestion completed"
        );
        Ok(total)
    }

    /// Ingest a single source from any reader.
    pub fn ingest_reader<R: Read>(&self, source_name: &str, reader: R) -> Result<IngestStats> {
        tracing::info!(source = source_name, "reading source");

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| Error::source_read(source_name, e))?
            .clone();
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|col| !headers.iter().any(|h| h == **col))
        {
            return Err(Error::source_read(
                source_name,
                format!(
                    "header is missing column '{missing}' (expected {}, found '{}')",
                    REQUIRED_COLUMNS.join(","),
                    headers.iter().collect::<Vec<_>>().join(",")
                ),
            ));
        }

        let mut stats = IngestStats {
            files: 1,
            ..IngestStats::default()
        };

        for row in csv_reader.records() {
            let row = row.map_err(|e| Error::source_read(source_name, e))?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            let raw: RawRecord = row
                .deserialize(Some(&headers))
                .map_err(|e| Error::source_read(source_name, e))?;
            stats.rows_read += 1;

            let at = RowLocation {
                source: source_name,
                line,
            };

            // An empty symbol is a broken row, not an unlisted one.
            if !raw.symbol.is_empty() && !self.whitelist.contains(&raw.symbol) {
                tracing::debug!(symbol = %raw.symbol, location = %at, "symbol not whitelisted, skipping");
                stats.skipped += 1;
                continue;
            }

            let point = raw.to_price_point(at)?;
            self.store.upsert(&point)?;
            stats.stored += 1;
        }

        tracing::info!(
            source = source_name,
            stored = stats.stored,
            skipped = stats.skipped,
            "source ingested"
        );
        Ok(stats)
    }
}
