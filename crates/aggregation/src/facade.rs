//! Query façade.
//!
//! Pairs an ingestor and an engine over one store and turns engine results
//! into the serializable shapes handed to a transport layer.

use crate::engine::AggregationEngine;
use chrono::{NaiveDate, NaiveDateTime};
use cryptorec_core::{
    CalendarZone, HighestPrice, MonthlySummary, NormalizedRangeEntry, Result, TimeSeriesStore,
    Whitelist,
};
use cryptorec_ingestion::{IngestStats, Ingestor};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Service liveness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// Window for normalized-range queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeWindow {
    /// Everything stored.
    AllTime,
    /// One calendar day.
    Date(NaiveDate),
    /// From the start of `start` through the end of `end`.
    Between { start: NaiveDate, end: NaiveDate },
}

/// One normalized-range result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRangeResponse {
    pub symbol: String,
    pub normalized_range: f64,
}

impl From<NormalizedRangeEntry> for NormalizedRangeResponse {
    fn from(entry: NormalizedRangeEntry) -> Self {
        Self {
            symbol: entry.symbol,
            normalized_range: entry.ratio,
        }
    }
}

/// One per-symbol summary, with instants rendered as local date-times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummaryResponse {
    pub symbol: String,
    pub oldest: NaiveDateTime,
    pub newest: NaiveDateTime,
    pub min: f64,
    pub max: f64,
}

impl MonthlySummaryResponse {
    fn render(summary: MonthlySummary, zone: CalendarZone) -> Result<Self> {
        Ok(Self {
            oldest: zone.to_local(summary.oldest)?,
            newest: zone.to_local(summary.newest)?,
            symbol: summary.symbol,
            min: summary.min,
            max: summary.max,
        })
    }
}

/// Entry point for a transport layer.
pub struct QueryFacade<S: TimeSeriesStore + ?Sized> {
    ingestor: Ingestor<S>,
    engine: AggregationEngine<S>,
}

impl<S: TimeSeriesStore + ?Sized> QueryFacade<S> {
    /// Create a façade; ingestion and queries share `store`.
    pub fn new(store: Arc<S>, whitelist: Whitelist, zone: CalendarZone) -> Self {
        Self {
            ingestor: Ingestor::new(Arc::clone(&store), whitelist),
            engine: AggregationEngine::new(store, zone),
        }
    }

    /// The underlying engine.
    pub fn engine(&self) -> &AggregationEngine<S> {
        &self.engine
    }

    /// Liveness probe.
    pub fn health(&self) -> HealthStatus {
        HealthStatus { status: "UP" }
    }

    /// Ingest source files into the store.
    pub fn seed<P: AsRef<Path>>(&self, sources: &[P]) -> Result<IngestStats> {
        self.ingestor.ingest(sources)
    }

    /// Highest price per symbol.
    pub fn highest_prices(&self) -> Result<BTreeMap<String, f64>> {
        self.engine.highest_price_per_symbol()
    }

    /// Highest price of one symbol; `None` maps to "not found".
    pub fn highest_price(&self, symbol: &str) -> Result<Option<HighestPrice>> {
        Ok(self
            .engine
            .highest_price_for(symbol)?
            .map(|price| HighestPrice {
                symbol: symbol.to_string(),
                price,
            }))
    }

    /// Normalized ranges over a window, highest first.
    pub fn normalized_ranges(&self, window: RangeWindow) -> Result<Vec<NormalizedRangeResponse>> {
        let entries = match window {
            RangeWindow::AllTime => self.engine.normalized_range_all_time()?,
            RangeWindow::Date(date) => self.engine.normalized_range_for_date(date)?,
            RangeWindow::Between { start, end } => {
                self.engine.normalized_range_for_range(start, end)?
            }
        };
        Ok(entries.into_iter().map(Into::into).collect())
    }

    /// Symbol with the highest normalized range on `date`.
    pub fn highest_normalized_range(&self, date: NaiveDate) -> Result<Option<NormalizedRangeResponse>> {
        Ok(self
            .engine
            .highest_normalized_range_for_date(date)?
            .map(Into::into))
    }

    /// Oldest/newest/min/max per symbol.
    pub fn monthly_summaries(&self) -> Result<Vec<MonthlySummaryResponse>> {
        let zone = self.engine.zone();
        self.engine
            .monthly_summary_per_symbol()?
            .into_iter()
            .map(|summary| MonthlySummaryResponse::render(summary, zone))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptorec_core::Error;
    use cryptorec_storage::MemoryStore;
    use serde_json::json;
    use std::io::Write;

    fn facade(zone: CalendarZone) -> QueryFacade<MemoryStore> {
        QueryFacade::new(
            Arc::new(MemoryStore::new()),
            Whitelist::new(["BTC", "ETH"]),
            zone,
        )
    }

    fn seed(facade: &QueryFacade<MemoryStore>, body: &str) -> IngestStats {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        facade.seed(&[file.path()]).unwrap()
    }

    #[test]
    fn test_health() {
        let facade = facade(CalendarZone::Utc);
        assert_eq!(serde_json::to_value(facade.health()).unwrap(), json!({"status": "UP"}));
    }

    #[test]
    fn test_seed_then_highest_prices() {
        let facade = facade(CalendarZone::Utc);
        let stats = seed(
            &facade,
            "symbol,timestamp,price\n\
             BTC,1640995200000,50000\n\
             ETH,1640995200000,4000\n\
             XRP,1640995200000,0.8\n",
        );
        assert_eq!(stats.stored, 2);

        assert_eq!(
            serde_json::to_value(facade.highest_prices().unwrap()).unwrap(),
            json!({"BTC": 50000.0, "ETH": 4000.0})
        );
        assert_eq!(
            facade.highest_price("BTC").unwrap(),
            Some(HighestPrice {
                symbol: "BTC".to_string(),
                price: 50000.0
            })
        );
        assert_eq!(facade.highest_price("XRP").unwrap(), None);
    }

    #[test]
    fn test_seed_with_no_files() {
        let facade = facade(CalendarZone::Utc);
        let err = facade.seed::<&Path>(&[]).unwrap_err();
        assert!(matches!(err, Error::NoInput(_)));
    }

    #[test]
    fn test_normalized_range_shapes() {
        let facade = facade(CalendarZone::Utc);
        seed(
            &facade,
            "symbol,timestamp,price\n\
             BTC,1640995200000,30000\n\
             BTC,1640998800000,60000\n\
             ETH,1640995200000,2000\n\
             ETH,1640998800000,3000\n",
        );

        let all_time = facade.normalized_ranges(RangeWindow::AllTime).unwrap();
        assert_eq!(
            serde_json::to_value(&all_time).unwrap(),
            json!([
                {"symbol": "BTC", "normalizedRange": 1.0},
                {"symbol": "ETH", "normalizedRange": 0.5}
            ])
        );

        let jan_1 = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        assert_eq!(
            facade.normalized_ranges(RangeWindow::Date(jan_1)).unwrap(),
            all_time
        );
        assert_eq!(
            facade
                .normalized_ranges(RangeWindow::Between { start: jan_1, end: jan_1 })
                .unwrap(),
            all_time
        );
        assert_eq!(
            facade.highest_normalized_range(jan_1).unwrap().unwrap().symbol,
            "BTC"
        );

        let jan_2 = NaiveDate::from_ymd_opt(2022, 1, 2).unwrap();
        assert!(facade.highest_normalized_range(jan_2).unwrap().is_none());
        assert!(matches!(
            facade.normalized_ranges(RangeWindow::Between { start: jan_2, end: jan_1 }),
            Err(Error::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_monthly_summary_renders_in_zone() {
        let facade = facade(CalendarZone::Fixed { offset_seconds: 3600 });
        seed(
            &facade,
            "symbol,timestamp,price\n\
             BTC,1640995200000,46813.21\n\
             BTC,1643673540000,38415.79\n",
        );

        let summaries = facade.monthly_summaries().unwrap();
        assert_eq!(
            serde_json::to_value(&summaries).unwrap(),
            json!([{
                "symbol": "BTC",
                "oldest": "2022-01-01T01:00:00",
                "newest": "2022-02-01T00:59:00",
                "min": 38415.79,
                "max": 46813.21
            }])
        );
    }
}
