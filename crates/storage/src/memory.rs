//! In-memory time-series store.
//!
//! Keeps one ordered series per symbol, keyed by timestamp.

use chrono::{DateTime, Utc};
use cryptorec_core::{
    Error, PriceExtremes, PricePoint, PriceSpan, Result, TimeFilter, TimeSeriesStore,
};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard};

type Series = BTreeMap<DateTime<Utc>, f64>;

/// In-memory store.
///
/// Symbols enumerate in sorted order. Reads and writes are serialized through
/// an `RwLock`, so every upsert is atomic per key.
#[derive(Debug, Default)]
pub struct MemoryStore {
    series: RwLock<BTreeMap<String, Series>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Series>>> {
        self.series
            .read()
            .map_err(|_| Error::storage("price store lock poisoned"))
    }
}

/// Fold (max, min) over prices; `None` for an empty iterator.
fn max_min<'a>(prices: impl Iterator<Item = &'a f64>) -> Option<(f64, f64)> {
    prices.fold(None, |acc, &price| match acc {
        None => Some((price, price)),
        Some((max, min)) => Some((max.max(price), min.min(price))),
    })
}

impl TimeSeriesStore for MemoryStore {
    fn upsert(&self, point: &PricePoint) -> Result<()> {
        let mut series = self
            .series
            .write()
            .map_err(|_| Error::storage("price store lock poisoned"))?;
        series
            .entry(point.symbol.clone())
            .or_default()
            .insert(point.timestamp, point.price);
        Ok(())
    }

    fn max_min_by_symbol(&self, filter: Option<TimeFilter>) -> Result<Vec<PriceExtremes>> {
        let series = self.read()?;
        let rows = series
            .iter()
            .filter_map(|(symbol, points)| {
                let extremes = match filter {
                    Some(f) if f.start > f.end => None,
                    Some(f) => max_min(points.range(f.start..=f.end).map(|(_, p)| p)),
                    None => max_min(points.values()),
                };
                extremes.map(|(max, min)| PriceExtremes {
                    symbol: symbol.clone(),
                    max,
                    min,
                })
            })
            .collect();
        Ok(rows)
    }

    fn oldest_newest_min_max_by_symbol(&self) -> Result<Vec<PriceSpan>> {
        let series = self.read()?;
        let rows = series
            .iter()
            .filter_map(|(symbol, points)| {
                let (oldest, _) = points.first_key_value()?;
                let (newest, _) = points.last_key_value()?;
                let (max, min) = max_min(points.values())?;
                Some(PriceSpan {
                    symbol: symbol.clone(),
                    oldest: *oldest,
                    newest: *newest,
                    min,
                    max,
                })
            })
            .collect();
        Ok(rows)
    }

    fn max_by_symbol(&self) -> Result<Vec<(String, f64)>> {
        let series = self.read()?;
        Ok(series
            .iter()
            .filter_map(|(symbol, points)| {
                max_min(points.values()).map(|(max, _)| (symbol.clone(), max))
            })
            .collect())
    }

    fn max_for_symbol(&self, symbol: &str) -> Result<Option<f64>> {
        let series = self.read()?;
        Ok(series
            .get(symbol)
            .and_then(|points| max_min(points.values()))
            .map(|(max, _)| max))
    }

    fn len(&self) -> Result<usize> {
        Ok(self.read()?.values().map(BTreeMap::len).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptorec_core::CalendarZone;
    use chrono::NaiveDate;

    fn point(symbol: &str, ts_ms: i64, price: f64) -> PricePoint {
        PricePoint::from_epoch_ms(symbol, ts_ms, price).unwrap()
    }

    const DAY_MS: i64 = 86_400_000;
    const JAN_1: i64 = 1640995200000;

    #[test]
    fn test_empty_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty().unwrap());
        assert!(store.max_min_by_symbol(None).unwrap().is_empty());
        assert!(store.oldest_newest_min_max_by_symbol().unwrap().is_empty());
        assert!(store.max_by_symbol().unwrap().is_empty());
        assert_eq!(store.max_for_symbol("BTC").unwrap(), None);
    }

    #[test]
    fn test_upsert_overwrites_same_key() {
        let store = MemoryStore::new();
        store.upsert(&point("BTC", JAN_1, 50000.0)).unwrap();
        store.upsert(&point("BTC", JAN_1, 42000.0)).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.max_for_symbol("BTC").unwrap(), Some(42000.0));
    }

    #[test]
    fn test_grouped_queries_enumerate_symbols_in_order() {
        let store = MemoryStore::new();
        store.upsert(&point("ETH", JAN_1, 4000.0)).unwrap();
        store.upsert(&point("BTC", JAN_1, 50000.0)).unwrap();
        store.upsert(&point("BTC", JAN_1 + 1000, 51000.0)).unwrap();

        let rows = store.max_min_by_symbol(None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "BTC");
        assert_eq!(rows[0].max, 51000.0);
        assert_eq!(rows[0].min, 50000.0);
        assert_eq!(rows[1].symbol, "ETH");

        let maxes = store.max_by_symbol().unwrap();
        assert_eq!(
            maxes,
            vec![("BTC".to_string(), 51000.0), ("ETH".to_string(), 4000.0)]
        );
    }

    #[test]
    fn test_filter_is_inclusive_and_drops_empty_symbols() {
        let store = MemoryStore::new();
        store.upsert(&point("BTC", JAN_1, 100.0)).unwrap();
        store.upsert(&point("BTC", JAN_1 + DAY_MS - 1, 300.0)).unwrap();
        store.upsert(&point("BTC", JAN_1 + DAY_MS, 900.0)).unwrap();
        store.upsert(&point("ETH", JAN_1 + 2 * DAY_MS, 10.0)).unwrap();

        let bounds = CalendarZone::Utc
            .day_bounds(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap())
            .unwrap();
        let rows = store.max_min_by_symbol(Some(bounds)).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "BTC");
        assert_eq!(rows[0].max, 300.0);
        assert_eq!(rows[0].min, 100.0);
    }

    #[test]
    fn test_spans() {
        let store = MemoryStore::new();
        store.upsert(&point("BTC", JAN_1 + 5000, 10.0)).unwrap();
        store.upsert(&point("BTC", JAN_1, 30.0)).unwrap();
        store.upsert(&point("BTC", JAN_1 + 2500, 5.0)).unwrap();

        let spans = store.oldest_newest_min_max_by_symbol().unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].oldest.timestamp_millis(), JAN_1);
        assert_eq!(spans[0].newest.timestamp_millis(), JAN_1 + 5000);
        assert_eq!(spans[0].min, 5.0);
        assert_eq!(spans[0].max, 30.0);
    }
}
