//! Time-series store contract.
//!
//! The store is the single source of truth for price points. Backends live in
//! `cryptorec-storage`; ingestion writes through [`TimeSeriesStore::upsert`] and
//! the aggregation engine reads through the grouped queries.

use crate::calendar::TimeFilter;
use crate::error::Result;
use crate::types::{MonthlySummary, PricePoint};
use chrono::{DateTime, Utc};

/// Maximum and minimum price of one symbol over some window.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceExtremes {
    pub symbol: String,
    pub max: f64,
    pub min: f64,
}

/// Oldest/newest timestamp and min/max price of one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSpan {
    pub symbol: String,
    pub oldest: DateTime<Utc>,
    pub newest: DateTime<Utc>,
    pub min: f64,
    pub max: f64,
}

impl From<PriceSpan> for MonthlySummary {
    fn from(span: PriceSpan) -> Self {
        MonthlySummary {
            symbol: span.symbol,
            oldest: span.oldest,
            newest: span.newest,
            min: span.min,
            max: span.max,
        }
    }
}

/// Queryable per-symbol time series of prices.
///
/// Grouped queries return one row per symbol that has at least one point in
/// scope, in the store's natural enumeration order. Backends must make each
/// upsert atomic per key so a concurrent reader sees either the old or the new
/// price.
pub trait TimeSeriesStore: Send + Sync {
    /// Insert the point, or overwrite the price stored for `(symbol, timestamp)`.
    fn upsert(&self, point: &PricePoint) -> Result<()>;

    /// Max and min price per symbol, optionally restricted to a closed interval.
    fn max_min_by_symbol(&self, filter: Option<TimeFilter>) -> Result<Vec<PriceExtremes>>;

    /// Oldest/newest timestamp and min/max price per symbol.
    fn oldest_newest_min_max_by_symbol(&self) -> Result<Vec<PriceSpan>>;

    /// Max price per symbol.
    fn max_by_symbol(&self) -> Result<Vec<(String, f64)>>;

    /// Max price of one symbol, `None` when it has no points.
    fn max_for_symbol(&self, symbol: &str) -> Result<Option<f64>>;

    /// Number of stored points.
    fn len(&self) -> Result<usize>;

    /// Is the store empty?
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
