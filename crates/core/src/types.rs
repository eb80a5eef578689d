//! Core data types for the cryptorec system.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Timestamp in milliseconds since Unix epoch (UTC).
pub type TimestampMs = i64;

/// Convert epoch milliseconds to an absolute instant.
///
/// Returns `None` when the value is outside the representable range.
#[inline]
pub fn instant_from_ms(ts_ms: TimestampMs) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ts_ms)
}

/// A single price observation.
///
/// `(symbol, timestamp)` is the natural key: a store keeps at most one price
/// per key, and re-ingesting a key overwrites the previous price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Asset symbol (e.g., "BTC").
    pub symbol: String,
    /// Observation instant.
    pub timestamp: DateTime<Utc>,
    /// Observed price.
    pub price: f64,
}

impl PricePoint {
    /// Create a validated price point.
    ///
    /// The symbol must be non-empty and the price finite and non-negative.
    pub fn new(symbol: impl Into<String>, timestamp: DateTime<Utc>, price: f64) -> Result<Self> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(Error::invalid_record("symbol must not be empty"));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(Error::invalid_record(format!(
                "{symbol}: price {price} is not a finite non-negative number"
            )));
        }
        Ok(Self {
            symbol,
            timestamp,
            price,
        })
    }

    /// Create a validated price point from epoch milliseconds.
    pub fn from_epoch_ms(symbol: impl Into<String>, ts_ms: TimestampMs, price: f64) -> Result<Self> {
        let timestamp = instant_from_ms(ts_ms).ok_or_else(|| {
            Error::invalid_record(format!("timestamp {ts_ms} is out of range"))
        })?;
        Self::new(symbol, timestamp, price)
    }

    /// Observation instant as epoch milliseconds.
    #[inline]
    pub fn timestamp_ms(&self) -> TimestampMs {
        self.timestamp.timestamp_millis()
    }
}

/// Set of symbols accepted for storage.
///
/// Fixed at construction; rows for any other symbol are dropped during
/// ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whitelist(BTreeSet<String>);

impl Whitelist {
    /// Create a whitelist from symbols.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(symbols.into_iter().map(Into::into).collect())
    }

    /// Is the symbol accepted?
    #[inline]
    pub fn contains(&self, symbol: &str) -> bool {
        self.0.contains(symbol)
    }

    /// Number of accepted symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Does the whitelist accept nothing?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over accepted symbols in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Whitelist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Highest price recorded for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighestPrice {
    pub symbol: String,
    pub price: f64,
}

/// Normalized range `(max - min) / min` of a symbol over some window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRangeEntry {
    pub symbol: String,
    pub ratio: f64,
}

/// Span summary of everything stored for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub symbol: String,
    /// Earliest stored timestamp.
    pub oldest: DateTime<Utc>,
    /// Latest stored timestamp.
    pub newest: DateTime<Utc>,
    /// Minimum stored price.
    pub min: f64,
    /// Maximum stored price.
    pub max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_point_from_epoch_ms() {
        let point = PricePoint::from_epoch_ms("BTC", 1640995200000, 50000.0).unwrap();
        assert_eq!(point.symbol, "BTC");
        assert_eq!(point.timestamp_ms(), 1640995200000);
        assert_eq!(point.timestamp.to_rfc3339(), "2022-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_price_point_rejects_empty_symbol() {
        let err = PricePoint::from_epoch_ms("", 0, 1.0).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));
    }

    #[test]
    fn test_price_point_rejects_bad_price() {
        assert!(PricePoint::from_epoch_ms("BTC", 0, -1.0).is_err());
        assert!(PricePoint::from_epoch_ms("BTC", 0, f64::NAN).is_err());
        assert!(PricePoint::from_epoch_ms("BTC", 0, f64::INFINITY).is_err());
        assert!(PricePoint::from_epoch_ms("BTC", 0, 0.0).is_ok());
    }

    #[test]
    fn test_price_point_rejects_out_of_range_timestamp() {
        assert!(PricePoint::from_epoch_ms("BTC", i64::MAX, 1.0).is_err());
    }

    #[test]
    fn test_whitelist() {
        let whitelist: Whitelist = ["ETH", "BTC"].into_iter().collect();
        assert!(whitelist.contains("BTC"));
        assert!(!whitelist.contains("XRP"));
        assert!(!whitelist.contains("btc"));
        assert_eq!(whitelist.iter().collect::<Vec<_>>(), vec!["BTC", "ETH"]);
    }
}
