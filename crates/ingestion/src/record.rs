//! Raw CSV rows and their conversion into price points.

use cryptorec_core::{Error, PricePoint, Result, TimestampMs};
use serde::Deserialize;
use std::fmt;

/// Columns every input file must declare in its header line.
pub const REQUIRED_COLUMNS: [&str; 3] = ["symbol", "timestamp", "price"];

/// One row as read from an input file, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawRecord {
    pub symbol: String,
    /// Epoch milliseconds as a decimal string.
    pub timestamp: String,
    pub price: String,
}

/// Where a row came from, for error messages and logs.
#[derive(Debug, Clone, Copy)]
pub struct RowLocation<'a> {
    pub source: &'a str,
    pub line: u64,
}

impl fmt::Display for RowLocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.line)
    }
}

impl RawRecord {
    /// Build a raw record from string fields.
    pub fn new(symbol: impl Into<String>, timestamp: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp: timestamp.into(),
            price: price.into(),
        }
    }

    fn invalid(&self, at: RowLocation<'_>, reason: impl fmt::Display) -> Error {
        Error::invalid_record(format!(
            "{at} {{symbol: '{}', timestamp: '{}', price: '{}'}}: {reason}",
            self.symbol, self.timestamp, self.price
        ))
    }

    /// Validate the row and convert it into a price point.
    pub fn to_price_point(&self, at: RowLocation<'_>) -> Result<PricePoint> {
        if self.symbol.is_empty() || self.timestamp.is_empty() || self.price.is_empty() {
            return Err(self.invalid(at, "symbol, timestamp and price are required"));
        }

        let ts_ms: TimestampMs = self
            .timestamp
            .parse()
            .map_err(|e| self.invalid(at, format_args!("timestamp is not epoch milliseconds ({e})")))?;
        let price: f64 = self
            .price
            .parse()
            .map_err(|e| self.invalid(at, format_args!("price is not a number ({e})")))?;

        PricePoint::from_epoch_ms(self.symbol.as_str(), ts_ms, price).map_err(|e| match e {
            Error::InvalidRecord(reason) => self.invalid(at, reason),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AT: RowLocation<'static> = RowLocation {
        source: "BTC_values.csv",
        line: 2,
    };

    #[test]
    fn test_valid_record() {
        let point = RawRecord::new("BTC", "1640995200000", "46813.21")
            .to_price_point(AT)
            .unwrap();
        assert_eq!(point.symbol, "BTC");
        assert_eq!(point.timestamp_ms(), 1640995200000);
        assert!((point.price - 46813.21).abs() < 1e-10);
    }

    #[test]
    fn test_all_empty_fields() {
        let err = RawRecord::new("", "", "").to_price_point(AT).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, Error::InvalidRecord(_)));
        assert!(msg.contains("Invalid record"));
        assert!(msg.contains("BTC_values.csv:2"));
    }

    #[test]
    fn test_unparsable_timestamp() {
        let err = RawRecord::new("BTC", "2022-01-01", "1.0")
            .to_price_point(AT)
            .unwrap_err();
        assert!(err.to_string().contains("timestamp"));
    }

    #[test]
    fn test_unparsable_price() {
        let err = RawRecord::new("BTC", "1640995200000", "cheap")
            .to_price_point(AT)
            .unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_non_finite_or_negative_price() {
        for price in ["NaN", "inf", "-3.5"] {
            let err = RawRecord::new("BTC", "1640995200000", price)
                .to_price_point(AT)
                .unwrap_err();
            assert!(matches!(err, Error::InvalidRecord(_)), "price {price}");
            assert!(err.to_string().contains("BTC_values.csv:2"));
        }
    }

    #[test]
    fn test_zero_price_is_valid() {
        assert!(RawRecord::new("BTC", "0", "0").to_price_point(AT).is_ok());
    }
}
