//! Core types and configuration for the cryptorec system.
//!
//! This crate provides shared types used across all other crates:
//! - Price points, the symbol whitelist and aggregate result types
//! - Calendar-zone handling for date-scoped queries
//! - The time-series store contract
//! - Configuration structures
//! - Common error types

pub mod calendar;
pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use calendar::{CalendarZone, TimeFilter};
pub use config::Config;
pub use error::{Error, Result};
pub use store::{PriceExtremes, PriceSpan, TimeSeriesStore};
pub use types::*;
