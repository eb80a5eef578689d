//! Analytical queries for the cryptorec system.
//!
//! This crate handles:
//! - Normalized range computation and ranking
//! - Highest-price, normalized-range and span queries over a store
//! - Response shapes for a transport layer

pub mod engine;
pub mod facade;
pub mod range;

pub use engine::AggregationEngine;
pub use facade::{
    HealthStatus, MonthlySummaryResponse, NormalizedRangeResponse, QueryFacade, RangeWindow,
};
pub use range::normalized_range;
