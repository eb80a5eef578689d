//! Data ingestion for the cryptorec system.
//!
//! This crate handles:
//! - Input file discovery
//! - CSV row parsing and validation
//! - Whitelist filtering
//! - Upserting price points into a store

pub mod discovery;
pub mod pipeline;
pub mod record;

pub use discovery::discover_sources;
pub use pipeline::{IngestStats, Ingestor};
pub use record::{RawRecord, RowLocation};
