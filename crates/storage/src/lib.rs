//! Time-series store backends for the cryptorec system.
//!
//! This crate provides:
//! - An in-memory store (`MemoryStore`)
//! - A SQLite-backed store (`SqliteStore`)

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
