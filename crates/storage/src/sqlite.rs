//! SQLite-backed time-series store.
//!
//! Points live in a single `prices` table keyed by `(symbol, ts_ms)`; the
//! grouped queries are plain `GROUP BY symbol` aggregates ordered by symbol.

use cryptorec_core::{
    instant_from_ms, Error, PriceExtremes, PricePoint, PriceSpan, Result, TimeFilter,
    TimeSeriesStore, TimestampMs,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS prices (
        symbol TEXT    NOT NULL,
        ts_ms  INTEGER NOT NULL,
        price  REAL    NOT NULL,
        PRIMARY KEY (symbol, ts_ms)
    );
";

/// SQLite store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn db_err(e: rusqlite::Error) -> Error {
    Error::storage(e)
}

fn instant(symbol: &str, ts_ms: TimestampMs) -> Result<chrono::DateTime<chrono::Utc>> {
    instant_from_ms(ts_ms)
        .ok_or_else(|| Error::storage(format!("{symbol}: stored timestamp {ts_ms} is out of range")))
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening sqlite price store");
        Self::init(Connection::open(path).map_err(db_err)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory().map_err(db_err)?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::storage("sqlite connection lock poisoned"))
    }
}

impl TimeSeriesStore for SqliteStore {
    fn upsert(&self, point: &PricePoint) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO prices (symbol, ts_ms, price) VALUES (?1, ?2, ?3)
                 ON CONFLICT (symbol, ts_ms) DO UPDATE SET price = excluded.price",
                params![point.symbol, point.timestamp_ms(), point.price],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn max_min_by_symbol(&self, filter: Option<TimeFilter>) -> Result<Vec<PriceExtremes>> {
        let conn = self.conn()?;
        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<PriceExtremes> {
            Ok(PriceExtremes {
                symbol: row.get(0)?,
                max: row.get(1)?,
                min: row.get(2)?,
            })
        };

        let rows = match filter {
            Some(f) => {
                let mut stmt = conn
                    .prepare(
                        "SELECT symbol, MAX(price), MIN(price) FROM prices
                         WHERE ts_ms BETWEEN ?1 AND ?2
                         GROUP BY symbol ORDER BY symbol",
                    )
                    .map_err(db_err)?;
                let rows = stmt
                    .query_map(
                        params![f.start.timestamp_millis(), f.end.timestamp_millis()],
                        map_row,
                    )
                    .map_err(db_err)?
                    .collect::<rusqlite::Result<Vec<_>>>();
                rows
            }
            None => {
                let mut stmt = conn
                    .prepare(
                        "SELECT symbol, MAX(price), MIN(price) FROM prices
                         GROUP BY symbol ORDER BY symbol",
                    )
                    .map_err(db_err)?;
                let rows = stmt
                    .query_map([], map_row)
                    .map_err(db_err)?
                    .collect::<rusqlite::Result<Vec<_>>>();
                rows
            }
        };
        rows.map_err(db_err)
    }

    fn oldest_newest_min_max_by_symbol(&self) -> Result<Vec<PriceSpan>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT symbol, MIN(ts_ms), MAX(ts_ms), MIN(price), MAX(price) FROM prices
                 GROUP BY symbol ORDER BY symbol",
            )
            .map_err(db_err)?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, f64>(4)?,
                ))
            })
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err)?;

        raw.into_iter()
            .map(|(symbol, oldest_ms, newest_ms, min, max)| {
                Ok(PriceSpan {
                    oldest: instant(&symbol, oldest_ms)?,
                    newest: instant(&symbol, newest_ms)?,
                    symbol,
                    min,
                    max,
                })
            })
            .collect()
    }

    fn max_by_symbol(&self) -> Result<Vec<(String, f64)>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT symbol, MAX(price) FROM prices GROUP BY symbol ORDER BY symbol")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>();
        rows.map_err(db_err)
    }

    fn max_for_symbol(&self, symbol: &str) -> Result<Option<f64>> {
        let max = self
            .conn()?
            .query_row(
                "SELECT MAX(price) FROM prices WHERE symbol = ?1",
                params![symbol],
                |row| row.get::<_, Option<f64>>(0),
            )
            .optional()
            .map_err(db_err)?;
        Ok(max.flatten())
    }

    fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM prices", [], |row| row.get(0))
            .map_err(db_err)?;
        usize::try_from(count).map_err(Error::storage)
    }
}
