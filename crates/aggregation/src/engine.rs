//! Aggregation engine.
//!
//! Runs the analytical queries against a store. Results are recomputed on
//! every call; an empty store yields empty results, never an error.

use crate::range::{entries_from_extremes, first_highest, rank_descending};
use chrono::NaiveDate;
use cryptorec_core::{
    CalendarZone, MonthlySummary, NormalizedRangeEntry, Result, TimeFilter, TimeSeriesStore,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Query engine over a time-series store.
pub struct AggregationEngine<S: TimeSeriesStore + ?Sized> {
    store: Arc<S>,
    /// Zone used to resolve calendar dates.
    zone: CalendarZone,
}

impl<S: TimeSeriesStore + ?Sized> AggregationEngine<S> {
    /// Create a new engine.
    pub fn new(store: Arc<S>, zone: CalendarZone) -> Self {
        Self { store, zone }
    }

    /// Zone used to resolve calendar dates.
    pub fn zone(&self) -> CalendarZone {
        self.zone
    }

    /// Highest price ever recorded for `symbol`.
    pub fn highest_price_for(&self, symbol: &str) -> Result<Option<f64>> {
        self.store.max_for_symbol(symbol)
    }

    /// Highest price per symbol. Symbols without data are absent.
    pub fn highest_price_per_symbol(&self) -> Result<BTreeMap<String, f64>> {
        Ok(self.store.max_by_symbol()?.into_iter().collect())
    }

    /// Normalized range per symbol over all stored data, highest first.
    pub fn normalized_range_all_time(&self) -> Result<Vec<NormalizedRangeEntry>> {
        self.ranked(None)
    }

    /// Normalized range per symbol over one calendar day, highest first.
    pub fn normalized_range_for_date(&self, date: NaiveDate) -> Result<Vec<NormalizedRangeEntry>> {
        self.ranked(Some(self.zone.day_bounds(date)?))
    }

    /// Normalized range per symbol from the start of `start` through the end
    /// of `end`, highest first.
    pub fn normalized_range_for_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NormalizedRangeEntry>> {
        self.ranked(Some(self.zone.range_bounds(start, end)?))
    }

    /// Symbol with the highest normalized range on `date`.
    ///
    /// Ties go to the symbol the store enumerates first.
    pub fn highest_normalized_range_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<NormalizedRangeEntry>> {
        let bounds = self.zone.day_bounds(date)?;
        let rows = self.store.max_min_by_symbol(Some(bounds))?;
        Ok(first_highest(entries_from_extremes(rows)))
    }

    /// Oldest/newest timestamp and min/max price per symbol over everything
    /// stored.
    pub fn monthly_summary_per_symbol(&self) -> Result<Vec<MonthlySummary>> {
        Ok(self
            .store
            .oldest_newest_min_max_by_symbol()?
            .into_iter()
            .map(MonthlySummary::from)
            .collect())
    }

    fn ranked(&self, filter: Option<TimeFilter>) -> Result<Vec<NormalizedRangeEntry>> {
        let rows = self.store.max_min_by_symbol(filter)?;
        tracing::debug!(symbols = rows.len(), filtered = filter.is_some(), "ranking normalized ranges");
        Ok(rank_descending(entries_from_extremes(rows)))
    }
}
