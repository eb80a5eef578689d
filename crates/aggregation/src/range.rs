//! Normalized range computation and ranking.

use cryptorec_core::{NormalizedRangeEntry, PriceExtremes};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// Normalized range `(max - min) / min`.
///
/// Defined only for `min > 0`; zero, negative and NaN minimums yield `None`.
#[inline]
pub fn normalized_range(max: f64, min: f64) -> Option<f64> {
    if min > 0.0 {
        Some((max - min) / min)
    } else {
        None
    }
}

/// Entries for every row with a defined normalized range, in row order.
pub fn entries_from_extremes(rows: Vec<PriceExtremes>) -> Vec<NormalizedRangeEntry> {
    rows.into_iter()
        .filter_map(|row| {
            normalized_range(row.max, row.min).map(|ratio| NormalizedRangeEntry {
                symbol: row.symbol,
                ratio,
            })
        })
        .collect()
}

/// Sort by ratio, highest first. The sort is stable: equal ratios keep their
/// input order.
pub fn rank_descending(mut entries: Vec<NormalizedRangeEntry>) -> Vec<NormalizedRangeEntry> {
    entries.sort_by_key(|e| Reverse(OrderedFloat(e.ratio)));
    entries
}

/// The entry with the highest ratio. On ties the first one encountered wins.
pub fn first_highest(
    entries: impl IntoIterator<Item = NormalizedRangeEntry>,
) -> Option<NormalizedRangeEntry> {
    entries.into_iter().fold(None, |best, entry| match best {
        Some(b) if entry.ratio <= b.ratio => Some(b),
        _ => Some(entry),
    })
}
