//! Calendar-date handling.
//!
//! Points are stored as absolute instants; calendar dates only appear at the
//! query boundary and in rendered responses, both resolved through a
//! [`CalendarZone`].

use crate::error::{Error, Result};
use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed time interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFilter {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeFilter {
    /// Create a filter. Callers guarantee `start <= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Does the interval contain the instant (both ends inclusive)?
    #[inline]
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        self.start <= *ts && *ts <= self.end
    }
}

/// Time zone used to map calendar dates onto instants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarZone {
    /// The system's default zone.
    #[default]
    Local,
    /// UTC.
    Utc,
    /// A fixed offset east of UTC.
    Fixed { offset_seconds: i32 },
}

impl CalendarZone {
    /// First instant of `date` in this zone.
    pub fn start_of_day(self, date: NaiveDate) -> Result<DateTime<Utc>> {
        let midnight = date.and_time(NaiveTime::MIN);
        let resolved = match self {
            CalendarZone::Utc => Some(midnight.and_utc()),
            CalendarZone::Local => Local
                .from_local_datetime(&midnight)
                .earliest()
                // Midnight can fall into a DST gap; the day then starts an hour later.
                .or_else(|| {
                    Local
                        .from_local_datetime(&(midnight + Duration::hours(1)))
                        .earliest()
                })
                .map(|dt| dt.with_timezone(&Utc)),
            CalendarZone::Fixed { offset_seconds } => self
                .fixed_offset(offset_seconds)?
                .from_local_datetime(&midnight)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
        };
        resolved.ok_or_else(|| Error::config(format!("{date} has no start of day in zone {self}")))
    }

    /// Last instant of `date` in this zone (inclusive).
    pub fn end_of_day(self, date: NaiveDate) -> Result<DateTime<Utc>> {
        let next = date
            .succ_opt()
            .ok_or_else(|| Error::config(format!("{date} has no following day")))?;
        Ok(self.start_of_day(next)? - Duration::nanoseconds(1))
    }

    /// Closed interval covering the whole of `date`.
    pub fn day_bounds(self, date: NaiveDate) -> Result<TimeFilter> {
        self.range_bounds(date, date)
    }

    /// Closed interval `[start_of_day(start), end_of_day(end)]`.
    pub fn range_bounds(self, start: NaiveDate, end: NaiveDate) -> Result<TimeFilter> {
        if end < start {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(TimeFilter::new(
            self.start_of_day(start)?,
            self.end_of_day(end)?,
        ))
    }

    /// Wall-clock date-time of an instant in this zone.
    pub fn to_local(self, ts: DateTime<Utc>) -> Result<NaiveDateTime> {
        Ok(match self {
            CalendarZone::Utc => ts.naive_utc(),
            CalendarZone::Local => ts.with_timezone(&Local).naive_local(),
            CalendarZone::Fixed { offset_seconds } => ts
                .with_timezone(&self.fixed_offset(offset_seconds)?)
                .naive_local(),
        })
    }

    /// Calendar date of an instant in this zone.
    pub fn date_of(self, ts: DateTime<Utc>) -> Result<NaiveDate> {
        Ok(self.to_local(ts)?.date())
    }

    fn fixed_offset(self, offset_seconds: i32) -> Result<FixedOffset> {
        FixedOffset::east_opt(offset_seconds)
            .ok_or_else(|| Error::config(format!("offset {offset_seconds}s is out of range")))
    }
}

impl fmt::Display for CalendarZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarZone::Local => f.write_str("local"),
            CalendarZone::Utc => f.write_str("utc"),
            CalendarZone::Fixed { offset_seconds } => {
                let sign = if *offset_seconds < 0 { '-' } else { '+' };
                let abs = offset_seconds.unsigned_abs();
                write!(f, "{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60)
            }
        }
    }
}

impl FromStr for CalendarZone {
    type Err = Error;

    /// Parse `local`, `utc`, or an offset such as `+02:00` / `-0530`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "local" => return Ok(CalendarZone::Local),
            "utc" | "z" => return Ok(CalendarZone::Utc),
            _ => {}
        }

        let invalid = || Error::config(format!("unrecognized time zone '{s}'"));
        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'+') => (1, &trimmed[1..]),
            Some(b'-') => (-1, &trimmed[1..]),
            _ => return Err(invalid()),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }
        let offset_seconds = sign * (hours * 3600 + minutes * 60);
        FixedOffset::east_opt(offset_seconds).ok_or_else(invalid)?;
        Ok(CalendarZone::Fixed { offset_seconds })
    }
}
