//! Time range types
//!
//! Stored queries carry a [`TimeRange`]; message lists may carry a
//! [`DerivedTimeRange`] that is resolved against the owning query's range.
//! Everything sent to the index resolver and the engine is an
//! [`AbsoluteRange`], a half-open `[from, to)` interval in UTC.

use super::{ExportError, Result};
use chrono::{DateTime, Duration, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open UTC interval `[from, to)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbsoluteRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl AbsoluteRange {
    /// Creates a range, rejecting `from > to`
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self> {
        if from > to {
            return Err(ExportError::Validation(format!(
                "Invalid time range: from ({}) is after to ({})",
                from.to_rfc3339(),
                to.to_rfc3339()
            )));
        }
        Ok(Self { from, to })
    }

    /// Parses two RFC 3339 timestamps
    ///
    /// ```
    /// use msgexport::domain::AbsoluteRange;
    ///
    /// let range = AbsoluteRange::parse("2015-01-01T00:00:00Z", "2015-01-01T02:00:00Z").unwrap();
    /// assert_eq!(range.duration().num_hours(), 2);
    /// ```
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        Self::new(parse_timestamp(from)?, parse_timestamp(to)?)
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.to - self.from
    }

    /// True if `timestamp` lies in `[from, to)`
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.from <= timestamp && timestamp < self.to
    }

    /// True if the closed interval `[begin, end]` intersects this range
    pub fn overlaps(&self, begin: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        begin < self.to && end >= self.from
    }

    /// Shifts the whole range back by `offset`
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Validation` if either bound leaves the
    /// representable date range.
    pub fn shifted_back(&self, offset: Duration) -> Result<Self> {
        let shift = |ts: DateTime<Utc>| {
            ts.checked_sub_signed(offset).ok_or_else(|| {
                ExportError::Validation(format!("Cannot shift time range {self} back by {offset}"))
            })
        };
        Ok(Self {
            from: shift(self.from)?,
            to: shift(self.to)?,
        })
    }
}

impl fmt::Display for AbsoluteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from.to_rfc3339(), self.to.to_rfc3339())
    }
}

/// Time range of a stored query or a raw request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimeRange {
    /// Fixed interval
    Absolute {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    /// The last `range` seconds; `0` means all time
    Relative { range: u64 },
}

impl TimeRange {
    /// Creates a validated absolute range
    pub fn absolute(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self> {
        AbsoluteRange::new(from, to)?;
        Ok(TimeRange::Absolute { from, to })
    }

    /// Creates a relative range covering the last `seconds`
    pub fn relative(seconds: u64) -> Self {
        TimeRange::Relative { range: seconds }
    }

    /// Resolves the range against `now`
    pub fn to_absolute(&self, now: DateTime<Utc>) -> Result<AbsoluteRange> {
        match self {
            TimeRange::Absolute { from, to } => AbsoluteRange::new(*from, *to),
            TimeRange::Relative { range: 0 } => AbsoluteRange::new(DateTime::<Utc>::UNIX_EPOCH, now),
            TimeRange::Relative { range } => {
                let too_large =
                    || ExportError::Validation(format!("Relative range too large: {range}s"));
                let seconds = i64::try_from(*range).map_err(|_| too_large())?;
                let from = TimeDelta::try_seconds(seconds)
                    .and_then(|delta| now.checked_sub_signed(delta))
                    .ok_or_else(too_large)?;
                AbsoluteRange::new(from, now)
            }
        }
    }
}

impl From<AbsoluteRange> for TimeRange {
    fn from(range: AbsoluteRange) -> Self {
        TimeRange::Absolute {
            from: range.from,
            to: range.to,
        }
    }
}

/// Time range override of a message list
///
/// `Offset` is resolved relative to the owning query: the query's range is
/// moved back by `intervals` times its own length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DerivedTimeRange {
    Absolute {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    Relative {
        range: u64,
    },
    Offset {
        #[serde(default = "default_offset_intervals")]
        intervals: u32,
    },
}

impl DerivedTimeRange {
    /// Effective time range for a query whose own range is `query_range`
    pub fn effective(&self, query_range: &TimeRange, now: DateTime<Utc>) -> Result<TimeRange> {
        match self {
            DerivedTimeRange::Absolute { from, to } => TimeRange::absolute(*from, *to),
            DerivedTimeRange::Relative { range } => Ok(TimeRange::relative(*range)),
            DerivedTimeRange::Offset { intervals } => {
                let base = query_range.to_absolute(now)?;
                let offset = i32::try_from(*intervals)
                    .ok()
                    .and_then(|n| base.duration().checked_mul(n))
                    .ok_or_else(|| {
                        ExportError::Validation(format!(
                            "Offset of {intervals} intervals is out of range"
                        ))
                    })?;
                Ok(base.shifted_back(offset)?.into())
            }
        }
    }
}

fn default_offset_intervals() -> u32 {
    1
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| ExportError::Validation(format!("Invalid timestamp '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> DateTime<Utc> {
        parse_timestamp(value).unwrap()
    }

    #[test]
    fn test_absolute_range_is_half_open() {
        let range = AbsoluteRange::parse("2015-01-01T00:00:00Z", "2015-01-01T02:00:00Z").unwrap();

        assert!(range.contains(ts("2015-01-01T00:00:00Z")));
        assert!(range.contains(ts("2015-01-01T01:59:59Z")));
        assert!(!range.contains(ts("2015-01-01T02:00:00Z")));
    }

    #[test]
    fn test_absolute_range_rejects_inverted_bounds() {
        let result = AbsoluteRange::parse("2015-01-02T00:00:00Z", "2015-01-01T00:00:00Z");
        assert!(matches!(result, Err(ExportError::Validation(_))));
    }

    #[test]
    fn test_relative_range_resolves_against_now() {
        let now = ts("2020-06-01T12:00:00Z");
        let range = TimeRange::relative(300).to_absolute(now).unwrap();

        assert_eq!(range.from(), ts("2020-06-01T11:55:00Z"));
        assert_eq!(range.to(), now);
    }

    #[test]
    fn test_relative_zero_means_all_time() {
        let now = ts("2020-06-01T12:00:00Z");
        let range = TimeRange::relative(0).to_absolute(now).unwrap();

        assert_eq!(range.from().timestamp(), 0);
    }

    #[test]
    fn test_offset_shifts_query_range_by_its_length() {
        let now = ts("2020-06-01T12:00:00Z");
        let query_range =
            TimeRange::absolute(ts("2015-01-01T02:00:00Z"), ts("2015-01-01T04:00:00Z")).unwrap();

        let effective = DerivedTimeRange::Offset { intervals: 1 }
            .effective(&query_range, now)
            .unwrap();

        assert_eq!(
            effective,
            TimeRange::Absolute {
                from: ts("2015-01-01T00:00:00Z"),
                to: ts("2015-01-01T02:00:00Z"),
            }
        );
    }

    #[test]
    fn test_relative_range_beyond_calendar_is_rejected() {
        let now = ts("2020-06-01T12:00:00Z");

        for seconds in [10_000_000_000_000_000, 9_000_000_000_000, u64::MAX] {
            let result = TimeRange::relative(seconds).to_absolute(now);
            assert!(
                matches!(result, Err(ExportError::Validation(_))),
                "{seconds}s should be rejected"
            );
        }
    }

    #[test]
    fn test_offset_beyond_calendar_is_rejected() {
        let now = ts("2020-06-01T12:00:00Z");
        let one_day =
            TimeRange::absolute(ts("2015-01-01T00:00:00Z"), ts("2015-01-02T00:00:00Z")).unwrap();

        for intervals in [100_000_000, u32::MAX] {
            let result = DerivedTimeRange::Offset { intervals }.effective(&one_day, now);
            assert!(
                matches!(result, Err(ExportError::Validation(_))),
                "{intervals} intervals should be rejected"
            );
        }
    }

    #[test]
    fn test_shift_past_minimum_date_is_rejected() {
        let range = AbsoluteRange::new(DateTime::<Utc>::MIN_UTC, ts("2015-01-01T00:00:00Z")).unwrap();
        assert!(range.shifted_back(Duration::seconds(1)).is_err());
        assert!(range.shifted_back(Duration::zero()).is_ok());
    }

    #[test]
    fn test_absolute_override_ignores_query_range() {
        let now = ts("2020-06-01T12:00:00Z");
        let query_range = TimeRange::relative(60);
        let effective = DerivedTimeRange::Absolute {
            from: ts("2015-01-01T00:00:00Z"),
            to: ts("2015-01-03T00:00:00Z"),
        }
        .effective(&query_range, now)
        .unwrap();

        assert!(matches!(effective, TimeRange::Absolute { .. }));
    }

    #[test]
    fn test_time_range_deserialization() {
        let json = r#"{"type": "absolute", "from": "2015-01-01T00:00:00Z", "to": "2015-01-03T00:00:00Z"}"#;
        let range: TimeRange = serde_json::from_str(json).unwrap();
        assert!(matches!(range, TimeRange::Absolute { .. }));

        let json = r#"{"type": "offset"}"#;
        let derived: DerivedTimeRange = serde_json::from_str(json).unwrap();
        assert_eq!(derived, DerivedTimeRange::Offset { intervals: 1 });
    }

    #[test]
    fn test_overlap_with_index_range() {
        let range = AbsoluteRange::parse("2015-01-01T00:00:00Z", "2015-01-01T02:00:00Z").unwrap();

        assert!(range.overlaps(ts("2014-12-31T00:00:00Z"), ts("2015-01-01T00:00:00Z")));
        assert!(!range.overlaps(ts("2015-01-01T02:00:00Z"), ts("2015-01-01T05:00:00Z")));
    }
}
