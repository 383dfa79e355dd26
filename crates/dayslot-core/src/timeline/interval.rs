//! Busy interval normalization and merging.
//!
//! Raw busy spans (calendar events, already placed tasks) arrive as loosely
//! typed strings. Each one is parsed against the target day, clamped to the
//! day bounds and merged together with the sleep window into a sorted,
//! non-overlapping [`BusyCalendar`]. Spans that cannot be parsed are skipped.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Half-open time span `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeInterval {
    /// Create an interval, or `None` when it would be empty or inverted.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Get duration in minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Truncate to `[lo, hi]`. Returns `None` if nothing is left.
    pub fn clamp(&self, lo: NaiveDateTime, hi: NaiveDateTime) -> Option<Self> {
        Self::new(self.start.max(lo), self.end.min(hi))
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    fn is_valid(&self) -> bool {
        self.start < self.end
    }
}

/// A raw busy span as supplied by a calendar source or by the user.
///
/// Both `start`/`end` and `start_time`/`end_time` keys are accepted. Values
/// are either full date-times or bare `HH:MM` clock times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusyEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, alias = "start_time")]
    pub start: Option<String>,
    #[serde(default, alias = "end_time")]
    pub end: Option<String>,
}

impl BusyEvent {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            title: None,
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Resolve this span against `date`.
    ///
    /// Starts are rounded down and ends rounded up to whole minutes so the
    /// busy time is never under-reported. Returns `None` when an endpoint is
    /// missing or unparseable, or when the span is empty.
    pub fn interval(&self, date: NaiveDate) -> Option<TimeInterval> {
        let start = parse_timestamp(self.start.as_deref()?, date)?;
        let end = parse_timestamp(self.end.as_deref()?, date)?;
        TimeInterval::new(floor_minute(start), ceil_minute(end))
    }
}

/// Sleep window given as two clock times; may wrap past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SleepWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }

    /// Busy intervals this window occupies on `date`, clamped to the day.
    ///
    /// A wrapping window (e.g. 23:00-07:00) yields the evening part up to the
    /// end of the day plus the early-morning part from the start of the day.
    pub fn intervals(
        &self,
        date: NaiveDate,
        day_start: NaiveDateTime,
        day_end: NaiveDateTime,
    ) -> Vec<TimeInterval> {
        let sleep_start = date.and_time(self.start);
        let sleep_end = date.and_time(self.end);

        let spans = if self.wraps_midnight() {
            vec![(sleep_start, day_end), (day_start, sleep_end)]
        } else {
            vec![(sleep_start, sleep_end)]
        };

        spans
            .into_iter()
            .filter_map(|(start, end)| TimeInterval::new(start, end)?.clamp(day_start, day_end))
            .collect()
    }
}

impl Default for SleepWindow {
    fn default() -> Self {
        Self {
            start: clock(23, 0),
            end: clock(7, 0),
        }
    }
}

/// Sort and coalesce intervals into a minimal non-overlapping sequence.
///
/// Touching intervals (`next.start == current.end`) are merged too. Empty or
/// inverted intervals are discarded. Merging an already merged sequence
/// returns it unchanged.
pub fn merge_intervals<I>(intervals: I) -> Vec<TimeInterval>
where
    I: IntoIterator<Item = TimeInterval>,
{
    let mut sorted: Vec<TimeInterval> = intervals.into_iter().filter(|i| i.is_valid()).collect();
    sorted.sort_by_key(|i| i.start);

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(current) if interval.start <= current.end => {
                current.end = current.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Merged busy time for one day. Built per request and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyCalendar {
    intervals: Vec<TimeInterval>,
}

impl BusyCalendar {
    /// Merge an arbitrary collection of intervals.
    pub fn from_intervals<I>(intervals: I) -> Self
    where
        I: IntoIterator<Item = TimeInterval>,
    {
        Self {
            intervals: merge_intervals(intervals),
        }
    }

    /// Build the busy calendar for `date` from raw events and a sleep window.
    ///
    /// Every span is clamped to `[day_start, day_end]`; spans falling fully
    /// outside the day are dropped and malformed ones are skipped.
    pub fn build(
        events: &[BusyEvent],
        sleep: &SleepWindow,
        date: NaiveDate,
        day_start: NaiveDateTime,
        day_end: NaiveDateTime,
    ) -> Self {
        let mut spans = sleep.intervals(date, day_start, day_end);

        for (index, event) in events.iter().enumerate() {
            match event.interval(date) {
                Some(interval) => {
                    if let Some(clamped) = interval.clamp(day_start, day_end) {
                        spans.push(clamped);
                    }
                }
                None => {
                    tracing::warn!(
                        index,
                        title = ?event.title,
                        start = ?event.start,
                        end = ?event.end,
                        "skipping malformed busy event"
                    );
                }
            }
        }

        Self::from_intervals(spans)
    }

    pub fn intervals(&self) -> &[TimeInterval] {
        &self.intervals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeInterval> {
        self.intervals.iter()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Total busy minutes.
    pub fn total_minutes(&self) -> i64 {
        self.intervals.iter().map(TimeInterval::duration_minutes).sum()
    }

    pub fn is_busy_at(&self, instant: NaiveDateTime) -> bool {
        self.intervals.iter().any(|i| i.contains(instant))
    }
}

impl<'a> IntoIterator for &'a BusyCalendar {
    type Item = &'a TimeInterval;
    type IntoIter = std::slice::Iter<'a, TimeInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Parse a bare `HH:MM` clock time.
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Parse a timestamp that is either a full date-time or a bare `HH:MM`
/// interpreted on `date`.
///
/// Values carrying a UTC offset keep their wall-clock time; the offset is
/// dropped.
pub fn parse_timestamp(value: &str, date: NaiveDate) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(time) = parse_clock(value) {
        return Some(date.and_time(time));
    }

    parse_datetime(value)
}

/// Parse a full date-time in any of the accepted layouts.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    const LAYOUTS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    let value = value.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_local());
    }

    LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
}

pub(crate) fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

pub(crate) fn floor_minute(instant: NaiveDateTime) -> NaiveDateTime {
    instant
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(instant)
}

pub(crate) fn ceil_minute(instant: NaiveDateTime) -> NaiveDateTime {
    let floored = floor_minute(instant);
    if floored == instant {
        instant
    } else {
        floored + Duration::minutes(1)
    }
}
