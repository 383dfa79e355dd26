//! Free slot computation.
//!
//! Inverts a merged [`BusyCalendar`] against the bounds of one day and
//! returns the chronologically ordered free windows that are long enough to
//! be useful.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::interval::{ceil_minute, clock, BusyCalendar, BusyEvent, SleepWindow, TimeInterval};

/// Default minimum free slot length in minutes.
pub const DEFAULT_MIN_SLOT_MINUTES: i64 = 15;

/// A free window of time. Ids are sequential within one computation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
}

impl FreeSlot {
    fn new(sequence: usize, interval: TimeInterval) -> Self {
        Self {
            id: format!("slot_{sequence}"),
            start: interval.start,
            end: interval.end,
            duration_minutes: interval.duration_minutes(),
        }
    }

    pub fn interval(&self) -> TimeInterval {
        TimeInterval {
            start: self.start,
            end: self.end,
        }
    }

    /// Check if this slot can fit a task of given duration
    pub fn can_fit(&self, minutes: i64) -> bool {
        self.duration_minutes >= minutes
    }
}

/// Bounds and sleep settings for one day of planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayWindow {
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub sleep: SleepWindow,
    pub min_slot_minutes: i64,
    /// Skip time that has already passed when planning for today.
    pub start_from_now: bool,
}

impl Default for DayWindow {
    fn default() -> Self {
        Self {
            day_start: NaiveTime::MIN,
            day_end: clock(23, 59),
            sleep: SleepWindow::default(),
            min_slot_minutes: DEFAULT_MIN_SLOT_MINUTES,
            start_from_now: false,
        }
    }
}

impl DayWindow {
    pub fn with_bounds(mut self, day_start: NaiveTime, day_end: NaiveTime) -> Self {
        self.day_start = day_start;
        self.day_end = day_end;
        self
    }

    pub fn with_sleep(mut self, sleep: SleepWindow) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn with_min_slot(mut self, minutes: i64) -> Self {
        self.min_slot_minutes = minutes;
        self
    }

    pub fn with_start_from_now(mut self, enabled: bool) -> Self {
        self.start_from_now = enabled;
        self
    }
}

/// Computes free slots for a day.
///
/// The clock used for "start from now" can be pinned with
/// [`SlotFinder::with_now`]; otherwise the local wall clock is read.
pub struct SlotFinder {
    window: DayWindow,
    now: Option<NaiveDateTime>,
}

impl SlotFinder {
    pub fn new(window: DayWindow) -> Self {
        Self { window, now: None }
    }

    /// Pin the current time.
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// `[effective_start, day_end]` for `date`.
    ///
    /// Returns `None` when nothing of the day remains, e.g. "now" is already
    /// past the end of the day.
    pub fn effective_bounds(&self, date: NaiveDate) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let day_start = date.and_time(self.window.day_start);
        let day_end = date.and_time(self.window.day_end);

        let mut effective_start = day_start;
        if self.window.start_from_now {
            let now = self.now.unwrap_or_else(|| Local::now().naive_local());
            if now.date() == date {
                effective_start = effective_start.max(ceil_minute(now));
            }
        }

        (effective_start < day_end).then_some((effective_start, day_end))
    }

    /// Merge events and sleep for `date` into the busy calendar.
    pub fn busy_calendar(&self, events: &[BusyEvent], date: NaiveDate) -> BusyCalendar {
        let day_start = date.and_time(self.window.day_start);
        let day_end = date.and_time(self.window.day_end);
        BusyCalendar::build(events, &self.window.sleep, date, day_start, day_end)
    }

    /// Free slots for `date` around the given busy events.
    pub fn find_slots(&self, events: &[BusyEvent], date: NaiveDate) -> Vec<FreeSlot> {
        let Some((effective_start, day_end)) = self.effective_bounds(date) else {
            tracing::debug!(%date, "day already over, no free slots");
            return Vec::new();
        };

        let busy = self.busy_calendar(events, date);
        let slots = invert(&busy, effective_start, day_end, self.window.min_slot_minutes);

        tracing::debug!(
            %date,
            busy_intervals = busy.len(),
            busy_minutes = busy.total_minutes(),
            free_slots = slots.len(),
            "computed free slots"
        );
        slots
    }
}

impl Default for SlotFinder {
    fn default() -> Self {
        Self::new(DayWindow::default())
    }
}

/// Complement of `busy` within `[start, end]`, keeping only windows of at
/// least `min_slot_minutes`.
pub fn invert(
    busy: &BusyCalendar,
    start: NaiveDateTime,
    end: NaiveDateTime,
    min_slot_minutes: i64,
) -> Vec<FreeSlot> {
    if start >= end {
        return Vec::new();
    }

    let mut slots = Vec::new();
    let mut cursor = start;

    let mut emit = |from: NaiveDateTime, to: NaiveDateTime| {
        if let Some(interval) = TimeInterval::new(from, to) {
            if interval.duration_minutes() >= min_slot_minutes {
                slots.push(FreeSlot::new(slots.len() + 1, interval));
            }
        }
    };

    for interval in busy {
        if cursor >= end {
            break;
        }
        if interval.start > cursor {
            emit(cursor, interval.start.min(end));
        }
        cursor = cursor.max(interval.end);
    }

    if cursor < end {
        emit(cursor, end);
    }

    slots
}

/// Free slots for `date` using `window`, reading the local clock when
/// `start_from_now` is set.
pub fn compute_free_slots(
    events: &[BusyEvent],
    date: NaiveDate,
    window: &DayWindow,
) -> Vec<FreeSlot> {
    SlotFinder::new(window.clone()).find_slots(events, date)
}
