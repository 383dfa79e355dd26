//! Busy time and free slot computation.
//!
//! This module provides:
//! - Parsing and merging of busy spans (events, sleep, placed tasks)
//! - Inversion of the merged busy calendar into free slots

mod interval;
mod slots;

pub use interval::{
    merge_intervals, parse_clock, parse_datetime, parse_timestamp, BusyCalendar, BusyEvent,
    SleepWindow, TimeInterval,
};
pub use slots::{
    compute_free_slots, invert, DayWindow, FreeSlot, SlotFinder, DEFAULT_MIN_SLOT_MINUTES,
};
