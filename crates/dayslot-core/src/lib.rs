//! # Dayslot Core Library
//!
//! This library provides the planning logic behind the `dayslot` CLI: given
//! the fixed commitments of one day, it finds the free time left over and
//! places a batch of tasks into it.
//!
//! ## Architecture
//!
//! - **Timeline**: Busy span parsing, sleep window splitting, merging, and
//!   inversion into free slots
//! - **Scheduler**: Task prioritization and greedy best-fit placement with
//!   time-of-day scoring
//! - **Ingestion**: Validation of raw task payloads into typed tasks
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`compute_free_slots`]: Free slots for one date
//! - [`match_tasks_to_gaps`]: Place tasks into those slots
//! - [`ScheduleResult`]: Placements, leftovers, and a readable rationale
//! - [`Config`]: Application configuration management

pub mod error;
pub mod proposal;
pub mod scheduler;
pub mod storage;
pub mod task;
pub mod timeline;

pub use error::{ConfigError, CoreError, ValidationError};
pub use proposal::Proposal;
pub use scheduler::{
    match_tasks_to_gaps, prioritize_tasks, GapMatcher, ScheduleResult, ScheduledTask,
    ScoringConfig,
};
pub use storage::{Config, DayConfig};
pub use task::{
    ingest_events, ingest_tasks, ingest_values, IngestReport, Priority, RawTask, Task, TimePreference};
pub use timeline::{compute_free_slots, BusyEvent, DayWindow, FreeSlot, SlotFinder, SleepWindow};
