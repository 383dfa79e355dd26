//! Task scheduling into free slots.
//!
//! - [`priority`]: ordering of a task batch
//! - [`scoring`]: fit score and the time-of-day classification table
//! - [`matcher`]: greedy assignment of tasks to gaps
//! - [`result`]: result packaging and explanation text

pub mod matcher;
pub mod priority;
pub mod result;
pub mod scoring;

pub use matcher::{match_tasks_to_gaps, Gap, GapMatcher, ScheduledTask};
pub use priority::{compare_tasks, prioritize, prioritize_tasks};
pub use result::ScheduleResult;
pub use scoring::{
    CategoryRule, FitScore, HourRange, PreferenceRule, PriorityWeights, ScoringConfig,
    TaskCategory, TimeFit, TimeOfDayTable,
};
