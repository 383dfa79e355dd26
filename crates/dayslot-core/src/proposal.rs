//! Placement proposals exchanged with downstream storage and calendar commit.
//!
//! An external natural-language assignment service returns placements in
//! this shape. The structured matcher produces the same records through
//! [`ScheduleResult::proposals`], so either path can feed the same
//! consumers.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::scheduler::{ScheduleResult, ScheduledTask};
use crate::timeline::{parse_clock, TimeInterval};

/// A proposed placement for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub task_name: String,
    pub estimated_duration_minutes: i64,
    /// `YYYY-MM-DD`
    pub assigned_date: String,
    /// `HH:MM`
    pub assigned_start_time: String,
    /// `HH:MM`
    pub assigned_end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Proposal {
    /// Recover the proposed interval.
    ///
    /// An end time earlier than the start is read as crossing midnight.
    /// Returns `None` if the date or either time cannot be parsed.
    pub fn interval(&self) -> Option<TimeInterval> {
        let date = NaiveDate::parse_from_str(self.assigned_date.trim(), "%Y-%m-%d").ok()?;
        let start_time: NaiveTime = parse_clock(&self.assigned_start_time)?;
        let end_time: NaiveTime = parse_clock(&self.assigned_end_time)?;

        let start = date.and_time(start_time);
        let mut end = date.and_time(end_time);
        if end < start {
            end += Duration::days(1);
        }
        TimeInterval::new(start, end)
    }
}

impl From<&ScheduledTask> for Proposal {
    fn from(placed: &ScheduledTask) -> Self {
        Self {
            task_name: placed.task.title.clone(),
            estimated_duration_minutes: placed.task.duration_minutes,
            assigned_date: placed.start.format("%Y-%m-%d").to_string(),
            assigned_start_time: placed.start.format("%H:%M").to_string(),
            assigned_end_time: placed.end.format("%H:%M").to_string(),
            reasoning: Some(
                placed
                    .task
                    .reasoning
                    .clone()
                    .unwrap_or_else(|| placed.explanation.clone()),
            ),
        }
    }
}

impl ScheduleResult {
    /// Scheduled tasks as proposals, in placement order.
    pub fn proposals(&self) -> Vec<Proposal> {
        self.scheduled.iter().map(Proposal::from).collect()
    }
}
