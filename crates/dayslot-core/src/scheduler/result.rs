//! Schedule result assembly and the human-readable rationale.

use serde::{Deserialize, Serialize};

use super::matcher::ScheduledTask;
use crate::task::Task;
use crate::timeline::FreeSlot;

/// Outcome of one matching pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub scheduled: Vec<ScheduledTask>,
    pub unscheduled: Vec<Task>,
    pub explanation: String,
    /// `true` iff every task was placed
    pub success: bool,
}

impl ScheduleResult {
    /// Package a pass. `original_slots` is the pre-consumption snapshot,
    /// used for the fragmentation tip.
    pub fn assemble(
        scheduled: Vec<ScheduledTask>,
        unscheduled: Vec<Task>,
        original_slots: &[FreeSlot],
    ) -> Self {
        let explanation = explain(&scheduled, &unscheduled, original_slots);
        Self {
            success: unscheduled.is_empty(),
            scheduled,
            unscheduled,
            explanation,
        }
    }

    /// Total minutes placed.
    pub fn scheduled_minutes(&self) -> i64 {
        self.scheduled.iter().map(ScheduledTask::duration_minutes).sum()
    }
}

/// Render the explanation for a pass.
pub fn explain(
    scheduled: &[ScheduledTask],
    unscheduled: &[Task],
    original_slots: &[FreeSlot],
) -> String {
    if scheduled.is_empty() && unscheduled.is_empty() {
        return "No tasks to schedule.".to_string();
    }

    let mut sections: Vec<String> = Vec::new();

    if !scheduled.is_empty() {
        let mut lines = vec![format!("Scheduled {} task(s):", scheduled.len())];
        lines.extend(scheduled.iter().map(|placed| {
            format!(
                "  - {} ({}-{}) [{} priority]",
                placed.task.title,
                placed.start.format("%H:%M"),
                placed.end.format("%H:%M"),
                placed.task.priority
            )
        }));
        sections.push(lines.join("\n"));
    }

    if !unscheduled.is_empty() {
        let mut lines = vec![format!("Could not schedule {} task(s):", unscheduled.len())];
        lines.extend(unscheduled.iter().map(|task| {
            format!(
                "  - {} ({}m) - no suitable gap found",
                task.title, task.duration_minutes
            )
        }));
        sections.push(lines.join("\n"));

        let total_free: i64 = original_slots.iter().map(|s| s.duration_minutes).sum();
        sections.push(format!(
            "Tip: you have {total_free} minutes of free time, but it may be fragmented across multiple small gaps."
        ));
    }

    sections.join("\n\n")
}
