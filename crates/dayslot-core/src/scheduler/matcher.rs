//! Greedy task-to-gap matching.
//!
//! Each task, in priority order, takes the qualifying gap with the highest
//! fit score; the gap then shrinks from the front. There is no backtracking,
//! so a pass is a single deterministic sweep over the task list.

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::priority::prioritize;
use super::result::ScheduleResult;
use super::scoring::{FitScore, ScoringConfig};
use crate::task::Task;
use crate::timeline::FreeSlot;

/// Working copy of a free slot, consumed during one matching pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Gap {
    /// Position of the originating slot in the input sequence
    pub slot_index: usize,
    pub slot_id: String,
    pub start: NaiveDateTime,
    pub duration_minutes: i64,
}

impl Gap {
    pub fn from_slot(slot_index: usize, slot: &FreeSlot) -> Self {
        Self {
            slot_index,
            slot_id: slot.id.clone(),
            start: slot.start,
            duration_minutes: slot.duration_minutes,
        }
    }

    pub fn start_hour(&self) -> u32 {
        self.start.hour()
    }

    pub fn can_fit(&self, minutes: i64) -> bool {
        self.duration_minutes >= minutes
    }

    /// Take `minutes` off the front of the gap.
    fn consume(&mut self, minutes: i64) {
        self.start += Duration::minutes(minutes);
        self.duration_minutes -= minutes;
    }
}

/// A task placed into a gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub task: Task,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Index of the free slot the task was placed in
    pub gap_index: usize,
    pub slot_id: String,
    pub fit_score: f64,
    pub explanation: String,
}

impl ScheduledTask {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Greedy matcher. Holds only configuration, so one instance can serve any
/// number of independent passes.
#[derive(Debug, Clone, Default)]
pub struct GapMatcher {
    config: ScoringConfig,
}

impl GapMatcher {
    /// Create a matcher with the default scoring table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Assign `tasks` to the free `slots`.
    ///
    /// The slots are cloned into a private gap list; the caller's snapshot is
    /// never modified and is used as-is for the fragmentation tip.
    pub fn match_tasks(&self, tasks: &[Task], slots: &[FreeSlot]) -> ScheduleResult {
        let mut gaps: Vec<Gap> = slots
            .iter()
            .enumerate()
            .map(|(index, slot)| Gap::from_slot(index, slot))
            .collect();

        let mut scheduled = Vec::new();
        let mut unscheduled = Vec::new();

        for task in prioritize(tasks, &self.config.weights) {
            let Some((position, score)) = self.best_gap(&task, &gaps) else {
                tracing::debug!(task = %task.title, minutes = task.duration_minutes, "no gap fits");
                unscheduled.push(task);
                continue;
            };

            let minutes = task.duration_minutes;
            let gap = &mut gaps[position];
            let start = gap.start;
            let end = start + Duration::minutes(minutes);
            let explanation = explain_placement(&task, gap, &score);

            tracing::debug!(
                task = %task.title,
                slot = %gap.slot_id,
                %start,
                score = score.total,
                "placed task"
            );

            scheduled.push(ScheduledTask {
                gap_index: gap.slot_index,
                slot_id: gap.slot_id.clone(),
                start,
                end,
                fit_score: score.total,
                explanation,
                task,
            });

            gap.consume(minutes);
            if gap.duration_minutes <= 0 {
                gaps.remove(position);
            }
        }

        ScheduleResult::assemble(scheduled, unscheduled, slots)
    }

    /// Highest scoring gap that can hold `task`. Ties go to the earliest gap.
    pub fn best_gap(&self, task: &Task, gaps: &[Gap]) -> Option<(usize, FitScore)> {
        let mut best: Option<(usize, FitScore)> = None;

        for (position, gap) in gaps.iter().enumerate() {
            if !gap.can_fit(task.duration_minutes) {
                continue;
            }
            let score = self.config.fit_score(task, gap);
            let better = match &best {
                Some((_, current)) => score.total > current.total,
                None => true,
            };
            if better {
                best = Some((position, score));
            }
        }

        best
    }
}

fn explain_placement(task: &Task, gap: &Gap, score: &FitScore) -> String {
    format!(
        "{} uses {} of {} free minutes in {} ({} priority, {}); score {:.2}",
        task.title,
        task.duration_minutes,
        gap.duration_minutes,
        gap.slot_id,
        task.priority,
        score.time_fit,
        score.total
    )
}

/// Match with the default scoring table.
pub fn match_tasks_to_gaps(tasks: &[Task], slots: &[FreeSlot]) -> ScheduleResult {
    GapMatcher::new().match_tasks(tasks, slots)
}
