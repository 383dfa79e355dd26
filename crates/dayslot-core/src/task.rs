//! Task records and their ingestion from loosely typed payloads.
//!
//! Tasks reach the core as map-like JSON, either typed in by a user or
//! extracted from free text by an external language model. [`RawTask`]
//! accepts anything; [`Task::try_from`] turns it into a validated record so
//! nothing downstream has to re-check fields.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::timeline::{parse_datetime, BusyEvent};

/// Maximum number of tasks accepted in one batch.
pub const MAX_TASKS: usize = 50;
/// Maximum number of busy events accepted in one request.
pub const MAX_EVENTS: usize = 100;
/// Longest accepted task title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;
/// Shortest accepted task, in minutes.
pub const MIN_TASK_MINUTES: i64 = 5;
/// Longest accepted task, eight hours.
pub const MAX_TASK_MINUTES: i64 = 8 * 60;

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(ValidationError::invalid(
                "priority",
                format!("'{other}' is not one of high, medium, low"),
            )),
        }
    }
}

/// Explicit time-of-day preference attached to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePreference {
    Morning,
    Midday,
    Afternoon,
    Evening,
}

impl TimePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Midday => "midday",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }
}

impl fmt::Display for TimePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimePreference {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(Self::Morning),
            "midday" | "noon" => Ok(Self::Midday),
            "afternoon" => Ok(Self::Afternoon),
            "evening" | "night" => Ok(Self::Evening),
            other => Err(ValidationError::invalid(
                "time_preference",
                format!("'{other}' is not one of morning, midday, afternoon, evening"),
            )),
        }
    }
}

/// A validated task, immutable for the duration of a scheduling pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub duration_minutes: i64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_preference: Option<TimePreference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        duration_minutes: i64,
        priority: Priority,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration_minutes,
            priority,
            deadline: None,
            time_preference: None,
            reasoning: None,
        }
    }

    pub fn with_deadline(mut self, deadline: NaiveDateTime) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_time_preference(mut self, preference: TimePreference) -> Self {
        self.time_preference = Some(preference);
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

/// Untyped task payload as it arrives at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTask {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "task_name", alias = "name")]
    pub title: Option<String>,
    #[serde(default, alias = "duration", alias = "estimated_duration_minutes")]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub time_preference: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl TryFrom<RawTask> for Task {
    type Error = ValidationError;

    fn try_from(raw: RawTask) -> std::result::Result<Self, Self::Error> {
        let title = raw
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ValidationError::missing("title"))?;
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(ValidationError::invalid(
                "title",
                format!("must be {MAX_TITLE_CHARS} characters or less"),
            ));
        }

        let duration_minutes = raw
            .duration_minutes
            .ok_or_else(|| ValidationError::missing("duration_minutes"))?;
        if !(MIN_TASK_MINUTES..=MAX_TASK_MINUTES).contains(&duration_minutes) {
            return Err(ValidationError::invalid(
                "duration_minutes",
                format!("{duration_minutes} is outside {MIN_TASK_MINUTES}..={MAX_TASK_MINUTES}"),
            ));
        }

        let priority = match raw.priority.as_deref() {
            None => Priority::default(),
            Some(value) => value.parse()?,
        };

        let time_preference = raw.time_preference.as_deref().and_then(|value| {
            value
                .parse()
                .map_err(|err| tracing::warn!(%title, %err, "ignoring time preference"))
                .ok()
        });

        let deadline = raw.deadline.as_deref().and_then(|value| {
            let parsed = parse_deadline(value);
            if parsed.is_none() {
                tracing::warn!(%title, deadline = value, "unparseable deadline, treating as none");
            }
            parsed
        });

        Ok(Task {
            id: raw.id.filter(|id| !id.trim().is_empty()).unwrap_or_default(),
            title,
            duration_minutes,
            priority,
            deadline,
            time_preference,
            reasoning: raw.reasoning.filter(|r| !r.trim().is_empty()),
        })
    }
}

/// Parse an ISO date (`YYYY-MM-DD`, taken as midnight) or date-time.
pub fn parse_deadline(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    parse_datetime(value).or_else(|| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .map(|d| d.and_time(chrono::NaiveTime::MIN))
    })
}

/// A task that failed validation, with its position in the input batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedTask {
    pub index: usize,
    pub reason: ValidationError,
}

/// Outcome of ingesting a batch of raw tasks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub tasks: Vec<Task>,
    pub rejected: Vec<RejectedTask>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Validate a batch of raw tasks.
///
/// Only an oversized batch is an error; individually malformed tasks are
/// reported in [`IngestReport::rejected`] and the rest go through. Tasks
/// without an id get a positional one (`task_1`, `task_2`, ...) that does
/// not clash with any explicit id; a repeated explicit id is rejected.
pub fn ingest_tasks(raw: Vec<RawTask>) -> Result<IngestReport> {
    check_task_count(raw.len())?;
    Ok(ingest(raw.into_iter().map(Ok)))
}

/// [`ingest_tasks`] for untyped JSON entries.
///
/// An entry that does not even have the shape of a task (wrong field
/// types, not an object) is rejected on its own like any other invalid
/// task.
pub fn ingest_values(values: Vec<serde_json::Value>) -> Result<IngestReport> {
    check_task_count(values.len())?;
    Ok(ingest(values.into_iter().map(|value| {
        serde_json::from_value::<RawTask>(value)
            .map_err(|err| ValidationError::invalid("task", err.to_string()))
    })))
}

/// Decode busy events from untyped JSON entries, skipping the ones that
/// cannot be decoded.
pub fn ingest_events(values: Vec<serde_json::Value>) -> Result<Vec<BusyEvent>> {
    check_event_count(values.len())?;
    let events = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(event) => Some(event),
            Err(err) => {
                tracing::warn!(index, %err, "skipping malformed busy event");
                None
            }
        })
        .collect();
    Ok(events)
}

fn check_task_count(len: usize) -> Result<()> {
    if len > MAX_TASKS {
        return Err(ValidationError::TooMany {
            collection: "tasks".into(),
            len,
            max: MAX_TASKS,
        }
        .into());
    }
    Ok(())
}

fn ingest<I>(raw: I) -> IngestReport
where
    I: IntoIterator<Item = std::result::Result<RawTask, ValidationError>>,
{
    let mut report = IngestReport::default();
    let mut accepted: Vec<(usize, Task)> = Vec::new();
    let mut taken: HashSet<String> = HashSet::new();

    for (index, raw_task) in raw.into_iter().enumerate() {
        let validated = raw_task.and_then(Task::try_from).and_then(|task| {
            if !task.id.is_empty() && !taken.insert(task.id.clone()) {
                return Err(ValidationError::invalid(
                    "id",
                    format!("duplicate id '{}'", task.id),
                ));
            }
            Ok(task)
        });

        match validated {
            Ok(task) => accepted.push((index, task)),
            Err(reason) => {
                tracing::warn!(index, %reason, "rejecting task");
                report.rejected.push(RejectedTask { index, reason });
            }
        }
    }

    for (index, mut task) in accepted {
        if task.id.is_empty() {
            task.id = unused_id(index + 1, &taken);
            taken.insert(task.id.clone());
        }
        report.tasks.push(task);
    }
    report
}

/// `task_{position}`, suffixed until it is not in `taken`.
fn unused_id(position: usize, taken: &HashSet<String>) -> String {
    let base = format!("task_{position}");
    if !taken.contains(&base) {
        return base;
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{base}_{suffix}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Reject event batches larger than [`MAX_EVENTS`].
pub fn check_event_count(len: usize) -> Result<()> {
    if len > MAX_EVENTS {
        return Err(ValidationError::TooMany {
            collection: "events".into(),
            len,
            max: MAX_EVENTS,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, duration: i64) -> RawTask {
        RawTask {
            title: Some(title.to_string()),
            duration_minutes: Some(duration),
            ..Default::default()
        }
    }

    #[test]
    fn test_priority_parse_is_case_insensitive() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" low ".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_time_preference_parse() {
        assert_eq!("Evening".parse::<TimePreference>().unwrap(), TimePreference::Evening);
        assert_eq!("noon".parse::<TimePreference>().unwrap(), TimePreference::Midday);
        assert!("whenever".parse::<TimePreference>().is_err());
    }

    #[test]
    fn test_minimal_raw_task_defaults_to_medium() {
        let task = Task::try_from(raw("Read a book", 30)).unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.deadline.is_none());
        assert!(task.time_preference.is_none());
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let err = Task::try_from(raw("   ", 30)).unwrap_err();
        assert_eq!(err, ValidationError::missing("title"));
    }

    #[test]
    fn test_overlong_title_is_rejected() {
        let title = "x".repeat(MAX_TITLE_CHARS + 1);
        assert!(Task::try_from(raw(&title, 30)).is_err());
    }

    #[test]
    fn test_duration_bounds() {
        assert!(Task::try_from(raw("Nap", 0)).is_err());
        assert!(Task::try_from(raw("Nap", -5)).is_err());
        assert!(Task::try_from(raw("Marathon", MAX_TASK_MINUTES + 1)).is_err());
        assert!(Task::try_from(raw("Nap", MIN_TASK_MINUTES - 1)).is_err());
        assert!(Task::try_from(raw("Nap", MIN_TASK_MINUTES)).is_ok());
        assert!(Task::try_from(raw("Shift", MAX_TASK_MINUTES)).is_ok());

        let missing = RawTask {
            title: Some("Nap".into()),
            ..Default::default()
        };
        assert_eq!(
            Task::try_from(missing).unwrap_err(),
            ValidationError::missing("duration_minutes")
        );
    }

    #[test]
    fn test_invalid_priority_is_rejected() {
        let mut task = raw("Gym", 60);
        task.priority = Some("asap".into());
        assert!(Task::try_from(task).is_err());
    }

    #[test]
    fn test_unknown_time_preference_is_dropped() {
        let mut task = raw("Gym", 60);
        task.time_preference = Some("whenever".into());
        let task = Task::try_from(task).unwrap();
        assert!(task.time_preference.is_none());
    }

    #[test]
    fn test_deadline_parsing() {
        let mut task = raw("Report", 90);
        task.deadline = Some("2026-03-20".into());
        let parsed = Task::try_from(task).unwrap();
        assert_eq!(
            parsed.deadline,
            NaiveDate::from_ymd_opt(2026, 3, 20).unwrap().and_hms_opt(0, 0, 0)
        );

        let mut task = raw("Report", 90);
        task.deadline = Some("next tuesday-ish".into());
        assert!(Task::try_from(task).unwrap().deadline.is_none());
    }

    #[test]
    fn test_raw_task_accepts_aliases() {
        let raw: RawTask = serde_json::from_str(
            r#"{"task_name": "Dinner", "duration": 45, "priority": "high", "time_preference": "evening"}"#,
        )
        .unwrap();
        let task = Task::try_from(raw).unwrap();
        assert_eq!(task.title, "Dinner");
        assert_eq!(task.duration_minutes, 45);
        assert_eq!(task.time_preference, Some(TimePreference::Evening));
    }

    #[test]
    fn test_ingest_collects_rejections_and_assigns_ids() {
        let batch = vec![
            raw("Study", 90),
            raw("", 30),
            RawTask {
                id: Some("gym".into()),
                ..raw("Gym", 60)
            },
        ];
        let report = ingest_tasks(batch).unwrap();

        assert_eq!(report.tasks.len(), 2);
        assert_eq!(report.tasks[0].id, "task_1");
        assert_eq!(report.tasks[1].id, "gym");
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_ingest_rejects_oversized_batch() {
        let batch = vec![raw("Task", 10); MAX_TASKS + 1];
        assert!(ingest_tasks(batch).is_err());
    }

    #[test]
    fn test_generated_ids_skip_explicit_ones() {
        let batch = vec![
            raw("Study", 90),
            raw("Email", 15),
            RawTask {
                id: Some("task_2".into()),
                ..raw("Gym", 60)
            },
        ];
        let report = ingest_tasks(batch).unwrap();

        let ids: Vec<&str> = report.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["task_1", "task_2_2", "task_2"]);
        assert!(report.is_clean());
    }

    #[test]
    fn test_repeated_explicit_id_is_rejected() {
        let batch = vec![
            RawTask {
                id: Some("gym".into()),
                ..raw("Gym", 60)
            },
            RawTask {
                id: Some("gym".into()),
                ..raw("Gym again", 30)
            },
        ];
        let report = ingest_tasks(batch).unwrap();

        assert_eq!(report.tasks.len(), 1);
        assert_eq!(report.tasks[0].title, "Gym");
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 1);
    }

    #[test]
    fn test_wrongly_typed_entries_are_rejected_individually() {
        let values: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                {"title": "Read", "duration_minutes": 30},
                {"title": "Write", "duration_minutes": "45"},
                30.5,
                null,
                {"title": "Walk", "duration_minutes": 20}
            ]"#,
        )
        .unwrap();
        let report = ingest_values(values).unwrap();

        let titles: Vec<&str> = report.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Read", "Walk"]);
        assert_eq!(report.tasks[1].id, "task_5");

        let rejected: Vec<usize> = report.rejected.iter().map(|r| r.index).collect();
        assert_eq!(rejected, vec![1, 2, 3]);
        assert!(report
            .rejected
            .iter()
            .all(|r| matches!(r.reason, ValidationError::InvalidValue { .. })));
    }

    #[test]
    fn test_ingest_values_rejects_oversized_batch() {
        let values = vec![serde_json::json!({"title": "Task", "duration_minutes": 10}); MAX_TASKS + 1];
        assert!(ingest_values(values).is_err());
    }

    #[test]
    fn test_malformed_events_are_skipped_individually() {
        let values: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                {"start": "09:00", "end": "10:00"},
                {"start": 900, "end": "10:00"},
                "lunch",
                {"start_time": "12:00", "end_time": "13:00"}
            ]"#,
        )
        .unwrap();
        let events = ingest_events(values).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].start.as_deref(), Some("09:00"));
        assert_eq!(events[1].start.as_deref(), Some("12:00"));
    }

    #[test]
    fn test_event_count_limit() {
        assert!(check_event_count(MAX_EVENTS).is_ok());
        assert!(check_event_count(MAX_EVENTS + 1).is_err());
    }
}
