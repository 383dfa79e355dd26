//! Fit scoring for task-to-gap assignment.
//!
//! ```text
//! fit_score = efficiency + priority_boost + time_boost
//! ```
//!
//! - `efficiency` rewards tight fits: `1 - waste / gap_minutes`, in `(0, 1]`.
//! - `priority_boost` is the task's priority weight normalized by the largest
//!   weight (1.0 for high with the default weights).
//! - `time_boost` comes from the [`TimeOfDayTable`]: an explicit time
//!   preference wins, otherwise the title is classified by keyword, otherwise
//!   high-priority work gets a small nudge towards the morning peak.
//!
//! All constants live in [`ScoringConfig`] so they can be inspected, tested
//! and overridden from the config file.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::matcher::Gap;
use crate::task::{Priority, Task, TimePreference};

/// Numeric weight per priority level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityWeights {
    #[serde(default = "default_high_weight")]
    pub high: f64,
    #[serde(default = "default_medium_weight")]
    pub medium: f64,
    #[serde(default = "default_low_weight")]
    pub low: f64,
}

fn default_high_weight() -> f64 {
    3.0
}
fn default_medium_weight() -> f64 {
    2.0
}
fn default_low_weight() -> f64 {
    1.0
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            high: default_high_weight(),
            medium: default_medium_weight(),
            low: default_low_weight(),
        }
    }
}

impl PriorityWeights {
    pub fn weight(&self, priority: Priority) -> f64 {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }

    /// Weight scaled into `[0, 1]` by the largest configured weight.
    pub fn normalized(&self, priority: Priority) -> f64 {
        let max = self.high.max(self.medium).max(self.low);
        if max <= 0.0 {
            return 0.0;
        }
        self.weight(priority) / max
    }
}

/// Hours of the day `[start, end)`. Wraps past midnight when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    pub start: u32,
    pub end: u32,
}

impl HourRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, hour: u32) -> bool {
        if self.start <= self.end {
            self.start <= hour && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00-{:02}:00", self.start, self.end)
    }
}

/// Activity category inferred from a task title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Breakfast,
    Lunch,
    Dinner,
    Exercise,
    Study,
    Social,
}

impl TaskCategory {
    pub fn is_meal(&self) -> bool {
        matches!(self, Self::Breakfast | Self::Lunch | Self::Dinner)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Exercise => "exercise",
            Self::Study => "study",
            Self::Social => "social",
        }
    }
}

/// Boost/penalty for an explicit [`TimePreference`].
///
/// `penalty` is a signed value added when the gap is out of range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRule {
    pub preference: TimePreference,
    pub boost: f64,
    pub penalty: f64,
    pub hours: HourRange,
}

/// Keyword classification rule.
///
/// A keyword matches when it occurs at the start of a word in the
/// lower-cased title, so `"run"` matches "Running" but not "brunch".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: TaskCategory,
    pub keywords: Vec<String>,
    pub boost: f64,
    pub penalty: f64,
    pub hours: HourRange,
}

impl CategoryRule {
    fn new(
        category: TaskCategory,
        keywords: &[&str],
        hours: HourRange,
        boost: f64,
        penalty: f64,
    ) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            boost,
            penalty,
            hours,
        }
    }

    fn matches(&self, normalized_title: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| normalized_title.contains(&format!(" {}", keyword.to_lowercase())))
    }
}

/// Why a time boost was applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeFit {
    /// Explicit preference, gap inside its hours
    PreferenceMatched { preference: TimePreference },
    /// Explicit preference, gap outside its hours
    PreferenceMissed { preference: TimePreference },
    /// Keyword category, gap inside its hours
    CategoryMatched { category: TaskCategory },
    /// Keyword category, gap outside its hours
    CategoryMissed { category: TaskCategory },
    /// High-priority task without category placed in the peak hours
    PeakHours,
    Neutral,
}

impl fmt::Display for TimeFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreferenceMatched { preference } => write!(f, "within preferred {preference} hours"),
            Self::PreferenceMissed { preference } => write!(f, "outside preferred {preference} hours"),
            Self::CategoryMatched { category } => write!(f, "good time for {}", category.as_str()),
            Self::CategoryMissed { category } => write!(f, "unusual time for {}", category.as_str()),
            Self::PeakHours => f.write_str("peak morning hours"),
            Self::Neutral => f.write_str("no time-of-day preference"),
        }
    }
}

/// Time-of-day classification table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOfDayTable {
    pub peak_nudge: f64,
    pub peak_hours: HourRange,
    pub preferences: Vec<PreferenceRule>,
    /// Checked in order; the first matching rule wins.
    pub categories: Vec<CategoryRule>,
}

impl Default for TimeOfDayTable {
    fn default() -> Self {
        use TaskCategory::*;
        use TimePreference::*;

        let preference = |preference, start, end| PreferenceRule {
            preference,
            boost: 2.0,
            penalty: -5.0,
            hours: HourRange::new(start, end),
        };

        Self {
            peak_nudge: 0.2,
            peak_hours: HourRange::new(9, 12),
            preferences: vec![
                preference(Morning, 6, 12),
                preference(Midday, 11, 14),
                preference(Afternoon, 12, 18),
                preference(Evening, 17, 23),
            ],
            categories: vec![
                CategoryRule::new(
                    Breakfast,
                    &["breakfast", "brunch", "sarapan"],
                    HourRange::new(6, 10),
                    3.0,
                    -10.0,
                ),
                CategoryRule::new(
                    Lunch,
                    &["lunch", "makan siang"],
                    HourRange::new(11, 14),
                    3.0,
                    -10.0,
                ),
                CategoryRule::new(
                    Dinner,
                    &["dinner", "supper", "makan malam"],
                    HourRange::new(17, 21),
                    3.0,
                    -10.0,
                ),
                CategoryRule::new(
                    Exercise,
                    &["gym", "workout", "exercise", "run", "jog", "yoga", "swim", "olahraga"],
                    HourRange::new(6, 21),
                    1.0,
                    -3.0,
                ),
                CategoryRule::new(
                    Study,
                    &[
                        "study", "homework", "work", "belajar", "kerja", "read", "research",
                        "revise", "exam", "code", "coding", "report", "assignment", "meeting",
                    ],
                    HourRange::new(8, 18),
                    1.5,
                    -3.0,
                ),
                CategoryRule::new(
                    Social,
                    &["visit", "friend", "family", "party", "hangout", "hang out", "social", "meet up"],
                    HourRange::new(10, 22),
                    1.0,
                    -2.0,
                ),
            ],
        }
    }
}

impl TimeOfDayTable {
    pub fn preference_rule(&self, preference: TimePreference) -> Option<&PreferenceRule> {
        self.preferences.iter().find(|r| r.preference == preference)
    }

    /// First category rule whose keywords match `title`.
    pub fn classify(&self, title: &str) -> Option<&CategoryRule> {
        let normalized = normalize_title(title);
        self.categories.iter().find(|rule| rule.matches(&normalized))
    }

    /// Time-of-day adjustment for placing `task` in a gap starting at `hour`.
    pub fn time_boost(&self, task: &Task, hour: u32) -> (f64, TimeFit) {
        if let Some(preference) = task.time_preference {
            if let Some(rule) = self.preference_rule(preference) {
                return if rule.hours.contains(hour) {
                    (rule.boost, TimeFit::PreferenceMatched { preference })
                } else {
                    (rule.penalty, TimeFit::PreferenceMissed { preference })
                };
            }
        }

        if let Some(rule) = self.classify(&task.title) {
            let category = rule.category;
            return if rule.hours.contains(hour) {
                (rule.boost, TimeFit::CategoryMatched { category })
            } else {
                (rule.penalty, TimeFit::CategoryMissed { category })
            };
        }

        if task.priority == Priority::High && self.peak_hours.contains(hour) {
            return (self.peak_nudge, TimeFit::PeakHours);
        }

        (0.0, TimeFit::Neutral)
    }
}

/// Lower-cased words separated by single spaces, with a leading space so
/// every word start is preceded by one.
fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let words = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty());

    let mut normalized = String::with_capacity(lowered.len() + 1);
    for word in words {
        normalized.push(' ');
        normalized.push_str(word);
    }
    normalized
}

/// Scoring configuration: priority weights plus the time-of-day table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: PriorityWeights,
    #[serde(default)]
    pub time_of_day: TimeOfDayTable,
}

/// Per-component breakdown of one fit score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitScore {
    pub efficiency: f64,
    pub priority_boost: f64,
    pub time_boost: f64,
    pub time_fit: TimeFit,
    pub total: f64,
}

impl ScoringConfig {
    /// Score placing `task` at the start of `gap`.
    pub fn fit_score(&self, task: &Task, gap: &Gap) -> FitScore {
        let efficiency = if gap.duration_minutes > 0 {
            let waste = (gap.duration_minutes - task.duration_minutes) as f64;
            1.0 - waste / gap.duration_minutes as f64
        } else {
            0.0
        };
        let priority_boost = self.weights.normalized(task.priority);
        let (time_boost, time_fit) = self.time_of_day.time_boost(task, gap.start_hour());

        FitScore {
            efficiency,
            priority_boost,
            time_boost,
            time_fit,
            total: efficiency + priority_boost + time_boost,
        }
    }
}
