use chrono::NaiveDate;
use clap::Args;
use dayslot_core::{ingest_events, BusyEvent, Config, DayConfig, SlotFinder};

use super::read_json_array;

#[derive(Args)]
pub struct SlotsArgs {
    /// Target date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,
    /// JSON array of busy events, `-` for stdin
    #[arg(long)]
    pub events: Option<String>,
    /// Start of the planning day (HH:MM)
    #[arg(long)]
    pub day_start: Option<String>,
    /// End of the planning day (HH:MM)
    #[arg(long)]
    pub day_end: Option<String>,
    /// Bedtime (HH:MM)
    #[arg(long)]
    pub sleep_start: Option<String>,
    /// Wake-up time (HH:MM)
    #[arg(long)]
    pub sleep_end: Option<String>,
    /// Shortest slot worth reporting, in minutes
    #[arg(long)]
    pub min_slot: Option<i64>,
    /// Skip time that has already passed today
    #[arg(long)]
    pub from_now: bool,
}

impl SlotsArgs {
    /// Config values with command-line overrides applied.
    fn day_config(&self, mut day: DayConfig) -> DayConfig {
        let overrides = [
            (&self.day_start, &mut day.day_start),
            (&self.day_end, &mut day.day_end),
            (&self.sleep_start, &mut day.sleep_start),
            (&self.sleep_end, &mut day.sleep_end),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
        if let Some(minutes) = self.min_slot {
            day.min_slot_minutes = minutes;
        }
        if self.from_now {
            day.start_from_now = true;
        }
        day
    }
}

/// Load busy events from an optional file, enforcing the batch limit.
/// Entries that are not events at all are skipped.
pub fn load_events(path: Option<&str>) -> Result<Vec<BusyEvent>, Box<dyn std::error::Error>> {
    let values = match path {
        Some(path) => read_json_array(path)?,
        None => Vec::new(),
    };
    Ok(ingest_events(values)?)
}

pub fn run(args: SlotsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let window = args.day_config(config.day.clone()).to_window()?;
    let events = load_events(args.events.as_deref())?;

    let slots = SlotFinder::new(window).find_slots(&events, args.date);
    println!("{}", serde_json::to_string_pretty(&slots)?);
    Ok(())
}
