use chrono::NaiveDate;
use clap::Args;
use dayslot_core::{ingest_values, Config, GapMatcher, SlotFinder};

use super::read_json_array;
use super::slots::load_events;

#[derive(Args)]
pub struct PlanArgs {
    /// Target date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,
    /// JSON array of tasks, `-` for stdin
    #[arg(long)]
    pub tasks: String,
    /// JSON array of busy events, `-` for stdin
    #[arg(long)]
    pub events: Option<String>,
    /// Print the explanation instead of JSON
    #[arg(long, conflicts_with = "proposals")]
    pub text: bool,
    /// Print placements as proposals
    #[arg(long)]
    pub proposals: bool,
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.tasks == "-" && args.events.as_deref() == Some("-") {
        return Err("only one of --tasks and --events can read from stdin".into());
    }

    let config = Config::load_or_default();
    let window = config.day_window()?;

    let report = ingest_values(read_json_array(&args.tasks)?)?;
    tracing::debug!(
        accepted = report.tasks.len(),
        rejected = report.rejected.len(),
        "ingested tasks"
    );
    for rejected in &report.rejected {
        eprintln!("skipped task #{}: {}", rejected.index + 1, rejected.reason);
    }

    let events = load_events(args.events.as_deref())?;
    let slots = SlotFinder::new(window).find_slots(&events, args.date);
    let result = GapMatcher::with_config(config.scoring).match_tasks(&report.tasks, &slots);

    if args.text {
        println!("{}", result.explanation);
    } else if args.proposals {
        println!("{}", serde_json::to_string_pretty(&result.proposals())?);
    } else {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}
