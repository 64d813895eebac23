use clap::Subcommand;

use super::{open_tracker, print_json, CommandResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Finished fasts, newest first
    List {
        /// Maximum number of fasts to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Fasting minutes per day
    Daily {
        /// Number of days back from today (1 to 3650)
        #[arg(long, default_value = "7", value_parser = clap::value_parser!(u32).range(1..=3650))]
        days: u32,
    },
}

pub async fn run(action: HistoryAction) -> CommandResult {
    let tracker = open_tracker().await?;

    match action {
        HistoryAction::List { limit } => {
            let history = tracker.history();
            print_json(&history[..limit.min(history.len())])?;
        }
        HistoryAction::Daily { days } => {
            print_json(&tracker.daily_totals(days))?;
        }
    }
    Ok(())
}
