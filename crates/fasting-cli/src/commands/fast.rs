use clap::Subcommand;
use fasting_core::plan::find_plan;
use fasting_core::{FastingState, Progress, ValidationError};
use serde::Serialize;

use super::{open_tracker, print_event, print_json, CommandResult};

#[derive(Subcommand)]
pub enum FastAction {
    /// Start a fast with the selected plan
    Start {
        /// Use this plan id instead of the selected plan
        #[arg(long)]
        plan: Option<String>,
    },
    /// End the current fast as completed
    Stop,
    /// End the current fast as cancelled
    Cancel,
    /// Print the current state and progress as JSON
    Status,
}

#[derive(Serialize)]
struct Status<'a> {
    state: &'a FastingState,
    progress: Progress,
}

pub async fn run(action: FastAction) -> CommandResult {
    let mut tracker = open_tracker().await?;

    match action {
        FastAction::Start { plan } => {
            let plan = match plan {
                Some(id) => {
                    let plans = tracker.available_plans();
                    let found = find_plan(&plans, &id)
                        .cloned()
                        .ok_or(ValidationError::UnknownPlan(id))?;
                    Some(found)
                }
                None => None,
            };
            let event = tracker.start_fasting(plan);
            print_event(event.as_ref(), "a fast is already running")?;
        }
        FastAction::Stop => {
            let event = tracker.stop_fasting();
            print_event(event.as_ref(), "no fast is running")?;
        }
        FastAction::Cancel => {
            let event = tracker.cancel_fasting();
            print_event(event.as_ref(), "no fast is running")?;
        }
        FastAction::Status => {
            print_json(&Status {
                state: tracker.fasting_state(),
                progress: tracker.current_progress(),
            })?;
        }
    }

    tracker.flush().await?;
    Ok(())
}
