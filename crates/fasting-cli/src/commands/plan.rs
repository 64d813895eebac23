use clap::Subcommand;
use fasting_core::FastingPlan;

use super::{open_tracker, print_json, CommandResult};

#[derive(Subcommand)]
pub enum PlanAction {
    /// List available plans, including the saved custom plan
    List,
    /// Select the plan used by the next fast
    Select {
        /// Plan id (e.g. "16-8", "custom")
        id: String,
    },
    /// Save and select a custom plan
    Custom {
        /// Display name, at most 20 characters
        #[arg(long)]
        name: String,
        /// Fasting window in hours
        #[arg(long)]
        fasting: u32,
        /// Eating window in hours; fasting + eating must be 24
        #[arg(long)]
        eating: u32,
    },
}

pub async fn run(action: PlanAction) -> CommandResult {
    let mut tracker = open_tracker().await?;

    match action {
        PlanAction::List => {
            print_json(&tracker.available_plans())?;
        }
        PlanAction::Select { id } => {
            let event = tracker.select_plan_by_id(&id)?;
            print_json(&event)?;
        }
        PlanAction::Custom {
            name,
            fasting,
            eating,
        } => {
            let plan = FastingPlan::custom(&name, fasting, eating)?;
            let event = tracker.save_custom_plan(plan);
            print_json(&event)?;
        }
    }

    tracker.flush().await?;
    Ok(())
}
