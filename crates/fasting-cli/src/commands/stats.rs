use fasting_core::stats::completion_rate;
use fasting_core::FastingStats;
use serde::Serialize;

use super::{open_tracker, print_json, CommandResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsView {
    #[serde(flatten)]
    stats: FastingStats,
    completion_rate: f64,
}

pub async fn run() -> CommandResult {
    let tracker = open_tracker().await?;
    print_json(&StatsView {
        stats: tracker.stats(),
        completion_rate: completion_rate(tracker.history()),
    })
}
