pub mod config;
pub mod fast;
pub mod history;
pub mod plan;
pub mod stats;

use std::sync::Arc;

use fasting_core::{Config, Event, FastingTracker, SqliteStore, SystemClock};
use serde::Serialize;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open the tracker over the on-disk store and load persisted state.
pub async fn open_tracker() -> Result<FastingTracker, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = SqliteStore::open()?;
    Ok(FastingTracker::open(Arc::new(store), Arc::new(SystemClock), &config).await)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct Ignored<'a> {
    ignored: bool,
    reason: &'a str,
}

/// Print the event, or a note that the command had no effect.
pub fn print_event(event: Option<&Event>, ignored_reason: &str) -> CommandResult {
    match event {
        Some(event) => print_json(event),
        None => print_json(&Ignored {
            ignored: true,
            reason: ignored_reason,
        }),
    }
}
