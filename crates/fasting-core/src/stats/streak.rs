//! Streak computation over completed fasts.
//!
//! Two completed fasts belong to the same streak when their start times are
//! at most `streak_gap_days` whole days apart (floor of the millisecond gap,
//! not calendar days).

use serde::{Deserialize, Serialize};

use super::StatsConfig;
use crate::clock::{MS_PER_DAY, MS_PER_HOUR};
use crate::session::FastingSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

pub fn calculate_streaks(history: &[FastingSession], now_ms: i64, config: &StatsConfig) -> Streaks {
    let mut completed: Vec<&FastingSession> = history.iter().filter(|s| s.completed).collect();
    completed.sort_by(|a, b| {
        b.start_time
            .cmp(&a.start_time)
            .then_with(|| b.end_time.cmp(&a.end_time))
    });

    let Some(most_recent) = completed.first() else {
        return Streaks::default();
    };

    let continues = |newer: &FastingSession, older: &FastingSession| {
        newer.start_time.saturating_sub(older.start_time) / MS_PER_DAY <= config.streak_gap_days
    };

    let window = config.current_window_hours.saturating_mul(MS_PER_HOUR);
    let window_start = now_ms.saturating_sub(window);
    let current = match most_recent.end_time {
        Some(end) if end >= window_start => {
            let linked = completed
                .windows(2)
                .take_while(|pair| continues(pair[0], pair[1]))
                .count();
            1 + linked as u32
        }
        _ => 0,
    };

    let mut longest: u32 = 0;
    let mut run: u32 = 1;
    for pair in completed.windows(2) {
        if continues(pair[0], pair[1]) {
            run += 1;
        } else {
            longest = longest.max(run);
            run = 1;
        }
    }
    longest = longest.max(run);

    Streaks { current, longest }
}
