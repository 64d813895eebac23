use serde::{Deserialize, Serialize};

use super::FastingSession;
use crate::clock::MS_PER_MINUTE;

/// Progress of the running fast at a given instant.
///
/// Always recomputed from the session and a clock reading; nothing here is
/// cached on the session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub elapsed_minutes: i64,
    pub elapsed_ms: i64,
    pub remaining_minutes: i64,
    /// 0.0 ..= 100.0
    pub percentage: f64,
    /// Goal reached. Informational only; the fast keeps running until stopped.
    pub is_complete: bool,
    pub goal_ms: i64,
}

impl Progress {
    /// Progress with no fast running.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn of(session: &FastingSession, now_ms: i64) -> Self {
        let elapsed_ms = now_ms.saturating_sub(session.start_time).max(0);
        let elapsed_minutes = elapsed_ms / MS_PER_MINUTE;
        let goal_minutes = session.goal_duration;
        let percentage = if goal_minutes > 0 {
            (elapsed_minutes as f64 / goal_minutes as f64 * 100.0).min(100.0)
        } else {
            100.0
        };

        Self {
            elapsed_minutes,
            elapsed_ms,
            remaining_minutes: goal_minutes.saturating_sub(elapsed_minutes).max(0),
            percentage,
            is_complete: elapsed_minutes >= goal_minutes,
            goal_ms: goal_minutes.saturating_mul(MS_PER_MINUTE),
        }
    }
}
