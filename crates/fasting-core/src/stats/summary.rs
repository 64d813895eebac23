use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::streak::calculate_streaks;
use super::{AverageBasis, StatsConfig};
use crate::clock::MS_PER_DAY;
use crate::events::timestamp;
use crate::session::FastingSession;

/// Aggregate figures for the statistics screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastingStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_sessions: u32,
    pub completed_sessions: u32,
    /// Minutes, over every session that has an end time.
    pub total_fasting_time: i64,
    /// Minutes per completed session.
    pub average_fast_duration: i64,
}

pub fn compute_stats(history: &[FastingSession], now_ms: i64, config: &StatsConfig) -> FastingStats {
    let streaks = calculate_streaks(history, now_ms, config);
    let completed_sessions = history.iter().filter(|s| s.completed).count() as u32;

    let total_fasting_time: i64 = history.iter().filter_map(|s| s.duration_minutes()).sum();

    let average_fast_duration = if completed_sessions > 0 {
        let numerator = match config.average_basis {
            AverageBasis::AllEnded => total_fasting_time,
            AverageBasis::CompletedOnly => history
                .iter()
                .filter(|s| s.completed)
                .filter_map(|s| s.duration_minutes())
                .sum(),
        };
        numerator / i64::from(completed_sessions)
    } else {
        0
    };

    FastingStats {
        current_streak: streaks.current,
        longest_streak: streaks.longest,
        total_sessions: history.len() as u32,
        completed_sessions,
        total_fasting_time,
        average_fast_duration,
    }
}

/// Share of sessions that were completed, 0.0 ..= 1.0.
pub fn completion_rate(history: &[FastingSession]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let completed = history.iter().filter(|s| s.completed).count();
    completed as f64 / history.len() as f64
}

/// Per-day fasting totals, keyed by the UTC day a fast started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub sessions: u32,
    pub completed: u32,
    pub minutes: i64,
}

/// Largest number of days [`daily_totals`] reports.
pub const MAX_DAILY_DAYS: u32 = 3650;

/// Totals for the `days` most recent UTC days up to and including today,
/// newest first. Days without fasts are present with zero counts. `days` is
/// capped at [`MAX_DAILY_DAYS`].
pub fn daily_totals(history: &[FastingSession], days: u32, now_ms: i64) -> Vec<DailyTotal> {
    let today = now_ms.div_euclid(MS_PER_DAY);
    let days = days.min(MAX_DAILY_DAYS);
    let mut totals: Vec<DailyTotal> = (0..i64::from(days))
        .map(|offset| DailyTotal {
            date: timestamp(today.saturating_sub(offset).saturating_mul(MS_PER_DAY))
                .date_naive(),
            sessions: 0,
            completed: 0,
            minutes: 0,
        })
        .collect();

    for session in history {
        let offset = today.saturating_sub(session.start_time.div_euclid(MS_PER_DAY));
        let Some(total) = usize::try_from(offset).ok().and_then(|i| totals.get_mut(i)) else {
            continue;
        };
        total.sessions += 1;
        if session.completed {
            total.completed += 1;
        }
        total.minutes += session.duration_minutes().unwrap_or(0);
    }

    totals
}
