//! Statistics derived from the fasting history.
//!
//! Nothing here is stored. Every figure is recomputed from the history and
//! an evaluation time, so the functions stay pure.

mod streak;
mod summary;

pub use streak::{calculate_streaks, Streaks};
pub use summary::{
    completion_rate, compute_stats, daily_totals, DailyTotal, FastingStats, MAX_DAILY_DAYS,
};

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Accepted values for [`StatsConfig::streak_gap_days`].
pub const STREAK_GAP_DAYS_RANGE: RangeInclusive<i64> = 0..=365;
/// Accepted values for [`StatsConfig::current_window_hours`].
pub const CURRENT_WINDOW_HOURS_RANGE: RangeInclusive<i64> = 1..=8760;

/// Which ended sessions feed the numerator of `average_fast_duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AverageBasis {
    /// Minutes of every ended session (cancelled included), divided by the
    /// number of completed sessions. Matches the historical figures.
    #[default]
    AllEnded,
    /// Minutes of completed sessions only.
    CompletedOnly,
}

/// Tunables for streak and average computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Largest whole-day gap between consecutive completed starts that still
    /// continues a streak.
    #[serde(default = "default_streak_gap_days")]
    pub streak_gap_days: i64,
    /// The newest completed fast must have ended within this many hours for
    /// the current streak to count.
    #[serde(default = "default_current_window_hours")]
    pub current_window_hours: i64,
    #[serde(default)]
    pub average_basis: AverageBasis,
}

fn default_streak_gap_days() -> i64 {
    2
}
fn default_current_window_hours() -> i64 {
    24
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            streak_gap_days: default_streak_gap_days(),
            current_window_hours: default_current_window_hours(),
            average_basis: AverageBasis::default(),
        }
    }
}

impl StatsConfig {
    /// Check that every tunable is within its accepted range.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the first field out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let check = |key: &str, value: i64, range: RangeInclusive<i64>| {
            if range.contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!(
                        "{value} is outside {}..={}",
                        range.start(),
                        range.end()
                    ),
                })
            }
        };
        check("stats.streak_gap_days", self.streak_gap_days, STREAK_GAP_DAYS_RANGE)?;
        check(
            "stats.current_window_hours",
            self.current_window_hours,
            CURRENT_WINDOW_HOURS_RANGE,
        )
    }
}
