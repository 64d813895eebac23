use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every accepted mutation produces an Event.
/// Rejected transitions (stop while idle, start while running) produce none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Event {
    FastStarted {
        session_id: String,
        plan_id: String,
        goal_minutes: i64,
        at: DateTime<Utc>,
    },
    FastCompleted {
        session_id: String,
        duration_minutes: i64,
        at: DateTime<Utc>,
    },
    FastCancelled {
        session_id: String,
        duration_minutes: i64,
        at: DateTime<Utc>,
    },
    PlanSelected {
        plan_id: String,
        at: DateTime<Utc>,
    },
    CustomPlanSaved {
        name: String,
        fasting_hours: u32,
        eating_hours: u32,
        at: DateTime<Utc>,
    },
}

/// Convert epoch milliseconds to a UTC timestamp, falling back to the epoch
/// for values chrono cannot represent.
pub fn timestamp(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}
