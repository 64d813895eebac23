use serde::{Deserialize, Serialize};

use crate::clock::MS_PER_MINUTE;
use crate::plan::{default_plan, FastingPlan};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOutcome {
    Completed,
    Cancelled,
}

/// One fast attempt.
///
/// `plan` is a snapshot taken at start time; later plan edits never reach
/// sessions already recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastingSession {
    pub id: String,
    /// Epoch milliseconds.
    pub start_time: i64,
    /// Epoch milliseconds. Absent while the fast is running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    /// Goal in minutes, locked when the fast starts.
    pub goal_duration: i64,
    pub completed: bool,
    pub plan: FastingPlan,
}

impl FastingSession {
    pub(crate) fn begin(plan: FastingPlan, now_ms: i64) -> Self {
        Self {
            id: format!("session_{now_ms}"),
            start_time: now_ms,
            end_time: None,
            goal_duration: plan.goal_minutes(),
            completed: false,
            plan,
        }
    }

    /// Consume the running session and produce its terminal form.
    pub(crate) fn finish(self, outcome: SessionOutcome, now_ms: i64) -> Self {
        Self {
            end_time: Some(now_ms),
            completed: outcome == SessionOutcome::Completed,
            ..self
        }
    }

    /// Whole minutes between start and end, if the session has ended.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.end_time
            .map(|end| end.saturating_sub(self.start_time).max(0) / MS_PER_MINUTE)
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.end_time.map(|_| {
            if self.completed {
                SessionOutcome::Completed
            } else {
                SessionOutcome::Cancelled
            }
        })
    }
}

/// Process-wide fasting state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastingState {
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_session: Option<FastingSession>,
    /// Plan used by the next start.
    pub selected_plan: FastingPlan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_plan: Option<FastingPlan>,
}

impl FastingState {
    pub fn with_plan(selected_plan: FastingPlan) -> Self {
        Self {
            is_active: false,
            current_session: None,
            selected_plan,
            custom_plan: None,
        }
    }
}

impl Default for FastingState {
    fn default() -> Self {
        Self::with_plan(default_plan())
    }
}

/// Finished sessions, newest first.
///
/// Sessions only ever enter at the front and are never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<FastingSession>);

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn prepend(&mut self, session: FastingSession) {
        self.0.insert(0, session);
    }

    pub fn as_slice(&self) -> &[FastingSession] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FastingSession> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<FastingSession>> for History {
    fn from(sessions: Vec<FastingSession>) -> Self {
        Self(sessions)
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a FastingSession;
    type IntoIter = std::slice::Iter<'a, FastingSession>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
