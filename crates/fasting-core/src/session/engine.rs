//! Fasting session engine.
//!
//! Owns the fasting state and the history, and is the only place either is
//! mutated. Time is passed in by the caller so every transition is
//! deterministic.
//!
//! ## State Transitions
//!
//! ```text
//! Inactive --start--> Active --(stop | cancel)--> Inactive
//! ```
//!
//! Transitions from the wrong state are no-ops and return `None`.

use tracing::debug;

use super::progress::Progress;
use super::types::{FastingSession, FastingState, History, SessionOutcome};
use crate::events::{timestamp, Event};
use crate::plan::{available_plans, FastingPlan};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FastingEngine {
    state: FastingState,
    history: History,
}

impl FastingEngine {
    pub fn new(state: FastingState, history: History) -> Self {
        let mut engine = Self { state, history };
        engine.normalize();
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &FastingState {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active
    }

    pub fn current_session(&self) -> Option<&FastingSession> {
        self.state.current_session.as_ref()
    }

    pub fn selected_plan(&self) -> &FastingPlan {
        &self.state.selected_plan
    }

    pub fn available_plans(&self) -> Vec<FastingPlan> {
        available_plans(self.state.custom_plan.as_ref())
    }

    pub fn progress(&self, now_ms: i64) -> Progress {
        self.current_session()
            .map(|session| Progress::of(session, now_ms))
            .unwrap_or_else(Progress::idle)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fast with `plan`, or the selected plan when `None`.
    ///
    /// The plan used becomes the selected plan. Ignored while a fast runs.
    pub fn start(&mut self, plan: Option<FastingPlan>, now_ms: i64) -> Option<Event> {
        if self.state.is_active {
            debug!("start ignored: a fast is already running");
            return None;
        }

        let plan = plan.unwrap_or_else(|| self.state.selected_plan.clone());
        let session = FastingSession::begin(plan.clone(), now_ms);
        let event = Event::FastStarted {
            session_id: session.id.clone(),
            plan_id: plan.id.clone(),
            goal_minutes: session.goal_duration,
            at: timestamp(now_ms),
        };

        debug!(session = %session.id, plan = %plan.id, "fast started");
        self.state.selected_plan = plan;
        self.state.current_session = Some(session);
        self.state.is_active = true;
        Some(event)
    }

    /// End the running fast as completed.
    pub fn stop(&mut self, now_ms: i64) -> Option<Event> {
        self.finish(SessionOutcome::Completed, now_ms)
    }

    /// End the running fast as cancelled.
    pub fn cancel(&mut self, now_ms: i64) -> Option<Event> {
        self.finish(SessionOutcome::Cancelled, now_ms)
    }

    /// Choose the plan for the next start. A running fast keeps its goal.
    pub fn select_plan(&mut self, plan: FastingPlan, now_ms: i64) -> Event {
        let event = Event::PlanSelected {
            plan_id: plan.id.clone(),
            at: timestamp(now_ms),
        };
        self.state.selected_plan = plan;
        event
    }

    /// Store `plan` as the custom plan and select it. No validation here.
    pub fn save_custom_plan(&mut self, plan: FastingPlan, now_ms: i64) -> Event {
        let event = Event::CustomPlanSaved {
            name: plan.name.clone(),
            fasting_hours: plan.fasting_hours,
            eating_hours: plan.eating_hours,
            at: timestamp(now_ms),
        };
        self.state.custom_plan = Some(plan.clone());
        self.state.selected_plan = plan;
        event
    }

    /// Replace the selected plan without emitting an event. Used when
    /// loading a separately persisted selection.
    pub(crate) fn restore_selected_plan(&mut self, plan: FastingPlan) {
        self.state.selected_plan = plan;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish(&mut self, outcome: SessionOutcome, now_ms: i64) -> Option<Event> {
        let Some(session) = self.state.current_session.take() else {
            debug!(?outcome, "finish ignored: no fast is running");
            return None;
        };
        self.state.is_active = false;

        let session = session.finish(outcome, now_ms);
        let session_id = session.id.clone();
        let duration_minutes = session.duration_minutes().unwrap_or(0);
        let at = timestamp(now_ms);
        debug!(session = %session_id, ?outcome, duration_minutes, "fast ended");
        self.history.prepend(session);

        Some(match outcome {
            SessionOutcome::Completed => Event::FastCompleted {
                session_id,
                duration_minutes,
                at,
            },
            SessionOutcome::Cancelled => Event::FastCancelled {
                session_id,
                duration_minutes,
                at,
            },
        })
    }

    /// Keep `is_active` consistent with `current_session` for loaded data.
    fn normalize(&mut self) {
        let has_session = self.state.current_session.is_some();
        if self.state.is_active != has_session {
            debug!(
                is_active = self.state.is_active,
                has_session, "repairing inconsistent fasting state"
            );
            self.state.is_active = has_session;
        }
    }
}
