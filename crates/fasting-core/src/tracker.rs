//! State coordinator.
//!
//! [`FastingTracker`] is the single entry point a UI drives. It owns the
//! [`FastingEngine`], reads time from the injected [`Clock`], and hands a
//! snapshot to the [`PersistenceWriter`] after every accepted mutation.
//!
//! ## Usage
//!
//! ```ignore
//! let mut tracker = FastingTracker::open(store, clock, &config).await;
//! tracker.start_fasting(None);
//! let progress = tracker.current_progress();
//! tracker.stop_fasting();
//! tracker.flush().await?;
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{StoreError, ValidationError};
use crate::events::Event;
use crate::plan::{find_plan, FastingPlan};
use crate::session::{FastingEngine, FastingSession, FastingState, History, Progress};
use crate::stats::{compute_stats, daily_totals, DailyTotal, FastingStats, StatsConfig};
use crate::storage::{load_value, Config, KvStore, PersistenceWriter, Snapshot, StorageKey};

pub struct FastingTracker {
    engine: FastingEngine,
    store: Arc<dyn KvStore>,
    writer: PersistenceWriter,
    clock: Arc<dyn Clock>,
    stats_config: StatsConfig,
    loading: bool,
}

impl FastingTracker {
    /// Create a tracker with default state. Nothing is persisted until
    /// [`load`](Self::load) has run.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, config: &Config) -> Self {
        Self {
            engine: FastingEngine::new(FastingState::with_plan(config.initial_plan()), History::new()),
            writer: PersistenceWriter::spawn(Arc::clone(&store)),
            store,
            clock,
            stats_config: config.stats.clone(),
            loading: true,
        }
    }

    /// [`new`](Self::new) followed by [`load`](Self::load).
    pub async fn open(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, config: &Config) -> Self {
        let mut tracker = Self::new(store, clock, config);
        tracker.load().await;
        tracker
    }

    /// Load state, history and selected plan from the store.
    ///
    /// Each key is read independently; a failed or unreadable key keeps the
    /// current value. The separately stored selected plan takes precedence
    /// over the one inside the state.
    pub async fn load(&mut self) {
        let store = self.store.as_ref();
        let (state, history, selected) = tokio::join!(
            load_value::<FastingState>(store, StorageKey::State),
            load_value::<History>(store, StorageKey::History),
            load_value::<FastingPlan>(store, StorageKey::SelectedPlan),
        );

        let state = state.unwrap_or_else(|| self.engine.state().clone());
        let history = history.unwrap_or_else(|| self.engine.history().clone());
        self.engine = FastingEngine::new(state, history);
        if let Some(plan) = selected {
            self.engine.restore_selected_plan(plan);
        }

        self.loading = false;
        info!(
            active = self.engine.is_active(),
            sessions = self.engine.history().len(),
            plan = %self.engine.selected_plan().id,
            "fasting state loaded"
        );
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn fasting_state(&self) -> &FastingState {
        self.engine.state()
    }

    pub fn history(&self) -> &[FastingSession] {
        self.engine.history().as_slice()
    }

    pub fn available_plans(&self) -> Vec<FastingPlan> {
        self.engine.available_plans()
    }

    pub fn current_progress(&self) -> Progress {
        self.engine.progress(self.clock.now_ms())
    }

    pub fn stats(&self) -> FastingStats {
        compute_stats(self.history(), self.clock.now_ms(), &self.stats_config)
    }

    pub fn daily_totals(&self, days: u32) -> Vec<DailyTotal> {
        daily_totals(self.history(), days, self.clock.now_ms())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.engine.state().clone(),
            history: self.engine.history().clone(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_fasting(&mut self, plan: Option<FastingPlan>) -> Option<Event> {
        let event = self.engine.start(plan, self.clock.now_ms());
        self.after_mutation(event)
    }

    pub fn stop_fasting(&mut self) -> Option<Event> {
        let event = self.engine.stop(self.clock.now_ms());
        self.after_mutation(event)
    }

    pub fn cancel_fasting(&mut self) -> Option<Event> {
        let event = self.engine.cancel(self.clock.now_ms());
        self.after_mutation(event)
    }

    pub fn select_plan(&mut self, plan: FastingPlan) -> Event {
        let event = self.engine.select_plan(plan, self.clock.now_ms());
        self.persist();
        event
    }

    /// Select a plan from [`available_plans`](Self::available_plans) by id.
    ///
    /// # Errors
    /// Returns [`ValidationError::UnknownPlan`] if no listed plan has `id`.
    pub fn select_plan_by_id(&mut self, id: &str) -> Result<Event, ValidationError> {
        let plans = self.available_plans();
        let plan = find_plan(&plans, id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownPlan(id.to_string()))?;
        Ok(self.select_plan(plan))
    }

    /// Save `plan` as the custom plan and select it. The caller validates.
    pub fn save_custom_plan(&mut self, plan: FastingPlan) -> Event {
        let event = self.engine.save_custom_plan(plan, self.clock.now_ms());
        self.persist();
        event
    }

    /// Wait for queued writes and report the most recent write outcome.
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.writer.flush().await
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn after_mutation(&self, event: Option<Event>) -> Option<Event> {
        if event.is_some() {
            self.persist();
        }
        event
    }

    fn persist(&self) {
        if self.loading {
            debug!("skipping persist while loading");
            return;
        }
        self.writer.persist(self.snapshot());
    }
}
