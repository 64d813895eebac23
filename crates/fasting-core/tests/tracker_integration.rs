//! Integration tests for the fasting tracker.
//!
//! Drives the full workflow: load from a store, start/stop/cancel fasts,
//! query progress and statistics, persist and reload.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fasting_core::clock::{MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE};
use fasting_core::{
    builtin_plans, Config, Event, FastingPlan, FastingState, FastingTracker, History, KvStore,
    ManualClock, MemoryStore, SqliteStore, StoreError,
};

const START: i64 = 1_700_000_000_000;

async fn open(store: &MemoryStore, clock: &ManualClock) -> FastingTracker {
    FastingTracker::open(
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
        &Config::default(),
    )
    .await
}

fn plan(id: &str) -> FastingPlan {
    builtin_plans().into_iter().find(|p| p.id == id).unwrap()
}

fn stored<T: serde::de::DeserializeOwned>(store: &MemoryStore, key: &str) -> T {
    serde_json::from_str(&store.peek(key).unwrap()).unwrap()
}

#[tokio::test]
async fn test_fresh_store_defaults() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START);
    let tracker = open(&store, &clock).await;

    assert!(!tracker.loading());
    assert!(!tracker.fasting_state().is_active);
    assert_eq!(tracker.fasting_state().selected_plan.id, "16-8");
    assert!(tracker.history().is_empty());

    let progress = tracker.current_progress();
    assert_eq!(progress.percentage, 0.0);
    assert_eq!(progress.remaining_minutes, 0);
    assert!(!progress.is_complete);
}

#[tokio::test]
async fn test_each_cycle_appends_exactly_one_session() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START);
    let mut tracker = open(&store, &clock).await;

    for cycle in 0..6 {
        assert!(tracker.start_fasting(None).is_some());
        clock.advance_hours(3);
        let ended = if cycle % 2 == 0 {
            tracker.stop_fasting()
        } else {
            tracker.cancel_fasting()
        };
        assert!(ended.is_some());
        assert!(tracker.fasting_state().current_session.is_none());
        assert_eq!(tracker.history().len(), cycle + 1);
        clock.advance_hours(12);
    }

    let completed: Vec<bool> = tracker.history().iter().map(|s| s.completed).collect();
    assert_eq!(completed, [false, true, false, true, false, true]);
}

#[tokio::test]
async fn test_stop_twice_is_idempotent() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START);
    let mut tracker = open(&store, &clock).await;

    tracker.start_fasting(None);
    clock.advance_hours(16);
    assert!(matches!(tracker.stop_fasting(), Some(Event::FastCompleted { duration_minutes: 960, .. })));
    assert!(tracker.stop_fasting().is_none());
    assert!(tracker.cancel_fasting().is_none());
    assert_eq!(tracker.history().len(), 1);
}

#[tokio::test]
async fn test_progress_halfway_through_16_8() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START);
    let mut tracker = open(&store, &clock).await;

    tracker.start_fasting(Some(plan("16-8")));
    clock.advance_hours(8);
    let progress = tracker.current_progress();
    assert!((progress.percentage - 50.0).abs() < 1e-9);
    assert_eq!(progress.remaining_minutes, 480);
    assert_eq!(progress.elapsed_ms, 8 * MS_PER_HOUR);
    assert!(!progress.is_complete);

    clock.advance_hours(9);
    let progress = tracker.current_progress();
    assert!(progress.is_complete);
    // Reaching the goal does not end the fast.
    assert!(tracker.fasting_state().is_active);
}

#[tokio::test]
async fn test_select_plan_mid_fast_keeps_goal() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START);
    let mut tracker = open(&store, &clock).await;

    tracker.start_fasting(None);
    tracker.select_plan(plan("20-4"));
    let session = tracker.fasting_state().current_session.clone().unwrap();
    assert_eq!(session.goal_duration, 16 * 60);
    assert_eq!(tracker.fasting_state().selected_plan.id, "20-4");

    clock.advance_hours(1);
    tracker.stop_fasting();
    assert_eq!(tracker.history()[0].plan.id, "16-8");

    tracker.start_fasting(None);
    assert_eq!(
        tracker.fasting_state().current_session.as_ref().unwrap().goal_duration,
        20 * 60
    );
}

#[tokio::test]
async fn test_select_plan_by_id() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START);
    let mut tracker = open(&store, &clock).await;

    assert!(tracker.select_plan_by_id("18-6").is_ok());
    assert_eq!(tracker.fasting_state().selected_plan.id, "18-6");
    assert!(tracker.select_plan_by_id("12-12").is_err());
    assert_eq!(tracker.fasting_state().selected_plan.id, "18-6");
}

#[tokio::test]
async fn test_persist_and_reload_roundtrip() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START);
    let mut tracker = open(&store, &clock).await;

    tracker.save_custom_plan(FastingPlan::custom("Weekday", 14, 10).unwrap());
    tracker.start_fasting(None);
    clock.advance_hours(14);
    tracker.stop_fasting();
    tracker.start_fasting(Some(plan("18-6")));
    clock.advance_minutes(30);
    tracker.flush().await.unwrap();

    let expected = tracker.snapshot();
    let reloaded = open(&store, &clock).await;
    assert_eq!(reloaded.snapshot(), expected);
    assert!(reloaded.fasting_state().is_active);
    assert_eq!(reloaded.available_plans()[4].name, "Weekday");
    assert_eq!(reloaded.current_progress().elapsed_minutes, 30);
}

#[tokio::test]
async fn test_selected_plan_key_wins_over_state() {
    let store = MemoryStore::new();
    let state = FastingState::with_plan(plan("18-6"));
    store
        .set("fastingState", &serde_json::to_string(&state).unwrap())
        .await
        .unwrap();
    store
        .set("selectedPlan", &serde_json::to_string(&plan("24-0")).unwrap())
        .await
        .unwrap();

    let tracker = open(&store, &ManualClock::new(START)).await;
    assert_eq!(tracker.fasting_state().selected_plan.id, "24-0");
}

#[tokio::test]
async fn test_one_bad_key_does_not_block_the_others() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START);
    let history = History::from(vec![]);
    store
        .set("fastingHistory", &serde_json::to_string(&history).unwrap())
        .await
        .unwrap();
    store.set("fastingState", "{\"isActive\": tru").await.unwrap();
    store
        .set("selectedPlan", &serde_json::to_string(&plan("20-4")).unwrap())
        .await
        .unwrap();

    let tracker = open(&store, &clock).await;
    assert!(!tracker.loading());
    assert!(!tracker.fasting_state().is_active);
    assert_eq!(tracker.fasting_state().selected_plan.id, "20-4");
}

#[tokio::test]
async fn test_read_failure_loads_defaults() {
    let store = MemoryStore::new();
    store.fail_reads(true);
    let clock = ManualClock::new(START);
    let mut tracker = open(&store, &clock).await;

    assert!(!tracker.loading());
    assert_eq!(tracker.fasting_state(), &FastingState::default());

    store.fail_reads(false);
    tracker.start_fasting(None);
    tracker.flush().await.unwrap();
    let state: FastingState = stored(&store, "fastingState");
    assert!(state.is_active);
}

#[tokio::test]
async fn test_write_failure_keeps_memory_state_and_recovers() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START);
    let mut tracker = open(&store, &clock).await;

    store.fail_writes(true);
    tracker.start_fasting(None);
    assert!(tracker.flush().await.is_err());
    assert!(tracker.fasting_state().is_active);
    assert!(store.peek("fastingState").is_none());

    store.fail_writes(false);
    clock.advance_hours(2);
    tracker.cancel_fasting();
    tracker.flush().await.unwrap();

    let state: FastingState = stored(&store, "fastingState");
    let history: History = stored(&store, "fastingHistory");
    assert!(!state.is_active);
    assert_eq!(history.len(), 1);
    assert!(!history.as_slice()[0].completed);
}

#[tokio::test]
async fn test_nothing_persisted_before_load() {
    let store = MemoryStore::new();
    let mut tracker = FastingTracker::new(
        Arc::new(store.clone()),
        Arc::new(ManualClock::new(START)),
        &Config::default(),
    );
    assert!(tracker.loading());
    tracker.start_fasting(None);
    tracker.flush().await.unwrap();
    assert_eq!(store.write_count(), 0);

    tracker.load().await;
    assert!(!tracker.loading());
}

#[tokio::test]
async fn test_noop_transitions_do_not_write() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START);
    let mut tracker = open(&store, &clock).await;

    tracker.stop_fasting();
    tracker.cancel_fasting();
    tracker.flush().await.unwrap();
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_config_default_plan_used_on_first_launch() {
    let mut config = Config::default();
    config.plans.default_plan = "18-6".into();
    let tracker = FastingTracker::open(
        Arc::new(MemoryStore::new()),
        Arc::new(ManualClock::new(START)),
        &config,
    )
    .await;
    assert_eq!(tracker.fasting_state().selected_plan.id, "18-6");
}

#[tokio::test]
async fn test_streak_across_three_days() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START);
    let mut tracker = open(&store, &clock).await;

    for _ in 0..3 {
        tracker.start_fasting(None);
        clock.advance_hours(16);
        tracker.stop_fasting();
        clock.advance_hours(8);
    }
    // A cancelled attempt does not count, nor break the run.
    tracker.start_fasting(None);
    clock.advance_hours(2);
    tracker.cancel_fasting();

    let stats = tracker.stats();
    assert_eq!(stats.current_streak, 3);
    assert_eq!(stats.longest_streak, 3);
    assert_eq!(stats.total_sessions, 4);
    assert_eq!(stats.completed_sessions, 3);
    assert_eq!(stats.total_fasting_time, 3 * 960 + 120);
    assert_eq!(stats.average_fast_duration, (3 * 960 + 120) / 3);

    clock.advance_ms(2 * MS_PER_DAY);
    assert_eq!(tracker.stats().current_streak, 0);
    assert_eq!(tracker.stats().longest_streak, 3);
}

#[tokio::test]
async fn test_daily_totals_through_tracker() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START - START % MS_PER_DAY + MS_PER_HOUR);
    let mut tracker = open(&store, &clock).await;

    tracker.start_fasting(None);
    clock.advance_minutes(90);
    tracker.stop_fasting();

    let totals = tracker.daily_totals(2);
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].minutes, 90);
    assert_eq!(totals[1].sessions, 0);
}

#[tokio::test]
async fn test_sqlite_store_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fasting.db");
    let clock = ManualClock::new(START);

    let expected = {
        let store: Arc<dyn KvStore> = Arc::new(SqliteStore::open_path(&path).unwrap());
        let mut tracker =
            FastingTracker::open(store, Arc::new(clock.clone()), &Config::default()).await;
        tracker.start_fasting(Some(plan("20-4")));
        clock.advance_hours(20);
        tracker.stop_fasting();
        tracker.flush().await.unwrap();
        tracker.snapshot()
    };

    let store: Arc<dyn KvStore> = Arc::new(SqliteStore::open_path(&path).unwrap());
    let tracker = FastingTracker::open(store, Arc::new(clock), &Config::default()).await;
    assert_eq!(tracker.snapshot(), expected);
    assert_eq!(tracker.stats().completed_sessions, 1);
}

// ============================================================================
// Write ordering
// ============================================================================

/// Store whose first writes are slow, recording every write in order.
#[derive(Clone, Default)]
struct SlowStore {
    inner: MemoryStore,
    log: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl KvStore for SlowStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let writes_so_far = self.log.lock().unwrap().len();
        if writes_so_far < 3 {
            tokio::time::sleep(Duration::from_millis(30)).await;
        }
        self.log
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        self.inner.set(key, value).await
    }
}

#[tokio::test]
async fn test_rapid_mutations_never_leave_stale_state() {
    let store = SlowStore::default();
    let clock = ManualClock::new(START);
    let mut tracker = FastingTracker::open(
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
        &Config::default(),
    )
    .await;

    tracker.start_fasting(None);
    // Let the first (slow) write begin before mutating again.
    tokio::task::yield_now().await;
    clock.advance_minutes(5);
    tracker.stop_fasting();
    tracker.select_plan(plan("18-6"));
    tracker.start_fasting(None);
    clock.advance_minutes(5);
    tracker.cancel_fasting();
    tracker.flush().await.unwrap();

    let state: FastingState = stored(&store.inner, "fastingState");
    let history: History = stored(&store.inner, "fastingHistory");
    assert_eq!(state, tracker.fasting_state().clone());
    assert_eq!(history.len(), 2);

    // History lengths only ever grow in write order.
    let lengths: Vec<usize> = store
        .log
        .lock()
        .unwrap()
        .iter()
        .filter(|(key, _)| key == "fastingHistory")
        .map(|(_, value)| serde_json::from_str::<History>(value).unwrap().len())
        .collect();
    assert!(lengths.windows(2).all(|w| w[0] <= w[1]), "{lengths:?}");
    assert_eq!(lengths.last(), Some(&2));
}

#[tokio::test]
async fn test_session_ids_derive_from_start_time() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(START);
    let mut tracker = open(&store, &clock).await;

    match tracker.start_fasting(None) {
        Some(Event::FastStarted { session_id, goal_minutes, .. }) => {
            assert_eq!(session_id, format!("session_{START}"));
            assert_eq!(goal_minutes, 960);
        }
        other => panic!("Expected FastStarted, got {other:?}"),
    }
    clock.advance_ms(MS_PER_MINUTE);
    tracker.stop_fasting();
    assert_eq!(tracker.history()[0].end_time, Some(START + MS_PER_MINUTE));
}

// ============================================================================
// Partial write failures
// ============================================================================

/// Store that rejects writes to `fastingHistory` while `reject` is set.
#[derive(Clone, Default)]
struct HistoryRejectingStore {
    inner: MemoryStore,
    reject: Arc<AtomicBool>,
}

#[async_trait]
impl KvStore for HistoryRejectingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if key == "fastingHistory" && self.reject.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed {
                key: key.to_string(),
                message: "rejected".into(),
            });
        }
        self.inner.set(key, value).await
    }
}

#[tokio::test]
async fn test_failed_history_write_does_not_lose_the_fast() {
    let store = HistoryRejectingStore::default();
    let clock = ManualClock::new(START);
    let mut tracker = FastingTracker::open(
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
        &Config::default(),
    )
    .await;

    tracker.start_fasting(None);
    tracker.flush().await.unwrap();

    store.reject.store(true, Ordering::SeqCst);
    clock.advance_hours(16);
    tracker.stop_fasting();
    assert!(matches!(
        tracker.flush().await,
        Err(StoreError::WriteFailed { ref key, .. }) if key == "fastingHistory"
    ));
    drop(tracker);

    // The stored state still holds the running fast, so stopping again after
    // a restart records it.
    store.reject.store(false, Ordering::SeqCst);
    let mut reopened = open(&store.inner, &clock).await;
    assert!(reopened.fasting_state().is_active);
    assert_eq!(
        reopened.fasting_state().current_session.as_ref().map(|s| s.start_time),
        Some(START)
    );
    reopened.stop_fasting();
    reopened.flush().await.unwrap();

    let history: History = stored(&store.inner, "fastingHistory");
    assert_eq!(history.len(), 1);
    assert!(history.as_slice()[0].completed);
}
