//! # Fasting Core Library
//!
//! Session and statistics engine for an intermittent-fasting tracker. A UI
//! layer (or the bundled CLI) drives it through [`FastingTracker`].
//!
//! ## Architecture
//!
//! - **Plan Catalog**: built-in fasting/eating splits plus a user-defined
//!   custom slot
//! - **Session Engine**: `Inactive -> Active -> Inactive` state machine with
//!   on-demand progress
//! - **Statistics**: streaks and aggregates derived from the history
//! - **Storage**: async key-value contract, SQLite and in-memory stores, and
//!   a serialized background writer
//! - **Tracker**: coordinator wiring the engine to the store
//!
//! ## Key Components
//!
//! - [`FastingTracker`]: read/mutate API
//! - [`FastingEngine`]: pure state machine over explicit timestamps
//! - [`KvStore`]: persistence contract
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod plan;
pub mod session;
pub mod stats;
pub mod storage;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use plan::{available_plans, builtin_plans, default_plan, FastingPlan, CUSTOM_PLAN_ID};
pub use session::{FastingEngine, FastingSession, FastingState, History, Progress, SessionOutcome};
pub use stats::{AverageBasis, FastingStats, StatsConfig, Streaks};
pub use storage::{Config, KvStore, MemoryStore, PersistenceWriter, SqliteStore, StorageKey};
pub use tracker::FastingTracker;
