//! Reelrank: live-synchronized, user-ranked watch lists.
//!
//! Reelrank is the core of a movie-discovery client's ranking feature:
//! - A change-feed consumer that mirrors a remote ordered query locally
//! - A binary-search insertion protocol that places a newly watched item
//!   through O(log n) better/worse comparisons
//! - Atomic rank persistence that keeps positions a dense permutation
//! - A drag-reorder lifecycle that suppresses the feed while the user moves
//!   items by hand and settles after its own write's echo has drained
//!
//! # Architecture
//!
//! The crate follows a layered architecture pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Consumer (UI, out of scope)                        │
//! └─────────────────────────────────────────────────────┘
//!          │ pump / read-only views        │ gestures
//! ┌───────────────────────────┐   ┌───────────────────────────┐
//! │ Sync Layer (sync/)        │◄──│ Drag Layer (drag/)        │
//! │ - Ordered local mirror    │   │ - Phase gate              │
//! │ - Batch application       │   │ - Local moves + settle    │
//! └───────────────────────────┘   └───────────────────────────┘
//!          ▲ feed batches                  │ staged commits
//! ┌───────────────────────────┐   ┌───────────────────────────┐
//! │ Feed Layer (feed/)        │   │ Rank Layer (rank/)        │
//! │ - Change events           │   │ - Binary-search engine    │
//! │ - Cancellable handles     │   │ - Validated atomic writes │
//! └───────────────────────────┘   └───────────────────────────┘
//!          ▲                               │
//! ┌─────────────────────────────────────────────────────┐
//! │  Store Layer (store/)                               │
//! │  - RankStore contract, MemoryStore + snapshot diff  │
//! └─────────────────────────────────────────────────────┘
//!          │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain & Observability                             │
//! │  - RankedItem, errors (domain/)                     │
//! │  - Tracing setup (observability/)                   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`domain`]: Core domain types (RankedItem, errors)
//! - [`feed`]: Change-feed events and cancellable subscriptions
//! - [`store`]: Document-store contract and in-process implementation
//! - [`sync`]: Live ordered-list synchronization
//! - [`rank`]: Binary-search insertion and rank persistence
//! - [`drag`]: Drag-reorder lifecycle and feed gate
//! - [`observability`]: Tracing setup
//!
//! # Example
//!
//! ```rust
//! use reelrank::{
//!     DragPhase, InsertionStep, MemoryStore, OrderedListSynchronizer,
//!     RankInsertionEngine, RankStore, RankedItem, StagedCommit,
//! };
//!
//! let mut store = MemoryStore::new();
//! store.put_item(RankedItem::new("tt0111161", "The Shawshank Redemption"))?;
//!
//! // Mirror the ranked query (empty so far).
//! let mut list = OrderedListSynchronizer::new();
//! list.subscribe(&mut store)?;
//!
//! // Rank the backlog item: an empty ranked list settles at position 0 with
//! // zero comparisons; otherwise the engine suspends on Compare steps.
//! let candidate = store.unranked_items()?.remove(0);
//! let engine = RankInsertionEngine::begin(candidate.clone(), store.ranked_items()?);
//! let InsertionStep::Settled { target_index } = engine.step() else {
//!     panic!("empty ranked list settles immediately");
//! };
//!
//! StagedCommit::insertion(&candidate, target_index, &store.ranked_items()?)?
//!     .submit(&mut store)?;
//!
//! // The commit's change-feed echo lands in the local mirror.
//! list.pump(DragPhase::Idle, 0)?;
//! assert_eq!(list.items()[0].id, "tt0111161");
//! # Ok::<(), reelrank::ReelrankError>(())
//! ```
//!
//! # Key Design Decisions
//!
//! ## Feed as a Cancellable Channel
//!
//! The change feed is a subscription handle over a channel of batches, not a
//! registered callback object. Cancellation is a property of the handle and is
//! idempotent; a cancelled handle delivers nothing, even messages already
//! queued.
//!
//! ## Explicit Phase Gate
//!
//! Feed suppression during drags is the controller's phase value, read by the
//! synchronizer's dispatch path - not a free-floating boolean. Messages
//! arriving while the gate is closed are discarded; after a drag commit the
//! local list already equals the committed state.
//!
//! ## Time as a Parameter
//!
//! Settle deadlines compare against a millisecond timestamp supplied by the
//! caller. No timer threads, no sleeping in tests.

pub mod domain;
pub mod drag;
pub mod feed;
pub mod observability;
pub mod rank;
pub mod store;
pub mod sync;

pub use domain::{ranks_are_dense, RankedItem, ReelrankError, Result};
pub use drag::{DragPhase, DragReorderController};
pub use feed::{ChangeEvent, FeedBatch, FeedMessage, Subscription, SubscriptionId};
pub use rank::{Decision, InsertionStep, RankInsertionEngine, StagedCommit};
pub use store::{Field, FieldUpdate, FieldValue, MemoryStore, RankStore, WriteBatch};
pub use sync::{ListChanged, ListDelta, OrderedListSynchronizer};

use serde::Deserialize;

/// Core configuration.
///
/// All fields have working defaults; a configuration file only needs to name
/// what it overrides.
///
/// # Example
///
/// ```toml
/// # reelrank.toml
/// settle_delay_ms = 500
/// trace_level = "debug"
/// snapshot_path = "/var/lib/reelrank/watched.json"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long the drag controller keeps the feed gate closed after a
    /// successful commit, in milliseconds.
    ///
    /// Long enough for the store's own echo of the write to drain. Default:
    /// 800.
    pub settle_delay_ms: i64,

    /// Tracing level for structured events.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`. Overridden by
    /// `RUST_LOG` when that is set. Default: `"info"`
    pub trace_level: Option<String>,

    /// Path to the store's JSON snapshot file.
    ///
    /// When unset the store is purely in-memory.
    pub snapshot_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settle_delay_ms: drag::DEFAULT_SETTLE_DELAY_MS,
            trace_level: None,
            snapshot_path: None,
        }
    }
}

impl Config {
    /// Parses configuration from a TOML string.
    ///
    /// Missing fields fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`Config`](ReelrankError::Config) error if the TOML is
    /// malformed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reelrank::Config;
    ///
    /// let config = Config::from_toml_str("settle_delay_ms = 250")?;
    /// assert_eq!(config.settle_delay_ms, 250);
    /// assert!(config.snapshot_path.is_none());
    /// # Ok::<(), reelrank::ReelrankError>(())
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input)
            .map_err(|e| ReelrankError::Config(format!("failed to parse config: {e}")))
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read and a
    /// [`Config`](ReelrankError::Config) error if it cannot be parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

/// Builds the store described by the configuration.
///
/// Opens the JSON snapshot when `snapshot_path` is set, otherwise starts a
/// fresh in-memory store.
///
/// # Errors
///
/// Returns an error if the snapshot file exists but cannot be read or parsed.
///
/// # Example
///
/// ```rust
/// use reelrank::{initialize, Config};
///
/// let store = initialize(&Config::default())?;
/// # Ok::<(), reelrank::ReelrankError>(())
/// ```
pub fn initialize(config: &Config) -> Result<MemoryStore> {
    tracing::debug!(
        settle_delay_ms = config.settle_delay_ms,
        persistent = config.snapshot_path.is_some(),
        "initializing reelrank core"
    );

    match &config.snapshot_path {
        Some(path) => MemoryStore::with_snapshot(std::path::PathBuf::from(path)),
        None => Ok(MemoryStore::new()),
    }
}
