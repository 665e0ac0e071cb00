//! Change feed message types.
//!
//! This module defines the event protocol delivered by the store's live ranked
//! query: positional add/modify/remove events, grouped into batches, with an
//! error variant for feed failures. Events are produced only by the store and
//! consumed only by the ordered-list synchronizer.

use crate::domain::RankedItem;
use serde::{Deserialize, Serialize};

/// One positional change to the remote ordered query result.
///
/// Indices refer to positions in the ordered sequence *as the batch is being
/// replayed*: applying the events of a batch in delivery order to the previous
/// snapshot reproduces the new snapshot exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeEvent {
    /// An item entered the query result at `new_index`; items at and after
    /// that position shift right.
    Added {
        /// Snapshot of the item as stored.
        item: RankedItem,
        /// Position the item now occupies.
        new_index: usize,
    },

    /// An item changed content, position, or both.
    ///
    /// When `old_index == new_index` the item is replaced in place; otherwise
    /// it is removed from `old_index` and re-inserted at `new_index` (a move).
    Modified {
        /// Snapshot of the item as stored.
        item: RankedItem,
        /// Position the item occupied before the change.
        old_index: usize,
        /// Position the item occupies after the change.
        new_index: usize,
    },

    /// The item at `old_index` left the query result; items after that
    /// position shift left.
    Removed {
        /// Position the item occupied before removal.
        old_index: usize,
    },
}

/// An ordered batch of change events, delivered as one unit.
///
/// Batches are applied atomically to the local list: the synchronizer emits a
/// single "list changed" notification per batch, never per event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedBatch {
    /// Events in delivery order.
    pub events: Vec<ChangeEvent>,
}

impl FeedBatch {
    /// Creates a batch from a sequence of events.
    #[must_use]
    pub fn new(events: Vec<ChangeEvent>) -> Self {
        Self { events }
    }

    /// True if the batch carries no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// One message on the change feed: a batch of events, or an error report.
///
/// An error never mutates the consumer's list; it is forwarded to the caller
/// and the list stays at its last known good state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedMessage {
    /// A batch of positional change events.
    Batch(FeedBatch),

    /// The store reported an error instead of a batch.
    Error {
        /// The store's error report.
        message: String,
    },
}
