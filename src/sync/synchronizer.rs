//! Live ordered-list synchronization against the change feed.
//!
//! [`OrderedListSynchronizer`] owns the local mirror of the ranked query: an
//! ordered sequence of item snapshots kept consistent with the remote ordering
//! by replaying positional change events. Consumption is pull-based - the
//! owner pumps the subscription from its single interactive context, which
//! serializes batch application without any locking.
//!
//! # Dispatch Gate
//!
//! The pump reads the drag controller's [`DragPhase`] on every message. While
//! the phase suppresses the feed, delivered messages are discarded rather than
//! queued: after a drag commit the local list already equals the committed
//! state, so replaying the commit's own echo would corrupt it. Any external
//! write lost in that window is recovered by the next feed batch.

use crate::domain::error::{ReelrankError, Result};
use crate::domain::RankedItem;
use crate::drag::DragPhase;
use crate::feed::{ChangeEvent, FeedBatch, FeedMessage, Subscription};
use crate::store::RankStore;

/// One minimal delta applied to the local list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListDelta {
    /// An item was inserted at `index`; later items shifted right.
    Inserted {
        /// Insertion position.
        index: usize,
    },
    /// The item at `index` was replaced in place.
    Updated {
        /// Replaced position.
        index: usize,
    },
    /// An item moved between positions.
    Moved {
        /// Position before the move.
        from: usize,
        /// Position after the move.
        to: usize,
    },
    /// The item at `index` was deleted; later items shifted left.
    Removed {
        /// Deleted position.
        index: usize,
    },
}

/// Per-batch notification: the minimal deltas plus the new item count.
///
/// Consumers use `len` to decide empty-state vs. populated-state rendering;
/// that rendering itself is out of scope here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListChanged {
    /// Deltas applied, in order.
    pub deltas: Vec<ListDelta>,
    /// Item count after the batch.
    pub len: usize,
}

/// Mirrors the remote ranked ordering from positional change events.
///
/// The ordered list is owned exclusively by this type for its lifetime; other
/// components receive read-only slices ([`items`](Self::items)) or explicit
/// copies ([`snapshot`](Self::snapshot)), never shared mutable references.
/// Drag-time local moves go through a crate-internal move method driven by the
/// drag controller.
#[derive(Debug, Default)]
pub struct OrderedListSynchronizer {
    /// Local ordered mirror of the ranked query result.
    items: Vec<RankedItem>,

    /// Live subscription, if any.
    subscription: Option<Subscription>,
}

impl OrderedListSynchronizer {
    /// Creates a synchronizer with no subscription and an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a live subscription on the store's ranked query.
    ///
    /// Any existing subscription is cancelled first and the local list is
    /// cleared; the new subscription's initial snapshot batch repopulates it
    /// on the next [`pump`](Self::pump).
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot establish the subscription.
    pub fn subscribe(&mut self, store: &mut dyn RankStore) -> Result<()> {
        self.unsubscribe();
        self.items.clear();
        self.subscription = Some(store.subscribe_ranked()?);
        tracing::debug!("synchronizer subscribed to ranked query");
        Ok(())
    }

    /// Cancels the live subscription, if any.
    ///
    /// Idempotent. Stops all further list mutation: messages already queued on
    /// the cancelled handle are never delivered. The list keeps its last known
    /// good contents.
    pub fn unsubscribe(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }

    /// True while a live subscription is held.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Read-only view of the local ordered list.
    #[must_use]
    pub fn items(&self) -> &[RankedItem] {
        &self.items
    }

    /// Number of items in the local list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the local list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Explicit copy of the local list (e.g. for the insertion flow).
    #[must_use]
    pub fn snapshot(&self) -> Vec<RankedItem> {
        self.items.clone()
    }

    /// Drains pending feed messages, applying each batch in delivery order.
    ///
    /// `gate` is the drag controller's current phase and `now` a millisecond
    /// timestamp; messages arriving while the phase suppresses the feed are
    /// discarded (see module docs). Returns one [`ListChanged`] per applied
    /// batch.
    ///
    /// # Errors
    ///
    /// Returns [`Feed`](ReelrankError::Feed) when the feed delivered an error
    /// report. The local list is not mutated by the error; batches applied
    /// earlier in the same drain remain applied, so callers re-read
    /// [`items`](Self::items) after handling the error.
    pub fn pump(&mut self, gate: DragPhase, now: i64) -> Result<Vec<ListChanged>> {
        let mut notifications = Vec::new();

        loop {
            let Some(message) = self.subscription.as_ref().and_then(Subscription::try_next)
            else {
                break;
            };

            if gate.suppresses_feed(now) {
                tracing::debug!("feed message discarded while drag gate is closed");
                continue;
            }

            match message {
                FeedMessage::Batch(batch) => {
                    let changed = self.apply_batch(&batch);
                    tracing::debug!(
                        events = batch.events.len(),
                        len = changed.len,
                        "feed batch applied"
                    );
                    notifications.push(changed);
                }
                FeedMessage::Error { message } => {
                    tracing::debug!(error = %message, "feed delivered an error");
                    return Err(ReelrankError::Feed(message));
                }
            }
        }

        Ok(notifications)
    }

    /// Applies one batch of events to the local list.
    ///
    /// Index arithmetic follows the feed contract: `Added` inserts and shifts
    /// right, an equal-index `Modified` replaces in place, an unequal-index
    /// `Modified` is a remove-then-insert move, `Removed` deletes and shifts
    /// left. Out-of-range indices from a malformed feed are clamped or skipped
    /// instead of panicking the dispatch path.
    fn apply_batch(&mut self, batch: &FeedBatch) -> ListChanged {
        let mut deltas = Vec::with_capacity(batch.events.len());

        for event in &batch.events {
            match event {
                ChangeEvent::Added { item, new_index } => {
                    let index = (*new_index).min(self.items.len());
                    if index != *new_index {
                        tracing::warn!(new_index, "clamped out-of-range add");
                    }
                    self.items.insert(index, item.clone());
                    deltas.push(ListDelta::Inserted { index });
                }
                ChangeEvent::Modified {
                    item,
                    old_index,
                    new_index,
                } if old_index == new_index => {
                    if let Some(slot) = self.items.get_mut(*old_index) {
                        *slot = item.clone();
                        deltas.push(ListDelta::Updated { index: *old_index });
                    } else {
                        tracing::warn!(old_index, "skipped out-of-range in-place modify");
                    }
                }
                ChangeEvent::Modified {
                    item,
                    old_index,
                    new_index,
                } => {
                    if *old_index < self.items.len() {
                        self.items.remove(*old_index);
                        let index = (*new_index).min(self.items.len());
                        self.items.insert(index, item.clone());
                        deltas.push(ListDelta::Moved {
                            from: *old_index,
                            to: index,
                        });
                    } else {
                        tracing::warn!(old_index, "skipped out-of-range move");
                    }
                }
                ChangeEvent::Removed { old_index } => {
                    if *old_index < self.items.len() {
                        self.items.remove(*old_index);
                        deltas.push(ListDelta::Removed { index: *old_index });
                    } else {
                        tracing::warn!(old_index, "skipped out-of-range removal");
                    }
                }
            }
        }

        ListChanged {
            deltas,
            len: self.items.len(),
        }
    }

    /// Local-only reorder used by the drag controller while the gate is
    /// closed. No remote write. Returns false (and does nothing) when either
    /// index is out of range.
    pub(crate) fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() || to >= self.items.len() {
            tracing::debug!(from, to, len = self.items.len(), "ignored out-of-range move");
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    /// Mirrors a just-committed reorder into the local snapshots.
    ///
    /// Called by the drag controller after its transaction succeeds: the
    /// commit's feed echo arrives inside the settle window and is discarded,
    /// so the local `rank_index` fields must be brought in line here.
    pub(crate) fn absorb_committed_order(&mut self) {
        for (position, item) in self.items.iter_mut().enumerate() {
            item.ranked = true;
            item.rank_index = Some(position as u32);
        }
    }
}
