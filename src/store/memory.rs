//! In-process rank store with live feed synthesis.
//!
//! This module provides the default [`RankStore`] implementation: items are
//! held in memory, every mutation re-runs the ranked query and diffs the new
//! snapshot against the last published one, and the resulting positional
//! events are pushed to all live subscriptions. An optional JSON snapshot file
//! keeps the data across runs, written atomically (write-to-temp + rename) so
//! a crash never leaves a corrupt file.
//!
//! # Performance Characteristics
//!
//! - **Read**: O(n log n) - ranked query filters and sorts in memory
//! - **Write**: O(n) - commit validates against a scratch copy, then diffs
//! - **Best for**: a single user's watch list (hundreds of items)

use crate::domain::error::{ReelrankError, Result};
use crate::domain::{ranks_are_dense, RankedItem};
use crate::feed::{feed_channel, ChangeEvent, FeedBatch, FeedMessage, FeedPublisher};
use crate::feed::{Subscription, SubscriptionId};
use crate::store::backend::RankStore;
use crate::store::models::{Field, FieldValue, WriteBatch};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Snapshot container format.
///
/// Top-level structure serialized to disk. Wraps the item map in a versioned
/// object for future migrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotData {
    /// Version of the snapshot format.
    version: u32,

    /// All stored items, indexed by id.
    #[serde(default)]
    items: HashMap<String, RankedItem>,
}

impl Default for SnapshotData {
    fn default() -> Self {
        Self {
            version: 1,
            items: HashMap::new(),
        }
    }
}

/// In-process store over a user's watched items.
///
/// Stands in for the remote document store behind the same contract: ordered
/// queries, an atomic multi-item write that rejects invariant-breaking
/// batches, and a live ranked-query feed. Subscribers receive the current
/// ranked snapshot as `Added` events on subscribe, then a positional diff for
/// every subsequent change.
///
/// # Thread Safety
///
/// This type is `Send` but not `Sync`. It is designed to be driven from the
/// single interactive context that owns the list.
pub struct MemoryStore {
    /// Snapshot file, if persistence was requested.
    snapshot_path: Option<PathBuf>,

    /// All items, indexed by id.
    items: HashMap<String, RankedItem>,

    /// Live feed publishers, pruned when their consumer goes away.
    publishers: Vec<FeedPublisher>,

    /// Ranked query result as of the last publication; diff baseline.
    last_published: Vec<RankedItem>,

    /// Next subscription id to issue.
    next_subscription: u64,

    /// When set, the next commit fails atomically. Test seam.
    fail_next_commit: bool,

    /// Tracks whether data changed since the last snapshot write.
    dirty: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store with no snapshot persistence.
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshot_path: None,
            items: HashMap::new(),
            publishers: Vec::new(),
            last_published: Vec::new(),
            next_subscription: 1,
            fail_next_commit: false,
            dirty: false,
        }
    }

    /// Creates or opens a store persisted to a JSON snapshot file.
    ///
    /// If the file exists, loads existing data. Otherwise starts empty and
    /// creates the file on first write. Parent directories are created
    /// automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory creation fails
    /// - The file exists but contains invalid JSON
    /// - File permissions prevent reading
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use reelrank::store::MemoryStore;
    /// use std::path::PathBuf;
    ///
    /// let store = MemoryStore::with_snapshot(PathBuf::from("/tmp/watched.json"))?;
    /// # Ok::<(), reelrank::ReelrankError>(())
    /// ```
    pub fn with_snapshot(path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?path, "opening store snapshot");

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            tracing::debug!("initializing new empty snapshot");
            SnapshotData::default()
        };

        tracing::debug!(item_count = data.items.len(), "store opened");

        let mut store = Self::new();
        store.snapshot_path = Some(path);
        store.items = data.items;
        store.last_published = store.ranked_sorted();
        Ok(store)
    }

    /// Loads snapshot data from a JSON file.
    fn load_from_file(path: &PathBuf) -> Result<SnapshotData> {
        let contents = std::fs::read_to_string(path)?;
        let data: SnapshotData = serde_json::from_str(&contents)
            .map_err(|e| ReelrankError::Store(format!("failed to parse snapshot: {e}")))?;

        tracing::debug!(
            version = data.version,
            items = data.items.len(),
            "loaded snapshot data"
        );

        Ok(data)
    }

    /// Saves snapshot data to disk using atomic write.
    ///
    /// Writes to a temporary file first, then atomically renames it to the
    /// target path, so the file is never left in a corrupt state even if the
    /// process crashes mid-write. No-op when persistence is off or the data is
    /// clean.
    fn save_to_file(&mut self) -> Result<()> {
        let Some(path) = self.snapshot_path.clone() else {
            return Ok(());
        };
        if !self.dirty {
            tracing::trace!("skipping save, no changes");
            return Ok(());
        }

        let data = SnapshotData {
            version: 1,
            items: self.items.clone(),
        };
        let json = serde_json::to_string_pretty(&data)
            .map_err(|e| ReelrankError::Store(format!("failed to serialize snapshot: {e}")))?;

        let tmp_path = path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &path)?;

        self.dirty = false;
        tracing::debug!(path = ?path, "snapshot saved");
        Ok(())
    }

    /// Inserts or replaces an item.
    ///
    /// Models the out-of-scope surface that marks items watched. Ranked-query
    /// subscribers see the change as a positional diff.
    ///
    /// # Errors
    ///
    /// Returns an error if snapshot persistence fails.
    pub fn put_item(&mut self, item: RankedItem) -> Result<()> {
        let _span = tracing::debug_span!("store_put_item", id = %item.id).entered();
        self.items.insert(item.id.clone(), item);
        self.dirty = true;
        self.save_to_file()?;
        self.publish_changes();
        Ok(())
    }

    /// Removes an item by id, if present.
    ///
    /// Models the out-of-scope surface that deletes watched items; a ranked
    /// item's removal reaches subscribers as a `Removed` event. Note the
    /// remaining ranks are left as the remote left them - re-compaction is the
    /// owner surface's job, not the store's.
    ///
    /// # Errors
    ///
    /// Returns an error if snapshot persistence fails.
    pub fn remove_item(&mut self, id: &str) -> Result<()> {
        let _span = tracing::debug_span!("store_remove_item", id = %id).entered();
        if self.items.remove(id).is_some() {
            self.dirty = true;
            self.save_to_file()?;
            self.publish_changes();
        }
        Ok(())
    }

    /// Makes the next [`commit`](RankStore::commit) fail atomically.
    ///
    /// Fault-injection seam for exercising the no-partial-mutation contract;
    /// the remote store fails on its own.
    pub fn fail_next_commit(&mut self) {
        self.fail_next_commit = true;
    }

    /// Delivers a feed error to every live subscription.
    ///
    /// Fault-injection seam for exercising consumer error handling. No item
    /// data changes.
    pub fn publish_error(&mut self, message: &str) {
        let report = FeedMessage::Error {
            message: message.to_string(),
        };
        self.publishers.retain(|p| p.publish(report.clone()));
    }

    /// Ranked query: items with `ranked == true`, ascending by `rank_index`.
    fn ranked_sorted(&self) -> Vec<RankedItem> {
        let mut ranked: Vec<RankedItem> = self
            .items
            .values()
            .filter(|i| i.ranked && i.rank_index.is_some())
            .cloned()
            .collect();
        ranked.sort_by_key(|i| i.rank_index);
        ranked
    }

    /// Diffs the ranked query against the last published snapshot and pushes
    /// the resulting batch to all live subscriptions.
    fn publish_changes(&mut self) {
        let new = self.ranked_sorted();
        let events = diff_ordered(&self.last_published, &new);
        if !events.is_empty() {
            let batch = FeedMessage::Batch(FeedBatch::new(events));
            self.publishers.retain(|p| p.publish(batch.clone()));
        }
        self.last_published = new;
    }
}

impl RankStore for MemoryStore {
    fn ranked_items(&self) -> Result<Vec<RankedItem>> {
        Ok(self.ranked_sorted())
    }

    fn unranked_items(&self) -> Result<Vec<RankedItem>> {
        let mut unranked: Vec<RankedItem> = self
            .items
            .values()
            .filter(|i| !i.ranked)
            .cloned()
            .collect();
        unranked.sort_by(|a, b| b.added_at.cmp(&a.added_at).then_with(|| a.id.cmp(&b.id)));
        Ok(unranked)
    }

    fn get_item(&self, id: &str) -> Result<Option<RankedItem>> {
        Ok(self.items.get(id).cloned())
    }

    fn commit(&mut self, batch: &WriteBatch) -> Result<()> {
        let _span = tracing::debug_span!("store_commit", updates = batch.len()).entered();

        if self.fail_next_commit {
            self.fail_next_commit = false;
            tracing::debug!("injected commit failure");
            return Err(ReelrankError::Commit("injected failure".to_string()));
        }

        // Apply to a scratch copy so a rejected batch mutates nothing.
        let mut scratch = self.items.clone();
        for update in batch.updates() {
            let item = scratch.get_mut(&update.item_id).ok_or_else(|| {
                ReelrankError::Commit(format!("unknown item: {}", update.item_id))
            })?;
            match (update.field, update.value) {
                (Field::Ranked, FieldValue::Bool(value)) => {
                    item.ranked = value;
                    if !value {
                        item.rank_index = None;
                    }
                }
                (Field::RankIndex, FieldValue::Index(index)) => {
                    item.rank_index = Some(index);
                }
                (field, value) => {
                    return Err(ReelrankError::Commit(format!(
                        "mismatched value {value:?} for field {field:?}"
                    )));
                }
            }
        }

        let projected: Vec<RankedItem> = scratch.values().cloned().collect();
        if !ranks_are_dense(&projected) {
            tracing::debug!("batch rejected: projected ranks are not dense");
            return Err(ReelrankError::Invariant(
                "committed batch would break the dense rank permutation".to_string(),
            ));
        }

        self.items = scratch;
        self.dirty = true;
        self.save_to_file()?;
        self.publish_changes();

        tracing::debug!(updates = batch.len(), "batch committed");
        Ok(())
    }

    fn subscribe_ranked(&mut self) -> Result<Subscription> {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;

        let (publisher, subscription) = feed_channel(id);

        // New subscribers start from the current snapshot, delivered as Added
        // events in ascending rank order.
        let initial: Vec<ChangeEvent> = self
            .last_published
            .iter()
            .enumerate()
            .map(|(new_index, item)| ChangeEvent::Added {
                item: item.clone(),
                new_index,
            })
            .collect();
        if !initial.is_empty() {
            publisher.publish(FeedMessage::Batch(FeedBatch::new(initial)));
        }

        self.publishers.push(publisher);
        tracing::debug!(id = id.0, "ranked subscription opened");
        Ok(subscription)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        for publisher in self.publishers.iter().filter(|p| p.id() == id) {
            publisher.cancel();
        }
        self.publishers.retain(|p| p.id() != id);
    }
}

impl Drop for MemoryStore {
    /// Flushes a dirty snapshot on drop.
    fn drop(&mut self) {
        if self.dirty && self.snapshot_path.is_some() {
            if let Err(e) = self.save_to_file() {
                tracing::error!(error = %e, "failed to save snapshot on drop");
            }
        }
    }
}

/// Converts two consecutive ordered snapshots into positional change events.
///
/// The produced sequence is the replay contract the synchronizer depends on:
/// applying the events in order to `old` (insert on `Added`, replace or
/// remove-then-insert on `Modified`, delete on `Removed`) reproduces `new`
/// exactly. Removals are emitted first, then adds and moves in ascending
/// target order, which keeps every index valid at its point of delivery.
fn diff_ordered(old: &[RankedItem], new: &[RankedItem]) -> Vec<ChangeEvent> {
    let mut events = Vec::new();
    let mut work: Vec<RankedItem> = old.to_vec();

    let new_ids: HashSet<&str> = new.iter().map(|i| i.id.as_str()).collect();

    let mut position = 0;
    while position < work.len() {
        if new_ids.contains(work[position].id.as_str()) {
            position += 1;
        } else {
            events.push(ChangeEvent::Removed {
                old_index: position,
            });
            work.remove(position);
        }
    }

    for (new_index, item) in new.iter().enumerate() {
        match work.iter().position(|w| w.id == item.id) {
            None => {
                events.push(ChangeEvent::Added {
                    item: item.clone(),
                    new_index,
                });
                work.insert(new_index, item.clone());
            }
            // The prefix below new_index already matches `new`, so any found
            // position is >= new_index.
            Some(old_index) if old_index != new_index => {
                events.push(ChangeEvent::Modified {
                    item: item.clone(),
                    old_index,
                    new_index,
                });
                work.remove(old_index);
                work.insert(new_index, item.clone());
            }
            Some(old_index) => {
                if work[old_index] != *item {
                    events.push(ChangeEvent::Modified {
                        item: item.clone(),
                        old_index,
                        new_index,
                    });
                    work[old_index] = item.clone();
                }
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::FieldUpdate;

    fn ranked(id: &str, index: u32) -> RankedItem {
        let mut item = RankedItem::new(id, id.to_uppercase());
        item.ranked = true;
        item.rank_index = Some(index);
        item
    }

    fn seeded(ids: &[&str]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for (index, id) in ids.iter().enumerate() {
            store.put_item(ranked(id, index as u32)).unwrap();
        }
        store
    }

    /// Replays events with the synchronizer's application semantics.
    fn replay(old: &[RankedItem], events: &[ChangeEvent]) -> Vec<RankedItem> {
        let mut list = old.to_vec();
        for event in events {
            match event {
                ChangeEvent::Added { item, new_index } => list.insert(*new_index, item.clone()),
                ChangeEvent::Modified {
                    item,
                    old_index,
                    new_index,
                } => {
                    if old_index == new_index {
                        list[*old_index] = item.clone();
                    } else {
                        list.remove(*old_index);
                        list.insert(*new_index, item.clone());
                    }
                }
                ChangeEvent::Removed { old_index } => {
                    list.remove(*old_index);
                }
            }
        }
        list
    }

    #[test]
    fn diff_replay_reproduces_reorder() {
        let old = vec![ranked("a", 0), ranked("b", 1), ranked("c", 2)];
        let new = vec![ranked("c", 0), ranked("a", 1), ranked("b", 2)];
        let events = diff_ordered(&old, &new);
        assert_eq!(replay(&old, &events), new);
    }

    #[test]
    fn diff_replay_reproduces_mixed_change() {
        let old = vec![ranked("a", 0), ranked("b", 1), ranked("c", 2)];
        let mut retitled = ranked("c", 1);
        retitled.title = "Director's Cut".to_string();
        // b removed, d added at front, c retitled and shifted.
        let new = vec![ranked("d", 0), retitled, ranked("a", 2)];
        let events = diff_ordered(&old, &new);
        assert_eq!(replay(&old, &events), new);
    }

    #[test]
    fn diff_emits_in_place_modify_for_content_change() {
        let old = vec![ranked("a", 0)];
        let mut changed = ranked("a", 0);
        changed.title = "Remastered".to_string();
        let events = diff_ordered(&old, &[changed.clone()]);
        assert_eq!(
            events,
            vec![ChangeEvent::Modified {
                item: changed,
                old_index: 0,
                new_index: 0,
            }]
        );
    }

    #[test]
    fn diff_of_identical_snapshots_is_empty() {
        let snap = vec![ranked("a", 0), ranked("b", 1)];
        assert!(diff_ordered(&snap, &snap).is_empty());
    }

    #[test]
    fn subscribe_delivers_current_snapshot_as_added() {
        let mut store = seeded(&["a", "b"]);
        let sub = store.subscribe_ranked().unwrap();

        let Some(FeedMessage::Batch(batch)) = sub.try_next() else {
            panic!("expected initial batch");
        };
        assert_eq!(batch.events.len(), 2);
        assert!(matches!(
            &batch.events[0],
            ChangeEvent::Added { new_index: 0, item } if item.id == "a"
        ));
        assert!(matches!(
            &batch.events[1],
            ChangeEvent::Added { new_index: 1, item } if item.id == "b"
        ));
    }

    #[test]
    fn removal_reaches_subscribers_as_removed_event() {
        let mut store = seeded(&["a", "b", "c"]);
        let sub = store.subscribe_ranked().unwrap();
        sub.try_next(); // initial snapshot

        store.remove_item("b").unwrap();

        let Some(FeedMessage::Batch(batch)) = sub.try_next() else {
            panic!("expected removal batch");
        };
        assert_eq!(batch.events[0], ChangeEvent::Removed { old_index: 1 });
    }

    #[test]
    fn injected_commit_failure_mutates_nothing() {
        let mut store = seeded(&["a", "b", "c"]);
        let before = store.ranked_items().unwrap();

        let mut batch = WriteBatch::new();
        batch.push(FieldUpdate::set_rank_index("a", 1));
        batch.push(FieldUpdate::set_rank_index("b", 0));

        store.fail_next_commit();
        let err = store.commit(&batch).unwrap_err();
        assert!(matches!(err, ReelrankError::Commit(_)));
        assert_eq!(store.ranked_items().unwrap(), before);

        // The seam arms exactly one failure.
        store.commit(&batch).unwrap();
        assert_ne!(store.ranked_items().unwrap(), before);
    }

    #[test]
    fn invariant_breaking_batch_is_rejected_atomically() {
        let mut store = seeded(&["a", "b"]);
        let before = store.ranked_items().unwrap();

        // Two items projected onto index 0.
        let mut batch = WriteBatch::new();
        batch.push(FieldUpdate::set_rank_index("b", 0));

        let err = store.commit(&batch).unwrap_err();
        assert!(matches!(err, ReelrankError::Invariant(_)));
        assert_eq!(store.ranked_items().unwrap(), before);
    }

    #[test]
    fn commit_against_unknown_item_fails() {
        let mut store = seeded(&["a"]);
        let mut batch = WriteBatch::new();
        batch.push(FieldUpdate::set_rank_index("ghost", 1));
        assert!(matches!(
            store.commit(&batch),
            Err(ReelrankError::Commit(_))
        ));
    }

    #[test]
    fn unsubscribe_is_idempotent_and_stops_delivery() {
        let mut store = seeded(&["a"]);
        let sub = store.subscribe_ranked().unwrap();
        let id = sub.id();
        sub.try_next(); // initial snapshot

        store.unsubscribe(id);
        store.unsubscribe(id);

        store.put_item(ranked("b", 1)).unwrap();
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn publish_error_reaches_subscribers_without_data_change() {
        let mut store = seeded(&["a"]);
        let before = store.ranked_items().unwrap();
        let sub = store.subscribe_ranked().unwrap();
        sub.try_next(); // initial snapshot

        store.publish_error("backend unavailable");

        assert!(matches!(sub.try_next(), Some(FeedMessage::Error { .. })));
        assert_eq!(store.ranked_items().unwrap(), before);
    }

    #[test]
    fn unranked_query_orders_by_added_at_descending() {
        let mut store = MemoryStore::new();
        let mut early = RankedItem::new("early", "Early");
        early.added_at = 1_000;
        let mut late = RankedItem::new("late", "Late");
        late.added_at = 2_000;
        store.put_item(early).unwrap();
        store.put_item(late).unwrap();

        let unranked = store.unranked_items().unwrap();
        assert_eq!(unranked[0].id, "late");
        assert_eq!(unranked[1].id, "early");
    }

    #[test]
    fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watched.json");

        {
            let mut store = MemoryStore::with_snapshot(path.clone()).unwrap();
            store.put_item(ranked("a", 0)).unwrap();
            store.put_item(RankedItem::new("x", "Backlog")).unwrap();
        }

        let store = MemoryStore::with_snapshot(path).unwrap();
        assert_eq!(store.ranked_items().unwrap().len(), 1);
        assert_eq!(store.unranked_items().unwrap().len(), 1);
        assert_eq!(store.get_item("a").unwrap().unwrap().rank_index, Some(0));
    }
}
