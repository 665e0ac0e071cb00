//! Rank persistence: staged, validated, atomic rank writes.
//!
//! [`StagedCommit`] is the sole producer of `rank_index` writes. It stages the
//! updates for an insertion shift or a full-list reorder, validates that the
//! projected result is a dense permutation, and submits everything as one
//! atomic transaction. A batch that would corrupt the permutation is rejected
//! here, before it ever reaches the store.

use crate::domain::error::{ReelrankError, Result};
use crate::domain::RankedItem;
use crate::store::models::{FieldUpdate, WriteBatch};
use crate::store::RankStore;
use std::collections::HashSet;

/// Converts a list position to a storable rank index.
fn index_u32(position: usize) -> Result<u32> {
    u32::try_from(position)
        .map_err(|_| ReelrankError::Invariant(format!("rank position {position} out of range")))
}

/// A validated set of rank writes, ready for atomic submission.
///
/// Construction validates; [`submit`](Self::submit) sends the staged updates
/// as one all-or-nothing transaction. On failure no mutation is observable:
/// the insertion flow retries or abandons, the drag flow reopens its gate and
/// lets live data resynchronize.
#[derive(Debug, Clone)]
pub struct StagedCommit {
    batch: WriteBatch,
}

impl StagedCommit {
    /// Stages the writes that interleave `new_item` at `target_index`.
    ///
    /// Every existing ranked item whose position is at or past the target is
    /// shifted right by one; the new item gets `ranked = true` and the target
    /// position. `ranked_ascending` must be the user's ranked items in
    /// ascending rank order.
    ///
    /// # Errors
    ///
    /// Returns [`Invariant`](ReelrankError::Invariant) - and stages nothing -
    /// when the new item is already ranked, the target lies outside
    /// `[0, len]`, or the projected result is not a dense permutation (which
    /// would only arise from corrupt input, e.g. duplicate rank indices).
    pub fn insertion(
        new_item: &RankedItem,
        target_index: usize,
        ranked_ascending: &[RankedItem],
    ) -> Result<Self> {
        if new_item.ranked {
            return Err(ReelrankError::Invariant(format!(
                "item {} is already ranked",
                new_item.id
            )));
        }
        if target_index > ranked_ascending.len() {
            return Err(ReelrankError::Invariant(format!(
                "target index {target_index} outside [0, {}]",
                ranked_ascending.len()
            )));
        }

        let mut batch = WriteBatch::new();
        let mut projected: Vec<usize> = Vec::with_capacity(ranked_ascending.len() + 1);

        for item in ranked_ascending {
            let position = item.rank_position().ok_or_else(|| {
                ReelrankError::Invariant(format!("ranked item {} has no rank index", item.id))
            })?;
            if position >= target_index {
                batch.push(FieldUpdate::set_rank_index(
                    item.id.as_str(),
                    index_u32(position + 1)?,
                ));
                projected.push(position + 1);
            } else {
                projected.push(position);
            }
        }

        batch.push(FieldUpdate::set_ranked(new_item.id.as_str(), true));
        batch.push(FieldUpdate::set_rank_index(
            new_item.id.as_str(),
            index_u32(target_index)?,
        ));
        projected.push(target_index);

        Self::validate_dense(&projected)?;
        Self::validate_unique_ids(
            ranked_ascending
                .iter()
                .map(|i| i.id.as_str())
                .chain(std::iter::once(new_item.id.as_str())),
        )?;

        tracing::debug!(
            item = %new_item.id,
            target = target_index,
            displaced = batch.len().saturating_sub(2),
            "insertion commit staged"
        );
        Ok(Self { batch })
    }

    /// Stages the writes that persist a drag-reordered list.
    ///
    /// `final_order` is the full local list after the drag; every item whose
    /// stored index differs from its 0-based position gets one write. Items
    /// already in place are skipped, so a drag that ends where it started
    /// stages nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Invariant`](ReelrankError::Invariant) when the order contains
    /// a duplicate id or an unranked item.
    pub fn reorder(final_order: &[RankedItem]) -> Result<Self> {
        Self::validate_unique_ids(final_order.iter().map(|i| i.id.as_str()))?;

        let mut batch = WriteBatch::new();
        for (position, item) in final_order.iter().enumerate() {
            if !item.ranked {
                return Err(ReelrankError::Invariant(format!(
                    "unranked item {} in reorder",
                    item.id
                )));
            }
            if item.rank_position() != Some(position) {
                batch.push(FieldUpdate::set_rank_index(
                    item.id.as_str(),
                    index_u32(position)?,
                ));
            }
        }

        tracing::debug!(
            items = final_order.len(),
            changed = batch.len(),
            "reorder commit staged"
        );
        Ok(Self { batch })
    }

    /// The staged write batch.
    #[must_use]
    pub fn batch(&self) -> &WriteBatch {
        &self.batch
    }

    /// True when nothing needs writing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Submits the staged writes as one atomic transaction.
    ///
    /// A commit with nothing staged is a successful no-op and never reaches
    /// the store.
    ///
    /// # Errors
    ///
    /// Returns the store's [`Commit`](ReelrankError::Commit) or
    /// [`Invariant`](ReelrankError::Invariant) rejection; in either case no
    /// partial state is observable.
    pub fn submit(self, store: &mut dyn RankStore) -> Result<()> {
        if self.batch.is_empty() {
            tracing::debug!("nothing staged, skipping commit");
            return Ok(());
        }
        store.commit(&self.batch)
    }

    /// Fails closed unless the projected indices are exactly `{0,…,n-1}`.
    fn validate_dense(projected: &[usize]) -> Result<()> {
        let mut sorted = projected.to_vec();
        sorted.sort_unstable();
        for (expected, &actual) in sorted.iter().enumerate() {
            if expected != actual {
                return Err(ReelrankError::Invariant(format!(
                    "projected ranks are not a dense permutation (saw {actual}, expected {expected})"
                )));
            }
        }
        Ok(())
    }

    fn validate_unique_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Result<()> {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                return Err(ReelrankError::Invariant(format!(
                    "duplicate item id {id} in staged commit"
                )));
            }
        }
        Ok(())
    }
}
