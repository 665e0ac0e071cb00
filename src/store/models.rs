//! Write-primitive models for the rank store.
//!
//! The store's atomic write primitive accepts a batch of
//! (item-id, field, value) updates that commits all-or-nothing. The fields the
//! core is allowed to write are a closed set: the rank flag and the rank
//! position. Keeping the set closed is what lets rank persistence remain the
//! sole writer of `rank_index`.

use serde::{Deserialize, Serialize};

/// A writable field on a stored item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    /// The `ranked` flag.
    Ranked,
    /// The zero-based rank position.
    RankIndex,
}

/// A typed value for a [`Field`] write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Value for [`Field::Ranked`].
    Bool(bool),
    /// Value for [`Field::RankIndex`].
    Index(u32),
}

/// One staged (item-id, field, value) update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUpdate {
    /// Id of the item to update.
    pub item_id: String,
    /// Field to write.
    pub field: Field,
    /// Value to write.
    pub value: FieldValue,
}

impl FieldUpdate {
    /// Stages `rank_index = index` for `item_id`.
    #[must_use]
    pub fn set_rank_index(item_id: impl Into<String>, index: u32) -> Self {
        Self {
            item_id: item_id.into(),
            field: Field::RankIndex,
            value: FieldValue::Index(index),
        }
    }

    /// Stages `ranked = value` for `item_id`.
    #[must_use]
    pub fn set_ranked(item_id: impl Into<String>, value: bool) -> Self {
        Self {
            item_id: item_id.into(),
            field: Field::Ranked,
            value: FieldValue::Bool(value),
        }
    }
}

/// An ordered batch of field updates submitted as one atomic transaction.
///
/// Either every update applies or none do; the dense-permutation invariant may
/// only be violated transiently inside the store's application of a batch,
/// never across its boundary.
///
/// # Examples
///
/// ```
/// use reelrank::store::{FieldUpdate, WriteBatch};
///
/// let mut batch = WriteBatch::new();
/// batch.push(FieldUpdate::set_ranked("tt0068646", true));
/// batch.push(FieldUpdate::set_rank_index("tt0068646", 0));
/// assert_eq!(batch.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteBatch {
    updates: Vec<FieldUpdate>,
}

impl WriteBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one staged update.
    pub fn push(&mut self, update: FieldUpdate) {
        self.updates.push(update);
    }

    /// The staged updates in submission order.
    #[must_use]
    pub fn updates(&self) -> &[FieldUpdate] {
        &self.updates
    }

    /// Number of staged updates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// True if nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}
