//! Ranked item domain model and the dense-permutation invariant.
//!
//! This module defines the core `RankedItem` type representing one entry in a
//! user's personally ordered watch list. An item starts life unranked when the
//! user marks it watched, becomes ranked exactly once through the insertion
//! flow, and afterwards only has its position rewritten by rank persistence.

use serde::{Deserialize, Serialize};

/// Represents one user-ranked entry.
///
/// Display metadata (`title`, `poster_ref`) is opaque to the core and carried
/// through unchanged. `rank_index` is defined iff `ranked` is true; for the set
/// of ranked items belonging to one user, the indices always form a dense
/// permutation `{0, 1, …, n-1}` after every successful commit.
///
/// # Fields
///
/// - `id`: stable identifier, unique within a user's list
/// - `title`: display title, opaque to the core
/// - `poster_ref`: opaque reference to poster artwork, if any
/// - `ranked`: whether the item has a defined position
/// - `rank_index`: zero-based position, present iff `ranked`
/// - `added_at`: millisecond timestamp of when the item was marked watched,
///   used only for ordering the unranked backlog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedItem {
    pub id: String,
    pub title: String,
    pub poster_ref: Option<String>,
    pub ranked: bool,
    pub rank_index: Option<u32>,
    pub added_at: i64,
}

impl RankedItem {
    /// Creates a new unranked item stamped with the current time.
    ///
    /// The item has no `rank_index` until it passes through the insertion flow.
    ///
    /// # Examples
    ///
    /// ```
    /// use reelrank::domain::RankedItem;
    ///
    /// let item = RankedItem::new("tt0068646", "The Godfather");
    /// assert!(!item.ranked);
    /// assert!(item.rank_index.is_none());
    /// ```
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            poster_ref: None,
            ranked: false,
            rank_index: None,
            added_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Attaches a poster reference, builder-style.
    #[must_use]
    pub fn with_poster(mut self, poster_ref: impl Into<String>) -> Self {
        self.poster_ref = Some(poster_ref.into());
        self
    }

    /// Returns the rank position as a `usize`, if the item is ranked.
    #[must_use]
    pub fn rank_position(&self) -> Option<usize> {
        self.rank_index.map(|i| i as usize)
    }
}

/// Checks whether the ranked subset of `items` carries a dense permutation.
///
/// Returns true iff every item with `ranked == true` has a `rank_index`, and
/// those indices are exactly `{0, 1, …, n-1}` with no gaps or duplicates.
/// Unranked items are ignored.
///
/// # Examples
///
/// ```
/// use reelrank::domain::{ranks_are_dense, RankedItem};
///
/// let mut a = RankedItem::new("a", "A");
/// a.ranked = true;
/// a.rank_index = Some(0);
/// let mut b = RankedItem::new("b", "B");
/// b.ranked = true;
/// b.rank_index = Some(1);
///
/// assert!(ranks_are_dense(&[a.clone(), b.clone()]));
///
/// b.rank_index = Some(2);
/// assert!(!ranks_are_dense(&[a, b]));
/// ```
#[must_use]
pub fn ranks_are_dense(items: &[RankedItem]) -> bool {
    let mut indices: Vec<u32> = Vec::new();
    for item in items.iter().filter(|i| i.ranked) {
        match item.rank_index {
            Some(index) => indices.push(index),
            None => return false,
        }
    }
    indices.sort_unstable();
    indices
        .iter()
        .enumerate()
        .all(|(position, &index)| index as usize == position)
}
