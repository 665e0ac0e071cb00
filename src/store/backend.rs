//! Store backend abstraction.
//!
//! This module defines the [`RankStore`] trait that abstracts over the remote
//! document store holding a user's watched items. The trait is the collaborator
//! contract the core requires and nothing more: two ordered queries, a point
//! lookup, an atomic multi-item write, and a cancellable live subscription.
//!
//! # Design Philosophy
//!
//! The trait is minimal and focused on the operations the synchronizer and the
//! ranking flows actually perform, not a generic document API. Item creation
//! and deletion happen on surfaces outside this core and reach it only through
//! the change feed.

use crate::domain::{RankedItem, Result};
use crate::feed::{Subscription, SubscriptionId};
use crate::store::models::WriteBatch;

/// Abstraction over the document store backing a user's ranked list.
///
/// Implementations must deliver feed batches whose replay semantics match the
/// synchronizer's event application: applying a batch's events in order to the
/// previous ranked snapshot reproduces the new one.
///
/// # Implementations
///
/// - [`MemoryStore`](crate::store::MemoryStore): in-process store with
///   optional JSON snapshot persistence (default for tests and offline runs)
///
/// # Examples
///
/// ```
/// use reelrank::store::{MemoryStore, RankStore};
///
/// let store = MemoryStore::new();
/// let ranked = store.ranked_items()?;
/// assert!(ranked.is_empty());
/// # Ok::<(), reelrank::ReelrankError>(())
/// ```
pub trait RankStore: Send {
    /// Fetches items with `ranked == true`, ascending by `rank_index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn ranked_items(&self) -> Result<Vec<RankedItem>>;

    /// Fetches items with `ranked == false`, descending by `added_at`.
    ///
    /// This is the candidate source for the insertion flow; it has no live
    /// ordering requirement.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn unranked_items(&self) -> Result<Vec<RankedItem>>;

    /// Fetches a single item by id. Returns `Ok(None)` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn get_item(&self, id: &str) -> Result<Option<RankedItem>>;

    /// Applies a batch of field updates as one atomic transaction.
    ///
    /// All-or-nothing: on error, no update in the batch has been applied.
    /// Implementations must reject batches whose result would break the
    /// dense-permutation invariant.
    ///
    /// # Errors
    ///
    /// Returns [`Commit`](crate::ReelrankError::Commit) when the transaction
    /// is rejected and [`Invariant`](crate::ReelrankError::Invariant) when the
    /// projected result is not a dense permutation.
    fn commit(&mut self, batch: &WriteBatch) -> Result<()>;

    /// Opens a live change feed over the ranked query.
    ///
    /// The first batch delivered lists every currently ranked item as `Added`
    /// in ascending rank order; subsequent batches carry the positional diff
    /// of each change.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be established.
    fn subscribe_ranked(&mut self) -> Result<Subscription>;

    /// Cancels the subscription with the given id.
    ///
    /// Idempotent: unknown or already-cancelled ids are ignored. After this
    /// returns, the matching handle yields no further messages.
    fn unsubscribe(&mut self, id: SubscriptionId);
}
