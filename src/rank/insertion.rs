//! Binary-search rank insertion protocol.
//!
//! [`RankInsertionEngine`] determines where a newly watched item belongs in
//! the user's ordered list via O(log n) forced-choice comparisons instead of a
//! full sort. The engine is a pure state machine over `(low, high, mid)`: it
//! does no I/O and suspends by exposing its current [`InsertionStep`], resuming
//! when the caller feeds a [`Decision`] back in. That makes the search state
//! explicit and testable independent of any UI.

use crate::domain::error::{ReelrankError, Result};
use crate::domain::RankedItem;

/// The user's answer to one comparison.
///
/// Forced choice: there is no "equal" option, so ties are impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The new item is better than the anchor - it sorts earlier, toward
    /// index 0.
    Better,
    /// The new item is worse than the anchor - it sorts later.
    Worse,
}

/// Where the search currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertionStep {
    /// Awaiting a decision against `anchor`; the engine is suspended until
    /// [`RankInsertionEngine::decide`] is called.
    Compare {
        /// The ranked item to present as the comparison anchor.
        anchor: RankedItem,
    },
    /// The search has terminated.
    Settled {
        /// Position at which the new item should be inserted.
        target_index: usize,
    },
}

/// Bounded binary search over the ranked list, driven by user decisions.
///
/// Works on an explicit copy of the ranked list taken at
/// [`begin`](Self::begin); the live list keeps synchronizing independently and
/// the eventual commit is validated against the store.
///
/// # Examples
///
/// ```
/// use reelrank::domain::RankedItem;
/// use reelrank::rank::{Decision, InsertionStep, RankInsertionEngine};
///
/// let new_item = RankedItem::new("tt0133093", "The Matrix");
/// let mut engine = RankInsertionEngine::begin(new_item, Vec::new());
///
/// // Empty list: settled immediately at position 0, zero comparisons.
/// assert_eq!(
///     engine.step(),
///     InsertionStep::Settled { target_index: 0 }
/// );
/// assert_eq!(engine.comparisons(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct RankInsertionEngine {
    /// The item being placed.
    new_item: RankedItem,

    /// Copy of the ranked list, ascending by rank position.
    ranked: Vec<RankedItem>,

    /// Search bounds; `high` may pass below zero, hence signed.
    low: isize,
    high: isize,
    mid: isize,

    /// Final insertion position once `low > high`.
    settled: Option<usize>,

    /// Number of decisions consumed so far.
    comparisons: usize,
}

impl RankInsertionEngine {
    /// Starts a search over `[0, ranked_ascending.len())`.
    ///
    /// `ranked_ascending` must be the user's ranked items in ascending rank
    /// order (the store's ranked query, or a synchronizer snapshot). An empty
    /// list settles immediately at position 0 with no comparison.
    #[must_use]
    pub fn begin(new_item: RankedItem, ranked_ascending: Vec<RankedItem>) -> Self {
        let len = ranked_ascending.len() as isize;
        let mut engine = Self {
            new_item,
            ranked: ranked_ascending,
            low: 0,
            high: len - 1,
            mid: 0,
            settled: None,
            comparisons: 0,
        };

        if len == 0 {
            engine.settled = Some(0);
        } else {
            engine.mid = (engine.low + engine.high) / 2;
        }

        tracing::debug!(
            item = %engine.new_item.id,
            ranked_len = engine.ranked.len(),
            "rank insertion search started"
        );
        engine
    }

    /// The current step: a comparison to present, or the settled position.
    #[must_use]
    pub fn step(&self) -> InsertionStep {
        match self.settled {
            Some(target_index) => InsertionStep::Settled { target_index },
            None => InsertionStep::Compare {
                anchor: self.ranked[self.mid as usize].clone(),
            },
        }
    }

    /// Resumes the suspended search with the user's decision.
    ///
    /// `Better` narrows toward index 0 (`high = mid - 1`), `Worse` away from
    /// it (`low = mid + 1`); the search terminates when `low > high`, settling
    /// at `low`.
    ///
    /// # Errors
    ///
    /// Returns [`Invariant`](ReelrankError::Invariant) if called after the
    /// search has settled.
    pub fn decide(&mut self, decision: Decision) -> Result<InsertionStep> {
        if self.settled.is_some() {
            return Err(ReelrankError::Invariant(
                "decision delivered after the search settled".to_string(),
            ));
        }

        self.comparisons += 1;
        match decision {
            Decision::Better => self.high = self.mid - 1,
            Decision::Worse => self.low = self.mid + 1,
        }

        if self.low > self.high {
            self.settled = Some(self.low as usize);
            tracing::debug!(
                item = %self.new_item.id,
                target = self.low,
                comparisons = self.comparisons,
                "rank insertion search settled"
            );
        } else {
            self.mid = (self.low + self.high) / 2;
        }

        Ok(self.step())
    }

    /// The item being placed.
    #[must_use]
    pub fn new_item(&self) -> &RankedItem {
        &self.new_item
    }

    /// The ranked list copy the search runs over.
    #[must_use]
    pub fn ranked(&self) -> &[RankedItem] {
        &self.ranked
    }

    /// The settled insertion position, if the search has terminated.
    #[must_use]
    pub fn target(&self) -> Option<usize> {
        self.settled
    }

    /// Number of comparisons consumed so far.
    #[must_use]
    pub fn comparisons(&self) -> usize {
        self.comparisons
    }
}
