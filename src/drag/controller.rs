//! Drag reorder lifecycle control.
//!
//! [`DragReorderController`] drives manual reordering of the ranked list: it
//! owns the [`DragPhase`] gate, applies local-only moves through the
//! synchronizer while a drag is in progress, and on drop persists the full
//! re-indexing as one atomic transaction before scheduling the gate to reopen
//! after a settle delay. Time is an explicit millisecond parameter throughout,
//! so the lifecycle is testable without a clock or timer thread.

use crate::domain::error::{ReelrankError, Result};
use crate::drag::DragPhase;
use crate::rank::StagedCommit;
use crate::store::RankStore;
use crate::sync::OrderedListSynchronizer;

/// Default settle delay between a successful drag commit and gate reopening,
/// in milliseconds.
pub const DEFAULT_SETTLE_DELAY_MS: i64 = 800;

/// State machine coordinating drag gestures, commits, and feed settling.
///
/// # Lifecycle
///
/// `Idle → Dragging → Committing → Settling → Idle`, with a commit failure
/// short-circuiting `Committing → Idle` so live data can resynchronize the
/// true state immediately.
///
/// # Examples
///
/// ```
/// use reelrank::drag::{DragPhase, DragReorderController};
///
/// let controller = DragReorderController::new(800);
/// assert_eq!(controller.phase(), DragPhase::Idle);
/// ```
#[derive(Debug)]
pub struct DragReorderController {
    /// Current lifecycle phase; read by the synchronizer's dispatch path.
    phase: DragPhase,

    /// How long the gate stays closed after a successful commit.
    settle_delay_ms: i64,
}

impl Default for DragReorderController {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY_MS)
    }
}

impl DragReorderController {
    /// Creates a controller in the `Idle` phase.
    #[must_use]
    pub fn new(settle_delay_ms: i64) -> Self {
        Self {
            phase: DragPhase::Idle,
            settle_delay_ms,
        }
    }

    /// The current phase, for the synchronizer's dispatch gate.
    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Enters the `Dragging` phase.
    ///
    /// From this point the feed is suppressed and moves are local-only.
    ///
    /// # Errors
    ///
    /// Returns [`Invariant`](ReelrankError::Invariant) if a drag is already in
    /// progress or a commit is still settling.
    pub fn begin_drag(&mut self) -> Result<()> {
        if !self.phase.is_idle() {
            return Err(ReelrankError::Invariant(format!(
                "drag started in phase {:?}",
                self.phase
            )));
        }
        self.phase = DragPhase::Dragging;
        tracing::debug!("drag started, feed suppressed");
        Ok(())
    }

    /// Applies one drag-move: remove at `from`, insert at `to`, local only.
    ///
    /// Multiple moves compose over the course of one drag. Out-of-range moves
    /// are ignored, matching pointer coordinates that wander off the list.
    ///
    /// # Errors
    ///
    /// Returns [`Invariant`](ReelrankError::Invariant) when no drag is in
    /// progress.
    pub fn drag_move(
        &mut self,
        list: &mut OrderedListSynchronizer,
        from: usize,
        to: usize,
    ) -> Result<()> {
        if self.phase != DragPhase::Dragging {
            return Err(ReelrankError::Invariant(format!(
                "drag move in phase {:?}",
                self.phase
            )));
        }
        list.move_item(from, to);
        Ok(())
    }

    /// Ends the drag: commits the final order and schedules settling.
    ///
    /// Recomputes every item's rank as its 0-based position in the final local
    /// order, stages one write per changed item, and submits them as a single
    /// atomic transaction. On success the committed indices are mirrored into
    /// the local list (the commit's feed echo will be discarded while
    /// settling) and the gate reopens at `now + settle_delay_ms`. On failure
    /// the gate reopens immediately and the error is surfaced; the local list
    /// is left alone and lags the remote truth until the next feed batch.
    ///
    /// # Errors
    ///
    /// Returns [`Invariant`](ReelrankError::Invariant) when no drag is in
    /// progress or the final order is internally inconsistent, and the
    /// store's [`Commit`](ReelrankError::Commit) rejection on transaction
    /// failure.
    pub fn end_drag(
        &mut self,
        list: &mut OrderedListSynchronizer,
        store: &mut dyn RankStore,
        now: i64,
    ) -> Result<()> {
        if self.phase != DragPhase::Dragging {
            return Err(ReelrankError::Invariant(format!(
                "drag ended in phase {:?}",
                self.phase
            )));
        }

        self.phase = DragPhase::Committing;

        let staged = match StagedCommit::reorder(list.items()) {
            Ok(staged) => staged,
            Err(e) => {
                self.phase = DragPhase::Idle;
                return Err(e);
            }
        };

        match staged.submit(store) {
            Ok(()) => {
                list.absorb_committed_order();
                self.phase = DragPhase::Settling {
                    resume_at: now + self.settle_delay_ms,
                };
                tracing::debug!(
                    resume_in_ms = self.settle_delay_ms,
                    "drag committed, settling"
                );
                Ok(())
            }
            Err(e) => {
                // Reopen immediately so live data can correct the local list.
                self.phase = DragPhase::Idle;
                tracing::debug!(error = %e, "drag commit failed, feed resumed");
                Err(e)
            }
        }
    }

    /// Advances the settle schedule.
    ///
    /// Normalizes `Settling` back to `Idle` once the deadline has passed and
    /// returns the phase in effect afterwards. Safe to call in any phase.
    pub fn tick(&mut self, now: i64) -> DragPhase {
        if let DragPhase::Settling { resume_at } = self.phase {
            if now >= resume_at {
                self.phase = DragPhase::Idle;
                tracing::debug!("settle delay elapsed, feed resumed");
            }
        }
        self.phase
    }
}
