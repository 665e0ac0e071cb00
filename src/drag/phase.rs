//! Drag lifecycle state types.
//!
//! This module defines the state machine value that controls whether remote
//! feed updates may be applied to the local list. The phase is owned by the
//! drag controller and read by the synchronizer's dispatch path; it replaces a
//! free-floating "suppress updates" boolean with an explicit, testable value.
//!
//! # State Machine
//!
//! ```text
//! Idle → Dragging → Committing → Settling { resume_at } → Idle
//!                        └──────── (commit failed) ────────┘
//! ```

/// Where the drag controller is in its lifecycle.
///
/// Doubles as the feed gate: any phase other than `Idle` (and `Settling` past
/// its deadline) suppresses application of remote updates, so an echo of the
/// controller's own pending write cannot race with in-progress local moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// No drag in progress; remote updates apply normally.
    Idle,

    /// The user is dragging; moves are local-only and the feed is suppressed.
    Dragging,

    /// The drop transaction is in flight; the feed stays suppressed.
    Committing,

    /// The transaction committed; the feed stays suppressed until `resume_at`
    /// so the store's own echo of the write drains without being re-applied.
    Settling {
        /// Millisecond timestamp at which the gate reopens.
        resume_at: i64,
    },
}

impl DragPhase {
    /// True while the dispatch path must discard incoming feed messages.
    ///
    /// `now` is a millisecond timestamp supplied by the caller; a `Settling`
    /// phase stops suppressing once the deadline passes, even before
    /// [`DragReorderController::tick`](crate::drag::DragReorderController::tick)
    /// normalizes it back to `Idle`.
    #[must_use]
    pub fn suppresses_feed(self, now: i64) -> bool {
        match self {
            Self::Idle => false,
            Self::Dragging | Self::Committing => true,
            Self::Settling { resume_at } => now < resume_at,
        }
    }

    /// True when no drag is in progress.
    #[must_use]
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_never_suppresses() {
        assert!(!DragPhase::Idle.suppresses_feed(0));
        assert!(!DragPhase::Idle.suppresses_feed(i64::MAX));
    }

    #[test]
    fn dragging_and_committing_always_suppress() {
        assert!(DragPhase::Dragging.suppresses_feed(i64::MAX));
        assert!(DragPhase::Committing.suppresses_feed(0));
    }

    #[test]
    fn settling_suppresses_until_deadline() {
        let phase = DragPhase::Settling { resume_at: 1_800 };
        assert!(phase.suppresses_feed(1_000));
        assert!(phase.suppresses_feed(1_799));
        assert!(!phase.suppresses_feed(1_800));
        assert!(!phase.suppresses_feed(2_500));
    }
}
