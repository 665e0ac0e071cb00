//! Ranking layer: binary-search placement and atomic rank persistence.
//!
//! The insertion engine decides *where* an item belongs through user-driven
//! comparisons; staged commits decide *what* gets written and guard the
//! dense-permutation invariant on the way to the store. Both the insertion
//! flow and the drag controller persist through [`StagedCommit`] - it is the
//! sole writer of `rank_index`.
//!
//! # Modules
//!
//! - [`insertion`]: The suspended binary-search state machine
//! - [`persist`]: Staged, validated, atomic rank writes

pub mod insertion;
pub mod persist;

pub use insertion::{Decision, InsertionStep, RankInsertionEngine};
pub use persist::StagedCommit;
