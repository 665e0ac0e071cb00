//! Drag layer: manual reordering with feed suppression and settling.
//!
//! Dragging gives the user direct control over the ranked order. For its
//! duration the remote feed must not race the local moves, so the controller
//! owns an explicit phase value that the synchronizer's dispatch path reads as
//! its gate, and reopens it only after the committed write's echo has had time
//! to drain.
//!
//! # Modules
//!
//! - [`phase`]: The `Idle | Dragging | Committing | Settling` gate value
//! - [`controller`]: The lifecycle controller driving moves, commit, and
//!   settling

pub mod controller;
pub mod phase;

pub use controller::{DragReorderController, DEFAULT_SETTLE_DELAY_MS};
pub use phase::DragPhase;
