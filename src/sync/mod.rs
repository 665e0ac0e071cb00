//! Synchronization layer: the local mirror of the remote ranked ordering.
//!
//! One [`OrderedListSynchronizer`] per subscribed list consumes change-feed
//! batches and keeps the in-memory ordered sequence consistent with the remote
//! store, reporting minimal deltas per batch. Its dispatch path honors the
//! drag controller's phase gate.
//!
//! # Modules
//!
//! - [`synchronizer`]: The synchronizer, its deltas, and per-batch
//!   notifications

pub mod synchronizer;

pub use synchronizer::{ListChanged, ListDelta, OrderedListSynchronizer};
