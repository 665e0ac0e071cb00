//! Change feed protocol: events, batches, and cancellable subscriptions.
//!
//! The backing store pushes batches of positional change events whenever the
//! ranked query result changes; consumers drain them through a [`Subscription`]
//! handle. The feed is modeled as a channel of messages rather than a
//! registered callback object, which makes cancellation a property of the
//! handle instead of listener-registration bookkeeping.
//!
//! # Modules
//!
//! - [`events`]: Event, batch, and message types
//! - [`subscription`]: Publisher/subscription channel pair with idempotent
//!   cancellation

pub mod events;
pub mod subscription;

pub use events::{ChangeEvent, FeedBatch, FeedMessage};
pub use subscription::{feed_channel, FeedPublisher, Subscription, SubscriptionId};
