//! Cancellable change-feed subscription handles.
//!
//! A subscription is the consumer half of a feed channel: the store keeps the
//! [`FeedPublisher`] and pushes messages into it; the consumer drains the
//! [`Subscription`] with [`Subscription::try_next`]. Cancellation is a shared
//! flag observed by both ends, so cancelling is idempotent and a cancelled
//! handle yields no further messages — including ones already queued.

use crate::feed::FeedMessage;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Identifies one live subscription within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// Consumer handle for a live change feed.
///
/// Obtained from [`crate::store::RankStore::subscribe_ranked`]. Dropping the
/// handle implicitly ends the feed (the store prunes disconnected publishers);
/// [`cancel`](Subscription::cancel) ends it explicitly and immediately.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    receiver: Receiver<FeedMessage>,
    cancelled: Arc<AtomicBool>,
}

impl Subscription {
    /// Returns the id the store issued for this subscription.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Cancels the subscription.
    ///
    /// Idempotent: calling this more than once has no further effect. After
    /// cancellation [`try_next`](Subscription::try_next) returns `None` even
    /// for messages that were already queued, so no list mutation can happen
    /// past this point.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            tracing::debug!(id = self.id.0, "subscription cancelled");
        }
    }

    /// True once [`cancel`](Subscription::cancel) has been called (by either end).
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Takes the next pending feed message, if any.
    ///
    /// Non-blocking. Returns `None` when the queue is empty, the publisher is
    /// gone, or the subscription has been cancelled.
    pub fn try_next(&self) -> Option<FeedMessage> {
        if self.is_cancelled() {
            return None;
        }
        self.receiver.try_recv().ok()
    }
}

/// Producer handle for a live change feed, held by the store.
#[derive(Debug, Clone)]
pub struct FeedPublisher {
    id: SubscriptionId,
    sender: Sender<FeedMessage>,
    cancelled: Arc<AtomicBool>,
}

impl FeedPublisher {
    /// Returns the id of the subscription this publisher feeds.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// True once the consumer (or the store) cancelled the subscription.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Marks the subscription cancelled from the producer side.
    ///
    /// Used by [`crate::store::RankStore::unsubscribe`]; idempotent like the
    /// consumer-side cancel.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Pushes a message to the consumer.
    ///
    /// Returns false if the subscription is cancelled or the consumer handle
    /// was dropped, signalling that the publisher can be pruned.
    pub fn publish(&self, message: FeedMessage) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.sender.send(message).is_ok()
    }
}

/// Creates a connected publisher/subscription pair.
///
/// Store implementations call this when a consumer subscribes, keep the
/// publisher, and hand the subscription back to the consumer.
///
/// # Examples
///
/// ```
/// use reelrank::feed::{feed_channel, FeedBatch, FeedMessage, SubscriptionId};
///
/// let (publisher, subscription) = feed_channel(SubscriptionId(1));
/// publisher.publish(FeedMessage::Batch(FeedBatch::default()));
/// assert!(subscription.try_next().is_some());
/// ```
#[must_use]
pub fn feed_channel(id: SubscriptionId) -> (FeedPublisher, Subscription) {
    let (sender, receiver) = mpsc::channel();
    let cancelled = Arc::new(AtomicBool::new(false));
    let publisher = FeedPublisher {
        id,
        sender,
        cancelled: Arc::clone(&cancelled),
    };
    let subscription = Subscription {
        id,
        receiver,
        cancelled,
    };
    (publisher, subscription)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedBatch;

    #[test]
    fn messages_flow_in_order() {
        let (publisher, subscription) = feed_channel(SubscriptionId(7));
        assert!(publisher.publish(FeedMessage::Batch(FeedBatch::default())));
        assert!(publisher.publish(FeedMessage::Error {
            message: "degraded".to_string(),
        }));

        assert!(matches!(
            subscription.try_next(),
            Some(FeedMessage::Batch(_))
        ));
        assert!(matches!(
            subscription.try_next(),
            Some(FeedMessage::Error { .. })
        ));
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn cancel_is_idempotent_and_stops_delivery() {
        let (publisher, subscription) = feed_channel(SubscriptionId(1));
        assert!(publisher.publish(FeedMessage::Batch(FeedBatch::default())));

        subscription.cancel();
        subscription.cancel();

        // Queued messages are dropped, not just future ones.
        assert!(subscription.try_next().is_none());
        assert!(!publisher.publish(FeedMessage::Batch(FeedBatch::default())));
        assert!(publisher.is_cancelled());
    }

    #[test]
    fn publisher_side_cancel_reaches_consumer() {
        let (publisher, subscription) = feed_channel(SubscriptionId(2));
        publisher.cancel();
        assert!(subscription.is_cancelled());
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn dropped_consumer_reports_unpublishable() {
        let (publisher, subscription) = feed_channel(SubscriptionId(3));
        drop(subscription);
        assert!(!publisher.publish(FeedMessage::Batch(FeedBatch::default())));
    }
}
