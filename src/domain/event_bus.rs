//! Change notifications for rendering collaborators.
//!
//! Publishing a snapshot and every committed booking or admin mutation
//! emits a [`ClientEvent`] on the [`EventBus`]. A view either reads the
//! raw channel through [`EventBus::subscribe`] or holds a
//! [`Subscription`], which turns an overflowed buffer into a single
//! [`Notification::Resync`] so the view knows to reload from the services.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use super::ClientEvent;

/// Fan-out of [`ClientEvent`]s to every open view.
///
/// Views that fall more than `capacity` events behind lose the oldest ones.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per view (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Sends `event` to every open view. Returns how many views got it;
    /// with no view open the event is dropped.
    pub fn publish(&self, event: ClientEvent) -> usize {
        let kind = event.event_type_str();
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::trace!(kind, delivered, "client event published");
        delivered
    }

    /// Raw receiver of future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.sender.subscribe()
    }

    /// Receiver of future events that reports overflow as
    /// [`Notification::Resync`].
    #[must_use]
    pub fn subscription(&self) -> Subscription {
        Subscription {
            rx: self.sender.subscribe(),
        }
    }

    /// Number of open views.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// What a view receives from a [`Subscription`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The next event, in publication order.
    Event(ClientEvent),
    /// `missed` events were dropped before this view read them; the view
    /// must reload its data instead of patching it.
    Resync {
        /// Number of dropped events.
        missed: u64,
    },
}

/// One view's position on the [`EventBus`].
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<ClientEvent>,
}

impl Subscription {
    /// Waits for the next notification. Returns `None` once every
    /// [`EventBus`] handle is dropped.
    pub async fn next(&mut self) -> Option<Notification> {
        match self.rx.recv().await {
            Ok(event) => Some(Notification::Event(event)),
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "view fell behind the event bus, resync required");
                Some(Notification::Resync { missed })
            }
            Err(RecvError::Closed) => None,
        }
    }
}
