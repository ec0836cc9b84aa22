//! Typed in-process event bus.

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::comment::LiveComment;
use crate::user::Review;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    OpenLiveEvents,
    FeelingLuckyOpen,
    VenueSelected { venue_id: String },
    /// Full replacement snapshot of a venue's feed.
    CommentsUpdated { venue_id: String, comments: Vec<LiveComment> },
    ReviewAdded(Review),
}

/// Fan-out to every live subscriber. Dropped receivers are pruned on publish.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<AppEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<AppEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&mut self, event: AppEvent) -> usize {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
