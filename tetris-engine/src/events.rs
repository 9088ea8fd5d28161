//! Synchronous change notifications
//!
//! A [`Publisher`] keeps a registry of independent listeners and calls each of
//! them in place whenever an event is published. There is no ordering
//! guarantee across listeners and no timeout around delivery, so listeners
//! must not block.

use serde::{Deserialize, Serialize};

use crate::matrix::Matrix;

type Listener<E> = Box<dyn FnMut(&E) + Send>;

/// Handle returned by [`Publisher::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registry of listeners for one event type
pub struct Publisher<E> {
    listeners: Vec<(SubscriptionId, Listener<E>)>,
    next_id: u64,
}

impl<E> Publisher<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a listener called for every published event
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&E) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false when the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn publish(&mut self, event: &E) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}

impl<E: Clone + Send + 'static> Publisher<E> {
    /// Register a listener that forwards every event into a flume channel.
    /// The listener stays registered after the receiver is dropped; sends to a
    /// closed channel are ignored.
    pub fn subscribe_channel(&mut self) -> (SubscriptionId, flume::Receiver<E>) {
        let (tx, rx) = flume::unbounded();
        let id = self.subscribe(move |event: &E| {
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }
}

impl<E> Default for Publisher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Publisher<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Notifications emitted by a [`Board`](crate::Board)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardEvent {
    /// Board contents changed; carries locked cells with the active piece drawn in
    Changed(Matrix),
    /// Rows removed by the most recent lock
    RowsCleared(usize),
    /// A spawned piece did not fit
    GameOver,
}

/// Score update with the presentation hint for the "points gained" overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub gained: u64,
    pub total: u64,
    /// How long a display should show `gained` before clearing it
    pub display_for: std::time::Duration,
}

/// Notifications emitted by a [`Game`](crate::Game)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    BoardChanged(Matrix),
    ScoreChanged(ScoreChange),
    LevelChanged(u32),
    RowsCleared(usize),
    GameOver { final_score: u64 },
}
