//! Outbound event channels
//!
//! Every gameplay component owns a [`Subscribers`] list per event type.
//! Listeners (UI, weapons, the host's RPC layer) hold the receiving end.

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Fan-out list of channel subscribers
#[derive(Debug, Clone)]
pub struct Subscribers<E> {
    senders: Vec<Sender<E>>,
}

impl<E: Clone> Subscribers<E> {
    /// Create an empty list
    pub fn new() -> Self {
        Self { senders: Vec::new() }
    }

    /// Register a listener and return its receiving end
    pub fn subscribe(&mut self) -> Receiver<E> {
        let (tx, rx) = unbounded();
        self.senders.push(tx);
        rx
    }

    /// Send to every live listener; dropped receivers are pruned
    pub fn broadcast(&mut self, event: E) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of live listeners as of the last broadcast
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// Check if nobody is listening
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

impl<E: Clone> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}
