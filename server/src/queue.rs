//! FIFO waiting list of connections looking for an opponent

use shared::ConnectionId;
use std::collections::VecDeque;

/// Connections waiting to be paired, earliest first.
///
/// A connection id appears at most once. Every mutation keeps the relative
/// order of the remaining entries.
#[derive(Debug, Default)]
pub struct MatchQueue {
    entries: VecDeque<ConnectionId>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the connection unless it is already waiting.
    /// Returns false when nothing changed.
    pub fn enqueue(&mut self, connection: ConnectionId) -> bool {
        if self.contains(connection) {
            return false;
        }
        self.entries.push_back(connection);
        true
    }

    /// Puts a connection back at the head of the queue, keeping the place it
    /// had before a failed pairing.
    pub fn requeue_front(&mut self, connection: ConnectionId) {
        if !self.contains(connection) {
            self.entries.push_front(connection);
        }
    }

    /// Removes and returns the two earliest entries, if there are two.
    pub fn dequeue_pair(&mut self) -> Option<(ConnectionId, ConnectionId)> {
        if self.entries.len() < 2 {
            return None;
        }
        let first = self.entries.pop_front()?;
        let second = self.entries.pop_front()?;
        Some((first, second))
    }

    /// Idempotent removal. Returns true if the connection was waiting.
    pub fn remove(&mut self, connection: ConnectionId) -> bool {
        match self.entries.iter().position(|&id| id == connection) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, connection: ConnectionId) -> bool {
        self.entries.contains(&connection)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.entries.iter().copied()
    }
}
