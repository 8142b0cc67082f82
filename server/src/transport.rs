//! Delivery primitives the matchmaking core needs from the network layer
//!
//! The core only knows connection ids. Live I/O handles stay here, in the
//! adapter, so domain state never holds a socket.

use log::{debug, error};
use shared::{ConnectionId, ServerEvent, SessionId};
use std::collections::HashMap;
use tokio::sync::mpsc;

pub trait Transport {
    /// True while the connection can still receive events.
    fn is_live(&self, connection: ConnectionId) -> bool;

    /// Unicast to one connection. Sends to dead connections are dropped.
    fn send(&mut self, connection: ConnectionId, event: ServerEvent);

    /// Adds the connection to a named multicast group.
    fn join_group(&mut self, connection: ConnectionId, group: &SessionId);

    /// Multicast the same event to every member of the group.
    fn send_group(&mut self, group: &SessionId, event: ServerEvent);

    /// Forgets a group once its session is gone.
    fn drop_group(&mut self, group: &SessionId);

    /// Sends to every connection.
    fn broadcast(&mut self, event: ServerEvent);
}

/// Transport backed by one unbounded channel per connection. The receiving
/// half is drained by the connection's socket task.
#[derive(Debug, Default)]
pub struct ChannelTransport {
    senders: HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
    groups: HashMap<SessionId, Vec<ConnectionId>>,
}

impl ChannelTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, connection: ConnectionId, sender: mpsc::UnboundedSender<ServerEvent>) {
        self.senders.insert(connection, sender);
    }

    /// Drops the connection's sender, which closes its outbound queue, and
    /// removes it from every group.
    pub fn detach(&mut self, connection: ConnectionId) -> bool {
        for members in self.groups.values_mut() {
            members.retain(|&id| id != connection);
        }
        self.senders.remove(&connection).is_some()
    }

    pub fn connection_count(&self) -> usize {
        self.senders.len()
    }

    pub fn group_members(&self, group: &SessionId) -> &[ConnectionId] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    fn deliver(&self, connection: ConnectionId, event: ServerEvent) {
        match self.senders.get(&connection) {
            Some(sender) => {
                let name = event.name();
                if let Err(e) = sender.send(event) {
                    debug!("Dropping {} for closed connection {}: {}", name, connection, e);
                }
            }
            None => debug!("Dropping {} for unknown connection {}", event.name(), connection),
        }
    }
}

impl Transport for ChannelTransport {
    fn is_live(&self, connection: ConnectionId) -> bool {
        self.senders
            .get(&connection)
            .map(|sender| !sender.is_closed())
            .unwrap_or(false)
    }

    fn send(&mut self, connection: ConnectionId, event: ServerEvent) {
        self.deliver(connection, event);
    }

    fn join_group(&mut self, connection: ConnectionId, group: &SessionId) {
        let members = self.groups.entry(group.clone()).or_default();
        if !members.contains(&connection) {
            members.push(connection);
        }
    }

    fn send_group(&mut self, group: &SessionId, event: ServerEvent) {
        match self.groups.get(group) {
            Some(members) => {
                for &connection in members {
                    self.deliver(connection, event.clone());
                }
            }
            None => error!("Multicast {} to unknown group {}", event.name(), group),
        }
    }

    fn drop_group(&mut self, group: &SessionId) {
        self.groups.remove(group);
    }

    fn broadcast(&mut self, event: ServerEvent) {
        for &connection in self.senders.keys() {
            self.deliver(connection, event.clone());
        }
    }
}
