//! Connection bookkeeping for the matchmaking server
//!
//! This module tracks the server-side view of each connected client:
//! - Connection lifecycle (connect, disconnect)
//! - The display name chosen on the latest `findGame`
//! - The session the connection currently belongs to
//! - Capacity enforcement
//!
//! Transport handles are not stored here. Liveness is answered by the
//! transport adapter; this table only knows who is registered.

use log::info;
use shared::{ConnectionId, SessionId};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

/// A connected client as seen by the matchmaking core.
#[derive(Debug)]
pub struct Client {
    /// Unique id assigned by the transport at accept time
    pub id: ConnectionId,
    /// Peer address, for logs
    pub addr: SocketAddr,
    /// Display name, set when the client asks for a game
    pub name: Option<String>,
    /// Session this client was last paired into
    pub session: Option<SessionId>,
    pub connected_at: Instant,
}

impl Client {
    pub fn new(id: ConnectionId, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            name: None,
            session: None,
            connected_at: Instant::now(),
        }
    }

    /// Name to show to others; falls back to the connection id.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Player{}", self.id))
    }
}

/// Registered clients, indexed by connection id.
///
/// Enforces a maximum number of concurrent clients so a flood of idle
/// connections cannot grow server state without bound.
pub struct ClientManager {
    clients: HashMap<ConnectionId, Client>,
    max_clients: usize,
}

impl ClientManager {
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            max_clients,
        }
    }

    /// Registers a new connection.
    ///
    /// Returns false if the server is at capacity or the id is taken.
    pub fn add_client(&mut self, id: ConnectionId, addr: SocketAddr) -> bool {
        if self.clients.len() >= self.max_clients || self.clients.contains_key(&id) {
            return false;
        }

        info!("Client {} connected from {}", id, addr);
        self.clients.insert(id, Client::new(id, addr));
        true
    }

    /// Removes a client, returning its last known state.
    pub fn remove_client(&mut self, id: &ConnectionId) -> Option<Client> {
        let client = self.clients.remove(id)?;
        info!(
            "Client {} ({}) disconnected",
            client.id,
            client.name.as_deref().unwrap_or("unnamed")
        );
        Some(client)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Client> {
        self.clients.get(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.clients.contains_key(id)
    }

    pub fn set_name(&mut self, id: &ConnectionId, name: String) -> bool {
        match self.clients.get_mut(id) {
            Some(client) => {
                client.name = Some(name);
                true
            }
            None => false,
        }
    }

    pub fn set_session(&mut self, id: &ConnectionId, session: SessionId) -> bool {
        match self.clients.get_mut(id) {
            Some(client) => {
                client.session = Some(session);
                true
            }
            None => false,
        }
    }

    /// Clears the client's session slot if it still points at `session`.
    pub fn clear_session(&mut self, id: &ConnectionId, session: &SessionId) {
        if let Some(client) = self.clients.get_mut(id) {
            if client.session.as_ref() == Some(session) {
                client.session = None;
            }
        }
    }

    pub fn session_of(&self, id: &ConnectionId) -> Option<&SessionId> {
        self.clients.get(id).and_then(|client| client.session.as_ref())
    }

    pub fn display_name(&self, id: &ConnectionId) -> String {
        self.clients
            .get(id)
            .map(Client::display_name)
            .unwrap_or_else(|| format!("Player{}", id))
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.clients.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn max_clients(&self) -> usize {
        self.max_clients
    }
}
