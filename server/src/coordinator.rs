//! Top-level matchmaking orchestrator
//!
//! `MatchCoordinator` owns every piece of shared matchmaking state: the
//! connection table, the waiting queue, the session registry and the
//! leaderboard. It is driven by one event at a time from the server loop and
//! talks to clients only through a [`Transport`], so each operation runs to
//! completion before the next one starts.

use crate::client_manager::ClientManager;
use crate::error::{MatchError, SessionError, ALREADY_ACTIVE_MESSAGE};
use crate::leaderboard::Leaderboard;
use crate::queue::MatchQueue;
use crate::registry::SessionRegistry;
use crate::session::{Notice, Participant};
use crate::transport::Transport;
use crate::words::WordSource;
use log::{debug, info, warn};
use rand::Rng;
use shared::{ClientEvent, ConnectionId, ServerEvent, SessionId};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Result of a successful `findGame`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStatus {
    Waiting,
    Started(SessionId),
}

pub struct MatchCoordinator {
    clients: ClientManager,
    queue: MatchQueue,
    sessions: SessionRegistry,
    leaderboard: Leaderboard,
    words: Box<dyn WordSource>,
    finished_ttl: Duration,
}

impl MatchCoordinator {
    pub fn new(words: Box<dyn WordSource>, max_clients: usize, finished_ttl: Duration) -> Self {
        Self {
            clients: ClientManager::new(max_clients),
            queue: MatchQueue::new(),
            sessions: SessionRegistry::new(),
            leaderboard: Leaderboard::default(),
            words,
            finished_ttl,
        }
    }

    /// Registers a new connection and sends it the current standings.
    ///
    /// Returns false when the server is full; the caller closes the
    /// connection.
    pub fn connect<T: Transport>(
        &mut self,
        connection: ConnectionId,
        addr: SocketAddr,
        transport: &mut T,
    ) -> bool {
        if !self.clients.add_client(connection, addr) {
            warn!(
                "Refusing connection {} from {}: {} clients connected",
                connection,
                addr,
                self.clients.len()
            );
            return false;
        }

        transport.send(
            connection,
            ServerEvent::LeaderboardUpdate(self.leaderboard.snapshot()),
        );
        true
    }

    /// Routes one validated inbound event. Stale or duplicate events are
    /// logged and dropped.
    pub fn handle_event<T: Transport>(
        &mut self,
        connection: ConnectionId,
        event: ClientEvent,
        transport: &mut T,
    ) {
        match event {
            ClientEvent::FindGame { name } => {
                if let Err(e) = self.request_match(connection, &name, transport) {
                    debug!("findGame from {} rejected: {}", connection, e);
                }
            }
            ClientEvent::IWon { attempts } => {
                if let Err(e) = self.report_win(connection, attempts, transport) {
                    debug!("Ignoring iWon from {}: {}", connection, e);
                }
            }
            ClientEvent::AllAttemptsUsed { attempts } => {
                if let Err(e) = self.report_exhausted(connection, attempts, transport) {
                    debug!("Ignoring allAttemptsUsed from {}: {}", connection, e);
                }
            }
        }
    }

    /// Join flow: dedup, enqueue, then try to pair the two earliest waiters.
    pub fn request_match<T: Transport>(
        &mut self,
        connection: ConnectionId,
        requested_name: &str,
        transport: &mut T,
    ) -> Result<MatchStatus, MatchError> {
        if !self.clients.contains(&connection) {
            return Err(MatchError::UnknownConnection(connection));
        }

        if self.is_active(connection) {
            info!(
                "{} tried to search but is already searching or in an active game",
                self.clients.display_name(&connection)
            );
            transport.send(
                connection,
                ServerEvent::AlreadyInGameOrSearching {
                    message: ALREADY_ACTIVE_MESSAGE.to_string(),
                },
            );
            return Err(MatchError::AlreadyActive);
        }

        let name = resolve_name(requested_name);
        info!("{} (ID: {}) is looking for a game", name, connection);
        self.clients.set_name(&connection, name);

        self.queue.remove(connection);
        self.queue.enqueue(connection);

        match self.try_pair(transport) {
            Ok(Some(session)) => Ok(MatchStatus::Started(session)),
            Ok(None) => {
                transport.send(connection, ServerEvent::WaitingForOpponent);
                Ok(MatchStatus::Waiting)
            }
            Err(MatchError::StaleOpponent(dead)) => {
                info!(
                    "Connection {} left while queued; returning survivors to the queue",
                    dead
                );
                Ok(MatchStatus::Waiting)
            }
            Err(e) => Err(e),
        }
    }

    /// The connection guessed the secret word.
    pub fn report_win<T: Transport>(
        &mut self,
        connection: ConnectionId,
        attempts: u32,
        transport: &mut T,
    ) -> Result<(), SessionError> {
        let session_id = self.session_id_of(connection)?;
        let session = self
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| SessionError::UnknownSession(session_id.clone()))?;

        let notices = session.record_win(connection, attempts, |id| transport.is_live(id))?;
        self.apply(&session_id, notices, transport);
        Ok(())
    }

    /// The connection ran out of attempts.
    pub fn report_exhausted<T: Transport>(
        &mut self,
        connection: ConnectionId,
        attempts: u32,
        transport: &mut T,
    ) -> Result<(), SessionError> {
        let session_id = self.session_id_of(connection)?;
        let session = self
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| SessionError::UnknownSession(session_id.clone()))?;

        let notices = session.record_exhausted(connection, attempts, |id| transport.is_live(id))?;
        self.apply(&session_id, notices, transport);
        Ok(())
    }

    /// Transport reported the connection gone. Nothing is sent to it.
    pub fn disconnect<T: Transport>(&mut self, connection: ConnectionId, transport: &mut T) {
        if self.queue.remove(connection) {
            debug!("Removed connection {} from the queue", connection);
        }

        let Some(client) = self.clients.remove_client(&connection) else {
            return;
        };
        let Some(session_id) = client.session else {
            return;
        };
        let Some(session) = self.sessions.get_mut(&session_id) else {
            return;
        };

        match session.record_disconnect(connection, |id| transport.is_live(id)) {
            Ok(notices) => self.apply(&session_id, notices, transport),
            Err(e) => debug!("Disconnect of {} not applied: {}", connection, e),
        }
    }

    /// Drops abandoned sessions and sessions finished for longer than the
    /// configured TTL. Returns how many were removed.
    pub fn reap<T: Transport>(&mut self, now: Instant, transport: &mut T) -> usize {
        let reaped = self.sessions.reap(now, self.finished_ttl);
        for session in &reaped {
            transport.drop_group(session.id());
            for participant in session.participants() {
                self.clients
                    .clear_session(&participant.connection, session.id());
            }
        }

        if !reaped.is_empty() {
            debug!(
                "Reaped {} sessions, {} remain",
                reaped.len(),
                self.sessions.len()
            );
        }
        reaped.len()
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    pub fn queue(&self) -> &MatchQueue {
        &self.queue
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Queued, or taking part in a session that is still being played.
    fn is_active(&self, connection: ConnectionId) -> bool {
        self.queue.contains(connection) || self.sessions.active_session_of(connection).is_some()
    }

    fn is_reachable<T: Transport>(&self, connection: ConnectionId, transport: &T) -> bool {
        self.clients.contains(&connection) && transport.is_live(connection)
    }

    fn session_id_of(&self, connection: ConnectionId) -> Result<SessionId, SessionError> {
        self.clients
            .session_of(&connection)
            .cloned()
            .ok_or(SessionError::NoSession(connection))
    }

    /// Pairs the two earliest waiters if there are two.
    ///
    /// A pair with a dead member is never turned into a session: the live
    /// member goes back to the head of the queue and is told to keep waiting.
    fn try_pair<T: Transport>(&mut self, transport: &mut T) -> Result<Option<SessionId>, MatchError> {
        let Some((first, second)) = self.queue.dequeue_pair() else {
            return Ok(None);
        };

        let first_live = self.is_reachable(first, transport);
        let second_live = self.is_reachable(second, transport);

        if !(first_live && second_live) {
            // Reverse order so `first` ends up ahead of `second`.
            for (candidate, live) in [(second, second_live), (first, first_live)] {
                if live {
                    self.queue.requeue_front(candidate);
                    transport.send(candidate, ServerEvent::WaitingForOpponent);
                }
            }
            let dead = if first_live { second } else { first };
            return Err(MatchError::StaleOpponent(dead));
        }

        let word = self.words.select_secret_word();
        let session_id = self.sessions.create(
            &word,
            Participant::new(first, self.clients.display_name(&first)),
            Participant::new(second, self.clients.display_name(&second)),
        );
        info!(
            "Game starting: room {}, P1: {}, P2: {}",
            session_id,
            self.clients.display_name(&first),
            self.clients.display_name(&second)
        );

        if let Some(events) = self.sessions.get(&session_id).map(|s| s.start_events()) {
            for (connection, event) in events {
                self.clients.set_session(&connection, session_id.clone());
                transport.join_group(connection, &session_id);
                transport.send(connection, event);
            }
        }

        Ok(Some(session_id))
    }

    fn apply<T: Transport>(&mut self, session_id: &SessionId, notices: Vec<Notice>, transport: &mut T) {
        for notice in notices {
            match notice {
                Notice::Send { to, event } => transport.send(to, event),
                Notice::Group(event) => transport.send_group(session_id, event),
                Notice::Credit(name) => {
                    if self.leaderboard.record_win(&name) {
                        transport.broadcast(ServerEvent::LeaderboardUpdate(
                            self.leaderboard.snapshot(),
                        ));
                    }
                }
            }
        }
    }
}

/// Trimmed requested name, or a generated guest name when blank.
pub fn resolve_name(requested: &str) -> String {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        format!("Guest{}", rand::thread_rng().gen_range(0..1000))
    } else {
        trimmed.to_string()
    }
}
