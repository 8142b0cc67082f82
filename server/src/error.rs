//! Error types for the matchmaking core and the network layer

use shared::{ConnectionId, SessionId};
use thiserror::Error;

pub const ALREADY_ACTIVE_MESSAGE: &str = "You are already searching or in an active game.";

/// Failures of the join flow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// Requester is already queued or playing. Surfaced to the requester.
    #[error("{}", ALREADY_ACTIVE_MESSAGE)]
    AlreadyActive,
    /// A dequeued candidate was no longer live. Recovered by requeueing.
    #[error("pairing candidate {0} is no longer connected")]
    StaleOpponent(ConnectionId),
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),
}

/// Guess-outcome events that cannot be applied. All of these are benign:
/// the coordinator logs and drops them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("connection {0} is not in a session")]
    NoSession(ConnectionId),
    #[error("session {0} does not exist")]
    UnknownSession(SessionId),
    #[error("connection {connection} is not a participant of session {session}")]
    NotAParticipant {
        session: SessionId,
        connection: ConnectionId,
    },
    #[error("session {0} is already finished")]
    SessionAlreadyFinished(SessionId),
    #[error("connection {0} already finished its round")]
    ParticipantAlreadyFinished(ConnectionId),
}

#[derive(Debug, Error)]
pub enum WordListError {
    #[error("failed to read word list: {0}")]
    Io(#[from] std::io::Error),
    #[error("word list contains no usable words")]
    Empty,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("event loop is gone")]
    EventLoopClosed,
}
