//! Per-match state machine: two participants, one secret word
//!
//! A session starts `Playing` and moves to `Finished` exactly once, on the
//! first of: a win, both participants exhausting their attempts, an
//! exhaustion while the opponent is unreachable, or a disconnect. Events that
//! arrive afterwards are rejected without touching any state, which is what
//! makes a `Won` processed before a concurrent `Exhausted` take precedence.
//!
//! The state machine never talks to the network. Each transition returns a
//! list of [`Notice`]s that the coordinator delivers in order.

use crate::error::SessionError;
use log::info;
use shared::{ConnectionId, GameResult, ServerEvent, SessionId};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Playing,
    Finished,
}

/// One connection's role within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub connection: ConnectionId,
    pub name: String,
    /// Set once, when the participant wins or runs out of attempts.
    pub finished: bool,
    /// Attempts used, recorded at the moment `finished` becomes true.
    pub attempts: u32,
    /// The connection has gone away. Only used for reaping.
    pub departed: bool,
}

impl Participant {
    pub fn new(connection: ConnectionId, name: impl Into<String>) -> Self {
        Self {
            connection,
            name: name.into(),
            finished: false,
            attempts: 0,
            departed: false,
        }
    }
}

/// Side effect requested by a session transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Unicast to one participant.
    Send {
        to: ConnectionId,
        event: ServerEvent,
    },
    /// Multicast to the session's group.
    Group(ServerEvent),
    /// Credit one win to this player on the leaderboard.
    Credit(String),
}

#[derive(Debug)]
pub struct Session {
    id: SessionId,
    participants: [Participant; 2],
    word: String,
    status: SessionStatus,
    winner: Option<String>,
    created_at: Instant,
    finished_at: Option<Instant>,
}

impl Session {
    pub fn new(id: SessionId, word: impl Into<String>, first: Participant, second: Participant) -> Self {
        Self {
            id,
            participants: [first, second],
            word: word.into(),
            status: SessionStatus::Playing,
            winner: None,
            created_at: Instant::now(),
            finished_at: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == SessionStatus::Playing
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn participants(&self) -> &[Participant; 2] {
        &self.participants
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn finished_at(&self) -> Option<Instant> {
        self.finished_at
    }

    pub fn has_participant(&self, connection: ConnectionId) -> bool {
        self.seat_of(connection).is_some()
    }

    pub fn participant(&self, connection: ConnectionId) -> Option<&Participant> {
        self.seat_of(connection).map(|seat| &self.participants[seat])
    }

    pub fn opponent_of(&self, connection: ConnectionId) -> Option<&Participant> {
        self.seat_of(connection)
            .map(|seat| &self.participants[1 - seat])
    }

    /// `gameStarted` for each participant, with the names swapped per
    /// recipient.
    pub fn start_events(&self) -> [(ConnectionId, ServerEvent); 2] {
        let [first, second] = &self.participants;
        [(first, second), (second, first)].map(|(me, opponent)| {
            (
                me.connection,
                ServerEvent::GameStarted {
                    room_id: self.id.clone(),
                    word: self.word.clone(),
                    opponent_name: opponent.name.clone(),
                    my_name: me.name.clone(),
                },
            )
        })
    }

    /// The acting participant guessed the word.
    pub fn record_win<F>(
        &mut self,
        connection: ConnectionId,
        attempts: u32,
        is_live: F,
    ) -> Result<Vec<Notice>, SessionError>
    where
        F: Fn(ConnectionId) -> bool,
    {
        let seat = self.active_seat(connection)?;
        let opponent_live = self.opponent_reachable(seat, &is_live);

        let actor = &mut self.participants[seat];
        actor.finished = true;
        actor.attempts = attempts;
        let winner = actor.name.clone();

        self.winner = Some(winner.clone());
        self.finish();
        info!(
            "{} won in room {} with {} attempts",
            winner, self.id, attempts
        );

        let mut notices = vec![
            Notice::Credit(winner.clone()),
            Notice::Send {
                to: connection,
                event: ServerEvent::GameOver {
                    result: GameResult::Win,
                    word: self.word.clone(),
                    message: format!("You guessed it in {} tries!", attempts),
                    winner: Some(winner.clone()),
                    attempts: Some(attempts),
                },
            },
        ];

        if opponent_live {
            notices.push(Notice::Send {
                to: self.participants[1 - seat].connection,
                event: ServerEvent::GameOver {
                    result: GameResult::Lose,
                    word: self.word.clone(),
                    message: format!("{} finished first in {} tries!", winner, attempts),
                    winner: Some(winner),
                    attempts: Some(attempts),
                },
            });
        }

        Ok(notices)
    }

    /// The acting participant used every attempt without finding the word.
    pub fn record_exhausted<F>(
        &mut self,
        connection: ConnectionId,
        attempts: u32,
        is_live: F,
    ) -> Result<Vec<Notice>, SessionError>
    where
        F: Fn(ConnectionId) -> bool,
    {
        let seat = self.active_seat(connection)?;
        let opponent_live = self.opponent_reachable(seat, &is_live);

        let actor = &mut self.participants[seat];
        actor.finished = true;
        actor.attempts = attempts;
        let actor_name = actor.name.clone();
        info!("{} used all attempts in room {}", actor_name, self.id);

        let opponent = &self.participants[1 - seat];

        if opponent.finished {
            // A finished opponent without a winner means both ran out.
            self.finish();
            return Ok(vec![Notice::Group(ServerEvent::GameOver {
                result: GameResult::Draw,
                word: self.word.clone(),
                message: "Neither of you got the word! It's a draw.".to_string(),
                winner: None,
                attempts: None,
            })]);
        }

        if opponent_live {
            return Ok(vec![
                Notice::Send {
                    to: connection,
                    event: ServerEvent::WaitingForOpponentFinish {
                        word: self.word.clone(),
                        message: "You didn't get it. Waiting for opponent...".to_string(),
                    },
                },
                Notice::Send {
                    to: opponent.connection,
                    event: ServerEvent::OpponentUpdate {
                        message: format!("{} has used all their attempts.", actor_name),
                    },
                },
            ]);
        }

        self.finish();
        Ok(vec![Notice::Send {
            to: connection,
            event: ServerEvent::GameOver {
                result: GameResult::Draw,
                word: self.word.clone(),
                message: "You didn't get the word, and opponent is unavailable.".to_string(),
                winner: None,
                attempts: None,
            },
        }])
    }

    /// The participant's connection went away.
    ///
    /// Always marks the participant as departed. A session still being
    /// played is finished, and a reachable opponent wins by default.
    pub fn record_disconnect<F>(
        &mut self,
        connection: ConnectionId,
        is_live: F,
    ) -> Result<Vec<Notice>, SessionError>
    where
        F: Fn(ConnectionId) -> bool,
    {
        let seat = self
            .seat_of(connection)
            .ok_or_else(|| SessionError::NotAParticipant {
                session: self.id.clone(),
                connection,
            })?;
        self.participants[seat].departed = true;

        if !self.is_playing() {
            return Ok(Vec::new());
        }

        let opponent_live = self.opponent_reachable(seat, &is_live);
        self.finish();

        if !opponent_live {
            return Ok(Vec::new());
        }

        let departed_name = self.participants[seat].name.clone();
        let opponent = &self.participants[1 - seat];
        self.winner = Some(opponent.name.clone());
        info!(
            "{} wins by default in room {} as {} disconnected",
            opponent.name, self.id, departed_name
        );

        Ok(vec![
            Notice::Credit(opponent.name.clone()),
            Notice::Send {
                to: opponent.connection,
                event: ServerEvent::GameOver {
                    result: GameResult::Win,
                    word: self.word.clone(),
                    message: format!("{} disconnected. You win!", departed_name),
                    winner: Some(opponent.name.clone()),
                    attempts: None,
                },
            },
        ])
    }

    /// Both connections are gone; nobody can observe this session again.
    pub fn is_abandoned(&self) -> bool {
        self.participants.iter().all(|p| p.departed)
    }

    /// Finished for at least `ttl` as of `now`.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.finished_at
            .map(|at| now.saturating_duration_since(at) >= ttl)
            .unwrap_or(false)
    }

    fn seat_of(&self, connection: ConnectionId) -> Option<usize> {
        self.participants
            .iter()
            .position(|p| p.connection == connection)
    }

    /// Seat of a participant allowed to act: session playing, participant
    /// not yet finished.
    fn active_seat(&self, connection: ConnectionId) -> Result<usize, SessionError> {
        let seat = self
            .seat_of(connection)
            .ok_or_else(|| SessionError::NotAParticipant {
                session: self.id.clone(),
                connection,
            })?;
        if !self.is_playing() {
            return Err(SessionError::SessionAlreadyFinished(self.id.clone()));
        }
        if self.participants[seat].finished {
            return Err(SessionError::ParticipantAlreadyFinished(connection));
        }
        Ok(seat)
    }

    fn opponent_reachable<F>(&self, seat: usize, is_live: &F) -> bool
    where
        F: Fn(ConnectionId) -> bool,
    {
        let opponent = &self.participants[1 - seat];
        !opponent.departed && is_live(opponent.connection)
    }

    fn finish(&mut self) {
        self.status = SessionStatus::Finished;
        self.finished_at = Some(Instant::now());
    }
}
