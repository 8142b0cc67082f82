//! Terminal client: WebSocket connection and reaction to server events

use crate::game::{render_tiles, GuessOutcome, Round};
use crate::input::{parse_line, Command};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use shared::{
    ClientEvent, GameResult, LeaderboardEntry, ProtocolError, ServerEvent, BUILTIN_WORDS,
    MAX_ATTEMPTS,
};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// What the run loop should do in response to input or a server event
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Send(ClientEvent),
    Print(String),
    Quit,
}

/// Where the player is in the matchmaking flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Searching,
    Playing,
    /// Finished locally, waiting for the opponent or the verdict
    AwaitingResult,
    /// Local round with no opponent. Nothing is reported to the server.
    Solo,
}

/// Client state, independent of the socket so it can be driven in tests.
pub struct Client {
    name: String,
    phase: Phase,
    round: Option<Round>,
    leaderboard: Vec<LeaderboardEntry>,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phase: Phase::Idle,
            round: None,
            leaderboard: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn find_game(&self) -> ClientEvent {
        ClientEvent::FindGame {
            name: self.name.clone(),
        }
    }

    pub fn on_input(&mut self, line: &str) -> Vec<Action> {
        let command = match parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Vec::new(),
            Err(e) => return vec![Action::Print(e.to_string())],
        };

        match command {
            Command::Quit => vec![Action::Quit],
            Command::Find => {
                let mut actions = Vec::new();
                if self.phase == Phase::Solo {
                    self.phase = Phase::Idle;
                    self.round = None;
                    actions.push(Action::Print("Solo round abandoned.".to_string()));
                }
                actions.push(Action::Send(self.find_game()));
                actions
            }
            Command::Solo => self.solo(),
            Command::Leaderboard => vec![Action::Print(format_leaderboard(&self.leaderboard))],
            Command::Guess(guess) => self.guess(&guess),
        }
    }

    /// Starts a solo round against `word`.
    pub fn start_solo(&mut self, word: impl Into<String>) -> Vec<Action> {
        self.phase = Phase::Solo;
        self.round = Some(Round::new(word));
        vec![Action::Print(format!(
            "Playing solo: guess the word in {} attempts!",
            MAX_ATTEMPTS
        ))]
    }

    fn solo(&mut self) -> Vec<Action> {
        match self.phase {
            Phase::Idle | Phase::Solo => match BUILTIN_WORDS.choose(&mut rand::thread_rng()) {
                Some(word) => self.start_solo(*word),
                None => vec![Action::Print("No words available for solo play.".to_string())],
            },
            Phase::Searching | Phase::Playing | Phase::AwaitingResult => vec![Action::Print(
                "Finish or leave the current match before playing solo.".to_string(),
            )],
        }
    }

    fn end_solo(&mut self, headline: &str) -> Vec<Action> {
        self.phase = Phase::Idle;
        let word = self
            .round
            .take()
            .map(|round| round.secret().to_ascii_uppercase())
            .unwrap_or_default();
        vec![
            Action::Print(format!("{} The word was: {}", headline, word)),
            Action::Print("Type /solo to play again or /find for a match.".to_string()),
        ]
    }

    fn guess(&mut self, guess: &str) -> Vec<Action> {
        let solo = self.phase == Phase::Solo;
        let Some(round) = self
            .round
            .as_mut()
            .filter(|_| matches!(self.phase, Phase::Playing | Phase::Solo))
        else {
            return vec![Action::Print(match self.phase {
                Phase::AwaitingResult => "Waiting for the result of this game.".to_string(),
                _ => "No game in progress. Type /find to look for one or /solo to play alone."
                    .to_string(),
            })];
        };

        let Some(outcome) = round.submit(guess) else {
            return Vec::new();
        };

        let mut actions = vec![Action::Print(render_tiles(guess, outcome.tiles()))];
        match outcome {
            GuessOutcome::Continue { remaining, .. } => {
                actions.push(Action::Print(format!("{} attempts left", remaining)));
            }
            GuessOutcome::Solved { attempts, .. } if solo => {
                let headline = format!("Solo Win! You got it in {} tries.", attempts);
                actions.extend(self.end_solo(&headline));
            }
            GuessOutcome::Exhausted { .. } if solo => {
                actions.extend(self.end_solo("Solo Game Over. Better luck next time (solo)!"));
            }
            GuessOutcome::Solved { attempts, .. } => {
                self.phase = Phase::AwaitingResult;
                actions.push(Action::Send(ClientEvent::IWon { attempts }));
            }
            GuessOutcome::Exhausted { attempts, .. } => {
                self.phase = Phase::AwaitingResult;
                actions.push(Action::Send(ClientEvent::AllAttemptsUsed { attempts }));
            }
        }
        actions
    }

    pub fn on_server_event(&mut self, event: ServerEvent) -> Vec<Action> {
        match event {
            ServerEvent::WaitingForOpponent => {
                self.phase = Phase::Searching;
                vec![Action::Print("Waiting for an opponent...".to_string())]
            }
            ServerEvent::AlreadyInGameOrSearching { message } => vec![Action::Print(message)],
            ServerEvent::GameStarted {
                room_id,
                word,
                opponent_name,
                my_name,
            } => {
                info!("Joined {}", room_id);
                self.phase = Phase::Playing;
                self.round = Some(Round::new(word));
                vec![Action::Print(format!(
                    "{} vs {}: guess the word in {} attempts!",
                    my_name, opponent_name, MAX_ATTEMPTS
                ))]
            }
            ServerEvent::WaitingForOpponentFinish { message, .. } => {
                self.phase = Phase::AwaitingResult;
                vec![Action::Print(message)]
            }
            ServerEvent::OpponentUpdate { message } => vec![Action::Print(message)],
            ServerEvent::GameOver {
                result,
                word,
                message,
                winner,
                attempts,
            } => {
                self.phase = Phase::Idle;
                self.round = None;

                let headline = match result {
                    GameResult::Win => "You won!",
                    GameResult::Lose => "You lost.",
                    GameResult::Draw => "Draw.",
                };
                let mut summary = format!("{} {} The word was '{}'.", headline, message, word);
                if let (Some(winner), Some(attempts)) = (winner, attempts) {
                    summary.push_str(&format!(" {} needed {} attempts.", winner, attempts));
                }
                vec![
                    Action::Print(summary),
                    Action::Print("Type /find to play again.".to_string()),
                ]
            }
            ServerEvent::LeaderboardUpdate(entries) => {
                self.leaderboard = entries;
                debug!("Leaderboard now has {} entries", self.leaderboard.len());
                Vec::new()
            }
        }
    }
}

pub fn format_leaderboard(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "No wins recorded yet.".to_string();
    }
    entries
        .iter()
        .enumerate()
        .map(|(rank, entry)| format!("{:>2}. {:<20} {}", rank + 1, entry.name, entry.score))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Connects, queues for a game and runs until the player quits or the
/// server goes away.
pub async fn run(server: &str, name: &str) -> Result<(), ClientError> {
    let (socket, _) = connect_async(server).await?;
    info!("Connected to {}", server);
    let (mut sink, mut frames) = socket.split();

    let mut client = Client::new(name);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    sink.send(Message::Text(client.find_game().to_json()?.into()))
        .await?;

    loop {
        let actions = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => client.on_input(&line),
                None => vec![Action::Quit],
            },

            frame = frames.next() => match frame {
                Some(Ok(Message::Text(text))) => match ServerEvent::from_json(text.as_str()) {
                    Ok(event) => client.on_server_event(event),
                    Err(e) => {
                        warn!("Ignoring unreadable server message: {}", e);
                        Vec::new()
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    if let Some(frame) = frame {
                        println!("Server closed the connection: {}", frame.reason);
                    }
                    return Ok(());
                }
                Some(Ok(_)) => Vec::new(),
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        };

        for action in actions {
            match action {
                Action::Send(event) => {
                    sink.send(Message::Text(event.to_json()?.into())).await?;
                }
                Action::Print(text) => println!("{}", text),
                Action::Quit => {
                    let _ = sink.send(Message::Close(None)).await;
                    return Ok(());
                }
            }
        }
    }
}
