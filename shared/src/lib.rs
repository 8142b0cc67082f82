use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const WORD_LENGTH: usize = 5;
pub const MAX_ATTEMPTS: u32 = 6;
pub const MAX_LEADERBOARD_SIZE: usize = 10;

/// Secret words used when no word file is configured. The client also
/// draws its solo rounds from this list.
pub const BUILTIN_WORDS: &[&str] = &[
    "cigar", "rebut", "sissy", "humph", "awake", "blush", "focal", "evade", "naval", "serve",
    "heath", "dwarf", "model", "karma", "stink", "grade", "quiet", "bench", "abate", "feign",
    "major", "death", "fresh", "crust", "stool", "colon", "abase", "marry", "react", "batty",
    "pride", "floss", "helix", "croak", "staff", "paper", "unfed", "whelp", "trawl", "outdo",
    "adobe", "crazy", "sower", "repay", "digit", "crate", "cluck", "spike", "mimic", "pound",
    "maxim", "linen", "unmet", "flesh", "booby", "forth", "first", "stand", "belly", "ivory",
    "seedy", "print", "yearn", "drain", "bribe", "stout", "panel", "crass", "flume", "offal",
    "agree", "error", "swirl", "argue", "bleed", "delta", "flick", "totem", "wooer", "front",
    "shrub", "parry", "biome", "lapel", "start", "greet", "goner", "golem", "lusty", "loopy",
    "round", "audit", "lying", "gamma", "labor", "islet", "civic", "forge", "corny", "moult",
    "basic", "salad", "agate", "spicy", "spray", "essay", "fjord", "spend", "kebab", "guild",
    "aback", "motor", "alone", "hatch", "hyper", "thumb", "dowry", "ought", "belch", "dutch",
    "pilot", "tweed", "comet", "jaunt", "enema", "steed", "abyss", "growl", "fling", "dozen",
    "boozy", "erode", "world", "gouge", "click", "briar", "great", "altar", "pulpy", "blurt",
    "coast", "duchy", "groin", "fixer", "group", "rogue", "badly", "smart", "pithy", "gaudy",
    "chill", "heron", "vodka", "finer", "surer", "radio", "rouge", "perch", "retch", "wrote",
    "clock", "tilde", "store", "prove", "bring", "solve", "cheat", "grime", "exult", "usher",
    "epoch", "triad", "break", "rhino", "viral", "conic", "masse", "sonic", "vital", "trace",
    "using", "peach", "champ", "baton", "brake", "pluck", "craze", "gripe", "weary", "picky",
    "acute", "ferry", "aside", "tapir", "troll", "unify", "rebus", "boost", "truss", "siege",
    "tiger", "banal", "slump", "crank", "gorge", "query", "drink", "favor", "abbey", "tangy",
    "panic", "solar", "shire", "proxy", "point", "robot", "prick", "wince", "crimp", "knoll",
    "sugar", "whack", "mount", "perky", "could", "wrung", "light", "those", "moist", "shard",
    "pleat", "aloft", "skill", "elder", "frame", "humor", "pause", "ulcer", "ultra", "robin",
    "cynic", "agora", "twirl", "sound", "overt", "plant", "lager", "scary", "meter", "buddy",
    "quack", "saute", "lyric", "ascot", "flack", "fleek", "stung", "broke", "twang", "swill",
    "birch", "woozy",
];

/// Opaque per-connection identity assigned by the transport at accept time.
pub type ConnectionId = u64;

/// Identifier of a paired match. Sent to clients as `roomId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("attempts must be between 1 and {max}, got {got}")]
    InvalidAttempts { got: u32, max: u32 },
}

/// Events a connection sends to the server.
///
/// On the wire every event is a JSON text frame shaped
/// `{"event": "<name>", "data": <payload>}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    FindGame {
        #[serde(default)]
        name: String,
    },
    IWon {
        attempts: u32,
    },
    AllAttemptsUsed {
        attempts: u32,
    },
}

impl ClientEvent {
    /// Parses and validates one inbound frame.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let event: ClientEvent = serde_json::from_str(text)?;
        event.validate()?;
        Ok(event)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            ClientEvent::FindGame { .. } => Ok(()),
            ClientEvent::IWon { attempts } | ClientEvent::AllAttemptsUsed { attempts } => {
                if (1..=MAX_ATTEMPTS).contains(attempts) {
                    Ok(())
                } else {
                    Err(ProtocolError::InvalidAttempts {
                        got: *attempts,
                        max: MAX_ATTEMPTS,
                    })
                }
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Lose,
    Draw,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
}

impl LeaderboardEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 1,
        }
    }
}

/// Events the server sends to one or more connections.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    AlreadyInGameOrSearching {
        message: String,
    },
    WaitingForOpponent,
    GameStarted {
        room_id: SessionId,
        word: String,
        opponent_name: String,
        my_name: String,
    },
    GameOver {
        result: GameResult,
        word: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attempts: Option<u32>,
    },
    WaitingForOpponentFinish {
        word: String,
        message: String,
    },
    OpponentUpdate {
        message: String,
    },
    LeaderboardUpdate(Vec<LeaderboardEntry>),
}

impl ServerEvent {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Wire name of the event, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::AlreadyInGameOrSearching { .. } => "alreadyInGameOrSearching",
            ServerEvent::WaitingForOpponent => "waitingForOpponent",
            ServerEvent::GameStarted { .. } => "gameStarted",
            ServerEvent::GameOver { .. } => "gameOver",
            ServerEvent::WaitingForOpponentFinish { .. } => "waitingForOpponentFinish",
            ServerEvent::OpponentUpdate { .. } => "opponentUpdate",
            ServerEvent::LeaderboardUpdate(_) => "leaderboardUpdate",
        }
    }
}
