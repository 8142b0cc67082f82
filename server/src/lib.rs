//! # Word Duel Server Library
//!
//! This library provides the authoritative matchmaking server for two-player
//! word-guessing duels. It pairs waiting players, owns every game session,
//! arbitrates outcomes and keeps the global leaderboard.
//!
//! ## Core Responsibilities
//!
//! ### Matchmaking
//! Players ask for a game with an optional display name. They wait in a FIFO
//! queue until a second player arrives, at which point both receive the same
//! secret word. A player that is already waiting or playing cannot queue twice.
//!
//! ### Outcome Arbitration
//! Clients evaluate their own guesses and only report outcomes: a win, or
//! that all attempts were used. The server decides who wins, who draws, and
//! what each participant is told. A disconnect counts as a forfeit while the
//! opponent is still playing.
//!
//! ### Leaderboard
//! Every win credits the winner's name. The top entries are broadcast to all
//! connections whenever the standings change.
//!
//! ## Architecture Design
//!
//! ### Single-Writer Event Loop
//! Every socket task forwards parsed events into one channel. A single loop
//! owns all matchmaking state and handles those events one at a time, so
//! queue, registry and leaderboard never need locks.
//!
//! ### WebSocket Transport
//! Messages are JSON text frames of the form `{"event": ..., "data": ...}`.
//! Live socket handles never enter the domain types; the core addresses
//! connections by id through the [`transport::Transport`] trait.
//!
//! ## Module Organization
//!
//! - `client_manager`: registered connections, names, capacity
//! - `coordinator`: the matchmaking state machine driving everything below
//! - `queue`: the FIFO of waiting connections
//! - `session` / `registry`: per-pair game state and its lookup table
//! - `leaderboard`: win counts by case-insensitive name
//! - `words`: secret word selection
//! - `transport`: delivery primitives and the channel-backed adapter
//! - `network`: WebSocket accept loop and the event loop itself
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{Server, ServerConfig};
//! use server::words::WordList;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         addr: "127.0.0.1:3001".to_string(),
//!         ..ServerConfig::default()
//!     };
//!
//!     let mut server = Server::bind(config, Box::new(WordList::builtin())).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod coordinator;
pub mod error;
pub mod leaderboard;
pub mod network;
pub mod queue;
pub mod registry;
pub mod session;
pub mod transport;
pub mod words;
