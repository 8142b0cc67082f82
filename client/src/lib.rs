//! # Word Duel Client Library
//!
//! Terminal client for the word duel matchmaking server. It queues for a
//! game, evaluates guesses locally against the secret word the server hands
//! out, and reports only the outcome back. Solo rounds draw a word from
//! the shared built-in list and never touch the server.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! Per-round state and tile feedback:
//! - Two-pass marking of correct and present letters
//! - Attempt counting up to the shared limit
//!
//! ### Input Module (`input`)
//! Turns terminal lines into commands (`/find`, `/solo`, `/top`, `/quit`) or
//! validated guesses.
//!
//! ### Network Module (`network`)
//! The WebSocket loop and the [`network::Client`] state that reacts to
//! server events. The state is socket-free so it can be tested directly.

pub mod game;
pub mod input;
pub mod network;
