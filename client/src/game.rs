//! Client-side round state and local guess evaluation

use shared::{MAX_ATTEMPTS, WORD_LENGTH};
use std::fmt::Write;

/// Feedback for a single letter of a guess
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    /// Right letter, right position
    Correct,
    /// Letter occurs elsewhere in the word
    Present,
    Absent,
}

/// Marks a guess against the secret word.
///
/// Exact matches are claimed first; the remaining letters of the secret are
/// then handed out left to right, so a repeated letter is only marked
/// present as many times as it is still unclaimed in the secret.
pub fn evaluate_guess(secret: &str, guess: &str) -> Vec<Tile> {
    let secret = secret.as_bytes();
    let guess = guess.as_bytes();

    let mut tiles = vec![Tile::Absent; guess.len()];
    let mut unclaimed = [0u8; 26];

    for (i, &letter) in secret.iter().enumerate() {
        if guess.get(i) == Some(&letter) {
            tiles[i] = Tile::Correct;
        } else if let Some(slot) = letter_slot(letter) {
            unclaimed[slot] += 1;
        }
    }

    for (i, &letter) in guess.iter().enumerate() {
        if tiles[i] == Tile::Correct {
            continue;
        }
        if let Some(slot) = letter_slot(letter) {
            if unclaimed[slot] > 0 {
                unclaimed[slot] -= 1;
                tiles[i] = Tile::Present;
            }
        }
    }

    tiles
}

fn letter_slot(letter: u8) -> Option<usize> {
    letter
        .is_ascii_lowercase()
        .then(|| (letter - b'a') as usize)
}

/// Renders a marked guess for the terminal: `[C]` correct, `(C)` present,
/// ` c ` absent.
pub fn render_tiles(guess: &str, tiles: &[Tile]) -> String {
    let mut line = String::with_capacity(guess.len() * 3);
    for (letter, tile) in guess.chars().zip(tiles) {
        let _ = match tile {
            Tile::Correct => write!(line, "[{}]", letter.to_ascii_uppercase()),
            Tile::Present => write!(line, "({})", letter.to_ascii_uppercase()),
            Tile::Absent => write!(line, " {} ", letter),
        };
    }
    line
}

/// Result of submitting one guess
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Not solved yet, attempts remain
    Continue { tiles: Vec<Tile>, remaining: u32 },
    /// Every tile correct
    Solved { tiles: Vec<Tile>, attempts: u32 },
    /// The last attempt was used without solving
    Exhausted { tiles: Vec<Tile>, attempts: u32 },
}

impl GuessOutcome {
    pub fn tiles(&self) -> &[Tile] {
        match self {
            GuessOutcome::Continue { tiles, .. }
            | GuessOutcome::Solved { tiles, .. }
            | GuessOutcome::Exhausted { tiles, .. } => tiles,
        }
    }
}

/// One player's side of a session
#[derive(Debug, Clone)]
pub struct Round {
    secret: String,
    guesses: Vec<String>,
    finished: bool,
}

impl Round {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into().to_ascii_lowercase(),
            guesses: Vec::new(),
            finished: false,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn guesses(&self) -> &[String] {
        &self.guesses
    }

    pub fn attempts(&self) -> u32 {
        self.guesses.len() as u32
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Records a validated guess. Returns `None` once the round is over.
    pub fn submit(&mut self, guess: &str) -> Option<GuessOutcome> {
        if self.finished {
            return None;
        }

        let tiles = evaluate_guess(&self.secret, guess);
        self.guesses.push(guess.to_string());
        let attempts = self.attempts();

        let solved = guess.len() == WORD_LENGTH && tiles.iter().all(|t| *t == Tile::Correct);
        if solved {
            self.finished = true;
            Some(GuessOutcome::Solved { tiles, attempts })
        } else if attempts >= MAX_ATTEMPTS {
            self.finished = true;
            Some(GuessOutcome::Exhausted { tiles, attempts })
        } else {
            Some(GuessOutcome::Continue {
                tiles,
                remaining: MAX_ATTEMPTS - attempts,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Tile::{Absent, Correct, Present};

    #[test]
    fn test_exact_match() {
        assert_eq!(evaluate_guess("crate", "crate"), vec![Correct; 5]);
    }

    #[test]
    fn test_anagram_marks_present() {
        assert_eq!(
            evaluate_guess("crate", "trace"),
            vec![Present, Correct, Correct, Present, Correct]
        );
    }

    #[test]
    fn test_repeated_letter_not_overcounted() {
        // Only one 'e' in the secret, and it is claimed by the exact match.
        assert_eq!(
            evaluate_guess("crate", "eerie"),
            vec![Absent, Absent, Present, Absent, Correct]
        );
    }

    #[test]
    fn test_repeated_letter_in_secret() {
        assert_eq!(
            evaluate_guess("abbey", "babes"),
            vec![Present, Present, Correct, Correct, Absent]
        );
    }

    #[test]
    fn test_render_tiles() {
        let tiles = evaluate_guess("crate", "trace");
        assert_eq!(render_tiles("trace", &tiles), "(T)[R][A](C)[E]");
        assert_eq!(render_tiles("fjord", &evaluate_guess("crate", "fjord")), " f  j  o (R) d ");
    }

    #[test]
    fn test_round_solved() {
        let mut round = Round::new("CRATE");
        assert_eq!(round.secret(), "crate");

        match round.submit("slate").unwrap() {
            GuessOutcome::Continue { remaining, .. } => assert_eq!(remaining, 5),
            other => panic!("unexpected outcome {:?}", other),
        }
        match round.submit("crate").unwrap() {
            GuessOutcome::Solved { attempts, .. } => assert_eq!(attempts, 2),
            other => panic!("unexpected outcome {:?}", other),
        }

        assert!(round.is_finished());
        assert!(round.submit("crate").is_none());
        assert_eq!(round.guesses().len(), 2);
    }

    #[test]
    fn test_round_exhausted_after_max_attempts() {
        let mut round = Round::new("crate");
        for _ in 1..MAX_ATTEMPTS {
            assert!(matches!(
                round.submit("fjord"),
                Some(GuessOutcome::Continue { .. })
            ));
        }

        let last = round.submit("fjord").unwrap();
        assert_eq!(
            last,
            GuessOutcome::Exhausted {
                tiles: evaluate_guess("crate", "fjord"),
                attempts: MAX_ATTEMPTS,
            }
        );
        assert_eq!(last.tiles().len(), WORD_LENGTH);
        assert!(round.submit("crate").is_none());
    }

    #[test]
    fn test_solved_on_last_attempt_is_a_win() {
        let mut round = Round::new("crate");
        for _ in 1..MAX_ATTEMPTS {
            round.submit("fjord");
        }
        assert!(matches!(
            round.submit("crate"),
            Some(GuessOutcome::Solved { attempts: 6, .. })
        ));
    }
}
