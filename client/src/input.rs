//! Parsing of terminal input lines into client commands

use shared::WORD_LENGTH;
use thiserror::Error;

/// Something the player typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Look for a new game
    Find,
    /// Play a local round against a random word, without the server
    Solo,
    Quit,
    Leaderboard,
    /// A normalized, lowercase guess
    Guess(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Guesses must be exactly {expected} letters (got {got})")]
    WrongLength { expected: usize, got: usize },

    #[error("Guesses may only contain letters a-z")]
    NotAlphabetic,

    #[error("Unknown command '{0}'. Try /find, /solo, /top or /quit")]
    UnknownCommand(String),
}

/// Parses one line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(command) = line.strip_prefix('/') {
        return match command.to_ascii_lowercase().as_str() {
            "find" | "play" => Ok(Some(Command::Find)),
            "solo" => Ok(Some(Command::Solo)),
            "quit" | "exit" => Ok(Some(Command::Quit)),
            "top" => Ok(Some(Command::Leaderboard)),
            other => Err(InputError::UnknownCommand(other.to_string())),
        };
    }

    normalize_guess(line).map(|guess| Some(Command::Guess(guess)))
}

/// Lowercases and validates a guess.
pub fn normalize_guess(guess: &str) -> Result<String, InputError> {
    let guess = guess.trim().to_ascii_lowercase();

    if !guess.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(InputError::NotAlphabetic);
    }
    if guess.len() != WORD_LENGTH {
        return Err(InputError::WrongLength {
            expected: WORD_LENGTH,
            got: guess.chars().count(),
        });
    }
    Ok(guess)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_line("/find"), Ok(Some(Command::Find)));
        assert_eq!(parse_line("/QUIT"), Ok(Some(Command::Quit)));
        assert_eq!(parse_line("/solo"), Ok(Some(Command::Solo)));
        assert_eq!(parse_line(" /top "), Ok(Some(Command::Leaderboard)));
        assert_eq!(
            parse_line("/dance"),
            Err(InputError::UnknownCommand("dance".to_string()))
        );
    }

    #[test]
    fn test_guess_normalized() {
        assert_eq!(
            parse_line(" Crate\n"),
            Ok(Some(Command::Guess("crate".to_string())))
        );
    }

    #[test]
    fn test_guess_validation() {
        assert_eq!(
            normalize_guess("cat"),
            Err(InputError::WrongLength {
                expected: 5,
                got: 3
            })
        );
        assert_eq!(normalize_guess("cr4te"), Err(InputError::NotAlphabetic));
        assert_eq!(normalize_guess("crâte"), Err(InputError::NotAlphabetic));
    }
}
