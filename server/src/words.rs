//! Secret word selection

use crate::error::WordListError;
use rand::seq::SliceRandom;
use shared::{BUILTIN_WORDS, WORD_LENGTH};
use std::path::Path;

/// Supplies the secret word for a new session.
pub trait WordSource: Send {
    fn select_secret_word(&mut self) -> String;
}

/// Uniform random choice from a fixed list of playable words.
#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Keeps only lowercase-able ASCII words of the playable length.
    pub fn new<I, S>(words: I) -> Result<Self, WordListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_ascii_lowercase())
            .filter(|word| is_playable(word))
            .collect();
        words.sort();
        words.dedup();

        if words.is_empty() {
            return Err(WordListError::Empty);
        }
        Ok(Self { words })
    }

    pub fn builtin() -> Self {
        Self {
            words: BUILTIN_WORDS.iter().map(|word| word.to_string()).collect(),
        }
    }

    /// Loads one word per line.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WordListError> {
        let contents = std::fs::read_to_string(path)?;
        Self::new(contents.lines())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }
}

impl WordSource for WordList {
    fn select_secret_word(&mut self) -> String {
        self.words
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| BUILTIN_WORDS[0].to_string())
    }
}

fn is_playable(word: &str) -> bool {
    word.len() == WORD_LENGTH && word.bytes().all(|b| b.is_ascii_lowercase())
}
