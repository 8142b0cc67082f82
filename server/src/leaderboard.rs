//! Process-wide ranking of cumulative wins

use log::info;
use shared::{LeaderboardEntry, MAX_LEADERBOARD_SIZE};

/// Win counts per player name, sorted by score descending.
///
/// Names compare case-insensitively. Ties keep insertion order, and the list
/// never grows beyond its capacity: the lowest scores fall off the end.
#[derive(Debug)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    capacity: usize,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(MAX_LEADERBOARD_SIZE)
    }
}

impl Leaderboard {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Credits one win to `name`. Blank names are ignored.
    ///
    /// Returns true when the ranking changed and should be broadcast.
    pub fn record_win(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        let key = name.to_lowercase();
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.name.to_lowercase() == key)
        {
            Some(entry) => entry.score += 1,
            None => self.entries.push(LeaderboardEntry::new(name)),
        }

        // sort_by is stable
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(self.capacity);

        info!("Leaderboard updated: {:?}", self.entries);
        true
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Snapshot of the ranking for a `leaderboardUpdate` event.
    pub fn snapshot(&self) -> Vec<LeaderboardEntry> {
        self.entries.clone()
    }

    pub fn score_of(&self, name: &str) -> Option<u32> {
        let key = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.name.to_lowercase() == key)
            .map(|entry| entry.score)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
