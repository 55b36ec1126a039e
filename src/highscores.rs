//! High score leaderboard system
//!
//! Fed once per crash from the race's event queue, tracks top 10 scores.

use serde::{Deserialize, Serialize};

use crate::persistence::JsonStore;
use crate::sim::GameEvent;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final score of the run
    pub score: u64,
    /// Distance travelled before the crash
    pub distance: f32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Store key
    const STORAGE_KEY: &'static str = "highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u64, distance: f32, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            distance,
            timestamp,
        };

        // Ties keep earlier entries ahead
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Record the result carried by a `Crashed` event; other events are ignored
    pub fn record(&mut self, event: &GameEvent, timestamp: f64) -> Option<usize> {
        match event {
            GameEvent::Crashed { score, distance } => {
                let rank = self.add_score(*score, *distance, timestamp);
                match rank {
                    Some(rank) => log::info!("New high score #{}: {}", rank, score),
                    None => log::info!("Score {} did not make the board", score),
                }
                rank
            }
            _ => None,
        }
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores, starting fresh when missing or unreadable
    pub fn load(store: &JsonStore) -> Self {
        match store.load::<Self>(Self::STORAGE_KEY) {
            Ok(Some(mut scores)) => {
                scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
                scores.entries.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Failed to load high scores, starting fresh: {}", e);
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &JsonStore) {
        match store.save(Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("High scores saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("Failed to save high scores: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::test_support::temp_store;
    use crate::sim::RaceMode;

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.add_score(0, 10.0, 1.0), None);
    }

    #[test]
    fn test_sorted_descending_and_ranked() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(500, 10.0, 1.0), Some(1));
        assert_eq!(scores.add_score(900, 20.0, 2.0), Some(1));
        assert_eq!(scores.add_score(700, 15.0, 3.0), Some(2));
        let values: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(values, vec![900, 700, 500]);
        assert_eq!(scores.top_score(), Some(900));
    }

    #[test]
    fn test_ties_rank_after_existing() {
        let mut scores = HighScores::new();
        scores.add_score(500, 1.0, 1.0);
        assert_eq!(scores.add_score(500, 2.0, 2.0), Some(2));
        assert_eq!(scores.entries[0].timestamp, 1.0);
    }

    #[test]
    fn test_keeps_top_ten() {
        let mut scores = HighScores::new();
        for i in 1..=15u64 {
            scores.add_score(i * 100, 0.0, i as f64);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(1500));
        assert_eq!(scores.entries.last().map(|e| e.score), Some(600));
        assert!(!scores.qualifies(600));
        assert_eq!(scores.add_score(601, 0.0, 16.0), Some(10));
        assert_eq!(scores.entries.last().map(|e| e.score), Some(601));
    }

    #[test]
    fn test_record_only_reacts_to_crash() {
        let mut scores = HighScores::new();
        let mode = GameEvent::ModeChanged {
            from: RaceMode::Racing,
            to: RaceMode::Crashed,
        };
        assert_eq!(scores.record(&mode, 0.0), None);
        assert!(scores.is_empty());

        let crash = GameEvent::Crashed {
            score: 1234,
            distance: 88.0,
        };
        assert_eq!(scores.record(&crash, 5.0), Some(1));
        assert_eq!(scores.entries[0].distance, 88.0);
    }

    #[test]
    fn test_save_and_load() {
        let store = temp_store("highscores");
        let mut scores = HighScores::new();
        scores.add_score(300, 1.0, 1.0);
        scores.add_score(100, 2.0, 2.0);
        scores.save(&store);
        assert_eq!(HighScores::load(&store), scores);
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let store = temp_store("highscores-corrupt");
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.path_for("highscores"), "[1, 2").unwrap();
        assert!(HighScores::load(&store).is_empty());
    }
}
