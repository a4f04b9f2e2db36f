// Leaderboard of crowned champions and its persistence
//
// Entries are kept sorted by generation descending, then name ascending, and bounded
// to the configured capacity.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{GauntletError, Result};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub generation_crowned: u64,
    /// Archived source file name inside the champions directory
    pub file: String,
}

impl LeaderboardEntry {
    pub fn new(name: impl Into<String>, generation_crowned: u64, file: impl Into<String>) -> Self {
        LeaderboardEntry {
            name: name.into(),
            generation_crowned,
            file: file.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    capacity: usize,
}

impl Leaderboard {
    pub fn new(capacity: usize) -> Self {
        Leaderboard {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Builds a leaderboard from persisted entries, normalizing order and size
    pub fn from_entries(entries: Vec<LeaderboardEntry>, capacity: usize) -> Self {
        let mut leaderboard = Leaderboard { entries, capacity };
        leaderboard.normalize();
        leaderboard
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest-ranked entry
    pub fn head(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }

    /// Up to `m` highest-ranked entries, in rank order
    pub fn top(&self, m: usize) -> &[LeaderboardEntry] {
        &self.entries[..m.min(self.entries.len())]
    }

    /// Replaces any entry with the same name, then re-sorts and truncates
    pub fn promote(&mut self, entry: LeaderboardEntry) {
        self.entries.retain(|e| e.name != entry.name);
        self.entries.push(entry);
        self.normalize();
    }

    /// Generation to resume from: one past the newest crowning, or 1
    pub fn next_generation(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| e.generation_crowned)
            .max()
            .map_or(1, |g| g + 1)
    }

    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| {
            b.generation_crowned
                .cmp(&a.generation_crowned)
                .then_with(|| a.name.cmp(&b.name))
        });
        self.entries.truncate(self.capacity);
    }
}

/// Durable storage for the leaderboard
pub trait LeaderboardStore {
    /// Missing or unreadable state loads as an empty list
    fn load(&self) -> Vec<LeaderboardEntry>;
    fn save(&self, entries: &[LeaderboardEntry]) -> Result<()>;
}

/// JSON array on disk, replaced atomically on save
pub struct JsonLeaderboardStore {
    path: PathBuf,
}

impl JsonLeaderboardStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonLeaderboardStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "leaderboard".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LeaderboardStore for JsonLeaderboardStore {
    fn load(&self) -> Vec<LeaderboardEntry> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(
                    "Could not read leaderboard '{}': {}. Starting empty.",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(
                "Malformed leaderboard '{}': {}. Starting empty.",
                self.path.display(),
                e
            );
            Vec::new()
        })
    }

    fn save(&self, entries: &[LeaderboardEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|e| {
            GauntletError::Persistence(format!("writing {}: {}", temp.display(), e))
        })?;
        fs::rename(&temp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            GauntletError::Persistence(format!("replacing {}: {}", self.path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, generation: u64) -> LeaderboardEntry {
        LeaderboardEntry::new(name, generation, format!("{}_Gen{}.toml", name, generation))
    }

    #[test]
    fn test_promote_keeps_top_k_by_generation() {
        let mut board = Leaderboard::new(3);
        for (name, generation) in [("a", 5), ("b", 3), ("c", 9), ("d", 1)] {
            board.promote(entry(name, generation));
        }
        let generations: Vec<u64> = board.entries().iter().map(|e| e.generation_crowned).collect();
        assert_eq!(generations, vec![9, 5, 3]);
    }

    #[test]
    fn test_promote_replaces_same_name() {
        let mut board = Leaderboard::new(5);
        board.promote(entry("viper", 2));
        board.promote(entry("viper", 7));
        assert_eq!(board.len(), 1);
        assert_eq!(board.head().unwrap().generation_crowned, 7);
    }

    #[test]
    fn test_equal_generations_sort_by_name() {
        let board = Leaderboard::from_entries(vec![entry("zeta", 4), entry("alpha", 4)], 5);
        assert_eq!(board.entries()[0].name, "alpha");
    }

    #[test]
    fn test_next_generation() {
        assert_eq!(Leaderboard::new(5).next_generation(), 1);
        let board = Leaderboard::from_entries(vec![entry("a", 4), entry("b", 11)], 5);
        assert_eq!(board.next_generation(), 12);
    }

    #[test]
    fn test_top_is_bounded_by_len() {
        let board = Leaderboard::from_entries(vec![entry("a", 1)], 5);
        assert_eq!(board.top(3).len(), 1);
        assert!(Leaderboard::new(5).top(3).is_empty());
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLeaderboardStore::new(dir.path().join("leaderboard.json"));
        assert!(store.load().is_empty());

        let entries = vec![entry("a", 2), entry("b", 1)];
        store.save(&entries).unwrap();
        assert_eq!(store.load(), entries);
        assert!(!dir.path().join("leaderboard.json.tmp").exists());

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"generation_crowned\": 2"));
    }

    #[test]
    fn test_json_store_malformed_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaderboard.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(JsonLeaderboardStore::new(path).load().is_empty());
    }

    #[test]
    fn test_json_store_save_failure_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLeaderboardStore::new(dir.path().join("missing").join("leaderboard.json"));
        assert!(matches!(
            store.save(&[entry("a", 1)]),
            Err(GauntletError::Persistence(_))
        ));
    }
}
