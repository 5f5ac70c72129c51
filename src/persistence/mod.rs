//! Unlocked-level progress
//!
//! Stored as a JSON array of cleared level ids under a single key. Missing
//! or malformed data reads as "no progress".

use std::collections::BTreeSet;

use crate::platform::KeyValueStore;

/// Storage key for cleared levels
pub const PROGRESS_KEY: &str = "kings_dash_progress";

/// Decode a stored progress value
pub fn decode(json: &str) -> Result<BTreeSet<u32>, serde_json::Error> {
    let levels: Vec<u32> = serde_json::from_str(json)?;
    Ok(levels.into_iter().collect())
}

/// Encode progress as an ascending JSON array
pub fn encode(levels: &BTreeSet<u32>) -> String {
    let levels: Vec<u32> = levels.iter().copied().collect();
    serde_json::to_string(&levels).unwrap_or_else(|_| "[]".to_string())
}

/// Whether `level` can be started given the cleared set
pub fn is_playable(cleared: &BTreeSet<u32>, level: u32) -> bool {
    level == 1 || (level > 1 && cleared.contains(&(level - 1)))
}

/// Load/save of cleared levels on top of a key-value store
pub struct ProgressStore {
    backend: Box<dyn KeyValueStore>,
}

impl ProgressStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Cleared levels; empty on missing or malformed data
    pub fn load(&self) -> BTreeSet<u32> {
        let Some(json) = self.backend.get(PROGRESS_KEY) else {
            log::info!("No saved progress, starting fresh");
            return BTreeSet::new();
        };
        match decode(&json) {
            Ok(levels) => {
                log::info!("Loaded progress ({} levels cleared)", levels.len());
                levels
            }
            Err(err) => {
                log::warn!("Ignoring malformed progress: {err}");
                BTreeSet::new()
            }
        }
    }

    pub fn save(&mut self, levels: &BTreeSet<u32>) {
        if !self.backend.set(PROGRESS_KEY, &encode(levels)) {
            log::warn!("Failed to save progress");
        }
    }

    pub fn clear(&mut self) {
        self.backend.remove(PROGRESS_KEY);
        log::info!("Progress cleared");
    }

    /// Read-modify-write union of one cleared level
    ///
    /// Returns the updated set; stored only if it changed.
    pub fn record_clear(&mut self, level: u32) -> BTreeSet<u32> {
        let mut levels = self.load();
        if levels.insert(level) {
            self.save(&levels);
            log::info!("Level {level} cleared and saved");
        }
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    fn store_with(value: Option<&str>) -> ProgressStore {
        let mut backend = MemoryStore::new();
        if let Some(value) = value {
            backend.set(PROGRESS_KEY, value);
        }
        ProgressStore::new(Box::new(backend))
    }

    #[test]
    fn test_missing_is_empty() {
        assert!(store_with(None).load().is_empty());
    }

    #[test]
    fn test_malformed_is_empty() {
        assert!(store_with(Some("{not json")).load().is_empty());
        assert!(store_with(Some("[\"a\"]")).load().is_empty());
        assert!(store_with(Some("[-1]")).load().is_empty());
    }

    #[test]
    fn test_round_trip_dedups() {
        let store = store_with(Some("[3,1,3,2]"));
        let levels = store.load();
        assert_eq!(levels.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_record_clear_is_idempotent() {
        let mut store = store_with(None);
        store.record_clear(1);
        store.record_clear(1);
        store.record_clear(2);
        assert_eq!(store.backend.get(PROGRESS_KEY).as_deref(), Some("[1,2]"));
    }

    #[test]
    fn test_clear_removes_key() {
        let mut store = store_with(Some("[1]"));
        store.clear();
        assert!(store.backend.get(PROGRESS_KEY).is_none());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_playable_rule() {
        let cleared: BTreeSet<u32> = [1, 2].into_iter().collect();
        assert!(is_playable(&cleared, 1));
        assert!(is_playable(&cleared, 3));
        assert!(!is_playable(&cleared, 4));
        assert!(is_playable(&BTreeSet::new(), 1));
        assert!(!is_playable(&BTreeSet::new(), 2));
        assert!(!is_playable(&cleared, 0));
    }
}
