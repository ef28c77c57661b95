//! Best score persistence
//!
//! A single number, stored in LocalStorage on the web and in a small JSON file
//! natively. It only ever goes up.

use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

/// Best score across sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BestScore {
    pub best: u32,
}

impl BestScore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "quickdraw_best";

    pub fn new(best: u32) -> Self {
        Self { best }
    }

    /// Fold in a finished run. Returns true when it set a new best.
    pub fn record(&mut self, score: u32) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Parse a stored value; accepts the JSON envelope or a bare number
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        serde_json::from_str::<BestScore>(raw)
            .ok()
            .or_else(|| raw.parse::<u32>().ok().map(Self::new))
    }

    /// Load the best score from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(raw)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(best) = Self::parse(&raw) {
                    log::info!("Loaded best score {}", best.best);
                    return best;
                }
                log::warn!("Stored best score is unreadable, starting from 0");
            }
        }

        log::info!("No best score found, starting fresh");
        Self::default()
    }

    /// Save the best score to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::warn!("LocalStorage unavailable, best score not saved");
            return;
        };
        if let Ok(json) = serde_json::to_string(self) {
            if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                log::warn!("Failed to save best score");
            } else {
                log::info!("Best score saved ({})", self.best);
            }
        }
    }

    /// Load the best score from a JSON file. A missing file is a fresh start.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &Path) -> std::io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(Self::parse(&raw).unwrap_or_else(|| {
                log::warn!("{} is unreadable, starting from 0", path.display());
                Self::default()
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Write the best score to a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_only_raises() {
        let mut best = BestScore::new(4);
        assert!(!best.record(2));
        assert!(!best.record(4));
        assert!(best.record(9));
        assert_eq!(best.best, 9);
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(BestScore::parse("{\"best\":12}"), Some(BestScore::new(12)));
        assert_eq!(BestScore::parse(" 7\n"), Some(BestScore::new(7)));
        assert_eq!(BestScore::parse("garbage"), None);
        assert_eq!(BestScore::parse("-3"), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_round_trip_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.json");

        assert_eq!(BestScore::load_from(&path).unwrap(), BestScore::default());

        BestScore::new(15).save_to(&path).unwrap();
        assert_eq!(BestScore::load_from(&path).unwrap().best, 15);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_corrupt_file_loads_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(BestScore::load_from(&path).unwrap().best, 0);
    }
}
