//! Startup configuration
//!
//! Read once from a URL-style query string (`?seed=7&sound=0&cue=bell`) and
//! immutable afterwards. Bad values fall back to defaults with a warning.

use serde::{Deserialize, Serialize};

use crate::sim::{CueKind, CueMode, RoundEngine, SeededRng};

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Fixed seed for a reproducible duel; random when absent
    pub seed: Option<u64>,
    /// Gates sound effects only, never game logic
    pub sound_enabled: bool,
    /// Forces the cue to `none`
    pub hardcore: bool,
    /// Cue policy when not hardcore
    pub cue_mode: CueMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            sound_enabled: true,
            hardcore: false,
            cue_mode: CueMode::Rotate,
        }
    }
}

/// Lenient boolean parse for query values
fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "" | "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Seeds are any integer; negatives wrap into the u64 range
fn parse_seed(value: &str) -> Option<u64> {
    value
        .parse::<u64>()
        .ok()
        .or_else(|| value.parse::<i64>().ok().map(|seed| seed as u64))
}

impl Settings {
    /// Parse settings from a query string. A leading `?` is optional.
    pub fn from_query(query: &str) -> Self {
        let mut settings = Self::default();
        let query = query.trim().trim_start_matches('?');

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let decoded = urlencoding::decode(raw);
            let value = match &decoded {
                Ok(value) => value.trim(),
                Err(_) => {
                    log::warn!("Ignoring undecodable value for {:?}", key);
                    continue;
                }
            };
            match key.trim().to_lowercase().as_str() {
                "seed" => match parse_seed(value) {
                    Some(seed) => settings.seed = Some(seed),
                    None => log::warn!("Ignoring invalid seed {:?}", value),
                },
                "sound" => match parse_flag(value) {
                    Some(on) => settings.sound_enabled = on,
                    None => log::warn!("Ignoring invalid sound flag {:?}", value),
                },
                "hardcore" => match parse_flag(value) {
                    Some(on) => settings.hardcore = on,
                    None => log::warn!("Ignoring invalid hardcore flag {:?}", value),
                },
                "cue" => match CueMode::from_str(value) {
                    Some(mode) => settings.cue_mode = mode,
                    None => log::warn!("Unknown cue mode {:?}, using rotate", value),
                },
                other => log::debug!("Ignoring unknown setting {:?}", other),
            }
        }

        settings
    }

    /// Cue policy after applying hardcore mode
    pub fn effective_cue_mode(&self) -> CueMode {
        if self.hardcore {
            CueMode::Fixed(CueKind::Silent)
        } else {
            self.cue_mode
        }
    }

    /// Build the round engine these settings describe
    pub fn build_engine(&self, best: u32) -> RoundEngine<SeededRng> {
        let rng = SeededRng::from_seed_option(self.seed);
        log::info!(
            "Duel seed {} (cue={:?}, hardcore={}, sound={})",
            rng.seed(),
            self.effective_cue_mode(),
            self.hardcore,
            self.sound_enabled
        );
        RoundEngine::new(self.effective_cue_mode(), best, rng)
    }

    /// Load settings from the page URL (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        let settings = Self::from_query(&search);
        log::info!("Loaded settings from URL: {:?}", settings);
        settings
    }

    /// Load settings from command-line arguments (`seed=7 cue=bell`)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let query = std::env::args().skip(1).collect::<Vec<_>>().join("&");
        Self::from_query(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_query("");
        assert_eq!(settings, Settings::default());
        assert!(settings.sound_enabled);
        assert!(!settings.hardcore);
        assert_eq!(settings.cue_mode, CueMode::Rotate);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn test_full_query() {
        let settings = Settings::from_query("?seed=42&sound=off&hardcore=1&cue=Glyph");
        assert_eq!(settings.seed, Some(42));
        assert!(!settings.sound_enabled);
        assert!(settings.hardcore);
        assert_eq!(settings.cue_mode, CueMode::Fixed(CueKind::Glyph));
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let settings = Settings::from_query("seed=abc&sound=maybe&cue=smoke&volume=11&&");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_values_are_percent_decoded() {
        let settings = Settings::from_query("cue=%20bell%20&seed=%31%32&sound=%6Fff");
        assert_eq!(settings.cue_mode, CueMode::Fixed(CueKind::Bell));
        assert_eq!(settings.seed, Some(12));
        assert!(!settings.sound_enabled);

        // Invalid UTF-8 after decoding falls back to the default
        let settings = Settings::from_query("cue=%FF");
        assert_eq!(settings.cue_mode, CueMode::Rotate);
    }

    #[test]
    fn test_negative_seed_wraps() {
        assert_eq!(Settings::from_query("seed=-1").seed, Some(u64::MAX));
        assert_eq!(Settings::from_query("seed=%2D5").seed, Some(-5i64 as u64));
        assert_eq!(
            Settings::from_query("seed=18446744073709551615").seed,
            Some(u64::MAX)
        );
        assert_eq!(Settings::from_query("seed=-").seed, None);
    }

    #[test]
    fn test_bare_flag_means_true() {
        let settings = Settings::from_query("hardcore");
        assert!(settings.hardcore);
    }

    #[test]
    fn test_hardcore_forces_silent_cue() {
        let settings = Settings::from_query("cue=text&hardcore=yes");
        assert_eq!(settings.cue_mode, CueMode::Fixed(CueKind::Text));
        assert_eq!(settings.effective_cue_mode(), CueMode::Fixed(CueKind::Silent));

        let engine = settings.build_engine(0);
        assert_eq!(engine.state().cue, CueKind::Silent);
    }

    #[test]
    fn test_seeded_engines_agree() {
        let settings = Settings::from_query("seed=9");
        let a = settings.build_engine(3);
        let b = settings.build_engine(3);
        assert_eq!(a.state().timing, b.state().timing);
        assert_eq!(a.state().score.best, 3);
    }
}
