//! Quickdraw - a single-screen reaction duel
//!
//! Core modules:
//! - `sim`: Deterministic round engine (state machine, timers, difficulty)
//! - `settings`: Startup configuration from the URL query
//! - `highscores`: Persisted best score
//! - `platform`: Input debouncing and frame timing
//! - `audio`: Sound effects for duel events
//! - `hud`: Text view of the duel for the page

pub mod audio;
pub mod highscores;
pub mod hud;
pub mod platform;
pub mod settings;
pub mod sim;

pub use highscores::BestScore;
pub use hud::HudView;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Nominal frame length for headless runs (60 Hz)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Rounds the native demo plays before stopping
    pub const DEMO_MAX_ROUNDS: u64 = 40;
    /// Losses the native demo tolerates before stopping
    pub const DEMO_MAX_LOSSES: u32 = 3;
}
