//! Sound effects for duel events
//!
//! The mapping from engine notifications to effects is platform independent;
//! synthesis lives in `web` and only exists on wasm32.

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

use crate::sim::{CueKind, GameEvent, LossCause, Outcome};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Bell cue - the only audible cue
    CueBell,
    /// Player won the draw
    PlayerShot,
    /// Opponent fired first
    EnemyShot,
    /// Fired before the cue
    EarlyFire,
    /// Nobody fired in time
    Timeout,
    /// Run restarted
    Restart,
    /// New best score
    NewBest,
}

impl SoundEffect {
    /// Effect for a notification, if it makes a sound
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::CueOpened(CueKind::Bell) => Some(SoundEffect::CueBell),
            GameEvent::CueOpened(_) => None,
            GameEvent::RoundResolved { outcome, .. } => Some(match outcome {
                Outcome::Win => SoundEffect::PlayerShot,
                Outcome::Loss(LossCause::Early) => SoundEffect::EarlyFire,
                Outcome::Loss(LossCause::Late) => SoundEffect::EnemyShot,
                Outcome::Loss(LossCause::Timeout) => SoundEffect::Timeout,
            }),
            GameEvent::NewBest(_) => Some(SoundEffect::NewBest),
            GameEvent::Restart => Some(SoundEffect::Restart),
            GameEvent::StateChanged(_) => None,
        }
    }
}

/// Applies the `sound` setting to a batch of events
#[derive(Debug, Clone, Copy)]
pub struct AudioGate {
    enabled: bool,
}

impl AudioGate {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Effects to play for `events`, in order
    pub fn effects(&self, events: &[GameEvent]) -> Vec<SoundEffect> {
        if !self.enabled {
            return Vec::new();
        }
        events.iter().filter_map(SoundEffect::for_event).collect()
    }
}
