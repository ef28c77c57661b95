//! Difficulty curve: wait delays, reaction windows, opponent tiers and cues
//!
//! All times are milliseconds. Every function takes its random roll (or a
//! source) explicitly so the curve itself stays pure.

use super::rng::RandomSource;
use super::state::{CueKind, CueMode, OpponentProfile};

/// Reaction window at streak 0
pub const WINDOW_BASE_MS: f64 = 220.0;
/// Window shrink per streak
pub const WINDOW_STEP_MS: f64 = 10.0;
/// Window never drops below this
pub const WINDOW_FLOOR_MS: f64 = 85.0;

/// Opponent reaction at streak 0 (before bias and jitter)
pub const ENEMY_BASE_MS: f64 = 170.0;
pub const ENEMY_STEP_MS: f64 = 12.0;
pub const ENEMY_FLOOR_MS: f64 = 32.0;

pub const WAIT_MIN_BASE_MS: f64 = 820.0;
pub const WAIT_MIN_STEP_MS: f64 = 18.0;
pub const WAIT_MIN_FLOOR_MS: f64 = 320.0;
pub const WAIT_MAX_BASE_MS: f64 = 2300.0;
pub const WAIT_MAX_STEP_MS: f64 = 32.0;
/// The wait range is always at least this wide
pub const WAIT_MIN_SPREAD_MS: f64 = 250.0;

/// Wins per opponent tier
pub const STREAK_PER_TIER: u32 = 3;
/// Chance of facing the next tier up early
pub const TIER_BUMP_CHANCE: f64 = 0.25;

/// One row of the opponent table
#[derive(Debug, Clone, Copy)]
pub struct TierSpec {
    pub name: &'static str,
    pub speed_bias_ms: f64,
    pub jitter_ms: f64,
}

/// Opponents, easiest first
pub const OPPONENT_TIERS: [TierSpec; 6] = [
    TierSpec { name: "Drifter", speed_bias_ms: 40.0, jitter_ms: 70.0 },
    TierSpec { name: "Deputy", speed_bias_ms: 20.0, jitter_ms: 55.0 },
    TierSpec { name: "Marshal", speed_bias_ms: 0.0, jitter_ms: 45.0 },
    TierSpec { name: "Gunslinger", speed_bias_ms: -15.0, jitter_ms: 35.0 },
    TierSpec { name: "Outlaw", speed_bias_ms: -30.0, jitter_ms: 25.0 },
    TierSpec { name: "Legend", speed_bias_ms: -45.0, jitter_ms: 18.0 },
];

/// Cumulative thresholds for the rotating cue draw
const CUE_THRESHOLDS: [(f64, CueKind); 3] = [
    (0.48, CueKind::Text),
    (0.78, CueKind::Glyph),
    (0.94, CueKind::Bell),
];

#[inline]
fn streak_ms(streak: u32, step: f64) -> f64 {
    streak as f64 * step
}

/// Time the player has to answer the cue
pub fn reaction_window_ms(streak: u32) -> f64 {
    (WINDOW_BASE_MS - streak_ms(streak, WINDOW_STEP_MS)).max(WINDOW_FLOOR_MS)
}

/// Opponent reaction before jitter
pub fn enemy_base_reaction_ms(streak: u32, profile: &OpponentProfile) -> f64 {
    (ENEMY_BASE_MS - streak_ms(streak, ENEMY_STEP_MS) + profile.speed_bias_ms).max(ENEMY_FLOOR_MS)
}

/// Opponent reaction with jitter applied (`roll` in [0, 1))
pub fn enemy_reaction_ms(streak: u32, profile: &OpponentProfile, roll: f64) -> f64 {
    enemy_base_reaction_ms(streak, profile) + roll * profile.jitter_ms.max(0.0)
}

/// Range the pre-cue wait is drawn from
pub fn wait_delay_bounds(streak: u32) -> (f64, f64) {
    let min = (WAIT_MIN_BASE_MS - streak_ms(streak, WAIT_MIN_STEP_MS)).max(WAIT_MIN_FLOOR_MS);
    let max = (WAIT_MAX_BASE_MS - streak_ms(streak, WAIT_MAX_STEP_MS)).max(min + WAIT_MIN_SPREAD_MS);
    (min, max)
}

/// Pre-cue wait (`roll` in [0, 1))
pub fn wait_delay_ms(streak: u32, roll: f64) -> f64 {
    let (min, max) = wait_delay_bounds(streak);
    min + roll * (max - min)
}

/// Tier index for a streak, bumped one tier when `roll` lands under the bump chance
pub fn opponent_tier(streak: u32, roll: f64) -> usize {
    let last = OPPONENT_TIERS.len() - 1;
    let idx = ((streak / STREAK_PER_TIER) as usize).min(last);
    if roll < TIER_BUMP_CHANCE && idx < last {
        idx + 1
    } else {
        idx
    }
}

/// Draw this round's opponent. Always consumes exactly one roll.
pub fn pick_opponent<R: RandomSource + ?Sized>(streak: u32, rng: &mut R) -> OpponentProfile {
    OpponentProfile::from_tier(opponent_tier(streak, rng.next_f64()))
}

/// Map a roll onto the weighted cue table
pub fn cue_for_roll(roll: f64) -> CueKind {
    CUE_THRESHOLDS
        .iter()
        .find(|(threshold, _)| roll < *threshold)
        .map(|(_, kind)| *kind)
        .unwrap_or(CueKind::Silent)
}

/// Choose the cue for a round. Only rotate mode consumes a roll.
pub fn select_cue<R: RandomSource + ?Sized>(mode: CueMode, rng: &mut R) -> CueKind {
    match mode {
        CueMode::Fixed(kind) => kind,
        CueMode::Rotate => cue_for_roll(rng.next_f64()),
    }
}
