//! Duel state and core simulation types
//!
//! Everything the round engine owns lives here, serializable so a run can be
//! inspected or compared across replays.

use serde::{Deserialize, Serialize};

use super::timing::OPPONENT_TIERS;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// Waiting for the cue; firing now is an early loss
    Waiting,
    /// Cue is open, race between player, opponent and the window timer
    CueOpen,
    /// Player won, next round starts after a short delay
    ResolvedWin,
    /// Player lost, waiting for a fire to restart
    ResolvedLoss,
    /// Frozen; the state paused from is restored on resume
    Paused,
}

impl RoundState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundState::Waiting => "waiting",
            RoundState::CueOpen => "cue-open",
            RoundState::ResolvedWin => "win",
            RoundState::ResolvedLoss => "dead",
            RoundState::Paused => "paused",
        }
    }
}

/// How the cue is presented for a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CueKind {
    /// "FIRE!" text
    Text,
    /// Audible bell only
    Bell,
    /// A single glyph flash
    Glyph,
    /// No cue at all
    Silent,
}

impl CueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CueKind::Text => "text",
            CueKind::Bell => "bell",
            CueKind::Glyph => "glyph",
            CueKind::Silent => "none",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(CueKind::Text),
            "bell" => Some(CueKind::Bell),
            "glyph" => Some(CueKind::Glyph),
            "none" | "silent" => Some(CueKind::Silent),
            _ => None,
        }
    }
}

/// Cue policy chosen at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CueMode {
    /// Same cue every round
    Fixed(CueKind),
    /// Weighted draw each round
    #[default]
    Rotate,
}

impl CueMode {
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("rotate") {
            return Some(CueMode::Rotate);
        }
        CueKind::from_str(s).map(CueMode::Fixed)
    }
}

/// Opponent reaction profile for one round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpponentProfile {
    /// Index into the tier table
    pub tier: usize,
    /// Added to the base reaction time (negative = faster)
    pub speed_bias_ms: f64,
    /// Upper bound of the uniform random delay added on top
    pub jitter_ms: f64,
}

impl OpponentProfile {
    pub fn from_tier(tier: usize) -> Self {
        let tier = tier.min(OPPONENT_TIERS.len() - 1);
        let spec = &OPPONENT_TIERS[tier];
        Self {
            tier,
            speed_bias_ms: spec.speed_bias_ms,
            jitter_ms: spec.jitter_ms,
        }
    }

    pub fn name(&self) -> &'static str {
        OPPONENT_TIERS[self.tier.min(OPPONENT_TIERS.len() - 1)].name
    }
}

impl Default for OpponentProfile {
    fn default() -> Self {
        Self::from_tier(0)
    }
}

/// Per-round timing, fixed once computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundTiming {
    /// Delay from round start until the cue opens
    pub wait_delay_ms: f64,
    /// Set when the cue opens
    pub reaction_window_ms: Option<f64>,
    /// Set when the cue opens
    pub enemy_reaction_ms: Option<f64>,
}

/// Why a round was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossCause {
    /// Fired before the cue
    Early,
    /// Opponent fired first
    Late,
    /// Reaction window expired with nobody firing
    Timeout,
}

/// Result of a resolved round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss(LossCause),
}

impl Outcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win)
    }
}

/// Per-round flags, reset by every new round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerFlags {
    pub player_shot: bool,
    pub enemy_shot: bool,
    pub early: bool,
    pub late: bool,
    pub timeout_loss: bool,
}

impl PlayerFlags {
    /// Classify the round. A win needs a clean player shot; anything else loses.
    pub fn outcome(&self) -> Outcome {
        let clean = !(self.early || self.late || self.timeout_loss || self.enemy_shot);
        if self.player_shot && clean {
            Outcome::Win
        } else if self.early {
            Outcome::Loss(LossCause::Early)
        } else if self.enemy_shot || self.late {
            Outcome::Loss(LossCause::Late)
        } else {
            Outcome::Loss(LossCause::Timeout)
        }
    }
}

/// Streak, score and the persisted best
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    /// Consecutive wins, drives difficulty
    pub streak: u32,
    /// Score of the current run
    pub score: u32,
    /// Best score ever seen (monotonic)
    pub best: u32,
}

impl ScoreState {
    pub fn with_best(best: u32) -> Self {
        Self {
            best,
            ..Default::default()
        }
    }

    pub fn record_win(&mut self) {
        self.streak += 1;
        self.score += 1;
    }

    /// Fold the run score into `best`. Returns true on a new best.
    pub fn record_loss(&mut self) -> bool {
        if self.score > self.best {
            self.best = self.score;
            true
        } else {
            false
        }
    }

    pub fn reset_run(&mut self) {
        self.streak = 0;
        self.score = 0;
    }
}

/// Notifications for the presentation layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The round state machine moved to a new state
    StateChanged(RoundState),
    /// The cue opened with the given presentation
    CueOpened(CueKind),
    /// A round ended
    RoundResolved {
        outcome: Outcome,
        streak: u32,
        score: u32,
        best: u32,
    },
    /// A loss raised the best score; persist it
    NewBest(u32),
    /// Run restarted after a loss
    Restart,
}

/// Complete duel state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelState {
    /// Current round state
    pub round: RoundState,
    /// State to restore on resume (set only while paused)
    pub paused_from: Option<RoundState>,
    /// Incremented by every new round; timers from older rounds are inert
    pub generation: u64,
    /// Cue presentation for this round
    pub cue: CueKind,
    /// Opponent for this round
    pub opponent: OpponentProfile,
    /// Timing for this round
    pub timing: RoundTiming,
    /// Flags for this round
    pub flags: PlayerFlags,
    /// Outcome once the round resolved
    pub last_outcome: Option<Outcome>,
    /// Streak/score/best
    pub score: ScoreState,
}

impl DuelState {
    pub fn new(best: u32) -> Self {
        Self {
            round: RoundState::Waiting,
            paused_from: None,
            generation: 0,
            cue: CueKind::Text,
            opponent: OpponentProfile::default(),
            timing: RoundTiming::default(),
            flags: PlayerFlags::default(),
            last_outcome: None,
            score: ScoreState::with_best(best),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.round == RoundState::Paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_shot_wins() {
        let flags = PlayerFlags {
            player_shot: true,
            ..Default::default()
        };
        assert_eq!(flags.outcome(), Outcome::Win);
        assert!(flags.outcome().is_win());
        assert!(!Outcome::Loss(LossCause::Timeout).is_win());
    }

    #[test]
    fn test_enemy_shot_beats_player_shot() {
        let flags = PlayerFlags {
            player_shot: true,
            enemy_shot: true,
            late: true,
            ..Default::default()
        };
        assert_eq!(flags.outcome(), Outcome::Loss(LossCause::Late));
    }

    #[test]
    fn test_early_takes_priority() {
        let flags = PlayerFlags {
            player_shot: true,
            early: true,
            timeout_loss: true,
            ..Default::default()
        };
        assert_eq!(flags.outcome(), Outcome::Loss(LossCause::Early));

        let timeout = PlayerFlags {
            timeout_loss: true,
            ..Default::default()
        };
        assert_eq!(timeout.outcome(), Outcome::Loss(LossCause::Timeout));
    }

    #[test]
    fn test_best_is_monotonic() {
        let mut score = ScoreState::with_best(5);
        score.record_win();
        score.record_win();
        assert!(!score.record_loss());
        assert_eq!(score.best, 5);

        score.reset_run();
        for _ in 0..7 {
            score.record_win();
        }
        assert!(score.record_loss());
        assert_eq!(score.best, 7);
        assert_eq!(score.streak, 7);
    }

    #[test]
    fn test_cue_mode_parsing() {
        assert_eq!(CueMode::from_str("ROTATE"), Some(CueMode::Rotate));
        assert_eq!(CueMode::from_str("bell"), Some(CueMode::Fixed(CueKind::Bell)));
        assert_eq!(CueMode::from_str("none"), Some(CueMode::Fixed(CueKind::Silent)));
        assert_eq!(CueMode::from_str("fog"), None);
    }

    #[test]
    fn test_profile_tier_is_clamped() {
        let profile = OpponentProfile::from_tier(99);
        assert_eq!(profile.tier, OPPONENT_TIERS.len() - 1);
        assert_eq!(profile.name(), "Legend");
    }
}
