//! Text HUD derived from the engine
//!
//! The browser front end copies these strings into the DOM each frame; keeping
//! the wording here lets it be tested natively.

use crate::sim::{CueKind, DuelState, LossCause, Outcome, RandomSource, RoundEngine, RoundState};

/// Everything the page shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudView {
    /// Main banner
    pub status: String,
    /// Cue text; empty unless the cue is open and visible
    pub cue: String,
    /// Who you are facing
    pub opponent: String,
    /// Streak / score / best
    pub score_line: String,
    pub paused: bool,
}

impl HudView {
    pub fn from_engine<R: RandomSource>(engine: &RoundEngine<R>) -> Self {
        Self::from_state(engine.state())
    }

    pub fn from_state(state: &DuelState) -> Self {
        let score = state.score;
        let status = match state.round {
            // The banner must not give away a cue that is silent or audio-only
            RoundState::Waiting | RoundState::CueOpen => "Steady...".to_string(),
            RoundState::ResolvedWin => format!("You win! Streak {}", score.streak),
            RoundState::ResolvedLoss => loss_banner(state.last_outcome).to_string(),
            RoundState::Paused => "Paused - tap Resume or press Esc".to_string(),
        };

        let cue = match (state.round, state.cue) {
            (RoundState::CueOpen, CueKind::Text) => "FIRE!",
            (RoundState::CueOpen, CueKind::Glyph) => "!",
            _ => "",
        };

        Self {
            status,
            cue: cue.to_string(),
            opponent: state.opponent.name().to_string(),
            score_line: format!(
                "Streak {}  Score {}  Best {}",
                score.streak, score.score, score.best
            ),
            paused: state.is_paused(),
        }
    }
}

fn loss_banner(outcome: Option<Outcome>) -> &'static str {
    match outcome {
        Some(Outcome::Loss(LossCause::Early)) => "Too early! Fire to restart",
        Some(Outcome::Loss(LossCause::Late)) => "Too slow! Fire to restart",
        _ => "Froze up! Fire to restart",
    }
}
