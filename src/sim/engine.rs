//! Round engine: the WAIT → CUE → resolve state machine
//!
//! The engine owns the duel state, a logical-clock scheduler and an injected
//! random source. External inputs are `fire`, `toggle_pause` and `advance`;
//! everything the presentation layers need comes out as `GameEvent`s.

use super::rng::RandomSource;
use super::state::{CueMode, DuelState, GameEvent, Outcome, RoundState, RoundTiming};
use super::timers::{Scheduler, Timer, TimerKind};
use super::timing;

/// Delay between a win and the next round's wait (cosmetic)
pub const WIN_TRANSITION_MS: f64 = 620.0;

/// The duel state machine
#[derive(Debug, Clone)]
pub struct RoundEngine<R: RandomSource> {
    state: DuelState,
    cue_mode: CueMode,
    timers: Scheduler,
    rng: R,
    events: Vec<GameEvent>,
}

impl<R: RandomSource> RoundEngine<R> {
    /// Create an engine and start the first round
    pub fn new(cue_mode: CueMode, best: u32, rng: R) -> Self {
        let mut engine = Self {
            state: DuelState::new(best),
            cue_mode,
            timers: Scheduler::new(),
            rng,
            events: Vec::new(),
        };
        engine.begin_round();
        engine
    }

    pub fn state(&self) -> &DuelState {
        &self.state
    }

    pub fn round(&self) -> RoundState {
        self.state.round
    }

    /// Logical time in ms (frozen while paused)
    pub fn now_ms(&self) -> f64 {
        self.timers.now_ms()
    }

    pub fn timers(&self) -> &Scheduler {
        &self.timers
    }

    /// Notifications raised since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start a fresh round in `Waiting`, abandoning whatever was in flight.
    pub fn begin_round(&mut self) {
        self.timers.cancel_generation(self.state.generation);
        self.state.generation += 1;
        self.state.paused_from = None;
        self.state.flags = Default::default();
        self.state.last_outcome = None;

        // Draw order is fixed: opponent, cue, wait
        let streak = self.state.score.streak;
        self.state.opponent = timing::pick_opponent(streak, &mut self.rng);
        self.state.cue = timing::select_cue(self.cue_mode, &mut self.rng);
        let wait = timing::wait_delay_ms(streak, self.rng.next_f64());
        self.state.timing = RoundTiming {
            wait_delay_ms: wait,
            ..Default::default()
        };

        // Always announced, even for the first round where the state already reads Waiting
        self.state.round = RoundState::Waiting;
        self.events.push(GameEvent::StateChanged(RoundState::Waiting));
        self.timers
            .schedule(TimerKind::CueOpen, wait, self.state.generation);

        log::debug!(
            "Round {} begins: streak={} opponent={} cue={} wait={:.0}ms",
            self.state.generation,
            streak,
            self.state.opponent.name(),
            self.state.cue.as_str(),
            wait
        );
    }

    /// The player's trigger. Total over every state.
    pub fn fire(&mut self) {
        match self.state.round {
            RoundState::Waiting => {
                let flags = &mut self.state.flags;
                flags.player_shot = true;
                flags.early = true;
                self.resolve();
            }
            RoundState::CueOpen => {
                let flags = &mut self.state.flags;
                if flags.player_shot {
                    return;
                }
                flags.player_shot = true;
                if flags.enemy_shot {
                    flags.late = true;
                }
                self.resolve();
            }
            RoundState::ResolvedLoss => self.restart(),
            RoundState::ResolvedWin | RoundState::Paused => {}
        }
    }

    /// Flip between paused and the state paused from
    pub fn toggle_pause(&mut self) {
        match self.state.paused_from.take() {
            Some(previous) => {
                self.set_round(previous);
                log::debug!("Resumed into {}", previous.as_str());
            }
            None => {
                self.state.paused_from = Some(self.state.round);
                self.set_round(RoundState::Paused);
                log::debug!("Paused at {:.0}ms", self.now_ms());
            }
        }
    }

    /// Pause unless already paused
    pub fn pause(&mut self) {
        if !self.state.is_paused() {
            self.toggle_pause();
        }
    }

    /// Resume if paused
    pub fn resume(&mut self) {
        if self.state.is_paused() {
            self.toggle_pause();
        }
    }

    /// Advance the logical clock, running every timer that comes due
    pub fn advance(&mut self, dt_ms: f64) {
        self.run_timers(dt_ms, false);
    }

    /// Run due timers up to `now + dt_ms`.
    ///
    /// With `defer` set, opponent and window timers only raise their flags; the
    /// caller resolves afterwards. This is how a fire that shares a step with
    /// the opponent's shot loses the tie.
    pub(super) fn run_timers(&mut self, dt_ms: f64, defer: bool) {
        if self.state.is_paused() {
            return;
        }
        let dt = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        let target = self.timers.now_ms() + dt;
        while let Some(timer) = self.timers.pop_due(target) {
            self.on_timer(timer, defer);
        }
        self.timers.advance_to(target);
    }

    fn on_timer(&mut self, timer: Timer, defer: bool) {
        if timer.generation != self.state.generation {
            log::trace!("Dropping stale {:?} from round {}", timer.kind, timer.generation);
            return;
        }
        match (timer.kind, self.state.round) {
            (TimerKind::CueOpen, RoundState::Waiting) => self.open_cue(),
            (TimerKind::EnemyFire, RoundState::CueOpen) => {
                self.state.flags.enemy_shot = true;
                if !defer {
                    self.resolve();
                }
            }
            (TimerKind::WindowExpiry, RoundState::CueOpen) => {
                self.state.flags.timeout_loss = true;
                if !defer {
                    self.resolve();
                }
            }
            (TimerKind::NextRound, RoundState::ResolvedWin) => self.begin_round(),
            (kind, round) => {
                log::trace!("Ignoring {:?} in {}", kind, round.as_str());
            }
        }
    }

    fn open_cue(&mut self) {
        let streak = self.state.score.streak;
        let window = timing::reaction_window_ms(streak);
        let enemy = timing::enemy_reaction_ms(streak, &self.state.opponent, self.rng.next_f64());
        self.state.timing.reaction_window_ms = Some(window);
        self.state.timing.enemy_reaction_ms = Some(enemy);

        self.set_round(RoundState::CueOpen);
        self.events.push(GameEvent::CueOpened(self.state.cue));

        // Opponent first so an exact tie with the window counts as a shot
        let generation = self.state.generation;
        self.timers.schedule(TimerKind::EnemyFire, enemy, generation);
        self.timers.schedule(TimerKind::WindowExpiry, window, generation);

        log::debug!(
            "Cue open ({}): window={:.0}ms enemy={:.0}ms",
            self.state.cue.as_str(),
            window,
            enemy
        );
    }

    /// Classify the round from its flags and settle the score
    fn resolve(&mut self) {
        let outcome = self.state.flags.outcome();
        self.timers.cancel_generation(self.state.generation);
        self.state.last_outcome = Some(outcome);

        let mut new_best = false;
        match outcome {
            Outcome::Win => {
                self.state.score.record_win();
                self.set_round(RoundState::ResolvedWin);
                self.timers.schedule(
                    TimerKind::NextRound,
                    WIN_TRANSITION_MS,
                    self.state.generation,
                );
            }
            Outcome::Loss(_) => {
                new_best = self.state.score.record_loss();
                self.set_round(RoundState::ResolvedLoss);
            }
        }

        let score = self.state.score;
        self.events.push(GameEvent::RoundResolved {
            outcome,
            streak: score.streak,
            score: score.score,
            best: score.best,
        });
        if new_best {
            self.events.push(GameEvent::NewBest(score.best));
            log::info!("New best score: {}", score.best);
        }

        log::debug!(
            "Round {} resolved: {:?} (streak={} score={} best={})",
            self.state.generation,
            outcome,
            score.streak,
            score.score,
            score.best
        );
    }

    fn restart(&mut self) {
        self.state.score.reset_run();
        self.events.push(GameEvent::Restart);
        log::debug!("Restarting run");
        self.begin_round();
    }

    fn set_round(&mut self, round: RoundState) {
        if self.state.round != round {
            self.state.round = round;
            self.events.push(GameEvent::StateChanged(round));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::{SeededRng, SequenceRng};
    use crate::sim::state::{CueKind, LossCause};

    /// Rolls: tier (no bump), wait = min, enemy jitter = 0
    fn scripted(best: u32) -> RoundEngine<SequenceRng> {
        RoundEngine::new(
            CueMode::Fixed(CueKind::Text),
            best,
            SequenceRng::new(vec![0.9, 0.0, 0.0]),
        )
    }

    fn open_cue(engine: &mut RoundEngine<SequenceRng>) {
        let wait = engine.state().timing.wait_delay_ms;
        engine.advance(wait);
        assert_eq!(engine.round(), RoundState::CueOpen);
    }

    #[test]
    fn test_first_round_waits() {
        let engine = scripted(0);
        assert_eq!(engine.round(), RoundState::Waiting);
        assert_eq!(engine.state().generation, 1);
        assert_eq!(engine.state().timing.wait_delay_ms, 820.0);
        assert_eq!(engine.timers().remaining_ms(TimerKind::CueOpen), Some(820.0));
    }

    #[test]
    fn test_every_round_start_is_announced() {
        let mut engine = scripted(0);
        assert_eq!(
            engine.drain_events(),
            vec![GameEvent::StateChanged(RoundState::Waiting)]
        );

        open_cue(&mut engine);
        engine.fire();
        engine.drain_events();
        engine.advance(WIN_TRANSITION_MS);
        assert_eq!(
            engine.drain_events(),
            vec![GameEvent::StateChanged(RoundState::Waiting)]
        );
    }

    #[test]
    fn test_cue_opens_after_wait() {
        let mut engine = scripted(0);
        engine.advance(819.0);
        assert_eq!(engine.round(), RoundState::Waiting);
        engine.advance(1.0);
        assert_eq!(engine.round(), RoundState::CueOpen);
        assert!(engine.events().contains(&GameEvent::CueOpened(CueKind::Text)));
        assert_eq!(engine.state().timing.reaction_window_ms, Some(220.0));
        // Drifter at streak 0: 170 + 40
        assert_eq!(engine.state().timing.enemy_reaction_ms, Some(210.0));
    }

    #[test]
    fn test_fire_while_waiting_is_early_loss() {
        let mut engine = scripted(0);
        engine.advance(300.0);
        engine.fire();
        assert_eq!(engine.round(), RoundState::ResolvedLoss);
        assert!(engine.state().flags.early);
        assert_eq!(engine.state().last_outcome, Some(Outcome::Loss(LossCause::Early)));

        // The cancelled wait timer never opens a cue
        engine.advance(5_000.0);
        assert_eq!(engine.round(), RoundState::ResolvedLoss);
    }

    #[test]
    fn test_fire_after_cue_wins() {
        let mut engine = scripted(0);
        open_cue(&mut engine);
        engine.advance(1.0);
        engine.fire();
        assert_eq!(engine.round(), RoundState::ResolvedWin);
        assert_eq!(engine.state().score.streak, 1);
        assert_eq!(engine.state().score.score, 1);
        assert!(engine.events().contains(&GameEvent::RoundResolved {
            outcome: Outcome::Win,
            streak: 1,
            score: 1,
            best: 0,
        }));

        // Stale opponent/window timers stay inert
        engine.advance(300.0);
        assert_eq!(engine.round(), RoundState::ResolvedWin);
        assert_eq!(engine.state().score.streak, 1);
    }

    #[test]
    fn test_win_rolls_into_next_round() {
        let mut engine = scripted(0);
        open_cue(&mut engine);
        engine.fire();
        engine.fire(); // ignored while ResolvedWin
        engine.advance(WIN_TRANSITION_MS - 1.0);
        assert_eq!(engine.round(), RoundState::ResolvedWin);
        engine.advance(1.0);
        assert_eq!(engine.round(), RoundState::Waiting);
        assert_eq!(engine.state().generation, 2);
        assert_eq!(engine.state().score.streak, 1);
        assert_eq!(engine.state().flags, Default::default());
    }

    #[test]
    fn test_window_expiry_is_timeout_loss() {
        // Jitter roll 0.9 puts the Drifter at 210 + 63ms, past the 220ms window
        let mut engine = RoundEngine::new(
            CueMode::Fixed(CueKind::Glyph),
            0,
            SequenceRng::new(vec![0.9, 0.0, 0.9]),
        );
        engine.advance(820.0);
        let enemy = engine.state().timing.enemy_reaction_ms.unwrap_or_default();
        assert!(enemy > 270.0);

        engine.advance(219.0);
        assert_eq!(engine.round(), RoundState::CueOpen);
        engine.advance(1.0);
        assert_eq!(engine.round(), RoundState::ResolvedLoss);
        assert!(engine.state().flags.timeout_loss);
        assert!(!engine.state().flags.player_shot);
        assert_eq!(engine.state().last_outcome, Some(Outcome::Loss(LossCause::Timeout)));
    }

    #[test]
    fn test_enemy_first_is_late_loss() {
        let mut engine = scripted(0);
        open_cue(&mut engine);
        engine.advance(210.0);
        assert_eq!(engine.round(), RoundState::ResolvedLoss);
        assert!(engine.state().flags.enemy_shot);
        assert_eq!(engine.state().last_outcome, Some(Outcome::Loss(LossCause::Late)));
    }

    #[test]
    fn test_loss_updates_best_and_restart_resets() {
        let mut engine = scripted(1);
        for _ in 0..2 {
            open_cue(&mut engine);
            engine.fire();
            engine.advance(WIN_TRANSITION_MS);
        }
        assert_eq!(engine.state().score.score, 2);
        engine.drain_events();

        engine.fire(); // early
        assert_eq!(engine.state().score.best, 2);
        let events = engine.drain_events();
        assert!(events.contains(&GameEvent::NewBest(2)));

        engine.fire(); // restart
        assert_eq!(engine.round(), RoundState::Waiting);
        assert_eq!(engine.state().score.streak, 0);
        assert_eq!(engine.state().score.score, 0);
        assert_eq!(engine.state().score.best, 2);
        let events = engine.drain_events();
        assert_eq!(events.first(), Some(&GameEvent::Restart));
        assert!(events.contains(&GameEvent::StateChanged(RoundState::Waiting)));

        // Losing with a lower score keeps the best
        engine.fire();
        assert_eq!(engine.state().score.best, 2);
        assert!(!engine.events().iter().any(|e| matches!(e, GameEvent::NewBest(_))));
    }

    #[test]
    fn test_pause_freezes_timers() {
        let mut engine = scripted(0);
        engine.advance(500.0);
        engine.toggle_pause();
        assert_eq!(engine.round(), RoundState::Paused);

        engine.advance(10_000.0);
        engine.fire();
        assert_eq!(engine.round(), RoundState::Paused);
        assert_eq!(engine.now_ms(), 500.0);
        assert_eq!(engine.timers().remaining_ms(TimerKind::CueOpen), Some(320.0));

        engine.toggle_pause();
        assert_eq!(engine.round(), RoundState::Waiting);
        engine.advance(319.0);
        assert_eq!(engine.round(), RoundState::Waiting);
        engine.advance(1.0);
        assert_eq!(engine.round(), RoundState::CueOpen);
    }

    #[test]
    fn test_pause_during_cue_keeps_race() {
        let mut engine = scripted(0);
        open_cue(&mut engine);
        engine.advance(100.0);
        engine.pause();
        engine.pause(); // idempotent
        engine.advance(1_000.0);
        engine.resume();
        assert_eq!(engine.round(), RoundState::CueOpen);
        assert_eq!(engine.timers().remaining_ms(TimerKind::EnemyFire), Some(110.0));
        engine.fire();
        assert_eq!(engine.round(), RoundState::ResolvedWin);
    }

    #[test]
    fn test_pause_from_loss_restores_loss() {
        let mut engine = scripted(0);
        engine.fire();
        engine.toggle_pause();
        engine.fire(); // ignored, not a restart
        assert_eq!(engine.state().paused_from, Some(RoundState::ResolvedLoss));
        engine.toggle_pause();
        assert_eq!(engine.round(), RoundState::ResolvedLoss);
    }

    #[test]
    fn test_seeded_runs_match() {
        let run = |seed: u64| {
            let mut engine = RoundEngine::new(CueMode::Rotate, 0, SeededRng::new(seed));
            let mut log = Vec::new();
            for frame in 0..2_000u32 {
                if frame % 37 == 0 {
                    engine.fire();
                }
                engine.advance(16.0);
                log.extend(engine.drain_events());
            }
            log
        };
        assert_eq!(run(7), run(7));
    }
}
