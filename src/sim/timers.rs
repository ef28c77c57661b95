//! Logical-clock timer queue
//!
//! Time only moves when the engine advances it, so pausing is simply not
//! advancing. Timers are tagged with the round generation that scheduled them.

use serde::{Deserialize, Serialize};

/// What a timer does when it comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// Wait period over, open the cue
    CueOpen,
    /// Opponent pulls the trigger
    EnemyFire,
    /// Reaction window closes
    WindowExpiry,
    /// Win banner done, start the next round
    NextRound,
}

/// A scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub kind: TimerKind,
    pub due_ms: f64,
    pub generation: u64,
    seq: u64,
}

/// Pending timers against a logical clock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now_ms: f64,
    next_seq: u64,
    pending: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical time
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Schedule `kind` to fire `delay_ms` from now
    pub fn schedule(&mut self, kind: TimerKind, delay_ms: f64, generation: u64) {
        let delay = if delay_ms.is_finite() { delay_ms.max(0.0) } else { 0.0 };
        let timer = Timer {
            kind,
            due_ms: self.now_ms + delay,
            generation,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending.push(timer);
    }

    /// Drop every timer scheduled by `generation`
    pub fn cancel_generation(&mut self, generation: u64) {
        self.pending.retain(|t| t.generation != generation);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Time left on the earliest pending timer of `kind`
    pub fn remaining_ms(&self, kind: TimerKind) -> Option<f64> {
        self.pending
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| (t.due_ms - self.now_ms).max(0.0))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Remove and return the earliest timer due at or before `until_ms`.
    ///
    /// The clock moves to the timer's due time so anything it schedules is
    /// measured from the moment it fired, not from the end of the frame.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<Timer> {
        let (index, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)))?;
        let timer = self.pending.swap_remove(index);
        if timer.due_ms > self.now_ms {
            self.now_ms = timer.due_ms;
        }
        Some(timer)
    }

    /// Move the clock forward to `t` (never backwards)
    pub fn advance_to(&mut self, t: f64) {
        if t > self.now_ms {
            self.now_ms = t;
        }
    }
}
