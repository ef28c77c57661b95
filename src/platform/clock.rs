//! Frame timestamps to clamped deltas

/// Largest delta fed to the engine in one frame (tab switches, debugger stops)
pub const MAX_FRAME_DELTA_MS: f64 = 100.0;

/// Turns `requestAnimationFrame` timestamps into frame deltas
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta since the previous frame, clamped to `[0, MAX_FRAME_DELTA_MS]`.
    /// The first frame yields 0.
    pub fn delta(&mut self, now_ms: f64) -> f64 {
        if !now_ms.is_finite() {
            return 0.0;
        }
        let dt = match self.last_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_DELTA_MS),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt
    }

    /// Forget the last timestamp, e.g. after the loop was suspended
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
