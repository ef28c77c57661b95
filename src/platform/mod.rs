//! Platform abstraction layer
//!
//! Browser/native glue that is still pure enough to test:
//! - Input debouncing (one logical fire per physical press)
//! - Frame time deltas

pub mod clock;
pub mod input;

pub use clock::{FrameClock, MAX_FRAME_DELTA_MS};
pub use input::{FireLatch, InputSource, KeyAction, key_action};
