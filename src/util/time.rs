//! Time utilities for the frame clock

use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Frame rate configuration
pub const DEFAULT_TICK_RATE: u32 = 60; // 60 frames per second
/// Highest frame rate the interval timer can express
pub const MAX_TICK_RATE: u32 = 1000;
pub const DEFAULT_SNAPSHOT_INTERVAL: u32 = 3; // every 3rd frame, 20 per second
/// Largest delta handed to the simulation after a stall
pub const MAX_FRAME_DT: f32 = 0.1;

/// Wall-clock period of one frame
pub fn tick_duration(tick_rate: u32) -> Duration {
    Duration::from_micros(1_000_000 / tick_rate.clamp(1, MAX_TICK_RATE) as u64)
}

/// Clamp a measured frame delta into `[0, max_dt]`; garbage becomes 0.
pub fn clamp_frame_dt(raw: f32, max_dt: f32) -> f32 {
    if raw.is_finite() && raw > 0.0 {
        raw.min(max_dt)
    } else {
        0.0
    }
}

/// Measures real elapsed time between frames.
///
/// Built on `tokio::time::Instant` so paused-time tests drive it.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last: Instant::now(),
            max_dt,
        }
    }

    /// Clamped seconds since the previous call (or since creation)
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        clamp_frame_dt(raw, self.max_dt)
    }
}
