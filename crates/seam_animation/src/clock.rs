//! Virtual frame clock for deterministic playback.
//!
//! Real hosts call `on_frame(dt)` from their display refresh callback. Headless
//! playback and tests use a [`FrameClock`] instead so that every run produces
//! the same sequence of timestamps and frame deltas.

/// A fixed-rate virtual clock.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Current virtual time in milliseconds.
    now_ms: u64,
    /// Frames per second.
    fps: u32,
    /// Number of frames ticked so far.
    frame: u64,
}

impl FrameClock {
    /// Create a clock at time zero.
    pub fn new(fps: u32) -> Self {
        Self {
            now_ms: 0,
            fps: fps.clamp(1, 240),
            frame: 0,
        }
    }

    /// Get the current virtual time.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Frame interval in seconds.
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.fps as f32
    }

    /// Frame interval rounded to whole milliseconds.
    pub fn frame_interval_ms(&self) -> u64 {
        (1000 / self.fps as u64).max(1)
    }

    /// Advance by one frame and return its delta in seconds.
    pub fn tick(&mut self) -> f32 {
        self.now_ms += self.frame_interval_ms();
        self.frame += 1;
        self.frame_dt()
    }

    /// Advance time without producing a frame (e.g. between input events).
    pub fn advance_ms(&mut self, ms: u64) {
        self.now_ms += ms;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60)
    }
}
