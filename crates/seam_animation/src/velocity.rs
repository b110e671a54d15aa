//! Pointer velocity tracking
//!
//! Collects recent pointer samples for one gesture and estimates the release
//! velocity with a least-squares fit over a short time horizon.

use seam_core::TouchEvent;
use smallvec::SmallVec;

/// Samples older than this (relative to the newest one) are ignored
const HORIZON_MS: u64 = 100;

/// Upper bound on retained samples
const MAX_SAMPLES: usize = 20;

#[derive(Debug, Clone, Copy)]
struct Sample {
    time_ms: u64,
    y: f32,
}

/// Transient per-gesture velocity accumulator
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: SmallVec<[Sample; MAX_SAMPLES]>,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the primary pointer's local Y
    pub fn add_movement(&mut self, event: &TouchEvent) {
        if let Some(pointer) = event.primary() {
            self.add_sample(event.time_ms, pointer.y);
        }
    }

    /// Record a raw sample
    pub fn add_sample(&mut self, time_ms: u64, y: f32) {
        // Time going backwards means a new stream; start over
        if let Some(last) = self.samples.last() {
            if time_ms < last.time_ms {
                self.samples.clear();
            }
        }
        if self.samples.len() == MAX_SAMPLES {
            self.samples.remove(0);
        }
        self.samples.push(Sample { time_ms, y });
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Vertical velocity in px/s, clamped to `±max_velocity`.
    ///
    /// Positive means the pointer moves down the screen.
    pub fn compute_velocity(&self, max_velocity: f32) -> f32 {
        let Some(newest) = self.samples.last() else {
            return 0.0;
        };
        let window: SmallVec<[Sample; MAX_SAMPLES]> = self
            .samples
            .iter()
            .copied()
            .filter(|s| newest.time_ms - s.time_ms <= HORIZON_MS)
            .collect();
        if window.len() < 2 {
            return 0.0;
        }

        let n = window.len() as f32;
        let origin = window[0].time_ms;
        let t = |s: &Sample| (s.time_ms - origin) as f32 / 1000.0;
        let mean_t = window.iter().map(t).sum::<f32>() / n;
        let mean_y = window.iter().map(|s| s.y).sum::<f32>() / n;

        let mut num = 0.0;
        let mut den = 0.0;
        for sample in &window {
            let dt = t(sample) - mean_t;
            num += dt * (sample.y - mean_y);
            den += dt * dt;
        }
        if den <= f32::EPSILON {
            return 0.0;
        }

        let velocity = num / den;
        let max = max_velocity.abs();
        velocity.clamp(-max, max)
    }
}
