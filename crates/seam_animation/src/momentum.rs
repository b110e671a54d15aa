//! Fling momentum simulation
//!
//! Velocity decays exponentially (`v(t) = v0 * e^(-friction * t)`) until it
//! drops below the stop velocity. The simulation is positionally unbounded:
//! it only reports where the fling would be, clamping is the owner's job.
//!
//! The host advances it once per display refresh with the elapsed frame time,
//! so playback is deterministic for a given sequence of `dt` values.

/// Configuration for fling physics
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlingConfig {
    /// Exponential decay rate (1/s). Larger values stop sooner.
    pub friction: f32,
    /// Velocity (px/s) below which the fling is considered finished
    pub stop_velocity: f32,
}

impl Default for FlingConfig {
    fn default() -> Self {
        Self {
            friction: 4.2,
            stop_velocity: 20.0,
        }
    }
}

impl FlingConfig {
    pub fn new(friction: f32, stop_velocity: f32) -> Self {
        Self {
            friction,
            stop_velocity,
        }
    }

    /// Short, heavy flings
    pub fn stiff() -> Self {
        Self::new(7.0, 30.0)
    }

    /// Long, gliding flings
    pub fn gentle() -> Self {
        Self::new(2.6, 12.0)
    }
}

/// Per-scroller momentum state
#[derive(Debug, Clone)]
pub struct MomentumSimulation {
    config: FlingConfig,
    /// Position the fling started from
    start: i32,
    /// Signed launch velocity (px/s)
    initial_velocity: f32,
    /// Seconds since launch
    elapsed: f32,
    /// Seconds until the velocity decays below the stop velocity
    duration: f32,
    /// Current position
    position: i32,
    finished: bool,
}

impl Default for MomentumSimulation {
    fn default() -> Self {
        Self::new(FlingConfig::default())
    }
}

impl MomentumSimulation {
    pub fn new(config: FlingConfig) -> Self {
        Self {
            config,
            start: 0,
            initial_velocity: 0.0,
            elapsed: 0.0,
            duration: 0.0,
            position: 0,
            finished: true,
        }
    }

    pub fn config(&self) -> &FlingConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: FlingConfig) {
        self.config = config;
    }

    /// Launch a fling from `start` with signed `velocity` (px/s).
    ///
    /// Returns false (and stays finished) when the velocity is too small to
    /// move anything or is not a finite number.
    pub fn fling(&mut self, start: i32, velocity: f32) -> bool {
        self.start = start;
        self.position = start;
        self.elapsed = 0.0;

        let speed = velocity.abs();
        if !velocity.is_finite() || speed <= self.config.stop_velocity || self.config.friction <= 0.0
        {
            self.initial_velocity = 0.0;
            self.duration = 0.0;
            self.finished = true;
            return false;
        }

        self.initial_velocity = velocity;
        self.duration = (speed / self.config.stop_velocity).ln() / self.config.friction;
        self.finished = false;

        tracing::trace!(
            "fling start={} velocity={:.1} duration={:.3}s distance={:.1}",
            start,
            velocity,
            self.duration,
            self.total_distance()
        );
        true
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Returns true if the simulation was running before this call, i.e. the
    /// caller should apply `current_position()` this frame. The frame on which
    /// the fling completes still returns true.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.finished {
            return false;
        }

        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.finished = true;
        }
        self.position = self.position_at(self.elapsed);
        true
    }

    /// Stop immediately at the current position
    pub fn abort(&mut self) {
        if !self.finished {
            tracing::trace!("fling aborted at {}", self.position);
        }
        self.finished = true;
        self.initial_velocity = 0.0;
        self.duration = 0.0;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn start_position(&self) -> i32 {
        self.start
    }

    pub fn current_position(&self) -> i32 {
        self.position
    }

    /// Signed velocity (px/s) at the current time; zero once aborted
    pub fn current_velocity(&self) -> f32 {
        if self.initial_velocity == 0.0 {
            return 0.0;
        }
        self.initial_velocity * (-self.config.friction * self.elapsed).exp()
    }

    /// Where the fling will come to rest
    pub fn final_position(&self) -> i32 {
        self.position_at(self.duration)
    }

    fn total_distance(&self) -> f32 {
        self.offset_at(self.duration)
    }

    fn offset_at(&self, t: f32) -> f32 {
        let k = self.config.friction;
        if k <= 0.0 {
            return 0.0;
        }
        self.initial_velocity / k * (1.0 - (-k * t).exp())
    }

    fn position_at(&self, t: f32) -> i32 {
        // float -> int casts saturate, so huge flings pin to the i32 range
        (self.start as f64 + self.offset_at(t) as f64).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn run_to_end(sim: &mut MomentumSimulation) -> usize {
        let mut frames = 0;
        while sim.advance(FRAME) {
            frames += 1;
            assert!(frames < 10_000, "fling never finished");
        }
        frames
    }

    #[test]
    fn test_fling_moves_in_velocity_direction() {
        let mut sim = MomentumSimulation::default();
        assert!(sim.fling(100, 3000.0));
        assert!(!sim.is_finished());

        sim.advance(FRAME);
        assert!(sim.current_position() > 100);
        assert!(sim.current_velocity() < 3000.0);
        assert!(sim.current_velocity() > 0.0);

        let mut down = MomentumSimulation::default();
        down.fling(100, -3000.0);
        down.advance(FRAME);
        assert!(down.current_position() < 100);
        assert!(down.current_velocity() < 0.0);
    }

    #[test]
    fn test_fling_settles_at_final_position() {
        let mut sim = MomentumSimulation::default();
        sim.fling(0, 2000.0);
        let expected = sim.final_position();

        let frames = run_to_end(&mut sim);
        assert!(frames > 1);
        assert!(sim.is_finished());
        assert_eq!(sim.current_position(), expected);
        assert!(sim.current_velocity().abs() <= sim.config().stop_velocity + 0.01);
    }

    #[test]
    fn test_small_velocity_is_noop() {
        let mut sim = MomentumSimulation::default();
        assert!(!sim.fling(50, 5.0));
        assert!(sim.is_finished());
        assert!(!sim.advance(FRAME));
        assert_eq!(sim.current_position(), 50);

        assert!(!sim.fling(50, f32::NAN));
        assert!(sim.is_finished());
    }

    #[test]
    fn test_abort_stops_immediately() {
        let mut sim = MomentumSimulation::default();
        sim.fling(0, 4000.0);
        sim.advance(FRAME);
        let at = sim.current_position();

        sim.abort();
        assert!(sim.is_finished());
        assert_eq!(sim.current_velocity(), 0.0);
        assert!(!sim.advance(FRAME));
        assert_eq!(sim.current_position(), at);
    }

    #[test]
    fn test_positionally_unbounded() {
        let mut sim = MomentumSimulation::default();
        sim.fling(0, -8000.0);
        run_to_end(&mut sim);
        assert!(sim.current_position() < 0, "simulation does not clamp");
    }

    #[test]
    fn test_presets_change_distance() {
        let mut stiff = MomentumSimulation::new(FlingConfig::stiff());
        let mut gentle = MomentumSimulation::new(FlingConfig::gentle());
        stiff.fling(0, 3000.0);
        gentle.fling(0, 3000.0);
        assert!(gentle.final_position() > stiff.final_position());
    }
}
