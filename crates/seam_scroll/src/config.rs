//! Scroll coordination configuration

use seam_animation::FlingConfig;

use crate::error::{ConfigError, Result};

/// Tuning shared by the coordinator and the embedded content scroller
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrollConfig {
    /// Distance (px) a pointer must travel before a drag is recognised
    pub touch_slop: i32,
    /// Release velocities are clamped to this magnitude (px/s)
    pub max_fling_velocity: f32,
    /// Release velocities below this magnitude do not fling (px/s)
    pub min_fling_velocity: f32,
    /// Fraction of the viewport height above which repair commits to the
    /// content bottom instead of resetting the container to 0
    pub repair_fraction: f32,
    /// Margin (px) before the content bottom at which the content region
    /// counts as "at bottom"
    pub bottom_slop: i32,
    /// Space (px) kept above a child revealed by `scroll_to_child`
    pub target_margin: i32,
    /// Scale from content units to pixels
    pub content_density: f32,
    /// Momentum physics for every fling
    pub fling: FlingConfig,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            touch_slop: 8,
            max_fling_velocity: 8000.0,
            min_fling_velocity: 50.0,
            repair_fraction: 0.25,
            bottom_slop: 8,
            target_margin: 100,
            content_density: 1.0,
            fling: FlingConfig::default(),
        }
    }
}

impl ScrollConfig {
    /// Short flings, eager drag recognition
    pub fn stiff() -> Self {
        Self {
            touch_slop: 6,
            bottom_slop: 6,
            fling: FlingConfig::stiff(),
            ..Default::default()
        }
    }

    /// Long gliding flings
    pub fn gentle() -> Self {
        Self {
            max_fling_velocity: 12000.0,
            fling: FlingConfig::gentle(),
            ..Default::default()
        }
    }

    /// Builder: set touch slop (also used as the bottom margin)
    pub fn with_touch_slop(mut self, slop: i32) -> Self {
        self.touch_slop = slop;
        self.bottom_slop = slop;
        self
    }

    /// Builder: set fling physics
    pub fn with_fling(mut self, fling: FlingConfig) -> Self {
        self.fling = fling;
        self
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<()> {
        if self.touch_slop < 0 {
            return Err(ConfigError::NegativeTouchSlop(self.touch_slop));
        }
        if self.bottom_slop < 0 {
            return Err(ConfigError::NegativeBottomSlop(self.bottom_slop));
        }
        let (min, max) = (self.min_fling_velocity, self.max_fling_velocity);
        if !(min >= 0.0 && max > 0.0 && min < max) {
            return Err(ConfigError::VelocityBounds { min, max });
        }
        if !(self.repair_fraction > 0.0 && self.repair_fraction <= 1.0) {
            return Err(ConfigError::RepairFraction(self.repair_fraction));
        }
        if !(self.content_density > 0.0 && self.content_density.is_finite()) {
            return Err(ConfigError::ContentDensity(self.content_density));
        }
        if !(self.fling.friction > 0.0 && self.fling.friction.is_finite()) {
            return Err(ConfigError::Fling(format!(
                "friction must be > 0, got {}",
                self.fling.friction
            )));
        }
        if !(self.fling.stop_velocity > 0.0) {
            return Err(ConfigError::Fling(format!(
                "stop_velocity must be > 0, got {}",
                self.fling.stop_velocity
            )));
        }
        Ok(())
    }

    /// Repair threshold for a viewport of `viewport_height` px
    pub fn repair_threshold(&self, viewport_height: i32) -> i32 {
        (viewport_height as f32 * self.repair_fraction) as i32
    }
}
