//! Configuration error types

use thiserror::Error;

/// Invalid scroll configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Touch slop must not be negative
    #[error("touch_slop must be >= 0, got {0}")]
    NegativeTouchSlop(i32),

    /// Bottom slop must not be negative
    #[error("bottom_slop must be >= 0, got {0}")]
    NegativeBottomSlop(i32),

    /// Fling velocity bounds are inverted or not positive
    #[error("fling velocity bounds invalid: min {min} must be >= 0 and below max {max}")]
    VelocityBounds { min: f32, max: f32 },

    /// Repair threshold outside (0, 1]
    #[error("repair_fraction must be in (0, 1], got {0}")]
    RepairFraction(f32),

    /// Content density must be a positive scale
    #[error("content_density must be > 0, got {0}")]
    ContentDensity(f32),

    /// Fling physics that could never stop or never start
    #[error("invalid fling physics: {0}")]
    Fling(String),
}

/// Result type for configuration checks
pub type Result<T> = std::result::Result<T, ConfigError>;
