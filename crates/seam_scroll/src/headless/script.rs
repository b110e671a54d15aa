//! Gesture scripts
//!
//! A script is a named list of steps replayed on a
//! [`HeadlessSurface`](super::HeadlessSurface). Coordinates are
//! container-local; every drag step advances the virtual clock by one frame.
//!
//! With the `serde` feature scripts load from JSON:
//!
//! ```json
//! {
//!   "name": "flick",
//!   "steps": [
//!     { "step": "down", "y": 300 },
//!     { "step": "drag", "to_y": 100, "steps": 4 },
//!     { "step": "release" },
//!     { "step": "settle", "max_frames": 600 }
//!   ]
//! }
//! ```

use thiserror::Error;

use super::surface::SurfaceConfig;

/// Errors from loading or checking a gesture script
#[derive(Error, Debug)]
pub enum ScriptError {
    /// Script has nothing to do
    #[error("script '{0}' has no steps")]
    Empty(String),

    /// A pointer step arrived with no pointer down
    #[error("step {index}: '{step}' needs a pointer down first")]
    NoPointer { index: usize, step: &'static str },

    /// A second pointer-down without a release in between
    #[error("step {index}: pointer is already down")]
    PointerAlreadyDown { index: usize },

    /// Drag or hold with zero moves
    #[error("step {index}: '{step}' needs at least one move")]
    ZeroSteps { index: usize, step: &'static str },

    /// Scenario name not found
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    /// Malformed script file
    #[error("invalid gesture script: {0}")]
    Parse(String),
}

/// Result type for script operations
pub type Result<T> = std::result::Result<T, ScriptError>;

/// One step of a gesture script
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "step", rename_all = "snake_case"))]
pub enum GestureStep {
    /// Primary pointer down
    Down {
        #[cfg_attr(feature = "serde", serde(default))]
        x: f32,
        y: f32,
    },
    /// Move the pointer to `to_y` over `steps` frames
    Drag { to_y: f32, steps: u32 },
    /// Keep the pointer still for `steps` frames
    Hold { steps: u32 },
    /// Lift every pointer
    Release,
    /// Cancel the gesture
    Cancel,
    /// Add a second pointer until the gesture ends
    SecondPointer {
        #[cfg_attr(feature = "serde", serde(default))]
        x: f32,
        y: f32,
    },
    /// Run animation frames
    Frames { count: u32 },
    /// Run frames until nothing animates
    Settle { max_frames: u32 },
    /// Set offsets directly
    Jump {
        container: Option<i32>,
        content: Option<i32>,
        list: Option<i32>,
    },
}

impl GestureStep {
    pub fn name(&self) -> &'static str {
        match self {
            GestureStep::Down { .. } => "down",
            GestureStep::Drag { .. } => "drag",
            GestureStep::Hold { .. } => "hold",
            GestureStep::Release => "release",
            GestureStep::Cancel => "cancel",
            GestureStep::SecondPointer { .. } => "second_pointer",
            GestureStep::Frames { .. } => "frames",
            GestureStep::Settle { .. } => "settle",
            GestureStep::Jump { .. } => "jump",
        }
    }
}

/// A replayable gesture
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GestureScript {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    /// Surface geometry, the default surface when absent
    #[cfg_attr(feature = "serde", serde(default))]
    pub surface: Option<SurfaceConfig>,
    pub steps: Vec<GestureStep>,
}

impl GestureScript {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_surface(mut self, surface: SurfaceConfig) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn step(mut self, step: GestureStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn down(self, y: f32) -> Self {
        self.step(GestureStep::Down { x: 180.0, y })
    }

    pub fn drag(self, to_y: f32, steps: u32) -> Self {
        self.step(GestureStep::Drag { to_y, steps })
    }

    pub fn hold(self, steps: u32) -> Self {
        self.step(GestureStep::Hold { steps })
    }

    pub fn release(self) -> Self {
        self.step(GestureStep::Release)
    }

    pub fn cancel(self) -> Self {
        self.step(GestureStep::Cancel)
    }

    pub fn second_pointer(self, y: f32) -> Self {
        self.step(GestureStep::SecondPointer { x: 60.0, y })
    }

    pub fn frames(self, count: u32) -> Self {
        self.step(GestureStep::Frames { count })
    }

    pub fn settle(self, max_frames: u32) -> Self {
        self.step(GestureStep::Settle { max_frames })
    }

    pub fn jump(self, container: Option<i32>, content: Option<i32>, list: Option<i32>) -> Self {
        self.step(GestureStep::Jump {
            container,
            content,
            list,
        })
    }

    pub fn surface_config(&self) -> SurfaceConfig {
        self.surface.unwrap_or_default()
    }

    /// Check that pointer steps are well ordered
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(ScriptError::Empty(self.name.clone()));
        }

        let mut down = false;
        for (index, step) in self.steps.iter().enumerate() {
            match *step {
                GestureStep::Down { .. } => {
                    if down {
                        return Err(ScriptError::PointerAlreadyDown { index });
                    }
                    down = true;
                }
                GestureStep::Drag { steps, .. } | GestureStep::Hold { steps } => {
                    if !down {
                        return Err(ScriptError::NoPointer {
                            index,
                            step: step.name(),
                        });
                    }
                    if steps == 0 {
                        return Err(ScriptError::ZeroSteps {
                            index,
                            step: step.name(),
                        });
                    }
                }
                GestureStep::Release | GestureStep::Cancel => {
                    if !down {
                        return Err(ScriptError::NoPointer {
                            index,
                            step: step.name(),
                        });
                    }
                    down = false;
                }
                GestureStep::SecondPointer { .. }
                | GestureStep::Frames { .. }
                | GestureStep::Settle { .. }
                | GestureStep::Jump { .. } => {}
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON script
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let script: GestureScript =
            serde_json::from_str(json).map_err(|e| ScriptError::Parse(e.to_string()))?;
        script.validate()?;
        Ok(script)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ScriptError::Parse(e.to_string()))
    }
}
