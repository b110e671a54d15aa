//! Headless playback
//!
//! Runs the coordinator and its peers without a UI toolkit:
//!
//! - [`HeadlessList`]: an in-memory list peer speaking the nested-scroll
//!   protocol like a platform list view
//! - [`StaticContent`]: a content source with a settable height
//! - [`HeadlessSurface`]: wires the three together and routes touches in the
//!   order a toolkit would (observe, intercept, hit-test, own touch)
//! - [`GestureScript`]: a replayable sequence of gesture steps, loadable
//!   from JSON with the `serde` feature
//!
//! Time comes from a virtual [`FrameClock`](seam_animation::FrameClock), so
//! every run of a script produces the same trace.

mod list;
pub mod scenarios;
mod script;
mod surface;

use std::cell::Cell;
use std::rc::Rc;

use crate::peer::ContentSource;

pub use list::HeadlessList;
pub use script::{GestureScript, GestureStep, ScriptError};
pub use surface::{bind_surface, FrameSample, HeadlessSurface, SurfaceConfig, Touched};

/// Content source with a fixed, settable height
#[derive(Debug, Clone, Default)]
pub struct StaticContent {
    height: Rc<Cell<f32>>,
}

impl StaticContent {
    pub fn new(height: f32) -> Self {
        Self {
            height: Rc::new(Cell::new(height)),
        }
    }

    /// Change the height (picked up at the next pointer-down)
    pub fn set_height(&self, height: f32) {
        self.height.set(height);
    }

    pub fn height(&self) -> f32 {
        self.height.get()
    }
}

impl ContentSource for StaticContent {
    fn content_height(&self) -> f32 {
        self.height.get()
    }
}
