//! Seam Animation System
//!
//! Frame-stepped physics for momentum scrolling.
//!
//! # Features
//!
//! - **Momentum**: Exponential-decay fling simulation stepped by the host's frame tick
//! - **Velocity Tracking**: Windowed least-squares estimate of release velocity
//! - **Frame Clock**: Deterministic virtual clock for headless playback and tests
//!
//! Every scroller owns its own [`MomentumSimulation`]; simulations are never
//! shared between regions.

pub mod clock;
pub mod momentum;
pub mod velocity;

pub use clock::FrameClock;
pub use momentum::{FlingConfig, MomentumSimulation};
pub use velocity::VelocityTracker;
