//! Seam Core
//!
//! Foundational primitives shared by the Seam scroll coordination crates:
//!
//! - **Touch Input**: Pointer events with local and screen coordinates
//! - **Dispatch Results**: Explicit tri-state answer for every input intake
//! - **State Machines**: Gesture ownership and fling handoff states
//! - **Geometry**: Screen-space bounds for hit testing
//!
//! # Example
//!
//! ```rust
//! use seam_core::fsm::{GestureEvent, GestureState, StateTransitions};
//!
//! let state = GestureState::Idle;
//! let state = state.on_event(GestureEvent::PointerDown).unwrap_or(state);
//! assert_eq!(state, GestureState::Delegated);
//!
//! let state = state.on_event(GestureEvent::SlopExceeded).unwrap_or(state);
//! assert_eq!(state, GestureState::Intercepted);
//! ```

pub mod events;
pub mod fsm;
pub mod geometry;
pub mod input;

pub use events::EventResult;
pub use fsm::{
    FlyingType, GestureEvent, GestureState, StateMachine, StateTransitions, TransitionLog,
};
pub use geometry::{Point, Rect};
pub use input::{DragDetector, TouchEvent, TouchPhase, TouchPointer};
