//! Per-gesture state
//!
//! A fresh session is built at every pointer-down and replaced at the next
//! one, so no flag outlives the gesture (and the flings it launched) that set
//! it.

use seam_animation::VelocityTracker;
use seam_core::{DragDetector, FlyingType, GestureEvent, GestureState, StateMachine, TouchEvent};

/// Fling bookkeeping for the coordinator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlingSession {
    /// Which boundary the coordinator's fling is crossing
    pub flying: FlyingType,
    /// Remaining momentum was passed on to a peer
    pub handed_off: bool,
    /// The list reported a downward self-fling
    pub list_flinging_down: bool,
}

impl FlingSession {
    /// Set the handoff direction for a new fling
    pub fn start(&mut self, flying: FlyingType) {
        self.flying = flying;
        self.handed_off = false;
    }

    /// Claim the handoff. Returns false if it already happened.
    pub fn claim_handoff(&mut self) -> bool {
        !std::mem::replace(&mut self.handed_off, true)
    }

    pub fn finish(&mut self) {
        self.flying = FlyingType::None;
    }
}

/// Coordinator gesture session
#[derive(Debug, Clone)]
pub struct GestureSession {
    pub(crate) state: StateMachine<GestureState>,
    pub(crate) fling: FlingSession,
    tracker: Option<VelocityTracker>,
    /// Slop detector for interception
    pub(crate) intercept: DragDetector,
    /// Last pointer Y seen by the coordinator's own touch handler
    pub(crate) last_touch_y: Option<i32>,
    pub(crate) disallow_intercept: bool,
}

impl Default for GestureSession {
    fn default() -> Self {
        Self::idle(0)
    }
}

impl GestureSession {
    /// Session between gestures
    pub fn idle(touch_slop: i32) -> Self {
        Self {
            state: StateMachine::new(GestureState::Idle),
            fling: FlingSession::default(),
            tracker: None,
            intercept: DragDetector::new(touch_slop),
            last_touch_y: None,
            disallow_intercept: false,
        }
    }

    /// Session for a gesture that just went down
    pub fn begin(touch_slop: i32, previous: GestureState) -> Self {
        let mut session = Self::idle(touch_slop);
        session.state = StateMachine::new(previous);
        session.state.send(GestureEvent::PointerDown);
        session.tracker = Some(VelocityTracker::new());
        session
    }

    pub fn state(&self) -> GestureState {
        self.state.current()
    }

    pub fn fling(&self) -> &FlingSession {
        &self.fling
    }

    /// Feed a move sample to the velocity tracker
    pub fn track(&mut self, event: &TouchEvent) {
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.add_movement(event);
        }
    }

    /// Take the tracker at release. The gesture keeps no velocity data
    /// afterwards.
    pub fn take_tracker(&mut self) -> Option<VelocityTracker> {
        self.tracker.take()
    }

    pub fn send(&mut self, event: GestureEvent) -> GestureState {
        self.state.send(event)
    }
}

/// Embedded content scroller gesture session
#[derive(Debug, Clone, Default)]
pub struct ContentGesture {
    tracker: Option<VelocityTracker>,
    /// Distance from the gesture start, for native-scroll suppression
    pub(crate) drag: DragDetector,
    pub(crate) last_y: Option<i32>,
    /// The running fling was launched by this scroller's own release
    pub(crate) self_fling: bool,
    handed_off: bool,
}

impl ContentGesture {
    pub fn begin(touch_slop: i32, y: i32) -> Self {
        let mut drag = DragDetector::new(touch_slop);
        drag.begin(y);
        Self {
            tracker: Some(VelocityTracker::new()),
            drag,
            last_y: Some(y),
            self_fling: false,
            handed_off: false,
        }
    }

    /// Record a sample and return the delta from the previous pointer Y
    pub fn track(&mut self, time_ms: u64, y: i32) -> i32 {
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.add_sample(time_ms, y as f32);
        }
        let last = self.last_y.replace(y).unwrap_or(y);
        y - last
    }

    pub fn take_tracker(&mut self) -> Option<VelocityTracker> {
        self.tracker.take()
    }

    /// Claim the handoff. Returns false if it already happened.
    pub fn claim_handoff(&mut self) -> bool {
        !std::mem::replace(&mut self.handed_off, true)
    }
}
