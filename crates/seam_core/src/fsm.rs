//! State Machine Runtime
//!
//! Flat state machines for scroll coordination:
//! - Gesture ownership (who is driving the current drag)
//! - Fling handoff direction (which boundary a fling is crossing)
//!
//! States are plain enums implementing [`StateTransitions`]; a
//! [`StateMachine`] wraps one with a bounded transition history.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state types that handle event transitions
///
/// # Example
///
/// ```rust
/// use seam_core::fsm::StateTransitions;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// impl StateTransitions for Door {
///     type Event = bool;
///
///     fn on_event(&self, close: bool) -> Option<Self> {
///         match (self, close) {
///             (Door::Open, true) => Some(Door::Closed),
///             (Door::Closed, false) => Some(Door::Open),
///             _ => None,
///         }
///     }
/// }
///
/// assert_eq!(Door::Open.on_event(true), Some(Door::Closed));
/// assert_eq!(Door::Open.on_event(false), None);
/// ```
pub trait StateTransitions: Clone + Copy + PartialEq + Eq + Hash + Debug + 'static {
    /// Event type driving the machine
    type Event: Clone + Copy + Debug + PartialEq + Eq;

    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: Self::Event) -> Option<Self>;
}

// =========================================================================
// Gesture Ownership
// =========================================================================

/// Who owns the drag currently in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GestureState {
    /// No pointer is down
    #[default]
    Idle,
    /// The coordinator owns the drag and scrolls itself
    Intercepted,
    /// A descendant owns the drag; the coordinator only sees nested-scroll
    /// callbacks
    Delegated,
}

/// Events that move [`GestureState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// Pointer went down; descendants get the first chance to claim it
    PointerDown,
    /// The pointer-down reached the coordinator's own handler because no
    /// descendant claimed it
    Unclaimed,
    /// The drag travelled beyond the touch slop outside any nested region
    SlopExceeded,
    PointerUp,
    Cancel,
}

impl StateTransitions for GestureState {
    type Event = GestureEvent;

    fn on_event(&self, event: GestureEvent) -> Option<Self> {
        use GestureEvent::*;
        match (self, event) {
            (_, PointerDown) => Some(GestureState::Delegated),
            (GestureState::Delegated, Unclaimed) => Some(GestureState::Intercepted),
            (GestureState::Delegated, SlopExceeded) => Some(GestureState::Intercepted),
            (GestureState::Delegated | GestureState::Intercepted, PointerUp | Cancel) => {
                Some(GestureState::Idle)
            }
            _ => None,
        }
    }
}

impl GestureState {
    /// A pointer is down
    pub fn is_active(&self) -> bool {
        !matches!(self, GestureState::Idle)
    }
}

// =========================================================================
// Fling Handoff
// =========================================================================

/// Which cross-boundary handoff the coordinator's fling is performing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlyingType {
    /// No fling in progress
    #[default]
    None,
    /// Momentum travels from the content region into the container and on
    /// into the list
    ContentToParent,
    /// Momentum travels from the container back up into the content region
    ParentToContent,
    /// The list's own fling crosses its top edge; the container tracks the
    /// decaying velocity to hand it to the content region at the seam
    ListToParent,
}

impl FlyingType {
    /// Direction of a fling released mid-transition. Positive velocity
    /// scrolls towards the list.
    pub fn for_release_velocity(velocity: f32) -> Self {
        if velocity > 0.0 {
            FlyingType::ContentToParent
        } else {
            FlyingType::ParentToContent
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, FlyingType::None)
    }
}

// =========================================================================
// Machine wrapper
// =========================================================================

/// One recorded transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRecord<S: StateTransitions> {
    pub from: S,
    pub event: S::Event,
    pub to: S,
}

/// Bounded history of state transitions (for debugging)
#[derive(Debug, Clone)]
pub struct TransitionLog<S: StateTransitions> {
    records: Vec<TransitionRecord<S>>,
    capacity: usize,
}

impl<S: StateTransitions> TransitionLog<S> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    fn push(&mut self, record: TransitionRecord<S>) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.remove(0);
        }
        self.records.push(record);
    }

    pub fn records(&self) -> &[TransitionRecord<S>] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// A state machine instance
#[derive(Debug, Clone)]
pub struct StateMachine<S: StateTransitions> {
    current: S,
    history: TransitionLog<S>,
}

impl<S: StateTransitions> StateMachine<S> {
    /// Default number of transitions kept in the history
    pub const HISTORY: usize = 32;

    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            history: TransitionLog::with_capacity(Self::HISTORY),
        }
    }

    /// Get the current state
    pub fn current(&self) -> S {
        self.current
    }

    /// Check if we're in a specific state
    pub fn is_in(&self, state: S) -> bool {
        self.current == state
    }

    /// Check if an event would trigger a transition from the current state
    pub fn can_send(&self, event: S::Event) -> bool {
        self.current.on_event(event).is_some()
    }

    /// Send an event, transitioning if the current state accepts it.
    /// Returns the (possibly unchanged) current state.
    pub fn send(&mut self, event: S::Event) -> S {
        let Some(to) = self.current.on_event(event) else {
            return self.current;
        };
        let from = self.current;
        if from != to {
            tracing::debug!("{:?} --{:?}--> {:?}", from, event, to);
        }
        self.current = to;
        self.history.push(TransitionRecord { from, event, to });
        to
    }

    /// Get transition history
    pub fn history(&self) -> &[TransitionRecord<S>] {
        self.history.records()
    }

    /// Clear transition history
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl<S: StateTransitions + Default> Default for StateMachine<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
