//! Event dispatch results
//!
//! Every input intake operation reports back to the host how dispatch should
//! continue, instead of falling through to an implicit default.

/// Outcome of handing a touch event to a scroll component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventResult {
    /// The component consumed the event. The host must not run its own
    /// default handling for it.
    Handled,
    /// The component observed the event and the host should continue its
    /// default dispatch (deliver to descendants, native scrolling, ...).
    #[default]
    Delegate,
    /// The component took no part in the event; dispatch it as if the
    /// component were not there.
    Ignore,
}

impl EventResult {
    /// Whether the component consumed the event
    pub fn is_handled(&self) -> bool {
        matches!(self, EventResult::Handled)
    }

    /// Whether the host should continue default dispatch
    pub fn continues_dispatch(&self) -> bool {
        !self.is_handled()
    }

    /// Build from a "consumed" flag
    pub fn from_handled(handled: bool) -> Self {
        if handled {
            EventResult::Handled
        } else {
            EventResult::Delegate
        }
    }
}
