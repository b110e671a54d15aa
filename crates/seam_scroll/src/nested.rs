//! Nested-scroll participation bookkeeping
//!
//! [`NestedScrollChildHelper`] is embedded in a descendant scroller and
//! forwards protocol calls to its ancestor while a nested scroll is active.
//! [`NestedScrollParentHelper`] records which descendants the ancestor has
//! accepted.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::peer::{NestedScrollParent, PeerRole, ScrollAxis};

/// Child side of the nested-scroll protocol
pub struct NestedScrollChildHelper {
    role: PeerRole,
    parent: RefCell<Option<Weak<dyn NestedScrollParent>>>,
    enabled: Cell<bool>,
    participating: Cell<bool>,
}

impl NestedScrollChildHelper {
    pub fn new(role: PeerRole) -> Self {
        Self {
            role,
            parent: RefCell::new(None),
            enabled: Cell::new(true),
            participating: Cell::new(false),
        }
    }

    pub fn role(&self) -> PeerRole {
        self.role
    }

    /// Bind the ancestor. Replaces any previous binding.
    pub fn attach(&self, parent: Weak<dyn NestedScrollParent>) {
        self.participating.set(false);
        *self.parent.borrow_mut() = Some(parent);
    }

    /// Drop the ancestor binding
    pub fn detach(&self) {
        self.stop_nested_scroll();
        *self.parent.borrow_mut() = None;
    }

    /// The ancestor, if bound and still alive
    pub fn parent(&self) -> Option<Rc<dyn NestedScrollParent>> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub fn set_enabled(&self, enabled: bool) {
        if !enabled {
            self.stop_nested_scroll();
        }
        self.enabled.set(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Whether a nested scroll with the ancestor is active
    pub fn has_nested_scroll_parent(&self) -> bool {
        self.participating.get()
    }

    /// Start a nested scroll along `axis`. Returns true if the ancestor takes
    /// part (or already does).
    pub fn start_nested_scroll(&self, axis: ScrollAxis) -> bool {
        if self.participating.get() {
            return true;
        }
        if !self.enabled.get() {
            return false;
        }
        let Some(parent) = self.parent() else {
            return false;
        };
        let accepted = parent.on_start_nested_scroll(self.role, axis);
        self.participating.set(accepted);
        accepted
    }

    pub fn stop_nested_scroll(&self) {
        if !self.participating.replace(false) {
            return;
        }
        if let Some(parent) = self.parent() {
            parent.on_stop_nested_scroll(self.role);
        }
    }

    /// Offer `(dx, dy)` to the ancestor. Returns what it consumed.
    pub fn dispatch_pre_scroll(&self, dx: i32, dy: i32) -> (i32, i32) {
        if !self.participating.get() || (dx == 0 && dy == 0) {
            return (0, 0);
        }
        match self.parent() {
            Some(parent) => parent.propose_scroll(self.role, dx, dy),
            None => (0, 0),
        }
    }

    /// Report a scroll step. Returns true if there was an ancestor to tell.
    pub fn dispatch_scroll(
        &self,
        dx_consumed: i32,
        dy_consumed: i32,
        dx_unconsumed: i32,
        dy_unconsumed: i32,
    ) -> bool {
        if !self.participating.get() {
            return false;
        }
        match self.parent() {
            Some(parent) => {
                parent.report_unconsumed_scroll(
                    self.role,
                    dx_consumed,
                    dy_consumed,
                    dx_unconsumed,
                    dy_unconsumed,
                );
                true
            }
            None => false,
        }
    }

    pub fn dispatch_pre_fling(&self, velocity_x: f32, velocity_y: f32) -> bool {
        if !self.participating.get() {
            return false;
        }
        self.parent()
            .map(|parent| parent.propose_fling(self.role, velocity_x, velocity_y))
            .unwrap_or(false)
    }

    pub fn dispatch_fling(&self, velocity_x: f32, velocity_y: f32, consumed: bool) -> bool {
        if !self.participating.get() {
            return false;
        }
        self.parent()
            .map(|parent| parent.report_fling(self.role, velocity_x, velocity_y, consumed))
            .unwrap_or(false)
    }

    /// Forwarded whether or not a nested scroll is active
    pub fn request_disallow_intercept(&self, disallow: bool) {
        if let Some(parent) = self.parent() {
            parent.request_disallow_intercept(disallow);
        }
    }

    /// Offset of the ancestor, if any
    pub fn parent_offset(&self) -> Option<i32> {
        self.parent().map(|parent| parent.parent_offset())
    }
}

impl std::fmt::Debug for NestedScrollChildHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NestedScrollChildHelper")
            .field("role", &self.role)
            .field("attached", &self.parent().is_some())
            .field("enabled", &self.enabled.get())
            .field("participating", &self.participating.get())
            .finish()
    }
}

/// Parent side bookkeeping
#[derive(Debug, Clone, Default)]
pub struct NestedScrollParentHelper {
    axis: Option<ScrollAxis>,
    active: SmallVec<[PeerRole; 2]>,
}

impl NestedScrollParentHelper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `source` was accepted along `axis`
    pub fn accept(&mut self, source: PeerRole, axis: ScrollAxis) {
        self.axis = Some(axis);
        if !self.active.contains(&source) {
            self.active.push(source);
        }
    }

    /// Record that `source` stopped. Returns whether it was active.
    pub fn stop(&mut self, source: PeerRole) -> bool {
        let before = self.active.len();
        self.active.retain(|role| *role != source);
        if self.active.is_empty() {
            self.axis = None;
        }
        before != self.active.len()
    }

    pub fn axis(&self) -> Option<ScrollAxis> {
        self.axis
    }

    pub fn is_active(&self, source: PeerRole) -> bool {
        self.active.contains(&source)
    }

    pub fn clear(&mut self) {
        self.axis = None;
        self.active.clear();
    }
}
