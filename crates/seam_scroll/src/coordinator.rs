//! Scroll coordinator
//!
//! The outer container that stacks an embedded content region above a list
//! and owns the scroll offset between them. Its extent is the sum of the
//! stacked child heights minus the viewport height; the range strictly
//! between 0 and that extent is the "seam" where neither child owns the
//! visible boundary.
//!
//! The coordinator:
//!
//! - observes every touch of the gesture (`dispatch_touch`)
//! - steals drags that start on non-scrollable filler (`intercept_touch`)
//!   and scrolls itself directly (`on_touch`)
//! - arbitrates every nested-scroll callback from its peers
//! - runs its own momentum for the part of a fling that crosses the seam and
//!   hands what is left to the peer on the other side (`on_frame`)
//!
//! # Example
//!
//! ```rust
//! use seam_core::Point;
//! use seam_scroll::{LayoutPass, ScrollConfig, ScrollCoordinator};
//!
//! let coordinator = ScrollCoordinator::new(ScrollConfig::default());
//! assert_eq!(coordinator.scroll_extent(), None);
//!
//! coordinator.layout(
//!     &LayoutPass::new(Point::new(0.0, 0.0), 360.0, 400)
//!         .content(400)
//!         .list(400),
//! );
//! assert_eq!(coordinator.scroll_extent(), Some(400));
//!
//! coordinator.scroll_to(1000);
//! assert_eq!(coordinator.offset(), 400);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use seam_animation::MomentumSimulation;
use seam_core::{
    EventResult, FlyingType, GestureEvent, GestureState, Point, Rect, TouchEvent, TouchPhase,
};
use smallvec::SmallVec;

use crate::config::ScrollConfig;
use crate::nested::NestedScrollParentHelper;
use crate::peer::{ContentRegion, NestedScrollParent, PeerRole, ScrollAxis, ScrollableRegion};
use crate::session::GestureSession;

/// Offset change callback: `(old, new)`
pub type ScrollCallback = Rc<dyn Fn(i32, i32)>;

// ============================================================================
// Layout
// ============================================================================

/// One stacked child, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildSlot {
    /// Measured height in px
    pub height: i32,
    /// Peer bound to this slot, `None` for filler
    pub role: Option<PeerRole>,
}

/// A laid-out child in container content coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildFrame {
    pub role: Option<PeerRole>,
    pub top: i32,
    pub height: i32,
}

impl ChildFrame {
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }
}

/// Input to [`ScrollCoordinator::layout`]
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPass {
    /// Container origin in screen space
    pub origin: Point,
    pub width: f32,
    pub viewport_height: i32,
    pub children: SmallVec<[ChildSlot; 4]>,
}

impl LayoutPass {
    pub fn new(origin: Point, width: f32, viewport_height: i32) -> Self {
        Self {
            origin,
            width,
            viewport_height,
            children: SmallVec::new(),
        }
    }

    /// Append a child slot
    pub fn child(mut self, height: i32, role: Option<PeerRole>) -> Self {
        self.children.push(ChildSlot { height, role });
        self
    }

    /// Append the embedded content slot
    pub fn content(self, height: i32) -> Self {
        self.child(height, Some(PeerRole::Content))
    }

    /// Append the list slot
    pub fn list(self, height: i32) -> Self {
        self.child(height, Some(PeerRole::List))
    }

    /// Append non-scrollable filler (headers, separators)
    pub fn filler(self, height: i32) -> Self {
        self.child(height, None)
    }
}

#[derive(Debug, Clone)]
struct LayoutState {
    origin: Point,
    width: f32,
    viewport_height: i32,
    extent: i32,
    frames: SmallVec<[ChildFrame; 4]>,
}

// ============================================================================
// Coordinator
// ============================================================================

/// Outer container coordinating an embedded content region and a list
pub struct ScrollCoordinator {
    config: ScrollConfig,
    /// `None` until the first layout pass
    layout: RefCell<Option<LayoutState>>,
    offset: Cell<i32>,
    session: RefCell<GestureSession>,
    simulation: RefCell<MomentumSimulation>,
    needs_frame: Cell<bool>,
    content: RefCell<Option<Weak<dyn ContentRegion>>>,
    list: RefCell<Option<Weak<dyn ScrollableRegion>>>,
    nested: RefCell<NestedScrollParentHelper>,
    on_scroll: RefCell<Option<ScrollCallback>>,
}

impl ScrollCoordinator {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            layout: RefCell::new(None),
            offset: Cell::new(0),
            session: RefCell::new(GestureSession::idle(config.touch_slop)),
            simulation: RefCell::new(MomentumSimulation::new(config.fling)),
            needs_frame: Cell::new(false),
            content: RefCell::new(None),
            list: RefCell::new(None),
            nested: RefCell::new(NestedScrollParentHelper::new()),
            on_scroll: RefCell::new(None),
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Register a callback fired after every offset change
    pub fn set_on_scroll<F>(&self, callback: F)
    where
        F: Fn(i32, i32) + 'static,
    {
        *self.on_scroll.borrow_mut() = Some(Rc::new(callback));
    }

    // =========================================================================
    // Peers
    // =========================================================================

    /// Bind the embedded content region (non-owning)
    pub fn attach_content<C: ContentRegion + 'static>(&self, content: &Rc<C>) {
        *self.content.borrow_mut() = Some(Rc::downgrade(content) as Weak<dyn ContentRegion>);
        tracing::debug!("content region attached");
    }

    /// Bind the list region (non-owning)
    pub fn attach_list<L: ScrollableRegion + 'static>(&self, list: &Rc<L>) {
        *self.list.borrow_mut() = Some(Rc::downgrade(list) as Weak<dyn ScrollableRegion>);
        tracing::debug!("list region attached");
    }

    /// Drop both peer handles and any in-flight gesture or fling
    pub fn detach(&self) {
        self.simulation.borrow_mut().abort();
        self.needs_frame.set(false);
        *self.session.borrow_mut() = GestureSession::idle(self.config.touch_slop);
        self.nested.borrow_mut().clear();
        *self.content.borrow_mut() = None;
        *self.list.borrow_mut() = None;
        tracing::debug!("coordinator detached from peers");
    }

    fn content(&self) -> Option<Rc<dyn ContentRegion>> {
        self.content.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn list(&self) -> Option<Rc<dyn ScrollableRegion>> {
        self.list.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn peer_visible(&self, role: PeerRole) -> bool {
        match role {
            PeerRole::Content => self.content().map(|content| content.is_visible()),
            PeerRole::List => self.list().map(|list| list.is_visible()),
        }
        .unwrap_or(false)
    }

    fn notify_participation(&self, role: PeerRole, active: bool) {
        match (role, active) {
            (PeerRole::Content, true) => self.content().map(|c| c.begin_participation()),
            (PeerRole::Content, false) => self.content().map(|c| c.end_participation()),
            (PeerRole::List, true) => self.list().map(|l| l.begin_participation()),
            (PeerRole::List, false) => self.list().map(|l| l.end_participation()),
        };
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Stack the children top to bottom, recompute the extent and re-clamp
    /// the offset. Returns the child frames.
    pub fn layout(&self, pass: &LayoutPass) -> SmallVec<[ChildFrame; 4]> {
        let mut top = 0;
        let frames: SmallVec<[ChildFrame; 4]> = pass
            .children
            .iter()
            .map(|slot| {
                let frame = ChildFrame {
                    role: slot.role,
                    top,
                    height: slot.height.max(0),
                };
                top += frame.height;
                frame
            })
            .collect();

        let extent = top - pass.viewport_height;
        if extent <= 0 {
            tracing::debug!(
                "children ({}px) fit the viewport ({}px), nothing to scroll",
                top,
                pass.viewport_height
            );
        }
        let extent = extent.max(0);

        *self.layout.borrow_mut() = Some(LayoutState {
            origin: pass.origin,
            width: pass.width,
            viewport_height: pass.viewport_height,
            extent,
            frames: frames.clone(),
        });
        tracing::debug!(
            "layout: {} children, viewport={} extent={}",
            frames.len(),
            pass.viewport_height,
            extent
        );

        let old = self.offset.get();
        let clamped = old.clamp(0, extent);
        if clamped != old {
            self.offset.set(clamped);
            self.notify_scroll(old, clamped);
        }
        frames
    }

    /// Maximum offset, `None` before the first layout
    pub fn scroll_extent(&self) -> Option<i32> {
        self.layout.borrow().as_ref().map(|layout| layout.extent)
    }

    /// Viewport height of the last layout (0 before the first)
    pub fn viewport_height(&self) -> i32 {
        self.layout
            .borrow()
            .as_ref()
            .map(|layout| layout.viewport_height)
            .unwrap_or(0)
    }

    /// Child frames of the last layout
    pub fn child_frames(&self) -> SmallVec<[ChildFrame; 4]> {
        self.layout
            .borrow()
            .as_ref()
            .map(|layout| layout.frames.clone())
            .unwrap_or_default()
    }

    /// Screen-space bounds of a child at the current offset
    pub fn child_screen_bounds(&self, frame: &ChildFrame) -> Option<Rect> {
        let layout = self.layout.borrow();
        let layout = layout.as_ref()?;
        Some(Rect::new(
            layout.origin.x,
            layout.origin.y + (frame.top - self.offset.get()) as f32,
            layout.width,
            frame.height as f32,
        ))
    }

    // =========================================================================
    // Offset
    // =========================================================================

    pub fn offset(&self) -> i32 {
        self.offset.get()
    }

    /// Jump to `offset`, clamped to `[0, extent]`. Ignored before layout.
    pub fn scroll_to(&self, offset: i32) {
        let Some(extent) = self.scroll_extent() else {
            tracing::warn!("scroll_to({}) before first layout ignored", offset);
            return;
        };
        let clamped = offset.clamp(0, extent);
        let old = self.offset.replace(clamped);
        if old != clamped {
            tracing::trace!(
                "container offset {} -> {} (requested {}, extent {})",
                old,
                clamped,
                offset,
                extent
            );
            self.notify_scroll(old, clamped);
        }
    }

    pub fn scroll_by(&self, delta: i32) {
        self.scroll_to(self.offset.get().saturating_add(delta));
    }

    /// Neither child owns the visible boundary
    pub fn is_mid_transition(&self) -> bool {
        match self.scroll_extent() {
            Some(extent) => {
                let offset = self.offset.get();
                offset > 0 && offset < extent
            }
            None => false,
        }
    }

    /// Show the child whose top edge sits at `child_top`, with the configured
    /// margin above it. The content region is moved to its bottom first so
    /// the seam stays consistent.
    pub fn scroll_to_child(&self, child_top: i32) {
        if let Some(content) = self.content() {
            content.scroll_to_bottom();
        }
        tracing::debug!(
            "scroll to child at {} (margin {})",
            child_top,
            self.config.target_margin
        );
        self.scroll_to(child_top - self.config.target_margin);
    }

    fn notify_scroll(&self, old: i32, new: i32) {
        let callback = self.on_scroll.borrow().clone();
        if let Some(callback) = callback {
            callback(old, new);
        }
    }

    // =========================================================================
    // State queries
    // =========================================================================

    pub fn gesture_state(&self) -> GestureState {
        self.session.borrow().state()
    }

    pub fn flying_type(&self) -> FlyingType {
        self.session.borrow().fling.flying
    }

    /// The coordinator's own fling is running
    pub fn is_flinging(&self) -> bool {
        !self.simulation.borrow().is_finished()
    }

    /// Another frame is required
    pub fn needs_frame(&self) -> bool {
        self.needs_frame.get()
    }

    // =========================================================================
    // Touch intake
    // =========================================================================

    /// Observe an event before it is delivered anywhere else.
    ///
    /// Multi-touch streams are ignored entirely. A second pointer joining a
    /// gesture in progress aborts it: the session goes back to idle and the
    /// caller is expected to cancel whichever descendant held the stream.
    pub fn dispatch_touch(&self, event: &TouchEvent) -> EventResult {
        if event.is_multi_touch() {
            if self.gesture_state() != GestureState::Idle {
                self.abort_gesture(event.pointer_count());
            }
            tracing::trace!("{} pointers, passing through", event.pointer_count());
            return EventResult::Ignore;
        }

        match event.phase {
            TouchPhase::Down => {
                let previous = self.gesture_state();
                *self.session.borrow_mut() =
                    GestureSession::begin(self.config.touch_slop, previous);
                self.simulation.borrow_mut().abort();
                self.needs_frame.set(false);
                if let Some(list) = self.list() {
                    list.stop_momentum();
                }
                self.repair();
            }
            TouchPhase::Move => {
                self.session.borrow_mut().track(event);
            }
            TouchPhase::Up | TouchPhase::Cancel => {
                let tracker = {
                    let mut session = self.session.borrow_mut();
                    session.send(if event.phase == TouchPhase::Up {
                        GestureEvent::PointerUp
                    } else {
                        GestureEvent::Cancel
                    });
                    session.take_tracker()
                };
                if let (true, Some(tracker)) = (self.is_mid_transition(), tracker) {
                    // Pointer moving up the screen scrolls toward the list
                    let velocity = -tracker.compute_velocity(self.config.max_fling_velocity);
                    let flying = FlyingType::for_release_velocity(velocity);
                    tracing::debug!(
                        "released mid-transition at {} with velocity {:.1}, {:?}",
                        self.offset.get(),
                        velocity,
                        flying
                    );
                    self.start_fling(flying, velocity);
                }
            }
        }
        EventResult::Delegate
    }

    fn abort_gesture(&self, pointers: usize) {
        let mut session = self.session.borrow_mut();
        tracing::debug!(
            "{} pointers during a {:?} gesture, aborting coordination",
            pointers,
            session.state()
        );
        session.send(GestureEvent::Cancel);
        session.take_tracker();
        session.intercept.reset();
        session.last_touch_y = None;
        session.disallow_intercept = false;
    }

    /// Decide whether to steal the gesture from the descendants.
    ///
    /// Returns `Handled` once the drag exceeds the touch slop outside both
    /// nested regions, unless a descendant asked not to be intercepted.
    pub fn intercept_touch(&self, event: &TouchEvent) -> EventResult {
        if event.is_multi_touch() {
            return EventResult::Ignore;
        }

        let y = event.y();
        match event.phase {
            TouchPhase::Down => {
                let mut session = self.session.borrow_mut();
                session.intercept.begin(y);
                session.disallow_intercept = false;
            }
            TouchPhase::Move => {
                let (exceeded, disallowed) = {
                    let session = self.session.borrow();
                    (session.intercept.exceeded(y), session.disallow_intercept)
                };
                if exceeded && !disallowed {
                    let point = Point::new(
                        event.primary().map(|p| p.screen_x).unwrap_or(0.0),
                        event.primary().map(|p| p.screen_y).unwrap_or(0.0),
                    );
                    if !self.is_touch_in_nested_region(point) {
                        let mut session = self.session.borrow_mut();
                        session.intercept.rebase(y);
                        if session.state() == GestureState::Delegated {
                            tracing::debug!("drag on filler beyond slop, intercepting");
                        }
                        session.send(GestureEvent::SlopExceeded);
                    }
                }
            }
            TouchPhase::Up | TouchPhase::Cancel => {
                self.session.borrow_mut().intercept.reset();
            }
        }

        EventResult::from_handled(self.gesture_state() == GestureState::Intercepted)
    }

    /// Handle an event the coordinator owns: drag the container directly
    pub fn on_touch(&self, event: &TouchEvent) -> EventResult {
        if event.is_multi_touch() {
            return EventResult::Ignore;
        }

        let y = event.y();
        let delta = {
            let mut session = self.session.borrow_mut();
            match event.phase {
                TouchPhase::Down => {
                    session.last_touch_y = Some(y);
                    session.send(GestureEvent::Unclaimed);
                    None
                }
                TouchPhase::Move => session.last_touch_y.replace(y).map(|last| y - last),
                TouchPhase::Up | TouchPhase::Cancel => {
                    session.last_touch_y = None;
                    None
                }
            }
        };

        if let Some(dy) = delta.filter(|dy| *dy != 0) {
            self.scroll_by(-dy);
        }
        EventResult::Handled
    }

    fn is_touch_in_nested_region(&self, point: Point) -> bool {
        self.child_frames().iter().any(|frame| {
            let Some(role) = frame.role else {
                return false;
            };
            self.peer_visible(role)
                && self
                    .child_screen_bounds(frame)
                    .map(|bounds| bounds.contains(point))
                    .unwrap_or(false)
        })
    }

    // =========================================================================
    // Repair
    // =========================================================================

    fn content_can_scroll_down(&self) -> bool {
        self.content()
            .map(|content| content.can_scroll_further_down())
            .unwrap_or(false)
    }

    /// Fix a mid-transition offset while the content is not at its bottom.
    ///
    /// Past the repair threshold the content is sent to its bottom, otherwise
    /// the container returns to 0.
    pub fn repair(&self) {
        if !self.is_mid_transition() || !self.content_can_scroll_down() {
            return;
        }
        let offset = self.offset.get();
        let threshold = self.config.repair_threshold(self.viewport_height());
        if offset > threshold {
            tracing::debug!(
                "repair: offset {} > {}, sending content to its bottom",
                offset,
                threshold
            );
            if let Some(content) = self.content() {
                content.scroll_to_bottom();
            }
        } else {
            tracing::debug!("repair: offset {} <= {}, resetting to 0", offset, threshold);
            self.scroll_to(0);
        }
    }

    /// While mid-transition the list must sit at its top
    fn check_list_top(&self) {
        if !self.is_mid_transition() {
            return;
        }
        if let Some(list) = self.list() {
            if list.can_scroll_negative() {
                tracing::debug!("list scrolled away from its top mid-transition, resetting");
                list.scroll_to(0);
            }
        }
    }

    // =========================================================================
    // Momentum
    // =========================================================================

    fn start_fling(&self, flying: FlyingType, velocity: f32) {
        self.session.borrow_mut().fling.start(flying);
        let launched = velocity.abs() >= self.config.min_fling_velocity
            && self
                .simulation
                .borrow_mut()
                .fling(self.offset.get(), velocity);
        if !launched {
            tracing::trace!("fling velocity {:.1} too small, not flinging", velocity);
            self.session.borrow_mut().fling.finish();
        }
        self.needs_frame.set(launched);
    }

    fn claim_handoff(&self) -> bool {
        self.session.borrow_mut().fling.claim_handoff()
    }

    /// Advance the coordinator's fling by `dt` seconds.
    ///
    /// Returns whether another frame is required.
    pub fn on_frame(&self, dt: f32) -> bool {
        let (position, velocity) = {
            let mut simulation = self.simulation.borrow_mut();
            if !simulation.advance(dt) {
                self.needs_frame.set(false);
                return false;
            }
            (simulation.current_position(), simulation.current_velocity())
        };

        let (flying, list_flinging_down) = {
            let session = self.session.borrow();
            (session.fling.flying, session.fling.list_flinging_down)
        };

        match flying {
            FlyingType::ContentToParent => {
                if list_flinging_down {
                    tracing::debug!("list is flinging down on its own, container yields");
                    self.simulation.borrow_mut().abort();
                    self.session.borrow_mut().fling.finish();
                    self.needs_frame.set(false);
                    return false;
                }
                self.scroll_to(position);
                self.check_list_top();
                if self.scroll_extent() == Some(self.offset.get()) && self.claim_handoff() {
                    tracing::debug!("reached the list, handing off {:.1}px/s", velocity.abs());
                    if let Some(list) = self.list() {
                        list.fling(velocity.abs());
                    }
                }
            }
            FlyingType::ParentToContent => {
                self.scroll_to(position);
                if self.offset.get() == 0 && self.claim_handoff() {
                    tracing::debug!(
                        "reached the content, handing off {:.1}px/s",
                        velocity.abs()
                    );
                    if let Some(content) = self.content() {
                        content.fling(-velocity.abs());
                    }
                }
            }
            FlyingType::ListToParent => {
                // The list's own fling drives the offset through nested scroll
                if self.offset.get() == 0 && self.claim_handoff() {
                    tracing::debug!(
                        "list fling crossed the seam, handing {:.1}px/s to content",
                        velocity.abs()
                    );
                    if let Some(content) = self.content() {
                        content.fling(-velocity.abs());
                    }
                }
            }
            FlyingType::None => self.scroll_to(position),
        }

        // A peer may have started a new fling on us during the handoff
        let running = !self.simulation.borrow().is_finished();
        if !running {
            self.session.borrow_mut().fling.finish();
        }
        self.needs_frame.set(running);
        running
    }
}

impl std::fmt::Debug for ScrollCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollCoordinator")
            .field("offset", &self.offset.get())
            .field("extent", &self.scroll_extent())
            .field("state", &self.gesture_state())
            .field("flying", &self.flying_type())
            .field("content", &self.content().is_some())
            .field("list", &self.list().is_some())
            .finish()
    }
}

// ============================================================================
// Nested scroll protocol
// ============================================================================

impl NestedScrollParent for ScrollCoordinator {
    fn parent_offset(&self) -> i32 {
        self.offset.get()
    }

    fn on_start_nested_scroll(&self, source: PeerRole, axis: ScrollAxis) -> bool {
        if axis != ScrollAxis::Vertical {
            return false;
        }
        self.nested.borrow_mut().accept(source, axis);
        self.notify_participation(source, true);
        true
    }

    fn on_stop_nested_scroll(&self, source: PeerRole) {
        let was_active = self.nested.borrow_mut().stop(source);
        if was_active {
            self.notify_participation(source, false);
        }
    }

    fn propose_scroll(&self, source: PeerRole, _dx: i32, dy: i32) -> (i32, i32) {
        let content_at_bottom = !self.content_can_scroll_down();
        let mid_transition = self.is_mid_transition();
        let extent = self.scroll_extent().unwrap_or(0);

        let wanted = if dy > 0 && content_at_bottom && self.offset.get() < extent {
            dy
        } else if dy < 0 && mid_transition {
            dy
        } else {
            0
        };
        // Only what the clamped offset absorbed counts; the rest stays with
        // the descendant
        let mut consumed = 0;
        if wanted != 0 {
            let before = self.offset.get();
            self.scroll_by(wanted);
            consumed = self.offset.get() - before;
            tracing::trace!("consumed {} of {} from {:?} pre-scroll", consumed, dy, source);
        }

        if mid_transition && !content_at_bottom {
            tracing::debug!("content left its bottom mid-transition, forcing it back");
            if let Some(content) = self.content() {
                content.scroll_to_bottom();
            }
        }
        (0, consumed)
    }

    fn report_unconsumed_scroll(
        &self,
        source: PeerRole,
        _dx_consumed: i32,
        _dy_consumed: i32,
        _dx_unconsumed: i32,
        dy_unconsumed: i32,
    ) {
        if dy_unconsumed < 0 {
            self.scroll_by(dy_unconsumed);
        } else if dy_unconsumed > 0
            && source == PeerRole::Content
            && self.offset.get() < self.scroll_extent().unwrap_or(0)
        {
            self.scroll_by(dy_unconsumed);
        }
    }

    fn propose_fling(&self, source: PeerRole, _velocity_x: f32, velocity_y: f32) -> bool {
        match source {
            PeerRole::Content => {
                tracing::debug!("content offered a {:.1}px/s fling, taking over", velocity_y);
                self.start_fling(FlyingType::ContentToParent, velocity_y);
                true
            }
            PeerRole::List
                if velocity_y < 0.0
                    && self
                        .scroll_extent()
                        .map(|extent| self.offset.get() >= extent)
                        .unwrap_or(false) =>
            {
                tracing::debug!("list flinging up from the seam at {:.1}px/s", velocity_y);
                self.start_fling(FlyingType::ListToParent, velocity_y);
                false
            }
            PeerRole::List => {
                if velocity_y > 0.0 {
                    self.session.borrow_mut().fling.list_flinging_down = true;
                }
                false
            }
        }
    }

    fn report_fling(
        &self,
        _source: PeerRole,
        _velocity_x: f32,
        _velocity_y: f32,
        _consumed: bool,
    ) -> bool {
        false
    }

    fn request_disallow_intercept(&self, disallow: bool) {
        let mut session = self.session.borrow_mut();
        if session.disallow_intercept != disallow {
            tracing::trace!("disallow intercept: {}", disallow);
        }
        session.disallow_intercept = disallow;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seam_core::TouchPointer;

    const FRAME: f32 = 1.0 / 60.0;

    #[derive(Default)]
    struct MockContent {
        offset: Cell<i32>,
        max: Cell<i32>,
        to_bottom: Cell<u32>,
        flings: RefCell<Vec<f32>>,
    }

    impl ScrollableRegion for MockContent {
        fn current_offset(&self) -> i32 {
            self.offset.get()
        }
        fn scroll_to(&self, offset: i32) {
            self.offset.set(offset.clamp(0, self.max.get()));
        }
        fn content_extent(&self) -> i32 {
            self.max.get() + 400
        }
        fn can_scroll_negative(&self) -> bool {
            self.offset.get() > 0
        }
        fn stop_momentum(&self) {}
        fn fling(&self, velocity: f32) {
            self.flings.borrow_mut().push(velocity);
        }
    }

    impl ContentRegion for MockContent {
        fn can_scroll_further_down(&self) -> bool {
            self.offset.get() < self.max.get() - 8
        }
        fn scroll_to_bottom(&self) {
            self.to_bottom.set(self.to_bottom.get() + 1);
            self.offset.set(self.max.get());
        }
    }

    #[derive(Default)]
    struct MockList {
        offset: Cell<i32>,
        stops: Cell<u32>,
        flings: RefCell<Vec<f32>>,
    }

    impl ScrollableRegion for MockList {
        fn current_offset(&self) -> i32 {
            self.offset.get()
        }
        fn scroll_to(&self, offset: i32) {
            self.offset.set(offset.max(0));
        }
        fn content_extent(&self) -> i32 {
            2000
        }
        fn can_scroll_negative(&self) -> bool {
            self.offset.get() > 0
        }
        fn stop_momentum(&self) {
            self.stops.set(self.stops.get() + 1);
        }
        fn fling(&self, velocity: f32) {
            self.flings.borrow_mut().push(velocity);
        }
    }

    struct Fixture {
        coordinator: Rc<ScrollCoordinator>,
        content: Rc<MockContent>,
        list: Rc<MockList>,
    }

    /// Viewport 400, content slot 400, filler 100, list slot 400: extent 500
    fn fixture() -> Fixture {
        let coordinator = Rc::new(ScrollCoordinator::new(ScrollConfig::default()));
        coordinator.layout(
            &LayoutPass::new(Point::new(0.0, 0.0), 360.0, 400)
                .content(400)
                .filler(100)
                .list(400),
        );
        let content = Rc::new(MockContent::default());
        content.max.set(600);
        let list = Rc::new(MockList::default());
        coordinator.attach_content(&content);
        coordinator.attach_list(&list);
        Fixture {
            coordinator,
            content,
            list,
        }
    }

    fn run_frames(coordinator: &ScrollCoordinator, max: usize) -> usize {
        let mut frames = 0;
        while coordinator.on_frame(FRAME) {
            frames += 1;
            assert!(frames < max, "fling never finished");
        }
        frames
    }

    #[test]
    fn test_offset_writes_ignored_before_layout() {
        let coordinator = ScrollCoordinator::new(ScrollConfig::default());
        coordinator.scroll_to(50);
        assert_eq!(coordinator.offset(), 0);
        assert!(!coordinator.is_mid_transition());
    }

    #[test]
    fn test_offset_clamped_to_extent() {
        let f = fixture();
        assert_eq!(f.coordinator.scroll_extent(), Some(500));
        for target in [-1_000_000, -1, 0, 250, 500, 501, i32::MAX] {
            f.coordinator.scroll_to(target);
            let offset = f.coordinator.offset();
            assert!((0..=500).contains(&offset), "{target} -> {offset}");
        }
        f.coordinator.scroll_to(100);
        f.coordinator.scroll_by(i32::MAX);
        assert_eq!(f.coordinator.offset(), 500);
    }

    #[test]
    fn test_layout_reclamps_offset() {
        let f = fixture();
        f.coordinator.scroll_to(500);
        f.coordinator
            .layout(&LayoutPass::new(Point::new(0.0, 0.0), 360.0, 400).content(400).list(200));
        assert_eq!(f.coordinator.scroll_extent(), Some(200));
        assert_eq!(f.coordinator.offset(), 200);

        f.coordinator
            .layout(&LayoutPass::new(Point::new(0.0, 0.0), 360.0, 400).content(100));
        assert_eq!(f.coordinator.scroll_extent(), Some(0));
        assert_eq!(f.coordinator.offset(), 0);
    }

    #[test]
    fn test_child_frames_stack() {
        let f = fixture();
        let frames = f.coordinator.child_frames();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].top, 400);
        assert_eq!(frames[2].top, 500);
        assert_eq!(frames[2].bottom(), 900);
        assert_eq!(frames[1].role, None);
    }

    #[test]
    fn test_repair_past_quarter_sends_content_to_bottom() {
        let f = fixture();
        f.content.offset.set(200);
        f.coordinator.scroll_to(150);

        f.coordinator.repair();
        assert_eq!(f.content.to_bottom.get(), 1);
        assert_eq!(f.content.offset.get(), 600);
        assert_eq!(f.coordinator.offset(), 150);
    }

    #[test]
    fn test_repair_within_quarter_resets_container() {
        let f = fixture();
        f.content.offset.set(200);
        f.coordinator.scroll_to(100);

        f.coordinator.repair();
        assert_eq!(f.content.to_bottom.get(), 0);
        assert_eq!(f.coordinator.offset(), 0);
    }

    #[test]
    fn test_repair_noop_when_consistent() {
        let f = fixture();
        f.content.offset.set(600);
        f.coordinator.scroll_to(300);
        f.coordinator.repair();
        assert_eq!(f.coordinator.offset(), 300);
        assert_eq!(f.content.to_bottom.get(), 0);
    }

    #[test]
    fn test_pointer_down_stops_everything_and_repairs() {
        let f = fixture();
        f.content.offset.set(100);
        f.coordinator.scroll_to(50);

        f.coordinator.dispatch_touch(&TouchEvent::down(10.0, 10.0, 0));
        assert_eq!(f.list.stops.get(), 1);
        assert_eq!(f.coordinator.offset(), 0);
        assert_eq!(f.coordinator.gesture_state(), GestureState::Delegated);
        assert_eq!(f.coordinator.flying_type(), FlyingType::None);
    }

    #[test]
    fn test_multi_touch_passes_through_without_mutation() {
        let f = fixture();
        f.content.offset.set(600);
        f.coordinator.scroll_to(200);

        let two = |event: TouchEvent| event.with_pointer(TouchPointer::new(1, 200.0, 200.0));
        let stream = [
            two(TouchEvent::down(10.0, 450.0, 0)),
            two(TouchEvent::moved(10.0, 300.0, 16)),
            two(TouchEvent::up(10.0, 100.0, 32)),
        ];
        for event in &stream {
            assert_eq!(f.coordinator.dispatch_touch(event), EventResult::Ignore);
            assert_eq!(f.coordinator.intercept_touch(event), EventResult::Ignore);
            assert_eq!(f.coordinator.on_touch(event), EventResult::Ignore);
        }
        assert_eq!(f.coordinator.offset(), 200);
        assert_eq!(f.coordinator.gesture_state(), GestureState::Idle);
        assert_eq!(f.list.stops.get(), 0);
        assert!(!f.coordinator.needs_frame());
    }

    #[test]
    fn test_second_pointer_aborts_gesture_in_progress() {
        let f = fixture();
        f.content.offset.set(600);
        f.coordinator.scroll_to(100);

        f.coordinator.dispatch_touch(&TouchEvent::down(10.0, 200.0, 0));
        f.coordinator.request_disallow_intercept(true);
        f.coordinator.dispatch_touch(&TouchEvent::moved(10.0, 150.0, 16));
        assert_eq!(f.coordinator.gesture_state(), GestureState::Delegated);

        let joined = TouchEvent::moved(10.0, 100.0, 32)
            .with_pointer(TouchPointer::new(1, 200.0, 200.0));
        assert_eq!(f.coordinator.dispatch_touch(&joined), EventResult::Ignore);
        assert_eq!(f.coordinator.gesture_state(), GestureState::Idle);

        // The velocity of the aborted gesture is gone: no release fling
        f.coordinator.dispatch_touch(&TouchEvent::up(10.0, 50.0, 48));
        assert!(!f.coordinator.is_flinging());
        assert_eq!(f.coordinator.flying_type(), FlyingType::None);
        assert_eq!(f.coordinator.gesture_state(), GestureState::Idle);
        assert_eq!(f.coordinator.offset(), 100);
    }

    #[test]
    fn test_intercepts_drag_on_filler_only() {
        let f = fixture();
        // Filler occupies screen y 400..500 at offset 0
        f.coordinator.dispatch_touch(&TouchEvent::down(10.0, 450.0, 0));
        assert_eq!(
            f.coordinator.intercept_touch(&TouchEvent::down(10.0, 450.0, 0)),
            EventResult::Delegate
        );
        assert_eq!(
            f.coordinator.intercept_touch(&TouchEvent::moved(10.0, 445.0, 8)),
            EventResult::Delegate
        );
        assert_eq!(
            f.coordinator.intercept_touch(&TouchEvent::moved(10.0, 430.0, 16)),
            EventResult::Handled
        );
        assert_eq!(f.coordinator.gesture_state(), GestureState::Intercepted);
    }

    #[test]
    fn test_no_intercept_over_nested_region_or_when_disallowed() {
        let f = fixture();
        f.coordinator.dispatch_touch(&TouchEvent::down(10.0, 200.0, 0));
        f.coordinator.intercept_touch(&TouchEvent::down(10.0, 200.0, 0));
        assert_eq!(
            f.coordinator.intercept_touch(&TouchEvent::moved(10.0, 100.0, 16)),
            EventResult::Delegate
        );

        f.coordinator.dispatch_touch(&TouchEvent::down(10.0, 450.0, 100));
        f.coordinator.intercept_touch(&TouchEvent::down(10.0, 450.0, 100));
        f.coordinator.request_disallow_intercept(true);
        assert_eq!(
            f.coordinator.intercept_touch(&TouchEvent::moved(10.0, 300.0, 116)),
            EventResult::Delegate
        );
        assert_eq!(f.coordinator.gesture_state(), GestureState::Delegated);
    }

    #[test]
    fn test_direct_touch_scrolls_container() {
        let f = fixture();
        f.content.offset.set(600);
        f.coordinator.dispatch_touch(&TouchEvent::down(10.0, 450.0, 0));
        f.coordinator.on_touch(&TouchEvent::down(10.0, 450.0, 0));
        assert_eq!(f.coordinator.gesture_state(), GestureState::Intercepted);

        f.coordinator.on_touch(&TouchEvent::moved(10.0, 420.0, 16));
        assert_eq!(f.coordinator.offset(), 30);
        f.coordinator.on_touch(&TouchEvent::moved(10.0, 430.0, 32));
        assert_eq!(f.coordinator.offset(), 20);
    }

    #[test]
    fn test_pre_scroll_down_consumed_when_content_at_bottom() {
        let f = fixture();
        f.content.offset.set(600);
        assert_eq!(f.coordinator.propose_scroll(PeerRole::Content, 0, 40), (0, 40));
        assert_eq!(f.coordinator.offset(), 40);

        f.coordinator.scroll_to(500);
        assert_eq!(f.coordinator.propose_scroll(PeerRole::List, 0, 40), (0, 0));
    }

    #[test]
    fn test_pre_scroll_down_left_to_content_above_bottom() {
        let f = fixture();
        f.content.offset.set(100);
        assert_eq!(f.coordinator.propose_scroll(PeerRole::Content, 0, 40), (0, 0));
        assert_eq!(f.coordinator.offset(), 0);
    }

    #[test]
    fn test_pre_scroll_up_consumed_mid_transition() {
        let f = fixture();
        f.content.offset.set(600);
        f.coordinator.scroll_to(100);
        assert_eq!(f.coordinator.propose_scroll(PeerRole::List, 0, -30), (0, -30));
        assert_eq!(f.coordinator.offset(), 70);

        f.coordinator.scroll_to(0);
        assert_eq!(f.coordinator.propose_scroll(PeerRole::Content, 0, -30), (0, 0));
    }

    #[test]
    fn test_pre_scroll_reports_only_what_the_offset_absorbed() {
        let f = fixture();
        f.content.offset.set(600);

        f.coordinator.scroll_to(490);
        assert_eq!(f.coordinator.propose_scroll(PeerRole::List, 0, 40), (0, 10));
        assert_eq!(f.coordinator.offset(), 500);

        f.coordinator.scroll_to(20);
        assert_eq!(
            f.coordinator.propose_scroll(PeerRole::Content, 0, -50),
            (0, -20)
        );
        assert_eq!(f.coordinator.offset(), 0);
    }

    #[test]
    fn test_pre_scroll_mid_transition_forces_content_bottom() {
        let f = fixture();
        f.content.offset.set(300);
        f.coordinator.scroll_to(100);
        f.coordinator.propose_scroll(PeerRole::List, 0, -10);
        assert_eq!(f.content.to_bottom.get(), 1);
        assert_eq!(f.content.offset.get(), 600);
    }

    #[test]
    fn test_unconsumed_remainders() {
        let f = fixture();
        f.content.offset.set(600);
        f.coordinator.scroll_to(100);
        f.coordinator
            .report_unconsumed_scroll(PeerRole::List, 0, 0, 0, -40);
        assert_eq!(f.coordinator.offset(), 60);

        f.coordinator
            .report_unconsumed_scroll(PeerRole::Content, 0, 0, 0, 50);
        assert_eq!(f.coordinator.offset(), 110);

        // Downward leftovers from the list are its own overscroll
        f.coordinator
            .report_unconsumed_scroll(PeerRole::List, 0, 0, 0, 50);
        assert_eq!(f.coordinator.offset(), 110);
    }

    #[test]
    fn test_content_pre_fling_taken_over() {
        let f = fixture();
        f.content.offset.set(600);
        assert!(f.coordinator.propose_fling(PeerRole::Content, 0.0, 3000.0));
        assert_eq!(f.coordinator.flying_type(), FlyingType::ContentToParent);
        assert!(f.coordinator.needs_frame());
    }

    #[test]
    fn test_list_pre_fling_policies() {
        let f = fixture();
        f.coordinator.scroll_to(500);
        assert!(!f.coordinator.propose_fling(PeerRole::List, 0.0, -3000.0));
        assert_eq!(f.coordinator.flying_type(), FlyingType::ListToParent);

        let f = fixture();
        f.coordinator.scroll_to(500);
        assert!(!f.coordinator.propose_fling(PeerRole::List, 0.0, 3000.0));
        assert_eq!(f.coordinator.flying_type(), FlyingType::None);
        assert!(f.coordinator.session.borrow().fling.list_flinging_down);
    }

    #[test]
    fn test_content_to_parent_hands_off_to_list_once() {
        let f = fixture();
        f.content.offset.set(600);
        f.coordinator.propose_fling(PeerRole::Content, 0.0, 6000.0);
        run_frames(&f.coordinator, 1000);

        assert_eq!(f.coordinator.offset(), 500);
        let flings = f.list.flings.borrow();
        assert_eq!(flings.len(), 1, "handoff must fire once");
        assert!(flings[0] > 0.0);
        assert_eq!(f.coordinator.flying_type(), FlyingType::None);
    }

    #[test]
    fn test_content_to_parent_yields_to_list_flinging_down() {
        let f = fixture();
        f.content.offset.set(600);
        f.coordinator.propose_fling(PeerRole::Content, 0.0, 6000.0);
        assert!(f.coordinator.on_frame(FRAME));
        let offset = f.coordinator.offset();

        f.coordinator.propose_fling(PeerRole::List, 0.0, 2000.0);
        assert!(!f.coordinator.on_frame(FRAME));
        assert_eq!(f.coordinator.offset(), offset);
        assert_eq!(f.coordinator.flying_type(), FlyingType::None);
        assert!(!f.coordinator.is_flinging());
        assert!(!f.coordinator.needs_frame());
    }

    #[test]
    fn test_list_top_reset_mid_transition() {
        let f = fixture();
        f.content.offset.set(600);
        f.list.offset.set(120);
        f.coordinator.propose_fling(PeerRole::Content, 0.0, 1500.0);

        f.coordinator.on_frame(FRAME);
        assert!(f.coordinator.is_mid_transition());
        assert_eq!(f.list.offset.get(), 0);
    }

    #[test]
    fn test_parent_to_content_hands_off_at_zero() {
        let f = fixture();
        f.content.offset.set(600);
        f.coordinator.scroll_to(200);

        f.coordinator.dispatch_touch(&TouchEvent::down(10.0, 300.0, 0));
        for i in 1..=5u64 {
            f.coordinator
                .dispatch_touch(&TouchEvent::moved(10.0, 300.0 + i as f32 * 30.0, i * 10));
        }
        f.coordinator.dispatch_touch(&TouchEvent::up(10.0, 450.0, 50));
        assert_eq!(f.coordinator.flying_type(), FlyingType::ParentToContent);

        run_frames(&f.coordinator, 1000);
        assert_eq!(f.coordinator.offset(), 0);
        let flings = f.content.flings.borrow();
        assert_eq!(flings.len(), 1);
        assert!(flings[0] < 0.0, "content must fling toward its top");
    }

    #[test]
    fn test_list_to_parent_waits_for_zero() {
        let f = fixture();
        f.content.offset.set(600);
        f.coordinator.scroll_to(500);
        f.coordinator.propose_fling(PeerRole::List, 0.0, -4000.0);

        // Offset is driven by the list's nested scrolls, not by the fling
        assert!(f.coordinator.on_frame(FRAME));
        assert_eq!(f.coordinator.offset(), 500);
        assert!(f.content.flings.borrow().is_empty());

        f.coordinator.scroll_to(0);
        f.coordinator.on_frame(FRAME);
        f.coordinator.on_frame(FRAME);
        assert_eq!(f.content.flings.borrow().len(), 1);
    }

    #[test]
    fn test_release_outside_transition_does_not_fling() {
        let f = fixture();
        f.coordinator.dispatch_touch(&TouchEvent::down(10.0, 300.0, 0));
        f.coordinator.dispatch_touch(&TouchEvent::moved(10.0, 200.0, 10));
        f.coordinator.dispatch_touch(&TouchEvent::up(10.0, 100.0, 20));
        assert!(!f.coordinator.needs_frame());
        assert_eq!(f.coordinator.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn test_scroll_to_child_keeps_margin() {
        let f = fixture();
        f.content.offset.set(0);
        f.coordinator.scroll_to_child(500);
        assert_eq!(f.content.offset.get(), 600);
        assert_eq!(f.coordinator.offset(), 400);
    }

    #[test]
    fn test_detach_makes_peer_calls_noops() {
        let f = fixture();
        f.content.offset.set(600);
        f.coordinator.propose_fling(PeerRole::Content, 0.0, 3000.0);
        f.coordinator.detach();
        assert!(!f.coordinator.needs_frame());
        assert!(!f.coordinator.on_frame(FRAME));

        f.coordinator.scroll_to(250);
        f.coordinator.repair();
        f.coordinator.dispatch_touch(&TouchEvent::down(0.0, 0.0, 0));
        assert_eq!(f.list.stops.get(), 0);
    }

    #[test]
    fn test_on_scroll_callback() {
        let f = fixture();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        f.coordinator
            .set_on_scroll(move |old, new| sink.borrow_mut().push((old, new)));
        f.coordinator.scroll_to(120);
        f.coordinator.scroll_to(120);
        f.coordinator.scroll_to(-5);
        assert_eq!(*seen.borrow(), vec![(0, 120), (120, 0)]);
    }
}
