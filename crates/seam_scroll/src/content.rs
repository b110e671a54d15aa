//! Embedded content scroller
//!
//! Scrolls a region whose content height is measured independently of the
//! container layout (loaded documents, rendered pages). It owns its offset
//! and its own momentum, and takes part in the nested-scroll protocol as a
//! child of the [`ScrollCoordinator`](crate::ScrollCoordinator):
//!
//! - every drag step is offered to the ancestor first, only the remainder is
//!   applied locally and what could not be applied is reported back
//! - offset writes are suppressed while the ancestor is away from offset 0,
//!   so the ancestor always settles at the seam before the content moves
//! - a self-originated fling that runs into the content bottom is offered to
//!   the ancestor exactly once

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use seam_animation::MomentumSimulation;
use seam_core::{EventResult, TouchEvent, TouchPhase};

use crate::config::ScrollConfig;
use crate::nested::NestedScrollChildHelper;
use crate::peer::{
    ContentRegion, ContentSource, NestedScrollParent, PeerRole, ScrollAxis, ScrollableRegion,
};
use crate::session::ContentGesture;

/// How one drag step was split between the ancestor and the content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollSplit {
    /// Delta offered
    pub requested: i32,
    /// Taken by the ancestor in the pre-scroll offer
    pub parent_consumed: i32,
    /// Applied to the content offset
    pub applied: i32,
    /// Left over after both, reported to the ancestor
    pub unconsumed: i32,
}

/// Scroller for the embedded content region
pub struct EmbeddedContentScroller {
    config: ScrollConfig,
    source: Box<dyn ContentSource>,
    viewport_height: Cell<i32>,
    offset: Cell<i32>,
    /// Measured extent, cleared at every pointer-down
    extent_cache: Cell<Option<i32>>,
    /// Maximum offset captured at gesture start
    max_offset: Cell<Option<i32>>,
    gesture: RefCell<ContentGesture>,
    simulation: RefCell<MomentumSimulation>,
    needs_frame: Cell<bool>,
    visible: Cell<bool>,
    nested: NestedScrollChildHelper,
}

impl EmbeddedContentScroller {
    pub fn new(config: ScrollConfig, source: impl ContentSource + 'static) -> Self {
        Self {
            config,
            source: Box::new(source),
            viewport_height: Cell::new(0),
            offset: Cell::new(0),
            extent_cache: Cell::new(None),
            max_offset: Cell::new(None),
            gesture: RefCell::new(ContentGesture::default()),
            simulation: RefCell::new(MomentumSimulation::new(config.fling)),
            needs_frame: Cell::new(false),
            visible: Cell::new(true),
            nested: NestedScrollChildHelper::new(PeerRole::Content),
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Bind the ancestor coordinator (non-owning)
    pub fn attach_parent<P: NestedScrollParent + 'static>(&self, parent: &Rc<P>) {
        self.nested
            .attach(Rc::downgrade(parent) as Weak<dyn NestedScrollParent>);
    }

    /// Drop the ancestor binding, momentum and gesture state
    pub fn detach(&self) {
        self.simulation.borrow_mut().abort();
        self.needs_frame.set(false);
        *self.gesture.borrow_mut() = ContentGesture::default();
        self.max_offset.set(None);
        self.nested.detach();
    }

    /// Child-side nested-scroll helper
    pub fn nested(&self) -> &NestedScrollChildHelper {
        &self.nested
    }

    pub fn set_viewport_height(&self, height: i32) {
        self.viewport_height.set(height.max(0));
    }

    pub fn viewport_height(&self) -> i32 {
        self.viewport_height.get()
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    pub fn offset(&self) -> i32 {
        self.offset.get()
    }

    pub fn needs_frame(&self) -> bool {
        self.needs_frame.get()
    }

    pub fn is_flinging(&self) -> bool {
        !self.simulation.borrow().is_finished()
    }

    // =========================================================================
    // Extent
    // =========================================================================

    /// Content height in px, cached until the next pointer-down
    pub fn measured_extent(&self) -> i32 {
        if let Some(extent) = self.extent_cache.get() {
            return extent;
        }
        let height = self.source.content_height() * self.config.content_density;
        let extent = if height.is_finite() {
            height.round().max(0.0) as i32
        } else {
            0
        };
        // Unmeasured content reports 0; keep asking until it has a height
        if extent > 0 {
            self.extent_cache.set(Some(extent));
        }
        extent
    }

    /// Scroll range of the current content
    pub fn max_scroll(&self) -> i32 {
        (self.measured_extent() - self.viewport_height.get()).max(0)
    }

    /// Content is taller than the viewport
    pub fn is_content_scrollable(&self) -> bool {
        self.measured_extent() > self.viewport_height.get()
    }

    fn offset_limit(&self) -> i32 {
        self.max_offset.get().unwrap_or_else(|| self.max_scroll())
    }

    /// The ancestor sits at offset 0 (or there is none)
    fn is_parent_settled(&self) -> bool {
        self.nested.parent_offset().map(|o| o == 0).unwrap_or(true)
    }

    /// Restore an offset (saved state, programmatic jumps). Clamped but not
    /// held back by the ancestor's offset.
    pub fn set_offset(&self, offset: i32) {
        self.write_offset(offset);
    }

    fn write_offset(&self, offset: i32) {
        let clamped = offset.clamp(0, self.offset_limit());
        let old = self.offset.replace(clamped);
        if old != clamped {
            tracing::trace!("content offset {} -> {}", old, clamped);
        }
    }

    // =========================================================================
    // Touch intake
    // =========================================================================

    /// Handle a touch delivered to the content region.
    ///
    /// Returns `Handled` for moves beyond the touch slop, meaning the host's
    /// native scrolling must not see them. Multi-touch is ignored.
    pub fn on_touch(&self, event: &TouchEvent) -> EventResult {
        if event.is_multi_touch() {
            return EventResult::Ignore;
        }

        let y = event.screen_y();
        match event.phase {
            TouchPhase::Down => {
                self.extent_cache.set(None);
                self.simulation.borrow_mut().abort();
                self.needs_frame.set(false);
                *self.gesture.borrow_mut() = ContentGesture::begin(self.config.touch_slop, y);
                self.max_offset.set(Some(self.max_scroll()));
                self.nested.start_nested_scroll(ScrollAxis::Vertical);
                self.nested.request_disallow_intercept(true);
                EventResult::Delegate
            }
            TouchPhase::Move => {
                let dy = self.gesture.borrow_mut().track(event.time_ms, y);
                self.nested.request_disallow_intercept(true);
                if dy != 0 {
                    // Finger moving up scrolls the content down
                    self.drag_by(-dy);
                }
                let beyond_slop = self.gesture.borrow().drag.exceeded(y);
                EventResult::from_handled(beyond_slop)
            }
            TouchPhase::Up | TouchPhase::Cancel => {
                let tracker = self.gesture.borrow_mut().take_tracker();
                if let (true, Some(tracker)) = (self.is_parent_settled(), tracker) {
                    let velocity = -tracker.compute_velocity(self.config.max_fling_velocity);
                    self.release_fling(velocity);
                }
                self.nested.stop_nested_scroll();
                EventResult::Delegate
            }
        }
    }

    /// Split one drag step between the ancestor and the content.
    ///
    /// `ancestor consumed + content applied + unconsumed == dy` always holds.
    pub fn drag_by(&self, dy: i32) -> ScrollSplit {
        let (_, parent_consumed) = self.nested.dispatch_pre_scroll(0, dy);
        let remainder = dy - parent_consumed;

        let mut applied = 0;
        if remainder != 0 {
            let before = self.offset.get();
            self.scroll_by(remainder);
            applied = self.offset.get() - before;
            self.nested
                .dispatch_scroll(0, applied, 0, remainder - applied);
        }

        ScrollSplit {
            requested: dy,
            parent_consumed,
            applied,
            unconsumed: remainder - applied,
        }
    }

    fn release_fling(&self, velocity: f32) {
        self.gesture.borrow_mut().self_fling = true;
        if velocity.abs() < self.config.min_fling_velocity {
            return;
        }

        // Already at the bottom: offer the fling before moving at all
        if velocity > 0.0
            && !self.can_scroll_further_down()
            && self.nested.start_nested_scroll(ScrollAxis::Vertical)
            && self.claim_handoff()
        {
            if self.nested.dispatch_pre_fling(0.0, velocity) {
                tracing::debug!("released at the bottom, ancestor took {:.1}px/s", velocity);
                return;
            }
            self.nested.dispatch_fling(0.0, velocity, false);
        }
        self.launch(velocity);
    }

    /// One handoff per fling
    fn claim_handoff(&self) -> bool {
        self.gesture.borrow_mut().claim_handoff()
    }

    fn launch(&self, velocity: f32) {
        let launched = self
            .simulation
            .borrow_mut()
            .fling(self.offset.get(), velocity);
        self.needs_frame.set(launched);
    }

    // =========================================================================
    // Momentum
    // =========================================================================

    /// Advance the content fling by `dt` seconds.
    ///
    /// Returns whether another frame is required.
    pub fn on_frame(&self, dt: f32) -> bool {
        let (start, position, velocity) = {
            let mut simulation = self.simulation.borrow_mut();
            if !simulation.advance(dt) {
                self.needs_frame.set(false);
                return false;
            }
            (
                simulation.start_position(),
                simulation.current_position(),
                simulation.current_velocity(),
            )
        };

        let self_fling = self.gesture.borrow().self_fling;
        if !self_fling {
            // Momentum handed down by the ancestor
            self.scroll_to(position);
        } else {
            if self.is_content_scrollable() {
                self.scroll_to(position);
            }
            if start < position
                && !self.can_scroll_further_down()
                && self.claim_handoff()
                && self.nested.start_nested_scroll(ScrollAxis::Vertical)
            {
                let speed = velocity.abs();
                if self.nested.dispatch_pre_fling(0.0, speed) {
                    tracing::debug!("hit the bottom, ancestor took {:.1}px/s", speed);
                    self.simulation.borrow_mut().abort();
                } else {
                    self.nested.dispatch_fling(0.0, speed, false);
                }
            }
        }

        let running = !self.simulation.borrow().is_finished();
        self.needs_frame.set(running);
        running
    }
}

impl std::fmt::Debug for EmbeddedContentScroller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedContentScroller")
            .field("offset", &self.offset.get())
            .field("viewport_height", &self.viewport_height.get())
            .field("extent", &self.extent_cache.get())
            .field("nested", &self.nested)
            .finish()
    }
}

impl ScrollableRegion for EmbeddedContentScroller {
    fn current_offset(&self) -> i32 {
        self.offset.get()
    }

    /// Ignored unless the ancestor is settled at offset 0
    fn scroll_to(&self, offset: i32) {
        if !self.is_parent_settled() {
            tracing::trace!("content scroll_to({}) held while ancestor is off 0", offset);
            return;
        }
        self.write_offset(offset);
    }

    fn content_extent(&self) -> i32 {
        self.measured_extent()
    }

    fn can_scroll_negative(&self) -> bool {
        self.offset.get() > 0
    }

    fn stop_momentum(&self) {
        self.simulation.borrow_mut().abort();
        self.needs_frame.set(false);
    }

    /// Momentum handed down by the ancestor
    fn fling(&self, velocity: f32) {
        self.gesture.borrow_mut().self_fling = false;
        self.launch(velocity);
    }

    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn begin_participation(&self) {
        tracing::trace!("content joined nested scroll");
    }

    fn end_participation(&self) {
        tracing::trace!("content left nested scroll");
    }
}

impl ContentRegion for EmbeddedContentScroller {
    fn can_scroll_further_down(&self) -> bool {
        let range = self.measured_extent() - self.viewport_height.get();
        if range <= 0 {
            return false;
        }
        self.offset.get() < range - self.config.bottom_slop
    }

    fn scroll_to_bottom(&self) {
        let bottom = self.max_scroll();
        let old = self.offset.replace(bottom);
        if old != bottom {
            tracing::trace!("content jumped to bottom {} -> {}", old, bottom);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn standalone(height: f32, viewport: i32) -> EmbeddedContentScroller {
        let scroller = EmbeddedContentScroller::new(ScrollConfig::default(), move || height);
        scroller.set_viewport_height(viewport);
        scroller
    }

    #[test]
    fn test_offset_clamped_to_max() {
        let scroller = standalone(1000.0, 400);
        assert_eq!(scroller.max_scroll(), 600);
        scroller.scroll_to(10_000);
        assert_eq!(scroller.offset(), 600);
        scroller.scroll_to(-10);
        assert_eq!(scroller.offset(), 0);
    }

    #[test]
    fn test_can_scroll_further_down_margin() {
        let scroller = standalone(1000.0, 400);
        scroller.scroll_to(591);
        assert!(scroller.can_scroll_further_down());
        scroller.scroll_to(592);
        assert!(!scroller.can_scroll_further_down());

        let short = standalone(300.0, 400);
        assert!(!short.can_scroll_further_down());
        assert!(!short.is_content_scrollable());
    }

    #[test]
    fn test_density_scales_extent() {
        let scroller = EmbeddedContentScroller::new(
            ScrollConfig {
                content_density: 2.0,
                ..Default::default()
            },
            || 500.0,
        );
        scroller.set_viewport_height(400);
        assert_eq!(scroller.measured_extent(), 1000);
    }

    #[test]
    fn test_extent_cached_until_pointer_down() {
        let height = Rc::new(Cell::new(1000.0f32));
        let source = height.clone();
        let scroller = EmbeddedContentScroller::new(ScrollConfig::default(), move || source.get());
        scroller.set_viewport_height(400);
        assert_eq!(scroller.measured_extent(), 1000);

        height.set(2000.0);
        assert_eq!(scroller.measured_extent(), 1000);

        scroller.on_touch(&TouchEvent::down(0.0, 100.0, 0));
        assert_eq!(scroller.measured_extent(), 2000);
    }

    #[test]
    fn test_unmeasured_extent_not_cached() {
        let height = Rc::new(Cell::new(0.0f32));
        let source = height.clone();
        let scroller = EmbeddedContentScroller::new(ScrollConfig::default(), move || source.get());
        assert_eq!(scroller.measured_extent(), 0);
        height.set(900.0);
        assert_eq!(scroller.measured_extent(), 900);
    }

    #[test]
    fn test_standalone_drag_applies_everything_it_can() {
        let scroller = standalone(1000.0, 400);
        scroller.on_touch(&TouchEvent::down(0.0, 300.0, 0));
        let split = scroller.drag_by(650);
        assert_eq!(split.parent_consumed, 0);
        assert_eq!(split.applied, 600);
        assert_eq!(split.unconsumed, 50);
        assert_eq!(scroller.offset(), 600);
    }

    #[test]
    fn test_moves_beyond_slop_are_handled() {
        let scroller = standalone(1000.0, 400);
        scroller.on_touch(&TouchEvent::down(0.0, 300.0, 0));
        assert_eq!(
            scroller.on_touch(&TouchEvent::moved(0.0, 296.0, 10)),
            EventResult::Delegate
        );
        assert_eq!(scroller.offset(), 4);
        assert_eq!(
            scroller.on_touch(&TouchEvent::moved(0.0, 280.0, 20)),
            EventResult::Handled
        );
        assert_eq!(scroller.offset(), 20);
    }

    #[test]
    fn test_release_flings_standalone() {
        let scroller = standalone(5000.0, 400);
        scroller.on_touch(&TouchEvent::down(0.0, 300.0, 0));
        for i in 1..=5u64 {
            scroller.on_touch(&TouchEvent::moved(0.0, 300.0 - i as f32 * 20.0, i * 10));
        }
        scroller.on_touch(&TouchEvent::up(0.0, 200.0, 60));
        assert!(scroller.needs_frame());

        let before = scroller.offset();
        assert!(scroller.on_frame(FRAME));
        assert!(scroller.offset() > before);
    }

    /// Ancestor that takes part in nested scrolls but never takes a fling
    #[derive(Default)]
    struct DecliningParent {
        offered: Cell<u32>,
        reported: Cell<u32>,
    }

    impl NestedScrollParent for DecliningParent {
        fn parent_offset(&self) -> i32 {
            0
        }
        fn on_start_nested_scroll(&self, _source: PeerRole, axis: ScrollAxis) -> bool {
            axis == ScrollAxis::Vertical
        }
        fn on_stop_nested_scroll(&self, _source: PeerRole) {}
        fn propose_scroll(&self, _source: PeerRole, _dx: i32, _dy: i32) -> (i32, i32) {
            (0, 0)
        }
        fn report_unconsumed_scroll(&self, _: PeerRole, _: i32, _: i32, _: i32, _: i32) {}
        fn propose_fling(&self, _source: PeerRole, _vx: f32, _vy: f32) -> bool {
            self.offered.set(self.offered.get() + 1);
            false
        }
        fn report_fling(&self, _: PeerRole, _: f32, _: f32, _: bool) -> bool {
            self.reported.set(self.reported.get() + 1);
            false
        }
        fn request_disallow_intercept(&self, _disallow: bool) {}
    }

    #[test]
    fn test_self_fling_offered_once_at_bottom() {
        let parent = Rc::new(DecliningParent::default());
        let scroller = standalone(1000.0, 400);
        scroller.attach_parent(&parent);
        scroller.set_offset(300);

        scroller.on_touch(&TouchEvent::down(0.0, 300.0, 0));
        for i in 1..=5u64 {
            scroller.on_touch(&TouchEvent::moved(0.0, 300.0 - i as f32 * 20.0, i * 10));
        }
        scroller.on_touch(&TouchEvent::up(0.0, 200.0, 60));
        assert_eq!(scroller.offset(), 400);
        assert!(scroller.needs_frame());

        let mut frames_at_bottom = 0;
        while scroller.on_frame(FRAME) {
            if scroller.offset() == 600 {
                frames_at_bottom += 1;
            }
        }
        assert!(frames_at_bottom > 1);
        assert_eq!(parent.offered.get(), 1);
        assert_eq!(parent.reported.get(), 1);
    }

    #[test]
    fn test_parent_driven_fling_skips_handoff() {
        let scroller = standalone(1000.0, 400);
        scroller.fling(3000.0);
        while scroller.on_frame(FRAME) {}
        assert_eq!(scroller.offset(), 600);
        assert!(!scroller.needs_frame());
    }

    #[test]
    fn test_stop_momentum() {
        let scroller = standalone(5000.0, 400);
        scroller.fling(3000.0);
        scroller.on_frame(FRAME);
        scroller.stop_momentum();
        assert!(!scroller.is_flinging());
        assert!(!scroller.on_frame(FRAME));
    }

    #[test]
    fn test_multi_touch_ignored() {
        let scroller = standalone(1000.0, 400);
        let event = TouchEvent::down(0.0, 10.0, 0)
            .with_pointer(seam_core::TouchPointer::new(1, 50.0, 50.0));
        assert_eq!(scroller.on_touch(&event), EventResult::Ignore);
    }

    #[test]
    fn test_scroll_to_bottom() {
        let scroller = standalone(1000.0, 400);
        scroller.scroll_to_bottom();
        assert_eq!(scroller.offset(), 600);
        assert!(!scroller.can_scroll_further_down());
    }
}
