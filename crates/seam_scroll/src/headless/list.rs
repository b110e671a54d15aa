//! In-memory list peer
//!
//! Behaves like a platform list view for the nested-scroll protocol: drags
//! and its own fling are offered to the ancestor step by step, flings are
//! offered before they start.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use seam_animation::{MomentumSimulation, VelocityTracker};
use seam_core::{EventResult, TouchEvent, TouchPhase};

use crate::config::ScrollConfig;
use crate::nested::NestedScrollChildHelper;
use crate::peer::{NestedScrollParent, PeerRole, ScrollAxis, ScrollableRegion};

/// Fixed-height rows in a scrolling viewport
pub struct HeadlessList {
    config: ScrollConfig,
    row_count: Cell<usize>,
    row_height: i32,
    viewport_height: Cell<i32>,
    offset: Cell<i32>,
    simulation: RefCell<MomentumSimulation>,
    /// Last simulation position already turned into a scroll step
    fling_cursor: Cell<i32>,
    needs_frame: Cell<bool>,
    tracker: RefCell<Option<VelocityTracker>>,
    last_y: Cell<Option<i32>>,
    nested: NestedScrollChildHelper,
    participations: Cell<u32>,
}

impl HeadlessList {
    pub fn new(config: ScrollConfig, row_count: usize, row_height: i32) -> Self {
        Self {
            config,
            row_count: Cell::new(row_count),
            row_height: row_height.max(1),
            viewport_height: Cell::new(0),
            offset: Cell::new(0),
            simulation: RefCell::new(MomentumSimulation::new(config.fling)),
            fling_cursor: Cell::new(0),
            needs_frame: Cell::new(false),
            tracker: RefCell::new(None),
            last_y: Cell::new(None),
            nested: NestedScrollChildHelper::new(PeerRole::List),
            participations: Cell::new(0),
        }
    }

    /// Bind the ancestor coordinator (non-owning)
    pub fn attach_parent<P: NestedScrollParent + 'static>(&self, parent: &Rc<P>) {
        self.nested
            .attach(Rc::downgrade(parent) as Weak<dyn NestedScrollParent>);
    }

    pub fn detach(&self) {
        self.stop_momentum();
        self.tracker.borrow_mut().take();
        self.nested.detach();
    }

    pub fn set_viewport_height(&self, height: i32) {
        self.viewport_height.set(height.max(0));
        self.scroll_to(self.offset.get());
    }

    pub fn set_row_count(&self, rows: usize) {
        self.row_count.set(rows);
        self.scroll_to(self.offset.get());
    }

    pub fn offset(&self) -> i32 {
        self.offset.get()
    }

    pub fn max_scroll(&self) -> i32 {
        (self.content_extent() - self.viewport_height.get()).max(0)
    }

    /// Index of the first visible row
    pub fn first_visible_row(&self) -> usize {
        (self.offset.get() / self.row_height) as usize
    }

    pub fn needs_frame(&self) -> bool {
        self.needs_frame.get()
    }

    pub fn is_flinging(&self) -> bool {
        !self.simulation.borrow().is_finished()
    }

    /// Number of nested scrolls the ancestor accepted this list into
    pub fn participations(&self) -> u32 {
        self.participations.get()
    }

    /// One scroll step through the ancestor. Returns the part nobody used.
    fn scroll_step(&self, dy: i32) -> i32 {
        let (_, consumed) = self.nested.dispatch_pre_scroll(0, dy);
        let remainder = dy - consumed;
        if remainder == 0 {
            return 0;
        }
        let before = self.offset.get();
        self.scroll_to(before + remainder);
        let applied = self.offset.get() - before;
        self.nested.dispatch_scroll(0, applied, 0, remainder - applied);
        remainder - applied
    }

    /// Handle a touch delivered to the list
    pub fn on_touch(&self, event: &TouchEvent) -> EventResult {
        if event.is_multi_touch() {
            return EventResult::Ignore;
        }

        let y = event.screen_y();
        match event.phase {
            TouchPhase::Down => {
                self.stop_momentum();
                let mut tracker = VelocityTracker::new();
                tracker.add_sample(event.time_ms, y as f32);
                *self.tracker.borrow_mut() = Some(tracker);
                self.last_y.set(Some(y));
                self.nested.start_nested_scroll(ScrollAxis::Vertical);
            }
            TouchPhase::Move => {
                if let Some(tracker) = self.tracker.borrow_mut().as_mut() {
                    tracker.add_sample(event.time_ms, y as f32);
                }
                let last = self.last_y.replace(Some(y)).unwrap_or(y);
                if y != last {
                    self.scroll_step(last - y);
                }
            }
            TouchPhase::Up | TouchPhase::Cancel => {
                let tracker = self.tracker.borrow_mut().take();
                self.last_y.set(None);
                self.nested.stop_nested_scroll();
                if event.phase == TouchPhase::Up {
                    if let Some(tracker) = tracker {
                        let velocity =
                            -tracker.compute_velocity(self.config.max_fling_velocity);
                        if velocity.abs() >= self.config.min_fling_velocity {
                            self.fling(velocity);
                        }
                    }
                }
            }
        }
        EventResult::Handled
    }

    /// Advance the list fling by `dt` seconds
    pub fn on_frame(&self, dt: f32) -> bool {
        let position = {
            let mut simulation = self.simulation.borrow_mut();
            if !simulation.advance(dt) {
                self.needs_frame.set(false);
                return false;
            }
            simulation.current_position()
        };

        let delta = position - self.fling_cursor.replace(position);
        if delta != 0 {
            let parent_before = self.nested.parent_offset();
            let unconsumed = self.scroll_step(delta);
            if unconsumed == delta && self.nested.parent_offset() == parent_before {
                tracing::trace!("list fling hit an edge nobody absorbs, stopping");
                self.simulation.borrow_mut().abort();
            }
        }

        let running = !self.simulation.borrow().is_finished();
        if !running {
            self.nested.stop_nested_scroll();
        }
        self.needs_frame.set(running);
        running
    }
}

impl std::fmt::Debug for HeadlessList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessList")
            .field("rows", &self.row_count.get())
            .field("offset", &self.offset.get())
            .field("nested", &self.nested)
            .finish()
    }
}

impl ScrollableRegion for HeadlessList {
    fn current_offset(&self) -> i32 {
        self.offset.get()
    }

    fn scroll_to(&self, offset: i32) {
        let clamped = offset.clamp(0, self.max_scroll());
        let old = self.offset.replace(clamped);
        if old != clamped {
            tracing::trace!("list offset {} -> {}", old, clamped);
        }
    }

    fn content_extent(&self) -> i32 {
        let rows = i32::try_from(self.row_count.get()).unwrap_or(i32::MAX);
        rows.saturating_mul(self.row_height)
    }

    fn can_scroll_negative(&self) -> bool {
        self.offset.get() > 0
    }

    fn stop_momentum(&self) {
        self.simulation.borrow_mut().abort();
        self.needs_frame.set(false);
    }

    /// Offer the fling to the ancestor, then run it here unless taken
    fn fling(&self, velocity: f32) {
        self.nested.start_nested_scroll(ScrollAxis::Vertical);
        if self.nested.dispatch_pre_fling(0.0, velocity) {
            return;
        }
        self.nested.dispatch_fling(0.0, velocity, true);

        let start = self.offset.get();
        let launched = self.simulation.borrow_mut().fling(start, velocity);
        self.fling_cursor.set(start);
        self.needs_frame.set(launched);
        if launched {
            tracing::trace!("list fling {:.1}px/s from {}", velocity, start);
        } else {
            self.nested.stop_nested_scroll();
        }
    }

    fn begin_participation(&self) {
        self.participations.set(self.participations.get() + 1);
    }
}
