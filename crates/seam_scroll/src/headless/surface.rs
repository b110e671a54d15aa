//! Headless dispatch surface

use std::rc::Rc;

use seam_animation::FrameClock;
use seam_core::{
    EventResult, FlyingType, GestureState, Point, TouchEvent, TouchPhase, TouchPointer,
};
use smallvec::SmallVec;

use super::script::{GestureScript, GestureStep, ScriptError};
use super::{HeadlessList, StaticContent};
use crate::config::ScrollConfig;
use crate::content::EmbeddedContentScroller;
use crate::coordinator::{ChildFrame, LayoutPass, ScrollCoordinator};
use crate::peer::{PeerRole, ScrollableRegion};

/// Geometry of a headless surface
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SurfaceConfig {
    pub width: f32,
    /// Container viewport height; both the content and list slots get
    /// the same height
    pub viewport_height: i32,
    /// Container origin in screen space
    pub origin_x: f32,
    pub origin_y: f32,
    /// Measured height of the embedded content
    pub content_height: f32,
    /// Non-scrollable space between the content and the list
    pub filler_height: i32,
    pub list_rows: usize,
    pub row_height: i32,
    pub fps: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 360.0,
            viewport_height: 400,
            origin_x: 0.0,
            origin_y: 0.0,
            content_height: 1000.0,
            filler_height: 0,
            list_rows: 40,
            row_height: 60,
            fps: 60,
        }
    }
}

impl SurfaceConfig {
    pub fn with_filler(mut self, height: i32) -> Self {
        self.filler_height = height;
        self
    }

    pub fn with_content_height(mut self, height: f32) -> Self {
        self.content_height = height;
        self
    }

    /// Stacked children: content, optional filler, list
    pub fn layout_pass(&self) -> LayoutPass {
        let mut pass = LayoutPass::new(
            Point::new(self.origin_x, self.origin_y),
            self.width,
            self.viewport_height,
        )
        .content(self.viewport_height);
        if self.filler_height > 0 {
            pass = pass.filler(self.filler_height);
        }
        pass.list(self.viewport_height)
    }
}

/// Wire a coordinator to its peers and run the first layout.
///
/// Peer viewports are sized from their child frames. Returns the frames.
pub fn bind_surface(
    coordinator: &Rc<ScrollCoordinator>,
    content: &Rc<EmbeddedContentScroller>,
    list: &Rc<HeadlessList>,
    pass: &LayoutPass,
) -> SmallVec<[ChildFrame; 4]> {
    coordinator.attach_content(content);
    coordinator.attach_list(list);
    content.attach_parent(coordinator);
    list.attach_parent(coordinator);

    let frames = coordinator.layout(pass);
    for frame in &frames {
        match frame.role {
            Some(PeerRole::Content) => content.set_viewport_height(frame.height),
            Some(PeerRole::List) => list.set_viewport_height(frame.height),
            None => {}
        }
    }
    frames
}

/// Who receives the rest of the gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Touched {
    Container,
    Content,
    List,
}

/// State of the surface at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameSample {
    pub frame: u64,
    pub time_ms: u64,
    /// Input dispatched at this instant, `None` for animation frames
    pub input: Option<TouchPhase>,
    pub container: i32,
    pub content: i32,
    pub list: i32,
    pub flying: FlyingType,
    pub gesture: GestureState,
}

/// A coordinator, a content scroller and a list driven by a virtual clock
pub struct HeadlessSurface {
    config: SurfaceConfig,
    coordinator: Rc<ScrollCoordinator>,
    content: Rc<EmbeddedContentScroller>,
    list: Rc<HeadlessList>,
    source: StaticContent,
    clock: FrameClock,
    target: Option<Touched>,
    pointer: Option<Point>,
    second: Option<Point>,
    trace: Vec<FrameSample>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(ScrollConfig::default(), SurfaceConfig::default())
    }
}

impl HeadlessSurface {
    pub fn new(scroll: ScrollConfig, config: SurfaceConfig) -> Self {
        let source = StaticContent::new(config.content_height);
        let coordinator = Rc::new(ScrollCoordinator::new(scroll));
        let content = Rc::new(EmbeddedContentScroller::new(scroll, source.clone()));
        let list = Rc::new(HeadlessList::new(
            scroll,
            config.list_rows,
            config.row_height,
        ));
        bind_surface(&coordinator, &content, &list, &config.layout_pass());
        tracing::debug!(
            "headless surface: viewport={} extent={:?}",
            config.viewport_height,
            coordinator.scroll_extent()
        );

        Self {
            config,
            coordinator,
            content,
            list,
            source,
            clock: FrameClock::new(config.fps),
            target: None,
            pointer: None,
            second: None,
            trace: Vec::new(),
        }
    }

    /// Surface sized by the script's own geometry (or the default)
    pub fn for_script(scroll: ScrollConfig, script: &GestureScript) -> Self {
        Self::new(scroll, script.surface_config())
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &Rc<ScrollCoordinator> {
        &self.coordinator
    }

    pub fn content(&self) -> &Rc<EmbeddedContentScroller> {
        &self.content
    }

    pub fn list(&self) -> &Rc<HeadlessList> {
        &self.list
    }

    pub fn source(&self) -> &StaticContent {
        &self.source
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn target(&self) -> Option<Touched> {
        self.target
    }

    pub fn trace(&self) -> &[FrameSample] {
        &self.trace
    }

    pub fn take_trace(&mut self) -> Vec<FrameSample> {
        std::mem::take(&mut self.trace)
    }

    /// Any component still wants frames
    pub fn is_animating(&self) -> bool {
        self.coordinator.needs_frame() || self.content.needs_frame() || self.list.needs_frame()
    }

    pub fn sample(&self, input: Option<TouchPhase>) -> FrameSample {
        FrameSample {
            frame: self.clock.frame(),
            time_ms: self.clock.now_ms(),
            input,
            container: self.coordinator.offset(),
            content: self.content.offset(),
            list: self.list.offset(),
            flying: self.coordinator.flying_type(),
            gesture: self.coordinator.gesture_state(),
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Route one event the way a toolkit does: the coordinator observes it,
    /// may intercept it, otherwise the touched descendant gets it.
    pub fn dispatch(&mut self, event: &TouchEvent) -> EventResult {
        if self.coordinator.dispatch_touch(event) == EventResult::Ignore {
            if let Some(target) = self.target.take() {
                self.abort_target(target, event);
            }
            self.record(event.phase);
            return EventResult::Ignore;
        }

        let result = match event.phase {
            TouchPhase::Down => {
                let intercepted = self.coordinator.intercept_touch(event).is_handled();
                let target = if intercepted {
                    Touched::Container
                } else {
                    self.hit_test(event)
                };
                tracing::trace!("pointer down routed to {:?}", target);
                self.target = Some(target);
                self.deliver(target, event)
            }
            _ => match self.target {
                // Aborted or never started: nothing owns the rest of the stream
                None => EventResult::Ignore,
                Some(Touched::Container) => self.coordinator.on_touch(event),
                Some(child) => {
                    if self.coordinator.intercept_touch(event).is_handled() {
                        tracing::debug!("{:?} lost the gesture to the container", child);
                        self.deliver(child, &event.with_phase(TouchPhase::Cancel));
                        self.target = Some(Touched::Container);
                        EventResult::Handled
                    } else {
                        self.deliver(child, event)
                    }
                }
            },
        };

        if event.phase.is_terminal() {
            self.target = None;
        }
        self.record(event.phase);
        result
    }

    /// A second pointer joined mid-gesture. The descendant that held the
    /// stream gets a single-pointer cancel so it leaves the nested scroll.
    fn abort_target(&self, target: Touched, event: &TouchEvent) {
        if target == Touched::Container {
            return;
        }
        tracing::debug!("multi-touch took the gesture from {:?}", target);
        let mut cancel = event.with_phase(TouchPhase::Cancel);
        cancel.pointers.truncate(1);
        self.deliver(target, &cancel);
    }

    fn hit_test(&self, event: &TouchEvent) -> Touched {
        let Some(pointer) = event.primary() else {
            return Touched::Container;
        };
        let point = Point::new(pointer.screen_x, pointer.screen_y);
        for frame in self.coordinator.child_frames() {
            let Some(role) = frame.role else {
                continue;
            };
            let hit = self
                .coordinator
                .child_screen_bounds(&frame)
                .map(|bounds| bounds.contains(point))
                .unwrap_or(false);
            if hit {
                return match role {
                    PeerRole::Content => Touched::Content,
                    PeerRole::List => Touched::List,
                };
            }
        }
        Touched::Container
    }

    fn deliver(&self, target: Touched, event: &TouchEvent) -> EventResult {
        let frame_top = |role: PeerRole| {
            self.coordinator
                .child_frames()
                .iter()
                .find(|frame| frame.role == Some(role))
                .map(|frame| (frame.top - self.coordinator.offset()) as f32)
                .unwrap_or(0.0)
        };
        match target {
            Touched::Container => self.coordinator.on_touch(event),
            Touched::Content => self
                .content
                .on_touch(&event.relative_to(0.0, frame_top(PeerRole::Content))),
            Touched::List => self
                .list
                .on_touch(&event.relative_to(0.0, frame_top(PeerRole::List))),
        }
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Advance every component by one frame
    pub fn frame(&mut self) -> FrameSample {
        let dt = self.clock.tick();
        self.coordinator.on_frame(dt);
        self.content.on_frame(dt);
        self.list.on_frame(dt);
        self.record_frame()
    }

    pub fn run_frames(&mut self, count: u32) {
        for _ in 0..count {
            self.frame();
        }
    }

    /// Run frames until nothing animates. Returns the frames run.
    pub fn settle(&mut self, max_frames: u32) -> u32 {
        let mut frames = 0;
        while self.is_animating() && frames < max_frames {
            self.frame();
            frames += 1;
        }
        if self.is_animating() {
            tracing::warn!("still animating after {} frames", max_frames);
        }
        frames
    }

    fn record(&mut self, phase: TouchPhase) {
        let sample = self.sample(Some(phase));
        self.trace.push(sample);
    }

    fn record_frame(&mut self) -> FrameSample {
        let sample = self.sample(None);
        self.trace.push(sample);
        sample
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    fn event(&self, phase: TouchPhase) -> TouchEvent {
        let pointer = self.pointer.unwrap_or_default();
        let mut event = TouchEvent::new(phase, pointer.x, pointer.y, self.clock.now_ms());
        if let Some(second) = self.second {
            event = event.with_pointer(TouchPointer::new(1, second.x, second.y));
        }
        event.with_screen_origin(self.config.origin_x, self.config.origin_y)
    }

    /// Put the primary pointer down at container-local (`x`, `y`)
    pub fn pointer_down(&mut self, x: f32, y: f32) -> EventResult {
        self.pointer = Some(Point::new(x, y));
        let event = self.event(TouchPhase::Down);
        self.dispatch(&event)
    }

    /// Move the pointer to `to_y` in `steps` moves, one frame apart
    pub fn drag_to(&mut self, to_y: f32, steps: u32) {
        let Some(start) = self.pointer else {
            return;
        };
        let steps = steps.max(1);
        for i in 1..=steps {
            self.frame();
            let y = start.y + (to_y - start.y) * i as f32 / steps as f32;
            self.pointer = Some(Point::new(start.x, y));
            let event = self.event(TouchPhase::Move);
            self.dispatch(&event);
        }
    }

    /// Keep the pointer still for `steps` frames
    pub fn hold(&mut self, steps: u32) {
        if let Some(pointer) = self.pointer {
            self.drag_to(pointer.y, steps);
        }
    }

    /// Lift every pointer
    pub fn release(&mut self) -> EventResult {
        self.finish(TouchPhase::Up)
    }

    pub fn cancel(&mut self) -> EventResult {
        self.finish(TouchPhase::Cancel)
    }

    fn finish(&mut self, phase: TouchPhase) -> EventResult {
        let event = self.event(phase);
        let result = self.dispatch(&event);
        self.pointer = None;
        self.second = None;
        result
    }

    /// Add a second pointer to every following event of this gesture
    pub fn second_pointer(&mut self, x: f32, y: f32) {
        self.second = Some(Point::new(x, y));
        if self.pointer.is_some() {
            let event = self.event(TouchPhase::Move);
            self.dispatch(&event);
        }
    }

    /// Set offsets directly, as a host restoring saved state would
    pub fn jump(&mut self, container: Option<i32>, content: Option<i32>, list: Option<i32>) {
        if let Some(offset) = content {
            self.content.set_offset(offset);
        }
        if let Some(offset) = list {
            self.list.scroll_to(offset);
        }
        if let Some(offset) = container {
            self.coordinator.scroll_to(offset);
        }
        self.record_frame();
    }

    // =========================================================================
    // Scripts
    // =========================================================================

    /// Replay a script and return the trace recorded so far
    pub fn play(&mut self, script: &GestureScript) -> Result<&[FrameSample], ScriptError> {
        script.validate()?;
        tracing::info!("playing '{}' ({} steps)", script.name, script.steps.len());
        for step in &script.steps {
            self.apply(step);
        }
        Ok(&self.trace)
    }

    fn apply(&mut self, step: &GestureStep) {
        match *step {
            GestureStep::Down { x, y } => {
                self.pointer_down(x, y);
            }
            GestureStep::Drag { to_y, steps } => self.drag_to(to_y, steps),
            GestureStep::Hold { steps } => self.hold(steps),
            GestureStep::Release => {
                self.release();
            }
            GestureStep::Cancel => {
                self.cancel();
            }
            GestureStep::SecondPointer { x, y } => self.second_pointer(x, y),
            GestureStep::Frames { count } => self.run_frames(count),
            GestureStep::Settle { max_frames } => {
                self.settle(max_frames);
            }
            GestureStep::Jump {
                container,
                content,
                list,
            } => self.jump(container, content, list),
        }
    }
}

impl std::fmt::Debug for HeadlessSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessSurface")
            .field("coordinator", &self.coordinator)
            .field("content", &self.content)
            .field("list", &self.list)
            .field("target", &self.target)
            .field("frame", &self.clock.frame())
            .finish()
    }
}
