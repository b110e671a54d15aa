//! Peer capabilities
//!
//! The coordinator never owns its peers. It talks to them through the
//! capability traits below, holding only `Weak` handles, and peers talk back
//! through [`NestedScrollParent`]. Every method takes `&self`: calls are
//! reentrant (a peer may call back into the coordinator while the coordinator
//! is calling it), so implementors keep their state in cells and never hold a
//! borrow across a call to another component.

/// Which peer a nested-scroll callback comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PeerRole {
    /// The upper region with independently measured content
    Content,
    /// The lower virtualized list
    List,
}

/// Nested-scroll axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollAxis {
    Vertical,
    Horizontal,
}

/// A region with its own scroll offset
pub trait ScrollableRegion {
    /// Current scroll offset in px
    fn current_offset(&self) -> i32;

    /// Jump to `offset` (the region clamps)
    fn scroll_to(&self, offset: i32);

    /// Scroll by a relative amount
    fn scroll_by(&self, delta: i32) {
        self.scroll_to(self.current_offset().saturating_add(delta));
    }

    /// Total height of the region's content in px
    fn content_extent(&self) -> i32;

    /// Whether the region can still scroll toward its start
    fn can_scroll_negative(&self) -> bool;

    /// Abort any momentum the region is running
    fn stop_momentum(&self);

    /// Start a fling with signed `velocity` (px/s, positive scrolls toward
    /// the end of the content)
    fn fling(&self, velocity: f32);

    /// Whether the region is currently shown
    fn is_visible(&self) -> bool {
        true
    }

    /// The ancestor accepted this region into a nested scroll
    fn begin_participation(&self) {}

    /// The nested scroll this region took part in ended
    fn end_participation(&self) {}
}

/// The embedded content region
pub trait ContentRegion: ScrollableRegion {
    /// Whether more than the bottom margin of content is left below
    fn can_scroll_further_down(&self) -> bool;

    /// Jump to the bottom, regardless of the ancestor's offset
    fn scroll_to_bottom(&self);
}

/// Supplies the measured height of embedded content
///
/// The height is queried lazily and cached by the scroller until the next
/// pointer-down, so implementors may compute it on demand.
pub trait ContentSource {
    /// Content height in content units (scaled by the configured density)
    fn content_height(&self) -> f32;
}

impl<F: Fn() -> f32> ContentSource for F {
    fn content_height(&self) -> f32 {
        self()
    }
}

/// Ancestor side of the nested-scroll protocol
///
/// Deltas follow scroll direction: positive `dy` moves content toward its
/// end. Velocities use the same sign.
pub trait NestedScrollParent {
    /// The ancestor's own scroll offset
    fn parent_offset(&self) -> i32;

    /// A descendant wants to start a nested scroll. Returns whether the
    /// ancestor takes part.
    fn on_start_nested_scroll(&self, source: PeerRole, axis: ScrollAxis) -> bool;

    /// The nested scroll from `source` ended
    fn on_stop_nested_scroll(&self, source: PeerRole);

    /// Offer a delta before the descendant consumes it. Returns the consumed
    /// `(dx, dy)`.
    fn propose_scroll(&self, source: PeerRole, dx: i32, dy: i32) -> (i32, i32);

    /// Report what the descendant consumed and what it could not
    fn report_unconsumed_scroll(
        &self,
        source: PeerRole,
        dx_consumed: i32,
        dy_consumed: i32,
        dx_unconsumed: i32,
        dy_unconsumed: i32,
    );

    /// Offer a fling before the descendant runs it. Returns true if the
    /// ancestor took it over.
    fn propose_fling(&self, source: PeerRole, velocity_x: f32, velocity_y: f32) -> bool;

    /// Report a fling the descendant passed on. Returns true if handled.
    fn report_fling(&self, source: PeerRole, velocity_x: f32, velocity_y: f32, consumed: bool)
        -> bool;

    /// Ask the ancestor not to steal the current gesture
    fn request_disallow_intercept(&self, disallow: bool);
}
