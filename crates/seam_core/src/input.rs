//! Touch input handling
//!
//! Platform-neutral touch events as delivered to scroll containers. Hosts
//! convert their native motion events into [`TouchEvent`] before dispatch.

use smallvec::SmallVec;

/// Touch pointer state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPointer {
    /// Pointer ID (for multi-touch)
    pub id: i32,
    /// X coordinate relative to the receiving container
    pub x: f32,
    /// Y coordinate relative to the receiving container
    pub y: f32,
    /// X coordinate in screen space
    pub screen_x: f32,
    /// Y coordinate in screen space
    pub screen_y: f32,
}

impl TouchPointer {
    /// Create a pointer whose local and screen coordinates coincide
    pub fn new(id: i32, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            screen_x: x,
            screen_y: y,
        }
    }
}

/// Touch event phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TouchPhase {
    /// A new touch started
    Down,
    /// Touch position changed
    Move,
    /// Touch ended
    Up,
    /// Touch cancelled (e.g., system gesture or parent interception)
    Cancel,
}

impl TouchPhase {
    /// Up and cancel both terminate a gesture
    pub fn is_terminal(&self) -> bool {
        matches!(self, TouchPhase::Up | TouchPhase::Cancel)
    }
}

/// A touch event with every pointer currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub pointers: SmallVec<[TouchPointer; 2]>,
    /// Event time in milliseconds
    pub time_ms: u64,
}

impl TouchEvent {
    /// Create a single-pointer event
    pub fn new(phase: TouchPhase, x: f32, y: f32, time_ms: u64) -> Self {
        let mut pointers = SmallVec::new();
        pointers.push(TouchPointer::new(0, x, y));
        Self {
            phase,
            pointers,
            time_ms,
        }
    }

    pub fn down(x: f32, y: f32, time_ms: u64) -> Self {
        Self::new(TouchPhase::Down, x, y, time_ms)
    }

    pub fn moved(x: f32, y: f32, time_ms: u64) -> Self {
        Self::new(TouchPhase::Move, x, y, time_ms)
    }

    pub fn up(x: f32, y: f32, time_ms: u64) -> Self {
        Self::new(TouchPhase::Up, x, y, time_ms)
    }

    pub fn cancel(x: f32, y: f32, time_ms: u64) -> Self {
        Self::new(TouchPhase::Cancel, x, y, time_ms)
    }

    /// Add another pointer to the event (makes it a multi-touch event)
    pub fn with_pointer(mut self, pointer: TouchPointer) -> Self {
        self.pointers.push(pointer);
        self
    }

    /// Place the event in screen space by offsetting the screen coordinates
    /// of every pointer by the receiving container's screen origin.
    pub fn with_screen_origin(mut self, origin_x: f32, origin_y: f32) -> Self {
        for pointer in self.pointers.iter_mut() {
            pointer.screen_x = pointer.x + origin_x;
            pointer.screen_y = pointer.y + origin_y;
        }
        self
    }

    /// Re-express local coordinates relative to a child placed at
    /// (`left`, `top`) inside the current receiver. Screen coordinates are
    /// left untouched.
    pub fn relative_to(&self, left: f32, top: f32) -> Self {
        let mut event = self.clone();
        for pointer in event.pointers.iter_mut() {
            pointer.x -= left;
            pointer.y -= top;
        }
        event
    }

    /// Copy of this event with a different phase
    pub fn with_phase(&self, phase: TouchPhase) -> Self {
        let mut event = self.clone();
        event.phase = phase;
        event
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// More than one pointer is down
    pub fn is_multi_touch(&self) -> bool {
        self.pointers.len() > 1
    }

    /// The first pointer of the event
    pub fn primary(&self) -> Option<&TouchPointer> {
        self.pointers.first()
    }

    /// Local Y of the primary pointer, in whole pixels
    pub fn y(&self) -> i32 {
        self.primary().map(|p| p.y as i32).unwrap_or(0)
    }

    /// Screen X of the primary pointer, in whole pixels
    pub fn screen_x(&self) -> i32 {
        self.primary().map(|p| p.screen_x as i32).unwrap_or(0)
    }

    /// Screen Y of the primary pointer, in whole pixels
    pub fn screen_y(&self) -> i32 {
        self.primary().map(|p| p.screen_y as i32).unwrap_or(0)
    }
}

/// Detects when a drag has travelled further than the touch slop
///
/// Distance is measured from an anchor set at pointer-down. The anchor can be
/// rebased once a drag is recognised so later checks measure from there.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragDetector {
    anchor: Option<i32>,
    slop: i32,
}

impl DragDetector {
    pub fn new(slop: i32) -> Self {
        Self { anchor: None, slop }
    }

    /// Start measuring from `y`
    pub fn begin(&mut self, y: i32) {
        self.anchor = Some(y);
    }

    /// Move the anchor to `y`
    pub fn rebase(&mut self, y: i32) {
        self.anchor = Some(y);
    }

    pub fn reset(&mut self) {
        self.anchor = None;
    }

    /// Distance travelled from the anchor
    pub fn distance(&self, y: i32) -> i32 {
        self.anchor.map(|anchor| (y - anchor).abs()).unwrap_or(0)
    }

    /// Whether the pointer at `y` has moved strictly beyond the slop
    pub fn exceeded(&self, y: i32) -> bool {
        self.anchor.is_some() && self.distance(y) > self.slop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_touch_detection() {
        let single = TouchEvent::down(10.0, 20.0, 0);
        assert_eq!(single.pointer_count(), 1);
        assert!(!single.is_multi_touch());

        let double = single.with_pointer(TouchPointer::new(1, 50.0, 60.0));
        assert_eq!(double.pointer_count(), 2);
        assert!(double.is_multi_touch());
    }

    #[test]
    fn test_screen_origin_and_child_space() {
        let event = TouchEvent::moved(10.0, 120.0, 16).with_screen_origin(0.0, 80.0);
        assert_eq!(event.screen_y(), 200);

        let child = event.relative_to(0.0, 100.0);
        assert_eq!(child.y(), 20);
        assert_eq!(child.screen_y(), 200, "screen space must not change");
    }

    #[test]
    fn test_drag_detector_slop() {
        let mut detector = DragDetector::new(8);
        assert!(!detector.exceeded(100), "no anchor yet");

        detector.begin(100);
        assert!(!detector.exceeded(108));
        assert!(detector.exceeded(109));
        assert!(detector.exceeded(91));

        detector.rebase(200);
        assert_eq!(detector.distance(190), 10);

        detector.reset();
        assert!(!detector.exceeded(500));
    }
}
