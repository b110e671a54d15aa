//! Screen-space geometry used for hit testing nested scroll regions.

/// A point in logical pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounds in logical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in logical pixels.
    pub width: f32,
    /// Height in logical pixels.
    pub height: f32,
}

impl Rect {
    /// Create a new set of bounds.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Same bounds moved by (`dx`, `dy`)
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Inclusive containment: points on any edge are inside.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let rect = Rect::new(0.0, 100.0, 400.0, 300.0);
        assert!(rect.contains(Point::new(0.0, 100.0)));
        assert!(rect.contains(Point::new(400.0, 400.0)));
        assert!(!rect.contains(Point::new(200.0, 401.0)));
        assert!(!rect.contains(Point::new(-1.0, 200.0)));
    }

    #[test]
    fn test_rect_translate() {
        let rect = Rect::new(0.0, 100.0, 400.0, 300.0).translate(0.0, -50.0);
        assert_eq!(rect.y, 50.0);
        assert_eq!(rect.bottom(), 350.0);
    }
}
