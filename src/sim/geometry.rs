//! Axis-aligned rectangle geometry for ball-vs-paddle tests
//!
//! Screen coordinates: origin top-left, y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle given by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.y
    }

    /// Point of the rectangle (boundary or interior) nearest to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.origin, self.origin + self.size)
    }

    /// Whether `x` lies within the horizontal span (inclusive)
    #[inline]
    pub fn spans_x(&self, x: f32) -> bool {
        x >= self.left() && x <= self.right()
    }
}

/// Circle-vs-rectangle contact
///
/// Returns the offset from the closest rectangle point to the circle center
/// when the circle touches or overlaps the rectangle. A zero offset means the
/// center is inside the rectangle.
pub fn circle_rect_contact(center: Vec2, radius: f32, rect: &Rect) -> Option<Vec2> {
    let offset = center - rect.closest_point(center);
    (offset.length_squared() <= radius * radius).then_some(offset)
}
