//! Axis-Aligned Bounding Boxes
//!
//! Every actor collides as an AABB anchored at its top-left corner.
//! Overlap is strict: boxes that only share an edge do not overlap,
//! so a body resting on a platform top is not "inside" it.

use serde::{Serialize, Deserialize};

use super::vec2::Vec2;

/// Axis-aligned rectangle (top-left origin, +Y down).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    /// Top-left corner
    pub min: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Aabb {
    /// Create from top-left corner and size.
    #[inline]
    pub const fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Create from raw coordinates.
    #[inline]
    pub const fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Create centered on a point.
    #[inline]
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            min: Vec2::new(center.x - size.x * 0.5, center.y - size.y * 0.5),
            size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.min.x + self.size.x * 0.5, self.min.y + self.size.y * 0.5)
    }

    /// Strict overlap test (shared edges do not count).
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Penetration depth along Y (0 when not overlapping).
    #[inline]
    pub fn vertical_overlap(&self, other: &Aabb) -> f32 {
        if !self.overlaps(other) {
            return 0.0;
        }
        self.bottom().min(other.bottom()) - self.top().max(other.top())
    }
}

// =============================================================================
// TESTS
// =============================================================================
