//! Kinematic Bodies and Platforms
//!
//! A `Body` is position + velocity + size; every actor owns one.
//! Platforms are bodies with an explicit kind discriminant.

use serde::{Serialize, Deserialize};

use crate::core::{Aabb, Vec2};

/// Position, velocity and size of an actor. Position is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
}

impl Body {
    /// Create a body at rest.
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
        }
    }

    /// Current bounding box.
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.position, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.aabb().center()
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.position.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.position.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    #[inline]
    pub fn set_left(&mut self, x: f32) {
        self.position.x = x;
    }

    #[inline]
    pub fn set_right(&mut self, x: f32) {
        self.position.x = x - self.size.x;
    }

    #[inline]
    pub fn set_top(&mut self, y: f32) {
        self.position.y = y;
    }

    #[inline]
    pub fn set_bottom(&mut self, y: f32) {
        self.position.y = y - self.size.y;
    }

    /// Overlap test against another body.
    #[inline]
    pub fn overlaps(&self, other: &Body) -> bool {
        self.aabb().overlaps(&other.aabb())
    }
}

// =============================================================================
// PLATFORMS
// =============================================================================

/// Platform discriminant, checked once during collision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlatformKind {
    /// Never moves.
    Static,
    /// Shuttles horizontally between two x bounds.
    Moving {
        patrol_min_x: f32,
        patrol_max_x: f32,
        speed: f32,
    },
}

/// A solid surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub body: Body,
    pub kind: PlatformKind,
    /// Horizontal displacement applied by the last `advance`.
    /// Passengers are carried by exactly this amount.
    pub last_shift: f32,
}

impl Platform {
    /// Create a static platform.
    pub fn new_static(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            body: Body::new(Vec2::new(x, y), Vec2::new(width, height)),
            kind: PlatformKind::Static,
            last_shift: 0.0,
        }
    }

    /// Create a moving platform. A negative `speed` starts it moving left.
    pub fn new_moving(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        patrol_min_x: f32,
        patrol_max_x: f32,
        speed: f32,
    ) -> Self {
        let mut body = Body::new(Vec2::new(x, y), Vec2::new(width, height));
        body.velocity.x = speed;
        Self {
            body,
            kind: PlatformKind::Moving {
                patrol_min_x,
                patrol_max_x,
                speed: speed.abs(),
            },
            last_shift: 0.0,
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.body.aabb()
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        matches!(self.kind, PlatformKind::Moving { .. })
    }

    /// Advance one tick. Static platforms do nothing.
    ///
    /// The velocity sign flips on the tick the leading edge reaches its bound.
    pub fn advance(&mut self) {
        let PlatformKind::Moving { patrol_min_x, patrol_max_x, speed } = self.kind else {
            self.last_shift = 0.0;
            return;
        };

        let dx = self.body.velocity.x;
        self.body.position.x += dx;
        self.last_shift = dx;

        if dx > 0.0 && self.body.right() >= patrol_max_x {
            self.body.velocity.x = -speed;
        } else if dx < 0.0 && self.body.left() <= patrol_min_x {
            self.body.velocity.x = speed;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
