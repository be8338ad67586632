//! Projectiles
//!
//! Straight-line bodies with a lifetime. They ignore gravity and pass
//! through platforms; a projectile is gone once it expires, leaves the
//! playfield or resolves a hit.

use serde::{Serialize, Deserialize};

use crate::core::{Aabb, Vec2};
use crate::game::body::Body;

/// Who fired it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Player ranged blast; hits enemies.
    PlayerBlast,
    /// Shooter bolt; hits the player.
    ShooterBolt,
    /// Boss dark blast; hits the player.
    BossBlast,
}

impl ProjectileKind {
    /// Hits the player rather than enemies.
    #[inline]
    pub fn is_hostile(self) -> bool {
        !matches!(self, ProjectileKind::PlayerBlast)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub body: Body,
    pub remaining_lifetime: u32,
}

impl Projectile {
    /// Square projectile with its top-left at `position`.
    pub fn new(kind: ProjectileKind, position: Vec2, velocity: Vec2, size: f32, lifetime: u32) -> Self {
        let mut body = Body::new(position, Vec2::new(size, size));
        body.velocity = velocity;
        Self {
            kind,
            body,
            remaining_lifetime: lifetime,
        }
    }

    /// Square projectile centred on `center`.
    pub fn centered(kind: ProjectileKind, center: Vec2, velocity: Vec2, size: f32, lifetime: u32) -> Self {
        let half = size / 2.0;
        Self::new(kind, Vec2::new(center.x - half, center.y - half), velocity, size, lifetime)
    }

    /// Move one tick. Returns false once the projectile should be removed.
    pub fn advance(&mut self, world_width: f32, world_height: f32) -> bool {
        self.body.position += self.body.velocity;
        self.remaining_lifetime = self.remaining_lifetime.saturating_sub(1);

        let world = Aabb::from_xywh(0.0, 0.0, world_width, world_height);
        self.remaining_lifetime > 0 && self.body.aabb().overlaps(&world)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_in_straight_line() {
        let mut p = Projectile::new(
            ProjectileKind::PlayerBlast,
            Vec2::new(100.0, 100.0),
            Vec2::new(10.0, 0.0),
            10.0,
            60,
        );
        assert!(p.advance(800.0, 600.0));
        assert_eq!(p.body.position, Vec2::new(110.0, 100.0));
        assert_eq!(p.remaining_lifetime, 59);
    }

    #[test]
    fn test_expires() {
        let mut p = Projectile::new(ProjectileKind::ShooterBolt, Vec2::new(100.0, 100.0), Vec2::ZERO, 10.0, 2);
        assert!(p.advance(800.0, 600.0));
        assert!(!p.advance(800.0, 600.0));
    }

    #[test]
    fn test_leaves_playfield() {
        let mut p = Projectile::new(
            ProjectileKind::BossBlast,
            Vec2::new(788.0, 100.0),
            Vec2::new(6.0, 0.0),
            10.0,
            100,
        );
        assert!(p.advance(800.0, 600.0), "still partly inside");
        assert!(!p.advance(800.0, 600.0));
    }

    #[test]
    fn test_centered() {
        let p = Projectile::centered(ProjectileKind::BossBlast, Vec2::new(50.0, 50.0), Vec2::ZERO, 10.0, 1);
        assert_eq!(p.body.center(), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_hostility() {
        assert!(!ProjectileKind::PlayerBlast.is_hostile());
        assert!(ProjectileKind::ShooterBolt.is_hostile());
        assert!(ProjectileKind::BossBlast.is_hostile());
    }
}
