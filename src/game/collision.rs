//! Collision Resolution
//!
//! Axis-separated resolution of a body against platform AABBs.
//! Order per tick: gravity, vertical move, vertical resolve, horizontal move,
//! horizontal resolve, world clamp. Resolving vertical first is what lets a
//! body land on a corner instead of snagging on it.

use crate::core::Aabb;
use crate::game::body::{Body, Platform};

/// Result of a vertical pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VerticalContact {
    /// Landed on a platform top this tick.
    pub grounded: bool,
    /// Hit a platform underside this tick.
    pub head_bump: bool,
    /// Horizontal distance carried by a moving platform.
    pub carried: f32,
}

/// Add gravity to vertical velocity, clamped to the terminal fall speed.
#[inline]
pub fn apply_gravity(body: &mut Body, gravity: f32, max_fall_speed: f32) {
    body.velocity.y = (body.velocity.y + gravity).min(max_fall_speed);
}

/// Apply vertical displacement, then resolve against platforms.
///
/// Landing requires moving down with the body's bottom at or above the
/// platform's bottom; a moving platform carries its passenger by the
/// distance it travelled this tick. Head bumps require moving up with the
/// body's top at or below the platform's top.
pub fn move_vertical(body: &mut Body, platforms: &[Platform]) -> VerticalContact {
    body.position.y += body.velocity.y;

    let mut contact = VerticalContact::default();

    for platform in platforms {
        let rect = platform.aabb();
        if !body.aabb().overlaps(&rect) {
            continue;
        }

        if body.velocity.y > 0.0 && body.bottom() <= rect.bottom() {
            body.set_bottom(rect.top());
            body.velocity.y = 0.0;
            contact.grounded = true;
            if platform.is_moving() {
                body.position.x += platform.last_shift;
                contact.carried += platform.last_shift;
            }
        } else if body.velocity.y < 0.0 && body.top() >= rect.top() {
            body.set_top(rect.bottom());
            body.velocity.y = 0.0;
            contact.head_bump = true;
        }
    }

    contact
}

/// Apply horizontal displacement, then clamp the leading edge against
/// any overlapping platform. Velocity is left alone.
pub fn move_horizontal(body: &mut Body, platforms: &[Platform]) {
    body.position.x += body.velocity.x;

    for platform in platforms {
        let rect = platform.aabb();
        if !body.aabb().overlaps(&rect) {
            continue;
        }

        if body.velocity.x > 0.0 {
            body.set_right(rect.left());
        } else if body.velocity.x < 0.0 {
            body.set_left(rect.right());
        }
    }
}

/// Clamp horizontal position into `[0, world_width - body_width]`.
#[inline]
pub fn clamp_to_world(body: &mut Body, world_width: f32) {
    let max_x = (world_width - body.size.x).max(0.0);
    body.position.x = body.position.x.min(max_x).max(0.0);
}

/// True once the body's top has dropped past the world's lower bound.
#[inline]
pub fn fell_out_of_world(body: &Body, world_height: f32) -> bool {
    body.top() > world_height
}

/// Full integration step for a platform-colliding body.
pub fn integrate(
    body: &mut Body,
    platforms: &[Platform],
    gravity: f32,
    max_fall_speed: f32,
    world_width: f32,
) -> VerticalContact {
    apply_gravity(body, gravity, max_fall_speed);
    let contact = move_vertical(body, platforms);
    move_horizontal(body, platforms);
    clamp_to_world(body, world_width);
    contact
}

/// Shove `body` sideways until its edge meets `from`'s, on the side of
/// its centre, then clamp to the world. If the wall leaves it overlapping,
/// it goes to the other side. Returns the side taken: `1.0` right of
/// `from`, `-1.0` left.
pub fn push_apart(body: &mut Body, from: &Body, world_width: f32) -> f32 {
    let first = if body.center().x < from.center().x { -1.0 } else { 1.0 };

    for side in [first, -first] {
        if side > 0.0 {
            body.set_left(from.right());
        } else {
            body.set_right(from.left());
        }
        clamp_to_world(body, world_width);
        if !body.overlaps(from) {
            return side;
        }
    }
    first
}

/// Edge-walk sensor: is there ground just past the leading edge at foot level?
///
/// `direction` is the sign of horizontal travel; `probe` is the sensor size.
pub fn ground_ahead(body: &Body, direction: f32, probe: f32, platforms: &[Platform]) -> bool {
    let sensor_x = if direction > 0.0 {
        body.right()
    } else {
        body.left() - probe
    };
    let sensor = Aabb::from_xywh(sensor_x, body.bottom(), probe, probe);

    platforms.iter().any(|p| sensor.overlaps(&p.aabb()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vec2;
    use proptest::prelude::*;

    fn player_at(x: f32, y: f32) -> Body {
        Body::new(Vec2::new(x, y), Vec2::new(32.0, 32.0))
    }

    fn floor() -> Platform {
        Platform::new_static(0.0, 580.0, 800.0, 20.0)
    }

    #[test]
    fn test_gravity_integrates_before_snap() {
        let mut body = player_at(100.0, 100.0);
        let contact = integrate(&mut body, &[floor()], 0.5, 15.0, 800.0);

        assert_eq!(body.velocity.y, 0.5);
        assert_eq!(body.position.y, 100.5);
        assert!(!contact.grounded);
    }

    #[test]
    fn test_gravity_clamped_to_max_fall() {
        let mut body = player_at(0.0, 0.0);
        body.velocity.y = 14.8;
        apply_gravity(&mut body, 0.5, 15.0);
        assert_eq!(body.velocity.y, 15.0);
    }

    #[test]
    fn test_landing_snaps_to_top() {
        let mut body = player_at(100.0, 540.0);
        body.velocity.y = 10.0;
        let contact = move_vertical(&mut body, &[floor()]);

        assert!(contact.grounded);
        assert_eq!(body.bottom(), 580.0);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_resting_body_stays_grounded() {
        let mut body = player_at(100.0, 548.0);
        for _ in 0..5 {
            let contact = integrate(&mut body, &[floor()], 0.5, 15.0, 800.0);
            assert!(contact.grounded);
            assert_eq!(body.bottom(), 580.0);
        }
    }

    #[test]
    fn test_head_bump() {
        let ceiling = Platform::new_static(0.0, 200.0, 800.0, 20.0);
        let mut body = player_at(100.0, 225.0);
        body.velocity.y = -10.0;
        let contact = move_vertical(&mut body, &[ceiling]);

        assert!(contact.head_bump);
        assert_eq!(body.top(), 220.0);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_passenger_carried_by_moving_platform() {
        let mut platform = Platform::new_moving(100.0, 400.0, 100.0, 20.0, 0.0, 700.0, 2.0);
        platform.advance();

        let mut body = player_at(120.0, 368.0);
        let contact = integrate(&mut body, &[platform], 0.5, 15.0, 800.0);

        assert!(contact.grounded);
        assert_eq!(contact.carried, 2.0);
        assert_eq!(body.left(), 122.0);
    }

    #[test]
    fn test_static_platform_does_not_carry() {
        let mut body = player_at(120.0, 548.0);
        let contact = integrate(&mut body, &[floor()], 0.5, 15.0, 800.0);
        assert_eq!(contact.carried, 0.0);
        assert_eq!(body.left(), 120.0);
    }

    #[test]
    fn test_horizontal_block_keeps_velocity() {
        let wall = Platform::new_static(200.0, 0.0, 20.0, 600.0);
        let mut body = player_at(165.0, 100.0);
        body.velocity.x = 5.0;
        move_horizontal(&mut body, &[wall.clone()]);

        assert_eq!(body.right(), 200.0);
        assert_eq!(body.velocity.x, 5.0, "velocity is not zeroed");

        let mut body = player_at(222.0, 100.0);
        body.velocity.x = -5.0;
        move_horizontal(&mut body, &[wall]);
        assert_eq!(body.left(), 220.0);
    }

    #[test]
    fn test_clamp_to_world() {
        let mut body = player_at(-10.0, 0.0);
        clamp_to_world(&mut body, 800.0);
        assert_eq!(body.left(), 0.0);

        let mut body = player_at(790.0, 0.0);
        clamp_to_world(&mut body, 800.0);
        assert_eq!(body.right(), 800.0);
    }

    #[test]
    fn test_fall_out_of_world() {
        assert!(!fell_out_of_world(&player_at(0.0, 600.0), 600.0));
        assert!(fell_out_of_world(&player_at(0.0, 600.5), 600.0));
    }

    #[test]
    fn test_push_apart_clears_overlap() {
        let player = player_at(100.0, 100.0);

        let mut enemy = Body::new(Vec2::new(110.0, 90.0), Vec2::new(40.0, 50.0));
        assert_eq!(push_apart(&mut enemy, &player, 800.0), 1.0);
        assert_eq!(enemy.left(), player.right());
        assert!(!enemy.overlaps(&player));

        let mut enemy = Body::new(Vec2::new(80.0, 90.0), Vec2::new(40.0, 50.0));
        assert_eq!(push_apart(&mut enemy, &player, 800.0), -1.0);
        assert_eq!(enemy.right(), player.left());
        assert_eq!(enemy.position.y, 90.0, "vertical position untouched");
    }

    #[test]
    fn test_push_apart_against_world_edge() {
        let player = player_at(10.0, 100.0);
        let mut enemy = Body::new(Vec2::new(0.0, 90.0), Vec2::new(40.0, 50.0));

        // No room on the left: goes right instead
        assert_eq!(push_apart(&mut enemy, &player, 800.0), 1.0);
        assert_eq!(enemy.left(), player.right());
        assert!(!enemy.overlaps(&player));
    }

    #[test]
    fn test_ground_ahead() {
        let ledge = Platform::new_static(100.0, 300.0, 100.0, 20.0);
        let mut body = Body::new(Vec2::new(150.0, 250.0), Vec2::new(40.0, 50.0));

        assert!(ground_ahead(&body, 1.0, 5.0, &[ledge.clone()]));
        assert!(ground_ahead(&body, -1.0, 5.0, &[ledge.clone()]));

        // Right edge flush with the ledge's right edge
        body.set_right(200.0);
        assert!(!ground_ahead(&body, 1.0, 5.0, &[ledge.clone()]));
        assert!(ground_ahead(&body, -1.0, 5.0, &[ledge]));
    }

    proptest! {
        #[test]
        fn prop_no_vertical_penetration_after_landing(
            x in 0.0f32..768.0,
            gap in 0.0f32..40.0,
            vy in 0.0f32..15.0,
        ) {
            let platform = floor();
            let mut body = player_at(x, 580.0 - 32.0 - gap);
            body.velocity.y = vy;
            move_vertical(&mut body, &[platform.clone()]);

            prop_assert!(body.aabb().vertical_overlap(&platform.aabb()) <= 1e-3);
        }

        #[test]
        fn prop_clamp_keeps_body_in_world(x in -1000.0f32..2000.0) {
            let mut body = player_at(x, 0.0);
            clamp_to_world(&mut body, 800.0);
            prop_assert!(body.left() >= 0.0);
            prop_assert!(body.right() <= 800.0);
        }
    }
}
