//! Coins and Power-Ups
//!
//! Both are consumed exactly once on overlap with the player and removed
//! in the same tick.

use serde::{Serialize, Deserialize};

use crate::core::{Aabb, Vec2};
use crate::game::config::WorldConfig;
use crate::game::orbit::OrbitRing;
use crate::game::player::PlayerState;

/// A collectable coin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub position: Vec2,
    pub size: f32,
}

impl Coin {
    pub fn new(position: Vec2, size: f32) -> Self {
        Self { position, size }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.position, Vec2::new(self.size, self.size))
    }
}

/// Power-up effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PowerUpKind {
    /// Ranged blasts fire two projectiles.
    DoubleBlast = 0,
    /// Refill orbit charges to the maximum.
    OrbitShield = 1,
    /// Four jump charges from the next landing on.
    QuadJump = 2,
    /// One extra life.
    ExtraLife = 3,
}

/// A power-up lying in the level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub position: Vec2,
    pub size: f32,
    pub consumed: bool,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, position: Vec2, size: f32) -> Self {
        Self {
            kind,
            position,
            size,
            consumed: false,
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.position, Vec2::new(self.size, self.size))
    }
}

/// Apply a power-up to the player. Unlocks persist until game over.
///
/// Quad jump only raises the maximum; current charges refill on the next
/// landing edge like any other.
pub fn apply_power_up(
    kind: PowerUpKind,
    player: &mut PlayerState,
    orbit: &mut OrbitRing,
    lives: &mut u32,
    config: &WorldConfig,
) {
    match kind {
        PowerUpKind::DoubleBlast => player.unlocks.can_double_shot = true,
        PowerUpKind::OrbitShield => {
            player.unlocks.orbit_charges = config.orbit_max_charges;
            orbit.sync(player.unlocks.orbit_charges, player.body.center(), config.orbit_radius);
        }
        PowerUpKind::QuadJump => player.unlocks.quad_jump = true,
        PowerUpKind::ExtraLife => *lives = lives.saturating_add(1),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (PlayerState, OrbitRing, u32, WorldConfig) {
        let config = WorldConfig::default();
        let player = PlayerState::new(Vec2::new(100.0, 100.0), &config);
        (player, OrbitRing::new(), 3, config)
    }

    #[test]
    fn test_orbit_shield_fills_and_syncs() {
        let (mut player, mut orbit, mut lives, config) = setup();
        player.unlocks.orbit_charges = 1;
        apply_power_up(PowerUpKind::OrbitShield, &mut player, &mut orbit, &mut lives, &config);
        assert_eq!(player.unlocks.orbit_charges, 5);
        assert_eq!(orbit.len(), 5);
    }

    #[test]
    fn test_quad_jump_waits_for_landing() {
        let (mut player, mut orbit, mut lives, config) = setup();
        player.jump_charges = 1;
        apply_power_up(PowerUpKind::QuadJump, &mut player, &mut orbit, &mut lives, &config);
        assert!(player.unlocks.quad_jump);
        assert_eq!(player.jump_charges, 1);
        assert_eq!(player.jump_charges_max(&config), 4);
    }

    #[test]
    fn test_extra_life_and_double_blast() {
        let (mut player, mut orbit, mut lives, config) = setup();
        apply_power_up(PowerUpKind::ExtraLife, &mut player, &mut orbit, &mut lives, &config);
        apply_power_up(PowerUpKind::DoubleBlast, &mut player, &mut orbit, &mut lives, &config);
        assert_eq!(lives, 4);
        assert!(player.unlocks.can_double_shot);
    }

    #[test]
    fn test_coin_aabb() {
        let coin = Coin::new(Vec2::new(10.0, 20.0), 30.0);
        assert_eq!(coin.aabb().right(), 40.0);
        assert_eq!(coin.aabb().bottom(), 50.0);
    }
}
