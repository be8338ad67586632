//! Player State
//!
//! The player body plus everything the ability state machine and combat
//! read: facing, jump charges, the active ability, cooldowns, unlocks.

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::core::Vec2;
use crate::game::body::Body;
use crate::game::config::WorldConfig;

/// Horizontal facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1.0 for left, +1.0 for right.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Melee weapon chosen at weapon-select.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Weapon {
    #[default]
    Default = 0,
    BigSword = 1,
    Dagger = 2,
    Club = 3,
}

/// Cosmetic character picked at player-select.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharacterId(pub u8);

/// Mutually exclusive timed abilities. At most one runs at a time,
/// and any non-neutral state makes the player invincible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActiveAbility {
    #[default]
    Neutral,
    Rolling { remaining: u32 },
    Shielding { remaining: u32 },
    FireDashing { remaining: u32 },
}

impl ActiveAbility {
    fn tag(self) -> u8 {
        match self {
            ActiveAbility::Neutral => 0,
            ActiveAbility::Rolling { .. } => 1,
            ActiveAbility::Shielding { .. } => 2,
            ActiveAbility::FireDashing { .. } => 3,
        }
    }

    fn remaining(self) -> u32 {
        match self {
            ActiveAbility::Neutral => 0,
            ActiveAbility::Rolling { remaining }
            | ActiveAbility::Shielding { remaining }
            | ActiveAbility::FireDashing { remaining } => remaining,
        }
    }
}

/// Cooldown timers. Each counts down to zero independently of the
/// active ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cooldowns {
    pub roll: u32,
    pub fire_dash: u32,
    /// Shared by melee and ranged attacks.
    pub attack: u32,
}

impl Cooldowns {
    /// Decrement all timers, flooring at zero.
    pub fn tick(&mut self) {
        self.roll = self.roll.saturating_sub(1);
        self.fire_dash = self.fire_dash.saturating_sub(1);
        self.attack = self.attack.saturating_sub(1);
    }
}

/// Unlocks that survive a lost life and are cleared on game over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Unlocks {
    pub weapon: Weapon,
    pub has_ranged_attack: bool,
    pub can_double_shot: bool,
    pub quad_jump: bool,
    pub orbit_charges: u32,
}

/// State of the player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub body: Body,
    pub facing: Facing,
    pub grounded: bool,
    /// Grounded flag of the previous tick, for landing-edge detection.
    pub was_grounded: bool,
    pub jump_charges: u32,
    pub ability: ActiveAbility,
    pub cooldowns: Cooldowns,
    pub unlocks: Unlocks,
    /// Enemies already burned by the current fire dash.
    pub fire_dash_hits: Vec<u32>,
}

impl PlayerState {
    /// Create a player at a spawn point.
    pub fn new(spawn: Vec2, config: &WorldConfig) -> Self {
        Self {
            body: Body::new(spawn, config.player_size()),
            facing: Facing::Right,
            grounded: false,
            was_grounded: false,
            jump_charges: config.jump_charges_max_default,
            ability: ActiveAbility::Neutral,
            cooldowns: Cooldowns::default(),
            unlocks: Unlocks::default(),
            fire_dash_hits: Vec::new(),
        }
    }

    #[inline]
    pub fn is_rolling(&self) -> bool {
        matches!(self.ability, ActiveAbility::Rolling { .. })
    }

    #[inline]
    pub fn is_shielding(&self) -> bool {
        matches!(self.ability, ActiveAbility::Shielding { .. })
    }

    #[inline]
    pub fn is_fire_dashing(&self) -> bool {
        matches!(self.ability, ActiveAbility::FireDashing { .. })
    }

    /// Invincible exactly while an ability is active.
    #[inline]
    pub fn invincible(&self) -> bool {
        self.ability != ActiveAbility::Neutral
    }

    /// An attack was triggered and its shared cooldown is still running.
    #[inline]
    pub fn attacking(&self) -> bool {
        self.cooldowns.attack > 0
    }

    /// Maximum jump charges given current unlocks.
    #[inline]
    pub fn jump_charges_max(&self, config: &WorldConfig) -> u32 {
        config.jump_charges_max(self.unlocks.quad_jump)
    }

    /// Put the body back at `spawn` and drop every transient state.
    /// Unlocks are kept.
    pub fn respawn(&mut self, spawn: Vec2, config: &WorldConfig) {
        self.body.position = spawn;
        self.body.velocity = Vec2::ZERO;
        self.grounded = false;
        self.was_grounded = false;
        self.jump_charges = self.jump_charges_max(config);
        self.ability = ActiveAbility::Neutral;
        self.cooldowns = Cooldowns::default();
        self.fire_dash_hits.clear();
    }

    /// Hash this player's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_vec2(self.body.position);
        hasher.update_vec2(self.body.velocity);
        hasher.update_bool(self.facing == Facing::Right);
        hasher.update_bool(self.grounded);
        hasher.update_u32(self.jump_charges);
        hasher.update_u8(self.ability.tag());
        hasher.update_u32(self.ability.remaining());
        hasher.update_u32(self.cooldowns.roll);
        hasher.update_u32(self.cooldowns.fire_dash);
        hasher.update_u32(self.cooldowns.attack);
        hasher.update_u8(self.unlocks.weapon as u8);
        hasher.update_bool(self.unlocks.has_ranged_attack);
        hasher.update_bool(self.unlocks.can_double_shot);
        hasher.update_bool(self.unlocks.quad_jump);
        hasher.update_u32(self.unlocks.orbit_charges);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_is_neutral() {
        let config = WorldConfig::default();
        let player = PlayerState::new(Vec2::new(100.0, 100.0), &config);

        assert_eq!(player.ability, ActiveAbility::Neutral);
        assert!(!player.invincible());
        assert_eq!(player.jump_charges, 2);
        assert_eq!(player.body.size, Vec2::new(32.0, 32.0));
    }

    #[test]
    fn test_invincible_tracks_ability() {
        let config = WorldConfig::default();
        let mut player = PlayerState::new(Vec2::ZERO, &config);

        for ability in [
            ActiveAbility::Rolling { remaining: 3 },
            ActiveAbility::Shielding { remaining: 3 },
            ActiveAbility::FireDashing { remaining: 3 },
        ] {
            player.ability = ability;
            assert!(player.invincible());
        }
        player.ability = ActiveAbility::Neutral;
        assert!(!player.invincible());
    }

    #[test]
    fn test_cooldowns_floor_at_zero() {
        let mut cooldowns = Cooldowns { roll: 1, fire_dash: 0, attack: 2 };
        cooldowns.tick();
        cooldowns.tick();
        cooldowns.tick();
        assert_eq!(cooldowns, Cooldowns::default());
    }

    #[test]
    fn test_respawn_keeps_unlocks() {
        let config = WorldConfig::default();
        let mut player = PlayerState::new(Vec2::ZERO, &config);
        player.unlocks = Unlocks {
            weapon: Weapon::Club,
            has_ranged_attack: true,
            can_double_shot: true,
            quad_jump: true,
            orbit_charges: 3,
        };
        player.ability = ActiveAbility::Shielding { remaining: 10 };
        player.cooldowns.roll = 30;
        player.body.velocity = Vec2::new(5.0, 3.0);

        player.respawn(Vec2::new(100.0, 100.0), &config);

        assert_eq!(player.body.position, Vec2::new(100.0, 100.0));
        assert_eq!(player.body.velocity, Vec2::ZERO);
        assert_eq!(player.ability, ActiveAbility::Neutral);
        assert_eq!(player.cooldowns.roll, 0);
        assert_eq!(player.unlocks.weapon, Weapon::Club);
        assert_eq!(player.unlocks.orbit_charges, 3);
        assert_eq!(player.jump_charges, 4);
    }

    #[test]
    fn test_facing_sign() {
        assert_eq!(Facing::Left.sign(), -1.0);
        assert_eq!(Facing::Right.sign(), 1.0);
    }
}
