//! World Configuration
//!
//! Every tunable the simulation reads. Loaded from JSON, defaulted per field,
//! and validated once at session setup so nothing malformed reaches a tick.

use std::path::Path;

use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::game::enemy::EnemyKind;
use crate::game::player::Weapon;

/// Upper bound for orbit charges.
pub const ORBIT_CHARGE_CAP: u32 = 5;

/// Configuration errors, surfaced to the caller of session setup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// World dimensions must be positive.
    #[error("world size must be positive, got {width}x{height}")]
    InvalidWorldSize { width: f32, height: f32 },

    /// A value that must be strictly positive was not.
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    /// A tick duration was zero.
    #[error("{field} must be at least one tick")]
    ZeroDuration { field: &'static str },

    /// Jump impulse must point up the screen (negative Y).
    #[error("jump_impulse must be negative (upward), got {0}")]
    JumpImpulseNotUpward(f32),

    /// Jump charge counts are inconsistent.
    #[error("jump charges invalid: default {default}, quad {quad}")]
    InvalidJumpCharges { default: u32, quad: u32 },

    /// Orbit charges above the supported cap.
    #[error("orbit_max_charges {0} exceeds cap of {max}", max = ORBIT_CHARGE_CAP)]
    TooManyOrbitCharges(u32),

    /// Boss float band is inverted.
    #[error("boss band top {top} is below band bottom {bottom}")]
    InvertedBossBand { top: f32, bottom: f32 },

    /// Coin drop range is negative or inverted.
    #[error("coin drop range [{min}, {max}] is invalid")]
    InvalidCoinDrop { min: i32, max: i32 },

    /// Could not parse a configuration document.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Could not read a configuration file.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// WEAPONS
// =============================================================================

/// Melee profile of one weapon.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    /// Width of the slash hitbox in front of the player.
    pub attack_range: f32,
    /// Base melee damage multiplier.
    pub damage_multiplier: i32,
    /// Multiplier applied on a back attack (dagger only in the defaults).
    pub back_attack_multiplier: i32,
    /// Horizontal shove applied to the defender after a hit.
    pub knockback_distance: f32,
}

/// Melee profiles for every weapon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTable {
    pub default: WeaponProfile,
    pub big_sword: WeaponProfile,
    pub dagger: WeaponProfile,
    pub club: WeaponProfile,
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self {
            default: WeaponProfile {
                attack_range: 40.0,
                damage_multiplier: 1,
                back_attack_multiplier: 1,
                knockback_distance: 0.0,
            },
            big_sword: WeaponProfile {
                attack_range: 70.0,
                damage_multiplier: 2,
                back_attack_multiplier: 1,
                knockback_distance: 0.0,
            },
            dagger: WeaponProfile {
                attack_range: 28.0,
                damage_multiplier: 1,
                back_attack_multiplier: 3,
                knockback_distance: 0.0,
            },
            club: WeaponProfile {
                attack_range: 45.0,
                damage_multiplier: 1,
                back_attack_multiplier: 1,
                knockback_distance: 60.0,
            },
        }
    }
}

impl WeaponTable {
    /// Profile for a weapon.
    pub fn profile(&self, weapon: Weapon) -> &WeaponProfile {
        match weapon {
            Weapon::Default => &self.default,
            Weapon::BigSword => &self.big_sword,
            Weapon::Dagger => &self.dagger,
            Weapon::Club => &self.club,
        }
    }
}

// =============================================================================
// ENEMIES
// =============================================================================

/// Per-archetype enemy tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub width: f32,
    pub height: f32,
    pub walker_speed: f32,
    pub guard_speed: f32,
    pub guard_health: i32,
    pub shooter_speed: f32,
    /// Ticks between Shooter bolts.
    pub shooter_fire_interval: u32,
    pub shooter_bolt_speed: f32,
    pub flyer_speed: f32,
    pub flyer_amplitude: f32,
    /// Radians advanced per tick.
    pub flyer_angular_speed: f32,
    pub boss_width: f32,
    pub boss_height: f32,
    pub boss_health: i32,
    pub boss_speed: f32,
    /// Fraction of world gravity the boss feels.
    pub boss_gravity_scale: f32,
    /// Preferred vertical band for the boss's top edge.
    pub boss_band_top: f32,
    pub boss_band_bottom: f32,
    /// Vertical velocity nudge per tick when outside the band.
    pub boss_band_nudge: f32,
    pub boss_fire_interval: u32,
    pub boss_blast_speed: f32,
    /// Width of the edge-walk sensor.
    pub edge_probe: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 50.0,
            walker_speed: 2.0,
            guard_speed: 1.0,
            guard_health: 3,
            shooter_speed: 1.5,
            shooter_fire_interval: 120,
            shooter_bolt_speed: 5.0,
            flyer_speed: 2.0,
            flyer_amplitude: 40.0,
            flyer_angular_speed: 0.05,
            boss_width: 96.0,
            boss_height: 96.0,
            boss_health: 100,
            boss_speed: 2.0,
            boss_gravity_scale: 0.2,
            boss_band_top: 80.0,
            boss_band_bottom: 260.0,
            boss_band_nudge: 0.3,
            boss_fire_interval: 90,
            boss_blast_speed: 6.0,
            edge_probe: 5.0,
        }
    }
}

impl EnemyTuning {
    /// Patrol speed for an archetype.
    pub fn speed(&self, kind: EnemyKind) -> f32 {
        match kind {
            EnemyKind::Walker => self.walker_speed,
            EnemyKind::Guard => self.guard_speed,
            EnemyKind::Shooter => self.shooter_speed,
            EnemyKind::Flyer => self.flyer_speed,
            EnemyKind::Boss => self.boss_speed,
        }
    }

    /// Starting health for an archetype.
    pub fn health(&self, kind: EnemyKind) -> i32 {
        match kind {
            EnemyKind::Guard => self.guard_health,
            EnemyKind::Boss => self.boss_health,
            _ => 1,
        }
    }
}

// =============================================================================
// SCORING
// =============================================================================

/// Points and damage values that feed the score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub coin_value: u32,
    pub walker_award: u32,
    pub guard_award: u32,
    pub shooter_award: u32,
    pub flyer_award: u32,
    pub boss_award: u32,
    /// Coins dropped by a defeated enemy: [min, max].
    pub drop_coins_min: i32,
    pub drop_coins_max: i32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            coin_value: 1,
            walker_award: 5,
            guard_award: 15,
            shooter_award: 10,
            flyer_award: 10,
            boss_award: 100,
            drop_coins_min: 1,
            drop_coins_max: 3,
        }
    }
}

impl ScoringConfig {
    /// Defeat award for an archetype.
    pub fn award(&self, kind: EnemyKind) -> u32 {
        match kind {
            EnemyKind::Walker => self.walker_award,
            EnemyKind::Guard => self.guard_award,
            EnemyKind::Shooter => self.shooter_award,
            EnemyKind::Flyer => self.flyer_award,
            EnemyKind::Boss => self.boss_award,
        }
    }
}

// =============================================================================
// WORLD CONFIG
// =============================================================================

/// Complete simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    // World
    pub world_width: f32,
    pub world_height: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub coin_size: f32,
    pub power_up_size: f32,
    pub starting_lives: u32,
    /// First level index at which the ranged blast unlocks.
    pub ranged_unlock_level: u32,

    // Physics
    pub gravity: f32,
    pub max_fall_speed: f32,
    /// Vertical velocity set by a jump (negative is up).
    pub jump_impulse: f32,
    pub move_speed: f32,
    pub jump_charges_max_default: u32,
    pub jump_charges_max_quad: u32,
    /// Fraction of the jump impulse used for a stomp bounce.
    pub stomp_bounce_factor: f32,

    // Abilities (durations and cooldowns in ticks)
    pub roll_duration: u32,
    pub roll_cooldown: u32,
    pub roll_speed_multiplier: f32,
    pub fire_dash_duration: u32,
    pub fire_dash_cooldown: u32,
    pub fire_dash_speed_multiplier: f32,
    pub fire_dash_damage_multiplier: i32,
    pub shield_duration: u32,
    pub attack_cooldown: u32,
    pub orbit_max_charges: u32,
    pub orbit_radius: f32,
    /// Radians per tick.
    pub orbit_angular_speed: f32,

    // Projectiles
    pub blast_speed: f32,
    pub blast_lifetime: u32,
    pub projectile_size: f32,
    /// Vertical gap between the two projectiles of a double shot.
    pub double_shot_spacing: f32,
    pub enemy_projectile_lifetime: u32,

    // Damage against the boss
    pub boss_melee_multiplier: i32,
    pub boss_blast_damage: i32,

    pub weapons: WeaponTable,
    pub enemies: EnemyTuning,
    pub scoring: ScoringConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_width: 800.0,
            world_height: 600.0,
            player_width: 32.0,
            player_height: 32.0,
            coin_size: 30.0,
            power_up_size: 24.0,
            starting_lives: 3,
            ranged_unlock_level: 1,

            gravity: 0.5,
            max_fall_speed: 15.0,
            jump_impulse: -10.0,
            move_speed: 5.0,
            jump_charges_max_default: 2,
            jump_charges_max_quad: 4,
            stomp_bounce_factor: 0.7,

            roll_duration: 15,
            roll_cooldown: 45,
            roll_speed_multiplier: 2.0,
            fire_dash_duration: 20,
            fire_dash_cooldown: 120,
            fire_dash_speed_multiplier: 3.0,
            fire_dash_damage_multiplier: 10,
            shield_duration: 60,
            attack_cooldown: 20,
            orbit_max_charges: ORBIT_CHARGE_CAP,
            orbit_radius: 40.0,
            orbit_angular_speed: 0.08,

            blast_speed: 10.0,
            blast_lifetime: 60,
            projectile_size: 10.0,
            double_shot_spacing: 12.0,
            enemy_projectile_lifetime: 180,

            boss_melee_multiplier: 5,
            boss_blast_damage: 3,

            weapons: WeaponTable::default(),
            enemies: EnemyTuning::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Parse from a JSON document, then validate.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file, then validate.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Player hitbox size.
    pub fn player_size(&self) -> crate::core::Vec2 {
        crate::core::Vec2::new(self.player_width, self.player_height)
    }

    /// Jump charges for the current quad-jump unlock state.
    pub fn jump_charges_max(&self, quad_jump: bool) -> u32 {
        if quad_jump {
            self.jump_charges_max_quad
        } else {
            self.jump_charges_max_default
        }
    }

    /// Reject configurations that would misbehave mid-tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let result = self.check();
        if let Err(err) = &result {
            warn!(%err, "rejected world configuration");
        }
        result
    }

    fn check(&self) -> Result<(), ConfigError> {
        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            return Err(ConfigError::InvalidWorldSize {
                width: self.world_width,
                height: self.world_height,
            });
        }

        let positives: [(&'static str, f32); 17] = [
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("coin_size", self.coin_size),
            ("power_up_size", self.power_up_size),
            ("gravity", self.gravity),
            ("max_fall_speed", self.max_fall_speed),
            ("move_speed", self.move_speed),
            ("roll_speed_multiplier", self.roll_speed_multiplier),
            ("fire_dash_speed_multiplier", self.fire_dash_speed_multiplier),
            ("fire_dash_damage_multiplier", self.fire_dash_damage_multiplier as f32),
            ("orbit_radius", self.orbit_radius),
            ("blast_speed", self.blast_speed),
            ("projectile_size", self.projectile_size),
            ("boss_melee_multiplier", self.boss_melee_multiplier as f32),
            ("boss_blast_damage", self.boss_blast_damage as f32),
            ("enemy width", self.enemies.width),
            ("enemy height", self.enemies.height),
        ];
        for (field, value) in positives {
            // NaN fails this comparison too
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let enemy_positives: [(&'static str, f32); 8] = [
            ("walker_speed", self.enemies.walker_speed),
            ("guard_speed", self.enemies.guard_speed),
            ("guard_health", self.enemies.guard_health as f32),
            ("shooter_speed", self.enemies.shooter_speed),
            ("flyer_speed", self.enemies.flyer_speed),
            ("boss_speed", self.enemies.boss_speed),
            ("boss_health", self.enemies.boss_health as f32),
            ("edge_probe", self.enemies.edge_probe),
        ];
        for (field, value) in enemy_positives {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        for profile in [
            &self.weapons.default,
            &self.weapons.big_sword,
            &self.weapons.dagger,
            &self.weapons.club,
        ] {
            if !(profile.attack_range > 0.0) {
                return Err(ConfigError::NotPositive {
                    field: "attack_range",
                    value: profile.attack_range,
                });
            }
            if profile.damage_multiplier <= 0 || profile.back_attack_multiplier <= 0 {
                return Err(ConfigError::NotPositive {
                    field: "damage_multiplier",
                    value: profile.damage_multiplier.min(profile.back_attack_multiplier) as f32,
                });
            }
        }

        let durations: [(&'static str, u32); 8] = [
            ("roll_duration", self.roll_duration),
            ("fire_dash_duration", self.fire_dash_duration),
            ("shield_duration", self.shield_duration),
            ("attack_cooldown", self.attack_cooldown),
            ("blast_lifetime", self.blast_lifetime),
            ("enemy_projectile_lifetime", self.enemy_projectile_lifetime),
            ("shooter_fire_interval", self.enemies.shooter_fire_interval),
            ("boss_fire_interval", self.enemies.boss_fire_interval),
        ];
        for (field, ticks) in durations {
            if ticks == 0 {
                return Err(ConfigError::ZeroDuration { field });
            }
        }

        if !(self.jump_impulse < 0.0) {
            return Err(ConfigError::JumpImpulseNotUpward(self.jump_impulse));
        }

        if self.jump_charges_max_default == 0
            || self.jump_charges_max_quad < self.jump_charges_max_default
        {
            return Err(ConfigError::InvalidJumpCharges {
                default: self.jump_charges_max_default,
                quad: self.jump_charges_max_quad,
            });
        }

        if self.orbit_max_charges > ORBIT_CHARGE_CAP {
            return Err(ConfigError::TooManyOrbitCharges(self.orbit_max_charges));
        }

        if self.enemies.boss_band_top > self.enemies.boss_band_bottom {
            return Err(ConfigError::InvertedBossBand {
                top: self.enemies.boss_band_top,
                bottom: self.enemies.boss_band_bottom,
            });
        }

        let scoring = &self.scoring;
        if scoring.drop_coins_min < 0 || scoring.drop_coins_min > scoring.drop_coins_max {
            return Err(ConfigError::InvalidCoinDrop {
                min: scoring.drop_coins_min,
                max: scoring.drop_coins_max,
            });
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
