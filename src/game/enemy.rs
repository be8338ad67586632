//! Enemy Behavior Policies
//!
//! Enemies are one struct tagged by `EnemyKind`. Each kind maps to a
//! capability set, and `step_enemy` dispatches on the tag once per tick:
//!
//! ```text
//! Walker   gravity, patrol, edge-aware
//! Guard    gravity, patrol, edge-aware (slower, tankier)
//! Shooter  gravity, patrol, edge-aware, ranged
//! Flyer    patrol, sinusoidal hover
//! Boss     reduced gravity, band float, patrol, aimed ranged
//! ```

use std::f32::consts::PI;

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::core::Vec2;
use crate::game::body::{Body, Platform};
use crate::game::collision::{apply_gravity, ground_ahead, move_vertical};
use crate::game::config::WorldConfig;
use crate::game::player::Facing;
use crate::game::projectile::{Projectile, ProjectileKind};

/// Unique enemy identifier within a level.
pub type EnemyId = u32;

/// Enemy archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EnemyKind {
    Walker = 0,
    Guard = 1,
    Shooter = 2,
    Flyer = 3,
    Boss = 4,
}

/// What an archetype can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub has_gravity: bool,
    pub has_ranged_attack: bool,
    pub has_oscillation: bool,
    /// Turns around at platform edges while grounded.
    pub edge_aware: bool,
}

impl EnemyKind {
    pub const fn capabilities(self) -> Capabilities {
        match self {
            EnemyKind::Walker | EnemyKind::Guard => Capabilities {
                has_gravity: true,
                has_ranged_attack: false,
                has_oscillation: false,
                edge_aware: true,
            },
            EnemyKind::Shooter => Capabilities {
                has_gravity: true,
                has_ranged_attack: true,
                has_oscillation: false,
                edge_aware: true,
            },
            EnemyKind::Flyer => Capabilities {
                has_gravity: false,
                has_ranged_attack: false,
                has_oscillation: true,
                edge_aware: false,
            },
            EnemyKind::Boss => Capabilities {
                has_gravity: true,
                has_ranged_attack: true,
                has_oscillation: false,
                edge_aware: false,
            },
        }
    }

    /// Can be defeated by landing on it.
    #[inline]
    pub fn stompable(self) -> bool {
        self != EnemyKind::Boss
    }
}

/// State of a single enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyState {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub body: Body,
    pub health: i32,
    pub max_health: i32,
    /// Patrol is `patrol_origin ± patrol_range` on the body's left edge.
    pub patrol_origin: f32,
    pub patrol_range: f32,
    pub speed: f32,
    pub alive: bool,
    pub grounded: bool,
    /// Ticks until the next shot (Shooter, Boss).
    pub attack_cooldown: u32,
    /// Oscillation phase in radians (Flyer).
    pub phase: f32,
    /// Oscillation centre line (Flyer).
    pub baseline_y: f32,
}

impl EnemyState {
    /// Spawn an enemy with its top-left at `position`, patrolling right.
    pub fn new(
        id: EnemyId,
        kind: EnemyKind,
        position: Vec2,
        patrol_range: f32,
        health: Option<i32>,
        config: &WorldConfig,
    ) -> Self {
        let tuning = &config.enemies;
        let size = match kind {
            EnemyKind::Boss => Vec2::new(tuning.boss_width, tuning.boss_height),
            _ => Vec2::new(tuning.width, tuning.height),
        };
        let health = health.unwrap_or_else(|| tuning.health(kind));
        let speed = tuning.speed(kind);

        let mut body = Body::new(position, size);
        body.velocity.x = speed;

        let attack_cooldown = match kind {
            EnemyKind::Shooter => tuning.shooter_fire_interval,
            EnemyKind::Boss => tuning.boss_fire_interval,
            _ => 0,
        };

        Self {
            id,
            kind,
            body,
            health,
            max_health: health,
            patrol_origin: position.x,
            patrol_range,
            speed,
            alive: true,
            grounded: false,
            attack_cooldown,
            phase: 0.0,
            baseline_y: position.y,
        }
    }

    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    /// Facing derived from horizontal travel.
    #[inline]
    pub fn facing(&self) -> Facing {
        if self.body.velocity.x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        }
    }

    /// Health as a fraction of spawn health.
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0 {
            return 0.0;
        }
        (self.health.max(0) as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }

    /// Turn around if the body has reached a patrol bound.
    /// Returns true if it turned.
    fn reverse_at_patrol_bounds(&mut self) -> bool {
        let x = self.body.position.x;
        let vx = self.body.velocity.x;
        if vx > 0.0 && x >= self.patrol_origin + self.patrol_range {
            self.body.velocity.x = -self.speed;
            true
        } else if vx < 0.0 && x <= self.patrol_origin - self.patrol_range {
            self.body.velocity.x = self.speed;
            true
        } else {
            false
        }
    }

    /// Keep inside the horizontal world bounds, turning at the edge.
    fn reverse_at_world_edges(&mut self, world_width: f32) {
        if self.body.left() <= 0.0 && self.body.velocity.x < 0.0 {
            self.body.set_left(0.0);
            self.body.velocity.x = self.speed;
        } else if self.body.right() >= world_width && self.body.velocity.x > 0.0 {
            self.body.set_right(world_width);
            self.body.velocity.x = -self.speed;
        }
    }

    /// Hash this enemy's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id);
        hasher.update_u8(self.kind as u8);
        hasher.update_vec2(self.body.position);
        hasher.update_vec2(self.body.velocity);
        hasher.update_i32(self.health);
        hasher.update_bool(self.alive);
        hasher.update_u32(self.attack_cooldown);
        hasher.update_f32(self.phase);
    }
}

// =============================================================================
// POLICIES
// =============================================================================

/// Read-only world view for one enemy update.
pub struct EnemyContext<'a> {
    pub platforms: &'a [Platform],
    pub config: &'a WorldConfig,
    /// Aim point for the boss.
    pub player_center: Vec2,
}

/// Advance one enemy by one tick. Returns a projectile if it fired.
pub fn step_enemy(enemy: &mut EnemyState, ctx: &EnemyContext<'_>) -> Option<Projectile> {
    if !enemy.alive {
        return None;
    }

    match enemy.kind {
        EnemyKind::Walker | EnemyKind::Guard => {
            step_ground_patrol(enemy, ctx);
            None
        }
        EnemyKind::Shooter => {
            step_ground_patrol(enemy, ctx);
            shooter_fire(enemy, ctx.config)
        }
        EnemyKind::Flyer => {
            step_flyer(enemy, ctx.config);
            None
        }
        EnemyKind::Boss => {
            step_boss(enemy, ctx);
            boss_fire(enemy, ctx)
        }
    }
}

/// Gravity, vertical resolve, then patrol with edge detection.
///
/// Ground enemies do not collide horizontally with platforms; they only
/// react to patrol bounds, platform edges and world edges.
fn step_ground_patrol(enemy: &mut EnemyState, ctx: &EnemyContext<'_>) {
    let config = ctx.config;

    if enemy.capabilities().has_gravity {
        apply_gravity(&mut enemy.body, config.gravity, config.max_fall_speed);
        enemy.grounded = move_vertical(&mut enemy.body, ctx.platforms).grounded;
    }

    enemy.body.position.x += enemy.body.velocity.x;

    if !enemy.reverse_at_patrol_bounds()
        && enemy.capabilities().edge_aware
        && enemy.grounded
    {
        let direction = enemy.body.velocity.x.signum();
        if !ground_ahead(&enemy.body, direction, config.enemies.edge_probe, ctx.platforms) {
            enemy.body.velocity.x = -enemy.body.velocity.x;
        }
    }

    enemy.reverse_at_world_edges(config.world_width);
}

fn shooter_fire(enemy: &mut EnemyState, config: &WorldConfig) -> Option<Projectile> {
    enemy.attack_cooldown = enemy.attack_cooldown.saturating_sub(1);
    if enemy.attack_cooldown > 0 {
        return None;
    }
    enemy.attack_cooldown = config.enemies.shooter_fire_interval;

    let direction = enemy.facing().sign();
    let size = config.projectile_size;
    let x = match enemy.facing() {
        Facing::Right => enemy.body.right(),
        Facing::Left => enemy.body.left() - size,
    };
    let y = enemy.body.center().y - size / 2.0;

    Some(Projectile::new(
        ProjectileKind::ShooterBolt,
        Vec2::new(x, y),
        Vec2::new(direction * config.enemies.shooter_bolt_speed, 0.0),
        size,
        config.enemy_projectile_lifetime,
    ))
}

/// Horizontal patrol plus a sinusoid around the baseline. No gravity,
/// no platform collision. Hitting the top or bottom of the world resets
/// the phase so the next half-cycle heads back inside, and moves the
/// baseline to the clamped position so the path stays continuous.
fn step_flyer(enemy: &mut EnemyState, config: &WorldConfig) {
    let tuning = &config.enemies;

    enemy.body.position.x += enemy.body.velocity.x;
    enemy.reverse_at_patrol_bounds();
    enemy.reverse_at_world_edges(config.world_width);

    let previous_y = enemy.body.position.y;
    enemy.phase += tuning.flyer_angular_speed;
    enemy.body.position.y = enemy.baseline_y + tuning.flyer_amplitude * enemy.phase.sin();

    if enemy.body.top() < 0.0 {
        // sin rises from 0: head down
        enemy.phase = 0.0;
        enemy.body.set_top(0.0);
        enemy.baseline_y = enemy.body.position.y;
    } else if enemy.body.bottom() > config.world_height {
        // sin falls from pi: head up
        enemy.phase = PI;
        enemy.body.set_bottom(config.world_height);
        enemy.baseline_y = enemy.body.position.y;
    }
    enemy.phase %= 2.0 * PI;
    enemy.body.velocity.y = enemy.body.position.y - previous_y;
}

/// Reduced gravity with a soft vertical band, then patrol.
fn step_boss(enemy: &mut EnemyState, ctx: &EnemyContext<'_>) {
    let config = ctx.config;
    let tuning = &config.enemies;

    let mut vy = enemy.body.velocity.y + config.gravity * tuning.boss_gravity_scale;
    if enemy.body.top() < tuning.boss_band_top {
        vy += tuning.boss_band_nudge;
    } else if enemy.body.top() > tuning.boss_band_bottom {
        vy -= tuning.boss_band_nudge;
    }
    enemy.body.velocity.y = vy.clamp(-config.max_fall_speed, config.max_fall_speed);

    enemy.grounded = move_vertical(&mut enemy.body, ctx.platforms).grounded;
    if enemy.body.top() < 0.0 {
        enemy.body.set_top(0.0);
        enemy.body.velocity.y = 0.0;
    }

    enemy.body.position.x += enemy.body.velocity.x;
    enemy.reverse_at_patrol_bounds();
    enemy.reverse_at_world_edges(config.world_width);
}

/// Fire a blast aimed at the player's position at this instant.
/// The direction is fixed for the projectile's lifetime.
fn boss_fire(enemy: &mut EnemyState, ctx: &EnemyContext<'_>) -> Option<Projectile> {
    let config = ctx.config;
    enemy.attack_cooldown = enemy.attack_cooldown.saturating_sub(1);
    if enemy.attack_cooldown > 0 {
        return None;
    }
    enemy.attack_cooldown = config.enemies.boss_fire_interval;

    let origin = enemy.body.center();
    let mut direction = (ctx.player_center - origin).normalize();
    if direction == Vec2::ZERO {
        direction = Vec2::new(enemy.facing().sign(), 0.0);
    }

    Some(Projectile::centered(
        ProjectileKind::BossBlast,
        origin,
        direction * config.enemies.boss_blast_speed,
        config.projectile_size,
        config.enemy_projectile_lifetime,
    ))
}

// =============================================================================
// TESTS
// =============================================================================
