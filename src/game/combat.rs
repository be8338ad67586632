//! Combat Resolution
//!
//! One entry point, `resolve_hit`, decides what an attack does to its
//! defender. Player defenders are checked in a fixed order:
//!
//! 1. invincible (rolling, shielding, fire dashing): blocked
//! 2. orbit charges left: one charge and one light consumed, blocked
//! 3. otherwise: exactly one life lost
//!
//! Enemy defenders take numeric damage computed by `attack_damage`.
//! A dead enemy ignores further hits so defeat is credited once.

use serde::{Serialize, Deserialize};

use crate::game::body::Body;
use crate::game::collision::clamp_to_world;
use crate::game::config::WorldConfig;
use crate::game::enemy::{EnemyKind, EnemyState};
use crate::game::orbit::OrbitRing;
use crate::game::player::{Facing, PlayerState};

/// Extra tolerance below an enemy's top edge that still counts as a stomp.
pub const STOMP_TOLERANCE: f32 = 5.0;

/// How the hit was delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackKind {
    /// Player melee swing.
    Slash,
    /// Player ranged blast.
    Blast,
    /// Player body while fire dashing.
    FireDash,
    /// Player landing on an enemy.
    Stomp,
    /// Boss dark blast.
    BossBlast,
    /// Shooter bolt.
    ShooterBolt,
    /// Enemy body touching the player.
    Contact,
}

/// Player-side target: the player plus the state a hit can consume.
pub struct PlayerTarget<'a> {
    pub player: &'a mut PlayerState,
    pub orbit: &'a mut OrbitRing,
    pub lives: &'a mut u32,
}

/// Who is being hit.
pub enum Defender<'a> {
    Player(PlayerTarget<'a>),
    Enemy(&'a mut EnemyState),
}

/// Result of one hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HitOutcome {
    /// Health removed from an enemy, or 1 for a lost player life.
    pub damage_applied: i32,
    /// Enemy reached zero health on this hit, or the player's last life went.
    pub defender_died: bool,
    pub blocked: bool,
    /// An orbit charge absorbed the hit.
    pub orbit_consumed: bool,
    /// A blocked contact attacker should be pushed clear of the player.
    pub bounce_attacker: bool,
}

/// Resolve one hit.
///
/// `damage` only applies to enemy defenders; a player always loses exactly
/// one life. `knockback` is a signed horizontal shift applied to a
/// surviving enemy, then clamped to the world. It is not re-checked
/// against platforms.
pub fn resolve_hit(
    attack: AttackKind,
    defender: Defender<'_>,
    damage: i32,
    knockback: f32,
    config: &WorldConfig,
) -> HitOutcome {
    match defender {
        Defender::Player(target) => hit_player(attack, target, config),
        Defender::Enemy(enemy) => hit_enemy(enemy, damage, knockback, config),
    }
}

fn hit_player(attack: AttackKind, target: PlayerTarget<'_>, config: &WorldConfig) -> HitOutcome {
    let PlayerTarget { player, orbit, lives } = target;

    if player.invincible() {
        return HitOutcome {
            blocked: true,
            bounce_attacker: attack == AttackKind::Contact,
            ..HitOutcome::default()
        };
    }

    if player.unlocks.orbit_charges > 0 {
        player.unlocks.orbit_charges -= 1;
        orbit.remove_one(player.body.center(), config.orbit_radius);
        return HitOutcome {
            blocked: true,
            orbit_consumed: true,
            bounce_attacker: attack == AttackKind::Contact,
            ..HitOutcome::default()
        };
    }

    *lives = lives.saturating_sub(1);
    HitOutcome {
        damage_applied: 1,
        defender_died: *lives == 0,
        ..HitOutcome::default()
    }
}

fn hit_enemy(enemy: &mut EnemyState, damage: i32, knockback: f32, config: &WorldConfig) -> HitOutcome {
    if !enemy.alive || enemy.health <= 0 {
        return HitOutcome::default();
    }

    let applied = damage.max(0).min(enemy.health);
    enemy.health -= applied;

    if enemy.health == 0 {
        enemy.alive = false;
        return HitOutcome {
            damage_applied: applied,
            defender_died: true,
            ..HitOutcome::default()
        };
    }

    if knockback != 0.0 {
        enemy.body.position.x += knockback;
        clamp_to_world(&mut enemy.body, config.world_width);
    }

    HitOutcome {
        damage_applied: applied,
        ..HitOutcome::default()
    }
}

// =============================================================================
// DAMAGE
// =============================================================================

/// The defender is entirely past the attacker's facing edge.
pub fn is_back_attack(attacker: &Body, facing: Facing, defender: &Body) -> bool {
    match facing {
        Facing::Right => defender.left() > attacker.right(),
        Facing::Left => defender.right() < attacker.left(),
    }
}

/// Damage a player attack deals to an enemy.
pub fn attack_damage(
    attack: AttackKind,
    player: &PlayerState,
    enemy: &EnemyState,
    config: &WorldConfig,
) -> i32 {
    let is_boss = enemy.kind == EnemyKind::Boss;
    match attack {
        AttackKind::Slash => {
            let profile = config.weapons.profile(player.unlocks.weapon);
            let mut damage = profile.damage_multiplier;
            if is_back_attack(&player.body, player.facing, &enemy.body) {
                damage *= profile.back_attack_multiplier;
            }
            if is_boss {
                damage *= config.boss_melee_multiplier;
            }
            damage
        }
        AttackKind::Blast if is_boss => config.boss_blast_damage,
        AttackKind::Blast => 1,
        AttackKind::FireDash => config.fire_dash_damage_multiplier,
        AttackKind::Stomp => 1,
        AttackKind::BossBlast | AttackKind::ShooterBolt | AttackKind::Contact => 0,
    }
}

/// Signed club knockback for a player melee hit.
pub fn melee_knockback(player: &PlayerState, config: &WorldConfig) -> f32 {
    let distance = config.weapons.profile(player.unlocks.weapon).knockback_distance;
    player.facing.sign() * distance
}

/// The player is falling onto the enemy's top from above.
pub fn is_stomp(player: &Body, enemy: &Body) -> bool {
    let vy = player.velocity.y;
    vy > 0.0
        && player.overlaps(enemy)
        && player.bottom() >= enemy.top()
        && player.bottom() < enemy.top() + vy + STOMP_TOLERANCE
}

// =============================================================================
// TESTS
// =============================================================================
