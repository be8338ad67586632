//! Player Ability State Machine
//!
//! Roll, shield and fire dash form one mutually exclusive group held in
//! `PlayerState::ability`; leaving it only happens on timer expiry.
//! Jump charges, the shared attack cooldown and the per-ability cooldowns
//! run alongside it.
//!
//! Per tick the session calls, in order:
//! 1. `advance_timers` - decrement cooldowns, expire the active ability
//! 2. `apply_intents` - start abilities, set velocity, jump, attack
//! 3. (integration)
//! 4. `update_grounded` - landing-edge jump charge reset

use serde::{Serialize, Deserialize};

use crate::core::{Aabb, Vec2};
use crate::game::config::WorldConfig;
use crate::game::input::{InputFrame, Pressed};
use crate::game::player::{ActiveAbility, Facing, PlayerState};

/// Ability identifiers carried by events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AbilityKind {
    Jump = 0,
    Roll = 1,
    Shield = 2,
    FireDash = 3,
    Slash = 4,
    Blast = 5,
}

/// Something the player did this tick that the session must act on.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerAction {
    Jumped,
    RollStarted,
    ShieldRaised,
    FireDashStarted,
    /// Melee swing; `hitbox` is checked against enemies this tick.
    Slash { hitbox: Aabb },
    /// Ranged blast; one projectile per origin.
    Blast { origins: Vec<Vec2>, direction: f32 },
}

impl PlayerAction {
    pub fn kind(&self) -> AbilityKind {
        match self {
            PlayerAction::Jumped => AbilityKind::Jump,
            PlayerAction::RollStarted => AbilityKind::Roll,
            PlayerAction::ShieldRaised => AbilityKind::Shield,
            PlayerAction::FireDashStarted => AbilityKind::FireDash,
            PlayerAction::Slash { .. } => AbilityKind::Slash,
            PlayerAction::Blast { .. } => AbilityKind::Blast,
        }
    }
}

// =============================================================================
// TIMERS
// =============================================================================

/// Decrement cooldowns, then count down the active ability.
///
/// Returns the ability that expired this tick, if any. Cooldowns for roll
/// and fire dash start at expiry, so they are armed after the decrement.
pub fn advance_timers(player: &mut PlayerState, config: &WorldConfig) -> Option<AbilityKind> {
    player.cooldowns.tick();

    let (expired, remaining) = match &mut player.ability {
        ActiveAbility::Neutral => return None,
        ActiveAbility::Rolling { remaining } => (AbilityKind::Roll, remaining),
        ActiveAbility::Shielding { remaining } => (AbilityKind::Shield, remaining),
        ActiveAbility::FireDashing { remaining } => (AbilityKind::FireDash, remaining),
    };

    *remaining = remaining.saturating_sub(1);
    if *remaining > 0 {
        return None;
    }

    player.ability = ActiveAbility::Neutral;
    match expired {
        AbilityKind::Roll => {
            player.body.velocity.x = 0.0;
            player.cooldowns.roll = config.roll_cooldown;
        }
        AbilityKind::FireDash => {
            player.body.velocity.x = 0.0;
            player.cooldowns.fire_dash = config.fire_dash_cooldown;
            player.fire_dash_hits.clear();
        }
        _ => {}
    }
    Some(expired)
}

// =============================================================================
// INTENTS
// =============================================================================

/// Apply this tick's intents.
///
/// Invalid intents (jump with no charges, roll on cooldown, blast before
/// the unlock) are silent no-ops.
pub fn apply_intents(
    player: &mut PlayerState,
    held: InputFrame,
    pressed: &Pressed,
    config: &WorldConfig,
) -> Vec<PlayerAction> {
    let mut actions = Vec::new();
    let axis = held.move_axis();

    // Locked into a direction while rolling or dashing
    if !velocity_locked(player) && axis != 0.0 {
        player.facing = if axis < 0.0 { Facing::Left } else { Facing::Right };
    }

    if pressed.fire_dash_combo && try_fire_dash(player, config) {
        actions.push(PlayerAction::FireDashStarted);
    }
    if pressed.roll && try_roll(player, config) {
        actions.push(PlayerAction::RollStarted);
    }
    if pressed.shield && try_shield(player, config) {
        actions.push(PlayerAction::ShieldRaised);
    }

    player.body.velocity.x = match player.ability {
        ActiveAbility::Rolling { .. } => {
            player.facing.sign() * config.move_speed * config.roll_speed_multiplier
        }
        ActiveAbility::FireDashing { .. } => {
            player.facing.sign() * config.move_speed * config.fire_dash_speed_multiplier
        }
        _ => axis * config.move_speed,
    };

    if pressed.jump && try_jump(player, config) {
        actions.push(PlayerAction::Jumped);
    }

    if pressed.melee {
        if let Some(hitbox) = try_slash(player, config) {
            actions.push(PlayerAction::Slash { hitbox });
        }
    }
    if pressed.ranged {
        if let Some(origins) = try_blast(player, config) {
            actions.push(PlayerAction::Blast {
                origins,
                direction: player.facing.sign(),
            });
        }
    }

    actions
}

/// Rolling and fire dashing override horizontal velocity and suspend
/// vertical physics.
#[inline]
pub fn velocity_locked(player: &PlayerState) -> bool {
    player.is_rolling() || player.is_fire_dashing()
}

/// Consume a jump charge and set the jump impulse.
pub fn try_jump(player: &mut PlayerState, config: &WorldConfig) -> bool {
    if velocity_locked(player) || player.jump_charges == 0 {
        return false;
    }
    player.jump_charges -= 1;
    player.body.velocity.y = config.jump_impulse;
    player.grounded = false;
    true
}

pub fn try_roll(player: &mut PlayerState, config: &WorldConfig) -> bool {
    if player.ability != ActiveAbility::Neutral || player.cooldowns.roll > 0 {
        return false;
    }
    player.ability = ActiveAbility::Rolling { remaining: config.roll_duration };
    player.body.velocity.y = 0.0;
    true
}

pub fn try_shield(player: &mut PlayerState, config: &WorldConfig) -> bool {
    if player.ability != ActiveAbility::Neutral || player.attacking() {
        return false;
    }
    player.ability = ActiveAbility::Shielding { remaining: config.shield_duration };
    true
}

pub fn try_fire_dash(player: &mut PlayerState, config: &WorldConfig) -> bool {
    if !player.unlocks.has_ranged_attack
        || player.ability != ActiveAbility::Neutral
        || player.cooldowns.fire_dash > 0
    {
        return false;
    }
    player.ability = ActiveAbility::FireDashing { remaining: config.fire_dash_duration };
    player.body.velocity.y = 0.0;
    player.fire_dash_hits.clear();
    true
}

/// Start a melee swing. Returns the hitbox in front of the player.
pub fn try_slash(player: &mut PlayerState, config: &WorldConfig) -> Option<Aabb> {
    if velocity_locked(player) || player.attacking() {
        return None;
    }
    player.cooldowns.attack = config.attack_cooldown;
    Some(slash_hitbox(player, config))
}

/// Melee hitbox: `attack_range` wide, player-tall, flush with the facing edge.
pub fn slash_hitbox(player: &PlayerState, config: &WorldConfig) -> Aabb {
    let range = config.weapons.profile(player.unlocks.weapon).attack_range;
    let x = match player.facing {
        Facing::Right => player.body.right(),
        Facing::Left => player.body.left() - range,
    };
    Aabb::from_xywh(x, player.body.top(), range, player.body.size.y)
}

/// Fire a blast. Returns one origin, or two stacked origins with double shot.
pub fn try_blast(player: &mut PlayerState, config: &WorldConfig) -> Option<Vec<Vec2>> {
    if !player.unlocks.has_ranged_attack || velocity_locked(player) || player.attacking() {
        return None;
    }
    player.cooldowns.attack = config.attack_cooldown;

    let size = config.projectile_size;
    let x = match player.facing {
        Facing::Right => player.body.right(),
        Facing::Left => player.body.left() - size,
    };
    let y = player.body.center().y - size / 2.0;

    if player.unlocks.can_double_shot {
        let half = config.double_shot_spacing / 2.0;
        Some(vec![Vec2::new(x, y - half), Vec2::new(x, y + half)])
    } else {
        Some(vec![Vec2::new(x, y)])
    }
}

// =============================================================================
// GROUNDING
// =============================================================================

/// Record this tick's grounded flag. Jump charges refill to max only on
/// the landing edge. Returns true on that edge.
pub fn update_grounded(player: &mut PlayerState, grounded: bool, config: &WorldConfig) -> bool {
    player.was_grounded = player.grounded;
    player.grounded = grounded;

    let landed = grounded && !player.was_grounded;
    if landed {
        player.jump_charges = player.jump_charges_max(config);
    }
    landed
}

// =============================================================================
// TESTS
// =============================================================================
