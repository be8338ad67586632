//! Simulation Tick
//!
//! One pure step per fixed tick: session in, session out, no I/O.
//! Order within a tick:
//!
//! ```text
//! timers -> intents -> platforms -> player -> fall check -> enemies
//!        -> projectiles -> combat -> orbit -> pickups -> cleanup -> completion
//! ```
//!
//! Moving platforms advance before any body resolves against them, so a
//! passenger is carried exactly once per tick.

use tracing::trace;

use crate::game::ability::{self, PlayerAction};
use crate::game::body::Platform;
use crate::game::collision::{clamp_to_world, fell_out_of_world, integrate, move_horizontal, push_apart};
use crate::game::combat::{
    attack_damage, is_stomp, melee_knockback, resolve_hit, AttackKind, Defender, HitOutcome, PlayerTarget,
};
use crate::game::enemy::{step_enemy, EnemyContext, EnemyId, EnemyKind};
use crate::game::events::{GameEvent, LifeLossCause};
use crate::game::input::{InputFrame, InputScript, Pressed};
use crate::game::pickup::{apply_power_up, Coin};
use crate::game::projectile::{Projectile, ProjectileKind};
use crate::game::state::{BossEncounter, Session, SessionStatus};
use crate::core::{Aabb, Vec2};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Session status after the tick
    pub status: SessionStatus,
    /// Pause was pressed this tick
    pub pause_pressed: bool,
    /// Menu-back was pressed this tick
    pub menu_back_pressed: bool,
}

/// Run one simulation tick.
///
/// Pause and menu-back presses are reported but not acted on; the game
/// flow decides what they mean. Nothing is simulated once the level has
/// completed or the run is over.
pub fn tick(session: &mut Session, input: InputFrame) -> TickResult {
    let pressed = session.input.update(input);
    let mut result = TickResult {
        pause_pressed: pressed.pause,
        menu_back_pressed: pressed.menu_back,
        ..TickResult::default()
    };

    if !session.is_active() {
        result.status = session.status;
        result.events = session.take_events();
        return result;
    }

    // 0. Advance tick counter
    session.tick += 1;
    session.life_lost_this_tick = false;

    // 1. Ability timers, then this tick's intents
    apply_player_input(session, input, &pressed);

    // 2. Moving platforms
    for platform in &mut session.platforms {
        platform.advance();
    }

    // 3. Player physics
    update_player_physics(session);

    // 4. Falling out of the world costs a life regardless of invincibility
    if fell_out_of_world(&session.player.body, session.config.world_height) {
        session.fall();
    }

    // 5. Enemy policies
    update_enemies(session);

    // 6. Projectiles
    update_projectiles(session);

    // 7. Combat
    process_fire_dash(session);
    process_body_contacts(session);
    process_hostile_projectiles(session);
    process_player_blasts(session);

    // 8. Orbit ring follows the player
    let center = session.player.body.center();
    session.orbit.sync(session.player.unlocks.orbit_charges, center, session.config.orbit_radius);
    session.orbit.advance(center, session.config.orbit_radius, session.config.orbit_angular_speed);

    // 9. Pickups
    process_pickups(session);

    // 10. Dead enemies leave the roster
    session.enemies.retain(|_, e| e.alive);

    // 11. Completion
    if session.level_finished() {
        session.complete_level();
    }

    result.status = session.status;
    result.events = session.take_events();
    result
}

// =============================================================================
// PLAYER
// =============================================================================

fn apply_player_input(session: &mut Session, input: InputFrame, pressed: &Pressed) {
    let tick = session.tick;

    if let Some(expired) = ability::advance_timers(&mut session.player, &session.config) {
        session.push_event(GameEvent::ability_ended(tick, expired));
    }

    let actions = ability::apply_intents(&mut session.player, input, pressed, &session.config);

    for action in actions {
        session.push_event(GameEvent::ability_used(tick, action.kind()));
        match action {
            PlayerAction::Slash { hitbox } => resolve_slash(session, hitbox),
            PlayerAction::Blast { origins, direction } => {
                let velocity = Vec2::new(direction * session.config.blast_speed, 0.0);
                for origin in origins {
                    session.projectiles.push(Projectile::new(
                        ProjectileKind::PlayerBlast,
                        origin,
                        velocity,
                        session.config.projectile_size,
                        session.config.blast_lifetime,
                    ));
                    session.push_event(GameEvent::projectile_fired(tick, ProjectileKind::PlayerBlast));
                }
            }
            _ => {}
        }
    }
}

/// Melee hits every living enemy the hitbox touches.
fn resolve_slash(session: &mut Session, hitbox: Aabb) {
    let targets: Vec<EnemyId> = session
        .enemies
        .values()
        .filter(|e| e.alive && hitbox.overlaps(&e.body.aabb()))
        .map(|e| e.id)
        .collect();

    let knockback = melee_knockback(&session.player, &session.config);
    for id in targets {
        let Some(enemy) = session.enemies.get(&id) else { continue };
        let damage = attack_damage(AttackKind::Slash, &session.player, enemy, &session.config);
        damage_enemy(session, id, AttackKind::Slash, damage, knockback);
    }
}

/// Rolling and fire dashing suspend vertical physics; the grounded flag
/// holds until they end, so no landing edge can occur mid-ability.
fn update_player_physics(session: &mut Session) {
    let config = &session.config;
    let player = &mut session.player;
    let platforms: &[Platform] = &session.platforms;

    if ability::velocity_locked(player) {
        player.body.velocity.y = 0.0;
        move_horizontal(&mut player.body, platforms);
        clamp_to_world(&mut player.body, config.world_width);
        return;
    }

    let contact = integrate(
        &mut player.body,
        platforms,
        config.gravity,
        config.max_fall_speed,
        config.world_width,
    );
    if ability::update_grounded(player, contact.grounded, config) {
        trace!(charges = player.jump_charges, "landed");
    }
}

// =============================================================================
// ENEMIES AND PROJECTILES
// =============================================================================

fn update_enemies(session: &mut Session) {
    let tick = session.tick;
    let ctx = EnemyContext {
        platforms: &session.platforms,
        config: &session.config,
        player_center: session.player.body.center(),
    };

    let mut fired = Vec::new();
    let mut fell = Vec::new();
    for enemy in session.enemies.values_mut() {
        if let Some(projectile) = step_enemy(enemy, &ctx) {
            fired.push(projectile);
        }
        if enemy.alive && fell_out_of_world(&enemy.body, ctx.config.world_height) {
            fell.push(enemy.id);
        }
    }

    for projectile in fired {
        session.push_event(GameEvent::projectile_fired(tick, projectile.kind));
        session.projectiles.push(projectile);
    }

    // Lost to the void: removed without an award
    for id in fell {
        if let Some(enemy) = session.enemies.get_mut(&id) {
            enemy.alive = false;
            enemy.health = 0;
        }
        if session.boss == (BossEncounter::Active { enemy_id: id }) {
            session.boss = BossEncounter::Defeated;
            session.push_event(GameEvent::boss_defeated(tick, id));
        }
    }
}

fn update_projectiles(session: &mut Session) {
    let (width, height) = (session.config.world_width, session.config.world_height);
    session.projectiles.retain_mut(|p| p.advance(width, height));
}

// =============================================================================
// COMBAT
// =============================================================================

/// Apply player damage to one enemy and credit a defeat exactly once.
fn damage_enemy(session: &mut Session, id: EnemyId, attack: AttackKind, damage: i32, knockback: f32) -> HitOutcome {
    let tick = session.tick;
    let Some(enemy) = session.enemies.get_mut(&id) else {
        return HitOutcome::default();
    };
    let outcome = resolve_hit(attack, Defender::Enemy(&mut *enemy), damage, knockback, &session.config);
    let (kind, center, health_left) = (enemy.kind, enemy.body.center(), enemy.health);

    if outcome.defender_died {
        let award = session.config.scoring.award(kind);
        let new_score = session.add_score(award);
        session.push_event(GameEvent::enemy_defeated(tick, id, kind, award, new_score));
        trace!(id, ?kind, award, "enemy defeated");

        if kind == EnemyKind::Boss {
            if session.boss == (BossEncounter::Active { enemy_id: id }) {
                session.boss = BossEncounter::Defeated;
                session.push_event(GameEvent::boss_defeated(tick, id));
            }
        } else {
            drop_coins(session, center);
        }
    } else if outcome.damage_applied > 0 {
        session.push_event(GameEvent::enemy_damaged(tick, id, attack, outcome.damage_applied, health_left));
    }
    outcome
}

/// Scatter 1-3 coins around a defeated enemy.
fn drop_coins(session: &mut Session, center: Vec2) {
    let scoring = &session.config.scoring;
    let count = session.rng.next_int_range(scoring.drop_coins_min, scoring.drop_coins_max);
    let size = session.config.coin_size;
    for _ in 0..count {
        let at = session.rng.scatter(center, 5);
        session
            .coins
            .push(Coin::new(Vec2::new(at.x - size / 2.0, at.y - size / 2.0), size));
    }
}

/// A hit against the player. Ignored once a life was lost this tick or
/// the level has ended.
fn damage_player(session: &mut Session, attack: AttackKind) -> HitOutcome {
    if !session.player_can_be_hit() {
        return HitOutcome::default();
    }

    let outcome = resolve_hit(
        attack,
        Defender::Player(PlayerTarget {
            player: &mut session.player,
            orbit: &mut session.orbit,
            lives: &mut session.lives,
        }),
        0,
        0.0,
        &session.config,
    );

    if outcome.blocked {
        session.push_event(GameEvent::player_hit_blocked(session.tick, attack, outcome.orbit_consumed));
    } else if outcome.damage_applied > 0 {
        session.after_life_lost(LifeLossCause::Hit(attack));
    }
    outcome
}

/// Fire dash burns every enemy it touches, once per enemy per dash.
fn process_fire_dash(session: &mut Session) {
    if !session.player.is_fire_dashing() || !session.is_active() {
        return;
    }

    let body = session.player.body;
    let targets: Vec<EnemyId> = session
        .enemies
        .values()
        .filter(|e| e.alive && body.overlaps(&e.body))
        .filter(|e| !session.player.fire_dash_hits.contains(&e.id))
        .map(|e| e.id)
        .collect();

    for id in targets {
        session.player.fire_dash_hits.push(id);
        let Some(enemy) = session.enemies.get(&id) else { continue };
        let damage = attack_damage(AttackKind::FireDash, &session.player, enemy, &session.config);
        damage_enemy(session, id, AttackKind::FireDash, damage, 0.0);
    }
}

/// Stomps and contact damage between the player body and enemies.
fn process_body_contacts(session: &mut Session) {
    if session.player.is_fire_dashing() {
        return;
    }

    let touching: Vec<EnemyId> = session
        .enemies
        .values()
        .filter(|e| e.alive && session.player.body.overlaps(&e.body))
        .map(|e| e.id)
        .collect();

    for id in touching {
        if !session.player_can_be_hit() {
            break;
        }
        let Some(enemy) = session.enemies.get(&id) else { continue };
        if !enemy.alive {
            continue;
        }

        if enemy.kind.stompable() && is_stomp(&session.player.body, &enemy.body) {
            let damage = attack_damage(AttackKind::Stomp, &session.player, enemy, &session.config);
            damage_enemy(session, id, AttackKind::Stomp, damage, 0.0);
            session.player.body.velocity.y = session.config.jump_impulse * session.config.stomp_bounce_factor;
            continue;
        }

        // A blocked attacker is shoved clear and heads away, so one touch
        // is one hit
        let outcome = damage_player(session, AttackKind::Contact);
        if outcome.bounce_attacker {
            let player_body = session.player.body;
            let world_width = session.config.world_width;
            if let Some(enemy) = session.enemies.get_mut(&id) {
                let side = push_apart(&mut enemy.body, &player_body, world_width);
                enemy.body.velocity.x = side * enemy.body.velocity.x.abs();
            }
        }
    }
}

/// Shooter bolts and boss blasts against the player. A projectile that
/// resolves a hit is destroyed, blocked or not.
fn process_hostile_projectiles(session: &mut Session) {
    let mut i = 0;
    while i < session.projectiles.len() {
        let projectile = &session.projectiles[i];
        let hits = projectile.kind.is_hostile()
            && session.player_can_be_hit()
            && projectile.body.overlaps(&session.player.body);
        if !hits {
            i += 1;
            continue;
        }

        let attack = match projectile.kind {
            ProjectileKind::BossBlast => AttackKind::BossBlast,
            _ => AttackKind::ShooterBolt,
        };
        session.projectiles.remove(i);
        damage_player(session, attack);
    }
}

/// Player blasts against the first living enemy they touch.
fn process_player_blasts(session: &mut Session) {
    let mut i = 0;
    while i < session.projectiles.len() {
        let projectile = &session.projectiles[i];
        if projectile.kind.is_hostile() {
            i += 1;
            continue;
        }

        let target = session
            .enemies
            .values()
            .find(|e| e.alive && projectile.body.overlaps(&e.body))
            .map(|e| e.id);

        let Some(id) = target else {
            i += 1;
            continue;
        };

        session.projectiles.remove(i);
        let Some(enemy) = session.enemies.get(&id) else { continue };
        let damage = attack_damage(AttackKind::Blast, &session.player, enemy, &session.config);
        damage_enemy(session, id, AttackKind::Blast, damage, 0.0);
    }
}

// =============================================================================
// PICKUPS
// =============================================================================

fn process_pickups(session: &mut Session) {
    if !session.is_active() {
        return;
    }
    let tick = session.tick;
    let player_box = session.player.body.aabb();

    let mut collected = 0u32;
    session.coins.retain(|coin| {
        let hit = coin.aabb().overlaps(&player_box);
        if hit {
            collected += 1;
        }
        !hit
    });
    for _ in 0..collected {
        let value = session.config.scoring.coin_value;
        let new_score = session.add_score(value);
        session.push_event(GameEvent::coin_collected(tick, value, new_score));
    }

    for i in 0..session.power_ups.len() {
        let power_up = session.power_ups[i];
        if power_up.consumed || !power_up.aabb().overlaps(&player_box) {
            continue;
        }
        session.power_ups[i].consumed = true;
        apply_power_up(
            power_up.kind,
            &mut session.player,
            &mut session.orbit,
            &mut session.lives,
            &session.config,
        );
        session.push_event(GameEvent::power_up_collected(tick, power_up.kind));
    }
    session.power_ups.retain(|p| !p.consumed);
}

// =============================================================================
// REPLAY
// =============================================================================

/// Run `ticks` ticks from a scripted input track. Stops early once the
/// level ends. Returns every event produced.
pub fn run_script(session: &mut Session, script: &InputScript, ticks: u32) -> Vec<GameEvent> {
    let mut all_events = Vec::new();
    for t in 0..ticks {
        let result = tick(session, script.frame_at(t));
        all_events.extend(result.events);
        if result.status != SessionStatus::Active {
            break;
        }
    }
    all_events
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vec2;
    use crate::game::config::WorldConfig;
    use crate::game::enemy::EnemyState;
    use crate::game::events::GameEventData;
    use crate::game::level::{EnemySpawn, LevelLayout, PlatformMotion, PlatformSpec};
    use crate::game::player::{ActiveAbility, Facing, Weapon};
    use crate::game::state::tests::{basic_layout, boss_layout, session};
    use proptest::prelude::*;

    fn idle() -> InputFrame {
        InputFrame::new()
    }

    /// Floor only, one far-away coin so the level stays open.
    fn empty_layout() -> LevelLayout {
        LevelLayout {
            spawn_point: Vec2::new(100.0, 100.0),
            platforms: vec![PlatformSpec::fixed(0.0, 580.0, 800.0, 20.0)],
            coins: vec![Vec2::new(760.0, 20.0)],
            enemies: Vec::new(),
            power_up: None,
            boss: None,
        }
    }

    fn empty_session() -> Session {
        Session::new(WorldConfig::default(), &empty_layout(), 7).expect("valid")
    }

    fn land(session: &mut Session) {
        for _ in 0..200 {
            tick(session, idle());
            if session.player.grounded {
                return;
            }
        }
        panic!("player never landed");
    }

    fn add_enemy(session: &mut Session, id: EnemyId, kind: EnemyKind, position: Vec2) {
        let enemy = EnemyState::new(id, kind, position, 100.0, None, &session.config);
        session.enemies.insert(id, enemy);
    }

    #[test]
    fn test_gravity_before_snap() {
        let mut session = empty_session();
        tick(&mut session, idle());

        assert_eq!(session.player.body.velocity.y, 0.5);
        assert_eq!(session.player.body.position.y, 100.5);
        assert!(!session.player.grounded);
    }

    #[test]
    fn test_move_right_level_triggered() {
        let mut session = empty_session();
        let right = InputFrame::with(InputFrame::MOVE_RIGHT);
        tick(&mut session, right);
        tick(&mut session, right);
        assert_eq!(session.player.body.position.x, 110.0);
        assert_eq!(session.player.facing, Facing::Right);

        tick(&mut session, idle());
        assert_eq!(session.player.body.velocity.x, 0.0);
    }

    #[test]
    fn test_third_jump_noop_in_tick() {
        let mut session = empty_session();
        land(&mut session);
        assert_eq!(session.player.jump_charges, 2);

        let jump = InputFrame::with(InputFrame::JUMP);
        tick(&mut session, jump);
        tick(&mut session, idle());
        tick(&mut session, jump);
        assert_eq!(session.player.jump_charges, 0);
        tick(&mut session, idle());

        let vy_before = session.player.body.velocity.y;
        tick(&mut session, jump);
        assert_eq!(session.player.jump_charges, 0);
        // Only gravity acted: no new impulse
        assert_eq!(session.player.body.velocity.y, vy_before + 0.5);
    }

    #[test]
    fn test_fall_costs_life_even_while_shielding() {
        let mut layout = empty_layout();
        layout.platforms.clear();
        let mut session = Session::new(WorldConfig::default(), &layout, 7).expect("valid");

        let mut lost = false;
        for _ in 0..300 {
            session.player.ability = ActiveAbility::Shielding { remaining: 100 };
            let result = tick(&mut session, idle());
            if result
                .events
                .iter()
                .any(|e| matches!(e.data, GameEventData::LifeLost { cause: LifeLossCause::Fall, .. }))
            {
                lost = true;
                break;
            }
        }
        assert!(lost);
        assert_eq!(session.lives, 2);
        assert_eq!(session.player.body.position, session.spawn_point);
    }

    #[test]
    fn test_contact_costs_one_life_and_respawns() {
        let mut session = empty_session();
        land(&mut session);
        let player_pos = session.player.body.position;
        add_enemy(&mut session, 50, EnemyKind::Walker, Vec2::new(player_pos.x + 10.0, player_pos.y - 18.0));

        let result = tick(&mut session, idle());
        assert_eq!(session.lives, 2);
        assert_eq!(session.player.body.position, session.spawn_point);
        let lost = result
            .events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::LifeLost { .. }))
            .count();
        assert_eq!(lost, 1);
    }

    #[test]
    fn test_shield_blocks_contact_and_bounces_enemy() {
        let mut session = empty_session();
        land(&mut session);
        session.player.ability = ActiveAbility::Shielding { remaining: 30 };
        let player_pos = session.player.body.position;
        add_enemy(&mut session, 50, EnemyKind::Walker, Vec2::new(player_pos.x + 10.0, player_pos.y - 18.0));
        if let Some(walker) = session.enemies.get_mut(&50) {
            walker.body.velocity.x = -walker.speed;
        }

        let result = tick(&mut session, idle());
        assert_eq!(session.lives, 3);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e.data, GameEventData::PlayerHitBlocked { orbit_consumed: false, .. })));

        let walker = &session.enemies[&50];
        assert!(walker.body.velocity.x > 0.0, "bounced back");
        assert!(!walker.body.overlaps(&session.player.body), "pushed clear");
        assert_eq!(walker.body.left(), session.player.body.right());
    }

    #[test]
    fn test_shield_outlasts_walker_contact() {
        let mut session = empty_session();
        land(&mut session);
        session.player.ability = ActiveAbility::Shielding { remaining: 60 };
        let player_pos = session.player.body.position;
        let walker = EnemyState::new(
            50,
            EnemyKind::Walker,
            Vec2::new(player_pos.x + 10.0, player_pos.y - 18.0),
            300.0,
            None,
            &session.config,
        );
        session.enemies.insert(50, walker);

        let mut blocked = 0;
        for _ in 0..70 {
            blocked += tick(&mut session, idle())
                .events
                .iter()
                .filter(|e| matches!(e.data, GameEventData::PlayerHitBlocked { .. }))
                .count();
        }
        assert_eq!(blocked, 1);
        assert_eq!(session.lives, 3);
    }

    #[test]
    fn test_lingering_contact_takes_one_orbit_charge() {
        let mut session = empty_session();
        land(&mut session);
        session.player.unlocks.orbit_charges = 5;
        let player_pos = session.player.body.position;
        let walker = EnemyState::new(
            50,
            EnemyKind::Walker,
            Vec2::new(player_pos.x + 10.0, player_pos.y - 18.0),
            300.0,
            None,
            &session.config,
        );
        session.enemies.insert(50, walker);

        for _ in 0..8 {
            tick(&mut session, idle());
        }
        assert_eq!(session.player.unlocks.orbit_charges, 4);
        assert_eq!(session.orbit.len(), 4);
        assert_eq!(session.lives, 3);
    }

    #[test]
    fn test_orbit_charge_absorbs_bolt() {
        let mut session = empty_session();
        land(&mut session);
        session.player.unlocks.orbit_charges = 2;
        let center = session.player.body.center();
        session.projectiles.push(Projectile::centered(
            ProjectileKind::ShooterBolt,
            center,
            Vec2::ZERO,
            10.0,
            100,
        ));

        tick(&mut session, idle());
        assert_eq!(session.lives, 3);
        assert_eq!(session.player.unlocks.orbit_charges, 1);
        assert_eq!(session.orbit.len(), 1);
        assert!(session.projectiles.is_empty());
    }

    #[test]
    fn test_stomp_defeats_and_bounces() {
        let mut session = empty_session();
        add_enemy(&mut session, 50, EnemyKind::Walker, Vec2::new(90.0, 530.0));
        if let Some(walker) = session.enemies.get_mut(&50) {
            walker.body.velocity.x = 0.0;
        }

        session.player.body.position = Vec2::new(95.0, 530.0 - 32.0 - 2.0);
        session.player.body.velocity.y = 3.0;

        let result = tick(&mut session, idle());
        assert!(session.enemies.is_empty());
        assert_eq!(session.lives, 3);
        assert!(session.player.body.velocity.y < 0.0);
        assert_eq!(session.score, session.config.scoring.walker_award);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e.data, GameEventData::EnemyDefeated { kind: EnemyKind::Walker, .. })));
        let drops = session.coins.len() - 1;
        assert!((1..=3).contains(&drops));
    }

    #[test]
    fn test_roll_through_enemy_unharmed() {
        let mut session = empty_session();
        land(&mut session);
        let player_pos = session.player.body.position;
        add_enemy(&mut session, 50, EnemyKind::Guard, Vec2::new(player_pos.x + 40.0, player_pos.y - 18.0));

        tick(&mut session, InputFrame::with(InputFrame::ROLL | InputFrame::MOVE_RIGHT));
        for _ in 0..10 {
            tick(&mut session, idle());
        }
        assert_eq!(session.lives, 3);
        assert!(session.player.body.position.x > player_pos.x + 60.0);
    }

    #[test]
    fn test_fire_dash_hits_each_enemy_once() {
        let mut layout = empty_layout();
        layout.boss = Some(EnemySpawn::new(EnemyKind::Boss, Vec2::new(150.0, 484.0), 200.0));
        let mut session = Session::new(WorldConfig::default(), &layout, 7).expect("valid");
        session.player.unlocks.has_ranged_attack = true;
        land(&mut session);

        let boss_id = match session.boss {
            BossEncounter::Active { enemy_id } => enemy_id,
            _ => unreachable!(),
        };
        if let Some(boss) = session.enemies.get_mut(&boss_id) {
            boss.body.position = Vec2::new(session.player.body.right() + 5.0, session.player.body.top() - 40.0);
            boss.body.velocity = Vec2::ZERO;
            boss.speed = 0.0;
        }

        let mut events = Vec::new();
        events.extend(tick(&mut session, InputFrame::with(InputFrame::FIRE_DASH_COMBO)).events);
        for _ in 0..session.config.fire_dash_duration {
            events.extend(tick(&mut session, idle()).events);
        }

        let burns = events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::EnemyDamaged { attack: AttackKind::FireDash, .. }))
            .count();
        assert_eq!(burns, 1);
        assert_eq!(session.lives, 3);
        assert_eq!(session.enemies[&boss_id].health, 100 - session.config.fire_dash_damage_multiplier);
    }

    #[test]
    fn test_slash_with_club_knocks_back() {
        let mut session = empty_session();
        land(&mut session);
        session.player.unlocks.weapon = Weapon::Club;
        let right = session.player.body.right();
        let top = session.player.body.top();
        add_enemy(&mut session, 50, EnemyKind::Guard, Vec2::new(right + 5.0, top - 18.0));

        tick(&mut session, InputFrame::with(InputFrame::MELEE));
        let guard = &session.enemies[&50];
        assert_eq!(guard.health, 2);
        assert!(guard.body.left() >= right + 5.0 + 60.0 - 2.0);
    }

    #[test]
    fn test_blast_requires_level_unlock() {
        let mut session = empty_session();
        tick(&mut session, InputFrame::with(InputFrame::RANGED));
        assert!(session.projectiles.is_empty());

        session.load_level(&empty_layout(), 1).expect("valid");
        tick(&mut session, InputFrame::with(InputFrame::RANGED));
        assert_eq!(session.projectiles.len(), 1);
    }

    #[test]
    fn test_blast_defeats_enemy_once() {
        let mut session = empty_session();
        land(&mut session);
        session.player.unlocks.has_ranged_attack = true;
        session.player.unlocks.can_double_shot = true;
        let right = session.player.body.right();
        let top = session.player.body.top();
        add_enemy(&mut session, 50, EnemyKind::Walker, Vec2::new(right + 10.0, top - 18.0));
        if let Some(walker) = session.enemies.get_mut(&50) {
            walker.body.velocity.x = 0.0;
        }

        let mut events = Vec::new();
        events.extend(tick(&mut session, InputFrame::with(InputFrame::RANGED)).events);
        for _ in 0..5 {
            events.extend(tick(&mut session, idle()).events);
        }

        let defeats = events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::EnemyDefeated { .. }))
            .count();
        assert_eq!(defeats, 1);
        assert_eq!(session.score, session.config.scoring.walker_award);
    }

    #[test]
    fn test_double_blast_on_one_enemy_credits_once() {
        let mut session = empty_session();
        land(&mut session);
        session.player.unlocks.has_ranged_attack = true;
        session.player.unlocks.can_double_shot = true;
        session.player.facing = Facing::Right;
        let right = session.player.body.right();
        let top = session.player.body.top();
        add_enemy(&mut session, 50, EnemyKind::Walker, Vec2::new(right + 10.0, top - 18.0));
        if let Some(walker) = session.enemies.get_mut(&50) {
            walker.body.velocity.x = 0.0;
        }

        // Both blasts reach the walker in the same pass
        let result = tick(&mut session, InputFrame::with(InputFrame::RANGED));

        let defeats = result
            .events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::EnemyDefeated { .. }))
            .count();
        assert_eq!(defeats, 1);
        assert_eq!(session.score, session.config.scoring.walker_award);
        assert!(!session.enemies.contains_key(&50));
        let blasts_left = session
            .projectiles
            .iter()
            .filter(|p| p.kind == ProjectileKind::PlayerBlast)
            .count();
        assert_eq!(blasts_left, 1, "second blast finds no living target");
    }

    #[test]
    fn test_collect_all_coins_completes_level() {
        let mut layout = empty_layout();
        layout.coins = vec![Vec2::new(100.0, 540.0)];
        let mut session = Session::new(WorldConfig::default(), &layout, 7).expect("valid");

        let mut status = SessionStatus::Active;
        for _ in 0..200 {
            status = tick(&mut session, idle()).status;
            if status != SessionStatus::Active {
                break;
            }
        }
        assert_eq!(status, SessionStatus::LevelComplete);
        assert_eq!(session.score, 1);

        // Nothing simulates after completion
        let before = session.tick;
        tick(&mut session, idle());
        assert_eq!(session.tick, before);
    }

    #[test]
    fn test_boss_defeat_completes_level() {
        let mut session = Session::new(WorldConfig::default(), &boss_layout(), 3).expect("valid");
        let BossEncounter::Active { enemy_id } = session.boss else {
            panic!("boss level");
        };
        if let Some(boss) = session.enemies.get_mut(&enemy_id) {
            boss.health = 1;
        }

        let outcome = damage_enemy(&mut session, enemy_id, AttackKind::Blast, 3, 0.0);
        assert!(outcome.defender_died);
        assert_eq!(session.boss, BossEncounter::Defeated);

        let again = damage_enemy(&mut session, enemy_id, AttackKind::Blast, 3, 0.0);
        assert!(!again.defender_died);
        assert_eq!(session.score, session.config.scoring.boss_award);

        let result = tick(&mut session, idle());
        assert_eq!(result.status, SessionStatus::LevelComplete);
    }

    #[test]
    fn test_game_over_emits_run_score_once() {
        let mut session = empty_session();
        land(&mut session);
        session.lives = 1;
        let player_pos = session.player.body.position;
        add_enemy(&mut session, 50, EnemyKind::Walker, Vec2::new(player_pos.x + 10.0, player_pos.y - 18.0));
        add_enemy(&mut session, 51, EnemyKind::Walker, Vec2::new(player_pos.x - 10.0, player_pos.y - 18.0));
        session.projectiles.push(Projectile::centered(
            ProjectileKind::BossBlast,
            session.player.body.center(),
            Vec2::ZERO,
            10.0,
            100,
        ));

        let result = tick(&mut session, idle());
        assert_eq!(result.status, SessionStatus::GameOver);
        assert_eq!(session.lives, 0);
        let game_overs = result
            .events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_power_up_consumed_once() {
        let mut session = session();
        let pos = session.player.body.position;
        session.power_ups[0].position = pos;

        tick(&mut session, idle());
        assert_eq!(session.lives, 4);
        assert!(session.power_ups.is_empty());

        tick(&mut session, idle());
        assert_eq!(session.lives, 4);
    }

    #[test]
    fn test_passenger_on_moving_platform() {
        let mut layout = empty_layout();
        layout.platforms.push(PlatformSpec::moving(
            0.0,
            300.0,
            400.0,
            20.0,
            PlatformMotion { patrol_min_x: 0.0, patrol_max_x: 700.0, speed: 1.0 },
        ));
        let mut session = Session::new(WorldConfig::default(), &layout, 7).expect("valid");
        land(&mut session);
        assert_eq!(session.player.body.bottom(), 300.0);

        let x = session.player.body.position.x;
        tick(&mut session, idle());
        assert_eq!(session.player.body.position.x, x + 1.0);
    }

    #[test]
    fn test_determinism() {
        let mut script = InputScript::new();
        script
            .hold(0, 40, InputFrame::with(InputFrame::MOVE_RIGHT))
            .hold(50, 1, InputFrame::with(InputFrame::JUMP))
            .hold(60, 1, InputFrame::with(InputFrame::ROLL));

        let mut a = session();
        let mut b = session();
        let events_a = run_script(&mut a, &script, 300);
        let events_b = run_script(&mut b, &script, 300);

        assert_eq!(a.compute_hash(), b.compute_hash());
        assert_eq!(events_a.len(), events_b.len());
    }

    #[test]
    fn test_basic_layout_runs() {
        let mut session = Session::new(WorldConfig::default(), &basic_layout(), 1).expect("valid");
        for _ in 0..600 {
            tick(&mut session, idle());
        }
        assert!(session.tick > 0);
    }

    proptest! {
        #[test]
        fn prop_mutual_exclusion_through_ticks(script in proptest::collection::vec(0u16..256, 1..150)) {
            let mut session = session();
            session.player.unlocks.has_ranged_attack = true;

            for bits in script {
                tick(&mut session, InputFrame::with(bits));
                let p = &session.player;
                let active = [p.is_rolling(), p.is_shielding(), p.is_fire_dashing()]
                    .iter()
                    .filter(|b| **b)
                    .count();
                prop_assert!(active <= 1);
                prop_assert_eq!(p.invincible(), active == 1);
                prop_assert!(p.jump_charges <= p.jump_charges_max(&session.config));
            }
        }

        #[test]
        fn prop_fall_always_costs_one_life(
            ability in 0u8..4,
            orbit in 0u32..=5,
        ) {
            let mut layout = empty_layout();
            layout.platforms.clear();
            let mut session = Session::new(WorldConfig::default(), &layout, 7).expect("valid");
            session.player.unlocks.orbit_charges = orbit;
            session.player.body.position.y = session.config.world_height;
            session.player.ability = match ability {
                0 => ActiveAbility::Neutral,
                1 => ActiveAbility::Rolling { remaining: 50 },
                2 => ActiveAbility::Shielding { remaining: 50 },
                _ => ActiveAbility::FireDashing { remaining: 50 },
            };
            if ability == 1 || ability == 3 {
                // Suspended vertical physics: already below the bound
                session.player.body.position.y = session.config.world_height + 1.0;
            }

            tick(&mut session, InputFrame::new());
            prop_assert_eq!(session.lives, 2);
            prop_assert_eq!(session.player.unlocks.orbit_charges, orbit);
        }
    }
}
