//! Renderer Snapshot
//!
//! A read-only copy of everything the presentation layer draws, built
//! once per tick. Positions are top-left corners in world units.

use serde::{Serialize, Deserialize};

use crate::core::Vec2;
use crate::game::body::Body;
use crate::game::enemy::{EnemyId, EnemyKind};
use crate::game::flow::GameFlow;
use crate::game::pickup::PowerUpKind;
use crate::game::player::{CharacterId, Facing, Weapon};
use crate::game::projectile::ProjectileKind;
use crate::game::state::Session;

/// Axis-aligned box as drawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<&Body> for BoxView {
    fn from(body: &Body) -> Self {
        Self {
            x: body.position.x,
            y: body.position.y,
            width: body.size.x,
            height: body.size.y,
        }
    }
}

/// Player state in a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub bounds: BoxView,
    pub character: CharacterId,
    pub facing: Facing,
    pub weapon: Weapon,
    pub rolling: bool,
    pub shielding: bool,
    pub fire_dashing: bool,
    pub invincible: bool,
    /// Attack animation window (the shared attack cooldown is running).
    pub attacking: bool,
    pub jump_charges: u32,
    pub orbit_charges: u32,
    pub has_ranged_attack: bool,
}

/// Enemy state in a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub bounds: BoxView,
    pub facing: Facing,
    pub health: i32,
    pub max_health: i32,
}

/// Complete frame for the renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u32,
    pub flow: GameFlow,
    pub level_index: u32,
    pub score: u32,
    pub lives: u32,
    /// `None` outside boss levels.
    pub boss_health: Option<f32>,
    pub player: PlayerView,
    /// Orbit token centres.
    pub orbit_lights: Vec<Vec2>,
    pub platforms: Vec<BoxView>,
    pub coins: Vec<BoxView>,
    pub power_ups: Vec<(PowerUpKind, BoxView)>,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<(ProjectileKind, BoxView)>,
}

impl Snapshot {
    /// Capture the session as it stands.
    pub fn capture(session: &Session, flow: GameFlow) -> Self {
        let player = &session.player;

        let enemies = session
            .enemies
            .values()
            .filter(|e| e.alive)
            .map(|e| EnemyView {
                id: e.id,
                kind: e.kind,
                bounds: BoxView::from(&e.body),
                facing: e.facing(),
                health: e.health,
                max_health: e.max_health,
            })
            .collect();

        let coins = session
            .coins
            .iter()
            .map(|c| {
                let aabb = c.aabb();
                BoxView {
                    x: aabb.left(),
                    y: aabb.top(),
                    width: aabb.size.x,
                    height: aabb.size.y,
                }
            })
            .collect();

        let power_ups = session
            .power_ups
            .iter()
            .filter(|p| !p.consumed)
            .map(|p| {
                (
                    p.kind,
                    BoxView {
                        x: p.position.x,
                        y: p.position.y,
                        width: p.size,
                        height: p.size,
                    },
                )
            })
            .collect();

        Self {
            tick: session.tick,
            flow,
            level_index: session.level_index,
            score: session.score,
            lives: session.lives,
            boss_health: session.boss_health_fraction(),
            player: PlayerView {
                bounds: BoxView::from(&player.body),
                character: session.character,
                facing: player.facing,
                weapon: player.unlocks.weapon,
                rolling: player.is_rolling(),
                shielding: player.is_shielding(),
                fire_dashing: player.is_fire_dashing(),
                invincible: player.invincible(),
                attacking: player.attacking(),
                jump_charges: player.jump_charges,
                orbit_charges: player.unlocks.orbit_charges,
                has_ranged_attack: player.unlocks.has_ranged_attack,
            },
            orbit_lights: session.orbit.lights.iter().map(|l| l.position).collect(),
            platforms: session.platforms.iter().map(|p| BoxView::from(&p.body)).collect(),
            coins,
            power_ups,
            enemies,
            projectiles: session
                .projectiles
                .iter()
                .map(|p| (p.kind, BoxView::from(&p.body)))
                .collect(),
        }
    }

    /// Serialize for an external renderer process.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::WorldConfig;
    use crate::game::input::InputFrame;
    use crate::game::player::ActiveAbility;
    use crate::game::state::tests::{boss_layout, session};
    use crate::game::tick::tick;

    #[test]
    fn test_capture_basic() {
        let session = session();
        let snapshot = Snapshot::capture(&session, GameFlow::Playing);

        assert_eq!(snapshot.lives, 3);
        assert_eq!(snapshot.coins.len(), 2);
        assert_eq!(snapshot.enemies.len(), 1);
        assert_eq!(snapshot.power_ups.len(), 1);
        assert_eq!(snapshot.boss_health, None);
        assert_eq!(snapshot.player.bounds.width, 32.0);
        assert!(!snapshot.player.invincible);
    }

    #[test]
    fn test_ability_flags() {
        let mut session = session();
        session.player.ability = ActiveAbility::Shielding { remaining: 10 };
        session.player.cooldowns.attack = 5;

        let snapshot = Snapshot::capture(&session, GameFlow::Playing);
        assert!(snapshot.player.shielding);
        assert!(snapshot.player.invincible);
        assert!(snapshot.player.attacking);
        assert!(!snapshot.player.rolling);
    }

    #[test]
    fn test_boss_health_fraction() {
        let mut session = Session::new(WorldConfig::default(), &boss_layout(), 5).expect("valid");
        for enemy in session.enemies.values_mut() {
            enemy.health = 25;
        }
        let snapshot = Snapshot::capture(&session, GameFlow::BossFight);
        assert_eq!(snapshot.boss_health, Some(0.25));
    }

    #[test]
    fn test_orbit_lights_follow_charges() {
        let mut session = session();
        session.player.unlocks.orbit_charges = 3;
        tick(&mut session, InputFrame::new());

        let snapshot = Snapshot::capture(&session, GameFlow::Playing);
        assert_eq!(snapshot.orbit_lights.len(), 3);
    }

    #[test]
    fn test_json_export() {
        let snapshot = Snapshot::capture(&session(), GameFlow::Menu);
        let json = snapshot.to_json().expect("serializable");
        assert!(json.contains("\"score\":0"));
    }
}
