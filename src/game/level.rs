//! Level Layouts
//!
//! The level generator lives outside the core. It hands over a
//! `LevelLayout` as plain data through the `LevelSource` trait; the core
//! validates it once at setup and never generates geometry itself.

use serde::{Serialize, Deserialize};

use crate::core::{Aabb, Vec2};
use crate::game::body::Platform;
use crate::game::config::{ConfigError, WorldConfig};
use crate::game::enemy::EnemyKind;
use crate::game::pickup::PowerUpKind;

/// Layout errors, surfaced to the caller of session setup.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// An enemy would patrol a zero-width range.
    #[error("enemy {index} has non-positive patrol range {range}")]
    ZeroPatrolRange { index: usize, range: f32 },

    /// An enemy would spawn dead.
    #[error("enemy {index} has non-positive health {health}")]
    NonPositiveHealth { index: usize, health: i32 },

    /// A boss was placed in the regular roster, or a non-boss in the boss slot.
    #[error("enemy {index} kind {kind:?} is not allowed in this slot")]
    MisplacedKind { index: usize, kind: EnemyKind },

    /// Platform has no area.
    #[error("platform {index} has non-positive size {width}x{height}")]
    DegeneratePlatform { index: usize, width: f32, height: f32 },

    /// Moving platform bounds are inverted or it has no speed.
    #[error("platform {index} patrol [{min}, {max}] at speed {speed} is invalid")]
    InvalidPlatformPatrol { index: usize, min: f32, max: f32, speed: f32 },

    /// A coordinate, size or speed is NaN or infinite.
    #[error("{what} {index} has a non-finite value")]
    NonFinite { what: &'static str, index: usize },

    /// Player spawn point lies outside the world.
    #[error("spawn point ({x}, {y}) lies outside the world")]
    SpawnOutsideWorld { x: f32, y: f32 },

    /// No coins and no boss: the level could never complete.
    #[error("level has no coins and no boss")]
    Unwinnable,

    /// A level source had nothing to offer.
    #[error("level source has no layouts")]
    NoLayouts,
}

/// Session setup errors.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

// =============================================================================
// LAYOUT DATA
// =============================================================================

/// Horizontal shuttle for a moving platform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformMotion {
    pub patrol_min_x: f32,
    pub patrol_max_x: f32,
    /// Signed starting speed; negative starts leftward.
    pub speed: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub motion: Option<PlatformMotion>,
}

impl PlatformSpec {
    pub fn fixed(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height, motion: None }
    }

    pub fn moving(x: f32, y: f32, width: f32, height: f32, motion: PlatformMotion) -> Self {
        Self { x, y, width, height, motion: Some(motion) }
    }

    pub fn build(&self) -> Platform {
        match self.motion {
            None => Platform::new_static(self.x, self.y, self.width, self.height),
            Some(m) => Platform::new_moving(
                self.x,
                self.y,
                self.width,
                self.height,
                m.patrol_min_x,
                m.patrol_max_x,
                m.speed,
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub position: Vec2,
    pub patrol_range: f32,
    /// Overrides the archetype's default health.
    #[serde(default)]
    pub health: Option<i32>,
}

impl EnemySpawn {
    pub fn new(kind: EnemyKind, position: Vec2, patrol_range: f32) -> Self {
        Self { kind, position, patrol_range, health: None }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerUpSpawn {
    pub kind: PowerUpKind,
    pub position: Vec2,
}

/// Initial roster of one level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelLayout {
    pub spawn_point: Vec2,
    pub platforms: Vec<PlatformSpec>,
    pub coins: Vec<Vec2>,
    pub enemies: Vec<EnemySpawn>,
    pub power_up: Option<PowerUpSpawn>,
    pub boss: Option<EnemySpawn>,
}

impl LevelLayout {
    #[inline]
    pub fn is_boss_level(&self) -> bool {
        self.boss.is_some()
    }

    /// Reject layouts that would misbehave mid-tick.
    pub fn validate(&self, config: &WorldConfig) -> Result<(), LayoutError> {
        self.check_finite()?;

        let world = Aabb::from_xywh(0.0, 0.0, config.world_width, config.world_height);
        let spawn = Aabb::new(self.spawn_point, config.player_size());
        if !(spawn.left() >= world.left()
            && spawn.right() <= world.right()
            && spawn.top() >= world.top()
            && spawn.bottom() <= world.bottom())
        {
            return Err(LayoutError::SpawnOutsideWorld {
                x: self.spawn_point.x,
                y: self.spawn_point.y,
            });
        }

        for (index, p) in self.platforms.iter().enumerate() {
            if !(p.width > 0.0 && p.height > 0.0) {
                return Err(LayoutError::DegeneratePlatform {
                    index,
                    width: p.width,
                    height: p.height,
                });
            }
            if let Some(m) = p.motion {
                if !(m.patrol_min_x <= m.patrol_max_x) || m.speed == 0.0 || !m.speed.is_finite() {
                    return Err(LayoutError::InvalidPlatformPatrol {
                        index,
                        min: m.patrol_min_x,
                        max: m.patrol_max_x,
                        speed: m.speed,
                    });
                }
            }
        }

        for (index, spawn) in self.enemies.iter().enumerate() {
            if spawn.kind == EnemyKind::Boss {
                return Err(LayoutError::MisplacedKind { index, kind: spawn.kind });
            }
            check_enemy(index, spawn)?;
        }

        if let Some(boss) = &self.boss {
            let index = self.enemies.len();
            if boss.kind != EnemyKind::Boss {
                return Err(LayoutError::MisplacedKind { index, kind: boss.kind });
            }
            check_enemy(index, boss)?;
        }

        if self.coins.is_empty() && self.boss.is_none() {
            return Err(LayoutError::Unwinnable);
        }

        Ok(())
    }

    fn check_finite(&self) -> Result<(), LayoutError> {
        let non_finite = |what, index| LayoutError::NonFinite { what, index };

        if !self.spawn_point.is_finite() {
            return Err(non_finite("spawn point", 0));
        }
        for (index, p) in self.platforms.iter().enumerate() {
            let mut values = vec![p.x, p.y, p.width, p.height];
            if let Some(m) = p.motion {
                values.extend([m.patrol_min_x, m.patrol_max_x, m.speed]);
            }
            if !values.iter().all(|v| v.is_finite()) {
                return Err(non_finite("platform", index));
            }
        }
        if let Some(index) = self.coins.iter().position(|c| !c.is_finite()) {
            return Err(non_finite("coin", index));
        }
        let spawns = self.enemies.iter().chain(self.boss.iter());
        for (index, spawn) in spawns.enumerate() {
            if !spawn.position.is_finite() || !spawn.patrol_range.is_finite() {
                return Err(non_finite("enemy", index));
            }
        }
        if let Some(power_up) = &self.power_up {
            if !power_up.position.is_finite() {
                return Err(non_finite("power-up", 0));
            }
        }
        Ok(())
    }
}

fn check_enemy(index: usize, spawn: &EnemySpawn) -> Result<(), LayoutError> {
    if !(spawn.patrol_range > 0.0) {
        return Err(LayoutError::ZeroPatrolRange { index, range: spawn.patrol_range });
    }
    if let Some(health) = spawn.health {
        if health <= 0 {
            return Err(LayoutError::NonPositiveHealth { index, health });
        }
    }
    Ok(())
}

// =============================================================================
// LEVEL SOURCES
// =============================================================================

/// Supplies the layout for a level index.
pub trait LevelSource {
    fn layout(&mut self, level_index: u32) -> LevelLayout;
}

/// Hand-authored layouts, cycled by level index.
#[derive(Clone, Debug)]
pub struct StaticLevels {
    layouts: Vec<LevelLayout>,
}

impl StaticLevels {
    pub fn new(layouts: Vec<LevelLayout>) -> Result<Self, LayoutError> {
        if layouts.is_empty() {
            return Err(LayoutError::NoLayouts);
        }
        Ok(Self { layouts })
    }

    /// Parse a JSON array of layouts.
    pub fn from_json_str(json: &str) -> Result<Self, SetupError> {
        let layouts: Vec<LevelLayout> = serde_json::from_str(json).map_err(ConfigError::from)?;
        Ok(Self::new(layouts)?)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

impl LevelSource for StaticLevels {
    fn layout(&mut self, level_index: u32) -> LevelLayout {
        let idx = level_index as usize % self.layouts.len();
        self.layouts[idx].clone()
    }
}

impl<F> LevelSource for F
where
    F: FnMut(u32) -> LevelLayout,
{
    fn layout(&mut self, level_index: u32) -> LevelLayout {
        self(level_index)
    }
}

// =============================================================================
// TESTS
// =============================================================================
