//! Level Session State
//!
//! `Session` owns every actor collection plus the run counters. It is
//! passed explicitly into the tick function; nothing else mutates it.
//! Enemies live in a BTreeMap so iteration order is deterministic.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::core::hash::{StateHash, compute_state_hash};
use crate::core::{DeterministicRng, Vec2};
use crate::game::body::Platform;
use crate::game::config::WorldConfig;
use crate::game::enemy::{EnemyId, EnemyKind, EnemyState};
use crate::game::events::{GameEvent, LifeLossCause, RunEndReason};
use crate::game::input::InputEdges;
use crate::game::level::{LevelLayout, SetupError};
use crate::game::orbit::OrbitRing;
use crate::game::pickup::{Coin, PowerUp};
use crate::game::player::{ActiveAbility, CharacterId, PlayerState, Unlocks, Weapon};
use crate::game::projectile::Projectile;

// =============================================================================
// STATUS
// =============================================================================

/// Whether the level is still being played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionStatus {
    #[default]
    Active,
    LevelComplete,
    GameOver,
}

/// Boss encounter state. `Active -> Defeated` only, no re-entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BossEncounter {
    /// Not a boss level.
    #[default]
    Absent,
    Active { enemy_id: EnemyId },
    Defeated,
}

// =============================================================================
// SESSION
// =============================================================================

/// Complete state of a run in progress.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// World tunables, validated at construction
    pub config: WorldConfig,

    /// Ticks simulated in the current level
    pub tick: u32,

    pub status: SessionStatus,

    /// Score across the whole run (never decreases)
    pub score: u32,

    pub lives: u32,

    /// Current level (starts at 0)
    pub level_index: u32,

    /// Cosmetic character chosen at player-select
    pub character: CharacterId,

    /// Respawn point of the current level
    pub spawn_point: Vec2,

    pub player: PlayerState,

    /// Tokens matching `player.unlocks.orbit_charges`
    pub orbit: OrbitRing,

    pub platforms: Vec<Platform>,

    /// Uncollected coins, including ones dropped by enemies
    pub coins: Vec<Coin>,

    /// Coins placed by the layout
    pub initial_coin_count: usize,

    /// All enemies (BTreeMap for deterministic iteration)
    pub enemies: BTreeMap<EnemyId, EnemyState>,

    pub projectiles: Vec<Projectile>,

    pub power_ups: Vec<PowerUp>,

    pub boss: BossEncounter,

    /// RNG seed (for verification)
    pub rng_seed: u64,

    /// Coin drop scatter
    pub rng: DeterministicRng,

    /// Previous input frame for edge detection
    pub input: InputEdges,

    /// A life was lost earlier this tick; later hits are ignored
    #[serde(skip)]
    pub(crate) life_lost_this_tick: bool,

    /// Events generated this tick (cleared each tick)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl Session {
    /// Start a run on `layout` as level 0.
    ///
    /// Both the configuration and the layout are validated here, so a
    /// malformed setup never reaches a tick.
    pub fn new(config: WorldConfig, layout: &LevelLayout, rng_seed: u64) -> Result<Self, SetupError> {
        config.validate()?;
        layout.validate(&config)?;

        let player = PlayerState::new(layout.spawn_point, &config);
        let mut session = Self {
            tick: 0,
            status: SessionStatus::Active,
            score: 0,
            lives: config.starting_lives,
            level_index: 0,
            character: CharacterId::default(),
            spawn_point: layout.spawn_point,
            player,
            orbit: OrbitRing::new(),
            platforms: Vec::new(),
            coins: Vec::new(),
            initial_coin_count: 0,
            enemies: BTreeMap::new(),
            projectiles: Vec::new(),
            power_ups: Vec::new(),
            boss: BossEncounter::Absent,
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            input: InputEdges::new(),
            life_lost_this_tick: false,
            pending_events: Vec::new(),
            config,
        };
        session.install_layout(layout, 0);
        Ok(session)
    }

    /// Replace the roster with `layout` for `level_index`. Score, lives and
    /// unlocks carry over; transient player state is cleared.
    pub fn load_level(&mut self, layout: &LevelLayout, level_index: u32) -> Result<(), SetupError> {
        layout.validate(&self.config)?;
        self.install_layout(layout, level_index);
        Ok(())
    }

    fn install_layout(&mut self, layout: &LevelLayout, level_index: u32) {
        let config = &self.config;

        self.level_index = level_index;
        self.tick = 0;
        self.status = SessionStatus::Active;
        self.spawn_point = layout.spawn_point;

        self.platforms = layout.platforms.iter().map(|p| p.build()).collect();
        self.coins = layout
            .coins
            .iter()
            .map(|pos| Coin::new(*pos, config.coin_size))
            .collect();
        self.initial_coin_count = self.coins.len();

        self.enemies.clear();
        let mut next_id: EnemyId = 1;
        for spawn in &layout.enemies {
            let enemy = EnemyState::new(next_id, spawn.kind, spawn.position, spawn.patrol_range, spawn.health, config);
            self.enemies.insert(next_id, enemy);
            next_id += 1;
        }

        self.boss = match &layout.boss {
            Some(spawn) => {
                let boss = EnemyState::new(next_id, EnemyKind::Boss, spawn.position, spawn.patrol_range, spawn.health, config);
                self.enemies.insert(next_id, boss);
                BossEncounter::Active { enemy_id: next_id }
            }
            None => BossEncounter::Absent,
        };

        self.projectiles.clear();
        self.power_ups = layout
            .power_up
            .iter()
            .map(|p| PowerUp::new(p.kind, p.position, config.power_up_size))
            .collect();

        if level_index >= config.ranged_unlock_level {
            self.player.unlocks.has_ranged_attack = true;
        }

        self.player.respawn(self.spawn_point, config);
        self.orbit = OrbitRing::new();
        self.orbit.sync(self.player.unlocks.orbit_charges, self.player.body.center(), config.orbit_radius);
        self.input.reset();
        self.life_lost_this_tick = false;

        info!(
            level = level_index,
            platforms = self.platforms.len(),
            coins = self.initial_coin_count,
            enemies = self.enemies.len(),
            boss = self.is_boss_level(),
            "level loaded"
        );
    }

    /// Reset to the start of a new run: score, lives and unlocks cleared.
    pub fn reset_run(&mut self, layout: &LevelLayout, character: CharacterId, weapon: Weapon) -> Result<(), SetupError> {
        layout.validate(&self.config)?;
        self.score = 0;
        self.lives = self.config.starting_lives;
        self.character = character;
        self.player.unlocks = Unlocks { weapon, ..Unlocks::default() };
        self.install_layout(layout, 0);
        Ok(())
    }

    #[inline]
    pub fn is_boss_level(&self) -> bool {
        self.boss != BossEncounter::Absent
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Player hits still count this tick.
    #[inline]
    pub fn player_can_be_hit(&self) -> bool {
        self.is_active() && !self.life_lost_this_tick
    }

    /// Boss health in `[0, 1]`, if this is a boss level.
    pub fn boss_health_fraction(&self) -> Option<f32> {
        match self.boss {
            BossEncounter::Absent => None,
            BossEncounter::Active { enemy_id } => {
                Some(self.enemies.get(&enemy_id).map_or(0.0, |b| b.health_fraction()))
            }
            BossEncounter::Defeated => Some(0.0),
        }
    }

    pub fn add_score(&mut self, amount: u32) -> u32 {
        self.score = self.score.saturating_add(amount);
        self.score
    }

    /// Lose a life to a fall. Invincibility does not matter here.
    pub fn fall(&mut self) {
        if !self.is_active() || self.life_lost_this_tick {
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        self.after_life_lost(LifeLossCause::Fall);
    }

    /// Follow-up once `lives` has been decremented: respawn, or game over
    /// when none remain.
    pub(crate) fn after_life_lost(&mut self, cause: LifeLossCause) {
        self.life_lost_this_tick = true;
        self.push_event(GameEvent::life_lost(self.tick, cause, self.lives));
        debug!(?cause, lives = self.lives, "life lost");

        if self.lives == 0 {
            self.game_over();
            return;
        }

        self.player.respawn(self.spawn_point, &self.config);
        self.orbit.sync(self.player.unlocks.orbit_charges, self.player.body.center(), self.config.orbit_radius);
    }

    fn game_over(&mut self) {
        if self.status == SessionStatus::GameOver {
            return;
        }
        self.status = SessionStatus::GameOver;
        self.player.ability = ActiveAbility::Neutral;
        self.push_event(GameEvent::game_over(self.tick, self.score));
        self.push_event(GameEvent::run_score(self.tick, self.score, RunEndReason::GameOver));
        info!(score = self.score, level = self.level_index, "game over");
    }

    pub(crate) fn complete_level(&mut self) {
        if !self.is_active() {
            return;
        }
        self.status = SessionStatus::LevelComplete;
        self.push_event(GameEvent::level_complete(self.tick, self.level_index));
        self.push_event(GameEvent::run_score(self.tick, self.score, RunEndReason::LevelComplete));
        info!(score = self.score, level = self.level_index, "level complete");
    }

    /// Non-boss levels finish when every coin is collected; boss levels
    /// when the boss falls.
    pub fn level_finished(&self) -> bool {
        match self.boss {
            BossEncounter::Absent => self.initial_coin_count > 0 && self.coins.is_empty(),
            BossEncounter::Active { .. } => false,
            BossEncounter::Defeated => true,
        }
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            hasher.update_u32(self.score);
            hasher.update_u32(self.lives);
            hasher.update_u32(self.level_index);
            hasher.update_u8(self.status as u8);

            self.player.hash_into(hasher);

            for platform in &self.platforms {
                hasher.update_vec2(platform.body.position);
                hasher.update_f32(platform.body.velocity.x);
            }

            for coin in &self.coins {
                hasher.update_vec2(coin.position);
            }

            // BTreeMap guarantees sorted order
            for enemy in self.enemies.values() {
                enemy.hash_into(hasher);
            }

            for projectile in &self.projectiles {
                hasher.update_u8(projectile.kind as u8);
                hasher.update_vec2(projectile.body.position);
                hasher.update_u32(projectile.remaining_lifetime);
            }

            for power_up in &self.power_ups {
                hasher.update_u8(power_up.kind as u8);
                hasher.update_bool(power_up.consumed);
            }

            let [a, b] = self.rng.state();
            hasher.update_u64(a);
            hasher.update_u64(b);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
