//! Game Events
//!
//! Events generated during a tick for the renderer, audio and the
//! high-score store. The core never acts on them itself.

use serde::{Serialize, Deserialize};

use crate::game::ability::AbilityKind;
use crate::game::combat::AttackKind;
use crate::game::enemy::{EnemyId, EnemyKind};
use crate::game::pickup::PowerUpKind;
use crate::game::projectile::ProjectileKind;

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Lives and run end first
    LifeLoss = 0,
    /// Then enemy damage and defeats
    Combat = 1,
    /// Then pickups
    Pickup = 2,
    /// Then abilities and projectiles
    AbilityEffect = 3,
    /// Then level and flow transitions
    Transition = 4,
    /// Lowest priority
    Other = 255,
}

/// Why a life was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeLossCause {
    /// Dropped below the world.
    Fall,
    /// Took a hit with no protection left.
    Hit(AttackKind),
}

/// Why the score is being reported to the high-score store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEndReason {
    GameOver,
    LevelComplete,
    ExitToMenu,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Player picked up a coin
    CoinCollected { value: u32, new_score: u32 },

    /// Player picked up a power-up
    PowerUpCollected { kind: PowerUpKind },

    /// Enemy took damage and survived
    EnemyDamaged {
        enemy_id: EnemyId,
        attack: AttackKind,
        damage: i32,
        health_left: i32,
    },

    /// Enemy reached zero health
    EnemyDefeated {
        enemy_id: EnemyId,
        kind: EnemyKind,
        award: u32,
        new_score: u32,
    },

    /// Boss encounter ended
    BossDefeated { enemy_id: EnemyId },

    /// A hit on the player was fully absorbed
    PlayerHitBlocked { attack: AttackKind, orbit_consumed: bool },

    /// Player lost a life
    LifeLost { cause: LifeLossCause, lives_left: u32 },

    /// Player started an ability or attack
    AbilityUsed { ability: AbilityKind },

    /// A timed ability ran out
    AbilityEnded { ability: AbilityKind },

    /// A projectile was spawned
    ProjectileFired { kind: ProjectileKind },

    /// Every coin collected, or the boss defeated
    LevelComplete { level_index: u32 },

    /// Lives ran out
    GameOver { final_score: u32 },

    /// Score handed to the high-score store
    RunScore { final_score: u32, reason: RunEndReason },

    /// Macro-state changed
    FlowChanged { old_state: String, new_state: String },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Enemy involved (for tie-breaking)
    pub enemy_id: Option<EnemyId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: GameEventData) -> Self {
        let enemy_id = match &data {
            GameEventData::EnemyDamaged { enemy_id, .. }
            | GameEventData::EnemyDefeated { enemy_id, .. }
            | GameEventData::BossDefeated { enemy_id } => Some(*enemy_id),
            _ => None,
        };

        Self {
            tick,
            priority,
            enemy_id,
            data,
        }
    }

    pub fn coin_collected(tick: u32, value: u32, new_score: u32) -> Self {
        Self::new(tick, EventPriority::Pickup, GameEventData::CoinCollected { value, new_score })
    }

    pub fn power_up_collected(tick: u32, kind: PowerUpKind) -> Self {
        Self::new(tick, EventPriority::Pickup, GameEventData::PowerUpCollected { kind })
    }

    pub fn enemy_damaged(tick: u32, enemy_id: EnemyId, attack: AttackKind, damage: i32, health_left: i32) -> Self {
        Self::new(
            tick,
            EventPriority::Combat,
            GameEventData::EnemyDamaged {
                enemy_id,
                attack,
                damage,
                health_left,
            },
        )
    }

    pub fn enemy_defeated(tick: u32, enemy_id: EnemyId, kind: EnemyKind, award: u32, new_score: u32) -> Self {
        Self::new(
            tick,
            EventPriority::Combat,
            GameEventData::EnemyDefeated {
                enemy_id,
                kind,
                award,
                new_score,
            },
        )
    }

    pub fn boss_defeated(tick: u32, enemy_id: EnemyId) -> Self {
        Self::new(tick, EventPriority::Combat, GameEventData::BossDefeated { enemy_id })
    }

    pub fn player_hit_blocked(tick: u32, attack: AttackKind, orbit_consumed: bool) -> Self {
        Self::new(
            tick,
            EventPriority::Combat,
            GameEventData::PlayerHitBlocked { attack, orbit_consumed },
        )
    }

    pub fn life_lost(tick: u32, cause: LifeLossCause, lives_left: u32) -> Self {
        Self::new(tick, EventPriority::LifeLoss, GameEventData::LifeLost { cause, lives_left })
    }

    pub fn ability_used(tick: u32, ability: AbilityKind) -> Self {
        Self::new(tick, EventPriority::AbilityEffect, GameEventData::AbilityUsed { ability })
    }

    pub fn ability_ended(tick: u32, ability: AbilityKind) -> Self {
        Self::new(tick, EventPriority::AbilityEffect, GameEventData::AbilityEnded { ability })
    }

    pub fn projectile_fired(tick: u32, kind: ProjectileKind) -> Self {
        Self::new(tick, EventPriority::AbilityEffect, GameEventData::ProjectileFired { kind })
    }

    pub fn level_complete(tick: u32, level_index: u32) -> Self {
        Self::new(tick, EventPriority::Transition, GameEventData::LevelComplete { level_index })
    }

    pub fn game_over(tick: u32, final_score: u32) -> Self {
        Self::new(tick, EventPriority::LifeLoss, GameEventData::GameOver { final_score })
    }

    pub fn run_score(tick: u32, final_score: u32, reason: RunEndReason) -> Self {
        Self::new(tick, EventPriority::Other, GameEventData::RunScore { final_score, reason })
    }

    pub fn flow_changed(tick: u32, old_state: impl Into<String>, new_state: impl Into<String>) -> Self {
        Self::new(
            tick,
            EventPriority::Transition,
            GameEventData::FlowChanged {
                old_state: old_state.into(),
                new_state: new_state.into(),
            },
        )
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick
            && self.priority == other.priority
            && self.enemy_id == other.enemy_id
    }
}

impl Eq for GameEvent {}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: tick, then priority, then enemy id
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
            .then(self.enemy_id.cmp(&other.enemy_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ordering() {
        let lost = GameEvent::life_lost(10, LifeLossCause::Fall, 2);
        let coin = GameEvent::coin_collected(10, 1, 5);
        let defeat_a = GameEvent::enemy_defeated(10, 1, EnemyKind::Walker, 5, 10);
        let defeat_b = GameEvent::enemy_defeated(10, 2, EnemyKind::Walker, 5, 15);

        // Same tick, but life loss < pickup
        assert!(lost < coin);

        // Same tick and priority, lower enemy id first
        assert!(defeat_a < defeat_b);

        // Earlier tick first regardless of priority
        assert!(GameEvent::run_score(9, 0, RunEndReason::ExitToMenu) < lost);
    }

    #[test]
    fn test_enemy_id_extracted() {
        assert_eq!(GameEvent::boss_defeated(1, 42).enemy_id, Some(42));
        assert_eq!(GameEvent::coin_collected(1, 1, 1).enemy_id, None);
    }
}
