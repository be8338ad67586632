//! # Platformer Core
//!
//! Fixed-tick simulation for a 2D side-scrolling action platformer:
//! kinematic bodies, platform collision, the player ability state machine,
//! combat, enemy behavior and the game flow that gates it all.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      PLATFORMER CORE                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── vec2.rs     - 2D vector                                 │
//! │  ├── rect.rs     - Axis-aligned boxes                        │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing                             │
//! │                                                              │
//! │  game/           - Simulation                                │
//! │  ├── body.rs     - Bodies and platforms                      │
//! │  ├── collision.rs- Axis-separated resolution                 │
//! │  ├── ability.rs  - Player ability state machine              │
//! │  ├── combat.rs   - Hit resolution                            │
//! │  ├── enemy.rs    - Enemy behavior policies                   │
//! │  ├── state.rs    - Level session state                       │
//! │  ├── tick.rs     - Simulation step                           │
//! │  └── flow.rs     - Game flow state machine                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tick Pipeline
//!
//! Game flow gates the tick. While playing, buffered intents drive the
//! player, all bodies integrate against the platforms, enemy policies run,
//! combat resolves overlaps into health, score and lives, and the session
//! evaluates completion. The renderer reads a `Snapshot` afterwards.
//!
//! Given the same configuration, layouts, seed and input frames, a run
//! replays identically on the same build.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::core::{Aabb, DeterministicRng, Vec2};
pub use game::config::{ConfigError, WorldConfig};
pub use game::flow::{FlowError, Game, GameFlow};
pub use game::input::{InputFrame, InputScript};
pub use game::level::{LevelLayout, LevelSource, SetupError, StaticLevels};
pub use game::state::Session;
pub use game::tick::{tick, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
