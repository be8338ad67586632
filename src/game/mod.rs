//! Game Logic Module
//!
//! All simulation code. Pure functions over an owned `Session`; no I/O.
//!
//! ## Module Structure
//!
//! - `config`: World tunables and validation
//! - `body`: Kinematic bodies and platforms
//! - `collision`: Axis-separated resolution against platforms
//! - `input`: Per-tick intents, edge detection, scripted input
//! - `player`: Player state, unlocks, cooldowns
//! - `ability`: Player ability state machine
//! - `orbit`: Orbit shield tokens
//! - `projectile`: Blasts and bolts
//! - `enemy`: Enemy archetypes and behavior policies
//! - `combat`: Hit resolution and damage rules
//! - `pickup`: Coins and power-ups
//! - `level`: Level layouts and level sources
//! - `state`: Level session state
//! - `tick`: The simulation step
//! - `flow`: Game flow state machine
//! - `snapshot`: Read-only view for the renderer
//! - `events`: Events emitted per tick

pub mod config;
pub mod body;
pub mod collision;
pub mod input;
pub mod player;
pub mod ability;
pub mod orbit;
pub mod projectile;
pub mod enemy;
pub mod combat;
pub mod pickup;
pub mod level;
pub mod state;
pub mod tick;
pub mod flow;
pub mod snapshot;
pub mod events;

// Re-export key types
pub use config::{ConfigError, WorldConfig};
pub use input::{InputFrame, InputScript};
pub use level::{LayoutError, LevelLayout, LevelSource, SetupError, StaticLevels};
pub use state::{Session, SessionStatus};
pub use tick::{tick, TickResult};
pub use flow::{FlowError, Game, GameFlow};
pub use snapshot::Snapshot;
pub use events::{GameEvent, GameEventData};
