//! Core primitives.
//!
//! Geometry, deterministic randomness and state hashing shared by every
//! simulation module.

pub mod vec2;
pub mod rect;
pub mod rng;
pub mod hash;

// Re-export core types
pub use vec2::Vec2;
pub use rect::Aabb;
pub use rng::DeterministicRng;
pub use hash::{StateHash, compute_state_hash};
