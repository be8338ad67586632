//! Orbiting Lights
//!
//! One visual token per orbit charge, evenly spaced around the player and
//! rotating at a fixed rate. The ring is rebuilt whenever the charge count
//! changes, so `lights.len() == orbit_charges` after every sync.

use std::f32::consts::TAU;

use serde::{Serialize, Deserialize};

use crate::core::Vec2;

/// A single token around the player.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitLight {
    /// Offset of this token from the ring's base angle.
    pub slot_angle: f32,
    /// World position, refreshed by `advance`.
    pub position: Vec2,
}

/// The ring of tokens.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitRing {
    pub lights: Vec<OrbitLight>,
    pub base_angle: f32,
}

impl OrbitRing {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Rebuild to `charges` tokens if the count differs.
    pub fn sync(&mut self, charges: u32, center: Vec2, radius: f32) {
        if self.lights.len() == charges as usize {
            return;
        }
        let step = if charges == 0 { 0.0 } else { TAU / charges as f32 };
        self.lights = (0..charges)
            .map(|i| OrbitLight {
                slot_angle: step * i as f32,
                position: Vec2::ZERO,
            })
            .collect();
        self.place(center, radius);
    }

    /// Rotate one tick and follow the player.
    pub fn advance(&mut self, center: Vec2, radius: f32, angular_speed: f32) {
        self.base_angle = (self.base_angle + angular_speed) % TAU;
        self.place(center, radius);
    }

    /// Drop exactly one token. The remaining ones are respaced.
    pub fn remove_one(&mut self, center: Vec2, radius: f32) -> bool {
        if self.lights.is_empty() {
            return false;
        }
        let remaining = self.lights.len() as u32 - 1;
        self.lights.clear();
        self.sync(remaining, center, radius);
        true
    }

    fn place(&mut self, center: Vec2, radius: f32) {
        for light in &mut self.lights {
            light.position = center.polar_offset(radius, self.base_angle + light.slot_angle);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
