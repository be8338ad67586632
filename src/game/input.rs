//! Input Intents
//!
//! The input layer delivers one `InputFrame` per tick: a packed set of
//! held intents. Movement is level-triggered; every other intent is
//! edge-triggered, so the session keeps the previous frame and derives
//! presses from the transition.

use serde::{Serialize, Deserialize};

// =============================================================================
// INPUT FRAME
// =============================================================================

/// Intents held during one tick.
///
/// Bits:
/// - 0: move left
/// - 1: move right
/// - 2: jump
/// - 3: melee
/// - 4: ranged
/// - 5: shield
/// - 6: roll
/// - 7: fire-dash combo (ranged + roll together)
/// - 8: pause
/// - 9: menu back
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFrame {
    pub flags: u16,
}

impl InputFrame {
    pub const MOVE_LEFT: u16 = 1 << 0;
    pub const MOVE_RIGHT: u16 = 1 << 1;
    pub const JUMP: u16 = 1 << 2;
    pub const MELEE: u16 = 1 << 3;
    pub const RANGED: u16 = 1 << 4;
    pub const SHIELD: u16 = 1 << 5;
    pub const ROLL: u16 = 1 << 6;
    pub const FIRE_DASH_COMBO: u16 = 1 << 7;
    pub const PAUSE: u16 = 1 << 8;
    pub const MENU_BACK: u16 = 1 << 9;

    /// No intents held.
    pub const fn new() -> Self {
        Self { flags: 0 }
    }

    /// Frame with the given bits held.
    pub const fn with(flags: u16) -> Self {
        Self { flags }
    }

    /// Builder-style: also hold `bits`.
    #[must_use]
    pub const fn and(self, bits: u16) -> Self {
        Self { flags: self.flags | bits }
    }

    #[inline]
    pub fn held(&self, bits: u16) -> bool {
        self.flags & bits == bits
    }

    #[inline]
    pub fn set(&mut self, bits: u16, pressed: bool) {
        if pressed {
            self.flags |= bits;
        } else {
            self.flags &= !bits;
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.flags == 0
    }

    /// Horizontal direction from held movement: -1, 0 or +1.
    /// Both directions held cancel out.
    #[inline]
    pub fn move_axis(&self) -> f32 {
        let left = self.held(Self::MOVE_LEFT);
        let right = self.held(Self::MOVE_RIGHT);
        match (left, right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

// =============================================================================
// EDGE DETECTION
// =============================================================================

/// Intents that became pressed this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pressed {
    pub jump: bool,
    pub melee: bool,
    pub ranged: bool,
    pub shield: bool,
    pub roll: bool,
    pub fire_dash_combo: bool,
    pub pause: bool,
    pub menu_back: bool,
}

/// Tracks the previous frame to turn held intents into presses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEdges {
    previous: InputFrame,
}

impl InputEdges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `current` against the stored frame, then store it.
    ///
    /// A fresh combo press wins over the ranged and roll presses it is
    /// made of, so the combo never also fires a blast or starts a roll.
    pub fn update(&mut self, current: InputFrame) -> Pressed {
        let rising = current.flags & !self.previous.flags;
        self.previous = current;

        let bit = |b: u16| rising & b != 0;
        let combo = bit(InputFrame::FIRE_DASH_COMBO);
        let combo_held = current.held(InputFrame::FIRE_DASH_COMBO);

        Pressed {
            jump: bit(InputFrame::JUMP),
            melee: bit(InputFrame::MELEE),
            ranged: bit(InputFrame::RANGED) && !combo_held,
            shield: bit(InputFrame::SHIELD),
            roll: bit(InputFrame::ROLL) && !combo_held,
            fire_dash_combo: combo,
            pause: bit(InputFrame::PAUSE),
            menu_back: bit(InputFrame::MENU_BACK),
        }
    }

    /// Forget the previous frame so nothing is held across a transition.
    pub fn reset(&mut self) {
        self.previous = InputFrame::new();
    }

    pub fn previous(&self) -> InputFrame {
        self.previous
    }
}

// =============================================================================
// INPUT SCRIPT
// =============================================================================

/// Input state beginning at a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputChange {
    pub tick: u32,
    pub frame: InputFrame,
}

/// Delta-compressed input track. Only changes are stored; lookup returns
/// the frame in force at a tick. Drives scripted runs and tests.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputScript {
    changes: Vec<InputChange>,
    #[serde(skip)]
    last_frame: InputFrame,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the frame held at `tick`. Ticks must be non-decreasing.
    pub fn record(&mut self, tick: u32, frame: InputFrame) {
        if frame != self.last_frame || self.changes.is_empty() {
            self.changes.push(InputChange { tick, frame });
            self.last_frame = frame;
        }
    }

    /// Hold `frame` for `ticks` ticks starting at `start`, then release.
    pub fn hold(&mut self, start: u32, ticks: u32, frame: InputFrame) -> &mut Self {
        self.record(start, frame);
        self.record(start + ticks, InputFrame::new());
        self
    }

    /// Frame in force at `tick`.
    pub fn frame_at(&self, tick: u32) -> InputFrame {
        let idx = self.changes.partition_point(|c| c.tick <= tick);
        if idx == 0 {
            InputFrame::new()
        } else {
            self.changes[idx - 1].frame
        }
    }

    pub fn change_count(&self) -> usize {
        self.changes.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_flags() {
        let mut frame = InputFrame::new();
        assert!(frame.is_idle());

        frame.set(InputFrame::JUMP, true);
        assert!(frame.held(InputFrame::JUMP));
        assert!(!frame.held(InputFrame::ROLL));

        frame.set(InputFrame::JUMP, false);
        assert!(frame.is_idle());
    }

    #[test]
    fn test_move_axis() {
        assert_eq!(InputFrame::with(InputFrame::MOVE_LEFT).move_axis(), -1.0);
        assert_eq!(InputFrame::with(InputFrame::MOVE_RIGHT).move_axis(), 1.0);
        assert_eq!(
            InputFrame::with(InputFrame::MOVE_LEFT | InputFrame::MOVE_RIGHT).move_axis(),
            0.0
        );
        assert_eq!(InputFrame::new().move_axis(), 0.0);
    }

    #[test]
    fn test_jump_is_edge_triggered() {
        let mut edges = InputEdges::new();
        let held = InputFrame::with(InputFrame::JUMP);

        assert!(edges.update(held).jump);
        assert!(!edges.update(held).jump, "holding is not a new press");
        assert!(!edges.update(InputFrame::new()).jump);
        assert!(edges.update(held).jump);
    }

    #[test]
    fn test_combo_suppresses_parts() {
        let mut edges = InputEdges::new();
        let combo = InputFrame::with(
            InputFrame::FIRE_DASH_COMBO | InputFrame::RANGED | InputFrame::ROLL,
        );
        let pressed = edges.update(combo);

        assert!(pressed.fire_dash_combo);
        assert!(!pressed.ranged);
        assert!(!pressed.roll);
    }

    #[test]
    fn test_reset_forgets_held() {
        let mut edges = InputEdges::new();
        let held = InputFrame::with(InputFrame::PAUSE);
        assert!(edges.update(held).pause);
        edges.reset();
        assert!(edges.update(held).pause);
    }

    #[test]
    fn test_script_lookup() {
        let mut script = InputScript::new();
        let right = InputFrame::with(InputFrame::MOVE_RIGHT);
        script.record(10, right);
        script.record(11, right);
        script.record(20, InputFrame::new());

        assert_eq!(script.change_count(), 2);
        assert!(script.frame_at(5).is_idle());
        assert_eq!(script.frame_at(10), right);
        assert_eq!(script.frame_at(19), right);
        assert!(script.frame_at(20).is_idle());
    }

    #[test]
    fn test_script_hold() {
        let mut script = InputScript::new();
        script
            .hold(0, 3, InputFrame::with(InputFrame::MOVE_LEFT))
            .hold(5, 1, InputFrame::with(InputFrame::JUMP));

        assert!(script.frame_at(2).held(InputFrame::MOVE_LEFT));
        assert!(script.frame_at(3).is_idle());
        assert!(script.frame_at(5).held(InputFrame::JUMP));
        assert!(script.frame_at(6).is_idle());
    }
}
