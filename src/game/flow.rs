//! Game Flow State Machine
//!
//! Decides which parts of the simulation run on a given tick. Only
//! `Playing` and `BossFight` advance the session; the select screens and
//! pause just route input.
//!
//! ```text
//! Menu -> PlayerSelect -> WeaponSelect -> Playing | BossFight
//!                                            |  ^
//!                                     pause  v  | resume
//!                                          Paused
//! Playing | BossFight -> LevelComplete -> Playing | BossFight  (next level)
//! Playing | BossFight -> GameOver -> Menu                       (run reset)
//! Playing | BossFight | Paused -> Menu                          (exit, score emitted)
//! ```

use serde::{Serialize, Deserialize};
use tracing::{info, warn};

use crate::game::config::WorldConfig;
use crate::game::events::{GameEvent, RunEndReason};
use crate::game::input::InputFrame;
use crate::game::level::{LevelSource, SetupError};
use crate::game::player::{CharacterId, Weapon};
use crate::game::snapshot::Snapshot;
use crate::game::state::{Session, SessionStatus};
use crate::game::tick::{tick, TickResult};

/// Macro-state of the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameFlow {
    #[default]
    Menu,
    PlayerSelect,
    WeaponSelect,
    Playing,
    BossFight,
    /// Remembers whether a boss fight was interrupted.
    Paused { boss_fight: bool },
    LevelComplete,
    GameOver,
}

impl GameFlow {
    /// Stable name for events and logs.
    pub fn name(self) -> &'static str {
        match self {
            GameFlow::Menu => "menu",
            GameFlow::PlayerSelect => "player_select",
            GameFlow::WeaponSelect => "weapon_select",
            GameFlow::Playing => "playing",
            GameFlow::BossFight => "boss_fight",
            GameFlow::Paused { .. } => "paused",
            GameFlow::LevelComplete => "level_complete",
            GameFlow::GameOver => "game_over",
        }
    }

    /// The simulation advances in this state.
    #[inline]
    pub fn is_simulating(self) -> bool {
        matches!(self, GameFlow::Playing | GameFlow::BossFight)
    }
}

/// Flow errors.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// Requested a transition the current state does not allow.
    #[error("cannot {action} while in {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    /// The next level failed validation.
    #[error(transparent)]
    Setup(#[from] SetupError),
}

// =============================================================================
// GAME
// =============================================================================

/// The session plus the flow that gates it and the source of level layouts.
pub struct Game<L: LevelSource> {
    session: Session,
    flow: GameFlow,
    levels: L,
    /// Flow transitions not yet handed out by `update`
    flow_events: Vec<GameEvent>,
}

impl<L: LevelSource> Game<L> {
    /// Create a game sitting at the main menu. Level 0 is loaded and
    /// validated up front so a bad source fails here.
    pub fn new(config: WorldConfig, mut levels: L, rng_seed: u64) -> Result<Self, SetupError> {
        let layout = levels.layout(0);
        let session = Session::new(config, &layout, rng_seed)?;
        info!(seed = rng_seed, "game created");

        Ok(Self {
            session,
            flow: GameFlow::Menu,
            levels,
            flow_events: Vec::new(),
        })
    }

    #[inline]
    pub fn flow(&self) -> GameFlow {
        self.flow
    }

    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Direct access for tooling and tests.
    #[inline]
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Read-only view for the renderer.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.session, self.flow)
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Menu -> PlayerSelect.
    pub fn start(&mut self) -> Result<(), FlowError> {
        self.require("start", matches!(self.flow, GameFlow::Menu))?;
        self.set_flow(GameFlow::PlayerSelect);
        Ok(())
    }

    /// Confirm the character and begin a fresh run. Score, lives and
    /// unlocks are reset here.
    pub fn confirm_player(&mut self, character: CharacterId) -> Result<(), FlowError> {
        self.require("confirm player", matches!(self.flow, GameFlow::PlayerSelect))?;
        let layout = self.levels.layout(0);
        self.session.reset_run(&layout, character, Weapon::Default)?;
        self.set_flow(GameFlow::WeaponSelect);
        Ok(())
    }

    /// Confirm the weapon and drop into level 0.
    pub fn confirm_weapon(&mut self, weapon: Weapon) -> Result<(), FlowError> {
        self.require("confirm weapon", matches!(self.flow, GameFlow::WeaponSelect))?;
        self.session.player.unlocks.weapon = weapon;
        self.set_flow(self.play_state());
        Ok(())
    }

    /// Back out of a select screen, or leave a run in progress. Leaving a
    /// run hands the score to the high-score store.
    pub fn back_to_menu(&mut self) -> Result<(), FlowError> {
        match self.flow {
            GameFlow::PlayerSelect | GameFlow::WeaponSelect => {}
            GameFlow::Playing | GameFlow::BossFight | GameFlow::Paused { .. } => {
                let score = self.session.score;
                self.flow_events
                    .push(GameEvent::run_score(self.session.tick, score, RunEndReason::ExitToMenu));
                info!(score, level = self.session.level_index, "exit to menu");
            }
            state => {
                return Err(FlowError::InvalidTransition {
                    action: "return to menu",
                    state: state.name(),
                })
            }
        }
        self.set_flow(GameFlow::Menu);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), FlowError> {
        let boss_fight = match self.flow {
            GameFlow::Playing => false,
            GameFlow::BossFight => true,
            state => {
                return Err(FlowError::InvalidTransition { action: "pause", state: state.name() })
            }
        };
        self.set_flow(GameFlow::Paused { boss_fight });
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), FlowError> {
        let GameFlow::Paused { boss_fight } = self.flow else {
            return Err(FlowError::InvalidTransition { action: "resume", state: self.flow.name() });
        };
        self.set_flow(if boss_fight { GameFlow::BossFight } else { GameFlow::Playing });
        Ok(())
    }

    /// LevelComplete -> next level. Score, lives and unlocks carry over.
    pub fn next_level(&mut self) -> Result<(), FlowError> {
        self.require("advance level", matches!(self.flow, GameFlow::LevelComplete))?;
        let next = self.session.level_index + 1;
        let layout = self.levels.layout(next);
        self.session.load_level(&layout, next)?;
        self.set_flow(self.play_state());
        Ok(())
    }

    /// GameOver -> Menu. The run is reset so the menu never shows stale
    /// lives or unlocks.
    pub fn acknowledge_game_over(&mut self) -> Result<(), FlowError> {
        self.require("acknowledge game over", matches!(self.flow, GameFlow::GameOver))?;
        let layout = self.levels.layout(0);
        let character = self.session.character;
        self.session.reset_run(&layout, character, Weapon::Default)?;
        self.set_flow(GameFlow::Menu);
        Ok(())
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    /// Feed one tick of input.
    ///
    /// While simulating, a pause or menu-back press transitions instead
    /// of ticking. While paused, pause resumes and menu-back exits. Other
    /// states are driven through the transition methods and ignore input.
    pub fn update(&mut self, input: InputFrame) -> TickResult {
        let mut result = match self.flow {
            GameFlow::Playing | GameFlow::BossFight => self.update_playing(input),
            GameFlow::Paused { .. } => {
                let pressed = self.session.input.update(input);
                if pressed.menu_back {
                    self.leave_run();
                } else if pressed.pause {
                    if let Err(err) = self.resume() {
                        warn!(%err, "resume refused");
                    }
                }
                TickResult {
                    status: self.session.status,
                    pause_pressed: pressed.pause,
                    menu_back_pressed: pressed.menu_back,
                    ..TickResult::default()
                }
            }
            _ => TickResult {
                status: self.session.status,
                ..TickResult::default()
            },
        };

        let mut events = std::mem::take(&mut self.flow_events);
        events.append(&mut result.events);
        events.sort();
        result.events = events;
        result
    }

    fn update_playing(&mut self, input: InputFrame) -> TickResult {
        let previous = self.session.input.previous();
        let edge = |bit: u16| input.held(bit) && !previous.held(bit);

        if edge(InputFrame::MENU_BACK) || edge(InputFrame::PAUSE) {
            let pressed = self.session.input.update(input);
            if pressed.menu_back {
                self.leave_run();
            } else {
                let boss_fight = self.flow == GameFlow::BossFight;
                self.set_flow(GameFlow::Paused { boss_fight });
            }
            return TickResult {
                status: self.session.status,
                pause_pressed: pressed.pause,
                menu_back_pressed: pressed.menu_back,
                ..TickResult::default()
            };
        }

        let result = tick(&mut self.session, input);
        match result.status {
            SessionStatus::Active => {}
            SessionStatus::LevelComplete => self.set_flow(GameFlow::LevelComplete),
            SessionStatus::GameOver => self.set_flow(GameFlow::GameOver),
        }
        result
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn play_state(&self) -> GameFlow {
        if self.session.is_boss_level() {
            GameFlow::BossFight
        } else {
            GameFlow::Playing
        }
    }

    fn require(&self, action: &'static str, allowed: bool) -> Result<(), FlowError> {
        if allowed {
            Ok(())
        } else {
            Err(FlowError::InvalidTransition { action, state: self.flow.name() })
        }
    }

    /// Exit from a simulating or paused state, which is always allowed.
    fn leave_run(&mut self) {
        if let Err(err) = self.back_to_menu() {
            warn!(%err, "exit to menu refused");
        }
    }

    fn set_flow(&mut self, next: GameFlow) {
        if next == self.flow {
            return;
        }
        let old = self.flow;
        self.flow = next;
        self.flow_events
            .push(GameEvent::flow_changed(self.session.tick, old.name(), next.name()));
        info!(from = old.name(), to = next.name(), "flow changed");
    }
}

// =============================================================================
// TESTS
// =============================================================================
