//! Game simulation modules

pub mod arena;
pub mod collision;
pub mod combat;
pub mod events;
pub mod fighter;
pub mod geometry;
pub mod r#match;
pub mod physics;
pub mod projectile;
pub mod simulation;
pub mod snapshot;
pub mod stock;
pub mod tuning;

pub use arena::{ArenaId, PlatformSet, PlatformSpec};
pub use events::FrameEvents;
pub use fighter::{Fighter, FighterId};
pub use r#match::{
    ControllerMsg, GameMatch, MatchEndReason, MatchHandle, MatchMsg, MatchPhase, MatchResult, MatchSettings,
};
pub use simulation::{SimError, Simulation};
pub use tuning::Tuning;

use serde::{Deserialize, Serialize};

/// State of the five fighter controls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub melee: bool,
    pub ranged: bool,
}

impl Controls {
    pub const NONE: Controls = Controls {
        left: false,
        right: false,
        jump: false,
        melee: false,
        ranged: false,
    };
}

/// Input for one fighter for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FighterInput {
    /// Controls currently down
    pub held: Controls,
    /// Controls that went down since the previous frame
    pub pressed: Controls,
}

impl FighterInput {
    pub const IDLE: FighterInput = FighterInput {
        held: Controls::NONE,
        pressed: Controls::NONE,
    };

    pub fn new(held: Controls, pressed: Controls) -> Self {
        Self { held, pressed }
    }

    /// Horizontal intent in {-1, 0, 1}; right wins when both are held
    pub fn move_intent(&self) -> f32 {
        if self.held.right {
            1.0
        } else if self.held.left {
            -1.0
        } else {
            0.0
        }
    }
}
