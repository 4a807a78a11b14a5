//! Fighter state (authoritative)

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::geometry::Aabb;
use super::tuning::Tuning;

/// Opaque handle for one of the two fighter slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FighterId {
    A,
    B,
}

impl FighterId {
    /// Fixed update order
    pub const ALL: [FighterId; 2] = [FighterId::A, FighterId::B];

    pub fn index(self) -> usize {
        match self {
            FighterId::A => 0,
            FighterId::B => 1,
        }
    }

    pub fn opponent(self) -> FighterId {
        match self {
            FighterId::A => FighterId::B,
            FighterId::B => FighterId::A,
        }
    }
}

impl fmt::Display for FighterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FighterId::A => f.write_str("P1"),
            FighterId::B => f.write_str("P2"),
        }
    }
}

/// One combatant
#[derive(Debug, Clone, PartialEq)]
pub struct Fighter {
    pub id: FighterId,

    // Kinematics
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing_right: bool,
    /// Set only by a landing resolved this frame
    pub grounded: bool,
    pub jumps_remaining: u8,
    pub max_jumps: u8,
    /// Full body size (width, height)
    pub body: Vec2,

    // Combat
    pub damage: f32,
    pub lives: u8,
    pub knocked_back: bool,
    pub knockback_timer: f32,
    pub attacking: bool,
    /// Seconds left in the live hitbox window
    pub attack_timer: f32,
    /// Seconds until the next strike may start
    pub attack_cooldown: f32,
    pub ranged_cooldown: f32,
    pub hurt_box: Aabb,
    /// Present only while `attacking`
    pub attack_box: Option<Aabb>,

    /// Out of stocks; frozen for the rest of the match
    pub eliminated: bool,
}

impl Fighter {
    pub fn new(id: FighterId, spawn: Vec2, tuning: &Tuning) -> Self {
        let body = Vec2::new(tuning.body.width, tuning.body.height);
        Self {
            id,
            position: spawn,
            velocity: Vec2::ZERO,
            facing_right: id == FighterId::A,
            grounded: false,
            jumps_remaining: tuning.body.max_jumps,
            max_jumps: tuning.body.max_jumps,
            body,
            damage: 0.0,
            lives: tuning.stock.starting_lives,
            knocked_back: false,
            knockback_timer: 0.0,
            attacking: false,
            attack_timer: 0.0,
            attack_cooldown: 0.0,
            ranged_cooldown: 0.0,
            hurt_box: Aabb::from_center_size(spawn, body),
            attack_box: None,
            eliminated: false,
        }
    }

    /// Body box at the current position
    pub fn body_box(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.body)
    }

    pub fn refresh_hurtbox(&mut self) {
        self.hurt_box = self.body_box();
    }

    /// +1 facing right, -1 facing left
    pub fn facing_sign(&self) -> f32 {
        if self.facing_right {
            1.0
        } else {
            -1.0
        }
    }

    pub fn end_attack(&mut self) {
        self.attacking = false;
        self.attack_timer = 0.0;
        self.attack_box = None;
    }

    /// HUD damage readout
    pub fn damage_percent(&self) -> u32 {
        self.damage.floor() as u32
    }
}

/// Borrow both fighters mutably, the given slot first.
pub fn pair_mut(fighters: &mut [Fighter; 2], id: FighterId) -> (&mut Fighter, &mut Fighter) {
    let [a, b] = fighters;
    match id {
        FighterId::A => (a, b),
        FighterId::B => (b, a),
    }
}
