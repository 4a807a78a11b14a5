//! Gameplay tuning
//!
//! Every numeric constant the simulation reads lives here. Defaults carry the
//! shipped balance; a TOML file may override any subset of them.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Movement and kinematics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Ground run speed (units/s)
    pub move_speed: f32,
    /// Downward acceleration (units/s^2)
    pub gravity: f32,
    /// Vertical velocity set by a jump
    pub jump_force: f32,
    /// Per-frame horizontal multiplier while airborne or in ground hitstun
    pub air_friction: f32,
    /// Horizontal speed clamp, applied last every frame
    pub max_air_speed: f32,
    /// Share of `move_speed` added per frame by air control
    pub air_control_factor: f32,
    /// Share of `move_speed` added per frame by directional influence
    pub directional_influence: f32,
    /// Below this horizontal speed an idle fighter snaps to rest
    pub velocity_deadzone: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            move_speed: 8.0,
            gravity: 35.0,
            jump_force: 15.0,
            air_friction: 1.2,
            max_air_speed: 7.0,
            air_control_factor: 0.28,
            directional_influence: 0.02,
            velocity_deadzone: 0.1,
        }
    }
}

/// Fighter body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyTuning {
    pub width: f32,
    pub height: f32,
    pub max_jumps: u8,
}

impl Default for BodyTuning {
    fn default() -> Self {
        Self {
            width: 0.8,
            height: 1.5,
            max_jumps: 2,
        }
    }
}

/// Melee strike
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeTuning {
    /// Damage added to the defender per landed strike
    pub damage: f32,
    /// Seconds between strike starts
    pub attack_rate: f32,
    /// Seconds the hitbox stays live
    pub attack_duration: f32,
    pub hitbox_width: f32,
    pub hitbox_height: f32,
    /// Hitbox centre offset from body centre along facing
    pub hitbox_offset_x: f32,
    pub base_knockback: f32,
    /// Extra knockback per point of defender damage
    pub knockback_scaling: f32,
    /// Seconds of reduced control after being launched
    pub knockback_lockout: f32,
}

impl Default for MeleeTuning {
    fn default() -> Self {
        Self {
            damage: 8.0,
            attack_rate: 0.4,
            attack_duration: 0.2,
            hitbox_width: 1.2,
            hitbox_height: 0.6,
            hitbox_offset_x: 0.8,
            base_knockback: 9.0,
            knockback_scaling: 0.2,
            knockback_lockout: 0.25,
        }
    }
}

/// Ranged attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangedTuning {
    /// Seconds between shots
    pub attack_rate: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_knockback: f32,
    /// Seconds before an unconsumed projectile expires
    pub projectile_lifetime: f32,
    pub projectile_radius: f32,
    /// Spawn offset ahead of the body centre
    pub spawn_offset_x: f32,
    /// Spawn offset above the body centre
    pub spawn_offset_y: f32,
}

impl Default for RangedTuning {
    fn default() -> Self {
        Self {
            attack_rate: 1.0,
            projectile_speed: 15.0,
            projectile_damage: 5.0,
            projectile_knockback: 3.0,
            projectile_lifetime: 2.0,
            projectile_radius: 0.2,
            spawn_offset_x: 0.7,
            spawn_offset_y: 0.2,
        }
    }
}

/// Stocks, blast zone and respawn placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockTuning {
    pub starting_lives: u8,
    /// A fighter whose centre falls below this height loses a stock
    pub boundary_y: f32,
    /// Respawn height above the highest platform top
    pub spawn_clearance: f32,
    /// Horizontal distance of each slot's spawn from the arena centre
    pub spawn_offset_x: f32,
    /// Spawn height used when the arena has no platforms
    pub fallback_spawn_y: f32,
}

impl Default for StockTuning {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            boundary_y: -15.0,
            spawn_clearance: 3.0,
            spawn_offset_x: 3.0,
            fallback_spawn_y: 2.0,
        }
    }
}

/// Complete simulation tuning
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub movement: MovementTuning,
    pub body: BodyTuning,
    pub melee: MeleeTuning,
    pub ranged: RangedTuning,
    pub stock: StockTuning,
}

/// Tuning errors
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("{field} must be {requirement}, got {value}")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
        value: f32,
    },

    #[error("body.max_jumps must be at least 1")]
    ZeroMaxJumps,

    #[error("stock.starting_lives must be at least 1")]
    ZeroLives,

    #[error("Failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse tuning file: {0}")]
    Parse(#[from] toml::de::Error),
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            field,
            requirement: "finite and > 0",
            value,
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            field,
            requirement: "finite and >= 0",
            value,
        })
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            field,
            requirement: "finite",
            value,
        })
    }
}

impl Tuning {
    /// Parse tuning from TOML; missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = toml::from_str(source)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), TuningError> {
        let m = &self.movement;
        positive("movement.move_speed", m.move_speed)?;
        non_negative("movement.gravity", m.gravity)?;
        positive("movement.jump_force", m.jump_force)?;
        positive("movement.air_friction", m.air_friction)?;
        positive("movement.max_air_speed", m.max_air_speed)?;
        non_negative("movement.air_control_factor", m.air_control_factor)?;
        non_negative("movement.directional_influence", m.directional_influence)?;
        non_negative("movement.velocity_deadzone", m.velocity_deadzone)?;

        let b = &self.body;
        positive("body.width", b.width)?;
        positive("body.height", b.height)?;
        if b.max_jumps == 0 {
            return Err(TuningError::ZeroMaxJumps);
        }

        let melee = &self.melee;
        non_negative("melee.damage", melee.damage)?;
        non_negative("melee.attack_rate", melee.attack_rate)?;
        positive("melee.attack_duration", melee.attack_duration)?;
        positive("melee.hitbox_width", melee.hitbox_width)?;
        positive("melee.hitbox_height", melee.hitbox_height)?;
        finite("melee.hitbox_offset_x", melee.hitbox_offset_x)?;
        non_negative("melee.base_knockback", melee.base_knockback)?;
        non_negative("melee.knockback_scaling", melee.knockback_scaling)?;
        non_negative("melee.knockback_lockout", melee.knockback_lockout)?;

        let r = &self.ranged;
        non_negative("ranged.attack_rate", r.attack_rate)?;
        positive("ranged.projectile_speed", r.projectile_speed)?;
        non_negative("ranged.projectile_damage", r.projectile_damage)?;
        non_negative("ranged.projectile_knockback", r.projectile_knockback)?;
        positive("ranged.projectile_lifetime", r.projectile_lifetime)?;
        positive("ranged.projectile_radius", r.projectile_radius)?;
        finite("ranged.spawn_offset_x", r.spawn_offset_x)?;
        finite("ranged.spawn_offset_y", r.spawn_offset_y)?;

        let s = &self.stock;
        if s.starting_lives == 0 {
            return Err(TuningError::ZeroLives);
        }
        finite("stock.boundary_y", s.boundary_y)?;
        non_negative("stock.spawn_clearance", s.spawn_clearance)?;
        finite("stock.spawn_offset_x", s.spawn_offset_x)?;
        finite("stock.fallback_spawn_y", s.fallback_spawn_y)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Tuning::default().validate().expect("default tuning should validate");
    }

    #[test]
    fn negative_lifetime_is_rejected() {
        let mut tuning = Tuning::default();
        tuning.ranged.projectile_lifetime = -1.0;
        let err = tuning.validate().unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "ranged.projectile_lifetime",
                ..
            }
        ));
    }

    #[test]
    fn zero_max_jumps_is_rejected() {
        let mut tuning = Tuning::default();
        tuning.body.max_jumps = 0;
        assert!(matches!(tuning.validate(), Err(TuningError::ZeroMaxJumps)));
    }

    #[test]
    fn nan_is_rejected() {
        let mut tuning = Tuning::default();
        tuning.movement.gravity = f32::NAN;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let tuning = Tuning::from_toml_str(
            r#"
            [movement]
            air_control_factor = 0.15

            [stock]
            starting_lives = 5
            "#,
        )
        .expect("partial tuning should parse");

        assert_eq!(tuning.movement.air_control_factor, 0.15);
        assert_eq!(tuning.movement.move_speed, 8.0);
        assert_eq!(tuning.stock.starting_lives, 5);
        assert_eq!(tuning.melee, MeleeTuning::default());
    }

    #[test]
    fn invalid_toml_value_fails_fast() {
        let result = Tuning::from_toml_str(
            r#"
            [melee]
            attack_duration = 0.0
            "#,
        );
        assert!(result.is_err());
    }
}
