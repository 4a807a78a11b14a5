//! Combat system - melee strikes, knockback and hit application

use glam::Vec2;
use serde::Serialize;

use super::fighter::{Fighter, FighterId};
use super::geometry::Aabb;
use super::projectile::ProjectileId;
use super::tuning::MeleeTuning;

/// Minimum upward share of a melee launch direction
const BASE_UPWARD_RATIO: f32 = 0.4;
/// Extra upward share at point-blank range
const CLOSE_RANGE_LIFT: f32 = 0.4;
/// Horizontal distance beyond which the close-range lift is gone
const CLOSE_RANGE: f32 = 3.0;
/// Minimum upward share of a projectile launch direction
const PROJECTILE_MIN_LIFT: f32 = 0.2;
/// Share of damage scaling applied to projectile knockback
const PROJECTILE_SCALING_SHARE: f32 = 0.5;

/// What landed a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HitSource {
    Melee { attacker: FighterId },
    Projectile { projectile: ProjectileId, owner: FighterId },
}

/// A resolved hit, produced by the attacker's update and applied to the
/// target by `CombatSystem::apply_hit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResolution {
    pub target: FighterId,
    pub source: HitSource,
    /// Launch velocity; replaces the target's velocity outright
    pub launch: Vec2,
    /// Damage added after the launch is applied
    pub damage: f32,
}

/// Result of one frame of melee state for a fighter
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeleeOutcome {
    pub started: bool,
    pub hit: Option<HitResolution>,
}

pub struct CombatSystem;

impl CombatSystem {
    /// Step the melee state machine (Idle -> Attacking -> Idle) for `attacker`.
    ///
    /// The live window counts down before the trigger check, so a strike is
    /// hit-tested on the frame it starts. A landed hit ends the strike at once.
    pub fn update_melee(
        attacker: &mut Fighter,
        defender: &Fighter,
        attack_pressed: bool,
        dt: f32,
        tuning: &MeleeTuning,
    ) -> MeleeOutcome {
        let mut outcome = MeleeOutcome::default();

        attacker.attack_cooldown = (attacker.attack_cooldown - dt).max(0.0);

        if attacker.attacking {
            attacker.attack_timer -= dt;
            if attacker.attack_timer <= 0.0 {
                attacker.end_attack();
            }
        }

        if attack_pressed && attacker.attack_cooldown <= 0.0 && !attacker.attacking {
            attacker.attacking = true;
            attacker.attack_cooldown = tuning.attack_rate;
            attacker.attack_timer = tuning.attack_duration;
            outcome.started = true;
        }

        if !attacker.attacking {
            return outcome;
        }

        let attack_box = Self::attack_box(attacker, tuning);
        attacker.attack_box = Some(attack_box);

        if !defender.eliminated && !defender.knocked_back && attack_box.intersects(&defender.hurt_box) {
            outcome.hit = Some(HitResolution {
                target: defender.id,
                source: HitSource::Melee {
                    attacker: attacker.id,
                },
                launch: Self::melee_launch(attacker.position, defender.position, defender.damage, tuning),
                damage: tuning.damage,
            });
            attacker.end_attack();
        }

        outcome
    }

    /// Strike hitbox, offset from the body centre along facing
    pub fn attack_box(fighter: &Fighter, tuning: &MeleeTuning) -> Aabb {
        let center = fighter.position + Vec2::new(fighter.facing_sign() * tuning.hitbox_offset_x, 0.0);
        Aabb::from_center_size(center, Vec2::new(tuning.hitbox_width, tuning.hitbox_height))
    }

    /// Launch velocity for a melee hit. Close hits pop the defender up more.
    pub fn melee_launch(attacker: Vec2, defender: Vec2, defender_damage: f32, tuning: &MeleeTuning) -> Vec2 {
        let strength = tuning.base_knockback + defender_damage * tuning.knockback_scaling;
        let mut direction = (defender - attacker).try_normalize().unwrap_or(Vec2::Y);

        let horizontal_distance = (defender.x - attacker.x).abs();
        let closeness = (1.0 - horizontal_distance / CLOSE_RANGE).max(0.0);
        direction.y = direction.y.max(BASE_UPWARD_RATIO + CLOSE_RANGE_LIFT * closeness);

        direction.try_normalize().unwrap_or(Vec2::Y) * strength
    }

    /// Launch velocity for a projectile hit. Always pops the target upward.
    pub fn projectile_launch(
        projectile: Vec2,
        base_knockback: f32,
        defender: Vec2,
        defender_damage: f32,
        tuning: &MeleeTuning,
    ) -> Vec2 {
        let strength =
            base_knockback + defender_damage * tuning.knockback_scaling * PROJECTILE_SCALING_SHARE;
        let mut direction = (defender - projectile).try_normalize().unwrap_or(Vec2::Y);
        direction.y = direction.y.max(PROJECTILE_MIN_LIFT);

        direction.try_normalize().unwrap_or(Vec2::Y) * strength
    }

    /// The one place a fighter is mutated on behalf of another.
    /// Returns the damage added.
    pub fn apply_hit(target: &mut Fighter, hit: &HitResolution, tuning: &MeleeTuning) -> f32 {
        debug_assert_eq!(target.id, hit.target, "hit applied to the wrong fighter");
        debug_assert!(!target.eliminated, "hit applied to an eliminated fighter");
        debug_assert!(hit.launch.is_finite(), "non-finite launch velocity");

        target.velocity = hit.launch;
        target.end_attack();
        target.knocked_back = true;
        target.knockback_timer = tuning.knockback_lockout;
        target.grounded = false;
        target.damage += hit.damage;
        hit.damage
    }
}
