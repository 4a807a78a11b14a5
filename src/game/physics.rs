//! Fighter kinematics: gravity, run and air control, friction, speed clamp

use super::fighter::Fighter;
use super::tuning::MovementTuning;

/// Kinematic integrator for fighters
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Count down hitstun; control returns once it reaches zero.
    pub fn decay_knockback(fighter: &mut Fighter, dt: f32) {
        if fighter.knocked_back {
            fighter.knockback_timer -= dt;
            if fighter.knockback_timer <= 0.0 {
                fighter.knockback_timer = 0.0;
                fighter.knocked_back = false;
            }
        }
    }

    /// Update velocity from gravity and horizontal intent (-1, 0, 1).
    /// Position is left to the collision resolver.
    pub fn integrate(fighter: &mut Fighter, intent: f32, dt: f32, tuning: &MovementTuning) {
        fighter.velocity.y -= tuning.gravity * dt;

        let moving = intent != 0.0;
        if fighter.grounded {
            if moving {
                fighter.velocity.x = intent * tuning.move_speed;
                fighter.facing_right = intent > 0.0;
            } else if !fighter.knocked_back {
                fighter.velocity.x = 0.0;
            }
            if fighter.knocked_back {
                fighter.velocity.x *= tuning.air_friction;
            }
        } else {
            fighter.velocity.x *= tuning.air_friction;
            if fighter.knocked_back {
                if moving {
                    fighter.velocity.x += intent * tuning.move_speed * tuning.directional_influence;
                }
            } else if moving {
                fighter.velocity.x += intent * tuning.move_speed * tuning.air_control_factor;
                fighter.facing_right = intent > 0.0;
            }
        }

        if !fighter.knocked_back && !moving && fighter.velocity.x.abs() < tuning.velocity_deadzone {
            fighter.velocity.x = 0.0;
        }

        fighter.velocity.x = fighter
            .velocity
            .x
            .clamp(-tuning.max_air_speed, tuning.max_air_speed);
    }

    /// Spend a jump if one is left. Returns true when the jump happened.
    pub fn try_jump(fighter: &mut Fighter, tuning: &MovementTuning) -> bool {
        if fighter.jumps_remaining == 0 {
            return false;
        }
        fighter.jumps_remaining -= 1;
        fighter.velocity.y = tuning.jump_force;
        fighter.grounded = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::fighter::FighterId;
    use crate::game::tuning::Tuning;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn fighter() -> (Fighter, MovementTuning) {
        let tuning = Tuning::default();
        (Fighter::new(FighterId::A, Vec2::ZERO, &tuning), tuning.movement)
    }

    #[test]
    fn gravity_is_unconditional() {
        let (mut f, m) = fighter();
        f.grounded = true;
        PhysicsSystem::integrate(&mut f, 0.0, DT, &m);
        assert!((f.velocity.y + m.gravity * DT).abs() < 1e-6);
    }

    #[test]
    fn grounded_run_sets_speed_and_facing() {
        let (mut f, m) = fighter();
        f.grounded = true;
        PhysicsSystem::integrate(&mut f, -1.0, DT, &m);
        assert_eq!(f.velocity.x, -m.move_speed.min(m.max_air_speed));
        assert!(!f.facing_right);
    }

    #[test]
    fn grounded_idle_stops_dead() {
        let (mut f, m) = fighter();
        f.grounded = true;
        f.velocity.x = 5.0;
        PhysicsSystem::integrate(&mut f, 0.0, DT, &m);
        assert_eq!(f.velocity.x, 0.0);
    }

    #[test]
    fn grounded_hitstun_applies_friction_instead_of_stop() {
        let (mut f, m) = fighter();
        f.grounded = true;
        f.knocked_back = true;
        f.velocity.x = 2.0;
        PhysicsSystem::integrate(&mut f, 0.0, DT, &m);
        assert!((f.velocity.x - 2.0 * m.air_friction).abs() < 1e-6);
    }

    #[test]
    fn air_control_accelerates_and_turns() {
        let (mut f, m) = fighter();
        f.velocity.x = 1.0;
        PhysicsSystem::integrate(&mut f, -1.0, DT, &m);
        let expected = 1.0 * m.air_friction - m.move_speed * m.air_control_factor;
        assert!((f.velocity.x - expected).abs() < 1e-6);
        assert!(!f.facing_right);
    }

    #[test]
    fn hitstun_only_allows_directional_influence() {
        let (mut f, m) = fighter();
        f.knocked_back = true;
        f.velocity.x = 3.0;
        PhysicsSystem::integrate(&mut f, -1.0, DT, &m);
        let expected = 3.0 * m.air_friction - m.move_speed * m.directional_influence;
        assert!((f.velocity.x - expected).abs() < 1e-6);
        assert!(f.facing_right, "hitstun must not turn the fighter");
    }

    #[test]
    fn small_drift_snaps_to_zero() {
        let (mut f, m) = fighter();
        f.velocity.x = 0.05;
        PhysicsSystem::integrate(&mut f, 0.0, DT, &m);
        assert_eq!(f.velocity.x, 0.0);
    }

    #[test]
    fn clamp_applies_last_even_on_ground() {
        let (mut f, m) = fighter();
        f.grounded = true;
        PhysicsSystem::integrate(&mut f, 1.0, DT, &m);
        assert_eq!(f.velocity.x, m.max_air_speed);

        f.grounded = false;
        f.velocity.x = 100.0;
        PhysicsSystem::integrate(&mut f, 0.0, DT, &m);
        assert_eq!(f.velocity.x, m.max_air_speed);
    }

    #[test]
    fn knockback_timer_releases_control() {
        let (mut f, _) = fighter();
        f.knocked_back = true;
        f.knockback_timer = 0.02;
        PhysicsSystem::decay_knockback(&mut f, DT);
        assert!(f.knocked_back);
        PhysicsSystem::decay_knockback(&mut f, DT);
        assert!(!f.knocked_back);
        assert_eq!(f.knockback_timer, 0.0);
    }

    #[test]
    fn jumps_are_limited() {
        let (mut f, m) = fighter();
        assert!(PhysicsSystem::try_jump(&mut f, &m));
        assert!(PhysicsSystem::try_jump(&mut f, &m));
        assert!(!PhysicsSystem::try_jump(&mut f, &m));
        assert_eq!(f.jumps_remaining, 0);
        assert_eq!(f.velocity.y, m.jump_force);
    }
}
