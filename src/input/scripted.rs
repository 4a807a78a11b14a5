//! Seeded bot controller for headless matches

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::game::snapshot::FighterSnapshot;
use crate::game::Controls;

/// Horizontal distance at which the bot tries to strike
const STRIKE_RANGE: f32 = 1.5;
/// Vertical distance still considered level for a strike
const STRIKE_HEIGHT: f32 = 1.0;
/// Beyond this horizontal distance the bot prefers shooting
const SHOOT_RANGE: f32 = 4.0;
/// Falling faster than this while airborne triggers a recovery jump
const RECOVERY_FALL_SPEED: f32 = -6.0;

/// Picks held controls from the latest snapshot, with seeded noise so two
/// bots with different seeds do not mirror each other.
pub struct ScriptedController {
    rng: ChaCha8Rng,
    /// Probability of a random move instead of chasing
    wander: f64,
}

impl ScriptedController {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            wander: 0.15,
        }
    }

    pub fn with_wander(mut self, wander: f64) -> Self {
        self.wander = wander.clamp(0.0, 1.0);
        self
    }

    /// Choose held controls for `me` against `opponent`.
    pub fn decide(&mut self, me: &FighterSnapshot, opponent: &FighterSnapshot) -> Controls {
        let mut controls = Controls::NONE;
        if me.eliminated {
            return controls;
        }

        let dx = opponent.position.x - me.position.x;
        let dy = opponent.position.y - me.position.y;

        if self.rng.gen_bool(self.wander) {
            match self.rng.gen_range(0..3) {
                0 => controls.left = true,
                1 => controls.right = true,
                _ => {}
            }
        } else if dx.abs() > STRIKE_RANGE * 0.8 {
            controls.right = dx > 0.0;
            controls.left = dx < 0.0;
        }

        let facing_opponent = (dx >= 0.0) == me.facing_right;
        if !opponent.eliminated && dx.abs() <= STRIKE_RANGE && dy.abs() <= STRIKE_HEIGHT {
            // Alternate so the tracker sees fresh presses
            controls.melee = self.rng.gen_bool(0.5);
        } else if !opponent.eliminated && dx.abs() > SHOOT_RANGE && facing_opponent {
            controls.ranged = self.rng.gen_bool(0.6);
        }

        let recovering = !me.grounded && me.velocity.y < RECOVERY_FALL_SPEED;
        let climbing = dy > STRIKE_HEIGHT;
        controls.jump = if recovering || climbing {
            self.rng.gen_bool(0.5)
        } else {
            self.rng.gen_bool(0.03)
        };

        controls
    }
}
