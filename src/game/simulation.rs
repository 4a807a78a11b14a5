//! Per-frame simulation engine
//!
//! `Simulation::advance` runs one frame to completion. State is mutated in
//! the order given by [`FRAME_PHASES`]: projectiles first, then fighter A,
//! then fighter B. Within a fighter phase the steps run as:
//!
//! 1. movement intent from input
//! 2. hitstun timer decay
//! 3. kinematic integration
//! 4. platform collision
//! 5. melee update, applying any landed hit to the opponent
//! 6. jump
//! 7. ranged fire
//! 8. hurtbox refresh
//! 9. boundary check and stock handling
//!
//! The ordering is observable: fighter A's strike lands before fighter B
//! gets to swing in the same frame.

use tracing::{debug, info};

use super::arena::{ArenaError, ArenaId, PlatformSet};
use super::collision::CollisionResolver;
use super::combat::CombatSystem;
use super::events::{FrameEvents, ProjectileEvent};
use super::fighter::{pair_mut, Fighter, FighterId};
use super::physics::PhysicsSystem;
use super::projectile::{Projectile, ProjectileSystem};
use super::stock::{StockManager, StockOutcome};
use super::tuning::{Tuning, TuningError};
use super::FighterInput;

/// One scheduled slice of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Projectiles,
    Fighter(FighterId),
}

/// Update order for every frame
pub const FRAME_PHASES: [FramePhase; 3] = [
    FramePhase::Projectiles,
    FramePhase::Fighter(FighterId::A),
    FramePhase::Fighter(FighterId::B),
];

/// Simulation construction errors
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Invalid tuning: {0}")]
    Tuning(#[from] TuningError),

    #[error("Invalid arena: {0}")]
    Arena(#[from] ArenaError),
}

/// Authoritative state of one match
pub struct Simulation {
    platforms: PlatformSet,
    tuning: Tuning,
    fighters: [Fighter; 2],
    projectiles: ProjectileSystem,
    frame: u64,
}

impl Simulation {
    /// Validate tuning and place both fighters at their spawn points.
    pub fn new(platforms: PlatformSet, tuning: Tuning) -> Result<Self, SimError> {
        tuning.validate()?;
        let fighters = FighterId::ALL
            .map(|id| Fighter::new(id, platforms.spawn_point(id, &tuning.stock), &tuning));

        Ok(Self {
            platforms,
            tuning,
            fighters,
            projectiles: ProjectileSystem::new(),
            frame: 0,
        })
    }

    pub fn with_arena(arena: ArenaId, tuning: Tuning) -> Result<Self, SimError> {
        Self::new(arena.load()?, tuning)
    }

    /// Run one frame. `dt` must already be clamped by the caller.
    pub fn advance(&mut self, dt: f32, input_a: &FighterInput, input_b: &FighterInput) -> FrameEvents {
        debug_assert!(dt.is_finite() && dt >= 0.0, "invalid frame delta {dt}");

        self.frame += 1;
        let mut events = FrameEvents::new(self.frame);
        let damage_before = self.fighters.each_ref().map(|f| f.damage);

        for phase in FRAME_PHASES {
            match phase {
                FramePhase::Projectiles => self.step_projectiles(dt, &mut events),
                FramePhase::Fighter(id) => {
                    let input = match id {
                        FighterId::A => input_a,
                        FighterId::B => input_b,
                    };
                    self.step_fighter(id, input, dt, &mut events);
                }
            }
        }

        for id in FighterId::ALL {
            let delta = self.fighters[id.index()].damage - damage_before[id.index()];
            events.fighter_mut(id).damage_delta = delta;
        }

        events
    }

    fn step_projectiles(&mut self, dt: f32, events: &mut FrameEvents) {
        let outcomes = self
            .projectiles
            .update(&mut self.fighters, &self.platforms, dt, &self.tuning.melee);

        for outcome in outcomes {
            if let Some(hit) = outcome.hit {
                events.hits.push(hit.into());
            }
            events.projectiles.push(ProjectileEvent::Despawned {
                id: outcome.id,
                position: outcome.position,
                reason: outcome.reason,
            });
        }
    }

    fn step_fighter(&mut self, id: FighterId, input: &FighterInput, dt: f32, events: &mut FrameEvents) {
        let tuning = &self.tuning;
        let (fighter, opponent) = pair_mut(&mut self.fighters, id);
        if fighter.eliminated {
            return;
        }

        let intent = input.move_intent();
        PhysicsSystem::decay_knockback(fighter, dt);
        PhysicsSystem::integrate(fighter, intent, dt, &tuning.movement);

        let contact = CollisionResolver::move_and_collide(fighter, &self.platforms, dt);

        let melee = CombatSystem::update_melee(fighter, opponent, input.pressed.melee, dt, &tuning.melee);
        if let Some(hit) = melee.hit {
            CombatSystem::apply_hit(opponent, &hit, &tuning.melee);
            debug!(
                frame = self.frame,
                attacker = %id,
                target = %hit.target,
                target_damage = opponent.damage,
                launch_x = hit.launch.x,
                launch_y = hit.launch.y,
                "melee hit"
            );
            events.hits.push(hit.into());
        }

        let jumped = input.pressed.jump && PhysicsSystem::try_jump(fighter, &tuning.movement);

        let fired = self
            .projectiles
            .try_fire(fighter, input.held.ranged, dt, &tuning.ranged)
            .map(|p| ProjectileEvent::Spawned {
                id: p.id,
                owner: p.owner,
                position: p.position,
                velocity: p.velocity,
            });

        fighter.refresh_hurtbox();

        let stock = StockManager::check(fighter, &self.platforms, &tuning.stock);

        let report = events.fighter_mut(id);
        report.landed = contact.landed;
        report.melee_started = melee.started;
        report.jumped = jumped;
        report.fired = fired.is_some();
        match stock {
            StockOutcome::Alive => {}
            StockOutcome::Respawned { .. } => {
                report.life_lost = true;
                report.respawned = true;
            }
            StockOutcome::Eliminated => {
                report.life_lost = true;
                report.eliminated = true;
            }
        }
        events.projectiles.extend(fired);
    }

    /// Put both fighters back on their spawn points with full stocks.
    pub fn reset(&mut self) {
        let tuning = self.tuning;
        for id in FighterId::ALL {
            let spawn = self.platforms.spawn_point(id, &tuning.stock);
            self.fighters[id.index()] = Fighter::new(id, spawn, &tuning);
        }
        self.projectiles.clear();
        self.frame = 0;
        info!("simulation reset");
    }

    pub fn fighter(&self, id: FighterId) -> &Fighter {
        &self.fighters[id.index()]
    }

    /// Direct access for scenario setup
    pub fn fighter_mut(&mut self, id: FighterId) -> &mut Fighter {
        &mut self.fighters[id.index()]
    }

    pub fn fighters(&self) -> &[Fighter; 2] {
        &self.fighters
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    pub fn platforms(&self) -> &PlatformSet {
        &self.platforms
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// At least one fighter is out of stocks
    pub fn is_over(&self) -> bool {
        self.fighters.iter().any(|f| f.eliminated)
    }

    /// The last fighter standing, once the other is eliminated
    pub fn winner(&self) -> Option<FighterId> {
        match self.fighters.each_ref().map(|f| f.eliminated) {
            [false, true] => Some(FighterId::A),
            [true, false] => Some(FighterId::B),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::arena::PlatformSpec;
    use crate::game::Controls;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn flat_sim() -> Simulation {
        let floor = PlatformSet::new(&[PlatformSpec::new(0.0, -0.5, 40.0, 1.0)]).unwrap();
        Simulation::new(floor, Tuning::default()).unwrap()
    }

    fn tap(controls: Controls) -> FighterInput {
        FighterInput::new(controls, controls)
    }

    fn settle(sim: &mut Simulation) {
        for _ in 0..120 {
            sim.advance(DT, &FighterInput::IDLE, &FighterInput::IDLE);
        }
    }

    #[test]
    fn phases_are_ordered() {
        assert_eq!(FRAME_PHASES[0], FramePhase::Projectiles);
        assert_eq!(FRAME_PHASES[1], FramePhase::Fighter(FighterId::A));
        assert_eq!(FRAME_PHASES[2], FramePhase::Fighter(FighterId::B));
    }

    #[test]
    fn invalid_tuning_fails_construction() {
        let mut tuning = Tuning::default();
        tuning.body.max_jumps = 0;
        let result = Simulation::with_arena(ArenaId::Shire, tuning);
        assert!(matches!(result, Err(SimError::Tuning(TuningError::ZeroMaxJumps))));
    }

    #[test]
    fn fighters_fall_and_land_at_spawn() {
        let mut sim = flat_sim();
        settle(&mut sim);
        for f in sim.fighters() {
            assert!(f.grounded);
            assert!((f.position.y - 0.75).abs() < 1e-3);
        }
        assert_eq!(sim.fighter(FighterId::A).position.x, -3.0);
        assert_eq!(sim.fighter(FighterId::B).position.x, 3.0);
    }

    #[test]
    fn mutual_strike_resolves_in_slot_order() {
        let mut sim = flat_sim();
        settle(&mut sim);
        sim.fighter_mut(FighterId::A).position.x = 0.0;
        sim.fighter_mut(FighterId::B).position.x = 1.0;
        for f in [FighterId::A, FighterId::B] {
            sim.fighter_mut(f).refresh_hurtbox();
        }

        let swing = tap(Controls {
            melee: true,
            ..Controls::NONE
        });
        let events = sim.advance(DT, &swing, &swing);

        // A resolves first and launches B. Hitstun does not stop B from
        // swinging, so B still trades back during its own phase.
        assert_eq!(events.hits.len(), 2);
        assert_eq!(events.hits[0].target, FighterId::B);
        assert_eq!(events.hits[1].target, FighterId::A);
        let melee = sim.tuning().melee;
        assert_eq!(events.fighter(FighterId::B).damage_delta, melee.damage);
        assert_eq!(events.fighter(FighterId::A).damage_delta, melee.damage);
        // B was hit at 0% damage, so its launch carries base knockback only
        assert!((events.hits[0].launch.length() - melee.base_knockback).abs() < 1e-4);
    }

    #[test]
    fn knocked_back_defender_ignores_second_swing() {
        let mut sim = flat_sim();
        settle(&mut sim);
        sim.fighter_mut(FighterId::A).position.x = 0.0;
        sim.fighter_mut(FighterId::A).refresh_hurtbox();
        {
            let b = sim.fighter_mut(FighterId::B);
            b.position.x = 1.0;
            b.knocked_back = true;
            b.knockback_timer = 1.0;
            b.refresh_hurtbox();
        }

        let swing = tap(Controls {
            melee: true,
            ..Controls::NONE
        });
        let events = sim.advance(DT, &swing, &FighterInput::IDLE);
        assert!(events.hits.is_empty());
        assert!(events.fighter(FighterId::A).melee_started);
    }

    #[test]
    fn held_ranged_fires_on_cooldown() {
        let mut sim = flat_sim();
        let fire = FighterInput::new(
            Controls {
                ranged: true,
                ..Controls::NONE
            },
            Controls::NONE,
        );
        let mut shots = 0;
        // 1.5 seconds at 60 Hz with a 1 s rate: shots at t=0 and t=1
        for _ in 0..90 {
            let events = sim.advance(DT, &fire, &FighterInput::IDLE);
            shots += events
                .projectiles
                .iter()
                .filter(|e| matches!(e, ProjectileEvent::Spawned { .. }))
                .count();
        }
        assert_eq!(shots, 2);
    }

    #[test]
    fn double_jump_then_no_more() {
        let mut sim = flat_sim();
        settle(&mut sim);
        let jump = tap(Controls {
            jump: true,
            ..Controls::NONE
        });

        assert!(sim.advance(DT, &jump, &FighterInput::IDLE).fighter(FighterId::A).jumped);
        sim.advance(DT, &FighterInput::IDLE, &FighterInput::IDLE);
        assert!(sim.advance(DT, &jump, &FighterInput::IDLE).fighter(FighterId::A).jumped);
        sim.advance(DT, &FighterInput::IDLE, &FighterInput::IDLE);
        assert!(!sim.advance(DT, &jump, &FighterInput::IDLE).fighter(FighterId::A).jumped);
        assert_eq!(sim.fighter(FighterId::A).jumps_remaining, 0);
    }

    #[test]
    fn eliminated_fighter_is_frozen_and_other_wins() {
        let mut sim = flat_sim();
        {
            let b = sim.fighter_mut(FighterId::B);
            b.lives = 1;
            b.position = Vec2::new(30.0, -20.0);
        }
        let events = sim.advance(DT, &FighterInput::IDLE, &FighterInput::IDLE);
        assert_eq!(events.terminal().collect::<Vec<_>>(), vec![FighterId::B]);
        assert!(sim.is_over());
        assert_eq!(sim.winner(), Some(FighterId::A));

        let frozen = sim.fighter(FighterId::B).position;
        sim.advance(DT, &FighterInput::IDLE, &FighterInput::IDLE);
        assert_eq!(sim.fighter(FighterId::B).position, frozen);
    }

    #[test]
    fn reset_restores_full_state() {
        let mut sim = flat_sim();
        sim.fighter_mut(FighterId::A).damage = 50.0;
        sim.fighter_mut(FighterId::A).lives = 1;
        sim.advance(DT, &FighterInput::IDLE, &FighterInput::IDLE);
        sim.reset();
        assert_eq!(sim.frame(), 0);
        assert_eq!(sim.fighter(FighterId::A).damage, 0.0);
        assert_eq!(sim.fighter(FighterId::A).lives, 3);
        assert_eq!(sim.projectile_count(), 0);
    }
}
