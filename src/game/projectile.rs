//! Projectile subsystem - spawn, advance, collide, retire

use glam::Vec2;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::arena::PlatformSet;
use super::combat::{CombatSystem, HitResolution, HitSource};
use super::fighter::{Fighter, FighterId};
use super::geometry::Aabb;
use super::tuning::{MeleeTuning, RangedTuning};

/// Remaining lifetime at or below this counts as expired; absorbs the drift
/// of repeated `dt` subtraction.
const EXPIRY_EPSILON: f32 = 1e-5;

/// Handle for a live projectile, unique within a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProjectileId(pub u64);

impl fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Active projectile
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    /// Firing fighter; used only to skip self-hits
    pub owner: FighterId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub damage: f32,
    pub knockback: f32,
    /// Seconds left, strictly decreasing
    pub lifetime: f32,
    pub radius: f32,
    pub bounds: Aabb,
}

impl Projectile {
    /// Spawn ahead of and slightly above the firer, flying along its facing
    pub fn fire(id: ProjectileId, firer: &Fighter, tuning: &RangedTuning) -> Self {
        let facing = firer.facing_sign();
        let position = firer.position + Vec2::new(facing * tuning.spawn_offset_x, tuning.spawn_offset_y);
        Self::new(
            id,
            firer.id,
            position,
            Vec2::new(facing, 0.0) * tuning.projectile_speed,
            tuning,
        )
    }

    pub fn new(
        id: ProjectileId,
        owner: FighterId,
        position: Vec2,
        velocity: Vec2,
        tuning: &RangedTuning,
    ) -> Self {
        let radius = tuning.projectile_radius;
        Self {
            id,
            owner,
            position,
            velocity,
            damage: tuning.projectile_damage,
            knockback: tuning.projectile_knockback,
            lifetime: tuning.projectile_lifetime,
            radius,
            bounds: Aabb::from_center_half(position, Vec2::splat(radius)),
        }
    }

    /// Move, age, refresh bounds
    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.lifetime -= dt;
        self.bounds = Aabb::from_center_half(self.position, Vec2::splat(self.radius));
    }

    pub fn expired(&self) -> bool {
        self.lifetime <= EXPIRY_EPSILON
    }
}

/// Why a projectile left the active set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DespawnReason {
    HitFighter { target: FighterId },
    HitPlatform,
    Expired,
}

/// Per-projectile result of one update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileOutcome {
    pub id: ProjectileId,
    pub position: Vec2,
    pub reason: DespawnReason,
    /// Present when a fighter was struck; already applied
    pub hit: Option<HitResolution>,
}

/// Owns every live projectile for a match
#[derive(Debug)]
pub struct ProjectileSystem {
    projectiles: Vec<Projectile>,
    next_id: u64,
}

impl Default for ProjectileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectileSystem {
    pub fn new() -> Self {
        Self {
            projectiles: Vec::new(),
            next_id: 1,
        }
    }

    /// Count down the firer's ranged cooldown and fire if the control is held
    /// and the cooldown is spent. Returns the new projectile.
    pub fn try_fire(
        &mut self,
        firer: &mut Fighter,
        ranged_held: bool,
        dt: f32,
        tuning: &RangedTuning,
    ) -> Option<&Projectile> {
        firer.ranged_cooldown = (firer.ranged_cooldown - dt).max(0.0);
        if !ranged_held || firer.ranged_cooldown > 0.0 {
            return None;
        }

        firer.ranged_cooldown = tuning.attack_rate;
        let id = ProjectileId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.projectiles.push(Projectile::fire(id, firer, tuning));
        self.projectiles.last()
    }

    /// Advance every projectile, resolve at most one impact each, and retire
    /// the ones that hit or expired. Fighter hits are applied immediately,
    /// in spawn order, so a later projectile sees an earlier one's damage.
    /// When two land on the same fighter in one frame, the older one is
    /// applied first and the newer one's launch is the one that sticks.
    ///
    /// Fighters are tested before platforms, in slot order, skipping the owner.
    pub fn update(
        &mut self,
        fighters: &mut [Fighter; 2],
        platforms: &PlatformSet,
        dt: f32,
        melee: &MeleeTuning,
    ) -> Vec<ProjectileOutcome> {
        let mut outcomes = Vec::new();

        for projectile in self.projectiles.iter_mut() {
            projectile.advance(dt);

            let struck = FighterId::ALL.into_iter().find(|&id| {
                let fighter = &fighters[id.index()];
                id != projectile.owner
                    && !fighter.eliminated
                    && projectile.bounds.intersects(&fighter.hurt_box)
            });

            let outcome = if let Some(target) = struck {
                let defender = &mut fighters[target.index()];
                let hit = HitResolution {
                    target,
                    source: HitSource::Projectile {
                        projectile: projectile.id,
                        owner: projectile.owner,
                    },
                    launch: CombatSystem::projectile_launch(
                        projectile.position,
                        projectile.knockback,
                        defender.position,
                        defender.damage,
                        melee,
                    ),
                    damage: projectile.damage,
                };
                CombatSystem::apply_hit(defender, &hit, melee);
                debug!(
                    projectile = %projectile.id,
                    owner = %projectile.owner,
                    target = %target,
                    target_damage = defender.damage,
                    "projectile hit"
                );
                Some(ProjectileOutcome {
                    id: projectile.id,
                    position: projectile.position,
                    reason: DespawnReason::HitFighter { target },
                    hit: Some(hit),
                })
            } else if platforms.iter().any(|p| projectile.bounds.intersects(p.bounds())) {
                Some(ProjectileOutcome {
                    id: projectile.id,
                    position: projectile.position,
                    reason: DespawnReason::HitPlatform,
                    hit: None,
                })
            } else if projectile.expired() {
                Some(ProjectileOutcome {
                    id: projectile.id,
                    position: projectile.position,
                    reason: DespawnReason::Expired,
                    hit: None,
                })
            } else {
                None
            };

            outcomes.extend(outcome);
        }

        if !outcomes.is_empty() {
            self.projectiles
                .retain(|p| !outcomes.iter().any(|o| o.id == p.id));
        }

        debug_assert!(
            self.projectiles.iter().all(|p| !p.expired()),
            "expired projectile survived its frame"
        );
        outcomes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Drop every projectile (match reset)
    pub fn clear(&mut self) {
        self.projectiles.clear();
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, projectile: Projectile) {
        self.next_id = self.next_id.max(projectile.id.0 + 1);
        self.projectiles.push(projectile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::arena::PlatformSpec;
    use crate::game::tuning::Tuning;

    fn fighters(a: Vec2, b: Vec2) -> [Fighter; 2] {
        let tuning = Tuning::default();
        [
            Fighter::new(FighterId::A, a, &tuning),
            Fighter::new(FighterId::B, b, &tuning),
        ]
    }

    fn empty_arena() -> PlatformSet {
        PlatformSet::new(&[]).unwrap()
    }

    #[test]
    fn fire_respects_cooldown() {
        let tuning = Tuning::default();
        let mut system = ProjectileSystem::new();
        let mut f = fighters(Vec2::ZERO, Vec2::new(50.0, 0.0));

        let first = system.try_fire(&mut f[0], true, 0.016, &tuning.ranged).cloned();
        let first = first.expect("first shot fires");
        assert_eq!(first.owner, FighterId::A);
        assert!(first.velocity.x > 0.0);
        assert!(first.position.x > 0.0 && first.position.y > 0.0);

        assert!(system.try_fire(&mut f[0], true, 0.016, &tuning.ranged).is_none());
        assert_eq!(system.len(), 1);
    }

    #[test]
    fn lifetime_expiry_removes_projectile_by_twentieth_update() {
        let mut tuning = Tuning::default();
        tuning.ranged.projectile_lifetime = 2.0;
        tuning.ranged.projectile_speed = 0.001;
        let mut system = ProjectileSystem::new();
        let mut f = fighters(Vec2::new(-50.0, 0.0), Vec2::new(50.0, 0.0));
        system.insert(Projectile::new(
            ProjectileId(1),
            FighterId::A,
            Vec2::ZERO,
            Vec2::new(0.001, 0.0),
            &tuning.ranged,
        ));

        let arena = empty_arena();
        let mut removed_at = None;
        for update in 1..=21 {
            let outcomes = system.update(&mut f, &arena, 0.1, &tuning.melee);
            if let Some(o) = outcomes.first() {
                assert_eq!(o.reason, DespawnReason::Expired);
                removed_at = Some(update);
                break;
            }
        }
        let removed_at = removed_at.expect("projectile should expire");
        assert!(removed_at <= 20, "removed at update {removed_at}");
        assert!(system.is_empty());
    }

    #[test]
    fn owner_is_never_hit() {
        let tuning = Tuning::default();
        let mut system = ProjectileSystem::new();
        let mut f = fighters(Vec2::ZERO, Vec2::new(50.0, 0.0));
        system.insert(Projectile::new(
            ProjectileId(7),
            FighterId::A,
            Vec2::ZERO,
            Vec2::ZERO,
            &tuning.ranged,
        ));

        let outcomes = system.update(&mut f, &empty_arena(), 0.016, &tuning.melee);
        assert!(outcomes.is_empty());
        assert_eq!(f[0].damage, 0.0);
    }

    #[test]
    fn fighter_hit_applies_damage_and_launch() {
        let tuning = Tuning::default();
        let mut system = ProjectileSystem::new();
        let mut f = fighters(Vec2::ZERO, Vec2::new(1.0, 0.0));
        f[1].knocked_back = true;
        system.insert(Projectile::new(
            ProjectileId(3),
            FighterId::A,
            Vec2::new(0.5, 0.2),
            Vec2::new(15.0, 0.0),
            &tuning.ranged,
        ));

        let outcomes = system.update(&mut f, &empty_arena(), 0.016, &tuning.melee);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(
            outcomes[0].reason,
            DespawnReason::HitFighter {
                target: FighterId::B
            }
        );
        assert_eq!(f[1].damage, tuning.ranged.projectile_damage);
        assert!(f[1].velocity.y > 0.0);
        assert!(f[1].knocked_back, "projectiles hit through hitstun");
        assert!(system.is_empty());
    }

    #[test]
    fn fighters_take_priority_over_platforms() {
        let tuning = Tuning::default();
        let mut system = ProjectileSystem::new();
        let mut f = fighters(Vec2::new(-20.0, 0.0), Vec2::new(1.0, 0.0));
        let arena = PlatformSet::new(&[PlatformSpec::new(1.0, 0.0, 2.0, 2.0)]).unwrap();
        system.insert(Projectile::new(
            ProjectileId(1),
            FighterId::A,
            Vec2::new(1.0, 0.0),
            Vec2::ZERO,
            &tuning.ranged,
        ));

        let outcomes = system.update(&mut f, &arena, 0.016, &tuning.melee);
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].reason, DespawnReason::HitFighter { .. }));
    }

    #[test]
    fn platform_consumes_projectile() {
        let tuning = Tuning::default();
        let mut system = ProjectileSystem::new();
        let mut f = fighters(Vec2::new(-20.0, 0.0), Vec2::new(20.0, 0.0));
        let arena = PlatformSet::new(&[PlatformSpec::new(1.0, 0.0, 1.0, 1.0)]).unwrap();
        system.insert(Projectile::new(
            ProjectileId(1),
            FighterId::A,
            Vec2::new(0.0, 0.0),
            Vec2::new(15.0, 0.0),
            &tuning.ranged,
        ));

        let outcomes = system.update(&mut f, &arena, 0.05, &tuning.melee);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].reason, DespawnReason::HitPlatform);
        assert!(system.is_empty());
    }
}
