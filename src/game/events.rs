//! Per-frame event report handed to the presentation layer

use glam::Vec2;
use serde::Serialize;

use super::combat::{HitResolution, HitSource};
use super::fighter::FighterId;
use super::projectile::{DespawnReason, ProjectileId};

/// Everything that changed for one fighter during a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FighterReport {
    pub id: FighterId,
    /// Damage taken this frame. Negative only when a respawn cleared it.
    pub damage_delta: f32,
    pub life_lost: bool,
    /// Lost the final stock this frame
    pub eliminated: bool,
    pub respawned: bool,
    pub jumped: bool,
    pub landed: bool,
    pub melee_started: bool,
    pub fired: bool,
}

impl FighterReport {
    pub fn new(id: FighterId) -> Self {
        Self {
            id,
            damage_delta: 0.0,
            life_lost: false,
            eliminated: false,
            respawned: false,
            jumped: false,
            landed: false,
            melee_started: false,
            fired: false,
        }
    }
}

/// A landed hit, after application
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HitEvent {
    pub target: FighterId,
    pub source: HitSource,
    pub launch: Vec2,
    pub damage: f32,
}

impl From<HitResolution> for HitEvent {
    fn from(hit: HitResolution) -> Self {
        Self {
            target: hit.target,
            source: hit.source,
            launch: hit.launch,
            damage: hit.damage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectileEvent {
    Spawned {
        id: ProjectileId,
        owner: FighterId,
        position: Vec2,
        velocity: Vec2,
    },
    Despawned {
        id: ProjectileId,
        position: Vec2,
        #[serde(flatten)]
        reason: DespawnReason,
    },
}

/// Result of one `Simulation::advance` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameEvents {
    pub frame: u64,
    /// Indexed by `FighterId::index`
    pub fighters: [FighterReport; 2],
    /// In application order
    pub hits: Vec<HitEvent>,
    /// Despawns from the projectile phase first, then spawns from the fighter phases
    pub projectiles: Vec<ProjectileEvent>,
}

impl FrameEvents {
    pub fn new(frame: u64) -> Self {
        Self {
            frame,
            fighters: FighterId::ALL.map(FighterReport::new),
            hits: Vec::new(),
            projectiles: Vec::new(),
        }
    }

    pub fn fighter(&self, id: FighterId) -> &FighterReport {
        &self.fighters[id.index()]
    }

    pub fn fighter_mut(&mut self, id: FighterId) -> &mut FighterReport {
        &mut self.fighters[id.index()]
    }

    /// Fighters that lost their final stock this frame
    pub fn terminal(&self) -> impl Iterator<Item = FighterId> + '_ {
        self.fighters.iter().filter(|r| r.eliminated).map(|r| r.id)
    }

    /// Nothing worth pushing to the HUD happened
    pub fn is_quiet(&self) -> bool {
        self.hits.is_empty()
            && self.projectiles.is_empty()
            && self
                .fighters
                .iter()
                .all(|r| !r.life_lost && !r.respawned && r.damage_delta == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_frame_is_quiet() {
        let events = FrameEvents::new(1);
        assert!(events.is_quiet());
        assert_eq!(events.terminal().count(), 0);
        assert_eq!(events.fighter(FighterId::B).id, FighterId::B);
    }

    #[test]
    fn despawn_serializes_flat() {
        let event = ProjectileEvent::Despawned {
            id: ProjectileId(4),
            position: Vec2::new(1.0, 2.0),
            reason: DespawnReason::HitFighter {
                target: FighterId::A,
            },
        };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["type"], "despawned");
        assert_eq!(json["id"], 4);
        assert_eq!(json["reason"], "hit_fighter");
        assert_eq!(json["target"], "a");
    }
}
