//! Presentation snapshots for the HUD / renderer

use glam::Vec2;
use serde::Serialize;

use super::events::FrameEvents;
use super::fighter::{Fighter, FighterId};
use super::geometry::Aabb;
use super::projectile::{Projectile, ProjectileId};
use super::simulation::Simulation;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FighterSnapshot {
    pub id: FighterId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing_right: bool,
    pub grounded: bool,
    /// Floored damage, as shown on the HUD
    pub damage_percent: u32,
    pub lives: u8,
    pub knocked_back: bool,
    pub attack_box: Option<Aabb>,
    pub eliminated: bool,
}

impl FighterSnapshot {
    /// HUD readout, e.g. `P1: 34%`
    pub fn hud_label(&self) -> String {
        format!("{}: {}%", self.id, self.damage_percent)
    }
}

impl From<&Fighter> for FighterSnapshot {
    fn from(f: &Fighter) -> Self {
        Self {
            id: f.id,
            position: f.position,
            velocity: f.velocity,
            facing_right: f.facing_right,
            grounded: f.grounded,
            damage_percent: f.damage_percent(),
            lives: f.lives,
            knocked_back: f.knocked_back,
            attack_box: f.attack_box,
            eliminated: f.eliminated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileSnapshot {
    pub id: ProjectileId,
    pub owner: FighterId,
    pub position: Vec2,
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(p: &Projectile) -> Self {
        Self {
            id: p.id,
            owner: p.owner,
            position: p.position,
        }
    }
}

/// Full visible state plus every non-quiet frame since the last snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSnapshot {
    pub frame: u64,
    pub elapsed_secs: f32,
    pub fighters: [FighterSnapshot; 2],
    pub projectiles: Vec<ProjectileSnapshot>,
    pub events: Vec<FrameEvents>,
}

/// Builds snapshots at a fixed frame interval
pub struct SnapshotBuilder {
    /// Frames since last snapshot
    frames_since_snapshot: u32,
    /// Snapshot interval in frames
    snapshot_interval: u32,
    /// Events waiting for the next snapshot
    pending: Vec<FrameEvents>,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            frames_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
            pending: Vec::new(),
        }
    }

    /// Queue a frame's events; quiet frames are dropped.
    pub fn record(&mut self, events: FrameEvents) {
        if !events.is_quiet() {
            self.pending.push(events);
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.frames_since_snapshot += 1;
        if self.frames_since_snapshot >= self.snapshot_interval {
            self.frames_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used for important events)
    pub fn force_next(&mut self) {
        self.frames_since_snapshot = self.snapshot_interval;
    }

    /// Build a snapshot and drain the pending events into it
    pub fn build(&mut self, sim: &Simulation, elapsed_secs: f32) -> MatchSnapshot {
        MatchSnapshot {
            frame: sim.frame(),
            elapsed_secs,
            fighters: sim.fighters().each_ref().map(FighterSnapshot::from),
            projectiles: sim.projectiles().map(ProjectileSnapshot::from).collect(),
            events: std::mem::take(&mut self.pending),
        }
    }
}

/// Snapshot volume, logged when a match ends
#[derive(Debug, Default)]
pub struct SnapshotStats {
    pub total_snapshots: u64,
    pub total_bytes: u64,
    pub avg_events_per_snapshot: f32,
}

impl SnapshotStats {
    pub fn record(&mut self, event_count: usize, bytes: usize) {
        self.total_snapshots += 1;
        self.total_bytes += bytes as u64;

        // Running average
        let n = self.total_snapshots as f32;
        self.avg_events_per_snapshot =
            self.avg_events_per_snapshot * ((n - 1.0) / n) + (event_count as f32 / n);
    }
}
