//! Match lifecycle and the real-time frame loop

use serde::Serialize;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::input::InputTracker;
use crate::util::time::{
    tick_duration, unix_millis, FrameClock, DEFAULT_SNAPSHOT_INTERVAL, DEFAULT_TICK_RATE, MAX_FRAME_DT,
};

use super::arena::ArenaId;
use super::fighter::{Fighter, FighterId};
use super::simulation::{SimError, Simulation};
use super::snapshot::{FighterSnapshot, MatchSnapshot, SnapshotBuilder, SnapshotStats};
use super::tuning::Tuning;
use super::Controls;

/// Delay between arena load and the first simulated frame
const LOADING_DELAY_SECS: f32 = 0.1;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Arena loaded, fighters placed, clock not yet running
    Loading,
    /// Frames are being simulated
    InProgress,
    /// Match ended
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchEndReason {
    /// A fighter lost its final stock
    Elimination,
    /// The time limit ran out
    TimeLimit,
    /// A controller asked to stop
    Aborted,
}

/// Messages from controllers into the match
#[derive(Debug, Clone)]
pub enum ControllerMsg {
    /// Replace the held controls for a slot
    Controls { slot: FighterId, controls: Controls },
    /// End the match now
    Abort,
}

/// Messages broadcast by the match
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchMsg {
    MatchStarted {
        match_id: Uuid,
        arena: ArenaId,
        started_at_ms: u64,
    },
    Snapshot(MatchSnapshot),
    MatchEnd(MatchResult),
}

/// Final outcome of a match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub match_id: Uuid,
    pub winner: Option<FighterId>,
    pub reason: MatchEndReason,
    pub frames: u64,
    pub sim_secs: f32,
    pub fighters: [FighterSnapshot; 2],
}

/// Frame loop settings
#[derive(Debug, Clone)]
pub struct MatchSettings {
    pub arena: ArenaId,
    pub tick_rate: u32,
    pub max_frame_dt: f32,
    pub snapshot_interval: u32,
    pub time_limit: Option<Duration>,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            arena: ArenaId::default(),
            tick_rate: DEFAULT_TICK_RATE,
            max_frame_dt: MAX_FRAME_DT,
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
            time_limit: None,
        }
    }
}

impl From<&Config> for MatchSettings {
    fn from(config: &Config) -> Self {
        Self {
            arena: config.arena,
            tick_rate: config.tick_rate,
            max_frame_dt: config.max_frame_dt,
            snapshot_interval: config.snapshot_interval,
            time_limit: config.match_time_limit,
        }
    }
}

/// Handle to a running match
#[derive(Clone)]
pub struct MatchHandle {
    pub id: Uuid,
    pub input_tx: mpsc::Sender<ControllerMsg>,
    pub snapshot_tx: broadcast::Sender<MatchMsg>,
}

impl MatchHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<MatchMsg> {
        self.snapshot_tx.subscribe()
    }

    pub async fn set_controls(
        &self,
        slot: FighterId,
        controls: Controls,
    ) -> Result<(), mpsc::error::SendError<ControllerMsg>> {
        self.input_tx
            .send(ControllerMsg::Controls { slot, controls })
            .await
    }

    pub async fn abort(&self) -> Result<(), mpsc::error::SendError<ControllerMsg>> {
        self.input_tx.send(ControllerMsg::Abort).await
    }
}

/// One running match: owns the simulation and drives it from a frame clock
pub struct GameMatch {
    id: Uuid,
    settings: MatchSettings,
    phase: MatchPhase,
    sim: Simulation,
    held: [Controls; 2],
    trackers: [InputTracker; 2],
    loading_remaining: f32,
    sim_secs: f32,
    end_reason: Option<MatchEndReason>,
    input_rx: mpsc::Receiver<ControllerMsg>,
    snapshot_tx: broadcast::Sender<MatchMsg>,
    snapshot_builder: SnapshotBuilder,
    snapshot_stats: SnapshotStats,
}

impl GameMatch {
    /// Create a new match
    pub fn new(id: Uuid, settings: MatchSettings, tuning: Tuning) -> Result<(Self, MatchHandle), SimError> {
        let sim = Simulation::with_arena(settings.arena, tuning)?;

        let (input_tx, input_rx) = mpsc::channel(256);
        let (snapshot_tx, _) = broadcast::channel(64);

        let handle = MatchHandle {
            id,
            input_tx,
            snapshot_tx: snapshot_tx.clone(),
        };

        let game_match = Self {
            id,
            snapshot_builder: SnapshotBuilder::new(settings.snapshot_interval),
            settings,
            phase: MatchPhase::Loading,
            sim,
            held: [Controls::NONE; 2],
            trackers: [InputTracker::new(); 2],
            loading_remaining: LOADING_DELAY_SECS,
            sim_secs: 0.0,
            end_reason: None,
            input_rx,
            snapshot_tx,
            snapshot_stats: SnapshotStats::default(),
        };

        Ok((game_match, handle))
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Run the frame loop until the match ends
    pub async fn run(mut self) -> MatchResult {
        info!(match_id = %self.id, arena = %self.settings.arena, "Match loading");

        let mut frame_interval = interval(tick_duration(self.settings.tick_rate));
        frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut clock = FrameClock::new(self.settings.max_frame_dt);

        loop {
            frame_interval.tick().await;
            let dt = clock.tick();
            if dt >= self.settings.max_frame_dt {
                warn!(match_id = %self.id, dt, "Frame delta clamped after stall");
            }

            // Drain controller queue
            self.process_inputs();

            match self.phase {
                MatchPhase::Loading => self.update_loading(dt),
                MatchPhase::InProgress => self.run_frame(dt),
                MatchPhase::Ended => {}
            }

            // Build and broadcast snapshot if needed
            if self.phase != MatchPhase::Loading && self.snapshot_builder.should_send() {
                let snapshot = self.snapshot_builder.build(&self.sim, self.sim_secs);
                let event_count = snapshot.events.len();
                let msg = MatchMsg::Snapshot(snapshot);
                let bytes = serde_json::to_vec(&msg).map(|b| b.len()).unwrap_or(0);
                self.snapshot_stats.record(event_count, bytes);
                let _ = self.snapshot_tx.send(msg);
            }

            if self.phase == MatchPhase::Ended {
                break;
            }
        }

        let result = self.result();
        info!(
            match_id = %self.id,
            winner = ?result.winner,
            reason = ?result.reason,
            frames = result.frames,
            snapshots = self.snapshot_stats.total_snapshots,
            snapshot_bytes = self.snapshot_stats.total_bytes,
            "Match ended"
        );
        let _ = self.snapshot_tx.send(MatchMsg::MatchEnd(result.clone()));
        result
    }

    /// Apply every queued controller message
    fn process_inputs(&mut self) {
        while let Ok(msg) = self.input_rx.try_recv() {
            match msg {
                ControllerMsg::Controls { slot, controls } => {
                    self.held[slot.index()] = controls;
                }
                ControllerMsg::Abort => {
                    if self.phase != MatchPhase::Ended {
                        info!(match_id = %self.id, "Match aborted by controller");
                        self.end(MatchEndReason::Aborted);
                    }
                }
            }
        }
    }

    fn update_loading(&mut self, dt: f32) {
        self.loading_remaining -= dt;
        if self.loading_remaining > 0.0 {
            return;
        }

        self.phase = MatchPhase::InProgress;
        self.trackers.iter_mut().for_each(InputTracker::reset);
        self.snapshot_builder.force_next();
        let _ = self.snapshot_tx.send(MatchMsg::MatchStarted {
            match_id: self.id,
            arena: self.settings.arena,
            started_at_ms: unix_millis(),
        });
        info!(match_id = %self.id, "Match started!");
    }

    /// Simulate a single frame
    fn run_frame(&mut self, dt: f32) {
        let [input_a, input_b] = [0, 1].map(|i| self.trackers[i].update(self.held[i]));
        let events = self.sim.advance(dt, &input_a, &input_b);
        self.sim_secs += dt;

        for report in &events.fighters {
            if report.respawned {
                let f = self.sim.fighter(report.id);
                info!(match_id = %self.id, fighter = %report.id, lives = f.lives, "Fighter lost a stock");
                self.snapshot_builder.force_next();
            }
        }
        if !events.hits.is_empty() {
            debug!(match_id = %self.id, frame = events.frame, hits = events.hits.len(), "Hits resolved");
        }
        self.snapshot_builder.record(events);

        if self.sim.is_over() {
            self.end(MatchEndReason::Elimination);
        } else if let Some(limit) = self.settings.time_limit {
            if self.sim_secs >= limit.as_secs_f32() {
                info!(match_id = %self.id, limit_secs = limit.as_secs(), "Time limit reached");
                self.end(MatchEndReason::TimeLimit);
            }
        }
    }

    fn end(&mut self, reason: MatchEndReason) {
        self.phase = MatchPhase::Ended;
        self.end_reason = Some(reason);
        self.snapshot_builder.force_next();
    }

    /// Last standing wins. On time-out the fighter with more stocks, then
    /// less damage, takes it.
    fn result(&self) -> MatchResult {
        let reason = self.end_reason.unwrap_or(MatchEndReason::Aborted);
        let winner = match reason {
            MatchEndReason::Elimination => self.sim.winner(),
            MatchEndReason::TimeLimit => decide_on_points(self.sim.fighters()),
            MatchEndReason::Aborted => None,
        };

        MatchResult {
            match_id: self.id,
            winner,
            reason,
            frames: self.sim.frame(),
            sim_secs: self.sim_secs,
            fighters: self.sim.fighters().each_ref().map(FighterSnapshot::from),
        }
    }
}

fn decide_on_points(fighters: &[Fighter; 2]) -> Option<FighterId> {
    let [a, b] = fighters;
    match a.lives.cmp(&b.lives) {
        std::cmp::Ordering::Greater => Some(FighterId::A),
        std::cmp::Ordering::Less => Some(FighterId::B),
        std::cmp::Ordering::Equal => {
            if a.damage < b.damage {
                Some(FighterId::A)
            } else if b.damage < a.damage {
                Some(FighterId::B)
            } else {
                None
            }
        }
    }
}
