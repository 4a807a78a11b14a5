//! Arena Brawl - headless match runner
//!
//! Loads configuration and tuning, starts one match on the configured
//! arena, and drives both fighters with seeded scripted controllers. The
//! HUD feed is written to the log.

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use arena_brawl::config::{Config, LogFormat};
use arena_brawl::game::{FighterId, GameMatch, MatchHandle, MatchMsg, MatchSettings, Tuning};
use arena_brawl::input::ScriptedController;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level, config.log_format);

    info!("Starting Arena Brawl");

    let tuning = match &config.tuning_path {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("Failed to load tuning from {}", path.display()))?,
        None => Tuning::default(),
    };
    let seed = config.seed.unwrap_or_else(rand::random);

    info!(
        arena = %config.arena,
        seed,
        tick_rate = config.tick_rate,
        time_limit_secs = config.match_time_limit.map(|d| d.as_secs()),
        "Configuration loaded"
    );

    let (game_match, handle) = GameMatch::new(Uuid::new_v4(), MatchSettings::from(&config), tuning)?;
    let updates = handle.subscribe();
    let match_task = tokio::spawn(game_match.run());

    let mut bots = [
        ScriptedController::new(seed),
        ScriptedController::new(seed.wrapping_add(1)),
    ];

    tokio::select! {
        _ = drive_bots(&handle, updates, &mut bots) => {}
        _ = shutdown_signal() => {
            let _ = handle.abort().await;
        }
    }

    let result = match_task.await.context("Match task panicked")?;
    match result.winner {
        Some(winner) => info!(winner = %winner, frames = result.frames, "Winner decided"),
        None => info!(frames = result.frames, reason = ?result.reason, "No winner"),
    }
    for fighter in &result.fighters {
        info!(hud = %fighter.hud_label(), lives = fighter.lives, "Final state");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Feed bot decisions back into the match for every snapshot until it ends
async fn drive_bots(
    handle: &MatchHandle,
    mut updates: tokio::sync::broadcast::Receiver<MatchMsg>,
    bots: &mut [ScriptedController; 2],
) {
    loop {
        match updates.recv().await {
            Ok(MatchMsg::MatchStarted { match_id, arena, .. }) => {
                info!(match_id = %match_id, arena = arena.name(), "Fight!");
            }
            Ok(MatchMsg::Snapshot(snapshot)) => {
                debug!(
                    frame = snapshot.frame,
                    p1 = %snapshot.fighters[0].hud_label(),
                    p2 = %snapshot.fighters[1].hud_label(),
                    "HUD"
                );
                for id in FighterId::ALL {
                    let me = &snapshot.fighters[id.index()];
                    let opponent = &snapshot.fighters[id.opponent().index()];
                    let controls = bots[id.index()].decide(me, opponent);
                    if handle.set_controls(id, controls).await.is_err() {
                        return;
                    }
                }
            }
            Ok(MatchMsg::MatchEnd(_)) | Err(RecvError::Closed) => return,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Controller fell behind the snapshot feed");
            }
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str, format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let (text, json) = match format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer().with_target(true)), None),
        LogFormat::Json => (
            None,
            Some(tracing_subscriber::fmt::layer().json().with_target(true)),
        ),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text)
        .with(json)
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping match");
        }
        _ = terminate => {
            info!("Received terminate signal, stopping match");
        }
    }
}
