//! Configuration module - environment variable parsing

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::game::ArenaId;
use crate::util::time::{DEFAULT_SNAPSHOT_INTERVAL, DEFAULT_TICK_RATE, MAX_FRAME_DT, MAX_TICK_RATE};

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,

    /// Arena to load
    pub arena: ArenaId,
    /// Frames per second of the match loop
    pub tick_rate: u32,
    /// Upper bound on the delta handed to the simulation
    pub max_frame_dt: f32,
    /// Frames between presentation snapshots
    pub snapshot_interval: u32,
    /// Optional cap on match length
    pub match_time_limit: Option<Duration>,

    /// Seed for the scripted controllers; random when unset
    pub seed: Option<u64>,
    /// TOML file overriding gameplay tuning
    pub tuning_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            arena: ArenaId::default(),
            tick_rate: DEFAULT_TICK_RATE,
            max_frame_dt: MAX_FRAME_DT,
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
            match_time_limit: None,
            seed: None,
            tuning_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") | Some("pretty") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::invalid("LOG_FORMAT", other)),
        };

        let arena = match lookup("ARENA") {
            Some(raw) => raw
                .parse::<ArenaId>()
                .map_err(|_| ConfigError::invalid("ARENA", &raw))?,
            None => defaults.arena,
        };

        let tick_rate = parse(&lookup, "TICK_RATE")?.unwrap_or(defaults.tick_rate);
        if !(1..=MAX_TICK_RATE).contains(&tick_rate) {
            return Err(ConfigError::invalid("TICK_RATE", &tick_rate.to_string()));
        }

        let max_frame_dt: f32 = parse(&lookup, "MAX_FRAME_DT")?.unwrap_or(defaults.max_frame_dt);
        if !(max_frame_dt.is_finite() && max_frame_dt > 0.0) {
            return Err(ConfigError::invalid("MAX_FRAME_DT", &max_frame_dt.to_string()));
        }

        let snapshot_interval =
            parse(&lookup, "SNAPSHOT_INTERVAL")?.unwrap_or(defaults.snapshot_interval);
        if snapshot_interval == 0 {
            return Err(ConfigError::invalid("SNAPSHOT_INTERVAL", "0"));
        }

        let match_time_limit = parse::<u64, _>(&lookup, "MATCH_TIME_LIMIT_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format,
            arena,
            tick_rate,
            max_frame_dt,
            snapshot_interval,
            match_time_limit,
            seed: parse(&lookup, "SEED")?,
            tuning_path: lookup("TUNING_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::invalid(key, &raw)),
        None => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
        }
    }
}
