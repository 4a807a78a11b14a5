//! Arena definitions and static platform colliders

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::fighter::FighterId;
use super::geometry::Aabb;
use super::tuning::StockTuning;

/// Platform rectangle as supplied by the map loader (centre and full size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl PlatformSpec {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Static collider; never mutated after arena load
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    bounds: Aabb,
}

impl Platform {
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn top(&self) -> f32 {
        self.bounds.max.y
    }
}

/// Immutable set of platforms for one match
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformSet {
    platforms: Vec<Platform>,
}

/// Arena errors
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("Platform {index} is invalid: {reason}")]
    InvalidPlatform { index: usize, reason: &'static str },

    #[error("Unknown arena: {0}")]
    UnknownArena(String),
}

impl PlatformSet {
    /// Build and validate a platform set. An empty set is allowed.
    pub fn new(specs: &[PlatformSpec]) -> Result<Self, ArenaError> {
        let platforms = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                if ![spec.x, spec.y, spec.w, spec.h].iter().all(|v| v.is_finite()) {
                    return Err(ArenaError::InvalidPlatform {
                        index,
                        reason: "non-finite coordinate",
                    });
                }
                if spec.w <= 0.0 || spec.h <= 0.0 {
                    return Err(ArenaError::InvalidPlatform {
                        index,
                        reason: "width and height must be positive",
                    });
                }
                Ok(Platform {
                    bounds: Aabb::from_center_size(
                        Vec2::new(spec.x, spec.y),
                        Vec2::new(spec.w, spec.h),
                    ),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { platforms })
    }

    /// Platforms in resolution order
    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Top edge of the highest platform
    pub fn highest_top(&self) -> Option<f32> {
        self.platforms.iter().map(Platform::top).reduce(f32::max)
    }

    /// Spawn position for a fighter slot: above the highest platform,
    /// mirrored left/right by slot.
    pub fn spawn_point(&self, slot: FighterId, stock: &StockTuning) -> Vec2 {
        let y = self
            .highest_top()
            .map(|top| top + stock.spawn_clearance)
            .unwrap_or(stock.fallback_spawn_y);
        let x = match slot {
            FighterId::A => -stock.spawn_offset_x,
            FighterId::B => stock.spawn_offset_x,
        };
        Vec2::new(x, y)
    }
}

/// Built-in arenas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArenaId {
    /// Wide floor with two side ledges
    Shire,
    /// Split floor over a pit with a centre bridge
    Moria,
    /// Long wall-top with raised side ledges
    HelmsDeep,
}

impl Default for ArenaId {
    fn default() -> Self {
        Self::Shire
    }
}

impl ArenaId {
    pub const ALL: [ArenaId; 3] = [ArenaId::Shire, ArenaId::Moria, ArenaId::HelmsDeep];

    pub fn name(&self) -> &'static str {
        match self {
            ArenaId::Shire => "The Shire",
            ArenaId::Moria => "Moria",
            ArenaId::HelmsDeep => "Helm's Deep",
        }
    }

    pub fn platforms(&self) -> &'static [PlatformSpec] {
        const SHIRE: [PlatformSpec; 3] = [
            PlatformSpec::new(0.0, -4.0, 15.0, 1.0),
            PlatformSpec::new(-5.0, -1.0, 4.0, 0.5),
            PlatformSpec::new(5.0, -1.0, 4.0, 0.5),
        ];
        const MORIA: [PlatformSpec; 3] = [
            PlatformSpec::new(-6.0, -4.0, 6.0, 1.0),
            PlatformSpec::new(6.0, -4.0, 6.0, 1.0),
            PlatformSpec::new(0.0, 0.0, 5.0, 0.7),
        ];
        const HELMS_DEEP: [PlatformSpec; 3] = [
            PlatformSpec::new(0.0, -4.5, 20.0, 1.0),
            PlatformSpec::new(-7.0, -1.5, 6.0, 0.7),
            PlatformSpec::new(7.0, -1.5, 6.0, 0.7),
        ];

        match self {
            ArenaId::Shire => &SHIRE,
            ArenaId::Moria => &MORIA,
            ArenaId::HelmsDeep => &HELMS_DEEP,
        }
    }

    /// Load the arena's platform set
    pub fn load(&self) -> Result<PlatformSet, ArenaError> {
        PlatformSet::new(self.platforms())
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            ArenaId::Shire => "shire",
            ArenaId::Moria => "moria",
            ArenaId::HelmsDeep => "helms_deep",
        };
        f.write_str(id)
    }
}

impl FromStr for ArenaId {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shire" => Ok(ArenaId::Shire),
            "moria" => Ok(ArenaId::Moria),
            "helms_deep" | "helms-deep" => Ok(ArenaId::HelmsDeep),
            other => Err(ArenaError::UnknownArena(other.to_string())),
        }
    }
}
