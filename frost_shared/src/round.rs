//! Round context and per-round feature table.
//!
//! Which overlays a round gets (minimap, snowfall, light aura, ...) is data,
//! not code: the renderer asks the [`FeatureTable`] and never matches on a
//! round type itself. New round types only need a table entry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Room lifecycle status as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    #[default]
    Lobby,
    InRound,
    BetweenRounds,
    Finished,
    #[serde(other)]
    Unknown,
}

/// Kind of round being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoundType {
    #[default]
    Lobby,
    Survival,
    Snowball,
    Light,
    Ice,
    Maze,
    Bonus,
    Hill,
    #[serde(other)]
    Unknown,
}

impl RoundType {
    pub const ALL: [RoundType; 8] = [
        RoundType::Lobby,
        RoundType::Survival,
        RoundType::Snowball,
        RoundType::Light,
        RoundType::Ice,
        RoundType::Maze,
        RoundType::Bonus,
        RoundType::Hill,
    ];

    /// Built-in feature set, matching what each round has always shown.
    pub fn default_features(self) -> RoundFeatures {
        match self {
            RoundType::Lobby | RoundType::Survival | RoundType::Bonus => RoundFeatures::WEATHER,
            RoundType::Snowball => {
                RoundFeatures::MINIMAP | RoundFeatures::WEATHER | RoundFeatures::TEAM_RINGS
            }
            RoundType::Light => {
                RoundFeatures::MINIMAP | RoundFeatures::WEATHER | RoundFeatures::LIGHT_AURA
            }
            RoundType::Ice => RoundFeatures::MINIMAP | RoundFeatures::WEATHER,
            RoundType::Maze => RoundFeatures::MINIMAP,
            RoundType::Hill => {
                RoundFeatures::MINIMAP | RoundFeatures::WEATHER | RoundFeatures::HILL_ZONE
            }
            RoundType::Unknown => RoundFeatures::empty(),
        }
    }
}

bitflags::bitflags! {
    /// Render features toggled per round type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RoundFeatures: u8 {
        const MINIMAP = 1 << 0;
        const WEATHER = 1 << 1;
        const LIGHT_AURA = 1 << 2;  // aura around the light holder
        const TEAM_RINGS = 1 << 3;  // remaining-rings indicator per player
        const HILL_ZONE = 1 << 4;
    }
}

impl Default for RoundFeatures {
    fn default() -> Self {
        RoundFeatures::empty()
    }
}

/// Round type → feature set lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureTable {
    entries: HashMap<RoundType, RoundFeatures>,
}

impl Default for FeatureTable {
    fn default() -> Self {
        let entries = RoundType::ALL
            .into_iter()
            .map(|rt| (rt, rt.default_features()))
            .collect();
        Self { entries }
    }
}

impl FeatureTable {
    /// Built-in table with `overrides` replacing individual entries.
    pub fn with_overrides(overrides: &HashMap<RoundType, RoundFeatures>) -> Self {
        let mut table = Self::default();
        for (round_type, features) in overrides {
            table.entries.insert(*round_type, *features);
        }
        table
    }

    pub fn features(&self, round_type: RoundType) -> RoundFeatures {
        self.entries.get(&round_type).copied().unwrap_or_default()
    }

    pub fn has(&self, round_type: RoundType, feature: RoundFeatures) -> bool {
        self.features(round_type).contains(feature)
    }
}

/// What the camera and renderer need to know about the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundContext {
    pub status: RoomStatus,
    pub round_type: RoundType,
}

impl RoundContext {
    pub const fn new(status: RoomStatus, round_type: RoundType) -> Self {
        Self { status, round_type }
    }

    /// A real round is running or being shown (not the lobby playground).
    pub fn is_active_round(&self) -> bool {
        self.status != RoomStatus::Lobby && self.round_type != RoundType::Lobby
    }
}
