//! Configuration system.
//!
//! Loads client configuration from JSON strings/files. Command-line flags
//! are applied on top by the binary.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::round::{FeatureTable, RoundFeatures, RoundType};

/// Root client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Newline-delimited JSON replay fed through the transport stand-in.
    #[serde(default = "default_replay_path")]
    pub replay_path: String,
    /// Drawable surface size in device pixels.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    /// Display refresh the frame loop is driven at.
    #[serde(default = "default_frame_hz")]
    pub frame_hz: u32,
    /// Constrained device: paint at most every ~33 ms.
    #[serde(default)]
    pub low_power: bool,
    /// Snowflakes drawn when the round has weather.
    #[serde(default = "default_weather_particles")]
    pub weather_particles: usize,
    /// Simulated latency before a requested sprite resolves (replay only).
    #[serde(default = "default_asset_latency_ms")]
    pub asset_latency_ms: u64,
    /// Per-round feature overrides, e.g. `{"survival": "MINIMAP | WEATHER"}`.
    #[serde(default)]
    pub round_features: HashMap<RoundType, RoundFeatures>,
}

fn default_replay_path() -> String {
    "demos/session.jsonl".to_string()
}

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_viewport_height() -> f64 {
    720.0
}

fn default_frame_hz() -> u32 {
    60
}

fn default_weather_particles() -> usize {
    48
}

fn default_asset_latency_ms() -> u64 {
    120
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            replay_path: default_replay_path(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            frame_hz: default_frame_hz(),
            low_power: false,
            weather_particles: default_weather_particles(),
            asset_latency_ms: default_asset_latency_ms(),
            round_features: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg = Self::from_json_str(&raw)
            .with_context(|| format!("parse config {}", path.display()))?;
        debug!(path = %path.display(), overrides = cfg.round_features.len(), "Loaded config");
        Ok(cfg)
    }

    /// Built-in round features with this config's overrides applied.
    pub fn feature_table(&self) -> FeatureTable {
        FeatureTable::with_overrides(&self.round_features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let cfg = ClientConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg.frame_hz, 60);
        assert_eq!(cfg.viewport_width, 1280.0);
        assert!(!cfg.low_power);
        assert!(cfg.round_features.is_empty());
    }

    #[test]
    fn round_feature_overrides_parse() {
        let cfg = ClientConfig::from_json_str(
            r#"{"low_power": true, "round_features": {"survival": "MINIMAP | WEATHER"}}"#,
        )
        .unwrap();
        assert!(cfg.low_power);
        let table = cfg.feature_table();
        assert_eq!(
            table.features(RoundType::Survival),
            RoundFeatures::MINIMAP | RoundFeatures::WEATHER
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ClientConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("read config"));
    }
}
