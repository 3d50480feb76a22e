//! Simulation settings
//!
//! Timing and rule knobs, persisted as JSON next to the level packs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How bridges behave once they reach either end of their swing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BridgeCycle {
    /// Keep swinging back and forth with no pause
    #[default]
    Autonomous,
    /// Rest at each end until a switch nudges them
    Latching,
}

impl BridgeCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeCycle::Autonomous => "Autonomous",
            BridgeCycle::Latching => "Latching",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "autonomous" | "auto" => Some(BridgeCycle::Autonomous),
            "latching" | "latch" => Some(BridgeCycle::Latching),
            _ => None,
        }
    }
}

/// Settings file problems
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(&'static str),
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing ===
    /// Seconds between simulation ticks
    pub tick_interval: f64,
    /// Seconds between staged tile reveals
    pub reveal_interval: f64,
    /// Maximum ticks run per pump before the clock resyncs
    pub max_catchup_ticks: u32,

    // === Rules ===
    pub bridge_cycle: BridgeCycle,
    /// Level the session starts on (1-based)
    pub start_level: u32,
    /// Deaths allowed before the session is lost (None = unlimited)
    pub lives: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval: SIM_DT,
            reveal_interval: REVEAL_INTERVAL,
            max_catchup_ticks: MAX_CATCHUP_TICKS,

            bridge_cycle: BridgeCycle::Autonomous,
            start_level: 1,
            lives: None,
        }
    }
}

impl Settings {
    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.tick_interval > 0.0) {
            return Err(SettingsError::Invalid("tick_interval must be positive"));
        }
        if !(self.reveal_interval > 0.0) {
            return Err(SettingsError::Invalid("reveal_interval must be positive"));
        }
        if self.max_catchup_ticks == 0 {
            return Err(SettingsError::Invalid("max_catchup_ticks must be at least 1"));
        }
        if self.start_level == 0 {
            return Err(SettingsError::Invalid("start_level is 1-based"));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        // A struct also deserializes from an array; settings files are objects
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(SettingsError::Invalid("settings must be a JSON object"));
        }
        let settings: Settings = serde_json::from_value(value)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Strict load, errors on a missing or invalid file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({})", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
