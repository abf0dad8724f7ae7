//! Runner settings with persistence
//!
//! Settings are saved to `~/.config/goap/settings.toml`

use std::fs;
use std::path::PathBuf;

use goap_planner::PlannerConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All runner settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub planner: PlannerConfig,
    pub run: RunSettings,
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("goap"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                warn!("Failed to parse settings: {}, using defaults", e);
                Self::default()
            }),
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        // Create config directory if it doesn't exist
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Simulation loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Agent updates to run before stopping
    pub max_ticks: u32,
    /// Stop early once the agent has nothing left to do
    pub stop_when_idle: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_ticks: 64,
            stop_when_idle: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goap_planner::Heuristic;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.run.max_ticks, 64);
        assert!(settings.run.stop_when_idle);
        assert_eq!(settings.planner, PlannerConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let settings = Settings::parse(
            "[run]\nmax_ticks = 8\n\n[planner]\nmax_depth = 3\n\n[planner.heuristic]\nkind = \"unsatisfied_conditions\"\nweight = 1.0\n",
        )
        .unwrap();
        assert_eq!(settings.run.max_ticks, 8);
        assert!(settings.run.stop_when_idle);
        assert_eq!(settings.planner.max_depth, 3);
        assert_eq!(settings.planner.max_expanded_nodes, 2048);
        assert_eq!(
            settings.planner.heuristic,
            Heuristic::UnsatisfiedConditions { weight: 1.0 }
        );
    }

    #[test]
    fn test_round_trip() {
        let mut settings = Settings::default();
        settings.run.max_ticks = 10;
        let text = toml::to_string_pretty(&settings).unwrap();
        let back = Settings::parse(&text).unwrap();
        assert_eq!(back.run.max_ticks, 10);
        assert_eq!(back.planner, settings.planner);
    }
}
