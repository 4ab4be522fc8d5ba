//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/coach/config.toml`.

use crate::periodization::{week_scheme, GATE_WEEK};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub program: ProgramDefaults,

    #[serde(default)]
    pub plan: PlanConfig,

    #[serde(default)]
    pub gate: GateConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Defaults used when a new program is created without explicit sizes
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgramDefaults {
    #[serde(default = "default_duration_weeks")]
    pub duration_weeks: u32,

    #[serde(default = "default_sessions_per_week")]
    pub sessions_per_week: u32,
}

impl Default for ProgramDefaults {
    fn default() -> Self {
        Self {
            duration_weeks: default_duration_weeks(),
            sessions_per_week: default_sessions_per_week(),
        }
    }
}

/// Session plan assembly parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanConfig {
    /// Work time counted per set in the duration estimate
    #[serde(default = "default_work_seconds_per_set")]
    pub work_seconds_per_set: u32,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            work_seconds_per_set: default_work_seconds_per_set(),
        }
    }
}

/// Phase gate parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GateConfig {
    #[serde(default = "default_gate_week")]
    pub week: u32,

    /// Most records read for one pass through the gate week, and the
    /// fallback window when no record carries a week tag
    #[serde(default = "default_lookback_sessions")]
    pub lookback_sessions: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            week: default_gate_week(),
            lookback_sessions: default_lookback_sessions(),
        }
    }
}

fn home_dir_or_cwd() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_dir_or_cwd().join(".local/share"));
    base.join("coach")
}

fn default_duration_weeks() -> u32 {
    12
}

fn default_sessions_per_week() -> u32 {
    3
}

fn default_work_seconds_per_set() -> u32 {
    60
}

fn default_gate_week() -> u32 {
    GATE_WEEK
}

fn default_lookback_sessions() -> usize {
    3
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.check()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn check(&self) -> Result<()> {
        if self.program.duration_weeks == 0 || self.program.sessions_per_week == 0 {
            return Err(Error::Config(
                "program defaults must be at least one week and one session".into(),
            ));
        }
        if self.plan.work_seconds_per_set == 0 {
            return Err(Error::Config("work_seconds_per_set must be positive".into()));
        }
        if week_scheme(self.gate.week).is_none() {
            return Err(Error::Config(format!(
                "gate week {} is outside the periodization table",
                self.gate.week
            )));
        }
        if self.gate.lookback_sessions == 0 {
            return Err(Error::Config("lookback_sessions must be at least 1".into()));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_dir_or_cwd().join(".config"));
        base.join("coach").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.program.duration_weeks, 12);
        assert_eq!(config.program.sessions_per_week, 3);
        assert_eq!(config.plan.work_seconds_per_set, 60);
        assert_eq!(config.gate.week, 12);
        assert_eq!(config.gate.lookback_sessions, 3);
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.gate.lookback_sessions = 4;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.gate, config.gate);
        assert_eq!(loaded.plan, config.plan);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[gate]
week = 10
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gate.week, 10);
        assert_eq!(config.gate.lookback_sessions, 3); // default
        assert_eq!(config.program.sessions_per_week, 3); // default
    }

    #[test]
    fn test_zero_defaults_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[program]\nsessions_per_week = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_gate_settings_checked() {
        let mut config = Config::default();
        config.gate.lookback_sessions = 0;
        assert!(matches!(config.check(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.gate.week = 40;
        assert!(matches!(config.check(), Err(Error::Config(_))));
    }
}
