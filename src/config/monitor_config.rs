//! Monitor Configuration - classification thresholds as operator-tunable TOML values
//!
//! Each struct implements `Default` with values matching the original
//! constants, ensuring zero-change behavior when no config file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::types::vibration_thresholds as defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a monitor deployment.
///
/// Load with `MonitorConfig::load()` which searches:
/// 1. `$VIBRASENSE_CONFIG` env var
/// 2. `./monitor_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Deployment identification
    #[serde(default)]
    pub deployment: DeploymentInfo,

    /// Trend classification thresholds
    #[serde(default)]
    pub thresholds: TrendThresholds,

    /// Rolling history settings
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            deployment: DeploymentInfo::default(),
            thresholds: TrendThresholds::default(),
            history: HistoryConfig::default(),
        }
    }
}

/// Deployment / site identification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentInfo {
    /// Site or plant name, used only for log context
    #[serde(default = "default_site")]
    pub site: String,
}

fn default_site() -> String {
    "DEFAULT".to_string()
}

impl Default for DeploymentInfo {
    fn default() -> Self {
        Self {
            site: default_site(),
        }
    }
}

/// Trend classification thresholds.
///
/// Defaults reproduce the hardcoded classification constants exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendThresholds {
    /// HF RMS at/above this is WATCH (g)
    #[serde(default = "default_hf_watch")]
    pub hf_rms_watch_g: f64,

    /// HF RMS at/above this is WARNING (g)
    #[serde(default = "default_hf_warning")]
    pub hf_rms_warning_g: f64,

    /// Envelope RMS above this confirms a bearing signature (g)
    #[serde(default = "default_envelope_high")]
    pub envelope_high_g: f64,

    /// ISO zone A/B boundary (mm/s)
    #[serde(default = "default_zone_b")]
    pub velocity_zone_b_mm_s: f64,

    /// ISO zone B/C boundary (mm/s)
    #[serde(default = "default_zone_c")]
    pub velocity_zone_c_mm_s: f64,

    /// ISO zone C/D boundary (mm/s)
    #[serde(default = "default_zone_d")]
    pub velocity_zone_d_mm_s: f64,

    /// Temperature alarm threshold (°C)
    #[serde(default = "default_temperature_alarm")]
    pub temperature_alarm_c: f64,
}

fn default_hf_watch() -> f64 {
    defaults::HF_RMS_WATCH_G
}
fn default_hf_warning() -> f64 {
    defaults::HF_RMS_WARNING_G
}
fn default_envelope_high() -> f64 {
    defaults::ENVELOPE_HIGH_G
}
fn default_zone_b() -> f64 {
    defaults::VELOCITY_ZONE_B_MM_S
}
fn default_zone_c() -> f64 {
    defaults::VELOCITY_ZONE_C_MM_S
}
fn default_zone_d() -> f64 {
    defaults::VELOCITY_ZONE_D_MM_S
}
fn default_temperature_alarm() -> f64 {
    defaults::TEMPERATURE_ALARM_C
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            hf_rms_watch_g: default_hf_watch(),
            hf_rms_warning_g: default_hf_warning(),
            envelope_high_g: default_envelope_high(),
            velocity_zone_b_mm_s: default_zone_b(),
            velocity_zone_c_mm_s: default_zone_c(),
            velocity_zone_d_mm_s: default_zone_d(),
            temperature_alarm_c: default_temperature_alarm(),
        }
    }
}

/// Rolling history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Feature windows kept per measurement point
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

fn default_history_capacity() -> usize {
    defaults::HISTORY_CAPACITY
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl MonitorConfig {
    /// Load configuration using the standard search order:
    /// 1. `$VIBRASENSE_CONFIG` environment variable
    /// 2. `./monitor_config.toml` in the current working directory
    /// 3. Built-in defaults (original hardcoded values)
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var("VIBRASENSE_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), site = %config.deployment.site, "Loaded monitor config from VIBRASENSE_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from VIBRASENSE_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "VIBRASENSE_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./monitor_config.toml
        let local = PathBuf::from("monitor_config.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(site = %config.deployment.site, "Loaded monitor config from ./monitor_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./monitor_config.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No monitor_config.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make classification incoherent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if t.hf_rms_watch_g >= t.hf_rms_warning_g {
            return Err(ConfigError::Invalid(format!(
                "hf_rms_watch_g ({}) must be below hf_rms_warning_g ({})",
                t.hf_rms_watch_g, t.hf_rms_warning_g
            )));
        }
        if !(t.velocity_zone_b_mm_s < t.velocity_zone_c_mm_s
            && t.velocity_zone_c_mm_s < t.velocity_zone_d_mm_s)
        {
            return Err(ConfigError::Invalid(format!(
                "velocity zone boundaries must be strictly increasing: {} / {} / {}",
                t.velocity_zone_b_mm_s, t.velocity_zone_c_mm_s, t.velocity_zone_d_mm_s
            )));
        }
        if self.history.capacity == 0 {
            return Err(ConfigError::Invalid(
                "history.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn defaults_match_hardcoded_thresholds() {
        let config = MonitorConfig::default();
        assert_eq!(config.thresholds.hf_rms_watch_g, 0.05);
        assert_eq!(config.thresholds.hf_rms_warning_g, 0.12);
        assert_eq!(config.thresholds.envelope_high_g, 0.02);
        assert_eq!(config.thresholds.velocity_zone_b_mm_s, 1.8);
        assert_eq!(config.thresholds.velocity_zone_c_mm_s, 2.8);
        assert_eq!(config.thresholds.velocity_zone_d_mm_s, 4.5);
        assert_eq!(config.thresholds.temperature_alarm_c, 80.0);
        assert_eq!(config.history.capacity, 10);
    }

    #[test]
    fn partial_toml_fills_missing_sections_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[thresholds]\nhf_rms_watch_g = 0.04").expect("write");

        let config = MonitorConfig::load_from_file(file.path()).expect("load");
        assert_eq!(config.thresholds.hf_rms_watch_g, 0.04);
        // Unset keys fall back to the hardcoded defaults
        assert_eq!(config.thresholds.hf_rms_warning_g, 0.12);
        assert_eq!(config.history.capacity, 10);
        assert_eq!(config.deployment.site, "DEFAULT");
    }

    #[test]
    fn inverted_hf_thresholds_are_rejected() {
        let config = MonitorConfig {
            thresholds: TrendThresholds {
                hf_rms_watch_g: 0.2,
                ..TrendThresholds::default()
            },
            ..MonitorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_history_capacity_is_rejected() {
        let config = MonitorConfig {
            history: HistoryConfig { capacity: 0 },
            ..MonitorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
