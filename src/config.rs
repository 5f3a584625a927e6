//! Library configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$INBOXSWEEP_CONFIG` (environment variable)
//! 2. `~/.config/inboxsweep/config.toml` (Linux/macOS)
//!    `%APPDATA%\inboxsweep\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::aggregate::DEFAULT_TOP_SENDERS;
use crate::classify::{Classifier, RuleSet, DEFAULT_MAX_AGE_DAYS};
use crate::error::{Result, SweepError};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "INBOXSWEEP_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Classification rules and thresholds.
    pub classifier: ClassifierConfig,
    /// Bulk action pacing.
    pub actions: ActionsConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override the directory holding the state file and logs.
    pub data_dir: Option<PathBuf>,
}

/// Classification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Messages older than this many days are flagged old.
    pub max_age_days: u32,
    /// Number of senders kept in the top-sender ranking.
    pub top_senders: usize,
    /// Rule overrides; categories left out keep the built-in lists.
    pub rules: RuleSet,
}

/// Pauses between bulk action steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Pause after selecting a message, in milliseconds.
    pub select_delay_ms: u64,
    /// Pause after each completed step, in milliseconds.
    pub step_delay_ms: u64,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            data_dir: None,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            top_senders: DEFAULT_TOP_SENDERS,
            rules: RuleSet::default(),
        }
    }
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            select_delay_ms: 50,
            step_delay_ms: 100,
        }
    }
}

impl Config {
    /// Parse a TOML document, lowercasing rule lists and checking ranges.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut cfg: Config =
            toml::from_str(contents).map_err(|e| SweepError::InvalidConfig(e.to_string()))?;
        cfg.classifier.rules.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would make the classifier meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.classifier.max_age_days == 0 {
            return Err(SweepError::InvalidConfig(
                "classifier.max_age_days must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Build the classifier these settings describe.
    pub fn classifier(&self) -> Classifier {
        Classifier::new(
            self.classifier.rules.clone(),
            self.classifier.max_age_days,
        )
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match Config::from_toml(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("inboxsweep").join("config.toml"))
}

/// Directory for the state file and logs.
pub fn data_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.data_dir {
        return dir.clone();
    }
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inboxsweep")
}

/// Path of the persisted scan state.
pub fn state_file_path(config: &Config) -> PathBuf {
    data_dir(config).join("state.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.classifier.max_age_days, 30);
        assert_eq!(cfg.classifier.top_senders, 10);
        assert_eq!(cfg.actions.select_delay_ms, 50);
        assert_eq!(cfg.actions.step_delay_ms, 100);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed = Config::from_toml(&toml_str).expect("deserialize");
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[classifier]
max_age_days = 14

[classifier.rules.promotions]
keywords = ["CLEARANCE"]
sender_patterns = ["Shop@"]
"#;
        let cfg = Config::from_toml(partial).expect("parse partial");
        assert_eq!(cfg.classifier.max_age_days, 14);
        assert_eq!(cfg.classifier.top_senders, 10);
        assert_eq!(cfg.classifier.rules.promotions.keywords, vec!["clearance"]);
        assert_eq!(cfg.classifier.rules.promotions.sender_patterns, vec!["shop@"]);
        assert_eq!(
            cfg.classifier.rules.newsletters,
            RuleSet::default().newsletters
        );
        assert_eq!(cfg.actions.step_delay_ms, 100);
    }

    #[test]
    fn test_zero_age_rejected() {
        let err = Config::from_toml("[classifier]\nmax_age_days = 0\n").unwrap_err();
        assert!(matches!(err, SweepError::InvalidConfig(_)));
    }

    #[test]
    fn test_bad_toml_is_invalid_config() {
        assert!(matches!(
            Config::from_toml("[general\n"),
            Err(SweepError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_data_dir_override() {
        let cfg = Config {
            general: GeneralConfig {
                data_dir: Some(PathBuf::from("/tmp/sweep")),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(state_file_path(&cfg), PathBuf::from("/tmp/sweep/state.json"));
    }
}
