//! Configuration for build-keeper.
//!
//! ```yaml
//! log_level: info
//! policy:
//!   kind: keep-since
//!   period: 10
//!   allow_failures: false
//! ```
//!
//! Older files that predate policies carry `build_period`, `dont_keep_failed`
//! and `count_from_last_kept` at the top level instead of `policy`. They are
//! upgraded to the equivalent policy when loaded.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{KeeperError, Result};
use crate::policy::{BuildNumberPolicy, KeepSincePolicy, RetentionPolicy};

/// Name used for the config directory and default file name
pub const APP_NAME: &str = "build-keeper";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct KeeperConfig {
    pub log_level: Option<String>,
    pub policy: RetentionPolicy,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            policy: RetentionPolicy::default(),
        }
    }
}

/// On-disk shape, accepting both current and legacy fields
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    log_level: Option<String>,
    policy: Option<RetentionPolicy>,
    build_period: Option<u32>,
    dont_keep_failed: Option<bool>,
    count_from_last_kept: Option<bool>,
}

impl RawConfig {
    fn has_legacy_fields(&self) -> bool {
        self.build_period.is_some() || self.dont_keep_failed.is_some() || self.count_from_last_kept.is_some()
    }

    fn legacy_policy(&self) -> Option<RetentionPolicy> {
        let period = self.build_period?;
        let allow_failures = !self.dont_keep_failed.unwrap_or(false);
        let policy = if self.count_from_last_kept.unwrap_or(false) {
            RetentionPolicy::KeepSince(KeepSincePolicy { period, allow_failures })
        } else {
            RetentionPolicy::BuildNumber(BuildNumberPolicy { period, allow_failures })
        };
        Some(policy)
    }
}

impl TryFrom<RawConfig> for KeeperConfig {
    type Error = KeeperError;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let policy = match (&raw.policy, raw.legacy_policy()) {
            (Some(policy), _) => {
                if raw.has_legacy_fields() {
                    log::warn!("Ignoring legacy build_period settings, a policy is configured");
                }
                policy.clone()
            }
            (None, Some(migrated)) => {
                log::info!("Upgraded legacy build keeper settings to {} policy", migrated.kind());
                migrated
            }
            (None, None) => {
                if raw.has_legacy_fields() {
                    return Err(KeeperError::InvalidConfig(
                        "legacy settings need a build_period".to_string(),
                    ));
                }
                RetentionPolicy::default()
            }
        };
        policy.validate()?;

        Ok(Self {
            log_level: raw.log_level.or_else(|| Some("info".to_string())),
            policy,
        })
    }
}

impl KeeperConfig {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // Explicit path must load
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        // ~/.config/build-keeper/build-keeper.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(APP_NAME).join(format!("{}.yml", APP_NAME));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // ./build-keeper.yml
        let fallback_config = PathBuf::from(format!("{}.yml", APP_NAME));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config = Self::from_yaml(&content)?;
        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(content)?;
        Self::try_from(raw)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
