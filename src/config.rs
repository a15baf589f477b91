//! Core configuration.
//!
//! The host either hands over a JSON document (`CoreConfig::from_json`) or
//! lets the crate read `APPROVAL_*` environment variables
//! (`CoreConfig::from_env`). Missing keys fall back to defaults.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{ApprovalError, ApprovalResult};

/// Longest tag name the platform accepts.
pub const DEFAULT_MAX_TAG_NAME_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Reported in the request log lines.
    pub app_name: String,
    /// Whether circle entries may be resolved. When false, circle entries
    /// are dropped from rule listings.
    pub circles_enabled: bool,
    pub log_level: String,
    /// SQLite file holding the activity log, when the crate reads it itself
    /// (see `ApprovalApi::with_configured_log`).
    pub activity_db_path: Option<String>,
    pub max_tag_name_length: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            app_name: "approval".to_string(),
            circles_enabled: true,
            log_level: "info".to_string(),
            activity_db_path: None,
            max_tag_name_length: DEFAULT_MAX_TAG_NAME_LENGTH,
        }
    }
}

impl CoreConfig {
    pub fn from_json(json: &str) -> ApprovalResult<Self> {
        let config: CoreConfig = serde_json::from_str(json)
            .map_err(|e| ApprovalError::Config(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> ApprovalResult<Self> {
        let defaults = Self::default();
        let max_tag_name_length = match env::var("APPROVAL_MAX_TAG_NAME_LENGTH") {
            Ok(v) => v.parse::<usize>().map_err(|e| {
                ApprovalError::Config(format!("invalid APPROVAL_MAX_TAG_NAME_LENGTH: {}", e))
            })?,
            Err(_) => defaults.max_tag_name_length,
        };

        let config = Self {
            app_name: env::var("APPROVAL_APP_NAME").unwrap_or(defaults.app_name),
            circles_enabled: read_optional_bool("APPROVAL_CIRCLES_ENABLED", defaults.circles_enabled),
            log_level: env::var("APPROVAL_LOG_LEVEL").unwrap_or(defaults.log_level),
            activity_db_path: env::var("APPROVAL_ACTIVITY_DB").ok(),
            max_tag_name_length,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ApprovalResult<()> {
        if self.max_tag_name_length == 0 {
            return Err(ApprovalError::Config(
                "max_tag_name_length must be positive".to_string(),
            ));
        }
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(ApprovalError::Config(format!(
                "unknown log level: {}",
                self.log_level
            )));
        }
        Ok(())
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info)
    }
}

fn read_optional_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = CoreConfig::from_json("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert!(config.circles_enabled);
        assert_eq!(config.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_partial_json() {
        let config =
            CoreConfig::from_json(r#"{"circles_enabled": false, "log_level": "debug"}"#).unwrap();
        assert!(!config.circles_enabled);
        assert_eq!(config.level_filter(), log::LevelFilter::Debug);
        assert_eq!(config.max_tag_name_length, DEFAULT_MAX_TAG_NAME_LENGTH);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(CoreConfig::from_json(r#"{"log_level": "loud"}"#).is_err());
        assert!(CoreConfig::from_json(r#"{"max_tag_name_length": 0}"#).is_err());
        assert!(CoreConfig::from_json("not json").is_err());
    }

    // Only test that touches APPROVAL_* variables.
    #[test]
    fn test_from_env() {
        env::set_var("APPROVAL_APP_NAME", "files_approval");
        env::set_var("APPROVAL_CIRCLES_ENABLED", "false");
        env::set_var("APPROVAL_LOG_LEVEL", "warn");
        env::set_var("APPROVAL_ACTIVITY_DB", "/var/lib/approval/activity.db");
        env::set_var("APPROVAL_MAX_TAG_NAME_LENGTH", "32");

        let config = CoreConfig::from_env().unwrap();
        assert_eq!(config.app_name, "files_approval");
        assert!(!config.circles_enabled);
        assert_eq!(config.level_filter(), log::LevelFilter::Warn);
        assert_eq!(
            config.activity_db_path.as_deref(),
            Some("/var/lib/approval/activity.db")
        );
        assert_eq!(config.max_tag_name_length, 32);

        env::set_var("APPROVAL_MAX_TAG_NAME_LENGTH", "lots");
        assert!(matches!(CoreConfig::from_env(), Err(ApprovalError::Config(_))));
        env::set_var("APPROVAL_MAX_TAG_NAME_LENGTH", "0");
        assert!(CoreConfig::from_env().is_err());

        for key in [
            "APPROVAL_APP_NAME",
            "APPROVAL_CIRCLES_ENABLED",
            "APPROVAL_LOG_LEVEL",
            "APPROVAL_ACTIVITY_DB",
            "APPROVAL_MAX_TAG_NAME_LENGTH",
        ] {
            env::remove_var(key);
        }
        assert_eq!(CoreConfig::from_env().unwrap(), CoreConfig::default());
    }
}
