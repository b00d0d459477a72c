use crate::core::engine::EngineSettings;
use crate::core::notification::NotificationSettings;
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_commit_attempts: Option<u32>,
    pub enforce_professional_availability: Option<bool>,
    /// Fixes the assignment draw; leave unset in production.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: Some(3),
            enforce_professional_availability: Some(true),
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub max_delivery_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_delivery_attempts: Some(3),
            retry_delay_ms: Some(200),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive such as `info` or `booking_engine=debug`.
    pub level: Option<String>,
    #[serde(default)]
    pub json: bool,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EngineError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EngineError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        let defaults = EngineSettings::default();
        EngineSettings {
            max_commit_attempts: self
                .engine
                .max_commit_attempts
                .unwrap_or(defaults.max_commit_attempts),
            enforce_professional_availability: self
                .engine
                .enforce_professional_availability
                .unwrap_or(defaults.enforce_professional_availability),
            rng_seed: self.engine.rng_seed,
        }
    }

    pub fn notification_settings(&self) -> NotificationSettings {
        let defaults = NotificationSettings::default();
        NotificationSettings {
            enabled: self.notifications.enabled,
            max_delivery_attempts: self
                .notifications
                .max_delivery_attempts
                .unwrap_or(defaults.max_delivery_attempts),
            retry_delay: self
                .notifications
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
        }
    }
}

/// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
pub(crate) fn substitute_env_vars(content: &str) -> Result<String> {
    use regex::Regex;
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EngineError::ConfigValidationError {
        field: "env_substitution".to_string(),
        message: e.to_string(),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(attempts) = self.engine.max_commit_attempts {
            validation::validate_range("engine.max_commit_attempts", attempts, 1, 10)?;
        }
        if let Some(attempts) = self.notifications.max_delivery_attempts {
            validation::validate_range("notifications.max_delivery_attempts", attempts, 1, 20)?;
        }
        if let Some(level) = &self.logging.level {
            validation::validate_non_empty_string("logging.level", level)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[engine]
max_commit_attempts = 5
enforce_professional_availability = false
rng_seed = 42

[notifications]
enabled = false
max_delivery_attempts = 2
retry_delay_ms = 10

[logging]
level = "debug"
json = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let engine = config.engine_settings();
        assert_eq!(engine.max_commit_attempts, 5);
        assert!(!engine.enforce_professional_availability);
        assert_eq!(engine.rng_seed, Some(42));

        let notifications = config.notification_settings();
        assert!(!notifications.enabled);
        assert_eq!(notifications.max_delivery_attempts, 2);
        assert_eq!(notifications.retry_delay, Duration::from_millis(10));
        assert!(config.logging.json);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        let engine = config.engine_settings();
        assert_eq!(engine.max_commit_attempts, 3);
        assert!(engine.enforce_professional_availability);
        assert_eq!(engine.rng_seed, None);
        assert!(config.notification_settings().enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BOOKING_TEST_SEED", "1234");

        let toml_content = r#"
[engine]
rng_seed = ${BOOKING_TEST_SEED}
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.engine.rng_seed, Some(1234));

        std::env::remove_var("BOOKING_TEST_SEED");
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str("[engine]\nmax_commit_attempts = 0\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[engine]\nmax_commit_attempts = 4\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.engine_settings().max_commit_attempts, 4);
    }
}
