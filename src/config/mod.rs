use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{
    core::services::AlertPolicy,
    currency::CurrencyCode,
    domain::UserScope,
    errors::BuddyError,
    utils::{paths, write_atomic},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown config key `{0}`")]
    UnknownKey(String),
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl From<ConfigError> for BuddyError {
    fn from(err: ConfigError) -> Self {
        BuddyError::Config(err.to_string())
    }
}

/// E-mail alert settings. Delivery is simulated through the outbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub email_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub service_type: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_enabled: false,
            email: None,
            service_type: "simulation".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    pub default_user: String,
    pub alert_policy: AlertPolicy,
    pub notifications: NotificationSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "EUR".into(),
            default_user: UserScope::guest().to_string(),
            alert_policy: AlertPolicy::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 6] = [
        "currency",
        "locale",
        "default_user",
        "alert_policy",
        "email_enabled",
        "email",
    ];

    pub fn currency_code(&self) -> CurrencyCode {
        CurrencyCode::new(self.currency.as_str())
    }

    pub fn user_scope(&self) -> UserScope {
        UserScope::new(self.default_user.as_str())
    }

    /// Applies a `config set <key> <value>` style change.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            reason,
        };
        let value = value.trim();
        match key {
            "currency" => {
                if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(invalid("expected a three-letter ISO code".into()));
                }
                self.currency = CurrencyCode::new(value).as_str().to_string();
            }
            "locale" => self.locale = value.to_string(),
            "default_user" | "user" => self.default_user = UserScope::new(value).to_string(),
            "alert_policy" | "policy" => self.alert_policy = value.parse().map_err(invalid)?,
            "email_enabled" => {
                self.notifications.email_enabled = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    other => return Err(invalid(format!("`{other}` is not a boolean"))),
                }
            }
            "email" => {
                if value.is_empty() {
                    self.notifications.email = None;
                } else if !value.contains('@') {
                    return Err(invalid(format!("`{value}` is not an e-mail address")));
                } else {
                    self.notifications.email = Some(value.to_string());
                }
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_base_dir(&paths::app_data_dir())
    }

    pub fn with_base_dir(base: &Path) -> Self {
        Self {
            path: paths::config_file_in(base),
        }
    }

    /// Reads the config file, falling back to defaults when it does not exist.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
