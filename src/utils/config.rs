use crate::api::types::{ApiError, ApiResult};
use crate::core::{MAX_TTL_DAYS, MIN_TTL_DAYS};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Coordinator configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Lifetime requested when the caller does not pass one (days)
    pub default_ttl_days: u32,
    /// Upper bound accepted by `validate_ttl_days` (days)
    pub max_ttl_days: u32,
    /// Deliver failed hosting outcomes to the listener.
    /// Off by default: hosting failures are logged and dropped.
    pub notify_host_failures: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_ttl_days: 1,
            max_ttl_days: MAX_TTL_DAYS,
            notify_host_failures: false,
        }
    }
}

impl CoordinatorConfig {
    /// Check a caller-supplied TTL against the configured limits.
    ///
    /// The coordinator never calls this itself; hosting passes the TTL
    /// through unchecked.
    pub fn validate_ttl_days(&self, ttl_days: u32) -> ApiResult<u32> {
        if ttl_days < MIN_TTL_DAYS || ttl_days > self.max_ttl_days {
            return Err(ApiError::InvalidTtl {
                ttl_days,
                min: MIN_TTL_DAYS,
                max: self.max_ttl_days,
            });
        }
        Ok(ttl_days)
    }
}

/// Configuration error types
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid parameter value
    InvalidParameter { parameter: String, value: String, reason: String },
    /// Configuration file I/O error
    IoError { message: String },
    /// JSON serialization/deserialization error
    SerializationError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter { parameter, value, reason } => {
                write!(f, "Invalid parameter '{}' = '{}': {}", parameter, value, reason)
            }
            ConfigError::IoError { message } => write!(f, "I/O error: {}", message),
            ConfigError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Loads, validates and persists the coordinator configuration
#[derive(Debug, Default)]
pub struct ConfigurationManager {
    config: CoordinatorConfig,
    config_file_path: Option<String>,
    is_modified: bool,
}

impl ConfigurationManager {
    /// Create a new configuration manager with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn get_config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Replace the configuration after validating it
    pub fn update_config(&mut self, config: CoordinatorConfig) -> Result<(), ConfigError> {
        Self::validate_config(&config)?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Update the default TTL, returning the previous value
    pub fn set_default_ttl(&mut self, ttl_days: u32) -> Result<u32, ConfigError> {
        let mut candidate = self.config.clone();
        candidate.default_ttl_days = ttl_days;
        Self::validate_config(&candidate)?;

        let old_value = self.config.default_ttl_days;
        self.config = candidate;
        self.is_modified = true;
        Ok(old_value)
    }

    /// Toggle delivery of failed hosting outcomes, returning the previous value
    pub fn set_notify_host_failures(&mut self, enabled: bool) -> bool {
        let old_value = self.config.notify_host_failures;
        self.config.notify_host_failures = enabled;
        self.is_modified = true;
        old_value
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: CoordinatorConfig = serde_json::from_str(&content).map_err(|e| {
            ConfigError::SerializationError {
                message: format!("Failed to parse config file '{}': {}", path_str, e),
            }
        })?;

        if let Err(e) = Self::validate_config(&config) {
            warn!("event=config_load module=config status=rejected path={} error={}", path_str, e);
            return Err(e);
        }

        info!(
            "event=config_load module=config status=ok path={} default_ttl_days={} notify_host_failures={}",
            path_str, config.default_ttl_days, config.notify_host_failures
        );

        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(&self.config).map_err(|e| {
            ConfigError::SerializationError {
                message: format!("Failed to serialize config: {}", e),
            }
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })?;

        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the currently loaded file path
    pub fn save(&mut self) -> Result<(), ConfigError> {
        if let Some(path) = self.config_file_path.clone() {
            self.save_to_file(path)
        } else {
            Err(ConfigError::IoError {
                message: "No file path set for saving configuration".to_string(),
            })
        }
    }

    /// Check if configuration has been modified since last save
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    pub fn validate_config(config: &CoordinatorConfig) -> Result<(), ConfigError> {
        if config.max_ttl_days < MIN_TTL_DAYS || config.max_ttl_days > MAX_TTL_DAYS {
            return Err(ConfigError::InvalidParameter {
                parameter: "max_ttl_days".to_string(),
                value: config.max_ttl_days.to_string(),
                reason: format!("must be between {} and {}", MIN_TTL_DAYS, MAX_TTL_DAYS),
            });
        }

        if config.default_ttl_days < MIN_TTL_DAYS || config.default_ttl_days > config.max_ttl_days {
            return Err(ConfigError::InvalidParameter {
                parameter: "default_ttl_days".to_string(),
                value: config.default_ttl_days.to_string(),
                reason: format!("must be between {} and max_ttl_days ({})", MIN_TTL_DAYS, config.max_ttl_days),
            });
        }

        Ok(())
    }
}
