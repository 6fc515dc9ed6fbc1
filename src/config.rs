use crate::defaults;
use crate::error::{MockviewError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub interview: InterviewConfig,
}

/// Evaluation service connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Transport timeout per request. 0 disables it.
    pub timeout_secs: u64,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    /// Media type attached to file-backed answers.
    pub mime_type: String,
}

/// Interview defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InterviewConfig {
    pub role: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BASE_URL.to_string(),
            timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            mime_type: defaults::AUDIO_MIME_TYPE.to_string(),
        }
    }
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            role: defaults::DEFAULT_ROLE.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Request timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MockviewError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                MockviewError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults only if the file is missing.
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(MockviewError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - MOCKVIEW_BASE_URL → service.base_url
    /// - MOCKVIEW_ROLE → interview.role
    /// - MOCKVIEW_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("MOCKVIEW_BASE_URL")
            && !url.is_empty()
        {
            self.service.base_url = url;
        }

        if let Ok(role) = std::env::var("MOCKVIEW_ROLE")
            && !role.is_empty()
        {
            self.interview.role = role;
        }

        if let Ok(device) = std::env::var("MOCKVIEW_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        self
    }

    /// Serialize back to TOML (for `mockview config show`).
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MockviewError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/mockview/config.toml on Linux
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("mockview").join("config.toml"))
            .ok_or_else(|| MockviewError::ConfigParse {
                message: "could not determine the user config directory".to_string(),
            })
    }
}
