use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::{IgnorePolicy, SaveTemplate};

pub const DEFAULT_SAVE_DIR: &str = "grabbed_images";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("interval must be a representable, non-negative number of seconds (got {0})")]
    InvalidInterval(String),
    #[error("timeout must be a finite, positive number of seconds (got {0})")]
    InvalidTimeout(String),
}

/// Configuration of a single webcam target.
///
/// Owned by whoever drives the grabber; changes take effect on the next tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabSettings {
    pub url: String,
    /// Seconds between ticks in the built-in loop.
    pub every: f64,
    /// Root of saved images; `None` disables persistence.
    pub save_dir: Option<PathBuf>,
    pub save_filename: SaveTemplate,
    /// Request timeout in seconds.
    pub timeout: f64,
    pub max_bytes: u64,
    pub policy: IgnorePolicy,
    /// Stop the built-in loop after this many ticks.
    pub max_ticks: Option<u64>,
}

impl Default for GrabSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            every: 2.0,
            save_dir: Some(PathBuf::from(DEFAULT_SAVE_DIR)),
            save_filename: SaveTemplate::default(),
            timeout: 30.0,
            max_bytes: 20 * 1024 * 1024,
            policy: IgnorePolicy::default(),
            max_ticks: None,
        }
    }
}

impl GrabSettings {
    pub fn new(url: impl Into<String>) -> Result<Self, SettingsError> {
        let settings = Self {
            url: url.into(),
            ..Self::default()
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_every(mut self, seconds: f64) -> Self {
        self.every = seconds;
        self
    }

    pub fn with_save_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.save_dir = dir;
        self
    }

    pub fn with_policy(mut self, policy: IgnorePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        Url::parse(&self.url).map_err(|err| SettingsError::InvalidUrl {
            url: self.url.clone(),
            message: err.to_string(),
        })?;
        if Duration::try_from_secs_f64(self.every).is_err() {
            return Err(SettingsError::InvalidInterval(self.every.to_string()));
        }
        if !self.timeout.is_finite() || self.timeout <= 0.0 {
            return Err(SettingsError::InvalidTimeout(self.timeout.to_string()));
        }
        Ok(())
    }

    /// Delay between ticks. Values too large for a `Duration` saturate;
    /// negative or NaN values are rejected by [`GrabSettings::validate`].
    pub fn interval(&self) -> Duration {
        match Duration::try_from_secs_f64(self.every) {
            Ok(interval) => interval,
            Err(_) if self.every > 0.0 => Duration::MAX,
            Err(_) => Duration::ZERO,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or(Duration::from_secs(30))
    }

    pub fn saving_enabled(&self) -> bool {
        self.save_dir
            .as_ref()
            .is_some_and(|dir| !dir.as_os_str().is_empty())
    }
}
