//! Scheduler configuration (animblock.toml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// What to do with a stand-in write that cannot be animated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidWritePolicy {
    /// Drop the write silently
    #[default]
    Ignore,
    /// Fail the leg with an [`AnimationError`](crate::AnimationError)
    Report,
}

/// Configuration for an [`AnimationScheduler`](crate::AnimationScheduler)
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Frame rate hosts should drive `tick` at
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    /// Writes to properties the target does not have
    #[serde(default)]
    pub unknown_property: InvalidWritePolicy,
    /// Writes of NaN or infinite values
    #[serde(default = "default_non_finite")]
    pub non_finite_value: InvalidWritePolicy,
}

fn default_target_fps() -> u32 {
    120
}

fn default_non_finite() -> InvalidWritePolicy {
    InvalidWritePolicy::Report
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
            unknown_property: InvalidWritePolicy::default(),
            non_finite_value: default_non_finite(),
        }
    }
}

impl SchedulerConfig {
    /// Strict config: every invalid write is reported
    pub fn strict() -> Self {
        Self {
            unknown_property: InvalidWritePolicy::Report,
            non_finite_value: InvalidWritePolicy::Report,
            ..Self::default()
        }
    }

    /// Builder: set target frame rate
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    /// Builder: set unknown-property policy
    pub fn with_unknown_property(mut self, policy: InvalidWritePolicy) -> Self {
        self.unknown_property = policy;
        self
    }

    /// Builder: set non-finite value policy
    pub fn with_non_finite_value(mut self, policy: InvalidWritePolicy) -> Self {
        self.non_finite_value = policy;
        self
    }

    /// Time between two frames at `target_fps`
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML text
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.target_fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        Ok(())
    }
}
