// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Recorder configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! interval_ms = 500
//! log_path = "./session.infmon"
//! max_samples = 7200
//! print_samples = true
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use crate::RecorderError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a recording session.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecorderConfig {
    /// Sampling interval in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Activity log destination. `None` samples without recording.
    #[serde(default)]
    pub log_path: Option<PathBuf>,
    /// Stop after this many samples. `None` runs until shutdown.
    #[serde(default)]
    pub max_samples: Option<u64>,
    /// Whether the observer callback sees each snapshot.
    #[serde(default = "default_true")]
    pub print_samples: bool,
}

fn default_interval_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

impl RecorderConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RecorderError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecorderError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, RecorderError> {
        toml::from_str(toml_str)
            .map_err(|e| RecorderError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, RecorderError> {
        toml::to_string_pretty(self)
            .map_err(|e| RecorderError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Rejects settings the sampling loop cannot run with.
    pub fn validate(&self) -> Result<(), RecorderError> {
        if self.interval_ms == 0 {
            return Err(RecorderError::ConfigError(
                "interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_samples == Some(0) {
            return Err(RecorderError::ConfigError(
                "max_samples must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }

    /// The sampling interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            log_path: None,
            max_samples: None,
            print_samples: true,
        }
    }
}
