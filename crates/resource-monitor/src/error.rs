// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for resource monitoring.

use std::path::Path;

/// Errors that can occur when reading procfs or sysfs.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// The file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    /// The file was read but its contents are not in the expected format.
    #[error("unexpected contents in {path}: {detail}")]
    ParseError { path: String, detail: String },

    /// The file does not exist on this host (not Linux, or a restricted container).
    #[error("{path} is not available on this system")]
    NotAvailable { path: String },
}

impl MonitorError {
    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, detail: impl Into<String>) -> Self {
        Self::ParseError {
            path: path.display().to_string(),
            detail: detail.into(),
        }
    }

    /// Whether the failure only means the source is absent on this host.
    pub fn is_not_available(&self) -> bool {
        matches!(self, Self::NotAvailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = MonitorError::parse(Path::new("/proc/loadavg"), "missing field");
        assert_eq!(
            err.to_string(),
            "unexpected contents in /proc/loadavg: missing field"
        );
        assert!(!err.is_not_available());

        let err = MonitorError::NotAvailable {
            path: "/proc/stat".into(),
        };
        assert!(err.is_not_available());
        assert!(err.to_string().contains("/proc/stat"));
    }
}
