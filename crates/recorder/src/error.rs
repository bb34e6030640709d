// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the recorder.

/// Errors that can occur while recording or summarising a session.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    /// Writing or reading the activity log failed.
    #[error("activity log error: {0}")]
    Log(#[from] activity_log::LogError),

    /// A required system reading failed.
    #[error("monitor error: {0}")]
    Monitor(#[from] resource_monitor::MonitorError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// A blocking sampling task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
