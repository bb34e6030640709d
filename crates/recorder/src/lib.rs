// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # recorder
//!
//! Drives a monitoring session: samples the system on a fixed interval,
//! writes each reading to an [`activity_log::LogWriter`], and summarises
//! finished logs.
//!
//! The recorder takes:
//! - A [`RecorderConfig`] (interval, output path, sample limit).
//! - A shutdown future (usually Ctrl-C).
//! - An observer callback that sees every snapshot as it is taken.
//!
//! # Async Execution
//! The loop runs on `tokio`. Procfs reads are blocking, so sampling and the
//! one-off host lookup run on the blocking pool while the log writer stays
//! on the loop task.

mod config;
mod error;
mod session;
pub mod summary;

pub use config::RecorderConfig;
pub use error::RecorderError;
pub use session::{host_to_header, snapshot_to_sample, Recorder, SessionStats};
pub use summary::{LogSummary, MetricStats};
