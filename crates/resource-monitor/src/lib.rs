// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # resource-monitor
//!
//! Reads system metrics from `/proc/` and `/sys/` for the monitoring loop.
//!
//! # Monitored Metrics
//! - **CPU utilisation**: per-core and aggregate, from `/proc/stat` deltas.
//! - **Memory**: total, available and used, from `/proc/meminfo`.
//! - **Load average**: 1/5/15-minute, from `/proc/loadavg`.
//! - **Host info**: hostname, platform and uptime.
//!
//! All reads are cheap file reads and suitable for periodic polling.
//!
//! # Graceful Degradation
//! On hosts without procfs (e.g., macOS, some containers), subsystems that
//! rely on missing paths return sensible defaults rather than hard errors.
//! Only memory info (from `/proc/meminfo`) is required.
//!
//! # Example
//! ```no_run
//! use resource_monitor::{CpuSampler, SystemSnapshot};
//!
//! let mut sampler = CpuSampler::new();
//! let snap = SystemSnapshot::capture(&mut sampler).expect("failed to read system state");
//! println!("{}", snap.summary());
//! ```

mod cpu;
mod error;
mod host;
mod load;
mod memory;
mod snapshot;

pub use cpu::{online_cores, CpuSampler, CpuUsage};
pub use error::MonitorError;
pub use host::{format_uptime, HostInfo};
pub use load::LoadAverage;
pub use memory::MemoryInfo;
pub use snapshot::{now_unix_ms, SystemSnapshot};

/// Captures a one-off snapshot.
///
/// With no previous reading to compare against, CPU figures are averages
/// since boot. Long-running callers should keep a [`CpuSampler`] and use
/// [`SystemSnapshot::capture()`] instead.
pub fn snapshot() -> Result<SystemSnapshot, MonitorError> {
    SystemSnapshot::capture(&mut CpuSampler::new())
}
