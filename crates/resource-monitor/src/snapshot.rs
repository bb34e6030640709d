// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Aggregated point-in-time system snapshot.
//!
//! A [`SystemSnapshot`] combines CPU, memory, and load readings into a
//! single struct. It is what the recorder turns into one log sample per
//! tick.

use crate::{CpuSampler, CpuUsage, LoadAverage, MemoryInfo, MonitorError};
use std::time::{SystemTime, UNIX_EPOCH};

/// A complete point-in-time reading of all monitored system resources.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SystemSnapshot {
    /// CPU utilisation since the sampler's previous read.
    pub cpu: CpuUsage,
    /// System memory state.
    pub memory: MemoryInfo,
    /// Load averages.
    pub load: LoadAverage,
    /// Unix timestamp in milliseconds when the snapshot was taken.
    pub timestamp_unix_ms: i64,
}

impl SystemSnapshot {
    /// Captures a new snapshot by reading all system metrics.
    ///
    /// Individual subsystem failures are handled gracefully:
    /// - **CPU**: if `/proc/stat` is unavailable, an empty reading is used.
    /// - **Load**: if `/proc/loadavg` is unreadable, zeros are used.
    /// - **Memory**: this is the most critical reading and *must* succeed.
    pub fn capture(sampler: &mut CpuSampler) -> Result<Self, MonitorError> {
        let cpu = sampler.sample().unwrap_or_else(|e| {
            if e.is_not_available() {
                tracing::debug!("cpu sampling skipped: {e}");
            } else {
                tracing::warn!("cpu sampling failed: {e}");
            }
            CpuUsage::default()
        });

        let load = LoadAverage::read().unwrap_or_else(|e| {
            tracing::warn!("load average unavailable: {e}");
            LoadAverage::default()
        });

        let memory = MemoryInfo::read()?;

        Ok(Self {
            cpu,
            memory,
            load,
            timestamp_unix_ms: now_unix_ms(),
        })
    }

    /// Returns a summary string suitable for logging or CLI display.
    ///
    /// # Example output
    /// ```text
    /// CPU  23.4% (8 cores) · Mem 5.21/15.50 GiB (33.6%) · Load 0.52 0.48 0.40
    /// ```
    pub fn summary(&self) -> String {
        format!(
            "CPU {:5.1}% ({} cores) · Mem {:.2}/{:.2} GiB ({:.1}%) · Load {:.2} {:.2} {:.2}",
            self.cpu.total,
            self.cpu.cores.len(),
            self.memory.used_gib(),
            self.memory.total_gib(),
            self.memory.used_percent(),
            self.load.one,
            self.load.five,
            self.load.fifteen,
        )
    }

    /// Returns `true` if the system is under resource pressure.
    ///
    /// Conditions:
    /// - Aggregate CPU at or above 90 %.
    /// - Memory use at or above 90 %.
    /// - 1-minute load per core above 1.0.
    pub fn is_resource_constrained(&self) -> bool {
        let cores = self.cpu.cores.len().max(1) as u32;
        self.cpu.total >= 90.0
            || self.memory.used_percent() >= 90.0
            || self.load.per_core(cores) > 1.0
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
