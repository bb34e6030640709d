// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! CPU utilisation monitoring.
//!
//! Reads CPU state from:
//! - `/proc/stat`: per-core jiffy counters. Utilisation is the busy share
//!   of the jiffies elapsed between two reads, so [`CpuSampler`] keeps the
//!   previous counters around.
//! - `/sys/devices/system/cpu/online`: online core count.
//!
//! The aggregate figure is the mean of the per-core figures, so both come
//! from the same pair of reads and are always consistent.

use crate::host::read_sysfs_file;
use crate::MonitorError;
use std::path::{Path, PathBuf};

/// Base sysfs path for CPU information.
const CPU_BASE: &str = "/sys/devices/system/cpu";

/// Kernel CPU accounting file.
const PROC_STAT_PATH: &str = "/proc/stat";

/// CPU utilisation over one sampling interval.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct CpuUsage {
    /// Mean utilisation across all cores, `0.0..=100.0`.
    pub total: f64,
    /// Per-logical-core utilisation, `0.0..=100.0`, in core order.
    pub cores: Vec<f64>,
}

/// Cumulative jiffies for one core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CoreTimes {
    busy: u64,
    total: u64,
}

/// Computes per-core utilisation from successive `/proc/stat` reads.
///
/// The first call measures since boot; every later call measures since the
/// previous one.
#[derive(Debug)]
pub struct CpuSampler {
    path: PathBuf,
    previous: Vec<CoreTimes>,
}

impl Default for CpuSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSampler {
    /// Creates a sampler reading the system `/proc/stat`.
    pub fn new() -> Self {
        Self::with_path(PROC_STAT_PATH)
    }

    /// Creates a sampler reading a specific file (for testing).
    pub(crate) fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            previous: Vec::new(),
        }
    }

    /// Reads the counters and returns utilisation since the last call.
    pub fn sample(&mut self) -> Result<CpuUsage, MonitorError> {
        if !self.path.exists() {
            return Err(MonitorError::NotAvailable {
                path: self.path.display().to_string(),
            });
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| MonitorError::read(&self.path, e))?;
        let current = parse_proc_stat(&content, &self.path)?;
        let usage = usage_between(&self.previous, &current);
        self.previous = current;
        Ok(usage)
    }
}

/// Parses the `cpuN` lines of `/proc/stat`.
///
/// Busy time is everything except `idle` and `iowait`. The `guest` columns
/// are already counted inside `user`/`nice` and are ignored.
fn parse_proc_stat(content: &str, source_path: &Path) -> Result<Vec<CoreTimes>, MonitorError> {
    let mut cores = Vec::new();
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else {
            continue;
        };
        // Skip the aggregate "cpu" line and everything that is not a core.
        let is_core = label
            .strip_prefix("cpu")
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
        if !is_core {
            continue;
        }

        let values = fields
            .take(8)
            .map(|v| v.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| MonitorError::parse(source_path, format!("non-numeric counter in '{line}'")))?;
        if values.len() < 4 {
            return Err(MonitorError::parse(
                source_path,
                format!("expected at least 4 counters in '{line}'"),
            ));
        }

        let total: u64 = values.iter().sum();
        let idle = values[3] + values.get(4).copied().unwrap_or(0);
        cores.push(CoreTimes {
            busy: total.saturating_sub(idle),
            total,
        });
    }

    if cores.is_empty() {
        return Err(MonitorError::parse(source_path, "no per-core cpu lines found"));
    }
    Ok(cores)
}

/// Utilisation between two counter snapshots.
///
/// Cores absent from `previous` (first call, or a core brought online) are
/// measured from zero.
fn usage_between(previous: &[CoreTimes], current: &[CoreTimes]) -> CpuUsage {
    let cores: Vec<f64> = current
        .iter()
        .enumerate()
        .map(|(i, now)| {
            let before = previous.get(i).copied().unwrap_or_default();
            let total = now.total.saturating_sub(before.total);
            let busy = now.busy.saturating_sub(before.busy);
            if total == 0 {
                0.0
            } else {
                (busy as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
            }
        })
        .collect();

    let total = if cores.is_empty() {
        0.0
    } else {
        cores.iter().sum::<f64>() / cores.len() as f64
    };
    CpuUsage { total, cores }
}

/// Determines the number of online CPU cores.
///
/// Tries `/sys/devices/system/cpu/online` first (e.g., `"0-3"` → 4 cores),
/// then falls back to counting `cpu[0-9]+` directories, and finally to
/// `std::thread::available_parallelism()`.
pub fn online_cores() -> Result<u32, MonitorError> {
    let online_path_str = format!("{CPU_BASE}/online");
    let online_path = Path::new(&online_path_str);
    if let Ok(content) = read_sysfs_file(online_path) {
        if let Some(count) = parse_cpu_range(&content) {
            return Ok(count);
        }
    }

    // Fallback: count cpu directories.
    if let Ok(entries) = std::fs::read_dir(CPU_BASE) {
        let count = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                let name = e.file_name();
                let name = name.to_string_lossy();
                name.starts_with("cpu")
                    && name.len() > 3
                    && name[3..].chars().all(|c| c.is_ascii_digit())
            })
            .count();
        if count > 0 {
            return Ok(count as u32);
        }
    }

    // Last resort: available_parallelism.
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .map_err(|e| MonitorError::read(Path::new(CPU_BASE), e))
}

/// Parses a CPU range string like `"0-3"` → 4, `"0-7"` → 8, `"0"` → 1, `"0,2-3"` → 3.
fn parse_cpu_range(s: &str) -> Option<u32> {
    let mut total = 0u32;
    for part in s.split(',') {
        let part = part.trim();
        if let Some((start_s, end_s)) = part.split_once('-') {
            let start: u32 = start_s.trim().parse().ok()?;
            let end: u32 = end_s.trim().parse().ok()?;
            total += end.checked_sub(start)? + 1;
        } else {
            let _: u32 = part.parse().ok()?;
            total += 1;
        }
    }
    if total > 0 {
        Some(total)
    } else {
        None
    }
}
