// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Host metadata: hostname, platform descriptor and uptime.
//!
//! Every field degrades to a placeholder instead of failing, so a session
//! header can always be produced.

use crate::MonitorError;
use std::path::Path;

const HOSTNAME_PATH: &str = "/proc/sys/kernel/hostname";
const OSRELEASE_PATH: &str = "/proc/sys/kernel/osrelease";
const UPTIME_PATH: &str = "/proc/uptime";

/// Static facts about the monitored host.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HostInfo {
    /// Host name, or `"unknown"`.
    pub hostname: String,
    /// `"{os} {kernel release} · {arch}"`, e.g. `"linux 6.8.0 · x86_64"`.
    pub platform: String,
    /// Seconds since boot (0 when unavailable).
    pub uptime_secs: u64,
}

impl HostInfo {
    /// Reads host metadata from procfs and the environment.
    pub fn read() -> Self {
        let hostname = read_sysfs_file(Path::new(HOSTNAME_PATH))
            .ok()
            .filter(|h| !h.is_empty())
            .or_else(|| std::env::var("HOSTNAME").ok().filter(|h| !h.is_empty()))
            .unwrap_or_else(|| "unknown".to_string());

        let release = read_sysfs_file(Path::new(OSRELEASE_PATH)).ok();
        let platform = platform_string(release.as_deref());

        let uptime_secs = read_sysfs_file(Path::new(UPTIME_PATH))
            .ok()
            .and_then(|c| parse_uptime(&c))
            .unwrap_or(0);

        Self {
            hostname,
            platform,
            uptime_secs,
        }
    }

    /// Uptime formatted as `"3d 4h 5m"`, `"4h 5m"` or `"5m"`.
    pub fn uptime_display(&self) -> String {
        format_uptime(self.uptime_secs)
    }
}

fn platform_string(release: Option<&str>) -> String {
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    match release {
        Some(r) if !r.is_empty() => format!("{os} {r} · {arch}"),
        _ => format!("{os} · {arch}"),
    }
}

/// Parses the first field of `/proc/uptime` (`"12345.67 54321.00"`).
fn parse_uptime(content: &str) -> Option<u64> {
    let secs: f64 = content.split_whitespace().next()?.parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then_some(secs as u64)
}

/// Formats a duration in seconds as days, hours and minutes.
pub fn format_uptime(secs: u64) -> String {
    let d = secs / 86_400;
    let h = (secs % 86_400) / 3_600;
    let m = (secs % 3_600) / 60;
    if d > 0 {
        format!("{d}d {h}h {m}m")
    } else if h > 0 {
        format!("{h}h {m}m")
    } else {
        format!("{m}m")
    }
}

/// Reads a sysfs/procfs file and returns its trimmed content.
///
/// This is a shared helper used by multiple modules in this crate.
pub(crate) fn read_sysfs_file(path: &Path) -> Result<String, MonitorError> {
    if !path.exists() {
        return Err(MonitorError::NotAvailable {
            path: path.display().to_string(),
        });
    }
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| MonitorError::read(path, e))
}
