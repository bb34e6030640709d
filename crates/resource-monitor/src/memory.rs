// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! System memory from `/proc/meminfo`.
//!
//! "Used" is `MemTotal - MemAvailable`, so reclaimable page cache counts as
//! free. Kernels older than 3.14 have no `MemAvailable`; there it is
//! estimated as `MemFree + Buffers + Cached`.

use crate::MonitorError;
use std::path::Path;

const MEMINFO_PATH: &str = "/proc/meminfo";

/// Bytes per GiB.
const GIB: f64 = (1u64 << 30) as f64;

/// System memory state.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MemoryInfo {
    /// Physical memory in bytes.
    pub total_bytes: u64,
    /// Memory the kernel can hand out without swapping, in bytes.
    pub available_bytes: u64,
    /// `total_bytes - available_bytes`.
    pub used_bytes: u64,
}

/// The `/proc/meminfo` keys this module reads, in kB.
#[derive(Debug, Default)]
struct MeminfoFields {
    total: Option<u64>,
    available: Option<u64>,
    free: Option<u64>,
    buffers: Option<u64>,
    cached: Option<u64>,
}

impl MemoryInfo {
    /// Reads `/proc/meminfo`.
    pub fn read() -> Result<Self, MonitorError> {
        Self::read_from(Path::new(MEMINFO_PATH))
    }

    pub(crate) fn read_from(path: &Path) -> Result<Self, MonitorError> {
        let content = std::fs::read_to_string(path).map_err(|e| MonitorError::read(path, e))?;
        Self::parse(&content, path)
    }

    pub(crate) fn parse(content: &str, source_path: &Path) -> Result<Self, MonitorError> {
        let mut fields = MeminfoFields::default();
        for line in content.lines() {
            let Some((key, rest)) = line.split_once(':') else {
                continue;
            };
            let slot = match key {
                "MemTotal" => &mut fields.total,
                "MemAvailable" => &mut fields.available,
                "MemFree" => &mut fields.free,
                "Buffers" => &mut fields.buffers,
                "Cached" => &mut fields.cached,
                _ => continue,
            };
            let raw = rest.trim().trim_end_matches("kB").trim();
            let kb = raw.parse::<u64>().map_err(|_| {
                MonitorError::parse(source_path, format!("{key}: expected a kB count, got '{raw}'"))
            })?;
            *slot = Some(kb);
        }

        let total_kb = fields
            .total
            .ok_or_else(|| MonitorError::parse(source_path, "MemTotal not found"))?;
        let available_kb = match fields.available {
            Some(kb) => kb,
            None => {
                let free = fields
                    .free
                    .ok_or_else(|| MonitorError::parse(source_path, "neither MemAvailable nor MemFree found"))?;
                let estimate = free + fields.buffers.unwrap_or(0) + fields.cached.unwrap_or(0);
                tracing::debug!("MemAvailable missing, estimated {estimate} kB from free + buffers + cached");
                estimate.min(total_kb)
            }
        };

        let total_bytes = total_kb.saturating_mul(1024);
        let available_bytes = available_kb.saturating_mul(1024);
        Ok(Self {
            total_bytes,
            available_bytes,
            used_bytes: total_bytes.saturating_sub(available_bytes),
        })
    }

    /// Used fraction of total memory, `0.0..=1.0`.
    pub fn utilisation(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.used_bytes as f64 / self.total_bytes as f64
        }
    }

    /// Used memory as a percentage, `0.0..=100.0`.
    pub fn used_percent(&self) -> f64 {
        self.utilisation() * 100.0
    }

    pub fn used_gib(&self) -> f64 {
        self.used_bytes as f64 / GIB
    }

    pub fn total_gib(&self) -> f64 {
        self.total_bytes as f64 / GIB
    }

    pub fn available_gib(&self) -> f64 {
        self.available_bytes as f64 / GIB
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "\
MemTotal:       16307856 kB
MemFree:         1204416 kB
MemAvailable:   10985312 kB
Buffers:          612340 kB
Cached:          8734204 kB
SwapCached:            0 kB
HugePages_Total:       0
";

    fn parse(content: &str) -> Result<MemoryInfo, MonitorError> {
        MemoryInfo::parse(content, Path::new("/proc/meminfo"))
    }

    #[test]
    fn test_parse_meminfo() {
        let info = parse(MEMINFO).unwrap();
        assert_eq!(info.total_bytes, 16_307_856 * 1024);
        assert_eq!(info.available_bytes, 10_985_312 * 1024);
        assert_eq!(info.used_bytes, (16_307_856 - 10_985_312) * 1024);
    }

    #[test]
    fn test_available_estimated_on_old_kernels() {
        let old = "MemTotal: 1000 kB\nMemFree: 200 kB\nBuffers: 50 kB\nCached: 150 kB\n";
        let info = parse(old).unwrap();
        assert_eq!(info.available_bytes, 400 * 1024);
        assert_eq!(info.used_bytes, 600 * 1024);
    }

    #[test]
    fn test_estimate_never_exceeds_total() {
        let odd = "MemTotal: 100 kB\nMemFree: 90 kB\nCached: 90 kB\n";
        let info = parse(odd).unwrap();
        assert_eq!(info.available_bytes, info.total_bytes);
        assert_eq!(info.used_bytes, 0);
    }

    #[test]
    fn test_missing_fields() {
        assert!(matches!(parse("MemFree: 1 kB\n"), Err(MonitorError::ParseError { .. })));
        assert!(matches!(parse("MemTotal: 1 kB\n"), Err(MonitorError::ParseError { .. })));
    }

    #[test]
    fn test_garbage_value() {
        let result = parse("MemTotal: lots kB\nMemAvailable: 1 kB\n");
        assert!(matches!(result, Err(MonitorError::ParseError { .. })));
    }

    #[test]
    fn test_gib_conversions() {
        let info = MemoryInfo {
            total_bytes: 16 << 30,
            available_bytes: 6 << 30,
            used_bytes: 10 << 30,
        };
        assert!((info.total_gib() - 16.0).abs() < 1e-9);
        assert!((info.used_gib() - 10.0).abs() < 1e-9);
        assert!((info.available_gib() - 6.0).abs() < 1e-9);
        assert!((info.used_percent() - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_total() {
        let info = MemoryInfo {
            total_bytes: 0,
            available_bytes: 0,
            used_bytes: 0,
        };
        assert_eq!(info.utilisation(), 0.0);
    }

    #[test]
    fn test_read_from_file() {
        let dir = std::env::temp_dir().join("infmon_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}_meminfo", std::process::id()));
        std::fs::write(&path, MEMINFO).unwrap();
        let info = MemoryInfo::read_from(&path).unwrap();
        assert_eq!(info.total_bytes, 16_307_856 * 1024);
        let _ = std::fs::remove_file(&path);

        let missing = MemoryInfo::read_from(&path);
        assert!(matches!(missing, Err(MonitorError::ReadError { .. })));
    }

    #[test]
    fn test_read_real_meminfo() {
        if Path::new(MEMINFO_PATH).exists() {
            let info = MemoryInfo::read().unwrap();
            assert!(info.total_bytes > 0);
            assert!(info.available_bytes <= info.total_bytes);
        }
    }
}
