// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! System load averages from `/proc/loadavg`.

use crate::MonitorError;
use std::path::Path;

/// Default path to the kernel load average file.
const LOADAVG_PATH: &str = "/proc/loadavg";

/// 1-, 5- and 15-minute load averages.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

impl LoadAverage {
    /// Reads the load averages from `/proc/loadavg`.
    ///
    /// Returns zeros where the file does not exist (non-Linux hosts).
    pub fn read() -> Result<Self, MonitorError> {
        let path = Path::new(LOADAVG_PATH);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::read_from(path)
    }

    pub(crate) fn read_from(path: &Path) -> Result<Self, MonitorError> {
        let content = std::fs::read_to_string(path).map_err(|e| MonitorError::read(path, e))?;
        Self::parse(&content, path)
    }

    /// Parses `"0.35 0.28 0.22 1/234 5678"`.
    pub(crate) fn parse(content: &str, source_path: &Path) -> Result<Self, MonitorError> {
        let mut fields = content.split_whitespace();
        let mut next = |name: &str| -> Result<f64, MonitorError> {
            let raw = fields
                .next()
                .ok_or_else(|| MonitorError::parse(source_path, format!("missing {name} load average")))?;
            raw.parse().map_err(|_| {
                MonitorError::parse(
                    source_path,
                    format!("expected a number for the {name} load average, got '{raw}'"),
                )
            })
        };
        Ok(Self {
            one: next("1-minute")?,
            five: next("5-minute")?,
            fifteen: next("15-minute")?,
        })
    }

    /// 1-minute load divided by `cores`.
    pub fn per_core(&self, cores: u32) -> f64 {
        self.one / f64::from(cores.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_loadavg() {
        let load = LoadAverage::parse("0.35 0.28 0.22 1/234 5678\n", Path::new("/proc/loadavg"))
            .unwrap();
        assert_eq!(
            load,
            LoadAverage {
                one: 0.35,
                five: 0.28,
                fifteen: 0.22
            }
        );
    }

    #[test]
    fn test_parse_loadavg_short() {
        let result = LoadAverage::parse("0.35 0.28", Path::new("/proc/loadavg"));
        assert!(matches!(result, Err(MonitorError::ParseError { .. })));
    }

    #[test]
    fn test_parse_loadavg_garbage() {
        let result = LoadAverage::parse("high 0.28 0.22", Path::new("/proc/loadavg"));
        assert!(matches!(result, Err(MonitorError::ParseError { .. })));
    }

    #[test]
    fn test_per_core() {
        let load = LoadAverage {
            one: 2.0,
            five: 1.0,
            fifteen: 0.5,
        };
        assert!((load.per_core(4) - 0.5).abs() < 1e-9);
        assert!((load.per_core(0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_read_real_loadavg() {
        let load = LoadAverage::read().unwrap();
        assert!(load.one >= 0.0);
    }
}
