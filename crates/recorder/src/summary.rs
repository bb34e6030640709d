// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Session statistics computed from a recorded activity log.
//!
//! [`LogSummary`] walks a record stream once and reduces every metric to
//! min / mean / p95 / max. It is what `infmon report` prints.

use activity_log::{Header, LogError, LogReader, Record};
use std::path::Path;
use std::time::Duration;

/// Distribution of one metric over a session.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct MetricStats {
    pub min: f64,
    pub avg: f64,
    /// 95th percentile, nearest-rank method.
    pub p95: f64,
    pub max: f64,
}

impl MetricStats {
    /// Computes the statistics, or `None` for an empty slice.
    ///
    /// NaN readings are ignored.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        // ceil(0.95 * n) without float rounding.
        let rank = (95 * n).div_ceil(100);
        let p95 = sorted[rank.clamp(1, n) - 1];
        let avg = sorted.iter().sum::<f64>() / n as f64;

        Some(Self {
            min: sorted[0],
            avg,
            p95,
            max: sorted[n - 1],
        })
    }
}

/// Aggregate view of one activity log.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct LogSummary {
    /// The first Header record, if any.
    pub header: Option<Header>,
    /// Header records after the first (ignored for the summary).
    pub extra_headers: u64,
    /// Number of Sample records.
    pub samples: u64,
    /// Records of a type this version does not understand.
    pub unknown_records: u64,
    /// Timestamp of the first Sample.
    pub first_sample_unix_ms: Option<i64>,
    /// Timestamp of the last Sample.
    pub last_sample_unix_ms: Option<i64>,
    /// Largest per-core vector seen.
    pub max_cores: usize,
    pub cpu_total: Option<MetricStats>,
    pub mem_percent: Option<MetricStats>,
    pub load1: Option<MetricStats>,
    pub load5: Option<MetricStats>,
    pub load15: Option<MetricStats>,
    /// The error that ended the scan early, e.g. a truncated final record.
    pub read_error: Option<String>,
}

impl LogSummary {
    /// Opens a log and summarises it.
    ///
    /// Only failing to open the file is an error. A damaged record stops
    /// the scan and is reported in [`LogSummary::read_error`], keeping
    /// everything read before it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let reader = LogReader::open(path)?;
        Ok(Self::from_records(reader))
    }

    /// Summarises a record stream, stopping at the first error.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Result<Record, LogError>>,
    {
        let mut summary = Self::default();
        let mut cpu = Vec::new();
        let mut mem = Vec::new();
        let mut load1 = Vec::new();
        let mut load5 = Vec::new();
        let mut load15 = Vec::new();

        for record in records {
            match record {
                Ok(Record::Header(h)) => {
                    if summary.header.is_none() {
                        summary.header = Some(h);
                    } else {
                        summary.extra_headers += 1;
                    }
                }
                Ok(Record::Sample(s)) => {
                    summary.samples += 1;
                    summary.first_sample_unix_ms.get_or_insert(s.timestamp_unix_ms);
                    summary.last_sample_unix_ms = Some(s.timestamp_unix_ms);
                    summary.max_cores = summary.max_cores.max(s.cpu_cores.len());
                    cpu.push(s.cpu_total);
                    mem.push(s.mem_percent);
                    load1.push(s.load1);
                    load5.push(s.load5);
                    load15.push(s.load15);
                }
                Ok(Record::Unknown { record_type, .. }) => {
                    tracing::debug!("summary: skipping unknown record type 0x{record_type:02x}");
                    summary.unknown_records += 1;
                }
                Err(e) => {
                    tracing::warn!("summary: stopped at damaged record: {e}");
                    summary.read_error = Some(e.to_string());
                    break;
                }
            }
        }

        summary.cpu_total = MetricStats::from_values(&cpu);
        summary.mem_percent = MetricStats::from_values(&mem);
        summary.load1 = MetricStats::from_values(&load1);
        summary.load5 = MetricStats::from_values(&load5);
        summary.load15 = MetricStats::from_values(&load15);
        summary
    }

    /// Time between the first and last Sample.
    pub fn span(&self) -> Option<Duration> {
        let first = self.first_sample_unix_ms?;
        let last = self.last_sample_unix_ms?;
        Some(Duration::from_millis(last.saturating_sub(first).max(0) as u64))
    }

    /// Returns a one-line summary suitable for logging or CLI display.
    pub fn summary(&self) -> String {
        let host = self
            .header
            .as_ref()
            .map(|h| h.hostname.as_str())
            .unwrap_or("unknown host");
        let span = self.span().unwrap_or_default().as_secs_f64();
        match self.cpu_total {
            Some(cpu) => format!(
                "{host}: {} samples over {span:.1}s, cpu avg {:.1}% (p95 {:.1}%)",
                self.samples, cpu.avg, cpu.p95,
            ),
            None => format!("{host}: no samples"),
        }
    }
}
