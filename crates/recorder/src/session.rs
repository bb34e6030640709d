// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The sampling loop.
//!
//! ```text
//!   interval tick ──► spawn_blocking(capture) ──► observer ──► Sample record
//!   host lookup   ──► spawn_blocking(read)    ─────────────► Header record
//!   shutdown      ──► stop
//! ```
//!
//! The host lookup resolves independently of the ticks, so the Header may
//! land after the first Samples. It is always written before the log is
//! closed.

use crate::{RecorderConfig, RecorderError};
use activity_log::{Header, LogWriter, Sample};
use resource_monitor::{
    now_unix_ms, online_cores, CpuSampler, HostInfo, MonitorError, SystemSnapshot,
};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

/// What the host lookup task produces.
type HostLookup = (HostInfo, Result<u32, MonitorError>);

/// Outcome of a finished recording session.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionStats {
    /// Session start, in milliseconds since the Unix epoch.
    pub started_unix_ms: i64,
    /// Snapshots captured successfully.
    pub samples_taken: u64,
    /// Sample records appended to the log.
    pub samples_written: u64,
    /// Ticks dropped because a required reading failed.
    pub samples_skipped: u64,
    /// Whether the Header record made it into the log.
    pub header_written: bool,
    /// Wall-clock duration of the session.
    pub elapsed: Duration,
    /// Where the log was written, if anywhere.
    pub log_path: Option<PathBuf>,
}

/// Converts a system snapshot into a log sample.
pub fn snapshot_to_sample(snapshot: &SystemSnapshot) -> Sample {
    Sample {
        timestamp_unix_ms: snapshot.timestamp_unix_ms,
        cpu_total: snapshot.cpu.total,
        cpu_cores: snapshot.cpu.cores.clone(),
        mem_percent: snapshot.memory.used_percent(),
        mem_used_gb: snapshot.memory.used_gib(),
        mem_total_gb: snapshot.memory.total_gib(),
        load1: snapshot.load.one,
        load5: snapshot.load.five,
        load15: snapshot.load.fifteen,
    }
}

/// Builds the session header from host metadata.
pub fn host_to_header(host: &HostInfo, started_unix_ms: i64, num_cores: u32) -> Header {
    Header {
        hostname: host.hostname.clone(),
        platform: host.platform.clone(),
        started_unix_ms,
        num_cores: i32::try_from(num_cores).unwrap_or(i32::MAX),
    }
}

/// Records system snapshots into an activity log.
///
/// # Example
/// ```no_run
/// use recorder::{Recorder, RecorderConfig};
///
/// # async fn example() -> Result<(), recorder::RecorderError> {
/// let config = RecorderConfig {
///     log_path: Some("session.infmon".into()),
///     max_samples: Some(10),
///     ..Default::default()
/// };
/// let stats = Recorder::new(config)?
///     .run(std::future::pending(), |snap| println!("{}", snap.summary()))
///     .await?;
/// println!("{} samples written", stats.samples_written);
/// # Ok(())
/// # }
/// ```
pub struct Recorder {
    config: RecorderConfig,
    writer: Option<LogWriter>,
}

impl Recorder {
    /// Validates the configuration and opens the log file, if any.
    pub fn new(config: RecorderConfig) -> Result<Self, RecorderError> {
        config.validate()?;
        let writer = config
            .log_path
            .as_deref()
            .map(LogWriter::create)
            .transpose()?;
        tracing::info!(
            "recorder created: {}ms interval, {}",
            config.interval_ms,
            match &config.log_path {
                Some(p) => format!("logging to {}", p.display()),
                None => "not logging".to_string(),
            },
        );
        Ok(Self { config, writer })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Returns the log destination, if logging.
    pub fn log_path(&self) -> Option<&Path> {
        self.writer.as_ref().and_then(|w| w.path())
    }

    /// Runs the session until `shutdown` resolves or `max_samples` is reached.
    ///
    /// `observer` is called with every captured snapshot when
    /// `print_samples` is set. The log is closed on every exit path; a
    /// failure while closing is reported unless an earlier error already
    /// ended the session.
    pub async fn run<F, O>(mut self, shutdown: F, mut observer: O) -> Result<SessionStats, RecorderError>
    where
        F: Future<Output = ()>,
        O: FnMut(&SystemSnapshot),
    {
        let start = Instant::now();
        let mut stats = SessionStats {
            started_unix_ms: now_unix_ms(),
            samples_taken: 0,
            samples_written: 0,
            samples_skipped: 0,
            header_written: false,
            elapsed: Duration::ZERO,
            log_path: self.config.log_path.clone(),
        };
        tracing::info!("session started");

        let outcome = self.sample_loop(shutdown, &mut observer, &mut stats).await;
        let closed = match self.writer.as_mut() {
            Some(writer) => {
                let synced = writer.sync();
                let closed = writer.close();
                synced.and(closed)
            }
            None => Ok(()),
        };
        stats.elapsed = start.elapsed();

        if let Err(e) = outcome {
            if let Err(close_err) = closed {
                tracing::warn!("closing log after failed session: {close_err}");
            }
            return Err(e);
        }
        closed?;

        tracing::info!(
            "session finished: {} samples taken, {} written, {} skipped in {:.1}s",
            stats.samples_taken,
            stats.samples_written,
            stats.samples_skipped,
            stats.elapsed.as_secs_f64(),
        );
        Ok(stats)
    }

    async fn sample_loop<F, O>(
        &mut self,
        shutdown: F,
        observer: &mut O,
        stats: &mut SessionStats,
    ) -> Result<(), RecorderError>
    where
        F: Future<Output = ()>,
        O: FnMut(&SystemSnapshot),
    {
        tokio::pin!(shutdown);

        let mut host_task =
            tokio::task::spawn_blocking(|| (HostInfo::read(), online_cores()));
        let mut host_pending = true;

        // Prime the counters so the first sample covers one interval, not
        // the time since boot.
        let mut sampler = tokio::task::spawn_blocking(|| {
            let mut sampler = CpuSampler::new();
            if let Err(e) = sampler.sample() {
                tracing::warn!("cpu sampling unavailable: {e}");
            }
            sampler
        })
        .await?;

        let mut ticker = tokio::time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
                joined = &mut host_task, if host_pending => {
                    host_pending = false;
                    self.record_host(joined?, stats)?;
                }
                _ = ticker.tick() => {
                    let (returned, captured) = tokio::task::spawn_blocking(move || {
                        let snapshot = SystemSnapshot::capture(&mut sampler);
                        (sampler, snapshot)
                    })
                    .await?;
                    sampler = returned;

                    match captured {
                        Ok(snapshot) => {
                            self.record_snapshot(&snapshot, observer, stats)?;
                            if self
                                .config
                                .max_samples
                                .is_some_and(|max| stats.samples_taken >= max)
                            {
                                tracing::info!("sample limit of {} reached", stats.samples_taken);
                                break;
                            }
                        }
                        Err(e) => {
                            stats.samples_skipped += 1;
                            tracing::warn!("sampling failed, skipping tick: {e}");
                        }
                    }
                }
            }
        }

        if host_pending {
            let joined = host_task.await?;
            self.record_host(joined, stats)?;
        }
        Ok(())
    }

    fn record_snapshot<O>(
        &mut self,
        snapshot: &SystemSnapshot,
        observer: &mut O,
        stats: &mut SessionStats,
    ) -> Result<(), RecorderError>
    where
        O: FnMut(&SystemSnapshot),
    {
        stats.samples_taken += 1;
        tracing::debug!("{}", snapshot.summary());
        if snapshot.is_resource_constrained() {
            tracing::debug!("system under resource pressure");
        }
        if self.config.print_samples {
            observer(snapshot);
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.write_sample(&snapshot_to_sample(snapshot))?;
            stats.samples_written += 1;
        }
        Ok(())
    }

    fn record_host(
        &mut self,
        (host, cores): HostLookup,
        stats: &mut SessionStats,
    ) -> Result<(), RecorderError> {
        let num_cores = cores.unwrap_or_else(|e| {
            tracing::warn!("core count unavailable: {e}");
            0
        });
        tracing::info!(
            "host {} ({}), {} cores, up {}",
            host.hostname,
            host.platform,
            num_cores,
            host.uptime_display(),
        );
        if let Some(writer) = self.writer.as_mut() {
            writer.write_header(&host_to_header(&host, stats.started_unix_ms, num_cores))?;
            stats.header_written = true;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("interval_ms", &self.config.interval_ms)
            .field("log_path", &self.log_path())
            .field("max_samples", &self.config.max_samples)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_monitor::{CpuUsage, LoadAverage, MemoryInfo};

    fn test_snapshot() -> SystemSnapshot {
        SystemSnapshot {
            cpu: CpuUsage {
                total: 37.5,
                cores: vec![50.0, 25.0],
            },
            memory: MemoryInfo {
                total_bytes: 8 << 30,
                available_bytes: 6 << 30,
                used_bytes: 2 << 30,
            },
            load: LoadAverage {
                one: 1.5,
                five: 1.0,
                fifteen: 0.5,
            },
            timestamp_unix_ms: 1_700_000_000_123,
        }
    }

    fn has_procfs() -> bool {
        Path::new("/proc/meminfo").exists()
    }

    #[test]
    fn test_snapshot_to_sample() {
        let sample = snapshot_to_sample(&test_snapshot());
        assert_eq!(sample.timestamp_unix_ms, 1_700_000_000_123);
        assert_eq!(sample.cpu_total, 37.5);
        assert_eq!(sample.cpu_cores, vec![50.0, 25.0]);
        assert!((sample.mem_percent - 25.0).abs() < 1e-9);
        assert!((sample.mem_used_gb - 2.0).abs() < 1e-9);
        assert!((sample.mem_total_gb - 8.0).abs() < 1e-9);
        assert_eq!((sample.load1, sample.load5, sample.load15), (1.5, 1.0, 0.5));
    }

    #[test]
    fn test_host_to_header() {
        let host = HostInfo {
            hostname: "rpi4".into(),
            platform: "linux 6.8.0 · aarch64".into(),
            uptime_secs: 42,
        };
        let header = host_to_header(&host, 1000, 4);
        assert_eq!(
            header,
            Header {
                hostname: "rpi4".into(),
                platform: "linux 6.8.0 · aarch64".into(),
                started_unix_ms: 1000,
                num_cores: 4,
            }
        );
        assert_eq!(host_to_header(&host, 0, u32::MAX).num_cores, i32::MAX);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = RecorderConfig {
            interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            Recorder::new(config),
            Err(RecorderError::ConfigError(_))
        ));
    }

    #[test]
    fn test_new_fails_on_unwritable_path() {
        let config = RecorderConfig {
            log_path: Some(PathBuf::from("/nonexistent/dir/session.infmon")),
            ..Default::default()
        };
        assert!(matches!(Recorder::new(config), Err(RecorderError::Log(_))));
    }

    #[test]
    fn test_debug_format() {
        let recorder = Recorder::new(RecorderConfig::default()).unwrap();
        let debug = format!("{recorder:?}");
        assert!(debug.contains("Recorder"));
        assert!(debug.contains("500"));
    }

    #[tokio::test]
    async fn test_run_without_log() {
        if !has_procfs() {
            return;
        }
        let config = RecorderConfig {
            interval_ms: 5,
            max_samples: Some(2),
            ..Default::default()
        };
        let mut seen = 0;
        let stats = Recorder::new(config)
            .unwrap()
            .run(std::future::pending(), |_| seen += 1)
            .await
            .unwrap();

        assert_eq!(seen, 2);
        assert_eq!(stats.samples_taken, 2);
        assert_eq!(stats.samples_written, 0);
        assert!(!stats.header_written);
        assert!(stats.log_path.is_none());
    }

    #[tokio::test]
    async fn test_quiet_run_skips_observer() {
        if !has_procfs() {
            return;
        }
        let config = RecorderConfig {
            interval_ms: 5,
            max_samples: Some(1),
            print_samples: false,
            ..Default::default()
        };
        let mut seen = 0;
        let stats = Recorder::new(config)
            .unwrap()
            .run(std::future::pending(), |_| seen += 1)
            .await
            .unwrap();
        assert_eq!(seen, 0);
        assert_eq!(stats.samples_taken, 1);
    }

    #[tokio::test]
    async fn test_immediate_shutdown() {
        let config = RecorderConfig {
            interval_ms: 60_000,
            ..Default::default()
        };
        let stats = Recorder::new(config)
            .unwrap()
            .run(std::future::ready(()), |_| {})
            .await
            .unwrap();
        assert_eq!(stats.samples_taken, 0);
    }
}
