// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `infmon record` command: sample the system and record an activity log.
//!
//! Runs until Ctrl-C or until `--count` samples have been taken. Without
//! `--log` the samples are only printed.

use super::format_unix_ms;
use recorder::{Recorder, RecorderConfig};
use resource_monitor::SystemSnapshot;
use std::path::PathBuf;

/// Command-line arguments for `record`.
#[derive(Debug, Default)]
pub struct RecordArgs {
    pub config: Option<PathBuf>,
    pub log: Option<PathBuf>,
    pub interval: Option<u64>,
    pub count: Option<u64>,
    pub quiet: bool,
}

impl RecordArgs {
    /// Layers the command-line flags over the config file, or the defaults.
    fn resolve(self) -> anyhow::Result<RecorderConfig> {
        let mut config = match &self.config {
            Some(path) => RecorderConfig::from_file(path)?,
            None => RecorderConfig::default(),
        };
        if let Some(log) = self.log {
            config.log_path = Some(log);
        }
        if let Some(interval) = self.interval {
            config.interval_ms = interval;
        }
        if self.count.is_some() {
            config.max_samples = self.count;
        }
        if self.quiet {
            config.print_samples = false;
        }
        config.validate()?;
        Ok(config)
    }
}

pub async fn execute(args: RecordArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              infmon · Activity Recorder             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Config:");
    println!("   Interval: {} ms", config.interval_ms);
    match &config.log_path {
        Some(path) => println!("   Log:      {}", path.display()),
        None => println!("   Log:      (not recording)"),
    }
    match config.max_samples {
        Some(n) => println!("   Stop:     after {n} samples"),
        None => println!("   Stop:     Ctrl-C"),
    }
    println!();

    let recorder = Recorder::new(config)?;
    let stats = recorder.run(ctrl_c(), print_sample).await?;

    println!();
    println!(
        "  {} samples in {:.1}s ({} skipped)",
        stats.samples_taken,
        stats.elapsed.as_secs_f64(),
        stats.samples_skipped,
    );
    if let Some(path) = &stats.log_path {
        println!("  Activity log written to {}", path.display());
        println!("  Run `infmon report {}` to generate a report", path.display());
    }
    Ok(())
}

/// Resolves on Ctrl-C. If the signal handler cannot be installed the
/// session only ends at its sample limit.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

fn print_sample(snapshot: &SystemSnapshot) {
    println!(
        "  {}  {}",
        format_unix_ms(snapshot.timestamp_unix_ms),
        snapshot.summary(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let config = RecordArgs::default().resolve().unwrap();
        assert_eq!(config, RecorderConfig::default());
    }

    #[test]
    fn test_resolve_flags() {
        let args = RecordArgs {
            log: Some(PathBuf::from("/tmp/a.infmon")),
            interval: Some(1000),
            count: Some(3),
            quiet: true,
            ..Default::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.log_path, Some(PathBuf::from("/tmp/a.infmon")));
        assert_eq!(config.interval_ms, 1000);
        assert_eq!(config.max_samples, Some(3));
        assert!(!config.print_samples);
    }

    #[test]
    fn test_resolve_flags_override_file() {
        let dir = std::env::temp_dir().join("infmon_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}_record_args.toml", std::process::id()));
        std::fs::write(&path, "interval_ms = 200\nmax_samples = 50\n").unwrap();

        let args = RecordArgs {
            config: Some(path.clone()),
            count: Some(5),
            ..Default::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.interval_ms, 200);
        assert_eq!(config.max_samples, Some(5));
        assert!(config.print_samples);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_resolve_rejects_zero_interval() {
        let args = RecordArgs {
            interval: Some(0),
            ..Default::default()
        };
        assert!(args.resolve().is_err());
    }
}
