// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `infmon report` command: summary statistics for a recorded session.

use super::format_unix_ms;
use recorder::{LogSummary, MetricStats};
use resource_monitor::format_uptime;
use std::path::PathBuf;
use std::time::Duration;

pub async fn execute(file: PathBuf) -> anyhow::Result<()> {
    let summary = LogSummary::from_file(&file)?;

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║               infmon · Session Report               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Session ────────────────────────────────────────────────
    println!("  Session");
    println!("   File:         {}", file.display());
    match &summary.header {
        Some(h) => {
            println!("   Host:         {}", h.hostname);
            println!("   Platform:     {}", h.platform);
            println!("   Cores:        {}", h.num_cores);
            println!("   Started:      {} UTC", format_unix_ms(h.started_unix_ms));
        }
        None => println!("   Host:         (no header record)"),
    }
    println!("   Samples:      {}", summary.samples);
    if let Some(span) = summary.span() {
        println!("   Span:         {}", format_span(span));
    }
    if summary.unknown_records > 0 {
        println!("   Skipped:      {} records of unknown type", summary.unknown_records);
    }
    if summary.extra_headers > 0 {
        println!("   Note:         {} additional header records ignored", summary.extra_headers);
    }
    println!();

    // ── Metrics ────────────────────────────────────────────────
    println!(
        "  {:<12} {:>9} {:>9} {:>9} {:>9}",
        "Metric", "Min", "Avg", "P95", "Max",
    );
    println!("  {}", "-".repeat(52));
    println!("{}", metric_row("cpu %", summary.cpu_total));
    println!("{}", metric_row("mem %", summary.mem_percent));
    println!("{}", metric_row("load 1m", summary.load1));
    println!("{}", metric_row("load 5m", summary.load5));
    println!("{}", metric_row("load 15m", summary.load15));
    println!();

    if let Some(err) = &summary.read_error {
        println!("  WARNING: log ends with a damaged record: {err}");
        println!();
    }
    println!("{}", summary.summary());
    Ok(())
}

fn metric_row(name: &str, stats: Option<MetricStats>) -> String {
    match stats {
        Some(s) => format!(
            "  {name:<12} {:>9.2} {:>9.2} {:>9.2} {:>9.2}",
            s.min, s.avg, s.p95, s.max,
        ),
        None => format!("  {name:<12} {:>9} {:>9} {:>9} {:>9}", "-", "-", "-", "-"),
    }
}

fn format_span(span: Duration) -> String {
    if span.as_secs() < 60 {
        format!("{:.1}s", span.as_secs_f64())
    } else {
        format_uptime(span.as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_row() {
        let row = metric_row(
            "cpu %",
            Some(MetricStats {
                min: 1.0,
                avg: 12.5,
                p95: 40.0,
                max: 99.5,
            }),
        );
        assert_eq!(row, "  cpu %             1.00     12.50     40.00     99.50");
    }

    #[test]
    fn test_metric_row_empty() {
        let row = metric_row("load 1m", None);
        assert!(row.starts_with("  load 1m"));
        assert_eq!(row.matches('-').count(), 4);
    }

    #[test]
    fn test_format_span() {
        assert_eq!(format_span(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_span(Duration::from_secs(3_660)), "1h 1m");
    }
}
