// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `infmon status` command: display current system resource state.
//!
//! Reads host, CPU, memory, and load metrics from the Linux procfs/sysfs
//! interfaces. On hosts where some files are missing (e.g., containers)
//! those readings show defaults and the command still works.

use super::usage_bar;
use resource_monitor::{online_cores, CpuSampler, HostInfo, SystemSnapshot};
use std::time::Duration;

/// How long CPU counters are observed before reporting utilisation.
const CPU_WINDOW: Duration = Duration::from_millis(250);

pub async fn execute() -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           infmon · System Resource Status           ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let host = HostInfo::read();
    let cores = online_cores().unwrap_or_else(|e| {
        tracing::warn!("core count unavailable: {e}");
        0
    });

    // CPU utilisation needs two reads of the counters.
    let mut sampler = CpuSampler::new();
    if let Err(e) = sampler.sample() {
        tracing::warn!("cpu sampling unavailable: {e}");
    }
    tokio::time::sleep(CPU_WINDOW).await;
    let snapshot = SystemSnapshot::capture(&mut sampler)?;

    // ── Host ───────────────────────────────────────────────────
    println!("  Host");
    println!("   Hostname:     {}", host.hostname);
    println!("   Platform:     {}", host.platform);
    println!("   Uptime:       {}", host.uptime_display());
    println!();

    // ── CPU ────────────────────────────────────────────────────
    println!("  CPU");
    println!("   Online cores: {cores}");
    println!(
        "   Total:        {:5.1}%  {}",
        snapshot.cpu.total,
        usage_bar(snapshot.cpu.total / 100.0),
    );
    for (i, usage) in snapshot.cpu.cores.iter().enumerate() {
        println!("   cpu{i:<3}        {usage:5.1}%  {}", usage_bar(usage / 100.0));
    }
    println!();

    // ── Memory ─────────────────────────────────────────────────
    println!("  Memory");
    println!("   Total:        {:.2} GiB", snapshot.memory.total_gib());
    println!("   Available:    {:.2} GiB", snapshot.memory.available_gib());
    println!(
        "   Used:         {:.2} GiB ({:.1}%)  {}",
        snapshot.memory.used_gib(),
        snapshot.memory.used_percent(),
        usage_bar(snapshot.memory.utilisation()),
    );
    println!();

    // ── Load ───────────────────────────────────────────────────
    println!("  Load");
    println!(
        "   1m / 5m / 15m: {:.2} / {:.2} / {:.2}",
        snapshot.load.one, snapshot.load.five, snapshot.load.fifteen,
    );
    println!(
        "   Per core (1m): {:.2}",
        snapshot.load.per_core(cores),
    );
    println!();

    // ── Overall Assessment ─────────────────────────────────────
    println!("  Assessment");
    if snapshot.is_resource_constrained() {
        println!("   Status:       RESOURCE CONSTRAINED");
    } else {
        println!("   Status:       System healthy");
    }
    println!();
    println!("{}", snapshot.summary());

    Ok(())
}
