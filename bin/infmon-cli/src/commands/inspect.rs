// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `infmon inspect` command: print every record of an activity log.
//!
//! The default output is one line per record. With `--json` each record
//! is a single JSON object per line, suitable for `jq`.

use super::format_unix_ms;
use activity_log::{Header, LogReader, Record, Sample};
use anyhow::Context;
use std::path::PathBuf;

pub async fn execute(file: PathBuf, json: bool) -> anyhow::Result<()> {
    let reader = LogReader::open(&file)?;

    if !json {
        println!("╔══════════════════════════════════════════════════════╗");
        println!("║              infmon · Log Inspector                 ║");
        println!("╚══════════════════════════════════════════════════════╝");
        println!();
        println!("  File: {}", file.display());
        println!();
    }

    let mut count = 0u64;
    for (i, record) in reader.enumerate() {
        let record =
            record.with_context(|| format!("record #{} of '{}'", i + 1, file.display()))?;
        count += 1;
        if json {
            println!("{}", serde_json::to_string(&record)?);
        } else {
            println!("  {:>6}  {}", i + 1, describe_record(&record));
        }
    }

    if !json {
        println!();
        println!("  {count} records");
    }
    Ok(())
}

/// One-line rendering of a record.
fn describe_record(record: &Record) -> String {
    match record {
        Record::Header(h) => describe_header(h),
        Record::Sample(s) => describe_sample(s),
        Record::Unknown {
            record_type,
            payload,
        } => format!(
            "unknown  type 0x{record_type:02x}, {} bytes (skipped)",
            payload.len()
        ),
    }
}

fn describe_header(h: &Header) -> String {
    format!(
        "header   host={} platform=\"{}\" started={} cores={}",
        h.hostname,
        h.platform,
        format_unix_ms(h.started_unix_ms),
        h.num_cores,
    )
}

fn describe_sample(s: &Sample) -> String {
    let cores: Vec<String> = s.cpu_cores.iter().map(|c| format!("{c:.0}")).collect();
    format!(
        "sample   {}  cpu {:5.1}% [{}]  mem {:5.1}% ({:.2}/{:.2} GiB)  load {:.2} {:.2} {:.2}",
        format_unix_ms(s.timestamp_unix_ms),
        s.cpu_total,
        cores.join(" "),
        s.mem_percent,
        s.mem_used_gb,
        s.mem_total_gb,
        s.load1,
        s.load5,
        s.load15,
    )
}
