// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # infmon
//!
//! Command-line interface for the infmon resource monitor.
//!
//! ## Usage
//! ```bash
//! # Sample every 500 ms and record to a log until Ctrl-C
//! infmon record --log session.infmon
//!
//! # One-off system status
//! infmon status
//!
//! # Dump or summarise a recorded session
//! infmon inspect session.infmon --json
//! infmon report session.infmon
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "infmon",
    about = "Terminal resource monitor with a binary activity log",
    version,
    author
)]
struct Cli {
    /// Path to a TOML recorder configuration (CLI arguments override it).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample the system on an interval, optionally recording an activity log.
    Record {
        /// Write the activity log to this file (truncated if it exists).
        #[arg(short, long)]
        log: Option<PathBuf>,

        /// Sampling interval in milliseconds [default: 500].
        #[arg(short, long)]
        interval: Option<u64>,

        /// Stop after this many samples instead of waiting for Ctrl-C.
        #[arg(short = 'n', long)]
        count: Option<u64>,

        /// Do not print each sample.
        #[arg(short, long)]
        quiet: bool,
    },

    /// Display current system resource status.
    Status,

    /// Print every record of an activity log.
    Inspect {
        /// Activity log to read.
        file: PathBuf,

        /// Emit one JSON object per record.
        #[arg(long)]
        json: bool,
    },

    /// Summarise an activity log: min / avg / p95 / max per metric.
    Report {
        /// Activity log to read.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Record {
            log,
            interval,
            count,
            quiet,
        } => {
            let args = commands::record::RecordArgs {
                config: cli.config,
                log,
                interval,
                count,
                quiet,
            };
            commands::record::execute(args).await
        }
        Commands::Status => commands::status::execute().await,
        Commands::Inspect { file, json } => commands::inspect::execute(file, json).await,
        Commands::Report { file } => commands::report::execute(file).await,
    }
}
