// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared console helpers.

pub mod inspect;
pub mod record;
pub mod report;
pub mod status;

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the `-v` count. Diagnostics go to
/// stderr so they never mix with command output.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Creates a visual usage bar (0.0-1.0 scale).
pub(crate) fn usage_bar(ratio: f64) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * 20.0).round() as usize;
    let empty = 20 - filled;
    let symbol = if ratio >= 0.9 {
        "#"
    } else if ratio >= 0.7 {
        "="
    } else {
        "-"
    };
    format!("[{}{}]", symbol.repeat(filled), ".".repeat(empty))
}

/// Formats milliseconds since the Unix epoch as `YYYY-MM-DD HH:MM:SS.mmm` UTC.
pub(crate) fn format_unix_ms(unix_ms: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(unix_ms) {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        None => format!("{unix_ms} ms"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(0), "warn");
        assert_eq!(default_level(1), "info");
        assert_eq!(default_level(2), "debug");
        assert_eq!(default_level(3), "trace");
        assert_eq!(default_level(9), "trace");
    }

    #[test]
    fn test_usage_bar() {
        assert_eq!(usage_bar(0.0), format!("[{}]", ".".repeat(20)));
        assert_eq!(usage_bar(0.5), format!("[{}{}]", "-".repeat(10), ".".repeat(10)));
        assert_eq!(usage_bar(0.75), format!("[{}{}]", "=".repeat(15), ".".repeat(5)));
        assert_eq!(usage_bar(1.7), format!("[{}]", "#".repeat(20)));
    }

    #[test]
    fn test_format_unix_ms() {
        assert_eq!(format_unix_ms(0), "1970-01-01 00:00:00.000");
        assert_eq!(format_unix_ms(1_700_000_000_123), "2023-11-14 22:13:20.123");
        assert_eq!(format_unix_ms(951_782_400_000), "2000-02-29 00:00:00.000");
        assert_eq!(format_unix_ms(-1), "1969-12-31 23:59:59.999");
    }
}
