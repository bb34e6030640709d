// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # activity-log
//!
//! Binary activity log for monitoring sessions: a protobuf-compatible
//! encoding for the [`Header`] and [`Sample`] records, and a framed,
//! append-only file container around them.
//!
//! # File Layout
//! ```text
//! [0..8)   magic + version: b"INFGO\0\x01\0"
//! record*  [type:1][length:4, big-endian u32][payload:length]
//!          type 0x01 = Header, 0x02 = Sample, anything else = passed through
//! ```
//!
//! # Payload Schema
//! Payloads are standard protobuf wire format, so any protobuf decoder can
//! read them with the equivalent schema:
//! ```proto
//! message Header { string hostname = 1; string platform = 2;
//!                  int64 started_unix_ms = 3; int32 num_cores = 4; }
//! message Sample { int64 timestamp_unix_ms = 1; double cpu_total = 2;
//!                  repeated double cpu_cores = 3; double mem_percent = 4;
//!                  double mem_used_gb = 5; double mem_total_gb = 6;
//!                  double load1 = 7; double load5 = 8; double load15 = 9; }
//! ```
//! Field numbers are permanent. Unknown fields and unknown record types are
//! skipped, so files written by newer versions stay readable.
//!
//! # Concurrency
//! [`LogWriter`] and [`LogReader`] are single-owner values with no internal
//! locking. Concurrent writers to one file are not supported.

mod error;
mod header;
mod reader;
mod record;
mod sample;
pub mod wire;
mod writer;

pub use error::{DecodeError, LogError};
pub use header::Header;
pub use reader::LogReader;
pub use record::{Record, RecordType};
pub use sample::Sample;
pub use writer::LogWriter;

/// File preamble: `"INFGO"`, a zero byte, then format version 1.0.
pub const MAGIC: [u8; 8] = [b'I', b'N', b'F', b'G', b'O', 0x00, 0x01, 0x00];

/// Largest payload a reader will allocate for (10 MiB).
pub const MAX_PAYLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Conventional file extension for activity logs.
pub const FILE_EXTENSION: &str = "infmon";
