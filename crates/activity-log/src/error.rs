// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the activity log.

use crate::wire::WireError;

/// Errors produced while decoding a record payload.
///
/// Every variant names the message and the field that was being read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A tag or field value was malformed or truncated.
    #[error("{message}: {field}: {source}")]
    Field {
        message: &'static str,
        field: String,
        #[source]
        source: WireError,
    },

    /// A packed `double` field whose byte length is not a multiple of 8.
    #[error("{message}: {field}: packed length {len} is not a multiple of 8")]
    PackedLength {
        message: &'static str,
        field: &'static str,
        len: usize,
    },
}

impl DecodeError {
    /// Builds a `map_err` adapter that attributes a wire error to `field`.
    pub(crate) fn field(
        message: &'static str,
        field: &'static str,
    ) -> impl FnOnce(WireError) -> Self {
        move |source| Self::Field {
            message,
            field: field.to_string(),
            source,
        }
    }

    /// Builds a `map_err` adapter for a failure while skipping an unknown field.
    pub(crate) fn unknown(message: &'static str, number: u32) -> impl FnOnce(WireError) -> Self {
        move |source| Self::Field {
            message,
            field: format!("skip unknown field {number}"),
            source,
        }
    }
}

/// Errors that can occur while writing or reading a log file.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The underlying file or stream failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A record was appended after [`LogWriter::close`](crate::LogWriter::close).
    #[error("log writer is already closed")]
    Closed,

    /// The preamble is missing, short, or carries the wrong magic bytes.
    #[error("'{path}' is not a valid activity log ({detail})")]
    NotALog { path: String, detail: String },

    /// A record length above [`MAX_PAYLOAD_BYTES`](crate::MAX_PAYLOAD_BYTES).
    #[error("record payload too large ({len} bytes, limit {max}); possible file corruption")]
    PayloadTooLarge { len: u64, max: u64 },

    /// The stream ended partway through a record.
    #[error("truncated record: stream ended while reading the {stage}")]
    Truncated { stage: &'static str },

    /// A Header or Sample payload failed to decode.
    #[error("failed to decode {record} record: {source}")]
    Decode {
        record: &'static str,
        #[source]
        source: DecodeError,
    },
}

impl LogError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
