// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Session header record.
//!
//! Zero-valued fields are omitted from the encoding (proto3 default
//! omission), so an absent field and a field equal to zero decode to the
//! same value.

use crate::error::DecodeError;
use crate::wire::{self, WireType};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const MESSAGE: &str = "header";

const HOSTNAME: u32 = 1;
const PLATFORM: u32 = 2;
const STARTED_UNIX_MS: u32 = 3;
const NUM_CORES: u32 = 4;

/// Session metadata, written once per log.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Header {
    /// Host name of the monitored machine.
    pub hostname: String,
    /// Free-form platform descriptor, e.g. `"linux 6.8.0 · x86_64"`.
    pub platform: String,
    /// Session start, in milliseconds since the Unix epoch.
    pub started_unix_ms: i64,
    /// Logical CPU count.
    pub num_cores: i32,
}

impl Header {
    /// Session start as a [`SystemTime`].
    pub fn started_at(&self) -> SystemTime {
        unix_ms_to_system_time(self.started_unix_ms)
    }

    /// Encodes the header into its wire form.
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.hostname.len() + self.platform.len() + 24);
        if !self.hostname.is_empty() {
            wire::append_tag(&mut buf, HOSTNAME, WireType::Bytes);
            wire::append_bytes(&mut buf, self.hostname.as_bytes());
        }
        if !self.platform.is_empty() {
            wire::append_tag(&mut buf, PLATFORM, WireType::Bytes);
            wire::append_bytes(&mut buf, self.platform.as_bytes());
        }
        if self.started_unix_ms != 0 {
            wire::append_tag(&mut buf, STARTED_UNIX_MS, WireType::Varint);
            wire::append_varint(&mut buf, self.started_unix_ms as u64);
        }
        if self.num_cores != 0 {
            // int32 is sign-extended to 64 bits, as protobuf does.
            wire::append_tag(&mut buf, NUM_CORES, WireType::Varint);
            wire::append_varint(&mut buf, i64::from(self.num_cores) as u64);
        }
        buf
    }

    /// Decodes a header from its wire form.
    pub fn unmarshal(mut buf: &[u8]) -> Result<Self, DecodeError> {
        let mut header = Self::default();
        while !buf.is_empty() {
            let (number, wire_type) =
                wire::consume_tag(&mut buf).map_err(DecodeError::field(MESSAGE, "tag"))?;
            match (number, wire_type) {
                (HOSTNAME, WireType::Bytes) => {
                    header.hostname = wire::consume_string(&mut buf)
                        .map_err(DecodeError::field(MESSAGE, "hostname"))?;
                }
                (PLATFORM, WireType::Bytes) => {
                    header.platform = wire::consume_string(&mut buf)
                        .map_err(DecodeError::field(MESSAGE, "platform"))?;
                }
                (STARTED_UNIX_MS, WireType::Varint) => {
                    header.started_unix_ms = wire::consume_varint(&mut buf)
                        .map_err(DecodeError::field(MESSAGE, "started_unix_ms"))?
                        as i64;
                }
                (NUM_CORES, WireType::Varint) => {
                    header.num_cores = wire::consume_varint(&mut buf)
                        .map_err(DecodeError::field(MESSAGE, "num_cores"))?
                        as i32;
                }
                _ => wire::skip_field(number, wire_type, &mut buf)
                    .map_err(DecodeError::unknown(MESSAGE, number))?,
            }
        }
        Ok(header)
    }
}

/// Converts signed epoch milliseconds to a [`SystemTime`].
pub(crate) fn unix_ms_to_system_time(ms: i64) -> SystemTime {
    let offset = Duration::from_millis(ms.unsigned_abs());
    if ms >= 0 {
        UNIX_EPOCH + offset
    } else {
        UNIX_EPOCH - offset
    }
}
