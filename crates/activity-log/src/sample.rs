// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Periodic metrics sample record.
//!
//! Unlike [`Header`](crate::Header), every scalar is always emitted: a zero
//! CPU or load reading is a real measurement and must survive a round trip.
//! The per-core sequence is a packed `repeated double` and is omitted only
//! when empty.

use crate::error::DecodeError;
use crate::header::unix_ms_to_system_time;
use crate::wire::{self, WireType};
use std::time::SystemTime;

const MESSAGE: &str = "sample";

const TIMESTAMP_UNIX_MS: u32 = 1;
const CPU_TOTAL: u32 = 2;
const CPU_CORES: u32 = 3;
const MEM_PERCENT: u32 = 4;
const MEM_USED_GB: u32 = 5;
const MEM_TOTAL_GB: u32 = 6;
const LOAD1: u32 = 7;
const LOAD5: u32 = 8;
const LOAD15: u32 = 9;

/// Encoded size of the always-present fields: a varint timestamp of at most
/// ten bytes plus seven tagged doubles.
const FIXED_ENCODED_LEN: usize = (1 + 10) + 7 * (1 + 8);

/// One snapshot of system metrics.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Sample {
    /// Capture time, in milliseconds since the Unix epoch.
    pub timestamp_unix_ms: i64,
    /// Aggregate CPU utilisation, 0–100 %.
    pub cpu_total: f64,
    /// Per-logical-core CPU utilisation, 0–100 %, in core order.
    pub cpu_cores: Vec<f64>,
    /// Used memory as a percentage of total.
    pub mem_percent: f64,
    /// Used memory in GiB.
    pub mem_used_gb: f64,
    /// Total memory in GiB.
    pub mem_total_gb: f64,
    /// 1-minute load average.
    pub load1: f64,
    /// 5-minute load average.
    pub load5: f64,
    /// 15-minute load average.
    pub load15: f64,
}

impl Sample {
    /// Capture time as a [`SystemTime`].
    pub fn time(&self) -> SystemTime {
        unix_ms_to_system_time(self.timestamp_unix_ms)
    }

    /// Encodes the sample into its wire form.
    pub fn marshal(&self) -> Vec<u8> {
        let packed_len = self.cpu_cores.len() * 8;
        let mut buf = Vec::with_capacity(FIXED_ENCODED_LEN + 1 + 10 + packed_len);

        wire::append_tag(&mut buf, TIMESTAMP_UNIX_MS, WireType::Varint);
        wire::append_varint(&mut buf, self.timestamp_unix_ms as u64);

        append_double(&mut buf, CPU_TOTAL, self.cpu_total);

        if !self.cpu_cores.is_empty() {
            wire::append_tag(&mut buf, CPU_CORES, WireType::Bytes);
            wire::append_varint(&mut buf, packed_len as u64);
            for core in &self.cpu_cores {
                wire::append_fixed64(&mut buf, core.to_bits());
            }
        }

        append_double(&mut buf, MEM_PERCENT, self.mem_percent);
        append_double(&mut buf, MEM_USED_GB, self.mem_used_gb);
        append_double(&mut buf, MEM_TOTAL_GB, self.mem_total_gb);
        append_double(&mut buf, LOAD1, self.load1);
        append_double(&mut buf, LOAD5, self.load5);
        append_double(&mut buf, LOAD15, self.load15);
        buf
    }

    /// Decodes a sample from its wire form.
    ///
    /// Repeated occurrences of the packed `cpu_cores` field are concatenated,
    /// as a protobuf parser would.
    pub fn unmarshal(mut buf: &[u8]) -> Result<Self, DecodeError> {
        let mut sample = Self::default();
        while !buf.is_empty() {
            let (number, wire_type) =
                wire::consume_tag(&mut buf).map_err(DecodeError::field(MESSAGE, "tag"))?;
            match (number, wire_type) {
                (TIMESTAMP_UNIX_MS, WireType::Varint) => {
                    sample.timestamp_unix_ms = wire::consume_varint(&mut buf)
                        .map_err(DecodeError::field(MESSAGE, "timestamp_unix_ms"))?
                        as i64;
                }
                (CPU_TOTAL, WireType::Fixed64) => {
                    sample.cpu_total = consume_double(&mut buf, "cpu_total")?;
                }
                (CPU_CORES, WireType::Bytes) => {
                    let raw = wire::consume_bytes(&mut buf)
                        .map_err(DecodeError::field(MESSAGE, "cpu_cores"))?;
                    decode_packed_doubles(raw, &mut sample.cpu_cores)?;
                }
                (MEM_PERCENT, WireType::Fixed64) => {
                    sample.mem_percent = consume_double(&mut buf, "mem_percent")?;
                }
                (MEM_USED_GB, WireType::Fixed64) => {
                    sample.mem_used_gb = consume_double(&mut buf, "mem_used_gb")?;
                }
                (MEM_TOTAL_GB, WireType::Fixed64) => {
                    sample.mem_total_gb = consume_double(&mut buf, "mem_total_gb")?;
                }
                (LOAD1, WireType::Fixed64) => {
                    sample.load1 = consume_double(&mut buf, "load1")?;
                }
                (LOAD5, WireType::Fixed64) => {
                    sample.load5 = consume_double(&mut buf, "load5")?;
                }
                (LOAD15, WireType::Fixed64) => {
                    sample.load15 = consume_double(&mut buf, "load15")?;
                }
                _ => wire::skip_field(number, wire_type, &mut buf)
                    .map_err(DecodeError::unknown(MESSAGE, number))?,
            }
        }
        Ok(sample)
    }
}

fn append_double(buf: &mut Vec<u8>, number: u32, value: f64) {
    wire::append_tag(buf, number, WireType::Fixed64);
    wire::append_fixed64(buf, value.to_bits());
}

fn consume_double(buf: &mut &[u8], field: &'static str) -> Result<f64, DecodeError> {
    wire::consume_fixed64(buf)
        .map(f64::from_bits)
        .map_err(DecodeError::field(MESSAGE, field))
}

fn decode_packed_doubles(raw: &[u8], out: &mut Vec<f64>) -> Result<(), DecodeError> {
    if raw.len() % 8 != 0 {
        return Err(DecodeError::PackedLength {
            message: MESSAGE,
            field: "cpu_cores",
            len: raw.len(),
        });
    }
    out.reserve(raw.len() / 8);
    out.extend(raw.chunks_exact(8).map(|chunk| {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        f64::from_le_bytes(word)
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::WireError;

    fn full_sample() -> Sample {
        Sample {
            timestamp_unix_ms: 1_700_000_000_123,
            cpu_total: 37.5,
            cpu_cores: vec![10.0, 20.5, 0.0, 100.0, 45.25, 3.0, 99.9, 0.125],
            mem_percent: 61.2,
            mem_used_gb: 9.8,
            mem_total_gb: 16.0,
            load1: 1.25,
            load5: 0.75,
            load15: 0.5,
        }
    }

    /// Byte offsets at which each encoded field starts, plus the end.
    fn field_boundaries(bytes: &[u8]) -> Vec<usize> {
        let mut cursor = bytes;
        let mut bounds = vec![0];
        while !cursor.is_empty() {
            let (number, wire_type) = wire::consume_tag(&mut cursor).unwrap();
            wire::skip_field(number, wire_type, &mut cursor).unwrap();
            bounds.push(bytes.len() - cursor.len());
        }
        bounds
    }

    #[test]
    fn test_roundtrip_full() {
        let s = full_sample();
        assert_eq!(Sample::unmarshal(&s.marshal()).unwrap(), s);
    }

    #[test]
    fn test_roundtrip_all_zero() {
        let s = Sample::default();
        let bytes = s.marshal();
        // Timestamp plus seven doubles are present even when zero.
        assert_eq!(bytes.len(), 2 + 7 * 9);
        let back = Sample::unmarshal(&bytes).unwrap();
        assert_eq!(back, s);
        assert!(back.cpu_cores.is_empty());
    }

    #[test]
    fn test_fixed_len_matches_widest_coreless_sample() {
        // A negative timestamp takes the full ten-byte varint.
        let s = Sample {
            timestamp_unix_ms: -1,
            ..Default::default()
        };
        assert_eq!(s.marshal().len(), FIXED_ENCODED_LEN);
    }

    #[test]
    fn test_packed_cores_order_and_layout() {
        let s = full_sample();
        let bytes = s.marshal();
        // After the timestamp and cpu_total comes tag(3, bytes) and length 64.
        let ts_len = 1 + wire::varint_len(s.timestamp_unix_ms as u64);
        let cores_at = ts_len + 9;
        assert_eq!(bytes[cores_at], 0x1a);
        assert_eq!(bytes[cores_at + 1], 64);
        assert_eq!(
            &bytes[cores_at + 2..cores_at + 10],
            &10.0f64.to_le_bytes()
        );
        assert_eq!(Sample::unmarshal(&bytes).unwrap().cpu_cores, s.cpu_cores);
    }

    #[test]
    fn test_empty_cores_omitted() {
        let s = Sample {
            cpu_cores: Vec::new(),
            ..full_sample()
        };
        let bytes = s.marshal();
        assert!(!field_boundaries(&bytes)
            .windows(2)
            .any(|w| bytes[w[0]] == 0x1a));
        assert_eq!(Sample::unmarshal(&bytes).unwrap().cpu_cores, Vec::<f64>::new());
    }

    #[test]
    fn test_special_floats_preserved() {
        let s = Sample {
            cpu_total: -0.0,
            load1: f64::INFINITY,
            cpu_cores: vec![f64::MIN_POSITIVE, f64::MAX],
            ..Default::default()
        };
        let back = Sample::unmarshal(&s.marshal()).unwrap();
        assert_eq!(back.cpu_total.to_bits(), (-0.0f64).to_bits());
        assert_eq!(back.load1, f64::INFINITY);
        assert_eq!(back.cpu_cores, s.cpu_cores);
    }

    #[test]
    fn test_packed_length_not_multiple_of_eight() {
        let mut bytes = Vec::new();
        wire::append_tag(&mut bytes, CPU_CORES, WireType::Bytes);
        wire::append_bytes(&mut bytes, &[0u8; 12]);
        let err = Sample::unmarshal(&bytes).unwrap_err();
        assert_eq!(
            err,
            DecodeError::PackedLength {
                message: "sample",
                field: "cpu_cores",
                len: 12,
            }
        );
    }

    #[test]
    fn test_repeated_packed_fields_concatenate() {
        let mut bytes = Vec::new();
        for chunk in [[1.0f64, 2.0], [3.0, 4.0]] {
            wire::append_tag(&mut bytes, CPU_CORES, WireType::Bytes);
            let packed: Vec<u8> = chunk.iter().flat_map(|v| v.to_le_bytes()).collect();
            wire::append_bytes(&mut bytes, &packed);
        }
        let s = Sample::unmarshal(&bytes).unwrap();
        assert_eq!(s.cpu_cores, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_unknown_fields_before_known() {
        let mut bytes = Vec::new();
        wire::append_tag(&mut bytes, 42, WireType::Varint);
        wire::append_varint(&mut bytes, 123_456);
        wire::append_tag(&mut bytes, 43, WireType::Fixed64);
        wire::append_fixed64(&mut bytes, 0);
        wire::append_tag(&mut bytes, 44, WireType::Bytes);
        wire::append_bytes(&mut bytes, b"future");
        bytes.extend(full_sample().marshal());
        assert_eq!(Sample::unmarshal(&bytes).unwrap(), full_sample());
    }

    #[test]
    fn test_wrong_wire_type_is_skipped() {
        // cpu_total arriving as a varint must not be read as a double.
        let mut bytes = Vec::new();
        wire::append_tag(&mut bytes, CPU_TOTAL, WireType::Varint);
        wire::append_varint(&mut bytes, 50);
        append_double(&mut bytes, LOAD5, 2.0);
        let s = Sample::unmarshal(&bytes).unwrap();
        assert_eq!(s.cpu_total, 0.0);
        assert_eq!(s.load5, 2.0);
    }

    #[test]
    fn test_truncation_inside_any_field_fails() {
        let bytes = full_sample().marshal();
        let bounds = field_boundaries(&bytes);
        for cut in 1..bytes.len() {
            if bounds.contains(&cut) {
                continue;
            }
            assert!(
                Sample::unmarshal(&bytes[..cut]).is_err(),
                "prefix of {cut} bytes decoded without error"
            );
        }
    }

    #[test]
    fn test_truncation_at_boundary_keeps_decoded_prefix() {
        // A cut on a field boundary is a shorter well-formed message; the
        // fields that made it through must be exact.
        let full = full_sample();
        let bytes = full.marshal();
        let bounds = field_boundaries(&bytes);
        let s = Sample::unmarshal(&bytes[..bounds[2]]).unwrap();
        assert_eq!(s.timestamp_unix_ms, full.timestamp_unix_ms);
        assert_eq!(s.cpu_total, full.cpu_total);
    }

    #[test]
    fn test_truncated_double_names_field() {
        let bytes = Sample::default().marshal();
        // timestamp (2 bytes) + cpu_total tag + 3 of 8 bytes
        let err = Sample::unmarshal(&bytes[..6]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Field {
                message: "sample",
                field: "cpu_total".into(),
                source: WireError::Truncated,
            }
        );
    }

    #[test]
    fn test_negative_timestamp_roundtrip() {
        let s = Sample {
            timestamp_unix_ms: -1,
            ..Default::default()
        };
        assert_eq!(Sample::unmarshal(&s.marshal()).unwrap(), s);
    }
}
