// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Record kinds carried by the log container.

use crate::{DecodeError, Header, LogError, Sample};

/// Type byte that prefixes every framed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordType {
    Header = 0x01,
    Sample = 0x02,
}

impl RecordType {
    /// Recognises a type byte, returning `None` for kinds this version
    /// does not know about.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Header),
            0x02 => Some(Self::Sample),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Sample => "sample",
        }
    }
}

/// A decoded log entry.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    Header(Header),
    Sample(Sample),
    /// A record kind written by a newer version; the payload is kept as-is.
    Unknown { record_type: u8, payload: Vec<u8> },
}

impl Record {
    /// Decodes a payload according to its type byte.
    pub(crate) fn decode(type_byte: u8, payload: Vec<u8>) -> Result<Self, LogError> {
        let decode_err = |record: RecordType| {
            move |source: DecodeError| LogError::Decode {
                record: record.as_str(),
                source,
            }
        };
        match RecordType::from_byte(type_byte) {
            Some(RecordType::Header) => Header::unmarshal(&payload)
                .map(Self::Header)
                .map_err(decode_err(RecordType::Header)),
            Some(RecordType::Sample) => Sample::unmarshal(&payload)
                .map(Self::Sample)
                .map_err(decode_err(RecordType::Sample)),
            None => Ok(Self::Unknown {
                record_type: type_byte,
                payload,
            }),
        }
    }

    /// The type byte this record was (or would be) framed with.
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::Header(_) => RecordType::Header.as_byte(),
            Self::Sample(_) => RecordType::Sample.as_byte(),
            Self::Unknown { record_type, .. } => *record_type,
        }
    }

    pub fn as_header(&self) -> Option<&Header> {
        match self {
            Self::Header(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_sample(&self) -> Option<&Sample> {
        match self {
            Self::Sample(s) => Some(s),
            _ => None,
        }
    }
}
