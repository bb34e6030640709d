// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Protocol Buffers wire-format primitives.
//!
//! Only the subset needed by the record payloads is implemented, but the
//! skip routine understands every wire type so that payloads produced by a
//! newer schema (or by any conformant protobuf encoder) can always be
//! consumed.
//!
//! Decoding functions take a `&mut &[u8]` cursor and advance it past the
//! bytes they consume. On error the cursor position is unspecified; callers
//! abandon the whole message.

/// Smallest valid field number.
pub const MIN_FIELD_NUMBER: u32 = 1;

/// Largest valid field number (`2^29 - 1`).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Longest legal varint encoding of a `u64`.
const MAX_VARINT_LEN: usize = 10;

/// Nesting limit when skipping (deprecated) group fields.
const MAX_GROUP_DEPTH: usize = 64;

/// The wire type carried in the low three bits of every tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    Bytes = 2,
    StartGroup = 3,
    EndGroup = 4,
    Fixed32 = 5,
}

impl WireType {
    /// Maps the three tag bits to a wire type; 6 and 7 are reserved.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::Bytes),
            3 => Some(Self::StartGroup),
            4 => Some(Self::EndGroup),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }
}

/// Low-level wire-format violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// The input ended before the value was complete.
    #[error("unexpected end of input")]
    Truncated,

    /// A varint ran past ten bytes or past 64 bits of value.
    #[error("varint overflows 64 bits")]
    Overflow,

    /// A tag carried field number 0 or one above the protobuf maximum.
    #[error("invalid field number {0}")]
    InvalidFieldNumber(u64),

    /// A tag carried reserved wire type 6 or 7.
    #[error("invalid wire type {0}")]
    InvalidWireType(u8),

    /// An end-group tag without a matching start group.
    #[error("unexpected end group for field {0}")]
    UnexpectedEndGroup(u32),

    /// Groups nested deeper than the skip routine allows.
    #[error("groups nested more than {MAX_GROUP_DEPTH} levels deep")]
    RecursionLimit,

    /// A string field held bytes that are not valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
}

// ── Encoding ───────────────────────────────────────────────────

/// Appends `value` as a base-128 varint.
pub fn append_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Appends the tag for `(number, wire_type)`.
pub fn append_tag(buf: &mut Vec<u8>, number: u32, wire_type: WireType) {
    debug_assert!((MIN_FIELD_NUMBER..=MAX_FIELD_NUMBER).contains(&number));
    append_varint(buf, (u64::from(number) << 3) | wire_type as u64);
}

/// Appends eight little-endian bytes.
pub fn append_fixed64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Appends a varint length followed by `bytes`.
pub fn append_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    append_varint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Number of bytes [`append_varint`] would emit for `value`.
pub fn varint_len(value: u64) -> usize {
    // Each byte carries 7 bits; zero still takes one byte.
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

// ── Decoding ───────────────────────────────────────────────────

/// Consumes one varint.
pub fn consume_varint(buf: &mut &[u8]) -> Result<u64, WireError> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_LEN {
        let Some((&byte, rest)) = buf.split_first() else {
            return Err(WireError::Truncated);
        };
        *buf = rest;
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(WireError::Overflow);
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte < 0x80 {
            return Ok(value);
        }
    }
    Err(WireError::Overflow)
}

/// Consumes a tag and splits it into field number and wire type.
pub fn consume_tag(buf: &mut &[u8]) -> Result<(u32, WireType), WireError> {
    let tag = consume_varint(buf)?;
    let number = tag >> 3;
    if number < u64::from(MIN_FIELD_NUMBER) || number > u64::from(MAX_FIELD_NUMBER) {
        return Err(WireError::InvalidFieldNumber(number));
    }
    let bits = (tag & 0x7) as u8;
    let wire_type = WireType::from_bits(bits).ok_or(WireError::InvalidWireType(bits))?;
    Ok((number as u32, wire_type))
}

/// Consumes eight little-endian bytes.
pub fn consume_fixed64(buf: &mut &[u8]) -> Result<u64, WireError> {
    let (head, rest) = buf.split_first_chunk::<8>().ok_or(WireError::Truncated)?;
    *buf = rest;
    Ok(u64::from_le_bytes(*head))
}

/// Consumes four little-endian bytes.
pub fn consume_fixed32(buf: &mut &[u8]) -> Result<u32, WireError> {
    let (head, rest) = buf.split_first_chunk::<4>().ok_or(WireError::Truncated)?;
    *buf = rest;
    Ok(u32::from_le_bytes(*head))
}

/// Consumes a length-prefixed byte string, borrowing it from the input.
pub fn consume_bytes<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], WireError> {
    let len = consume_varint(buf)?;
    let len = usize::try_from(len).map_err(|_| WireError::Truncated)?;
    if len > buf.len() {
        return Err(WireError::Truncated);
    }
    let (value, rest) = buf.split_at(len);
    *buf = rest;
    Ok(value)
}

/// Consumes a length-prefixed UTF-8 string.
pub fn consume_string(buf: &mut &[u8]) -> Result<String, WireError> {
    let bytes = consume_bytes(buf)?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| WireError::InvalidUtf8)
}

/// Skips the value of a field whose tag has already been consumed.
///
/// Shared by every message decoder for unknown fields and for known field
/// numbers arriving with an unexpected wire type.
pub fn skip_field(number: u32, wire_type: WireType, buf: &mut &[u8]) -> Result<(), WireError> {
    skip_field_at_depth(number, wire_type, buf, 0)
}

fn skip_field_at_depth(
    number: u32,
    wire_type: WireType,
    buf: &mut &[u8],
    depth: usize,
) -> Result<(), WireError> {
    match wire_type {
        WireType::Varint => consume_varint(buf).map(drop),
        WireType::Fixed64 => consume_fixed64(buf).map(drop),
        WireType::Fixed32 => consume_fixed32(buf).map(drop),
        WireType::Bytes => consume_bytes(buf).map(drop),
        WireType::StartGroup => {
            if depth >= MAX_GROUP_DEPTH {
                return Err(WireError::RecursionLimit);
            }
            loop {
                let (inner, inner_type) = consume_tag(buf)?;
                if inner_type == WireType::EndGroup {
                    return if inner == number {
                        Ok(())
                    } else {
                        Err(WireError::UnexpectedEndGroup(inner))
                    };
                }
                skip_field_at_depth(inner, inner_type, buf, depth + 1)?;
            }
        }
        WireType::EndGroup => Err(WireError::UnexpectedEndGroup(number)),
    }
}
