// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Forward-only log reader.
//!
//! The reader trusts nothing it reads from disk:
//! - the preamble must match [`MAGIC`] exactly;
//! - every declared length is checked against [`MAX_PAYLOAD_BYTES`] before
//!   any buffer is allocated;
//! - a stream that stops partway through a record is an error, never a
//!   quiet end of file.
//!
//! Unknown record types are passed through as [`Record::Unknown`].

use crate::{LogError, Record, MAGIC, MAX_PAYLOAD_BYTES};
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::iter::FusedIterator;
use std::path::Path;

/// Size of the internal read buffer.
const READ_BUFFER_BYTES: usize = 64 * 1024;

/// Reads framed activity records from a byte source.
///
/// Records come out one at a time through [`next_record`](Self::next_record)
/// or the [`Iterator`] impl. There is no seeking; reopen the file to start
/// over.
///
/// # Example
/// ```no_run
/// use activity_log::{LogReader, Record};
///
/// let reader = LogReader::open("session.infmon")?;
/// for record in reader {
///     match record? {
///         Record::Header(h) => println!("host {}", h.hostname),
///         Record::Sample(s) => println!("{} cpu {:.1}%", s.timestamp_unix_ms, s.cpu_total),
///         Record::Unknown { record_type, .. } => println!("skipping type {record_type:#04x}"),
///     }
/// }
/// # Ok::<(), activity_log::LogError>(())
/// ```
pub struct LogReader<R: Read = BufReader<File>> {
    inner: R,
    /// Human-readable origin used in error messages.
    source: String,
    records_read: u64,
    /// Set after end of stream or the first error.
    finished: bool,
}

impl LogReader<BufReader<File>> {
    /// Opens `path` and validates its preamble.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| LogError::io(format!("cannot open '{}'", path.display()), e))?;
        let reader = Self::with_source(
            BufReader::with_capacity(READ_BUFFER_BYTES, file),
            path.display().to_string(),
        )?;
        tracing::debug!("activity log: reading {}", path.display());
        Ok(reader)
    }
}

impl<R: Read> LogReader<R> {
    /// Wraps an arbitrary source and validates its preamble.
    pub fn new(inner: R) -> Result<Self, LogError> {
        Self::with_source(inner, "<stream>".to_string())
    }

    fn with_source(mut inner: R, source: String) -> Result<Self, LogError> {
        let mut preamble = [0u8; MAGIC.len()];
        let n = read_up_to(&mut inner, &mut preamble)
            .map_err(|e| LogError::io(format!("cannot read preamble of '{source}'"), e))?;
        if n < MAGIC.len() {
            return Err(LogError::NotALog {
                path: source,
                detail: format!("only {n} bytes, shorter than the {}-byte preamble", MAGIC.len()),
            });
        }
        if preamble != MAGIC {
            return Err(LogError::NotALog {
                path: source,
                detail: "bad magic bytes".to_string(),
            });
        }
        Ok(Self {
            inner,
            source,
            records_read: 0,
            finished: false,
        })
    }

    /// Number of records returned so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly between records.
    pub fn next_record(&mut self) -> Result<Option<Record>, LogError> {
        let mut type_byte = [0u8; 1];
        let n = read_up_to(&mut self.inner, &mut type_byte)
            .map_err(|e| LogError::io(format!("cannot read record type from '{}'", self.source), e))?;
        if n == 0 {
            return Ok(None);
        }

        let mut len_buf = [0u8; 4];
        self.read_frame_part(&mut len_buf, "record length")?;
        let len = u64::from(u32::from_be_bytes(len_buf));
        if len > MAX_PAYLOAD_BYTES {
            return Err(LogError::PayloadTooLarge {
                len,
                max: MAX_PAYLOAD_BYTES,
            });
        }

        let mut payload = vec![0u8; len as usize];
        self.read_frame_part(&mut payload, "record payload")?;

        let record = Record::decode(type_byte[0], payload)?;
        if let Record::Unknown { record_type, payload } = &record {
            tracing::debug!(
                "activity log: passing through unknown record type {record_type:#04x} ({} bytes)",
                payload.len(),
            );
        }
        self.records_read += 1;
        Ok(Some(record))
    }

    /// Releases the underlying source.
    pub fn close(self) -> Result<(), LogError> {
        tracing::debug!(
            "activity log: closed '{}' after {} records",
            self.source,
            self.records_read,
        );
        Ok(())
    }

    fn read_frame_part(&mut self, buf: &mut [u8], stage: &'static str) -> Result<(), LogError> {
        match self.inner.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(LogError::Truncated { stage }),
            Err(e) => Err(LogError::io(
                format!("cannot read {stage} from '{}'", self.source),
                e,
            )),
        }
    }
}

impl<R: Read> Iterator for LogReader<R> {
    type Item = Result<Record, LogError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> FusedIterator for LogReader<R> {}

/// Fills as much of `buf` as the source allows, stopping only at end of
/// stream. Returns the number of bytes read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
