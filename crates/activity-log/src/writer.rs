// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Append-only log writer.
//!
//! Records are framed as `[type:1][length:4 BE][payload]` and pushed through
//! a 64 KiB buffer. Nothing is guaranteed to be on disk until
//! [`LogWriter::flush`] or [`LogWriter::close`] succeeds.

use crate::record::RecordType;
use crate::{Header, LogError, Sample, MAGIC, MAX_PAYLOAD_BYTES};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Size of the internal write buffer.
const WRITE_BUFFER_BYTES: usize = 64 * 1024;

/// Writes framed activity records to a byte sink.
///
/// Single-owner: there is no internal locking, and every call must come
/// from the thread that owns the writer.
///
/// # Example
/// ```no_run
/// use activity_log::{Header, LogWriter, Sample};
///
/// let mut log = LogWriter::create("session.infmon")?;
/// log.write_header(&Header { hostname: "rpi4".into(), ..Default::default() })?;
/// log.write_sample(&Sample { timestamp_unix_ms: 1000, cpu_total: 12.5, ..Default::default() })?;
/// log.close()?;
/// # Ok::<(), activity_log::LogError>(())
/// ```
pub struct LogWriter<W: Write = File> {
    /// `None` once the writer has been closed.
    inner: Option<BufWriter<W>>,
    /// Destination path, when created from a file.
    path: Option<PathBuf>,
    records_written: u64,
}

impl LogWriter<File> {
    /// Creates (or truncates) the file at `path` and writes the preamble.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| LogError::io(format!("cannot create '{}'", path.display()), e))?;
        let mut writer = Self::new(file)?;
        writer.path = Some(path.to_path_buf());
        tracing::info!("activity log: recording to {}", path.display());
        Ok(writer)
    }

    /// Flushes the buffer and waits until the file's data reaches the disk.
    ///
    /// Dropping a `File` discards any error from the OS-level close, so
    /// deferred write failures (full disk, network filesystems) only surface
    /// here. Call it before [`close`](Self::close) when that matters.
    pub fn sync(&mut self) -> Result<(), LogError> {
        self.flush()?;
        let inner = self.inner.as_mut().ok_or(LogError::Closed)?;
        inner
            .get_ref()
            .sync_all()
            .map_err(|e| LogError::io(format!("cannot sync {}", describe(&self.path)), e))
    }
}

impl<W: Write> LogWriter<W> {
    /// Wraps an arbitrary sink and writes the preamble into it.
    pub fn new(inner: W) -> Result<Self, LogError> {
        let mut inner = BufWriter::with_capacity(WRITE_BUFFER_BYTES, inner);
        inner
            .write_all(&MAGIC)
            .map_err(|e| LogError::io("cannot write magic bytes", e))?;
        Ok(Self {
            inner: Some(inner),
            path: None,
            records_written: 0,
        })
    }

    /// Path of the underlying file, if the writer was created from one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of records appended so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Appends a Header record.
    ///
    /// The format does not limit how many headers a log holds; writing one
    /// per session is up to the caller.
    pub fn write_header(&mut self, header: &Header) -> Result<(), LogError> {
        self.append_record(RecordType::Header, &header.marshal())
    }

    /// Appends a Sample record.
    pub fn write_sample(&mut self, sample: &Sample) -> Result<(), LogError> {
        self.append_record(RecordType::Sample, &sample.marshal())
    }

    /// Pushes buffered bytes to the sink.
    pub fn flush(&mut self) -> Result<(), LogError> {
        let inner = self.inner.as_mut().ok_or(LogError::Closed)?;
        inner
            .flush()
            .map_err(|e| LogError::io(format!("cannot flush {}", self.describe()), e))
    }

    /// Flushes and releases the sink.
    ///
    /// The handle is released even when the flush fails. Calling `close`
    /// again afterwards is a no-op that returns `Ok(())`. Errors from the
    /// OS-level close of a `File` are not observable; use
    /// [`LogWriter::sync`] first to catch them.
    pub fn close(&mut self) -> Result<(), LogError> {
        let Some(inner) = self.inner.take() else {
            return Ok(());
        };
        let result = match inner.into_inner() {
            Ok(sink) => {
                drop(sink);
                Ok(())
            }
            Err(e) => Err(LogError::io(
                format!("cannot flush {}", self.describe()),
                e.into_error(),
            )),
        };
        if result.is_ok() {
            tracing::info!(
                "activity log: closed {} after {} records",
                self.describe(),
                self.records_written,
            );
        }
        result
    }

    /// Writes `[type:1][length:4 BE][payload]`.
    fn append_record(&mut self, record_type: RecordType, payload: &[u8]) -> Result<(), LogError> {
        let len = payload.len() as u64;
        if len > MAX_PAYLOAD_BYTES {
            // A reader would reject it, so never produce it.
            return Err(LogError::PayloadTooLarge {
                len,
                max: MAX_PAYLOAD_BYTES,
            });
        }
        let inner = self.inner.as_mut().ok_or(LogError::Closed)?;

        let mut frame = [0u8; 5];
        frame[0] = record_type.as_byte();
        frame[1..].copy_from_slice(&(len as u32).to_be_bytes());
        inner
            .write_all(&frame)
            .and_then(|()| inner.write_all(payload))
            .map_err(|e| {
                LogError::io(
                    format!(
                        "cannot append {} record to {}",
                        record_type.as_str(),
                        describe(&self.path),
                    ),
                    e,
                )
            })?;

        self.records_written += 1;
        tracing::trace!(
            "activity log: appended {} record ({} bytes)",
            record_type.as_str(),
            payload.len(),
        );
        Ok(())
    }

    fn describe(&self) -> String {
        describe(&self.path)
    }
}

fn describe(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!("'{}'", p.display()),
        None => "log stream".to_string(),
    }
}

impl<W: Write> Drop for LogWriter<W> {
    fn drop(&mut self) {
        if let Some(mut inner) = self.inner.take() {
            if let Err(e) = inner.flush() {
                tracing::warn!(
                    "activity log: {} dropped without close, final flush failed: {e}",
                    self.describe(),
                );
            }
        }
    }
}
