// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: write a log to disk, read it back.
//!
//! These go through real files so that buffering, close semantics and the
//! preamble check are exercised together.

use activity_log::{Header, LogError, LogReader, LogWriter, Record, Sample, MAGIC};
use std::io::Write;
use std::path::PathBuf;

// ── Helpers ────────────────────────────────────────────────────

fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("infmon_it");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(format!("{}_{name}.infmon", std::process::id()))
}

fn session_header() -> Header {
    Header {
        hostname: "h".into(),
        platform: "linux".into(),
        started_unix_ms: 1000,
        num_cores: 4,
    }
}

fn tick(ts: i64, cpu: f64) -> Sample {
    Sample {
        timestamp_unix_ms: ts,
        cpu_total: cpu,
        cpu_cores: vec![cpu; 4],
        mem_percent: 50.0,
        mem_used_gb: 4.0,
        mem_total_gb: 8.0,
        load1: 0.5,
        load5: 0.25,
        load15: 0.0,
    }
}

fn read_all(path: &PathBuf) -> Result<Vec<Record>, LogError> {
    LogReader::open(path)?.collect()
}

// ── Scenarios ──────────────────────────────────────────────────

#[test]
fn test_session_roundtrip() {
    let path = temp_path("session");
    let mut w = LogWriter::create(&path).unwrap();
    w.write_header(&session_header()).unwrap();
    for (ts, cpu) in [(1000, 10.0), (1500, 20.0), (2000, 30.0)] {
        w.write_sample(&tick(ts, cpu)).unwrap();
    }
    w.close().unwrap();

    let mut r = LogReader::open(&path).unwrap();
    assert_eq!(
        r.next_record().unwrap(),
        Some(Record::Header(session_header()))
    );
    for (ts, cpu) in [(1000, 10.0), (1500, 20.0), (2000, 30.0)] {
        match r.next_record().unwrap() {
            Some(Record::Sample(s)) => {
                assert_eq!(s.timestamp_unix_ms, ts);
                assert_eq!(s.cpu_total, cpu);
                assert_eq!(s, tick(ts, cpu));
            }
            other => panic!("expected sample at {ts}, got {other:?}"),
        }
    }
    assert_eq!(r.next_record().unwrap(), None);
    assert_eq!(r.records_read(), 4);
    r.close().unwrap();
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_header_after_first_sample() {
    let path = temp_path("late_header");
    let mut w = LogWriter::create(&path).unwrap();
    w.write_sample(&tick(1000, 1.0)).unwrap();
    w.write_header(&session_header()).unwrap();
    w.write_sample(&tick(1500, 2.0)).unwrap();
    w.close().unwrap();

    let records = read_all(&path).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records[1].as_header().is_some());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_reopen_starts_from_beginning() {
    let path = temp_path("reopen");
    let mut w = LogWriter::create(&path).unwrap();
    w.write_sample(&tick(1, 1.0)).unwrap();
    w.close().unwrap();

    assert_eq!(read_all(&path).unwrap().len(), 1);
    assert_eq!(read_all(&path).unwrap().len(), 1);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_create_truncates_existing_file() {
    let path = temp_path("truncate");
    std::fs::write(&path, vec![0xffu8; 4096]).unwrap();
    let mut w = LogWriter::create(&path).unwrap();
    w.close().unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), MAGIC);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_crash_before_close_reports_partial_tail() {
    let path = temp_path("crash");
    let mut w = LogWriter::create(&path).unwrap();
    w.write_header(&session_header()).unwrap();
    w.write_sample(&tick(1000, 10.0)).unwrap();
    w.close().unwrap();

    // Simulate a session killed halfway through appending a record.
    let full = tick(1500, 20.0).marshal();
    let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    f.write_all(&[0x02]).unwrap();
    f.write_all(&(full.len() as u32).to_be_bytes()).unwrap();
    f.write_all(&full[..full.len() / 2]).unwrap();
    drop(f);

    let mut r = LogReader::open(&path).unwrap();
    assert!(matches!(r.next(), Some(Ok(Record::Header(_)))));
    assert!(matches!(r.next(), Some(Ok(Record::Sample(_)))));
    assert!(matches!(
        r.next(),
        Some(Err(LogError::Truncated {
            stage: "record payload"
        }))
    ));
    assert!(r.next().is_none());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_non_log_files_rejected() {
    let short = temp_path("short");
    std::fs::write(&short, b"INFGO").unwrap();
    assert!(matches!(
        LogReader::open(&short),
        Err(LogError::NotALog { .. })
    ));

    let empty = temp_path("empty");
    std::fs::write(&empty, b"").unwrap();
    assert!(matches!(
        LogReader::open(&empty),
        Err(LogError::NotALog { .. })
    ));

    let wrong = temp_path("wrong");
    std::fs::write(&wrong, b"GIF89a\0\0 trailing").unwrap();
    assert!(matches!(
        LogReader::open(&wrong),
        Err(LogError::NotALog { .. })
    ));

    for p in [short, empty, wrong] {
        let _ = std::fs::remove_file(&p);
    }
}

#[test]
fn test_oversized_record_rejected_on_disk() {
    let path = temp_path("oversized");
    let mut bytes = MAGIC.to_vec();
    bytes.push(0x01);
    bytes.extend_from_slice(&(10 * 1024 * 1024 + 1u32).to_be_bytes());
    std::fs::write(&path, bytes).unwrap();

    let mut r = LogReader::open(&path).unwrap();
    assert!(matches!(
        r.next_record(),
        Err(LogError::PayloadTooLarge { len: 10_485_761, .. })
    ));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_future_record_kinds_and_fields() {
    // A newer writer adds record type 0x03 and a field 10 to Sample.
    let mut sample_payload = tick(1000, 5.0).marshal();
    activity_log::wire::append_tag(&mut sample_payload, 10, activity_log::wire::WireType::Bytes);
    activity_log::wire::append_bytes(&mut sample_payload, b"gpu0");

    let mut bytes = MAGIC.to_vec();
    for (ty, payload) in [(0x03u8, vec![1, 2, 3, 4]), (0x02u8, sample_payload)] {
        bytes.push(ty);
        bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&payload);
    }

    let path = temp_path("future");
    std::fs::write(&path, bytes).unwrap();
    let records = read_all(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].type_byte(), 0x03);
    assert_eq!(records[1], Record::Sample(tick(1000, 5.0)));
    let _ = std::fs::remove_file(&path);
}
