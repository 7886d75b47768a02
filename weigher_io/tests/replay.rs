//! Replay simulator contract: CR re-termination, cyclic line delivery,
//! availability gating, and discard semantics.

use std::io::Write;
use std::time::Duration;

use weigher_io::{ReplayByteSource, ReplayTiming, SourceError};
use weigher_traits::ByteSource;

fn capture_file(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    for l in lines {
        writeln!(f, "{l}").expect("write line");
    }
    f
}

fn fast_timing() -> ReplayTiming {
    ReplayTiming {
        line_delay: Duration::from_millis(5),
        jitter_min: Duration::ZERO,
        jitter_max: Duration::ZERO,
    }
}

/// Drain whatever the source currently reports available, one byte at a time.
fn drain(source: &mut ReplayByteSource) -> Vec<u8> {
    let mut out = Vec::new();
    let mut byte = [0u8; 1];
    while source.available().expect("available") > 0 {
        let n = source.read(&mut byte).expect("read");
        if n == 0 {
            break;
        }
        out.push(byte[0]);
    }
    out
}

#[test]
fn lines_are_stripped_and_cr_terminated() {
    let f = capture_file(&["ia    00012300000  "]);
    let mut src = ReplayByteSource::from_file(f.path(), fast_timing()).expect("open");

    let got = drain(&mut src);
    assert_eq!(got, b"ia    00012300000\r");
}

#[test]
fn next_line_appears_only_after_the_delay() {
    let f = capture_file(&["ia    00012300000", "iz    00045600000"]);
    let mut src = ReplayByteSource::from_file(f.path(), fast_timing()).expect("open");

    let first = drain(&mut src);
    assert!(first.ends_with(b"\r"));
    // Immediately after finishing a line there is nothing to read.
    assert_eq!(src.available().expect("available"), 0);

    std::thread::sleep(Duration::from_millis(20));
    let second = drain(&mut src);
    assert_eq!(second, b"iz    00045600000\r");
}

#[test]
fn replay_cycles_back_to_the_first_line() {
    let f = capture_file(&["ia    00011100000", "ia    00022200000"]);
    let mut src = ReplayByteSource::from_file(f.path(), fast_timing()).expect("open");

    let mut lines = Vec::new();
    for _ in 0..3 {
        loop {
            let got = drain(&mut src);
            if !got.is_empty() {
                lines.push(got);
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    }
    assert_eq!(lines[0], lines[2]);
    assert_ne!(lines[0], lines[1]);
}

#[test]
fn discard_rewinds_the_current_line() {
    let f = capture_file(&["ia    00012300000"]);
    let mut src = ReplayByteSource::from_file(f.path(), fast_timing()).expect("open");

    let mut buf = [0u8; 4];
    let n = src.read(&mut buf).expect("read");
    assert_eq!(&buf[..n], b"ia  ");

    src.discard_pending_input().expect("discard");
    let mut byte = [0u8; 1];
    src.read(&mut byte).expect("read");
    assert_eq!(byte[0], b'i');
}

#[test]
fn closed_source_reports_nothing() {
    let f = capture_file(&["ia    00012300000"]);
    let mut src = ReplayByteSource::from_file(f.path(), fast_timing()).expect("open");
    src.close();
    src.close(); // idempotent
    assert_eq!(src.available().expect("available"), 0);
    let mut byte = [0u8; 1];
    assert_eq!(src.read(&mut byte).expect("read"), 0);
}

#[test]
fn empty_capture_is_rejected() {
    let f = tempfile::NamedTempFile::new().expect("tempfile");
    let err = ReplayByteSource::from_file(f.path(), fast_timing()).expect_err("empty file");
    assert!(matches!(err, SourceError::Replay { .. }));
}
