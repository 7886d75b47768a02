//! Supervisor loop integration: stall recovery, end-to-end event flow,
//! cancellation, and the fatal source-error path.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use weigher_core::mocks::{Chunk, FailingSource, ScriptedSource};
use weigher_core::reader::{ReaderParams, run};
use weigher_core::stabilize::WeightEvent;
use weigher_traits::clock::Clock;

/// Single-threaded clock that only advances when the loop sleeps.
struct ManualClock {
    origin: Instant,
    offset: Cell<Duration>,
}

impl ManualClock {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Cell::new(Duration::ZERO),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
    fn sleep(&self, d: Duration) {
        self.offset.set(self.offset.get() + d);
    }
}

fn record(line: &str) -> Vec<u8> {
    let mut v = line.as_bytes().to_vec();
    v.push(0x0D);
    v
}

fn collect_events(
    source: ScriptedSource,
    params: &ReaderParams,
    clock: &ManualClock,
) -> (Vec<WeightEvent>, weigher_core::RunSummary) {
    let shutdown = AtomicBool::new(false);
    let mut events = Vec::new();
    let summary = run(source, params, clock, &shutdown, |event, _reading| {
        events.push(*event);
    })
    .expect("run succeeds");
    (events, summary)
}

#[test]
fn stall_clears_buffer_and_discards_pending_input_once() {
    let clock = ManualClock::new();
    let source = ScriptedSource::new([
        Chunk::Data(b"junk".to_vec()),
        Chunk::Idle(6),
        Chunk::Data(record("ia    00012300000")),
    ]);
    let discards = source.discard_counter();

    let params = ReaderParams {
        idle: Duration::from_secs(1),
        max_records: Some(1),
        ..ReaderParams::default()
    };
    let (events, summary) = collect_events(source, &params, &clock);

    assert_eq!(discards.load(Ordering::Relaxed), 1);
    assert_eq!(summary.stall_clears, 1);
    // The stalled junk never became a record; only the clean line did.
    assert_eq!(summary.records, 1);
    assert_eq!(events, [WeightEvent::Changed(12)]);
}

#[test]
fn identical_record_after_window_stabilizes() {
    let clock = ManualClock::new();
    // Two identical records, 3.1s apart (31 idle polls at 100ms each).
    let source = ScriptedSource::new([
        Chunk::Data(record("ia    00012300000")),
        Chunk::Idle(31),
        Chunk::Data(record("ia    00012300000")),
    ]);
    let params = ReaderParams {
        idle: Duration::from_millis(100),
        max_records: Some(2),
        ..ReaderParams::default()
    };
    let (events, summary) = collect_events(source, &params, &clock);

    assert_eq!(
        events,
        [WeightEvent::Changed(12), WeightEvent::Stabilized(12)]
    );
    assert_eq!(summary.records, 2);
    assert_eq!(summary.rejected, 0);
}

#[test]
fn sign_flip_flows_end_to_end() {
    let clock = ManualClock::new();
    let source = ScriptedSource::from_bytes(record("iz    00045600000"));
    let params = ReaderParams {
        max_records: Some(1),
        ..ReaderParams::default()
    };
    let (events, _) = collect_events(source, &params, &clock);
    assert_eq!(events, [WeightEvent::Changed(-45)]);
}

#[test]
fn rejected_records_are_counted_not_fatal() {
    let clock = ManualClock::new();
    let mut bytes = record("not a reading");
    bytes.extend(record("ia    00012300000"));
    let source = ScriptedSource::from_bytes(bytes);
    let params = ReaderParams {
        max_records: Some(2),
        ..ReaderParams::default()
    };
    let (events, summary) = collect_events(source, &params, &clock);

    assert_eq!(summary.records, 2);
    assert_eq!(summary.rejected, 1);
    assert_eq!(events, [WeightEvent::Changed(12)]);
}

#[test]
fn source_is_closed_on_normal_exit() {
    let clock = ManualClock::new();
    let source = ScriptedSource::from_bytes(record("ia    00012300000"));
    let closed = source.closed_flag();
    let params = ReaderParams {
        max_records: Some(1),
        ..ReaderParams::default()
    };
    let _ = collect_events(source, &params, &clock);
    assert!(closed.load(Ordering::Relaxed));
}

#[test]
fn source_failure_is_fatal_but_still_closes() {
    let clock = ManualClock::new();
    let source = FailingSource::new();
    let closed = source.closed_flag();
    let shutdown = AtomicBool::new(false);

    let result = run(
        source,
        &ReaderParams::default(),
        &clock,
        &shutdown,
        |_, _| {},
    );

    let err = result.expect_err("source failure aborts the run");
    assert!(err.to_string().contains("polling byte source"));
    assert!(closed.load(Ordering::Relaxed));
}

#[test]
fn cancellation_exits_promptly_and_closes() {
    let clock = ManualClock::new();
    let source = ScriptedSource::from_bytes(record("ia    00012300000"));
    let closed = source.closed_flag();
    let shutdown = AtomicBool::new(true);

    let summary = run(
        source,
        &ReaderParams::default(),
        &clock,
        &shutdown,
        |_, _| {},
    )
    .expect("cancellation is a clean exit");

    assert_eq!(summary.bytes_read, 0);
    assert!(closed.load(Ordering::Relaxed));
}
