//! The supervisor loop: drives byte source → assembler → extractor →
//! stabilization tracker until cancelled, capped, or hit by a fatal source
//! error. Single-threaded and cooperative; cancellation is polled between
//! ticks and each tick processes at most one byte.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use weigher_traits::ByteSource;
use weigher_traits::clock::Clock;

use crate::error::{ReaderError, Report, Result};
use crate::extract::{ParsedReading, parse_record};
use crate::frame::{FrameAssembler, FrameStep};
use crate::stabilize::{StabilizationTracker, WeightEvent};
use crate::{FrameCfg, StabilizeCfg};

/// Parameters for one reader run.
#[derive(Debug, Clone)]
pub struct ReaderParams {
    pub frame: FrameCfg,
    pub stabilize: StabilizeCfg,
    /// Bounded wait between ticks when the source reports nothing available,
    /// so an idle loop does not pin a core.
    pub idle: Duration,
    /// Stop after this many completed candidate records (None = run until
    /// cancelled). Used for scripted runs and tests.
    pub max_records: Option<u64>,
}

impl Default for ReaderParams {
    fn default() -> Self {
        Self {
            frame: FrameCfg::default(),
            stabilize: StabilizeCfg::default(),
            idle: Duration::from_millis(5),
            max_records: None,
        }
    }
}

/// Counters accumulated over a run, reported on exit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub bytes_read: u64,
    /// Completed candidate records (terminator observed).
    pub records: u64,
    /// Candidate records that failed the pattern.
    pub rejected: u64,
    /// Buffer clears by the overflow guard.
    pub overflow_clears: u64,
    /// Buffer clears by the stall watchdog.
    pub stall_clears: u64,
}

/// Run the reader until `shutdown` is set, the record cap is reached, or the
/// source fails. The source is closed on every exit path, error included.
pub fn run<S, C, F>(
    mut source: S,
    params: &ReaderParams,
    clock: &C,
    shutdown: &AtomicBool,
    on_event: F,
) -> Result<RunSummary>
where
    S: ByteSource,
    C: Clock + ?Sized,
    F: FnMut(&WeightEvent, &ParsedReading),
{
    let result = drive(&mut source, params, clock, shutdown, on_event);
    source.close();
    result
}

fn source_err(e: Box<dyn std::error::Error + Send + Sync>) -> Report {
    Report::new(ReaderError::Source(e.to_string()))
}

fn drive<S, C, F>(
    source: &mut S,
    params: &ReaderParams,
    clock: &C,
    shutdown: &AtomicBool,
    mut on_event: F,
) -> Result<RunSummary>
where
    S: ByteSource,
    C: Clock + ?Sized,
    F: FnMut(&WeightEvent, &ParsedReading),
{
    let now = clock.now();
    let mut assembler = FrameAssembler::new(&params.frame, now);
    let mut tracker = StabilizationTracker::new(&params.stabilize, now);
    let mut summary = RunSummary::default();
    let mut byte = [0u8; 1];

    tracing::info!(
        stall_ms = params.frame.stall.as_millis() as u64,
        window_ms = params.stabilize.window.as_millis() as u64,
        "reader start"
    );

    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!(?summary, "reader interrupted");
            return Ok(summary);
        }

        // Stall recovery runs every tick, with or without new bytes.
        if assembler.check_stall(clock.now()) {
            summary.stall_clears += 1;
            source
                .discard_pending_input()
                .map_err(source_err)
                .wrap_err("discarding pending input")?;
        }

        let avail = source
            .available()
            .map_err(source_err)
            .wrap_err("polling byte source")?;
        if avail == 0 {
            clock.sleep(params.idle);
            continue;
        }

        let n = source
            .read(&mut byte)
            .map_err(source_err)
            .wrap_err("reading byte source")?;
        if n == 0 {
            // Benign race: availability evaporated between poll and read.
            continue;
        }
        summary.bytes_read += 1;

        match assembler.push_byte(byte[0], clock.now()) {
            FrameStep::Consumed => {}
            FrameStep::Overflow => summary.overflow_clears += 1,
            FrameStep::Record(line) => {
                summary.records += 1;
                match parse_record(&line, clock.now()) {
                    Some(reading) => {
                        if let Some(event) = tracker.observe(reading.weight_kg, reading.observed_at)
                        {
                            on_event(&event, &reading);
                        }
                    }
                    None => {
                        summary.rejected += 1;
                        tracing::debug!(record = %line, "record did not match pattern");
                    }
                }
                if let Some(max) = params.max_records
                    && summary.records >= max
                {
                    tracing::info!(?summary, "record cap reached");
                    return Ok(summary);
                }
            }
        }
    }
}
