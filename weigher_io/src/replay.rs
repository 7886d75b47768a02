//! File-replay byte source.
//!
//! Replays a capture of scale output cyclically, one line at a time, with an
//! inter-line availability delay and a small per-read latency jitter so the
//! reader's timing logic gets exercised without hardware. Each file line is
//! stripped and re-terminated with a bare CR, matching the wire format.

use std::path::Path;
use std::time::{Duration, Instant};

use rand::Rng;
use weigher_traits::ByteSource;
use weigher_traits::clock::{Clock, MonotonicClock};

use crate::error::{Result, SourceError};

/// Replay pacing. The defaults mirror the device's observed cadence: a new
/// line roughly every 200 ms, with 5–10 ms of per-read latency.
#[derive(Debug, Clone)]
pub struct ReplayTiming {
    pub line_delay: Duration,
    pub jitter_min: Duration,
    pub jitter_max: Duration,
}

impl Default for ReplayTiming {
    fn default() -> Self {
        Self {
            line_delay: Duration::from_millis(200),
            jitter_min: Duration::from_millis(5),
            jitter_max: Duration::from_millis(10),
        }
    }
}

#[derive(Debug)]
pub struct ReplayByteSource<C: Clock = MonotonicClock> {
    lines: Vec<Vec<u8>>,
    line_idx: usize,
    pos: usize,
    last_line_done_at: Instant,
    timing: ReplayTiming,
    clock: C,
    open: bool,
}

impl ReplayByteSource<MonotonicClock> {
    pub fn from_file(path: &Path, timing: ReplayTiming) -> Result<Self> {
        Self::with_clock(path, timing, MonotonicClock::new())
    }
}

impl<C: Clock> ReplayByteSource<C> {
    pub fn with_clock(path: &Path, timing: ReplayTiming, clock: C) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let lines: Vec<Vec<u8>> = text
            .lines()
            .map(|l| {
                let mut bytes = l.trim().as_bytes().to_vec();
                bytes.push(0x0D);
                bytes
            })
            .collect();
        if lines.is_empty() {
            return Err(SourceError::Replay {
                path: path.display().to_string(),
                msg: "no lines to replay".into(),
            });
        }
        tracing::info!(path = %path.display(), lines = lines.len(), "replaying capture file");
        let now = clock.now();
        Ok(Self {
            lines,
            line_idx: 0,
            pos: 0,
            last_line_done_at: now,
            timing,
            clock,
            open: true,
        })
    }

    fn current_line(&self) -> &[u8] {
        &self.lines[self.line_idx]
    }

    fn jitter(&self) -> Duration {
        let (lo, hi) = (self.timing.jitter_min, self.timing.jitter_max);
        if hi <= lo {
            return lo;
        }
        let micros = rand::thread_rng().gen_range(lo.as_micros() as u64..=hi.as_micros() as u64);
        Duration::from_micros(micros)
    }
}

impl<C: Clock> ByteSource for ReplayByteSource<C> {
    fn available(&mut self) -> std::result::Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        if !self.open {
            return Ok(0);
        }
        let remaining = self.current_line().len().saturating_sub(self.pos);
        if remaining > 0 {
            return Ok(remaining);
        }
        // Line fully delivered; the next one becomes visible only after the
        // inter-line delay, the way the device paces its transmissions.
        let now = self.clock.now();
        if now.saturating_duration_since(self.last_line_done_at) > self.timing.line_delay {
            self.line_idx = (self.line_idx + 1) % self.lines.len();
            self.pos = 0;
            self.last_line_done_at = now;
            return Ok(1);
        }
        Ok(0)
    }

    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> std::result::Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        if !self.open {
            return Ok(0);
        }
        self.clock.sleep(self.jitter());

        let line = &self.lines[self.line_idx];
        if self.pos >= line.len() || buf.is_empty() {
            return Ok(0);
        }
        let n = buf.len().min(line.len() - self.pos);
        buf[..n].copy_from_slice(&line[self.pos..self.pos + n]);
        self.pos += n;
        if self.pos >= line.len() {
            self.last_line_done_at = self.clock.now();
        }
        Ok(n)
    }

    fn discard_pending_input(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Rewind to the start of the current line, mirroring a real input
        // buffer flush.
        self.pos = 0;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }
}
