//! Streaming frame assembler.
//!
//! Consumes one byte at a time and emits complete carriage-return-terminated
//! candidate records, recovering automatically from line noise, truncated
//! records, and protocol desynchronization. The wire format gives no framing
//! guarantee beyond "records usually end in CR", so the assembler carries two
//! watchdogs: an overflow guard on buffer length and a stall clock on time
//! since the last flush.

use std::time::{Duration, Instant};

/// Record terminator on the wire (a bare CR; no LF is sent).
pub const TERMINATOR: u8 = 0x0D;

/// Outcome of feeding one byte to the assembler.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameStep {
    /// Byte absorbed (or discarded); nothing to emit.
    Consumed,
    /// Terminator observed; the accumulated candidate record. The buffer is
    /// already cleared, whatever the caller does with the record.
    Record(String),
    /// Overflow guard tripped; the buffer was discarded without extraction.
    Overflow,
}

#[derive(Debug)]
pub struct FrameAssembler {
    buf: String,
    last_flush_at: Instant,
    max_len: usize,
    stall: Duration,
}

impl FrameAssembler {
    pub fn new(cfg: &crate::FrameCfg, now: Instant) -> Self {
        Self {
            buf: String::with_capacity(cfg.max_line_len + 1),
            last_flush_at: now,
            max_len: cfg.max_line_len,
            stall: cfg.stall,
        }
    }

    /// Current buffer contents (accumulated printable characters).
    pub fn buffered(&self) -> &str {
        &self.buf
    }

    /// Stall recovery, checked every loop tick: a line that never receives
    /// its terminator must not wedge the assembler forever. Returns true
    /// when the buffer was force-cleared; the caller must then ask the byte
    /// source to discard pending input.
    pub fn check_stall(&mut self, now: Instant) -> bool {
        if self.buf.is_empty() {
            return false;
        }
        if now.saturating_duration_since(self.last_flush_at) <= self.stall {
            return false;
        }
        tracing::debug!(buffer = %self.buf, "clearing buffer: no terminator within stall window");
        self.buf.clear();
        self.last_flush_at = now;
        true
    }

    /// Feed one byte. At most one candidate record is emitted per terminator
    /// byte; partial records are never emitted.
    pub fn push_byte(&mut self, byte: u8, now: Instant) -> FrameStep {
        if byte == TERMINATOR {
            // Flush unconditionally; the buffer never carries state across
            // record boundaries even when extraction later fails.
            let record = std::mem::take(&mut self.buf);
            self.last_flush_at = now;
            return FrameStep::Record(record);
        }

        if byte < 0x20 {
            // Control noise between records; LF in particular is common and
            // not worth a log line.
            if byte != b'\n' {
                tracing::debug!(byte, "ignoring control byte");
            }
            return FrameStep::Consumed;
        }

        if byte > 0x7E {
            // Not decodable as the expected 7-bit protocol; substituted with
            // a placeholder rather than aborting, and a placeholder is not a
            // printable record character.
            tracing::debug!(byte, placeholder = %char::REPLACEMENT_CHARACTER, "ignoring non-ascii byte");
            return FrameStep::Consumed;
        }

        self.buf.push(byte as char);
        if self.buf.len() > self.max_len {
            tracing::debug!(buffer = %self.buf, "clearing buffer: overflow");
            self.buf.clear();
            self.last_flush_at = now;
            return FrameStep::Overflow;
        }
        FrameStep::Consumed
    }
}
