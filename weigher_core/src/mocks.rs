//! Test and helper mocks for weigher_core.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use weigher_traits::ByteSource;

/// One step of a scripted source's timeline.
#[derive(Debug, Clone)]
pub enum Chunk {
    /// Bytes delivered back-to-back.
    Data(Vec<u8>),
    /// `available()` reports 0 for this many polls before the next chunk.
    Idle(u32),
}

/// Deterministic byte source driven by a script of data and idle gaps.
///
/// Discard and close are observable through shared counters so tests can
/// assert on them after the source has been moved into the reader loop.
pub struct ScriptedSource {
    chunks: VecDeque<Chunk>,
    discards: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl ScriptedSource {
    pub fn new(chunks: impl Into<VecDeque<Chunk>>) -> Self {
        Self {
            chunks: chunks.into(),
            discards: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shorthand for a source that delivers one contiguous byte run.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new([Chunk::Data(bytes.into())])
    }

    /// Handle counting `discard_pending_input` calls.
    pub fn discard_counter(&self) -> Arc<AtomicUsize> {
        self.discards.clone()
    }

    /// Handle observing `close`.
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }

    fn pending_len(&mut self) -> usize {
        loop {
            match self.chunks.front_mut() {
                None => return 0,
                Some(Chunk::Data(d)) if d.is_empty() => {
                    self.chunks.pop_front();
                }
                Some(Chunk::Data(d)) => return d.len(),
                Some(Chunk::Idle(0)) => {
                    self.chunks.pop_front();
                }
                Some(Chunk::Idle(n)) => {
                    *n -= 1;
                    return 0;
                }
            }
        }
    }
}

impl ByteSource for ScriptedSource {
    fn available(&mut self) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.pending_len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        if buf.is_empty() || self.pending_len() == 0 {
            return Ok(0);
        }
        let Some(Chunk::Data(d)) = self.chunks.front_mut() else {
            return Ok(0);
        };
        let n = buf.len().min(d.len());
        for (dst, src) in buf.iter_mut().zip(d.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }

    fn discard_pending_input(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.discards.fetch_add(1, Ordering::Relaxed);
        if let Some(Chunk::Data(d)) = self.chunks.front_mut() {
            d.clear();
        }
        Ok(())
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::Relaxed);
    }
}

/// A source whose every operation fails; exercises the fatal-error path.
pub struct FailingSource {
    closed: Arc<AtomicBool>,
}

impl Default for FailingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FailingSource {
    pub fn new() -> Self {
        Self {
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

impl ByteSource for FailingSource {
    fn available(&mut self) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("device unplugged")))
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("device unplugged")))
    }

    fn discard_pending_input(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("device unplugged")))
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::Relaxed);
    }
}
