#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Core pipeline for the serial scale reader.
//!
//! Turns an unbounded, unreliably framed byte stream into discrete weight
//! readings and debounced stability events:
//!
//! byte source → frame assembler → field extractor → stabilization tracker
//!
//! The byte source is abstract (`weigher_traits::ByteSource`); everything
//! here is single-threaded and driven by [`reader::run`].

pub mod error;
pub mod extract;
pub mod frame;
pub mod mocks;
pub mod reader;
pub mod stabilize;

pub use error::{ReaderError, Report, Result};
pub use extract::{ParsedReading, extract_weight, parse_record};
pub use frame::{FrameAssembler, FrameStep};
pub use reader::{ReaderParams, RunSummary, run};
pub use stabilize::{StabilizationTracker, WeightEvent};

use std::time::Duration;

/// Frame assembler configuration.
#[derive(Debug, Clone)]
pub struct FrameCfg {
    /// Maximum plausible record length; the buffer is force-cleared when an
    /// append pushes it past this.
    pub max_line_len: usize,
    /// A non-empty buffer older than this (since the last flush) is cleared
    /// and the source is asked to discard pending input.
    pub stall: Duration,
}

impl Default for FrameCfg {
    fn default() -> Self {
        Self {
            max_line_len: 50,
            stall: Duration::from_secs(5),
        }
    }
}

/// Stabilization tracker configuration.
#[derive(Debug, Clone)]
pub struct StabilizeCfg {
    /// A weight unchanged for at least this long is announced as stable.
    pub window: Duration,
}

impl Default for StabilizeCfg {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(3),
        }
    }
}
