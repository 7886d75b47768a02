#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Byte-source implementations for the scale reader: the live serial device
//! and a file-replay simulator for running without hardware.

pub mod error;
pub mod replay;
pub mod serial;

pub use error::SourceError;
pub use replay::{ReplayByteSource, ReplayTiming};
pub use serial::{SerialByteSource, SerialOptions};
