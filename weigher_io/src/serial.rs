//! Live serial device byte source.
//!
//! The scale speaks 4800 baud, 7 data bits, even parity, 1 stop bit; the
//! defaults here encode that. Reads block for at most the configured timeout
//! and a timeout surfaces as a zero-length read, never as an error.

use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};
// Re-exported so callers can build SerialOptions without depending on
// serialport directly.
pub use serialport::{DataBits, Parity, StopBits};
use weigher_traits::ByteSource;

use crate::error::{Result, SourceError};

/// Port parameters for [`SerialByteSource::open`].
#[derive(Debug, Clone)]
pub struct SerialOptions {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub read_timeout: Duration,
}

impl Default for SerialOptions {
    fn default() -> Self {
        Self {
            baud_rate: 4800,
            data_bits: DataBits::Seven,
            parity: Parity::Even,
            stop_bits: StopBits::One,
            read_timeout: Duration::from_secs(1),
        }
    }
}

pub struct SerialByteSource {
    port: Option<Box<dyn SerialPort>>,
    path: String,
}

impl SerialByteSource {
    pub fn open(path: &str, opts: &SerialOptions) -> Result<Self> {
        let port = serialport::new(path, opts.baud_rate)
            .data_bits(opts.data_bits)
            .parity(opts.parity)
            .stop_bits(opts.stop_bits)
            .timeout(opts.read_timeout)
            .open()
            .map_err(|e| SourceError::Open {
                port: path.to_owned(),
                msg: e.to_string(),
            })?;
        tracing::info!(port = path, baud = opts.baud_rate, "serial port open");
        Ok(Self {
            port: Some(port),
            path: path.to_owned(),
        })
    }

    fn port_mut(&mut self) -> std::result::Result<&mut Box<dyn SerialPort>, SourceError> {
        self.port.as_mut().ok_or(SourceError::Closed)
    }
}

impl ByteSource for SerialByteSource {
    fn available(&mut self) -> std::result::Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let n = self.port_mut()?.bytes_to_read()?;
        Ok(n as usize)
    }

    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> std::result::Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        match self.port_mut()?.read(buf) {
            Ok(n) => Ok(n),
            // Nothing arrived within the port timeout; not an error.
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(Box::new(SourceError::Io(e))),
        }
    }

    fn discard_pending_input(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.port_mut()?.clear(ClearBuffer::Input)?;
        tracing::debug!(port = %self.path, "discarded pending serial input");
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            tracing::info!(port = %self.path, "serial port closed");
        }
    }
}
