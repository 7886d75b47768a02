pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Raw byte channel delivering the scale's wire protocol.
///
/// Implemented by the live serial device and by the file-replay simulator;
/// consumers never branch on which one they hold.
pub trait ByteSource {
    /// Non-blocking estimate of bytes ready to read. Must return 0 when
    /// nothing is pending rather than blocking.
    fn available(&mut self) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;

    /// Read up to `buf.len()` bytes. Short reads, including 0, are not
    /// errors; a real device may simply have nothing ready yet.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;

    /// Drop any buffered-but-unread input. Used as the desynchronization
    /// recovery hook after a stalled or overlong line.
    fn discard_pending_input(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Release the underlying channel. Idempotent.
    fn close(&mut self);
}

impl ByteSource for Box<dyn ByteSource> {
    fn available(&mut self) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        (**self).available()
    }
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read(buf)
    }
    fn discard_pending_input(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).discard_pending_input()
    }
    fn close(&mut self) {
        (**self).close()
    }
}
