//! Out-of-band "frame ready" marker.

use std::io::Write;

use glimpse_common::error::{GlimpseError, GlimpseResult};

/// Emits one fixed byte per published frame and flushes it immediately.
///
/// Nothing is read back; the consumer uses the bytes only as a cadence.
pub struct SignalChannel<W> {
    out: W,
    byte: u8,
    sent: u64,
}

impl<W: Write> SignalChannel<W> {
    pub fn new(out: W, byte: u8) -> Self {
        Self { out, byte, sent: 0 }
    }

    pub fn notify(&mut self) -> GlimpseResult<()> {
        self.out
            .write_all(&[self.byte])
            .and_then(|_| self.out.flush())
            .map_err(|e| GlimpseError::signal(format!("failed to emit signal byte: {e}")))?;
        self.sent += 1;
        Ok(())
    }

    /// Signal bytes emitted so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn one_byte_per_notify() {
        let mut channel = SignalChannel::new(Vec::new(), 0xAA);
        channel.notify().unwrap();
        channel.notify().unwrap();
        assert_eq!(channel.get_ref().as_slice(), &[0xAA, 0xAA]);
        assert_eq!(channel.sent(), 2);
    }

    #[test]
    fn write_failure_is_a_signal_error() {
        let mut channel = SignalChannel::new(BrokenPipe, 0xAA);
        assert!(matches!(
            channel.notify(),
            Err(GlimpseError::Signal { .. })
        ));
        assert_eq!(channel.sent(), 0);
    }
}
