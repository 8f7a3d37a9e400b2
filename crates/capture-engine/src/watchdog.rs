//! Companion-process watchdog.
//!
//! The companion holds the write end of our input stream. Any byte, end of
//! stream, or read error on it means the companion is gone or wants us gone.

use std::io::Read;
use std::thread::JoinHandle;

/// Why the watchdog fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchdogTrigger {
    Byte(u8),
    EndOfStream,
    ReadError(String),
}

/// Blocking reader on a dedicated thread.
pub struct Watchdog;

impl Watchdog {
    /// Start watching `input`; `on_trigger` runs once on the watchdog thread
    /// when the stream yields anything.
    pub fn spawn<R, F>(mut input: R, on_trigger: F) -> std::io::Result<JoinHandle<()>>
    where
        R: Read + Send + 'static,
        F: FnOnce(WatchdogTrigger) + Send + 'static,
    {
        std::thread::Builder::new()
            .name("glimpse-watchdog".to_string())
            .spawn(move || {
                let mut buf = [0u8; 1];
                let trigger = loop {
                    match input.read(&mut buf) {
                        Ok(0) => break WatchdogTrigger::EndOfStream,
                        Ok(_) => break WatchdogTrigger::Byte(buf[0]),
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(e) => break WatchdogTrigger::ReadError(e.to_string()),
                    }
                };
                tracing::debug!(?trigger, "Watchdog fired");
                on_trigger(trigger);
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;

    fn fire(input: impl Read + Send + 'static) -> WatchdogTrigger {
        let (tx, rx) = mpsc::channel();
        let handle = Watchdog::spawn(input, move |t| {
            tx.send(t).ok();
        })
        .unwrap();
        handle.join().unwrap();
        rx.recv().unwrap()
    }

    #[test]
    fn eof_triggers() {
        assert_eq!(fire(Cursor::new(Vec::new())), WatchdogTrigger::EndOfStream);
    }

    #[test]
    fn any_byte_triggers() {
        assert_eq!(fire(Cursor::new(vec![b'q', b'x'])), WatchdogTrigger::Byte(b'q'));
    }

    #[test]
    fn read_error_triggers() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::ConnectionReset.into())
            }
        }
        assert!(matches!(fire(Failing), WatchdogTrigger::ReadError(_)));
    }
}
