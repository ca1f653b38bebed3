//! # Mock Transport
//!
//! An in-memory transport that records every write. Clones share state, so a
//! test can hand one clone to a [`Printer`](crate::printer::Printer) and keep
//! another to inspect what reached the "device".
//!
//! Failures can be scripted per call: an I/O error, a short write, a panic,
//! or a blocking delay. Calls are counted from 1 and include failed attempts.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use super::Transport;

#[derive(Debug, Default)]
struct MockState {
    writes: Vec<Vec<u8>>,
    attempts: usize,
    flushes: usize,
    fail_on: Vec<usize>,
    short_on: Vec<(usize, usize)>,
    panic_on: Vec<usize>,
    delay_on: Vec<(usize, Duration)>,
    calls: Vec<(Instant, Instant)>,
}

/// Recording transport with scripted failures.
///
/// ```
/// use thermoprint::transport::{MockTransport, Transport};
///
/// let mock = MockTransport::new().fail_on(2);
/// let mut handle = mock.clone();
///
/// assert_eq!(handle.write(b"a").unwrap(), 1);
/// assert!(handle.write(b"b").is_err());
/// assert_eq!(mock.writes(), vec![b"a".to_vec()]);
/// assert_eq!(mock.attempts(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `call`-th write with a broken pipe error.
    pub fn fail_on(self, call: usize) -> Self {
        self.state().fail_on.push(call);
        self
    }

    /// Accept only the first `accepted` bytes of the `call`-th write.
    pub fn short_write_on(self, call: usize, accepted: usize) -> Self {
        self.state().short_on.push((call, accepted));
        self
    }

    /// Panic inside the `call`-th write.
    pub fn panic_on(self, call: usize) -> Self {
        self.state().panic_on.push(call);
        self
    }

    /// Block the `call`-th write for `delay` of wall-clock time.
    pub fn delay_on(self, call: usize, delay: Duration) -> Self {
        self.state().delay_on.push((call, delay));
        self
    }

    /// Start and end of every completed write call, in wall-clock time.
    pub fn call_times(&self) -> Vec<(Instant, Instant)> {
        self.state().calls.clone()
    }

    /// Payloads that were (at least partly) accepted, in order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state().writes.clone()
    }

    /// All accepted bytes concatenated.
    pub fn bytes(&self) -> Vec<u8> {
        self.state().writes.concat()
    }

    /// Number of write calls, including failed ones.
    pub fn attempts(&self) -> usize {
        self.state().attempts
    }

    pub fn flushes(&self) -> usize {
        self.state().flushes
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MockTransport {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let started = Instant::now();
        let mut state = self.state();
        state.attempts += 1;
        let call = state.attempts;

        let delay = state
            .delay_on
            .iter()
            .find(|(c, _)| *c == call)
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            drop(state);
            thread::sleep(delay);
            state = self.state();
        }

        if state.panic_on.contains(&call) {
            drop(state);
            panic!("mock transport panicked on write {}", call);
        }

        if state.fail_on.contains(&call) {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("mock write {} failed", call),
            ));
        }

        let accepted = state
            .short_on
            .iter()
            .find(|(c, _)| *c == call)
            .map_or(bytes.len(), |(_, n)| (*n).min(bytes.len()));

        state.writes.push(bytes[..accepted].to_vec());
        state.calls.push((started, Instant::now()));
        Ok(accepted)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state().flushes += 1;
        Ok(())
    }
}
