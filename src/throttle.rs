//! # Write Throttle
//!
//! Paces writes to a mechanical device so that a new command is only sent
//! once the previous one has had time to physically complete.
//!
//! ## How It Works
//!
//! A [`ThrottleController`] owns two pieces of state for its whole lifetime:
//!
//! - **Admission gate**: a single-slot channel. A pending `()` in the slot
//!   means the next write may proceed. There is never more than one.
//! - **Deadline timer**: a background tokio task holding a resettable
//!   [`Sleep`](tokio::time::Sleep). When it fires, the gate is opened.
//!
//! ```text
//!   caller                         timer task
//!   ──────                         ──────────
//!   await_admission() ◄── open ─── sleep fires
//!   transport.write(bytes)
//!   report_written(n) ─── n ─────► sleep.reset(now + n × per_byte_wait)
//! ```
//!
//! The timer starts armed at zero, so the first write after construction is
//! never delayed. A report of `0` (failed write) reopens the gate immediately.
//!
//! ## Limitations
//!
//! Waiting for admission has no timeout: a device has no hard upper bound on
//! mechanical latency. Concurrent callers are admitted in whatever order they
//! win the gate lock; there is no fairness guarantee across tasks.

use std::time::Duration;

use tokio::sync::{Mutex, mpsc, mpsc::error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use crate::error::ThermoprintError;

/// Horizon used when a computed deadline would overflow the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Gates writes behind a deadline derived from the size of the previous write.
///
/// Must be created inside a tokio runtime; the timer loop is spawned on it.
/// Dropping the controller aborts the loop, [`shutdown`](Self::shutdown)
/// stops it gracefully.
pub struct ThrottleController {
    gate: Mutex<mpsc::Receiver<()>>,
    reports: Option<mpsc::Sender<usize>>,
    task: Option<JoinHandle<()>>,
    per_byte_wait: Duration,
}

impl ThrottleController {
    /// Start the timer loop with the given per-byte wait.
    ///
    /// A `per_byte_wait` of zero disables pacing.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(per_byte_wait: Duration) -> Self {
        let (gate_tx, gate_rx) = mpsc::channel(1);
        let (report_tx, report_rx) = mpsc::channel(1);
        let task = tokio::spawn(run_timer(per_byte_wait, gate_tx, report_rx));

        Self {
            gate: Mutex::new(gate_rx),
            reports: Some(report_tx),
            task: Some(task),
            per_byte_wait,
        }
    }

    pub fn per_byte_wait(&self) -> Duration {
        self.per_byte_wait
    }

    /// Wait until the gate is open and take the pending admission.
    ///
    /// Callers arriving while the gate is closed queue on it; they are never
    /// rejected. Fails with [`ThermoprintError::Closed`] after shutdown.
    pub async fn await_admission(&self) -> Result<Admission, ThermoprintError> {
        let reports = self.reports.clone().ok_or(ThermoprintError::Closed)?;

        let mut gate = self.gate.lock().await;
        gate.recv().await.ok_or(ThermoprintError::Closed)?;
        trace!("write admitted");

        Ok(Admission {
            reports: Some(reports),
        })
    }

    /// Stop the timer loop and wait for it to exit.
    pub async fn shutdown(&mut self) {
        // Closing the report queue ends the loop.
        self.reports = None;

        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            debug!(error = %e, "write throttle exited abnormally");
        }
    }
}

impl Drop for ThrottleController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Permission to perform exactly one write.
///
/// Hand the number of bytes actually written back with
/// [`report_written`](Self::report_written). An admission dropped without a
/// report counts as a failed write (`0` bytes), so the gate always reopens.
#[must_use = "an admission must be reported back with the number of bytes written"]
pub struct Admission {
    reports: Option<mpsc::Sender<usize>>,
}

impl Admission {
    /// Reschedule the gate to reopen after `written × per_byte_wait`.
    pub async fn report_written(mut self, written: usize) {
        if let Some(reports) = self.reports.take() {
            // Only fails once the loop is gone, and then there is no gate to reopen.
            let _ = reports.send(written).await;
        }
    }
}

impl Drop for Admission {
    fn drop(&mut self) {
        if let Some(reports) = self.reports.take() {
            debug!("admission dropped without a report, reopening gate");
            let _ = reports.try_send(0);
        }
    }
}

/// Time the device needs to act on `written` bytes.
pub fn wait_for(per_byte_wait: Duration, written: usize) -> Duration {
    let written = u32::try_from(written).unwrap_or(u32::MAX);
    per_byte_wait.saturating_mul(written)
}

fn deadline_after(wait: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(wait).unwrap_or_else(|| now + FAR_FUTURE)
}

/// The timer loop. Runs until the report queue or the gate is closed.
async fn run_timer(
    per_byte_wait: Duration,
    gate: mpsc::Sender<()>,
    mut reports: mpsc::Receiver<usize>,
) {
    let sleep = time::sleep(Duration::ZERO);
    tokio::pin!(sleep);
    let mut armed = true;

    loop {
        tokio::select! {
            () = &mut sleep, if armed => {
                armed = false;
                match gate.try_send(()) {
                    // Full means a signal is already pending: the gate is open.
                    Ok(()) | Err(TrySendError::Full(())) => trace!("write gate open"),
                    Err(TrySendError::Closed(())) => break,
                }
            }
            report = reports.recv() => {
                let Some(written) = report else { break };
                let wait = wait_for(per_byte_wait, written);
                sleep.as_mut().reset(deadline_after(wait));
                armed = true;
                debug!(written, ?wait, "write gate rescheduled");
            }
        }
    }

    debug!("write throttle stopped");
}

// ============================================================================
// TESTS
// ============================================================================
