//! # Printer Module
//!
//! The [`Printer`] is the only path by which bytes reach the device. Every
//! write waits on the [`ThrottleController`], goes to the transport, and has
//! its byte count reported back so the next write is held off until the
//! device has caught up.
//!
//! ## Modules
//!
//! - [`config`]: Timing and layout configuration
//!
//! ## Example
//!
//! ```no_run
//! use thermoprint::printer::{Printer, PrinterConfig};
//! use thermoprint::transport::DeviceTransport;
//!
//! # async fn example() -> Result<(), thermoprint::error::ThermoprintError> {
//! let transport = DeviceTransport::open("/dev/serial0")?;
//! let printer = Printer::new(transport, PrinterConfig::DEFAULT);
//!
//! printer.write_line("Hello, paper!").await?;
//! printer.feed(3).await?;
//! printer.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;

pub use config::PrinterConfig;

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{error, trace, warn};

use crate::encoding::{CharEncoder, Utf8Encoder};
use crate::error::ThermoprintError;
use crate::protocol::commands;
use crate::throttle::ThrottleController;
use crate::transport::Transport;

/// # Paced Printer
///
/// Owns the transport, the write throttle and the column counter.
///
/// All operations take `&self`, so a printer can be shared between tasks
/// behind an `Arc`. Writes from one task complete in the order they were
/// issued. Writes from different tasks are admitted one at a time in no
/// particular order.
///
/// Waiting for admission has no timeout. Dropping a write future while it
/// waits gives up its place without side effects. Once admitted, a write runs
/// on its own task: dropping the future lets it finish in the background, and
/// the bytes it actually wrote still hold the gate closed for their full
/// pacing delay.
pub struct Printer<T, E = Utf8Encoder> {
    transport: Arc<Mutex<T>>,
    encoder: E,
    throttle: ThrottleController,
    config: PrinterConfig,
    column: AtomicUsize,
}

impl<T: Transport> Printer<T> {
    /// Create a printer that encodes text as UTF-8.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(transport: T, config: PrinterConfig) -> Self {
        Self::with_encoder(transport, Utf8Encoder, config)
    }
}

impl<T: Transport, E: CharEncoder> Printer<T, E> {
    /// Create a printer with a custom character encoder.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn with_encoder(transport: T, encoder: E, config: PrinterConfig) -> Self {
        Self {
            transport: Arc::new(Mutex::new(transport)),
            encoder,
            throttle: ThrottleController::new(config.per_byte_wait),
            config,
            column: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Current horizontal print position in characters.
    pub fn column(&self) -> usize {
        self.column.load(Ordering::Relaxed)
    }

    /// Send raw bytes to the device once the throttle admits the write.
    ///
    /// Returns the number of bytes the transport accepted. A short count is
    /// not an error: it is logged, returned, and used for pacing. A transport
    /// error is returned unchanged after the throttle has been told that
    /// nothing was written.
    pub async fn write_raw(&self, bytes: &[u8]) -> Result<usize, ThermoprintError> {
        let admission = self.throttle.await_admission().await?;
        let transport = Arc::clone(&self.transport);
        let bytes = bytes.to_vec();

        // Detached from the caller so the real count is reported even if the
        // caller stops waiting.
        let cycle = tokio::spawn(async move {
            let result = transport_write(transport, bytes).await;
            let written = match &result {
                Ok(n) => *n,
                Err(_) => 0,
            };
            admission.report_written(written).await;
            result
        });

        cycle
            .await
            .map_err(|e| ThermoprintError::TransportPanic(join_message(e)))?
    }

    /// Print text one character per write, tracking the column.
    ///
    /// Stops at the first failed character and returns its error. Characters
    /// already sent stay printed.
    pub async fn write(&self, text: &str) -> Result<(), ThermoprintError> {
        for ch in text.chars() {
            let bytes = self.encoder.encode_char(ch);
            self.write_raw(&bytes).await?;
            self.advance_column(ch);
            trace!(?ch, column = self.column(), "wrote character");
        }
        Ok(())
    }

    /// Print text followed by a newline.
    pub async fn write_line(&self, text: &str) -> Result<(), ThermoprintError> {
        self.write(text).await?;
        self.write("\n").await
    }

    /// Feed the paper `lines` lines.
    pub async fn feed(&self, lines: u8) -> Result<(), ThermoprintError> {
        self.write_raw(&commands::feed_lines(lines)).await?;
        Ok(())
    }

    /// Reinitialize the printer and reset the column.
    pub async fn reset(&self) -> Result<(), ThermoprintError> {
        self.write_raw(&commands::init()).await?;
        self.column.store(0, Ordering::Relaxed);
        Ok(())
    }

    /// Flush the transport, stop the throttle and release the device.
    ///
    /// The throttle is stopped even when the flush fails.
    pub async fn close(self) -> Result<(), ThermoprintError> {
        let Self {
            transport,
            mut throttle,
            ..
        } = self;

        let flushed = tokio::task::spawn_blocking(move || lock(&transport).flush())
            .await
            .map_err(|e| ThermoprintError::TransportPanic(join_message(e)));

        throttle.shutdown().await;

        flushed??;
        Ok(())
    }

    fn advance_column(&self, ch: char) {
        let max_column = self.config.max_column;
        let newline = ch == char::from(commands::LF);
        // The closure always returns Some, so the update cannot fail.
        let _ = self
            .column
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |column| {
                Some(if newline || column >= max_column {
                    0
                } else {
                    column + 1
                })
            });
    }
}

/// Run the blocking transport write off the executor.
async fn transport_write<T: Transport>(
    transport: Arc<Mutex<T>>,
    bytes: Vec<u8>,
) -> Result<usize, ThermoprintError> {
    let requested = bytes.len();

    let written = tokio::task::spawn_blocking(move || lock(&transport).write(&bytes))
        .await
        .map_err(|e| {
            let msg = join_message(e);
            error!(error = %msg, "transport panicked during write");
            ThermoprintError::TransportPanic(msg)
        })??;

    if written < requested {
        warn!(requested, written, "short write to transport");
    }
    Ok(written)
}

/// Lock the transport, recovering it if an earlier write panicked.
fn lock<T>(transport: &Mutex<T>) -> MutexGuard<'_, T> {
    transport.lock().unwrap_or_else(|poisoned| {
        warn!("transport lock poisoned by an earlier panic, recovering");
        poisoned.into_inner()
    })
}

fn join_message(e: tokio::task::JoinError) -> String {
    if e.is_panic() {
        panic_message(e.into_panic())
    } else {
        e.to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================
