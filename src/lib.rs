//! # Thermoprint - Paced Writes for Thermal Printers
//!
//! A thermal printer needs time to physically print a character or feed paper
//! before it can take the next command. Writing faster than that corrupts
//! output or drops commands. Thermoprint lets callers write as fast as they
//! like while the device only ever receives bytes at a pace it can follow.
//!
//! - **Throttle**: an admission gate reopened by a timer whose duration is
//!   derived from the size of the previous write
//! - **Printer**: raw writes, per-character text writes with column
//!   tracking, and line feeds, all routed through the throttle
//! - **Transport**: blocking byte sinks (device nodes, in-memory mock)
//!
//! ## Quick Start
//!
//! ```no_run
//! use thermoprint::{Printer, PrinterConfig, transport::DeviceTransport};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), thermoprint::ThermoprintError> {
//! let transport = DeviceTransport::open("/dev/serial0")?;
//! let printer = Printer::new(transport, PrinterConfig::DEFAULT);
//!
//! printer.write("Order #42\n").await?;
//! printer.feed(4).await?;
//! printer.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`throttle`] | Admission gate and deadline timer |
//! | [`printer`] | Paced printer and configuration |
//! | [`protocol`] | Command byte builders |
//! | [`encoding`] | Character encoders |
//! | [`transport`] | Communication backends |
//! | [`error`] | Error types |

pub mod encoding;
pub mod error;
pub mod printer;
pub mod protocol;
pub mod throttle;
pub mod transport;

// Re-exports for convenience
pub use error::ThermoprintError;
pub use printer::{Printer, PrinterConfig};
pub use transport::{DeviceTransport, Transport};
