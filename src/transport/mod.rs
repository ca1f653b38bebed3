//! # Printer Transport Layer
//!
//! This module provides the byte sinks that carry data to the printer.
//!
//! ## Available Transports
//!
//! - [`device`]: A device node (serial port, USB printer class) opened as a file
//! - [`mock`]: In-memory recorder with failure injection, for tests
//!
//! Transports are blocking. The printer calls them off the async executor and
//! never touches one except through its paced write path.

pub mod device;
pub mod mock;

use std::io;

pub use device::DeviceTransport;
pub use mock::MockTransport;

/// A blocking byte sink connected to the printer.
pub trait Transport: Send + 'static {
    /// Write some of `bytes`, returning how many were accepted.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Push any buffered bytes out to the device.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
