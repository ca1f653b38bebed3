//! # Device Node Transport
//!
//! Writes to a printer exposed as a device node, such as a serial port
//! (`/dev/serial0`, `/dev/ttyUSB0`) or a USB printer (`/dev/usb/lp0`).
//!
//! The node must already be configured (baud rate, raw mode) before it is
//! opened here, e.g. with `stty -F /dev/serial0 19200 raw -echo`.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use super::Transport;
use crate::error::ThermoprintError;

/// Default serial device path
pub const DEFAULT_DEVICE: &str = "/dev/serial0";

/// # Device Node Transport
///
/// ## Example
///
/// ```no_run
/// use thermoprint::transport::{DeviceTransport, Transport};
///
/// let mut transport = DeviceTransport::open("/dev/ttyUSB0")?;
/// transport.write(b"hello\n")?;
///
/// # Ok::<(), thermoprint::error::ThermoprintError>(())
/// ```
#[derive(Debug)]
pub struct DeviceTransport {
    file: File,
}

impl DeviceTransport {
    /// Open the device for writing.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The device doesn't exist
    /// - Permission denied (may need the dialout or lp group)
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, ThermoprintError> {
        let path = device.as_ref();

        let file = OpenOptions::new().write(true).open(path).map_err(|e| {
            ThermoprintError::Transport(format!("Failed to open {}: {}", path.display(), e))
        })?;
        debug!(device = %path.display(), "opened printer device");

        Ok(Self { file })
    }

    /// Open with default device path (/dev/serial0)
    pub fn open_default() -> Result<Self, ThermoprintError> {
        Self::open(DEFAULT_DEVICE)
    }
}

impl Transport for DeviceTransport {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.file.write(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

// ============================================================================
// TESTS
// ============================================================================
