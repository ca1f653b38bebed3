//! # Error Types
//!
//! This module defines error types used throughout the thermoprint library.

use thiserror::Error;

/// Main error type for thermoprint operations
#[derive(Debug, Error)]
pub enum ThermoprintError {
    /// Device write or flush failed. The transport's error is kept as-is.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Opening or preparing the transport failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// The transport panicked while writing
    #[error("Transport panicked during write: {0}")]
    TransportPanic(String),

    /// The write pacing loop has been shut down
    #[error("Printer is closed")]
    Closed,

    /// Invalid or unreadable configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}
