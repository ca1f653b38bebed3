//! # Printer Configuration
//!
//! Timing and layout parameters for the paced write pipeline.
//!
//! ## Defaults
//!
//! | Setting | Value | Meaning |
//! |---------|-------|---------|
//! | baud_rate | 19200 | Serial line rate |
//! | per_byte_wait | 573 µs | Time the device needs per byte written |
//! | max_column | 32 | Characters per printed line |
//!
//! ## Per-Byte Wait
//!
//! A byte on a serial line costs one frame: start bit, 8 data bits, stop bit,
//! plus one bit of idle margin. The wait is derived from that 11-bit frame:
//!
//! ```text
//! per_byte_wait = 11 bits / baud_rate
//!
//! At 19200 baud:
//!   11 / 19200 s ≈ 573 µs
//! ```
//!
//! ## Config File
//!
//! Settings can be overridden from a JSON file; any key may be omitted.
//!
//! ```json
//! { "baud_rate": 9600, "per_byte_wait_us": 1200, "max_column": 48 }
//! ```
//!
//! An explicit `per_byte_wait_us` wins over the value derived from `baud_rate`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ThermoprintError;

/// Bits per serial frame used to derive the per-byte wait.
const BITS_PER_BYTE: u64 = 11;

/// # Printer Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterConfig {
    /// Time the device needs to act on one byte
    pub per_byte_wait: Duration,

    /// Width of the print head in characters
    pub max_column: usize,

    /// Serial line rate the per-byte wait was derived from
    pub baud_rate: u32,
}

impl PrinterConfig {
    /// # Default Configuration
    ///
    /// 58mm receipt printer on a 19200 baud serial line, 32 columns.
    pub const DEFAULT: Self = Self::from_baud(19200, 32);

    /// Build a configuration from a line rate, deriving the per-byte wait.
    ///
    /// A baud rate of `0` yields a zero wait, which disables pacing.
    ///
    /// ## Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use thermoprint::printer::PrinterConfig;
    ///
    /// let config = PrinterConfig::from_baud(19200, 32);
    /// assert_eq!(config.per_byte_wait, Duration::from_micros(573));
    /// ```
    pub const fn from_baud(baud_rate: u32, max_column: usize) -> Self {
        Self {
            per_byte_wait: per_byte_wait_for_baud(baud_rate),
            max_column,
            baud_rate,
        }
    }

    /// Replace the per-byte wait.
    pub fn with_per_byte_wait(mut self, per_byte_wait: Duration) -> Self {
        self.per_byte_wait = per_byte_wait;
        self
    }

    /// Replace the column width.
    pub fn with_max_column(mut self, max_column: usize) -> Self {
        self.max_column = max_column;
        self
    }

    /// Load a JSON config file and apply it over the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ThermoprintError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ThermoprintError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let file: ConfigFile = serde_json::from_str(&contents).map_err(|e| {
            ThermoprintError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        let config = file.apply(Self::DEFAULT);
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the printer cannot work with.
    pub fn validate(&self) -> Result<(), ThermoprintError> {
        if self.max_column == 0 {
            return Err(ThermoprintError::Config(
                "max_column must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The file form of this configuration.
    pub fn to_file(&self) -> ConfigFile {
        ConfigFile {
            baud_rate: Some(self.baud_rate),
            per_byte_wait_us: Some(self.per_byte_wait.as_micros() as u64),
            max_column: Some(self.max_column),
        }
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-byte wait for one serial frame, rounded to the nearest microsecond.
pub const fn per_byte_wait_for_baud(baud_rate: u32) -> Duration {
    if baud_rate == 0 {
        return Duration::ZERO;
    }
    let baud = baud_rate as u64;
    Duration::from_micros((BITS_PER_BYTE * 1_000_000 + baud / 2) / baud)
}

// ============================================================================
// CONFIG FILE
// ============================================================================

/// Serialized configuration overrides. Missing keys keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baud_rate: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_byte_wait_us: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_column: Option<usize>,
}

impl ConfigFile {
    /// Apply these overrides on top of `base`.
    pub fn apply(&self, base: PrinterConfig) -> PrinterConfig {
        let mut config = base;

        if let Some(baud) = self.baud_rate {
            config.baud_rate = baud;
            config.per_byte_wait = per_byte_wait_for_baud(baud);
        }
        if let Some(us) = self.per_byte_wait_us {
            config.per_byte_wait = Duration::from_micros(us);
        }
        if let Some(columns) = self.max_column {
            config.max_column = columns;
        }

        config
    }
}

// ============================================================================
// TESTS
// ============================================================================
