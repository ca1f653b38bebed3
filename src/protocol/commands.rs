//! # Printer Commands
//!
//! Byte builders for the handful of ESC/POS-style commands the write
//! pipeline sends on its own. Everything else reaching the device is
//! plain character data.
//!
//! ## Escape Sequence Structure
//!
//! - Two bytes: `ESC @`
//! - Three bytes with a single-byte parameter: `ESC d n`

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

// ============================================================================
// INITIALIZATION COMMANDS
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and resets text formatting to power-on defaults.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
///
/// ## Example
///
/// ```
/// use thermoprint::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

// ============================================================================
// PAPER FEED COMMANDS
// ============================================================================

/// # Feed Lines (ESC d n)
///
/// Prints the line buffer and feeds the paper forward by `n` lines.
///
/// ## Protocol Details
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC d n  |
/// | Hex     | 1B 64 n  |
/// | Decimal | 27 100 n |
///
/// ## Parameters
///
/// - `n`: Number of lines to feed (0-255)
///
/// ## Example
///
/// ```
/// use thermoprint::protocol::commands;
///
/// assert_eq!(commands::feed_lines(5), vec![0x1B, 0x64, 0x05]);
/// ```
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

// ============================================================================
// TESTS
// ============================================================================
