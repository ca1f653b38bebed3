//! # Protocol Implementation
//!
//! Low-level command builders for the commands the printer sends itself.
//!
//! ## Module Structure
//!
//! - [`commands`]: Initialization and line feed
//!
//! ## Usage Example
//!
//! ```
//! use thermoprint::protocol::commands;
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(b"RECEIPT\n");
//! data.extend(commands::feed_lines(3));
//!
//! assert_eq!(&data[data.len() - 3..], &[0x1B, 0x64, 0x03]);
//! ```

pub mod commands;
