//! # Character Encoding
//!
//! Turns a single logical character into the bytes the device expects on the
//! wire. The printer writes text one character at a time, so encoders work
//! per `char` rather than per string.
//!
//! - [`Utf8Encoder`]: UTF-8 bytes, for devices that decode UTF-8 themselves
//! - [`AsciiEncoder`]: 7-bit ASCII, anything else becomes `?`

use tracing::warn;

/// Converts one character into its on-the-wire byte form.
pub trait CharEncoder: Send + Sync {
    fn encode_char(&self, ch: char) -> Vec<u8>;
}

/// Passes characters through as UTF-8.
#[derive(Debug, Default, Clone, Copy)]
pub struct Utf8Encoder;

impl CharEncoder for Utf8Encoder {
    fn encode_char(&self, ch: char) -> Vec<u8> {
        let mut buf = [0u8; 4];
        ch.encode_utf8(&mut buf).as_bytes().to_vec()
    }
}

/// Encodes ASCII as-is and replaces everything else with `?`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiEncoder;

impl CharEncoder for AsciiEncoder {
    fn encode_char(&self, ch: char) -> Vec<u8> {
        if ch.is_ascii() {
            vec![ch as u8]
        } else {
            warn!(?ch, code = ch as u32, "unmapped character, replacing with '?'");
            vec![b'?']
        }
    }
}
