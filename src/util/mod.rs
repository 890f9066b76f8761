//! Utility Functions Module
//!
//! Debugging helpers shared by the demo and by trace logging.
//!
//! # Example
//!
//! ```
//! use iec61850_rs::util::hex_dump;
//!
//! let dump = hex_dump(&[0x68, 0x04, 0x07, 0x00, 0x00, 0x00], "  ");
//! assert!(dump.starts_with("  0000: 68 04 07 00 00 00"));
//! ```

use core::fmt::Write;

use crate::apci::{APCI_HEADER_SIZE, START_BYTE};

/// Hex dump utility for debugging
pub fn hex_dump(data: &[u8], prefix: &str) -> String {
    let mut result = String::new();

    for (i, chunk) in data.chunks(16).enumerate() {
        result.push_str(prefix);
        let _ = write!(result, "{:04X}: ", i * 16);

        // Hex bytes
        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                result.push(' ');
            }
            let _ = write!(result, "{:02X} ", byte);
        }

        // Padding
        for j in chunk.len()..16 {
            if j == 8 {
                result.push(' ');
            }
            result.push_str("   ");
        }

        result.push_str(" |");

        // ASCII representation
        for byte in chunk {
            if byte.is_ascii_graphic() || *byte == b' ' {
                result.push(*byte as char);
            } else {
                result.push('.');
            }
        }

        result.push_str("|\n");
    }

    result
}

/// Render an APDU with its header fields split out
///
/// `68 04 | 07 00 00 00 | ...` with the ASDU, if any, after the second bar. Input that does
/// not start with a full header is rendered as plain hex.
pub fn format_apdu_structure(data: &[u8]) -> String {
    if data.len() < APCI_HEADER_SIZE || data[0] != START_BYTE {
        return hex::encode(data);
    }

    let mut out = format!(
        "{} | {}",
        hex::encode(&data[..2]),
        hex::encode(&data[2..APCI_HEADER_SIZE])
    );
    if data.len() > APCI_HEADER_SIZE {
        out.push_str(" | ");
        out.push_str(&hex::encode(&data[APCI_HEADER_SIZE..]));
    }
    out
}
