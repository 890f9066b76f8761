//! APCI (Application Protocol Control Information) Module
//!
//! This module implements the framing layer that sits between a byte-stream transport and
//! the application data units of a substation client. Every APDU starts with a fixed
//! six-byte APCI header:
//!
//! ```text
//! |              APCI                      |   ASDU    |
//! | start | length | control field (4)     |           |
//! | 0x68  |  4..253| ctrl1 ctrl2 ctrl3 ctrl4| 0..249   |
//! ```
//!
//! The length byte counts the control field plus the ASDU, so an APDU is never longer than
//! 255 bytes.
//!
//! # Overview
//!
//! - [`frame`]: the I/S/U frame model and Unnumbered control functions
//! - [`seq`]: 15-bit sequence numbers and the session's sequence counter
//! - [`codec`]: header encoding and decoding
//! - [`assembler`]: cutting a raw byte stream into complete APDUs
//!
//! # Example
//!
//! ```
//! use iec61850_rs::apci::{codec, Frame, SeqNr};
//!
//! let apdu = codec::encode_information(SeqNr::new(1), SeqNr::new(2), &[0x64, 0x01]).unwrap();
//! let (frame, asdu) = codec::decode(&apdu).unwrap();
//! assert_eq!(frame, Frame::information(SeqNr::new(1), SeqNr::new(2)));
//! assert_eq!(asdu, &[0x64, 0x01]);
//! ```

use thiserror::Error;

pub mod assembler;
pub mod codec;
pub mod frame;
pub mod seq;

pub use assembler::{Apdu, ApduAssembler};
pub use frame::{ControlFunction, Frame, FrameType};
pub use seq::{pack_seq, unpack_seq, SeqNr, SequenceCounter};

/// Start byte of every APDU
pub const START_BYTE: u8 = 0x68;

/// Size of the control field
pub const APCI_CTL_FIELD_SIZE: usize = 4;

/// Size of the full APCI header: start, length and control field
pub const APCI_HEADER_SIZE: usize = 2 + APCI_CTL_FIELD_SIZE;

/// Maximum APDU size: start(1) + length(1) + control field(4) + ASDU
pub const APDU_SIZE_MAX: usize = 255;

/// Maximum ASDU carried by one Information frame
pub const ASDU_SIZE_MAX: usize = APDU_SIZE_MAX - APCI_HEADER_SIZE;

/// Maximum value of the length byte: control field(4) + ASDU
pub const APDU_FIELD_SIZE_MAX: usize = APCI_CTL_FIELD_SIZE + ASDU_SIZE_MAX;

/// Result type for APCI operations
pub type Result<T> = std::result::Result<T, ApciError>;

/// Errors raised by the APCI codec and sequence counter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApciError {
    /// The header could not be read
    #[error("malformed APCI header: {0}")]
    MalformedHeader(HeaderFault),

    /// An Information frame's ASDU exceeds the protocol maximum
    #[error("ASDU of {size} bytes exceeds maximum of {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// The peer acknowledged a frame outside the outstanding window
    #[error(
        "sequence regression: peer acknowledged {received}, last acknowledged {acknowledged}, next send {next_send}"
    )]
    SequenceRegression {
        received: SeqNr,
        acknowledged: SeqNr,
        next_send: SeqNr,
    },

    /// The peer's send sequence is not the one expected next
    #[error("unexpected send sequence {received}, expected {expected}")]
    SequenceMismatch { expected: SeqNr, received: SeqNr },
}

/// Reason an APCI header was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeaderFault {
    /// Fewer bytes than a full header
    #[error("need {needed} bytes, only {available} available")]
    Truncated { needed: usize, available: usize },

    /// The first byte is not the start byte
    #[error("start byte 0x{0:02X}, expected 0x68")]
    BadStartByte(u8),

    /// The length byte is outside 4..=253
    #[error("length field {0} outside {min}..={max}", min = APCI_CTL_FIELD_SIZE, max = APDU_FIELD_SIZE_MAX)]
    BadLength(u8),

    /// More bytes than the length byte declares
    #[error("length field declares {declared} bytes, got {actual}")]
    TrailingBytes { declared: usize, actual: usize },
}

impl From<HeaderFault> for ApciError {
    fn from(fault: HeaderFault) -> Self {
        ApciError::MalformedHeader(fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_constants() {
        assert_eq!(APCI_HEADER_SIZE, 6);
        assert_eq!(ASDU_SIZE_MAX, 249);
        assert_eq!(APDU_FIELD_SIZE_MAX, 253);
    }

    #[test]
    fn test_error_display() {
        let err = ApciError::PayloadTooLarge { size: 250, max: 249 };
        assert_eq!(err.to_string(), "ASDU of 250 bytes exceeds maximum of 249");

        let err = ApciError::from(HeaderFault::BadStartByte(0x10));
        assert_eq!(
            err.to_string(),
            "malformed APCI header: start byte 0x10, expected 0x68"
        );

        let err = ApciError::from(HeaderFault::BadLength(2));
        assert_eq!(
            err.to_string(),
            "malformed APCI header: length field 2 outside 4..=253"
        );
    }
}
