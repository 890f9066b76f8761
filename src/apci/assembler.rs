//! APDU Stream Assembly
//!
//! A TCP transport delivers bytes in arbitrary chunks. The assembler buffers them and hands
//! out one complete APDU at a time, using the length byte of each header to find the frame
//! boundary.
//!
//! # Recovery
//!
//! A stream that does not start with `0x68` has lost framing. The assembler discards bytes
//! up to the next start byte and reports [`HeaderFault::BadStartByte`]; a header with an
//! impossible length has its start byte dropped and reports [`HeaderFault::BadLength`]. The
//! session owner decides whether to continue or drop the connection.

use core::fmt;

use bytes::{Buf, Bytes, BytesMut};
use log::{trace, warn};

use crate::apci::{
    codec, Frame, HeaderFault, Result, APCI_CTL_FIELD_SIZE, APCI_HEADER_SIZE,
    APDU_FIELD_SIZE_MAX, APDU_SIZE_MAX, START_BYTE,
};

/// A complete, decoded APDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apdu {
    /// Control field
    pub frame: Frame,
    /// Application data following the header (empty for S- and U-frames)
    pub asdu: Bytes,
}

impl Apdu {
    /// Decode an APDU whose length byte matches `data` exactly
    ///
    /// # Errors
    ///
    /// Header faults from [`codec::decode`], [`HeaderFault::Truncated`] when the ASDU is
    /// shorter than declared and [`HeaderFault::TrailingBytes`] when `data` runs past it.
    pub fn from_bytes(data: Bytes) -> Result<Self> {
        let (frame, _) = codec::decode(&data)?;
        let declared = 2 + data[1] as usize;
        if data.len() < declared {
            return Err(HeaderFault::Truncated {
                needed: declared,
                available: data.len(),
            }
            .into());
        }
        if data.len() > declared {
            return Err(HeaderFault::TrailingBytes {
                declared,
                actual: data.len(),
            }
            .into());
        }
        let asdu = data.slice(APCI_HEADER_SIZE..);
        Ok(Self { frame, asdu })
    }
}

impl fmt::Display for Apdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.asdu.is_empty() {
            write!(f, "{}", self.frame)
        } else {
            write!(f, "{} asdu={}", self.frame, hex::encode(&self.asdu))
        }
    }
}

/// Reassembles APDUs from a byte stream
#[derive(Debug, Default)]
pub struct ApduAssembler {
    buffer: BytesMut,
}

impl ApduAssembler {
    /// Create an empty assembler
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(APDU_SIZE_MAX),
        }
    }

    /// Append bytes received from the transport
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Number of bytes waiting for a complete APDU
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drop all buffered bytes
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Take the next complete APDU, if one is buffered
    ///
    /// Returns `Ok(None)` while more bytes are needed.
    pub fn next_apdu(&mut self) -> Result<Option<Apdu>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let first = self.buffer[0];
        if first != START_BYTE {
            let skip = self
                .buffer
                .iter()
                .position(|&b| b == START_BYTE)
                .unwrap_or(self.buffer.len());
            warn!("discarding {} bytes before start byte", skip);
            self.buffer.advance(skip);
            return Err(HeaderFault::BadStartByte(first).into());
        }

        if self.buffer.len() < 2 {
            return Ok(None);
        }

        let length = self.buffer[1];
        if !(APCI_CTL_FIELD_SIZE..=APDU_FIELD_SIZE_MAX).contains(&(length as usize)) {
            warn!("invalid APDU length {}, resynchronising", length);
            self.buffer.advance(1);
            return Err(HeaderFault::BadLength(length).into());
        }

        let total = 2 + length as usize;
        if self.buffer.len() < total {
            trace!("waiting for {} more bytes", total - self.buffer.len());
            return Ok(None);
        }

        let data = self.buffer.split_to(total).freeze();
        Apdu::from_bytes(data).map(Some)
    }
}
