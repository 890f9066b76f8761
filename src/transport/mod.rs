//! Transport Integration Module
//!
//! The APCI codec never touches a socket. This module defines the seam through which a
//! session owner connects it to one, and a small endpoint helper that keeps the sequence
//! counter consistent with the frames actually sent and received.
//!
//! # Overview
//!
//! - [`Transport`]: a byte-stream collaborator. Anything implementing `Read + Write`
//!   (an already connected `TcpStream`, for instance) is a transport.
//! - [`ApciConfig`]: flow-control parameters `k` and `w`.
//! - [`ApciEndpoint`]: sends U/S/I frames and decodes incoming APDUs.
//!
//! Connection establishment, T1/T2/T3 timers and reconnection are left to the session
//! owner. The endpoint has no states of its own.
//!
//! # Example
//!
//! ```no_run
//! use std::net::TcpStream;
//! use iec61850_rs::transport::{ApciConfig, ApciEndpoint};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = TcpStream::connect("10.0.0.4:102")?;
//! let mut endpoint = ApciEndpoint::connect(stream, ApciConfig::default())?;
//!
//! while let Some(apdu) = endpoint.poll()? {
//!     println!("received {}", apdu);
//! }
//! # Ok(())
//! # }
//! ```

use std::io::{self, Read, Write};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::apci::ApciError;

pub mod endpoint;

pub use endpoint::ApciEndpoint;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur in transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Framing or sequence error from the APCI layer
    #[error(transparent)]
    Apci(#[from] ApciError),

    /// `k` Information frames are outstanding
    #[error("send window full: {k} unacknowledged frames")]
    WindowFull { k: u16 },

    /// The peer closed the stream
    #[error("transport closed by peer")]
    Closed,

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// A byte-stream transport
///
/// `send` must write the whole buffer. `recv` returns the number of bytes read; zero means
/// the peer closed the stream.
pub trait Transport {
    /// Write one fully encoded APDU
    fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read available bytes into `buf`
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<S: Read + Write> Transport for S {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.write_all(data)?;
        self.flush()
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }
}

/// Flow-control parameters of an APCI session
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ApciConfig {
    /// Maximum number of unacknowledged Information frames in flight
    pub k: u16,
    /// Acknowledge after receiving this many Information frames
    pub w: u16,
    /// Size of the buffer handed to [`Transport::recv`]
    pub read_buffer_size: usize,
}

impl Default for ApciConfig {
    fn default() -> Self {
        Self {
            k: 12,
            w: 8,
            read_buffer_size: 1024,
        }
    }
}

impl ApciConfig {
    /// Check the parameters: `k` and `w` non-zero, `w <= k`, `k` below the sequence space
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 || self.w == 0 {
            return Err(TransportError::InvalidConfiguration(
                "k and w must be non-zero".into(),
            ));
        }
        if self.w > self.k {
            return Err(TransportError::InvalidConfiguration(format!(
                "w ({}) must not exceed k ({})",
                self.w, self.k
            )));
        }
        if u32::from(self.k) >= crate::apci::seq::SEQ_MODULUS {
            return Err(TransportError::InvalidConfiguration(format!(
                "k ({}) must be below 32768",
                self.k
            )));
        }
        if self.read_buffer_size == 0 {
            return Err(TransportError::InvalidConfiguration(
                "read buffer size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
