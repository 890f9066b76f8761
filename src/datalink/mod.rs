//! Link-Layer Packing Module
//!
//! GOOSE and Sampled Values messages bypass TCP/IP entirely and are multicast as raw
//! Ethernet frames. This module wraps an application payload that has already been encoded
//! into such a frame.
//!
//! # Overview
//!
//! The packer is independent of the APCI codec: it takes caller-supplied header fields and
//! a payload and returns the finished frame bytes (without FCS, which the hardware
//! appends). Only the GOOSE (`0x88B8`) and SV (`0x88BA`) ether types are accepted; any other
//! type is refused rather than packed.
//!
//! # Examples
//!
//! ```
//! use iec61850_rs::datalink::{pack, EtherHeader, EtherType};
//!
//! let header = EtherHeader::new(
//!     [0x01, 0x0C, 0xCD, 0x01, 0x00, 0x01],
//!     [0x00, 0x11, 0x22, 0x33, 0x44, 0x55],
//!     EtherType::Goose,
//!     0x0001,
//! );
//! let packet = pack(&header, &[0x61, 0x00]).unwrap();
//! assert_eq!(packet.len(), 22 + 2);
//! ```
//!
//! Packets with a non-GOOSE/SV type yield `None` from [`pack`]; use [`try_pack`] to get the
//! reason instead:
//!
//! ```
//! use iec61850_rs::datalink::{try_pack, DataLinkError, EtherHeader, EtherType};
//!
//! let mut header = EtherHeader::new([0xFF; 6], [0x00; 6], EtherType::Goose, 1);
//! header.type_id = 0x0800;
//! assert!(matches!(try_pack(&header, &[]), Err(DataLinkError::UnsupportedType(0x0800))));
//! ```

use thiserror::Error;

/// Result type for link-layer operations.
pub type Result<T> = std::result::Result<T, DataLinkError>;

/// Errors that can occur while building link-layer packets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataLinkError {
    /// The header's ether type is neither GOOSE nor Sampled Values.
    ///
    /// The packer is a guard for these two protocols, not a general Ethernet encoder.
    #[error("unsupported ether type 0x{0:04X}")]
    UnsupportedType(u32),

    /// A hardware address could not be parsed.
    #[error("address error: {0}")]
    AddressError(String),
}

/// GOOSE / SV Ethernet frame packing.
pub mod ethernet;

pub use ethernet::{
    format_mac_address, pack, parse_mac_address, try_pack, EtherHeader, EtherType,
    GOOSE_TYPE_ID, SV_TYPE_ID,
};
