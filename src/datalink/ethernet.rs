//! GOOSE / Sampled Values Ethernet Packing
//!
//! GOOSE and SV messages are sent directly in Ethernet frames to a multicast address. This
//! module builds such a frame around an already encoded application payload. Receiving and
//! parsing these frames is not supported.
//!
//! # Frame Format
//!
//! - Destination MAC (6 bytes)
//! - Source MAC (6 bytes)
//! - VLAN tag (4 bytes, optional)
//! - Ether type (2 bytes) - 0x88B8 for GOOSE, 0x88BA for SV
//! - APPID (2 bytes)
//! - Length (2 bytes) - payload length + 8
//! - Reserved 1 and 2 (4 bytes, zero)
//! - Payload
//! - FCS - handled by hardware

use bytes::{BufMut, Bytes, BytesMut};
use log::{trace, warn};

use crate::datalink::{DataLinkError, Result};
use crate::encoding::encode_uint;

/// Ether type of GOOSE messages
pub const GOOSE_TYPE_ID: u32 = 0x88B8;

/// Ether type of Sampled Values messages
pub const SV_TYPE_ID: u32 = 0x88BA;

/// MAC address length
pub const MAC_ADDRESS_SIZE: usize = 6;

/// VLAN tag length
pub const VLAN_TAG_SIZE: usize = 4;

/// Header size without VLAN tag: MACs, ether type, APPID, length, reserved
pub const ETHER_HEADER_SIZE: usize = 2 * MAC_ADDRESS_SIZE + 2 + 2 + 2 + 4;

/// Bytes of the header counted by the length field: APPID, length and reserved
pub const LENGTH_FIELD_OVERHEAD: usize = 8;

/// Offset of the length field in a packet without VLAN tag
pub const LENGTH_FIELD_OFFSET: usize = 2 * MAC_ADDRESS_SIZE + 2 + 2;

/// Supported Ethernet payload protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EtherType {
    /// Generic Object Oriented Substation Event
    Goose,
    /// Sampled Values
    SampledValues,
}

impl EtherType {
    /// Map a header type id to a supported protocol
    pub fn from_type_id(type_id: u32) -> Option<Self> {
        match type_id {
            GOOSE_TYPE_ID => Some(EtherType::Goose),
            SV_TYPE_ID => Some(EtherType::SampledValues),
            _ => None,
        }
    }

    /// Type id written on the wire
    pub fn type_id(&self) -> u32 {
        match self {
            EtherType::Goose => GOOSE_TYPE_ID,
            EtherType::SampledValues => SV_TYPE_ID,
        }
    }
}

/// Caller-supplied Ethernet header fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtherHeader {
    /// Destination (multicast) MAC address
    pub dst_mac: [u8; 6],
    /// Source MAC address
    pub src_mac: [u8; 6],
    /// 802.1Q tag including its TPID
    pub vlan_tag: Option<[u8; 4]>,
    /// Ether type; only [`GOOSE_TYPE_ID`] and [`SV_TYPE_ID`] are accepted
    pub type_id: u32,
    /// Application identifier; the low two bytes are transmitted
    pub app_id: u32,
}

impl EtherHeader {
    /// Create a header without VLAN tag
    pub fn new(dst_mac: [u8; 6], src_mac: [u8; 6], ether_type: EtherType, app_id: u32) -> Self {
        Self {
            dst_mac,
            src_mac,
            vlan_tag: None,
            type_id: ether_type.type_id(),
            app_id,
        }
    }

    /// Attach a VLAN tag
    pub fn with_vlan(mut self, vlan_tag: [u8; 4]) -> Self {
        self.vlan_tag = Some(vlan_tag);
        self
    }

    /// Header length on the wire
    pub fn encoded_len(&self) -> usize {
        ETHER_HEADER_SIZE + self.vlan_tag.map_or(0, |_| VLAN_TAG_SIZE)
    }
}

/// Build an Ethernet packet around `payload`
///
/// # Errors
///
/// [`DataLinkError::UnsupportedType`] when the header is neither GOOSE nor SV.
pub fn try_pack(header: &EtherHeader, payload: &[u8]) -> Result<Bytes> {
    if EtherType::from_type_id(header.type_id).is_none() {
        return Err(DataLinkError::UnsupportedType(header.type_id));
    }

    let mut packet = BytesMut::with_capacity(header.encoded_len() + payload.len());
    packet.put_slice(&header.dst_mac);
    packet.put_slice(&header.src_mac);
    if let Some(vlan_tag) = header.vlan_tag {
        packet.put_slice(&vlan_tag);
    }

    let mut fields = [0u8; 10];
    encode_uint(header.type_id, &mut fields[0..2]);
    encode_uint(header.app_id, &mut fields[2..4]);
    encode_uint((payload.len() + LENGTH_FIELD_OVERHEAD) as u32, &mut fields[4..6]);
    encode_uint(0, &mut fields[6..10]);
    packet.put_slice(&fields);
    packet.put_slice(payload);

    trace!(
        "packed {} byte packet (type 0x{:04X}, appid 0x{:04X})",
        packet.len(),
        header.type_id,
        header.app_id & 0xFFFF
    );
    Ok(packet.freeze())
}

/// Build an Ethernet packet, or `None` if the header is not GOOSE or SV
pub fn pack(header: &EtherHeader, payload: &[u8]) -> Option<Bytes> {
    try_pack(header, payload)
        .map_err(|e| warn!("pack: not a GOOSE or SV packet: {}", e))
        .ok()
}

/// Parse MAC address from string
pub fn parse_mac_address(mac_str: &str) -> Result<[u8; 6]> {
    let parts: Vec<&str> = mac_str.split(|c: char| c == ':' || c == '-').collect();
    if parts.len() != MAC_ADDRESS_SIZE {
        return Err(DataLinkError::AddressError(format!(
            "expected 6 octets in {:?}",
            mac_str
        )));
    }

    let mut mac = [0u8; 6];
    for (i, part) in parts.iter().enumerate() {
        mac[i] = u8::from_str_radix(part, 16)
            .map_err(|_| DataLinkError::AddressError(format!("invalid octet {:?}", part)))?;
    }

    Ok(mac)
}

/// Format MAC address as string
pub fn format_mac_address(mac: &[u8; 6]) -> String {
    format!(
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::decode_uint;

    const DST: [u8; 6] = [0x01, 0x0C, 0xCD, 0x01, 0x00, 0x01];
    const SRC: [u8; 6] = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];

    #[test]
    fn test_pack_goose_without_vlan() {
        let payload = [0x61, 0x03, 0x80, 0x01, 0xFF];
        let header = EtherHeader::new(DST, SRC, EtherType::Goose, 0x0001);
        let packet = pack(&header, &payload).unwrap();

        assert_eq!(packet.len(), 22 + payload.len());
        assert_eq!(&packet[0..6], &DST);
        assert_eq!(&packet[6..12], &SRC);
        assert_eq!(&packet[12..14], &[0x88, 0xB8]);
        assert_eq!(&packet[14..16], &[0x00, 0x01]);
        assert_eq!(
            decode_uint(&packet[LENGTH_FIELD_OFFSET..LENGTH_FIELD_OFFSET + 2]) as usize,
            payload.len() + 8
        );
        assert_eq!(&packet[18..22], &[0, 0, 0, 0]);
        assert_eq!(&packet[22..], &payload);
    }

    #[test]
    fn test_pack_sv_with_vlan() {
        let payload = vec![0xAA; 40];
        let vlan = [0x81, 0x00, 0x80, 0x00];
        let header = EtherHeader::new(DST, SRC, EtherType::SampledValues, 0x4000).with_vlan(vlan);
        let packet = pack(&header, &payload).unwrap();

        assert_eq!(packet.len(), 26 + payload.len());
        assert_eq!(&packet[12..16], &vlan);
        assert_eq!(&packet[16..18], &[0x88, 0xBA]);
        assert_eq!(&packet[18..20], &[0x40, 0x00]);
        let offset = LENGTH_FIELD_OFFSET + VLAN_TAG_SIZE;
        assert_eq!(decode_uint(&packet[offset..offset + 2]), 48);
        assert_eq!(&packet[22..26], &[0, 0, 0, 0]);
        assert_eq!(&packet[26..], &payload[..]);
    }

    #[test]
    fn test_pack_empty_payload() {
        let header = EtherHeader::new(DST, SRC, EtherType::Goose, 1);
        let packet = pack(&header, &[]).unwrap();
        assert_eq!(packet.len(), ETHER_HEADER_SIZE);
        assert_eq!(&packet[16..18], &[0x00, 0x08]);
    }

    #[test]
    fn test_pack_rejects_other_types() {
        let mut header = EtherHeader::new(DST, SRC, EtherType::Goose, 1);
        header.type_id = 0x0800;
        assert!(pack(&header, &[0x01]).is_none());
        assert!(matches!(
            try_pack(&header, &[0x01]),
            Err(DataLinkError::UnsupportedType(0x0800))
        ));
    }

    #[test]
    fn test_app_id_truncated_to_two_bytes() {
        let header = EtherHeader::new(DST, SRC, EtherType::Goose, 0x0012_3456);
        let packet = try_pack(&header, &[]).unwrap();
        assert_eq!(&packet[14..16], &[0x34, 0x56]);
    }

    #[test]
    fn test_ether_type_mapping() {
        assert_eq!(EtherType::from_type_id(0x88B8), Some(EtherType::Goose));
        assert_eq!(EtherType::from_type_id(0x88BA), Some(EtherType::SampledValues));
        assert_eq!(EtherType::from_type_id(0x88B9), None);
        assert_eq!(EtherType::SampledValues.type_id(), SV_TYPE_ID);
    }

    #[test]
    fn test_mac_address_parsing() {
        let mac = parse_mac_address("01:0c:cd:01:00:01").unwrap();
        assert_eq!(mac, DST);
        assert_eq!(format_mac_address(&mac), "01:0C:CD:01:00:01");
        assert_eq!(parse_mac_address("00-11-22-33-44-55").unwrap(), SRC);

        assert!(parse_mac_address("invalid").is_err());
        assert!(parse_mac_address("00:11:22:33:44").is_err());
        assert!(parse_mac_address("00:11:22:33:44:GG").is_err());
    }
}
