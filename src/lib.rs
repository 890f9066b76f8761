#![doc = include_str!("../README.md")]

pub mod apci;
pub mod datalink;
pub mod encoding;
pub mod transport;
pub mod util;

// Re-export main types without glob imports to avoid conflicts
pub use apci::{
    codec, ApciError, Apdu, ApduAssembler, ControlFunction, Frame, FrameType, SeqNr,
    SequenceCounter,
};
pub use datalink::{DataLinkError, EtherHeader, EtherType};
pub use transport::{ApciConfig, ApciEndpoint, Transport, TransportError};

pub use apci::{APCI_HEADER_SIZE, APDU_SIZE_MAX, ASDU_SIZE_MAX, START_BYTE};

#[cfg(test)]
mod tests {
    use crate::apci::codec;
    use crate::datalink::{pack, EtherHeader, EtherType};
    use crate::encoding::decode_uint;
    use crate::{ControlFunction, Frame, SeqNr, SequenceCounter};

    #[test]
    fn test_session_exchange() {
        // Client side of a short exchange: STARTDT, one I-frame each way, acknowledgment
        let mut counter = SequenceCounter::new();

        let start = codec::encode_unnumbered(ControlFunction::StartActive);
        assert_eq!(&start[..], &[0x68, 0x04, 0x07, 0x00, 0x00, 0x00]);

        let (confirm, _) = codec::decode(&[0x68, 0x04, 0x0B, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(confirm, Frame::unnumbered(ControlFunction::StartConfirm));

        let send_seq = counter.next_send();
        let request = codec::encode_information(send_seq, counter.recv_seq(), &[0x64, 0x01])
            .unwrap();
        assert_eq!(&request[..6], &[0x68, 0x06, 0x00, 0x00, 0x00, 0x00]);

        let response = codec::encode_information(SeqNr::ZERO, SeqNr::new(1), &[0x64, 0x01])
            .unwrap();
        let (frame, asdu) = codec::decode(&response).unwrap();
        if let Frame::Information { send_seq, recv_seq } = frame {
            counter.accept(send_seq).unwrap();
            assert_eq!(counter.observe(recv_seq).unwrap(), 1);
        } else {
            panic!("expected I-frame, got {}", frame);
        }
        assert_eq!(asdu, &[0x64, 0x01]);

        let ack = codec::encode_supervisory(counter.recv_seq());
        assert_eq!(&ack[..], &[0x68, 0x04, 0x01, 0x00, 0x02, 0x00]);
    }

    #[test]
    fn test_goose_packet_carries_payload() {
        let dst = [0x01, 0x0C, 0xCD, 0x01, 0x00, 0x01];
        let header = EtherHeader::new(dst, [0; 6], EtherType::Goose, 3);
        let payload = [0x61, 0x81, 0x86];
        let packet = pack(&header, &payload).unwrap();
        assert_eq!(decode_uint(&packet[16..18]) as usize, payload.len() + 8);
        assert!(packet.ends_with(&payload));
    }
}
