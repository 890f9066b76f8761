//! APCI Frame Codec
//!
//! Pure functions turning APDU bytes into [`Frame`] values and back. Nothing here performs
//! I/O or keeps state; sequence numbers are supplied by the caller, normally from a
//! [`SequenceCounter`](crate::apci::SequenceCounter).
//!
//! # Encoded Frames
//!
//! ```text
//! I-frame: 68 | 4+n | N(S)<<1  N(S)>>7 | N(R)<<1  N(R)>>7 | ASDU (n bytes)
//! S-frame: 68 |  04 |   01       00    | N(R)<<1  N(R)>>7 |
//! U-frame: 68 |  04 | fn|03      00    |   00       00    |
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use log::trace;

use crate::apci::{
    ApciError, ControlFunction, Frame, FrameType, HeaderFault, Result, SeqNr,
    APCI_CTL_FIELD_SIZE, APCI_HEADER_SIZE, APDU_FIELD_SIZE_MAX, ASDU_SIZE_MAX, START_BYTE,
};
use crate::apci::frame::U_FUNCTION_MASK;

/// Classify an APDU by its first control byte
pub fn classify(ctrl1: u8) -> FrameType {
    FrameType::classify(ctrl1)
}

/// Decode the APCI header at the start of `data`
///
/// Returns the frame and everything after the six-byte header. For Information frames this
/// is the ASDU; framing of a continuous stream is the job of
/// [`ApduAssembler`](crate::apci::ApduAssembler).
///
/// # Errors
///
/// [`ApciError::MalformedHeader`] when fewer than six bytes are present, the start byte is
/// wrong, or the length byte is outside `4..=253`. An unknown Unnumbered function is not an
/// error; it decodes to [`ControlFunction::Unrecognized`].
pub fn decode(data: &[u8]) -> Result<(Frame, &[u8])> {
    if data.len() < APCI_HEADER_SIZE {
        return Err(HeaderFault::Truncated {
            needed: APCI_HEADER_SIZE,
            available: data.len(),
        }
        .into());
    }
    if data[0] != START_BYTE {
        return Err(HeaderFault::BadStartByte(data[0]).into());
    }
    let length = data[1];
    if !(APCI_CTL_FIELD_SIZE..=APDU_FIELD_SIZE_MAX).contains(&(length as usize)) {
        return Err(HeaderFault::BadLength(length).into());
    }

    let (ctrl1, ctrl2, ctrl3, ctrl4) = (data[2], data[3], data[4], data[5]);
    let frame = match FrameType::classify(ctrl1) {
        FrameType::Information => Frame::Information {
            send_seq: SeqNr::unpack([ctrl1, ctrl2]),
            recv_seq: SeqNr::unpack([ctrl3, ctrl4]),
        },
        FrameType::Supervisory => Frame::Supervisory {
            recv_seq: SeqNr::unpack([ctrl3, ctrl4]),
        },
        FrameType::Unnumbered => Frame::Unnumbered {
            function: ControlFunction::from_u8(ctrl1 & U_FUNCTION_MASK),
        },
    };

    trace!("decoded {} ({} byte APDU field)", frame, length);
    Ok((frame, &data[APCI_HEADER_SIZE..]))
}

/// Encode an Information frame carrying `asdu`
///
/// # Errors
///
/// [`ApciError::PayloadTooLarge`] when `asdu` is longer than [`ASDU_SIZE_MAX`].
pub fn encode_information(send_seq: SeqNr, recv_seq: SeqNr, asdu: &[u8]) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(APCI_HEADER_SIZE + asdu.len());
    Frame::information(send_seq, recv_seq).encode_into(asdu, &mut dst)?;
    Ok(dst.freeze())
}

/// Encode a Supervisory frame acknowledging everything before `recv_seq`
pub fn encode_supervisory(recv_seq: SeqNr) -> Bytes {
    encode_control(Frame::supervisory(recv_seq))
}

/// Encode an Unnumbered frame for `function`
pub fn encode_unnumbered(function: ControlFunction) -> Bytes {
    encode_control(Frame::unnumbered(function))
}

/// Encode any frame; `asdu` must be empty unless `frame` is an Information frame
pub fn encode(frame: &Frame, asdu: &[u8]) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(APCI_HEADER_SIZE + asdu.len());
    frame.encode_into(asdu, &mut dst)?;
    Ok(dst.freeze())
}

fn encode_control(frame: Frame) -> Bytes {
    let mut dst = BytesMut::with_capacity(APCI_HEADER_SIZE);
    put_header(&frame, 0, &mut dst);
    dst.freeze()
}

fn put_header(frame: &Frame, asdu_len: usize, dst: &mut BytesMut) {
    dst.put_u8(START_BYTE);
    dst.put_u8((APCI_CTL_FIELD_SIZE + asdu_len) as u8);
    dst.put_slice(&frame.control_field());
    trace!("encoded {} with {} byte ASDU", frame, asdu_len);
}

impl Frame {
    /// Append this frame and its ASDU to `dst`
    ///
    /// # Errors
    ///
    /// [`ApciError::PayloadTooLarge`] when the ASDU is too long for an Information frame,
    /// or is non-empty on a Supervisory or Unnumbered frame (reported with `max: 0`).
    pub fn encode_into(&self, asdu: &[u8], dst: &mut BytesMut) -> Result<()> {
        let max = if self.is_information() { ASDU_SIZE_MAX } else { 0 };
        if asdu.len() > max {
            return Err(ApciError::PayloadTooLarge {
                size: asdu.len(),
                max,
            });
        }
        dst.reserve(APCI_HEADER_SIZE + asdu.len());
        put_header(self, asdu.len(), dst);
        dst.put_slice(asdu);
        Ok(())
    }
}
