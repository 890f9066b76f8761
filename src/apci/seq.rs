//! APCI Sequence Numbers
//!
//! Information frames carry two 15-bit sequence numbers: the send sequence N(S) of the
//! frame itself and the receive sequence N(R), which acknowledges every frame the sender has
//! received so far. Both wrap modulo 2^15.
//!
//! # Wire Format
//!
//! A sequence number occupies two control bytes. Bit 0 of the first byte belongs to the
//! frame-type discriminator, so the value is shifted left by one:
//!
//! ```text
//! byte 0: | N6 N5 N4 N3 N2 N1 N0 | x |
//! byte 1: | N14 ..            N7     |
//! ```

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::apci::{ApciError, Result};

/// Number of distinct sequence numbers
pub const SEQ_MODULUS: u32 = 1 << 15;

/// Mask of the significant sequence number bits
pub const SEQ_MASK: u16 = 0x7FFF;

/// A 15-bit sequence number
///
/// Construction always reduces the value modulo 2^15, so a `SeqNr` can never hold a value
/// that is not representable on the wire.
///
/// # Examples
///
/// ```
/// use iec61850_rs::apci::SeqNr;
///
/// let seq = SeqNr::new(0x7FFF);
/// assert_eq!(seq.pack(), [0xFE, 0xFF]);
/// assert_eq!(seq.next(), SeqNr::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeqNr(u16);

impl SeqNr {
    /// Sequence number zero
    pub const ZERO: SeqNr = SeqNr(0);

    /// Largest sequence number
    pub const MAX: SeqNr = SeqNr(SEQ_MASK);

    /// Create a sequence number, wrapping modulo 2^15
    pub const fn new(value: u16) -> Self {
        Self(value & SEQ_MASK)
    }

    /// Create a sequence number, rejecting values that do not fit in 15 bits
    pub const fn checked(value: u16) -> Option<Self> {
        if value > SEQ_MASK {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Raw value
    pub const fn value(self) -> u16 {
        self.0
    }

    /// The following sequence number
    pub const fn next(self) -> Self {
        self.wrapping_add(1)
    }

    /// Add `n` modulo 2^15
    pub const fn wrapping_add(self, n: u16) -> Self {
        Self::new(self.0.wrapping_add(n))
    }

    /// Forward distance from `earlier` to `self` modulo 2^15
    pub const fn distance_from(self, earlier: SeqNr) -> u16 {
        self.0.wrapping_sub(earlier.0) & SEQ_MASK
    }

    /// Pack into two control bytes
    pub const fn pack(self) -> [u8; 2] {
        pack_seq(self)
    }

    /// Unpack from two control bytes, ignoring the discriminator bit
    pub const fn unpack(bytes: [u8; 2]) -> Self {
        unpack_seq(bytes)
    }
}

impl fmt::Display for SeqNr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SeqNr> for u16 {
    fn from(seq: SeqNr) -> Self {
        seq.0
    }
}

/// Pack a sequence number: low byte holds `value << 1`, high byte holds `value >> 7`
pub const fn pack_seq(seq: SeqNr) -> [u8; 2] {
    [(seq.0 << 1) as u8, (seq.0 >> 7) as u8]
}

/// Inverse of [`pack_seq`]
pub const fn unpack_seq(bytes: [u8; 2]) -> SeqNr {
    SeqNr::new((bytes[0] >> 1) as u16 | (bytes[1] as u16) << 7)
}

/// Send/receive sequence state of one APCI session
///
/// The counter is owned by the session. It is not synchronized; a caller that sends from
/// several threads must serialize access itself.
///
/// Four values are tracked:
/// - `send_seq`: N(S) of the next Information frame to transmit
/// - `recv_seq`: N(S) expected on the next Information frame from the peer
/// - `acknowledged`: the last N(R) observed from the peer
/// - `ack_sent`: the last N(R) this side transmitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceCounter {
    send_seq: SeqNr,
    recv_seq: SeqNr,
    acknowledged: SeqNr,
    ack_sent: SeqNr,
}

impl SequenceCounter {
    /// Create a counter with all sequence numbers at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// N(S) of the next Information frame to send
    pub fn send_seq(&self) -> SeqNr {
        self.send_seq
    }

    /// N(S) expected from the peer, which is also the N(R) to transmit
    pub fn recv_seq(&self) -> SeqNr {
        self.recv_seq
    }

    /// Last N(R) observed from the peer
    pub fn acknowledged(&self) -> SeqNr {
        self.acknowledged
    }

    /// Return the current send sequence and advance it
    ///
    /// Must be called exactly once per Information frame transmitted.
    pub fn next_send(&mut self) -> SeqNr {
        let current = self.send_seq;
        self.send_seq = current.next();
        current
    }

    /// Frames sent but not yet acknowledged by the peer
    pub fn unacknowledged(&self) -> u16 {
        self.send_seq.distance_from(self.acknowledged)
    }

    /// Modular distance from the last observed acknowledgment to `value`
    pub fn distance_since_observed(&self, value: SeqNr) -> u16 {
        value.distance_from(self.acknowledged)
    }

    /// Record an acknowledgment N(R) received from the peer
    ///
    /// The value must lie between the last observed acknowledgment and the next send
    /// sequence. Anything else acknowledges frames that were never sent or moves backwards,
    /// and is reported as [`ApciError::SequenceRegression`] without changing state.
    ///
    /// Returns the number of frames newly acknowledged.
    pub fn observe(&mut self, peer_recv_seq: SeqNr) -> Result<u16> {
        let advance = self.distance_since_observed(peer_recv_seq);
        if advance > self.unacknowledged() {
            return Err(ApciError::SequenceRegression {
                received: peer_recv_seq,
                acknowledged: self.acknowledged,
                next_send: self.send_seq,
            });
        }
        self.acknowledged = peer_recv_seq;
        Ok(advance)
    }

    /// Accept an Information frame from the peer
    ///
    /// The frame's N(S) must equal the expected receive sequence. On success the receive
    /// sequence advances and the accepted value is returned.
    pub fn accept(&mut self, peer_send_seq: SeqNr) -> Result<SeqNr> {
        if peer_send_seq != self.recv_seq {
            return Err(ApciError::SequenceMismatch {
                expected: self.recv_seq,
                received: peer_send_seq,
            });
        }
        self.recv_seq = self.recv_seq.next();
        Ok(peer_send_seq)
    }

    /// Take in an Information frame's N(S) and N(R) together
    ///
    /// Both values are checked before either is recorded, so a frame rejected for its
    /// acknowledgment does not count as received. Returns the number of frames newly
    /// acknowledged.
    pub fn receive(&mut self, peer_send_seq: SeqNr, peer_recv_seq: SeqNr) -> Result<u16> {
        if peer_send_seq != self.recv_seq {
            return Err(ApciError::SequenceMismatch {
                expected: self.recv_seq,
                received: peer_send_seq,
            });
        }
        let acked = self.observe(peer_recv_seq)?;
        self.recv_seq = self.recv_seq.next();
        Ok(acked)
    }

    /// Information frames received since this side last transmitted an acknowledgment
    pub fn pending_acks(&self) -> u16 {
        self.recv_seq.distance_from(self.ack_sent)
    }

    /// Record that the current receive sequence has been transmitted as N(R)
    pub fn mark_acknowledged(&mut self) {
        self.ack_sent = self.recv_seq;
    }
}
