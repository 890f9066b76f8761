//! APCI Frame Model
//!
//! The three frame formats distinguished by the low bits of the first control byte:
//!
//! | Format | Control byte 1 | Carries                       |
//! |--------|----------------|-------------------------------|
//! | I      | `xxxxxxx0`     | N(S), N(R) and an ASDU        |
//! | S      | `xxxxxx01`     | N(R) only                     |
//! | U      | `xxxxxx11`     | one control function          |

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::apci::SeqNr;

/// Discriminator bits of an Unnumbered control byte
pub const U_FORMAT_BITS: u8 = 0x03;

/// Discriminator bits of a Supervisory control byte
pub const S_FORMAT_BITS: u8 = 0x01;

/// Mask selecting the function bits of an Unnumbered control byte
pub const U_FUNCTION_MASK: u8 = 0xFC;

/// Frame format selected by the control field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FrameType {
    /// Numbered information transfer
    Information,
    /// Numbered supervisory function
    Supervisory,
    /// Unnumbered control function
    Unnumbered,
}

impl FrameType {
    /// Classify a frame from its first control byte
    ///
    /// Bit 0 is tested first, then the two low bits; the rule is exhaustive.
    pub const fn classify(ctrl1: u8) -> Self {
        if ctrl1 & 0x01 == 0 {
            FrameType::Information
        } else if ctrl1 & 0x03 == S_FORMAT_BITS {
            FrameType::Supervisory
        } else {
            FrameType::Unnumbered
        }
    }

    /// Single-letter label used in diagnostics
    pub const fn as_str(&self) -> &'static str {
        match self {
            FrameType::Information => "I",
            FrameType::Supervisory => "S",
            FrameType::Unnumbered => "U",
        }
    }
}

/// Unnumbered frame control functions
///
/// Each function is a single bit in the upper six bits of the control byte. Values that
/// match none of them are kept as [`ControlFunction::Unrecognized`] so that vendor
/// extensions can still be inspected and logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControlFunction {
    /// STARTDT act
    StartActive,
    /// STARTDT con
    StartConfirm,
    /// STOPDT act
    StopActive,
    /// STOPDT con
    StopConfirm,
    /// TESTFR act
    TestActive,
    /// TESTFR con
    TestConfirm,
    /// Any other function bits
    ///
    /// Holds a value masked with `0xFC` that matches none of the six functions. Build it
    /// through [`ControlFunction::from_u8`]; a hand-made `Unrecognized(0x04)` is sent as
    /// STARTDT act and decodes as [`ControlFunction::StartActive`].
    Unrecognized(u8),
}

impl ControlFunction {
    /// All recognized functions in bit order
    pub const ALL: [ControlFunction; 6] = [
        ControlFunction::StartActive,
        ControlFunction::StartConfirm,
        ControlFunction::StopActive,
        ControlFunction::StopConfirm,
        ControlFunction::TestActive,
        ControlFunction::TestConfirm,
    ];

    /// Convert from function bits, ignoring the two format bits
    pub const fn from_u8(value: u8) -> Self {
        match value & U_FUNCTION_MASK {
            0x04 => ControlFunction::StartActive,
            0x08 => ControlFunction::StartConfirm,
            0x10 => ControlFunction::StopActive,
            0x20 => ControlFunction::StopConfirm,
            0x40 => ControlFunction::TestActive,
            0x80 => ControlFunction::TestConfirm,
            other => ControlFunction::Unrecognized(other),
        }
    }

    /// Function bits without the format discriminator
    pub const fn to_u8(self) -> u8 {
        match self {
            ControlFunction::StartActive => 0x04,
            ControlFunction::StartConfirm => 0x08,
            ControlFunction::StopActive => 0x10,
            ControlFunction::StopConfirm => 0x20,
            ControlFunction::TestActive => 0x40,
            ControlFunction::TestConfirm => 0x80,
            ControlFunction::Unrecognized(value) => value,
        }
    }

    /// First control byte as transmitted: function bits with the U-format bits set
    pub const fn control_byte(self) -> u8 {
        (self.to_u8() & U_FUNCTION_MASK) | U_FORMAT_BITS
    }

    /// Whether this is one of the six standard functions
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, ControlFunction::Unrecognized(_))
    }

    /// Whether this function requests a confirmation
    pub const fn is_activation(&self) -> bool {
        matches!(
            self,
            ControlFunction::StartActive | ControlFunction::StopActive | ControlFunction::TestActive
        )
    }

    /// The confirmation matching an activation
    pub const fn confirmation(&self) -> Option<ControlFunction> {
        match self {
            ControlFunction::StartActive => Some(ControlFunction::StartConfirm),
            ControlFunction::StopActive => Some(ControlFunction::StopConfirm),
            ControlFunction::TestActive => Some(ControlFunction::TestConfirm),
            _ => None,
        }
    }
}

impl From<u8> for ControlFunction {
    fn from(value: u8) -> Self {
        Self::from_u8(value)
    }
}

impl From<ControlFunction> for u8 {
    fn from(function: ControlFunction) -> Self {
        function.to_u8()
    }
}

impl fmt::Display for ControlFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlFunction::StartActive => write!(f, "StartActive"),
            ControlFunction::StartConfirm => write!(f, "StartConfirm"),
            ControlFunction::StopActive => write!(f, "StopActive"),
            ControlFunction::StopConfirm => write!(f, "StopConfirm"),
            ControlFunction::TestActive => write!(f, "TestActive"),
            ControlFunction::TestConfirm => write!(f, "TestConfirm"),
            ControlFunction::Unrecognized(value) => write!(f, "Unrecognized(0x{:02X})", value),
        }
    }
}

/// A decoded APCI control field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Frame {
    /// I-frame: sequenced application data
    Information {
        /// N(S) of this frame
        send_seq: SeqNr,
        /// N(R), acknowledging all frames before it
        recv_seq: SeqNr,
    },
    /// S-frame: acknowledgment only
    Supervisory {
        /// N(R), acknowledging all frames before it
        recv_seq: SeqNr,
    },
    /// U-frame: connection control
    Unnumbered {
        /// Requested or confirmed function
        function: ControlFunction,
    },
}

impl Frame {
    /// Create an I-frame control field
    pub const fn information(send_seq: SeqNr, recv_seq: SeqNr) -> Self {
        Frame::Information { send_seq, recv_seq }
    }

    /// Create an S-frame control field
    pub const fn supervisory(recv_seq: SeqNr) -> Self {
        Frame::Supervisory { recv_seq }
    }

    /// Create a U-frame control field
    pub const fn unnumbered(function: ControlFunction) -> Self {
        Frame::Unnumbered { function }
    }

    /// Format of this frame
    pub const fn frame_type(&self) -> FrameType {
        match self {
            Frame::Information { .. } => FrameType::Information,
            Frame::Supervisory { .. } => FrameType::Supervisory,
            Frame::Unnumbered { .. } => FrameType::Unnumbered,
        }
    }

    /// Whether this frame can carry an ASDU
    pub const fn is_information(&self) -> bool {
        matches!(self, Frame::Information { .. })
    }

    /// N(R) carried by I- and S-frames
    pub const fn recv_seq(&self) -> Option<SeqNr> {
        match self {
            Frame::Information { recv_seq, .. } | Frame::Supervisory { recv_seq } => {
                Some(*recv_seq)
            }
            Frame::Unnumbered { .. } => None,
        }
    }

    /// The four control bytes of this frame
    pub const fn control_field(&self) -> [u8; 4] {
        match self {
            Frame::Information { send_seq, recv_seq } => {
                let s = send_seq.pack();
                let r = recv_seq.pack();
                [s[0], s[1], r[0], r[1]]
            }
            Frame::Supervisory { recv_seq } => {
                let r = recv_seq.pack();
                [S_FORMAT_BITS, 0x00, r[0], r[1]]
            }
            Frame::Unnumbered { function } => [function.control_byte(), 0x00, 0x00, 0x00],
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Information { send_seq, recv_seq } => {
                write!(f, "I[send: {}, recv: {}]", send_seq, recv_seq)
            }
            Frame::Supervisory { recv_seq } => write!(f, "S[recv: {}]", recv_seq),
            Frame::Unnumbered { function } => write!(f, "U[{}]", function),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(FrameType::classify(0x00), FrameType::Information);
        assert_eq!(FrameType::classify(0xFE), FrameType::Information);
        assert_eq!(FrameType::classify(0x01), FrameType::Supervisory);
        assert_eq!(FrameType::classify(0x03), FrameType::Unnumbered);
        // Bare function bits have bit 0 clear; only the transmitted byte is a U-frame
        assert_eq!(FrameType::classify(0x04), FrameType::Information);
        assert_eq!(
            FrameType::classify(ControlFunction::StartActive.control_byte()),
            FrameType::Unnumbered
        );
    }

    #[test]
    fn test_function_bits_are_exclusive() {
        for (i, a) in ControlFunction::ALL.iter().enumerate() {
            let bits = a.to_u8();
            assert_eq!(bits.count_ones(), 1);
            assert_eq!(bits & U_FORMAT_BITS, 0);
            assert_eq!(a.control_byte() & 0x03, U_FORMAT_BITS);
            for b in &ControlFunction::ALL[i + 1..] {
                assert_eq!(bits & b.to_u8(), 0);
            }
        }
    }

    #[test]
    fn test_control_function_conversions() {
        assert_eq!(ControlFunction::from(0x04), ControlFunction::StartActive);
        assert_eq!(ControlFunction::from(0x80), ControlFunction::TestConfirm);
        assert_eq!(u8::from(ControlFunction::StopConfirm), 0x20);
        assert_eq!(ControlFunction::StartActive.control_byte(), 0x07);
        assert_eq!(ControlFunction::TestConfirm.control_byte(), 0x83);

        assert_eq!(ControlFunction::from(0x07), ControlFunction::StartActive);
        assert_eq!(ControlFunction::from(0x0F), ControlFunction::Unrecognized(0x0C));

        let unknown = ControlFunction::from(0x0C);
        assert_eq!(unknown, ControlFunction::Unrecognized(0x0C));
        assert!(!unknown.is_recognized());
        assert!(ControlFunction::TestActive.is_recognized());
    }

    #[test]
    fn test_confirmation_pairs() {
        assert_eq!(
            ControlFunction::StartActive.confirmation(),
            Some(ControlFunction::StartConfirm)
        );
        assert_eq!(
            ControlFunction::TestActive.confirmation(),
            Some(ControlFunction::TestConfirm)
        );
        assert_eq!(ControlFunction::StopConfirm.confirmation(), None);
        assert!(ControlFunction::StopActive.is_activation());
        assert!(!ControlFunction::StopConfirm.is_activation());
    }

    #[test]
    fn test_display() {
        let i = Frame::information(SeqNr::new(3), SeqNr::new(7));
        assert_eq!(i.to_string(), "I[send: 3, recv: 7]");
        assert_eq!(Frame::supervisory(SeqNr::new(9)).to_string(), "S[recv: 9]");
        assert_eq!(
            Frame::unnumbered(ControlFunction::StartActive).to_string(),
            "U[StartActive]"
        );
        assert_eq!(
            Frame::unnumbered(ControlFunction::Unrecognized(0x0C)).to_string(),
            "U[Unrecognized(0x0C)]"
        );
    }

    #[test]
    fn test_control_field() {
        let s = Frame::supervisory(SeqNr::new(1));
        assert_eq!(s.control_field(), [0x01, 0x00, 0x02, 0x00]);
        assert_eq!(s.recv_seq(), Some(SeqNr::new(1)));

        let i = Frame::information(SeqNr::MAX, SeqNr::new(1));
        assert_eq!(i.control_field(), [0xFE, 0xFF, 0x02, 0x00]);
        assert_eq!(i.frame_type(), FrameType::Information);
        assert!(i.is_information());

        let u = Frame::unnumbered(ControlFunction::TestActive);
        assert_eq!(u.control_field(), [0x43, 0x00, 0x00, 0x00]);
        assert_eq!(u.recv_seq(), None);
    }
}
