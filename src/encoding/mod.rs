//! Fixed-Width Integer Encoding
//!
//! Link-layer headers carry unsigned fields of one to four bytes in network byte order.
//! These helpers write and read such fields in place.
//!
//! The encoding is fixed-width, not variable-length: the destination slice decides how many
//! bytes are written, and values too large for it lose their high-order bits.
//!
//! # Example
//!
//! ```
//! use iec61850_rs::encoding::{decode_uint, encode_uint};
//!
//! let mut field = [0u8; 2];
//! encode_uint(0x88B8, &mut field);
//! assert_eq!(field, [0x88, 0xB8]);
//! assert_eq!(decode_uint(&field), 0x88B8);
//! ```

/// Widest field handled by [`encode_uint`] and [`decode_uint`]
pub const MAX_UINT_WIDTH: usize = 4;

/// Encode `value` big-endian into `dst`
///
/// At most four bytes are written; bytes of `dst` beyond the fourth are left untouched.
/// When `dst` is narrower than the value, the high-order bytes are dropped.
pub fn encode_uint(value: u32, dst: &mut [u8]) {
    let width = dst.len().min(MAX_UINT_WIDTH);
    let bytes = value.to_be_bytes();
    dst[..width].copy_from_slice(&bytes[MAX_UINT_WIDTH - width..]);
}

/// Decode a big-endian unsigned integer from the first four bytes of `src`
pub fn decode_uint(src: &[u8]) -> u32 {
    src.iter()
        .take(MAX_UINT_WIDTH)
        .fold(0u32, |acc, &b| (acc << 8) | b as u32)
}
