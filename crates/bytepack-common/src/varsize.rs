//! VarSize: self-describing variable-length size prefixes.
//!
//! A magnitude is written big-endian into the fewest bytes (1-8) that can hold
//! it together with a 3-bit length tag. The tag occupies the three most
//! significant bits of the first byte and records how many bytes the prefix
//! spans, so a decoder can size the prefix from its first byte alone.
//!
//! ```text
//!  first byte           following bytes (tag - 1)
//! +---+---+---+-----+  +----------+     +----------+
//! |  tag (3)  | hi  |  |  mid     | ... |  lo      |
//! +---+---+---+-----+  +----------+     +----------+
//! ```
//!
//! Three bits can only spell 0-7, so an 8-byte prefix stores its tag as
//! `0b000`; decoders read a zero tag as 8. Magnitudes above
//! [`MAX_MAGNITUDE`] need bits that overlap the tag and do not survive a
//! round trip (see the boundary tests below).
//!
//! # Example
//!
//! ```
//! use bytepack_common::varsize;
//!
//! let prefix = varsize::encode(255);
//! assert_eq!(prefix.as_bytes(), &[0x40, 0xFF]);
//! assert_eq!(varsize::decode(prefix.as_bytes()).unwrap(), (255, 2));
//! ```

use std::fmt;

use byteorder::{BigEndian, ByteOrder};

use crate::{Error, Result};

/// Longest prefix the codec ever emits.
pub const MAX_PREFIX_LEN: usize = 8;

/// Largest magnitude that decodes back to itself.
pub const MAX_MAGNITUDE: u64 = (1 << 61) - 1;

const TAG_BITS: u32 = 3;
const TAG_SHIFT: u32 = 8 - TAG_BITS;
const VALUE_MASK: u8 = 0b0001_1111;

/// An encoded size prefix.
///
/// Lives on the stack; nothing is shared between calls.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizePrefix {
    bytes: [u8; MAX_PREFIX_LEN],
    len: u8,
}

impl SizePrefix {
    /// The prefix bytes, exactly [`len`](Self::len) of them.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Number of bytes in the prefix (1-8).
    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Always false; a prefix spans at least one byte.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The raw 3-bit tag as stored on the wire (`0` for 8-byte prefixes).
    #[inline]
    pub const fn wire_tag(&self) -> u8 {
        self.bytes[0] >> TAG_SHIFT
    }
}

impl AsRef<[u8]> for SizePrefix {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for SizePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SizePrefix(")?;
        for (i, byte) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        f.write_str(")")
    }
}

/// Number of bytes needed to encode `magnitude`, tag bits included.
///
/// This is the single source of truth for prefix sizing: both buffer size
/// prediction and [`encode`] go through it.
#[inline]
pub const fn encoded_len(magnitude: u64) -> usize {
    let magnitude_bits = (u64::BITS - magnitude.leading_zeros()) as usize;
    let total_bits = magnitude_bits + TAG_BITS as usize;
    let len = total_bits.div_ceil(8);
    if len > MAX_PREFIX_LEN {
        MAX_PREFIX_LEN
    } else {
        len
    }
}

/// Prefix length announced by the first byte of an encoded prefix.
#[inline]
pub const fn prefix_len(first: u8) -> usize {
    match first >> TAG_SHIFT {
        0 => MAX_PREFIX_LEN,
        tag => tag as usize,
    }
}

/// Encode `magnitude` as a size prefix.
pub fn encode(magnitude: u64) -> SizePrefix {
    let len = encoded_len(magnitude);
    let mut bytes = [0u8; MAX_PREFIX_LEN];
    BigEndian::write_uint(&mut bytes, magnitude, len);
    bytes[0] |= ((len as u8) & 0b111) << TAG_SHIFT;
    SizePrefix {
        bytes,
        len: len as u8,
    }
}

/// Encode `magnitude` into the front of `out`, returning the bytes written.
pub fn encode_into(magnitude: u64, out: &mut [u8]) -> Result<usize> {
    let prefix = encode(magnitude);
    let available = out.len();
    let dst = out
        .get_mut(..prefix.len())
        .ok_or(Error::capacity(prefix.len(), available, 0))?;
    dst.copy_from_slice(prefix.as_bytes());
    Ok(prefix.len())
}

/// Decode a size prefix from the front of `bytes`.
///
/// Returns the magnitude and the number of bytes the prefix occupied.
/// Trailing bytes past the prefix are ignored.
pub fn decode(bytes: &[u8]) -> Result<(u64, usize)> {
    let first = *bytes.first().ok_or(Error::capacity(1, 0, 0))?;
    let len = prefix_len(first);
    if bytes.len() < len {
        return Err(Error::capacity(len, bytes.len(), 0));
    }

    let mut scratch = [0u8; MAX_PREFIX_LEN];
    scratch[..len].copy_from_slice(&bytes[..len]);
    scratch[0] &= VALUE_MASK;

    Ok((BigEndian::read_uint(&scratch, len), len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_is_one_byte() {
        let prefix = encode(0);
        assert_eq!(prefix.as_bytes(), &[0b0010_0000]);
        assert_eq!(prefix.wire_tag(), 1);
        assert_eq!(decode(prefix.as_bytes()).unwrap(), (0, 1));
    }

    #[test]
    fn test_one_byte_range() {
        // 5 value bits fit next to the tag
        assert_eq!(encoded_len(31), 1);
        assert_eq!(encode(31).as_bytes(), &[0x3F]);
        assert_eq!(encoded_len(32), 2);
    }

    #[test]
    fn test_255_needs_two_bytes() {
        let prefix = encode(255);
        assert_eq!(prefix.len(), 2);
        assert_eq!(prefix.as_bytes(), &[0x40, 0xFF]);
        assert_eq!(decode(prefix.as_bytes()).unwrap(), (255, 2));
    }

    #[test]
    fn test_length_boundaries() {
        let cases = [
            (0u64, 1usize),
            ((1 << 5) - 1, 1),
            (1 << 5, 2),
            ((1 << 13) - 1, 2),
            (1 << 13, 3),
            ((1 << 21) - 1, 3),
            (1 << 21, 4),
            ((1 << 29) - 1, 4),
            (1 << 29, 5),
            ((1 << 37) - 1, 5),
            (1 << 37, 6),
            ((1 << 45) - 1, 6),
            (1 << 45, 7),
            ((1 << 53) - 1, 7),
            (1 << 53, 8),
            ((1 << 56) - 1, 8),
            (MAX_MAGNITUDE, 8),
        ];
        for (magnitude, len) in cases {
            assert_eq!(encoded_len(magnitude), len, "magnitude {magnitude:#x}");
            assert_eq!(encode(magnitude).len(), len);
            assert_eq!(decode(encode(magnitude).as_bytes()).unwrap(), (magnitude, len));
        }
    }

    #[test]
    fn test_eight_byte_tag_wraps_to_zero() {
        let prefix = encode(1 << 56);
        assert_eq!(prefix.len(), 8);
        assert_eq!(prefix.wire_tag(), 0);
        assert_eq!(prefix.as_bytes(), &[0x01, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(prefix_len(prefix.as_bytes()[0]), 8);
    }

    #[test]
    fn test_max_magnitude_roundtrip() {
        let prefix = encode(MAX_MAGNITUDE);
        assert_eq!(prefix.as_bytes(), &[0x1F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(decode(prefix.as_bytes()).unwrap(), (MAX_MAGNITUDE, 8));
    }

    #[test]
    fn test_magnitudes_above_61_bits_collide_with_tag() {
        // Bit 61 lands in the tag field and reads back as a 1-byte prefix.
        let prefix = encode(1 << 61);
        assert_eq!(prefix.as_bytes(), &[0x20, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(decode(prefix.as_bytes()).unwrap(), (0, 1));

        // All ones: tag bits read as 7, the low 61 bits of the first 7 bytes survive.
        let prefix = encode(u64::MAX);
        assert_eq!(prefix.len(), 8);
        assert_eq!(prefix.as_bytes(), &[0xFF; 8]);
        assert_eq!(decode(prefix.as_bytes()).unwrap(), ((1 << 53) - 1, 7));

        let prefix = encode(1 << 63);
        assert_eq!(prefix.as_bytes(), &[0x80, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(decode(prefix.as_bytes()).unwrap(), (0, 4));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut bytes = encode(300).as_bytes().to_vec();
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        assert_eq!(decode(&bytes).unwrap(), (300, 2));
    }

    #[test]
    fn test_decode_truncated_prefix() {
        let err = decode(&[]).unwrap_err();
        assert!(err.is_capacity_exceeded());

        let prefix = encode(1 << 20);
        let err = decode(&prefix.as_bytes()[..1]).unwrap_err();
        assert!(err.is_capacity_exceeded());
    }

    #[test]
    fn test_encode_into() {
        let mut out = [0u8; 4];
        assert_eq!(encode_into(255, &mut out).unwrap(), 2);
        assert_eq!(&out[..2], &[0x40, 0xFF]);

        let mut small = [0u8; 1];
        match encode_into(255, &mut small) {
            Err(Error::CapacityExceeded { needed, available, .. }) => {
                assert_eq!((needed, available), (2, 1));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(small, [0]);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(magnitude in 0..=MAX_MAGNITUDE) {
            let prefix = encode(magnitude);
            prop_assert_eq!(prefix.len(), encoded_len(magnitude));
            prop_assert_eq!(decode(prefix.as_bytes()).unwrap(), (magnitude, prefix.len()));
        }

        #[test]
        fn prop_length_is_monotonic(a in any::<u64>(), b in any::<u64>()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(encoded_len(lo) <= encoded_len(hi));
        }
    }
}
