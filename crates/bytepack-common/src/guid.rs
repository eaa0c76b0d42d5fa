//! 16-byte GUID with the classic Windows field layout.
//!
//! The GUID is a plain fixed-layout value: on the wire it is its 16 raw bytes,
//! with the three integer groups stored little-endian.

use std::fmt;
use std::str::FromStr;

use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::Error;

/// A 16-byte GUID.
///
/// Format: `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}`
///
/// # Byte Layout
///
/// - bytes 0-3: `data1`, little-endian
/// - bytes 4-5: `data2`, little-endian
/// - bytes 6-7: `data3`, little-endian
/// - bytes 8-15: `data4`, in order
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct Guid {
    data1: U32,
    data2: U16,
    data3: U16,
    data4: [u8; 8],
}

impl Guid {
    /// Size of a GUID on the wire.
    pub const LEN: usize = 16;

    /// Nil GUID (all zeros).
    pub const NIL: Self = Self {
        data1: U32::ZERO,
        data2: U16::ZERO,
        data3: U16::ZERO,
        data4: [0; 8],
    };

    /// Create a GUID from its four fields.
    #[inline]
    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1: U32::new(data1),
            data2: U16::new(data2),
            data3: U16::new(data3),
            data4,
        }
    }

    /// Create a GUID from its raw wire bytes.
    #[inline]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        zerocopy::transmute!(bytes)
    }

    /// The raw wire bytes of the GUID.
    #[inline]
    pub fn to_bytes(&self) -> [u8; 16] {
        zerocopy::transmute!(*self)
    }

    #[inline]
    pub fn data1(&self) -> u32 {
        self.data1.get()
    }

    #[inline]
    pub fn data2(&self) -> u16 {
        self.data2.get()
    }

    #[inline]
    pub fn data3(&self) -> u16 {
        self.data3.get()
    }

    #[inline]
    pub const fn data4(&self) -> &[u8; 8] {
        &self.data4
    }

    /// Check if the GUID is nil (all zeros).
    #[inline]
    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{{{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}}}",
            self.data1(),
            self.data2(),
            self.data3(),
            d[0], d[1],
            d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

impl FromStr for Guid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(s);

        if inner.len() != 36 || !inner.is_ascii() {
            return Err(Error::InvalidGuid(format!(
                "expected 36 characters, got {}",
                inner.len()
            )));
        }

        let bytes = inner.as_bytes();
        if bytes[8] != b'-' || bytes[13] != b'-' || bytes[18] != b'-' || bytes[23] != b'-' {
            return Err(Error::InvalidGuid("invalid hyphen positions".into()));
        }

        let parse_hex = |start: usize, len: usize| -> Result<u64, Error> {
            let digits = &inner[start..start + len];
            if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(Error::InvalidGuid(format!("invalid hex at position {}", start)));
            }
            u64::from_str_radix(digits, 16)
                .map_err(|_| Error::InvalidGuid(format!("invalid hex at position {}", start)))
        };

        let data1 = parse_hex(0, 8)? as u32;
        let data2 = parse_hex(9, 4)? as u16;
        let data3 = parse_hex(14, 4)? as u16;

        let mut data4 = [0u8; 8];
        data4[0] = parse_hex(19, 2)? as u8;
        data4[1] = parse_hex(21, 2)? as u8;
        for (i, byte) in data4[2..].iter_mut().enumerate() {
            *byte = parse_hex(24 + i * 2, 2)? as u8;
        }

        Ok(Self::new(data1, data2, data3, data4))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Guid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Guid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_guid() {
        let guid = Guid::NIL;
        assert!(guid.is_nil());
        assert_eq!(guid.to_string(), "{00000000-0000-0000-0000-000000000000}");
    }

    #[test]
    fn test_wire_layout() {
        let guid = Guid::new(1, 0, 0, *b"clauhban");
        let bytes = guid.to_bytes();
        assert_eq!(&bytes[..8], &[1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[8..], b"clauhban");
        assert_eq!(Guid::from_bytes(bytes), guid);
    }

    #[test]
    fn test_roundtrip() {
        let original = "{12345678-abcd-ef01-2345-6789abcdef01}";
        let guid: Guid = original.parse().unwrap();
        assert_eq!(guid.data1(), 0x12345678);
        assert_eq!(guid.data2(), 0xabcd);
        assert_eq!(guid.data4()[0], 0x23);
        assert_eq!(guid.to_string(), original);
    }

    #[test]
    fn test_braces_optional() {
        let guid: Guid = "12345678-abcd-ef01-2345-6789abcdef01".parse().unwrap();
        assert_eq!(guid.data3(), 0xef01);
    }

    #[test]
    fn test_invalid_length() {
        assert!("too-short".parse::<Guid>().is_err());
    }

    #[test]
    fn test_sign_is_not_a_digit() {
        assert!("+2345678-abcd-ef01-2345-6789abcdef01".parse::<Guid>().is_err());
        assert!("12345678-+bcd-ef01-2345-6789abcdef01".parse::<Guid>().is_err());
        assert!("{12345678-abcd-ef01-+345-6789abcdef01}".parse::<Guid>().is_err());
    }

    #[test]
    fn test_invalid_hyphens() {
        assert!("12345678_abcd-ef01-2345-6789abcdef01".parse::<Guid>().is_err());
    }
}
