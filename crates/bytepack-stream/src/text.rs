//! Wide (UTF-16) text.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

/// Width in bytes of one wide code unit.
pub const WIDE_WIDTH: usize = 2;

/// Text stored as UTF-16 code units, character width 2 on the wire.
///
/// Units are kept as-is, so unpaired surrogates survive a round trip; only
/// the [`Display`](fmt::Display) form is lossy.
#[derive(Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct WideString {
    units: Vec<u16>,
}

impl WideString {
    /// Create an empty wide string.
    #[inline]
    pub const fn new() -> Self {
        Self { units: Vec::new() }
    }

    /// Wrap existing code units.
    #[inline]
    pub fn from_units(units: Vec<u16>) -> Self {
        Self { units }
    }

    #[inline]
    pub fn as_units(&self) -> &[u16] {
        &self.units
    }

    #[inline]
    pub fn into_units(self) -> Vec<u16> {
        self.units
    }

    /// Number of code units.
    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Payload size in bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.units.len() * WIDE_WIDTH
    }

    /// Decode to a `String`, replacing unpaired surrogates.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }
}

impl From<&str> for WideString {
    fn from(s: &str) -> Self {
        Self {
            units: s.encode_utf16().collect(),
        }
    }
}

impl From<String> for WideString {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Debug for WideString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WideString({:?})", self.to_string_lossy())
    }
}

impl fmt::Display for WideString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for WideString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

/// Write code units little-endian; `out` is exactly `units.len() * 2` long.
pub(crate) fn write_units(units: &[u16], out: &mut [u8]) {
    LittleEndian::write_u16_into(units, out);
}

/// Read little-endian code units, dropping an odd trailing byte.
pub(crate) fn read_units(bytes: &[u8]) -> Vec<u16> {
    let whole = &bytes[..bytes.len() - bytes.len() % WIDE_WIDTH];
    let mut units = vec![0u16; whole.len() / WIDE_WIDTH];
    LittleEndian::read_u16_into(whole, &mut units);
    units
}
