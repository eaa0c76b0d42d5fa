//! Forward-only cursor over a borrowed byte slice.
//!
//! [`BinaryReader`] hands out fixed-width runs and size-prefixed runs as
//! subslices of the input; nothing is copied.

use crate::{varsize, Error, Result};

/// Bounds-checked cursor over `&[u8]`.
///
/// Every read is bounds-checked against the slice; a read that would pass the
/// end fails with [`Error::CapacityExceeded`] and leaves the position alone.
///
/// # Example
///
/// ```
/// use bytepack_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x23, b'a', b'b', b'c'];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_bytes(2).unwrap(), &[0x01, 0x02]);
/// assert_eq!(reader.read_sized_bytes().unwrap(), b"abc");
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Reader positioned at the first byte.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Reader resuming at `position`, e.g. a stream's cursor.
    #[inline]
    pub const fn new_at(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Whether the cursor sits at (or past) the end.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Unconsumed tail of the slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// The next `count` bytes, cursor unchanged.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::capacity(count, self.remaining(), self.position));
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// The next `count` bytes; the cursor moves past them.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a VarSize prefix and advance past it.
    pub fn read_size(&mut self) -> Result<u64> {
        let (magnitude, len) = varsize::decode(self.remaining_bytes()).map_err(|_| {
            let needed = self
                .remaining_bytes()
                .first()
                .map_or(1, |&first| varsize::prefix_len(first));
            Error::capacity(needed, self.remaining(), self.position)
        })?;
        self.position += len;
        Ok(magnitude)
    }

    /// Read a VarSize prefix followed by that many payload bytes.
    ///
    /// On failure the position is restored to the start of the prefix.
    pub fn read_sized_bytes(&mut self) -> Result<&'a [u8]> {
        let start = self.position;
        let size = self.read_size()?;
        let count = match usize::try_from(size) {
            Ok(count) => count,
            Err(_) => {
                let available = self.remaining();
                self.position = start;
                return Err(Error::capacity(usize::MAX, available, start));
            }
        };
        match self.read_bytes(count) {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                self.position = start;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bytes() {
        let data = [0x01u8, 0x02, 0x03, 0x04, 0xFF];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_bytes(4).unwrap(), &[1, 2, 3, 4]);
        assert_eq!(reader.remaining_bytes(), &[0xFF]);
        assert_eq!(reader.read_bytes(1).unwrap(), &[0xFF]);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let reader = BinaryReader::new(&data);

        assert_eq!(reader.peek_bytes(2).unwrap(), &[0x01, 0x02]);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_eof_error() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        match reader.read_bytes(4) {
            Err(Error::CapacityExceeded {
                needed,
                available,
                position,
            }) => {
                assert_eq!((needed, available, position), (4, 2, 0));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_read_sized_bytes() {
        let mut data = varsize::encode(3).as_bytes().to_vec();
        data.extend_from_slice(b"xyz");
        data.extend_from_slice(varsize::encode(0).as_bytes());
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_sized_bytes().unwrap(), b"xyz");
        assert_eq!(reader.read_sized_bytes().unwrap(), b"");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_sized_bytes_past_end_restores_position() {
        let mut data = varsize::encode(10).as_bytes().to_vec();
        data.extend_from_slice(b"short");
        let mut reader = BinaryReader::new(&data);

        assert!(reader.read_sized_bytes().unwrap_err().is_capacity_exceeded());
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_truncated_size_prefix() {
        // first byte announces a 3-byte prefix
        let data = [0x60, 0x00];
        let mut reader = BinaryReader::new_at(&data, 0);

        assert!(reader.read_size().unwrap_err().is_capacity_exceeded());
    }
}
