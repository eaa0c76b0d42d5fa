//! Exactly-sized, cursor-addressed byte buffer.
//!
//! A [`ByteStream`] runs one pass over one buffer: either a write pass, which
//! starts from a zeroed buffer of a predicted size and fills it front to back,
//! or a read pass, which consumes an existing buffer front to back. The cursor
//! only moves forward and every access is bounds-checked.
//!
//! ```text
//!  create(n) --> Writing --write_*--> release() --> Released
//!  init(buf) --> Reading --read_*---> clear()   --> Released
//! ```

use std::io;

use tracing::{debug, trace, warn};

use bytepack_common::{varsize, BinaryReader, StreamState};

use crate::field::{Category, Field};
use crate::list::{FieldList, FieldSlots};
use crate::{Error, Result};

/// Owned byte buffer plus a forward-only cursor.
///
/// # Example
///
/// ```
/// use bytepack_stream::ByteStream;
///
/// let mut stream = ByteStream::new();
/// stream.create(1 + 4);
/// stream.write_fixed(&[7]).unwrap();
/// stream.write_variable(b"abc").unwrap();
/// let bytes = stream.release().unwrap();
/// assert_eq!(bytes, [7, 0x23, b'a', b'b', b'c']);
///
/// let mut stream = ByteStream::from_bytes(bytes);
/// assert_eq!(stream.read_fixed(1).unwrap(), &[7]);
/// assert_eq!(stream.read_variable().unwrap(), b"abc");
/// stream.clear();
/// ```
#[derive(Debug, Default)]
pub struct ByteStream {
    buffer: Vec<u8>,
    position: usize,
    state: StreamState,
}

impl ByteStream {
    /// Create an uninitialized stream.
    #[inline]
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            position: 0,
            state: StreamState::Uninitialized,
        }
    }

    /// Create a stream already in a write pass over `size` zeroed bytes.
    pub fn with_capacity(size: usize) -> Self {
        let mut stream = Self::new();
        stream.create(size);
        stream
    }

    /// Create a stream already in a read pass over `bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mut stream = Self::new();
        stream.init(bytes);
        stream
    }

    /// Start a write pass over a zeroed buffer of exactly `size` bytes.
    ///
    /// Whatever the stream held before is dropped.
    pub fn create(&mut self, size: usize) {
        self.buffer = vec![0u8; size];
        self.position = 0;
        self.state = StreamState::Writing;
        trace!(capacity = size, "byte stream created for writing");
    }

    /// Start a write pass sized for `fields`.
    pub fn create_for<L: FieldList + ?Sized>(&mut self, fields: &L) {
        self.create(fields.encoded_len());
    }

    /// Start a read pass over `bytes`.
    pub fn init(&mut self, bytes: Vec<u8>) {
        trace!(len = bytes.len(), "byte stream initialized for reading");
        self.buffer = bytes;
        self.position = 0;
        self.state = StreamState::Reading;
    }

    #[inline]
    pub const fn state(&self) -> StreamState {
        self.state
    }

    /// Cursor offset from the start of the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Size of the buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes between the cursor and the end of the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Whether the cursor has reached the end of the buffer.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Append `bytes` with no length prefix.
    pub fn write_fixed(&mut self, bytes: &[u8]) -> Result<()> {
        let size = bytes.len();
        self.put(Category::FixedLayout { size }, size, |out| {
            out.copy_from_slice(bytes)
        })
    }

    /// Append a VarSize length prefix followed by `bytes`.
    ///
    /// Nothing is written unless prefix and payload both fit.
    pub fn write_variable(&mut self, bytes: &[u8]) -> Result<()> {
        self.put(Category::Blob, bytes.len(), |out| out.copy_from_slice(bytes))
    }

    /// Append one typed field.
    pub fn write_field<F: Field>(&mut self, field: &F) -> Result<()> {
        self.put(F::CATEGORY, field.payload_len(), |out| {
            field.write_payload(out)
        })
    }

    /// Append every field of a list, in order.
    pub fn write_all<L: FieldList + ?Sized>(&mut self, fields: &L) -> Result<()> {
        fields.write_all(self)
    }

    /// Read `size` bytes at the cursor.
    pub fn read_fixed(&mut self, size: usize) -> Result<&[u8]> {
        self.expect_state("read from", StreamState::Reading)?;
        let mut reader = BinaryReader::new_at(&self.buffer, self.position);
        let bytes = reader.read_bytes(size).map_err(aborted)?;
        self.position = reader.position();
        Ok(bytes)
    }

    /// Read a VarSize length prefix and the payload it announces.
    ///
    /// On failure the cursor stays at the prefix.
    pub fn read_variable(&mut self) -> Result<&[u8]> {
        self.expect_state("read from", StreamState::Reading)?;
        let mut reader = BinaryReader::new_at(&self.buffer, self.position);
        let bytes = reader.read_sized_bytes().map_err(aborted)?;
        self.position = reader.position();
        Ok(bytes)
    }

    /// Read one typed field.
    pub fn read_field<F: Field>(&mut self) -> Result<F> {
        let bytes = match F::CATEGORY {
            Category::FixedLayout { size } => self.read_fixed(size)?,
            _ => self.read_variable()?,
        };
        Ok(F::read_payload(bytes))
    }

    /// Read every slot of a list, in order.
    ///
    /// Slots are only assigned once all fields have been read.
    pub fn read_all<S: FieldSlots>(&mut self, slots: S) -> Result<()> {
        slots.read_all(self)
    }

    /// Hand the written buffer to the caller, ending the write pass.
    pub fn release(&mut self) -> Result<Vec<u8>> {
        self.expect_state("release", StreamState::Writing)?;
        if self.position != self.buffer.len() {
            warn!(
                written = self.position,
                capacity = self.buffer.len(),
                "byte stream released with unused capacity"
            );
        }
        self.position = 0;
        self.state = StreamState::Released;
        trace!(len = self.buffer.len(), "byte stream released");
        Ok(std::mem::take(&mut self.buffer))
    }

    /// Drop the buffer, ending whatever pass was running.
    pub fn clear(&mut self) {
        trace!(
            position = self.position,
            capacity = self.buffer.len(),
            "byte stream cleared"
        );
        self.buffer = Vec::new();
        self.position = 0;
        self.state = StreamState::Released;
    }

    fn expect_state(&self, operation: &'static str, expected: StreamState) -> Result<()> {
        if self.state != expected {
            debug!(operation, state = %self.state, "byte stream in wrong state");
            return Err(Error::invalid_state(operation, self.state));
        }
        Ok(())
    }

    /// Reserve `len` bytes at the cursor and advance past them.
    fn reserve(&mut self, len: usize) -> Result<&mut [u8]> {
        self.expect_state("write to", StreamState::Writing)?;
        let available = self.remaining();
        if len > available {
            return Err(aborted(bytepack_common::Error::capacity(
                len,
                available,
                self.position,
            )));
        }
        let start = self.position;
        self.position += len;
        Ok(&mut self.buffer[start..start + len])
    }

    /// Write one field of `category` with a `payload_len`-byte payload.
    ///
    /// Sizing goes through [`Category::encoded_len`], the same function
    /// buffer prediction uses.
    fn put(
        &mut self,
        category: Category,
        payload_len: usize,
        fill: impl FnOnce(&mut [u8]),
    ) -> Result<()> {
        let slot = self.reserve(category.encoded_len(payload_len))?;
        let start = if category.is_variable() {
            varsize::encode_into(payload_len as u64, &mut *slot).map_err(aborted)?
        } else {
            0
        };
        fill(&mut slot[start..]);
        Ok(())
    }
}

fn aborted(err: bytepack_common::Error) -> Error {
    debug!(%err, "byte stream pass aborted");
    Error::Common(err)
}

/// Raw byte writes during a write pass; a full buffer accepts zero bytes.
impl io::Write for ByteStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.state != StreamState::Writing {
            return Err(io::Error::other(Error::invalid_state("write to", self.state)));
        }
        let count = buf.len().min(self.remaining());
        self.write_fixed(&buf[..count]).map_err(io::Error::other)?;
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Raw byte reads during a read pass; an exhausted buffer reads as EOF.
impl io::Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.state != StreamState::Reading {
            return Err(io::Error::other(Error::invalid_state("read from", self.state)));
        }
        let count = buf.len().min(self.remaining());
        let bytes = self.read_fixed(count).map_err(io::Error::other)?;
        buf[..count].copy_from_slice(bytes);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    #[test]
    fn test_new_stream_is_uninitialized() {
        let mut stream = ByteStream::new();
        assert_eq!(stream.state(), StreamState::Uninitialized);
        assert!(stream.write_fixed(&[1]).unwrap_err().is_invalid_state());
        assert!(stream.read_fixed(1).unwrap_err().is_invalid_state());
        assert!(stream.release().unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_create_zeroes_buffer() {
        let mut stream = ByteStream::with_capacity(4);
        assert_eq!(stream.state(), StreamState::Writing);
        assert_eq!(stream.capacity(), 4);
        stream.write_fixed(&[9]).unwrap();
        stream.write_fixed(&[]).unwrap();
        assert_eq!(stream.position(), 1);
        assert_eq!(stream.remaining(), 3);
        assert_eq!(stream.release().unwrap(), vec![9, 0, 0, 0]);
    }

    #[test]
    fn test_write_past_capacity() {
        let mut stream = ByteStream::with_capacity(3);
        stream.write_fixed(&[1, 2]).unwrap();
        let err = stream.write_fixed(&[3, 4]).unwrap_err();
        assert!(err.is_capacity_exceeded());
        // the failed write left the cursor alone
        assert_eq!(stream.position(), 2);
    }

    #[test]
    fn test_write_variable_is_all_or_nothing() {
        // prefix fits, payload does not
        let mut stream = ByteStream::with_capacity(3);
        assert!(stream.write_variable(b"abc").unwrap_err().is_capacity_exceeded());
        assert_eq!(stream.position(), 0);
        stream.write_variable(b"ab").unwrap();
        assert!(stream.is_exhausted());
    }

    #[test]
    fn test_read_past_end() {
        let mut stream = ByteStream::from_bytes(vec![1, 2, 3]);
        assert_eq!(stream.read_fixed(2).unwrap(), &[1, 2]);
        assert!(stream.read_fixed(2).unwrap_err().is_capacity_exceeded());
        assert_eq!(stream.position(), 2);
    }

    #[test]
    fn test_read_variable_with_long_prefix() {
        // announces 10 bytes, holds 2
        let mut bytes = varsize::encode(10).as_bytes().to_vec();
        bytes.extend_from_slice(&[1, 2]);
        let mut stream = ByteStream::from_bytes(bytes);
        assert!(stream.read_variable().unwrap_err().is_capacity_exceeded());
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn test_passes_do_not_mix() {
        let mut stream = ByteStream::with_capacity(2);
        assert!(stream.read_fixed(1).unwrap_err().is_invalid_state());

        let mut stream = ByteStream::from_bytes(vec![0, 0]);
        assert!(stream.write_fixed(&[1]).unwrap_err().is_invalid_state());
        assert!(stream.release().unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_release_ends_pass() {
        let mut stream = ByteStream::with_capacity(1);
        stream.write_fixed(&[5]).unwrap();
        assert_eq!(stream.release().unwrap(), vec![5]);
        assert_eq!(stream.state(), StreamState::Released);
        assert_eq!(stream.capacity(), 0);
        assert!(stream.write_fixed(&[1]).unwrap_err().is_invalid_state());
        assert!(stream.release().unwrap_err().is_invalid_state());

        // re-create makes it usable again
        stream.create(1);
        stream.write_fixed(&[6]).unwrap();
        assert_eq!(stream.release().unwrap(), vec![6]);
    }

    #[test]
    fn test_clear_ends_read_pass() {
        let mut stream = ByteStream::from_bytes(vec![1, 2]);
        stream.clear();
        assert_eq!(stream.state(), StreamState::Released);
        assert_eq!(stream.capacity(), 0);
        assert!(stream.read_fixed(1).unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_field_roundtrip() {
        let name = String::from("HBann");
        let age = 21u64;
        let size = name.encoded_len() + age.encoded_len();

        let mut stream = ByteStream::with_capacity(size);
        stream.write_field(&name).unwrap();
        stream.write_field(&age).unwrap();
        let bytes = stream.release().unwrap();
        assert_eq!(bytes.len(), size);

        let mut stream = ByteStream::from_bytes(bytes);
        assert_eq!(stream.read_field::<String>().unwrap(), name);
        assert_eq!(stream.read_field::<u64>().unwrap(), age);
        assert!(stream.is_exhausted());
    }

    #[test]
    fn test_io_write_stops_at_capacity() {
        let mut stream = ByteStream::with_capacity(4);
        assert_eq!(Write::write(&mut stream, &[1, 2, 3]).unwrap(), 3);
        assert_eq!(Write::write(&mut stream, &[4, 5]).unwrap(), 1);
        let err = Write::write_all(&mut stream, &[6]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
        assert_eq!(stream.release().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_io_read_until_eof() {
        let mut stream = ByteStream::from_bytes(vec![1, 2, 3]);
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![1, 2, 3]);
        assert!(stream.is_exhausted());
    }

    #[test]
    fn test_io_wrong_state() {
        let mut stream = ByteStream::new();
        let err = Write::write(&mut stream, &[1]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        let inner = err.get_ref().and_then(|e| e.downcast_ref::<Error>()).unwrap();
        assert!(inner.is_invalid_state());

        let mut buf = [0u8; 1];
        let err = stream.read(&mut buf).unwrap_err();
        let inner = err.get_ref().and_then(|e| e.downcast_ref::<Error>()).unwrap();
        assert!(inner.is_invalid_state());
    }
}
