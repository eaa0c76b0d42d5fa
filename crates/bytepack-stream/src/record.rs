//! Records: structs whose field order is declared once.
//!
//! The [`record!`](crate::record) macro takes a struct definition and derives
//! the sizing, writing and reading of its fields from the single field list
//! written in the definition, so encode and decode can never disagree about
//! order within one program.

use crate::{ByteStream, Result};

/// A fixed-schema sequence of fields.
///
/// Usually implemented through [`record!`](crate::record).
pub trait Record: Sized {
    /// Exact number of bytes the record occupies on the wire.
    fn encoded_len(&self) -> usize;

    /// Write the fields in declaration order.
    fn write_fields(&self, stream: &mut ByteStream) -> Result<()>;

    /// Read the fields in declaration order.
    fn read_fields(stream: &mut ByteStream) -> Result<Self>;

    /// Serialize into a buffer of exactly [`encoded_len`](Self::encoded_len) bytes.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut stream = ByteStream::with_capacity(self.encoded_len());
        self.write_fields(&mut stream)?;
        stream.release()
    }

    /// Deserialize from a buffer produced by [`to_bytes`](Self::to_bytes).
    fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mut stream = ByteStream::from_bytes(bytes);
        let record = Self::read_fields(&mut stream);
        stream.clear();
        record
    }
}

/// Declare a struct together with its [`Record`] impl.
///
/// Fields are written and read in the order they are declared.
///
/// ```
/// use bytepack_stream::{record, Record};
///
/// record! {
///     #[derive(Debug, PartialEq)]
///     pub struct Point {
///         pub x: i32,
///         pub y: i32,
///         pub label: String,
///     }
/// }
///
/// let point = Point { x: 3, y: -4, label: "origin".into() };
/// let bytes = point.to_bytes().unwrap();
/// assert_eq!(bytes.len(), 4 + 4 + 1 + 6);
/// assert_eq!(Point::from_bytes(bytes).unwrap(), point);
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            fn encoded_len(&self) -> usize {
                0 $(+ $crate::Field::encoded_len(&self.$field))*
            }

            #[allow(unused_variables)]
            fn write_fields(&self, stream: &mut $crate::ByteStream) -> $crate::Result<()> {
                $(stream.write_field(&self.$field)?;)*
                Ok(())
            }

            #[allow(unused_variables)]
            fn read_fields(stream: &mut $crate::ByteStream) -> $crate::Result<Self> {
                Ok(Self {
                    $($field: stream.read_field::<$ty>()?,)*
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::WideString;

    use super::*;

    crate::record! {
        #[derive(Debug, Clone, PartialEq, Default)]
        struct Sample {
            id: u32,
            name: String,
            wide: WideString,
            path: PathBuf,
            blob: Vec<u8>,
        }
    }

    crate::record! {
        #[derive(Debug, PartialEq)]
        struct Empty {}
    }

    #[test]
    fn test_record_roundtrip() {
        let sample = Sample {
            id: 42,
            name: "name".into(),
            wide: WideString::from("wide"),
            path: PathBuf::from("dir/file.bin"),
            blob: vec![0xAB; 300],
        };
        let bytes = sample.to_bytes().unwrap();
        assert_eq!(bytes.len(), sample.encoded_len());
        assert_eq!(Sample::from_bytes(bytes).unwrap(), sample);
    }

    #[test]
    fn test_default_record_size() {
        // u32 + four empty variable fields, one prefix byte each
        assert_eq!(Sample::default().encoded_len(), 4 + 4);
    }

    #[test]
    fn test_empty_record() {
        let bytes = Empty {}.to_bytes().unwrap();
        assert!(bytes.is_empty());
        assert_eq!(Empty::from_bytes(bytes).unwrap(), Empty {});
    }

    #[test]
    fn test_truncated_record() {
        let mut bytes = Sample::default().to_bytes().unwrap();
        bytes.pop();
        assert!(Sample::from_bytes(bytes).unwrap_err().is_capacity_exceeded());
    }
}
