//! Ordered field lists and the one-shot serialize/deserialize passes.
//!
//! A tuple of field references, `(&a, &b, &c)`, is a [`FieldList`]; a tuple
//! of mutable slots, `(&mut a, &mut b, &mut c)`, is a [`FieldSlots`]. The
//! tuple order is the wire order, so writer and reader must list the same
//! types in the same order. Nothing on the wire checks this.
//!
//! ```
//! use bytepack_stream::{deserialize, predict_total_size, serialize};
//!
//! let kind = 1u8;
//! let nickname = String::from("HBann");
//! let age = 21u64;
//!
//! let fields = (&kind, &nickname, &age);
//! let bytes = serialize(&fields).unwrap();
//! assert_eq!(bytes.len(), predict_total_size(&fields));
//!
//! let (mut kind2, mut nickname2, mut age2) = (0u8, String::new(), 0u64);
//! deserialize(bytes, (&mut kind2, &mut nickname2, &mut age2)).unwrap();
//! assert_eq!((kind2, nickname2.as_str(), age2), (1, "HBann", 21));
//! ```

use crate::{ByteStream, Field, Result};

/// An ordered list of fields to write.
pub trait FieldList {
    /// Exact number of bytes the list occupies on the wire.
    fn encoded_len(&self) -> usize;

    /// Write every field in order.
    fn write_all(&self, stream: &mut ByteStream) -> Result<()>;
}

/// An ordered list of slots to fill from the wire.
pub trait FieldSlots {
    /// Read every field in order, then assign all slots.
    fn read_all(self, stream: &mut ByteStream) -> Result<()>;
}

impl<F: Field> FieldList for [F] {
    fn encoded_len(&self) -> usize {
        self.iter().map(Field::encoded_len).sum()
    }

    fn write_all(&self, stream: &mut ByteStream) -> Result<()> {
        for field in self {
            stream.write_field(field)?;
        }
        Ok(())
    }
}

impl<L: FieldList + ?Sized> FieldList for &L {
    fn encoded_len(&self) -> usize {
        (**self).encoded_len()
    }

    fn write_all(&self, stream: &mut ByteStream) -> Result<()> {
        (**self).write_all(stream)
    }
}

macro_rules! impl_tuple_lists {
    ($(($($name:ident $idx:tt),+))+) => {$(
        impl<'a, $($name: Field),+> FieldList for ($(&'a $name,)+) {
            fn encoded_len(&self) -> usize {
                0 $(+ Field::encoded_len(self.$idx))+
            }

            fn write_all(&self, stream: &mut ByteStream) -> Result<()> {
                $(stream.write_field(self.$idx)?;)+
                Ok(())
            }
        }

        impl<'a, $($name: Field),+> FieldSlots for ($(&'a mut $name,)+) {
            fn read_all(self, stream: &mut ByteStream) -> Result<()> {
                let values = ($(stream.read_field::<$name>()?,)+);
                $(*self.$idx = values.$idx;)+
                Ok(())
            }
        }
    )+};
}

impl_tuple_lists! {
    (A 0)
    (A 0, B 1)
    (A 0, B 1, C 2)
    (A 0, B 1, C 2, D 3)
    (A 0, B 1, C 2, D 3, E 4)
    (A 0, B 1, C 2, D 3, E 4, F 5)
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6)
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7)
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8)
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9)
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10)
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11)
}

/// Exact buffer size needed to serialize `fields`.
#[inline]
pub fn predict_total_size<L: FieldList + ?Sized>(fields: &L) -> usize {
    fields.encoded_len()
}

/// Serialize `fields` into a buffer of exactly the predicted size.
pub fn serialize<L: FieldList + ?Sized>(fields: &L) -> Result<Vec<u8>> {
    let mut stream = ByteStream::new();
    stream.create_for(fields);
    stream.write_all(fields)?;
    stream.release()
}

/// Fill `slots`, in order, from `bytes`.
///
/// Slots are left untouched if any read fails. Bytes left over after the
/// last slot are ignored.
pub fn deserialize<S: FieldSlots>(bytes: Vec<u8>, slots: S) -> Result<()> {
    let mut stream = ByteStream::from_bytes(bytes);
    let result = stream.read_all(slots);
    stream.clear();
    result
}
