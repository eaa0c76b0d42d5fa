//! Typed field codec.
//!
//! Every field type is classified once, through its [`Field`] impl, into one
//! of four [`Category`] values:
//!
//! | Category      | Wire form                         | Types                                  |
//! |---------------|-----------------------------------|----------------------------------------|
//! | `FixedLayout` | `size` raw bytes, no prefix       | integers, floats, `bool`, enums, `Guid`  |
//! | `Text`        | VarSize byte length + code units  | `String` (width 1), `WideString` (2)   |
//! | `Path`        | as `Text` of width 2              | `PathBuf`                              |
//! | `Blob`        | VarSize byte length + bytes       | `Vec<u8>`                              |
//!
//! Buffer size prediction and the write pass both go through
//! [`Category::encoded_len`], so a predicted buffer is always filled exactly.
//! A type with no `Field` impl has no category and is rejected at compile
//! time.

use std::fmt;
use std::path::PathBuf;

use byteorder::{ByteOrder, LittleEndian};

use bytepack_common::{varsize, Guid};

use crate::text::{self, WideString};

/// Encoding category of a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Statically sized value written as exactly `size` bytes.
    FixedLayout { size: usize },
    /// Character text; the payload is `units * width` bytes.
    Text { width: usize },
    /// A filesystem path, carried as wide text.
    Path,
    /// Opaque variable-length bytes.
    Blob,
}

impl Category {
    /// Whether fields of this category carry a VarSize length prefix.
    #[inline]
    pub const fn is_variable(self) -> bool {
        !matches!(self, Self::FixedLayout { .. })
    }

    /// Total bytes a field of this category occupies on the wire for a
    /// payload of `payload_len` bytes.
    #[inline]
    pub const fn encoded_len(self, payload_len: usize) -> usize {
        match self {
            Self::FixedLayout { size } => size,
            _ => varsize::encoded_len(payload_len as u64) + payload_len,
        }
    }

    /// Short lowercase name of the category.
    pub const fn name(self) -> &'static str {
        match self {
            Self::FixedLayout { .. } => "fixed",
            Self::Text { .. } => "text",
            Self::Path => "path",
            Self::Blob => "blob",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedLayout { size } => write!(f, "fixed({size})"),
            Self::Text { width } => write!(f, "text(width {width})"),
            Self::Path => f.write_str("path"),
            Self::Blob => f.write_str("blob"),
        }
    }
}

/// A value that can be packed into a [`ByteStream`](crate::ByteStream).
///
/// Implementations describe the payload only; the stream adds the length
/// prefix for variable categories. `write_payload` always receives a slice of
/// exactly `payload_len()` bytes, and `read_payload` receives whatever the
/// wire held for this field, which for a mismatched schema may be garbage.
/// It must not panic on such input.
pub trait Field: Sized {
    /// The encoding category of this type.
    const CATEGORY: Category;

    /// Payload size in bytes, excluding any length prefix.
    fn payload_len(&self) -> usize;

    /// Write the payload into `out`, which is exactly `payload_len()` long.
    fn write_payload(&self, out: &mut [u8]);

    /// Rebuild a value from its payload bytes.
    fn read_payload(bytes: &[u8]) -> Self;

    /// Bytes this field will occupy on the wire, prefix included.
    #[inline]
    fn encoded_len(&self) -> usize {
        Self::CATEGORY.encoded_len(self.payload_len())
    }
}

/// A plain value with a statically known byte size.
///
/// Implementing this gives the type a [`Field`] impl in the
/// [`Category::FixedLayout`] category. Both methods are handed slices of
/// exactly [`SIZE`](Self::SIZE) bytes.
pub trait FixedLayout: Sized {
    /// Size of the value on the wire.
    const SIZE: usize;

    /// Write the value into `out`.
    fn encode_fixed(&self, out: &mut [u8]);

    /// Read the value back from `bytes`.
    fn decode_fixed(bytes: &[u8]) -> Self;
}

impl<T: FixedLayout> Field for T {
    const CATEGORY: Category = Category::FixedLayout { size: T::SIZE };

    #[inline]
    fn payload_len(&self) -> usize {
        T::SIZE
    }

    #[inline]
    fn write_payload(&self, out: &mut [u8]) {
        self.encode_fixed(out);
    }

    #[inline]
    fn read_payload(bytes: &[u8]) -> Self {
        T::decode_fixed(bytes)
    }
}

macro_rules! impl_fixed_scalar {
    ($($ty:ty => $write:ident, $read:ident;)+) => {$(
        impl FixedLayout for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn encode_fixed(&self, out: &mut [u8]) {
                LittleEndian::$write(out, *self);
            }

            #[inline]
            fn decode_fixed(bytes: &[u8]) -> Self {
                LittleEndian::$read(bytes)
            }
        }
    )+};
}

impl_fixed_scalar! {
    u16 => write_u16, read_u16;
    u32 => write_u32, read_u32;
    u64 => write_u64, read_u64;
    u128 => write_u128, read_u128;
    i16 => write_i16, read_i16;
    i32 => write_i32, read_i32;
    i64 => write_i64, read_i64;
    i128 => write_i128, read_i128;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
}

impl FixedLayout for u8 {
    const SIZE: usize = 1;

    #[inline]
    fn encode_fixed(&self, out: &mut [u8]) {
        out[0] = *self;
    }

    #[inline]
    fn decode_fixed(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

impl FixedLayout for i8 {
    const SIZE: usize = 1;

    #[inline]
    fn encode_fixed(&self, out: &mut [u8]) {
        out[0] = *self as u8;
    }

    #[inline]
    fn decode_fixed(bytes: &[u8]) -> Self {
        bytes[0] as i8
    }
}

/// Any non-zero byte reads as `true`.
impl FixedLayout for bool {
    const SIZE: usize = 1;

    #[inline]
    fn encode_fixed(&self, out: &mut [u8]) {
        out[0] = u8::from(*self);
    }

    #[inline]
    fn decode_fixed(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// Stored as 8 bytes on every platform.
impl FixedLayout for usize {
    const SIZE: usize = 8;

    #[inline]
    fn encode_fixed(&self, out: &mut [u8]) {
        LittleEndian::write_u64(out, *self as u64);
    }

    #[inline]
    fn decode_fixed(bytes: &[u8]) -> Self {
        LittleEndian::read_u64(bytes) as usize
    }
}

/// A Unicode scalar value as 4 bytes; invalid values read as U+FFFD.
impl FixedLayout for char {
    const SIZE: usize = 4;

    #[inline]
    fn encode_fixed(&self, out: &mut [u8]) {
        LittleEndian::write_u32(out, u32::from(*self));
    }

    #[inline]
    fn decode_fixed(bytes: &[u8]) -> Self {
        char::from_u32(LittleEndian::read_u32(bytes)).unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

impl FixedLayout for Guid {
    const SIZE: usize = Guid::LEN;

    #[inline]
    fn encode_fixed(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_bytes());
    }

    #[inline]
    fn decode_fixed(bytes: &[u8]) -> Self {
        let mut raw = [0u8; Guid::LEN];
        raw.copy_from_slice(bytes);
        Guid::from_bytes(raw)
    }
}

impl<const N: usize> FixedLayout for [u8; N] {
    const SIZE: usize = N;

    #[inline]
    fn encode_fixed(&self, out: &mut [u8]) {
        out.copy_from_slice(self);
    }

    #[inline]
    fn decode_fixed(bytes: &[u8]) -> Self {
        let mut raw = [0u8; N];
        raw.copy_from_slice(bytes);
        raw
    }
}

/// Narrow text: UTF-8 bytes, character width 1.
///
/// Invalid UTF-8 on the read side is replaced rather than rejected.
impl Field for String {
    const CATEGORY: Category = Category::Text { width: 1 };

    #[inline]
    fn payload_len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn write_payload(&self, out: &mut [u8]) {
        out.copy_from_slice(self.as_bytes());
    }

    fn read_payload(bytes: &[u8]) -> Self {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

impl Field for WideString {
    const CATEGORY: Category = Category::Text {
        width: text::WIDE_WIDTH,
    };

    #[inline]
    fn payload_len(&self) -> usize {
        self.byte_len()
    }

    #[inline]
    fn write_payload(&self, out: &mut [u8]) {
        text::write_units(self.as_units(), out);
    }

    fn read_payload(bytes: &[u8]) -> Self {
        WideString::from_units(text::read_units(bytes))
    }
}

/// Paths travel as wide text of their lossy string form.
impl Field for PathBuf {
    const CATEGORY: Category = Category::Path;

    fn payload_len(&self) -> usize {
        self.to_string_lossy().encode_utf16().count() * text::WIDE_WIDTH
    }

    fn write_payload(&self, out: &mut [u8]) {
        let text = self.to_string_lossy();
        for (unit, chunk) in text
            .encode_utf16()
            .zip(out.chunks_exact_mut(text::WIDE_WIDTH))
        {
            LittleEndian::write_u16(chunk, unit);
        }
    }

    fn read_payload(bytes: &[u8]) -> Self {
        PathBuf::from(String::from_utf16_lossy(&text::read_units(bytes)))
    }
}

impl Field for Vec<u8> {
    const CATEGORY: Category = Category::Blob;

    #[inline]
    fn payload_len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn write_payload(&self, out: &mut [u8]) {
        out.copy_from_slice(self);
    }

    #[inline]
    fn read_payload(bytes: &[u8]) -> Self {
        bytes.to_vec()
    }
}

/// Implement [`FixedLayout`] for `zerocopy` plain-old-data types.
///
/// The type's in-memory bytes are its wire bytes, so prefer fields with an
/// explicit byte order (`zerocopy::byteorder`) for portable output.
///
/// ```
/// use bytepack_stream::{impl_fixed_layout, Field, Category};
/// use bytepack_stream::{FromBytes, Immutable, IntoBytes, KnownLayout};
///
/// #[derive(FromBytes, IntoBytes, Immutable, KnownLayout)]
/// #[repr(C)]
/// struct Rgba {
///     r: u8,
///     g: u8,
///     b: u8,
///     a: u8,
/// }
///
/// impl_fixed_layout!(Rgba);
///
/// assert_eq!(<Rgba as Field>::CATEGORY, Category::FixedLayout { size: 4 });
/// ```
#[macro_export]
macro_rules! impl_fixed_layout {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::FixedLayout for $ty {
            const SIZE: usize = ::core::mem::size_of::<$ty>();

            #[inline]
            fn encode_fixed(&self, out: &mut [u8]) {
                out.copy_from_slice($crate::IntoBytes::as_bytes(self));
            }

            #[inline]
            fn decode_fixed(bytes: &[u8]) -> Self {
                <$ty as $crate::FromBytes>::read_from_bytes(bytes)
                    .unwrap_or_else(|_| <$ty as $crate::FromZeros>::new_zeroed())
            }
        }
    )+};
}

/// Implement [`FixedLayout`] for a fieldless `Copy` enum with an integer repr.
///
/// Unknown discriminants read back as the fallback variant.
///
/// ```
/// use bytepack_stream::{impl_fixed_enum, FixedLayout};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// #[repr(u8)]
/// enum Kind {
///     Unknown = 0,
///     Male = 1,
///     Female = 2,
/// }
///
/// impl_fixed_enum!(Kind: u8 { Unknown, Male, Female } else Unknown);
///
/// assert_eq!(Kind::SIZE, 1);
/// assert_eq!(Kind::decode_fixed(&[2]), Kind::Female);
/// assert_eq!(Kind::decode_fixed(&[9]), Kind::Unknown);
/// ```
#[macro_export]
macro_rules! impl_fixed_enum {
    ($ty:ident : $repr:ty { $($variant:ident),+ $(,)? } else $fallback:ident) => {
        impl $crate::FixedLayout for $ty {
            const SIZE: usize = <$repr as $crate::FixedLayout>::SIZE;

            #[inline]
            fn encode_fixed(&self, out: &mut [u8]) {
                <$repr as $crate::FixedLayout>::encode_fixed(&(*self as $repr), out);
            }

            fn decode_fixed(bytes: &[u8]) -> Self {
                let raw = <$repr as $crate::FixedLayout>::decode_fixed(bytes);
                $(
                    if raw == $ty::$variant as $repr {
                        return $ty::$variant;
                    }
                )+
                $ty::$fallback
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_of<F: Field>(field: &F) -> Vec<u8> {
        let mut out = vec![0u8; field.payload_len()];
        field.write_payload(&mut out);
        out
    }

    #[test]
    fn test_scalar_categories() {
        assert_eq!(<u8 as Field>::CATEGORY, Category::FixedLayout { size: 1 });
        assert_eq!(<u64 as Field>::CATEGORY, Category::FixedLayout { size: 8 });
        assert_eq!(<usize as Field>::CATEGORY, Category::FixedLayout { size: 8 });
        assert_eq!(<Guid as Field>::CATEGORY, Category::FixedLayout { size: 16 });
        assert_eq!(<String as Field>::CATEGORY, Category::Text { width: 1 });
        assert_eq!(<WideString as Field>::CATEGORY, Category::Text { width: 2 });
        assert_eq!(<PathBuf as Field>::CATEGORY, Category::Path);
        assert_eq!(<Vec<u8> as Field>::CATEGORY, Category::Blob);
    }

    #[test]
    fn test_scalars_are_little_endian() {
        assert_eq!(payload_of(&0x0102_0304u32), vec![4, 3, 2, 1]);
        assert_eq!(payload_of(&-2i16), vec![0xFE, 0xFF]);
        assert_eq!(payload_of(&21usize), vec![21, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(u32::read_payload(&[4, 3, 2, 1]), 0x0102_0304);
    }

    #[test]
    fn test_bool_and_char_tolerate_garbage() {
        assert!(bool::read_payload(&[0x7F]));
        assert!(!bool::read_payload(&[0]));
        assert_eq!(char::read_payload(&[0xFF, 0xFF, 0xFF, 0xFF]), char::REPLACEMENT_CHARACTER);
        assert_eq!(char::read_payload(&payload_of(&'é')), 'é');
    }

    #[test]
    fn test_encoded_len_per_category() {
        assert_eq!(7u64.encoded_len(), 8);
        assert_eq!(String::new().encoded_len(), 1);
        assert_eq!("HBann".to_string().encoded_len(), 1 + 5);
        assert_eq!(WideString::from("Claudiu").encoded_len(), 1 + 14);
        assert_eq!(vec![0u8; 300].encoded_len(), 2 + 300);
        assert_eq!(PathBuf::from("some/path.idk").encoded_len(), 1 + 26);
    }

    #[test]
    fn test_path_payload_is_wide_text() {
        let path = PathBuf::from("a/b");
        assert_eq!(payload_of(&path), vec![b'a', 0, b'/', 0, b'b', 0]);
        assert_eq!(PathBuf::read_payload(&payload_of(&path)), path);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        assert_eq!(String::read_payload(&[b'o', b'k', 0xFF]), "ok\u{FFFD}");
    }

    #[test]
    fn test_category_is_variable() {
        assert!(Category::Path.is_variable());
        assert!(Category::Text { width: 2 }.is_variable());
        assert!(!Category::FixedLayout { size: 4 }.is_variable());
        assert!(Category::Blob.is_variable());
    }
}
