//! Runtime schemas for tooling.
//!
//! Compiled code names its field types statically; tools that handle buffers
//! they did not produce need the same information at runtime. A [`Schema`] is
//! an ordered list of [`FieldSpec`] names parsed from text, and [`Value`] is
//! the dynamically typed field it encodes and decodes. Every spec maps onto
//! the static [`Field`] impl of its Rust type, so the wire format is the same.
//!
//! ```
//! use bytepack_stream::schema::{Schema, Value};
//!
//! let schema: Schema = "u8, str, u64".parse().unwrap();
//! let values = schema.parse_values(&["1", "HBann", "21"]).unwrap();
//! let bytes = schema.encode(&values).unwrap();
//!
//! let entries = schema.decode(bytes).unwrap();
//! assert_eq!(entries[1].value, Value::Str("HBann".into()));
//! assert_eq!(entries[2].offset, 1 + 6);
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use bytepack_common::Guid;

use crate::{ByteStream, Category, Error, Field, Result, WideString};

macro_rules! define_specs {
    ($($variant:ident => $ty:ty, $name:literal;)+) => {
        /// Name of a field type usable in a runtime schema.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum FieldSpec {
            $($variant,)+
        }

        /// A dynamically typed field value.
        #[derive(Debug, Clone, PartialEq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize))]
        #[cfg_attr(feature = "serde", serde(tag = "type", content = "value", rename_all = "lowercase"))]
        pub enum Value {
            $($variant($ty),)+
        }

        impl FieldSpec {
            /// Every spec, in declaration order.
            pub const ALL: &'static [FieldSpec] = &[$(FieldSpec::$variant,)+];

            /// The name used in schema text.
            pub const fn name(self) -> &'static str {
                match self {
                    $(FieldSpec::$variant => $name,)+
                }
            }

            /// Encoding category of the spec's Rust type.
            pub const fn category(self) -> Category {
                match self {
                    $(FieldSpec::$variant => <$ty as Field>::CATEGORY,)+
                }
            }

            /// Read one value of this type from a read-pass stream.
            pub fn read(self, stream: &mut ByteStream) -> Result<Value> {
                Ok(match self {
                    $(FieldSpec::$variant => Value::$variant(stream.read_field::<$ty>()?),)+
                })
            }

            fn lookup(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(FieldSpec::$variant),)+
                    _ => None,
                }
            }
        }

        impl Value {
            /// The spec this value belongs to.
            pub const fn spec(&self) -> FieldSpec {
                match self {
                    $(Value::$variant(_) => FieldSpec::$variant,)+
                }
            }

            /// Bytes the value occupies on the wire.
            pub fn encoded_len(&self) -> usize {
                match self {
                    $(Value::$variant(value) => Field::encoded_len(value),)+
                }
            }

            /// Write the value to a write-pass stream.
            pub fn write_to(&self, stream: &mut ByteStream) -> Result<()> {
                match self {
                    $(Value::$variant(value) => stream.write_field(value),)+
                }
            }
        }
    };
}

define_specs! {
    U8 => u8, "u8";
    U16 => u16, "u16";
    U32 => u32, "u32";
    U64 => u64, "u64";
    I8 => i8, "i8";
    I16 => i16, "i16";
    I32 => i32, "i32";
    I64 => i64, "i64";
    F32 => f32, "f32";
    F64 => f64, "f64";
    Bool => bool, "bool";
    Usize => usize, "usize";
    Char => char, "char";
    Guid => Guid, "guid";
    Str => String, "str";
    WStr => WideString, "wstr";
    Path => PathBuf, "path";
    Blob => Vec<u8>, "blob";
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FieldSpec::lookup(&s.trim().to_ascii_lowercase())
            .ok_or_else(|| bytepack_common::Error::UnknownFieldCategory(s.trim().to_string()).into())
    }
}

impl FieldSpec {
    /// Parse a literal into a value of this type.
    ///
    /// Blobs are written as hex (`deadbeef`), GUIDs in their braced or bare
    /// text form, booleans as `true`/`false`/`1`/`0`.
    pub fn parse_value(self, literal: &str) -> Result<Value> {
        let mismatch = || Error::SchemaMismatch {
            field: self.name(),
            value: literal.to_string(),
        };
        let value = match self {
            FieldSpec::U8 => Value::U8(literal.parse().map_err(|_| mismatch())?),
            FieldSpec::U16 => Value::U16(literal.parse().map_err(|_| mismatch())?),
            FieldSpec::U32 => Value::U32(literal.parse().map_err(|_| mismatch())?),
            FieldSpec::U64 => Value::U64(literal.parse().map_err(|_| mismatch())?),
            FieldSpec::I8 => Value::I8(literal.parse().map_err(|_| mismatch())?),
            FieldSpec::I16 => Value::I16(literal.parse().map_err(|_| mismatch())?),
            FieldSpec::I32 => Value::I32(literal.parse().map_err(|_| mismatch())?),
            FieldSpec::I64 => Value::I64(literal.parse().map_err(|_| mismatch())?),
            FieldSpec::F32 => Value::F32(literal.parse().map_err(|_| mismatch())?),
            FieldSpec::F64 => Value::F64(literal.parse().map_err(|_| mismatch())?),
            FieldSpec::Usize => Value::Usize(literal.parse().map_err(|_| mismatch())?),
            FieldSpec::Bool => match literal {
                "true" | "1" => Value::Bool(true),
                "false" | "0" => Value::Bool(false),
                _ => return Err(mismatch()),
            },
            FieldSpec::Char => {
                let mut chars = literal.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Value::Char(c),
                    _ => return Err(mismatch()),
                }
            }
            FieldSpec::Guid => Value::Guid(literal.parse().map_err(|_| mismatch())?),
            FieldSpec::Str => Value::Str(literal.to_string()),
            FieldSpec::WStr => Value::WStr(WideString::from(literal)),
            FieldSpec::Path => Value::Path(PathBuf::from(literal)),
            FieldSpec::Blob => Value::Blob(parse_hex(literal).ok_or_else(mismatch)?),
        };
        Ok(value)
    }
}

/// Decode a hex literal, ignoring whitespace and one leading `0x`.
pub fn parse_hex(literal: &str) -> Option<Vec<u8>> {
    let digits: String = literal.split_whitespace().collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);
    hex::decode(digits).ok()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Usize(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v:?}"),
            Value::Guid(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v:?}"),
            Value::WStr(v) => write!(f, "{:?}", v.to_string_lossy()),
            Value::Path(v) => write!(f, "{}", v.display()),
            Value::Blob(v) => f.write_str(&hex::encode(v)),
        }
    }
}

/// One decoded field and where it sat in the buffer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldEntry {
    /// Offset of the field's first byte, prefix included.
    pub offset: usize,
    /// Bytes the field occupied, prefix included.
    pub len: usize,
    pub value: Value,
}

/// An ordered list of field specs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    #[inline]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse one literal per field.
    pub fn parse_values<S: AsRef<str>>(&self, literals: &[S]) -> Result<Vec<Value>> {
        self.check_arity(literals.len())?;
        self.fields
            .iter()
            .zip(literals)
            .map(|(spec, literal)| spec.parse_value(literal.as_ref()))
            .collect()
    }

    /// Exact encoded size of `values`, after checking them against the schema.
    pub fn encoded_len(&self, values: &[Value]) -> Result<usize> {
        self.check_values(values)?;
        Ok(values.iter().map(Value::encoded_len).sum())
    }

    /// Encode `values` into a buffer of exactly the predicted size.
    pub fn encode(&self, values: &[Value]) -> Result<Vec<u8>> {
        let mut stream = ByteStream::with_capacity(self.encoded_len(values)?);
        for value in values {
            value.write_to(&mut stream)?;
        }
        stream.release()
    }

    /// Decode one value per field, recording offsets.
    ///
    /// Bytes left after the last field are not an error; callers that care
    /// can compare the end of the last entry with the buffer length.
    pub fn decode(&self, bytes: Vec<u8>) -> Result<Vec<FieldEntry>> {
        let mut stream = ByteStream::from_bytes(bytes);
        let mut entries = Vec::with_capacity(self.fields.len());
        for spec in &self.fields {
            let offset = stream.position();
            let value = match spec.read(&mut stream) {
                Ok(value) => value,
                Err(err) => {
                    stream.clear();
                    return Err(err);
                }
            };
            entries.push(FieldEntry {
                offset,
                len: stream.position() - offset,
                value,
            });
        }
        stream.clear();
        Ok(entries)
    }

    fn check_arity(&self, actual: usize) -> Result<()> {
        if actual != self.fields.len() {
            return Err(Error::ArityMismatch {
                expected: self.fields.len(),
                actual,
            });
        }
        Ok(())
    }

    fn check_values(&self, values: &[Value]) -> Result<()> {
        self.check_arity(values.len())?;
        for (spec, value) in self.fields.iter().zip(values) {
            if value.spec() != *spec {
                return Err(Error::SchemaMismatch {
                    field: spec.name(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl FromStr for Schema {
    type Err = Error;

    /// Field names separated by commas and/or whitespace.
    fn from_str(s: &str) -> Result<Self> {
        s.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|name| !name.is_empty())
            .map(FieldSpec::from_str)
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, spec) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(spec.name())?;
        }
        Ok(())
    }
}
