//! Typed streaming writer/reader for bytepack records.
//!
//! Fields of a record are packed back to back into one buffer whose size is
//! computed before the first byte is written. There are no type tags, field
//! names or version markers on the wire: producer and consumer agree on the
//! field list out of band, and a disagreement decodes as garbage, not as an
//! error.
//!
//! # Wire Format
//!
//! ```text
//! record := field*
//! field  := fixed_bytes                  -- FixedLayout: size_of bytes, no prefix
//!         | varsize_prefix payload_bytes -- Text / Path / Blob
//! ```
//!
//! See [`bytepack_common::varsize`] for the prefix encoding.
//!
//! # Example
//!
//! ```
//! use std::path::PathBuf;
//!
//! use bytepack_stream::{record, Guid, Record, WideString};
//!
//! record! {
//!     #[derive(Debug, PartialEq)]
//!     struct Person {
//!         id: Guid,
//!         nickname: String,
//!         path: PathBuf,
//!         name: WideString,
//!         age: usize,
//!     }
//! }
//!
//! let person = Person {
//!     id: Guid::new(1, 0, 0, *b"clauhban"),
//!     nickname: "HBann".into(),
//!     path: PathBuf::from("some/path.idk"),
//!     name: WideString::from("Claudiu"),
//!     age: 21,
//! };
//!
//! let bytes = person.to_bytes()?;
//! assert_eq!(bytes.len(), person.encoded_len());
//! assert_eq!(Person::from_bytes(bytes)?, person);
//! # Ok::<(), bytepack_stream::Error>(())
//! ```

mod error;
mod field;
mod list;
mod record;
mod stream;
mod text;

pub mod schema;

pub use error::{Error, Result};
pub use field::{Category, Field, FixedLayout};
pub use list::{deserialize, predict_total_size, serialize, FieldList, FieldSlots};
pub use record::Record;
pub use stream::ByteStream;
pub use text::{WideString, WIDE_WIDTH};

pub use bytepack_common::{varsize, Guid, StreamState};

/// Re-export zerocopy traits for [`impl_fixed_layout!`].
pub use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};
