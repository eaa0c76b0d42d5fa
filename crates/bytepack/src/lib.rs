//! Bytepack - compact binary packing of typed records.
//!
//! This crate provides a unified interface to the bytepack crates.
//!
//! # Crates
//!
//! - [`bytepack_common`] - Size prefix codec, binary reading, GUIDs, errors
//! - [`bytepack_stream`] - Field codecs, the byte stream and records
//!
//! # Example
//!
//! ```
//! use bytepack::prelude::*;
//!
//! record! {
//!     #[derive(Debug, PartialEq)]
//!     struct Entry {
//!         id: Guid,
//!         name: String,
//!         size: u64,
//!     }
//! }
//!
//! let entry = Entry { id: Guid::NIL, name: "data/save.bin".into(), size: 4096 };
//! let bytes = entry.to_bytes()?;
//! assert_eq!(bytes.len(), 16 + 1 + 13 + 8);
//! assert_eq!(Entry::from_bytes(bytes)?, entry);
//! # Ok::<(), bytepack::stream::Error>(())
//! ```

// Re-export all sub-crates
pub use bytepack_common as common;
pub use bytepack_stream as stream;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use bytepack_common::{varsize, BinaryReader, Guid, SizePrefix};
    pub use bytepack_stream::schema::{FieldSpec, Schema, Value};
    pub use bytepack_stream::{
        deserialize, predict_total_size, record, serialize, ByteStream, Category, Field,
        FixedLayout, Record, WideString,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
