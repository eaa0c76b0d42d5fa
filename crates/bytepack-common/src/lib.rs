//! Common utilities for bytepack.
//!
//! This crate provides foundational types and utilities used across all bytepack crates:
//!
//! - [`varsize`] - Self-describing 1-8 byte size prefixes
//! - [`BinaryReader`] - Zero-copy, bounds-checked reading from byte slices
//! - [`Guid`] - 16-byte GUID with the Windows field layout
//! - [`Error`] - The shared error taxonomy

mod error;
mod guid;
mod reader;

pub mod varsize;

pub use error::{Error, Result, StreamState};
pub use guid::Guid;
pub use reader::BinaryReader;
pub use varsize::SizePrefix;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
