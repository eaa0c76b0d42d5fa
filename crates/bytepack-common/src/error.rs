//! Error types for bytepack-common.

use std::fmt;

use thiserror::Error;

/// Lifecycle state of a byte stream, reported by [`Error::InvalidState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StreamState {
    /// No buffer has been created or attached yet.
    #[default]
    Uninitialized,
    /// A write pass is in progress.
    Writing,
    /// A read pass is in progress.
    Reading,
    /// The buffer was handed back to the caller or cleared.
    Released,
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Writing => "writing",
            Self::Reading => "reading",
            Self::Released => "released",
        };
        f.write_str(name)
    }
}

/// Common error type for bytepack operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A read or write would cross the end of the buffer.
    #[error("capacity exceeded at offset {position}: needed {needed} bytes but only {available} available")]
    CapacityExceeded {
        needed: usize,
        available: usize,
        position: usize,
    },

    /// The operation is not valid in the stream's current state.
    #[error("cannot {operation} a stream that is {state}")]
    InvalidState {
        operation: &'static str,
        state: StreamState,
    },

    /// A field's encoding category could not be determined.
    #[error("unknown field category: {0}")]
    UnknownFieldCategory(String),

    /// Invalid GUID format.
    #[error("invalid GUID format: {0}")]
    InvalidGuid(String),
}

impl Error {
    /// Shorthand for a bounds failure at `position`.
    #[inline]
    pub const fn capacity(needed: usize, available: usize, position: usize) -> Self {
        Self::CapacityExceeded {
            needed,
            available,
            position,
        }
    }

    /// Whether this error is a buffer bounds violation.
    #[inline]
    pub const fn is_capacity_exceeded(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
