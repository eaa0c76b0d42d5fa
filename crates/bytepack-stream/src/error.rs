//! Error types for stream encoding and decoding.

use thiserror::Error;

use bytepack_common::StreamState;

/// Errors that can occur while packing or unpacking fields.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error (bounds, state, field category).
    #[error("{0}")]
    Common(#[from] bytepack_common::Error),

    /// A value does not fit the field type declared for it by a runtime schema.
    #[error("value {value:?} does not fit field type {field}")]
    SchemaMismatch { field: &'static str, value: String },

    /// A runtime schema was given the wrong number of values.
    #[error("schema declares {expected} fields but {actual} values were given")]
    ArityMismatch { expected: usize, actual: usize },
}

impl Error {
    /// Whether this error is a buffer bounds violation.
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, Self::Common(err) if err.is_capacity_exceeded())
    }

    /// Whether this error reports an operation on a stream in the wrong state.
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            Self::Common(bytepack_common::Error::InvalidState { .. })
        )
    }

    pub(crate) fn invalid_state(operation: &'static str, state: StreamState) -> Self {
        Self::Common(bytepack_common::Error::InvalidState { operation, state })
    }
}

/// Result type for stream operations.
pub type Result<T> = std::result::Result<T, Error>;
