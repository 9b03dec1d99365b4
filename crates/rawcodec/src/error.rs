use std::{collections::TryReserveError, error, io, result};

use thiserror::Error;

pub type Result<T, E = Error> = result::Result<T, E>;

/// Boxed error returned by foreign memory copies.
pub type BoxError = Box<dyn error::Error + Send + Sync + 'static>;

/// Error types for rawcodec operations.
#[derive(Debug, Error)]
pub enum Error {
    // Channel errors
    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    /// `read` and `expected` count bytes of the header or of the whole payload,
    /// whichever was being read.
    #[error("Unexpected EOF after {read} of {expected} bytes. The stream might be corrupted")]
    UnexpectedEof { read: usize, expected: usize },

    // Layout errors
    #[error("Storage has wrong size: expected {expected} got {actual}")]
    SizeMismatch { expected: usize, actual: i64 },

    #[error("Unsupported element width: {0} bytes")]
    UnsupportedWidth(usize),

    #[error("Invalid element count in stream header: {0}")]
    InvalidLength(i64),

    #[error("Couldn't allocate storage: {0}")]
    Alloc(#[from] TryReserveError),

    #[error("Storage of {len} x {width}B exposes {byte_len} bytes")]
    InconsistentStorage {
        len: usize,
        width: usize,
        byte_len: usize,
    },

    #[error("Raw buffer of {byte_len} bytes is not a multiple of width {width}")]
    RawLength { byte_len: usize, width: usize },

    // Staging errors
    #[error("Staging copy failed: {0}")]
    Staging(#[source] BoxError),

    #[error("Foreign allocation of {byte_len} bytes is not a multiple of width {width}")]
    MisalignedForeign { byte_len: usize, width: usize },
}

impl Error {
    /// Returns true for errors caused by a truncated or corrupted stream rather than
    /// a platform fault.
    #[inline]
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::UnexpectedEof { .. } | Self::InvalidLength(_))
    }
}
