#![doc = include_str!("../README.md")]

#[cfg(unix)]
mod channel;
mod chunked;
mod codec;
mod element;
mod endian;
pub mod error;
mod header;
#[cfg(feature = "staging")]
mod staging;
mod storage;

#[cfg(unix)]
pub use channel::*;
pub use chunked::*;
pub use codec::*;
pub use element::*;
pub use endian::*;
pub use error::*;
pub use header::*;
#[cfg(feature = "staging")]
pub use staging::*;
pub use storage::*;

/// One gibibyte (1024^3 bytes), the default upper bound of a single channel call.
#[allow(non_upper_case_globals)]
pub const GiB: usize = 1024 * 1024 * 1024;

/// Default maximum number of elements per byte order conversion batch.
pub const DEFAULT_BATCH_CAP: usize = 5000;
