use std::io::{Read, Write};

use crate::{Result, read_exact, write_exact};

/// Size of the element count prefix of every stream.
pub const HEADER_SIZE: usize = size_of::<i64>();

/// Writes the element count as 8 little-endian bytes.
pub fn write_length<W>(channel: &mut W, len: i64) -> Result<()>
where
    W: Write + ?Sized,
{
    write_exact(channel, &len.to_le_bytes(), HEADER_SIZE)?;
    Ok(())
}

/// Reads the 8-byte little-endian element count.
///
/// A stream ending before 8 bytes fails with [`crate::Error::UnexpectedEof`].
/// The value is returned as stored; validating its sign is up to the caller.
pub fn read_length<R>(channel: &mut R) -> Result<i64>
where
    R: Read + ?Sized,
{
    let mut bytes = [0u8; HEADER_SIZE];
    read_exact(channel, &mut bytes, HEADER_SIZE)?;
    Ok(i64::from_le_bytes(bytes))
}
