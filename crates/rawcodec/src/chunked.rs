use std::io::{self, Read, Write};

use log::trace;

use crate::{Error, Result};

/// Writes all of `bytes` to the channel, issuing calls of at most `block` bytes.
///
/// Partial writes advance the cursor and continue. Any channel error, or a write
/// that accepts zero bytes, aborts with [`Error::Transport`].
///
/// Returns the number of bytes written, which is always `bytes.len()`.
pub fn write_exact<W>(channel: &mut W, bytes: &[u8], block: usize) -> Result<usize>
where
    W: Write + ?Sized,
{
    assert!(block > 0, "block size must be positive");

    let total = bytes.len();
    let mut written = 0;
    while written < total {
        let end = written + (total - written).min(block);
        let n = channel.write(&bytes[written..end])?;
        if n == 0 {
            return Err(Error::Transport(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("channel accepted no bytes after {written} of {total}"),
            )));
        }
        trace!("wrote block of {n} bytes ({}/{total})", written + n);
        written += n;
    }
    Ok(written)
}

/// Fills `buf` from the channel, issuing calls of at most `block` bytes.
///
/// A read returning zero bytes before `buf` is full fails with
/// [`Error::UnexpectedEof`]; a channel error fails with [`Error::Transport`].
///
/// Returns the number of bytes read, which is always `buf.len()`.
pub fn read_exact<R>(channel: &mut R, buf: &mut [u8], block: usize) -> Result<usize>
where
    R: Read + ?Sized,
{
    assert!(block > 0, "block size must be positive");

    let total = buf.len();
    let mut read = 0;
    while read < total {
        let end = read + (total - read).min(block);
        let n = channel.read(&mut buf[read..end])?;
        if n == 0 {
            return Err(Error::UnexpectedEof {
                read,
                expected: total,
            });
        }
        trace!("read block of {n} bytes ({}/{total})", read + n);
        read += n;
    }
    Ok(read)
}
