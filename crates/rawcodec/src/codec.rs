use std::{
    io::{Read, Write},
    time::Instant,
};

use log::{debug, trace};

#[cfg(feature = "staging")]
use crate::{stage_in, stage_out, staging_buffer};
use crate::{
    AllocStorage, ByteOrder, DEFAULT_BATCH_CAP, Error, GiB, HEADER_SIZE, RawStorage, Residence,
    ResidenceMut, Result, Storage, Width, decode_le, encode_le, read_exact, read_length,
    write_exact, write_length,
};

/// Serializer and deserializer of storages.
///
/// Every stream is an 8-byte little-endian signed element count followed by the
/// elements, each in little-endian order. The element width is not part of the
/// stream; writer and reader must agree on it.
///
/// When the host order is little-endian, or elements are single bytes, payloads
/// move verbatim. Otherwise they are converted in batches of at most
/// [`Codec::batch_cap`] elements so that memory use stays bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Codec {
    host_order: ByteOrder,
    batch_cap: usize,
    block_size: usize,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    pub const fn new() -> Self {
        Self {
            host_order: ByteOrder::NATIVE,
            batch_cap: DEFAULT_BATCH_CAP,
            block_size: GiB,
        }
    }

    /// Sets the byte order host memory is assumed to hold elements in.
    ///
    /// Defaults to [`ByteOrder::NATIVE`]. Any other value makes the codec treat
    /// host buffers as if they came from a machine of that order.
    pub const fn with_host_order(mut self, host_order: ByteOrder) -> Self {
        self.host_order = host_order;
        self
    }

    /// Sets the maximum number of elements converted per batch.
    ///
    /// # Panics
    /// Panics if `batch_cap` is zero.
    pub fn with_batch_cap(mut self, batch_cap: usize) -> Self {
        assert!(batch_cap > 0, "batch cap must be positive");
        self.batch_cap = batch_cap;
        self
    }

    /// Sets the maximum number of bytes moved by a single channel call.
    ///
    /// # Panics
    /// Panics if `block_size` is zero.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        assert!(block_size > 0, "block size must be positive");
        self.block_size = block_size;
        self
    }

    #[inline(always)]
    pub fn host_order(&self) -> ByteOrder {
        self.host_order
    }

    #[inline(always)]
    pub fn batch_cap(&self) -> usize {
        self.batch_cap
    }

    #[inline(always)]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Whether payloads of this width bypass byte order conversion.
    #[inline(always)]
    pub fn is_fast_path(&self, width: Width) -> bool {
        width.is_byte() || self.host_order.is_little()
    }

    /// Exact size in bytes of the stream for `len` elements of `width` bytes.
    pub fn serialized_len(len: usize, width: usize) -> Result<u64> {
        let width = Width::try_from(width)?;
        (len as u64)
            .checked_mul(width.bytes() as u64)
            .and_then(|payload| payload.checked_add(HEADER_SIZE as u64))
            .ok_or(Error::InvalidLength(i64::try_from(len).unwrap_or(i64::MAX)))
    }

    /// Writes `storage` to the channel.
    ///
    /// Foreign storages are staged into a host buffer first. Returns the number of
    /// bytes written, header included. Nothing is written for an unsupported width
    /// or an [`Error::InconsistentStorage`].
    pub fn serialize<S, W>(&self, storage: &S, channel: &mut W) -> Result<u64>
    where
        S: Storage + ?Sized,
        W: Write + ?Sized,
    {
        let i = Instant::now();
        let width = Width::try_from(storage.width())?;
        let len = storage.len();
        let declared = i64::try_from(len).map_err(|_| Error::InvalidLength(i64::MAX))?;
        check_layout(storage, width)?;

        write_length(channel, declared)?;

        #[cfg(feature = "staging")]
        let staged;
        let bytes: &[u8] = match storage.residence() {
            Residence::Host(bytes) => bytes,
            #[cfg(feature = "staging")]
            Residence::Foreign(memory) => {
                staged = stage_out(memory)?;
                &staged
            }
        };

        let fast = self.is_fast_path(width);
        if fast {
            write_exact(channel, bytes, self.block_size)?;
        } else {
            self.write_converted(channel, bytes, width)?;
        }

        let written = (HEADER_SIZE + bytes.len()) as u64;
        debug!(
            "serialized {len} x {}B ({}) = {written} bytes in {:?}",
            width.bytes(),
            path_name(fast),
            i.elapsed()
        );
        Ok(written)
    }

    /// Reads a stream into a new storage, or into `dest` when given.
    ///
    /// A provided destination must have exactly the element count declared by
    /// the stream, otherwise [`Error::SizeMismatch`] is returned before any
    /// payload byte is read. A newly allocated storage is only returned once
    /// fully populated.
    pub fn deserialize<S, R>(&self, channel: &mut R, dest: Option<S>) -> Result<S>
    where
        S: AllocStorage,
        R: Read + ?Sized,
    {
        if let Some(mut storage) = dest {
            self.deserialize_into(channel, &mut storage)?;
            return Ok(storage);
        }

        let i = Instant::now();
        let declared = read_length(channel)?;
        let len = Self::payload_len(declared, S::WIDTH)?;
        let mut storage = S::with_len(len)?;
        self.read_payload(channel, &mut storage, S::WIDTH)?;
        debug!(
            "deserialized {len} x {}B into new storage in {:?}",
            S::WIDTH.bytes(),
            i.elapsed()
        );
        Ok(storage)
    }

    /// Reads a stream into an existing storage of matching length.
    ///
    /// A storage whose bytes do not match `len() x width()` fails with
    /// [`Error::InconsistentStorage`] before anything is read.
    pub fn deserialize_into<S, R>(&self, channel: &mut R, dest: &mut S) -> Result<()>
    where
        S: Storage + ?Sized,
        R: Read + ?Sized,
    {
        let i = Instant::now();
        let width = Width::try_from(dest.width())?;
        check_layout(dest, width)?;
        let declared = read_length(channel)?;
        let expected = dest.len();
        if i64::try_from(expected).ok() != Some(declared) {
            return Err(Error::SizeMismatch {
                expected,
                actual: declared,
            });
        }
        self.read_payload(channel, dest, width)?;
        debug!(
            "deserialized {expected} x {}B into existing storage in {:?}",
            width.bytes(),
            i.elapsed()
        );
        Ok(())
    }

    /// Reads a stream of `width`-byte elements into a new untyped storage.
    ///
    /// The width is validated before anything is read from the channel.
    pub fn deserialize_raw<R>(&self, channel: &mut R, width: usize) -> Result<RawStorage>
    where
        R: Read + ?Sized,
    {
        let i = Instant::now();
        let width = Width::try_from(width)?;
        let declared = read_length(channel)?;
        let len = Self::payload_len(declared, width)?;
        let mut storage = RawStorage::zeroed(len, width)?;
        self.read_payload(channel, &mut storage, width)?;
        debug!(
            "deserialized {len} x {}B into raw storage in {:?}",
            width.bytes(),
            i.elapsed()
        );
        Ok(storage)
    }

    /// Validates a declared element count against the address space.
    fn payload_len(declared: i64, width: Width) -> Result<usize> {
        usize::try_from(declared)
            .ok()
            .filter(|len| len.checked_mul(width.bytes()).is_some())
            .ok_or(Error::InvalidLength(declared))
    }

    fn read_payload<S, R>(&self, channel: &mut R, storage: &mut S, width: Width) -> Result<()>
    where
        S: Storage + ?Sized,
        R: Read + ?Sized,
    {
        check_layout(storage, width)?;
        match storage.residence_mut() {
            ResidenceMut::Host(bytes) => self.read_bytes(channel, bytes, width),
            #[cfg(feature = "staging")]
            ResidenceMut::Foreign(memory) => {
                let mut buffer = staging_buffer(memory.byte_len())?;
                self.read_bytes(channel, &mut buffer, width)?;
                stage_in(&buffer, memory)
            }
        }
    }

    fn read_bytes<R>(&self, channel: &mut R, dst: &mut [u8], width: Width) -> Result<()>
    where
        R: Read + ?Sized,
    {
        if self.is_fast_path(width) {
            read_exact(channel, dst, self.block_size)?;
            return Ok(());
        }

        let total = dst.len();
        let (mut batch, step) = self.batch_buffer(total, width);
        for (index, chunk) in dst.chunks_mut(step).enumerate() {
            let raw = &mut batch[..chunk.len()];
            // EOF progress is reported against the whole payload, not the batch.
            read_exact(channel, raw, self.block_size).map_err(|e| match e {
                Error::UnexpectedEof { read, .. } => Error::UnexpectedEof {
                    read: index * step + read,
                    expected: total,
                },
                e => e,
            })?;
            decode_le(width, self.host_order, raw, chunk);
            trace!("decoded batch of {} elements", chunk.len() / width.bytes());
        }
        Ok(())
    }

    fn write_converted<W>(&self, channel: &mut W, src: &[u8], width: Width) -> Result<()>
    where
        W: Write + ?Sized,
    {
        let (mut batch, step) = self.batch_buffer(src.len(), width);
        for chunk in src.chunks(step) {
            let encoded = &mut batch[..chunk.len()];
            encode_le(width, self.host_order, chunk, encoded);
            write_exact(channel, encoded, self.block_size)?;
            trace!("encoded batch of {} elements", chunk.len() / width.bytes());
        }
        Ok(())
    }

    /// Returns a buffer for one conversion batch and the batch size in bytes.
    fn batch_buffer(&self, total: usize, width: Width) -> (Vec<u8>, usize) {
        let step = self.batch_cap.saturating_mul(width.bytes());
        (vec![0; step.min(total)], step)
    }
}

/// Checks that a storage exposes exactly `len() x width` bytes.
fn check_layout<S: Storage + ?Sized>(storage: &S, width: Width) -> Result<()> {
    let len = storage.len();
    let byte_len = storage.residence().byte_len();
    if len.checked_mul(width.bytes()) != Some(byte_len) {
        return Err(Error::InconsistentStorage {
            len,
            width: width.bytes(),
            byte_len,
        });
    }
    Ok(())
}

#[inline]
fn path_name(fast: bool) -> &'static str {
    if fast { "verbatim" } else { "converted" }
}

/// Writes `storage` to the channel with the default [`Codec`].
#[inline]
pub fn write_storage<S, W>(storage: &S, channel: &mut W) -> Result<u64>
where
    S: Storage + ?Sized,
    W: Write + ?Sized,
{
    Codec::default().serialize(storage, channel)
}

/// Reads a storage from the channel with the default [`Codec`].
#[inline]
pub fn read_storage<S, R>(channel: &mut R, dest: Option<S>) -> Result<S>
where
    S: AllocStorage,
    R: Read + ?Sized,
{
    Codec::default().deserialize(channel, dest)
}

/// Reads a storage from the channel into `dest` with the default [`Codec`].
#[inline]
pub fn read_storage_into<S, R>(channel: &mut R, dest: &mut S) -> Result<()>
where
    S: Storage + ?Sized,
    R: Read + ?Sized,
{
    Codec::default().deserialize_into(channel, dest)
}
