use std::marker::PhantomData;

use log::trace;

use crate::{BoxError, Element, Error, Residence, ResidenceMut, Result, Storage};

/// Memory in a domain the codec cannot address directly (e.g. an accelerator).
///
/// Implementors bridge to the host with explicit copies. A failed copy is fatal
/// for the current codec call and is never retried.
pub trait ForeignMemory {
    /// Size of the allocation in bytes.
    fn byte_len(&self) -> usize;

    /// Copies the whole allocation into `dst`, which is exactly `byte_len()` long.
    fn copy_to_host(&self, dst: &mut [u8]) -> Result<(), BoxError>;

    /// Overwrites the whole allocation with `src`, which is exactly `byte_len()` long.
    fn copy_from_host(&mut self, src: &[u8]) -> Result<(), BoxError>;
}

/// Allocates a zeroed host staging buffer of `byte_len` bytes.
pub fn staging_buffer(byte_len: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(byte_len)
        .map_err(|e| Error::Staging(Box::new(e)))?;
    buffer.resize(byte_len, 0);
    Ok(buffer)
}

/// Copies foreign memory into a newly allocated host buffer of the same size.
pub fn stage_out(memory: &dyn ForeignMemory) -> Result<Vec<u8>> {
    let mut buffer = staging_buffer(memory.byte_len())?;
    memory.copy_to_host(&mut buffer).map_err(Error::Staging)?;
    trace!("staged out {} bytes", buffer.len());
    Ok(buffer)
}

/// Copies a populated host buffer back into foreign memory.
pub fn stage_in(buffer: &[u8], memory: &mut dyn ForeignMemory) -> Result<()> {
    let byte_len = memory.byte_len();
    if buffer.len() != byte_len {
        return Err(Error::Staging(
            format!(
                "staging buffer holds {} bytes, foreign allocation holds {byte_len}",
                buffer.len()
            )
            .into(),
        ));
    }
    memory.copy_from_host(buffer).map_err(Error::Staging)?;
    trace!("staged in {byte_len} bytes");
    Ok(())
}

/// Typed view of a foreign allocation as a storage of `T`.
#[derive(Debug)]
pub struct Foreign<T, M> {
    memory: M,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T, M> Foreign<T, M>
where
    T: Element,
    M: ForeignMemory,
{
    /// Fails if the allocation does not hold a whole number of `T`.
    pub fn new(memory: M) -> Result<Self> {
        let byte_len = memory.byte_len();
        let width = T::WIDTH.bytes();
        if !byte_len.is_multiple_of(width) {
            return Err(Error::MisalignedForeign { byte_len, width });
        }
        Ok(Self {
            memory,
            len: byte_len / width,
            _marker: PhantomData,
        })
    }

    #[inline(always)]
    pub fn memory(&self) -> &M {
        &self.memory
    }

    #[inline(always)]
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    #[inline]
    pub fn into_inner(self) -> M {
        self.memory
    }
}

impl<T, M> Storage for Foreign<T, M>
where
    T: Element,
    M: ForeignMemory,
{
    #[inline(always)]
    fn width(&self) -> usize {
        T::WIDTH.bytes()
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn residence(&self) -> Residence<'_> {
        Residence::Foreign(&self.memory)
    }

    #[inline]
    fn residence_mut(&mut self) -> ResidenceMut<'_> {
        ResidenceMut::Foreign(&mut self.memory)
    }
}
