use zerocopy::IntoBytes;

#[cfg(feature = "staging")]
use crate::ForeignMemory;
use crate::{Element, Error, Result, Width};

/// Where the bytes of a storage live.
#[derive(Clone, Copy)]
pub enum Residence<'a> {
    /// Directly addressable host memory, in host byte order.
    Host(&'a [u8]),
    /// Memory in another domain, reachable only through explicit copies.
    #[cfg(feature = "staging")]
    Foreign(&'a dyn ForeignMemory),
}

impl Residence<'_> {
    /// Number of bytes the storage actually exposes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Host(bytes) => bytes.len(),
            #[cfg(feature = "staging")]
            Self::Foreign(memory) => memory.byte_len(),
        }
    }
}

/// Mutable counterpart of [`Residence`].
pub enum ResidenceMut<'a> {
    Host(&'a mut [u8]),
    #[cfg(feature = "staging")]
    Foreign(&'a mut dyn ForeignMemory),
}

/// Flat, homogeneous buffer of fixed-width elements.
///
/// The codec only borrows a storage for the duration of a call.
pub trait Storage {
    /// Width of one element in bytes.
    fn width(&self) -> usize;

    /// Number of elements.
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn residence(&self) -> Residence<'_>;

    fn residence_mut(&mut self) -> ResidenceMut<'_>;
}

/// Storage that can be allocated by the codec when no destination is given.
pub trait AllocStorage: Storage + Sized {
    /// Element width every storage of this type has.
    const WIDTH: Width;

    /// Allocates a zero-filled storage of `len` elements.
    fn with_len(len: usize) -> Result<Self>;
}

impl<T: Element> Storage for [T] {
    #[inline(always)]
    fn width(&self) -> usize {
        T::WIDTH.bytes()
    }

    #[inline(always)]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn residence(&self) -> Residence<'_> {
        Residence::Host(self.as_bytes())
    }

    #[inline]
    fn residence_mut(&mut self) -> ResidenceMut<'_> {
        ResidenceMut::Host(self.as_mut_bytes())
    }
}

impl<T: Element> Storage for Vec<T> {
    #[inline(always)]
    fn width(&self) -> usize {
        T::WIDTH.bytes()
    }

    #[inline(always)]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn residence(&self) -> Residence<'_> {
        self.as_slice().residence()
    }

    #[inline]
    fn residence_mut(&mut self) -> ResidenceMut<'_> {
        self.as_mut_slice().residence_mut()
    }
}

impl<T: Element> AllocStorage for Vec<T> {
    const WIDTH: Width = T::WIDTH;

    fn with_len(len: usize) -> Result<Self> {
        let mut vec = Vec::new();
        vec.try_reserve_exact(len)?;
        vec.resize(len, T::new_zeroed());
        Ok(vec)
    }
}

impl<T: Element> Storage for Box<[T]> {
    #[inline(always)]
    fn width(&self) -> usize {
        T::WIDTH.bytes()
    }

    #[inline(always)]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn residence(&self) -> Residence<'_> {
        (**self).residence()
    }

    #[inline]
    fn residence_mut(&mut self) -> ResidenceMut<'_> {
        (**self).residence_mut()
    }
}

impl<T: Element> AllocStorage for Box<[T]> {
    const WIDTH: Width = T::WIDTH;

    #[inline]
    fn with_len(len: usize) -> Result<Self> {
        Vec::<T>::with_len(len).map(Vec::into_boxed_slice)
    }
}

/// Untyped host storage whose element width is a run-time tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStorage {
    bytes: Vec<u8>,
    width: Width,
}

impl RawStorage {
    /// Wraps host-order element bytes.
    ///
    /// Fails if `width` is not a supported width or `bytes` does not hold a whole
    /// number of elements.
    pub fn new(bytes: Vec<u8>, width: usize) -> Result<Self> {
        let width = Width::try_from(width)?;
        if !bytes.len().is_multiple_of(width.bytes()) {
            return Err(Error::RawLength {
                byte_len: bytes.len(),
                width: width.bytes(),
            });
        }
        Ok(Self { bytes, width })
    }

    /// Allocates `len` zeroed elements.
    pub fn zeroed(len: usize, width: Width) -> Result<Self> {
        let byte_len = len
            .checked_mul(width.bytes())
            .ok_or(Error::InvalidLength(i64::try_from(len).unwrap_or(i64::MAX)))?;
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(byte_len)?;
        bytes.resize(byte_len, 0);
        Ok(Self { bytes, width })
    }

    #[inline(always)]
    pub fn element_width(&self) -> Width {
        self.width
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline(always)]
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl Storage for RawStorage {
    #[inline(always)]
    fn width(&self) -> usize {
        self.width.bytes()
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.bytes.len() / self.width.bytes()
    }

    #[inline]
    fn residence(&self) -> Residence<'_> {
        Residence::Host(&self.bytes)
    }

    #[inline]
    fn residence_mut(&mut self) -> ResidenceMut<'_> {
        ResidenceMut::Host(&mut self.bytes)
    }
}
