use crate::{Error, Result};

/// Byte order of multi-byte elements in memory or on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Byte order of the machine executing the codec.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::Little;
    /// Byte order of the machine executing the codec.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::Big;

    /// Fixed byte order of every stream.
    pub const WIRE: Self = Self::Little;

    #[inline(always)]
    pub const fn is_little(self) -> bool {
        matches!(self, Self::Little)
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::NATIVE
    }
}

/// Element width in bytes. Only these four widths exist on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Width {
    W1 = 1,
    W2 = 2,
    W4 = 4,
    W8 = 8,
}

impl Width {
    #[inline(always)]
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Single bytes have no byte order.
    #[inline(always)]
    pub const fn is_byte(self) -> bool {
        matches!(self, Self::W1)
    }
}

impl TryFrom<usize> for Width {
    type Error = Error;

    fn try_from(bytes: usize) -> Result<Self> {
        match bytes {
            1 => Ok(Self::W1),
            2 => Ok(Self::W2),
            4 => Ok(Self::W4),
            8 => Ok(Self::W8),
            _ => Err(Error::UnsupportedWidth(bytes)),
        }
    }
}

impl From<Width> for usize {
    fn from(width: Width) -> usize {
        width.bytes()
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Fixed-width unsigned integer used as the bit pattern of an element during
/// byte order conversion.
pub trait WireInt: Copy + sealed::Sealed {
    const WIDTH: Width;

    /// Reads one value laid out in `order`. `bytes` must be exactly `WIDTH` long.
    fn read_ordered(bytes: &[u8], order: ByteOrder) -> Self;

    /// Writes the value laid out in `order`. `dst` must be exactly `WIDTH` long.
    fn write_ordered(self, dst: &mut [u8], order: ByteOrder);
}

macro_rules! impl_wire_int {
    ($($t:ty => $width:ident),*) => {
        $(
            impl sealed::Sealed for $t {}

            impl WireInt for $t {
                const WIDTH: Width = Width::$width;

                #[inline(always)]
                fn read_ordered(bytes: &[u8], order: ByteOrder) -> Self {
                    let mut arr = [0u8; size_of::<$t>()];
                    arr.copy_from_slice(bytes);
                    match order {
                        ByteOrder::Little => <$t>::from_le_bytes(arr),
                        ByteOrder::Big => <$t>::from_be_bytes(arr),
                    }
                }

                #[inline(always)]
                fn write_ordered(self, dst: &mut [u8], order: ByteOrder) {
                    let arr = match order {
                        ByteOrder::Little => self.to_le_bytes(),
                        ByteOrder::Big => self.to_be_bytes(),
                    };
                    dst.copy_from_slice(&arr);
                }
            }
        )*
    };
}

impl_wire_int!(u8 => W1, u16 => W2, u32 => W4, u64 => W8);

/// Converts a batch of elements from host order into wire order.
///
/// `src` and `dst` must have the same length, a multiple of `width`.
pub fn encode_le(width: Width, host: ByteOrder, src: &[u8], dst: &mut [u8]) {
    reorder(width, src, host, dst, ByteOrder::WIRE);
}

/// Converts a batch of elements from wire order into host order.
///
/// `src` and `dst` must have the same length, a multiple of `width`.
pub fn decode_le(width: Width, host: ByteOrder, src: &[u8], dst: &mut [u8]) {
    reorder(width, src, ByteOrder::WIRE, dst, host);
}

fn reorder(width: Width, src: &[u8], from: ByteOrder, dst: &mut [u8], to: ByteOrder) {
    assert_eq!(
        src.len(),
        dst.len(),
        "conversion buffers differ in length"
    );
    assert!(
        src.len().is_multiple_of(width.bytes()),
        "buffer of {} bytes is not a multiple of width {}",
        src.len(),
        width.bytes()
    );

    match width {
        Width::W1 => dst.copy_from_slice(src),
        Width::W2 => reorder_as::<u16>(src, from, dst, to),
        Width::W4 => reorder_as::<u32>(src, from, dst, to),
        Width::W8 => reorder_as::<u64>(src, from, dst, to),
    }
}

#[inline]
fn reorder_as<I: WireInt>(src: &[u8], from: ByteOrder, dst: &mut [u8], to: ByteOrder) {
    let w = I::WIDTH.bytes();
    src.chunks_exact(w)
        .zip(dst.chunks_exact_mut(w))
        .for_each(|(s, d)| I::read_ordered(s, from).write_ordered(d, to));
}
