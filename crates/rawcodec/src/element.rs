use std::fmt::Debug;

use zerocopy::{FromBytes, Immutable, IntoBytes};

use crate::Width;

mod sealed {
    pub trait Sealed {}
}

/// Scalar type that can be stored in a serializable storage.
///
/// Implemented for the fixed-width integers and floats. Floats travel as the
/// integer of the same width holding their bit pattern, so NaN payloads and
/// signed zeros survive a round trip.
pub trait Element:
    FromBytes + IntoBytes + Immutable + Copy + Debug + Send + Sync + 'static + sealed::Sealed
{
    const WIDTH: Width;
}

macro_rules! impl_element {
    ($($t:ty => $width:ident),*) => {
        $(
            impl sealed::Sealed for $t {}

            impl Element for $t {
                const WIDTH: Width = Width::$width;
            }

            const _: () = assert!(size_of::<$t>() == Width::$width as usize);
        )*
    };
}

impl_element!(
    u8 => W1, i8 => W1,
    u16 => W2, i16 => W2,
    u32 => W4, i32 => W4, f32 => W4,
    u64 => W8, i64 => W8, f64 => W8
);
