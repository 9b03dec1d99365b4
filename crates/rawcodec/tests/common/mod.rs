#![allow(dead_code)]

#[cfg(feature = "staging")]
use std::{cell::Cell, rc::Rc};
use std::io::{self, Cursor, Read, Write};

use rawcodec::Element;
#[cfg(feature = "staging")]
use rawcodec::{BoxError, ForeignMemory};

/// Deterministic, non-trivial test values for every element type.
pub trait Sample: Element + PartialEq {
    fn sample(i: usize) -> Self;
}

macro_rules! impl_sample_int {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                fn sample(i: usize) -> Self {
                    (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_left(17) as $t
                }
            }
        )*
    };
}

impl_sample_int!(u8, i8, u16, i16, u32, i32, u64, i64);

impl Sample for f32 {
    fn sample(i: usize) -> Self {
        i as f32 * -0.75 + 1.0e-3
    }
}

impl Sample for f64 {
    fn sample(i: usize) -> Self {
        i as f64 * 1.5e10 - 7.25
    }
}

pub fn samples<T: Sample>(len: usize) -> Vec<T> {
    (0..len).map(T::sample).collect()
}

/// Expected wire payload: every element's little-endian bytes, independent of the test host.
pub fn le_payload<T: Element>(values: &[T]) -> Vec<u8> {
    let width = T::WIDTH.bytes();
    let mut out = Vec::with_capacity(values.len() * width);
    for value in values {
        let mut bytes = zerocopy::IntoBytes::as_bytes(value).to_vec();
        if cfg!(target_endian = "big") {
            bytes.reverse();
        }
        out.extend_from_slice(&bytes);
    }
    out
}

/// In-memory channel that records the size of every call and caps each call at
/// `max_per_call` bytes.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    inner: Cursor<Vec<u8>>,
    max_per_call: Option<usize>,
    pub reads: Vec<usize>,
    pub writes: Vec<usize>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn short(max_per_call: usize) -> Self {
        Self {
            max_per_call: Some(max_per_call),
            ..Self::default()
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            inner: Cursor::new(bytes),
            ..Self::default()
        }
    }

    pub fn with_max_per_call(mut self, max_per_call: usize) -> Self {
        self.max_per_call = Some(max_per_call);
        self
    }

    pub fn rewind(&mut self) {
        self.inner.set_position(0);
    }

    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    pub fn bytes(&self) -> &[u8] {
        self.inner.get_ref()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.into_inner()
    }

    fn cap(&self, len: usize) -> usize {
        self.max_per_call.map_or(len, |max| len.min(max))
    }
}

impl Read for RecordingChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads.push(buf.len());
        let len = self.cap(buf.len());
        self.inner.read(&mut buf[..len])
    }
}

impl Write for RecordingChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.push(buf.len());
        let len = self.cap(buf.len());
        self.inner.write(&buf[..len])
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that discards everything and only records call sizes.
#[derive(Debug, Default)]
pub struct CountingSink {
    pub writes: Vec<usize>,
}

impl Write for CountingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.push(buf.len());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Channel that fails with `kind` once `budget` bytes have been transferred.
#[derive(Debug)]
pub struct FailingChannel {
    inner: Cursor<Vec<u8>>,
    budget: usize,
    kind: io::ErrorKind,
}

impl FailingChannel {
    pub fn new(bytes: Vec<u8>, budget: usize, kind: io::ErrorKind) -> Self {
        Self {
            inner: Cursor::new(bytes),
            budget,
            kind,
        }
    }

    fn take(&mut self, len: usize) -> io::Result<usize> {
        if self.budget == 0 {
            return Err(io::Error::new(self.kind, "injected failure"));
        }
        let len = len.min(self.budget);
        self.budget -= len;
        Ok(len)
    }
}

impl Read for FailingChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.take(buf.len())?;
        self.inner.read(&mut buf[..len])
    }
}

impl Write for FailingChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = self.take(buf.len())?;
        self.inner.write(&buf[..len])
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer whose every call accepts nothing.
#[derive(Debug, Default)]
pub struct ZeroWriter;

impl Write for ZeroWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Ok(0)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(feature = "staging")]
/// Simulated accelerator allocation backed by a private byte vector.
///
/// Copies are counted through shared cells so tests can observe them after the
/// device has been moved into a storage.
#[derive(Debug, Default)]
pub struct FakeDevice {
    bytes: Vec<u8>,
    pub fail_to_host: bool,
    pub fail_from_host: bool,
    pub to_host_copies: Rc<Cell<usize>>,
    pub from_host_copies: Rc<Cell<usize>>,
}

#[cfg(feature = "staging")]
impl FakeDevice {
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            ..Self::default()
        }
    }

    pub fn zeroed(byte_len: usize) -> Self {
        Self::with_bytes(vec![0; byte_len])
    }

    pub fn from_values<T: Element>(values: &[T]) -> Self {
        Self::with_bytes(zerocopy::IntoBytes::as_bytes(values).to_vec())
    }

    pub fn device_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(feature = "staging")]
impl ForeignMemory for FakeDevice {
    fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    fn copy_to_host(&self, dst: &mut [u8]) -> Result<(), BoxError> {
        if self.fail_to_host {
            return Err("device to host copy failed".into());
        }
        dst.copy_from_slice(&self.bytes);
        self.to_host_copies.set(self.to_host_copies.get() + 1);
        Ok(())
    }

    fn copy_from_host(&mut self, src: &[u8]) -> Result<(), BoxError> {
        if self.fail_from_host {
            return Err("host to device copy failed".into());
        }
        self.bytes.copy_from_slice(src);
        self.from_host_copies.set(self.from_host_copies.get() + 1);
        Ok(())
    }
}
