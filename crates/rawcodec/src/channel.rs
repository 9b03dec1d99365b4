use std::{
    io::{self, Read, Write},
    os::fd::{AsFd, AsRawFd, BorrowedFd},
};

/// Channel over a borrowed raw file descriptor.
///
/// Every `read`/`write` is a single `libc::read`/`libc::write` call, so short
/// transfers surface to the caller unchanged. A negative return is reported as
/// [`io::Error::last_os_error`].
///
/// Works for regular files, pipes and sockets alike. The descriptor is never
/// closed by this type.
#[derive(Debug, Clone, Copy)]
pub struct FdChannel<'fd> {
    fd: BorrowedFd<'fd>,
}

impl<'fd> FdChannel<'fd> {
    pub fn new(fd: BorrowedFd<'fd>) -> Self {
        Self { fd }
    }

    /// Borrows the descriptor of any owner, e.g. a `File` or `TcpStream`.
    pub fn from_owner<F: AsFd>(owner: &'fd F) -> Self {
        Self::new(owner.as_fd())
    }

    #[inline(always)]
    pub fn fd(&self) -> BorrowedFd<'fd> {
        self.fd
    }
}

impl Read for FdChannel<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: `buf` is valid for writes of `buf.len()` bytes and the descriptor
        // is kept open by the borrow.
        let result = unsafe {
            libc::read(
                self.fd.as_raw_fd(),
                buf.as_mut_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        if result < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(result as usize)
    }
}

impl Write for FdChannel<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // SAFETY: `buf` is valid for reads of `buf.len()` bytes and the descriptor
        // is kept open by the borrow.
        let result = unsafe {
            libc::write(
                self.fd.as_raw_fd(),
                buf.as_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        if result < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(result as usize)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
