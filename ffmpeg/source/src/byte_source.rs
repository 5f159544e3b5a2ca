/*!
    Pull-based byte sources read through a custom FFmpeg I/O context.
*/

use std::ffi::{c_int, c_void};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use ffmpeg_next::ffi;
use tracing::{error, trace, warn};

use ffmpeg_types::{Error, Result};

/**
    A pull-based source of container bytes.

    Used to feed FFmpeg from origins it cannot open itself, such as ranged
    HTTP downloads or in-memory buffers. `Ok(0)` signals end of stream.

    Every [`std::io::Read`] implementation is a byte source.
*/
pub trait ByteSource: Send {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<R: io::Read + Send> ByteSource for R {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(self, buf)
    }
}

/**
    An FFmpeg I/O context that pulls from a boxed [`ByteSource`].

    Must outlive the format context that reads from it.
*/
pub(crate) struct CustomIo {
    ctx: *mut ffi::AVIOContext,
    opaque: *mut Box<dyn ByteSource>,
}

// SAFETY: the context and the source are exclusively owned, and the source is `Send`.
unsafe impl Send for CustomIo {}

impl CustomIo {
    pub(crate) fn new(source: Box<dyn ByteSource>, buffer_size: usize) -> Result<Self> {
        let buffer_len = c_int::try_from(buffer_size)
            .ok()
            .filter(|len| *len > 0)
            .ok_or_else(|| Error::open(format!("invalid I/O buffer size {buffer_size}")))?;

        let buffer = unsafe { ffi::av_malloc(buffer_size) } as *mut u8;
        if buffer.is_null() {
            return Err(Error::Alloc("I/O buffer"));
        }

        let opaque = Box::into_raw(Box::new(source));

        let ctx = unsafe {
            ffi::avio_alloc_context(
                buffer,
                buffer_len,
                0,
                opaque as *mut c_void,
                Some(read_packet),
                None,
                None,
            )
        };
        if ctx.is_null() {
            unsafe {
                ffi::av_free(buffer as *mut c_void);
                drop(Box::from_raw(opaque));
            }
            return Err(Error::Alloc("cannot create AVIOContext"));
        }

        Ok(Self { ctx, opaque })
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut ffi::AVIOContext {
        self.ctx
    }
}

impl Drop for CustomIo {
    fn drop(&mut self) {
        unsafe {
            if !self.ctx.is_null() {
                // The buffer may have been reallocated by FFmpeg, so free the current one.
                ffi::av_freep(ptr::addr_of_mut!((*self.ctx).buffer) as *mut c_void);
                ffi::avio_context_free(&mut self.ctx);
            }
            drop(Box::from_raw(self.opaque));
        }
    }
}

/**
    Read callback installed on the I/O context.

    Never unwinds: panics and errors become `AVERROR(EIO)`.
*/
unsafe extern "C" fn read_packet(opaque: *mut c_void, buf: *mut u8, buf_size: c_int) -> c_int {
    if opaque.is_null() || buf.is_null() || buf_size <= 0 {
        return ffi::AVERROR(ffi::EINVAL);
    }

    // SAFETY: `opaque` is the box installed by `CustomIo::new`, which outlives the context.
    let source = unsafe { &mut *(opaque as *mut Box<dyn ByteSource>) };
    // SAFETY: FFmpeg hands us a writable buffer of `buf_size` bytes.
    let buf = unsafe { std::slice::from_raw_parts_mut(buf, buf_size as usize) };

    match panic::catch_unwind(AssertUnwindSafe(|| read_some(source.as_mut(), buf))) {
        Ok(Ok(0)) => {
            trace!("byte source reached end of stream");
            ffi::AVERROR_EOF
        }
        Ok(Ok(read)) => read.min(buf.len()) as c_int,
        Ok(Err(e)) => {
            warn!(error = %e, "byte source read failed");
            ffi::AVERROR(ffi::EIO)
        }
        Err(_) => {
            error!("byte source panicked during read");
            ffi::AVERROR(ffi::EIO)
        }
    }
}

fn read_some(source: &mut dyn ByteSource, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match source.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}
