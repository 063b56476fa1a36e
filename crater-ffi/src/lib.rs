//! C ABI for stepping the flight software from a foreign host
//!
//! A host creates one [`CraterHandle`] per simulated vehicle, feeds it the encoded frames of
//! each simulation tick with [`crater_step`] and forwards the returned frames to its
//! actuators. Frames are MAVLink v2 as produced by [`crater::codec`].
#![deny(missing_docs)]

use core::{ptr, slice};

pub mod bridge;

use bridge::Bridge;

/// Opaque flight software instance
pub struct CraterHandle {
    inner: Bridge,
}

/// Borrowed byte range
///
/// `data` may be null when `length` is zero.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CraterBuffer {
    /// First byte of the range
    pub data: *const u8,
    /// Number of bytes
    pub length: usize,
}

impl CraterBuffer {
    const EMPTY: Self = Self {
        data: ptr::null(),
        length: 0,
    };

    /// # Safety
    /// A non-null `data` must point to `length` readable bytes that outlive the returned slice.
    unsafe fn as_slice<'a>(self) -> &'a [u8] {
        if self.data.is_null() || self.length == 0 {
            &[]
        } else {
            unsafe { slice::from_raw_parts(self.data, self.length) }
        }
    }
}

/// Creates a flight software instance, or returns null if it cannot be assembled
///
/// Release it with [`crater_free`].
#[unsafe(no_mangle)]
pub extern "C" fn crater_new() -> *mut CraterHandle {
    match Bridge::new() {
        Ok(inner) => Box::into_raw(Box::new(CraterHandle { inner })),
        Err(error) => {
            log::error!("failed to assemble flight software: {error}");
            ptr::null_mut()
        }
    }
}

/// Runs one cycle over `input` and exposes the produced frames through `output`
///
/// Returns `false` without running if `handle` or `output` is null.
///
/// # Safety
/// `handle` must come from [`crater_new`] and not be freed. `input` must describe readable
/// memory for the duration of the call. `output` must be writable. The range written to
/// `output` stays valid until the next call on the same handle or until it is freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn crater_step(
    handle: *mut CraterHandle,
    input: CraterBuffer,
    output: *mut CraterBuffer,
) -> bool {
    if handle.is_null() || output.is_null() {
        log::warn!("crater_step called with a null pointer");
        return false;
    }
    let handle = unsafe { &mut *handle };
    let input = unsafe { input.as_slice() };

    let produced = handle.inner.step(input);
    let buffer = if produced.is_empty() {
        CraterBuffer::EMPTY
    } else {
        CraterBuffer {
            data: produced.as_ptr(),
            length: produced.len(),
        }
    };
    unsafe { output.write(buffer) };
    true
}

/// Releases an instance created by [`crater_new`]
///
/// # Safety
/// `handle` must be null or a pointer from [`crater_new`] that has not been freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn crater_free(handle: *mut CraterHandle) {
    if handle.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(handle));
    }
}
