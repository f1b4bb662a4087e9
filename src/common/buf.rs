//! Owning wrapper for text the engine hands across the boundary.

use std::ffi::{c_char, CStr};
use std::fmt;
use std::ptr::NonNull;

use crate::engine::Engine;

/// NUL-terminated text allocated by the engine.
///
/// The buffer goes back to the engine exactly once, when the wrapper is
/// dropped. A null pointer never becomes a `NativeBuffer`.
pub struct NativeBuffer<'e, E: Engine + ?Sized> {
    engine: &'e E,
    ptr: NonNull<c_char>,
}

impl<'e, E: Engine + ?Sized> NativeBuffer<'e, E> {
    /// Take ownership of `ptr`, or return `None` for null.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must be a NUL-terminated buffer returned by `engine`
    /// that nobody else releases.
    pub unsafe fn from_raw(engine: &'e E, ptr: *mut c_char) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { engine, ptr })
    }

    pub fn as_c_str(&self) -> &CStr {
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.as_c_str().to_bytes()
    }

    /// Copy the text out, replacing invalid UTF-8.
    pub fn to_string_lossy(&self) -> String {
        self.as_c_str().to_string_lossy().into_owned()
    }
}

impl<E: Engine + ?Sized> Drop for NativeBuffer<'_, E> {
    fn drop(&mut self) {
        unsafe { self.engine.release(self.ptr.as_ptr()) }
    }
}

impl<E: Engine + ?Sized> fmt::Debug for NativeBuffer<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBuffer")
            .field("len", &self.as_bytes().len())
            .finish()
    }
}
