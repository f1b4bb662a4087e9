//! The managed side of the boundary: how strings are lent to us and how we
//! hand strings back.

use std::ffi::{c_char, CStr};
use std::fmt;
use std::ptr::NonNull;

use crate::common::error::{AdapterError, AdapterResult};
use crate::engine::GoString;

pub mod jni;

pub use self::jni::JniRuntime;

/// String services of a managed runtime.
pub trait ManagedRuntime {
    /// Non-null reference to a managed string.
    type Str: Copy;

    /// Borrow the string's (modified) UTF-8 bytes. `None` means the host
    /// could not provide them.
    fn borrow_utf(&self, s: Self::Str) -> Option<NonNull<c_char>>;

    /// Byte length of the string's UTF-8 form, as the runtime accounts it.
    fn utf_length(&self, s: Self::Str) -> usize;

    /// Return bytes obtained from [`ManagedRuntime::borrow_utf`].
    ///
    /// # Safety
    ///
    /// `chars` must come from `borrow_utf(s)` and must not be used or
    /// released again afterwards.
    unsafe fn release_utf(&self, s: Self::Str, chars: NonNull<c_char>);

    /// Build a managed string from NUL-terminated text. `None` if the runtime
    /// faulted; any pending fault has been cleared by then.
    fn new_string(&self, text: &CStr) -> Option<Self::Str>;
}

/// Call-scoped view of a managed string.
///
/// Released back to the runtime when dropped.
pub struct BorrowedText<'rt, R: ManagedRuntime + ?Sized> {
    runtime: &'rt R,
    source: R::Str,
    chars: NonNull<c_char>,
    len: usize,
}

impl<'rt, R: ManagedRuntime + ?Sized> BorrowedText<'rt, R> {
    /// Borrow `source`; `name` labels the parameter in the error.
    pub fn borrow(runtime: &'rt R, source: R::Str, name: &'static str) -> AdapterResult<Self> {
        let chars = runtime
            .borrow_utf(source)
            .ok_or(AdapterError::HostAllocation(name))?;
        let len = runtime.utf_length(source);
        Ok(Self {
            runtime,
            source,
            chars,
            len,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Engine view of the borrowed bytes, valid while `self` lives.
    pub fn as_go_string(&self) -> GoString<'_> {
        unsafe { GoString::from_raw_parts(self.chars.as_ptr(), self.len) }
    }
}

impl<R: ManagedRuntime + ?Sized> Drop for BorrowedText<'_, R> {
    fn drop(&mut self) {
        unsafe { self.runtime.release_utf(self.source, self.chars) }
    }
}

impl<R: ManagedRuntime + ?Sized> fmt::Debug for BorrowedText<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BorrowedText").field("len", &self.len).finish()
    }
}
