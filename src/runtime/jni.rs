//! [`ManagedRuntime`] over the raw JNI function table.

use std::ffi::{c_char, CStr};
use std::ptr::{self, NonNull};

use jni_sys::{jstring, JNIEnv, JNINativeInterface_, JNI_TRUE};
use tracing::warn;

use super::ManagedRuntime;
use crate::common::error::{AdapterError, AdapterResult};

/// The calling thread's `JNIEnv`, valid for one native call.
pub struct JniRuntime {
    env: NonNull<JNIEnv>,
}

impl JniRuntime {
    /// Wrap the environment passed to a native method.
    ///
    /// # Safety
    ///
    /// `env` must be the `JNIEnv` of the current thread and the value must not
    /// outlive the native call it was passed to.
    pub unsafe fn from_raw(env: *mut JNIEnv) -> AdapterResult<Self> {
        match NonNull::new(env) {
            Some(env) if !(*env.as_ptr()).is_null() => Ok(Self { env }),
            _ => Err(AdapterError::MissingEnv),
        }
    }

    /// `None` for a null Java reference.
    pub fn non_null(s: jstring) -> Option<jstring> {
        (!s.is_null()).then_some(s)
    }

    fn raw(&self) -> *mut JNIEnv {
        self.env.as_ptr()
    }

    fn table(&self) -> &JNINativeInterface_ {
        // from_raw checked both levels of indirection.
        unsafe { &**self.env.as_ptr() }
    }

    /// Clear a pending Java exception. Returns whether one was pending.
    fn clear_pending_exception(&self) -> bool {
        let (Some(check), Some(clear)) = (self.table().ExceptionCheck, self.table().ExceptionClear)
        else {
            return false;
        };
        unsafe {
            if check(self.raw()) != JNI_TRUE {
                return false;
            }
            clear(self.raw());
        }
        warn!("cleared pending Java exception at the boundary");
        true
    }
}

impl ManagedRuntime for JniRuntime {
    type Str = jstring;

    fn borrow_utf(&self, s: jstring) -> Option<NonNull<c_char>> {
        let get = self.table().GetStringUTFChars?;
        let chars = unsafe { get(self.raw(), s, ptr::null_mut()) };
        let chars = NonNull::new(chars as *mut c_char);
        if chars.is_none() {
            // The VM raises OutOfMemoryError alongside the null.
            self.clear_pending_exception();
        }
        chars
    }

    fn utf_length(&self, s: jstring) -> usize {
        match self.table().GetStringUTFLength {
            Some(len) => usize::try_from(unsafe { len(self.raw(), s) }).unwrap_or(0),
            None => 0,
        }
    }

    unsafe fn release_utf(&self, s: jstring, chars: NonNull<c_char>) {
        if let Some(release) = self.table().ReleaseStringUTFChars {
            release(self.raw(), s, chars.as_ptr());
        }
    }

    fn new_string(&self, text: &CStr) -> Option<jstring> {
        let new = self.table().NewStringUTF?;
        let s = unsafe { new(self.raw(), text.as_ptr()) };
        if self.clear_pending_exception() {
            if !s.is_null() {
                if let Some(delete) = self.table().DeleteLocalRef {
                    unsafe { delete(self.raw(), s) };
                }
            }
            return None;
        }
        Self::non_null(s)
    }
}
