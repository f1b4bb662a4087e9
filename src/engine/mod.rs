//! The tunnel engine as seen from the boundary.
//!
//! The engine owns every tunnel; the adapter only forwards opaque handles,
//! length-qualified text and file descriptors to it.

use std::ffi::c_char;
use std::fmt;
use std::marker::PhantomData;
use std::os::fd::RawFd;

use crate::common::error::{AdapterError, AdapterResult};

#[cfg(feature = "libwg")]
pub mod libwg;

/// Opaque identifier of one running tunnel inside the engine.
///
/// Never dereferenced and never checked for liveness here.
#[repr(transparent)]
#[derive(Copy, Clone)]
pub struct TunnelHandle(i32);

impl TunnelHandle {
    /// Wrap a raw handle received from the managed caller.
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Interpret an engine `create` result: negative values are failures.
    pub const fn from_engine(ret: i32) -> AdapterResult<Self> {
        if ret < 0 {
            Err(AdapterError::Engine(ret))
        } else {
            Ok(Self(ret))
        }
    }

    /// Raw integer value.
    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Debug for TunnelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TunnelHandle({})", self.0)
    }
}

/// Length-qualified text as the Go runtime expects it (`_GoString_`).
///
/// The bytes need not be NUL terminated; `n` is authoritative. The lifetime
/// ties the view to whatever lent the bytes.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct GoString<'a> {
    p: *const c_char,
    n: isize,
    _borrow: PhantomData<&'a [u8]>,
}

impl<'a> GoString<'a> {
    /// View over a Rust byte slice.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self {
            p: bytes.as_ptr().cast(),
            n: bytes.len() as isize,
            _borrow: PhantomData,
        }
    }

    /// View over foreign memory.
    ///
    /// # Safety
    ///
    /// `p` must point to at least `n` readable bytes that stay valid and
    /// unmodified for `'a`.
    pub unsafe fn from_raw_parts(p: *const c_char, n: usize) -> Self {
        Self {
            p,
            n: n as isize,
            _borrow: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.n as usize
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// The viewed bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        if self.n == 0 || self.p.is_null() {
            return &[];
        }
        // Construction guarantees `n` readable bytes at `p` for `'a`.
        unsafe { std::slice::from_raw_parts(self.p.cast(), self.n as usize) }
    }
}

impl fmt::Debug for GoString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoString").field("n", &self.n).finish()
    }
}

/// Entry points of the native tunnel engine.
///
/// Text returned by [`Engine::config`] and [`Engine::version`] is owned by
/// the caller and must go back through [`Engine::release`] exactly once;
/// wrap it in [`crate::common::buf::NativeBuffer`] rather than calling
/// `release` by hand.
pub trait Engine {
    /// Bring a tunnel up on `tun_fd`. Non-negative results are handles.
    fn turn_on(&self, ifname: GoString<'_>, tun_fd: RawFd, settings: GoString<'_>) -> i32;

    fn turn_off(&self, handle: TunnelHandle);

    /// UDP socket used for IPv4 traffic, or a negative value.
    fn socket_v4(&self, handle: TunnelHandle) -> RawFd;

    /// UDP socket used for IPv6 traffic, or a negative value.
    fn socket_v6(&self, handle: TunnelHandle) -> RawFd;

    /// Current UAPI configuration text, or null.
    fn config(&self, handle: TunnelHandle) -> *mut c_char;

    /// Engine version text, or null.
    fn version(&self) -> *mut c_char;

    /// Free text previously returned by this engine.
    ///
    /// # Safety
    ///
    /// `text` must be a non-null pointer obtained from [`Engine::config`] or
    /// [`Engine::version`] of this engine and not released before.
    unsafe fn release(&self, text: *mut c_char);
}
