//! Bindings to the wireguard-go c-archive (`libwg-go`).

use std::ffi::{c_char, c_int, c_void};
use std::os::fd::RawFd;

use super::{Engine, GoString, TunnelHandle};

extern "C" {
    fn wgTurnOn(ifname: GoString<'_>, tun_fd: c_int, settings: GoString<'_>) -> c_int;
    fn wgTurnOff(handle: c_int);
    fn wgGetSocketV4(handle: c_int) -> c_int;
    fn wgGetSocketV6(handle: c_int) -> c_int;
    fn wgGetConfig(handle: c_int) -> *mut c_char;
    fn wgVersion() -> *mut c_char;
}

/// The process-wide wireguard-go instance.
#[derive(Copy, Clone, Debug, Default)]
pub struct LibWg;

impl Engine for LibWg {
    fn turn_on(&self, ifname: GoString<'_>, tun_fd: RawFd, settings: GoString<'_>) -> i32 {
        unsafe { wgTurnOn(ifname, tun_fd, settings) }
    }

    fn turn_off(&self, handle: TunnelHandle) {
        unsafe { wgTurnOff(handle.raw()) }
    }

    fn socket_v4(&self, handle: TunnelHandle) -> RawFd {
        unsafe { wgGetSocketV4(handle.raw()) }
    }

    fn socket_v6(&self, handle: TunnelHandle) -> RawFd {
        unsafe { wgGetSocketV6(handle.raw()) }
    }

    fn config(&self, handle: TunnelHandle) -> *mut c_char {
        unsafe { wgGetConfig(handle.raw()) }
    }

    fn version(&self) -> *mut c_char {
        unsafe { wgVersion() }
    }

    unsafe fn release(&self, text: *mut c_char) {
        // cgo's C.CString allocates with malloc.
        libc::free(text.cast::<c_void>());
    }
}
