//! JNI natives of `com.wireguard.android.backend.GoBackend`.
//!
//! Ownership rules at this boundary:
//! - `jstring` arguments are borrowed for the call and released before return.
//! - The tun descriptor passed to `wgTurnOn` now belongs to the engine.
//! - Sockets returned by `wgGetSocketV4/V6` stay owned by the engine.
//! - Returned `jstring`s are fresh local references owned by the caller.
//!
//! Nothing unwinds or throws across: every export catches panics and clears
//! pending exceptions, reporting failure as `-1`/engine code or `null`.

use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use jni_sys::{jint, jstring, JavaVM, JNI_VERSION_1_6};
use tracing::{debug, error};

use crate::common::error::{AdapterError, AdapterResult, SENTINEL_FAILURE};
use crate::common::log;

/// Called by the VM on `System.loadLibrary`.
#[allow(non_snake_case)]
#[no_mangle]
pub extern "system" fn JNI_OnLoad(_vm: *mut JavaVM, _reserved: *mut c_void) -> jint {
    log::init();
    log_engine_version();
    JNI_VERSION_1_6
}

#[cfg(feature = "libwg")]
fn log_engine_version() {
    if let Some(version) = crate::api::adapter::version_string(&crate::engine::libwg::LibWg) {
        tracing::info!("Go backend {version}");
    }
}

#[cfg(not(feature = "libwg"))]
fn log_engine_version() {}

/// Run an integer-returning operation, collapsing failures to a sentinel.
pub fn guard_int<F>(op: &'static str, f: F) -> jint
where
    F: FnOnce() -> AdapterResult<jint>,
{
    log::init();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            debug!(op, code = ?err.code(), %err, "operation failed");
            err.sentinel()
        }
        Err(_) => {
            error!(op, "{}", AdapterError::Internal);
            SENTINEL_FAILURE
        }
    }
}

/// Run a string-returning operation, collapsing failures to `null`.
pub fn guard_text<F>(op: &'static str, f: F) -> jstring
where
    F: FnOnce() -> AdapterResult<jstring>,
{
    log::init();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(s)) => s,
        Ok(Err(err)) => {
            debug!(op, code = ?err.code(), %err, "operation returned no text");
            ptr::null_mut()
        }
        Err(_) => {
            error!(op, "{}", AdapterError::Internal);
            ptr::null_mut()
        }
    }
}

/// Run an operation without a result.
pub fn guard_unit<F>(op: &'static str, f: F)
where
    F: FnOnce() -> AdapterResult<()>,
{
    guard_int(op, || f().map(|()| 0));
}

#[cfg(feature = "libwg")]
#[allow(non_snake_case)]
mod natives {
    use jni_sys::{jclass, jint, jstring, JNIEnv};

    use super::{guard_int, guard_text, guard_unit};
    use crate::api::adapter::Adapter;
    use crate::engine::libwg::LibWg;
    use crate::engine::TunnelHandle;
    use crate::runtime::JniRuntime;

    #[no_mangle]
    pub extern "system" fn Java_com_wireguard_android_backend_GoBackend_wgTurnOn(
        env: *mut JNIEnv,
        _class: jclass,
        ifname: jstring,
        tun_fd: jint,
        settings: jstring,
    ) -> jint {
        guard_int("wgTurnOn", || {
            let runtime = unsafe { JniRuntime::from_raw(env) }?;
            Adapter::new(&LibWg, &runtime)
                .create(
                    JniRuntime::non_null(ifname),
                    tun_fd,
                    JniRuntime::non_null(settings),
                )
                .map(TunnelHandle::raw)
        })
    }

    #[no_mangle]
    pub extern "system" fn Java_com_wireguard_android_backend_GoBackend_wgTurnOff(
        env: *mut JNIEnv,
        _class: jclass,
        handle: jint,
    ) {
        guard_unit("wgTurnOff", || {
            let runtime = unsafe { JniRuntime::from_raw(env) }?;
            Adapter::new(&LibWg, &runtime).destroy(TunnelHandle::from_raw(handle));
            Ok(())
        })
    }

    #[no_mangle]
    pub extern "system" fn Java_com_wireguard_android_backend_GoBackend_wgGetSocketV4(
        env: *mut JNIEnv,
        _class: jclass,
        handle: jint,
    ) -> jint {
        guard_int("wgGetSocketV4", || {
            let runtime = unsafe { JniRuntime::from_raw(env) }?;
            Adapter::new(&LibWg, &runtime).socket_v4(TunnelHandle::from_raw(handle))
        })
    }

    #[no_mangle]
    pub extern "system" fn Java_com_wireguard_android_backend_GoBackend_wgGetSocketV6(
        env: *mut JNIEnv,
        _class: jclass,
        handle: jint,
    ) -> jint {
        guard_int("wgGetSocketV6", || {
            let runtime = unsafe { JniRuntime::from_raw(env) }?;
            Adapter::new(&LibWg, &runtime).socket_v6(TunnelHandle::from_raw(handle))
        })
    }

    #[no_mangle]
    pub extern "system" fn Java_com_wireguard_android_backend_GoBackend_wgGetConfig(
        env: *mut JNIEnv,
        _class: jclass,
        handle: jint,
    ) -> jstring {
        guard_text("wgGetConfig", || {
            let runtime = unsafe { JniRuntime::from_raw(env) }?;
            Adapter::new(&LibWg, &runtime).config(TunnelHandle::from_raw(handle))
        })
    }

    #[no_mangle]
    pub extern "system" fn Java_com_wireguard_android_backend_GoBackend_wgVersion(
        env: *mut JNIEnv,
        _class: jclass,
    ) -> jstring {
        guard_text("wgVersion", || {
            let runtime = unsafe { JniRuntime::from_raw(env) }?;
            Adapter::new(&LibWg, &runtime).version()
        })
    }
}
