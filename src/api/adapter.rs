//! The six GoBackend operations, independent of JNI.
//!
//! Each call borrows what it needs for exactly its own duration: managed
//! strings through [`BorrowedText`], engine text through [`NativeBuffer`].
//! Both release in `Drop`, so every return path (including `?`) cleans up.

use std::os::fd::RawFd;

use tracing::{debug, warn};

use crate::common::buf::NativeBuffer;
use crate::common::error::{AdapterError, AdapterResult};
use crate::engine::{Engine, TunnelHandle};
use crate::runtime::{BorrowedText, ManagedRuntime};
use crate::stats::{self, Statistics};

/// Binds one engine to one managed runtime for the duration of a call.
pub struct Adapter<'a, E: ?Sized, R: ?Sized> {
    engine: &'a E,
    runtime: &'a R,
}

impl<'a, E, R> Adapter<'a, E, R>
where
    E: Engine + ?Sized,
    R: ManagedRuntime + ?Sized,
{
    pub fn new(engine: &'a E, runtime: &'a R) -> Self {
        Self { engine, runtime }
    }

    /// Bring up a tunnel named `ifname` on `tun_fd` with UAPI `settings`.
    pub fn create(
        &self,
        ifname: Option<R::Str>,
        tun_fd: RawFd,
        settings: Option<R::Str>,
    ) -> AdapterResult<TunnelHandle> {
        let (Some(ifname), Some(settings)) = (ifname, settings) else {
            let missing = if ifname.is_none() { "ifname" } else { "settings" };
            warn!(missing, "turn on rejected");
            return Err(AdapterError::InvalidArgument(missing));
        };

        let ifname = BorrowedText::borrow(self.runtime, ifname, "ifname")?;
        let settings = BorrowedText::borrow(self.runtime, settings, "settings")?;

        debug!(tun_fd, settings_len = settings.len(), "turning tunnel on");
        let ret = self
            .engine
            .turn_on(ifname.as_go_string(), tun_fd, settings.as_go_string());
        TunnelHandle::from_engine(ret)
    }

    pub fn destroy(&self, handle: TunnelHandle) {
        debug!(?handle, "turning tunnel off");
        self.engine.turn_off(handle);
    }

    pub fn socket_v4(&self, handle: TunnelHandle) -> AdapterResult<RawFd> {
        fd_result(self.engine.socket_v4(handle))
    }

    pub fn socket_v6(&self, handle: TunnelHandle) -> AdapterResult<RawFd> {
        fd_result(self.engine.socket_v6(handle))
    }

    /// Current configuration of `handle` as a managed string.
    pub fn config(&self, handle: TunnelHandle) -> AdapterResult<R::Str> {
        let text = unsafe { NativeBuffer::from_raw(self.engine, self.engine.config(handle)) }
            .ok_or(AdapterError::Engine(0))?;
        self.to_managed(text)
    }

    /// Engine version as a managed string.
    pub fn version(&self) -> AdapterResult<R::Str> {
        let text = unsafe { NativeBuffer::from_raw(self.engine, self.engine.version()) }
            .ok_or(AdapterError::Engine(0))?;
        self.to_managed(text)
    }

    /// Per-peer transfer statistics parsed from the configuration.
    pub fn statistics(&self, handle: TunnelHandle) -> Option<Statistics> {
        stats::fetch(self.engine, handle)
    }

    /// Engine version as a Rust string.
    pub fn version_string(&self) -> Option<String> {
        version_string(self.engine)
    }

    fn to_managed(&self, text: NativeBuffer<'_, E>) -> AdapterResult<R::Str> {
        let converted = self.runtime.new_string(text.as_c_str());
        drop(text);
        converted.ok_or_else(|| {
            warn!("could not build managed string from engine text");
            AdapterError::Conversion
        })
    }
}

/// Engine version without going through a managed runtime.
pub fn version_string<E: Engine + ?Sized>(engine: &E) -> Option<String> {
    let text = unsafe { NativeBuffer::from_raw(engine, engine.version()) }?;
    Some(text.to_string_lossy())
}

fn fd_result(fd: RawFd) -> AdapterResult<RawFd> {
    if fd < 0 {
        Err(AdapterError::Engine(fd))
    } else {
        Ok(fd)
    }
}
