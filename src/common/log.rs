//! Process-wide `tracing` subscriber installation.
//!
//! The library is loaded into a host process we do not control, so
//! installation is attempted once and a subscriber that is already present
//! (the host's, or ours from an earlier call) is left alone. On Android the
//! standard streams go nowhere, so events are written to logcat instead.

use std::ffi::c_int;

use once_cell::sync::OnceCell;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::common::config::{AdapterCfg, LogFormat};

/// Logcat tag, shared with the Java side of the backend.
pub const LOG_TAG: &str = "WireGuard/GoBackend";

static INSTALLED: OnceCell<bool> = OnceCell::new();

/// Install the subscriber described by the environment. Returns whether
/// this library's subscriber is the active global one.
///
/// The environment is only read by the first call.
pub fn init() -> bool {
    *INSTALLED.get_or_init(|| install(&AdapterCfg::load()))
}

/// Install a subscriber for `cfg`; later calls are no-ops.
pub fn init_with(cfg: &AdapterCfg) -> bool {
    *INSTALLED.get_or_init(|| install(cfg))
}

fn install(cfg: &AdapterCfg) -> bool {
    let filter = EnvFilter::try_new(&cfg.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cfg.log_target);
    #[cfg(target_os = "android")]
    let builder = builder.with_writer(logcat::Logcat).with_ansi(false);

    let installed = match cfg.log_format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Text => builder.try_init().is_ok(),
    };
    if installed {
        tracing::debug!(filter = %cfg.log_filter, "logging initialised");
    }
    installed
}

/// `android_LogPriority` for a `tracing` level.
#[cfg_attr(not(target_os = "android"), allow(dead_code))]
fn logcat_priority(level: &Level) -> c_int {
    match *level {
        Level::TRACE => 2,
        Level::DEBUG => 3,
        Level::INFO => 4,
        Level::WARN => 5,
        Level::ERROR => 6,
    }
}

#[cfg(target_os = "android")]
mod logcat {
    use std::ffi::{c_char, c_int, CString};
    use std::io;

    use tracing::Metadata;
    use tracing_subscriber::fmt::MakeWriter;

    use super::{logcat_priority, LOG_TAG};

    #[link(name = "log")]
    extern "C" {
        fn __android_log_write(prio: c_int, tag: *const c_char, text: *const c_char) -> c_int;
    }

    /// Hands out one [`LogcatLine`] per event.
    pub struct Logcat;

    /// Buffers one formatted event and writes it to logcat when dropped.
    pub struct LogcatLine {
        priority: c_int,
        buf: Vec<u8>,
    }

    impl io::Write for LogcatLine {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for LogcatLine {
        fn drop(&mut self) {
            while self.buf.last() == Some(&b'\n') {
                self.buf.pop();
            }
            self.buf.retain(|&b| b != 0);
            let (Ok(tag), Ok(text)) = (CString::new(LOG_TAG), CString::new(std::mem::take(&mut self.buf)))
            else {
                return;
            };
            unsafe {
                __android_log_write(self.priority, tag.as_ptr(), text.as_ptr());
            }
        }
    }

    impl<'a> MakeWriter<'a> for Logcat {
        type Writer = LogcatLine;

        fn make_writer(&'a self) -> LogcatLine {
            LogcatLine {
                priority: logcat_priority(&tracing::Level::INFO),
                buf: Vec::new(),
            }
        }

        fn make_writer_for(&'a self, meta: &Metadata<'_>) -> LogcatLine {
            LogcatLine {
                priority: logcat_priority(meta.level()),
                buf: Vec::new(),
            }
        }
    }
}
