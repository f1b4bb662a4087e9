//! Error handling primitives shared across the adapter.
//!
//! Everything inside the crate works with [`AdapterResult`]; only the JNI
//! exports collapse an [`AdapterError`] into the integer or null sentinel the
//! managed caller expects.

use thiserror::Error;

/// Generic failure value returned to the managed side for local errors.
pub const SENTINEL_FAILURE: i32 = -1;

/// Stable codes describing which class of failure occurred.
#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AdapterCode {
    /// A required text parameter was a null reference.
    InvalidArgument = 1,
    /// The host runtime could not lend us a view of a string.
    HostAllocation = 2,
    /// The engine reported a failure.
    Engine = 3,
    /// Building a managed string from native text faulted.
    Conversion = 4,
    /// A panic was caught at the boundary.
    Internal = 5,
    /// The native method was entered without a usable `JNIEnv`.
    MissingEnv = 6,
}

/// Canonical error type for the adapter.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum AdapterError {
    #[error("invalid argument: {0} is null")]
    InvalidArgument(&'static str),

    #[error("host allocation failure while borrowing {0}")]
    HostAllocation(&'static str),

    /// Raw engine result; the reason is opaque to the adapter.
    #[error("engine failure ({0})")]
    Engine(i32),

    #[error("managed string conversion faulted")]
    Conversion,

    #[error("panic caught at the boundary")]
    Internal,

    #[error("no usable JNIEnv for this call")]
    MissingEnv,
}

/// Result alias used throughout the crate.
pub type AdapterResult<T> = Result<T, AdapterError>;

impl AdapterError {
    /// Machine readable class of this error.
    pub const fn code(&self) -> AdapterCode {
        match self {
            Self::InvalidArgument(_) => AdapterCode::InvalidArgument,
            Self::HostAllocation(_) => AdapterCode::HostAllocation,
            Self::Engine(_) => AdapterCode::Engine,
            Self::Conversion => AdapterCode::Conversion,
            Self::Internal => AdapterCode::Internal,
            Self::MissingEnv => AdapterCode::MissingEnv,
        }
    }

    /// Integer handed back across the boundary.
    ///
    /// Engine failures keep the engine's own (negative) value; every locally
    /// detected failure maps to [`SENTINEL_FAILURE`].
    pub const fn sentinel(&self) -> i32 {
        match self {
            Self::Engine(code) if *code < 0 => *code,
            _ => SENTINEL_FAILURE,
        }
    }
}
