#![forbid(unsafe_code)]

//! Log macros for the inspector crates.
//!
//! With the `tracing` feature these are the `tracing` macros. Without it they
//! expand to nothing, so a wasm build carries no subscriber. Only the levels
//! the inspector logs at are provided.

#[cfg(feature = "tracing")]
pub use tracing::{debug, info, info_span, trace, warn};

#[cfg(not(feature = "tracing"))]
mod silent {
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// Expands to a [`SilentSpan`](crate::logging::SilentSpan).
    #[macro_export]
    macro_rules! info_span {
        ($($arg:tt)*) => {
            $crate::logging::SilentSpan
        };
    }
}

/// Stand-in for a `tracing::Span` when logging is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSpan;

#[cfg(not(feature = "tracing"))]
impl SilentSpan {
    /// Mirrors `Span::entered`; the guard does nothing.
    #[must_use]
    pub fn entered(self) -> SilentGuard {
        SilentGuard
    }
}

#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct SilentGuard;
