#![forbid(unsafe_code)]

//! Loupe public facade crate.
//!
//! Re-exports the document seam from `loupe-core` and the inspector from
//! `loupe-inspect`, plus a prelude for hosts. Browser pages use the
//! `loupe-web` binding; everything else (tests, headless tooling) drives an
//! [`Inspector`] over a [`MemoryDom`] directly.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use loupe_core::dom::{Dom, DomError, NodeId};
pub use loupe_core::event::{
    Disposition, EventKind, Interest, KeyChord, Modifiers, PageEvent,
};
pub use loupe_core::geometry::{Rect, Sides};
pub use loupe_core::marker::{MARKER_ATTR, OverlayRole};
pub use loupe_core::memory::{ElementSpec, MemoryDom};
pub use loupe_core::mode::{ToolMode, UnknownToolMode};
pub use loupe_core::style::ComputedStyle;

// --- Inspector re-exports --------------------------------------------------

pub use loupe_inspect::{
    BufferClipboard, ClipboardError, ClipboardSink, ConfigError, CssAnalysis, DiagnosticEntry,
    DiagnosticEventKind, DiagnosticLog, Dimension, Edges, ElementInfo, EventHost, HeadlessHost,
    HierarchyView, Inspector, InspectorConfig, ListenerGuard, ListenerScope, OverlayRegistry,
    PropertyProvenance, ProvenanceSource, ScopeKind, UiAction,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Loupe hosts.
///
/// Document and clipboard failures never leave the inspector; they are
/// logged where they happen. What remains is setup.
#[derive(Debug)]
pub enum Error {
    /// Options did not parse.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid options: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for Loupe APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Build a headless inspector from a JSON options object, then apply the
/// `LOUPE_*` environment overrides.
///
/// An empty string yields the defaults.
pub fn headless(dom: MemoryDom, options: &str) -> Result<Inspector<MemoryDom>> {
    headless_with_env(dom, options, |key| std::env::var(key).ok())
}

/// [`headless`] with an injectable environment lookup.
pub fn headless_with_env<F>(dom: MemoryDom, options: &str, get_env: F) -> Result<Inspector<MemoryDom>>
where
    F: Fn(&str) -> Option<String>,
{
    let config = InspectorConfig::from_json(options)?.apply_env_with(get_env);
    Ok(Inspector::new(dom, HeadlessHost::new(), BufferClipboard::new(), config))
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Disposition, Dom, ElementSpec, Error, EventKind, Inspector, InspectorConfig, MemoryDom,
        NodeId, PageEvent, Result, ToolMode,
    };

    pub use crate::{core, inspect};
}

pub use loupe_core as core;
pub use loupe_inspect as inspect;
