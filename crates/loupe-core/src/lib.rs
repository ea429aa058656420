#![forbid(unsafe_code)]

//! Core: document access, geometry, style snapshots, and page events.
//!
//! Nothing in this crate knows about a browser. The [`dom::Dom`] trait is the
//! single seam to a live document; [`memory::MemoryDom`] implements it in
//! memory so the inspector can run headless.

pub mod dom;
pub mod event;
pub mod geometry;
pub mod logging;
pub mod marker;
pub mod memory;
pub mod mode;
pub mod style;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, info, info_span, trace, warn};

pub use dom::{Dom, DomError, NodeId};
pub use geometry::{Rect, Sides};
pub use marker::{MARKER_ATTR, OverlayRole};
pub use memory::{ElementSpec, MemoryDom};
pub use mode::ToolMode;
pub use style::ComputedStyle;
