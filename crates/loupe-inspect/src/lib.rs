#![forbid(unsafe_code)]

//! The inspector: tool modes, highlighting, box-model and provenance
//! analysis, the hierarchy navigator, and the [`Inspector`] session that
//! ties them to a [`Dom`](loupe_core::Dom).
//!
//! Everything here runs against the [`Dom`](loupe_core::Dom),
//! [`EventHost`] and [`ClipboardSink`] seams, so the same code drives a
//! browser page (through `loupe-web`) and a [`MemoryDom`](loupe_core::MemoryDom)
//! in tests.
//!
//! # Example
//!
//! ```
//! use loupe_core::{Dom, ElementSpec, MemoryDom, ToolMode};
//! use loupe_core::event::{EventKind, PageEvent};
//! use loupe_inspect::{BufferClipboard, HeadlessHost, Inspector, InspectorConfig};
//!
//! let mut dom = MemoryDom::new();
//! let body = dom.body().unwrap();
//! let title = dom.append(body, ElementSpec::new("h1").computed("color", "rgb(0, 0, 0)"));
//!
//! let clipboard = BufferClipboard::new();
//! let mut inspector = Inspector::new(dom, HeadlessHost::new(), clipboard.clone(), InspectorConfig::default());
//! inspector.activate();
//! inspector.set_tool(ToolMode::Color);
//!
//! let generation = inspector.tool_generation().unwrap();
//! inspector.handle_event(&PageEvent::new(EventKind::Click, title, generation));
//! assert_eq!(clipboard.contents().as_deref(), Some("rgb(0, 0, 0)"));
//! ```

pub mod config;
pub mod diagnostics;
pub mod hierarchy;
pub mod highlight;
pub mod host;
pub mod info;
pub mod inspector;
pub mod overlay;
pub mod provenance;
pub mod selection;
pub mod spacing;
pub mod tool;

pub use config::{ConfigError, InspectorConfig};
pub use diagnostics::{DiagnosticEntry, DiagnosticEventKind, DiagnosticLog};
pub use hierarchy::{HierarchyNavigator, HierarchyRow, HierarchyView, RowKind};
pub use highlight::HighlightEngine;
pub use host::{
    BufferClipboard, ClipboardError, ClipboardSink, EventHost, HeadlessHost, ListenerGuard,
    ListenerScope, ScopeKind,
};
pub use info::{ElementInfo, InfoPopup};
pub use inspector::Inspector;
pub use overlay::{OverlayRegistry, Stage, UiAction};
pub use provenance::{CssAnalysis, Dimension, PropertyProvenance, ProvenanceSource};
pub use selection::SelectionController;
pub use spacing::{BoxModel, Edges, SpacingAnalyzer};
pub use tool::ToolController;
