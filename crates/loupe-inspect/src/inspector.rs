#![forbid(unsafe_code)]

//! The inspector session.
//!
//! [`Inspector`] owns the document handle, the host collaborators and every
//! component's state. Hosts create one per page, forward events to
//! [`Inspector::handle_event`] / [`Inspector::handle_key`], and apply the
//! returned [`Disposition`]. There is no global instance.
//!
//! Two listener scopes exist while active: the chrome scope (own UI, from
//! `activate` to `deactivate`) and the tool scope (the active mode, replaced
//! on every `set_tool`). Each carries a generation; an event stamped with a
//! generation that is no longer live is ignored.

use std::time::Duration;

use loupe_core::dom::{Dom, NodeId};
use loupe_core::event::{Disposition, EventKind, Interest, KeyChord, PageEvent};
use loupe_core::marker::{self, OverlayRole};
use loupe_core::{ToolMode, debug, info, info_span, warn};

use crate::config::InspectorConfig;
use crate::diagnostics::{DiagnosticEntry, DiagnosticEventKind, DiagnosticLog};
use crate::hierarchy::{HierarchyNavigator, HierarchyView, PanelRow};
use crate::highlight::HighlightEngine;
use crate::host::{ClipboardSink, EventHost, ListenerGuard, ListenerScope, ScopeKind};
use crate::info::InfoPopup;
use crate::overlay::{OverlayRegistry, Stage, UiAction};
use crate::selection::SelectionController;
use crate::spacing::SpacingAnalyzer;
use crate::tool::{self, ToolController};

#[derive(Debug)]
struct ChromeScope {
    generation: u64,
    _guard: ListenerGuard,
}

/// An inspector bound to one document.
pub struct Inspector<D: Dom> {
    dom: D,
    host: Box<dyn EventHost>,
    clipboard: Box<dyn ClipboardSink>,
    config: InspectorConfig,
    overlays: OverlayRegistry,
    highlight: HighlightEngine,
    spacing: SpacingAnalyzer,
    selection: SelectionController,
    navigator: HierarchyNavigator,
    popup: InfoPopup,
    tools: ToolController,
    chrome: Option<ChromeScope>,
    hovered_row: Option<PanelRow>,
    next_generation: u64,
    now: Duration,
    diagnostics: Option<DiagnosticLog>,
}

impl<D: Dom> std::fmt::Debug for Inspector<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inspector")
            .field("active", &self.is_active())
            .field("tool", &self.active_tool())
            .field("selected", &self.navigator.selected())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<D: Dom> Inspector<D> {
    /// Create an inactive inspector.
    pub fn new(
        dom: D,
        host: impl EventHost + 'static,
        clipboard: impl ClipboardSink + 'static,
        config: InspectorConfig,
    ) -> Self {
        let diagnostics = config.diagnostics.then(DiagnosticLog::new);
        Self {
            dom,
            host: Box::new(host),
            clipboard: Box::new(clipboard),
            spacing: SpacingAnalyzer::new(config.spacing_edges),
            selection: SelectionController::new(config.link_marker_attr.clone()),
            config,
            overlays: OverlayRegistry::new(),
            highlight: HighlightEngine::new(),
            navigator: HierarchyNavigator::new(),
            popup: InfoPopup::new(),
            tools: ToolController::new(),
            chrome: None,
            hovered_row: None,
            next_generation: 1,
            now: Duration::ZERO,
            diagnostics,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.chrome.is_some()
    }

    /// Install the toolbar and the default tool.
    ///
    /// Returns whether this call activated the inspector; a second call while
    /// active is a no-op returning `false`, as is activating a document
    /// without a `<body>`.
    pub fn activate(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        if self.dom.body().is_none() {
            warn!("cannot activate: document has no body");
            return false;
        }
        let _span = info_span!("activate").entered();
        let generation = self.bump_generation();
        let guard = self.host.attach(ListenerScope {
            generation,
            interest: Interest::all(),
            capture_clicks: true,
            kind: ScopeKind::Chrome,
        });
        self.chrome = Some(ChromeScope {
            generation,
            _guard: guard,
        });

        let default_tool = self.config.default_tool;
        let mut stage = Stage::new(&mut self.dom, &mut self.overlays);
        if let Err(err) = tool::build_toolbar(&mut stage, default_tool) {
            warn!(error = %err, "toolbar render failed");
        }
        self.set_tool(default_tool);
        info!(tool = %default_tool, "inspector activated");
        self.record(|| DiagnosticEntry::new(DiagnosticEventKind::Activated).with_mode(default_tool));
        true
    }

    /// Remove every inspector node and detach every listener.
    ///
    /// Returns whether the inspector was active. Safe to call at any time.
    pub fn deactivate(&mut self) -> bool {
        let was_active = self.is_active();
        self.clear_effects();
        self.navigator.reset();
        let removed = self.overlays.remove_all(&mut self.dom);
        self.chrome = None;
        if was_active {
            info!(removed, "inspector deactivated");
            self.record(|| DiagnosticEntry::new(DiagnosticEventKind::Deactivated).with_count(removed));
        }
        was_active
    }

    /// Activate if inactive, else deactivate. Returns the new active state.
    pub fn toggle(&mut self) -> bool {
        if self.is_active() {
            self.deactivate();
        } else {
            self.activate();
        }
        self.is_active()
    }

    /// Deactivate and hand the document back.
    pub fn destroy(mut self) -> D {
        self.deactivate();
        self.dom
    }

    /// The active mode, if active.
    #[must_use]
    pub fn active_tool(&self) -> Option<ToolMode> {
        self.tools.mode()
    }

    /// Switch to `mode`.
    ///
    /// Tears down the current mode's listeners and overlays, repaints the
    /// toolbar and installs the new mode. Selecting the already active mode
    /// resets it. Ignored while inactive.
    pub fn set_tool(&mut self, mode: ToolMode) -> bool {
        if !self.is_active() {
            return false;
        }
        let previous = self.tools.mode();
        self.clear_effects();
        tool::paint_toolbar(&mut self.dom, mode);
        let generation = self.bump_generation();
        self.tools
            .install(&mut self.dom, self.host.as_mut(), mode, generation);
        self.record(|| {
            DiagnosticEntry::new(DiagnosticEventKind::ToolChanged)
                .with_mode(mode)
                .with_previous_mode(previous)
        });
        true
    }

    /// Switch by name. Unknown names change nothing and return `false`.
    pub fn set_tool_named(&mut self, name: &str) -> bool {
        match name.parse::<ToolMode>() {
            Ok(mode) => self.set_tool(mode),
            Err(err) => {
                warn!(%err, "ignoring tool request");
                false
            }
        }
    }

    /// Route a pointer event to the scope that delivered it.
    pub fn handle_event(&mut self, event: &PageEvent) -> Disposition {
        if self
            .chrome
            .as_ref()
            .is_some_and(|c| c.generation == event.generation)
        {
            return self.handle_chrome_event(event);
        }
        if self.tools.accepts(event) {
            return self.handle_tool_event(event);
        }
        Disposition::PASS
    }

    /// Ctrl/Cmd+Shift+V toggles; the combination's default is suppressed.
    pub fn handle_key(&mut self, chord: &KeyChord) -> Disposition {
        if chord.is_toggle_shortcut() {
            self.toggle();
            Disposition {
                prevent_default: true,
                stop_propagation: false,
            }
        } else {
            Disposition::PASS
        }
    }

    /// Advance the host clock and expire the info popup if due.
    pub fn advance(&mut self, now: Duration) -> bool {
        self.now = now;
        let mut stage = Stage::new(&mut self.dom, &mut self.overlays);
        self.popup.sweep(&mut stage, now)
    }

    /// Host clock as of the last [`advance`](Self::advance).
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// When the current info popup expires, if one is showing.
    #[must_use]
    pub fn info_expires_at(&self) -> Option<Duration> {
        self.popup.expires_at()
    }

    #[must_use]
    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Mutable document access, for hosts that edit the page between events.
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    #[must_use]
    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    #[must_use]
    pub fn navigator(&self) -> &HierarchyNavigator {
        &self.navigator
    }

    /// Rows the hierarchy panel shows for the current selection.
    pub fn hierarchy_view(&mut self) -> Option<HierarchyView> {
        self.navigator.view(&self.dom)
    }

    /// Element currently outlined.
    #[must_use]
    pub fn highlighted(&self) -> Option<NodeId> {
        self.highlight.current()
    }

    /// Generation of the live chrome scope.
    #[must_use]
    pub fn chrome_generation(&self) -> Option<u64> {
        self.chrome.as_ref().map(|c| c.generation)
    }

    /// Generation of the live tool scope.
    #[must_use]
    pub fn tool_generation(&self) -> Option<u64> {
        self.tools.generation()
    }

    #[must_use]
    pub fn diagnostic_log(&self) -> Option<&DiagnosticLog> {
        self.diagnostics.as_ref()
    }

    fn bump_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    fn record(&mut self, entry: impl FnOnce() -> DiagnosticEntry) {
        if let Some(log) = self.diagnostics.as_mut() {
            log.record(entry());
        }
    }

    fn popup_deadline(&self) -> Duration {
        self.now.saturating_add(self.config.info_ttl())
    }

    /// Undo everything the active mode did.
    fn clear_effects(&mut self) {
        self.tools.teardown(&mut self.dom);
        self.highlight.unhighlight(&mut self.dom);
        self.restore_hovered_row();
        let mut stage = Stage::new(&mut self.dom, &mut self.overlays);
        self.spacing.hide(&mut stage);
        self.navigator.close(&mut stage);
        self.popup.clear(&mut stage);
        stage.overlays.remove_roles(stage.dom, &[OverlayRole::Guide]);
    }

    fn show_info(&mut self, text: &str, event: &PageEvent) {
        let deadline = self.popup_deadline();
        let mut stage = Stage::new(&mut self.dom, &mut self.overlays);
        let shown = self
            .popup
            .show(&mut stage, text, event.page_x, event.page_y, deadline);
        if let Some(node) = shown {
            self.record(|| DiagnosticEntry::new(DiagnosticEventKind::InfoShown).with_node(node));
        }
    }

    fn handle_tool_event(&mut self, event: &PageEvent) -> Disposition {
        let Some(mode) = self.tools.mode() else {
            return Disposition::PASS;
        };
        let target = event.target;
        match (mode, event.kind) {
            (ToolMode::Inspect, EventKind::PointerOver) => {
                if self.highlight.highlight(&mut self.dom, target) {
                    self.record(|| {
                        DiagnosticEntry::new(DiagnosticEventKind::Highlighted).with_node(target)
                    });
                }
                Disposition::PASS
            }
            (ToolMode::Inspect, EventKind::PointerOut) => {
                self.highlight.unhighlight(&mut self.dom);
                Disposition::PASS
            }
            (ToolMode::Inspect, EventKind::Click) => {
                let deadline = self.popup_deadline();
                let mut stage = Stage::new(&mut self.dom, &mut self.overlays);
                let outcome = self.selection.click(
                    &mut stage,
                    &mut self.navigator,
                    &mut self.popup,
                    event,
                    deadline,
                );
                if let Some(node) = outcome.selected {
                    self.hovered_row = None;
                    self.record(|| DiagnosticEntry::new(DiagnosticEventKind::Selected).with_node(node));
                }
                outcome.disposition
            }
            (ToolMode::Spacing, EventKind::PointerOver) => {
                let mut stage = Stage::new(&mut self.dom, &mut self.overlays);
                if let Some(count) = self.spacing.show(&mut stage, target) {
                    self.record(|| {
                        DiagnosticEntry::new(DiagnosticEventKind::SpacingRendered)
                            .with_node(target)
                            .with_count(count)
                    });
                }
                Disposition::PASS
            }
            (ToolMode::Spacing, EventKind::PointerOut) => {
                let mut stage = Stage::new(&mut self.dom, &mut self.overlays);
                self.spacing.hide(&mut stage);
                Disposition::PASS
            }
            (ToolMode::Color, EventKind::Click) => self.pick_color(event),
            (ToolMode::Font, EventKind::Click) => self.inspect_font(event),
            (ToolMode::Spacing, EventKind::Click)
            | (ToolMode::Color | ToolMode::Font, EventKind::PointerOver | EventKind::PointerOut) => {
                Disposition::PASS
            }
        }
    }

    fn pick_color(&mut self, event: &PageEvent) -> Disposition {
        let target = event.target;
        if marker::is_own_ui(&self.dom, target) {
            return Disposition::PASS;
        }
        let Some(style) = self.dom.computed_style(target) else {
            return Disposition::PASS;
        };
        let color = style.get("color").to_owned();
        if let Err(err) = self.clipboard.write_text(&color) {
            debug!(error = %err, "clipboard write failed");
            let context = err.to_string();
            self.record(|| {
                DiagnosticEntry::new(DiagnosticEventKind::ClipboardFailed).with_context(context)
            });
        }
        self.show_info(&format!("Copied: {color}"), event);
        Disposition::SUPPRESS
    }

    fn inspect_font(&mut self, event: &PageEvent) -> Disposition {
        let target = event.target;
        if marker::is_own_ui(&self.dom, target) {
            return Disposition::PASS;
        }
        let Some(style) = self.dom.computed_style(target) else {
            return Disposition::PASS;
        };
        let text = format!(
            "{} {} {}",
            style.get("font-family"),
            style.get("font-size"),
            style.get("font-weight")
        );
        self.show_info(&text, event);
        Disposition::SUPPRESS
    }

    fn handle_chrome_event(&mut self, event: &PageEvent) -> Disposition {
        if !marker::is_own_ui(&self.dom, event.target) {
            return Disposition::PASS;
        }
        match event.kind {
            EventKind::Click => {
                let Some((_, action)) = self.overlays.action_for(&self.dom, event.target) else {
                    return Disposition::PASS;
                };
                self.perform(action);
                Disposition::STOP
            }
            EventKind::PointerOver => {
                let row = self.navigator.row_at(&self.dom, event.target);
                if row != self.hovered_row {
                    self.restore_hovered_row();
                    if let Some(row) = row {
                        self.hover_row(row);
                    }
                }
                Disposition::PASS
            }
            EventKind::PointerOut => {
                let row = self.navigator.row_at(&self.dom, event.target);
                if row.is_some() && row == self.hovered_row {
                    self.restore_hovered_row();
                }
                Disposition::PASS
            }
        }
    }

    fn perform(&mut self, action: UiAction) {
        debug!(?action, "ui action");
        match action {
            UiAction::SetTool(mode) => {
                self.set_tool(mode);
            }
            UiAction::Deactivate => {
                self.deactivate();
            }
            UiAction::Select(node) => {
                self.hovered_row = None;
                let mut stage = Stage::new(&mut self.dom, &mut self.overlays);
                if self.navigator.open(&mut stage, node).is_some() {
                    self.highlight.highlight(&mut self.dom, node);
                    self.record(|| DiagnosticEntry::new(DiagnosticEventKind::Selected).with_node(node));
                }
            }
            UiAction::ToggleExpand(node) => {
                self.hovered_row = None;
                let mut stage = Stage::new(&mut self.dom, &mut self.overlays);
                self.navigator.toggle_expanded(&mut stage, node);
                let expanded = self.navigator.is_expanded(node);
                self.record(|| {
                    DiagnosticEntry::new(DiagnosticEventKind::ExpandToggled)
                        .with_node(node)
                        .with_enabled(expanded)
                });
            }
            UiAction::ClosePanel => {
                self.hovered_row = None;
                self.highlight.unhighlight(&mut self.dom);
                let mut stage = Stage::new(&mut self.dom, &mut self.overlays);
                self.navigator.close(&mut stage);
                self.record(|| DiagnosticEntry::new(DiagnosticEventKind::PanelClosed));
            }
        }
    }

    fn hover_row(&mut self, row: PanelRow) {
        let Some((_, hover)) = row.backgrounds() else {
            return;
        };
        let _ = self
            .dom
            .set_inline_style(row.element, "background", Some(hover));
        self.highlight.highlight(&mut self.dom, row.referent);
        self.hovered_row = Some(row);
    }

    fn restore_hovered_row(&mut self) {
        let Some(row) = self.hovered_row.take() else {
            return;
        };
        if let Some((base, _)) = row.backgrounds()
            && self.dom.is_connected(row.element)
        {
            let _ = self
                .dom
                .set_inline_style(row.element, "background", Some(base));
        }
        if self.highlight.current() == Some(row.referent) {
            self.highlight.unhighlight(&mut self.dom);
        }
    }
}
