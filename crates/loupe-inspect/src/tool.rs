#![forbid(unsafe_code)]

//! Tool mode switching: listener scopes, body cursor, and the toolbar.
//!
//! The controller owns at most one tool listener scope. Installing a mode
//! drops the previous guard first, so two tool scopes are never live at
//! once. Overlay teardown is the caller's part (see
//! [`Inspector::set_tool`](crate::Inspector::set_tool)).

use loupe_core::dom::{Dom, DomError, NodeId};
use loupe_core::event::{Interest, PageEvent};
use loupe_core::marker::OverlayRole;
use loupe_core::{ToolMode, debug};

use crate::host::{EventHost, ListenerGuard, ListenerScope, ScopeKind};
use crate::overlay::{Decls, OverlayRegistry, Stage, UiAction, Z_CHROME};

/// Toolbar button background for the active mode.
pub const ACTIVE_BUTTON: &str = "#78E2FF";
/// Toolbar button background for inactive modes.
pub const IDLE_BUTTON: &str = "#2a2a2a";

/// Event kinds a mode listens for.
pub const fn interest(mode: ToolMode) -> Interest {
    match mode {
        ToolMode::Inspect => Interest::HOVER.union(Interest::CLICK),
        ToolMode::Spacing => Interest::HOVER,
        ToolMode::Color | ToolMode::Font => Interest::CLICK,
    }
}

#[derive(Debug)]
struct ActiveTool {
    mode: ToolMode,
    generation: u64,
    _guard: ListenerGuard,
}

/// Holds the active mode's listener scope and body cursor.
#[derive(Debug, Default)]
pub struct ToolController {
    active: Option<ActiveTool>,
    /// Body's inline cursor before the first mode changed it.
    saved_cursor: Option<Option<String>>,
}

impl ToolController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active mode, if a tool is installed.
    #[must_use]
    pub fn mode(&self) -> Option<ToolMode> {
        self.active.as_ref().map(|a| a.mode)
    }

    /// Generation of the installed tool scope.
    #[must_use]
    pub fn generation(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.generation)
    }

    /// Whether `event` was delivered by the live tool scope for a kind the
    /// mode listens to.
    #[must_use]
    pub fn accepts(&self, event: &PageEvent) -> bool {
        self.active.as_ref().is_some_and(|a| {
            a.generation == event.generation && interest(a.mode).contains(event.kind.interest())
        })
    }

    /// Install `mode`'s listeners under `generation`. Any previous scope is
    /// detached first.
    pub fn install<D: Dom>(
        &mut self,
        dom: &mut D,
        host: &mut dyn EventHost,
        mode: ToolMode,
        generation: u64,
    ) {
        self.detach();
        let guard = host.attach(ListenerScope {
            generation,
            interest: interest(mode),
            capture_clicks: true,
            kind: ScopeKind::Tool(mode),
        });
        self.active = Some(ActiveTool {
            mode,
            generation,
            _guard: guard,
        });
        self.apply_cursor(dom, mode.cursor());
        debug!(mode = %mode, generation, "tool installed");
    }

    /// Detach the tool scope and restore the body cursor. Safe to call when
    /// nothing is installed. Returns the mode that was active.
    pub fn teardown<D: Dom>(&mut self, dom: &mut D) -> Option<ToolMode> {
        let mode = self.detach();
        if let Some(saved) = self.saved_cursor.take()
            && let Some(body) = dom.body()
        {
            let _ = dom.set_inline_style(body, "cursor", saved.as_deref());
        }
        mode
    }

    fn detach(&mut self) -> Option<ToolMode> {
        self.active.take().map(|a| a.mode)
    }

    fn apply_cursor<D: Dom>(&mut self, dom: &mut D, cursor: Option<&str>) {
        let Some(body) = dom.body() else {
            return;
        };
        if self.saved_cursor.is_none() {
            self.saved_cursor = Some(dom.inline_style(body, "cursor"));
        }
        let value = cursor.or_else(|| self.saved_cursor.as_ref().and_then(|c| c.as_deref()));
        let _ = dom.set_inline_style(body, "cursor", value);
    }
}

/// Build the toolbar: one button per mode plus close.
pub fn build_toolbar<D: Dom>(stage: &mut Stage<'_, D>, active: ToolMode) -> Result<NodeId, DomError> {
    let bar = Decls::new()
        .set("position", "fixed")
        .set("top", "20px")
        .set("left", "50%")
        .set("transform", "translateX(-50%)")
        .set("background", "#1a1a1a")
        .set("border", "1px solid #333")
        .set("border-radius", "8px")
        .set("padding", "8px")
        .set("display", "flex")
        .set("gap", "4px")
        .set("z-index", Z_CHROME)
        .set("box-shadow", "0 4px 20px rgba(0,0,0,0.3)")
        .set("font-family", "-apple-system, BlinkMacSystemFont, sans-serif");
    let toolbar = stage.create("div", OverlayRole::Toolbar, None, &bar)?;

    for mode in ToolMode::ALL {
        let background = if mode == active { ACTIVE_BUTTON } else { IDLE_BUTTON };
        let decls = button_decls(background).set("transition", "background 0.2s").set("min-width", "40px");
        let button = stage.create("button", OverlayRole::ToolButton(mode), Some(toolbar), &decls)?;
        stage.dom.set_text(button, mode.icon())?;
        stage.dom.set_attribute(button, "title", mode.title())?;
        stage.overlays.bind(button, UiAction::SetTool(mode));
    }

    let close = button_decls("#666").set("margin-left", "8px");
    let button = stage.create("button", OverlayRole::Close, Some(toolbar), &close)?;
    stage.dom.set_text(button, "✕")?;
    stage.dom.set_attribute(button, "title", "Close inspector")?;
    stage.overlays.bind(button, UiAction::Deactivate);
    Ok(toolbar)
}

fn button_decls(background: &str) -> Decls {
    Decls::new()
        .set("background", background)
        .set("border", "none")
        .set("color", "white")
        .set("padding", "8px 12px")
        .set("border-radius", "4px")
        .set("cursor", "pointer")
        .set("font-size", "16px")
}

/// Repaint toolbar buttons so only `active` carries the accent.
pub fn paint_toolbar<D: Dom>(dom: &mut D, active: ToolMode) {
    for mode in ToolMode::ALL {
        let background = if mode == active { ACTIVE_BUTTON } else { IDLE_BUTTON };
        for button in OverlayRegistry::find(dom, OverlayRole::ToolButton(mode)) {
            let _ = dom.set_inline_style(button, "background", Some(background));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use loupe_core::event::EventKind;
    use loupe_core::{ElementSpec, MemoryDom};

    #[test]
    fn interest_per_mode() {
        assert_eq!(interest(ToolMode::Inspect), Interest::all());
        assert_eq!(interest(ToolMode::Spacing), Interest::HOVER);
        assert_eq!(interest(ToolMode::Color), Interest::CLICK);
        assert_eq!(interest(ToolMode::Font), Interest::CLICK);
    }

    #[test]
    fn install_replaces_previous_scope() {
        let mut dom = MemoryDom::new();
        let mut host = HeadlessHost::new();
        let mut tools = ToolController::new();
        tools.install(&mut dom, &mut host, ToolMode::Inspect, 1);
        tools.install(&mut dom, &mut host, ToolMode::Spacing, 2);
        assert_eq!(host.attached_count(), 1);
        assert_eq!(host.tool_scope().map(|s| s.kind), Some(ScopeKind::Tool(ToolMode::Spacing)));
        assert_eq!(tools.mode(), Some(ToolMode::Spacing));
        assert_eq!(tools.teardown(&mut dom), Some(ToolMode::Spacing));
        assert_eq!(host.attached_count(), 0);
        assert_eq!(tools.teardown(&mut dom), None);
    }

    #[test]
    fn accepts_only_current_generation_and_interest() {
        let mut dom = MemoryDom::new();
        let mut host = HeadlessHost::new();
        let mut tools = ToolController::new();
        let target = NodeId::new(2);
        tools.install(&mut dom, &mut host, ToolMode::Color, 5);
        assert!(tools.accepts(&PageEvent::new(EventKind::Click, target, 5)));
        assert!(!tools.accepts(&PageEvent::new(EventKind::Click, target, 4)));
        assert!(!tools.accepts(&PageEvent::new(EventKind::PointerOver, target, 5)));
    }

    #[test]
    fn cursor_follows_mode_and_restores_author_value() {
        let mut dom = MemoryDom::new();
        let body = dom.body().unwrap();
        dom.set_inline_style(body, "cursor", Some("help")).unwrap();
        let mut host = HeadlessHost::new();
        let mut tools = ToolController::new();

        tools.install(&mut dom, &mut host, ToolMode::Inspect, 1);
        assert_eq!(dom.inline_style(body, "cursor").as_deref(), Some("crosshair"));
        tools.install(&mut dom, &mut host, ToolMode::Color, 2);
        assert_eq!(dom.inline_style(body, "cursor").as_deref(), Some("copy"));
        tools.install(&mut dom, &mut host, ToolMode::Font, 3);
        assert_eq!(dom.inline_style(body, "cursor").as_deref(), Some("help"));
        tools.teardown(&mut dom);
        assert_eq!(dom.inline_style(body, "cursor").as_deref(), Some("help"));
    }

    #[test]
    fn toolbar_has_buttons_and_paints_active() {
        let mut dom = MemoryDom::new();
        let mut overlays = OverlayRegistry::new();
        let mut stage = Stage::new(&mut dom, &mut overlays);
        let toolbar = build_toolbar(&mut stage, ToolMode::Inspect).unwrap();
        assert_eq!(stage.dom.children(toolbar).len(), 5);
        let spacing = OverlayRegistry::find(stage.dom, OverlayRole::ToolButton(ToolMode::Spacing))[0];
        assert_eq!(
            stage.overlays.action_for(stage.dom, spacing).map(|(_, a)| a),
            Some(UiAction::SetTool(ToolMode::Spacing))
        );
        paint_toolbar(stage.dom, ToolMode::Spacing);
        assert_eq!(stage.dom.inline_style(spacing, "background").as_deref(), Some(ACTIVE_BUTTON));
        let inspect = OverlayRegistry::find(stage.dom, OverlayRole::ToolButton(ToolMode::Inspect))[0];
        assert_eq!(stage.dom.inline_style(inspect, "background").as_deref(), Some(IDLE_BUTTON));
    }

    #[test]
    fn no_body_means_no_cursor_change() {
        let mut dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let stray = dom.append(body, ElementSpec::new("div"));
        dom.remove(body);
        let mut host = HeadlessHost::new();
        let mut tools = ToolController::new();
        tools.install(&mut dom, &mut host, ToolMode::Inspect, 1);
        assert_eq!(dom.inline_style(stray, "cursor"), None);
        assert_eq!(tools.mode(), Some(ToolMode::Inspect));
    }
}
