//! End-to-end scenarios: an inspector driven over an in-memory page the way a
//! browser host would drive it.

use std::time::Duration;

use loupe::prelude::*;
use loupe::{
    BufferClipboard, DiagnosticEventKind, HeadlessHost, KeyChord, MARKER_ATTR, Modifiers,
    OverlayRegistry, OverlayRole, Rect, ScopeKind,
};
use pretty_assertions::assert_eq;

struct Page {
    inspector: Inspector<MemoryDom>,
    host: HeadlessHost,
    clipboard: BufferClipboard,
}

impl Page {
    fn new(build: impl FnOnce(&mut MemoryDom, NodeId)) -> Self {
        Self::with_config(InspectorConfig::default(), build)
    }

    fn with_config(config: InspectorConfig, build: impl FnOnce(&mut MemoryDom, NodeId)) -> Self {
        let mut dom = MemoryDom::new();
        let body = dom.body().unwrap();
        build(&mut dom, body);
        let host = HeadlessHost::new();
        let clipboard = BufferClipboard::new();
        let inspector = Inspector::new(dom, host.clone(), clipboard.clone(), config);
        Self {
            inspector,
            host,
            clipboard,
        }
    }

    fn find(&self, tag: &str, class: &str) -> NodeId {
        let dom = self.inspector.dom();
        let mut stack = vec![dom.document_element()];
        while let Some(node) = stack.pop() {
            if dom.tag_name(node).as_deref() == Some(tag)
                && dom.class_list(node).iter().any(|c| c == class)
            {
                return node;
            }
            stack.extend(dom.children(node));
        }
        panic!("no <{tag} class={class}>");
    }

    fn tool(&mut self, kind: EventKind, target: NodeId) -> Disposition {
        let generation = self.inspector.tool_generation().expect("tool installed");
        self.inspector
            .handle_event(&PageEvent::new(kind, target, generation).at(120.0, 240.0))
    }

    fn chrome(&mut self, kind: EventKind, target: NodeId) -> Disposition {
        let generation = self.inspector.chrome_generation().expect("active");
        self.inspector
            .handle_event(&PageEvent::new(kind, target, generation))
    }

    fn role(&self, role: OverlayRole) -> Vec<NodeId> {
        OverlayRegistry::find(self.inspector.dom(), role)
    }

    fn marked(&self) -> usize {
        self.inspector.dom().query_attribute(MARKER_ATTR).len()
    }
}

fn cards(dom: &mut MemoryDom, body: NodeId) {
    let section = dom.append(body, ElementSpec::new("section").class("list"));
    dom.append(
        section,
        ElementSpec::new("div")
            .class("card")
            .rect(Rect::new(10.0, 100.0, 300.0, 80.0)),
    );
    dom.append(section, ElementSpec::new("div").class("footer"));
}

#[test]
fn activate_twice_yields_one_toolbar_and_one_mode() {
    let mut page = Page::new(cards);
    assert!(page.inspector.activate());
    let marked = page.marked();
    let scopes = page.host.attached();
    assert!(!page.inspector.activate());
    assert_eq!(page.role(OverlayRole::Toolbar).len(), 1);
    assert_eq!(page.marked(), marked);
    assert_eq!(page.host.attached(), scopes);
    assert_eq!(page.inspector.active_tool(), Some(ToolMode::Inspect));
}

#[test]
fn switching_tools_leaves_nothing_of_the_previous_mode() {
    let mut page = Page::new(cards);
    page.inspector.activate();
    page.inspector.set_tool(ToolMode::Spacing);
    let card = page.find("div", "card");
    page.tool(EventKind::PointerOver, card);
    assert!(!page.role(OverlayRole::SpacingOverlay).is_empty());
    let spacing_generation = page.inspector.tool_generation().unwrap();

    page.inspector.set_tool(ToolMode::Color);

    for role in OverlayRole::SPACING {
        assert_eq!(page.role(role), vec![], "{role:?} left behind");
    }
    let tool_scopes: Vec<_> = page
        .host
        .attached()
        .into_iter()
        .filter(|s| s.kind != ScopeKind::Chrome)
        .collect();
    assert_eq!(tool_scopes.len(), 1);
    assert_eq!(tool_scopes[0].kind, ScopeKind::Tool(ToolMode::Color));

    // a late hover from the old scope does nothing
    let late = PageEvent::new(EventKind::PointerOver, card, spacing_generation);
    assert_eq!(page.inspector.handle_event(&late), Disposition::PASS);
    assert!(page.role(OverlayRole::SpacingOverlay).is_empty());
}

#[test]
fn reselecting_the_same_mode_resets_it() {
    let mut page = Page::new(cards);
    page.inspector.activate();
    let card = page.find("div", "card");
    page.tool(EventKind::Click, card);
    assert_eq!(page.role(OverlayRole::HierarchyPanel).len(), 1);
    let before = page.inspector.tool_generation();

    page.inspector.set_tool(ToolMode::Inspect);

    assert!(page.inspector.tool_generation() > before);
    assert!(page.role(OverlayRole::HierarchyPanel).is_empty());
    assert!(page.role(OverlayRole::Info).is_empty());
    assert_eq!(page.host.attached_count(), 2);
}

#[test]
fn deactivate_leaves_no_marked_nodes() {
    let mut page = Page::new(cards);
    page.inspector.activate();
    let card = page.find("div", "card");
    page.tool(EventKind::Click, card);
    page.inspector.set_tool(ToolMode::Spacing);
    page.tool(EventKind::PointerOver, card);
    assert!(page.marked() > 0);

    assert!(page.inspector.deactivate());

    assert_eq!(page.marked(), 0);
    assert_eq!(page.host.attached_count(), 0);
    assert!(!page.inspector.deactivate());
}

#[test]
fn hierarchy_for_middle_sibling() {
    let mut page = Page::new(|dom, body| {
        let parent = dom.append(body, ElementSpec::new("ul").id("menu"));
        dom.append(parent, ElementSpec::new("li").class("a"));
        let b = dom.append(parent, ElementSpec::new("li").class("b"));
        dom.append(b, ElementSpec::new("span"));
        dom.append(parent, ElementSpec::new("li").class("c"));
    });
    page.inspector.activate();
    let b = page.find("li", "b");
    page.tool(EventKind::Click, b);

    let view = page.inspector.hierarchy_view().unwrap();
    assert_eq!(view.ancestor_rows(), 1);
    assert_eq!(view.sibling_rows(), 3);
    assert_eq!(view.child_rows(), 0);
    assert_eq!(
        view.texts(),
        vec!["↑ ul#menu", "• li.a", "▶ li.b (1)", "• li.c"]
    );
    let selected: Vec<_> = view.rows.iter().filter(|r| r.is_selected()).map(|r| r.node).collect();
    assert_eq!(selected, vec![b]);
}

#[test]
fn expanding_a_sibling_adds_one_level() {
    let mut page = Page::new(|dom, body| {
        let parent = dom.append(body, ElementSpec::new("ul"));
        dom.append(parent, ElementSpec::new("li").class("a"));
        let c = dom.append(parent, ElementSpec::new("li").class("c"));
        let inner = dom.append(c, ElementSpec::new("ol").class("inner"));
        dom.append(inner, ElementSpec::new("li").class("deep"));
    });
    page.inspector.activate();
    let a = page.find("li", "a");
    page.tool(EventKind::Click, a);

    let panel = page.inspector.navigator().panel().unwrap();
    let content = page.inspector.dom().children(panel)[1];
    let c_row = page.inspector.dom().children(content)[2];
    let indicator = page.inspector.dom().children(c_row)[0];
    page.chrome(EventKind::Click, indicator);

    let view = page.inspector.hierarchy_view().unwrap();
    assert_eq!(view.selected, a);
    assert_eq!(view.child_rows(), 1);
    assert_eq!(view.texts().last().map(String::as_str), Some("◦ ol.inner"));
}

#[test]
fn inline_width_wins_provenance() {
    let mut page = Page::new(|dom, body| {
        let flex = dom.append(body, ElementSpec::new("div").computed("display", "flex"));
        dom.append(
            flex,
            ElementSpec::new("div")
                .class("box")
                .inline("width", "200px")
                .computed("width", "200px")
                .computed("max-width", "150px")
                .computed("min-width", "300px")
                .rect(Rect::new(0.0, 0.0, 200.0, 40.0)),
        );
    });
    page.inspector.activate();
    let target = page.find("div", "box");
    page.tool(EventKind::Click, target);

    let info = page.role(OverlayRole::Info)[0];
    let text = page.inspector.dom().text(info).unwrap();
    assert!(text.contains("Width: 200px (inline style)"), "{text}");
}

#[test]
fn uniform_margins_collapse_in_info() {
    let mut page = Page::new(|dom, body| {
        let mut spec = ElementSpec::new("p").class("spaced");
        for edge in ["top", "right", "bottom", "left"] {
            spec = spec.computed(&format!("margin-{edge}"), "10px");
        }
        dom.append(body, spec);
        dom.append(body, ElementSpec::new("p").class("flush"));
    });
    page.inspector.activate();

    let spaced = page.find("p", "spaced");
    page.tool(EventKind::Click, spaced);
    let text = page.inspector.dom().text(page.role(OverlayRole::Info)[0]).unwrap();
    assert!(text.contains("\nmargin: 10px\n"), "{text}");

    let flush = page.find("p", "flush");
    page.tool(EventKind::Click, flush);
    let text = page.inspector.dom().text(page.role(OverlayRole::Info)[0]).unwrap();
    assert!(text.contains("margin: 0px (no margin)"), "{text}");
}

#[test]
fn clicking_a_nested_card() {
    let mut page = Page::new(cards);
    page.inspector.activate();
    let card = page.find("div", "card");

    let disposition = page.tool(EventKind::Click, card);

    assert_eq!(disposition, Disposition::SUPPRESS);
    let view = page.inspector.hierarchy_view().unwrap();
    assert_eq!(view.texts(), vec!["↑ section.list", "• div.card", "• div.footer"]);
    assert!(view.rows[1].is_selected());
    assert!(!view.rows[2].is_selected());
    assert_eq!(page.role(OverlayRole::HierarchyPanel).len(), 1);
    assert_eq!(page.role(OverlayRole::ElementHighlight).len(), 1);

    let info = page.role(OverlayRole::Info)[0];
    let text = page.inspector.dom().text(info).unwrap();
    assert!(text.starts_with("div.card\n\nSize: 300px × 80px"), "{text}");
}

#[test]
fn links_keep_navigation() {
    let mut page = Page::new(|dom, body| {
        let link = dom.append(body, ElementSpec::new("a").attr("href", "/docs"));
        dom.append(link, ElementSpec::new("span").class("label"));
    });
    page.inspector.activate();
    let label = page.find("span", "label");
    assert_eq!(page.tool(EventKind::Click, label), Disposition::PASS);
    assert_eq!(page.inspector.navigator().selected(), Some(label));
}

#[test]
fn hover_outline_restores_prior_value() {
    let mut page = Page::new(|dom, body| {
        dom.append(
            body,
            ElementSpec::new("button")
                .class("cta")
                .inline("outline", "3px dotted blue"),
        );
        dom.append(
            body,
            ElementSpec::new("div")
                .class("bystander")
                .inline("outline", "1px solid black"),
        );
    });
    page.inspector.activate();
    let button = page.find("button", "cta");

    page.tool(EventKind::PointerOver, button);
    assert_eq!(
        page.inspector.dom().inline_style(button, "outline").as_deref(),
        Some("2px solid #FF8A95")
    );
    page.tool(EventKind::PointerOut, button);

    let dom = page.inspector.dom();
    assert_eq!(dom.inline_style(button, "outline").as_deref(), Some("3px dotted blue"));
    assert_eq!(dom.inline_style(button, "outline-offset"), None);
    let bystander = page.find("div", "bystander");
    assert_eq!(
        page.inspector.dom().inline_style(bystander, "outline").as_deref(),
        Some("1px solid black")
    );
}

#[test]
fn spacing_padding_band() {
    let mut page = Page::new(|dom, body| {
        dom.append(
            body,
            ElementSpec::new("div")
                .class("padded")
                .computed("padding-top", "20px")
                .rect(Rect::new(50.0, 100.0, 200.0, 120.0)),
        );
    });
    page.inspector.activate();
    page.inspector.set_tool(ToolMode::Spacing);
    let target = page.find("div", "padded");

    page.tool(EventKind::PointerOver, target);

    let bands = page.role(OverlayRole::SpacingPadding);
    assert_eq!(bands.len(), 1);
    let dom = page.inspector.dom();
    assert_eq!(dom.inline_style(bands[0], "top").as_deref(), Some("100px"));
    assert_eq!(dom.inline_style(bands[0], "height").as_deref(), Some("20px"));
    assert_eq!(dom.inline_style(bands[0], "width").as_deref(), Some("200px"));
    let labels: Vec<_> = page
        .role(OverlayRole::SpacingLabel)
        .into_iter()
        .filter_map(|n| page.inspector.dom().text(n))
        .collect();
    assert!(labels.contains(&"p:20px".to_owned()), "{labels:?}");
    assert!(page.role(OverlayRole::SpacingMargin).is_empty());

    page.tool(EventKind::PointerOut, target);
    for role in OverlayRole::SPACING {
        assert!(page.role(role).is_empty());
    }
}

#[test]
fn shortcut_round_trip() {
    let mut page = Page::new(cards);
    let chord = KeyChord::new("V", Modifiers::SUPER | Modifiers::SHIFT);
    let d = page.inspector.handle_key(&chord);
    assert!(d.prevent_default);
    assert!(page.inspector.is_active());
    page.inspector.handle_key(&chord);
    assert!(!page.inspector.is_active());
    assert_eq!(page.marked(), 0);
}

#[test]
fn removed_target_is_a_no_op() {
    let mut page = Page::new(cards);
    page.inspector.activate();
    let card = page.find("div", "card");
    page.inspector.dom_mut().remove(card);

    assert_eq!(page.tool(EventKind::PointerOver, card), Disposition::PASS);
    assert_eq!(page.tool(EventKind::Click, card), Disposition::PASS);
    assert_eq!(page.inspector.highlighted(), None);
    assert!(page.role(OverlayRole::HierarchyPanel).is_empty());
}

#[test]
fn color_pick_with_denied_clipboard() {
    let mut dom = MemoryDom::new();
    let body = dom.body().unwrap();
    let heading = dom.append(body, ElementSpec::new("h1").computed("color", "rgb(1, 2, 3)"));
    let host = HeadlessHost::new();
    let clipboard = BufferClipboard::denying();
    let config = InspectorConfig::default()
        .with_default_tool(ToolMode::Color)
        .with_diagnostics(true);
    let mut inspector = Inspector::new(dom, host, clipboard.clone(), config);
    inspector.activate();

    let generation = inspector.tool_generation().unwrap();
    let d = inspector.handle_event(&PageEvent::new(EventKind::Click, heading, generation));

    assert_eq!(d, Disposition::SUPPRESS);
    assert_eq!(clipboard.contents(), None);
    let info = OverlayRegistry::find(inspector.dom(), OverlayRole::Info)[0];
    assert_eq!(inspector.dom().text(info).as_deref(), Some("Copied: rgb(1, 2, 3)"));
    let log = inspector.diagnostic_log().unwrap();
    assert_eq!(log.entries_of_kind(DiagnosticEventKind::ClipboardFailed).count(), 1);
}

#[test]
fn info_popup_times_out() {
    let mut page = Page::with_config(
        InspectorConfig::default().with_info_ttl(Duration::from_millis(500)),
        cards,
    );
    page.inspector.activate();
    page.inspector.set_tool(ToolMode::Font);
    let card = page.find("div", "card");
    page.tool(EventKind::Click, card);
    assert_eq!(page.role(OverlayRole::Info).len(), 1);
    page.inspector.advance(Duration::from_millis(499));
    assert_eq!(page.role(OverlayRole::Info).len(), 1);
    page.inspector.advance(Duration::from_millis(500));
    assert!(page.role(OverlayRole::Info).is_empty());
    assert!(page.clipboard.contents().is_none());
}

#[test]
fn diagnostics_stream_is_jsonl() {
    let mut page = Page::with_config(InspectorConfig::default().with_diagnostics(true), cards);
    page.inspector.activate();
    page.inspector.set_tool(ToolMode::Spacing);
    page.inspector.deactivate();

    let log = page.inspector.diagnostic_log().unwrap();
    let kinds: Vec<_> = log.entries().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticEventKind::ToolChanged,
            DiagnosticEventKind::Activated,
            DiagnosticEventKind::ToolChanged,
            DiagnosticEventKind::Deactivated,
        ]
    );
    for line in log.to_jsonl().lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value["seq"].is_u64());
    }
}

#[test]
fn headless_constructor_parses_options() {
    let no_env = |_: &str| None;
    let inspector =
        loupe::headless_with_env(MemoryDom::new(), r#"{"default_tool":"font"}"#, no_env).unwrap();
    assert_eq!(inspector.config().default_tool, ToolMode::Font);
    let err = loupe::headless_with_env(MemoryDom::new(), "{", no_env).unwrap_err();
    assert!(matches!(err, loupe::Error::Config(_)));
    assert!(err.to_string().starts_with("invalid options: "));
}

#[test]
fn headless_environment_overrides_options() {
    let env = |key: &str| match key {
        "LOUPE_DEFAULT_TOOL" => Some("spacing".to_owned()),
        "LOUPE_INFO_TTL_MS" => Some("500".to_owned()),
        _ => None,
    };
    let mut inspector = loupe::headless_with_env(
        MemoryDom::new(),
        r#"{"default_tool":"font","info_ttl_ms":9000}"#,
        env,
    )
    .unwrap();
    assert_eq!(inspector.config().default_tool, ToolMode::Spacing);
    assert_eq!(inspector.config().info_ttl(), Duration::from_millis(500));
    assert!(inspector.activate());
    assert_eq!(inspector.active_tool(), Some(ToolMode::Spacing));
}
