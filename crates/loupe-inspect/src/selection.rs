#![forbid(unsafe_code)]

//! Click selection in inspect mode.

use std::time::Duration;

use loupe_core::dom::{Dom, NodeId};
use loupe_core::event::{Disposition, PageEvent};
use loupe_core::{debug, marker};

use crate::hierarchy::HierarchyNavigator;
use crate::info::{ElementInfo, InfoPopup};
use crate::overlay::Stage;

/// Default attribute marking script-driven links.
pub const DEFAULT_LINK_MARKER: &str = "data-link";

/// Result of a handled click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickOutcome {
    pub disposition: Disposition,
    /// The element that became the selection, if any.
    pub selected: Option<NodeId>,
}

impl ClickOutcome {
    const IGNORED: Self = Self {
        disposition: Disposition::PASS,
        selected: None,
    };
}

/// Decides navigation suppression and opens the navigator on click.
#[derive(Debug, Clone)]
pub struct SelectionController {
    link_marker_attr: String,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_MARKER)
    }
}

impl SelectionController {
    pub fn new(link_marker_attr: impl Into<String>) -> Self {
        Self {
            link_marker_attr: link_marker_attr.into(),
        }
    }

    #[must_use]
    pub fn link_marker_attr(&self) -> &str {
        &self.link_marker_attr
    }

    /// Whether clicking `target` should keep its default action: the target
    /// or an ancestor is a link or button, has an inline click handler, an
    /// `href`, or the link marker attribute.
    pub fn is_navigation_target<D: Dom>(&self, dom: &D, target: NodeId) -> bool {
        dom.closest(target, |d, id| {
            matches!(d.tag_name(id).as_deref(), Some("a" | "button"))
                || d.has_click_handler(id)
                || d.attribute(id, "href").is_some()
                || d.attribute(id, &self.link_marker_attr).is_some()
        })
        .is_some()
    }

    /// Handle a click in inspect mode.
    ///
    /// Own UI and detached targets are ignored. Otherwise the navigator opens
    /// on the target and the info popup summarizes it; the default action is
    /// suppressed unless the target is navigational.
    pub fn click<D: Dom>(
        &self,
        stage: &mut Stage<'_, D>,
        navigator: &mut HierarchyNavigator,
        popup: &mut InfoPopup,
        event: &PageEvent,
        popup_expires_at: Duration,
    ) -> ClickOutcome {
        let target = event.target;
        if marker::is_own_ui(stage.dom, target) || !stage.dom.is_connected(target) {
            return ClickOutcome::IGNORED;
        }
        let disposition = if self.is_navigation_target(stage.dom, target) {
            Disposition::PASS
        } else {
            Disposition::SUPPRESS
        };

        navigator.open(stage, target);
        let text = ElementInfo::collect(stage.dom, target).render();
        popup.show(stage, &text, event.page_x, event.page_y, popup_expires_at);
        debug!(node = %target, suppressed = disposition.prevent_default, "element selected");

        ClickOutcome {
            disposition,
            selected: Some(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::OverlayRegistry;
    use loupe_core::event::EventKind;
    use loupe_core::marker::OverlayRole;
    use loupe_core::{ElementSpec, MARKER_ATTR, MemoryDom};

    fn click(
        dom: &mut MemoryDom,
        target: NodeId,
    ) -> (ClickOutcome, HierarchyNavigator, InfoPopup, OverlayRegistry) {
        let mut overlays = OverlayRegistry::new();
        let mut nav = HierarchyNavigator::new();
        let mut popup = InfoPopup::new();
        let ctl = SelectionController::default();
        let ev = PageEvent::new(EventKind::Click, target, 1).at(50.0, 90.0);
        let outcome = {
            let mut stage = Stage::new(dom, &mut overlays);
            ctl.click(&mut stage, &mut nav, &mut popup, &ev, Duration::from_secs(3))
        };
        (outcome, nav, popup, overlays)
    }

    #[test]
    fn plain_element_is_suppressed_and_selected() {
        let mut dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let div = dom.append(body, ElementSpec::new("div").class("card"));
        let (outcome, nav, popup, _) = click(&mut dom, div);
        assert_eq!(outcome.disposition, Disposition::SUPPRESS);
        assert_eq!(outcome.selected, Some(div));
        assert_eq!(nav.selected(), Some(div));
        let info = popup.node().unwrap();
        assert!(dom.text(info).unwrap().starts_with("div.card\n\nSize:"));
        assert_eq!(dom.inline_style(info, "top").as_deref(), Some("50px"));
    }

    #[test]
    fn links_and_handlers_keep_default_action() {
        let mut dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let link = dom.append(body, ElementSpec::new("a").attr("href", "/next"));
        let inner = dom.append(link, ElementSpec::new("span"));
        let handler = dom.append(body, ElementSpec::new("div").onclick());
        let marked = dom.append(body, ElementSpec::new("div").attr("data-link", "x"));
        let button_child = {
            let b = dom.append(body, ElementSpec::new("button"));
            dom.append(b, ElementSpec::new("img"))
        };
        for target in [link, inner, handler, marked, button_child] {
            let (outcome, nav, _, _) = click(&mut dom, target);
            assert_eq!(outcome.disposition, Disposition::PASS, "target {target}");
            assert_eq!(nav.selected(), Some(target));
        }
    }

    #[test]
    fn own_ui_click_is_ignored() {
        let mut dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let toolbar = dom.append(body, ElementSpec::new("div").attr(MARKER_ATTR, "toolbar"));
        let (outcome, nav, popup, _) = click(&mut dom, toolbar);
        assert_eq!(outcome, ClickOutcome::IGNORED);
        assert_eq!(nav.selected(), None);
        assert_eq!(popup.node(), None);
    }

    #[test]
    fn detached_target_is_a_no_op() {
        let mut dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let gone = dom.append(body, ElementSpec::new("div"));
        dom.remove(gone);
        let (outcome, _, _, _) = click(&mut dom, gone);
        assert_eq!(outcome, ClickOutcome::IGNORED);
        assert!(OverlayRegistry::find(&dom, OverlayRole::HierarchyPanel).is_empty());
    }

    #[test]
    fn custom_link_marker() {
        let mut dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let el = dom.append(body, ElementSpec::new("div").attr("data-route", "home"));
        let ctl = SelectionController::new("data-route");
        assert!(ctl.is_navigation_target(&dom, el));
        assert!(!SelectionController::default().is_navigation_target(&dom, el));
    }
}
