#![forbid(unsafe_code)]

//! [`Dom`] over the live browser document.
//!
//! Elements get a [`NodeId`] the first time the inspector sees them. The
//! element → id direction lives in a JS `WeakMap` so the page's own nodes are
//! never kept alive by it; the id → element direction is a [`NodeTable`]
//! that drops detached elements as it grows and on [`WebDom::release_detached`].

use std::cell::RefCell;

use js_sys::{Object, WeakMap};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Window};

use loupe_core::dom::{Dom, DomError, NodeId};
use loupe_core::geometry::Rect;
use loupe_core::style::{ComputedStyle, SNAPSHOT_PROPERTIES};
use loupe_core::trace;

use crate::table::NodeTable;

/// Never issued; stands in when the document has no root element.
const NO_NODE: NodeId = NodeId::new(0);

struct Registry {
    ids: WeakMap,
    nodes: NodeTable<Element>,
}

/// The page's document, addressed by [`NodeId`].
pub struct WebDom {
    window: Window,
    document: Document,
    registry: RefCell<Registry>,
}

impl std::fmt::Debug for WebDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDom")
            .field("known_nodes", &self.known_nodes())
            .finish_non_exhaustive()
    }
}

fn host_error(err: JsValue) -> DomError {
    DomError::Host(format!("{err:?}"))
}

impl WebDom {
    /// Wrap `window`'s document. `None` when the window has no document.
    pub fn new(window: Window) -> Option<Self> {
        let document = window.document()?;
        Some(Self {
            window,
            document,
            registry: RefCell::new(Registry {
                ids: WeakMap::new(),
                nodes: NodeTable::new(),
            }),
        })
    }

    /// The global window's document.
    pub fn from_global() -> Option<Self> {
        Self::new(web_sys::window()?)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The id for `element`, issuing one on first sight.
    pub fn intern(&self, element: &Element) -> NodeId {
        let mut registry = self.registry.borrow_mut();
        let key: &Object = element.unchecked_ref();
        if let Some(raw) = registry.ids.get(key).as_f64() {
            let id = NodeId::new(raw as u64);
            registry.nodes.restore(id, || element.clone());
            return id;
        }
        let id = registry.nodes.issue();
        registry.ids.set(key, &JsValue::from_f64(id.get() as f64));
        registry.nodes.insert(id, element.clone());
        id
    }

    /// The element behind `node`, if still known.
    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.registry.borrow().nodes.get(node).cloned()
    }

    /// Forget ids whose element left the document. An element that comes
    /// back keeps its id.
    pub fn release_detached(&self) -> usize {
        let released = self.registry.borrow_mut().nodes.release(|e| e.is_connected());
        trace!(released, "released detached nodes");
        released
    }

    /// [`release_detached`](Self::release_detached) once the registry has
    /// doubled since the last sweep. Elements created but not yet appended
    /// count as detached, so only call this between inspector calls.
    pub fn collect(&self) -> usize {
        let released = self
            .registry
            .borrow_mut()
            .nodes
            .release_if_grown(|e| e.is_connected());
        if released > 0 {
            trace!(released, "collected detached nodes");
        }
        released
    }

    /// How many elements the registry currently holds.
    pub fn known_nodes(&self) -> usize {
        self.registry.borrow().nodes.len()
    }

    fn html(&self, node: NodeId) -> Option<HtmlElement> {
        self.element(node)?.dyn_into::<HtmlElement>().ok()
    }

    fn connected(&self, node: NodeId) -> Option<Element> {
        self.element(node).filter(|e| e.is_connected())
    }
}

impl Dom for WebDom {
    fn document_element(&self) -> NodeId {
        self.document
            .document_element()
            .map_or(NO_NODE, |e| self.intern(&e))
    }

    fn body(&self) -> Option<NodeId> {
        let body = self.document.body()?;
        Some(self.intern(&Element::from(body)))
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.connected(node).is_some()
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.element(node)?.parent_element()?;
        Some(self.intern(&parent))
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let Some(element) = self.element(node) else {
            return Vec::new();
        };
        let children = element.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .map(|child| self.intern(&child))
            .collect()
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.element(node).map(|e| e.local_name())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let element = self.element(node).ok_or(DomError::Unknown(node))?;
        element.set_attribute(name, value).map_err(host_error)
    }

    fn has_click_handler(&self, node: NodeId) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };
        element.has_attribute("onclick")
            || element
                .dyn_ref::<HtmlElement>()
                .is_some_and(|h| h.onclick().is_some())
    }

    fn inline_style(&self, node: NodeId, property: &str) -> Option<String> {
        self.html(node)?
            .style()
            .get_property_value(property)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn set_inline_style(
        &mut self,
        node: NodeId,
        property: &str,
        value: Option<&str>,
    ) -> Result<(), DomError> {
        let style = self.html(node).ok_or(DomError::Unknown(node))?.style();
        match value {
            Some(value) => style.set_property(property, value),
            None => style.remove_property(property).map(|_| ()),
        }
        .map_err(host_error)
    }

    fn computed_style(&self, node: NodeId) -> Option<ComputedStyle> {
        let element = self.connected(node)?;
        let declaration = self.window.get_computed_style(&element).ok().flatten()?;
        let mut style = ComputedStyle::new();
        for &property in SNAPSHOT_PROPERTIES {
            if let Ok(value) = declaration.get_property_value(property)
                && !value.is_empty()
            {
                style.set(property, value);
            }
        }
        Some(style)
    }

    fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        let r = self.connected(node)?.get_bounding_client_rect();
        Some(Rect::new(r.x(), r.y(), r.width(), r.height()))
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        let element = self.document.create_element(tag).map_err(host_error)?;
        Ok(self.intern(&element))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent = self.element(parent).ok_or(DomError::Unknown(parent))?;
        let child = self.element(child).ok_or(DomError::Unknown(child))?;
        parent.append_child(&child).map(|_| ()).map_err(host_error)
    }

    fn remove(&mut self, node: NodeId) {
        if let Some(element) = self.element(node) {
            element.remove();
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        let element = self.element(node).ok_or(DomError::Unknown(node))?;
        element.set_text_content(Some(text));
        Ok(())
    }

    fn text(&self, node: NodeId) -> Option<String> {
        self.element(node)?.text_content()
    }

    fn query_attribute(&self, name: &str) -> Vec<NodeId> {
        let Ok(list) = self.document.query_selector_all(&format!("[{name}]")) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.intern(&element))
            .collect()
    }
}
