#![forbid(unsafe_code)]

//! Browser event listeners and clipboard.
//!
//! Listeners hold the inspector weakly through an [`InspectorSlot`] filled
//! after construction, since the inspector owns the host that creates them.
//! A scope's guard may be dropped from inside one of its own listeners (the
//! toolbar's close button deactivates from a click handler), so detached
//! listeners are parked and dropped on the next timer tick instead of in
//! place. Until then they still fire, but with a stale generation.
//!
//! Every entry point runs the inspector through [`settled`], which prunes
//! the node registry of overlays the call removed.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::OnceLock;
use std::time::Duration;

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Event, MouseEvent};
use web_time::Instant;

use loupe_core::event::{Disposition, EventKind, PageEvent};
use loupe_core::{debug, trace};
use loupe_inspect::{ClipboardError, ClipboardSink, EventHost, Inspector, ListenerGuard, ListenerScope};

use crate::dom::WebDom;

pub type SharedInspector = Rc<RefCell<Inspector<WebDom>>>;

/// Time since the binding was first used; the inspector's clock.
pub(crate) fn elapsed() -> Duration {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed()
}

/// Apply the inspector's verdict to the native event.
pub(crate) fn apply(event: &Event, disposition: Disposition) {
    if disposition.prevent_default {
        event.prevent_default();
    }
    if disposition.stop_propagation {
        event.stop_propagation();
    }
}

/// Run `f`, then release registry entries it left detached: all of them
/// when the call deactivated the inspector, otherwise only once the registry
/// has doubled.
pub(crate) fn settled<R>(
    inspector: &mut Inspector<WebDom>,
    f: impl FnOnce(&mut Inspector<WebDom>) -> R,
) -> R {
    let was_active = inspector.is_active();
    let out = f(inspector);
    if was_active && !inspector.is_active() {
        inspector.dom().release_detached();
    } else {
        inspector.dom().collect();
    }
    out
}

/// Weak handle to the inspector, shared by every listener.
#[derive(Clone, Default)]
pub struct InspectorSlot(Rc<RefCell<Weak<RefCell<Inspector<WebDom>>>>>);

impl InspectorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill(&self, inspector: &SharedInspector) {
        *self.0.borrow_mut() = Rc::downgrade(inspector);
    }

    fn get(&self) -> Option<SharedInspector> {
        self.0.borrow().upgrade()
    }
}

fn dispatch(slot: &InspectorSlot, event: &Event, kind: EventKind, generation: u64) {
    let Some(shared) = slot.get() else {
        return;
    };
    let Ok(mut inspector) = shared.try_borrow_mut() else {
        trace!(kind = kind.dom_name(), "re-entrant event skipped");
        return;
    };
    let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return;
    };
    let node = inspector.dom().intern(&target);
    let (x, y) = event
        .dyn_ref::<MouseEvent>()
        .map_or((0.0, 0.0), |m| (f64::from(m.page_x()), f64::from(m.page_y())));
    let disposition = settled(&mut inspector, |inspector| {
        inspector.advance(elapsed());
        inspector.handle_event(&PageEvent::new(kind, node, generation).at(x, y))
    });
    drop(inspector);
    apply(event, disposition);
}

/// Installs inspector listeners on the document.
pub struct WebEventHost {
    document: Document,
    slot: InspectorSlot,
    parked: Rc<RefCell<Vec<EventListener>>>,
}

impl WebEventHost {
    pub fn new(document: Document, slot: InspectorSlot) -> Self {
        Self {
            document,
            slot,
            parked: Rc::default(),
        }
    }
}

impl EventHost for WebEventHost {
    fn attach(&mut self, scope: ListenerScope) -> ListenerGuard {
        let listeners: Vec<EventListener> = scope
            .interest
            .kinds()
            .map(|kind| {
                let phase = if kind == EventKind::Click && scope.capture_clicks {
                    EventListenerPhase::Capture
                } else {
                    EventListenerPhase::Bubble
                };
                let slot = self.slot.clone();
                let generation = scope.generation;
                EventListener::new_with_options(
                    &self.document,
                    kind.dom_name(),
                    EventListenerOptions {
                        phase,
                        passive: false,
                    },
                    move |event: &Event| dispatch(&slot, event, kind, generation),
                )
            })
            .collect();
        debug!(generation = scope.generation, listeners = listeners.len(), "listeners attached");

        let parked = Rc::clone(&self.parked);
        ListenerGuard::new(move || {
            parked.borrow_mut().extend(listeners);
            Timeout::new(0, move || parked.borrow_mut().clear()).forget();
        })
    }
}

/// `navigator.clipboard`. The write completes asynchronously; a rejection is
/// logged and otherwise ignored.
#[derive(Debug, Default)]
pub struct WebClipboard;

impl ClipboardSink for WebClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let window = web_sys::window().ok_or(ClipboardError::NotAvailable)?;
        let promise = window.navigator().clipboard().write_text(text);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                debug!(error = ?err, "clipboard write rejected");
            }
        });
        Ok(())
    }
}
