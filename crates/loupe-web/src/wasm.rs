#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo::timers::callback::Interval;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, KeyboardEvent};

use loupe_core::event::{KeyChord, Modifiers};
use loupe_inspect::{Inspector, InspectorConfig};

use crate::dom::WebDom;
use crate::host::{self, InspectorSlot, SharedInspector, WebClipboard, WebEventHost};

/// How often the info popup's expiry is checked.
const CLOCK_TICK_MS: u32 = 250;

/// The inspector as exported to page scripts.
///
/// ```js
/// const loupe = new LoupeWeb({ default_tool: "spacing" });
/// loupe.toggle();
/// ```
///
/// Ctrl/Cmd+Shift+V toggles it for as long as the object lives.
#[wasm_bindgen]
pub struct LoupeWeb {
    inspector: SharedInspector,
    _shortcut: EventListener,
    _clock: Interval,
}

#[wasm_bindgen]
impl LoupeWeb {
    /// Create an inactive inspector for the current page.
    ///
    /// `options` is an object with the `InspectorConfig` fields; missing
    /// fields keep their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<JsValue>) -> Result<LoupeWeb, JsValue> {
        let config = parse_options(options)?;
        let dom = WebDom::from_global().ok_or_else(|| JsValue::from_str("no document"))?;
        let document = dom.document().clone();
        let slot = InspectorSlot::new();
        let event_host = WebEventHost::new(document.clone(), slot.clone());
        let inspector = Rc::new(RefCell::new(Inspector::new(
            dom,
            event_host,
            WebClipboard,
            config,
        )));
        slot.fill(&inspector);
        Ok(Self {
            _shortcut: shortcut_listener(&document, &inspector),
            _clock: popup_clock(&inspector),
            inspector,
        })
    }

    /// Install the toolbar and default tool. `false` if already active.
    pub fn activate(&self) -> bool {
        self.with(false, Inspector::activate)
    }

    /// Remove everything the inspector added. `false` if it was inactive.
    pub fn deactivate(&self) -> bool {
        self.with(false, Inspector::deactivate)
    }

    /// Flip the active state and return the new one.
    pub fn toggle(&self) -> bool {
        self.with(false, Inspector::toggle)
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.inspector
            .try_borrow()
            .is_ok_and(|inspector| inspector.is_active())
    }

    /// Switch mode by name (`inspect`, `spacing`, `color`, `font`).
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&self, name: &str) -> bool {
        self.with(false, |inspector| inspector.set_tool_named(name))
    }

    #[wasm_bindgen(js_name = activeTool)]
    pub fn active_tool(&self) -> Option<String> {
        let inspector = self.inspector.try_borrow().ok()?;
        inspector.active_tool().map(|mode| mode.as_str().to_owned())
    }

    /// Elements the binding currently holds on to.
    #[wasm_bindgen(js_name = knownNodes)]
    pub fn known_nodes(&self) -> usize {
        self.inspector
            .try_borrow()
            .map_or(0, |inspector| inspector.dom().known_nodes())
    }

    /// The diagnostic log as JSONL, when enabled.
    pub fn diagnostics(&self) -> Option<String> {
        let inspector = self.inspector.try_borrow().ok()?;
        inspector.diagnostic_log().map(|log| log.to_jsonl())
    }

    /// Deactivate and release the page. The object is unusable afterwards.
    pub fn destroy(self) {
        self.deactivate();
    }
}

impl LoupeWeb {
    fn with<R>(&self, busy: R, f: impl FnOnce(&mut Inspector<WebDom>) -> R) -> R {
        match self.inspector.try_borrow_mut() {
            Ok(mut inspector) => host::settled(&mut inspector, |inspector| {
                inspector.advance(host::elapsed());
                f(inspector)
            }),
            Err(_) => busy,
        }
    }
}

fn parse_options(options: Option<JsValue>) -> Result<InspectorConfig, JsValue> {
    let Some(options) = options.filter(|o| !o.is_undefined() && !o.is_null()) else {
        return Ok(InspectorConfig::default());
    };
    let json: String = js_sys::JSON::stringify(&options)?.into();
    InspectorConfig::from_json(&json).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn chord_of(event: &KeyboardEvent) -> KeyChord {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, event.shift_key());
    modifiers.set(Modifiers::ALT, event.alt_key());
    modifiers.set(Modifiers::CTRL, event.ctrl_key());
    modifiers.set(Modifiers::SUPER, event.meta_key());
    KeyChord::new(event.key(), modifiers)
}

fn shortcut_listener(document: &Document, inspector: &SharedInspector) -> EventListener {
    let weak = Rc::downgrade(inspector);
    EventListener::new_with_options(
        document,
        "keydown",
        EventListenerOptions {
            phase: EventListenerPhase::Bubble,
            passive: false,
        },
        move |event: &Event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let chord = chord_of(key);
            if !chord.is_toggle_shortcut() {
                return;
            }
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let Ok(mut inspector) = shared.try_borrow_mut() else {
                return;
            };
            let disposition = host::settled(&mut inspector, |inspector| inspector.handle_key(&chord));
            drop(inspector);
            host::apply(event, disposition);
        },
    )
}

fn popup_clock(inspector: &SharedInspector) -> Interval {
    let weak = Rc::downgrade(inspector);
    Interval::new(CLOCK_TICK_MS, move || {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        if let Ok(mut inspector) = shared.try_borrow_mut() {
            host::settled(&mut inspector, |inspector| inspector.advance(host::elapsed()));
        }
    })
}
