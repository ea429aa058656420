#![forbid(unsafe_code)]

//! Page events as the inspector sees them.
//!
//! Hosts translate native pointer/keyboard events into [`PageEvent`] /
//! [`KeyChord`], hand them to the inspector, and apply the returned
//! [`Disposition`] to the native event.

use bitflags::bitflags;

use crate::dom::NodeId;

/// Pointer event kinds the inspector listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `mouseover`
    PointerOver,
    /// `mouseout`
    PointerOut,
    /// `click`
    Click,
}

impl EventKind {
    /// DOM event type name.
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::PointerOver => "mouseover",
            Self::PointerOut => "mouseout",
            Self::Click => "click",
        }
    }

    /// The interest bit covering this kind.
    pub const fn interest(self) -> Interest {
        match self {
            Self::PointerOver => Interest::POINTER_OVER,
            Self::PointerOut => Interest::POINTER_OUT,
            Self::Click => Interest::CLICK,
        }
    }
}

bitflags! {
    /// Set of event kinds a listener scope subscribes to.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Interest: u8 {
        const POINTER_OVER = 0b001;
        const POINTER_OUT  = 0b010;
        const CLICK        = 0b100;
        const HOVER = Self::POINTER_OVER.bits() | Self::POINTER_OUT.bits();
    }
}

impl Interest {
    /// The event kinds in this set, in a fixed order.
    pub fn kinds(self) -> impl Iterator<Item = EventKind> {
        [EventKind::PointerOver, EventKind::PointerOut, EventKind::Click]
            .into_iter()
            .filter(move |k| self.contains(k.interest()))
    }
}

/// A pointer event delivered to the inspector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageEvent {
    /// What happened.
    pub kind: EventKind,
    /// Element the event was dispatched to. Re-resolved by every handler.
    pub target: NodeId,
    /// Pointer x in page coordinates.
    pub page_x: f64,
    /// Pointer y in page coordinates.
    pub page_y: f64,
    /// Generation of the listener scope that delivered the event.
    pub generation: u64,
}

impl PageEvent {
    /// Create an event with the pointer at the page origin.
    #[must_use]
    pub const fn new(kind: EventKind, target: NodeId, generation: u64) -> Self {
        Self {
            kind,
            target,
            page_x: 0.0,
            page_y: 0.0,
            generation,
        }
    }

    /// Set the pointer position.
    #[must_use]
    pub const fn at(mut self, page_x: f64, page_y: f64) -> Self {
        self.page_x = page_x;
        self.page_y = page_y;
        self
    }
}

/// What the host should do with the native event after the inspector ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Disposition {
    /// Call `preventDefault()`.
    pub prevent_default: bool,
    /// Call `stopPropagation()`.
    pub stop_propagation: bool,
}

impl Disposition {
    /// Let the page handle the event normally.
    pub const PASS: Self = Self {
        prevent_default: false,
        stop_propagation: false,
    };

    /// Swallow the event entirely.
    pub const SUPPRESS: Self = Self {
        prevent_default: true,
        stop_propagation: true,
    };

    /// Stop propagation without touching the default action.
    pub const STOP: Self = Self {
        prevent_default: false,
        stop_propagation: true,
    };
}

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// A `keydown` reduced to what the shortcut check needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    /// DOM `key` value (`"V"` when Shift is held).
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyChord {
    #[must_use]
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// Ctrl+Shift+V or Cmd+Shift+V: the reserved toggle combination.
    ///
    /// The host must `preventDefault()` when this returns true.
    #[must_use]
    pub fn is_toggle_shortcut(&self) -> bool {
        let primary = self.modifiers.intersects(Modifiers::CTRL | Modifiers::SUPER);
        primary && self.modifiers.contains(Modifiers::SHIFT) && self.key == "V"
    }
}
