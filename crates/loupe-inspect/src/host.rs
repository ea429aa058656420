#![forbid(unsafe_code)]

//! Host collaborators: event listener installation and clipboard access.
//!
//! Listener installation is scoped. [`EventHost::attach`] returns a
//! [`ListenerGuard`]; dropping the guard detaches every listener the scope
//! installed. Mode switches and deactivation drop guards, so no listener can
//! outlive the mode that installed it even if a handler panics midway.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use loupe_core::ToolMode;
use loupe_core::event::Interest;

/// Which part of the inspector a listener scope serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Toolbar, hierarchy panel and other inspector-owned UI.
    Chrome,
    /// The active tool's page handlers.
    Tool(ToolMode),
}

/// A request to install document-level listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerScope {
    /// Stamped onto every event the scope delivers. Events carrying a
    /// generation that is no longer current are ignored.
    pub generation: u64,
    /// Event kinds to listen for.
    pub interest: Interest,
    /// Register click listeners in the capture phase.
    pub capture_clicks: bool,
    pub kind: ScopeKind,
}

/// Detaches a listener scope when dropped.
#[must_use = "dropping the guard detaches the listeners immediately"]
pub struct ListenerGuard {
    detach: Option<Box<dyn FnOnce()>>,
}

impl ListenerGuard {
    /// Guard that runs `detach` on drop.
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Guard with nothing to detach.
    pub fn noop() -> Self {
        Self { detach: None }
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("armed", &self.detach.is_some())
            .finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

/// Installs document-level listeners on behalf of the inspector.
pub trait EventHost {
    /// Install listeners for `scope`. The returned guard owns them.
    fn attach(&mut self, scope: ListenerScope) -> ListenerGuard;
}

#[derive(Debug, Default)]
struct HeadlessState {
    attached: Vec<ListenerScope>,
    total_attached: usize,
}

/// An [`EventHost`] that installs nothing and records which scopes are live.
///
/// Clones share state, so a caller can keep a handle while the inspector owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scopes currently attached, in attach order.
    #[must_use]
    pub fn attached(&self) -> Vec<ListenerScope> {
        self.state.borrow().attached.clone()
    }

    /// Number of scopes currently attached.
    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.state.borrow().attached.len()
    }

    /// Number of scopes ever attached.
    #[must_use]
    pub fn total_attached(&self) -> usize {
        self.state.borrow().total_attached
    }

    /// The attached scope of the given kind, if any.
    #[must_use]
    pub fn scope(&self, kind: ScopeKind) -> Option<ListenerScope> {
        self.state
            .borrow()
            .attached
            .iter()
            .find(|s| s.kind == kind)
            .copied()
    }

    /// The attached tool scope, if any.
    #[must_use]
    pub fn tool_scope(&self) -> Option<ListenerScope> {
        self.state
            .borrow()
            .attached
            .iter()
            .find(|s| matches!(s.kind, ScopeKind::Tool(_)))
            .copied()
    }
}

impl EventHost for HeadlessHost {
    fn attach(&mut self, scope: ListenerScope) -> ListenerGuard {
        {
            let mut state = self.state.borrow_mut();
            state.attached.push(scope);
            state.total_attached += 1;
        }
        let weak = Rc::downgrade(&self.state);
        ListenerGuard::new(move || {
            if let Some(state) = weak.upgrade() {
                state
                    .borrow_mut()
                    .attached
                    .retain(|s| s.generation != scope.generation);
            }
        })
    }
}

/// Clipboard errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// No clipboard in this context.
    NotAvailable,
    /// The host refused the write (permissions, insecure context).
    Denied(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAvailable => write!(f, "clipboard not available"),
            Self::Denied(msg) => write!(f, "clipboard write denied: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// Best-effort text clipboard.
pub trait ClipboardSink {
    /// Write `text`. Callers treat failure as non-fatal.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Default)]
struct BufferState {
    contents: Option<String>,
    deny: bool,
    attempts: usize,
}

/// In-memory clipboard. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct BufferClipboard {
    state: Rc<RefCell<BufferState>>,
}

impl BufferClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that rejects every write.
    #[must_use]
    pub fn denying() -> Self {
        let clipboard = Self::default();
        clipboard.state.borrow_mut().deny = true;
        clipboard
    }

    /// Last successfully written text.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.state.borrow().contents.clone()
    }

    /// Number of write attempts, successful or not.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.state.borrow().attempts
    }
}

impl ClipboardSink for BufferClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut state = self.state.borrow_mut();
        state.attempts += 1;
        if state.deny {
            return Err(ClipboardError::Denied("clipboard write rejected".into()));
        }
        state.contents = Some(text.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(generation: u64, kind: ScopeKind) -> ListenerScope {
        ListenerScope {
            generation,
            interest: Interest::CLICK,
            capture_clicks: true,
            kind,
        }
    }

    #[test]
    fn guard_drop_detaches_scope() {
        let host = HeadlessHost::new();
        let mut attach_handle = host.clone();
        let guard = attach_handle.attach(scope(1, ScopeKind::Chrome));
        assert_eq!(host.attached_count(), 1);
        assert_eq!(host.scope(ScopeKind::Chrome).map(|s| s.generation), Some(1));
        drop(guard);
        assert_eq!(host.attached_count(), 0);
        assert_eq!(host.total_attached(), 1);
    }

    #[test]
    fn guards_detach_independently() {
        let mut host = HeadlessHost::new();
        let chrome = host.attach(scope(1, ScopeKind::Chrome));
        let tool = host.attach(scope(2, ScopeKind::Tool(ToolMode::Inspect)));
        assert_eq!(host.tool_scope().map(|s| s.generation), Some(2));
        drop(tool);
        assert!(host.tool_scope().is_none());
        assert_eq!(host.attached_count(), 1);
        drop(chrome);
        assert_eq!(host.attached_count(), 0);
    }

    #[test]
    fn noop_guard_is_inert() {
        let guard = ListenerGuard::noop();
        assert_eq!(format!("{guard:?}"), "ListenerGuard { armed: false }");
    }

    #[test]
    fn buffer_clipboard_records_writes() {
        let clipboard = BufferClipboard::new();
        let mut sink = clipboard.clone();
        sink.write_text("rgb(1, 2, 3)").unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("rgb(1, 2, 3)"));
        assert_eq!(clipboard.attempts(), 1);
    }

    #[test]
    fn denying_clipboard_fails_without_storing() {
        let clipboard = BufferClipboard::denying();
        let mut sink = clipboard.clone();
        let err = sink.write_text("x").unwrap_err();
        assert!(matches!(err, ClipboardError::Denied(_)));
        assert_eq!(clipboard.contents(), None);
        assert_eq!(clipboard.attempts(), 1);
    }
}
