#![forbid(unsafe_code)]

//! The id → element half of the node registry.
//!
//! Every overlay the inspector draws is interned, so a long session keeps
//! adding entries whose elements were removed from the page long ago. The
//! table sweeps itself once it has doubled since the last sweep, which keeps
//! it within a constant factor of the live set at amortized O(1) per insert.
//! Hosts force a full sweep whenever the inspector goes inactive.

use std::collections::HashMap;

use loupe_core::dom::NodeId;

/// Sweeps never trigger below this many entries.
const MIN_SWEEP_LEN: usize = 64;

#[derive(Debug)]
pub struct NodeTable<E> {
    nodes: HashMap<NodeId, E>,
    next: u64,
    sweep_at: usize,
}

impl<E> Default for NodeTable<E> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            next: 0,
            sweep_at: MIN_SWEEP_LEN,
        }
    }
}

impl<E> NodeTable<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh id. Ids start at 1 and are never reused.
    pub fn issue(&mut self) -> NodeId {
        self.next += 1;
        NodeId::new(self.next)
    }

    pub fn insert(&mut self, id: NodeId, element: E) {
        self.nodes.insert(id, element);
    }

    /// Keep an existing entry, or store `element` for an id issued earlier
    /// and since released.
    pub fn restore(&mut self, id: NodeId, element: impl FnOnce() -> E) {
        self.nodes.entry(id).or_insert_with(element);
    }

    pub fn get(&self, id: NodeId) -> Option<&E> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop entries whose element is no longer live. Returns how many went.
    pub fn release(&mut self, is_live: impl Fn(&E) -> bool) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|_, element| is_live(element));
        self.sweep_at = (self.nodes.len() * 2).max(MIN_SWEEP_LEN);
        before - self.nodes.len()
    }

    /// [`release`](Self::release), but only once the table has doubled
    /// since the last sweep.
    pub fn release_if_grown(&mut self, is_live: impl Fn(&E) -> bool) -> usize {
        if self.nodes.len() < self.sweep_at {
            return 0;
        }
        self.release(is_live)
    }
}
