// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory layout tree used by the integration tests.
//!
//! Nodes carry settable bounds and keep every live subscription so tests can
//! fire signals by hand and count what is attached.

#![allow(dead_code, reason = "not every test binary uses every helper")]

use std::cell::{Cell, RefCell};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use understory_bounds::{
    Bounds, Handle, LayoutNode, ListenOptions, ReleaseError, SignalCallback, SignalKind,
};

struct Listener {
    id: u64,
    kind: SignalKind,
    attributes: Vec<&'static str>,
    options: Option<ListenOptions>,
    callback: SignalCallback,
}

struct NodeData {
    parent: Option<usize>,
    bounds: Bounds,
    listeners: Vec<Listener>,
}

#[derive(Default)]
pub(crate) struct Tree {
    nodes: RefCell<Vec<NodeData>>,
    next_listener: Cell<u64>,
    fail_releases: Cell<bool>,
    measurements: Cell<usize>,
}

impl Tree {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn root(self: &Rc<Self>, bounds: Bounds) -> Node {
        self.push(None, bounds)
    }

    pub(crate) fn child(self: &Rc<Self>, parent: &Node, bounds: Bounds) -> Node {
        self.push(Some(parent.id), bounds)
    }

    /// Builds a chain `root -> ... -> leaf` with `depth` ancestors above the leaf.
    ///
    /// Returns the nodes ordered from root to leaf.
    pub(crate) fn chain(self: &Rc<Self>, depth: usize, leaf_bounds: Bounds) -> Vec<Node> {
        let mut nodes = vec![self.root(Bounds::new(0.0, 0.0, 100.0, 100.0))];
        for _ in 1..depth {
            let parent = nodes.last().unwrap().clone();
            nodes.push(self.child(&parent, Bounds::new(0.0, 0.0, 100.0, 100.0)));
        }
        if depth == 0 {
            nodes[0].set_bounds(leaf_bounds);
        } else {
            let parent = nodes.last().unwrap().clone();
            nodes.push(self.child(&parent, leaf_bounds));
        }
        nodes
    }

    /// Makes every following release report an error (after detaching).
    pub(crate) fn fail_releases(&self, fail: bool) {
        self.fail_releases.set(fail);
    }

    pub(crate) fn live(&self, kind: SignalKind) -> usize {
        self.nodes
            .borrow()
            .iter()
            .flat_map(|n| n.listeners.iter())
            .filter(|l| l.kind == kind)
            .count()
    }

    pub(crate) fn live_total(&self) -> usize {
        self.nodes.borrow().iter().map(|n| n.listeners.len()).sum()
    }

    pub(crate) fn measurements(&self) -> usize {
        self.measurements.get()
    }

    fn push(self: &Rc<Self>, parent: Option<usize>, bounds: Bounds) -> Node {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData {
            parent,
            bounds,
            listeners: Vec::new(),
        });
        Node {
            tree: self.clone(),
            id: nodes.len() - 1,
        }
    }

    fn subscribe(
        self: &Rc<Self>,
        node: usize,
        kind: SignalKind,
        attributes: &[&'static str],
        options: Option<ListenOptions>,
        callback: SignalCallback,
    ) -> Handle {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.nodes.borrow_mut()[node].listeners.push(Listener {
            id,
            kind,
            attributes: attributes.to_vec(),
            options,
            callback,
        });

        let tree = self.clone();
        Handle::new(move || {
            tree.nodes.borrow_mut()[node].listeners.retain(|l| l.id != id);
            if tree.fail_releases.get() {
                Err(ReleaseError::new("host refused").with_signal(kind))
            } else {
                Ok(())
            }
        })
    }

    /// Invokes a snapshot of the matching callbacks, like a host dispatch loop.
    fn dispatch(&self, node: usize, matches: impl Fn(&Listener) -> bool) -> usize {
        let callbacks: Vec<SignalCallback> = self.nodes.borrow()[node]
            .listeners
            .iter()
            .filter(|l| matches(l))
            .map(|l| l.callback.clone())
            .collect();
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }
}

#[derive(Clone)]
pub(crate) struct Node {
    tree: Rc<Tree>,
    id: usize,
}

impl Node {
    pub(crate) fn set_bounds(&self, bounds: Bounds) {
        self.tree.nodes.borrow_mut()[self.id].bounds = bounds;
    }

    /// Mutates `name` and notifies watchers filtering on it.
    pub(crate) fn set_attribute(&self, name: &str) -> usize {
        self.tree.dispatch(self.id, |l| {
            l.kind == SignalKind::Attributes && l.attributes.iter().any(|a| *a == name)
        })
    }

    /// Fires size watchers attached to this node.
    pub(crate) fn resized(&self) -> usize {
        self.tree.dispatch(self.id, |l| l.kind == SignalKind::Size)
    }

    /// Fires scroll listeners attached to this node.
    pub(crate) fn scrolled(&self) -> usize {
        self.tree.dispatch(self.id, |l| l.kind == SignalKind::Scroll)
    }

    pub(crate) fn live(&self, kind: SignalKind) -> usize {
        self.tree.nodes.borrow()[self.id]
            .listeners
            .iter()
            .filter(|l| l.kind == kind)
            .count()
    }

    pub(crate) fn scroll_options(&self) -> Vec<ListenOptions> {
        self.tree.nodes.borrow()[self.id]
            .listeners
            .iter()
            .filter_map(|l| l.options)
            .collect()
    }

    pub(crate) fn watched_attributes(&self) -> Vec<&'static str> {
        self.tree.nodes.borrow()[self.id]
            .listeners
            .iter()
            .filter(|l| l.kind == SignalKind::Attributes)
            .flat_map(|l| l.attributes.iter().copied())
            .collect()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree) && self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.tree).hash(state);
        self.id.hash(state);
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Node").field(&self.id).finish()
    }
}

impl LayoutNode for Node {
    fn parent(&self) -> Option<Self> {
        let parent = self.tree.nodes.borrow()[self.id].parent?;
        Some(Self {
            tree: self.tree.clone(),
            id: parent,
        })
    }

    fn measure(&self) -> Bounds {
        self.tree.measurements.set(self.tree.measurements.get() + 1);
        self.tree.nodes.borrow()[self.id].bounds
    }

    fn watch_attributes(&self, attributes: &[&'static str], callback: SignalCallback) -> Handle {
        self.tree
            .subscribe(self.id, SignalKind::Attributes, attributes, None, callback)
    }

    fn watch_size(&self, callback: SignalCallback) -> Handle {
        self.tree.subscribe(self.id, SignalKind::Size, &[], None, callback)
    }

    fn listen_scroll(&self, callback: SignalCallback, options: ListenOptions) -> Handle {
        self.tree
            .subscribe(self.id, SignalKind::Scroll, &[], Some(options), callback)
    }
}
