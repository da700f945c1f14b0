// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The capabilities a host node type must provide.
//!
//! The detector never needs a concrete node type. Anything that can name its
//! parent, measure itself, and be watched for attribute, size and scroll
//! changes can be observed. Hosts implement [`LayoutNode`] on their own node
//! handle (a DOM element wrapper, a retained widget id paired with its tree,
//! and so on).

use alloc::rc::Rc;
use core::fmt;

use crate::{Bounds, Handle};

/// Callback a host invokes whenever a subscribed signal fires.
///
/// Hosts are expected to keep a clone of the callback alive while invoking
/// it, since the callback may cancel its own subscription from inside.
pub type SignalCallback = Rc<dyn Fn()>;

/// Attributes whose mutation most often shifts an element's own layout.
pub const PRESENTATION_ATTRIBUTES: &[&str] = &["style", "class"];

/// The kind of signal a subscription listens to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// A mutation of one of the watched attributes.
    Attributes,
    /// A change of the node's rendered size.
    Size,
    /// A change of the node's scroll offset.
    Scroll,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Attributes => "attribute",
            Self::Size => "size",
            Self::Scroll => "scroll",
        })
    }
}

/// Options for scroll listeners.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ListenOptions {
    /// The listener promises never to block scrolling.
    pub passive: bool,
}

impl Default for ListenOptions {
    fn default() -> Self {
        Self { passive: true }
    }
}

/// A node in a hierarchical layout tree that can be observed for bounds changes.
///
/// Every `watch_*`/`listen_*` method returns a [`Handle`] which, once
/// cancelled, must detach the subscription so that the callback is never
/// invoked again.
///
/// Subscriptions are expected to fire their callback promptly after the
/// underlying change. Measurement is synchronous and always available.
pub trait LayoutNode: Clone + Eq + core::hash::Hash + 'static {
    /// Returns this node's parent, or `None` at the root or when detached.
    fn parent(&self) -> Option<Self>;

    /// Measures the node's current on-screen bounds.
    fn measure(&self) -> Bounds;

    /// Invokes `callback` after any mutation of the named attributes on this node.
    fn watch_attributes(&self, attributes: &[&'static str], callback: SignalCallback) -> Handle;

    /// Invokes `callback` when this node's rendered size changes.
    fn watch_size(&self, callback: SignalCallback) -> Handle;

    /// Invokes `callback` when this node's scroll offset changes.
    fn listen_scroll(&self, callback: SignalCallback, options: ListenOptions) -> Handle;
}
