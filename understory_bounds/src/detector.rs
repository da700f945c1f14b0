// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Best-effort bounds-change detection for a single node.
//!
//! ## Signal selection
//!
//! Re-measuring every frame would catch every layout shift, but it couples
//! detection to a render loop and costs a measurement per frame per node.
//! Instead the detector subscribes only to discrete signals that usually
//! precede a bounds change:
//!
//! - mutation of the node's own presentation attributes (`style`, `class`),
//! - a size change of any ancestor (a parent's size reflects most sibling
//!   layout changes),
//! - a scroll of any ancestor (scrolling translates descendants).
//!
//! Causes outside that set, such as late font loads or zoom without a scroll or
//! resize, are missed. That is the accepted cost of not polling.
//!
//! Every signal runs the same recompute step: measure, compare field by field
//! with the last reported bounds, and notify only on a real change. Signals
//! that leave the bounds untouched are absorbed silently.
//!
//! ## Subscription plan
//!
//! The ancestor chain is walked iteratively by [`plan_subscriptions`], which
//! returns the full list of subscriptions as data. For a node nested `K`
//! levels deep that is `1 + 2 * K` subscriptions with the default options.
//!
//! ```
//! # use understory_bounds::{DetectorOptions, SignalKind, plan_subscriptions};
//! # use understory_bounds::{Bounds, Handle, LayoutNode, ListenOptions, SignalCallback};
//! # #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! # struct Depth(u32);
//! # impl LayoutNode for Depth {
//! #     fn parent(&self) -> Option<Self> { self.0.checked_sub(1).map(Depth) }
//! #     fn measure(&self) -> Bounds { Bounds::ZERO }
//! #     fn watch_attributes(&self, _: &[&'static str], _: SignalCallback) -> Handle { Handle::noop() }
//! #     fn watch_size(&self, _: SignalCallback) -> Handle { Handle::noop() }
//! #     fn listen_scroll(&self, _: SignalCallback, _: ListenOptions) -> Handle { Handle::noop() }
//! # }
//! let plan = plan_subscriptions(&Depth(3), &DetectorOptions::default());
//! assert_eq!(plan.len(), 1 + 2 * 3);
//! assert_eq!(plan[0].kind, SignalKind::Attributes);
//! assert_eq!(plan[0].node, Depth(3));
//! ```

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::Cell;

use hashbrown::HashSet;

use crate::notify::Notifier;
use crate::{
    Bounds, BoundsChange, Handle, LayoutNode, ListenOptions, PRESENTATION_ATTRIBUTES,
    SignalCallback, SignalKind,
};

/// Configuration for a detection session.
///
/// The defaults watch `style` and `class` on the observed node only, and
/// register passive scroll listeners.
///
/// ```
/// use understory_bounds::{DetectorOptions, ListenOptions};
///
/// let options = DetectorOptions::new()
///     .with_attributes(&["style", "class", "hidden"])
///     .with_ancestor_attributes(true);
/// assert!(options.ancestor_attributes());
/// assert_eq!(options.scroll(), ListenOptions { passive: true });
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DetectorOptions {
    attributes: &'static [&'static str],
    ancestor_attributes: bool,
    scroll: ListenOptions,
}

impl DetectorOptions {
    /// Creates the default options.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attributes: PRESENTATION_ATTRIBUTES,
            ancestor_attributes: false,
            scroll: ListenOptions { passive: true },
        }
    }

    /// Sets the attribute names whose mutation triggers a re-measure.
    #[must_use]
    pub const fn with_attributes(mut self, attributes: &'static [&'static str]) -> Self {
        self.attributes = attributes;
        self
    }

    /// Also watches attributes on every ancestor, not just the observed node.
    ///
    /// This catches style changes on ancestors that do not alter their size,
    /// such as a transform, at the cost of one extra subscription per level.
    #[must_use]
    pub const fn with_ancestor_attributes(mut self, enabled: bool) -> Self {
        self.ancestor_attributes = enabled;
        self
    }

    /// Sets the options passed to every scroll listener.
    #[must_use]
    pub const fn with_scroll(mut self, scroll: ListenOptions) -> Self {
        self.scroll = scroll;
        self
    }

    /// The watched attribute names.
    #[must_use]
    pub const fn attributes(&self) -> &'static [&'static str] {
        self.attributes
    }

    /// Whether ancestors' attributes are watched too.
    #[must_use]
    pub const fn ancestor_attributes(&self) -> bool {
        self.ancestor_attributes
    }

    /// Options used for scroll listeners.
    #[must_use]
    pub const fn scroll(&self) -> ListenOptions {
        self.scroll
    }
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// One signal subscription on one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscription<N> {
    /// The node the subscription is attached to.
    pub node: N,
    /// The signal listened to.
    pub kind: SignalKind,
}

impl<N: LayoutNode> Subscription<N> {
    /// Attaches this subscription, routing the signal to `callback`.
    pub fn attach(&self, options: &DetectorOptions, callback: SignalCallback) -> Handle {
        match self.kind {
            SignalKind::Attributes => self.node.watch_attributes(options.attributes, callback),
            SignalKind::Size => self.node.watch_size(callback),
            SignalKind::Scroll => self.node.listen_scroll(callback, options.scroll),
        }
    }
}

/// Iterator over a node's ancestors, nearest first.
#[derive(Clone, Debug)]
pub struct Ancestors<N> {
    next: Option<N>,
}

impl<N: LayoutNode> Iterator for Ancestors<N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

/// Returns the ancestors of `node`, from its parent up to the root.
pub fn ancestors<N: LayoutNode>(node: &N) -> Ancestors<N> {
    Ancestors {
        next: node.parent(),
    }
}

/// Lists every subscription needed to detect bounds changes of `node`.
///
/// The list starts with the attribute watcher on `node`, followed by a size
/// watcher and a scroll listener for each ancestor, nearest first. With
/// [`DetectorOptions::with_ancestor_attributes`] each ancestor also gets an
/// attribute watcher.
///
/// The walk stops early if the host reports a parent chain that loops back on
/// itself.
pub fn plan_subscriptions<N: LayoutNode>(
    node: &N,
    options: &DetectorOptions,
) -> Vec<Subscription<N>> {
    let mut plan = vec![Subscription {
        node: node.clone(),
        kind: SignalKind::Attributes,
    }];
    let mut seen: HashSet<N> = HashSet::new();
    seen.insert(node.clone());

    for ancestor in ancestors(node) {
        if !seen.insert(ancestor.clone()) {
            break;
        }
        plan.push(Subscription {
            node: ancestor.clone(),
            kind: SignalKind::Size,
        });
        if options.ancestor_attributes {
            plan.push(Subscription {
                node: ancestor.clone(),
                kind: SignalKind::Scroll,
            });
            plan.push(Subscription {
                node: ancestor,
                kind: SignalKind::Attributes,
            });
        } else {
            plan.push(Subscription {
                node: ancestor,
                kind: SignalKind::Scroll,
            });
        }
    }
    plan
}

/// State shared by every signal callback of one session.
struct DetectionSession<N> {
    node: N,
    previous: Cell<Bounds>,
    active: Cell<bool>,
    notifier: Notifier<BoundsChange>,
}

impl<N: LayoutNode> DetectionSession<N> {
    fn recompute(&self) {
        if !self.active.get() {
            return;
        }
        let current = self.node.measure();
        let previous = self.previous.get();
        if current == previous {
            return;
        }
        self.previous.set(current);
        #[cfg(feature = "tracing")]
        tracing::debug!(?previous, new = ?current, "bounds changed");
        self.notifier.notify(BoundsChange {
            previous,
            new: current,
        });
    }
}

/// Starts detecting bounds changes of `node` with default options.
///
/// See [`start_detecting_with`].
pub fn start_detecting<N: LayoutNode>(
    node: &N,
    on_change: impl FnMut(BoundsChange) + 'static,
) -> Handle {
    start_detecting_with(node, DetectorOptions::default(), on_change)
}

/// Starts detecting bounds changes of `node`.
///
/// The node is measured once up front. From then on, every planned signal
/// re-measures it, and `on_change` receives the previous and new bounds
/// whenever they differ. Each confirmed change produces exactly one call, in
/// the order the signals fired.
///
/// The returned [`Handle`] covers every subscription of the session.
/// Cancelling (or dropping) it stops detection before it returns. A node
/// without a parent is not an error; only its own attributes are watched.
pub fn start_detecting_with<N: LayoutNode>(
    node: &N,
    options: DetectorOptions,
    on_change: impl FnMut(BoundsChange) + 'static,
) -> Handle {
    let session = Rc::new(DetectionSession {
        node: node.clone(),
        previous: Cell::new(node.measure()),
        active: Cell::new(true),
        notifier: Notifier::new(on_change),
    });
    let recompute: SignalCallback = {
        let session = session.clone();
        Rc::new(move || session.recompute())
    };

    let plan = plan_subscriptions(node, &options);
    #[cfg(feature = "tracing")]
    tracing::debug!(subscriptions = plan.len(), "bounds detection started");

    let deactivate = {
        let session = Rc::downgrade(&session);
        Handle::from_fn(move || {
            if let Some(session) = session.upgrade() {
                session.active.set(false);
                session.notifier.clear();
            }
        })
    };
    core::iter::once(deactivate)
        .chain(
            plan.iter()
                .map(|subscription| subscription.attach(&options, recompute.clone())),
        )
        .collect()
}
