// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-node registry with a batch callback.
//!
//! [`BoundsObserver`] tracks a set of nodes, runs one detection session per
//! node, and funnels every change into a single callback as a slice of
//! [`BoundsEntry`] values. Today each batch holds exactly one entry; the slice
//! shape leaves room for coalescing later without changing call sites.
//!
//! ```
//! # use std::cell::Cell;
//! # use std::rc::Rc;
//! # use understory_bounds::{Bounds, Handle, LayoutNode, ListenOptions, SignalCallback};
//! # #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! # struct Root;
//! # impl LayoutNode for Root {
//! #     fn parent(&self) -> Option<Self> { None }
//! #     fn measure(&self) -> Bounds { Bounds::ZERO }
//! #     fn watch_attributes(&self, _: &[&'static str], _: SignalCallback) -> Handle { Handle::noop() }
//! #     fn watch_size(&self, _: SignalCallback) -> Handle { Handle::noop() }
//! #     fn listen_scroll(&self, _: SignalCallback, _: ListenOptions) -> Handle { Handle::noop() }
//! # }
//! use understory_bounds::BoundsObserver;
//!
//! let changes = Rc::new(Cell::new(0));
//! let sink = changes.clone();
//! let observer = BoundsObserver::new(move |entries, _observer| {
//!     sink.set(sink.get() + entries.len());
//! });
//!
//! observer.observe(Root);
//! observer.observe(Root); // already tracked, no-op
//! assert_eq!(observer.len(), 1);
//!
//! observer.disconnect().unwrap();
//! assert!(observer.is_empty());
//! assert_eq!(changes.get(), 0);
//! ```

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;
use smallvec::{SmallVec, smallvec};

use crate::notify::Notifier;
use crate::{Bounds, DetectorOptions, Handle, LayoutNode, ReleaseError, start_detecting_with};

/// One node's bounds change, as delivered to a [`BoundsObserver`] callback.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundsEntry<N> {
    /// The observed node whose bounds changed.
    pub target: N,
    /// The bounds last reported for `target`.
    pub previous: Bounds,
    /// The newly measured bounds of `target`.
    pub new: Bounds,
}

type Batch<N> = SmallVec<[BoundsEntry<N>; 1]>;

struct Inner<N> {
    options: DetectorOptions,
    handles: RefCell<HashMap<N, Handle>>,
    notifier: Notifier<Batch<N>>,
}

/// Observes bounds changes of any number of nodes through one callback.
///
/// `BoundsObserver` is a cheap, clonable handle; clones share the same set of
/// tracked nodes. The callback receives the observer itself, so it can
/// observe more nodes or disconnect from inside a notification.
///
/// Nodes are removed all at once with [`BoundsObserver::disconnect`]. Dropping
/// the last clone releases every session as well, discarding release errors.
pub struct BoundsObserver<N> {
    inner: Rc<Inner<N>>,
}

impl<N: LayoutNode> BoundsObserver<N> {
    /// Creates an observer with default [`DetectorOptions`].
    pub fn new(callback: impl FnMut(&[BoundsEntry<N>], &Self) + 'static) -> Self {
        Self::with_options(DetectorOptions::default(), callback)
    }

    /// Creates an observer whose sessions use `options`.
    pub fn with_options(
        options: DetectorOptions,
        mut callback: impl FnMut(&[BoundsEntry<N>], &Self) + 'static,
    ) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<Inner<N>>| {
            let weak = weak.clone();
            Inner {
                options,
                handles: RefCell::new(HashMap::new()),
                notifier: Notifier::new(move |batch: Batch<N>| {
                    if let Some(inner) = weak.upgrade() {
                        callback(batch.as_slice(), &Self { inner });
                    }
                }),
            }
        });
        Self { inner }
    }

    /// Starts observing `target`.
    ///
    /// Observing a node that is already tracked does nothing, so a node never
    /// has more than one session per observer.
    pub fn observe(&self, target: N) {
        if self.inner.handles.borrow().contains_key(&target) {
            #[cfg(feature = "tracing")]
            tracing::trace!("node already observed");
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        let entry_target = target.clone();
        let handle = start_detecting_with(&target, self.inner.options, move |change| {
            if let Some(inner) = weak.upgrade() {
                inner.notifier.notify(smallvec![BoundsEntry {
                    target: entry_target.clone(),
                    previous: change.previous,
                    new: change.new,
                }]);
            }
        });
        self.inner.handles.borrow_mut().insert(target, handle);
    }

    /// Stops observing every node.
    ///
    /// All sessions are cancelled and the tracked set is cleared, even if some
    /// release fails; the first failure is returned afterwards. Batches not yet
    /// delivered are discarded, so the callback never runs for a disconnected
    /// session. Calling this on an empty observer, or twice, is fine.
    pub fn disconnect(&self) -> Result<(), ReleaseError> {
        let handles: Vec<Handle> = self
            .inner
            .handles
            .borrow_mut()
            .drain()
            .map(|(_, handle)| handle)
            .collect();
        // Batches queued behind a running callback belong to the old sessions.
        self.inner.notifier.clear();
        #[cfg(feature = "tracing")]
        tracing::debug!(sessions = handles.len(), "bounds observer disconnected");
        Handle::all(handles).cancel()
    }

    /// Returns `true` if `target` is currently observed.
    #[must_use]
    pub fn is_observing(&self, target: &N) -> bool {
        self.inner.handles.borrow().contains_key(target)
    }

    /// Number of observed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.handles.borrow().len()
    }

    /// Returns `true` if no node is observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.handles.borrow().is_empty()
    }

    /// Returns `true` if both values refer to the same observer.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<N> Clone for BoundsObserver<N> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<N> fmt::Debug for BoundsObserver<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundsObserver")
            .field("options", &self.inner.options)
            .field("observed", &self.inner.handles.borrow().len())
            .finish_non_exhaustive()
    }
}
