// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_bounds --heading-base-level=0

//! Understory Bounds: best-effort observation of on-screen bounds changes.
//!
//! This crate tells you when a node's measured rectangle actually changes,
//! without measuring every frame. It subscribes to the handful of signals that
//! usually precede a layout shift, re-measures when one fires, and reports
//! only real changes.
//!
//! ## Layers
//!
//! - [`BoundsObserver`]: a registry of observed nodes. It deduplicates repeated
//!   [`observe`](BoundsObserver::observe) calls and funnels every change into
//!   one batch callback of [`BoundsEntry`] values.
//! - [`start_detecting`] / [`start_detecting_with`]: one detection session for
//!   one node. It watches the node's presentation attributes plus the size and
//!   scroll offset of every ancestor, and calls back with a [`BoundsChange`].
//! - [`Handle`]: composable cancellation. Every session is torn down through a
//!   single handle built with [`Handle::combine`] / [`Handle::all`].
//!
//! ## Host integration
//!
//! The crate does not implement any watcher itself. Implement [`LayoutNode`]
//! for your node type to provide parent lookup, measurement, and the three
//! signal sources (attribute mutations, size changes, scroll events). Each
//! subscription hands back a [`Handle`] that detaches it.
//!
//! Everything is single-threaded and synchronous: signals run the recompute
//! step immediately, notifications are delivered in firing order, and
//! cancelling a handle detaches all of its subscriptions before returning.
//!
//! ## Example
//!
//! ```
//! use std::cell::{Cell, RefCell};
//! use std::rc::Rc;
//! use understory_bounds::{
//!     Bounds, BoundsObserver, Handle, LayoutNode, ListenOptions, SignalCallback,
//! };
//!
//! /// A single root node whose size can be poked from outside.
//! #[derive(Clone)]
//! struct Panel {
//!     bounds: Rc<Cell<Bounds>>,
//!     on_attributes: Rc<RefCell<Option<SignalCallback>>>,
//! }
//!
//! impl PartialEq for Panel {
//!     fn eq(&self, other: &Self) -> bool {
//!         Rc::ptr_eq(&self.bounds, &other.bounds)
//!     }
//! }
//! impl Eq for Panel {}
//! impl std::hash::Hash for Panel {
//!     fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
//!         Rc::as_ptr(&self.bounds).hash(state);
//!     }
//! }
//!
//! impl LayoutNode for Panel {
//!     fn parent(&self) -> Option<Self> {
//!         None
//!     }
//!     fn measure(&self) -> Bounds {
//!         self.bounds.get()
//!     }
//!     fn watch_attributes(&self, _: &[&'static str], callback: SignalCallback) -> Handle {
//!         *self.on_attributes.borrow_mut() = Some(callback);
//!         let slot = self.on_attributes.clone();
//!         Handle::from_fn(move || *slot.borrow_mut() = None)
//!     }
//!     fn watch_size(&self, _: SignalCallback) -> Handle {
//!         Handle::noop()
//!     }
//!     fn listen_scroll(&self, _: SignalCallback, _: ListenOptions) -> Handle {
//!         Handle::noop()
//!     }
//! }
//!
//! let panel = Panel {
//!     bounds: Rc::new(Cell::new(Bounds::new(0.0, 0.0, 10.0, 10.0))),
//!     on_attributes: Rc::default(),
//! };
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! let observer = BoundsObserver::new(move |entries, _| {
//!     sink.borrow_mut().extend(entries.iter().map(|e| (e.previous, e.new)));
//! });
//! observer.observe(panel.clone());
//!
//! // A class change widens the panel.
//! panel.bounds.set(Bounds::new(0.0, 0.0, 20.0, 10.0));
//! let fire = panel.on_attributes.borrow().clone().unwrap();
//! fire();
//! // Firing again without a change is absorbed.
//! fire();
//!
//! assert_eq!(
//!     *seen.borrow(),
//!     [(Bounds::new(0.0, 0.0, 10.0, 10.0), Bounds::new(0.0, 0.0, 20.0, 10.0))]
//! );
//!
//! observer.disconnect().unwrap();
//! assert!(panel.on_attributes.borrow().is_none());
//! ```
//!
//! ## Features
//!
//! - `std` (default): builds Kurbo with `std`.
//! - `libm`: builds Kurbo with `libm` for `no_std` targets.
//! - `tracing`: emits `tracing` events for session start, detected changes,
//!   and release errors that would otherwise be discarded.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod bounds;
pub mod detector;
mod handle;
mod node;
mod notify;
pub mod observer;

pub use bounds::{Bounds, BoundsChange};
pub use detector::{
    DetectorOptions, Subscription, ancestors, plan_subscriptions, start_detecting,
    start_detecting_with,
};
pub use handle::{Handle, ReleaseError};
pub use node::{LayoutNode, ListenOptions, PRESENTATION_ATTRIBUTES, SignalCallback, SignalKind};
pub use observer::{BoundsEntry, BoundsObserver};
