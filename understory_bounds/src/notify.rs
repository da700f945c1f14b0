// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered delivery of notifications to a `FnMut` callback.
//!
//! Signals are dispatched synchronously by the host, and a callback is free to
//! change layout in a way that makes the host fire another signal before the
//! callback has returned. [`Notifier`] keeps delivery run-to-completion: a
//! value produced while the callback is busy is queued and handed over by the
//! outer call once the callback returns, in production order.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use core::cell::RefCell;

pub(crate) struct Notifier<T> {
    callback: RefCell<Box<dyn FnMut(T)>>,
    pending: RefCell<VecDeque<T>>,
}

impl<T> Notifier<T> {
    pub(crate) fn new(callback: impl FnMut(T) + 'static) -> Self {
        Self {
            callback: RefCell::new(Box::new(callback)),
            pending: RefCell::new(VecDeque::new()),
        }
    }

    /// Delivers `value`, or queues it if a delivery is already in progress.
    pub(crate) fn notify(&self, value: T) {
        self.pending.borrow_mut().push_back(value);
        // Busy: the outer `notify` further up the stack drains the queue.
        let Ok(mut callback) = self.callback.try_borrow_mut() else {
            return;
        };
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(value) = next else {
                break;
            };
            callback(value);
        }
    }

    /// Drops every queued value that has not been delivered yet.
    ///
    /// A delivery already running is unaffected, but nothing queued behind it
    /// reaches the callback.
    pub(crate) fn clear(&self) {
        self.pending.borrow_mut().clear();
    }
}

impl<T> core::fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Notifier")
            .field("pending", &self.pending.borrow().len())
            .finish_non_exhaustive()
    }
}
