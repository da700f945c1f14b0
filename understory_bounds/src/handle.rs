// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cancellation handles and their composition.
//!
//! A [`Handle`] releases every resource tied to one observation activity.
//! Handles compose: [`Handle::combine`] joins two handles, and [`Handle::all`]
//! folds any number of them, so a whole tree of subscriptions can be torn down
//! through a single root handle.
//!
//! Release is fail-safe. Every constituent is attempted, in order, even if an
//! earlier one fails. The first [`ReleaseError`] is surfaced once all of them
//! have run; later failures are only counted.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use understory_bounds::Handle;
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let h = |name: &'static str| {
//!     let log = log.clone();
//!     Handle::from_fn(move || log.borrow_mut().push(name))
//! };
//!
//! let mut root = Handle::combine(h("a"), Handle::combine(h("b"), h("c")));
//! root.cancel().unwrap();
//! // Cancelling again is a no-op.
//! root.cancel().unwrap();
//! assert_eq!(*log.borrow(), ["a", "b", "c"]);
//! ```

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::node::SignalKind;

type Release = Box<dyn FnOnce() -> Result<(), ReleaseError>>;

/// A capability to release all resources tied to one observation activity.
///
/// Cancelling is synchronous: once [`Handle::cancel`] returns, no callback
/// registered through this handle fires again. It is also idempotent; only
/// the first call does any work.
///
/// Dropping a handle that has not been cancelled cancels it. Any error raised
/// during that implicit release is discarded, so callers that need to observe
/// release failures should call [`Handle::cancel`] explicitly.
#[must_use = "dropping a `Handle` cancels it immediately"]
pub struct Handle {
    release: Option<Release>,
}

impl Handle {
    /// Creates a handle from a fallible release operation.
    pub fn new(release: impl FnOnce() -> Result<(), ReleaseError> + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Creates a handle from a release operation that cannot fail.
    pub fn from_fn(release: impl FnOnce() + 'static) -> Self {
        Self::new(move || {
            release();
            Ok(())
        })
    }

    /// A handle with nothing to release.
    pub const fn noop() -> Self {
        Self { release: None }
    }

    /// Joins two handles into one.
    ///
    /// Releasing the result releases `first`, then `second`. Both are always
    /// attempted; if both fail, the error from `first` is returned.
    pub fn combine(first: Self, second: Self) -> Self {
        match (first.is_active(), second.is_active()) {
            (false, _) => second,
            (_, false) => first,
            (true, true) => Self::all([first, second]),
        }
    }

    /// Folds a sequence of handles into one, releasing them in iteration order.
    ///
    /// Already-inactive handles are skipped. Release is a flat loop over the
    /// collected handles, so arbitrarily long sequences do not nest.
    pub fn all(handles: impl IntoIterator<Item = Self>) -> Self {
        let mut handles: Vec<Self> = handles.into_iter().filter(Self::is_active).collect();
        match handles.len() {
            0 => Self::noop(),
            1 => handles.pop().unwrap_or_else(Self::noop),
            _ => Self::new(move || release_in_order(&mut handles)),
        }
    }

    /// Releases everything this handle covers.
    ///
    /// The first call runs the release operation and returns its result. Every
    /// later call returns `Ok(())` without doing anything.
    pub fn cancel(&mut self) -> Result<(), ReleaseError> {
        match self.release.take() {
            Some(release) => release(),
            None => Ok(()),
        }
    }

    /// Returns `true` until the handle has been cancelled.
    ///
    /// [`Handle::noop`] is never active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }
}

fn release_in_order(handles: &mut [Handle]) -> Result<(), ReleaseError> {
    let mut first_error: Option<ReleaseError> = None;
    for handle in handles {
        if let Err(err) = handle.cancel() {
            match &mut first_error {
                Some(first) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %err, "suppressed release error");
                    first.suppressed += 1 + err.suppressed;
                }
                None => first_error = Some(err),
            }
        }
    }
    first_error.map_or(Ok(()), Err)
}

impl Default for Handle {
    fn default() -> Self {
        Self::noop()
    }
}

impl FromIterator<Self> for Handle {
    fn from_iter<I: IntoIterator<Item = Self>>(iter: I) -> Self {
        Self::all(iter)
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if let Err(_err) = self.cancel() {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, "release failed while dropping handle");
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

/// A failure reported by a host while releasing a subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseError {
    message: Cow<'static, str>,
    signal: Option<SignalKind>,
    suppressed: usize,
}

impl ReleaseError {
    /// Creates an error with a human readable reason.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            signal: None,
            suppressed: 0,
        }
    }

    /// Records which kind of subscription failed to release.
    #[must_use]
    pub fn with_signal(mut self, signal: SignalKind) -> Self {
        self.signal = Some(signal);
        self
    }

    /// The reason given by the host.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The kind of subscription that failed, if known.
    #[must_use]
    pub fn signal(&self) -> Option<SignalKind> {
        self.signal
    }

    /// How many further release failures were swallowed behind this one.
    #[must_use]
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }
}

impl fmt::Display for ReleaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.signal {
            Some(signal) => write!(f, "failed to release {signal} subscription: {}", self.message)?,
            None => write!(f, "failed to release subscription: {}", self.message)?,
        }
        if self.suppressed > 0 {
            write!(f, " ({} more release errors suppressed)", self.suppressed)?;
        }
        Ok(())
    }
}

impl core::error::Error for ReleaseError {}
