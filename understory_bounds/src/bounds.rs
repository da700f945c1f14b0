// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Measured bounds and before/after change pairs.

use kurbo::{Point, Rect, Size, Vec2};

/// The axis-aligned on-screen box of a node, in viewport coordinates.
///
/// A `Bounds` is an immutable snapshot: every measurement produces a fresh
/// value. Two snapshots are equal only when all four fields are exactly equal;
/// there is no tolerance. A snapshot containing `NaN` never compares equal,
/// so it is always reported as a change.
///
/// ```
/// use understory_bounds::Bounds;
///
/// let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
/// let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
/// assert_eq!(a, b);
/// assert_ne!(a, Bounds::new(0.0, 0.0, 10.0, 10.000_001));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Bounds {
    /// Empty bounds at the origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates bounds from an origin and a size.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates bounds from a Kurbo rectangle.
    ///
    /// The rectangle is normalized first, so the width and height are never
    /// negative.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }

    /// Creates bounds from an origin point and a size.
    #[must_use]
    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Returns the top-left corner.
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns the width and height.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Converts to a Kurbo rectangle.
    #[must_use]
    pub fn to_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin(), self.size())
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

impl From<Bounds> for Rect {
    fn from(bounds: Bounds) -> Self {
        bounds.to_rect()
    }
}

/// A confirmed change in measured bounds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundsChange {
    /// The last bounds reported before this change.
    pub previous: Bounds,
    /// The freshly measured bounds.
    pub new: Bounds,
}

impl BoundsChange {
    /// Translation of the origin from `previous` to `new`.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.new.origin() - self.previous.origin()
    }

    /// Returns `true` if the origin moved.
    #[must_use]
    pub fn is_move(&self) -> bool {
        self.previous.x != self.new.x || self.previous.y != self.new.y
    }

    /// Returns `true` if the width or height changed.
    #[must_use]
    pub fn is_resize(&self) -> bool {
        self.previous.width != self.new.width || self.previous.height != self.new.height
    }
}
