//! Rectangle arithmetic on the shared display surface.
//!
//! Every drawing order, invalidate request and overlay region in the session
//! layer is expressed as a [`Rect`] in surface pixel coordinates, with the
//! origin at the top-left corner of the client display.
//!
//! # Why `subtract`? (for beginners)
//!
//! While the on-screen display is visible, the active module keeps drawing.
//! Its orders must not paint over the banner, so a fill that crosses the
//! banner is split into the (at most four) pieces that lie *around* it:
//!
//! ```text
//! +-------------------------+
//! |          top            |
//! +-------+---------+-------+
//! | left  | banner  | right |
//! +-------+---------+-------+
//! |         bottom          |
//! +-------------------------+
//! ```

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in surface coordinates.
///
/// `x` and `y` are the top-left corner.  A rectangle with zero width or zero
/// height is *empty* and covers no pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the top-left corner (may be negative).
    pub x: i32,
    /// Y coordinate of the top-left corner (may be negative).
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The empty rectangle at the origin.
    pub const fn empty() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Returns the rightmost X coordinate (exclusive).
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width as i32)
    }

    /// Returns the bottommost Y coordinate (exclusive).
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height as i32)
    }

    /// Returns `true` if the rectangle covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the pixel at (`px`, `py`) lies inside the rectangle.
    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Returns `true` if every pixel of `other` lies inside `self`.
    ///
    /// An empty `other` is contained in anything.
    pub fn contains(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// Returns `true` if this rectangle shares at least one pixel with `other`.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Returns the common area of `self` and `other`.
    ///
    /// The result is [`Rect::empty`] when the two do not overlap.
    pub fn intersect(&self, other: &Rect) -> Rect {
        if !self.overlaps(other) {
            return Rect::empty();
        }
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect::new(left, top, (right - left) as u32, (bottom - top) as u32)
    }

    /// Returns the pieces of `self` that lie outside `hole`.
    ///
    /// At most four rectangles are produced (top band, bottom band, left and
    /// right slices of the middle band).  They never overlap each other and
    /// together cover exactly `self` minus `hole`.
    pub fn subtract(&self, hole: &Rect) -> Vec<Rect> {
        let cut = self.intersect(hole);
        if cut.is_empty() {
            return if self.is_empty() { Vec::new() } else { vec![*self] };
        }

        let mut pieces = Vec::with_capacity(4);
        if cut.y > self.y {
            pieces.push(Rect::new(self.x, self.y, self.width, (cut.y - self.y) as u32));
        }
        if cut.bottom() < self.bottom() {
            pieces.push(Rect::new(
                self.x,
                cut.bottom(),
                self.width,
                (self.bottom() - cut.bottom()) as u32,
            ));
        }
        if cut.x > self.x {
            pieces.push(Rect::new(self.x, cut.y, (cut.x - self.x) as u32, cut.height));
        }
        if cut.right() < self.right() {
            pieces.push(Rect::new(
                cut.right(),
                cut.y,
                (self.right() - cut.right()) as u32,
                cut.height,
            ));
        }
        pieces
    }

    /// Returns a copy shrunk by `d` pixels on every side.
    ///
    /// Shrinking past the centre yields an empty rectangle.
    pub fn shrink(&self, d: u32) -> Rect {
        let w = self.width.saturating_sub(d.saturating_mul(2));
        let h = self.height.saturating_sub(d.saturating_mul(2));
        if w == 0 || h == 0 {
            return Rect::empty();
        }
        Rect::new(self.x + d as i32, self.y + d as i32, w, h)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
