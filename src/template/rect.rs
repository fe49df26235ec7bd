//! Axis-aligned integer rectangles in window coordinates.

/// Axis-aligned rectangle with its top-left corner at `(x, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    /// Creates a rectangle from its corner and size.
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the number of pixels covered.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Returns the exclusive right edge.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Returns the exclusive bottom edge.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// Returns true if the rectangle lies inside a `width x height` area.
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        self.x
            .checked_add(self.width)
            .is_some_and(|right| right <= width)
            && self
                .y
                .checked_add(self.height)
                .is_some_and(|bottom| bottom <= height)
    }

    /// Translates the rectangle by a window offset.
    pub fn offset(&self, dx: usize, dy: usize) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Returns the top-left corner.
    pub fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::Rect;

    #[test]
    fn fits_within_is_inclusive_of_edges() {
        let rect = Rect::new(3, 0, 3, 6);
        assert!(rect.fits_within(6, 6));
        assert!(!rect.fits_within(5, 6));
        assert!(!Rect::new(usize::MAX, 0, 1, 1).fits_within(6, 6));
    }

    #[test]
    fn offset_keeps_size() {
        let rect = Rect::new(1, 2, 3, 4).offset(10, 20);
        assert_eq!(rect, Rect::new(11, 22, 3, 4));
        assert_eq!(rect.area(), 12);
        assert_eq!((rect.right(), rect.bottom()), (14, 26));
    }
}
