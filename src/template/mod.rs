//! Haar wavelet templates: congruent rectangles with signed weights.
//!
//! A `WaveletTemplate` is immutable once built. Construction checks that the
//! rectangles and weights pair up, that every rectangle shares one size, and
//! that no two rectangles start at the same position.

use crate::util::{HaarError, HaarResult};
use std::cmp::Ordering;
use std::fmt;

mod codec;
pub mod hash;
mod rect;

pub use codec::{read_templates, write_templates, TemplateReader};
pub use hash::CanonicalHasher;
pub use rect::Rect;

/// Ordered list of same-size rectangles with one weight each.
#[derive(Clone, Debug)]
pub struct WaveletTemplate {
    rects: Vec<Rect>,
    weights: Vec<f32>,
}

impl WaveletTemplate {
    /// Creates a template from rectangles and their weights.
    pub fn new(rects: Vec<Rect>, weights: Vec<f32>) -> HaarResult<Self> {
        if rects.len() != weights.len() {
            return Err(HaarError::InvalidTemplate {
                reason: "rectangle and weight counts differ",
            });
        }
        if let Some(first) = rects.first() {
            if rects.iter().any(|r| r.width == 0 || r.height == 0) {
                return Err(HaarError::InvalidTemplate {
                    reason: "rectangles must have non-zero size",
                });
            }
            if rects
                .iter()
                .any(|r| r.width != first.width || r.height != first.height)
            {
                return Err(HaarError::InvalidTemplate {
                    reason: "rectangles must share one size",
                });
            }
        }
        for (idx, rect) in rects.iter().enumerate() {
            if rects[..idx].iter().any(|r| r.position() == rect.position()) {
                return Err(HaarError::InvalidTemplate {
                    reason: "rectangles must not share a position",
                });
            }
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(HaarError::InvalidTemplate {
                reason: "weights must be finite",
            });
        }
        Ok(Self { rects, weights })
    }

    /// Creates a template from `(rect, weight)` pairs.
    pub fn from_pairs<I>(pairs: I) -> HaarResult<Self>
    where
        I: IntoIterator<Item = (Rect, f32)>,
    {
        let (rects, weights) = pairs.into_iter().unzip();
        Self::new(rects, weights)
    }

    /// Returns the number of rectangles.
    pub fn dimensions(&self) -> usize {
        self.rects.len()
    }

    /// Returns true for a template without rectangles.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Returns the rectangles in template order.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Returns the weights in template order.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Iterates over `(rect, weight)` pairs.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Rect, f32)> + '_ {
        self.rects.iter().zip(self.weights.iter().copied())
    }

    /// Returns the shared `(width, height)` of the rectangles.
    pub fn rect_size(&self) -> Option<(usize, usize)> {
        self.rects.first().map(|r| (r.width, r.height))
    }

    /// Returns true if every rectangle lies inside a square window.
    pub fn fits(&self, sample_size: usize) -> bool {
        self.rects
            .iter()
            .all(|r| r.fits_within(sample_size, sample_size))
    }

    /// Computes the canonical hash for a window of edge `sample_size`.
    ///
    /// Build a `CanonicalHasher` once when hashing many templates.
    pub fn canonical_hash(&self, sample_size: usize) -> HaarResult<u128> {
        CanonicalHasher::new(sample_size)?.hash(self)
    }

    /// Returns true if both templates cover the same set of rectangles,
    /// regardless of order and weights.
    pub fn same_geometry(&self, other: &Self) -> bool {
        if self.dimensions() != other.dimensions() {
            return false;
        }
        let mut lhs = self.rects.clone();
        let mut rhs = other.rects.clone();
        lhs.sort_unstable();
        rhs.sort_unstable();
        lhs == rhs
    }

    /// Orders templates by rectangle count only.
    pub fn cmp_dimension(&self, other: &Self) -> Ordering {
        self.dimensions().cmp(&other.dimensions())
    }

    /// Writes the canonical text encoding.
    ///
    /// Fails with `EmptyTemplate` without writing anything when the template
    /// has no rectangles.
    pub fn write<W: fmt::Write>(&self, sink: &mut W) -> HaarResult<()> {
        if self.is_empty() {
            return Err(HaarError::EmptyTemplate);
        }
        write!(sink, "{}", self.dimensions())?;
        for (rect, weight) in self.iter() {
            write!(
                sink,
                " {} {} {} {} {}",
                rect.x, rect.y, rect.width, rect.height, weight
            )?;
        }
        Ok(())
    }

    /// Writes the canonical text encoding to an `io::Write` sink.
    pub fn write_io<W: std::io::Write>(&self, sink: &mut W) -> HaarResult<()> {
        let mut text = String::new();
        self.write(&mut text)?;
        sink.write_all(text.as_bytes())?;
        Ok(())
    }

    fn sorted_pairs(&self) -> Vec<(Rect, f32)> {
        let mut pairs: Vec<_> = self.iter().map(|(r, w)| (*r, w)).collect();
        pairs.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        pairs
    }
}

/// Equal when the rectangle sets match and every rectangle keeps its weight.
impl PartialEq for WaveletTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.dimensions() == other.dimensions() && self.sorted_pairs() == other.sorted_pairs()
    }
}

impl fmt::Display for WaveletTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("0");
        }
        self.write(f).map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::{Rect, WaveletTemplate};
    use crate::util::HaarError;

    #[test]
    fn rejects_mismatched_lengths() {
        let err = WaveletTemplate::new(vec![Rect::new(0, 0, 3, 3)], vec![1.0, -1.0]).unwrap_err();
        assert_eq!(
            err,
            HaarError::InvalidTemplate {
                reason: "rectangle and weight counts differ",
            }
        );
    }

    #[test]
    fn rejects_mixed_sizes_and_shared_positions() {
        let mixed = WaveletTemplate::new(
            vec![Rect::new(0, 0, 3, 3), Rect::new(3, 0, 3, 4)],
            vec![1.0, -1.0],
        );
        assert!(mixed.is_err());

        let shared = WaveletTemplate::new(
            vec![Rect::new(0, 0, 3, 3), Rect::new(0, 0, 3, 3)],
            vec![1.0, -1.0],
        );
        assert_eq!(
            shared.unwrap_err(),
            HaarError::InvalidTemplate {
                reason: "rectangles must not share a position",
            }
        );
    }

    #[test]
    fn equality_is_order_independent_but_weight_sensitive() {
        let a = WaveletTemplate::from_pairs([
            (Rect::new(0, 0, 3, 3), 1.0),
            (Rect::new(3, 0, 3, 3), -1.0),
        ])
        .unwrap();
        let b = WaveletTemplate::from_pairs([
            (Rect::new(3, 0, 3, 3), -1.0),
            (Rect::new(0, 0, 3, 3), 1.0),
        ])
        .unwrap();
        let flipped = WaveletTemplate::from_pairs([
            (Rect::new(0, 0, 3, 3), -1.0),
            (Rect::new(3, 0, 3, 3), 1.0),
        ])
        .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, flipped);
        assert!(a.same_geometry(&flipped));
    }

    #[test]
    fn write_rejects_empty_template() {
        let empty = WaveletTemplate::new(Vec::new(), Vec::new()).unwrap();
        let mut out = String::new();
        assert_eq!(empty.write(&mut out), Err(HaarError::EmptyTemplate));
        assert!(out.is_empty());
        assert_eq!(empty.to_string(), "0");
    }

    #[test]
    fn write_uses_single_spaces() {
        let tpl = WaveletTemplate::from_pairs([
            (Rect::new(12, 0, 12, 12), 1.0),
            (Rect::new(0, 12, 12, 12), -1.0),
        ])
        .unwrap();
        assert_eq!(tpl.to_string(), "2 12 0 12 12 1 0 12 12 12 -1");
        assert_eq!(tpl.rect_size(), Some((12, 12)));
        assert!(tpl.fits(24));
        assert!(!tpl.fits(20));
    }
}
