//! Summed-area tables with a one-pixel zero border.
//!
//! For an image of `width x height` pixels the tables hold
//! `(width + 1) * (height + 1)` cells in row-major order, where cell `(x, y)`
//! is the sum of all pixels strictly above and left of it. Row 0 and column 0
//! are zero, so any rectangle sum needs exactly four lookups.

use crate::image::ImageView;
use crate::template::Rect;
use crate::util::{HaarError, HaarResult};

/// Mean and standard deviation of the pixels under a rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// First-order and optional second-order summed-area tables.
#[derive(Clone, Debug)]
pub struct IntegralTable {
    width: usize,
    height: usize,
    sum: Vec<i64>,
    sqsum: Option<Vec<i64>>,
}

impl IntegralTable {
    /// Integrates a grayscale image into sum and squared-sum tables.
    pub fn from_view(img: ImageView<'_, u8>) -> HaarResult<Self> {
        let width = img.width();
        let height = img.height();
        let stride = width + 1;
        let cells = stride
            .checked_mul(height + 1)
            .ok_or(HaarError::InvalidDimensions { width, height })?;
        let mut sum = vec![0i64; cells];
        let mut sqsum = vec![0i64; cells];

        for y in 0..height {
            let row = img.row(y).ok_or(HaarError::BufferTooSmall {
                needed: (y + 1) * img.stride(),
                got: y * img.stride(),
            })?;
            let mut row_sum = 0i64;
            let mut row_sq = 0i64;
            let base = (y + 1) * stride;
            for (x, &pixel) in row.iter().enumerate() {
                let v = i64::from(pixel);
                row_sum += v;
                row_sq += v * v;
                let idx = base + x + 1;
                sum[idx] = sum[idx - stride] + row_sum;
                sqsum[idx] = sqsum[idx - stride] + row_sq;
            }
        }

        Ok(Self {
            width,
            height,
            sum,
            sqsum: Some(sqsum),
        })
    }

    /// Wraps precomputed tables for an image of `width x height` pixels.
    ///
    /// Each table must hold `(width + 1) * (height + 1)` cells with a zero
    /// first row and column.
    pub fn from_parts(
        sum: Vec<i64>,
        sqsum: Option<Vec<i64>>,
        width: usize,
        height: usize,
    ) -> HaarResult<Self> {
        if width == 0 || height == 0 {
            return Err(HaarError::InvalidDimensions { width, height });
        }
        let cells = (width + 1)
            .checked_mul(height + 1)
            .ok_or(HaarError::InvalidDimensions { width, height })?;
        for table in std::iter::once(&sum).chain(sqsum.as_ref()) {
            if table.len() < cells {
                return Err(HaarError::BufferTooSmall {
                    needed: cells,
                    got: table.len(),
                });
            }
            if table.len() > cells {
                return Err(HaarError::InvalidDimensions { width, height });
            }
        }
        Ok(Self {
            width,
            height,
            sum,
            sqsum,
        })
    }

    /// Fails with `DimensionMismatch` if the table cannot hold a square window.
    pub fn ensure_covers(&self, sample_size: usize) -> HaarResult<()> {
        if self.width < sample_size || self.height < sample_size {
            return Err(HaarError::DimensionMismatch {
                expected_width: sample_size,
                expected_height: sample_size,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Returns the width of the integrated image in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the integrated image in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns true if the second-order table is present.
    pub fn has_square_sum(&self) -> bool {
        self.sqsum.is_some()
    }

    /// Returns true if `rect` lies inside the integrated image.
    pub fn contains(&self, rect: &Rect) -> bool {
        rect.fits_within(self.width, self.height)
    }

    /// Sums the pixels under `rect`.
    ///
    /// The caller guarantees `rect` lies inside the image; see
    /// `checked_rectangle_sum` for a bounds-checked variant.
    #[inline]
    pub fn rectangle_sum(&self, rect: &Rect) -> i64 {
        debug_assert!(self.contains(rect));
        four_corner_sum(&self.sum, self.width + 1, rect)
    }

    /// Sums the pixels under `rect`, or `None` if it leaves the image.
    pub fn checked_rectangle_sum(&self, rect: &Rect) -> Option<i64> {
        self.contains(rect)
            .then(|| four_corner_sum(&self.sum, self.width + 1, rect))
    }

    /// Sums the squared pixels under `rect`.
    pub fn rectangle_square_sum(&self, rect: &Rect) -> Option<i64> {
        let sqsum = self.sqsum.as_ref()?;
        self.contains(rect)
            .then(|| four_corner_sum(sqsum, self.width + 1, rect))
    }

    /// Returns the mean and standard deviation of the pixels under `rect`.
    pub fn window_stats(&self, rect: &Rect) -> Option<WindowStats> {
        if rect.area() == 0 {
            return None;
        }
        let sq = self.rectangle_square_sum(rect)? as f64;
        let area = rect.area() as f64;
        let mean = self.rectangle_sum(rect) as f64 / area;
        let variance = (sq / area - mean * mean).max(0.0);
        Some(WindowStats {
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

#[inline]
fn four_corner_sum(table: &[i64], stride: usize, rect: &Rect) -> i64 {
    let x_w = rect.x + rect.width;
    let y_h = rect.y + rect.height;
    table[rect.y * stride + rect.x] - table[rect.y * stride + x_w] - table[y_h * stride + rect.x]
        + table[y_h * stride + x_w]
}

#[cfg(test)]
mod tests {
    use super::IntegralTable;
    use crate::image::{ImageView, OwnedImage};
    use crate::template::Rect;
    use crate::util::HaarError;

    #[test]
    fn builds_zero_bordered_table() {
        let data = [1u8, 0, 1, 0, 0, 2, 0, 0, 0, 0, 3, 0, 1, 0, 0];
        let view = ImageView::from_slice(&data, 5, 3).unwrap();
        let table = IntegralTable::from_view(view).unwrap();
        assert_eq!(table.sum[..6], [0i64; 6]);
        assert_eq!(table.rectangle_sum(&Rect::new(0, 0, 5, 3)), 8);
        assert_eq!(table.rectangle_sum(&Rect::new(0, 0, 1, 2)), 3);
        assert_eq!(table.rectangle_sum(&Rect::new(2, 0, 1, 3)), 2);
        assert_eq!(table.rectangle_square_sum(&Rect::new(0, 0, 1, 3)), Some(14));
    }

    #[test]
    fn checked_sum_rejects_out_of_bounds() {
        let img = OwnedImage::filled(1, 4, 4).unwrap();
        let table = IntegralTable::from_view(img.view()).unwrap();
        assert_eq!(table.checked_rectangle_sum(&Rect::new(1, 1, 3, 3)), Some(9));
        assert_eq!(table.checked_rectangle_sum(&Rect::new(2, 2, 3, 3)), None);
    }

    #[test]
    fn window_stats_matches_direct_computation() {
        let data = [0u8, 2, 4, 6];
        let view = ImageView::from_slice(&data, 2, 2).unwrap();
        let table = IntegralTable::from_view(view).unwrap();
        let stats = table.window_stats(&Rect::new(0, 0, 2, 2)).unwrap();
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert!((stats.std_dev - 5.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn from_parts_validates_lengths() {
        let err = IntegralTable::from_parts(vec![0; 8], None, 2, 2).unwrap_err();
        assert_eq!(err, HaarError::BufferTooSmall { needed: 9, got: 8 });
        let err = IntegralTable::from_parts(vec![0; 10], None, 2, 2).unwrap_err();
        assert_eq!(err, HaarError::InvalidDimensions { width: 2, height: 2 });
        let err = IntegralTable::from_parts(vec![0; 9], Some(vec![0; 4]), 2, 2).unwrap_err();
        assert_eq!(err, HaarError::BufferTooSmall { needed: 9, got: 4 });
        let err = IntegralTable::from_parts(Vec::new(), None, 0, 2).unwrap_err();
        assert_eq!(err, HaarError::InvalidDimensions { width: 0, height: 2 });
        let table = IntegralTable::from_parts(vec![0; 9], None, 2, 2).unwrap();
        assert!(!table.has_square_sum());
        assert!(table.window_stats(&Rect::new(0, 0, 1, 1)).is_none());
    }

    #[test]
    fn ensure_covers_reports_mismatch() {
        let img = OwnedImage::filled(0, 10, 12).unwrap();
        let table = IntegralTable::from_view(img.view()).unwrap();
        assert!(table.ensure_covers(10).is_ok());
        assert_eq!(
            table.ensure_covers(20),
            Err(HaarError::DimensionMismatch {
                expected_width: 20,
                expected_height: 20,
                width: 10,
                height: 12,
            })
        );
    }
}
