//! Evaluation of wavelet templates against integral tables.
//!
//! `WaveletEvaluator` is the unbound state: a template checked against the
//! detector window. `bind`/`bind_at` attach an integral table and a window
//! offset, producing a `BoundWavelet` that answers `value()` and `srfs()`.
//! Neither step touches the template or the table, so any number of bound
//! evaluators may share them across threads.

use crate::config::{SrfsNormalization, WindowConfig};
use crate::image::integral::IntegralTable;
use crate::template::{Rect, WaveletTemplate};
use crate::util::{HaarError, HaarResult};

pub mod extract;
pub mod output;

/// Per-rectangle SRFS values in template order.
pub type FeatureVector = Vec<f64>;

/// A template validated against a detector window, not yet bound to data.
#[derive(Clone, Copy, Debug)]
pub struct WaveletEvaluator<'a> {
    template: &'a WaveletTemplate,
    config: &'a WindowConfig,
}

impl<'a> WaveletEvaluator<'a> {
    /// Checks that every rectangle of `template` lies inside the window.
    pub fn new(template: &'a WaveletTemplate, config: &'a WindowConfig) -> HaarResult<Self> {
        if !template.fits(config.sample_size) {
            return Err(HaarError::InvalidTemplate {
                reason: "template does not fit the detector window",
            });
        }
        Ok(Self { template, config })
    }

    /// Returns the template being evaluated.
    pub fn template(&self) -> &'a WaveletTemplate {
        self.template
    }

    /// Binds to `table` with the window at the image origin.
    pub fn bind(&self, table: &'a IntegralTable) -> HaarResult<BoundWavelet<'a>> {
        self.bind_at(table, (0, 0))
    }

    /// Binds to `table` with the window's top-left corner at `offset`.
    ///
    /// Fails with `ImageTooSmall` if the window does not fit the image there.
    pub fn bind_at(
        &self,
        table: &'a IntegralTable,
        offset: (usize, usize),
    ) -> HaarResult<BoundWavelet<'a>> {
        let window = self.config.sample_size;
        let window_rect = Rect::new(offset.0, offset.1, window, window);
        if !table.contains(&window_rect) {
            return Err(HaarError::ImageTooSmall {
                x: offset.0,
                y: offset.1,
                window,
                img_width: table.width(),
                img_height: table.height(),
            });
        }
        Ok(BoundWavelet {
            template: self.template,
            table,
            offset,
            srfs: self.config.srfs,
        })
    }
}

/// A template bound to an integral table at a fixed window offset.
#[derive(Clone, Copy, Debug)]
pub struct BoundWavelet<'a> {
    template: &'a WaveletTemplate,
    table: &'a IntegralTable,
    offset: (usize, usize),
    srfs: SrfsNormalization,
}

impl<'a> BoundWavelet<'a> {
    /// Returns the number of rectangles.
    pub fn dimensions(&self) -> usize {
        self.template.dimensions()
    }

    /// Returns the window offset inside the image.
    pub fn offset(&self) -> (usize, usize) {
        self.offset
    }

    #[inline]
    fn sum_at(&self, rect: &Rect) -> i64 {
        self.table
            .rectangle_sum(&rect.offset(self.offset.0, self.offset.1))
    }

    /// Returns the raw pixel sum of each rectangle.
    pub fn rectangle_sums(&self) -> Vec<i64> {
        self.template
            .rects()
            .iter()
            .map(|rect| self.sum_at(rect))
            .collect()
    }

    /// Returns the weighted Haar response `sum(weight_i * rect_sum_i)`.
    pub fn value(&self) -> f64 {
        self.template
            .iter()
            .map(|(rect, weight)| f64::from(weight) * self.sum_at(rect) as f64)
            .sum()
    }

    /// Returns the SRFS vector, one normalized mean per rectangle.
    pub fn srfs(&self) -> FeatureVector {
        let mut out = Vec::with_capacity(self.dimensions());
        self.srfs_into(&mut out);
        out
    }

    /// Writes the SRFS vector into `out`, replacing its contents.
    pub fn srfs_into(&self, out: &mut Vec<f64>) {
        out.clear();
        let max_intensity = self.srfs.max_intensity();
        let signed = self.srfs.is_signed();
        for (rect, weight) in self.template.iter() {
            let mean = self.sum_at(rect) as f64 / rect.area() as f64;
            let mut value = mean / max_intensity;
            if signed {
                value *= f64::from(weight);
            }
            out.push(value);
        }
    }
}
