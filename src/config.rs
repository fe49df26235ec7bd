//! Detector window configuration shared by generation and evaluation.
//!
//! A `WindowConfig` is built once, validated, and then passed by reference
//! into `TemplateGenerator` and `WaveletEvaluator`. Nothing mutates it after
//! setup.

use crate::template::hash::CanonicalHasher;
use crate::util::{HaarError, HaarResult};

/// Rectangle counts a template may have.
pub const SUPPORTED_DIMENSIONS: [usize; 3] = [2, 3, 4];

/// Default detector window edge length in pixels.
pub const DEFAULT_SAMPLE_SIZE: usize = 20;

/// Default minimum rectangle width and height in pixels.
pub const DEFAULT_MIN_RECT: usize = 3;

/// How `srfs()` scales per-rectangle sums.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SrfsNormalization {
    /// Mean intensity per rectangle divided by `max_intensity`.
    ///
    /// Elements lie in `[0, 1]` when pixels lie in `[0, max_intensity]`.
    UnsignedMean { max_intensity: f64 },
    /// Same as `UnsignedMean`, multiplied by the rectangle weight.
    SignedMean { max_intensity: f64 },
}

impl SrfsNormalization {
    /// Normalization for 8-bit grayscale samples.
    pub const U8: SrfsNormalization = SrfsNormalization::UnsignedMean {
        max_intensity: u8::MAX as f64,
    };

    /// Returns the maximum pixel intensity used as the divisor.
    pub fn max_intensity(&self) -> f64 {
        match *self {
            SrfsNormalization::UnsignedMean { max_intensity }
            | SrfsNormalization::SignedMean { max_intensity } => max_intensity,
        }
    }

    /// Returns true when weights are applied to SRFS elements.
    pub fn is_signed(&self) -> bool {
        matches!(self, SrfsNormalization::SignedMean { .. })
    }
}

impl Default for SrfsNormalization {
    fn default() -> Self {
        Self::U8
    }
}

/// Immutable description of the detector window and template constraints.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowConfig {
    /// Edge length of the square detector window.
    pub sample_size: usize,
    /// Minimum rectangle width.
    pub min_rect_width: usize,
    /// Minimum rectangle height.
    pub min_rect_height: usize,
    /// Rectangle counts to generate, a subset of `{2, 3, 4}`.
    pub dimensions: Vec<usize>,
    /// SRFS normalization convention.
    pub srfs: SrfsNormalization,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            min_rect_width: DEFAULT_MIN_RECT,
            min_rect_height: DEFAULT_MIN_RECT,
            dimensions: SUPPORTED_DIMENSIONS.to_vec(),
            srfs: SrfsNormalization::default(),
        }
    }
}

impl WindowConfig {
    /// Creates a configuration for a square window with a square minimum rectangle.
    pub fn new(sample_size: usize, min_rect: usize) -> Self {
        Self {
            sample_size,
            min_rect_width: min_rect,
            min_rect_height: min_rect,
            ..Self::default()
        }
    }

    /// Restricts generation to the given rectangle counts.
    pub fn with_dimensions(mut self, dimensions: &[usize]) -> Self {
        self.dimensions = dimensions.to_vec();
        self
    }

    /// Sets the minimum rectangle size.
    pub fn with_min_rect(mut self, width: usize, height: usize) -> Self {
        self.min_rect_width = width;
        self.min_rect_height = height;
        self
    }

    /// Sets the SRFS normalization convention.
    pub fn with_srfs(mut self, srfs: SrfsNormalization) -> Self {
        self.srfs = srfs;
        self
    }

    /// Checks that the parameters describe a usable window.
    pub fn validate(&self) -> HaarResult<()> {
        if self.sample_size == 0 {
            return Err(HaarError::InvalidConfiguration {
                reason: "sample_size must be > 0",
            });
        }
        if self.min_rect_width == 0 || self.min_rect_height == 0 {
            return Err(HaarError::InvalidConfiguration {
                reason: "minimum rectangle size must be > 0",
            });
        }
        if self.min_rect_width > self.sample_size || self.min_rect_height > self.sample_size {
            return Err(HaarError::InvalidConfiguration {
                reason: "minimum rectangle does not fit the window",
            });
        }
        if self.dimensions.is_empty() {
            return Err(HaarError::InvalidConfiguration {
                reason: "at least one template dimension is required",
            });
        }
        if self
            .dimensions
            .iter()
            .any(|k| !SUPPORTED_DIMENSIONS.contains(k))
        {
            return Err(HaarError::InvalidConfiguration {
                reason: "template dimensions must be 2, 3 or 4",
            });
        }
        let max_intensity = self.srfs.max_intensity();
        if !max_intensity.is_finite() || max_intensity <= 0.0 {
            return Err(HaarError::InvalidConfiguration {
                reason: "max_intensity must be finite and > 0",
            });
        }
        CanonicalHasher::new(self.sample_size)?;
        Ok(())
    }
}
