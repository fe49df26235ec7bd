//! haarsrfs enumerates Haar wavelet templates for detector training and
//! evaluates them on summed-area tables.
//!
//! `TemplateGenerator` sweeps every admissible 2-, 3- and 4-rectangle template
//! inside a detector window and keeps one representative per geometry.
//! `WaveletEvaluator` binds a template to an `IntegralTable` and computes the
//! weighted Haar response and the single rectangle feature space (SRFS)
//! vector. Optional parallelism is available via the `rayon` feature and
//! image loading via `image-io`.

pub mod config;
pub mod eval;
pub mod generate;
pub mod image;
pub mod template;
mod trace;
pub mod util;

pub use config::{SrfsNormalization, WindowConfig};
pub use eval::extract::{extract_srfs, ExtractionReport, SrfsExtractor};
pub use eval::output::FeatureWriter;
pub use eval::{BoundWavelet, FeatureVector, WaveletEvaluator};
pub use generate::{weights_for, GenerationStats, SweepStats, TemplateGenerator, TemplateSet};
#[cfg(feature = "image-io")]
pub use crate::image::io;
pub use crate::image::integral::{IntegralTable, WindowStats};
pub use crate::image::{ImageView, OwnedImage};
pub use template::{
    read_templates, write_templates, CanonicalHasher, Rect, TemplateReader, WaveletTemplate,
};
pub use util::{HaarError, HaarResult};
