//! Exhaustive generation of Haar wavelet templates.
//!
//! For every configured rectangle count the generator sweeps all rectangle
//! sizes `w x h` with `w >= min_rect_width` and `h >= min_rect_height`, all
//! first-rectangle corners, and all chains of integer-multiple displacements
//! between consecutive rectangles. Each candidate carries the alternating
//! weight pattern for its rectangle count. Equivalent geometries reached
//! through different paths collapse to the first one visited.
//!
//! Work is partitioned by rectangle size. With the `rayon` feature and
//! `with_parallel(true)` partitions run concurrently; they are merged in the
//! same order as the sequential sweep, so both paths return identical sets.

use crate::config::WindowConfig;
use crate::template::CanonicalHasher;
use crate::trace::{trace_event, trace_span};
use crate::util::{HaarError, HaarResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

mod set;
mod sweep;

pub use set::TemplateSet;
pub use sweep::SweepStats;

use sweep::Partition;

const WEIGHTS_2: [f32; 2] = [1.0, -1.0];
const WEIGHTS_3: [f32; 3] = [1.0, -1.0, 1.0];
const WEIGHTS_4: [f32; 4] = [1.0, -1.0, 1.0, -1.0];

/// Returns the weight pattern for templates with `dimensions` rectangles.
pub fn weights_for(dimensions: usize) -> Option<&'static [f32]> {
    match dimensions {
        2 => Some(&WEIGHTS_2),
        3 => Some(&WEIGHTS_3),
        4 => Some(&WEIGHTS_4),
        _ => None,
    }
}

/// Summary of a generation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Sweep counters summed over all partitions.
    pub sweep: SweepStats,
    /// Candidates merged into an existing geometry.
    pub duplicates: usize,
    /// Distinct geometries that shared a canonical hash.
    pub collisions: usize,
    /// Templates in the final set.
    pub templates: usize,
}

/// Enumerates deduplicated templates for one window configuration.
#[derive(Clone, Debug)]
pub struct TemplateGenerator<'a> {
    config: &'a WindowConfig,
    hasher: CanonicalHasher,
    parallel: bool,
}

impl<'a> TemplateGenerator<'a> {
    /// Validates `config` and prepares a generator.
    pub fn new(config: &'a WindowConfig) -> HaarResult<Self> {
        config.validate()?;
        let hasher = CanonicalHasher::new(config.sample_size)?;
        Ok(Self {
            config,
            hasher,
            parallel: false,
        })
    }

    /// Runs partitions on the rayon pool when the `rayon` feature is enabled.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the configuration this generator was built with.
    pub fn config(&self) -> &WindowConfig {
        self.config
    }

    /// Generates templates for every configured dimension, sorted by dimension.
    pub fn generate(&self) -> HaarResult<TemplateSet> {
        Ok(self.generate_with_stats()?.0)
    }

    /// Like `generate`, also returning run counters.
    pub fn generate_with_stats(&self) -> HaarResult<(TemplateSet, GenerationStats)> {
        let _span = trace_span!(
            "generate_templates",
            sample_size = self.config.sample_size,
            parallel = self.parallel
        )
        .entered();

        let mut out = TemplateSet::with_hasher(self.hasher.clone());
        let mut stats = GenerationStats::default();
        for &dims in &self.config.dimensions {
            let (set, sweep) = self.sweep_dimension(dims)?;
            stats.sweep.add(sweep);
            out.merge(set)?;
        }
        out.sort_by_dimension();

        stats.duplicates = out.duplicates();
        stats.collisions = out.collisions();
        stats.templates = out.len();
        trace_event!(
            "templates_generated",
            templates = stats.templates,
            candidates = stats.sweep.candidates,
            duplicates = stats.duplicates,
            collisions = stats.collisions,
        );
        Ok((out, stats))
    }

    /// Generates templates with exactly `dimensions` rectangles.
    pub fn generate_dimension(&self, dimensions: usize) -> HaarResult<TemplateSet> {
        Ok(self.sweep_dimension(dimensions)?.0)
    }

    fn sweep_dimension(&self, dimensions: usize) -> HaarResult<(TemplateSet, SweepStats)> {
        let weights = weights_for(dimensions).ok_or(HaarError::InvalidConfiguration {
            reason: "template dimensions must be 2, 3 or 4",
        })?;
        let _span = trace_span!("sweep_dimension", dimensions = dimensions).entered();

        let partitions = self.partitions(weights);
        let results = self.run_partitions(&partitions)?;

        let mut set = TemplateSet::with_hasher(self.hasher.clone());
        let mut stats = SweepStats::default();
        for (part, part_stats) in results {
            stats.add(part_stats);
            set.merge(part)?;
        }
        trace_event!(
            "dimension_swept",
            dimensions = dimensions,
            templates = set.len(),
            candidates = stats.candidates,
            overlaps = stats.overlaps,
        );
        Ok((set, stats))
    }

    fn partitions<'w>(&self, weights: &'w [f32]) -> Vec<Partition<'w>> {
        let size = self.config.sample_size;
        let mut partitions = Vec::new();
        for width in self.config.min_rect_width..=size {
            for height in self.config.min_rect_height..=size {
                partitions.push(Partition {
                    sample_size: size,
                    width,
                    height,
                    weights,
                });
            }
        }
        partitions
    }

    #[cfg(feature = "rayon")]
    fn run_partitions(
        &self,
        partitions: &[Partition<'_>],
    ) -> HaarResult<Vec<(TemplateSet, SweepStats)>> {
        if self.parallel {
            return partitions
                .par_iter()
                .map(|p| p.sweep(&self.hasher))
                .collect();
        }
        partitions.iter().map(|p| p.sweep(&self.hasher)).collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn run_partitions(
        &self,
        partitions: &[Partition<'_>],
    ) -> HaarResult<Vec<(TemplateSet, SweepStats)>> {
        partitions.iter().map(|p| p.sweep(&self.hasher)).collect()
    }
}
