//! Batch SRFS extraction over many samples.
//!
//! A sample whose integral table cannot hold the detector window is skipped
//! for every template and counted; the remaining samples keep their input
//! order in every per-template column.

use crate::config::WindowConfig;
use crate::eval::{FeatureVector, WaveletEvaluator};
use crate::image::integral::IntegralTable;
use crate::template::WaveletTemplate;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::HaarResult;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Features for a batch of samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractionReport {
    /// `features[t][s]` is the SRFS vector of template `t` on the `s`-th kept sample.
    pub features: Vec<Vec<FeatureVector>>,
    /// Input indices of the samples that were evaluated.
    pub kept: Vec<usize>,
    /// Number of samples skipped because binding failed.
    pub skipped: usize,
}

/// Evaluates a fixed template list against samples.
#[derive(Clone, Debug)]
pub struct SrfsExtractor<'a> {
    evaluators: Vec<WaveletEvaluator<'a>>,
    parallel: bool,
}

impl<'a> SrfsExtractor<'a> {
    /// Prepares evaluators for every template.
    ///
    /// Fails if a template does not fit the detector window.
    pub fn new(templates: &'a [WaveletTemplate], config: &'a WindowConfig) -> HaarResult<Self> {
        let evaluators = templates
            .iter()
            .map(|tpl| WaveletEvaluator::new(tpl, config))
            .collect::<HaarResult<Vec<_>>>()?;
        Ok(Self {
            evaluators,
            parallel: false,
        })
    }

    /// Evaluates samples on the rayon pool when the `rayon` feature is enabled.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the number of templates.
    pub fn num_templates(&self) -> usize {
        self.evaluators.len()
    }

    /// Computes the SRFS vector of every template for one sample.
    pub fn extract_sample(&self, table: &IntegralTable) -> HaarResult<Vec<FeatureVector>> {
        let mut rows = Vec::with_capacity(self.evaluators.len());
        for evaluator in &self.evaluators {
            rows.push(evaluator.bind(table)?.srfs());
        }
        Ok(rows)
    }

    /// Computes features for all samples, skipping those that fail to bind.
    pub fn extract(&self, tables: &[IntegralTable]) -> ExtractionReport {
        let _span = trace_span!(
            "extract_srfs",
            samples = tables.len(),
            templates = self.evaluators.len()
        )
        .entered();

        let per_sample = self.run(tables);

        let mut report = ExtractionReport {
            features: vec![Vec::with_capacity(tables.len()); self.evaluators.len()],
            ..ExtractionReport::default()
        };
        for (idx, result) in per_sample.into_iter().enumerate() {
            match result {
                Ok(rows) => {
                    for (column, row) in report.features.iter_mut().zip(rows) {
                        column.push(row);
                    }
                    report.kept.push(idx);
                }
                Err(err) => {
                    trace_warn!("sample_skipped", sample = idx, error = err.to_string().as_str());
                    report.skipped += 1;
                }
            }
        }

        trace_event!(
            "srfs_extracted",
            kept = report.kept.len(),
            skipped = report.skipped
        );
        report
    }

    #[cfg(feature = "rayon")]
    fn run(&self, tables: &[IntegralTable]) -> Vec<HaarResult<Vec<FeatureVector>>> {
        if self.parallel {
            return tables
                .par_iter()
                .map(|table| self.extract_sample(table))
                .collect();
        }
        tables
            .iter()
            .map(|table| self.extract_sample(table))
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn run(&self, tables: &[IntegralTable]) -> Vec<HaarResult<Vec<FeatureVector>>> {
        tables
            .iter()
            .map(|table| self.extract_sample(table))
            .collect()
    }
}

/// Extracts SRFS features for `templates` over `tables` sequentially.
pub fn extract_srfs(
    templates: &[WaveletTemplate],
    tables: &[IntegralTable],
    config: &WindowConfig,
) -> HaarResult<ExtractionReport> {
    Ok(SrfsExtractor::new(templates, config)?.extract(tables))
}
