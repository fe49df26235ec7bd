//! Line-oriented feature-vector output.
//!
//! Each call to `write_row` emits one sample: the vector's values separated
//! by single spaces and terminated by a newline. Opening files in append or
//! truncate mode is left to the caller.

use crate::util::HaarResult;
use std::io::Write;

/// Writes feature vectors one per line.
pub struct FeatureWriter<W> {
    inner: W,
    rows: usize,
}

impl<W: Write> FeatureWriter<W> {
    /// Wraps an output sink.
    pub fn new(inner: W) -> Self {
        Self { inner, rows: 0 }
    }

    /// Writes a single feature vector as one line.
    pub fn write_row(&mut self, values: &[f64]) -> HaarResult<()> {
        let mut line = String::with_capacity(values.len() * 12);
        for (idx, value) in values.iter().enumerate() {
            if idx > 0 {
                line.push(' ');
            }
            line.push_str(&value.to_string());
        }
        line.push('\n');
        self.inner.write_all(line.as_bytes())?;
        self.rows += 1;
        Ok(())
    }

    /// Writes every vector in order.
    pub fn write_rows<'a, I>(&mut self, rows: I) -> HaarResult<()>
    where
        I: IntoIterator<Item = &'a Vec<f64>>,
    {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Returns the number of rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flushes and returns the inner sink.
    pub fn into_inner(mut self) -> HaarResult<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}
