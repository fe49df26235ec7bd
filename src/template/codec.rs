//! Line-oriented text encoding for template files.
//!
//! One template per line:
//! `<dimensions> <x1> <y1> <w1> <h1> <weight1> <x2> ...`
//! Tokens are whitespace separated. Blank lines are ignored.

use crate::template::{Rect, WaveletTemplate};
use crate::util::{HaarError, HaarResult};
use std::io::{BufRead, Write};
use std::str::FromStr;

const FIELDS_PER_RECT: usize = 5;

fn parse_error(line: usize, reason: impl Into<String>) -> HaarError {
    HaarError::ParseError {
        line,
        reason: reason.into(),
    }
}

fn parse_field<T: FromStr>(line: usize, token: &str, what: &str) -> HaarResult<T> {
    token
        .parse()
        .map_err(|_| parse_error(line, format!("invalid {what} `{token}`")))
}

/// Parses a single record, reporting errors against `line`.
pub(crate) fn parse_record(text: &str, line: usize) -> HaarResult<WaveletTemplate> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let (&head, fields) = tokens
        .split_first()
        .ok_or_else(|| parse_error(line, "empty record"))?;
    let dims: usize = parse_field(line, head, "dimension count")?;
    let expected = dims
        .checked_mul(FIELDS_PER_RECT)
        .ok_or_else(|| parse_error(line, "dimension count overflows"))?;
    if fields.len() != expected {
        return Err(parse_error(
            line,
            format!(
                "expected {} fields for {dims} rectangles, found {}",
                expected,
                fields.len()
            ),
        ));
    }

    let mut rects = Vec::with_capacity(dims);
    let mut weights = Vec::with_capacity(dims);
    for chunk in fields.chunks_exact(FIELDS_PER_RECT) {
        let x = parse_field(line, chunk[0], "x")?;
        let y = parse_field(line, chunk[1], "y")?;
        let width = parse_field(line, chunk[2], "width")?;
        let height = parse_field(line, chunk[3], "height")?;
        let weight: f32 = parse_field(line, chunk[4], "weight")?;
        if !weight.is_finite() {
            return Err(parse_error(line, format!("invalid weight `{}`", chunk[4])));
        }
        rects.push(Rect::new(x, y, width, height));
        weights.push(weight);
    }

    WaveletTemplate::new(rects, weights).map_err(|err| parse_error(line, err.to_string()))
}

impl FromStr for WaveletTemplate {
    type Err = HaarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_record(s, 1)
    }
}

/// Iterator over the records of a template file.
///
/// Each item is the result for one non-blank line, so callers can decide
/// whether a malformed record aborts the load or is skipped. An I/O error
/// is yielded once and ends the iteration.
pub struct TemplateReader<R> {
    input: R,
    line: usize,
    buf: String,
    done: bool,
}

impl<R: BufRead> TemplateReader<R> {
    /// Wraps a buffered reader.
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: 0,
            buf: String::new(),
            done: false,
        }
    }

    /// Returns the 1-based number of the last line read.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for TemplateReader<R> {
    type Item = HaarResult<WaveletTemplate>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.input.read_line(&mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line += 1;
                    if self.buf.trim().is_empty() {
                        continue;
                    }
                    return Some(parse_record(&self.buf, self.line));
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err.into()));
                }
            }
        }
        None
    }
}

/// Reads every template, failing on the first malformed record.
pub fn read_templates<R: BufRead>(input: R) -> HaarResult<Vec<WaveletTemplate>> {
    TemplateReader::new(input).collect()
}

/// Writes templates one per line and returns how many were written.
pub fn write_templates<'a, W, I>(mut output: W, templates: I) -> HaarResult<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a WaveletTemplate>,
{
    let mut count = 0usize;
    let mut line = String::new();
    for tpl in templates {
        line.clear();
        tpl.write(&mut line)?;
        line.push('\n');
        output.write_all(line.as_bytes())?;
        count += 1;
    }
    output.flush()?;
    Ok(count)
}
