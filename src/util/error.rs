//! Error types for haarsrfs.

use thiserror::Error;

/// Result alias for haarsrfs operations.
pub type HaarResult<T> = std::result::Result<T, HaarError>;

/// Errors that can occur while generating or evaluating Haar wavelets.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum HaarError {
    /// Window or minimum rectangle parameters cannot be used together.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: &'static str },
    /// Rectangles and weights do not describe a valid template.
    #[error("invalid template: {reason}")]
    InvalidTemplate { reason: &'static str },
    /// A template record could not be parsed.
    #[error("parse error on line {line}: {reason}")]
    ParseError { line: usize, reason: String },
    /// Zero-rectangle templates cannot be serialized.
    #[error("refusing to write a template without rectangles")]
    EmptyTemplate,
    /// The integral table does not have the declared or required size.
    #[error(
        "integral table mismatch: expected at least {expected_width}x{expected_height}, got {width}x{height}"
    )]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
    /// The image behind an integral table cannot hold the detector window.
    #[error(
        "image {img_width}x{img_height} is too small for a {window}x{window} window at ({x}, {y})"
    )]
    ImageTooSmall {
        x: usize,
        y: usize,
        window: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Width or height is zero or overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The backing buffer is shorter than the view requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Reading or writing a stream failed.
    #[error("io error: {reason}")]
    Io { reason: String },
    /// Decoding an image file failed.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
}

impl From<std::io::Error> for HaarError {
    fn from(err: std::io::Error) -> Self {
        HaarError::Io {
            reason: err.to_string(),
        }
    }
}

impl From<std::fmt::Error> for HaarError {
    fn from(err: std::fmt::Error) -> Self {
        HaarError::Io {
            reason: err.to_string(),
        }
    }
}
