//! Error types for the barcode reader

use std::sync::Arc;

use image::DynamicImage;
use thiserror::Error;

/// Message recorded when a decode finds nothing
pub const NO_BARCODE_MESSAGE: &str = "The provided bitmap did not contain a readable barcode.";

/// Raised when an image does not contain a readable barcode.
///
/// Carries the image that could not be decoded so callers can inspect or
/// persist it.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct NoBarcodeDetected {
    message: String,
    image: Arc<DynamicImage>,
}

impl NoBarcodeDetected {
    pub fn new(message: impl Into<String>, image: Arc<DynamicImage>) -> Self {
        Self {
            message: message.into(),
            image,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The image that did not contain a barcode
    pub fn image(&self) -> &Arc<DynamicImage> {
        &self.image
    }
}

/// Errors produced by the reader facade and its helpers
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error(transparent)]
    NoBarcode(#[from] NoBarcodeDetected),

    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("reader has been disposed")]
    Disposed,
}

impl ReaderError {
    /// Whether this error only means "nothing was found"
    pub fn is_no_barcode(&self) -> bool {
        matches!(self, ReaderError::NoBarcode(_))
    }

    /// The image attached to a no-barcode error
    pub fn image(&self) -> Option<&Arc<DynamicImage>> {
        match self {
            ReaderError::NoBarcode(err) => Some(err.image()),
            _ => None,
        }
    }
}

pub type Result<T, E = ReaderError> = std::result::Result<T, E>;
