//! Decoder backends
//!
//! This module contains:
//! - The `BarcodeDecoder` trait the reader facade talks to
//! - A multi-format backend built on rxing
//! - A QR-only backend built on rqrr
//! - Rotation retries shared by all backends

mod multi;
mod qr;

pub use multi::MultiFormatDecoder;
pub use qr::QrDecoder;

use image::GrayImage;
use image::imageops;

use crate::config::ReaderConfig;
use crate::format::BarcodeFormat;

/// Options handed to a backend for a single decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeHints {
    pub try_harder: bool,
    /// Concrete formats to accept (never contains group values)
    pub formats: Vec<BarcodeFormat>,
}

impl DecodeHints {
    pub fn accepts(&self, format: BarcodeFormat) -> bool {
        self.formats.contains(&format)
    }
}

impl From<&ReaderConfig> for DecodeHints {
    fn from(config: &ReaderConfig) -> Self {
        Self {
            try_harder: config.try_harder,
            formats: config.possible_formats(),
        }
    }
}

/// A barcode found by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub format: BarcodeFormat,
}

/// A barcode recognition library the reader can delegate to
pub trait BarcodeDecoder: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Whether this backend can recognize `format` at all
    fn supports(&self, format: BarcodeFormat) -> bool;

    /// Look for a single barcode; `None` when nothing readable was found
    fn decode(&self, image: &GrayImage, hints: &DecodeHints) -> Option<Decoded>;
}

/// Decode `image`, retrying at 90, 180 and 270 degrees when `auto_rotate` is set
pub fn decode_with_rotation(
    decoder: &dyn BarcodeDecoder,
    image: &GrayImage,
    hints: &DecodeHints,
    auto_rotate: bool,
) -> Option<Decoded> {
    if let Some(found) = decoder.decode(image, hints) {
        return Some(found);
    }
    if !auto_rotate {
        return None;
    }

    let rotations: [(u32, fn(&GrayImage) -> GrayImage); 3] = [
        (90, |img| imageops::rotate90(img)),
        (180, |img| imageops::rotate180(img)),
        (270, |img| imageops::rotate270(img)),
    ];
    for (degrees, rotate) in rotations {
        log::debug!("{}: retrying rotated by {}°", decoder.name(), degrees);
        if let Some(found) = decoder.decode(&rotate(image), hints) {
            return Some(found);
        }
    }
    None
}
