//! QR code detection using rqrr

use image::GrayImage;

use super::{BarcodeDecoder, DecodeHints, Decoded};
use crate::format::BarcodeFormat;

/// QR-only backend
#[derive(Debug, Clone, Copy, Default)]
pub struct QrDecoder {
    /// Downsample images larger than this before scanning (0 = never)
    pub max_dim: u32,
}

impl QrDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_dim(max_dim: u32) -> Self {
        Self { max_dim }
    }

    fn scan(&self, gray: GrayImage) -> Option<String> {
        let mut prepared = rqrr::PreparedImage::prepare(gray);
        let grids = prepared.detect_grids();
        log::debug!("rqrr: {} candidate grid(s)", grids.len());

        for grid in grids {
            match grid.decode() {
                Ok((meta, content)) => {
                    log::debug!("rqrr: decoded version {:?} grid", meta.version);
                    return Some(content);
                }
                Err(err) => log::debug!("rqrr: grid rejected: {:?}", err),
            }
        }
        None
    }

    fn downsample(&self, image: &GrayImage) -> GrayImage {
        let (w, h) = image.dimensions();
        if self.max_dim == 0 || (w <= self.max_dim && h <= self.max_dim) {
            return image.clone();
        }
        let factor = w.max(h) as f32 / self.max_dim as f32;
        let new_w = ((w as f32 / factor) as u32).max(1);
        let new_h = ((h as f32 / factor) as u32).max(1);
        image::imageops::resize(image, new_w, new_h, image::imageops::FilterType::Nearest)
    }
}

impl BarcodeDecoder for QrDecoder {
    fn name(&self) -> &'static str {
        "rqrr"
    }

    fn supports(&self, format: BarcodeFormat) -> bool {
        format == BarcodeFormat::QrCode
    }

    fn decode(&self, image: &GrayImage, hints: &DecodeHints) -> Option<Decoded> {
        if !hints.accepts(BarcodeFormat::QrCode) {
            log::debug!("rqrr: QR codes not requested, skipping");
            return None;
        }

        let gray = self.downsample(image);
        let text = match self.scan(gray.clone()) {
            Some(text) => Some(text),
            // Light-on-dark codes
            None if hints.try_harder => {
                let mut inverted = gray;
                image::imageops::invert(&mut inverted);
                self.scan(inverted)
            }
            None => None,
        }?;

        Some(Decoded {
            text,
            format: BarcodeFormat::QrCode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReaderConfig;

    #[test]
    fn test_only_qr_supported() {
        let decoder = QrDecoder::new();
        assert!(decoder.supports(BarcodeFormat::QrCode));
        assert!(!decoder.supports(BarcodeFormat::Ean13));
        assert!(!decoder.supports(BarcodeFormat::DataMatrix));
    }

    #[test]
    fn test_skips_when_qr_not_requested() {
        let decoder = QrDecoder::new();
        let image = GrayImage::new(50, 50);
        let hints = DecodeHints::from(&ReaderConfig::default());
        assert!(decoder.decode(&image, &hints).is_none());
    }

    #[test]
    fn test_blank_image_has_no_qr() {
        let decoder = QrDecoder::new();
        let image = GrayImage::from_pixel(64, 64, image::Luma([255]));
        let hints = DecodeHints::from(&ReaderConfig::new(true, false, &[BarcodeFormat::QrCode]));
        assert!(decoder.decode(&image, &hints).is_none());
    }

    #[test]
    fn test_downsample_keeps_aspect_ratio() {
        let decoder = QrDecoder::with_max_dim(100);
        let image = GrayImage::new(400, 200);
        assert_eq!(decoder.downsample(&image).dimensions(), (100, 50));

        let small = GrayImage::new(40, 20);
        assert_eq!(decoder.downsample(&small).dimensions(), (40, 20));
    }
}
