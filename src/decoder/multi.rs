//! Multi-format decoding using rxing

use std::collections::HashSet;

use image::GrayImage;
use rxing::common::HybridBinarizer;
use rxing::{BinaryBitmap, Luma8LuminanceSource, MultiFormatReader, Reader};

use super::{BarcodeDecoder, DecodeHints, Decoded};
use crate::format::BarcodeFormat;

/// Backend covering every 1D and 2D symbology rxing knows
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiFormatDecoder;

impl MultiFormatDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl BarcodeDecoder for MultiFormatDecoder {
    fn name(&self) -> &'static str {
        "rxing"
    }

    fn supports(&self, format: BarcodeFormat) -> bool {
        to_rxing(format).is_some()
    }

    fn decode(&self, image: &GrayImage, hints: &DecodeHints) -> Option<Decoded> {
        // rxing panics on degenerate bitmaps
        if image.width() == 0 || image.height() == 0 {
            return None;
        }

        let formats: HashSet<rxing::BarcodeFormat> =
            hints.formats.iter().filter_map(|f| to_rxing(*f)).collect();
        if formats.is_empty() {
            log::debug!("rxing: no supported format requested");
            return None;
        }

        let mut rx_hints = rxing::DecodeHints::default();
        rx_hints.TryHarder = Some(hints.try_harder);
        rx_hints.PossibleFormats = Some(formats);

        let source = Luma8LuminanceSource::new(image.as_raw().clone(), image.width(), image.height());
        let mut bitmap = BinaryBitmap::new(HybridBinarizer::new(source));
        let mut reader = MultiFormatReader::default();

        let rx_hints = rxing::DecodingHintDictionary::from(rx_hints);
        match reader.decode_with_hints(&mut bitmap, &rx_hints) {
            Ok(result) => {
                let Some(format) = from_rxing(result.getBarcodeFormat()) else {
                    log::debug!(
                        "rxing: ignoring unmapped format {:?}",
                        result.getBarcodeFormat()
                    );
                    return None;
                };
                Some(Decoded {
                    text: result.getText().to_string(),
                    format,
                })
            }
            Err(err) => {
                // Not-found, checksum and format failures all mean "no barcode"
                log::debug!("rxing: {:?}", err);
                None
            }
        }
    }
}

fn to_rxing(format: BarcodeFormat) -> Option<rxing::BarcodeFormat> {
    use rxing::BarcodeFormat as Rx;
    let rx = match format {
        BarcodeFormat::Aztec => Rx::AZTEC,
        BarcodeFormat::Codabar => Rx::CODABAR,
        BarcodeFormat::Code39 => Rx::CODE_39,
        BarcodeFormat::Code93 => Rx::CODE_93,
        BarcodeFormat::Code128 => Rx::CODE_128,
        BarcodeFormat::DataMatrix => Rx::DATA_MATRIX,
        BarcodeFormat::Ean8 => Rx::EAN_8,
        BarcodeFormat::Ean13 => Rx::EAN_13,
        BarcodeFormat::Itf => Rx::ITF,
        BarcodeFormat::MaxiCode => Rx::MAXICODE,
        BarcodeFormat::Pdf417 => Rx::PDF_417,
        BarcodeFormat::QrCode => Rx::QR_CODE,
        BarcodeFormat::Rss14 => Rx::RSS_14,
        BarcodeFormat::RssExpanded => Rx::RSS_EXPANDED,
        BarcodeFormat::UpcA => Rx::UPC_A,
        BarcodeFormat::UpcE => Rx::UPC_E,
        BarcodeFormat::UpcEanExtension => Rx::UPC_EAN_EXTENSION,
        BarcodeFormat::All1D => return None,
    };
    Some(rx)
}

fn from_rxing(format: &rxing::BarcodeFormat) -> Option<BarcodeFormat> {
    use rxing::BarcodeFormat as Rx;
    let ours = match format {
        Rx::AZTEC => BarcodeFormat::Aztec,
        Rx::CODABAR => BarcodeFormat::Codabar,
        Rx::CODE_39 => BarcodeFormat::Code39,
        Rx::CODE_93 => BarcodeFormat::Code93,
        Rx::CODE_128 => BarcodeFormat::Code128,
        Rx::DATA_MATRIX => BarcodeFormat::DataMatrix,
        Rx::EAN_8 => BarcodeFormat::Ean8,
        Rx::EAN_13 => BarcodeFormat::Ean13,
        Rx::ITF => BarcodeFormat::Itf,
        Rx::MAXICODE => BarcodeFormat::MaxiCode,
        Rx::PDF_417 => BarcodeFormat::Pdf417,
        Rx::QR_CODE => BarcodeFormat::QrCode,
        Rx::RSS_14 => BarcodeFormat::Rss14,
        Rx::RSS_EXPANDED => BarcodeFormat::RssExpanded,
        Rx::UPC_A => BarcodeFormat::UpcA,
        Rx::UPC_E => BarcodeFormat::UpcE,
        Rx::UPC_EAN_EXTENSION => BarcodeFormat::UpcEanExtension,
        _ => return None,
    };
    Some(ours)
}
