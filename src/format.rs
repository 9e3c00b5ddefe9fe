//! Barcode symbologies and image file formats

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Barcode symbology a decoder may be asked to look for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BarcodeFormat {
    Aztec,
    Codabar,
    Code39,
    Code93,
    Code128,
    DataMatrix,
    Ean8,
    Ean13,
    Itf,
    MaxiCode,
    Pdf417,
    QrCode,
    Rss14,
    RssExpanded,
    UpcA,
    UpcE,
    UpcEanExtension,
    /// Group value standing for every one-dimensional format
    All1D,
}

impl BarcodeFormat {
    /// Every one-dimensional symbology, in the order `All1D` expands to
    pub const ONE_DIMENSIONAL: [BarcodeFormat; 11] = [
        BarcodeFormat::Codabar,
        BarcodeFormat::Code39,
        BarcodeFormat::Code93,
        BarcodeFormat::Code128,
        BarcodeFormat::Ean8,
        BarcodeFormat::Ean13,
        BarcodeFormat::Itf,
        BarcodeFormat::Rss14,
        BarcodeFormat::RssExpanded,
        BarcodeFormat::UpcA,
        BarcodeFormat::UpcE,
    ];

    pub fn is_one_dimensional(self) -> bool {
        Self::ONE_DIMENSIONAL.contains(&self)
    }

    /// Expand group values into the concrete formats they stand for
    pub fn expand(self) -> Vec<BarcodeFormat> {
        match self {
            BarcodeFormat::All1D => Self::ONE_DIMENSIONAL.to_vec(),
            other => vec![other],
        }
    }

    /// Human readable name, as printed by the CLI
    pub fn name(self) -> &'static str {
        match self {
            BarcodeFormat::Aztec => "AZTEC",
            BarcodeFormat::Codabar => "CODABAR",
            BarcodeFormat::Code39 => "CODE_39",
            BarcodeFormat::Code93 => "CODE_93",
            BarcodeFormat::Code128 => "CODE_128",
            BarcodeFormat::DataMatrix => "DATA_MATRIX",
            BarcodeFormat::Ean8 => "EAN_8",
            BarcodeFormat::Ean13 => "EAN_13",
            BarcodeFormat::Itf => "ITF",
            BarcodeFormat::MaxiCode => "MAXICODE",
            BarcodeFormat::Pdf417 => "PDF_417",
            BarcodeFormat::QrCode => "QR_CODE",
            BarcodeFormat::Rss14 => "RSS_14",
            BarcodeFormat::RssExpanded => "RSS_EXPANDED",
            BarcodeFormat::UpcA => "UPC_A",
            BarcodeFormat::UpcE => "UPC_E",
            BarcodeFormat::UpcEanExtension => "UPC_EAN_EXTENSION",
            BarcodeFormat::All1D => "ALL_1D",
        }
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BarcodeFormat {
    type Err = String;

    /// Accepts the display name in any case, with `-` or `_` separators or none
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let format = match key.as_str() {
            "aztec" => BarcodeFormat::Aztec,
            "codabar" => BarcodeFormat::Codabar,
            "code39" => BarcodeFormat::Code39,
            "code93" => BarcodeFormat::Code93,
            "code128" => BarcodeFormat::Code128,
            "datamatrix" => BarcodeFormat::DataMatrix,
            "ean8" => BarcodeFormat::Ean8,
            "ean13" => BarcodeFormat::Ean13,
            "itf" => BarcodeFormat::Itf,
            "maxicode" => BarcodeFormat::MaxiCode,
            "pdf417" => BarcodeFormat::Pdf417,
            "qr" | "qrcode" => BarcodeFormat::QrCode,
            "rss14" => BarcodeFormat::Rss14,
            "rssexpanded" => BarcodeFormat::RssExpanded,
            "upca" => BarcodeFormat::UpcA,
            "upce" => BarcodeFormat::UpcE,
            "upceanextension" => BarcodeFormat::UpcEanExtension,
            "all1d" => BarcodeFormat::All1D,
            _ => return Err(format!("unknown barcode format: {s}")),
        };
        Ok(format)
    }
}

/// File format used when saving an image to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Gif,
    Tiff,
    Ico,
}

impl ImageFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Gif => "gif",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Ico => "ico",
        }
    }

    /// Get the matching `image` crate encoder format
    pub fn encoder_format(&self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
            ImageFormat::Ico => image::ImageFormat::Ico,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "bmp" => Ok(ImageFormat::Bmp),
            "gif" => Ok(ImageFormat::Gif),
            "tiff" | "tif" => Ok(ImageFormat::Tiff),
            "ico" => Ok(ImageFormat::Ico),
            _ => Err(format!("unknown image format: {s}")),
        }
    }
}
