//! Barcode reader facade
//!
//! This crate contains:
//! - `BarcodeReader`, which configures a decoder backend and reports
//!   detections through events, observable state and errors
//! - Decoder backends built on rxing (multi-format) and rqrr (QR only)
//! - A helper to save images under a correctly suffixed file name
//!
//! ```no_run
//! use barcode_reader::{BarcodeFormat, BarcodeReader};
//!
//! let reader = BarcodeReader::with_options(true, true, &[BarcodeFormat::Ean13]);
//! reader.on_detected(|event| println!("{}: {}", event.format(), event.value()));
//!
//! let image = image::open("label.png").unwrap();
//! if !reader.decode(image) {
//!     eprintln!("{}", reader.error().unwrap());
//! }
//! ```

pub mod config;
pub mod decoder;
pub mod error;
pub mod event;
pub mod format;
pub mod reader;
pub mod save;

pub use config::ReaderConfig;
pub use decoder::{BarcodeDecoder, DecodeHints, Decoded, MultiFormatDecoder, QrDecoder};
pub use error::{NoBarcodeDetected, ReaderError, Result};
pub use event::{BarcodeEvent, EventHandlers, HandlerId};
pub use format::{BarcodeFormat, ImageFormat};
pub use reader::BarcodeReader;
