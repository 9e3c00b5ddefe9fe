//! The barcode reader facade
//!
//! `BarcodeReader` owns a decoder backend and its configuration, runs
//! decodes inline or on tokio's blocking pool, and reports the outcome
//! through events, observable state and `NoBarcodeDetected` errors.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::Receiver;
use image::DynamicImage;
use tokio::task::{AbortHandle, JoinHandle};

use crate::config::ReaderConfig;
use crate::decoder::{BarcodeDecoder, DecodeHints, MultiFormatDecoder, decode_with_rotation};
use crate::error::{NO_BARCODE_MESSAGE, NoBarcodeDetected, ReaderError, Result};
use crate::event::{BarcodeEvent, EventHandlers, HandlerId};
use crate::format::{BarcodeFormat, ImageFormat};

/// Outcome of the most recent decode
#[derive(Debug, Default)]
struct ReaderState {
    error: Option<Arc<ReaderError>>,
    image: Option<Arc<DynamicImage>>,
    found_value: Option<String>,
    successful: bool,
}

struct Inner {
    config: ReaderConfig,
    hints: DecodeHints,
    decoder: Arc<dyn BarcodeDecoder>,
    handlers: EventHandlers,
    state: Mutex<ReaderState>,
    task: Mutex<Option<AbortHandle>>,
    disposed: AtomicBool,
}

impl Inner {
    fn state(&self) -> std::sync::MutexGuard<'_, ReaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Decode, update state and notify subscribers. Errors are not recorded.
    fn run(&self, image: Arc<DynamicImage>) -> Result<BarcodeEvent> {
        {
            // dispose() clears the image under this lock after setting the flag
            let mut state = self.state();
            if self.is_disposed() {
                return Err(ReaderError::Disposed);
            }
            state.image = Some(Arc::clone(&image));
        }

        log::debug!(
            "Decoding {}x{} image with {}",
            image.width(),
            image.height(),
            self.decoder.name()
        );
        let found = if image.width() == 0 || image.height() == 0 {
            None
        } else {
            let gray = image.to_luma8();
            decode_with_rotation(
                self.decoder.as_ref(),
                &gray,
                &self.hints,
                self.config.auto_rotate,
            )
        };

        let Some(decoded) = found else {
            {
                let mut state = self.state();
                state.found_value = None;
                state.successful = false;
            }
            return Err(NoBarcodeDetected::new(NO_BARCODE_MESSAGE, image).into());
        };

        // Disposed while the decode was running: stay silent
        if self.is_disposed() {
            return Err(ReaderError::Disposed);
        }

        log::info!("Detected {} barcode: {}", decoded.format, decoded.text);
        {
            let mut state = self.state();
            state.found_value = Some(decoded.text.clone());
            state.successful = true;
            state.error = None;
        }
        let event = BarcodeEvent::new(decoded.text, decoded.format, image);
        self.handlers.emit(&event);
        Ok(event)
    }

    fn record_error(&self, err: ReaderError) {
        match &err {
            ReaderError::NoBarcode(_) => log::debug!("{}", err),
            _ => log::warn!("Barcode decode failed: {}", err),
        }
        let mut state = self.state();
        state.successful = false;
        state.error = Some(Arc::new(err));
    }

    /// Decode and record the outcome, reporting only whether a barcode was found
    fn decode(&self, image: Arc<DynamicImage>) -> bool {
        match self.run(image) {
            Ok(_) => true,
            Err(err) => {
                self.record_error(err);
                false
            }
        }
    }

    fn abort_task(&self) {
        if let Some(handle) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

/// Facade over a barcode decoding backend.
///
/// A successful decode fires every `on_detected` handler (and channel
/// subscriber) exactly once before the decode call returns. A failed
/// decode records a `NoBarcodeDetected` error readable through
/// [`BarcodeReader::error`].
pub struct BarcodeReader {
    inner: Arc<Inner>,
}

impl BarcodeReader {
    /// Create a reader using the multi-format backend
    pub fn new(config: ReaderConfig) -> Self {
        Self::with_decoder(config, Arc::new(MultiFormatDecoder::new()))
    }

    /// Create a reader using a specific backend
    pub fn with_decoder(config: ReaderConfig, decoder: Arc<dyn BarcodeDecoder>) -> Self {
        let hints = DecodeHints::from(&config);
        let unsupported: Vec<_> = hints
            .formats
            .iter()
            .filter(|f| !decoder.supports(**f))
            .collect();
        if !unsupported.is_empty() {
            log::warn!(
                "{} cannot decode {:?}; those formats will never match",
                decoder.name(),
                unsupported
            );
        }

        Self {
            inner: Arc::new(Inner {
                config,
                hints,
                decoder,
                handlers: EventHandlers::new(),
                state: Mutex::new(ReaderState::default()),
                task: Mutex::new(None),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Performance mode trades search effort and rotation for speed.
    ///
    /// An empty `formats` slice accepts every one-dimensional format.
    pub fn performance(performance_mode: bool, formats: &[BarcodeFormat]) -> Self {
        Self::new(ReaderConfig::performance(performance_mode, formats))
    }

    pub fn with_options(try_harder: bool, auto_rotate: bool, formats: &[BarcodeFormat]) -> Self {
        Self::new(ReaderConfig::new(try_harder, auto_rotate, formats))
    }

    /// Decode on the calling thread; returns whether a barcode was found
    pub fn decode(&self, image: impl Into<Arc<DynamicImage>>) -> bool {
        self.inner.decode(image.into())
    }

    /// Like [`decode`](Self::decode), but returns the event or the error.
    ///
    /// The outcome is recorded in the reader's state as well.
    pub fn try_decode(&self, image: impl Into<Arc<DynamicImage>>) -> Result<BarcodeEvent> {
        self.inner.run(image.into()).inspect_err(|err| {
            // run() only fails with NoBarcode or Disposed
            let recorded = match err {
                ReaderError::NoBarcode(no_barcode) => ReaderError::NoBarcode(no_barcode.clone()),
                _ => ReaderError::Disposed,
            };
            self.inner.record_error(recorded);
        })
    }

    /// Decode on tokio's blocking pool
    pub async fn decode_async(&self, image: impl Into<Arc<DynamicImage>>) -> bool {
        let inner = Arc::clone(&self.inner);
        let image = image.into();
        match tokio::task::spawn_blocking(move || inner.decode(image)).await {
            Ok(found) => found,
            Err(err) => {
                self.inner.record_error(ReaderError::Task(err));
                false
            }
        }
    }

    /// Start a background decode and return immediately.
    ///
    /// Must be called from within a tokio runtime. Starting a new decode
    /// forgets the previous task; only the latest one is aborted by
    /// [`dispose`](Self::dispose).
    pub fn spawn_decode(&self, image: impl Into<Arc<DynamicImage>>) -> JoinHandle<bool> {
        let inner = Arc::clone(&self.inner);
        let image = image.into();
        let handle = tokio::task::spawn_blocking(move || inner.decode(image));
        *self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle.abort_handle());
        handle
    }

    /// Register a "barcode detected" callback
    pub fn on_detected<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&BarcodeEvent) + Send + Sync + 'static,
    {
        self.inner.handlers.on_detected(handler)
    }

    pub fn remove_handler(&self, id: HandlerId) -> bool {
        self.inner.handlers.remove(id)
    }

    /// Receive detections on a channel
    pub fn subscribe(&self) -> Receiver<BarcodeEvent> {
        self.inner.handlers.subscribe()
    }

    /// Error recorded by the most recent decode, if it failed
    pub fn error(&self) -> Option<Arc<ReaderError>> {
        self.inner.state().error.clone()
    }

    /// Image currently (or most recently) being decoded
    pub fn image(&self) -> Option<Arc<DynamicImage>> {
        self.inner.state().image.clone()
    }

    /// Value decoded by the most recent successful decode
    pub fn found_value(&self) -> Option<String> {
        self.inner.state().found_value.clone()
    }

    /// Whether the most recent decode found a barcode
    pub fn successful(&self) -> bool {
        self.inner.state().successful
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.inner.config
    }

    pub fn decoder_name(&self) -> &'static str {
        self.inner.decoder.name()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Stop any background decode and release the held image.
    ///
    /// Later decodes fail with [`ReaderError::Disposed`].
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        log::debug!("Disposing barcode reader");
        self.inner.abort_task();
        self.inner.state().image = None;
    }

    /// Save `image` as `format`, fixing up the file extension.
    ///
    /// Returns the path that was written.
    pub fn save_image(
        image: &DynamicImage,
        path: impl AsRef<Path>,
        format: ImageFormat,
    ) -> Result<PathBuf> {
        crate::save::save_image(image, path, format)
    }
}

impl Default for BarcodeReader {
    fn default() -> Self {
        Self::new(ReaderConfig::default())
    }
}

impl Drop for BarcodeReader {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for BarcodeReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarcodeReader")
            .field("config", &self.inner.config)
            .field("decoder", &self.inner.decoder.name())
            .field("handlers", &self.inner.handlers)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
