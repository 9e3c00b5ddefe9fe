//! "Barcode detected" notifications
//!
//! Subscribers either register a callback or take a channel receiver.
//! Callbacks run on whichever thread finished the decode.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crossbeam_channel::{Receiver, Sender};
use image::DynamicImage;

use crate::format::BarcodeFormat;

/// Payload delivered when a barcode is detected
#[derive(Debug, Clone)]
pub struct BarcodeEvent {
    value: String,
    format: BarcodeFormat,
    image: Arc<DynamicImage>,
}

impl BarcodeEvent {
    pub fn new(value: impl Into<String>, format: BarcodeFormat, image: Arc<DynamicImage>) -> Self {
        Self {
            value: value.into(),
            format,
            image,
        }
    }

    /// Decoded value from the barcode
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn format(&self) -> BarcodeFormat {
        self.format
    }

    /// Image the barcode was decoded from
    pub fn image(&self) -> &Arc<DynamicImage> {
        &self.image
    }
}

/// Identifies a registered callback so it can be removed again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Arc<dyn Fn(&BarcodeEvent) + Send + Sync>;

/// Registry of detection subscribers
#[derive(Default)]
pub struct EventHandlers {
    next_id: AtomicU64,
    callbacks: RwLock<Vec<(HandlerId, Handler)>>,
    channels: Mutex<Vec<Sender<BarcodeEvent>>>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked for every detection
    pub fn on_detected<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&BarcodeEvent) + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(handler)));
        id
    }

    /// Unregister a callback; returns false if it was not registered
    pub fn remove(&self, id: HandlerId) -> bool {
        let mut callbacks = self
            .callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = callbacks.len();
        callbacks.retain(|(handler_id, _)| *handler_id != id);
        callbacks.len() != before
    }

    /// Receive every detection on a channel.
    ///
    /// Dropping the receiver unsubscribes on the next emit.
    pub fn subscribe(&self) -> Receiver<BarcodeEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Number of live callbacks and channels
    pub fn len(&self) -> usize {
        let callbacks = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        let channels = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        callbacks + channels
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every subscriber
    pub fn emit(&self, event: &BarcodeEvent) {
        // Snapshot so handlers may (un)register without deadlocking
        let callbacks: Vec<Handler> = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in callbacks {
            handler(event);
        }

        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        channels.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl std::fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandlers")
            .field("subscribers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn event(value: &str) -> BarcodeEvent {
        BarcodeEvent::new(
            value,
            BarcodeFormat::Ean13,
            Arc::new(DynamicImage::new_luma8(1, 1)),
        )
    }

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        let handlers = EventHandlers::new();
        assert!(handlers.is_empty());
        handlers.emit(&event("1234"));
    }

    #[test]
    fn test_callbacks_receive_event() {
        let handlers = EventHandlers::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        handlers.on_detected(move |e| sink.lock().unwrap().push(e.value().to_string()));

        handlers.emit(&event("first"));
        handlers.emit(&event("second"));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_removed_callback_is_not_called() {
        let handlers = EventHandlers::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let id = handlers.on_detected(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        handlers.emit(&event("a"));
        assert!(handlers.remove(id));
        assert!(!handlers.remove(id));
        handlers.emit(&event("b"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_channel_subscription() {
        let handlers = EventHandlers::new();
        let rx = handlers.subscribe();
        handlers.emit(&event("over the wire"));
        let received = rx.try_recv().unwrap();
        assert_eq!(received.value(), "over the wire");
        assert_eq!(received.format(), BarcodeFormat::Ean13);
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let handlers = EventHandlers::new();
        let rx = handlers.subscribe();
        let kept = handlers.subscribe();
        assert_eq!(handlers.len(), 2);

        drop(rx);
        handlers.emit(&event("x"));
        assert_eq!(handlers.len(), 1);
        assert!(kept.try_recv().is_ok());
    }

    #[test]
    fn test_handler_may_register_during_emit() {
        let handlers = Arc::new(EventHandlers::new());
        let inner = Arc::clone(&handlers);
        handlers.on_detected(move |_| {
            inner.on_detected(|_| {});
        });
        handlers.emit(&event("x"));
        assert_eq!(handlers.len(), 2);
    }
}
