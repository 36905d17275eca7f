//! Continuous location watch with a first-fix timeout.
//!
//! One [`LocationWatch`] holds exactly one provider subscription. Pushes are
//! forwarded into a single-slot `watch` channel so readers always see the
//! latest origin; any failure posts a [`Notice`], puts the default origin
//! back and ends the subscription.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use pharma9_core::Coordinates;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::Notice;

/// Provider-assigned subscription handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    /// Deadline for the first fix.
    pub timeout: Duration,
    pub maximum_age: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("geolocation is not supported")]
    Unsupported,

    #[error("permission to read the location was denied")]
    PermissionDenied,

    #[error("no position fix before the deadline")]
    Timeout,

    #[error("position unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    Position(Coordinates),
    Failed(LocationError),
}

/// Source of device position pushes.
pub trait LocationProvider: Send + Sync {
    /// Start pushing events into `sink` until the returned id is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Unsupported`] when the provider has no
    /// geolocation capability, or any other variant when the subscription
    /// cannot be opened.
    fn watch(
        &self,
        options: WatchOptions,
        sink: mpsc::UnboundedSender<LocationEvent>,
    ) -> Result<WatchId, LocationError>;

    fn clear_watch(&self, id: WatchId);
}

/// Clears the provider subscription at most once.
struct Subscription {
    provider: Arc<dyn LocationProvider>,
    id: Mutex<Option<WatchId>>,
}

impl Subscription {
    fn clear(&self) {
        let id = self.id.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(id) = id {
            self.provider.clear_watch(id);
            tracing::debug!(watch_id = id.0, "location watch cleared");
        }
    }
}

/// Everything the forwarding task writes to.
struct Forwarder {
    subscription: Arc<Subscription>,
    active: Arc<AtomicBool>,
    origin: watch::Sender<Coordinates>,
    notices: mpsc::UnboundedSender<Notice>,
    default_origin: Coordinates,
}

impl Forwarder {
    fn push(&self, coordinates: Coordinates) {
        let active = &self.active;
        // The flag is re-checked under the channel lock so a stopped handle
        // never observes a late push.
        self.origin.send_if_modified(|slot| {
            if !active.load(Ordering::SeqCst) {
                return false;
            }
            *slot = coordinates;
            true
        });
    }

    fn fail(&self, error: &LocationError) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        tracing::warn!(error = %error, "location watch failed; reverting to default origin");
        self.origin.send_replace(self.default_origin);
        let _ = self.notices.send(Notice::LocationUnavailable);
        self.subscription.clear();
    }

    fn finish(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.subscription.clear();
    }

    async fn run(self, mut events: mpsc::UnboundedReceiver<LocationEvent>, timeout: Duration) {
        match tokio::time::timeout(timeout, events.recv()).await {
            Err(_) => return self.fail(&LocationError::Timeout),
            Ok(None) => {
                return self.fail(&LocationError::Unavailable(
                    "provider closed before the first fix".to_string(),
                ))
            }
            Ok(Some(LocationEvent::Failed(e))) => return self.fail(&e),
            Ok(Some(LocationEvent::Position(c))) => self.push(c),
        }

        while let Some(event) = events.recv().await {
            match event {
                LocationEvent::Position(c) => self.push(c),
                LocationEvent::Failed(e) => return self.fail(&e),
            }
        }

        tracing::debug!("location provider closed the stream");
        self.finish();
    }
}

/// Handle over a running location watch.
///
/// Dropping the handle stops the watch.
pub struct LocationWatch {
    subscription: Option<Arc<Subscription>>,
    active: Arc<AtomicBool>,
    origin: watch::Receiver<Coordinates>,
    notices: mpsc::UnboundedReceiver<Notice>,
    task: Option<JoinHandle<()>>,
}

impl LocationWatch {
    /// Subscribe to `provider` and start forwarding its pushes.
    ///
    /// Must be called from within a tokio runtime. A provider that cannot
    /// open the subscription yields an inactive handle whose origin stays at
    /// `default_origin` and whose first notice explains why.
    pub fn start(
        provider: Arc<dyn LocationProvider>,
        options: WatchOptions,
        default_origin: Coordinates,
    ) -> Self {
        let (origin_tx, origin_rx) = watch::channel(default_origin);
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let active = Arc::new(AtomicBool::new(false));

        let id = match provider.watch(options, event_tx) {
            Ok(id) => id,
            Err(e) => {
                let notice = if e == LocationError::Unsupported {
                    Notice::LocationUnsupported
                } else {
                    Notice::LocationUnavailable
                };
                tracing::warn!(error = %e, "location watch could not start");
                let _ = notice_tx.send(notice);
                return Self {
                    subscription: None,
                    active,
                    origin: origin_rx,
                    notices: notice_rx,
                    task: None,
                };
            }
        };

        tracing::debug!(
            watch_id = id.0,
            high_accuracy = options.high_accuracy,
            timeout_ms = u64::try_from(options.timeout.as_millis()).unwrap_or(u64::MAX),
            "location watch started"
        );

        active.store(true, Ordering::SeqCst);
        let subscription = Arc::new(Subscription {
            provider,
            id: Mutex::new(Some(id)),
        });
        let forwarder = Forwarder {
            subscription: Arc::clone(&subscription),
            active: Arc::clone(&active),
            origin: origin_tx,
            notices: notice_tx,
            default_origin,
        };
        let task = tokio::spawn(forwarder.run(event_rx, options.timeout));

        Self {
            subscription: Some(subscription),
            active,
            origin: origin_rx,
            notices: notice_rx,
            task: Some(task),
        }
    }

    /// Latest known origin.
    #[must_use]
    pub fn latest(&self) -> Coordinates {
        *self.origin.borrow()
    }

    /// A receiver that wakes on every origin replacement.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Coordinates> {
        self.origin.clone()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait for the next notice; `None` once the watch is over and drained.
    pub async fn next_notice(&mut self) -> Option<Notice> {
        self.notices.recv().await
    }

    pub fn try_next_notice(&mut self) -> Option<Notice> {
        self.notices.try_recv().ok()
    }

    /// Clear the subscription and stop forwarding. Idempotent.
    ///
    /// No origin update is applied after this returns.
    pub fn stop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(subscription) = self.subscription.take() {
            subscription.clear();
        }
        // Wait out a push that took the channel lock before the flag flipped.
        drop(self.origin.borrow());
    }
}

impl Drop for LocationWatch {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "location_test.rs"]
mod tests;
