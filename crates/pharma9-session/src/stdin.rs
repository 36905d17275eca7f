use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use pharma9_core::Coordinates;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::location::{LocationError, LocationEvent, LocationProvider, WatchId, WatchOptions};

/// Location provider fed by `lat,lng` lines on standard input.
///
/// Blank lines and `#` comments are skipped; a malformed line is logged and
/// ignored. End of input ends the watch.
#[derive(Debug, Default)]
pub struct StdinLocationProvider {
    next_id: AtomicU64,
    readers: Mutex<HashMap<WatchId, JoinHandle<()>>>,
}

impl StdinLocationProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

pub(crate) fn parse_fix(line: &str) -> Option<Result<Coordinates, String>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line.parse::<Coordinates>())
}

impl LocationProvider for StdinLocationProvider {
    fn watch(
        &self,
        _options: WatchOptions,
        sink: mpsc::UnboundedSender<LocationEvent>,
    ) -> Result<WatchId, LocationError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| LocationError::Unsupported)?;
        let id = WatchId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let reader = runtime.spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match parse_fix(&line) {
                        None => {}
                        Some(Ok(coordinates)) => {
                            if sink.send(LocationEvent::Position(coordinates)).is_err() {
                                break;
                            }
                        }
                        Some(Err(reason)) => {
                            tracing::warn!(line = %line.trim(), reason = %reason, "ignoring malformed position");
                        }
                    },
                    Ok(None) => break,
                    Err(e) => {
                        let _ = sink.send(LocationEvent::Failed(LocationError::Unavailable(
                            e.to_string(),
                        )));
                        break;
                    }
                }
            }
        });

        self.readers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, reader);
        Ok(id)
    }

    fn clear_watch(&self, id: WatchId) {
        let reader = self
            .readers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if let Some(reader) = reader {
            reader.abort();
        }
    }
}
