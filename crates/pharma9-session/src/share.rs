//! Share-or-copy action for the detail view.

use pharma9_core::{clipboard_text, share_payload, PharmacyRecord, SharePayload};
use thiserror::Error;

use crate::Notice;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    #[error("native sharing is not available")]
    Unavailable,

    #[error("share dismissed by the user")]
    Cancelled,

    #[error("share failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("clipboard write failed: {0}")]
pub struct ClipboardError(pub String);

/// A native share sheet.
pub trait ShareTarget {
    /// # Errors
    ///
    /// Returns [`ShareError`] when there is no share sheet, the user dismissed
    /// it, or delivery failed.
    fn share(&self, payload: &SharePayload) -> Result<(), ShareError>;
}

pub trait Clipboard {
    /// # Errors
    ///
    /// Returns [`ClipboardError`] when the text could not be written.
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// Fell back to the clipboard; carries the transient confirmation.
    Copied(Notice),
    Failed(Notice),
}

/// Share through `target`, falling back to `clipboard` when the share sheet is
/// unavailable or dismissed. Nothing is retried.
pub fn share_pharmacy<T, C>(
    target: &T,
    clipboard: &C,
    pharmacy: &PharmacyRecord,
    url: &str,
) -> ShareOutcome
where
    T: ShareTarget + ?Sized,
    C: Clipboard + ?Sized,
{
    let payload = share_payload(pharmacy, url);
    match target.share(&payload) {
        Ok(()) => return ShareOutcome::Shared,
        Err(ShareError::Failed(reason)) => {
            tracing::warn!(pharmacy_id = pharmacy.id, reason = %reason, "share failed");
        }
        Err(e) => {
            tracing::debug!(pharmacy_id = pharmacy.id, reason = %e, "share skipped; copying instead");
        }
    }

    match clipboard.write_text(&clipboard_text(pharmacy)) {
        Ok(()) => ShareOutcome::Copied(Notice::Copied),
        Err(e) => {
            tracing::warn!(pharmacy_id = pharmacy.id, error = %e, "clipboard write failed");
            ShareOutcome::Failed(Notice::CopyFailed)
        }
    }
}
