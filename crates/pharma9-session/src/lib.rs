//! The interactive locator flow over the core pipeline.
//!
//! A [`LocatorSession`] owns the view state and the rating book for one
//! user; [`LocationWatch`] feeds it origin updates and [`share_pharmacy`]
//! drives the share-or-copy action of the detail view.

mod location;
mod notice;
mod session;
mod share;
mod stdin;

use pharma9_core::{CoreError, PharmacyId};
use thiserror::Error;

pub use location::{
    LocationError, LocationEvent, LocationProvider, LocationWatch, WatchId, WatchOptions,
};
pub use notice::Notice;
pub use session::{LocatorSession, ViewState};
pub use share::{share_pharmacy, Clipboard, ClipboardError, ShareError, ShareOutcome, ShareTarget};
pub use stdin::StdinLocationProvider;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SessionError {
    pub(crate) fn unknown(id: PharmacyId) -> Self {
        SessionError::Core(CoreError::UnknownPharmacy(id))
    }

    /// `true` when the error reports a pharmacy id missing from the catalog.
    #[must_use]
    pub fn is_unknown_pharmacy(&self) -> bool {
        matches!(self, SessionError::Core(CoreError::UnknownPharmacy(_)))
    }
}
