//! Star-rating accumulation and the rated view of the catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::PharmacyRecord;
use crate::geo::{distance_km, Coordinates};
use crate::{CoreError, PharmacyId};

/// A single star submission, guaranteed to be within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Stars(u8);

impl Stars {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidStars`] when `value` is outside 1..=5.
    pub fn new(value: u8) -> Result<Self, CoreError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoreError::InvalidStars(value))
        }
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Stars {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Running sum-and-count for one pharmacy.
///
/// Serialized as `{"totalStars": n, "count": n}` to stay compatible with
/// blobs written by the browser front-end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAccumulator {
    pub total_stars: u64,
    pub count: u64,
}

impl RatingAccumulator {
    /// Saturates at `u64::MAX` so an extreme persisted blob cannot overflow.
    #[must_use]
    pub fn with(self, stars: Stars) -> Self {
        Self {
            total_stars: self.total_stars.saturating_add(u64::from(stars.get())),
            count: self.count.saturating_add(1),
        }
    }

    /// Mean star value, `None` while nothing has been submitted.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.total_stars as f64 / self.count as f64)
        }
    }
}

/// All accumulators keyed by pharmacy id. This is the value that gets
/// persisted; entries are created lazily and never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingBook(BTreeMap<PharmacyId, RatingAccumulator>);

impl RatingBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: PharmacyId) -> Option<&RatingAccumulator> {
        self.0.get(&id)
    }

    /// Read-modify-write of one accumulator; returns the updated value.
    pub fn record(&mut self, id: PharmacyId, stars: Stars) -> RatingAccumulator {
        let entry = self.0.entry(id).or_default();
        *entry = entry.with(stars);
        *entry
    }

    pub fn iter(&self) -> impl Iterator<Item = (PharmacyId, &RatingAccumulator)> {
        self.0.iter().map(|(id, acc)| (*id, acc))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Return a new book with one more submission recorded for `id`.
#[must_use]
pub fn apply_rating(book: &RatingBook, id: PharmacyId, stars: Stars) -> RatingBook {
    let mut next = book.clone();
    next.record(id, stars);
    next
}

/// A catalog record decorated with its current rating aggregate.
///
/// `average_rating` and `rating_count` are both `None` for a pharmacy that
/// was never rated, so presenters can show "no ratings yet" instead of 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedPharmacy {
    #[serde(flatten)]
    pub pharmacy: PharmacyRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<u64>,
}

impl RatedPharmacy {
    #[must_use]
    pub fn new(pharmacy: PharmacyRecord, book: &RatingBook) -> Self {
        let mut rated = Self {
            pharmacy,
            average_rating: None,
            rating_count: None,
        };
        rated.refresh(book);
        rated
    }

    /// Re-read this pharmacy's aggregate from `book`.
    pub fn refresh(&mut self, book: &RatingBook) {
        match book.get(self.pharmacy.id) {
            Some(acc) => {
                self.average_rating = acc.average();
                self.rating_count = Some(acc.count);
            }
            None => {
                self.average_rating = None;
                self.rating_count = None;
            }
        }
    }

    #[must_use]
    pub fn id(&self) -> PharmacyId {
        self.pharmacy.id
    }

    #[must_use]
    pub fn distance_from(&self, origin: Coordinates) -> f64 {
        distance_km(origin, self.pharmacy.coordinates)
    }
}

/// Decorate every catalog entry, in catalog order.
#[must_use]
pub fn decorate(catalog: &[PharmacyRecord], book: &RatingBook) -> Vec<RatedPharmacy> {
    catalog
        .iter()
        .map(|p| RatedPharmacy::new(p.clone(), book))
        .collect()
}
