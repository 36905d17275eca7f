//! Filtering and ordering of the rated catalog for the list and map views.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::PharmacyRecord;
use crate::collate::locale_cmp;
use crate::geo::Coordinates;
use crate::ratings::RatedPharmacy;
use crate::CoreError;

/// Label of the "every neighborhood" entry in the neighborhood picker.
pub const ALL_NEIGHBORHOODS: &str = "Tous les quartiers";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyFilter {
    #[default]
    All,
    /// Only pharmacies that are not on the night rotation.
    Standard,
    OnDuty,
}

impl DutyFilter {
    #[must_use]
    pub fn matches(self, on_duty: bool) -> bool {
        match self {
            DutyFilter::All => true,
            DutyFilter::Standard => !on_duty,
            DutyFilter::OnDuty => on_duty,
        }
    }
}

impl std::fmt::Display for DutyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DutyFilter::All => write!(f, "all"),
            DutyFilter::Standard => write!(f, "standard"),
            DutyFilter::OnDuty => write!(f, "on_duty"),
        }
    }
}

impl FromStr for DutyFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(DutyFilter::All),
            "standard" => Ok(DutyFilter::Standard),
            "on_duty" => Ok(DutyFilter::OnDuty),
            other => Err(CoreError::InvalidOption {
                field: "duty",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Distance,
    Rating,
    Alpha,
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortMode::Distance => write!(f, "distance"),
            SortMode::Rating => write!(f, "rating"),
            SortMode::Alpha => write!(f, "alpha"),
        }
    }
}

impl FromStr for SortMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "distance" => Ok(SortMode::Distance),
            "rating" => Ok(SortMode::Rating),
            "alpha" => Ok(SortMode::Alpha),
            other => Err(CoreError::InvalidOption {
                field: "sort",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NeighborhoodFilter {
    #[default]
    All,
    Only(String),
}

impl NeighborhoodFilter {
    /// Build from a picker label; the [`ALL_NEIGHBORHOODS`] sentinel maps to `All`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label == ALL_NEIGHBORHOODS {
            NeighborhoodFilter::All
        } else {
            NeighborhoodFilter::Only(label.to_string())
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            NeighborhoodFilter::All => ALL_NEIGHBORHOODS,
            NeighborhoodFilter::Only(name) => name,
        }
    }

    #[must_use]
    pub fn matches(&self, neighborhood: &str) -> bool {
        match self {
            NeighborhoodFilter::All => true,
            NeighborhoodFilter::Only(name) => name == neighborhood,
        }
    }
}

/// The three list filters; a record must pass all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub search: String,
    pub duty: DutyFilter,
    pub neighborhood: NeighborhoodFilter,
}

impl Filters {
    #[must_use]
    pub fn matches(&self, pharmacy: &PharmacyRecord) -> bool {
        matches_search(&self.search, pharmacy)
            && self.duty.matches(pharmacy.on_duty)
            && self.neighborhood.matches(&pharmacy.neighborhood)
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn matches_search(term: &str, pharmacy: &PharmacyRecord) -> bool {
    let term = term.to_lowercase();
    if term.is_empty() {
        return true;
    }

    pharmacy.name.to_lowercase().contains(&term)
        || pharmacy.neighborhood.to_lowercase().contains(&term)
        || pharmacy.owner.to_lowercase().contains(&term)
        || strip_whitespace(&pharmacy.phone.to_lowercase()).contains(&strip_whitespace(&term))
}

fn rating_rank(p: &RatedPharmacy) -> (f64, u64) {
    (p.average_rating.unwrap_or(0.0), p.rating_count.unwrap_or(0))
}

/// Filter then stably sort `items`.
///
/// `Distance` with no `origin` keeps the filtered order as-is.
#[must_use]
pub fn query(
    items: &[RatedPharmacy],
    filters: &Filters,
    sort: SortMode,
    origin: Option<Coordinates>,
) -> Vec<RatedPharmacy> {
    let mut results: Vec<RatedPharmacy> = items
        .iter()
        .filter(|p| filters.matches(&p.pharmacy))
        .cloned()
        .collect();

    match (sort, origin) {
        (SortMode::Alpha, _) => {
            results.sort_by(|a, b| locale_cmp(&a.pharmacy.name, &b.pharmacy.name));
        }
        (SortMode::Rating, _) => {
            results.sort_by(|a, b| {
                let (avg_a, count_a) = rating_rank(a);
                let (avg_b, count_b) = rating_rank(b);
                avg_b
                    .total_cmp(&avg_a)
                    .then_with(|| count_b.cmp(&count_a))
            });
        }
        (SortMode::Distance, Some(origin)) => {
            let mut keyed: Vec<(f64, RatedPharmacy)> = results
                .into_iter()
                .map(|p| (p.distance_from(origin), p))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| a.total_cmp(b));
            results = keyed.into_iter().map(|(_, p)| p).collect();
        }
        (SortMode::Distance, None) => {}
    }

    results
}

/// Picker entries: the sentinel, then every distinct neighborhood of the full
/// catalog in locale order.
#[must_use]
pub fn neighborhood_options(catalog: &[PharmacyRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for pharmacy in catalog {
        if !names.contains(&pharmacy.neighborhood) {
            names.push(pharmacy.neighborhood.clone());
        }
    }
    names.sort_by(|a, b| locale_cmp(a, b));

    let mut options = Vec::with_capacity(names.len() + 1);
    options.push(ALL_NEIGHBORHOODS.to_string());
    options.extend(names);
    options
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
