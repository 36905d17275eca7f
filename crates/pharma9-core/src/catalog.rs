use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::{ConfigError, PharmacyId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hours {
    pub standard: String,
    pub on_duty: String,
}

/// Immutable catalog entry for one pharmacy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacyRecord {
    pub id: PharmacyId,
    pub name: String,
    pub owner: String,
    pub address: String,
    pub neighborhood: String,
    pub phone: String,
    pub coordinates: Coordinates,
    /// Part of the current night/emergency rotation.
    pub on_duty: bool,
    pub hours: Hours,
}

impl PharmacyRecord {
    /// Badge shown next to the name in list and detail views.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        if self.on_duty {
            "DE GARDE"
        } else {
            "OUVERT"
        }
    }

    /// Opening hours relevant to the current duty status.
    #[must_use]
    pub fn current_hours(&self) -> &str {
        if self.on_duty {
            &self.hours.on_duty
        } else {
            &self.hours.standard
        }
    }

    /// Turn-by-turn directions link for the external maps provider.
    #[must_use]
    pub fn directions_url(&self) -> String {
        format!(
            "https://www.google.com/maps/dir/?api=1&destination={},{}",
            self.coordinates.lat, self.coordinates.lng
        )
    }
}

/// A written customer review. Independent from star submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: u32,
    pub pharmacy_id: PharmacyId,
    pub reviewer_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// The fixed, insertion-ordered pharmacy catalog plus its sample reviews.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    pub pharmacies: Vec<PharmacyRecord>,
    #[serde(default)]
    pub reviews: Vec<ReviewRecord>,
}

impl Catalog {
    #[must_use]
    pub fn get(&self, id: PharmacyId) -> Option<&PharmacyRecord> {
        self.pharmacies.iter().find(|p| p.id == id)
    }

    /// Reviews for one pharmacy, newest first.
    #[must_use]
    pub fn reviews_for(&self, id: PharmacyId) -> Vec<&ReviewRecord> {
        let mut reviews: Vec<&ReviewRecord> =
            self.reviews.iter().filter(|r| r.pharmacy_id == id).collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reviews
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pharmacies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pharmacies.is_empty()
    }
}

/// Load and validate the catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<Catalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalog = parse_catalog(&content)?;
    tracing::debug!(
        path = %path.display(),
        pharmacies = catalog.pharmacies.len(),
        reviews = catalog.reviews.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Parse and validate a catalog from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text does not parse or fails validation.
pub fn parse_catalog(yaml: &str) -> Result<Catalog, ConfigError> {
    let catalog: Catalog = serde_yaml::from_str(yaml)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn validate_catalog(catalog: &Catalog) -> Result<(), ConfigError> {
    if catalog.pharmacies.is_empty() {
        return Err(ConfigError::Validation(
            "catalog must contain at least one pharmacy".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for pharmacy in &catalog.pharmacies {
        if pharmacy.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "pharmacy {} has an empty name",
                pharmacy.id
            )));
        }

        if pharmacy.neighborhood.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "pharmacy '{}' has an empty neighborhood",
                pharmacy.name
            )));
        }

        if !pharmacy.coordinates.is_valid() {
            return Err(ConfigError::Validation(format!(
                "pharmacy '{}' has invalid coordinates {}",
                pharmacy.name, pharmacy.coordinates
            )));
        }

        if !seen_ids.insert(pharmacy.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate pharmacy id {}",
                pharmacy.id
            )));
        }
    }

    let mut seen_review_ids = HashSet::new();
    for review in &catalog.reviews {
        if !seen_review_ids.insert(review.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate review id {}",
                review.id
            )));
        }

        if !seen_ids.contains(&review.pharmacy_id) {
            return Err(ConfigError::Validation(format!(
                "review {} references unknown pharmacy {}",
                review.id, review.pharmacy_id
            )));
        }

        if !(1..=5).contains(&review.rating) {
            return Err(ConfigError::Validation(format!(
                "review {} has invalid rating {}; must be 1 to 5",
                review.id, review.rating
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
