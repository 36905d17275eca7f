pub mod app_config;
pub mod catalog;
pub mod cluster;
mod collate;
pub mod config;
pub mod geo;
pub mod query;
pub mod ratings;
pub mod share;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, parse_catalog, Catalog, Hours, PharmacyRecord, ReviewRecord};
pub use cluster::{
    cluster_markers, BoundsProjection, Cluster, FocusedIds, MapItem, MapProjection,
    ProjectedPharmacy, ScreenPosition, DEFAULT_GRID_SIZE,
};
pub use collate::locale_cmp;
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_km, Coordinates, DAKAR_CENTER, EARTH_RADIUS_KM};
pub use query::{
    neighborhood_options, query, DutyFilter, Filters, NeighborhoodFilter, SortMode,
    ALL_NEIGHBORHOODS,
};
pub use ratings::{apply_rating, decorate, RatedPharmacy, RatingAccumulator, RatingBook, Stars};
pub use share::{clipboard_text, share_payload, SharePayload};

/// Stable catalog identifier of a pharmacy.
pub type PharmacyId = u32;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid star rating {0}; must be between 1 and 5")]
    InvalidStars(u8),

    #[error("unknown pharmacy id {0}")]
    UnknownPharmacy(PharmacyId),

    #[error("invalid {field} value '{value}'")]
    InvalidOption { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
pub(crate) mod fixtures;
