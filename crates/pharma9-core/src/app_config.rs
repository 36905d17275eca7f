use std::net::SocketAddr;
use std::path::PathBuf;

use crate::geo::Coordinates;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog_path: PathBuf,
    pub ratings_path: PathBuf,
    /// Origin used until a location fix arrives, and after a watch fails.
    pub default_origin: Coordinates,
    pub cluster_grid_size: f64,
    pub location_timeout_ms: u64,
    pub location_max_age_ms: u64,
    pub location_high_accuracy: bool,
    /// Base URL placed in share payloads.
    pub public_url: String,
    pub rating_limit_per_minute: usize,
}
