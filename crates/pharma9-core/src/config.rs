use crate::app_config::{AppConfig, Environment};
use crate::geo::Coordinates;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn invalid(var: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; the lookup is injected so tests can use a
/// plain `HashMap` instead of mutating the process environment.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::str::FromStr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e))
    };

    let env = parse_environment(&or_default("PHARMA9_ENV", "development"))?;

    let bind_addr = or_default("PHARMA9_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("PHARMA9_BIND_ADDR", e))?;
    let log_level = or_default("PHARMA9_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default("PHARMA9_CATALOG_PATH", "./config/pharmacies.yaml"));
    let ratings_path = PathBuf::from(or_default(
        "PHARMA9_RATINGS_PATH",
        "./data/pharmacy_ratings.json",
    ));

    let default_origin = Coordinates::from_str(&or_default(
        "PHARMA9_DEFAULT_ORIGIN",
        "14.7167,-17.4677",
    ))
    .map_err(|e| invalid("PHARMA9_DEFAULT_ORIGIN", e))?;

    let cluster_grid_size = or_default("PHARMA9_CLUSTER_GRID_SIZE", "8")
        .parse::<f64>()
        .map_err(|e| invalid("PHARMA9_CLUSTER_GRID_SIZE", e))?;
    if !(cluster_grid_size.is_finite() && cluster_grid_size > 0.0) {
        return Err(invalid(
            "PHARMA9_CLUSTER_GRID_SIZE",
            "must be a positive number",
        ));
    }

    let location_timeout_ms = parse_u64("PHARMA9_LOCATION_TIMEOUT_MS", "10000")?;
    let location_max_age_ms = parse_u64("PHARMA9_LOCATION_MAX_AGE_MS", "0")?;
    let location_high_accuracy = or_default("PHARMA9_LOCATION_HIGH_ACCURACY", "true")
        .parse::<bool>()
        .map_err(|e| invalid("PHARMA9_LOCATION_HIGH_ACCURACY", e))?;

    let public_url = or_default("PHARMA9_PUBLIC_URL", "http://localhost:3000");
    let rating_limit_per_minute = parse_usize("PHARMA9_RATING_LIMIT_PER_MINUTE", "30")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        catalog_path,
        ratings_path,
        default_origin,
        cluster_grid_size,
        location_timeout_ms,
        location_max_age_ms,
        location_high_accuracy,
        public_url,
        rating_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(invalid(
            "PHARMA9_ENV",
            format!("unknown environment '{other}'; expected development, test, or production"),
        )),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
