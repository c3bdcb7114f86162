use crate::app_config::{AppConfig, Environment};
use crate::geo::Coordinate;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let mapbox_access_token = require("MAPBOX_ACCESS_TOKEN")?;

    let env = parse_environment(&or_default("CONCESSION_ENV", "development"))?;
    let log_level = or_default("CONCESSION_LOG_LEVEL", "info");

    let mapbox_base_url = or_default("CONCESSION_MAPBOX_BASE_URL", "https://api.mapbox.com");
    let facilities_path = PathBuf::from(or_default(
        "CONCESSION_FACILITIES_PATH",
        "./config/facilities.yaml",
    ));
    let state_dir = PathBuf::from(or_default("CONCESSION_STATE_DIR", "./.concession"));
    let map_page_url = or_default("CONCESSION_MAP_PAGE_URL", "/concessions");

    let request_timeout_secs = parse_u64("CONCESSION_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("CONCESSION_USER_AGENT", "concession/0.1 (store-locator)");
    let geocode_country = or_default("CONCESSION_GEOCODE_COUNTRY", "fr");
    let geocode_language = or_default("CONCESSION_GEOCODE_LANGUAGE", "fr");

    let route_pacing_ms = parse_u64("CONCESSION_ROUTE_PACING_MS", "150")?;
    let sort_debounce_ms = parse_u64("CONCESSION_SORT_DEBOUNCE_MS", "500")?;
    let intent_max_age_secs = parse_u64("CONCESSION_INTENT_MAX_AGE_SECS", "86400")?;

    let fixed_position = match lookup("CONCESSION_FIXED_POSITION") {
        Ok(raw) if !raw.trim().is_empty() => Some(raw.parse::<Coordinate>().map_err(|e| {
            ConfigError::InvalidEnvVar {
                var: "CONCESSION_FIXED_POSITION".to_string(),
                reason: e.to_string(),
            }
        })?),
        _ => None,
    };

    Ok(AppConfig {
        env,
        log_level,
        mapbox_access_token,
        mapbox_base_url,
        facilities_path,
        state_dir,
        map_page_url,
        request_timeout_secs,
        user_agent,
        geocode_country,
        geocode_language,
        route_pacing_ms,
        sort_debounce_ms,
        intent_max_age_secs,
        fixed_position,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CONCESSION_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
