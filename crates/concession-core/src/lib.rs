pub mod app_config;
pub mod catalog;
pub mod config;
pub mod facilities;
pub mod geo;

pub use app_config::{AppConfig, Environment};
pub use catalog::{
    find_best_match, score, SearchCriteria, VehicleCategory, VehicleRecord, CATALOG,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use facilities::{load_facilities, FacilitiesFile, FacilityConfig};
pub use geo::Coordinate;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read facilities file {path}: {source}")]
    FacilitiesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse facilities file: {0}")]
    FacilitiesFileParse(#[source] serde_yaml::Error),

    #[error("facilities validation failed: {0}")]
    Validation(String),
}
