use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::ConfigError;

/// One dealership as declared in the facilities file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityConfig {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
}

impl FacilityConfig {
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.longitude, self.latitude)
    }

    /// Single-line postal address, skipping missing parts.
    #[must_use]
    pub fn full_address(&self) -> String {
        let locality = match (self.postal_code.as_deref(), self.city.as_deref()) {
            (Some(zip), Some(city)) => Some(format!("{zip} {city}")),
            (Some(zip), None) => Some(zip.to_owned()),
            (None, Some(city)) => Some(city.to_owned()),
            (None, None) => None,
        };
        [self.address.clone(), locality]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Deserialize)]
pub struct FacilitiesFile {
    pub facilities: Vec<FacilityConfig>,
}

/// Load and validate the facilities file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_facilities(path: &Path) -> Result<FacilitiesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FacilitiesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_facilities(&content)
}

/// Parse and validate facilities YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_facilities(content: &str) -> Result<FacilitiesFile, ConfigError> {
    let file: FacilitiesFile =
        serde_yaml::from_str(content).map_err(ConfigError::FacilitiesFileParse)?;
    validate_facilities(&file)?;
    Ok(file)
}

fn validate_facilities(file: &FacilitiesFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for facility in &file.facilities {
        if facility.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "facility id must be non-empty".to_string(),
            ));
        }
        if facility.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "facility '{}' has an empty name",
                facility.id
            )));
        }
        if !seen_ids.insert(facility.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate facility id: '{}'",
                facility.id
            )));
        }
        if !facility.coordinate().is_valid() {
            return Err(ConfigError::Validation(format!(
                "facility '{}' has out-of-range coordinates ({}, {})",
                facility.id, facility.longitude, facility.latitude
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "facilities_test.rs"]
mod tests;
