//! Forward geocoding and address autocompletion.
//!
//! Short numeric input is treated as a French postal code and searched with
//! `types=postcode`; everything else searches places, localities,
//! neighbourhoods and street addresses.

use std::sync::LazyLock;

use regex::Regex;

use concession_core::Coordinate;

use crate::client::{endpoint_label, MapboxClient};
use crate::error::MapboxError;
use crate::types::{AddressSuggestion, GeocodingResponse};

const SUGGESTION_LIMIT: &str = "5";
const MIN_SUGGEST_QUERY_CHARS: usize = 2;

static POSTAL_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2,5}$").expect("valid postal prefix regex"));
static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}$").expect("valid postal code regex"));

/// Which Mapbox feature types a search is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTypes {
    PostalCode,
    General,
}

impl SearchTypes {
    /// Value of the `types` query parameter.
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            SearchTypes::PostalCode => "postcode",
            SearchTypes::General => "place,locality,neighborhood,address",
        }
    }
}

/// Search types for an autocomplete query: 2 to 5 digits is a postal-code
/// prefix.
#[must_use]
pub fn suggest_types(query: &str) -> SearchTypes {
    if POSTAL_PREFIX_RE.is_match(query.trim()) {
        SearchTypes::PostalCode
    } else {
        SearchTypes::General
    }
}

/// Search types for a full geocode: only exactly 5 digits is a postal code.
#[must_use]
pub fn geocode_types(address: &str) -> SearchTypes {
    if POSTAL_CODE_RE.is_match(address.trim()) {
        SearchTypes::PostalCode
    } else {
        SearchTypes::General
    }
}

/// Client for `mapbox.places` forward geocoding.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: MapboxClient,
    country: String,
    language: String,
}

impl GeocodingClient {
    #[must_use]
    pub fn new(client: MapboxClient, country: &str, language: &str) -> Self {
        Self {
            client,
            country: country.to_owned(),
            language: language.to_owned(),
        }
    }

    /// Ranked suggestions for partially typed input, at most five.
    ///
    /// Never fails: queries shorter than two characters, transport errors,
    /// non-2xx statuses and malformed bodies all yield an empty list.
    pub async fn suggest(&self, query: &str) -> Vec<AddressSuggestion> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGEST_QUERY_CHARS {
            return Vec::new();
        }

        let types = suggest_types(query);
        match self.search(query, types, SUGGESTION_LIMIT, true).await {
            Ok(response) => response
                .features
                .into_iter()
                .map(AddressSuggestion::from)
                .collect(),
            Err(e) => {
                tracing::debug!(query, error = %e, "address suggestion failed; returning none");
                Vec::new()
            }
        }
    }

    /// Coordinate of the top-ranked feature for `address`.
    ///
    /// # Errors
    ///
    /// - [`MapboxError::NotFound`] if `address` is blank or no feature matches.
    /// - [`MapboxError::Http`] / [`MapboxError::UnexpectedStatus`] on transport failure.
    /// - [`MapboxError::Deserialize`] if the body does not match the expected shape.
    pub async fn geocode(&self, address: &str) -> Result<Coordinate, MapboxError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(MapboxError::NotFound {
                query: String::new(),
            });
        }

        let response = self
            .search(address, geocode_types(address), "1", false)
            .await?;
        let feature = response
            .features
            .into_iter()
            .next()
            .ok_or_else(|| MapboxError::NotFound {
                query: address.to_owned(),
            })?;

        tracing::debug!(address, place = %feature.place_name, "geocoded address");
        Ok(Coordinate::from(feature.center))
    }

    async fn search(
        &self,
        query: &str,
        types: SearchTypes,
        limit: &str,
        autocomplete: bool,
    ) -> Result<GeocodingResponse, MapboxError> {
        let segment = format!("{query}.json");
        let url = self.client.build_url(
            &["geocoding", "v5", "mapbox.places", &segment],
            &[
                ("types", types.as_param()),
                ("limit", limit),
                ("autocomplete", if autocomplete { "true" } else { "false" }),
                ("country", &self.country),
                ("language", &self.language),
            ],
        );

        let (status, body) = self.client.get_text(&url).await?;
        if !status.is_success() {
            return Err(MapboxError::UnexpectedStatus {
                status: status.as_u16(),
                endpoint: endpoint_label(&url),
            });
        }

        serde_json::from_str(&body).map_err(|e| MapboxError::Deserialize {
            context: format!("geocoding(query={query})"),
            source: e,
        })
    }
}
