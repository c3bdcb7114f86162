//! Shared HTTP plumbing for the Mapbox APIs.
//!
//! Holds the `reqwest` client, the access token and the base URL. Every
//! request carries the token as the `access_token` query parameter, which is
//! how Mapbox expects public tokens to be sent.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::MapboxError;

const DEFAULT_BASE_URL: &str = "https://api.mapbox.com/";

/// Client for the hosted Mapbox APIs.
///
/// Use [`MapboxClient::new`] for production or [`MapboxClient::with_base_url`]
/// to point at a mock server in tests. Cloning is cheap; the geocoding and
/// routing clients share one instance.
#[derive(Clone)]
pub struct MapboxClient {
    client: Client,
    access_token: String,
    base_url: Url,
}

impl std::fmt::Debug for MapboxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapboxClient")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl MapboxClient {
    /// Creates a client pointed at the production Mapbox API.
    ///
    /// # Errors
    ///
    /// Returns [`MapboxError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, MapboxError> {
        Self::with_base_url(access_token, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MapboxError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`MapboxError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, MapboxError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| MapboxError::InvalidBaseUrl(format!("'{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(MapboxError::InvalidBaseUrl(format!(
                "'{base_url}' cannot carry a path"
            )));
        }

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            base_url,
        })
    }

    /// Builds a request URL from path segments and query parameters.
    ///
    /// Segments are percent-encoded individually, so free text typed by the
    /// user can be passed as the last segment. `access_token` is appended
    /// after `params`.
    pub(crate) fn build_url(&self, segments: &[&str], params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("access_token", &self.access_token);
        }
        url
    }

    /// Sends a GET request and returns the status together with the body
    /// text. Status handling is left to the caller because the geocoding and
    /// directions endpoints map failures differently.
    ///
    /// # Errors
    ///
    /// Returns [`MapboxError::Http`] on network failure.
    pub(crate) async fn get_text(
        &self,
        url: &Url,
    ) -> Result<(reqwest::StatusCode, String), MapboxError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

/// Endpoint label for logs and errors, with the access token stripped.
pub(crate) fn endpoint_label(url: &Url) -> String {
    format!(
        "{}{}",
        url.host_str().unwrap_or_default(),
        url.path()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> MapboxClient {
        MapboxClient::with_base_url("pk.test", 30, "concession-test/0.1", base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_appends_segments_and_token() {
        let client = test_client("https://api.mapbox.com");
        let url = client.build_url(
            &["geocoding", "v5", "mapbox.places", "69007.json"],
            &[("limit", "5")],
        );
        assert_eq!(
            url.as_str(),
            "https://api.mapbox.com/geocoding/v5/mapbox.places/69007.json?limit=5&access_token=pk.test"
        );
    }

    #[test]
    fn build_url_keeps_base_path_prefix() {
        let client = test_client("http://localhost:9000/proxy/");
        let url = client.build_url(&["directions", "v5"], &[]);
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/proxy/directions/v5?access_token=pk.test"
        );
    }

    #[test]
    fn build_url_encodes_free_text_segment() {
        let client = test_client("https://api.mapbox.com");
        let url = client.build_url(&["12 rue de la Paix/Paris.json"], &[]);
        assert!(
            url.path().contains("12%20rue%20de%20la%20Paix%2FParis.json"),
            "segment should be percent-encoded: {url}"
        );
    }

    #[test]
    fn endpoint_label_hides_token() {
        let client = test_client("https://api.mapbox.com");
        let url = client.build_url(&["directions"], &[]);
        let label = endpoint_label(&url);
        assert_eq!(label, "api.mapbox.com/directions");
        assert!(!label.contains("pk.test"));
    }

    #[test]
    fn debug_redacts_token() {
        let client = test_client("https://api.mapbox.com");
        assert!(!format!("{client:?}").contains("pk.test"));
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let result = MapboxClient::with_base_url("pk.test", 30, "ua", "not a url");
        assert!(matches!(result, Err(MapboxError::InvalidBaseUrl(_))));
    }
}
