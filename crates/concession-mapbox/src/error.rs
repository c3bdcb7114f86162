use thiserror::Error;

/// Errors returned by the Mapbox clients.
#[derive(Debug, Error)]
pub enum MapboxError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    /// The geocoder returned zero features, or the query was empty.
    #[error("no location found for \"{query}\"")]
    NotFound { query: String },

    /// The directions API answered with a failure status or zero routes.
    #[error("no route available: {reason}")]
    RouteUnavailable { reason: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl MapboxError {
    /// `true` for failures of the transport rather than of the query itself.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            MapboxError::Http(_) | MapboxError::UnexpectedStatus { .. }
        )
    }
}
