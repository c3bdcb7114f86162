use concession_mapbox::MapboxError;
use thiserror::Error;

/// Failures of the platform position source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("geolocation permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("geolocation timed out")]
    Timeout,
}

/// Failures of a user-initiated locate or directions action.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error("address not found: \"{0}\"")]
    AddressNotFound(String),

    #[error("no route available: {0}")]
    RouteUnavailable(String),

    #[error("no user position has been resolved yet")]
    NoUserPosition,

    #[error("location service failure: {0}")]
    Transport(#[source] MapboxError),
}

impl LocateError {
    /// Maps a geocoding failure: zero results become
    /// [`LocateError::AddressNotFound`], everything else is transport.
    #[must_use]
    pub fn from_geocode(err: MapboxError) -> Self {
        match err {
            MapboxError::NotFound { query } => LocateError::AddressNotFound(query),
            other => LocateError::Transport(other),
        }
    }

    #[must_use]
    pub fn from_route(err: MapboxError) -> Self {
        match err {
            MapboxError::RouteUnavailable { reason } => LocateError::RouteUnavailable(reason),
            other => LocateError::Transport(other),
        }
    }

    /// Message shown to the visitor in a blocking alert.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            LocateError::Geolocation(GeolocationError::PermissionDenied) => {
                "Vous avez refusé l'accès à votre position. Autorisez la géolocalisation ou saisissez une adresse."
            }
            LocateError::Geolocation(GeolocationError::PositionUnavailable) => {
                "Votre position est indisponible pour le moment. Saisissez une adresse ou un code postal."
            }
            LocateError::Geolocation(GeolocationError::Timeout) => {
                "La géolocalisation a pris trop de temps. Réessayez ou saisissez une adresse."
            }
            LocateError::AddressNotFound(_) => {
                "Adresse introuvable. Essayez avec un code postal (par exemple 69007)."
            }
            LocateError::RouteUnavailable(_) => {
                "Impossible de calculer l'itinéraire vers cette concession."
            }
            LocateError::NoUserPosition => {
                "Indiquez d'abord votre position pour obtenir un itinéraire."
            }
            LocateError::Transport(_) => {
                "Le service de localisation ne répond pas. Réessayez dans quelques instants."
            }
        }
    }
}

/// Failures of the durable intent storage.
#[derive(Debug, Error)]
pub enum IntentStoreError {
    #[error("intent storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize intent: {0}")]
    Serialize(#[from] serde_json::Error),
}
