//! Clients for the hosted Mapbox geocoding and directions APIs.

pub mod client;
pub mod directions;
pub mod error;
pub mod geocoding;
pub mod types;

pub use client::MapboxClient;
pub use directions::RoutingClient;
pub use error::MapboxError;
pub use geocoding::{geocode_types, suggest_types, GeocodingClient, SearchTypes};
pub use types::{AddressSuggestion, RouteResult};
