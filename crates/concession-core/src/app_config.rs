use std::path::PathBuf;

use crate::geo::Coordinate;

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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub mapbox_access_token: String,
    pub mapbox_base_url: String,
    pub facilities_path: PathBuf,
    pub state_dir: PathBuf,
    pub map_page_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub geocode_country: String,
    pub geocode_language: String,
    /// Delay between consecutive route requests while ranking facilities.
    pub route_pacing_ms: u64,
    /// Settle window before a recomputed facility order is applied.
    pub sort_debounce_ms: u64,
    /// Pending locate intents older than this are discarded.
    pub intent_max_age_secs: u64,
    /// Stand-in for the platform geolocation API when set.
    pub fixed_position: Option<Coordinate>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("mapbox_access_token", &"[redacted]")
            .field("mapbox_base_url", &self.mapbox_base_url)
            .field("facilities_path", &self.facilities_path)
            .field("state_dir", &self.state_dir)
            .field("map_page_url", &self.map_page_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("geocode_country", &self.geocode_country)
            .field("geocode_language", &self.geocode_language)
            .field("route_pacing_ms", &self.route_pacing_ms)
            .field("sort_debounce_ms", &self.sort_debounce_ms)
            .field("intent_max_age_secs", &self.intent_max_age_secs)
            .field(
                "fixed_position",
                &self.fixed_position.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
