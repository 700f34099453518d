use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Kakao Local REST API key
    pub kakao_rest_api_key: String,

    /// Kakao Local API base URL
    #[serde(default = "default_kakao_api_url")]
    pub kakao_api_url: String,

    /// Google Places API key
    pub google_places_api_key: String,

    /// Google Places API base URL
    #[serde(default = "default_google_api_url")]
    pub google_api_url: String,

    /// Per-call timeout for place-search requests, in seconds
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,

    /// Wall-clock budget for one recommendation pass, in seconds
    #[serde(default = "default_request_deadline_secs")]
    pub request_deadline_secs: u64,
}

fn default_kakao_api_url() -> String {
    "https://dapi.kakao.com".to_string()
}

fn default_google_api_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_search_timeout_secs() -> u64 {
    8
}

fn default_request_deadline_secs() -> u64 {
    12
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
