use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the recommendation API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Maximum number of retries after a failed request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds; attempt N waits base * 2^N
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Optional ceiling on total backoff wait across one retry chain.
    /// Unset means retries are bounded only by `max_retries`.
    #[serde(default)]
    pub retry_deadline_ms: Option<u64>,

    /// Minimum time between two recommendation searches
    #[serde(default = "default_search_throttle_ms")]
    pub search_throttle_ms: u64,

    /// Number of recommendations requested when the caller does not specify
    #[serde(default = "default_count")]
    pub default_count: usize,
}

fn default_api_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_search_throttle_ms() -> u64 {
    300
}

fn default_count() -> usize {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_deadline_ms: None,
            search_throttle_ms: default_search_throttle_ms(),
            default_count: default_count(),
        }
    }
}
