use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL for the user directory. Unset means in-memory users.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL, or `disabled` / `memory`
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Upper bound on a single Redis command once connected
    #[serde(default = "default_redis_timeout_ms")]
    pub redis_timeout_ms: u64,

    /// TMDb v3 API key (a v4 token placed here is detected and used as a bearer)
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDb v4 bearer token, takes precedence over the API key
    #[serde(default)]
    pub tmdb_bearer_token: Option<String>,

    /// TMDb API base URL
    #[serde(default = "default_tmdb_base_url")]
    pub tmdb_base_url: String,

    /// Per-call timeout for outbound TMDb requests
    #[serde(default = "default_tmdb_timeout_secs")]
    pub tmdb_timeout_secs: u64,

    /// Preferred server default region
    #[serde(default)]
    pub tmdb_region: Option<String>,

    /// Secondary server default region
    #[serde(default)]
    pub default_region: Option<String>,

    #[serde(default = "default_search_cache_ttl_secs")]
    pub search_cache_ttl_secs: u64,

    #[serde(default = "default_providers_cache_ttl_secs")]
    pub providers_cache_ttl_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_timeout_ms() -> u64 {
    500
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_timeout_secs() -> u64 {
    7
}

fn default_search_cache_ttl_secs() -> u64 {
    30 * 60
}

fn default_providers_cache_ttl_secs() -> u64 {
    12 * 60 * 60
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            redis_url: default_redis_url(),
            redis_timeout_ms: default_redis_timeout_ms(),
            tmdb_api_key: None,
            tmdb_bearer_token: None,
            tmdb_base_url: default_tmdb_base_url(),
            tmdb_timeout_secs: default_tmdb_timeout_secs(),
            tmdb_region: None,
            default_region: None,
            search_cache_ttl_secs: default_search_cache_ttl_secs(),
            providers_cache_ttl_secs: default_providers_cache_ttl_secs(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Server-wide default region: `TMDB_REGION` first, then `DEFAULT_REGION`
    pub fn server_region(&self) -> Option<&str> {
        [self.tmdb_region.as_deref(), self.default_region.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|r| !r.is_empty())
    }

    pub fn search_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.search_cache_ttl_secs)
    }

    pub fn providers_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.providers_cache_ttl_secs)
    }

    pub fn redis_timeout(&self) -> Duration {
        Duration::from_millis(self.redis_timeout_ms.max(1))
    }

    pub fn tmdb_timeout(&self) -> Duration {
        Duration::from_secs(self.tmdb_timeout_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
