use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One provider entry inside a region bucket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderEntry {
    pub provider_id: i64,
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default)]
    pub display_priority: Option<i32>,
}

/// Per-region provider buckets, in upstream order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegionProviders {
    #[serde(default)]
    pub link: Option<String>,
    /// Subscription tier
    #[serde(default)]
    pub flatrate: Vec<ProviderEntry>,
    #[serde(default)]
    pub free: Vec<ProviderEntry>,
    #[serde(default)]
    pub ads: Vec<ProviderEntry>,
    #[serde(default)]
    pub buy: Vec<ProviderEntry>,
    #[serde(default)]
    pub rent: Vec<ProviderEntry>,
}

/// Full watch-provider listing for one title, keyed by region code.
///
/// This is both the upstream response body and the cached value for providers keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvidersValue {
    pub id: i64,
    #[serde(default)]
    pub results: HashMap<String, RegionProviders>,
    #[serde(default = "Utc::now")]
    pub fetched_at: DateTime<Utc>,
}

impl ProvidersValue {
    pub fn region(&self, region: &str) -> Option<&RegionProviders> {
        self.results.get(region)
    }
}
