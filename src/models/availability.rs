use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ActiveServiceSet;

/// How a title is consumed on a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessTier {
    Subscription,
    Free,
    Ads,
}

impl AccessTier {
    /// Merge and output order
    pub const PRIORITY: [AccessTier; 3] = [AccessTier::Subscription, AccessTier::Free, AccessTier::Ads];
}

/// One of the caller's services that carries the title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderAvailability {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub access: Vec<AccessTier>,
}

/// Availability of one title against the caller's active services
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityItem {
    pub providers: Vec<ProviderAvailability>,
    pub unmatched_user_services: Vec<String>,
}

impl AvailabilityItem {
    /// No providers; every active service unmatched
    pub fn unavailable(active: &ActiveServiceSet) -> Self {
        Self {
            providers: Vec::new(),
            unmatched_user_services: active.codes().map(str::to_string).collect(),
        }
    }
}

/// Single-title endpoint response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityResponse {
    pub region: String,
    #[serde(flatten)]
    pub availability: AvailabilityItem,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchItemRequest {
    pub id: i64,
    #[serde(rename = "type")]
    pub media_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchAvailabilityRequest {
    pub items: Vec<BatchItemRequest>,
    #[serde(default)]
    pub region: Option<String>,
}

/// Batch endpoint response, keyed by `<type>_<id>`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchAvailabilityResponse {
    pub region: String,
    pub results: BTreeMap<String, AvailabilityItem>,
}
