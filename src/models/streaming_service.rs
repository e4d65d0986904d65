use serde::{Deserialize, Serialize};

use super::user::ActiveServiceSet;

pub const NETFLIX: &str = "netflix";
pub const PRIME_VIDEO: &str = "prime_video";
pub const HULU: &str = "hulu";
pub const DISNEY_PLUS: &str = "disney_plus";
pub const MAX: &str = "max";
pub const APPLE_TV_PLUS: &str = "apple_tv_plus";
pub const APPLE_TV: &str = "apple_tv";
pub const PARAMOUNT_PLUS: &str = "paramount_plus";
pub const PEACOCK: &str = "peacock";

/// A streaming service known to the engine
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StreamingService {
    /// Stable lowercase service code (e.g. "prime_video")
    pub code: &'static str,
    /// Name shown to users (e.g. "Prime Video")
    pub name: &'static str,
}

/// All supported services
pub const SERVICE_CATALOG: &[StreamingService] = &[
    StreamingService { code: NETFLIX, name: "Netflix" },
    StreamingService { code: PRIME_VIDEO, name: "Prime Video" },
    StreamingService { code: HULU, name: "Hulu" },
    StreamingService { code: DISNEY_PLUS, name: "Disney+" },
    StreamingService { code: MAX, name: "Max" },
    StreamingService { code: APPLE_TV_PLUS, name: "Apple TV+" },
    StreamingService { code: APPLE_TV, name: "Apple TV" },
    StreamingService { code: PARAMOUNT_PLUS, name: "Paramount+" },
    StreamingService { code: PEACOCK, name: "Peacock" },
];

/// Display name for a service code, or the code itself when unknown
pub fn display_name(code: &str) -> &str {
    SERVICE_CATALOG
        .iter()
        .find(|s| s.code == code)
        .map(|s| s.name)
        .unwrap_or(code)
}

/// One catalog row as seen by a particular user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceStatus {
    pub code: String,
    pub name: String,
    pub active: bool,
}

/// `/api/services` response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServicesResponse {
    pub services: Vec<ServiceStatus>,
}

impl ServicesResponse {
    /// Every catalog service in catalog order, flagged by the user's active set
    pub fn for_user(active: &ActiveServiceSet) -> Self {
        let services = SERVICE_CATALOG
            .iter()
            .map(|service| ServiceStatus {
                code: service.code.to_string(),
                name: service.name.to_string(),
                active: active.contains(service.code),
            })
            .collect();
        Self { services }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceSubscription;

    #[test]
    fn test_display_name_known() {
        assert_eq!(display_name(DISNEY_PLUS), "Disney+");
        assert_eq!(display_name(PRIME_VIDEO), "Prime Video");
    }

    #[test]
    fn test_display_name_unknown_falls_back_to_code() {
        assert_eq!(display_name("crunchyroll"), "crunchyroll");
    }

    #[test]
    fn test_catalog_codes_are_unique() {
        let mut codes: Vec<_> = SERVICE_CATALOG.iter().map(|s| s.code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), SERVICE_CATALOG.len());
    }

    #[test]
    fn test_services_response_flags_active_codes() {
        let active = ActiveServiceSet::from_subscriptions(&[
            ServiceSubscription::new("Netflix", true),
            ServiceSubscription::new("hulu", false),
            ServiceSubscription::new("crunchyroll", true),
        ]);

        let response = ServicesResponse::for_user(&active);

        assert_eq!(response.services.len(), SERVICE_CATALOG.len());
        assert_eq!(response.services[0].code, NETFLIX);
        assert!(response.services[0].active);

        let hulu = response.services.iter().find(|s| s.code == HULU).unwrap();
        assert_eq!(hulu.name, "Hulu");
        assert!(!hulu.active);

        assert!(response.services.iter().all(|s| s.code != "crunchyroll"));
        assert_eq!(response.services.iter().filter(|s| s.active).count(), 1);
    }
}
