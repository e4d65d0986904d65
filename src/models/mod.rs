//! Domain and wire types for the availability engine.

pub mod availability;
pub mod providers;
pub mod region;
pub mod streaming_service;
pub mod title;
pub mod user;

pub use availability::{
    AccessTier, AvailabilityItem, AvailabilityResponse, BatchAvailabilityRequest,
    BatchAvailabilityResponse, BatchItemRequest, ProviderAvailability,
};
pub use providers::{ProviderEntry, ProvidersValue, RegionProviders};
pub use region::{Region, FALLBACK_REGION};
pub use streaming_service::{
    display_name, ServiceStatus, ServicesResponse, StreamingService, SERVICE_CATALOG,
};
pub use title::{MediaType, SearchPage, SearchQuery, TitleId, TitleRef, TitleSummary};
pub use user::{ActiveServiceSet, ServiceSubscription, UserRecord};
