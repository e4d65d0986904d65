pub mod availability;
pub mod batch;
pub mod normalizer;
pub mod providers;
pub mod search;

pub use availability::{match_providers, AvailabilityResolver};
pub use batch::{resolve_batch, validate_batch, MAX_BATCH_SIZE, MAX_CONCURRENT_RESOLUTIONS};
pub use normalizer::{map_provider_name, normalize_provider_name};
pub use providers::{StreamingProvider, TmdbProvider};
pub use search::{search_titles, SearchParams, SearchResponse};
