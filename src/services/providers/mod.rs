/// Upstream title data abstraction
///
/// The resolver and search service only talk to this trait, so the data source can be
/// swapped (or faked in tests) without touching the merge or caching logic.
use crate::{
    error::AppResult,
    models::{ProvidersValue, SearchPage, SearchQuery, TitleRef},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for upstream title data sources
///
/// Implementations are shared across concurrently running resolutions and must be
/// safe to call without extra locking.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StreamingProvider: Send + Sync {
    /// Search for titles by name
    async fn search_titles(&self, query: &SearchQuery) -> AppResult<SearchPage>;

    /// Fetch the per-region provider listing for one title
    ///
    /// Any non-success response or transport error is a hard failure; there is no
    /// partial result.
    async fn fetch_providers(&self, title: TitleRef) -> AppResult<ProvidersValue>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
