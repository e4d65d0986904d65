use crate::{
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{MediaType, SearchPage, SearchQuery, TitleSummary},
    services::providers::StreamingProvider,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Highest page the upstream search will serve
pub const MAX_SEARCH_PAGE: u32 = 1000;

/// Raw `/api/search` query string
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub page: Option<String>,
    pub include_adult: Option<String>,
    pub language: Option<String>,
    pub region: Option<String>,
}

impl SearchParams {
    /// Validates the raw parameters; `default_region` applies when none was sent.
    pub fn into_query(self, default_region: Option<&str>) -> AppResult<SearchQuery> {
        let query = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::InvalidInput("query is required".to_string()))?
            .to_string();

        let media_type = match non_blank(self.media_type) {
            Some(raw) => raw.parse::<MediaType>()?,
            None => MediaType::Movie,
        };

        let page = match non_blank(self.page) {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|p| (1..=MAX_SEARCH_PAGE).contains(p))
                .ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "invalid page; must be between 1 and {}",
                        MAX_SEARCH_PAGE
                    ))
                })?,
            None => 1,
        };

        let include_adult = match non_blank(self.include_adult) {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                AppError::InvalidInput("invalid include_adult; must be true or false".to_string())
            })?,
            None => false,
        };

        let region = non_blank(self.region)
            .or_else(|| default_region.map(str::to_string))
            .map(|r| r.trim().to_uppercase());

        Ok(SearchQuery {
            query,
            page,
            include_adult,
            language: non_blank(self.language),
            region,
            media_type,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// `/api/search` response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<TitleSummary>,
    pub page: u32,
    pub total_pages: u32,
    pub query: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub include_adult: bool,
    pub language: Option<String>,
    pub region: Option<String>,
}

impl SearchResponse {
    pub fn new(query: SearchQuery, page: SearchPage) -> Self {
        Self {
            results: page.results,
            page: page.page,
            total_pages: page.total_pages,
            query: query.query,
            media_type: query.media_type,
            include_adult: query.include_adult,
            language: query.language,
            region: query.region,
        }
    }
}

/// Title search through the cache
///
/// Delegates to the configured StreamingProvider on a miss. Upstream errors are
/// returned to the caller and never cached.
pub async fn search_titles(
    cache: &Cache,
    provider: &dyn StreamingProvider,
    query: &SearchQuery,
    cancel: &CancellationToken,
) -> AppResult<SearchPage> {
    let key = CacheKey::search(query);

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        result = cache.fetch_through(&key, || provider.search_titles(query)) => result,
    }
}
