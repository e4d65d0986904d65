/// TMDb v3 provider
///
/// Title search: `/search/{movie|tv}`
/// Watch providers: `/{movie|tv}/{id}/watch/providers`
///
/// Authenticates with a v3 API key (query parameter) and/or a v4 bearer token.
use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{MediaType, ProvidersValue, SearchPage, SearchQuery, TitleRef, TitleSummary},
    services::providers::StreamingProvider,
};
use reqwest::{header::ACCEPT, Client as HttpClient, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;

const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w342";

#[derive(Debug, Deserialize)]
struct ApiSearchResponse {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    results: Vec<ApiSearchEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiSearchEntry {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    original_title: Option<String>,
    #[serde(default)]
    original_name: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    first_air_date: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
}

impl ApiSearchEntry {
    fn into_summary(self, media_type: MediaType) -> TitleSummary {
        let title = [self.title, self.name, self.original_title, self.original_name]
            .into_iter()
            .flatten()
            .map(|t| t.trim().to_string())
            .find(|t| !t.is_empty())
            .unwrap_or_default();

        let year = year_from_date(self.release_date.as_deref())
            .or_else(|| year_from_date(self.first_air_date.as_deref()));

        let poster_path = self.poster_path.filter(|p| !p.is_empty());

        TitleSummary {
            tmdb_id: self.id,
            title,
            year,
            media_type,
            poster_url: poster_path.as_ref().map(|p| format!("{}{}", POSTER_BASE_URL, p)),
            poster_path,
        }
    }
}

fn year_from_date(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}

/// v4 tokens are long JWT-like strings
fn looks_like_bearer(credential: &str) -> bool {
    credential.matches('.').count() >= 2 && credential.len() > 50
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    bearer_token: Option<String>,
    base_url: String,
}

impl TmdbProvider {
    /// Builds a client from raw credentials.
    ///
    /// An explicit bearer token wins over the API key. A v4 token passed as `api_key`
    /// is used as the bearer.
    pub fn new(
        api_key: Option<&str>,
        bearer_token: Option<&str>,
        base_url: &str,
        timeout: Duration,
    ) -> AppResult<Self> {
        let mut api_key = non_blank(api_key);
        let mut bearer_token = non_blank(bearer_token);

        if bearer_token.is_some() {
            api_key = None;
        } else if api_key.as_deref().is_some_and(looks_like_bearer) {
            bearer_token = api_key.take();
        }

        if api_key.is_none() && bearer_token.is_none() {
            return Err(AppError::Unavailable(
                "tmdb credentials missing (set TMDB_API_KEY or TMDB_BEARER_TOKEN)".to_string(),
            ));
        }

        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            bearer_token,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.tmdb_api_key.as_deref(),
            config.tmdb_bearer_token.as_deref(),
            &config.tmdb_base_url,
            config.tmdb_timeout(),
        )
    }

    fn authorized_get(&self, url: &str) -> RequestBuilder {
        let mut request = self.http_client.get(url).header(ACCEPT, "application/json");
        if let Some(api_key) = &self.api_key {
            request = request.query(&[("api_key", api_key)]);
        }
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        request
    }
}

#[async_trait::async_trait]
impl StreamingProvider for TmdbProvider {
    async fn search_titles(&self, query: &SearchQuery) -> AppResult<SearchPage> {
        let url = format!("{}/search/{}", self.base_url, query.media_type);

        let mut params = vec![
            ("query", query.query.clone()),
            ("include_adult", query.include_adult.to_string()),
            ("page", query.page.max(1).to_string()),
        ];
        if let Some(language) = non_blank(query.language.as_deref()) {
            params.push(("language", language));
        }
        // TMDb only filters movie searches by region
        if query.media_type == MediaType::Movie {
            if let Some(region) = non_blank(query.region.as_deref()) {
                params.push(("region", region));
            }
        }

        let response = self.authorized_get(&url).query(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(status = %status, provider = self.name(), "Title search failed");
            return Err(AppError::Upstream(format!(
                "TMDb search returned status {}",
                status
            )));
        }

        let body: ApiSearchResponse = response.json().await?;
        let results: Vec<TitleSummary> = body
            .results
            .into_iter()
            .map(|entry| entry.into_summary(query.media_type))
            .collect();

        tracing::info!(
            query = %query.query,
            results = results.len(),
            provider = self.name(),
            "Title search completed"
        );

        Ok(SearchPage {
            results,
            page: body.page,
            total_pages: body.total_pages,
        })
    }

    async fn fetch_providers(&self, title: TitleRef) -> AppResult<ProvidersValue> {
        let url = format!(
            "{}/{}/{}/watch/providers",
            self.base_url, title.media_type, title.id
        );

        let response = self.authorized_get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(
                title = %title,
                status = %status,
                provider = self.name(),
                "Watch providers request failed"
            );
            return Err(AppError::Upstream(format!(
                "TMDb providers returned status {}",
                status
            )));
        }

        let listing: ProvidersValue = response.json().await?;

        tracing::debug!(
            title = %title,
            regions = listing.results.len(),
            provider = self.name(),
            "Watch providers fetched"
        );

        Ok(listing)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
