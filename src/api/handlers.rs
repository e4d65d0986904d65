use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{AppError, AppResult},
    middleware::{Caller, RequestId},
    models::{
        ActiveServiceSet, AvailabilityResponse, BatchAvailabilityRequest,
        BatchAvailabilityResponse, Region, ServicesResponse, TitleRef,
    },
    services::{resolve_batch, search_titles, validate_batch, SearchParams, SearchResponse},
};

use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityParams {
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub region: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Which of the caller's services carry one title
///
/// Upstream failures degrade to an empty provider list rather than an error.
pub async fn get_availability(
    State(state): State<AppState>,
    caller: Caller,
    request_id: RequestId,
    Path(id): Path<String>,
    Query(params): Query<AvailabilityParams>,
) -> AppResult<Json<AvailabilityResponse>> {
    let resolver = state.resolver()?;

    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput("invalid id".to_string()))?;
    let title = TitleRef::parse(id, params.media_type.as_deref().unwrap_or_default())?;

    let user = state.load_user(caller.id()).await?;
    let region = Region::resolve(
        params.region.as_deref(),
        user.region.as_deref(),
        state.server_region.as_deref(),
    );
    let active = ActiveServiceSet::from(&user);

    // Cancelled when the client disconnects and this future is dropped
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    tracing::debug!(
        request_id = %request_id,
        title = %title,
        region = %region,
        active_services = active.len(),
        "Resolving availability"
    );

    let availability = resolver
        .resolve_or_degrade(title, &region, &active, &cancel)
        .await;

    Ok(Json(AvailabilityResponse {
        region: region.to_string(),
        availability,
    }))
}

/// Availability for up to 500 titles, keyed `<type>_<id>`
pub async fn batch_availability(
    State(state): State<AppState>,
    caller: Caller,
    request_id: RequestId,
    Query(params): Query<AvailabilityParams>,
    body: Result<Json<BatchAvailabilityRequest>, JsonRejection>,
) -> AppResult<Json<BatchAvailabilityResponse>> {
    let resolver = state.resolver()?;

    let Json(request) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected batch body");
        AppError::InvalidInput("invalid request body".to_string())
    })?;

    let titles = validate_batch(&request.items)?;

    let user = state.load_user(caller.id()).await?;

    // A well-formed body region overrides the query/user/server chain
    let body_region = request
        .region
        .as_deref()
        .map(str::trim)
        .filter(|r| r.len() == 2 && r.chars().all(|c| c.is_ascii_alphabetic()));
    let region = match body_region {
        Some(r) => Region::resolve(Some(r), None, None),
        None => Region::resolve(
            params.region.as_deref(),
            user.region.as_deref(),
            state.server_region.as_deref(),
        ),
    };
    let active = ActiveServiceSet::from(&user);

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    tracing::info!(
        request_id = %request_id,
        items = titles.len(),
        region = %region,
        user_id = caller.id(),
        "Batch availability requested"
    );

    let results = resolve_batch(resolver, &titles, &region, &active, &cancel).await;

    Ok(Json(BatchAvailabilityResponse {
        region: region.to_string(),
        results,
    }))
}

/// The service catalog with the caller's active subscriptions flagged
///
/// Needs neither TMDb nor the cache, so it answers even when lookups are 503.
pub async fn list_services(
    State(state): State<AppState>,
    caller: Caller,
) -> AppResult<Json<ServicesResponse>> {
    let user = state.load_user(caller.id()).await?;
    Ok(Json(ServicesResponse::for_user(&ActiveServiceSet::from(&user))))
}

/// Title search
pub async fn search(
    State(state): State<AppState>,
    _caller: Caller,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchResponse>> {
    let provider = state.provider()?;
    let query = params.into_query(state.server_region.as_deref())?;

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let page = search_titles(&state.cache, provider, &query, &cancel).await?;

    Ok(Json(SearchResponse::new(query, page)))
}
