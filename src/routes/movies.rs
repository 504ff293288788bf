//! Catalog pass-through routes, search suggestions, fallback health.
//!
//! ERROR HANDLING
//! ==============
//! Unlike the core resolvers these routes surface catalog failures: the
//! renderer asked for one specific thing and gets a typed error for it.
//! TMDB 404 stays 404, a missing API key is 503, anything else upstream is
//! 502.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::region::normalize_region_code;
use crate::services::suggestions::Suggestion;
use crate::state::{AppState, FallbackSnapshot};
use crate::tmdb::types::Video;
use crate::tmdb::{MovieDetails, MoviePage, Person, RegionProviders, TmdbError};

fn catalog_error(err: &TmdbError) -> ApiError {
    let status = match err {
        TmdbError::Status { status: 404 } => StatusCode::NOT_FOUND,
        TmdbError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    };
    ApiError::from_domain(status, err)
}

/// Requested region, else the region content is currently shown for, else
/// the configured default.
async fn effective_region(state: &AppState, requested: Option<&str>) -> Result<String, ApiError> {
    if let Some(raw) = requested {
        return normalize_region_code(raw)
            .ok_or_else(|| ApiError::bad_request("E_INVALID_REGION_CODE", format!("invalid region code: '{raw}'")));
    }
    let current = state
        .session
        .read(|s| s.regional_content.as_ref().map(|c| c.region_code.clone()))
        .await;
    Ok(current.unwrap_or_else(|| state.default_region.clone()))
}

// =============================================================================
// SEARCH
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub query: String,
    /// A newer query arrived while this one was pending; ignore the answer.
    pub superseded: bool,
    pub suggestions: Vec<Suggestion>,
}

/// `GET /api/search?q=&page=`
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<MoviePage>, ApiError> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(ApiError::bad_request("E_EMPTY_QUERY", "query must not be empty"));
    }
    let page = state
        .catalog
        .search(query, params.page.unwrap_or(1))
        .await
        .map_err(|e| catalog_error(&e))?;
    Ok(Json(page))
}

/// `GET /api/search/suggestions?q=`
pub async fn suggestions(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SuggestionsResponse> {
    let result = state.suggestions.suggest(&params.q).await;
    Json(SuggestionsResponse {
        query: params.q,
        superseded: result.is_none(),
        suggestions: result.unwrap_or_default(),
    })
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegionParams {
    pub region: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct MovieDetailsView {
    #[serde(flatten)]
    pub details: MovieDetails,
    pub trailer: Option<Video>,
    pub directors: Vec<String>,
}

impl From<MovieDetails> for MovieDetailsView {
    fn from(details: MovieDetails) -> Self {
        let trailer = details.trailer().cloned();
        let directors = details.directors().into_iter().map(str::to_string).collect();
        Self { details, trailer, directors }
    }
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub region: String,
    /// `None` when the title has no offers in `region`.
    pub providers: Option<RegionProviders>,
}

/// `GET /api/discover?region=&page=`
pub async fn discover(
    State(state): State<AppState>,
    Query(params): Query<RegionParams>,
) -> Result<Json<MoviePage>, ApiError> {
    let region = effective_region(&state, params.region.as_deref()).await?;
    let page = state
        .catalog
        .discover_by_region(&region, params.page.unwrap_or(1))
        .await
        .map_err(|e| catalog_error(&e))?;
    Ok(Json(page))
}

/// `GET /api/movies/{id}`
pub async fn movie_details(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Json<MovieDetailsView>, ApiError> {
    let details = state.catalog.movie_details(id).await.map_err(|e| catalog_error(&e))?;
    Ok(Json(details.into()))
}

/// `GET /api/movies/{id}/providers?region=`
pub async fn watch_providers(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<RegionParams>,
) -> Result<Json<ProvidersResponse>, ApiError> {
    let region = effective_region(&state, params.region.as_deref()).await?;
    let providers = state
        .catalog
        .watch_providers(id, &region)
        .await
        .map_err(|e| catalog_error(&e))?;
    Ok(Json(ProvidersResponse { region, providers }))
}

/// `GET /api/people/{id}`
pub async fn person_details(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Json<Person>, ApiError> {
    let person = state.catalog.person_details(id).await.map_err(|e| catalog_error(&e))?;
    Ok(Json(person))
}

// =============================================================================
// HEALTH
// =============================================================================

/// `GET /api/health/fallbacks`
pub async fn fallbacks(State(state): State<AppState>) -> Json<FallbackSnapshot> {
    Json(state.fallbacks.snapshot())
}
