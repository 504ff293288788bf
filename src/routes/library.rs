//! Favorites, watchlist and sidebar routes.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::services::library::WatchlistEntry;
use crate::state::AppState;
use crate::storage::StorageError;
use crate::tmdb::Movie;

#[derive(Debug, Serialize, Deserialize)]
pub struct SidebarState {
    pub collapsed: bool,
}

fn storage_error(err: &StorageError) -> ApiError {
    ApiError::from_domain(StatusCode::INTERNAL_SERVER_ERROR, err)
}

fn not_in_library(id: u64) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "E_NOT_IN_LIBRARY", format!("movie {id} is not in the list"))
}

fn validate(movie: &Movie) -> Result<(), ApiError> {
    if movie.id == 0 {
        return Err(ApiError::bad_request("E_INVALID_MOVIE", "movie id is required"));
    }
    Ok(())
}

// =============================================================================
// FAVORITES
// =============================================================================

/// `GET /api/favorites`
pub async fn list_favorites(State(state): State<AppState>) -> Json<Vec<Movie>> {
    Json(state.library.favorites())
}

/// `POST /api/favorites` — `201` when added, `200` when already present.
pub async fn add_favorite(
    State(state): State<AppState>,
    Json(movie): Json<Movie>,
) -> Result<(StatusCode, Json<Vec<Movie>>), ApiError> {
    validate(&movie)?;
    let added = state.library.add_favorite(movie).map_err(|e| storage_error(&e))?;
    let status = if added { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(state.library.favorites())))
}

/// `DELETE /api/favorites/{id}`
pub async fn remove_favorite(State(state): State<AppState>, Path(id): Path<u64>) -> Result<StatusCode, ApiError> {
    if state.library.remove_favorite(id).map_err(|e| storage_error(&e))? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_in_library(id))
    }
}

// =============================================================================
// WATCHLIST
// =============================================================================

/// `GET /api/watchlist`
pub async fn list_watchlist(State(state): State<AppState>) -> Json<Vec<WatchlistEntry>> {
    Json(state.library.watchlist())
}

/// `POST /api/watchlist` — stamps the entry with the current time.
pub async fn add_to_watchlist(
    State(state): State<AppState>,
    Json(movie): Json<Movie>,
) -> Result<(StatusCode, Json<Vec<WatchlistEntry>>), ApiError> {
    validate(&movie)?;
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let added = state
        .library
        .add_to_watchlist(movie, now)
        .map_err(|e| storage_error(&e))?;
    let status = if added { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(state.library.watchlist())))
}

/// `DELETE /api/watchlist/{id}`
pub async fn remove_from_watchlist(State(state): State<AppState>, Path(id): Path<u64>) -> Result<StatusCode, ApiError> {
    if state.library.remove_from_watchlist(id).map_err(|e| storage_error(&e))? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_in_library(id))
    }
}

// =============================================================================
// SIDEBAR
// =============================================================================

/// `GET /api/sidebar`
pub async fn get_sidebar(State(state): State<AppState>) -> Json<SidebarState> {
    Json(SidebarState { collapsed: state.library.sidebar_collapsed() })
}

/// `PUT /api/sidebar`
pub async fn set_sidebar(
    State(state): State<AppState>,
    Json(body): Json<SidebarState>,
) -> Result<Json<SidebarState>, ApiError> {
    state
        .library
        .set_sidebar_collapsed(body.collapsed)
        .map_err(|e| storage_error(&e))?;
    Ok(Json(SidebarState { collapsed: state.library.sidebar_collapsed() }))
}
