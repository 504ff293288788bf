//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Presentation is an external renderer. It reads session state and drives
//! the region, theme and library operations through this JSON API; catalog
//! routes are thin pass-throughs to TMDB.

pub mod library;
pub mod movies;
pub mod region;
pub mod theme;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/region", get(region::get_region))
        .route("/api/region/refresh", post(region::refresh))
        .route("/api/region/consent/allow", post(region::allow))
        .route("/api/region/consent/deny", post(region::deny))
        .route("/api/region/selected", put(region::select).delete(region::restore_automatic))
        .route("/api/theme", get(theme::get_theme).put(theme::set_mode))
        .route("/api/theme/toggle", post(theme::toggle))
        .route("/api/favorites", get(library::list_favorites).post(library::add_favorite))
        .route("/api/favorites/{id}", delete(library::remove_favorite))
        .route("/api/watchlist", get(library::list_watchlist).post(library::add_to_watchlist))
        .route("/api/watchlist/{id}", delete(library::remove_from_watchlist))
        .route("/api/sidebar", get(library::get_sidebar).put(library::set_sidebar))
        .route("/api/search", get(movies::search))
        .route("/api/search/suggestions", get(movies::suggestions))
        .route("/api/discover", get(movies::discover))
        .route("/api/movies/{id}", get(movies::movie_details))
        .route("/api/movies/{id}/providers", get(movies::watch_providers))
        .route("/api/people/{id}", get(movies::person_details))
        .route("/api/health/fallbacks", get(movies::fallbacks))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
