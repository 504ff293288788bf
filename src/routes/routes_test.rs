use super::*;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::geo::GeoError;
use crate::geo::test_helpers::{StaticLocator, location};
use crate::state::test_helpers::test_app_state;
use crate::tmdb::test_helpers::MockCatalog;

fn nigeria() -> Arc<StaticLocator> {
    Arc::new(StaticLocator::ok(location("Nigeria", "NG", Some(3600))))
}

fn state_with(catalog: MockCatalog) -> AppState {
    test_app_state(Arc::new(catalog), nigeria())
}

async fn call(state: &AppState, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app(state.clone())
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn healthz_is_ok() {
    let state = state_with(MockCatalog::new());
    let (status, _) = call(&state, Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
}

// =========================================================================
// Region
// =========================================================================

#[tokio::test]
async fn first_visit_refresh_asks_for_consent() {
    let state = state_with(MockCatalog::new());

    let (status, body) = call(&state, Method::POST, "/api/region/refresh", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["permission"], "unset");
    assert_eq!(body["show_consent_modal"], true);
    assert!(body["content"].is_null());
}

#[tokio::test]
async fn allow_loads_content_for_located_region() {
    let state = state_with(MockCatalog::new());

    let (status, body) = call(&state, Method::POST, "/api/region/consent/allow", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["permission"], "granted");
    assert_eq!(body["show_consent_modal"], false);
    assert_eq!(body["content"]["region_code"], "NG");
    assert_eq!(body["content"]["country_name"], "Nigeria");
    assert_eq!(body["content"]["popular"][0]["title"], "popular NG");
    assert_eq!(body["location"]["city"], "Lagos");
}

#[tokio::test]
async fn deny_uses_default_region() {
    let state = state_with(MockCatalog::new());

    let (_, body) = call(&state, Method::POST, "/api/region/consent/deny", None).await;

    assert_eq!(body["permission"], "denied");
    assert_eq!(body["content"]["region_code"], "US");
}

#[tokio::test]
async fn manual_region_round_trip() {
    let state = state_with(MockCatalog::new());

    let (status, body) = call(&state, Method::PUT, "/api/region/selected", Some(json!({"region_code": "jp"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected_region"], "JP");
    assert_eq!(body["content"]["region_code"], "JP");

    let (_, body) = call(&state, Method::DELETE, "/api/region/selected", None).await;
    assert!(body["selected_region"].is_null());
    // Consent still unset: restoring automatic falls back to the prompt.
    assert_eq!(body["show_consent_modal"], true);
}

#[tokio::test]
async fn invalid_region_code_is_rejected() {
    let state = state_with(MockCatalog::new());

    let (status, body) = call(&state, Method::PUT, "/api/region/selected", Some(json!({"region_code": "USA"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E_INVALID_REGION_CODE");
    assert_eq!(body["retryable"], false);
}

// =========================================================================
// Theme
// =========================================================================

#[tokio::test]
async fn theme_mode_change_is_reflected() {
    let state = state_with(MockCatalog::new());

    let (status, body) = call(&state, Method::PUT, "/api/theme", Some(json!({"mode": "night"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "night");
    assert_eq!(body["resolved"], "night");
    assert!(body["sun_window"].is_null());

    let (_, body) = call(&state, Method::POST, "/api/theme/toggle", None).await;
    assert_eq!(body["mode"], "day");
    assert_eq!(body["resolved"], "day");

    let (_, body) = call(&state, Method::GET, "/api/theme", None).await;
    assert_eq!(body["mode"], "day");
}

#[tokio::test]
async fn auto_mode_exposes_sun_window() {
    let state = state_with(MockCatalog::new());

    let (_, body) = call(&state, Method::PUT, "/api/theme", Some(json!({"mode": "auto"}))).await;

    assert_eq!(body["mode"], "auto");
    assert!(body["resolved"] == "day" || body["resolved"] == "night");
    assert!(body["sun_window"]["sunrise"].is_string());
}

#[tokio::test]
async fn unknown_theme_mode_is_rejected() {
    let state = state_with(MockCatalog::new());
    let (status, _) = call(&state, Method::PUT, "/api/theme", Some(json!({"mode": "dusk"}))).await;
    assert!(status.is_client_error());
}

// =========================================================================
// Library
// =========================================================================

#[tokio::test]
async fn favorites_add_is_idempotent() {
    let state = state_with(MockCatalog::new());
    let heat = json!({"id": 949, "title": "Heat"});

    let (status, body) = call(&state, Method::POST, "/api/favorites", Some(heat.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = call(&state, Method::POST, "/api/favorites", Some(heat)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = call(&state, Method::DELETE, "/api/favorites/949", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = call(&state, Method::DELETE, "/api/favorites/949", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E_NOT_IN_LIBRARY");
}

#[tokio::test]
async fn favorite_without_id_is_rejected() {
    let state = state_with(MockCatalog::new());
    let (status, body) = call(&state, Method::POST, "/api/favorites", Some(json!({"title": "No id"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E_INVALID_MOVIE");
}

#[tokio::test]
async fn watchlist_entries_are_timestamped() {
    let state = state_with(MockCatalog::new());

    let (status, body) = call(&state, Method::POST, "/api/watchlist", Some(json!({"id": 438631, "title": "Dune"}))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body[0]["id"], 438_631);
    assert!(body[0]["added_at"].as_i64().unwrap() > 0);

    let (_, body) = call(&state, Method::GET, "/api/watchlist", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn sidebar_flag_persists() {
    let state = state_with(MockCatalog::new());

    let (_, body) = call(&state, Method::GET, "/api/sidebar", None).await;
    assert_eq!(body["collapsed"], false);

    let (_, body) = call(&state, Method::PUT, "/api/sidebar", Some(json!({"collapsed": true}))).await;
    assert_eq!(body["collapsed"], true);
    assert!(state.library.sidebar_collapsed());
}

// =========================================================================
// Catalog
// =========================================================================

#[tokio::test]
async fn suggestions_route_returns_deduplicated_titles() {
    let state = state_with(MockCatalog::with_search_titles(&["Heat", "heat", "Heathers"]));

    let (status, body) = call(&state, Method::GET, "/api/search/suggestions?q=hea", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["superseded"], false);
    let titles: Vec<&str> = body["suggestions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Heat", "Heathers"]);
}

#[tokio::test]
async fn search_requires_a_query() {
    let state = state_with(MockCatalog::with_search_titles(&["Heat"]));

    let (status, body) = call(&state, Method::GET, "/api/search?q=%20", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E_EMPTY_QUERY");

    let (status, body) = call(&state, Method::GET, "/api/search?q=heat&page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 2);
    assert_eq!(body["results"][0]["title"], "Heat");
}

#[tokio::test]
async fn search_failure_maps_to_bad_gateway() {
    let catalog = MockCatalog::new();
    *catalog.fail_search.lock().unwrap() = true;
    let state = state_with(catalog);

    let (status, body) = call(&state, Method::GET, "/api/search?q=heat", None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "E_TMDB_STATUS");
    assert_eq!(body["retryable"], true);
}

#[tokio::test]
async fn movie_details_and_not_found() {
    let state = state_with(MockCatalog::new());

    let (status, body) = call(&state, Method::GET, "/api/movies/42", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 42);
    assert_eq!(body["title"], "movie 42");
    assert!(body["trailer"].is_null());
    assert_eq!(body["directors"], json!([]));

    let (status, body) = call(&state, Method::GET, "/api/movies/0", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E_TMDB_STATUS");
}

#[tokio::test]
async fn providers_default_to_configured_region() {
    let state = state_with(MockCatalog::new());

    let (_, body) = call(&state, Method::GET, "/api/movies/42/providers", None).await;
    assert_eq!(body["region"], "US");
    assert!(body["providers"].is_object());

    let (_, body) = call(&state, Method::GET, "/api/movies/42/providers?region=ng", None).await;
    assert_eq!(body["region"], "NG");
    assert!(body["providers"].is_null());

    let (status, _) = call(&state, Method::GET, "/api/movies/42/providers?region=123", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn providers_follow_the_loaded_region() {
    let state = state_with(MockCatalog::new());
    call(&state, Method::PUT, "/api/region/selected", Some(json!({"region_code": "GB"}))).await;

    let (_, body) = call(&state, Method::GET, "/api/movies/42/providers", None).await;

    assert_eq!(body["region"], "GB");
}

#[tokio::test]
async fn discover_and_person_pass_through() {
    let state = state_with(MockCatalog::new());

    let (_, body) = call(&state, Method::GET, "/api/discover?region=br", None).await;
    assert_eq!(body["results"][0]["title"], "discover BR");

    let (_, body) = call(&state, Method::GET, "/api/people/7", None).await;
    assert_eq!(body["name"], "person 7");
}

#[tokio::test]
async fn fallback_counters_are_exposed() {
    let geo = Arc::new(StaticLocator::failing(GeoError::Request("offline".into())));
    let state = test_app_state(Arc::new(MockCatalog::new()), geo);

    call(&state, Method::POST, "/api/region/consent/allow", None).await;
    let (status, body) = call(&state, Method::GET, "/api/health/fallbacks", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["geolocation"], 1);
    assert_eq!(body["regional_list"], 0);
}
