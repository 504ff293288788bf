//! Region routes: snapshot, refresh, consent, manual override.
//!
//! Every mutating route waits for the resolution it triggers and answers
//! with the resulting snapshot.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::geo::UserLocation;
use crate::region::{RegionPermission, RegionalContent};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RegionSnapshot {
    pub permission: RegionPermission,
    pub selected_region: Option<String>,
    pub location: Option<UserLocation>,
    pub content: Option<RegionalContent>,
    pub show_consent_modal: bool,
    pub loading: bool,
}

#[derive(Debug, Deserialize)]
pub struct SelectRegionBody {
    pub region_code: String,
}

async fn snapshot(state: &AppState) -> RegionSnapshot {
    let session = state.session.snapshot().await;
    RegionSnapshot {
        permission: state.region.permission(),
        selected_region: state.region.selected_region(),
        location: session.location,
        content: session.regional_content,
        show_consent_modal: session.show_consent_modal,
        loading: session.loading_regional,
    }
}

/// `GET /api/region`
pub async fn get_region(State(state): State<AppState>) -> Json<RegionSnapshot> {
    Json(snapshot(&state).await)
}

/// `POST /api/region/refresh`
pub async fn refresh(State(state): State<AppState>) -> Json<RegionSnapshot> {
    state.region.resolve_region_and_load_content(false).await;
    Json(snapshot(&state).await)
}

/// `POST /api/region/consent/allow`
pub async fn allow(State(state): State<AppState>) -> Json<RegionSnapshot> {
    state.region.allow().await;
    Json(snapshot(&state).await)
}

/// `POST /api/region/consent/deny`
pub async fn deny(State(state): State<AppState>) -> Json<RegionSnapshot> {
    state.region.deny().await;
    Json(snapshot(&state).await)
}

/// `PUT /api/region/selected`
pub async fn select(
    State(state): State<AppState>,
    Json(body): Json<SelectRegionBody>,
) -> Result<Json<RegionSnapshot>, ApiError> {
    state
        .region
        .select_region(&body.region_code)
        .await
        .map_err(|e| ApiError::from_domain(StatusCode::BAD_REQUEST, &e))?;
    Ok(Json(snapshot(&state).await))
}

/// `DELETE /api/region/selected`
pub async fn restore_automatic(State(state): State<AppState>) -> Json<RegionSnapshot> {
    state.region.restore_automatic().await;
    Json(snapshot(&state).await)
}
