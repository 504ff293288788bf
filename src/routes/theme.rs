//! Theme routes.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::theme::{ResolvedTheme, SunWindow, ThemeMode};

#[derive(Debug, Serialize)]
pub struct ThemeSnapshot {
    pub mode: ThemeMode,
    pub resolved: Option<ResolvedTheme>,
    /// Present only in `auto`.
    pub sun_window: Option<SunWindow>,
}

#[derive(Debug, Deserialize)]
pub struct SetModeBody {
    pub mode: ThemeMode,
}

async fn snapshot(state: &AppState) -> ThemeSnapshot {
    state
        .session
        .read(|s| ThemeSnapshot { mode: s.theme_mode, resolved: s.resolved_theme, sun_window: s.sun_window })
        .await
}

/// `GET /api/theme`
pub async fn get_theme(State(state): State<AppState>) -> Json<ThemeSnapshot> {
    Json(snapshot(&state).await)
}

/// `PUT /api/theme`
pub async fn set_mode(State(state): State<AppState>, Json(body): Json<SetModeBody>) -> Json<ThemeSnapshot> {
    state.theme.set_mode(body.mode).await;
    Json(snapshot(&state).await)
}

/// `POST /api/theme/toggle`
pub async fn toggle(State(state): State<AppState>) -> Json<ThemeSnapshot> {
    state.theme.toggle().await;
    Json(snapshot(&state).await)
}
