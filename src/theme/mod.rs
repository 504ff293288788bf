//! Theme scheduler — day/night resolution from user choice or sun window.
//!
//! DESIGN
//! ======
//! `ThemeMode` is the persisted user choice; `ResolvedTheme` is always
//! derived. In `auto` the scheduler geolocates (independently of the region
//! resolver), builds a `SunWindow` for today in the location's UTC offset,
//! and resolves to `day` inside the window. The background loop recomputes
//! every tick while in `auto` and otherwise sleeps until the next
//! `ThemeModeChanged` event.
//!
//! ERROR HANDLING
//! ==============
//! Geolocation failure falls back to a fixed 06:00–18:00 window on the
//! local clock. A failed mode write is logged; the in-memory mode still
//! changes.

pub mod sun;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ErrorCode;
use crate::geo::GeoLocator;
use crate::state::{FallbackKind, FallbackStats, Session, StateEvent};
use crate::storage::{KeyValueStore, keys};

pub use sun::SunWindow;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Day,
    Night,
    #[default]
    Auto,
}

impl ThemeMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
            Self::Auto => "auto",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "day" => Some(Self::Day),
            "night" => Some(Self::Night),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    Day,
    Night,
}

impl ResolvedTheme {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Day => Self::Night,
            Self::Night => Self::Day,
        }
    }
}

impl From<ResolvedTheme> for ThemeMode {
    fn from(theme: ResolvedTheme) -> Self {
        match theme {
            ResolvedTheme::Day => Self::Day,
            ResolvedTheme::Night => Self::Night,
        }
    }
}

// =============================================================================
// SCHEDULER
// =============================================================================

#[derive(Clone)]
pub struct ThemeScheduler {
    store: Arc<dyn KeyValueStore>,
    geo: Arc<dyn GeoLocator>,
    session: Session,
    fallbacks: FallbackStats,
    tick: Duration,
    /// Clock offset used when no location offset is known.
    local_offset: UtcOffset,
    generation: Arc<AtomicU64>,
}

impl ThemeScheduler {
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        geo: Arc<dyn GeoLocator>,
        session: Session,
        fallbacks: FallbackStats,
        tick: Duration,
        local_offset: UtcOffset,
    ) -> Self {
        Self { store, geo, session, fallbacks, tick, local_offset, generation: Arc::new(AtomicU64::new(0)) }
    }

    /// Persisted mode, `auto` when absent or unrecognised.
    #[must_use]
    pub fn stored_mode(store: &dyn KeyValueStore) -> ThemeMode {
        store
            .get(keys::THEME_MODE)
            .as_deref()
            .and_then(ThemeMode::parse)
            .unwrap_or_default()
    }

    pub async fn update_theme(&self) -> ResolvedTheme {
        self.update_theme_at(OffsetDateTime::now_utc()).await
    }

    /// Resolve the theme for instant `now` and store it in the session.
    pub async fn update_theme_at(&self, now: OffsetDateTime) -> ResolvedTheme {
        let ticket = self.generation.load(Ordering::SeqCst);
        let mode = self.session.read(|s| s.theme_mode).await;

        let (theme, window) = match mode {
            ThemeMode::Day => (ResolvedTheme::Day, None),
            ThemeMode::Night => (ResolvedTheme::Night, None),
            ThemeMode::Auto => {
                let window = self.sun_window_for(now).await;
                (window.resolve(now), Some(window))
            }
        };

        let applied = self
            .session
            .update(|s| {
                if self.generation.load(Ordering::SeqCst) != ticket || s.theme_mode != mode {
                    return None;
                }
                let changed = s.resolved_theme != Some(theme);
                s.resolved_theme = Some(theme);
                s.sun_window = window;
                Some(changed)
            })
            .await;

        match applied {
            Some(true) => {
                info!(mode = mode.as_str(), ?theme, "theme resolved");
                self.session
                    .publish(StateEvent::ThemeResolved { theme });
            }
            Some(false) => {}
            None => debug!(mode = mode.as_str(), "discarding superseded theme resolution"),
        }
        theme
    }

    /// Switch mode, persist it, and resolve immediately.
    pub async fn set_mode(&self, mode: ThemeMode) -> ResolvedTheme {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.store.set(keys::THEME_MODE, mode.as_str()) {
            warn!(error = %e, code = e.error_code(), "failed to persist theme mode");
            self.fallbacks.record(FallbackKind::StorageWrite);
        }
        self.session.update(|s| s.theme_mode = mode).await;
        self.session
            .publish(StateEvent::ThemeModeChanged { mode });
        self.update_theme().await
    }

    /// Flip between day and night. Always leaves `auto`.
    pub async fn toggle(&self) -> ResolvedTheme {
        let current = match self.session.read(|s| s.resolved_theme).await {
            Some(theme) => theme,
            None => self.update_theme().await,
        };
        self.set_mode(current.opposite().into()).await
    }

    /// Run the recompute loop until the session's event channel closes.
    pub fn spawn(&self) -> JoinHandle<()> {
        let scheduler = self.clone();
        let mut events = self.session.subscribe();
        tokio::spawn(async move {
            info!(tick_secs = scheduler.tick.as_secs(), "theme scheduler started");
            loop {
                scheduler.update_theme().await;
                let mode = scheduler.session.read(|s| s.theme_mode).await;
                let keep_running = if mode == ThemeMode::Auto {
                    tokio::select! {
                        () = tokio::time::sleep(scheduler.tick) => true,
                        open = wait_for_mode_change(&mut events) => open,
                    }
                } else {
                    wait_for_mode_change(&mut events).await
                };
                if !keep_running {
                    break;
                }
            }
        })
    }

    async fn sun_window_for(&self, now: OffsetDateTime) -> SunWindow {
        match self.geo.locate().await {
            Ok(location) => {
                let offset = location
                    .utc_offset_seconds
                    .and_then(|secs| UtcOffset::from_whole_seconds(secs).ok())
                    .unwrap_or(self.local_offset);
                SunWindow::seasonal(now.to_offset(offset).date(), offset)
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "geolocation failed; using default sun window");
                self.fallbacks.record(FallbackKind::Geolocation);
                SunWindow::fixed(now.to_offset(self.local_offset).date(), self.local_offset)
            }
        }
    }
}

/// `true` on a mode change (or a lag, which may have hidden one); `false`
/// once the channel is closed.
async fn wait_for_mode_change(events: &mut broadcast::Receiver<StateEvent>) -> bool {
    loop {
        match events.recv().await {
            Ok(StateEvent::ThemeModeChanged { .. }) | Err(broadcast::error::RecvError::Lagged(_)) => return true,
            Ok(_) => {}
            Err(broadcast::error::RecvError::Closed) => return false,
        }
    }
}

#[cfg(test)]
#[path = "theme_test.rs"]
mod tests;
