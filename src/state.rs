//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is built once in `main` and handed to the router and the
//! background theme loop. It owns every component explicitly; there are no
//! ambient singletons. `Session` is the process-wide view model that
//! presentation reads: one `RwLock`-guarded struct plus a broadcast channel
//! that announces each change as a `StateEvent`.
//!
//! OBSERVABILITY
//! =============
//! Components never surface their failures to callers; they degrade. Each
//! degradation is logged and counted in `FallbackStats` so the fallback rate
//! can be watched as a health signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::geo::UserLocation;
use crate::region::{RegionPermission, RegionResolver, RegionalContent};
use crate::services::library::Library;
use crate::services::suggestions::SuggestionService;
use crate::storage::KeyValueStore;
use crate::theme::{ResolvedTheme, SunWindow, ThemeMode, ThemeScheduler};
use crate::tmdb::MovieCatalog;

const EVENT_CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// SESSION STATE
// =============================================================================

/// Everything presentation renders from. Never persisted as a whole.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub location: Option<UserLocation>,
    pub regional_content: Option<RegionalContent>,
    /// Set when consent is unset and the UI must ask.
    pub show_consent_modal: bool,
    pub loading_regional: bool,
    pub theme_mode: ThemeMode,
    /// `None` only until the first theme pass completes.
    pub resolved_theme: Option<ResolvedTheme>,
    pub sun_window: Option<SunWindow>,
}

impl SessionState {
    #[must_use]
    pub fn new(theme_mode: ThemeMode) -> Self {
        Self {
            location: None,
            regional_content: None,
            show_consent_modal: false,
            loading_regional: false,
            theme_mode,
            resolved_theme: None,
            sun_window: None,
        }
    }
}

/// Change notifications. Listeners subscribe through [`Session::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateEvent {
    ConsentRequired,
    ConsentChanged { permission: RegionPermission },
    RegionalContentReplaced { region_code: String },
    ThemeModeChanged { mode: ThemeMode },
    ThemeResolved { theme: ResolvedTheme },
}

/// Handle to the session state. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
    events: broadcast::Sender<StateEvent>,
}

impl Session {
    #[must_use]
    pub fn new(theme_mode: ThemeMode) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { state: Arc::new(RwLock::new(SessionState::new(theme_mode))), events }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&*self.state.read().await)
    }

    /// Mutate under one write guard. Readers see either all or none of it.
    pub async fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut *self.state.write().await)
    }

    /// Announce a change. Having no listeners is not an error.
    pub fn publish(&self, event: StateEvent) {
        let _ = self.events.send(event);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }
}

/// Log every state change. The logging listener of the event model.
pub fn spawn_event_logger(session: &Session) -> JoinHandle<()> {
    let mut events = session.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => info!(?event, "state changed"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => debug!(skipped, "event logger lagged"),
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

// =============================================================================
// FALLBACK STATS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    /// Geolocation failed; default region or default sun window used.
    Geolocation,
    /// Country not in the region table; default region used.
    UnmappedCountry,
    /// A regional list failed; the global list was used.
    RegionalList,
    /// The global list failed too; the list is empty.
    GlobalList,
    /// Suggestion search failed; no suggestions.
    Search,
    /// A key-value write failed; the in-memory state still changed.
    StorageWrite,
}

#[derive(Debug, Default)]
struct FallbackCounters {
    geolocation: AtomicU64,
    unmapped_country: AtomicU64,
    regional_list: AtomicU64,
    global_list: AtomicU64,
    search: AtomicU64,
    storage_write: AtomicU64,
}

/// Monotonic per-kind fallback counters.
#[derive(Debug, Clone, Default)]
pub struct FallbackStats {
    inner: Arc<FallbackCounters>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FallbackSnapshot {
    pub geolocation: u64,
    pub unmapped_country: u64,
    pub regional_list: u64,
    pub global_list: u64,
    pub search: u64,
    pub storage_write: u64,
}

impl FallbackStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: FallbackKind) {
        let counter = match kind {
            FallbackKind::Geolocation => &self.inner.geolocation,
            FallbackKind::UnmappedCountry => &self.inner.unmapped_country,
            FallbackKind::RegionalList => &self.inner.regional_list,
            FallbackKind::GlobalList => &self.inner.global_list,
            FallbackKind::Search => &self.inner.search,
            FallbackKind::StorageWrite => &self.inner.storage_write,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> FallbackSnapshot {
        FallbackSnapshot {
            geolocation: self.inner.geolocation.load(Ordering::Relaxed),
            unmapped_country: self.inner.unmapped_country.load(Ordering::Relaxed),
            regional_list: self.inner.regional_list.load(Ordering::Relaxed),
            global_list: self.inner.global_list.load(Ordering::Relaxed),
            search: self.inner.search.load(Ordering::Relaxed),
            storage_write: self.inner.storage_write.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Composition root handle, injected into Axum handlers via `State`.
#[derive(Clone)]
pub struct AppState {
    pub session: Session,
    pub catalog: Arc<dyn MovieCatalog>,
    pub region: RegionResolver,
    pub theme: ThemeScheduler,
    pub library: Library,
    pub suggestions: SuggestionService,
    pub fallbacks: FallbackStats,
    pub default_region: String,
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
