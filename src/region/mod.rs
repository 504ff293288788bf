//! Region resolver — consent, geolocation, region mapping, content fallback.
//!
//! DESIGN
//! ======
//! One call to `resolve_region_and_load_content` is one sequential attempt:
//! pick a region code (manual override, consent-gated geolocation, or the
//! default), fetch the three regional lists concurrently, and replace
//! `RegionalContent` in the session in a single write. Consent is a tiny
//! state machine, `unset -> granted | denied`, persisted only by `allow` and
//! `deny`.
//!
//! ERROR HANDLING
//! ==============
//! Nothing propagates. Geolocation failure degrades to the default region
//! with a placeholder location; a failed regional list degrades to the
//! global list of the same category, then to an empty list. Each step is
//! logged and counted in `FallbackStats`.
//!
//! CANCELLATION
//! ============
//! Every resolution takes a generation ticket. The final write happens under
//! the session write guard only if the ticket is still the latest, so a
//! superseded (or cancelled) resolution never overwrites newer content.
//! Whatever ends the latest resolution clears `loading_regional`: the final
//! write, the consent prompt, or `cancel()`.

pub mod countries;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ErrorCode;
use crate::geo::{GeoLocator, UserLocation};
use crate::state::{FallbackKind, FallbackStats, Session, StateEvent};
use crate::storage::{KeyValueStore, keys};
use crate::tmdb::{ListCategory, Movie, MovieCatalog};

pub use countries::{country_name_for_code, region_code_for_country};

// =============================================================================
// TYPES
// =============================================================================

/// Persisted geolocation consent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionPermission {
    #[default]
    Unset,
    Granted,
    Denied,
}

impl RegionPermission {
    /// Read from the stored value. Anything unrecognised is `Unset`.
    #[must_use]
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("granted") => Self::Granted,
            Some("denied") => Self::Denied,
            _ => Self::Unset,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

/// The three lists for one region. Always replaced whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalContent {
    pub trending: Vec<Movie>,
    pub popular: Vec<Movie>,
    pub top_rated: Vec<Movie>,
    pub region_code: String,
    pub country_name: String,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RegionError {
    #[error("invalid region code: '{0}'")]
    InvalidRegionCode(String),
}

impl ErrorCode for RegionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRegionCode(_) => "E_INVALID_REGION_CODE",
        }
    }
}

/// Uppercase a 2-letter ASCII region code, or `None` if it is not one.
#[must_use]
pub fn normalize_region_code(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (raw.len() == 2 && raw.chars().all(|c| c.is_ascii_alphabetic())).then(|| raw.to_ascii_uppercase())
}

// =============================================================================
// RESOLVER
// =============================================================================

#[derive(Clone)]
pub struct RegionResolver {
    store: Arc<dyn KeyValueStore>,
    catalog: Arc<dyn MovieCatalog>,
    geo: Arc<dyn GeoLocator>,
    session: Session,
    fallbacks: FallbackStats,
    default_region: String,
    generation: Arc<AtomicU64>,
}

impl RegionResolver {
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        catalog: Arc<dyn MovieCatalog>,
        geo: Arc<dyn GeoLocator>,
        session: Session,
        fallbacks: FallbackStats,
        default_region: String,
    ) -> Self {
        Self { store, catalog, geo, session, fallbacks, default_region, generation: Arc::new(AtomicU64::new(0)) }
    }

    #[must_use]
    pub fn permission(&self) -> RegionPermission {
        RegionPermission::from_stored(self.store.get(keys::REGION_PERMISSION).as_deref())
    }

    /// Manually selected region, if one is stored and well-formed.
    #[must_use]
    pub fn selected_region(&self) -> Option<String> {
        self.store
            .get(keys::SELECTED_REGION)
            .as_deref()
            .and_then(normalize_region_code)
    }

    /// Resolve the content region and replace `RegionalContent`.
    ///
    /// With consent unset (and not forced) nothing is fetched: the consent
    /// modal flag is raised instead.
    pub async fn resolve_region_and_load_content(&self, force_location_request: bool) {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let permission = self.permission();
        let manual = if force_location_request { None } else { self.selected_region() };

        let (region_code, location) = if let Some(code) = manual {
            debug!(region = %code, "using manually selected region");
            (code, None)
        } else if force_location_request || permission == RegionPermission::Granted {
            self.locate_region().await
        } else if permission == RegionPermission::Denied {
            debug!(region = %self.default_region, "location denied; using default region");
            (self.default_region.clone(), None)
        } else {
            self.request_consent(ticket).await;
            return;
        };

        let marked = self
            .session
            .update(|s| {
                let current = self.is_current(ticket);
                if current {
                    s.loading_regional = true;
                }
                current
            })
            .await;
        if !marked {
            return;
        }

        let content = self.load_content(&region_code, location.as_ref()).await;

        let written = self
            .session
            .update(|s| {
                if !self.is_current(ticket) {
                    return false;
                }
                s.regional_content = Some(content);
                s.location = location;
                s.show_consent_modal = false;
                s.loading_regional = false;
                true
            })
            .await;

        if written {
            info!(region = %region_code, "regional content loaded");
            self.session
                .publish(StateEvent::RegionalContentReplaced { region_code });
        } else {
            debug!(region = %region_code, "discarding superseded regional content");
        }
    }

    /// User accepted geolocation.
    pub async fn allow(&self) {
        self.record_consent(RegionPermission::Granted).await;
        self.resolve_region_and_load_content(true).await;
    }

    /// User declined geolocation.
    pub async fn deny(&self) {
        self.record_consent(RegionPermission::Denied).await;
        self.resolve_region_and_load_content(false).await;
    }

    /// Pin content to `code`, bypassing geolocation.
    ///
    /// # Errors
    ///
    /// Returns an error if `code` is not a 2-letter code.
    pub async fn select_region(&self, code: &str) -> Result<(), RegionError> {
        let code = normalize_region_code(code).ok_or_else(|| RegionError::InvalidRegionCode(code.to_string()))?;
        if let Err(e) = self.store.set(keys::SELECTED_REGION, &code) {
            warn!(error = %e, code = e.error_code(), "failed to persist selected region");
            self.fallbacks.record(FallbackKind::StorageWrite);
        }
        info!(region = %code, "region selected manually");
        self.resolve_region_and_load_content(false).await;
        Ok(())
    }

    /// Drop the manual region and resolve as usual. Consent is left as is.
    pub async fn restore_automatic(&self) {
        if let Err(e) = self.store.remove(keys::SELECTED_REGION) {
            warn!(error = %e, code = e.error_code(), "failed to clear selected region");
            self.fallbacks.record(FallbackKind::StorageWrite);
        }
        info!("automatic region restored");
        self.resolve_region_and_load_content(false).await;
    }

    /// Invalidate every in-flight resolution. Nothing is loading afterwards.
    pub async fn cancel(&self) {
        self.session
            .update(|s| {
                self.generation.fetch_add(1, Ordering::SeqCst);
                s.loading_regional = false;
            })
            .await;
        debug!("in-flight region resolutions cancelled");
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    async fn request_consent(&self, ticket: u64) {
        let raised = self
            .session
            .update(|s| {
                let current = self.is_current(ticket);
                if current {
                    s.show_consent_modal = true;
                    s.loading_regional = false;
                }
                current
            })
            .await;
        if raised {
            info!("region consent unset; prompting");
            self.session.publish(StateEvent::ConsentRequired);
        }
    }

    async fn record_consent(&self, permission: RegionPermission) {
        if let Err(e) = self.store.set(keys::REGION_PERMISSION, permission.as_str()) {
            warn!(error = %e, code = e.error_code(), "failed to persist region permission");
            self.fallbacks.record(FallbackKind::StorageWrite);
        }
        self.session.update(|s| s.show_consent_modal = false).await;
        info!(permission = permission.as_str(), "region consent recorded");
        self.session
            .publish(StateEvent::ConsentChanged { permission });
    }

    async fn locate_region(&self) -> (String, Option<UserLocation>) {
        match self.geo.locate().await {
            Ok(location) => {
                if let Some(code) = region_code_for_country(&location.country) {
                    (code.to_string(), Some(location))
                } else {
                    warn!(
                        country = %location.country,
                        fallback = %self.default_region,
                        "country not in region table; using default region"
                    );
                    self.fallbacks.record(FallbackKind::UnmappedCountry);
                    (self.default_region.clone(), Some(location))
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    code = e.error_code(),
                    fallback = %self.default_region,
                    "geolocation failed; using default region"
                );
                self.fallbacks.record(FallbackKind::Geolocation);
                let country = country_name_for_code(&self.default_region).unwrap_or("Unknown");
                (self.default_region.clone(), Some(UserLocation::unknown(country, &self.default_region)))
            }
        }
    }

    async fn load_content(&self, region_code: &str, location: Option<&UserLocation>) -> RegionalContent {
        let (trending, popular, top_rated) = tokio::join!(
            self.load_list(ListCategory::Trending, region_code),
            self.load_list(ListCategory::Popular, region_code),
            self.load_list(ListCategory::TopRated, region_code),
        );

        let country_name = country_name_for_code(region_code)
            .map(str::to_string)
            .or_else(|| location.map(|l| l.country.clone()))
            .unwrap_or_else(|| "Unknown".to_string());

        RegionalContent { trending, popular, top_rated, region_code: region_code.to_string(), country_name }
    }

    async fn load_list(&self, category: ListCategory, region_code: &str) -> Vec<Movie> {
        match self.catalog.regional_list(category, region_code).await {
            Ok(movies) => return movies,
            Err(e) => {
                warn!(%category, region = region_code, error = %e, code = e.error_code(), "regional list failed; using global list");
                self.fallbacks.record(FallbackKind::RegionalList);
            }
        }
        match self.catalog.global_list(category).await {
            Ok(movies) => movies,
            Err(e) => {
                warn!(%category, error = %e, code = e.error_code(), "global list failed; list left empty");
                self.fallbacks.record(FallbackKind::GlobalList);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[path = "region_test.rs"]
mod tests;
