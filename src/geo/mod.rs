//! IP geolocation — primary and secondary providers behind one trait.
//!
//! DESIGN
//! ======
//! Both the region resolver and the theme scheduler call `GeoLocator::locate`
//! independently; no location is cached or shared between them. `GeoChain`
//! consults the secondary provider only when the primary answered with
//! something unusable (error payload, malformed body, no country) or refused
//! with 429. Any other transport or status failure of the primary fails the
//! lookup and the caller degrades.

pub mod provider;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use provider::{GeoFormat, HttpGeoProvider};

// =============================================================================
// TYPES
// =============================================================================

/// Where the user appears to be. Session-only, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLocation {
    pub country: String,
    /// 2-letter code as reported by the provider (or the fallback code).
    pub region_code: String,
    pub city: String,
    pub timezone: String,
    /// Offset from UTC at lookup time, when the provider reports one.
    pub utc_offset_seconds: Option<i32>,
}

impl UserLocation {
    /// Placeholder used when geolocation fails.
    #[must_use]
    pub fn unknown(country: &str, region_code: &str) -> Self {
        Self {
            country: country.to_string(),
            region_code: region_code.to_string(),
            city: "Unknown".to_string(),
            timezone: "UTC".to_string(),
            utc_offset_seconds: None,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum GeoError {
    #[error("geolocation request failed: {0}")]
    Request(String),

    #[error("geolocation response error: status {status}")]
    Status { status: u16 },

    /// The provider answered, but not with a usable location.
    #[error("geolocation response unusable: {0}")]
    Unusable(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for GeoError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_GEO_REQUEST",
            Self::Status { .. } => "E_GEO_STATUS",
            Self::Unusable(_) => "E_GEO_UNUSABLE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599 })
    }
}

#[async_trait::async_trait]
pub trait GeoLocator: Send + Sync {
    async fn locate(&self) -> Result<UserLocation, GeoError>;
}

// =============================================================================
// CHAIN
// =============================================================================

/// Primary provider with an optional secondary for unusable or rate-limited answers.
pub struct GeoChain {
    primary: Arc<dyn GeoLocator>,
    secondary: Option<Arc<dyn GeoLocator>>,
}

impl GeoChain {
    #[must_use]
    pub fn new(primary: Arc<dyn GeoLocator>, secondary: Option<Arc<dyn GeoLocator>>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait::async_trait]
impl GeoLocator for GeoChain {
    async fn locate(&self) -> Result<UserLocation, GeoError> {
        match self.primary.locate().await {
            Err(err @ (GeoError::Unusable(_) | GeoError::Status { status: 429 })) => {
                let Some(secondary) = &self.secondary else {
                    return Err(err);
                };
                warn!(error = %err, "primary geolocation unusable; trying secondary provider");
                secondary.locate().await
            }
            other => other,
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
