//! HTTP geolocation providers.
//!
//! Two response shapes are understood: the ipapi.co style (`country_name`,
//! `utc_offset: "+0100"`) used by the primary endpoint, and the ipwho.is
//! style (`success`, nested `timezone` object) used by the secondary one.

use std::time::Duration;

use serde::Deserialize;

use super::{GeoError, GeoLocator, UserLocation};
use crate::config::HttpTimeouts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoFormat {
    IpApi,
    IpWho,
}

pub struct HttpGeoProvider {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    format: GeoFormat,
}

impl HttpGeoProvider {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(url: &str, api_key: Option<String>, format: GeoFormat, timeouts: HttpTimeouts) -> Result<Self, GeoError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| GeoError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, url: url.to_string(), api_key, format })
    }
}

#[async_trait::async_trait]
impl GeoLocator for HttpGeoProvider {
    async fn locate(&self) -> Result<UserLocation, GeoError> {
        let mut request = self.http.get(&self.url);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }
        let response = request
            .send()
            .await
            .map_err(|e| GeoError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Status { status: status.as_u16() });
        }
        let body = response
            .text()
            .await
            .map_err(|e| GeoError::Request(e.to_string()))?;

        match self.format {
            GeoFormat::IpApi => parse_ipapi(&body),
            GeoFormat::IpWho => parse_ipwho(&body),
        }
    }
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    utc_offset: Option<String>,
}

#[derive(Deserialize)]
struct IpWhoResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    timezone: Option<IpWhoTimezone>,
}

#[derive(Deserialize)]
struct IpWhoTimezone {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    offset: Option<i32>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub(crate) fn parse_ipapi(body: &str) -> Result<UserLocation, GeoError> {
    let api: IpApiResponse = serde_json::from_str(body).map_err(|e| GeoError::Unusable(e.to_string()))?;
    if api.error {
        return Err(GeoError::Unusable(api.reason.unwrap_or_else(|| "provider error".into())));
    }
    let country = non_blank(api.country_name).ok_or_else(|| GeoError::Unusable("missing country".into()))?;
    Ok(UserLocation {
        country,
        region_code: non_blank(api.country_code).unwrap_or_default().to_ascii_uppercase(),
        city: non_blank(api.city).unwrap_or_else(|| "Unknown".into()),
        timezone: non_blank(api.timezone).unwrap_or_else(|| "UTC".into()),
        utc_offset_seconds: api.utc_offset.as_deref().and_then(parse_hhmm_offset),
    })
}

pub(crate) fn parse_ipwho(body: &str) -> Result<UserLocation, GeoError> {
    let api: IpWhoResponse = serde_json::from_str(body).map_err(|e| GeoError::Unusable(e.to_string()))?;
    if !api.success {
        return Err(GeoError::Unusable(api.message.unwrap_or_else(|| "provider error".into())));
    }
    let country = non_blank(api.country).ok_or_else(|| GeoError::Unusable("missing country".into()))?;
    let (timezone, offset) = match api.timezone {
        Some(tz) => (non_blank(tz.id), tz.offset),
        None => (None, None),
    };
    Ok(UserLocation {
        country,
        region_code: non_blank(api.country_code).unwrap_or_default().to_ascii_uppercase(),
        city: non_blank(api.city).unwrap_or_else(|| "Unknown".into()),
        timezone: timezone.unwrap_or_else(|| "UTC".into()),
        utc_offset_seconds: offset,
    })
}

/// Parse `+0100` / `-0530` / `+01:00` into seconds east of UTC.
pub(crate) fn parse_hhmm_offset(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
