//! TMDB v3 HTTP client.
//!
//! Thin wrapper: each operation is one parameterized GET with the API key in
//! the query string. No retry or backoff; a non-2xx status is a hard failure
//! for that call. Successful bodies are memoized per URL in a
//! [`ResponseCache`]. Pure parsing lives in `parse_body` for testability.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::MovieCatalog;
use super::cache::ResponseCache;
use super::types::{
    ListCategory, Movie, MovieDetails, MoviePage, Person, RegionProviders, TmdbError, WatchProvidersResponse,
};
use crate::config::{HttpTimeouts, TmdbConfig};

// =============================================================================
// CLIENT
// =============================================================================

pub struct TmdbClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    cache: ResponseCache,
}

impl TmdbClient {
    /// Build a client. A missing API key is not an error here: every call
    /// will fail with [`TmdbError::MissingApiKey`] instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &TmdbConfig, timeouts: HttpTimeouts) -> Result<Self, TmdbError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| TmdbError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache: ResponseCache::new(Duration::from_secs(config.cache_ttl_secs)),
        })
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T, TmdbError> {
        let api_key = self.api_key.as_deref().ok_or(TmdbError::MissingApiKey)?;
        let cache_key = cache_key(path, params);

        if let Some(body) = self.cache.get(&cache_key) {
            debug!(path, "tmdb cache hit");
            return parse_body(&body);
        }

        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("api_key", api_key)])
            .query(params)
            .send()
            .await
            .map_err(|e| TmdbError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TmdbError::Status { status: status.as_u16() });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TmdbError::Request(e.to_string()))?;
        let parsed = parse_body(&body)?;
        self.cache.insert(cache_key, body);
        Ok(parsed)
    }
}

/// Cache key: path plus parameters, never including the API key.
fn cache_key(path: &str, params: &[(&str, String)]) -> String {
    let mut key = path.to_string();
    for (i, (name, value)) in params.iter().enumerate() {
        key.push(if i == 0 { '?' } else { '&' });
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, TmdbError> {
    serde_json::from_str(body).map_err(|e| TmdbError::Parse(e.to_string()))
}

// =============================================================================
// CATALOG
// =============================================================================

#[async_trait::async_trait]
impl MovieCatalog for TmdbClient {
    async fn regional_list(&self, category: ListCategory, region: &str) -> Result<Vec<Movie>, TmdbError> {
        let (path, extra) = category.regional_request();
        let mut params = vec![("region", region.to_string())];
        params.extend(extra.iter().map(|(name, value)| (*name, (*value).to_string())));
        let page: MoviePage = self.get(path, &params).await?;
        Ok(page.results)
    }

    async fn global_list(&self, category: ListCategory) -> Result<Vec<Movie>, TmdbError> {
        let page: MoviePage = self.get(category.path(), &[]).await?;
        Ok(page.results)
    }

    async fn search(&self, query: &str, page: u32) -> Result<MoviePage, TmdbError> {
        self.get(
            "/search/movie",
            &[("query", query.to_string()), ("page", page.max(1).to_string()), ("include_adult", "false".into())],
        )
        .await
    }

    async fn discover_by_region(&self, region: &str, page: u32) -> Result<MoviePage, TmdbError> {
        self.get(
            "/discover/movie",
            &[
                ("region", region.to_string()),
                ("sort_by", "popularity.desc".into()),
                ("page", page.max(1).to_string()),
            ],
        )
        .await
    }

    async fn movie_details(&self, id: u64) -> Result<MovieDetails, TmdbError> {
        self.get(&format!("/movie/{id}"), &[("append_to_response", "videos,credits".into())])
            .await
    }

    async fn watch_providers(&self, id: u64, region: &str) -> Result<Option<RegionProviders>, TmdbError> {
        let mut response: WatchProvidersResponse = self
            .get(&format!("/movie/{id}/watch/providers"), &[])
            .await?;
        Ok(response.results.remove(region))
    }

    async fn person_details(&self, id: u64) -> Result<Person, TmdbError> {
        self.get(&format!("/person/{id}"), &[]).await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
