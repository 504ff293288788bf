//! TMDB wire types and errors.
//!
//! Every field the UI reads is `#[serde(default)]`: a missing poster or
//! release date must never fail the whole list.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TmdbError {
    /// No API key configured. Permanent for the process.
    #[error("TMDB API key not configured")]
    MissingApiKey,

    #[error("TMDB request failed: {0}")]
    Request(String),

    /// Non-2xx response. Treated as a hard failure for that call.
    #[error("TMDB response error: status {status}")]
    Status { status: u16 },

    #[error("TMDB response parse failed: {0}")]
    Parse(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for TmdbError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "E_TMDB_MISSING_API_KEY",
            Self::Request(_) => "E_TMDB_REQUEST",
            Self::Status { .. } => "E_TMDB_STATUS",
            Self::Parse(_) => "E_TMDB_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599 })
    }
}

// =============================================================================
// LIST CATEGORY
// =============================================================================

/// The three regional content lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListCategory {
    Trending,
    Popular,
    TopRated,
}

impl ListCategory {
    pub const ALL: [Self; 3] = [Self::Trending, Self::Popular, Self::TopRated];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trending => "trending",
            Self::Popular => "popular",
            Self::TopRated => "top_rated",
        }
    }

    /// TMDB path for this category.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Trending => "/trending/movie/day",
            Self::Popular => "/movie/popular",
            Self::TopRated => "/movie/top_rated",
        }
    }

    /// Path and extra parameters for the region-scoped list. The trending
    /// endpoint ignores `region`, so regional trending is discover sorted
    /// by popularity.
    #[must_use]
    pub fn regional_request(self) -> (&'static str, &'static [(&'static str, &'static str)]) {
        const BY_POPULARITY: &[(&str, &str)] = &[("sort_by", "popularity.desc")];
        const NONE: &[(&str, &str)] = &[];
        match self {
            Self::Trending => ("/discover/movie", BY_POPULARITY),
            other => (other.path(), NONE),
        }
    }
}

impl std::fmt::Display for ListCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// MOVIES
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub popularity: f64,
    pub genre_ids: Vec<u32>,
}

impl Movie {
    /// Four-digit release year, or `"N/A"` when the date is absent or short.
    #[must_use]
    pub fn release_year(&self) -> &str {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or("N/A")
    }
}

/// One page of a TMDB list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoviePage {
    pub page: u32,
    pub results: Vec<Movie>,
    pub total_pages: u32,
    pub total_results: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Video {
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub official: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoList {
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub character: String,
    pub profile_path: Option<String>,
    pub order: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    pub job: String,
    pub department: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credits {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

/// Movie details with `videos` and `credits` appended in one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    pub tagline: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub vote_average: f64,
    pub genres: Vec<Genre>,
    pub videos: VideoList,
    pub credits: Credits,
}

impl MovieDetails {
    /// First YouTube trailer, preferring official uploads.
    #[must_use]
    pub fn trailer(&self) -> Option<&Video> {
        let mut trailers = self
            .videos
            .results
            .iter()
            .filter(|v| v.site == "YouTube" && v.kind == "Trailer");
        let first = trailers.clone().next();
        trailers.find(|v| v.official).or(first)
    }

    #[must_use]
    pub fn directors(&self) -> Vec<&str> {
        self.credits
            .crew
            .iter()
            .filter(|c| c.job == "Director")
            .map(|c| c.name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    pub id: u64,
    pub name: String,
    pub biography: String,
    pub birthday: Option<String>,
    pub place_of_birth: Option<String>,
    pub profile_path: Option<String>,
    pub known_for_department: String,
}

// =============================================================================
// WATCH PROVIDERS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Provider {
    pub provider_id: u64,
    pub provider_name: String,
    pub logo_path: Option<String>,
}

/// Streaming/rent/buy offers for one region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionProviders {
    pub link: Option<String>,
    pub flatrate: Vec<Provider>,
    pub rent: Vec<Provider>,
    pub buy: Vec<Provider>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WatchProvidersResponse {
    pub results: std::collections::HashMap<String, RegionProviders>,
}
