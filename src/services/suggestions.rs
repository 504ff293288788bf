//! Search suggestions — debounced title lookups.
//!
//! DESIGN
//! ======
//! Each call takes a ticket from a shared counter, sleeps the debounce
//! interval, and only searches if no newer call has arrived. The ticket is
//! checked again after the search so a slow response for an old query never
//! replaces the answer for a newer one. A superseded call returns `None`;
//! the caller keeps whatever it showed last.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ErrorCode;
use crate::state::{FallbackKind, FallbackStats};
use crate::tmdb::{Movie, MovieCatalog};

pub const MIN_QUERY_LEN: usize = 2;
pub const MAX_SUGGESTIONS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: u64,
    pub title: String,
    pub year: String,
    pub poster_path: Option<String>,
}

impl From<&Movie> for Suggestion {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            year: movie.release_year().to_string(),
            poster_path: movie.poster_path.clone(),
        }
    }
}

#[derive(Clone)]
pub struct SuggestionService {
    catalog: Arc<dyn MovieCatalog>,
    debounce: Duration,
    fallbacks: FallbackStats,
    latest: Arc<AtomicU64>,
}

impl SuggestionService {
    #[must_use]
    pub fn new(catalog: Arc<dyn MovieCatalog>, debounce: Duration, fallbacks: FallbackStats) -> Self {
        Self { catalog, debounce, fallbacks, latest: Arc::new(AtomicU64::new(0)) }
    }

    /// Suggestions for `query`, or `None` if a newer query superseded it.
    pub async fn suggest(&self, query: &str) -> Option<Vec<Suggestion>> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Some(Vec::new());
        }

        tokio::time::sleep(self.debounce).await;
        if !self.is_latest(ticket) {
            debug!(query, "suggestion query superseded before search");
            return None;
        }

        let suggestions = match self.catalog.search(query, 1).await {
            Ok(page) => dedup_titles(&page.results),
            Err(e) => {
                warn!(query, error = %e, code = e.error_code(), "suggestion search failed");
                self.fallbacks.record(FallbackKind::Search);
                Vec::new()
            }
        };

        if !self.is_latest(ticket) {
            debug!(query, "suggestion results superseded");
            return None;
        }
        Some(suggestions)
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}

/// First `MAX_SUGGESTIONS` movies with distinct titles, ignoring case.
fn dedup_titles(movies: &[Movie]) -> Vec<Suggestion> {
    let mut seen = HashSet::new();
    movies
        .iter()
        .filter(|m| !m.title.trim().is_empty())
        .filter(|m| seen.insert(m.title.trim().to_lowercase()))
        .take(MAX_SUGGESTIONS)
        .map(Suggestion::from)
        .collect()
}

#[cfg(test)]
#[path = "suggestions_test.rs"]
mod tests;
