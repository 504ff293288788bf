//! Library service — favorites, watchlist, sidebar flag.
//!
//! DESIGN
//! ======
//! Each list lives under its own key as one JSON array. Every mutation is a
//! read-modify-write of that array behind a process-local mutex, so two
//! concurrent adds never drop each other. Lists are de-duplicated by movie
//! id on write and again on read, which repairs a store edited by hand.
//!
//! ERROR HANDLING
//! ==============
//! Unparseable stored JSON reads as an empty list and is logged. Write
//! failures are returned to the caller and counted as a fallback.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::state::{FallbackKind, FallbackStats};
use crate::storage::{KeyValueStore, StorageError, keys};
use crate::tmdb::Movie;

/// A watchlist record: the movie summary plus when it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    #[serde(flatten)]
    pub movie: Movie,
    /// Unix seconds.
    #[serde(default)]
    pub added_at: i64,
}

#[derive(Clone)]
pub struct Library {
    store: Arc<dyn KeyValueStore>,
    fallbacks: FallbackStats,
    write_lock: Arc<Mutex<()>>,
}

impl Library {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, fallbacks: FallbackStats) -> Self {
        Self { store, fallbacks, write_lock: Arc::new(Mutex::new(())) }
    }

    // =========================================================================
    // FAVORITES
    // =========================================================================

    #[must_use]
    pub fn favorites(&self) -> Vec<Movie> {
        dedup_by_id(self.read_list(keys::FAVORITES), |m: &Movie| m.id)
    }

    #[must_use]
    pub fn is_favorite(&self, id: u64) -> bool {
        self.favorites().iter().any(|m| m.id == id)
    }

    /// Add `movie` unless a favorite with the same id exists. Returns whether
    /// the list changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list cannot be persisted.
    pub fn add_favorite(&self, movie: Movie) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut favorites = self.favorites();
        if favorites.iter().any(|m| m.id == movie.id) {
            return Ok(false);
        }
        info!(movie_id = movie.id, title = %movie.title, "favorite added");
        favorites.push(movie);
        self.write_list(keys::FAVORITES, &favorites)?;
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns an error if the updated list cannot be persisted.
    pub fn remove_favorite(&self, id: u64) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut favorites = self.favorites();
        let before = favorites.len();
        favorites.retain(|m| m.id != id);
        if favorites.len() == before {
            return Ok(false);
        }
        info!(movie_id = id, "favorite removed");
        self.write_list(keys::FAVORITES, &favorites)?;
        Ok(true)
    }

    // =========================================================================
    // WATCHLIST
    // =========================================================================

    #[must_use]
    pub fn watchlist(&self) -> Vec<WatchlistEntry> {
        dedup_by_id(self.read_list(keys::WATCHLIST), |e: &WatchlistEntry| e.movie.id)
    }

    /// Add `movie` stamped with `added_at` unless it is already listed.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list cannot be persisted.
    pub fn add_to_watchlist(&self, movie: Movie, added_at: i64) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut watchlist = self.watchlist();
        if watchlist.iter().any(|e| e.movie.id == movie.id) {
            return Ok(false);
        }
        info!(movie_id = movie.id, title = %movie.title, "watchlist entry added");
        watchlist.push(WatchlistEntry { movie, added_at });
        self.write_list(keys::WATCHLIST, &watchlist)?;
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns an error if the updated list cannot be persisted.
    pub fn remove_from_watchlist(&self, id: u64) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut watchlist = self.watchlist();
        let before = watchlist.len();
        watchlist.retain(|e| e.movie.id != id);
        if watchlist.len() == before {
            return Ok(false);
        }
        info!(movie_id = id, "watchlist entry removed");
        self.write_list(keys::WATCHLIST, &watchlist)?;
        Ok(true)
    }

    // =========================================================================
    // SIDEBAR
    // =========================================================================

    #[must_use]
    pub fn sidebar_collapsed(&self) -> bool {
        self.store.get(keys::SIDEBAR_COLLAPSED).is_some_and(|v| v.trim() == "true")
    }

    /// # Errors
    ///
    /// Returns an error if the flag cannot be persisted.
    pub fn set_sidebar_collapsed(&self, collapsed: bool) -> Result<(), StorageError> {
        let value = if collapsed { "true" } else { "false" };
        self.store
            .set(keys::SIDEBAR_COLLAPSED, value)
            .inspect_err(|e| self.record_write_failure(keys::SIDEBAR_COLLAPSED, e))
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(raw) = self.store.get(key) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(key, error = %e, "stored list is not valid JSON; reading as empty");
                Vec::new()
            }
        }
    }

    fn write_list<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(items).map_err(StorageError::from);
        encoded
            .and_then(|raw| self.store.set(key, &raw))
            .inspect_err(|e| self.record_write_failure(key, e))
    }

    fn record_write_failure(&self, key: &str, err: &StorageError) {
        warn!(key, error = %err, code = err.error_code(), "library write failed");
        self.fallbacks.record(FallbackKind::StorageWrite);
    }
}

/// Keep the first record for each id, preserving order.
fn dedup_by_id<T>(items: Vec<T>, id: impl Fn(&T) -> u64) -> Vec<T> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(id(item))).collect()
}

#[cfg(test)]
#[path = "library_test.rs"]
mod tests;
