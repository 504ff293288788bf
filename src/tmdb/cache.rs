//! Flat time-based memoization of response bodies, keyed by request URL.
//!
//! No size bound and no background eviction: every insert sweeps expired
//! entries, so the map only ever holds bodies younger than the TTL. A zero
//! TTL disables caching.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, String)>>,
}

impl ResponseCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&self, key: String, body: String) {
        self.insert_at(key, body, Instant::now());
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        if self.ttl.is_zero() {
            return None;
        }
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let fresh = entries
            .get(key)
            .is_some_and(|(stored_at, _)| now.saturating_duration_since(*stored_at) < self.ttl);
        if fresh {
            entries.get(key).map(|(_, body)| body.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    fn insert_at(&self, key: String, body: String, now: Instant) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.retain(|_, (stored_at, _)| now.saturating_duration_since(*stored_at) < self.ttl);
        entries.insert(key, (now, body));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_is_returned() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.insert_at("/movie/popular".into(), "{}".into(), t0);
        assert_eq!(cache.get_at("/movie/popular", t0 + Duration::from_secs(59)).as_deref(), Some("{}"));
    }

    #[test]
    fn expired_entry_is_dropped() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.insert_at("/movie/popular".into(), "{}".into(), t0);
        assert!(cache.get_at("/movie/popular", t0 + Duration::from_secs(60)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_sweeps_expired_entries() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        for i in 0..1000 {
            cache.insert_at(format!("/search/movie?query=q{i}"), "{}".into(), t0);
        }
        assert_eq!(cache.len(), 1000);

        cache.insert_at("/movie/popular".into(), "{}".into(), t0 + Duration::from_secs(3600));
        assert_eq!(cache.len(), 1);
        assert!(cache.get_at("/movie/popular", t0 + Duration::from_secs(3601)).is_some());
    }

    #[test]
    fn insert_keeps_fresh_entries() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.insert_at("a".into(), "1".into(), t0);
        cache.insert_at("b".into(), "2".into(), t0 + Duration::from_secs(30));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_at("a", t0 + Duration::from_secs(45)).as_deref(), Some("1"));
    }

    #[test]
    fn zero_ttl_disables_cache() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.insert("/movie/popular".into(), "{}".into());
        assert!(cache.get("/movie/popular").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn keys_are_independent() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("a".into(), "1".into());
        cache.insert("b".into(), "2".into());
        assert_eq!(cache.get("a").as_deref(), Some("1"));
        assert_eq!(cache.get("b").as_deref(), Some("2"));
        assert_eq!(cache.len(), 2);
    }
}
