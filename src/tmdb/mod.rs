//! Movie catalog — the TMDB metadata API behind a trait seam.
//!
//! DESIGN
//! ======
//! The region resolver, search suggestions and pass-through routes depend on
//! `dyn MovieCatalog`, never on the concrete client, so tests drive them with
//! an in-memory catalog.

pub mod cache;
pub mod client;
pub mod types;

pub use client::TmdbClient;
pub use types::{ListCategory, Movie, MovieDetails, MoviePage, Person, RegionProviders, TmdbError};

/// Read-only movie metadata source.
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Region-scoped list for one category.
    async fn regional_list(&self, category: ListCategory, region: &str) -> Result<Vec<Movie>, TmdbError>;

    /// Non-regional list for one category.
    async fn global_list(&self, category: ListCategory) -> Result<Vec<Movie>, TmdbError>;

    async fn search(&self, query: &str, page: u32) -> Result<MoviePage, TmdbError>;

    async fn discover_by_region(&self, region: &str, page: u32) -> Result<MoviePage, TmdbError>;

    /// Details with videos and credits appended.
    async fn movie_details(&self, id: u64) -> Result<MovieDetails, TmdbError>;

    /// Offers for `region`, or `None` when the title is not available there.
    async fn watch_providers(&self, id: u64, region: &str) -> Result<Option<RegionProviders>, TmdbError>;

    async fn person_details(&self, id: u64) -> Result<Person, TmdbError>;
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;

    /// A catalog call, recorded in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum CatalogCall {
        Regional(ListCategory, String),
        Global(ListCategory),
        Search(String),
    }

    /// In-memory catalog. Regional lists are titled `"<category> <region>"`,
    /// global lists `"<category> global"`.
    #[derive(Default)]
    pub struct MockCatalog {
        pub failing_regional: Mutex<HashSet<ListCategory>>,
        pub failing_global: Mutex<HashSet<ListCategory>>,
        pub search_titles: Mutex<Vec<String>>,
        pub fail_search: Mutex<bool>,
        pub calls: Mutex<Vec<CatalogCall>>,
    }

    impl MockCatalog {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub fn failing_regional(categories: &[ListCategory]) -> Self {
            let mock = Self::new();
            mock.failing_regional
                .lock()
                .unwrap()
                .extend(categories.iter().copied());
            mock
        }

        #[must_use]
        pub fn with_search_titles(titles: &[&str]) -> Self {
            let mock = Self::new();
            *mock.search_titles.lock().unwrap() = titles.iter().map(|t| (*t).to_string()).collect();
            mock
        }

        pub fn calls(&self) -> Vec<CatalogCall> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: CatalogCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[must_use]
    pub fn movie(id: u64, title: &str) -> Movie {
        Movie { id, title: title.to_string(), ..Movie::default() }
    }

    #[async_trait::async_trait]
    impl MovieCatalog for MockCatalog {
        async fn regional_list(&self, category: ListCategory, region: &str) -> Result<Vec<Movie>, TmdbError> {
            self.record(CatalogCall::Regional(category, region.to_string()));
            if self.failing_regional.lock().unwrap().contains(&category) {
                return Err(TmdbError::Status { status: 503 });
            }
            Ok(vec![movie(1, &format!("{category} {region}"))])
        }

        async fn global_list(&self, category: ListCategory) -> Result<Vec<Movie>, TmdbError> {
            self.record(CatalogCall::Global(category));
            if self.failing_global.lock().unwrap().contains(&category) {
                return Err(TmdbError::Request("connection refused".into()));
            }
            Ok(vec![movie(2, &format!("{category} global"))])
        }

        async fn search(&self, query: &str, page: u32) -> Result<MoviePage, TmdbError> {
            self.record(CatalogCall::Search(query.to_string()));
            if *self.fail_search.lock().unwrap() {
                return Err(TmdbError::Status { status: 500 });
            }
            let results: Vec<Movie> = self
                .search_titles
                .lock()
                .unwrap()
                .iter()
                .enumerate()
                .map(|(i, t)| movie(i as u64 + 1, t))
                .collect();
            Ok(MoviePage { page, total_pages: 1, total_results: results.len() as u64, results })
        }

        async fn discover_by_region(&self, region: &str, page: u32) -> Result<MoviePage, TmdbError> {
            Ok(MoviePage { page, results: vec![movie(3, &format!("discover {region}"))], total_pages: 1, total_results: 1 })
        }

        async fn movie_details(&self, id: u64) -> Result<MovieDetails, TmdbError> {
            if id == 0 {
                return Err(TmdbError::Status { status: 404 });
            }
            Ok(MovieDetails { id, title: format!("movie {id}"), ..MovieDetails::default() })
        }

        async fn watch_providers(&self, _id: u64, region: &str) -> Result<Option<RegionProviders>, TmdbError> {
            if region == "US" {
                Ok(Some(RegionProviders::default()))
            } else {
                Ok(None)
            }
        }

        async fn person_details(&self, id: u64) -> Result<Person, TmdbError> {
            Ok(Person { id, name: format!("person {id}"), ..Person::default() })
        }
    }
}
